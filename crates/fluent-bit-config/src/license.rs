// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! License key region detection.
//!
//! Region-scoped keys start with a two or three letter region code followed by two digits and
//! one or two `x` characters, e.g. `eu01xx...`. Keys without that prefix belong to the default
//! (US) region.

use std::sync::OnceLock;

use regex::Regex;

#[allow(clippy::expect_used)]
fn region_regex() -> &'static Regex {
    static REGION_REGEX: OnceLock<Regex> = OnceLock::new();
    REGION_REGEX.get_or_init(|| {
        Regex::new(r"^([a-z]{2,3})[0-9]{2}x{1,2}").expect("region regex is valid")
    })
}

/// Region code embedded in the license key, if any.
pub fn region(license_key: &str) -> Option<&str> {
    region_regex()
        .captures(license_key)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

pub fn is_region_eu(license_key: &str) -> bool {
    region(license_key).is_some_and(|r| r.starts_with("eu"))
}
