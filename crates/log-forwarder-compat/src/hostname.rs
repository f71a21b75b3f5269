// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Hostname detection for the global record attributes

use std::env;
use tracing::warn;

const UNKNOWN_HOSTNAME: &str = "unknown";

/// Get the hostname attached to every forwarded record
///
/// 1. NRIA_DISPLAY_NAME environment variable (if set)
/// 2. HOSTNAME environment variable
/// 3. System hostname via nix::unistd::gethostname()
/// 4. Fallback to "unknown"
#[must_use]
pub fn get_hostname() -> String {
    for key in ["NRIA_DISPLAY_NAME", "HOSTNAME"] {
        if let Ok(hostname) = env::var(key) {
            let hostname = hostname.trim();
            if !hostname.is_empty() {
                return hostname.to_string();
            }
        }
    }

    // System hostname as last resort
    if let Some(hostname) = system_hostname() {
        return hostname;
    }

    warn!("Could not determine hostname, using '{}'", UNKNOWN_HOSTNAME);
    UNKNOWN_HOSTNAME.to_string()
}

#[cfg(unix)]
fn system_hostname() -> Option<String> {
    match nix::unistd::gethostname() {
        Ok(hostname) => hostname
            .to_str()
            .map(str::trim)
            .filter(|hostname| !hostname.is_empty())
            .map(str::to_string),
        Err(e) => {
            warn!("Failed to get system hostname: {}", e);
            None
        }
    }
}

#[cfg(not(unix))]
fn system_hostname() -> Option<String> {
    env::var("COMPUTERNAME")
        .ok()
        .map(|hostname| hostname.trim().to_string())
        .filter(|hostname| !hostname.is_empty())
}
