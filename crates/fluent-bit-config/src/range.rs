// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Event-ID range compilation.
//!
//! Windows event-log blocks accept allow and deny lists of event IDs, each entry being a bare
//! integer (`4624`) or an inclusive range (`4600-4699`). Fluent Bit can only filter on a regex,
//! so every list is compiled into a single pattern where each token is anchored on its own:
//!
//! ```text
//! ["5", "9-11"]  ->  ^5$|^(9|1[0-1])$
//! ```
//!
//! Ranges are split into sub-intervals that share a digit prefix, so that every sub-interval
//! can be written as `prefix[a-b][0-9]{n}`. Plain character ranges over the textual bounds are
//! wrong as soon as the bounds differ in length.

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::LogsConfigError;

/// A compiled event-ID list.
///
/// An empty list yields an empty pattern, which matches nothing and means "no constraint"
/// to the grep filter built on top of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventIdPattern {
    pattern: Option<String>,
}

impl EventIdPattern {
    /// The regex source, or `None` for an empty token list.
    pub fn as_str(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    /// Checks `value` against the compiled pattern.
    pub fn matches(&self, value: &str) -> bool {
        match &self.pattern {
            // The pattern is built from digits and fixed syntax only
            Some(pattern) => Regex::new(pattern)
                .map(|re| re.is_match(value))
                .unwrap_or(false),
            None => false,
        }
    }
}

/// Compiles an ordered list of event-ID tokens into one alternation.
pub fn compile<S: AsRef<str>>(tokens: &[S]) -> Result<EventIdPattern, LogsConfigError> {
    let mut alternatives = Vec::with_capacity(tokens.len());
    for token in tokens {
        alternatives.push(compile_token(token.as_ref())?);
    }

    if alternatives.is_empty() {
        return Ok(EventIdPattern { pattern: None });
    }

    Ok(EventIdPattern {
        pattern: Some(alternatives.join("|")),
    })
}

fn compile_token(token: &str) -> Result<String, LogsConfigError> {
    if let Some((low, high)) = token.split_once('-') {
        let invalid = || LogsConfigError::InvalidRangeToken(token.to_string());
        let low = parse_id(low).ok_or_else(invalid)?;
        let high = parse_id(high).ok_or_else(invalid)?;
        if low > high {
            return Err(invalid());
        }
        return Ok(format!("^({})$", range_to_pattern(low, high)));
    }

    parse_id(token)
        .map(|id| format!("^{id}$"))
        .ok_or_else(|| LogsConfigError::InvalidRangeToken(token.to_string()))
}

/// Parses a non-negative decimal integer made of ASCII digits only.
fn parse_id(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Builds a regex body matching exactly the decimal integers in `[min, max]`.
pub(crate) fn range_to_pattern(min: u64, max: u64) -> String {
    if min == max {
        return min.to_string();
    }

    let mut start = u128::from(min);
    let mut parts = Vec::new();
    for stop in split_to_ranges(u128::from(min), u128::from(max)) {
        parts.push(interval_to_pattern(start, stop));
        start = stop + 1;
    }
    parts.join("|")
}

/// Upper bounds of the sub-intervals of `[min, max]` whose endpoints have equal length and
/// differ in a single digit position followed by a run of `0..9` positions.
fn split_to_ranges(min: u128, max: u128) -> BTreeSet<u128> {
    let mut stops = BTreeSet::new();
    stops.insert(max);

    let mut nines = 1;
    let mut stop = fill_nines(min, nines);
    while min <= stop && stop <= max {
        stops.insert(stop);
        nines += 1;
        stop = fill_nines(min, nines);
    }

    let mut zeros = 1;
    while let Some(stop) = fill_zeros(max + 1, zeros).checked_sub(1) {
        if !(min < stop && stop <= max) {
            break;
        }
        stops.insert(stop);
        zeros += 1;
    }

    stops
}

/// Replaces the last `count` digits of `value` with nines.
fn fill_nines(value: u128, count: u32) -> u128 {
    let unit = 10u128.pow(count);
    value - value % unit + (unit - 1)
}

/// Replaces the last `count` digits of `value` with zeros.
fn fill_zeros(value: u128, count: u32) -> u128 {
    value - value % 10u128.pow(count)
}

fn interval_to_pattern(start: u128, stop: u128) -> String {
    if start == stop {
        return start.to_string();
    }

    let start = start.to_string();
    let stop = stop.to_string();
    debug_assert_eq!(start.len(), stop.len());

    let mut pattern = String::new();
    let mut any_digits = 0;
    for (a, b) in start.chars().zip(stop.chars()) {
        if a == b {
            pattern.push(a);
        } else if a != '0' || b != '9' {
            pattern.push_str(&format!("[{a}-{b}]"));
        } else {
            any_digits += 1;
        }
    }

    match any_digits {
        0 => {}
        1 => pattern.push_str("[0-9]"),
        n => pattern.push_str(&format!("[0-9]{{{n}}}")),
    }
    pattern
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn compiled(tokens: &[&str]) -> EventIdPattern {
        compile(tokens).expect("tokens should compile")
    }

    #[test]
    fn test_single_id() {
        let pattern = compiled(&["5"]);
        assert_eq!(pattern.as_str(), Some("^5$"));
        assert!(pattern.matches("5"));
        assert!(!pattern.matches("50"));
        assert!(!pattern.matches("15"));
    }

    #[test]
    fn test_simple_range() {
        let pattern = compiled(&["3-5"]);
        assert_eq!(pattern.as_str(), Some("^([3-5])$"));
        for id in ["3", "4", "5"] {
            assert!(pattern.matches(id), "{id} should match");
        }
        for id in ["2", "6", "35"] {
            assert!(!pattern.matches(id), "{id} should not match");
        }
    }

    #[test]
    fn test_range_union() {
        let pattern = compiled(&["3-5", "8"]);
        assert_eq!(pattern.as_str(), Some("^([3-5])$|^8$"));
        for id in ["3", "4", "5", "8"] {
            assert!(pattern.matches(id));
        }
        for id in ["6", "7", "9", "38"] {
            assert!(!pattern.matches(id));
        }
    }

    #[test]
    fn test_range_across_digit_lengths() {
        let pattern = compiled(&["9-11"]);
        assert_eq!(pattern.as_str(), Some("^(9|1[0-1])$"));
        for id in ["9", "10", "11"] {
            assert!(pattern.matches(id));
        }
        for id in ["1", "8", "12", "19", "99"] {
            assert!(!pattern.matches(id));
        }
    }

    #[test]
    fn test_range_with_full_digit_runs() {
        assert_eq!(range_to_pattern(0, 100), "[0-9]|[1-9][0-9]|100");
        assert_eq!(
            range_to_pattern(1000, 1999),
            "100[0-9]|10[1-9][0-9]|1[1-9][0-9]{2}"
        );
        assert_eq!(range_to_pattern(10, 99), "1[0-9]|[2-9][0-9]");
        assert_eq!(range_to_pattern(4624, 4624), "4624");
    }

    #[test]
    fn test_invalid_tokens() {
        for token in ["abc", "", "-", "5-", "-5", "1-2-3", "+5", " 5", "10-2", "3.5"] {
            let result = compile(&[token]);
            assert!(
                matches!(result, Err(LogsConfigError::InvalidRangeToken(ref t)) if t == token),
                "{token:?} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_invalid_token_fails_whole_list() {
        assert!(compile(&["1", "2-4", "abc"]).is_err());
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let pattern = compile::<&str>(&[]).unwrap();
        assert!(pattern.is_empty());
        assert_eq!(pattern.as_str(), None);
        assert!(!pattern.matches(""));
        assert!(!pattern.matches("0"));
    }

    #[test]
    fn test_leading_zeros_are_normalized() {
        let pattern = compiled(&["007"]);
        assert_eq!(pattern.as_str(), Some("^7$"));
    }

    proptest! {
        #[test]
        fn range_pattern_matches_exactly_the_interval(
            a in 0u64..200_000,
            b in 0u64..200_000,
            probe in 0u64..250_000,
        ) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let pattern = compile(&[format!("{low}-{high}")]).unwrap();
            prop_assert_eq!(
                pattern.matches(&probe.to_string()),
                low <= probe && probe <= high,
                "pattern {:?} for {}-{} on {}", pattern.as_str(), low, high, probe
            );
        }

        #[test]
        fn range_pattern_accepts_both_bounds(a in 0u64..u64::MAX / 2, span in 0u64..1_000_000) {
            let high = a + span;
            let pattern = compile(&[format!("{a}-{high}")]).unwrap();
            prop_assert!(pattern.matches(&a.to_string()));
            prop_assert!(pattern.matches(&high.to_string()));
            prop_assert!(!pattern.matches(&(high + 1).to_string()));
        }

        #[test]
        fn bare_id_matches_only_itself(id in 0u64..100_000, probe in 0u64..100_000) {
            let pattern = compile(&[id.to_string()]).unwrap();
            prop_assert_eq!(pattern.matches(&probe.to_string()), id == probe);
        }
    }
}
