// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Duration parsing for Go-style duration strings.
//!
//! Operator settings such as the cluster timeout and the health check period
//! are given as `"3s"`, `"10s"`, `"1m30s"` or `"500ms"`. Only integer values
//! are accepted; fractional values such as `"1.5s"` are rejected.

use anyhow::{bail, Context, Result};
use std::time::Duration;

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60_000;
const MILLIS_PER_HOUR: u64 = 3_600_000;

/// Parse a Go-style duration string into a Rust `Duration`.
///
/// The string is one or more `<integer><unit>` segments, which are summed.
/// Supported units: `ms`, `s`, `m`, `h`.
///
/// # Examples
///
/// ```
/// use toolchain_common::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
/// assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
/// assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
///
/// assert!(parse_duration("").is_err());
/// assert!(parse_duration("10").is_err());  // Missing unit
/// assert!(parse_duration("1.5s").is_err()); // Fractional
/// assert!(parse_duration("0s").is_err());  // Zero
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, a segment has no value or no
/// unit, a unit is unknown, the total overflows, or it evaluates to zero.
pub fn parse_duration(duration_str: &str) -> Result<Duration> {
    let duration_str = duration_str.trim();
    if duration_str.is_empty() {
        bail!("Duration string cannot be empty");
    }

    let mut millis: u64 = 0;
    let mut rest = duration_str;
    while !rest.is_empty() {
        let unit_start = rest
            .find(|c: char| !c.is_ascii_digit())
            .context("Duration must end with a unit (ms, s, m, or h)")?;
        let (value_str, tail) = rest.split_at(unit_start);
        let unit_end = tail.find(|c: char| c.is_ascii_digit()).unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);

        let value: u64 = value_str
            .parse()
            .context("Duration value must be a positive integer")?;

        let factor = match unit {
            "ms" => 1,
            "s" => MILLIS_PER_SECOND,
            "m" => MILLIS_PER_MINUTE,
            "h" => MILLIS_PER_HOUR,
            _ => {
                bail!("Unsupported duration unit '{unit}'. Use 'ms', 's', 'm', or 'h'")
            }
        };

        millis = value
            .checked_mul(factor)
            .and_then(|segment| millis.checked_add(segment))
            .context("Duration value too large (overflow)")?;
        rest = next;
    }

    if millis == 0 {
        bail!("Duration '{duration_str}' must be greater than zero");
    }

    Ok(Duration::from_millis(millis))
}
