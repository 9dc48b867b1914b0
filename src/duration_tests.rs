// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for duration parsing.

#[cfg(test)]
mod tests {
    use crate::duration::parse_duration;
    use std::time::Duration;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_milliseconds() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_parse_minutes_and_hours() {
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_compound_durations() {
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1h1m").unwrap(), Duration::from_secs(3660));
        assert_eq!(parse_duration("2s500ms").unwrap(), Duration::from_millis(2500));
    }

    #[test]
    fn test_fractional_value_rejected() {
        let err = parse_duration("1.5s").unwrap_err();
        assert!(err.to_string().contains("Unsupported duration unit '.'"));
    }

    #[test]
    fn test_trailing_value_without_unit_rejected() {
        let err = parse_duration("1s1").unwrap_err();
        assert!(err.to_string().contains("unit"));
    }

    #[test]
    fn test_compound_overflow_rejected() {
        assert!(parse_duration("5124095576030431h5124095576030431h").is_err());
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(parse_duration(" 5s ").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_empty_string_rejected() {
        let err = parse_duration("").unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_missing_unit_rejected() {
        let err = parse_duration("10").unwrap_err();
        assert!(err.to_string().contains("unit"));
    }

    #[test]
    fn test_missing_value_rejected() {
        assert!(parse_duration("s").is_err());
    }

    #[test]
    fn test_unknown_unit_rejected() {
        let err = parse_duration("10d").unwrap_err();
        assert!(err.to_string().contains("Unsupported duration unit 'd'"));
    }

    #[test]
    fn test_zero_rejected() {
        let err = parse_duration("0ms").unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_overflow_rejected() {
        assert!(parse_duration("18446744073709551615h").is_err());
    }
}
