#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ── amounts ───────────────────────────────────────────────────

#[test]
fn test_parse_amount_basic() {
    assert_eq!(parse_amount("120.50").unwrap(), dec!(120.50));
    assert_eq!(parse_amount(" 7 ").unwrap(), dec!(7));
}

#[test]
fn test_parse_amount_decimal_comma() {
    assert_eq!(parse_amount("3,75").unwrap(), dec!(3.75));
}

#[test]
fn test_parse_amount_rejects_negative_and_garbage() {
    assert!(parse_amount("-1").is_err());
    assert!(parse_amount("ten").is_err());
    assert!(parse_amount("").is_err());
}

// ── dates ─────────────────────────────────────────────────────

#[test]
fn test_parse_timestamp_layouts() {
    let expected = parse_date("2024-05-10").unwrap().and_hms_opt(14, 30, 0).unwrap();
    assert_eq!(parse_timestamp("2024-05-10 14:30").unwrap(), expected);
    assert_eq!(parse_timestamp("2024-05-10T14:30:00").unwrap(), expected);
    assert_eq!(parse_timestamp("2024-05-10 14:30:00").unwrap(), expected);
}

#[test]
fn test_parse_timestamp_bare_date_is_midnight() {
    let ts = parse_timestamp("2024-05-10").unwrap();
    assert_eq!(ts, parse_date("2024-05-10").unwrap().and_hms_opt(0, 0, 0).unwrap());
}

#[test]
fn test_parse_timestamp_invalid() {
    assert!(parse_timestamp("10/05/2024").is_err());
    assert!(parse_timestamp("2024-02-30").is_err());
}

#[test]
fn test_parse_month() {
    assert_eq!(parse_month("2024-12").unwrap(), (2024, 12));
    assert!(parse_month("2024-13").is_err());
    assert!(parse_month("May").is_err());
}

#[test]
fn test_parse_year() {
    assert_eq!(parse_year("2024").unwrap(), 2024);
    assert!(parse_year("0").is_err());
    assert!(parse_year("twenty").is_err());
}

#[test]
fn test_parse_pk() {
    assert_eq!(parse_pk(" 12 ").unwrap(), 12);
    assert!(parse_pk("x").is_err());
}

// ── args ──────────────────────────────────────────────────────

#[test]
fn test_flag_value() {
    let a = args(&["120", "books", "--date", "2024-05-10"]);
    assert_eq!(flag_value(&a, "--date"), Some("2024-05-10"));
    assert_eq!(flag_value(&a, "--comment"), None);
}

#[test]
fn test_positional_skips_flags() {
    let a = args(&["120", "--date", "2024-05-10", "raw", "meat"]);
    assert_eq!(positional(&a, &["--date", "--comment"]), vec!["120", "raw", "meat"]);
}
