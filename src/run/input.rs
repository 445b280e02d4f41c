use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::DATE_FORMAT;

/// Accepted layouts for a typed-in expense time.
const TIMESTAMP_INPUTS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a non-negative amount. A decimal comma is accepted.
pub(crate) fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned = s.trim().replace(',', ".");
    let amount = Decimal::from_str(&cleaned)
        .with_context(|| format!("Invalid amount: '{}'", s.trim()))?;
    if amount.is_sign_negative() {
        anyhow::bail!("Amount cannot be negative: {amount}");
    }
    Ok(amount)
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s.trim()))
}

/// Parse a date with an optional time; a bare date means midnight.
pub(crate) fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for layout in TIMESTAMP_INPUTS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, layout) {
            return Ok(ts);
        }
    }
    parse_date(s)
        .map(|d| d.and_time(NaiveTime::MIN))
        .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD [HH:MM[:SS]]"))
}

/// Parse `YYYY-MM` into `(year, month)`.
pub(crate) fn parse_month(s: &str) -> Result<(i32, u32)> {
    let s = s.trim();
    let date = NaiveDate::parse_from_str(&format!("{s}-01"), DATE_FORMAT)
        .with_context(|| format!("Invalid month '{s}', expected YYYY-MM"))?;
    Ok((date.year(), date.month()))
}

pub(crate) fn parse_year(s: &str) -> Result<i32> {
    let s = s.trim();
    let year: i32 = s
        .parse()
        .with_context(|| format!("Invalid year '{s}', expected YYYY"))?;
    if !(1..=9999).contains(&year) {
        anyhow::bail!("Year out of range: {year}");
    }
    Ok(year)
}

pub(crate) fn parse_pk(s: &str) -> Result<i64> {
    let s = s.trim();
    s.parse()
        .with_context(|| format!("Invalid record number: '{s}'"))
}

/// Value of a `--flag value` pair in an argument list.
pub(crate) fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// Arguments that are neither flags nor flag values.
pub(crate) fn positional<'a>(args: &'a [String], flags: &[&str]) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut skip = false;
    for arg in args {
        if skip {
            skip = false;
            continue;
        }
        if flags.contains(&arg.as_str()) {
            skip = true;
            continue;
        }
        out.push(arg.as_str());
    }
    out
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod input_tests;
