mod budget;
mod category;
mod expense;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

pub(crate) use budget::Budget;
pub(crate) use category::{read_tree, Category};
pub(crate) use expense::Expense;

/// Sortable ISO-8601 layout used for stored timestamps.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Stored timestamps have second precision.
pub(crate) fn to_seconds(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_nanosecond(0).unwrap_or(ts)
}

/// Current local time at stored precision.
pub(crate) fn now() -> NaiveDateTime {
    to_seconds(chrono::Local::now().naive_local())
}

pub(crate) fn today() -> NaiveDate {
    now().date()
}

#[cfg(test)]
mod tests;
