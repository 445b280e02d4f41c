//! Date-window lookups over the expense repository and the sums shown to
//! the user.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::models::{self, Budget, Expense};
use crate::repository::{Filter, Repository};

/// Inclusive timestamp window, compared against `expense_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Period {
    pub(crate) start: NaiveDateTime,
    pub(crate) end: NaiveDateTime,
}

impl Period {
    /// `first 00:00:00` through `last 23:59:59`.
    pub(crate) fn span(first: NaiveDate, last: NaiveDate) -> Result<Self> {
        if first > last {
            return Err(Error::InvalidPeriod(format!("{first} is after {last}")));
        }
        let start = first.and_time(NaiveTime::MIN);
        let end = last
            .and_time(NaiveTime::MIN)
            .checked_add_signed(TimeDelta::seconds(86_399))
            .ok_or_else(|| Error::InvalidPeriod(format!("{last} is out of range")))?;
        Ok(Self { start, end })
    }

    pub(crate) fn day(date: NaiveDate) -> Result<Self> {
        Self::span(date, date)
    }

    /// Monday through Sunday of the week containing `date`.
    pub(crate) fn week_of(date: NaiveDate) -> Result<Self> {
        let offset = u64::from(date.weekday().num_days_from_monday());
        let monday = date.checked_sub_days(Days::new(offset));
        let sunday = monday.and_then(|m| m.checked_add_days(Days::new(6)));
        match (monday, sunday) {
            (Some(monday), Some(sunday)) => Self::span(monday, sunday),
            _ => Err(Error::InvalidPeriod(format!("week of {date} is out of range"))),
        }
    }

    /// First through last day of a calendar month; the last day is the day
    /// before the first of the next month.
    pub(crate) fn month(year: i32, month: u32) -> Result<Self> {
        let invalid = || Error::InvalidPeriod(format!("{year}-{month:02} is not a month"));
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .ok_or_else(invalid)?;
        Self::span(first, last)
    }

    pub(crate) fn year(year: i32) -> Result<Self> {
        let invalid = || Error::InvalidPeriod(format!("{year} is out of range"));
        let first = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)?;
        let last = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(invalid)?;
        Self::span(first, last)
    }

    pub(crate) fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }

    fn filter(&self) -> Filter {
        Filter::new().between("expense_date", self.start, self.end)
    }
}

/// Expenses dated inside `period`, oldest first.
pub(crate) fn expenses_in<R>(repo: &R, period: &Period) -> Result<Vec<Expense>>
where
    R: Repository<Expense> + ?Sized,
{
    let mut found = repo.get_all(&period.filter())?;
    found.sort_by(|a, b| {
        a.expense_date
            .cmp(&b.expense_date)
            .then_with(|| a.pk.cmp(&b.pk))
    });
    Ok(found)
}

pub(crate) fn expenses_by_day<R>(repo: &R, date: NaiveDate) -> Result<Vec<Expense>>
where
    R: Repository<Expense> + ?Sized,
{
    expenses_in(repo, &Period::day(date)?)
}

/// Expenses of the current week (Monday through Sunday).
pub(crate) fn expenses_by_week<R>(repo: &R) -> Result<Vec<Expense>>
where
    R: Repository<Expense> + ?Sized,
{
    expenses_by_week_of(repo, models::today())
}

pub(crate) fn expenses_by_week_of<R>(repo: &R, date: NaiveDate) -> Result<Vec<Expense>>
where
    R: Repository<Expense> + ?Sized,
{
    expenses_in(repo, &Period::week_of(date)?)
}

pub(crate) fn expenses_by_month<R>(repo: &R, year: i32, month: u32) -> Result<Vec<Expense>>
where
    R: Repository<Expense> + ?Sized,
{
    expenses_in(repo, &Period::month(year, month)?)
}

pub(crate) fn expenses_by_year<R>(repo: &R, year: i32) -> Result<Vec<Expense>>
where
    R: Repository<Expense> + ?Sized,
{
    expenses_in(repo, &Period::year(year)?)
}

pub(crate) fn total(expenses: &[Expense]) -> Decimal {
    expenses.iter().map(|e| e.amount).sum()
}

/// Spending per category pk.
pub(crate) fn totals_by_category(expenses: &[Expense]) -> BTreeMap<i64, Decimal> {
    let mut out = BTreeMap::new();
    for exp in expenses {
        *out.entry(exp.category).or_insert(Decimal::ZERO) += exp.amount;
    }
    out
}

/// Day, week and month sums around one date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Totals {
    pub(crate) day: Decimal,
    pub(crate) week: Decimal,
    pub(crate) month: Decimal,
}

impl Totals {
    pub(crate) fn for_day<R>(repo: &R, today: NaiveDate) -> Result<Self>
    where
        R: Repository<Expense> + ?Sized,
    {
        Ok(Self {
            day: total(&expenses_by_day(repo, today)?),
            week: total(&expenses_by_week_of(repo, today)?),
            month: total(&expenses_by_month(repo, today.year(), today.month())?),
        })
    }
}

/// Spending measured against one budget over the budget's own period.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BudgetUsage {
    pub(crate) budget: Budget,
    pub(crate) spent: Decimal,
}

impl BudgetUsage {
    pub(crate) fn remaining(&self) -> Decimal {
        self.budget.amount - self.spent
    }

    pub(crate) fn is_over(&self) -> bool {
        self.spent > self.budget.amount
    }
}

/// Usage of every budget whose period contains `day`.
pub(crate) fn budget_usage<B, E>(
    budgets: &B,
    expenses: &E,
    day: NaiveDate,
) -> Result<Vec<BudgetUsage>>
where
    B: Repository<Budget> + ?Sized,
    E: Repository<Expense> + ?Sized,
{
    let mut out = Vec::new();
    for budget in budgets.all()? {
        if !budget.covers(day) {
            continue;
        }
        let period = Period::span(budget.start_date, budget.end_date)?;
        let spent = total(&expenses_in(expenses, &period)?);
        out.push(BudgetUsage { budget, spent });
    }
    Ok(out)
}
