use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::repository::{Entity, Value};

/// A single expenditure. `expense_date` is when the money was spent,
/// `added_date` when the record was created.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Expense {
    pub(crate) pk: Option<i64>,
    pub(crate) amount: Decimal,
    pub(crate) category: i64,
    pub(crate) expense_date: NaiveDateTime,
    pub(crate) added_date: NaiveDateTime,
    pub(crate) comment: String,
}

impl Expense {
    pub(crate) fn new(amount: Decimal, category: i64, expense_date: NaiveDateTime) -> Self {
        Self {
            pk: None,
            amount,
            category,
            expense_date: super::to_seconds(expense_date),
            added_date: super::now(),
            comment: String::new(),
        }
    }

    pub(crate) fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

impl Entity for Expense {
    const KIND: &'static str = "expense";
    const FIELDS: &'static [&'static str] =
        &["amount", "category", "expense_date", "added_date", "comment"];

    fn pk(&self) -> Option<i64> {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = Some(pk);
    }

    fn field(&self, name: &str) -> Option<Value> {
        Some(match name {
            "pk" => self.pk.into(),
            "amount" => self.amount.into(),
            "category" => self.category.into(),
            "expense_date" => self.expense_date.into(),
            "added_date" => self.added_date.into(),
            "comment" => self.comment.clone().into(),
            _ => return None,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.amount < Decimal::ZERO {
            return Err(Error::invalid(
                Self::KIND,
                format!("amount {} is negative", self.amount),
            ));
        }
        if self.category <= 0 {
            return Err(Error::invalid(Self::KIND, "category reference is missing"));
        }
        Ok(())
    }
}
