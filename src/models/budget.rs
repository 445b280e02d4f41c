use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::repository::{Entity, Value};

/// Spending limit over an inclusive date period.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Budget {
    pub(crate) pk: Option<i64>,
    pub(crate) amount: Decimal,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
}

impl Budget {
    pub(crate) fn new(amount: Decimal, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            pk: None,
            amount,
            start_date,
            end_date,
        }
    }

    pub(crate) fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}

impl Entity for Budget {
    const KIND: &'static str = "budget";
    const FIELDS: &'static [&'static str] = &["amount", "start_date", "end_date"];

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
            "start_date" => self.start_date.into(),
            "end_date" => self.end_date.into(),
            _ => return None,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.amount < Decimal::ZERO {
            return Err(Error::invalid(Self::KIND, "limit is negative"));
        }
        if self.start_date > self.end_date {
            return Err(Error::invalid(
                Self::KIND,
                format!("period {} .. {} ends before it starts", self.start_date, self.end_date),
            ));
        }
        Ok(())
    }
}
