//! Generic storage contract over one entity kind, with an in-memory and a
//! SQLite-backed implementation.

mod memory;
mod schema;
mod sqlite;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::cmp::Ordering;

use crate::error::{Error, Result};

pub(crate) use memory::MemoryRepository;
pub(crate) use sqlite::Store;

/// A field value as seen by filters and by the SQL column mapping.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Null,
    Integer(i64),
    Text(String),
    Amount(Decimal),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Integer(a), Self::Integer(b)) => a.partial_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.partial_cmp(b),
            (Self::Amount(a), Self::Amount(b)) => a.partial_cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.partial_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<Option<i64>> for Value {
    fn from(v: Option<i64>) -> Self {
        v.map_or(Self::Null, Self::Integer)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Self::Amount(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::Timestamp(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Condition {
    Eq(String, Value),
    /// Inclusive on both ends.
    Between(String, Value, Value),
}

impl Condition {
    pub(crate) fn field(&self) -> &str {
        match self {
            Self::Eq(field, _) | Self::Between(field, _, _) => field,
        }
    }
}

/// Conjunction of field conditions passed to [`Repository::get_all`].
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field.into(), value.into()));
        self
    }

    pub(crate) fn between(
        mut self,
        field: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        self.conditions
            .push(Condition::Between(field.into(), low.into(), high.into()));
        self
    }

    pub(crate) fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Reject conditions on fields the entity does not have.
    pub(crate) fn check<T: Entity>(&self) -> Result<()> {
        for cond in &self.conditions {
            let field = cond.field();
            if field != "pk" && !T::FIELDS.contains(&field) {
                return Err(Error::UnknownField {
                    kind: T::KIND,
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn matches<T: Entity>(&self, obj: &T) -> Result<bool> {
        for cond in &self.conditions {
            let actual = obj.field(cond.field()).ok_or_else(|| Error::UnknownField {
                kind: T::KIND,
                field: cond.field().to_string(),
            })?;
            let hit = match cond {
                Condition::Eq(_, expected) => actual == *expected,
                Condition::Between(field, low, high) => {
                    if actual == Value::Null {
                        false
                    } else {
                        let (lo, hi) = match (actual.partial_cmp(low), actual.partial_cmp(high)) {
                            (Some(lo), Some(hi)) => (lo, hi),
                            _ => {
                                return Err(Error::invalid(
                                    T::KIND,
                                    format!("range bounds do not match the type of '{field}'"),
                                ))
                            }
                        };
                        lo != Ordering::Less && hi != Ordering::Greater
                    }
                }
            };
            if !hit {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Filter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Filter::new(), |filter, (k, v)| filter.eq(k, v))
    }
}

/// A record a repository can store.
pub(crate) trait Entity: Clone + std::fmt::Debug {
    /// Human-readable kind, used in error messages.
    const KIND: &'static str;
    /// Stored fields besides `pk`, in column order.
    const FIELDS: &'static [&'static str];

    fn pk(&self) -> Option<i64>;
    fn set_pk(&mut self, pk: i64);
    /// Value of `pk` or one of [`Entity::FIELDS`]; `None` for unknown names.
    fn field(&self, name: &str) -> Option<Value>;
    fn validate(&self) -> Result<()>;
}

/// Storage contract for one entity kind.
pub(crate) trait Repository<T: Entity> {
    /// Persist a transient entity, write the assigned pk back into it and
    /// return that pk.
    fn add(&mut self, obj: &mut T) -> Result<i64>;
    fn get(&self, pk: i64) -> Result<Option<T>>;
    /// Entities matching every condition of `filter`, in ascending pk order.
    fn get_all(&self, filter: &Filter) -> Result<Vec<T>>;
    fn update(&mut self, obj: &T) -> Result<()>;
    /// Deleting a pk that is not stored is a no-op.
    fn delete(&mut self, pk: i64) -> Result<()>;

    fn all(&self) -> Result<Vec<T>> {
        self.get_all(&Filter::new())
    }
}

/// Shared `add` precondition: the entity is transient and well formed.
pub(crate) fn check_transient<T: Entity>(obj: &T) -> Result<()> {
    if let Some(pk) = obj.pk().filter(|pk| *pk > 0) {
        return Err(Error::invalid(T::KIND, format!("already stored with pk {pk}")));
    }
    obj.validate()
}

/// Shared `update` precondition: the entity carries an assigned pk.
pub(crate) fn stored_pk<T: Entity>(obj: &T) -> Result<i64> {
    match obj.pk() {
        Some(pk) if pk > 0 => Ok(pk),
        other => Err(Error::InvalidKey {
            kind: T::KIND,
            pk: other.unwrap_or(0),
        }),
    }
}
