use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{ToSql, ToSqlOutput, Type, Value as SqlValue, ValueRef};
use rusqlite::{params, params_from_iter, Connection, Row};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::marker::PhantomData;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use super::{check_transient, schema, stored_pk, Condition, Entity, Filter, Repository, Value};
use crate::error::{Error, Result};
use crate::models::{Budget, Category, Expense, DATE_FORMAT, TIMESTAMP_FORMAT};

/// Timestamp layout written by older databases.
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Owner of the process-wide SQLite connection.
///
/// Opened once at startup; repositories borrow it, and [`Store::close`]
/// ends its lifetime explicitly.
pub(crate) struct Store {
    conn: Connection,
}

impl Store {
    pub(crate) fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut store = Self { conn };
        store.migrate().context("Database migration failed")?;
        info!(path = %path.display(), "opened expense store");
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&mut self) -> anyhow::Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            info!(version = schema::CURRENT_VERSION, "created schema");
            return Ok(());
        }

        self.normalize_timestamps()?;

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            info!(from = current, to = schema::CURRENT_VERSION, "migrated schema");
        }

        Ok(())
    }

    /// Rewrite space-separated timestamps left by older databases into the
    /// `T` layout.
    fn normalize_timestamps(&mut self) -> anyhow::Result<()> {
        let mut rewritten = 0;
        for column in ["expense_date", "added_date"] {
            rewritten += self.conn.execute(
                &format!(
                    "UPDATE expenses SET {column} = replace({column}, ' ', 'T') \
                     WHERE {column} LIKE '% %'"
                ),
                [],
            )?;
        }
        if rewritten > 0 {
            info!(rewritten, "normalized legacy timestamps");
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn repository<T: Table>(&self) -> SqliteRepository<'_, T> {
        SqliteRepository {
            conn: &self.conn,
            kind: PhantomData,
        }
    }

    pub(crate) fn close(self) -> anyhow::Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("Failed to close database")
    }
}

/// Table mapping for an entity: table name plus a decoder for rows
/// selected as `pk, FIELDS...`.
pub(crate) trait Table: Entity {
    const TABLE: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// One repository implementation for every [`Table`]; the mapping is fixed
/// by `T` when the repository is built.
pub(crate) struct SqliteRepository<'a, T> {
    conn: &'a Connection,
    kind: PhantomData<T>,
}

impl<T: Table> SqliteRepository<'_, T> {
    fn select_sql() -> String {
        format!("SELECT pk, {} FROM {}", T::FIELDS.join(", "), T::TABLE)
    }

    fn values(obj: &T) -> Result<Vec<Value>> {
        T::FIELDS
            .iter()
            .map(|name| {
                obj.field(name).ok_or_else(|| Error::UnknownField {
                    kind: T::KIND,
                    field: name.to_string(),
                })
            })
            .collect()
    }
}

/// Column expression compared against `value`. Timestamps written with a
/// space separator are read in the `T` layout so text order stays
/// chronological.
fn column(field: &str, value: &Value) -> String {
    match value {
        Value::Timestamp(_) => format!("replace({field}, ' ', 'T')"),
        _ => field.to_string(),
    }
}

/// Render a checked filter as a WHERE clause with numbered parameters.
fn where_clause(filter: &Filter) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();
    for cond in filter.conditions() {
        match cond {
            Condition::Eq(field, Value::Null) => clauses.push(format!("{field} IS NULL")),
            Condition::Eq(field, value @ Value::Amount(_)) => {
                values.push(value.clone());
                clauses.push(format!(
                    "CAST({field} AS REAL) = CAST(?{} AS REAL)",
                    values.len()
                ));
            }
            Condition::Eq(field, value) => {
                values.push(value.clone());
                clauses.push(format!("{} = ?{}", column(field, value), values.len()));
            }
            Condition::Between(field, low, high) => {
                values.push(low.clone());
                let lo = values.len();
                values.push(high.clone());
                let hi = values.len();
                if matches!(low, Value::Amount(_)) {
                    clauses.push(format!(
                        "CAST({field} AS REAL) BETWEEN CAST(?{lo} AS REAL) AND CAST(?{hi} AS REAL)"
                    ));
                } else {
                    let col = column(field, low);
                    clauses.push(format!("{col} BETWEEN ?{lo} AND ?{hi}"));
                }
            }
        }
    }
    if clauses.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), values)
    }
}

impl<T: Table> Repository<T> for SqliteRepository<'_, T> {
    fn add(&mut self, obj: &mut T) -> Result<i64> {
        check_transient(obj)?;
        let values = Self::values(obj)?;
        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            T::TABLE,
            T::FIELDS.join(", "),
            placeholders.join(", ")
        );
        self.conn.execute(&sql, params_from_iter(values.iter()))?;
        let pk = self.conn.last_insert_rowid();
        obj.set_pk(pk);
        debug!(table = T::TABLE, pk, "inserted");
        Ok(pk)
    }

    fn get(&self, pk: i64) -> Result<Option<T>> {
        let sql = format!("{} WHERE pk = ?1", Self::select_sql());
        match self.conn.query_row(&sql, params![pk], T::from_row) {
            Ok(obj) => Ok(Some(obj)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_all(&self, filter: &Filter) -> Result<Vec<T>> {
        filter.check::<T>()?;
        let (clause, values) = where_clause(filter);
        let sql = format!("{}{clause} ORDER BY pk", Self::select_sql());
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), T::from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    fn update(&mut self, obj: &T) -> Result<()> {
        let pk = stored_pk(obj)?;
        obj.validate()?;
        let mut values = Self::values(obj)?;
        let assignments: Vec<String> = T::FIELDS
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{name} = ?{}", i + 1))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE pk = ?{}",
            T::TABLE,
            assignments.join(", "),
            values.len() + 1
        );
        values.push(Value::Integer(pk));
        let changed = self.conn.execute(&sql, params_from_iter(values.iter()))?;
        if changed == 0 {
            return Err(Error::InvalidKey { kind: T::KIND, pk });
        }
        debug!(table = T::TABLE, pk, "updated");
        Ok(())
    }

    fn delete(&mut self, pk: i64) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE pk = ?1", T::TABLE);
        let removed = self.conn.execute(&sql, params![pk])?;
        debug!(table = T::TABLE, pk, removed, "deleted");
        Ok(())
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            Value::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            Value::Amount(v) => ToSqlOutput::Owned(SqlValue::Text(v.normalize().to_string())),
            Value::Timestamp(v) => {
                ToSqlOutput::Owned(SqlValue::Text(v.format(TIMESTAMP_FORMAT).to_string()))
            }
            Value::Date(v) => ToSqlOutput::Owned(SqlValue::Text(v.format(DATE_FORMAT).to_string())),
        })
    }
}

// ── Column decoding ──────────────────────────────────────────

fn conversion_error(
    idx: usize,
    ty: Type,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(err))
}

fn amount_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    match row.get_ref(idx)? {
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            Decimal::from_str(&text).map_err(|e| conversion_error(idx, Type::Text, e))
        }
        ValueRef::Integer(v) => Ok(Decimal::from(v)),
        ValueRef::Real(v) => Decimal::from_f64(v).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                Type::Real,
                format!("{v} is not a representable amount").into(),
            )
        }),
        other => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "amount".into(),
            other.data_type(),
        )),
    }
}

/// Category references may have been written as text by older clients.
fn reference_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    match row.get_ref(idx)? {
        ValueRef::Integer(v) => Ok(v),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes)
            .trim()
            .parse()
            .map_err(|e| conversion_error(idx, Type::Text, e)),
        other => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "category".into(),
            other.data_type(),
        )),
    }
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let text: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(&text, LEGACY_TIMESTAMP_FORMAT))
        .map_err(|e| conversion_error(idx, Type::Text, e))
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|e| conversion_error(idx, Type::Text, e))
}

// ── Table mappings ───────────────────────────────────────────

impl Table for Category {
    const TABLE: &'static str = "categories";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Category {
            pk: Some(row.get(0)?),
            name: row.get(1)?,
            parent: row.get(2)?,
        })
    }
}

impl Table for Expense {
    const TABLE: &'static str = "expenses";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Expense {
            pk: Some(row.get(0)?),
            amount: amount_column(row, 1)?,
            category: reference_column(row, 2)?,
            expense_date: timestamp_column(row, 3)?,
            added_date: timestamp_column(row, 4)?,
            comment: row.get(5)?,
        })
    }
}

impl Table for Budget {
    const TABLE: &'static str = "budgets";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Budget {
            pk: Some(row.get(0)?),
            amount: amount_column(row, 1)?,
            start_date: date_column(row, 2)?,
            end_date: date_column(row, 3)?,
        })
    }
}
