pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    pk      INTEGER PRIMARY KEY AUTOINCREMENT,
    name    TEXT NOT NULL,
    parent  INTEGER
);

CREATE TABLE IF NOT EXISTS expenses (
    pk            INTEGER PRIMARY KEY AUTOINCREMENT,
    amount        TEXT NOT NULL,
    category      INTEGER NOT NULL,
    expense_date  TEXT NOT NULL,
    added_date    TEXT NOT NULL,
    comment       TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(expense_date);
CREATE INDEX IF NOT EXISTS idx_expenses_category ON expenses(category);
CREATE INDEX IF NOT EXISTS idx_categories_name ON categories(name);

CREATE TABLE IF NOT EXISTS budgets (
    pk          INTEGER PRIMARY KEY AUTOINCREMENT,
    amount      TEXT NOT NULL,
    start_date  TEXT NOT NULL,
    end_date    TEXT NOT NULL
);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
