use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::ledger::Ledger;
use crate::models::{Category, Expense, DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::report::{self, Period};

const HEADER: [&str; 6] = ["pk", "date", "category", "amount", "comment", "added"];

/// Write expenses as CSV rows, oldest first. Returns the number of rows.
pub(crate) fn write_expenses<W: Write>(
    writer: W,
    expenses: &[Expense],
    categories: &[Category],
) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER).context("Failed to write CSV header")?;

    let mut rows: Vec<&Expense> = expenses.iter().collect();
    rows.sort_by_key(|e| (e.expense_date, e.pk));
    for exp in &rows {
        let category = Category::find_by_id(categories, exp.category)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| exp.category.to_string());
        wtr.write_record([
            exp.pk.map(|pk| pk.to_string()).unwrap_or_default(),
            exp.expense_date.format(TIMESTAMP_FORMAT).to_string(),
            category,
            exp.amount.to_string(),
            exp.comment.clone(),
            exp.added_date.format(TIMESTAMP_FORMAT).to_string(),
        ])
        .context("Failed to write CSV record")?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(rows.len())
}

/// Export every expense, or only those of `month` as `(year, month)`.
pub(crate) fn export_to_csv(
    ledger: &Ledger<'_>,
    path: &Path,
    month: Option<(i32, u32)>,
) -> Result<usize> {
    let expenses = match month {
        Some((year, month)) => {
            let period = Period::month(year, month)?;
            report::expenses_in(ledger.expenses.as_ref(), &period)?
        }
        None => ledger.expenses.all()?,
    };
    let categories = ledger.categories()?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let count = write_expenses(file, &expenses, &categories)?;
    tracing::info!(count, path = %path.display(), "exported expenses");
    Ok(count)
}

/// File name used when no export path is given.
pub(crate) fn default_file_name(month: Option<(i32, u32)>) -> String {
    match month {
        Some((year, month)) => format!("bookkeeper-export-{year:04}-{month:02}.csv"),
        None => format!("bookkeeper-export-{}.csv", crate::models::today().format(DATE_FORMAT)),
    }
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod export_tests;
