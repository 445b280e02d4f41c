use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{read_tree, Budget, Category, Expense};
use crate::repository::{Filter, MemoryRepository, Repository, Store};

/// Category outline stored into an empty category collection.
pub(crate) const DEFAULT_CATEGORIES: &str = "
groceries
    meat
        raw meat
        meat products
    sweets
books
clothes
";

/// The three entity repositories a caller works with, behind one
/// backend-agnostic handle.
pub(crate) struct Ledger<'a> {
    pub(crate) categories: Box<dyn Repository<Category> + 'a>,
    pub(crate) expenses: Box<dyn Repository<Expense> + 'a>,
    pub(crate) budgets: Box<dyn Repository<Budget> + 'a>,
}

impl Ledger<'static> {
    pub(crate) fn in_memory() -> Self {
        Self {
            categories: Box::new(MemoryRepository::<Category>::new()),
            expenses: Box::new(MemoryRepository::<Expense>::new()),
            budgets: Box::new(MemoryRepository::<Budget>::new()),
        }
    }
}

impl<'a> Ledger<'a> {
    pub(crate) fn on_store(store: &'a Store) -> Self {
        Self {
            categories: Box::new(store.repository::<Category>()),
            expenses: Box::new(store.repository::<Expense>()),
            budgets: Box::new(store.repository::<Budget>()),
        }
    }

    /// Store the default category tree when no category exists yet.
    /// Returns how many categories were created.
    pub(crate) fn seed_default_categories(&mut self) -> Result<usize> {
        if !self.categories.all()?.is_empty() {
            return Ok(0);
        }
        let tree = read_tree(DEFAULT_CATEGORIES.lines())?;
        let created = Category::create_from_tree(&tree, self.categories.as_mut())?;
        info!(count = created.len(), "seeded default categories");
        Ok(created.len())
    }

    pub(crate) fn categories(&self) -> Result<Vec<Category>> {
        self.categories.all()
    }

    /// Look a category up by pk or by name. Exact name matches win over
    /// case-insensitive ones.
    pub(crate) fn resolve_category(&self, reference: &str) -> Result<Category> {
        let reference = reference.trim();
        if let Ok(pk) = reference.parse::<i64>() {
            return self
                .categories
                .get(pk)?
                .ok_or_else(|| Error::UnknownCategory(reference.to_string()));
        }
        if let Some(found) = self
            .categories
            .get_all(&Filter::new().eq("name", reference))?
            .into_iter()
            .next()
        {
            return Ok(found);
        }
        let all = self.categories.all()?;
        Category::find_by_name(&all, reference)
            .cloned()
            .ok_or_else(|| Error::UnknownCategory(reference.to_string()))
    }

    /// Record an expense against an existing category.
    pub(crate) fn record_expense(
        &mut self,
        category: &str,
        amount: Decimal,
        expense_date: NaiveDateTime,
        comment: &str,
    ) -> Result<Expense> {
        let cat = self.resolve_category(category)?;
        let cat_pk = cat
            .pk
            .ok_or_else(|| Error::UnknownCategory(category.to_string()))?;
        let mut exp = Expense::new(amount, cat_pk, expense_date).with_comment(comment);
        let pk = self.expenses.add(&mut exp)?;
        info!(pk, category = %cat.name, amount = %exp.amount, "recorded expense");
        Ok(exp)
    }

    pub(crate) fn change_amount(&mut self, pk: i64, amount: Decimal) -> Result<Expense> {
        let mut exp = self.expenses.get(pk)?.ok_or(Error::InvalidKey {
            kind: "expense",
            pk,
        })?;
        exp.amount = amount;
        self.expenses.update(&exp)?;
        Ok(exp)
    }

    /// No-op when `pk` is not stored.
    pub(crate) fn delete_expense(&mut self, pk: i64) -> Result<()> {
        self.expenses.delete(pk)
    }

    /// All expenses, newest first.
    pub(crate) fn expenses(&self) -> Result<Vec<Expense>> {
        let mut all = self.expenses.all()?;
        all.sort_by(|a, b| {
            b.expense_date
                .cmp(&a.expense_date)
                .then_with(|| b.pk.cmp(&a.pk))
        });
        Ok(all)
    }

    pub(crate) fn set_budget(
        &mut self,
        amount: Decimal,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Budget> {
        let mut budget = Budget::new(amount, start_date, end_date);
        self.budgets.add(&mut budget)?;
        Ok(budget)
    }

    pub(crate) fn delete_budget(&mut self, pk: i64) -> Result<()> {
        self.budgets.delete(pk)
    }
}

#[cfg(test)]
mod tests;
