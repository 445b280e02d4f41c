use anyhow::Result;
use chrono::Datelike;
use rust_decimal::Decimal;

use crate::ledger::Ledger;
use crate::models::{self, Category, Expense};
use crate::report::{self, BudgetUsage, Totals};
use crate::run::input::{parse_amount, parse_timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Expenses,
    Summary,
    Categories,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Expenses, Self::Summary, Self::Categories]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expenses => write!(f, "Expenses"),
            Self::Summary => write!(f, "Summary"),
            Self::Categories => write!(f, "Categories"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormField {
    Category,
    Amount,
    Date,
    Comment,
}

impl FormField {
    pub(crate) fn all() -> &'static [FormField] {
        &[Self::Category, Self::Amount, Self::Date, Self::Comment]
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Category => "Category",
            Self::Amount => "Amount",
            Self::Date => "Date",
            Self::Comment => "Comment",
        }
    }
}

/// Text typed into the add-expense form.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExpenseForm {
    pub(crate) category: String,
    pub(crate) amount: String,
    pub(crate) date: String,
    pub(crate) comment: String,
    pub(crate) field: FormField,
}

impl ExpenseForm {
    pub(crate) fn new() -> Self {
        Self {
            category: String::new(),
            amount: String::new(),
            date: models::now().format("%Y-%m-%d %H:%M").to_string(),
            comment: String::new(),
            field: FormField::Category,
        }
    }

    pub(crate) fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Category => &self.category,
            FormField::Amount => &self.amount,
            FormField::Date => &self.date,
            FormField::Comment => &self.comment,
        }
    }

    pub(crate) fn current_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Category => &mut self.category,
            FormField::Amount => &mut self.amount,
            FormField::Date => &mut self.date,
            FormField::Comment => &mut self.comment,
        }
    }

    pub(crate) fn next_field(&mut self) {
        let fields = FormField::all();
        let idx = fields.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = fields[(idx + 1) % fields.len()];
    }

    pub(crate) fn prev_field(&mut self) {
        let fields = FormField::all();
        let idx = fields.iter().position(|f| *f == self.field).unwrap_or(0);
        self.field = fields[(idx + fields.len() - 1) % fields.len()];
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingAction {
    DeleteExpense { pk: i64, label: String },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,

    // Form
    pub(crate) form: ExpenseForm,

    // Expenses
    pub(crate) expenses: Vec<Expense>,
    pub(crate) expense_index: usize,
    pub(crate) expense_scroll: usize,

    // Categories; `category_tree` is the display order as `(depth, category)`
    pub(crate) categories: Vec<Category>,
    pub(crate) category_tree: Vec<(usize, Category)>,
    pub(crate) category_index: usize,
    pub(crate) category_scroll: usize,

    // Summary
    pub(crate) totals: Totals,
    pub(crate) budget_usage: Vec<BudgetUsage>,
    pub(crate) spending_by_category: Vec<(String, Decimal)>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            running: true,
            screen: Screen::Expenses,
            input_mode: InputMode::Normal,
            status_message: String::new(),
            show_help: false,

            form: ExpenseForm::new(),

            expenses: Vec::new(),
            expense_index: 0,
            expense_scroll: 0,

            categories: Vec::new(),
            category_tree: Vec::new(),
            category_index: 0,
            category_scroll: 0,

            totals: Totals::default(),
            budget_usage: Vec::new(),
            spending_by_category: Vec::new(),

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn refresh_expenses(&mut self, ledger: &Ledger<'_>) -> Result<()> {
        self.expenses = ledger.expenses()?;
        if self.expense_index >= self.expenses.len() {
            self.expense_index = self.expenses.len().saturating_sub(1);
        }
        self.expense_scroll = self.expense_scroll.min(self.expense_index);
        Ok(())
    }

    pub(crate) fn refresh_categories(&mut self, ledger: &Ledger<'_>) -> Result<()> {
        self.categories = ledger.categories()?;
        self.category_tree = Category::outline(&self.categories)
            .into_iter()
            .map(|(depth, cat)| (depth, cat.clone()))
            .collect();
        if self.category_index >= self.category_tree.len() {
            self.category_index = self.category_tree.len().saturating_sub(1);
        }
        Ok(())
    }

    pub(crate) fn refresh_summary(&mut self, ledger: &Ledger<'_>) -> Result<()> {
        let today = models::today();
        let repo = ledger.expenses.as_ref();
        self.totals = Totals::for_day(repo, today)?;
        self.budget_usage = report::budget_usage(ledger.budgets.as_ref(), repo, today)?;

        let month = report::Period::month(today.year(), today.month())?;
        let mut spending: Vec<(String, Decimal)> =
            report::totals_by_category(&report::expenses_in(repo, &month)?)
                .into_iter()
                .map(|(pk, amount)| (self.category_name(pk), amount))
                .collect();
        spending.sort_by(|a, b| b.1.cmp(&a.1));
        self.spending_by_category = spending;
        Ok(())
    }

    pub(crate) fn refresh_all(&mut self, ledger: &Ledger<'_>) -> Result<()> {
        self.refresh_categories(ledger)?;
        self.refresh_expenses(ledger)?;
        self.refresh_summary(ledger)?;
        Ok(())
    }

    pub(crate) fn category_name(&self, pk: i64) -> String {
        Category::find_by_id(&self.categories, pk)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("#{pk}"))
    }

    pub(crate) fn selected_expense(&self) -> Option<&Expense> {
        self.expenses.get(self.expense_index)
    }

    pub(crate) fn open_form(&mut self) {
        self.form = ExpenseForm::new();
        if self.screen == Screen::Categories {
            if let Some((_, cat)) = self.category_tree.get(self.category_index) {
                self.form.category = cat.name.clone();
                self.form.field = FormField::Amount;
            }
        }
        self.input_mode = InputMode::Editing;
    }

    /// Replace the category field with the next or previous known category.
    pub(crate) fn cycle_form_category(&mut self, delta: isize) {
        if self.category_tree.is_empty() {
            return;
        }
        let len = self.category_tree.len() as isize;
        let typed = self.form.category.trim().to_lowercase();
        let current = self
            .category_tree
            .iter()
            .position(|(_, c)| c.name.to_lowercase() == typed);
        let next = match current {
            Some(idx) => (idx as isize + delta).rem_euclid(len),
            None if delta < 0 => len - 1,
            None => 0,
        };
        if let Some((_, cat)) = self.category_tree.get(next as usize) {
            self.form.category = cat.name.clone();
        }
    }

    /// Record the form contents. Input mistakes end up in the status line and
    /// keep the form open.
    pub(crate) fn submit_form(&mut self, ledger: &mut Ledger<'_>) -> Result<()> {
        let amount = match parse_amount(&self.form.amount) {
            Ok(a) => a,
            Err(e) => {
                self.form.field = FormField::Amount;
                self.set_status(format!("{e:#}"));
                return Ok(());
            }
        };
        let date = match parse_timestamp(&self.form.date) {
            Ok(d) => d,
            Err(e) => {
                self.form.field = FormField::Date;
                self.set_status(format!("{e:#}"));
                return Ok(());
            }
        };
        let comment = self.form.comment.trim().to_string();
        let exp = match ledger.record_expense(&self.form.category, amount, date, &comment) {
            Ok(exp) => exp,
            Err(crate::error::Error::Storage(e)) => return Err(e.into()),
            Err(e) => {
                self.form.field = FormField::Category;
                self.set_status(format!("Error: {e}"));
                return Ok(());
            }
        };

        self.refresh_expenses(ledger)?;
        self.refresh_summary(ledger)?;
        if let Some(pos) = self.expenses.iter().position(|e| e.pk == exp.pk) {
            self.expense_index = pos;
        }
        self.input_mode = InputMode::Normal;
        self.set_status(format!(
            "Recorded #{}: {} {}",
            exp.pk.unwrap_or(0),
            self.category_name(exp.category),
            exp.amount
        ));
        Ok(())
    }

    pub(crate) fn request_delete(&mut self) {
        let Some(exp) = self.selected_expense() else {
            self.set_status("No expense selected");
            return;
        };
        let Some(pk) = exp.pk else {
            return;
        };
        let label = format!(
            "#{pk} {} {}",
            self.category_name(exp.category),
            exp.amount
        );
        self.confirm_message = format!("Delete expense {label}?");
        self.pending_action = Some(PendingAction::DeleteExpense { pk, label });
        self.input_mode = InputMode::Confirm;
    }

    pub(crate) fn confirm(&mut self, ledger: &mut Ledger<'_>) -> Result<()> {
        if let Some(PendingAction::DeleteExpense { pk, label }) = self.pending_action.take() {
            ledger.delete_expense(pk)?;
            self.refresh_expenses(ledger)?;
            self.refresh_summary(ledger)?;
            self.set_status(format!("Deleted: {label}"));
        }
        self.input_mode = InputMode::Normal;
        self.confirm_message.clear();
        Ok(())
    }

    pub(crate) fn cancel_confirm(&mut self) {
        self.pending_action = None;
        self.input_mode = InputMode::Normal;
        self.confirm_message.clear();
        self.set_status("Cancelled");
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod app_tests;
