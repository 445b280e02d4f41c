use anyhow::Result;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::sync::LazyLock;

use chrono::Datelike;

use super::input::{parse_amount, parse_date, parse_month, parse_pk, parse_year};
use crate::ledger::Ledger;
use crate::models::{self, Category, Expense};
use crate::report::{self, Period, Totals};
use crate::ui::util::format_amount;

const PROMPT: &str = "$> ";

/// State of one text-client run.
pub(crate) struct Session<'a> {
    pub(crate) ledger: Ledger<'a>,
    pub(crate) running: bool,
}

impl<'a> Session<'a> {
    pub(crate) fn new(ledger: Ledger<'a>) -> Self {
        Self {
            ledger,
            running: true,
        }
    }
}

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut Session<'_>, &mut dyn Write) -> Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("quit", "Leave the client", cmd_quit, r);
    register_command!("q", "Leave the client", cmd_quit, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("categories", "List the category tree or one branch", cmd_categories, r);
    register_command!("expenses", "List all expenses, newest first", cmd_expenses, r);
    register_command!(
        "add",
        "Record an expense now (e.g. add 250 sweets, or just 250 sweets)",
        cmd_add,
        r
    );
    register_command!(
        "day",
        "Expenses of a day (e.g. day 2024-05-10, default today)",
        cmd_day,
        r
    );
    register_command!(
        "week",
        "Expenses of the Monday-Sunday week containing a day (default today)",
        cmd_week,
        r
    );
    register_command!(
        "month",
        "Expenses of a month (e.g. month 2024-05, default current)",
        cmd_month,
        r
    );
    register_command!(
        "year",
        "Expenses of a year (e.g. year 2024, default current)",
        cmd_year,
        r
    );
    register_command!("summary", "Totals for today, this week and this month", cmd_summary, r);
    register_command!(
        "amount",
        "Change the amount of an expense (e.g. amount 3 120.50)",
        cmd_amount,
        r
    );
    register_command!("delete", "Delete an expense (e.g. delete 3)", cmd_delete, r);
    register_command!(
        "budget",
        "Set a budget (e.g. budget 5000 2024-05-01 2024-05-31)",
        cmd_budget,
        r
    );
    register_command!("budgets", "List budgets with the amount spent", cmd_budgets, r);
    register_command!("unbudget", "Remove a budget (e.g. unbudget 2)", cmd_unbudget, r);

    r
});

/// Read commands from `input` until EOF or `quit`.
pub(crate) fn run<R: BufRead, W: Write>(
    session: &mut Session<'_>,
    input: R,
    mut out: W,
) -> Result<()> {
    let mut lines = input.lines();
    while session.running {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Err(e) = handle_line(&line, session, &mut out) {
            tracing::debug!(error = %e, line = line.trim(), "command failed");
            writeln!(out, "Error: {e:#}")?;
        }
    }
    Ok(())
}

pub(crate) fn handle_line(
    line: &str,
    session: &mut Session<'_>,
    out: &mut dyn Write,
) -> Result<()> {
    let trimmed = line.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(name) {
        return (cmd.run)(args, session, out);
    }
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        return cmd_add(trimmed, session, out);
    }
    writeln!(
        out,
        "Unknown command: {name}. Did you mean {}?",
        find_closest(name)
    )?;
    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1 && k.is_ascii())
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// One listing line for an expense.
pub(crate) fn describe(exp: &Expense, categories: &[Category]) -> String {
    let category = Category::find_by_id(categories, exp.category)
        .map(|c| c.name.as_str())
        .unwrap_or("?");
    let mut line = format!(
        "#{:<4} {}  {:<16} {:>12}",
        exp.pk.unwrap_or(0),
        exp.expense_date.format("%Y-%m-%d %H:%M"),
        category,
        format_amount(exp.amount)
    );
    if !exp.comment.is_empty() {
        line.push_str("  ");
        line.push_str(&exp.comment);
    }
    line
}

/// Category tree, one category per line, indented by depth.
pub(crate) fn write_outline(categories: &[Category], out: &mut dyn Write) -> Result<()> {
    if categories.is_empty() {
        writeln!(out, "No categories")?;
        return Ok(());
    }
    for (depth, cat) in Category::outline(categories) {
        writeln!(
            out,
            "{:>4}  {}{}",
            cat.pk.unwrap_or(0),
            "    ".repeat(depth),
            cat.name
        )?;
    }
    Ok(())
}

fn print_expenses(expenses: &[Expense], session: &Session<'_>, out: &mut dyn Write) -> Result<()> {
    if expenses.is_empty() {
        writeln!(out, "No expenses")?;
        return Ok(());
    }
    let categories = session.ledger.categories()?;
    for exp in expenses {
        writeln!(out, "{}", describe(exp, &categories))?;
    }
    writeln!(out, "Total: {}", format_amount(report::total(expenses)))?;
    Ok(())
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, session: &mut Session<'_>, _out: &mut dyn Write) -> Result<()> {
    session.running = false;
    Ok(())
}

fn cmd_help(_args: &str, _session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    let mut lines: Vec<(&str, &str)> = Vec::new();
    let mut names: Vec<&&str> = COMMANDS.keys().collect();
    names.sort_by_key(|n| (n.len() <= 2, **n));
    for name in names {
        if let Some(cmd) = COMMANDS.get(*name) {
            if seen.insert(cmd.description) {
                lines.push((*name, cmd.description));
            }
        }
    }
    lines.sort_by_key(|(name, _)| *name);
    for (name, desc) in lines {
        writeln!(out, "  {name:<12} {desc}")?;
    }
    writeln!(out, "  <amount> <category>  Shorthand for add")?;
    Ok(())
}

fn cmd_categories(args: &str, session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    if args.is_empty() {
        return write_outline(&session.ledger.categories()?, out);
    }
    let cat = session.ledger.resolve_category(args)?;
    let repo = session.ledger.categories.as_ref();
    let mut path: Vec<String> = cat
        .get_all_parents(repo)?
        .into_iter()
        .rev()
        .map(|c| c.name)
        .collect();
    path.push(cat.name.clone());
    writeln!(out, "Path: {}", path.join(" > "))?;

    let mut branch = vec![cat.clone()];
    branch.extend(cat.get_subcategories(repo)?);
    write_outline(&branch, out)
}

fn cmd_expenses(_args: &str, session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    let expenses = session.ledger.expenses()?;
    print_expenses(&expenses, session, out)
}

fn cmd_add(args: &str, session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    let Some((amount, category)) = args.split_once(char::is_whitespace) else {
        writeln!(out, "Usage: add <amount> <category>")?;
        return Ok(());
    };
    let amount = parse_amount(amount)?;
    let exp = session
        .ledger
        .record_expense(category.trim(), amount, models::now(), "")?;
    let categories = session.ledger.categories()?;
    writeln!(out, "{}", describe(&exp, &categories))?;
    Ok(())
}

fn cmd_day(args: &str, session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    let day = if args.is_empty() {
        models::today()
    } else {
        parse_date(args)?
    };
    let expenses = report::expenses_by_day(session.ledger.expenses.as_ref(), day)?;
    print_expenses(&expenses, session, out)
}

fn cmd_week(args: &str, session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    let expenses = if args.is_empty() {
        report::expenses_by_week(session.ledger.expenses.as_ref())?
    } else {
        report::expenses_by_week_of(session.ledger.expenses.as_ref(), parse_date(args)?)?
    };
    print_expenses(&expenses, session, out)
}

fn cmd_month(args: &str, session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    let (year, month) = if args.is_empty() {
        let today = models::today();
        (today.year(), today.month())
    } else {
        parse_month(args)?
    };
    let expenses = report::expenses_by_month(session.ledger.expenses.as_ref(), year, month)?;
    print_expenses(&expenses, session, out)
}

fn cmd_year(args: &str, session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    let year = if args.is_empty() {
        models::today().year()
    } else {
        parse_year(args)?
    };
    let expenses = report::expenses_by_year(session.ledger.expenses.as_ref(), year)?;
    print_expenses(&expenses, session, out)
}

fn cmd_summary(_args: &str, session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    let totals = Totals::for_day(session.ledger.expenses.as_ref(), models::today())?;
    writeln!(out, "Day:   {:>12}", format_amount(totals.day))?;
    writeln!(out, "Week:  {:>12}", format_amount(totals.week))?;
    writeln!(out, "Month: {:>12}", format_amount(totals.month))?;
    Ok(())
}

fn cmd_amount(args: &str, session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    let Some((pk, amount)) = args.split_once(char::is_whitespace) else {
        writeln!(out, "Usage: amount <pk> <value>")?;
        return Ok(());
    };
    let exp = session
        .ledger
        .change_amount(parse_pk(pk)?, parse_amount(amount)?)?;
    let categories = session.ledger.categories()?;
    writeln!(out, "{}", describe(&exp, &categories))?;
    Ok(())
}

fn cmd_delete(args: &str, session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    if args.is_empty() {
        writeln!(out, "Usage: delete <pk>")?;
        return Ok(());
    }
    let pk = parse_pk(args)?;
    if session.ledger.expenses.get(pk)?.is_none() {
        writeln!(out, "No expense #{pk}")?;
        return Ok(());
    }
    session.ledger.delete_expense(pk)?;
    writeln!(out, "Deleted expense #{pk}")?;
    Ok(())
}

fn cmd_budget(args: &str, session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let [amount, from, to] = parts.as_slice() else {
        writeln!(out, "Usage: budget <amount> <from YYYY-MM-DD> <to YYYY-MM-DD>")?;
        return Ok(());
    };
    let budget = session
        .ledger
        .set_budget(parse_amount(amount)?, parse_date(from)?, parse_date(to)?)?;
    writeln!(
        out,
        "Budget #{} set: {} from {} to {}",
        budget.pk.unwrap_or(0),
        format_amount(budget.amount),
        budget.start_date,
        budget.end_date
    )?;
    Ok(())
}

fn cmd_budgets(_args: &str, session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    let budgets = session.ledger.budgets.all()?;
    if budgets.is_empty() {
        writeln!(out, "No budgets")?;
        return Ok(());
    }
    let today = models::today();
    for budget in budgets {
        let period = Period::span(budget.start_date, budget.end_date)?;
        let spent = report::total(&report::expenses_in(
            session.ledger.expenses.as_ref(),
            &period,
        )?);
        writeln!(
            out,
            "#{:<4} {} .. {}  {:>12} / {:<12}{}",
            budget.pk.unwrap_or(0),
            budget.start_date,
            budget.end_date,
            format_amount(spent),
            format_amount(budget.amount),
            if budget.covers(today) { " (active)" } else { "" }
        )?;
    }
    Ok(())
}

fn cmd_unbudget(args: &str, session: &mut Session<'_>, out: &mut dyn Write) -> Result<()> {
    if args.is_empty() {
        writeln!(out, "Usage: unbudget <pk>")?;
        return Ok(());
    }
    let pk = parse_pk(args)?;
    if session.ledger.budgets.get(pk)?.is_none() {
        writeln!(out, "No budget #{pk}")?;
        return Ok(());
    }
    session.ledger.delete_budget(pk)?;
    writeln!(out, "Removed budget #{pk}")?;
    Ok(())
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod shell_tests;
