use anyhow::Result;
use chrono::Datelike;
use std::io::Write;
use std::path::PathBuf;

use super::input::{
    flag_value, parse_amount, parse_date, parse_month, parse_pk, parse_timestamp, parse_year,
    positional,
};
use super::shell::{self, describe, Session};
use crate::export;
use crate::ledger::Ledger;
use crate::models;
use crate::report::{self, Totals};
use crate::repository::Store;
use crate::ui::util::format_amount;

const ADD_USAGE: &str =
    "Usage: bookkeeper add <amount> <category> [--date <date>] [--comment <text>]";

pub(crate) fn as_cli(args: &[String], store: &Store) -> Result<()> {
    let mut out = std::io::stdout().lock();
    let rest = &args[2..];
    match args[1].as_str() {
        "add" | "a" => cli_add(rest, &mut Ledger::on_store(store), &mut out),
        "list" | "ls" => cli_list(rest, &Ledger::on_store(store), &mut out),
        "delete" | "rm" => cli_delete(rest, &mut Ledger::on_store(store), &mut out),
        "summary" | "s" => cli_summary(rest, &Ledger::on_store(store), &mut out),
        "categories" => cli_categories(&Ledger::on_store(store), &mut out),
        "export" => cli_export(rest, &Ledger::on_store(store), &mut out),
        "shell" => cli_shell(rest, store),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("bookkeeper {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Bookkeeper - local personal expense tracker");
    println!();
    println!("Usage: bookkeeper [command]");
    println!();
    println!("Commands:");
    println!("  (none)                        Launch the interactive form");
    println!("  add <amount> <category>       Record an expense");
    println!("    --date <YYYY-MM-DD [HH:MM]> When it was spent (default: now)");
    println!("    --comment <text>            Free-text note");
    println!("  list [all|day|week|month|year] [date]");
    println!("                                List expenses of a period (default: all)");
    println!("  delete <pk>                   Delete an expense");
    println!("  summary [YYYY-MM-DD]          Day/week/month totals and active budgets");
    println!("  categories                    Print the category tree");
    println!("  export [path]                 Export expenses to CSV");
    println!("    --month <YYYY-MM>           Only this month (default: everything)");
    println!("  shell [--db]                  Text command client (in-memory unless --db)");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

fn cli_add(args: &[String], ledger: &mut Ledger<'_>, out: &mut dyn Write) -> Result<()> {
    let words = positional(args, &["--date", "--comment"]);
    let [amount, category @ ..] = words.as_slice() else {
        anyhow::bail!(ADD_USAGE);
    };
    if category.is_empty() {
        anyhow::bail!(ADD_USAGE);
    }
    let amount = parse_amount(amount)?;
    let date = match flag_value(args, "--date") {
        Some(d) => parse_timestamp(d)?,
        None => models::now(),
    };
    let comment = flag_value(args, "--comment").unwrap_or("");

    let exp = ledger.record_expense(&category.join(" "), amount, date, comment)?;
    writeln!(out, "Recorded {}", describe(&exp, &ledger.categories()?))?;
    Ok(())
}

fn cli_list(args: &[String], ledger: &Ledger<'_>, out: &mut dyn Write) -> Result<()> {
    let period = args.first().map(String::as_str).unwrap_or("all");
    let arg = args.get(1).map(String::as_str);
    let repo = ledger.expenses.as_ref();
    let today = models::today();

    let expenses = match period {
        "all" => ledger.expenses()?,
        "day" => {
            let day = arg.map(parse_date).transpose()?.unwrap_or(today);
            report::expenses_by_day(repo, day)?
        }
        "week" => {
            let day = arg.map(parse_date).transpose()?.unwrap_or(today);
            report::expenses_by_week_of(repo, day)?
        }
        "month" => {
            let (year, month) = arg
                .map(parse_month)
                .transpose()?
                .unwrap_or((today.year(), today.month()));
            report::expenses_by_month(repo, year, month)?
        }
        "year" => {
            let year = arg.map(parse_year).transpose()?.unwrap_or(today.year());
            report::expenses_by_year(repo, year)?
        }
        other => anyhow::bail!("Unknown period: {other} (expected all, day, week, month or year)"),
    };

    if expenses.is_empty() {
        writeln!(out, "No expenses")?;
        return Ok(());
    }
    let categories = ledger.categories()?;
    for exp in &expenses {
        writeln!(out, "{}", describe(exp, &categories))?;
    }
    writeln!(out, "{}", "─".repeat(52))?;
    writeln!(out, "Total: {}", format_amount(report::total(&expenses)))?;
    Ok(())
}

fn cli_delete(args: &[String], ledger: &mut Ledger<'_>, out: &mut dyn Write) -> Result<()> {
    let Some(pk) = args.first() else {
        anyhow::bail!("Usage: bookkeeper delete <pk>");
    };
    let pk = parse_pk(pk)?;
    if ledger.expenses.get(pk)?.is_none() {
        anyhow::bail!("No expense #{pk}");
    }
    ledger.delete_expense(pk)?;
    writeln!(out, "Deleted expense #{pk}")?;
    Ok(())
}

fn cli_summary(args: &[String], ledger: &Ledger<'_>, out: &mut dyn Write) -> Result<()> {
    let day = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| parse_date(a))
        .transpose()?
        .unwrap_or_else(models::today);
    let totals = Totals::for_day(ledger.expenses.as_ref(), day)?;

    writeln!(out, "Bookkeeper - {day}")?;
    writeln!(out, "{}", "─".repeat(40))?;
    writeln!(out, "  Day:    {:>14}", format_amount(totals.day))?;
    writeln!(out, "  Week:   {:>14}", format_amount(totals.week))?;
    writeln!(out, "  Month:  {:>14}", format_amount(totals.month))?;

    let usage = report::budget_usage(ledger.budgets.as_ref(), ledger.expenses.as_ref(), day)?;
    if !usage.is_empty() {
        writeln!(out)?;
        writeln!(out, "Budgets:")?;
        for u in &usage {
            writeln!(
                out,
                "  {} .. {}  {:>12} / {:<12} {}",
                u.budget.start_date,
                u.budget.end_date,
                format_amount(u.spent),
                format_amount(u.budget.amount),
                if u.is_over() {
                    "OVER".to_string()
                } else {
                    format!("{} left", format_amount(u.remaining()))
                }
            )?;
        }
    }
    Ok(())
}

fn cli_categories(ledger: &Ledger<'_>, out: &mut dyn Write) -> Result<()> {
    shell::write_outline(&ledger.categories()?, out)
}

fn cli_export(args: &[String], ledger: &Ledger<'_>, out: &mut dyn Write) -> Result<()> {
    let month = flag_value(args, "--month").map(parse_month).transpose()?;
    let output_path = positional(args, &["--month"])
        .first()
        .map(|a| PathBuf::from(shellexpand(a)))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(export::default_file_name(month))
        });

    let count = export::export_to_csv(ledger, &output_path, month)?;
    if count == 0 {
        writeln!(out, "No expenses to export")?;
    } else {
        writeln!(out, "Exported {count} expenses to {}", output_path.display())?;
    }
    Ok(())
}

fn cli_shell(args: &[String], store: &Store) -> Result<()> {
    let ledger = if args.iter().any(|a| a == "--db") {
        Ledger::on_store(store)
    } else {
        let mut ledger = Ledger::in_memory();
        ledger.seed_default_categories()?;
        ledger
    };
    let mut session = Session::new(ledger);
    println!("Bookkeeper text client. Type 'help' for commands, 'quit' to leave.");
    shell::run(&mut session, std::io::stdin().lock(), std::io::stdout().lock())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod cli_tests;
