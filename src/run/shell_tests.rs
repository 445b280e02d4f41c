#![allow(clippy::unwrap_used)]

use chrono::NaiveDateTime;
use rust_decimal_macros::dec;

use super::*;
use crate::repository::Store;

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn seeded_session() -> Session<'static> {
    let mut ledger = Ledger::in_memory();
    ledger.seed_default_categories().unwrap();
    Session::new(ledger)
}

fn run_script(session: &mut Session<'_>, script: &str) -> String {
    let mut out = Vec::new();
    run(session, script.as_bytes(), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_bare_amount_records_and_day_sums() {
    let mut session = seeded_session();
    let out = run_script(&mut session, "100 sweets\n200 sweets\n300 books\nday\n");
    assert!(out.contains("Total: 600.00"));
    assert_eq!(session.ledger.expenses().unwrap().len(), 3);
}

#[test]
fn test_add_command_with_multiword_category() {
    let mut session = seeded_session();
    let out = run_script(&mut session, "add 42.50 raw meat\n");
    assert!(out.contains("raw meat"));
    assert!(out.contains("42.50"));
}

#[test]
fn test_unknown_category_reports_and_continues() {
    let mut session = seeded_session();
    let out = run_script(&mut session, "5 yachts\n5 books\n");
    assert!(out.contains("Error: category 'yachts' not found"));
    assert_eq!(session.ledger.expenses().unwrap().len(), 1);
}

#[test]
fn test_quit_stops_reading() {
    let mut session = seeded_session();
    run_script(&mut session, "quit\n250 sweets\n");
    assert!(!session.running);
    assert!(session.ledger.expenses().unwrap().is_empty());
}

#[test]
fn test_eof_ends_session() {
    let mut session = seeded_session();
    let out = run_script(&mut session, "");
    assert_eq!(out, "$> \n");
}

#[test]
fn test_categories_outline() {
    let mut session = seeded_session();
    let out = run_script(&mut session, "categories\n");
    assert!(out.contains("  groceries\n"));
    assert!(out.contains("        raw meat\n"));
    assert!(out.contains("  clothes\n"));
}

#[test]
fn test_categories_branch() {
    let mut session = seeded_session();
    let out = run_script(&mut session, "categories raw meat\n");
    assert!(out.contains("Path: groceries > meat > raw meat\n"));

    let out = run_script(&mut session, "categories meat\n");
    assert!(out.contains("Path: groceries > meat\n"));
    assert!(out.contains("  meat\n"));
    assert!(out.contains("      meat products\n"));
    assert!(!out.contains("sweets"));
}

#[test]
fn test_short_aliases() {
    let mut session = seeded_session();
    let out = run_script(&mut session, "h\n7 books\nexpenses\nq\n8 books\n");
    assert!(out.contains("Show available commands"));
    assert!(out.contains("Total: 7.00"));
    assert_eq!(session.ledger.expenses().unwrap().len(), 1);
}

#[test]
fn test_command_names_are_english() {
    let mut session = seeded_session();
    let out = run_script(&mut session, "категории\n");
    assert!(out.contains("Unknown command: категории"));
    assert!(COMMANDS.keys().all(|name| name.is_ascii()));
    assert!(session.ledger.resolve_category("groceries").is_ok());
}

#[test]
fn test_month_and_year_queries() {
    let mut session = seeded_session();
    session
        .ledger
        .record_expense("books", dec!(10), at("2024-05-01 00:00:00"), "")
        .unwrap();
    session
        .ledger
        .record_expense("books", dec!(20), at("2024-05-31 23:59:59"), "")
        .unwrap();
    session
        .ledger
        .record_expense("books", dec!(40), at("2024-06-01 00:00:00"), "")
        .unwrap();

    let out = run_script(&mut session, "month 2024-05\n");
    assert!(out.contains("Total: 30.00"));
    let out = run_script(&mut session, "year 2024\n");
    assert!(out.contains("Total: 70.00"));
    let out = run_script(&mut session, "week 2024-05-29\n");
    assert!(out.contains("Total: 60.00"));
    let out = run_script(&mut session, "day 2023-01-01\n");
    assert!(out.contains("No expenses"));
}

#[test]
fn test_amount_and_delete() {
    let mut session = seeded_session();
    let out = run_script(
        &mut session,
        "10 books\namount 1 99\ndelete 1\ndelete 1\namount 1 5\n",
    );
    assert!(out.contains("99.00"));
    assert!(out.contains("Deleted expense #1"));
    assert!(out.contains("No expense #1"));
    assert!(out.contains("Error: no stored expense with pk 1"));
}

#[test]
fn test_budget_and_listing() {
    let mut session = seeded_session();
    session
        .ledger
        .record_expense("books", dec!(30), at("2024-05-10 12:00:00"), "")
        .unwrap();
    let out = run_script(&mut session, "budget 100 2024-05-01 2024-05-31\nbudgets\n");
    assert!(out.contains("Budget #1 set: 100.00 from 2024-05-01 to 2024-05-31"));
    assert!(out.contains("30.00 / 100.00"));

    let out = run_script(&mut session, "unbudget 1\nunbudget 1\nbudgets\n");
    assert!(out.contains("Removed budget #1"));
    assert!(out.contains("No budget #1"));
    assert!(out.contains("No budgets"));
}

#[test]
fn test_bad_input_reported() {
    let mut session = seeded_session();
    let out = run_script(&mut session, "day 10/05/2024\nbudget 1 2\nadd 5\n");
    assert!(out.contains("Error: Invalid date '10/05/2024'"));
    assert!(out.contains("Usage: budget"));
    assert!(out.contains("Usage: add"));
}

#[test]
fn test_unknown_command_suggests() {
    let mut session = seeded_session();
    let out = run_script(&mut session, "mnth\n");
    assert!(out.contains("Unknown command: mnth. Did you mean month?"));
}

#[test]
fn test_help_lists_commands_once() {
    let mut session = seeded_session();
    let out = run_script(&mut session, "help\n");
    assert!(out.contains("  add "));
    assert!(out.contains("  quit "));
    assert!(!out.contains("  q "));
    assert!(!out.contains("категории"));
}

#[test]
fn test_shell_over_sqlite_store() {
    let store = Store::open_in_memory().unwrap();
    let mut ledger = Ledger::on_store(&store);
    ledger.seed_default_categories().unwrap();
    let mut session = Session::new(ledger);
    let out = run_script(&mut session, "15 clothes\nexpenses\n");
    assert!(out.contains("clothes"));
    assert!(out.contains("Total: 15.00"));
}
