#![allow(clippy::unwrap_used)]

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal_macros::dec;

use super::*;
use crate::report;

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Run `check` against a memory-backed and a SQLite-backed ledger.
fn on_both(check: impl Fn(&mut Ledger<'_>)) {
    check(&mut Ledger::in_memory());
    let store = Store::open_in_memory().unwrap();
    check(&mut Ledger::on_store(&store));
}

#[test]
fn test_seed_creates_default_tree_once() {
    on_both(|ledger| {
        assert_eq!(ledger.seed_default_categories().unwrap(), 7);
        assert_eq!(ledger.seed_default_categories().unwrap(), 0);
        let meat = ledger.resolve_category("meat").unwrap();
        let groceries = meat.get_parent(ledger.categories.as_ref()).unwrap().unwrap();
        assert_eq!(groceries.name, "groceries");
        assert_eq!(ledger.categories().unwrap().len(), 7);
    });
}

#[test]
fn test_seed_skips_non_empty_collection() {
    on_both(|ledger| {
        ledger.categories.add(&mut Category::new("rent", None)).unwrap();
        assert_eq!(ledger.seed_default_categories().unwrap(), 0);
        assert_eq!(ledger.categories().unwrap().len(), 1);
    });
}

#[test]
fn test_resolve_category_by_pk_and_name() {
    on_both(|ledger| {
        ledger.seed_default_categories().unwrap();
        let books = ledger.resolve_category("books").unwrap();
        let pk = books.pk.unwrap();
        assert_eq!(ledger.resolve_category(&pk.to_string()).unwrap(), books);
        assert_eq!(ledger.resolve_category("  BOOKS ").unwrap(), books);
    });
}

#[test]
fn test_resolve_unknown_category() {
    on_both(|ledger| {
        ledger.seed_default_categories().unwrap();
        assert!(matches!(
            ledger.resolve_category("yachts"),
            Err(Error::UnknownCategory(name)) if name == "yachts"
        ));
        assert!(matches!(
            ledger.resolve_category("999"),
            Err(Error::UnknownCategory(_))
        ));
    });
}

#[test]
fn test_record_expense_links_category() {
    on_both(|ledger| {
        ledger.seed_default_categories().unwrap();
        let exp = ledger
            .record_expense("sweets", dec!(120.50), at("2024-05-10 12:00:00"), "cake")
            .unwrap();
        let sweets = ledger.resolve_category("sweets").unwrap();
        assert_eq!(Some(exp.category), sweets.pk);
        assert_eq!(exp.comment, "cake");
        assert_eq!(ledger.expenses.get(exp.pk.unwrap()).unwrap(), Some(exp));
    });
}

#[test]
fn test_record_expense_unknown_category_stores_nothing() {
    on_both(|ledger| {
        ledger.seed_default_categories().unwrap();
        let res = ledger.record_expense("yachts", dec!(1), at("2024-05-10 12:00:00"), "");
        assert!(matches!(res, Err(Error::UnknownCategory(_))));
        assert!(ledger.expenses().unwrap().is_empty());
    });
}

#[test]
fn test_record_negative_amount_rejected() {
    on_both(|ledger| {
        ledger.seed_default_categories().unwrap();
        let res = ledger.record_expense("books", dec!(-1), at("2024-05-10 12:00:00"), "");
        assert!(matches!(res, Err(Error::InvalidEntity { .. })));
    });
}

#[test]
fn test_change_amount() {
    on_both(|ledger| {
        ledger.seed_default_categories().unwrap();
        let exp = ledger
            .record_expense("books", dec!(10), at("2024-05-10 12:00:00"), "")
            .unwrap();
        let pk = exp.pk.unwrap();
        ledger.change_amount(pk, dec!(15)).unwrap();
        assert_eq!(ledger.expenses.get(pk).unwrap().unwrap().amount, dec!(15));
        assert!(matches!(
            ledger.change_amount(pk + 100, dec!(1)),
            Err(Error::InvalidKey { .. })
        ));
    });
}

#[test]
fn test_delete_expense() {
    on_both(|ledger| {
        ledger.seed_default_categories().unwrap();
        let exp = ledger
            .record_expense("books", dec!(10), at("2024-05-10 12:00:00"), "")
            .unwrap();
        ledger.delete_expense(exp.pk.unwrap()).unwrap();
        ledger.delete_expense(exp.pk.unwrap()).unwrap();
        assert!(ledger.expenses().unwrap().is_empty());
    });
}

#[test]
fn test_expenses_newest_first() {
    on_both(|ledger| {
        ledger.seed_default_categories().unwrap();
        for (amount, date) in [
            (dec!(1), "2024-05-01 10:00:00"),
            (dec!(3), "2024-05-20 10:00:00"),
            (dec!(2), "2024-05-10 10:00:00"),
        ] {
            ledger.record_expense("books", amount, at(date), "").unwrap();
        }
        let amounts: Vec<_> = ledger.expenses().unwrap().iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![dec!(3), dec!(2), dec!(1)]);
    });
}

#[test]
fn test_budget_round_trip_through_reports() {
    on_both(|ledger| {
        ledger.seed_default_categories().unwrap();
        let budget = ledger
            .set_budget(dec!(100), day("2024-05-01"), day("2024-05-31"))
            .unwrap();
        ledger
            .record_expense("books", dec!(40), at("2024-05-02 09:00:00"), "")
            .unwrap();
        let usage = report::budget_usage(
            ledger.budgets.as_ref(),
            ledger.expenses.as_ref(),
            day("2024-05-15"),
        )
        .unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].remaining(), dec!(60));

        ledger.delete_budget(budget.pk.unwrap()).unwrap();
        assert!(ledger.budgets.all().unwrap().is_empty());
    });
}

#[test]
fn test_inverted_budget_rejected() {
    on_both(|ledger| {
        let res = ledger.set_budget(dec!(1), day("2024-05-31"), day("2024-05-01"));
        assert!(matches!(res, Err(Error::InvalidEntity { .. })));
    });
}
