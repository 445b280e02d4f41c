#![allow(clippy::unwrap_used)]

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rust_decimal_macros::dec;

use super::*;
use crate::error::Error;
use crate::repository::{Entity, MemoryRepository, Repository, Value};

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ── Expense ───────────────────────────────────────────────────

#[test]
fn test_expense_new_defaults() {
    let exp = Expense::new(dec!(12.50), 3, at("2024-03-01 10:00:00"));
    assert!(exp.pk.is_none());
    assert_eq!(exp.amount, dec!(12.50));
    assert_eq!(exp.category, 3);
    assert!(exp.comment.is_empty());
    assert_eq!(exp.added_date.nanosecond(), 0);
}

#[test]
fn test_expense_date_truncated_to_seconds() {
    let precise = at("2024-03-01 10:00:00") + chrono::Duration::milliseconds(750);
    let exp = Expense::new(dec!(1), 1, precise);
    assert_eq!(exp.expense_date, at("2024-03-01 10:00:00"));
}

#[test]
fn test_expense_negative_amount_invalid() {
    let exp = Expense::new(dec!(-0.01), 1, at("2024-03-01 10:00:00"));
    assert!(matches!(exp.validate(), Err(Error::InvalidEntity { .. })));
}

#[test]
fn test_expense_zero_amount_valid() {
    let exp = Expense::new(dec!(0), 1, at("2024-03-01 10:00:00"));
    assert!(exp.validate().is_ok());
}

#[test]
fn test_expense_missing_category_invalid() {
    let exp = Expense::new(dec!(5), 0, at("2024-03-01 10:00:00"));
    assert!(matches!(exp.validate(), Err(Error::InvalidEntity { .. })));
}

#[test]
fn test_expense_fields() {
    let exp = Expense::new(dec!(5), 2, at("2024-03-01 10:00:00")).with_comment("lunch");
    assert_eq!(exp.field("pk"), Some(Value::Null));
    assert_eq!(exp.field("amount"), Some(Value::Amount(dec!(5))));
    assert_eq!(exp.field("category"), Some(Value::Integer(2)));
    assert_eq!(exp.field("comment"), Some(Value::Text("lunch".into())));
    assert_eq!(exp.field("color"), None);
}

// ── Budget ────────────────────────────────────────────────────

#[test]
fn test_budget_covers_inclusive() {
    let budget = Budget::new(dec!(500), day("2024-01-01"), day("2024-01-31"));
    assert!(budget.covers(day("2024-01-01")));
    assert!(budget.covers(day("2024-01-31")));
    assert!(!budget.covers(day("2024-02-01")));
}

#[test]
fn test_budget_inverted_period_invalid() {
    let budget = Budget::new(dec!(500), day("2024-02-01"), day("2024-01-01"));
    assert!(matches!(budget.validate(), Err(Error::InvalidEntity { .. })));
}

#[test]
fn test_budget_negative_limit_invalid() {
    let budget = Budget::new(dec!(-1), day("2024-01-01"), day("2024-01-31"));
    assert!(budget.validate().is_err());
}

// ── Category ──────────────────────────────────────────────────

#[test]
fn test_category_new() {
    let cat = Category::new("Food", None);
    assert!(cat.pk.is_none());
    assert_eq!(cat.name, "Food");
    assert!(cat.parent.is_none());
}

#[test]
fn test_category_display() {
    let cat = Category::new("Groceries", None);
    assert_eq!(format!("{cat}"), "Groceries");
}

#[test]
fn test_category_blank_name_invalid() {
    assert!(Category::new("   ", None).validate().is_err());
}

#[test]
fn test_category_bad_parent_invalid() {
    assert!(Category::new("meat", Some(0)).validate().is_err());
    let mut own = Category::new("loop", Some(4));
    own.pk = Some(4);
    assert!(own.validate().is_err());
}

#[test]
fn test_find_by_name_case_insensitive() {
    let mut cats = vec![Category::new("Books", None), Category::new("Clothes", None)];
    cats[1].pk = Some(2);
    assert_eq!(Category::find_by_name(&cats, "clothes").unwrap().pk, Some(2));
    assert!(Category::find_by_name(&cats, "food").is_none());
    assert!(Category::find_by_id(&cats, 2).is_some());
}

// ── Category tree ─────────────────────────────────────────────

const TREE: &str = "
groceries
    meat
        raw meat
        meat products
    sweets
books
clothes
";

fn tree_repo() -> MemoryRepository<Category> {
    let mut repo = MemoryRepository::<Category>::new();
    let tree = read_tree(TREE.lines()).unwrap();
    Category::create_from_tree(&tree, &mut repo).unwrap();
    repo
}

fn by_name(repo: &MemoryRepository<Category>, name: &str) -> Category {
    repo.get_all(&[("name", name)].into_iter().collect())
        .unwrap()
        .remove(0)
}

#[test]
fn test_read_tree_pairs() {
    let tree = read_tree(TREE.lines()).unwrap();
    assert_eq!(
        tree,
        vec![
            ("groceries".to_string(), None),
            ("meat".to_string(), Some("groceries".to_string())),
            ("raw meat".to_string(), Some("meat".to_string())),
            ("meat products".to_string(), Some("meat".to_string())),
            ("sweets".to_string(), Some("groceries".to_string())),
            ("books".to_string(), None),
            ("clothes".to_string(), None),
        ]
    );
}

#[test]
fn test_read_tree_bad_unindent() {
    let lines = ["a", "    b", "  c"];
    match read_tree(lines) {
        Err(Error::Indentation { line }) => assert_eq!(line, 3),
        other => panic!("expected indentation error, got {other:?}"),
    }
}

#[test]
fn test_read_tree_empty() {
    assert!(read_tree(["", "   "]).unwrap().is_empty());
}

#[test]
fn test_create_from_tree_links_parents() {
    let repo = tree_repo();
    let meat = by_name(&repo, "meat");
    let groceries = by_name(&repo, "groceries");
    assert_eq!(meat.parent, groceries.pk);
    assert_eq!(repo.all().unwrap().len(), 7);
}

#[test]
fn test_create_from_tree_unknown_parent() {
    let mut repo = MemoryRepository::<Category>::new();
    let tree = vec![("orphan".to_string(), Some("nobody".to_string()))];
    assert!(matches!(
        Category::create_from_tree(&tree, &mut repo),
        Err(Error::InvalidEntity { .. })
    ));
}

#[test]
fn test_get_parent_and_all_parents() {
    let repo = tree_repo();
    let raw = by_name(&repo, "raw meat");
    assert_eq!(raw.get_parent(&repo).unwrap().unwrap().name, "meat");
    let names: Vec<String> = raw
        .get_all_parents(&repo)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["meat", "groceries"]);
    assert!(by_name(&repo, "books").get_parent(&repo).unwrap().is_none());
}

#[test]
fn test_get_all_parents_stops_on_cycle() {
    let mut repo = MemoryRepository::<Category>::new();
    let mut a = Category::new("a", None);
    repo.add(&mut a).unwrap();
    let mut b = Category::new("b", a.pk);
    repo.add(&mut b).unwrap();
    a.parent = b.pk;
    repo.update(&a).unwrap();
    assert_eq!(b.get_all_parents(&repo).unwrap().len(), 1);
}

#[test]
fn test_get_subcategories() {
    let repo = tree_repo();
    let names: Vec<String> = by_name(&repo, "groceries")
        .get_subcategories(&repo)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["meat", "sweets", "raw meat", "meat products"]);
    assert!(by_name(&repo, "books")
        .get_subcategories(&repo)
        .unwrap()
        .is_empty());
}

#[test]
fn test_outline_order_and_depth() {
    let repo = tree_repo();
    let all = repo.all().unwrap();
    let outline: Vec<(usize, &str)> = Category::outline(&all)
        .into_iter()
        .map(|(depth, c)| (depth, c.name.as_str()))
        .collect();
    assert_eq!(
        outline,
        vec![
            (0, "groceries"),
            (1, "meat"),
            (2, "raw meat"),
            (2, "meat products"),
            (1, "sweets"),
            (0, "books"),
            (0, "clothes"),
        ]
    );
}
