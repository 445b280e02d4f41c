#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::*;

fn config_with(vars: &[(&str, &str)]) -> Config {
    let env: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(Path::new("/data/bookkeeper"), |key| env.get(key).cloned())
}

#[test]
fn test_defaults_use_data_dir() {
    let config = config_with(&[]);
    assert_eq!(config.db_path, PathBuf::from("/data/bookkeeper/bookkeeper.db"));
    assert_eq!(config.log_path, PathBuf::from("/data/bookkeeper/bookkeeper.log"));
    assert_eq!(config.log_filter, "info");
}

#[test]
fn test_db_override_moves_log_alongside() {
    let config = config_with(&[(DB_ENV, "/tmp/books/mine.db")]);
    assert_eq!(config.db_path, PathBuf::from("/tmp/books/mine.db"));
    assert_eq!(config.log_path, PathBuf::from("/tmp/books/bookkeeper.log"));
}

#[test]
fn test_blank_values_ignored() {
    let config = config_with(&[(DB_ENV, "  "), (LOG_ENV, "")]);
    assert_eq!(config, config_with(&[]));
}

#[test]
fn test_log_filter_override() {
    let config = config_with(&[(LOG_ENV, "bookkeeper=debug")]);
    assert_eq!(config.log_filter, "bookkeeper=debug");
}
