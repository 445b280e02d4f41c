#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn test_finish_keeps_run_error_over_close_error() {
    let run = Err(anyhow::anyhow!("form failed"));
    let closed = Err(anyhow::anyhow!("close failed"));
    let err = finish(run, closed).unwrap_err();
    assert_eq!(err.to_string(), "form failed");
}

#[test]
fn test_finish_reports_close_error_after_clean_run() {
    let err = finish(Ok(()), Err(anyhow::anyhow!("close failed"))).unwrap_err();
    assert_eq!(err.to_string(), "close failed");
    assert!(finish(Ok(()), Ok(())).is_ok());
}
