use super::*;

#[test]
fn test_upsert_inserts_new_label() {
    let mut log = JobLog::new();
    log.upsert("a.png", LogStatus::Processing, None);
    log.upsert("b.png", LogStatus::Processing, None);

    assert_eq!(log.len(), 2);
    assert_eq!(log.entries()[0].label, "a.png");
    assert_eq!(log.entries()[1].label, "b.png");
}

#[test]
fn test_upsert_updates_in_place() {
    let mut log = JobLog::new();
    log.upsert("a.png", LogStatus::Processing, None);
    log.upsert("b.png", LogStatus::Processing, None);
    log.upsert("a.png", LogStatus::Failed, Some("boom".to_string()));

    assert_eq!(log.len(), 2);
    let first = &log.entries()[0];
    assert_eq!(first.label, "a.png");
    assert_eq!(first.status, LogStatus::Failed);
    assert_eq!(first.error.as_deref(), Some("boom"));
}

#[test]
fn test_upsert_clears_previous_error() {
    let mut log = JobLog::new();
    log.upsert("Setup", LogStatus::Failed, Some("nope".to_string()));
    log.upsert("Setup", LogStatus::Completed, None);

    assert!(log.get("Setup").unwrap().error.is_none());
}

#[test]
fn test_count_by_status() {
    let mut log = JobLog::new();
    log.upsert("a", LogStatus::Completed, None);
    log.upsert("b", LogStatus::Failed, Some("x".to_string()));
    log.upsert("c", LogStatus::Completed, None);

    assert_eq!(log.count(LogStatus::Completed), 2);
    assert_eq!(log.count(LogStatus::Failed), 1);
    assert_eq!(log.count(LogStatus::Pending), 0);
}

#[test]
fn test_status_is_final() {
    assert!(LogStatus::Completed.is_final());
    assert!(LogStatus::Failed.is_final());
    assert!(!LogStatus::Processing.is_final());
    assert!(!LogStatus::Pending.is_final());
}

#[test]
fn test_log_serializes_as_array() {
    let mut log = JobLog::new();
    log.upsert("a", LogStatus::Completed, None);

    let json = serde_json::to_value(&log).unwrap();
    assert!(json.is_array());
    assert_eq!(json[0]["status"], "completed");
    assert!(json[0].get("error").is_none());
}
