//! Tests for persisted media state.

use super::*;
use std::sync::Arc;

use automator_protocols::{AspectRatio, ImagePayload, LogStatus};
use tempfile::TempDir;

use crate::job::JobCell;

fn media_state(items: Vec<QueueItem>, phase: JobPhase, cursor: usize) -> PersistedMediaState {
    let cell = JobCell::new(MediaWork::default());
    cell.update(|s| {
        s.work = MediaWork {
            items,
            config: MediaRunConfig {
                aspect_ratio: AspectRatio::Square,
                output_folder: "clips".to_string(),
            },
        };
        s.phase = phase;
        s.cursor = cursor;
        s.tab = Some(TabRef::new("T1"));
        s.log.upsert("a.png", LogStatus::Completed, None);
    });
    cell.read(PersistedMediaState::capture)
}

fn file_items() -> Vec<QueueItem> {
    vec![
        QueueItem::from_path(0, "/images/a.png"),
        QueueItem::from_path(1, "/images/b.png"),
    ]
}

#[test]
fn test_capture_excludes_inline_payloads() {
    let items = vec![
        QueueItem::from_path(0, "/images/a.png"),
        QueueItem::new(1, "b.png", ImagePayload::DataUrl("data:image/png;base64,AAAA".to_string())),
    ];
    let state = media_state(items, JobPhase::Running, 1);

    assert_eq!(state.items.len(), 1);
    assert_eq!(state.inline_items, 1);
    assert!(!state.is_resumable());
    assert_eq!(state.restored_phase(), JobPhase::Stopped);

    let json = serde_json::to_string(&state).unwrap();
    assert!(!json.contains("base64"));
}

#[test]
fn test_processing_file_backed_run_restores_paused() {
    let state = media_state(file_items(), JobPhase::Running, 1);
    assert!(state.is_resumable());
    assert_eq!(state.restored_phase(), JobPhase::Paused);

    let cell = JobCell::new(MediaWork::default());
    cell.update(|s| state.restore_into(s));
    cell.read(|s| {
        assert_eq!(s.phase, JobPhase::Paused);
        assert_eq!(s.cursor, 1);
        assert_eq!(s.work.items.len(), 2);
        assert_eq!(s.work.config.output_folder, "clips");
        assert_eq!(s.log.len(), 1);
        assert!(s.artifacts.is_empty());
    });
}

#[test]
fn test_finished_run_keeps_its_phase() {
    let state = media_state(file_items(), JobPhase::Completed, 0);
    assert_eq!(state.restored_phase(), JobPhase::Completed);
}

#[test]
fn test_unresumable_run_restores_stopped_at_zero() {
    let state = media_state(Vec::new(), JobPhase::Paused, 0);
    let cell = JobCell::new(MediaWork::default());
    cell.update(|s| state.restore_into(s));
    cell.read(|s| {
        assert_eq!(s.phase, JobPhase::Stopped);
        assert_eq!(s.cursor, 0);
    });
}

#[tokio::test]
async fn test_memory_store_save_load_clear() {
    let store = MemoryStateStore::new();
    assert!(store.load().await.unwrap().is_none());

    let state = media_state(file_items(), JobPhase::Running, 0);
    store.save(&state).await.unwrap();
    assert_eq!(store.load().await.unwrap(), Some(state));

    store.clear().await.unwrap();
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_store_persists_across_instances() {
    let dir = TempDir::new().unwrap();
    let state = media_state(file_items(), JobPhase::Paused, 1);

    let store = FileStateStore::new(dir.path()).await.unwrap();
    store.save(&state).await.unwrap();
    assert!(dir.path().join(MEDIA_STATE_FILE).exists());

    let reopened = FileStateStore::new(dir.path()).await.unwrap();
    let loaded = reopened.load().await.unwrap().unwrap();
    assert_eq!(loaded.cursor, 1);
    assert_eq!(loaded.items, state.items);
    assert_eq!(loaded.config.aspect_ratio, AspectRatio::Square);
}

#[tokio::test]
async fn test_file_store_missing_file_is_none() {
    let dir = TempDir::new().unwrap();
    let store = FileStateStore::new(dir.path().join("nested")).await.unwrap();
    assert!(store.load().await.unwrap().is_none());
    store.clear().await.unwrap();
}

#[tokio::test]
async fn test_file_store_ignores_corrupt_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(MEDIA_STATE_FILE), "{not json").unwrap();

    let store = FileStateStore::new(dir.path()).await.unwrap();
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_file_store_concurrent_saves_keep_newest() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileStateStore::new(dir.path()).await.unwrap());

    let base = media_state(file_items(), JobPhase::Running, 0);
    let records: Vec<PersistedMediaState> = (0..64)
        .map(|i| {
            let mut record = base.clone();
            record.cursor = i;
            record.saved_at = base.saved_at + chrono::Duration::milliseconds(i as i64);
            record
        })
        .collect();

    // Newest first, so most writers race against an already newer file.
    let tasks: Vec<_> = records
        .into_iter()
        .rev()
        .map(|record| {
            let store = store.clone();
            tokio::spawn(async move { store.save(&record).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.cursor, 63);
    assert!(!dir.path().join("media-state.json.tmp").exists());
}

#[tokio::test]
async fn test_file_store_drops_stale_record() {
    let dir = TempDir::new().unwrap();
    let store = FileStateStore::new(dir.path()).await.unwrap();

    let stopped = media_state(file_items(), JobPhase::Stopped, 0);
    let mut running = stopped.clone();
    running.phase = JobPhase::Running;
    running.cursor = 1;
    running.saved_at = stopped.saved_at - chrono::Duration::seconds(1);

    store.save(&stopped).await.unwrap();
    store.save(&running).await.unwrap();

    let loaded = store.load().await.unwrap().unwrap();
    assert_eq!(loaded.phase, JobPhase::Stopped);
    assert_eq!(loaded.restored_phase(), JobPhase::Stopped);

    // A cleared store accepts any record again.
    store.clear().await.unwrap();
    store.save(&running).await.unwrap();
    assert_eq!(store.load().await.unwrap().unwrap().cursor, 1);
}
