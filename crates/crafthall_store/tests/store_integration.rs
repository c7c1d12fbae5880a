//! Integration tests for SqliteStore against a file-backed database.
//!
//! Uses tempfile::TempDir for isolated SQLite databases.

use crafthall_core::{ProfileStore, SkillCategory, Stat};
use crafthall_store::sqlite::Table;
use crafthall_store::SqliteStore;
use std::sync::Arc;

async fn open(dir: &tempfile::TempDir) -> SqliteStore {
    let db_path = dir.path().join("test.db");
    SqliteStore::new(db_path.to_str().unwrap()).await.unwrap()
}

/// Reopening the database keeps every table's rows.
#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = tempfile::TempDir::new().unwrap();
    {
        let store = open(&dir).await;
        store.upsert_profile(7, "Thorin", 5).await.unwrap();
        store.set_stat(7, Stat::Strength, 12).await.unwrap();
        store.upsert_skill(7, SkillCategory::Processing, "smelting", 20).await.unwrap();
        store.upsert_recipe("axe", 4).await.unwrap();
        store.close().await;
    }

    let store = open(&dir).await;
    let sheet = store.get_stats(7).await.unwrap().expect("stats should persist");
    assert_eq!(sheet.strength, Some(12));
    assert_eq!(sheet.unset_count(), 8);
    assert_eq!(store.find_profile(7).await.unwrap().unwrap().character_name, "Thorin");
    assert_eq!(store.skills_for(7).await.unwrap().len(), 1);
    assert_eq!(store.find_recipe("axe").await.unwrap(), Some(4));
}

/// Concurrent stat writes for one member end in exactly one row holding all of them.
#[tokio::test]
async fn test_concurrent_set_stat_single_row() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = Arc::new(open(&dir).await);

    let mut handles = Vec::new();
    for (i, stat) in Stat::ALL.into_iter().enumerate() {
        let s = store.clone();
        handles.push(tokio::spawn(async move { s.set_stat(42, stat, i as i64).await }));
    }
    for h in handles {
        h.await.unwrap().unwrap();
    }

    assert_eq!(store.count_rows(Table::Stats).await.unwrap(), 1);
    let sheet = store.get_stats(42).await.unwrap().unwrap();
    for (i, (_, value)) in sheet.entries().enumerate() {
        assert_eq!(value, Some(i as i64));
    }
}
