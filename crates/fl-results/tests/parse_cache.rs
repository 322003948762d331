use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use fl_core::IterationTable;
use fl_results::{CacheManifest, ParseCache, ResultsError, compute_entry_id};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

#[test]
fn save_list_load_delete() {
    let dir = unique_temp_dir("fl_results_cache");
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    let source = dir.join("report.out");
    fs::write(&source, "irrelevant").expect("failed to write source");

    let cache = ParseCache::for_file(&source).expect("failed to create cache");
    assert!(cache.root().ends_with(".fluentio/cache"));

    let table = IterationTable::from_rows(
        vec!["t".to_string()],
        vec![1, 2],
        vec![vec![Some(1.0)], vec![None]],
    )
    .expect("table")
    .with_index_name("Iteration");

    let id = compute_entry_id(b"irrelevant", "report", &("skip", 0));
    assert!(!cache.has(&id));

    let manifest = CacheManifest::new(&id, &source, "report", table.len());
    cache.save(&manifest, &table).expect("failed to save");
    assert!(cache.has(&id));

    let listed = cache.list().expect("failed to list");
    assert_eq!(listed, vec![manifest]);

    let loaded: IterationTable = cache.load(&id).expect("failed to load");
    assert_eq!(loaded, table);

    cache.delete(&id).expect("failed to delete");
    assert!(!cache.has(&id));
    assert!(matches!(
        cache.load::<i64>(&id),
        Err(ResultsError::EntryNotFound { .. })
    ));

    let _ = fs::remove_dir_all(&dir);
}
