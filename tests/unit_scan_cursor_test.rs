// tests/unit_scan_cursor_test.rs

use peridot::ClusterScanCursor;

#[test]
fn test_fresh_cursor_is_unfinished_and_empty() {
    let cursor = ClusterScanCursor::new();
    assert!(!cursor.is_finished());
    assert!(cursor.finished_nodes().is_empty());
}

#[test]
fn test_cursor_clones_share_progress() {
    // The cursor is a handle: clones observe the same scan.
    let cursor = ClusterScanCursor::new();
    let clone = cursor.clone();
    assert!(!clone.is_finished());
}
