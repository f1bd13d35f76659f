// tests/unit_batch_test.rs

use peridot::Batch;
use peridot::core::commands::string;

#[test]
fn test_pipeline_and_atomic_flavors() {
    let pipeline = Batch::pipeline().cmd(string::set("a", "1"));
    assert!(!pipeline.is_atomic());
    assert_eq!(pipeline.len(), 1);

    let transaction = Batch::atomic()
        .watch("k")
        .cmd(string::set("k", "x"))
        .cmd(string::get("k"));
    assert!(transaction.is_atomic());
    assert_eq!(transaction.len(), 2);
}

#[test]
fn test_empty_batch_is_observable() {
    let batch = Batch::pipeline();
    assert!(batch.is_empty());
    assert_eq!(batch.len(), 0);
}

#[test]
fn test_push_appends_in_order() {
    let mut batch = Batch::pipeline();
    batch.push(string::set("a", "1"));
    batch.push(string::get("a"));
    assert_eq!(batch.len(), 2);
}
