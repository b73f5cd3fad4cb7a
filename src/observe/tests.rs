//! Tests for observe module

use super::*;
use crate::types::RequestOptions;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn options(value: serde_json::Value) -> RequestOptions {
    value.as_object().cloned().unwrap()
}

// ============================================================================
// KeyWatcher Tests
// ============================================================================

#[test]
fn test_key_watcher_identical_options_unchanged() {
    let mut watcher = KeyWatcher::new(options(json!({"q": "rust", "sort": "asc"})));

    // A fresh object with the same values is not a change
    assert!(watcher
        .detect(&options(json!({"sort": "asc", "q": "rust"})))
        .is_none());
}

#[test]
fn test_key_watcher_single_key_change() {
    let mut watcher = KeyWatcher::new(options(json!({"q": "rust", "sort": "asc"})));

    let changed = watcher.detect(&options(json!({"q": "go", "sort": "asc"})));
    assert_eq!(changed, Some(vec!["q".to_string()]));
    assert_eq!(watcher.snapshot().get("q"), Some(&json!("go")));

    // Adopted: the same object again is no longer a change
    assert!(watcher
        .detect(&options(json!({"q": "go", "sort": "asc"})))
        .is_none());
}

#[test]
fn test_key_watcher_added_and_removed_keys() {
    let watcher = KeyWatcher::new(options(json!({"q": "rust", "status": "open"})));

    let changed = watcher.peek_changes(&options(json!({"q": "rust", "tag": "cli"})));
    assert_eq!(changed, vec!["status".to_string(), "tag".to_string()]);
}

#[test]
fn test_key_watcher_nested_values() {
    let mut watcher = KeyWatcher::new(options(json!({"range": {"from": 1, "to": 5}})));

    assert!(watcher
        .detect(&options(json!({"range": {"from": 1, "to": 5}})))
        .is_none());
    assert_eq!(
        watcher.detect(&options(json!({"range": {"from": 1, "to": 6}}))),
        Some(vec!["range".to_string()])
    );
}

#[test]
fn test_key_watcher_peek_does_not_adopt() {
    let watcher = KeyWatcher::new(options(json!({"q": "a"})));
    let next = options(json!({"q": "b"}));

    assert_eq!(watcher.peek_changes(&next), vec!["q".to_string()]);
    assert_eq!(watcher.peek_changes(&next), vec!["q".to_string()]);
    assert_eq!(watcher.snapshot().get("q"), Some(&json!("a")));
}

// ============================================================================
// PageCursor Tests
// ============================================================================

#[test]
fn test_page_cursor_clamps_to_one() {
    let cursor = PageCursor::new(0);
    assert_eq!(cursor.get(), 1);

    cursor.set(0);
    assert_eq!(cursor.get(), 1);

    assert_eq!(cursor.retreat(), 1);
}

#[test]
fn test_page_cursor_navigation() {
    let cursor = PageCursor::default();
    assert_eq!(cursor.advance(), 2);
    assert_eq!(cursor.advance(), 3);
    assert_eq!(cursor.retreat(), 2);

    let previous = cursor.set(7);
    assert_eq!(previous, 2);
    assert_eq!(cursor.get(), 7);
}

#[test]
fn test_page_cursor_clones_share_state() {
    let cursor = PageCursor::new(3);
    let other = cursor.clone();

    other.set(9);
    assert_eq!(cursor.get(), 9);
}

#[test]
fn test_page_cursor_default_reset() {
    let cursor = PageCursor::new(5);
    cursor.reset();
    assert_eq!(cursor.get(), 1);
}

#[test]
fn test_page_cursor_custom_reset() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let cursor = PageCursor::new(5).with_reset(move |cursor| {
        counter.fetch_add(1, Ordering::SeqCst);
        cursor.set(2);
    });

    cursor.reset();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cursor.get(), 2);
}

#[tokio::test]
async fn test_page_cursor_subscribe_only_on_change() {
    let cursor = PageCursor::new(1);
    let mut rx = cursor.subscribe();

    cursor.set(1);
    assert!(!rx.has_changed().unwrap());

    cursor.set(4);
    assert!(rx.has_changed().unwrap());
    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow_and_update(), 4);
}
