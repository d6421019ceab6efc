//! E2E tests for history recall and persistence

use crate::common::harness::ShellTestHarness;
use crossterm::event::{KeyCode, KeyModifiers};
use std::sync::Arc;
use termshell::model::{KeyValueStore, MemoryStore};
use termshell::ShellConfig;

fn up(harness: &mut ShellTestHarness) {
    harness.send_key(KeyCode::Up, KeyModifiers::NONE).unwrap();
}

fn down(harness: &mut ShellTestHarness) {
    harness.send_key(KeyCode::Down, KeyModifiers::NONE).unwrap();
}

fn with_history(entries: &str) -> ShellTestHarness {
    ShellTestHarness::with_store(80, 24, Arc::new(MemoryStore::with_item("history", entries)))
        .unwrap()
}

#[test]
fn test_recall_walks_history() {
    let mut harness = with_history(r#"["a","b"]"#);

    up(&mut harness);
    assert_eq!(harness.pending_input(), "b");
    assert_eq!(harness.screen_row(0), "$ b");

    up(&mut harness);
    assert_eq!(harness.pending_input(), "a");
    assert_eq!(harness.screen_row(0), "$ a");

    // Already at the oldest entry
    up(&mut harness);
    assert_eq!(harness.pending_input(), "a");
    assert_eq!(harness.shell().state().history_cursor(), 0);

    down(&mut harness);
    assert_eq!(harness.pending_input(), "b");

    down(&mut harness);
    assert_eq!(harness.pending_input(), "");
    assert_eq!(harness.screen_row(0), "$");

    down(&mut harness);
    assert_eq!(harness.shell().state().history_cursor(), 2);
}

#[test]
fn test_recall_with_no_history_is_noop() {
    let mut harness = ShellTestHarness::new(80, 24).unwrap();
    harness.type_text("x").unwrap();

    up(&mut harness);
    down(&mut harness);

    assert_eq!(harness.pending_input(), "x");
    assert_eq!(harness.screen_row(0), "$ x");
}

#[test]
fn test_recalled_entry_can_be_edited_and_run() {
    let mut harness = with_history(r#"["man ls"]"#);

    up(&mut harness);
    harness
        .send_key(KeyCode::Backspace, KeyModifiers::NONE)
        .unwrap();
    harness
        .send_key(KeyCode::Backspace, KeyModifiers::NONE)
        .unwrap();
    harness.type_text("id").unwrap();
    harness
        .send_key(KeyCode::Enter, KeyModifiers::NONE)
        .unwrap();

    assert_eq!(harness.screen_row(0), "$ man id");
    assert_eq!(harness.screen_row(1), "NAME");
    let entries: Vec<&str> = harness.shell().history().iter().collect();
    assert_eq!(entries, vec!["man ls", "man id"]);
    assert_eq!(harness.shell().state().history_cursor(), 2);
}

#[test]
fn test_repeated_command_is_recorded_once() {
    let mut harness = ShellTestHarness::new(80, 24).unwrap();

    harness.submit("id").unwrap();
    harness.submit("id").unwrap();
    harness.submit("man id").unwrap();
    harness.submit("id").unwrap();

    let entries: Vec<&str> = harness.shell().history().iter().collect();
    assert_eq!(entries, vec!["id", "man id", "id"]);
}

#[test]
fn test_empty_lines_are_not_recorded() {
    let mut harness = ShellTestHarness::new(80, 24).unwrap();

    harness
        .send_key(KeyCode::Enter, KeyModifiers::NONE)
        .unwrap();
    harness.submit("    ").unwrap();

    assert!(harness.shell().history().is_empty());
    assert_eq!(harness.screen_row(1), "$");
    assert_eq!(harness.screen_row(2), "$");
}

#[test]
fn test_capacity_evicts_oldest() {
    let config = ShellConfig {
        history_capacity: 3,
        ..ShellConfig::default()
    };
    let mut harness =
        ShellTestHarness::with_setup(80, 50, &config, Arc::new(MemoryStore::new()), Vec::new())
            .unwrap();

    for line in ["a", "b", "c", "d"] {
        harness.submit(line).unwrap();
    }

    let entries: Vec<&str> = harness.shell().history().iter().collect();
    assert_eq!(entries, vec!["b", "c", "d"]);
}

#[test]
fn test_submitted_lines_are_persisted() {
    let store = MemoryStore::new();
    let mut harness = ShellTestHarness::with_store(80, 24, Arc::new(store.clone())).unwrap();

    harness.submit("id").unwrap();
    harness.flush_history();
    harness.submit("man id").unwrap();
    harness.flush_history();

    assert_eq!(
        store.get_item("history").unwrap().as_deref(),
        Some(r#"["id","man id"]"#)
    );
}

#[test]
fn test_malformed_history_starts_empty() {
    let mut harness = with_history("{not json");

    assert!(harness.shell().history().is_empty());
    up(&mut harness);
    assert_eq!(harness.pending_input(), "");

    harness.submit("id").unwrap();
    assert_eq!(harness.screen_row(1), "uid=001(anonymous)");
}

/// Storage that rejects everything
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get_item(&self, _key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("quota exceeded")
    }

    fn set_item(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("quota exceeded")
    }
}

#[test]
fn test_failing_store_does_not_disturb_session() {
    let mut harness = ShellTestHarness::with_store(80, 24, Arc::new(BrokenStore)).unwrap();

    harness.submit("id").unwrap();
    harness.flush_history();
    harness.submit("man id").unwrap();
    harness.flush_history();

    assert!(harness.shell().state().is_idle());
    assert_eq!(harness.shell().history().len(), 2);
    up(&mut harness);
    assert_eq!(harness.pending_input(), "man id");
}
