//! E2E tests for long-running commands and the single-process gate

use crate::common::harness::ShellTestHarness;
use crossterm::event::{KeyCode, KeyModifiers};
use termshell::commands::demo;
use termshell::Mode;

fn harness() -> ShellTestHarness {
    ShellTestHarness::with_commands(80, 24, demo::commands()).unwrap()
}

#[test]
fn test_long_running_command_holds_the_prompt() {
    let mut harness = harness();

    harness.submit("sleep 5").unwrap();

    assert_eq!(harness.screen_row(1), "sleeping for 5s...");
    assert!(harness.shell().state().is_busy());
    let process = harness.shell().state().active_process().unwrap();
    assert_eq!(process.command(), "sleep");
    // No prompt until the command exits
    assert_eq!(harness.screen_row(2), "");
}

#[test]
fn test_keys_are_dropped_while_busy() {
    let mut harness = harness();
    harness.submit("sleep 1").unwrap();
    let before = harness.screen_to_string();

    harness.type_text("id").unwrap();
    harness
        .send_key(KeyCode::Enter, KeyModifiers::NONE)
        .unwrap();
    harness
        .send_key(KeyCode::Backspace, KeyModifiers::NONE)
        .unwrap();
    harness.send_key(KeyCode::Up, KeyModifiers::NONE).unwrap();
    harness
        .send_key(KeyCode::Char('d'), KeyModifiers::CONTROL)
        .unwrap();

    assert_eq!(harness.pending_input(), "");
    assert_eq!(harness.screen_to_string(), before);
    assert!(harness.shell().state().is_busy());
    assert_eq!(harness.shell().history().len(), 1);
}

#[test]
fn test_exit_signal_restores_prompt() {
    let mut harness = harness();
    harness.submit("sleep 2").unwrap();

    harness.wait_for_exit().unwrap();

    assert_eq!(harness.screen_row(1), "sleeping for 2s... done");
    assert_eq!(harness.screen_row(3), "$");
    assert_eq!(harness.shell().state().mode(), &Mode::Idle);

    // Input works again
    harness.submit("id").unwrap();
    assert_eq!(harness.screen_row(4), "uid=001(anonymous)");
}

#[test]
fn test_keys_typed_while_busy_are_not_replayed() {
    let mut harness = harness();
    harness.submit("sleep 1").unwrap();
    harness.type_text("lost").unwrap();

    harness.wait_for_exit().unwrap();

    assert_eq!(harness.pending_input(), "");
    harness.assert_screen_not_contains("lost");
}

#[test]
fn test_failed_long_running_command_does_not_block() {
    let mut harness = harness();

    harness.submit("sleep forever").unwrap();

    harness.assert_screen_contains("sleep: invalid duration \"forever\"");
    assert!(harness.shell().state().is_idle());
    assert_eq!(harness.screen_row(2), "$");
}

#[test]
fn test_consecutive_long_running_commands() {
    let mut harness = harness();

    harness.submit("sleep 1").unwrap();
    let first = harness.shell().state().active_process().cloned().unwrap();
    harness.wait_for_exit().unwrap();

    harness.submit("sleep 1").unwrap();
    let second = harness.shell().state().active_process().cloned().unwrap();
    assert_ne!(first, second);
    assert_eq!(first.command(), second.command());

    harness.wait_for_exit().unwrap();
    assert!(harness.shell().state().is_idle());
}
