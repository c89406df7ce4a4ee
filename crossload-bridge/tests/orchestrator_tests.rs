// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! End-to-end tests of the update orchestration against doubles.

use crossload_bridge::doubles::{CountingReset, FakeTarget, MemorySource, MemoryStore, NoDelay};
use crossload_bridge::error::UpdateError;
use crossload_bridge::link::TargetLink;
use crossload_bridge::orchestrator::{Orchestrator, RunOutcome};
use crossload_common::protocol::Bank;

type TestOrchestrator =
    Orchestrator<FakeTarget, NoDelay, CountingReset, MemorySource, MemoryStore>;

fn orchestrator(
    target: &FakeTarget,
    reset: &CountingReset,
    source: &MemorySource,
    store: &MemoryStore,
) -> TestOrchestrator {
    Orchestrator::new(
        TargetLink::new(target.clone(), NoDelay),
        reset.clone(),
        source.clone(),
        store.clone(),
    )
}

// --- Idempotence of "already up to date" ---

#[test]
fn test_equal_version_is_a_no_op() {
    let target = FakeTarget::new();
    let reset = CountingReset::new();
    let source = MemorySource::new(3, vec![0xAA; 16]);
    let store = MemoryStore::new(3);

    let outcome = orchestrator(&target, &reset, &source, &store).run().unwrap();

    assert_eq!(outcome, RunOutcome::UpToDate { current: 3 });
    let state = target.state();
    let state = state.borrow();
    assert_eq!(state.starts, 0);
    assert_eq!(state.reboots, 0);
    assert!(store.writes().is_empty());
    assert!(source.log().borrow().opened_for.is_empty());
}

#[test]
fn test_older_remote_version_never_downgrades() {
    let target = FakeTarget::new();
    let reset = CountingReset::new();
    let source = MemorySource::new(2, vec![0xAA; 16]);
    let store = MemoryStore::new(3);

    let outcome = orchestrator(&target, &reset, &source, &store).run().unwrap();

    assert_eq!(outcome, RunOutcome::UpToDate { current: 3 });
    assert_eq!(target.state().borrow().starts, 0);
    assert_eq!(store.current(), 3);
}

// --- Liveness handling ---

#[test]
fn test_failed_ping_triggers_reset_and_run_proceeds() {
    let target = FakeTarget::new();
    target.state().borrow_mut().mute_ping = true;
    let reset = CountingReset::new();
    let source = MemorySource::new(1, vec![0xAA; 16]);
    let store = MemoryStore::new(1);

    let outcome = orchestrator(&target, &reset, &source, &store).run().unwrap();

    // Up to date, so only the liveness reset happened.
    assert_eq!(outcome, RunOutcome::UpToDate { current: 1 });
    assert_eq!(*reset.handle().borrow(), 1);
    assert_eq!(target.state().borrow().pings, 1);
}

#[test]
fn test_healthy_ping_skips_reset() {
    let target = FakeTarget::new();
    let reset = CountingReset::new();
    let source = MemorySource::new(1, vec![0xAA; 16]);
    let store = MemoryStore::new(1);

    orchestrator(&target, &reset, &source, &store).run().unwrap();

    assert_eq!(*reset.handle().borrow(), 0);
}

// --- Failure isolation ---

#[test]
fn test_finalize_failure_leaves_store_untouched() {
    let target = FakeTarget::new();
    target.state().borrow_mut().fail_finalize = true;
    let reset = CountingReset::new();
    let source = MemorySource::new(5, vec![0xBB; 32]);
    let store = MemoryStore::new(3);

    let result = orchestrator(&target, &reset, &source, &store).run();

    assert!(matches!(result, Err(UpdateError::OtaFinalizeFailed(_))));
    assert_eq!(store.current(), 3);
    assert!(store.writes().is_empty());
    assert_eq!(target.state().borrow().reboots, 0);
}

#[test]
fn test_early_disconnect_aborts_before_finalize() {
    let target = FakeTarget::new();
    let reset = CountingReset::new();
    let source = MemorySource::new(5, vec![0xBB; 50]).with_declared_size(130);
    let store = MemoryStore::new(3);

    let result = orchestrator(&target, &reset, &source, &store).run();

    assert!(matches!(result, Err(UpdateError::SizeMismatch { .. })));
    assert_eq!(store.current(), 3);
    let state = target.state();
    let state = state.borrow();
    assert_eq!(state.ends, 0);
    assert_eq!(state.reboots, 0);
}

#[test]
fn test_indeterminate_bank_aborts_before_download() {
    let target = FakeTarget::new();
    target
        .state()
        .borrow_mut()
        .bank_replies
        .extend([7, 7, 7, 7, 7]);
    let reset = CountingReset::new();
    let source = MemorySource::new(5, vec![0xBB; 32]);
    let store = MemoryStore::new(3);

    let result = orchestrator(&target, &reset, &source, &store).run();

    assert!(matches!(result, Err(UpdateError::BankIndeterminate)));
    // The image is never even requested, let alone transferred.
    assert!(source.log().borrow().opened_for.is_empty());
    assert_eq!(target.state().borrow().starts, 0);
    assert_eq!(store.current(), 3);
}

// --- Full update run ---

#[test]
fn test_full_update_run() {
    let target = FakeTarget::new();
    let reset = CountingReset::new();
    let source = MemorySource::new(5, vec![0x42; 256]);
    let store = MemoryStore::new(3);

    let outcome = orchestrator(&target, &reset, &source, &store).run().unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Updated {
            installed: 5,
            bytes_sent: 256
        }
    );

    // Version persisted exactly once, after success.
    assert_eq!(store.current(), 5);
    assert_eq!(store.writes(), vec![5]);

    let state = target.state();
    let state = state.borrow();
    assert_eq!(state.received_bytes(), 256);
    assert_eq!(state.starts, 1);
    assert_eq!(state.ends, 1);
    assert_eq!(state.reboots, 1);

    // Ping succeeded, so the only reset is the pre-discovery one.
    assert_eq!(*reset.handle().borrow(), 1);

    // The source was told which bank is ACTIVE; it serves the complement.
    assert_eq!(source.log().borrow().opened_for, vec![Bank::A]);
}

#[test]
fn test_update_reports_active_bank_b() {
    let target = FakeTarget::new();
    target.state().borrow_mut().active_bank = Bank::B;
    let reset = CountingReset::new();
    let source = MemorySource::new(2, vec![0x42; 64]);
    let store = MemoryStore::new(1);

    orchestrator(&target, &reset, &source, &store).run().unwrap();

    assert_eq!(source.log().borrow().opened_for, vec![Bank::B]);
}
