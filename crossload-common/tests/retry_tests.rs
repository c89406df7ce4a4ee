// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for the bounded retry helper.

use embedded_hal::delay::DelayNs;

use crossload_common::retry::{retry_with, RetryPolicy};

/// Delay double that records every pause in milliseconds.
#[derive(Default)]
struct RecordingDelay {
    pauses_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.pauses_ms.push(ns / 1_000_000);
    }
}

const POLICY: RetryPolicy = RetryPolicy {
    attempts: 5,
    backoff_ms: 100,
};

#[test]
fn test_first_attempt_accepted() {
    let mut delay = RecordingDelay::default();
    let mut calls = 0;

    let result: Result<Option<u8>, ()> = retry_with(
        &POLICY,
        &mut delay,
        |_, _| {
            calls += 1;
            Ok(1)
        },
        |raw| *raw == 1,
    );

    assert_eq!(result, Ok(Some(1)));
    assert_eq!(calls, 1);
    assert!(delay.pauses_ms.is_empty());
}

#[test]
fn test_accepted_on_final_attempt() {
    let mut delay = RecordingDelay::default();
    let replies = [2u8, 2, 2, 2, 1];
    let mut calls = 0;

    let result: Result<Option<u8>, ()> = retry_with(
        &POLICY,
        &mut delay,
        |_, attempt| {
            calls += 1;
            Ok(replies[attempt as usize])
        },
        |raw| *raw <= 1,
    );

    assert_eq!(result, Ok(Some(1)));
    assert_eq!(calls, 5);
    // Backoff between attempts only, never after the last one.
    assert_eq!(delay.pauses_ms, vec![100, 100, 100, 100]);
}

#[test]
fn test_budget_exhausted() {
    let mut delay = RecordingDelay::default();
    let mut calls = 0;

    let result: Result<Option<u8>, ()> = retry_with(
        &POLICY,
        &mut delay,
        |_, _| {
            calls += 1;
            Ok(2)
        },
        |raw| *raw <= 1,
    );

    assert_eq!(result, Ok(None));
    assert_eq!(calls, 5);
    assert_eq!(delay.pauses_ms.len(), 4);
}

#[test]
fn test_hard_error_aborts_immediately() {
    let mut delay = RecordingDelay::default();
    let mut calls = 0;

    let result: Result<Option<u8>, &str> = retry_with(
        &POLICY,
        &mut delay,
        |_, _| {
            calls += 1;
            Err("bus fault")
        },
        |_| true,
    );

    assert_eq!(result, Err("bus fault"));
    assert_eq!(calls, 1);
    assert!(delay.pauses_ms.is_empty());
}

#[test]
fn test_op_sees_attempt_index() {
    let mut delay = RecordingDelay::default();
    let mut seen = Vec::new();

    let _: Result<Option<u32>, ()> = retry_with(
        &POLICY,
        &mut delay,
        |_, attempt| {
            seen.push(attempt);
            Ok(attempt)
        },
        |_| false,
    );

    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
}
