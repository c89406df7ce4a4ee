// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Bounded retry with fixed backoff.
//!
//! The target answers some queries with garbage while it is still settling,
//! so the few retry sites share this helper: run an operation up to N times,
//! classify each value with a predicate, and back off between attempts.

use embedded_hal::delay::DelayNs;

/// A fixed attempt budget with a fixed pause between attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff_ms: u32,
}

/// Run `op` until `accept` classifies its value as a success.
///
/// Returns `Ok(Some(value))` on the first accepted value, `Ok(None)` once
/// the attempt budget is exhausted, and `Err` immediately if `op` itself
/// fails hard. The backoff is applied between attempts only. `op` receives
/// the zero-based attempt index, and also gets the delay handle so callers
/// can pace multi-phase operations without a second borrow of it.
pub fn retry_with<D, T, E, F, A>(
    policy: &RetryPolicy,
    delay: &mut D,
    mut op: F,
    mut accept: A,
) -> Result<Option<T>, E>
where
    D: DelayNs,
    F: FnMut(&mut D, u32) -> Result<T, E>,
    A: FnMut(&T) -> bool,
{
    for attempt in 0..policy.attempts {
        let value = op(delay, attempt)?;
        if accept(&value) {
            return Ok(Some(value));
        }
        if attempt + 1 < policy.attempts {
            delay.delay_ms(policy.backoff_ms);
        }
    }
    Ok(None)
}
