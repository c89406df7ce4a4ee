// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Shared protocol vocabulary and pure logic for the crossload OTA bridge.
//!
//! This crate is `no_std` so the same definitions can be shared with the
//! target firmware; the host tools in `crossload-bridge` use it from `std`.

#![no_std]

pub mod progress;
pub mod protocol;
pub mod retry;

// Re-export commonly used types
pub use progress::ProgressTracker;
pub use protocol::{Bank, Opcode};
pub use protocol::{MAX_CHUNK_LEN, POLL, RSP_ERROR, RSP_OK, RSP_PONG};
pub use retry::{retry_with, RetryPolicy};
