// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Bridge controller that installs network-fetched firmware onto a
//! dual-bank target over SPI.
//!
//! The update flow is a single synchronous run: liveness check, remote
//! version check, hard reset, bank discovery, chunked transfer, finalize,
//! persist, reboot. Everything hardware-facing sits behind small traits so
//! the whole flow is exercised against doubles in the test suite.

pub mod bus;
pub mod cli;
pub mod doubles;
pub mod error;
pub mod hw;
pub mod link;
pub mod orchestrator;
pub mod reset;
pub mod source;
pub mod store;
pub mod transfer;

pub use error::{HardwareError, SourceError, StoreError, UpdateError};
pub use orchestrator::{Orchestrator, RunOutcome};
