// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Error taxonomy for a single orchestration run.
//!
//! Every failure is local to one run: nothing here escalates to a process
//! fault, the persisted version is left untouched, and the next scheduled
//! run retries naturally because the version comparison is idempotent.

use std::io;

use thiserror::Error;

/// Low-level bus or pin failure.
#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("spi transfer failed: {0}")]
    Spi(String),
    #[error("gpio operation failed: {0}")]
    Gpio(String),
}

/// Failure while talking to the update server.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http request failed: {0}")]
    Http(String),
    #[error("firmware stream failed: {0}")]
    Stream(#[from] io::Error),
}

/// Failure of the persistent version store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("version store i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("version store is corrupt: {0:?}")]
    Corrupt(String),
}

/// Anything that can abort an orchestration run.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Hardware(#[from] HardwareError),

    /// Ping was answered with something other than pong. Recoverable: the
    /// orchestrator reacts with a hard reset, it never aborts the run.
    #[error("target did not answer ping")]
    Liveness,

    /// The active bank could not be determined within the retry budget.
    /// Fatal for the run: a bank is never guessed.
    #[error("active bank indeterminate after retries")]
    BankIndeterminate,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("target rejected OTA start (response {0:#04x})")]
    OtaRejected(u8),

    #[error("OTA finalize failed (response {0:#04x})")]
    OtaFinalizeFailed(u8),

    /// The stream ended before the declared image length was delivered.
    #[error("stream ended early: sent {sent} of {declared} bytes")]
    SizeMismatch { sent: u64, declared: u64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl UpdateError {
    /// Stable category name for the operator-facing log.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Hardware(_) => "BusFailure",
            Self::Liveness => "LivenessFailure",
            Self::BankIndeterminate => "BankIndeterminate",
            Self::Source(SourceError::Http(_)) => "HttpFailure",
            Self::Source(SourceError::Stream(_)) => "StreamFailure",
            Self::OtaRejected(_) => "OtaRejected",
            Self::OtaFinalizeFailed(_) => "OtaFinalizeFailed",
            Self::SizeMismatch { .. } => "SizeMismatch",
            Self::Store(_) => "StoreFailure",
        }
    }
}
