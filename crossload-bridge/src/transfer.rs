// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Transfer engine: streams a firmware image to the target in bounded
//! chunks.
//!
//! The loop is fully synchronous: read one chunk from the source, drain it
//! over the bus, read the next. Once start-OTA has been accepted the run
//! must reach end-OTA; anything else leaves the alternate bank in an
//! undefined, not-yet-installed state (safe, because the active bank and
//! metadata are untouched until end-OTA finalizes).

use std::io::ErrorKind;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crossload_common::progress::ProgressTracker;
use crossload_common::protocol::MAX_CHUNK_LEN;

use crate::bus::ByteBus;
use crate::error::{SourceError, UpdateError};
use crate::link::TargetLink;
use crate::source::FirmwareStream;

/// Pause before re-polling a source that currently has no bytes ready.
const SOURCE_YIELD_MS: u32 = 1;

/// Bookkeeping for one transfer. Scoped to a single run and discarded
/// regardless of outcome.
struct TransferSession {
    firmware_size: u64,
    total_sent: u64,
    progress: ProgressTracker,
}

impl TransferSession {
    fn new(firmware_size: u64) -> Self {
        Self {
            firmware_size,
            total_sent: 0,
            progress: ProgressTracker::new(firmware_size),
        }
    }

    fn remaining(&self) -> u64 {
        self.firmware_size - self.total_sent
    }
}

/// Result of a completed transfer, reported so the caller can verify that
/// the counters matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferOutcome {
    pub total_sent: u64,
    pub firmware_size: u64,
}

/// Stream `stream` to the target: start-OTA, chunked data, end-OTA.
pub fn run<B, D>(
    link: &mut TargetLink<B, D>,
    stream: &mut FirmwareStream,
) -> Result<TransferOutcome, UpdateError>
where
    B: ByteBus,
    D: DelayNs,
{
    link.start_ota()?;
    info!("target ready, sending {} bytes", stream.size);

    let mut session = TransferSession::new(stream.size);
    let mut buf = [0u8; MAX_CHUNK_LEN];

    while session.total_sent < session.firmware_size {
        // Never read past the declared size: the length byte caps a chunk
        // at MAX_CHUNK_LEN and the final chunk at the remainder.
        let want = session.remaining().min(MAX_CHUNK_LEN as u64) as usize;
        let read = match stream.reader.read(&mut buf[..want]) {
            Ok(0) => {
                warn!(
                    "source disconnected after {} of {} bytes",
                    session.total_sent, session.firmware_size
                );
                return Err(UpdateError::SizeMismatch {
                    sent: session.total_sent,
                    declared: session.firmware_size,
                });
            }
            Ok(read) => read,
            // No bytes currently available: yield briefly and retry
            // without making protocol progress.
            Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) => {
                link.wait_ms(SOURCE_YIELD_MS);
                continue;
            }
            Err(e) => return Err(SourceError::Stream(e).into()),
        };

        link.send_chunk(&buf[..read])?;
        session.total_sent += read as u64;

        if let Some(percent) = session.progress.update(session.total_sent) {
            info!("transfer progress: {percent}%");
        }
    }

    info!("total sent: {} bytes", session.total_sent);
    link.end_ota()?;

    Ok(TransferOutcome {
        total_sent: session.total_sent,
        firmware_size: session.firmware_size,
    })
}
