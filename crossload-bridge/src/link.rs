// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Typed command protocol on top of the byte bus.
//!
//! Every logical command is two bus transactions: issue the opcode, give the
//! target a fixed window to prepare its answer, then shift a null byte to
//! pull the response out. The protocol is half-duplex and stateless between
//! exchanges; the target never pushes a result on its own.

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crossload_common::protocol::{
    Bank, Opcode, BANK_RETRY_ATTEMPTS, BANK_RETRY_DELAY_MS, CHUNK_BYTE_GAP_US,
    CHUNK_HEADER_GAP_US, CHUNK_SETTLE_DELAY_MS, ERASE_DELAY_MS, FINALIZE_DELAY_MS,
    MAX_CHUNK_LEN, POLL, REBOOT_SETTLE_DELAY_MS, RESPONSE_DELAY_MS, RSP_OK, RSP_PONG,
};
use crossload_common::retry::{retry_with, RetryPolicy};

use crate::bus::ByteBus;
use crate::error::{HardwareError, UpdateError};

const BANK_DISCOVERY: RetryPolicy = RetryPolicy {
    attempts: BANK_RETRY_ATTEMPTS,
    backoff_ms: BANK_RETRY_DELAY_MS,
};

/// Issue an opcode, wait for the target to prepare its answer, then poll it.
fn issue_then_poll<B: ByteBus, D: DelayNs>(
    bus: &mut B,
    delay: &mut D,
    op: Opcode,
    wait_ms: u32,
) -> Result<u8, HardwareError> {
    bus.exchange(op.byte())?;
    delay.delay_ms(wait_ms);
    bus.exchange(POLL)
}

/// Command-level view of the target.
pub struct TargetLink<B, D> {
    bus: B,
    delay: D,
}

impl<B, D> TargetLink<B, D>
where
    B: ByteBus,
    D: DelayNs,
{
    pub fn new(bus: B, delay: D) -> Self {
        Self { bus, delay }
    }

    fn command(&mut self, op: Opcode, wait_ms: u32) -> Result<u8, HardwareError> {
        issue_then_poll(&mut self.bus, &mut self.delay, op, wait_ms)
    }

    /// Liveness probe. A non-pong answer is a [`UpdateError::Liveness`]
    /// failure, which the orchestrator treats as recoverable via reset.
    pub fn ping(&mut self) -> Result<(), UpdateError> {
        let rsp = self.command(Opcode::Ping, RESPONSE_DELAY_MS)?;
        if rsp == RSP_PONG {
            debug!("ping: pong");
            Ok(())
        } else {
            debug!("ping: unexpected response {rsp:#04x}");
            Err(UpdateError::Liveness)
        }
    }

    /// Ask which bank the target is currently running from.
    ///
    /// The target answers with garbage while it is still settling, so the
    /// query is retried up to the fixed budget. An indeterminate bank is
    /// fatal for the run; the complement image must never be guessed.
    pub fn active_bank(&mut self) -> Result<Bank, UpdateError> {
        let Self { bus, delay } = self;
        let raw = retry_with(
            &BANK_DISCOVERY,
            delay,
            |delay, attempt| {
                debug!("bank id query, attempt {}", attempt + 1);
                issue_then_poll(bus, delay, Opcode::GetBankId, RESPONSE_DELAY_MS)
            },
            |raw| Bank::from_wire(*raw).is_some(),
        )?;

        match raw.and_then(Bank::from_wire) {
            Some(bank) => {
                info!("target reports active bank {bank:?}");
                Ok(bank)
            }
            None => Err(UpdateError::BankIndeterminate),
        }
    }

    /// Start an OTA session. The poll is delayed past the worst-case mass
    /// erase of the inactive bank; polling earlier reads garbage.
    pub fn start_ota(&mut self) -> Result<(), UpdateError> {
        info!("sending start-OTA, waiting for bank erase");
        let rsp = self.command(Opcode::StartOta, ERASE_DELAY_MS)?;
        if rsp == RSP_OK {
            Ok(())
        } else {
            Err(UpdateError::OtaRejected(rsp))
        }
    }

    /// Send one framed data chunk: `[opcode][length][payload...]`.
    ///
    /// The target writes the chunk to flash synchronously, so the frame
    /// ends with a settle delay before the next command may follow.
    pub fn send_chunk(&mut self, data: &[u8]) -> Result<(), HardwareError> {
        debug_assert!(!data.is_empty() && data.len() <= MAX_CHUNK_LEN);

        self.bus.exchange(Opcode::DataChunk.byte())?;
        self.delay.delay_us(CHUNK_HEADER_GAP_US);
        self.bus.exchange(data.len() as u8)?;
        self.delay.delay_us(CHUNK_HEADER_GAP_US);
        for &byte in data {
            self.bus.exchange(byte)?;
            self.delay.delay_us(CHUNK_BYTE_GAP_US);
        }
        self.delay.delay_ms(CHUNK_SETTLE_DELAY_MS);
        Ok(())
    }

    /// Finalize the OTA session. The poll is delayed while the target
    /// rewrites its metadata sector and flips the active-bank marker; a
    /// non-ok answer means the new bank is NOT installed.
    pub fn end_ota(&mut self) -> Result<(), UpdateError> {
        info!("sending end-OTA, waiting for metadata update");
        let rsp = self.command(Opcode::EndOta, FINALIZE_DELAY_MS)?;
        if rsp == RSP_OK {
            Ok(())
        } else {
            Err(UpdateError::OtaFinalizeFailed(rsp))
        }
    }

    /// Reboot the target into its active bank. No response is polled; the
    /// settle delay is the only guarantee the target is back up.
    pub fn reboot(&mut self) -> Result<(), HardwareError> {
        info!("rebooting target");
        self.bus.exchange(Opcode::Reboot.byte())?;
        self.delay.delay_ms(REBOOT_SETTLE_DELAY_MS);
        Ok(())
    }

    /// Query the version byte of the firmware the target is running.
    pub fn firmware_version(&mut self) -> Result<u8, HardwareError> {
        self.command(Opcode::GetVersion, RESPONSE_DELAY_MS)
    }

    /// Block for `ms` milliseconds on the link's own clock. Used by the
    /// transfer engine to yield while the source has no bytes available.
    pub fn wait_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
