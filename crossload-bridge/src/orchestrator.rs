// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Top-level update orchestration.
//!
//! One run walks: liveness -> (reset) -> version check -> reset -> bank
//! discovery -> transfer -> persist -> reboot. Any failure aborts the rest
//! of the run and leaves the persisted version untouched; the next run
//! retries naturally because the version comparison is idempotent.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crossload_common::protocol::Bank;

use crate::bus::ByteBus;
use crate::error::UpdateError;
use crate::link::TargetLink;
use crate::reset::ResetControl;
use crate::source::UpdateSource;
use crate::store::VersionStore;
use crate::transfer;

/// Version bookkeeping for one run. `current` is the persisted value loaded
/// at run start; `target` is learned from the remote source and only exists
/// after a successful version check within the same run.
#[derive(Clone, Copy, Debug)]
pub struct VersionState {
    pub current: u32,
    pub target: Option<u32>,
}

impl VersionState {
    fn new(current: u32) -> Self {
        Self {
            current,
            target: None,
        }
    }
}

/// How a completed run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The remote offering is not newer than the installed version; the
    /// system never downgrades automatically.
    UpToDate { current: u32 },
    /// A new image was transferred, finalized, persisted, and the target
    /// rebooted into it.
    Updated { installed: u32, bytes_sent: u64 },
}

pub struct Orchestrator<B, D, R, S, V> {
    link: TargetLink<B, D>,
    reset: R,
    source: S,
    store: V,
}

impl<B, D, R, S, V> Orchestrator<B, D, R, S, V>
where
    B: ByteBus,
    D: DelayNs,
    R: ResetControl,
    S: UpdateSource,
    V: VersionStore,
{
    pub fn new(link: TargetLink<B, D>, reset: R, source: S, store: V) -> Self {
        Self {
            link,
            reset,
            source,
            store,
        }
    }

    /// Execute one full orchestration run.
    pub fn run(&mut self) -> Result<RunOutcome, UpdateError> {
        let mut versions = VersionState::new(self.store.load()?);
        info!("current firmware version: {}", versions.current);

        self.ensure_alive()?;

        let target = match self.check_for_update(&mut versions)? {
            None => {
                info!("already up to date");
                return Ok(RunOutcome::UpToDate {
                    current: versions.current,
                });
            }
            Some(target) => {
                info!(
                    "update available: {} -> {}, preparing target",
                    versions.current, target
                );
                target
            }
        };

        // Discovery straight after a previous session is unreliable; a hard
        // reset puts the target into a known, listening state first.
        self.reset.hard_reset()?;
        let active = self.link.active_bank()?;
        let outcome = self.install(active)?;

        // Write-after-success: a crash before this point leaves the old
        // version recorded, so the next run re-detects the update.
        self.store.store(target)?;
        info!("saved new version: {target}");

        self.link.reboot()?;
        Ok(RunOutcome::Updated {
            installed: target,
            bytes_sent: outcome.total_sent,
        })
    }

    /// Liveness check. A failed ping is recoverable: hard-reset and proceed
    /// without re-pinging, on the assumption that reset is sufficient.
    fn ensure_alive(&mut self) -> Result<(), UpdateError> {
        match self.link.ping() {
            Ok(()) => Ok(()),
            Err(err @ UpdateError::Liveness) => {
                warn!("{}: resetting target", err.category());
                self.reset.hard_reset()?;
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    /// Compare the remote version token against the persisted version.
    /// Only a strictly newer remote version triggers an update.
    fn check_for_update(
        &mut self,
        versions: &mut VersionState,
    ) -> Result<Option<u32>, UpdateError> {
        let offered = self.source.fetch_version()?;
        info!(
            "server version: {offered}, current version: {}",
            versions.current
        );
        if offered > versions.current {
            versions.target = Some(offered);
            Ok(Some(offered))
        } else {
            Ok(None)
        }
    }

    /// Fetch the complement image for the active bank and stream it in.
    fn install(&mut self, active: Bank) -> Result<transfer::TransferOutcome, UpdateError> {
        info!(
            "active bank {active:?}, requesting image for bank {:?}",
            active.complement()
        );
        let mut stream = self.source.open_firmware(active)?;
        let outcome = transfer::run(&mut self.link, &mut stream)?;

        // The engine only returns once the declared size was reached, but
        // the counters are reported for verification regardless.
        if outcome.total_sent != outcome.firmware_size {
            return Err(UpdateError::SizeMismatch {
                sent: outcome.total_sent,
                declared: outcome.firmware_size,
            });
        }
        Ok(outcome)
    }
}
