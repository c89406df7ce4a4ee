// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Hard reset sequencing for the target's NRST line.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::error::HardwareError;

/// Hold time with the reset line asserted.
pub const RESET_HOLD_MS: u32 = 50;
/// Settle time after release. There is no handshake confirming boot
/// completion, so this must stay conservative: returning from `hard_reset`
/// is the caller's only signal that the target may be addressed.
pub const BOOT_SETTLE_MS: u32 = 1000;

pub trait ResetControl {
    fn hard_reset(&mut self) -> Result<(), HardwareError>;
}

/// Drives the target's active-low reset line.
pub struct ResetSequencer<P, D> {
    nrst: P,
    delay: D,
}

impl<P, D> ResetSequencer<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(nrst: P, delay: D) -> Self {
        Self { nrst, delay }
    }
}

impl<P, D> ResetControl for ResetSequencer<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn hard_reset(&mut self) -> Result<(), HardwareError> {
        log::info!("hard-resetting target");

        self.nrst
            .set_low()
            .map_err(|e| HardwareError::Gpio(format!("nrst assert: {e:?}")))?;
        self.delay.delay_ms(RESET_HOLD_MS);

        self.nrst
            .set_high()
            .map_err(|e| HardwareError::Gpio(format!("nrst release: {e:?}")))?;
        self.delay.delay_ms(BOOT_SETTLE_MS);

        log::debug!("target reset released, boot settle elapsed");
        Ok(())
    }
}
