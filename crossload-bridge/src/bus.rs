// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Single-byte exchange primitive over the SPI link to the target.
//!
//! The target is a single-threaded firmware peer: it services one bus
//! transaction, then needs processing time before the next one. Every
//! exchange therefore ends with a mandatory inter-transaction delay --
//! skipping it corrupts the following exchanges.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crossload_common::protocol::{HOLD_DELAY_US, INTER_EXCHANGE_DELAY_MS, SETUP_DELAY_US};

use crate::error::HardwareError;

/// One request/response bus transaction. Strictly half-duplex: one
/// outstanding transaction at a time, caller-blocking, no queuing.
pub trait ByteBus {
    fn exchange(&mut self, byte: u8) -> Result<u8, HardwareError>;
}

/// Production transport: an SPI bus with a manually driven chip-select.
///
/// CS is handled here rather than by the SPI driver because the target
/// needs a fixed setup time between select and the first clock edge.
pub struct SpiBridge<S, P, D> {
    spi: S,
    cs: P,
    delay: D,
}

impl<S, P, D> SpiBridge<S, P, D>
where
    S: SpiBus<u8>,
    P: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: S, cs: P, delay: D) -> Self {
        Self { spi, cs, delay }
    }
}

impl<S, P, D> ByteBus for SpiBridge<S, P, D>
where
    S: SpiBus<u8>,
    P: OutputPin,
    D: DelayNs,
{
    fn exchange(&mut self, byte: u8) -> Result<u8, HardwareError> {
        let mut word = [byte];

        self.cs
            .set_low()
            .map_err(|e| HardwareError::Gpio(format!("cs assert: {e:?}")))?;
        self.delay.delay_us(SETUP_DELAY_US);

        let result = self
            .spi
            .transfer_in_place(&mut word)
            .and_then(|()| self.spi.flush())
            .map_err(|e| HardwareError::Spi(format!("{e:?}")));

        self.delay.delay_us(HOLD_DELAY_US);
        self.cs
            .set_high()
            .map_err(|e| HardwareError::Gpio(format!("cs release: {e:?}")))?;
        result?;

        self.delay.delay_ms(INTER_EXCHANGE_DELAY_MS);
        log::trace!("bus exchange: sent {byte:#04x}, got {:#04x}", word[0]);
        Ok(word[0])
    }
}
