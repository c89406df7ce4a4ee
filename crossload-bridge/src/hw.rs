// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Linux hardware wiring: spidev for the bus, gpio-cdev for the CS and
//! reset lines.
//!
//! CS is requested as a plain GPIO instead of using the kernel's chip
//! select, because the bus contract needs a fixed setup time between select
//! and the first clock edge.

use anyhow::{Context, Result};
use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{CdevPin, Delay, SpidevBus};

use crate::bus::SpiBridge;
use crate::link::TargetLink;
use crate::reset::ResetSequencer;

pub const SPI_SPEED_HZ: u32 = 500_000;

const CONSUMER: &str = "crossload-bridge";

pub type Bus = SpiBridge<SpidevBus, CdevPin, Delay>;
pub type Link = TargetLink<Bus, Delay>;
pub type Reset = ResetSequencer<CdevPin, Delay>;

/// Open the SPI device and GPIO lines and build the target link plus reset
/// sequencer.
pub fn open(spi_path: &str, gpio_chip: &str, cs_line: u32, reset_line: u32) -> Result<(Link, Reset)> {
    let mut spi = SpidevBus::open(spi_path)
        .map_err(|e| anyhow::anyhow!("failed to open SPI device {spi_path}: {e:?}"))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(SPI_SPEED_HZ)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options)
        .with_context(|| format!("failed to configure SPI device {spi_path}"))?;

    let mut chip = Chip::new(gpio_chip)
        .map_err(|e| anyhow::anyhow!("failed to open GPIO chip {gpio_chip}: {e:?}"))?;

    let cs = request_output(&mut chip, cs_line, "cs")?;
    let nrst = request_output(&mut chip, reset_line, "nrst")?;

    let bus = SpiBridge::new(spi, cs, Delay);
    Ok((TargetLink::new(bus, Delay), ResetSequencer::new(nrst, Delay)))
}

/// Request a line as an output, initially high (CS deselected, reset
/// released).
fn request_output(chip: &mut Chip, line: u32, name: &str) -> Result<CdevPin> {
    let handle = chip
        .get_line(line)
        .and_then(|l| l.request(LineRequestFlags::OUTPUT, 1, CONSUMER))
        .map_err(|e| anyhow::anyhow!("failed to request {name} line {line}: {e:?}"))?;
    CdevPin::new(handle).map_err(|e| anyhow::anyhow!("failed to wrap {name} line {line}: {e:?}"))
}
