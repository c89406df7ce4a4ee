// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Command-line interface definitions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::error;

use crate::error::UpdateError;
use crate::hw;
use crate::orchestrator::{Orchestrator, RunOutcome};
use crate::source::{HttpSource, UpdateSource};
use crate::store::{FileStore, VersionStore};

/// Command-line arguments.
#[derive(Parser)]
#[command(name = "crossload-bridge")]
#[command(about = "OTA bridge for dual-bank targets over SPI")]
pub struct Cli {
    /// SPI device connected to the target
    #[arg(long, default_value = "/dev/spidev0.0")]
    pub spi: String,

    /// GPIO character device holding the CS and reset lines
    #[arg(long, default_value = "/dev/gpiochip0")]
    pub gpio_chip: String,

    /// GPIO line offset of the chip-select pin
    #[arg(long, default_value = "5")]
    pub cs_line: u32,

    /// GPIO line offset of the target's NRST pin
    #[arg(long, default_value = "21")]
    pub reset_line: u32,

    /// Base URL of the update server
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    pub server: String,

    /// File recording the last installed firmware version
    #[arg(long, default_value = "/var/lib/crossload/version")]
    pub state_file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run one full update cycle: check, transfer, finalize, reboot
    Run,

    /// Check the server for a newer version without touching the bus
    Check,

    /// Probe target liveness
    Ping,

    /// Report which bank the target is currently running from
    Bank,

    /// Query the version byte of the firmware on the target
    TargetVersion,

    /// Hard-reset the target
    Reset,

    /// Reboot the target into its active bank
    Reboot,
}

/// Execute the parsed CLI command.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run => run_update(&cli),
        Commands::Check => check(&cli),
        Commands::Ping => ping(&cli),
        Commands::Bank => bank(&cli),
        Commands::TargetVersion => target_version(&cli),
        Commands::Reset => reset(&cli),
        Commands::Reboot => reboot(&cli),
    }
}

/// One orchestration run. Update failures are logged with their category
/// and do not escalate into a process-level fault; the next scheduled run
/// retries naturally.
fn run_update(cli: &Cli) -> Result<()> {
    let (link, reset) = hw::open(&cli.spi, &cli.gpio_chip, cli.cs_line, cli.reset_line)?;
    let source = HttpSource::new(&cli.server)?;
    let store = FileStore::new(&cli.state_file);

    let mut orchestrator = Orchestrator::new(link, reset, source, store);
    match orchestrator.run() {
        Ok(RunOutcome::UpToDate { current }) => {
            println!("No update needed (version {current}).");
        }
        Ok(RunOutcome::Updated {
            installed,
            bytes_sent,
        }) => {
            println!("Update success: version {installed} installed ({bytes_sent} bytes).");
        }
        Err(err) => {
            error!("update failed [{}]: {err}", err.category());
            println!("Update failed ({}).", err.category());
        }
    }
    Ok(())
}

fn check(cli: &Cli) -> Result<()> {
    let mut source = HttpSource::new(&cli.server)?;
    let mut store = FileStore::new(&cli.state_file);

    let current = store.load()?;
    let offered = source.fetch_version()?;
    println!("Current version: {current}");
    println!("Server version:  {offered}");
    if offered > current {
        println!("Update available.");
    } else {
        println!("Already up to date.");
    }
    Ok(())
}

fn ping(cli: &Cli) -> Result<()> {
    let (mut link, _reset) = hw::open(&cli.spi, &cli.gpio_chip, cli.cs_line, cli.reset_line)?;
    match link.ping() {
        Ok(()) => println!("Target answered pong."),
        Err(err @ UpdateError::Liveness) => println!("No pong ({}).", err.category()),
        Err(other) => return Err(other.into()),
    }
    Ok(())
}

fn bank(cli: &Cli) -> Result<()> {
    let (mut link, _reset) = hw::open(&cli.spi, &cli.gpio_chip, cli.cs_line, cli.reset_line)?;
    let bank = link.active_bank()?;
    println!(
        "Active bank: {} (next image lands in {})",
        bank.wire_id(),
        bank.complement().wire_id()
    );
    Ok(())
}

fn target_version(cli: &Cli) -> Result<()> {
    let (mut link, _reset) = hw::open(&cli.spi, &cli.gpio_chip, cli.cs_line, cli.reset_line)?;
    let version = link.firmware_version()?;
    println!("Target firmware version: {version}");
    Ok(())
}

fn reset(cli: &Cli) -> Result<()> {
    use crate::reset::ResetControl;

    let (_link, mut reset) = hw::open(&cli.spi, &cli.gpio_chip, cli.cs_line, cli.reset_line)?;
    reset.hard_reset()?;
    println!("Target reset released.");
    Ok(())
}

fn reboot(cli: &Cli) -> Result<()> {
    let (mut link, _reset) = hw::open(&cli.spi, &cli.gpio_chip, cli.cs_line, cli.reset_line)?;
    link.reboot()?;
    println!("Reboot command sent.");
    Ok(())
}
