// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! OTA bridge for dual-bank targets.
//!
//! Usage:
//!   crossload-bridge --server http://10.0.0.2:5000 run
//!   crossload-bridge ping
//!   crossload-bridge bank

use anyhow::Result;
use clap::Parser;

use crossload_bridge::cli;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::Cli::parse();
    cli::run(args)
}
