// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Update source: remote version token and firmware byte stream.
//!
//! The core consumes this interface, it does not own it. Version tokens are
//! opaque integers compared with `>`; the firmware stream is an exact-length
//! byte source whose declared size must match the bytes delivered.

use std::io::Read;
use std::time::Duration;

use log::{debug, info};

use crossload_common::protocol::Bank;

use crate::error::SourceError;

/// An open firmware download: the declared image length plus the bytes.
pub struct FirmwareStream {
    pub size: u64,
    pub reader: Box<dyn Read>,
}

pub trait UpdateSource {
    /// Fetch the version token the server currently offers.
    fn fetch_version(&mut self) -> Result<u32, SourceError>;

    /// Open the image stream for a target whose ACTIVE bank is
    /// `active_bank`. The server decides image identity from the query; the
    /// bridge only reports which bank is currently running.
    fn open_firmware(&mut self, active_bank: Bank) -> Result<FirmwareStream, SourceError>;
}

const VERSION_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP update source.
///
/// Endpoints: `GET {base}/version` returns a decimal token; `GET
/// {base}/firmware?current_bank={0|1}` returns the complement image with a
/// Content-Length header.
pub struct HttpSource {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            // No overall timeout: it would cover the whole body read, and
            // the transfer drains the body at bus speed.
            .timeout(None)
            .build()
            .map_err(|e| SourceError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl UpdateSource for HttpSource {
    fn fetch_version(&mut self) -> Result<u32, SourceError> {
        let url = format!("{}/version", self.base_url);
        debug!("checking {url}");

        let response = self
            .client
            .get(&url)
            .timeout(VERSION_TIMEOUT)
            .send()
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http(format!("{url} returned {status}")));
        }

        let body = response
            .text()
            .map_err(|e| SourceError::Http(e.to_string()))?;
        body.trim()
            .parse::<u32>()
            .map_err(|_| SourceError::Http(format!("malformed version token {:?}", body.trim())))
    }

    fn open_firmware(&mut self, active_bank: Bank) -> Result<FirmwareStream, SourceError> {
        let url = format!(
            "{}/firmware?current_bank={}",
            self.base_url,
            active_bank.wire_id()
        );
        info!("requesting firmware: {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http(format!("{url} returned {status}")));
        }

        let size = match response.content_length() {
            Some(size) if size > 0 => size,
            _ => {
                return Err(SourceError::Http(
                    "server did not declare a firmware size".to_string(),
                ))
            }
        };

        info!("firmware size: {size} bytes");
        Ok(FirmwareStream {
            size,
            reader: Box::new(response),
        })
    }
}
