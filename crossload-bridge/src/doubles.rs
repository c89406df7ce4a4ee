// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Test doubles for every seam of the update flow.
//!
//! [`FakeTarget`] emulates the target firmware's command handling
//! byte-for-byte, so the whole orchestration can be exercised without
//! hardware. The doubles hand out shared-state handles (`Rc<RefCell<_>>`)
//! because the orchestrator consumes them by value and tests still need to
//! inspect what happened afterwards.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

use crossload_common::protocol::{Bank, Opcode, POLL, RSP_ERROR, RSP_OK, RSP_PONG};

use crate::bus::ByteBus;
use crate::error::{HardwareError, SourceError, StoreError};
use crate::reset::ResetControl;
use crate::source::{FirmwareStream, UpdateSource};
use crate::store::VersionStore;

/// Delay double that returns immediately. Keeps protocol-level tests from
/// sleeping through erase/finalize/reboot waits.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

// --- Fake target ---

/// Receive state of the emulated target, mirroring the chunk framing.
enum RxState {
    Idle,
    ChunkLen,
    ChunkData { remaining: usize },
}

/// Everything the fake target has observed, for post-run assertions.
pub struct TargetState {
    /// Byte the target would shift out on the next exchange.
    reply: u8,
    rx: RxState,
    /// Scripted answers for get-bank-id queries, consumed front to back.
    /// When empty, `active_bank` is reported.
    pub bank_replies: VecDeque<u8>,
    pub active_bank: Bank,
    pub firmware_version: u8,
    /// Answer pings with an error byte, as a target stuck outside its
    /// command loop would.
    pub mute_ping: bool,
    pub reject_start: bool,
    pub fail_finalize: bool,
    /// Raw bytes seen on the wire, in order.
    pub wire_log: Vec<u8>,
    pub pings: u32,
    pub bank_queries: u32,
    pub starts: u32,
    pub ends: u32,
    pub reboots: u32,
    /// Completed data chunks, framed payloads only.
    pub chunks: Vec<Vec<u8>>,
}

impl Default for TargetState {
    fn default() -> Self {
        Self {
            // An idle slave shifts out 0xFF until it has prepared a reply.
            reply: RSP_ERROR,
            rx: RxState::Idle,
            bank_replies: VecDeque::new(),
            active_bank: Bank::A,
            firmware_version: 0,
            mute_ping: false,
            reject_start: false,
            fail_finalize: false,
            wire_log: Vec::new(),
            pings: 0,
            bank_queries: 0,
            starts: 0,
            ends: 0,
            reboots: 0,
            chunks: Vec::new(),
        }
    }
}

impl TargetState {
    pub fn received_bytes(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    pub fn chunk_sizes(&self) -> Vec<usize> {
        self.chunks.iter().map(Vec::len).collect()
    }
}

/// Bus double emulating the target firmware's command FSM.
///
/// True to the half-duplex protocol, each exchange shifts out the reply
/// prepared by the PREVIOUS exchange before interpreting the new byte; the
/// bridge fetches results with a follow-up poll exchange.
#[derive(Clone)]
pub struct FakeTarget {
    state: Rc<RefCell<TargetState>>,
}

impl FakeTarget {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(TargetState::default())),
        }
    }

    /// Shared handle for inspecting (or scripting) the target state.
    pub fn state(&self) -> Rc<RefCell<TargetState>> {
        Rc::clone(&self.state)
    }

    fn handle_command(state: &mut TargetState, byte: u8) {
        match Opcode::try_from(byte) {
            Ok(Opcode::Ping) => {
                state.pings += 1;
                state.reply = if state.mute_ping { RSP_ERROR } else { RSP_PONG };
            }
            Ok(Opcode::StartOta) => {
                state.starts += 1;
                state.reply = if state.reject_start { RSP_ERROR } else { RSP_OK };
            }
            Ok(Opcode::DataChunk) => {
                state.rx = RxState::ChunkLen;
            }
            Ok(Opcode::EndOta) => {
                state.ends += 1;
                state.reply = if state.fail_finalize { RSP_ERROR } else { RSP_OK };
            }
            Ok(Opcode::GetVersion) => {
                state.reply = state.firmware_version;
            }
            Ok(Opcode::Reboot) => {
                state.reboots += 1;
            }
            Ok(Opcode::GetBankId) => {
                state.bank_queries += 1;
                state.reply = state
                    .bank_replies
                    .pop_front()
                    .unwrap_or(state.active_bank.wire_id());
            }
            Err(raw) if raw == POLL => {
                // Poll byte: leave the prepared reply in place.
            }
            Err(_) => {
                state.reply = RSP_ERROR;
            }
        }
    }
}

impl Default for FakeTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteBus for FakeTarget {
    fn exchange(&mut self, byte: u8) -> Result<u8, HardwareError> {
        let mut state = self.state.borrow_mut();
        state.wire_log.push(byte);
        let out = state.reply;

        match std::mem::replace(&mut state.rx, RxState::Idle) {
            RxState::ChunkLen => {
                if byte > 0 {
                    state.chunks.push(Vec::with_capacity(byte as usize));
                    state.rx = RxState::ChunkData {
                        remaining: byte as usize,
                    };
                }
            }
            RxState::ChunkData { remaining } => {
                if let Some(chunk) = state.chunks.last_mut() {
                    chunk.push(byte);
                }
                if remaining > 1 {
                    state.rx = RxState::ChunkData {
                        remaining: remaining - 1,
                    };
                } else {
                    state.reply = RSP_OK;
                }
            }
            RxState::Idle => Self::handle_command(&mut state, byte),
        }

        Ok(out)
    }
}

// --- Reset double ---

/// Reset line double that counts hard resets.
#[derive(Clone, Default)]
pub struct CountingReset {
    resets: Rc<RefCell<u32>>,
}

impl CountingReset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> Rc<RefCell<u32>> {
        Rc::clone(&self.resets)
    }
}

impl ResetControl for CountingReset {
    fn hard_reset(&mut self) -> Result<(), HardwareError> {
        *self.resets.borrow_mut() += 1;
        Ok(())
    }
}

// --- Update source double ---

/// What the memory source has been asked for.
#[derive(Default)]
pub struct SourceLog {
    pub version_checks: u32,
    pub opened_for: Vec<Bank>,
}

/// In-memory update source serving a fixed version and image.
#[derive(Clone)]
pub struct MemorySource {
    version: u32,
    firmware: Vec<u8>,
    /// Declared stream length; diverges from the payload in disconnect
    /// scenarios.
    declared_size: u64,
    log: Rc<RefCell<SourceLog>>,
}

impl MemorySource {
    pub fn new(version: u32, firmware: Vec<u8>) -> Self {
        let declared_size = firmware.len() as u64;
        Self {
            version,
            firmware,
            declared_size,
            log: Rc::new(RefCell::new(SourceLog::default())),
        }
    }

    /// Declare more bytes than the stream will deliver.
    pub fn with_declared_size(mut self, declared_size: u64) -> Self {
        self.declared_size = declared_size;
        self
    }

    pub fn log(&self) -> Rc<RefCell<SourceLog>> {
        Rc::clone(&self.log)
    }
}

impl UpdateSource for MemorySource {
    fn fetch_version(&mut self) -> Result<u32, SourceError> {
        self.log.borrow_mut().version_checks += 1;
        Ok(self.version)
    }

    fn open_firmware(&mut self, active_bank: Bank) -> Result<FirmwareStream, SourceError> {
        self.log.borrow_mut().opened_for.push(active_bank);
        Ok(FirmwareStream {
            size: self.declared_size,
            reader: Box::new(io::Cursor::new(self.firmware.clone())),
        })
    }
}

/// Reader that reports `WouldBlock` a fixed number of times before each
/// read, for exercising the transfer engine's yield path.
pub struct StutteringReader<R> {
    inner: R,
    stalls_before_read: u32,
    stalled: u32,
}

impl<R: Read> StutteringReader<R> {
    pub fn new(inner: R, stalls_before_read: u32) -> Self {
        Self {
            inner,
            stalls_before_read,
            stalled: 0,
        }
    }
}

impl<R: Read> Read for StutteringReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.stalled < self.stalls_before_read {
            self.stalled += 1;
            return Err(io::Error::new(io::ErrorKind::WouldBlock, "no bytes yet"));
        }
        self.stalled = 0;
        self.inner.read(buf)
    }
}

// --- Version store double ---

/// In-memory version store recording every write.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<(u32, Vec<u32>)>>,
}

impl MemoryStore {
    pub fn new(current: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new((current, Vec::new()))),
        }
    }

    pub fn current(&self) -> u32 {
        self.state.borrow().0
    }

    pub fn writes(&self) -> Vec<u32> {
        self.state.borrow().1.clone()
    }
}

impl VersionStore for MemoryStore {
    fn load(&mut self) -> Result<u32, StoreError> {
        Ok(self.state.borrow().0)
    }

    fn store(&mut self, version: u32) -> Result<(), StoreError> {
        let mut state = self.state.borrow_mut();
        state.0 = version;
        state.1.push(version);
        Ok(())
    }
}
