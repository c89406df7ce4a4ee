// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Bus-level protocol vocabulary for bridge <-> target communication.
//!
//! The wire format is deliberately minimal: one-byte opcodes, one-byte
//! responses, and a `[opcode][length][payload]` chunk frame. The target is a
//! single-threaded firmware peer, so the fixed delays below are part of the
//! protocol contract, not tunables.

// --- Commands ---

/// One-byte command opcodes understood by the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Ping = 0x01,
    StartOta = 0x10,
    DataChunk = 0x20,
    EndOta = 0x30,
    GetVersion = 0x40,
    Reboot = 0x50,
    GetBankId = 0x60,
}

impl Opcode {
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

impl From<Opcode> for u8 {
    fn from(op: Opcode) -> Self {
        op.byte()
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        match raw {
            0x01 => Ok(Self::Ping),
            0x10 => Ok(Self::StartOta),
            0x20 => Ok(Self::DataChunk),
            0x30 => Ok(Self::EndOta),
            0x40 => Ok(Self::GetVersion),
            0x50 => Ok(Self::Reboot),
            0x60 => Ok(Self::GetBankId),
            _ => Err(raw),
        }
    }
}

// --- Responses ---

/// Liveness reply to [`Opcode::Ping`].
pub const RSP_PONG: u8 = 0x02;
/// Command accepted / operation completed.
pub const RSP_OK: u8 = 0xAA;
/// Command rejected or operation failed.
pub const RSP_ERROR: u8 = 0xFF;

/// Null byte shifted out to fetch a prepared response (second phase of every
/// command exchange).
pub const POLL: u8 = 0x00;

// --- Chunk framing ---

/// Maximum payload bytes per data chunk. The frame carries a one-byte length
/// field, so this must stay strictly below 256.
pub const MAX_CHUNK_LEN: usize = 64;

const _: () = assert!(MAX_CHUNK_LEN > 0 && MAX_CHUNK_LEN < 256);

// --- Bus timing (microseconds) ---

/// CS asserted to first clock edge.
pub const SETUP_DELAY_US: u32 = 50;
/// Last clock edge to CS release.
pub const HOLD_DELAY_US: u32 = 50;
/// Gap between the chunk opcode, the length byte, and the payload.
pub const CHUNK_HEADER_GAP_US: u32 = 50;
/// Gap between consecutive payload bytes.
pub const CHUNK_BYTE_GAP_US: u32 = 30;

// --- Protocol timing (milliseconds) ---

/// Mandatory pause after every bus transaction; the target needs this to
/// service the exchange before the next one starts.
pub const INTER_EXCHANGE_DELAY_MS: u32 = 5;
/// Issue-to-poll gap for ordinary commands.
pub const RESPONSE_DELAY_MS: u32 = 10;
/// Flash write settle time after a full chunk.
pub const CHUNK_SETTLE_DELAY_MS: u32 = 5;
/// Issue-to-poll gap after [`Opcode::StartOta`]; must exceed the worst-case
/// mass erase of a full bank.
pub const ERASE_DELAY_MS: u32 = 3000;
/// Issue-to-poll gap after [`Opcode::EndOta`]; the target rewrites its
/// metadata sector and flips the active-bank marker in this window.
pub const FINALIZE_DELAY_MS: u32 = 4000;
/// Settle time after [`Opcode::Reboot`] before the target is addressable.
pub const REBOOT_SETTLE_DELAY_MS: u32 = 5000;

// --- Bank discovery ---

pub const BANK_RETRY_ATTEMPTS: u32 = 5;
pub const BANK_RETRY_DELAY_MS: u32 = 100;

// --- Banks ---

/// One of the two firmware banks on the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bank {
    A,
    B,
}

impl Bank {
    /// Decode the raw byte the target reports for its active bank.
    ///
    /// Anything other than 0 or 1 is indeterminate and yields `None`.
    pub fn from_wire(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::A),
            1 => Some(Self::B),
            _ => None,
        }
    }

    pub const fn wire_id(self) -> u8 {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    /// The other bank, i.e. the one a new image lands in.
    pub const fn complement(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}
