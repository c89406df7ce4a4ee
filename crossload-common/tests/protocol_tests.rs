// SPDX-License-Identifier: MIT
// Copyright (c) 2026 ADNT Sarl <info@adnt.io>

//! Unit tests for the protocol vocabulary and constants.

use crossload_common::protocol::{
    Bank, Opcode, BANK_RETRY_ATTEMPTS, BANK_RETRY_DELAY_MS, CHUNK_SETTLE_DELAY_MS,
    ERASE_DELAY_MS, FINALIZE_DELAY_MS, INTER_EXCHANGE_DELAY_MS, MAX_CHUNK_LEN, POLL,
    REBOOT_SETTLE_DELAY_MS, RESPONSE_DELAY_MS, RSP_ERROR, RSP_OK, RSP_PONG,
};

// --- Opcode tests ---

#[test]
fn test_opcode_bytes() {
    assert_eq!(Opcode::Ping.byte(), 0x01);
    assert_eq!(Opcode::StartOta.byte(), 0x10);
    assert_eq!(Opcode::DataChunk.byte(), 0x20);
    assert_eq!(Opcode::EndOta.byte(), 0x30);
    assert_eq!(Opcode::GetVersion.byte(), 0x40);
    assert_eq!(Opcode::Reboot.byte(), 0x50);
    assert_eq!(Opcode::GetBankId.byte(), 0x60);
}

#[test]
fn test_opcode_round_trip() {
    for op in [
        Opcode::Ping,
        Opcode::StartOta,
        Opcode::DataChunk,
        Opcode::EndOta,
        Opcode::GetVersion,
        Opcode::Reboot,
        Opcode::GetBankId,
    ] {
        assert_eq!(Opcode::try_from(op.byte()), Ok(op));
    }
}

#[test]
fn test_opcode_rejects_unknown_bytes() {
    assert_eq!(Opcode::try_from(0x00), Err(0x00));
    assert_eq!(Opcode::try_from(0x02), Err(0x02));
    assert_eq!(Opcode::try_from(0xFF), Err(0xFF));
}

// --- Response codes ---

#[test]
fn test_response_codes() {
    assert_eq!(RSP_PONG, 0x02);
    assert_eq!(RSP_OK, 0xAA);
    assert_eq!(RSP_ERROR, 0xFF);
    assert_eq!(POLL, 0x00);
}

#[test]
fn test_response_codes_do_not_collide_with_opcodes() {
    // A response byte must never decode as a command the target would act on.
    assert!(Opcode::try_from(RSP_OK).is_err());
    assert!(Opcode::try_from(RSP_ERROR).is_err());
    assert!(Opcode::try_from(RSP_PONG).is_err());
}

// --- Framing and timing contract ---

#[test]
fn test_chunk_cap_fits_length_byte() {
    assert!(MAX_CHUNK_LEN < 256);
    assert_eq!(MAX_CHUNK_LEN, 64);
}

#[test]
fn test_long_waits_cover_flash_operations() {
    // Erase and finalize waits are issue-to-poll gaps, so they must dwarf
    // the ordinary response delay.
    assert!(ERASE_DELAY_MS > RESPONSE_DELAY_MS);
    assert!(FINALIZE_DELAY_MS > RESPONSE_DELAY_MS);
    assert!(REBOOT_SETTLE_DELAY_MS >= FINALIZE_DELAY_MS);
}

#[test]
fn test_timing_constants() {
    assert_eq!(INTER_EXCHANGE_DELAY_MS, 5);
    assert_eq!(RESPONSE_DELAY_MS, 10);
    assert_eq!(CHUNK_SETTLE_DELAY_MS, 5);
    assert_eq!(ERASE_DELAY_MS, 3000);
    assert_eq!(FINALIZE_DELAY_MS, 4000);
}

#[test]
fn test_bank_discovery_bounds() {
    assert_eq!(BANK_RETRY_ATTEMPTS, 5);
    assert_eq!(BANK_RETRY_DELAY_MS, 100);
}

// --- Bank tests ---

#[test]
fn test_bank_from_wire_valid() {
    assert_eq!(Bank::from_wire(0), Some(Bank::A));
    assert_eq!(Bank::from_wire(1), Some(Bank::B));
}

#[test]
fn test_bank_from_wire_invalid() {
    assert_eq!(Bank::from_wire(2), None);
    assert_eq!(Bank::from_wire(0xAA), None);
    assert_eq!(Bank::from_wire(0xFF), None);
}

#[test]
fn test_bank_wire_ids() {
    assert_eq!(Bank::A.wire_id(), 0);
    assert_eq!(Bank::B.wire_id(), 1);
}

#[test]
fn test_bank_complement() {
    assert_eq!(Bank::A.complement(), Bank::B);
    assert_eq!(Bank::B.complement(), Bank::A);
    assert_eq!(Bank::A.complement().complement(), Bank::A);
}
