// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Wire-format decoding
//!
//! Programs arrive as a flat byte string of fixed-size 8-byte records:
//! opcode byte, packed dst/src register nibbles, a little-endian signed
//! 16-bit branch displacement, and a little-endian signed 32-bit immediate.
//! [`decode_program`] turns that into validated [`Instruction`]s, applying
//! the loader-side checks the verifier is allowed to assume: every opcode
//! decodes, wide immediate loads span exactly two slots, byte swaps carry a
//! supported width, and the program ends with `exit`.

use thiserror::Error;

use crate::insn::Instruction;
use crate::opcode::{AluOp, InsnKind};

/// Size of one instruction record on the wire, in bytes.
pub const INSN_SIZE: usize = 8;

/// Maximum number of instructions in a program.
pub const MAX_INSNS: usize = 65_536;

/// Errors raised while decoding a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("program is empty")]
    EmptyProgram,

    #[error("program size {size} is not a multiple of {INSN_SIZE} bytes")]
    UnalignedProgram { size: usize },

    #[error("program has {count} instructions, more than the maximum of {MAX_INSNS}")]
    ProgramTooLong { count: usize },

    #[error("opcode {opcode:#04x} is not a valid instruction")]
    UnsupportedOpcode { opcode: u8 },

    #[error("register r{register} is outside the register file")]
    RegisterOutOfRange { register: u8 },

    #[error("illegal opcode {opcode:#04x} at offset {offset}")]
    IllegalOpcode { offset: usize, opcode: u8 },

    #[error("incomplete wide immediate load at offset {offset}")]
    IncompleteLoadImm64 { offset: usize },

    #[error("unsupported byte-swap width {imm} at offset {offset} (expected 16, 32 or 64)")]
    InvalidSwapWidth { offset: usize, imm: i32 },

    #[error("program does not end with an exit instruction (last opcode at offset {offset})")]
    MissingExit { offset: usize },
}

/// Decode a raw byte string into a program.
pub fn decode_program(bytes: &[u8]) -> Result<Vec<Instruction>, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyProgram);
    }
    if bytes.len() % INSN_SIZE != 0 {
        return Err(DecodeError::UnalignedProgram { size: bytes.len() });
    }
    let count = bytes.len() / INSN_SIZE;
    if count > MAX_INSNS {
        return Err(DecodeError::ProgramTooLong { count });
    }

    let mut program = Vec::with_capacity(count);
    let mut expect_high_word = false;
    for (offset, record) in bytes.chunks_exact(INSN_SIZE).enumerate() {
        let opcode = record[0];
        let kind = InsnKind::from_opcode(opcode)
            .ok_or(DecodeError::IllegalOpcode { offset, opcode })?;

        // The opcode-0 continuation slot is only valid right after `lddw`.
        match (kind, expect_high_word) {
            (InsnKind::LoadImm64High, false) => {
                return Err(DecodeError::IllegalOpcode { offset, opcode });
            }
            (InsnKind::LoadImm64High, true) => expect_high_word = false,
            (_, true) => return Err(DecodeError::IncompleteLoadImm64 { offset: offset - 1 }),
            (InsnKind::LoadImm64, false) => expect_high_word = true,
            _ => {}
        }

        let imm = i32::from_le_bytes([record[4], record[5], record[6], record[7]]);
        if matches!(
            kind,
            InsnKind::Alu32(AluOp::ToLe | AluOp::ToBe, _)
        ) && !matches!(imm, 16 | 32 | 64)
        {
            return Err(DecodeError::InvalidSwapWidth { offset, imm });
        }

        let inst = Instruction::new(
            opcode,
            record[1] & 0x0f,
            record[1] >> 4,
            i16::from_le_bytes([record[2], record[3]]),
            imm,
        )?;
        program.push(inst);
    }

    if expect_high_word {
        // `lddw` in the final slot.
        return Err(DecodeError::IncompleteLoadImm64 { offset: count - 1 });
    }

    let last = &program[count - 1];
    if !last.is_exit() {
        return Err(DecodeError::MissingExit { offset: count - 1 });
    }

    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode;

    fn raw(records: &[[u8; 8]]) -> Vec<u8> {
        records.iter().flatten().copied().collect()
    }

    fn record(opcode: u8, dst: u8, src: u8, offset: i16, imm: i32) -> [u8; 8] {
        Instruction::new(opcode, dst, src, offset, imm)
            .expect("valid record")
            .to_bytes()
    }

    #[test]
    fn test_decode_simple_program() {
        let bytes = raw(&[
            record(opcode::MOV64_IMM, 0, 0, 0, 7), // mov r0, 7
            record(opcode::EXIT, 0, 0, 0, 0),      // exit
        ]);
        let program = decode_program(&bytes).expect("decode failed");
        assert_eq!(program.len(), 2);
        assert_eq!(program[0].imm, 7);
        assert!(program[1].is_exit());
    }

    #[test]
    fn test_reject_empty_and_unaligned() {
        assert_eq!(decode_program(&[]), Err(DecodeError::EmptyProgram));
        assert_eq!(
            decode_program(&[0x95, 0, 0]),
            Err(DecodeError::UnalignedProgram { size: 3 })
        );
    }

    #[test]
    fn test_reject_illegal_opcode() {
        let bytes = raw(&[
            [0x20, 0, 0, 0, 0, 0, 0, 0], // legacy packet load
            record(opcode::EXIT, 0, 0, 0, 0),
        ]);
        assert_eq!(
            decode_program(&bytes),
            Err(DecodeError::IllegalOpcode {
                offset: 0,
                opcode: 0x20
            })
        );
    }

    #[test]
    fn test_wide_load_spans_two_slots() {
        let bytes = raw(&[
            record(opcode::LDDW, 1, 0, 0, -1), // lddw r1, lower half
            record(0, 0, 0, 0, 0x7fff_ffff),   // upper half
            record(opcode::EXIT, 0, 0, 0, 0),
        ]);
        let program = decode_program(&bytes).expect("decode failed");
        assert_eq!(program.len(), 3);
        assert_eq!(program[1].kind(), InsnKind::LoadImm64High);
    }

    #[test]
    fn test_reject_split_wide_load() {
        // lddw followed by a normal instruction instead of the
        // continuation slot.
        let bytes = raw(&[
            record(opcode::LDDW, 1, 0, 0, 0),
            record(opcode::MOV64_IMM, 0, 0, 0, 0),
            record(opcode::EXIT, 0, 0, 0, 0),
        ]);
        assert_eq!(
            decode_program(&bytes),
            Err(DecodeError::IncompleteLoadImm64 { offset: 0 })
        );

        // lddw in the final slot.
        let bytes = raw(&[
            record(opcode::MOV64_IMM, 0, 0, 0, 0),
            record(opcode::LDDW, 1, 0, 0, 0),
        ]);
        assert_eq!(
            decode_program(&bytes),
            Err(DecodeError::IncompleteLoadImm64 { offset: 1 })
        );
    }

    #[test]
    fn test_reject_stray_continuation_slot() {
        let bytes = raw(&[
            record(0, 0, 0, 0, 5), // opcode 0 with no preceding lddw
            record(opcode::EXIT, 0, 0, 0, 0),
        ]);
        assert_eq!(
            decode_program(&bytes),
            Err(DecodeError::IllegalOpcode {
                offset: 0,
                opcode: 0
            })
        );
    }

    #[test]
    fn test_reject_bad_swap_width() {
        let bytes = raw(&[
            record(opcode::LE, 1, 0, 0, 24),
            record(opcode::EXIT, 0, 0, 0, 0),
        ]);
        assert_eq!(
            decode_program(&bytes),
            Err(DecodeError::InvalidSwapWidth { offset: 0, imm: 24 })
        );
    }

    #[test]
    fn test_reject_missing_exit() {
        let bytes = raw(&[record(opcode::MOV64_IMM, 0, 0, 0, 7)]);
        assert_eq!(
            decode_program(&bytes),
            Err(DecodeError::MissingExit { offset: 0 })
        );
    }

    #[test]
    fn test_register_nibbles_unpack() {
        let bytes = raw(&[
            record(opcode::ADD64_REG, 3, 12, 0, 0), // add r3, r12
            record(opcode::EXIT, 0, 0, 0, 0),
        ]);
        let program = decode_program(&bytes).expect("decode failed");
        assert_eq!(program[0].dst, 3);
        assert_eq!(program[0].src, 12);
    }
}
