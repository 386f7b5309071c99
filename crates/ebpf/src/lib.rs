// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Instruction model for the register VM
//!
//! This crate is the boundary between the byte-level program encoding and
//! everything that reasons about instructions. It provides:
//!
//! - **The instruction record** ([`Instruction`]): the fixed-size
//!   opcode/dst/src/offset/imm tuple every program is a sequence of.
//! - **Opcode classification** ([`InsnKind`]): the opcode byte's
//!   class/source bit-field decoded exactly once into a closed enum, so
//!   downstream analyses match on variants instead of re-masking bits.
//! - **Wire-format decoding** ([`decode_program`]): 8-byte little-endian
//!   records into validated instructions, with the loader-side checks
//!   (alignment, opcode legality, wide-load pairing, terminal `exit`).
//!
//! Consumers receive instructions whose kind is already known to be valid;
//! malformed encodings never leave this crate.

pub mod decode;
pub mod insn;
pub mod opcode;

pub use decode::{DecodeError, INSN_SIZE, MAX_INSNS, decode_program};
pub use insn::{CTX_REG, FRAME_PTR_REG, Instruction, REGISTER_COUNT, RETURN_REG};
pub use opcode::{AluOp, BranchOp, InsnKind, MemSize, Source};
