// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for bytecode verification

use thiserror::Error;

/// Terminal verdicts for a program under verification.
///
/// Each variant names the failure kind and the offending instruction
/// offset; the `Display` messages are the diagnostic side channel, but
/// callers distinguish failures structurally, never by parsing strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// A branch instruction targets itself.
    #[error("jump to self at offset {offset}")]
    SelfJump { offset: usize },

    /// A branch target falls outside the program.
    #[error("jump out of bounds at offset {offset} to {target}")]
    OutOfBoundsJump { offset: usize, target: i64 },

    /// A backward edge closes a cycle reachable from the entry.
    #[error("loop detected at offset {offset} (back-edge to {target})")]
    LoopDetected { offset: usize, target: usize },

    /// An instruction is never reached from the entry.
    #[error("dead instruction at offset {offset}")]
    DeadCode { offset: usize },

    /// A register is read before any write establishes a value.
    #[error("uninitialized register r{register} accessed at offset {offset}")]
    UninitializedRegister { offset: usize, register: u8 },
}

/// Result type alias for verification.
pub type VerificationResult = Result<(), VerificationError>;
