// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Top-level verification
//!
//! Provides [`Verifier`], which runs the safety passes described in the
//! crate-level documentation and reports the first failure as the verdict.

use ebpf::Instruction;

use crate::control_flow::ControlFlowChecker;
use crate::error::VerificationResult;
use crate::registers::RegisterInitChecker;

/// Verifier for register VM bytecode.
///
/// A program that verifies is safe for the execution engine to run without
/// per-instruction checks for the covered properties: control flow stays
/// inside the program and terminates, and no register is read before it
/// holds a value.
pub struct Verifier<'a> {
    program: &'a [Instruction],
}

impl<'a> Verifier<'a> {
    /// Create a verifier for the given program.
    pub fn new(program: &'a [Instruction]) -> Self {
        Self { program }
    }

    /// Run all passes. All-or-nothing: the first failure is the verdict,
    /// and a failed program must not be executed.
    ///
    /// The control-flow shape pass runs first; programs with malformed
    /// control flow are rejected before register state is examined.
    pub fn verify(&self) -> VerificationResult {
        ControlFlowChecker::new(self.program).verify()?;
        RegisterInitChecker::new(self.program).verify()
    }
}
