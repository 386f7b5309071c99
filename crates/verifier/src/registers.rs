// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Register-initialization verification
//!
//! Every register must be written before it is read, on every path from
//! the entry. The calling convention seeds two registers (context pointer
//! and frame pointer); a `call` defines the return-value register; and the
//! `xor rN, rN` zeroing idiom counts as a write even though it nominally
//! reads its operand.
//!
//! Two modes with the same transfer rules:
//!
//! - [`RegisterInitChecker::verify`] computes a forward fixed point over
//!   the control-flow graph, taking the **intersection** of initialization
//!   state over all predecessors. A register must be defined on every path
//!   reaching a read.
//! - [`RegisterInitChecker::verify_first_path`] checks reads against a
//!   single state accumulated along the depth-first walk, matching the
//!   engine's original acceptance behavior exactly. A read is checked
//!   against whichever path the walk discovers first, so a register
//!   missing on a later-discovered path slips through. Use `verify` unless
//!   compatibility with that behavior is required.

use std::collections::VecDeque;

use ebpf::{Instruction, RETURN_REG};
use ebpf::opcode::{AluOp, InsnKind, Source};

use crate::error::{VerificationError, VerificationResult};
use crate::walker::{VisitedSet, Visitor, branch_target, walk_paths};

/// Set of registers known to hold a value, as a bitmask over the register
/// file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegSet(u16);

impl RegSet {
    /// Registers initialized by the calling convention on entry: the
    /// context pointer and the frame pointer.
    pub fn entry() -> Self {
        let mut set = Self(0);
        set.insert(ebpf::CTX_REG);
        set.insert(ebpf::FRAME_PTR_REG);
        set
    }

    pub fn contains(self, register: u8) -> bool {
        self.0 & (1 << u16::from(register)) != 0
    }

    pub fn insert(&mut self, register: u8) {
        self.0 |= 1 << u16::from(register);
    }

    /// Registers initialized in both sets.
    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

/// Checks that no register is read before it is written.
pub struct RegisterInitChecker<'a> {
    program: &'a [Instruction],
}

impl<'a> RegisterInitChecker<'a> {
    pub fn new(program: &'a [Instruction]) -> Self {
        Self { program }
    }

    /// Run the pass over all paths.
    ///
    /// A forward fixed point: each offset's incoming state is the
    /// intersection of its predecessors' outgoing states, so a read is
    /// only accepted when the register is defined on *every* path reaching
    /// it. Structural faults (self-jump, out-of-bounds target) surface
    /// from the reachability walk first; reads are then checked in
    /// ascending offset order for a deterministic verdict.
    pub fn verify(&self) -> VerificationResult {
        if self.program.is_empty() {
            return Ok(());
        }
        let mut visited = VisitedSet::new(self.program.len());
        walk_paths(self.program, &mut Reachability, 0, &mut visited)?;

        // Fixed point. States only lose bits after their first assignment,
        // so each offset re-enters the worklist a bounded number of times.
        let mut state: Vec<Option<RegSet>> = vec![None; self.program.len()];
        state[0] = Some(RegSet::entry());
        let mut worklist = VecDeque::from([0usize]);
        while let Some(offset) = worklist.pop_front() {
            let Some(input) = state[offset] else { continue };
            let output = transfer(&self.program[offset], input);
            for succ in successors(self.program, offset) {
                let merged = match state[succ] {
                    None => output,
                    Some(existing) => existing.intersection(output),
                };
                if state[succ] != Some(merged) {
                    state[succ] = Some(merged);
                    worklist.push_back(succ);
                }
            }
        }

        for (offset, inst) in self.program.iter().enumerate() {
            let Some(input) = state[offset] else {
                // Unreachable instructions have no incoming state; the
                // control-flow pass owns that complaint.
                continue;
            };
            if zeroing_idiom(inst) {
                continue;
            }
            if inst.reads_src() && !input.contains(inst.src) {
                return Err(VerificationError::UninitializedRegister {
                    offset,
                    register: inst.src,
                });
            }
        }
        Ok(())
    }

    /// Run the pass along the first discovered path only.
    ///
    /// Exact parity with the original engine: one register state
    /// accumulates across the whole depth-first walk, and each read is
    /// checked at the moment the walk first reaches it.
    pub fn verify_first_path(&self) -> VerificationResult {
        let mut visited = VisitedSet::new(self.program.len());
        let mut visitor = InitVisitor {
            init: RegSet::entry(),
        };
        walk_paths(self.program, &mut visitor, 0, &mut visited)
    }
}

/// No-op visitor: the walk itself computes reachability and reports
/// structural faults.
struct Reachability;

impl Visitor for Reachability {
    fn visit(
        &mut self,
        _program: &[Instruction],
        _inst: &Instruction,
        _offset: usize,
        _visited: &VisitedSet,
    ) -> VerificationResult {
        Ok(())
    }
}

/// The single-state visitor of the first-path mode.
struct InitVisitor {
    init: RegSet,
}

impl Visitor for InitVisitor {
    fn visit(
        &mut self,
        _program: &[Instruction],
        inst: &Instruction,
        offset: usize,
        _visited: &VisitedSet,
    ) -> VerificationResult {
        if zeroing_idiom(inst) {
            self.init.insert(inst.dst);
        } else if inst.reads_src() && !self.init.contains(inst.src) {
            return Err(VerificationError::UninitializedRegister {
                offset,
                register: inst.src,
            });
        } else if inst.writes_dst() {
            self.init.insert(inst.dst);
        }
        if inst.is_call() {
            self.init.insert(RETURN_REG);
        }
        Ok(())
    }
}

/// `xor rN, rN`: zeroes the register regardless of its prior value, so it
/// defines rather than reads.
fn zeroing_idiom(inst: &Instruction) -> bool {
    matches!(
        inst.kind(),
        InsnKind::Alu32(AluOp::Xor, Source::Reg) | InsnKind::Alu64(AluOp::Xor, Source::Reg)
    ) && inst.dst == inst.src
}

/// Apply an instruction's register definitions to an incoming state.
fn transfer(inst: &Instruction, mut state: RegSet) -> RegSet {
    if inst.writes_dst() {
        state.insert(inst.dst);
    }
    if inst.is_call() {
        state.insert(RETURN_REG);
    }
    state
}

/// Successor offsets, matching the walker's edges exactly: every non-exit
/// instruction falls through, branches add their target.
fn successors(program: &[Instruction], offset: usize) -> impl Iterator<Item = usize> {
    let inst = &program[offset];
    let mut fallthrough = None;
    let mut target = None;
    if !inst.is_exit() {
        if offset + 1 < program.len() {
            fallthrough = Some(offset + 1);
        }
        if inst.is_branch() {
            let t = branch_target(offset, inst);
            // In-bounds by the time this runs: the reachability walk has
            // already validated every reachable branch.
            if t >= 0 && (t as usize) < program.len() {
                target = Some(t as usize);
            }
        }
    }
    [fallthrough, target].into_iter().flatten()
}
