// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Control-flow shape verification
//!
//! Two structural properties, checked on one walk: no cycle is reachable
//! from the entry, and every instruction is reachable from the entry.
//!
//! Loop detection rides the walker's visit order. When the visitor runs at
//! a branch, the branch's own offset is not yet marked, so a backward
//! target that *is* marked was reached by some other path first — the edge
//! closes a cycle. Forward edges and backward edges into untouched code
//! never trigger; descending into them is safe, and if they do close a
//! cycle the walk comes back around to a marked target. This test is
//! conservative but sound for any cycle reachable from the entry.

use ebpf::Instruction;

use crate::error::{VerificationError, VerificationResult};
use crate::walker::{VisitedSet, Visitor, branch_target, walk_paths};

/// Checks a program's control-flow shape: no loops, no dead code,
/// well-formed jump targets.
pub struct ControlFlowChecker<'a> {
    program: &'a [Instruction],
}

impl<'a> ControlFlowChecker<'a> {
    pub fn new(program: &'a [Instruction]) -> Self {
        Self { program }
    }

    /// Run the pass.
    ///
    /// Self-jumps, out-of-bounds targets and loops abort the walk and are
    /// reported first; the dead-code scan only runs over a structurally
    /// sound walk.
    pub fn verify(&self) -> VerificationResult {
        let mut visited = VisitedSet::new(self.program.len());
        walk_paths(self.program, &mut BackEdgeVisitor, 0, &mut visited)?;

        match visited.unvisited().next() {
            Some(offset) => Err(VerificationError::DeadCode { offset }),
            None => Ok(()),
        }
    }
}

/// Fails on a backward branch whose target was already reached.
struct BackEdgeVisitor;

impl Visitor for BackEdgeVisitor {
    fn visit(
        &mut self,
        _program: &[Instruction],
        inst: &Instruction,
        offset: usize,
        visited: &VisitedSet,
    ) -> VerificationResult {
        if !inst.is_branch() {
            return Ok(());
        }
        let target = branch_target(offset, inst);
        // Negative targets are the walker's out-of-bounds case, not a
        // back-edge.
        if target >= 0 && (target as usize) < offset && visited.contains(target as usize) {
            return Err(VerificationError::LoopDetected {
                offset,
                target: target as usize,
            });
        }
        Ok(())
    }
}
