// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Static safety verifier for register VM bytecode
//!
//! Walks every reachable instruction of a program before the execution
//! engine is allowed to run it, and rejects programs that violate the
//! invariants the engine relies on.
//!
//! # Verification Checklist
//!
//! | Check | Description |
//! |-------|-------------|
//! | **Self jumps** | A branch may not target itself |
//! | **Jump bounds** | Every branch target lands inside the program |
//! | **No loops** | No backward edge may close a cycle reachable from the entry |
//! | **No dead code** | Every instruction is reachable from offset 0 |
//! | **Register initialization** | No register is read before a write (or the calling convention) gives it a value |
//!
//! # Architecture
//!
//! A single traversal engine, [`walk_paths`], owns the control-flow graph
//! implicit in the instruction array (fallthrough and branch-target edges)
//! and drives caller-supplied [`Visitor`]s over it in depth-first
//! pre-order. The two passes are visitors plus their own pass-scoped state:
//!
//! - [`ControlFlowChecker`] rejects back-edges (via the walker's visit
//!   order) and unreachable instructions (via the walk's visited set).
//! - [`RegisterInitChecker`] tracks which registers hold values, either as
//!   a fixed point over all paths (the default) or along the first
//!   discovered path (compatibility with the original engine behavior).
//!
//! [`Verifier`] runs both and reports the first failure as a structured
//! [`VerificationError`]; the execution engine refuses any program whose
//! verdict is not `Ok`. Verification is a pure function of the program:
//! the same input always yields the same verdict.
//!
//! Programs arrive already decoded — byte-level concerns live in the
//! `ebpf` crate, and [`loader`] bridges the two for files on disk.

pub mod control_flow;
pub mod error;
pub mod loader;
pub mod registers;
pub mod verify;
pub mod walker;

pub use control_flow::ControlFlowChecker;
pub use error::{VerificationError, VerificationResult};
pub use loader::{LoadError, load_program};
pub use registers::{RegSet, RegisterInitChecker};
pub use verify::Verifier;
pub use walker::{VisitedSet, Visitor, walk_paths};
