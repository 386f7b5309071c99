// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI for the bytecode verifier
//!
//! Loads a program (object file or raw bytecode), prints a short summary,
//! and reports the verification verdict via the exit status.
//!
//! # Usage
//!
//! ```bash
//! verifier program.o            # code taken from the .text section
//! verifier program.o classifier # named section
//! verifier program.bin          # raw 8-byte instruction records
//! ```

use std::path::Path;
use std::{env, process};

use verifier::{Verifier, load_program};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <program-file> [section]", args[0]);
        process::exit(1);
    }

    let path = Path::new(&args[1]);
    let section = args.get(2).map(String::as_str);

    let program = load_program(path, section).unwrap_or_else(|e| {
        eprintln!("Failed to load program: {e}");
        process::exit(1);
    });

    // Print summary
    let branch_count = program.iter().filter(|i| i.is_branch()).count();
    let back_edge_count = program
        .iter()
        .filter(|i| i.is_branch() && i.offset < 0)
        .count();

    println!("Loaded {} instructions", program.len());
    println!("  Branches: {branch_count}");
    println!("  Backward branches: {back_edge_count}");

    println!("\nFirst {} instructions:", program.len().min(20));
    for (offset, inst) in program.iter().take(20).enumerate() {
        println!("  {offset:4}: {inst}");
    }

    match Verifier::new(&program).verify() {
        Ok(()) => println!("\nVerification passed"),
        Err(e) => {
            eprintln!("\nVerification failed: {e}");
            process::exit(1);
        }
    }
}
