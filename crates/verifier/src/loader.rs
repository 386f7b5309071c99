// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Loading programs from disk
//!
//! Bridges files to the instruction model: an object file (ELF or Mach-O)
//! has its code section extracted with the `object` crate, anything else
//! is treated as a raw stream of 8-byte instruction records. Either way
//! the bytes go through `ebpf::decode_program`, so the verifier only ever
//! sees validated instructions.

use std::fs;
use std::path::{Path, PathBuf};

use ebpf::{DecodeError, Instruction, decode_program};
use object::{Object, ObjectSection};
use thiserror::Error;

/// Section searched when the caller does not name one.
pub const DEFAULT_SECTION: &str = ".text";

/// Errors raised while loading a program file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no section named {section} in object file")]
    NoCodeSection { section: String },

    #[error("failed to read section {section}: {reason}")]
    Section { section: String, reason: String },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Load and decode a program from `path`.
///
/// If the file parses as an object file, the program is taken from
/// `section` (or `.text` when `None`); otherwise the file's bytes are the
/// program.
pub fn load_program(path: &Path, section: Option<&str>) -> Result<Vec<Instruction>, LoadError> {
    let data = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let code = match object::File::parse(&*data) {
        Ok(file) => {
            let name = section.unwrap_or(DEFAULT_SECTION);
            let section = file
                .section_by_name(name)
                .ok_or_else(|| LoadError::NoCodeSection {
                    section: name.to_string(),
                })?;
            section
                .data()
                .map_err(|e| LoadError::Section {
                    section: name.to_string(),
                    reason: e.to_string(),
                })?
                .to_vec()
        }
        // Not an object file: a raw instruction stream.
        Err(_) => data,
    };

    Ok(decode_program(&code)?)
}
