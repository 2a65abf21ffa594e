// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types for importing assembly sources.
//!
//! Malformed macro headers and input that ends mid-parse are not errors: they
//! are recorded in the produced chunks. Only failures of the text source and
//! the optional deadline/cancel hook abort an import.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("cannot open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("read error: {0}")]
    Read(#[from] io::Error),

    #[error("import of {} exceeded its deadline at line {line}", path.display())]
    DeadlineExceeded { path: PathBuf, line: i64 },

    #[error("import of {} was cancelled at line {line}", path.display())]
    Cancelled { path: PathBuf, line: i64 },
}

/// Classifier failure. Callers read this as end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("chunk header is empty")]
    EmptyHeader,
}
