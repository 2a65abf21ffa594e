// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! 65816 assembly source importer.
//!
//! Reads assembly sources into collections of classified chunks: comments,
//! statement lines and macro definitions. Statement lines may carry a
//! recognized structure (an `EQU` define or a macro invocation resolved
//! against the include files). Nothing is assembled or expanded.
//!
//! # Components
//!
//! - [`cursor`] - Line cursor with byte positions and rewind
//! - [`chunk`] - Chunk types and the header classifier
//! - [`comment`] - Comment parser
//! - [`line`] - Statement line parser and line structures
//! - [`macro_def`] - Macro definition parser
//! - [`symbols`] - Macro visibility and name resolution
//! - [`file`] - Imported files, chunk sets and constants
//! - [`value`] - Literal parsing and constant dereferencing
//! - [`importer`] - Import engine
//! - [`report`] - Include diagnostics, listings and summaries

pub mod chunk;
pub mod comment;
pub mod cursor;
pub mod error;
pub mod file;
pub mod importer;
pub mod line;
pub mod macro_def;
pub mod options;
pub mod report;
pub mod symbols;
pub mod text_utils;
pub mod value;

// Re-exports for convenience
pub use chunk::{conjecture, Chunk, ChunkKey, ChunkKind, ChunkType};
pub use error::{ClassifyError, ImportError};
pub use file::{AsmFile, ChunkSet, Constant};
pub use importer::{ImportContext, Importer};
pub use line::{DefineStructure, InvokeParameter, LabelStructure, Line, LineStructure, MacroInvocation};
pub use macro_def::Macro;
pub use options::{CancelFlag, CompatMode, ImportOptions};
