// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Import engine.
//!
//! An import is one top-to-bottom scan of a source. Each step saves the cursor
//! offset, reads a header line, classifies it and hands the same offset to the
//! owning parser, which consumes the line (or, for a macro definition, the
//! whole definition). The resulting chunk is added to the file's chunk set.
//!
//! All state for one scan lives in an [`ImportContext`] that is passed by
//! reference into every parser, including the nested dispatch of macro bodies,
//! so there is a single line counter for the whole import.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};

use crate::core::chunk::{conjecture, Chunk, ChunkType};
use crate::core::comment::parse_comment;
use crate::core::cursor::LineCursor;
use crate::core::error::{ClassifyError, ImportError};
use crate::core::file::AsmFile;
use crate::core::line::parse_line;
use crate::core::macro_def::{parse_macro, Macro};
use crate::core::options::{CompatMode, ImportOptions};
use crate::core::symbols::{visible_files, visible_macros};

/// Mutable state of one import.
pub struct ImportContext<'a, R> {
    pub(crate) cursor: LineCursor<R>,
    pub(crate) file: AsmFile,
    pub(crate) current_line: i64,
    pub(crate) includes: &'a [Arc<AsmFile>],
    pub(crate) options: &'a ImportOptions,
}

impl<'a, R: Read + Seek> ImportContext<'a, R> {
    fn new(
        path: &Path,
        cursor: LineCursor<R>,
        includes: &'a [Arc<AsmFile>],
        options: &'a ImportOptions,
    ) -> Self {
        Self {
            cursor,
            file: AsmFile::new(path),
            current_line: -1,
            includes,
            options,
        }
    }

    pub(crate) fn path(&self) -> Arc<Path> {
        self.file.shared_path()
    }

    pub(crate) fn mode(&self) -> CompatMode {
        self.options.mode
    }

    /// Macros visible to an invocation: those of the includes plus those
    /// already collected in the file being built.
    pub(crate) fn visible_macros(&self) -> Vec<&Arc<Macro>> {
        let files = visible_files(self.includes, &self.file);
        visible_macros(&files)
    }

    /// Fail if the deadline has passed or the import was cancelled.
    pub(crate) fn check_interrupt(&self) -> Result<(), ImportError> {
        if let Some(cancel) = &self.options.cancel {
            if cancel.is_cancelled() {
                return Err(ImportError::Cancelled {
                    path: self.file.path().to_path_buf(),
                    line: self.current_line,
                });
            }
        }
        if let Some(deadline) = self.options.deadline {
            if Instant::now() >= deadline {
                return Err(ImportError::DeadlineExceeded {
                    path: self.file.path().to_path_buf(),
                    line: self.current_line,
                });
            }
        }
        Ok(())
    }

    /// Classify and consume the chunk starting at the cursor.
    ///
    /// Returns `None` at end of input and for blank statement lines.
    pub(crate) fn process_chunk(&mut self) -> Result<Option<Chunk>, ImportError> {
        let position = self.cursor.position();
        let header = self.cursor.read_line()?;
        let kind = match conjecture(header.as_deref()) {
            Ok(kind) => kind,
            Err(ClassifyError::EmptyHeader) => return Ok(None),
        };
        self.current_line += 1;
        let line = self.current_line;

        let chunk = match kind {
            ChunkType::Comment => parse_comment(self, position, line)?,
            ChunkType::Macro => parse_macro(self, position, line)?,
            ChunkType::Line | ChunkType::Unknown => {
                parse_line(self, position, line, kind == ChunkType::Unknown)?
            }
        };
        let chunk = chunk.filter(|chunk| match chunk.as_line() {
            Some(parsed) => !parsed.text().trim().is_empty(),
            None => true,
        });
        if let Some(chunk) = &chunk {
            trace!(
                line,
                position,
                length = chunk.length(),
                kind = chunk.chunk_type().as_str(),
                "chunk"
            );
        }
        Ok(chunk)
    }

    fn run(mut self) -> Result<AsmFile, ImportError> {
        while !self.cursor.is_at_end()? {
            self.check_interrupt()?;
            if let Some(chunk) = self.process_chunk()? {
                self.file.insert_chunk(chunk);
            }
        }
        debug!(
            path = %self.file.path().display(),
            chunks = self.file.chunks().len(),
            constants = self.file.constants().len(),
            "imported"
        );
        Ok(self.file)
    }
}

/// Imports assembly sources against a list of include files.
///
/// The importer holds no per-import state, so one instance can serve several
/// imports, on several threads, at once.
#[derive(Debug, Clone, Default)]
pub struct Importer {
    includes: Vec<Arc<AsmFile>>,
    options: ImportOptions,
}

impl Importer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ImportOptions) -> Self {
        Self {
            includes: Vec::new(),
            options,
        }
    }

    /// Files whose macros are visible to invocations. Consulted, never changed.
    pub fn set_includes<I>(&mut self, includes: I)
    where
        I: IntoIterator<Item = Arc<AsmFile>>,
    {
        self.includes = includes.into_iter().collect();
    }

    pub fn includes(&self) -> &[Arc<AsmFile>] {
        &self.includes
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn import(&self, path: impl AsRef<Path>) -> Result<AsmFile, ImportError> {
        let path = path.as_ref();
        let source = File::open(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.import_reader(path, source)
    }

    /// Import from any seekable source, recording `path` as its file path.
    pub fn import_reader<R: Read + Seek>(
        &self,
        path: impl AsRef<Path>,
        source: R,
    ) -> Result<AsmFile, ImportError> {
        let cursor = LineCursor::new(source)?;
        ImportContext::new(path.as_ref(), cursor, &self.includes, &self.options).run()
    }
}
