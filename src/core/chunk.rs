// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Chunks: classified units of source text, and the header classifier.

use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use crate::core::comment::Comment;
use crate::core::error::ClassifyError;
use crate::core::line::Line;
use crate::core::macro_def::{check_macro_header, Macro};
use crate::core::text_utils::remove_escapes;

/// Which parser owns a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkType {
    Unknown,
    Comment,
    Macro,
    Line,
}

impl ChunkType {
    pub fn as_str(self) -> &'static str {
        match self {
            ChunkType::Unknown => "unknown",
            ChunkType::Comment => "comment",
            ChunkType::Macro => "macro",
            ChunkType::Line => "line",
        }
    }
}

/// Identity of a chunk. Two chunks with the same key are the same chunk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkKey {
    pub file_path: Arc<Path>,
    pub position: u64,
    pub length: u64,
}

#[derive(Debug, Clone)]
pub enum ChunkKind {
    Comment(Comment),
    Line(Line),
    Macro(Arc<Macro>),
}

/// One classified unit of source text.
#[derive(Debug, Clone)]
pub struct Chunk {
    file_path: Arc<Path>,
    position: u64,
    line: i64,
    length: u64,
    kind: ChunkKind,
}

impl Chunk {
    pub(crate) fn new(
        file_path: Arc<Path>,
        position: u64,
        line: i64,
        length: u64,
        kind: ChunkKind,
    ) -> Self {
        Self {
            file_path,
            position,
            line,
            length,
            kind,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Byte offset of the first line of this chunk.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Zero-based line number of the first line of this chunk.
    pub fn line(&self) -> i64 {
        self.line
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Byte offset just past this chunk.
    pub fn end(&self) -> u64 {
        self.position + self.length
    }

    pub fn kind(&self) -> &ChunkKind {
        &self.kind
    }

    pub fn chunk_type(&self) -> ChunkType {
        match self.kind {
            ChunkKind::Comment(_) => ChunkType::Comment,
            ChunkKind::Line(_) => ChunkType::Line,
            ChunkKind::Macro(_) => ChunkType::Macro,
        }
    }

    pub fn key(&self) -> ChunkKey {
        ChunkKey {
            file_path: Arc::clone(&self.file_path),
            position: self.position,
            length: self.length,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match &self.kind {
            ChunkKind::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    pub fn as_line(&self) -> Option<&Line> {
        match &self.kind {
            ChunkKind::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_macro(&self) -> Option<&Arc<Macro>> {
        match &self.kind {
            ChunkKind::Macro(mac) => Some(mac),
            _ => None,
        }
    }
}

impl PartialEq for Chunk {
    fn eq(&self, other: &Self) -> bool {
        self.file_path == other.file_path
            && self.position == other.position
            && self.length == other.length
    }
}

impl Eq for Chunk {}

impl Hash for Chunk {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.file_path.hash(state);
        self.position.hash(state);
        self.length.hash(state);
    }
}

/// Decide which parser owns a header line. First match wins:
/// a leading `;` is a comment, `NAME MACRO ...` is a macro definition and
/// anything else is an ordinary line.
pub fn conjecture(header: Option<&str>) -> Result<ChunkType, ClassifyError> {
    let header = header.ok_or(ClassifyError::EmptyHeader)?;
    let header = remove_escapes(header);
    let header = header.trim_start();
    if header.starts_with(';') {
        return Ok(ChunkType::Comment);
    }
    if check_macro_header(header) {
        return Ok(ChunkType::Macro);
    }
    Ok(ChunkType::Line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::comment::Comment;
    use std::collections::HashSet;

    fn comment_chunk(path: &str, position: u64, length: u64, line: i64) -> Chunk {
        Chunk::new(
            Arc::from(Path::new(path)),
            position,
            line,
            length,
            ChunkKind::Comment(Comment::from_raw("; x")),
        )
    }

    #[test]
    fn classifies_comments_after_indentation() {
        assert_eq!(conjecture(Some("\t  ; note")), Ok(ChunkType::Comment));
    }

    #[test]
    fn classifies_macro_headers_case_insensitively() {
        assert_eq!(conjecture(Some("addxy MaCrO x,y")), Ok(ChunkType::Macro));
        assert_eq!(conjecture(Some("\tnoargs\tmacro")), Ok(ChunkType::Macro));
    }

    #[test]
    fn keyword_must_equal_macro() {
        assert_eq!(conjecture(Some("foo macros a")), Ok(ChunkType::Line));
        assert_eq!(conjecture(Some("macro foo")), Ok(ChunkType::Line));
    }

    #[test]
    fn everything_else_is_a_line() {
        assert_eq!(conjecture(Some("FOO EQU 5")), Ok(ChunkType::Line));
        assert_eq!(conjecture(Some("")), Ok(ChunkType::Line));
    }

    #[test]
    fn absent_header_is_empty_header() {
        assert_eq!(conjecture(None), Err(ClassifyError::EmptyHeader));
    }

    #[test]
    fn equality_ignores_content_and_line() {
        let a = comment_chunk("a.asm", 4, 10, 1);
        let b = comment_chunk("a.asm", 4, 10, 7);
        let c = comment_chunk("b.asm", 4, 10, 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
        let set: HashSet<Chunk> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
