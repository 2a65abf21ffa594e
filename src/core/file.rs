// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Imported files, their chunk sets and the constants they declare.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::core::chunk::{Chunk, ChunkKey};
use crate::core::comment::Comment;
use crate::core::line::{Line, MacroInvocation};
use crate::core::macro_def::Macro;
use crate::core::value::{parse_int_or_default, resolve_int};

/// Set of chunks keyed by `(file, position, length)`, iterated in scan order.
#[derive(Debug, Clone, Default)]
pub struct ChunkSet {
    chunks: BTreeMap<ChunkKey, Chunk>,
}

impl ChunkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk unless an equal one is already present. Returns whether it
    /// was added.
    pub fn insert(&mut self, chunk: Chunk) -> bool {
        let key = chunk.key();
        if self.chunks.contains_key(&key) {
            return false;
        }
        self.chunks.insert(key, chunk);
        true
    }

    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.chunks.contains_key(key)
    }

    pub fn get(&self, key: &ChunkKey) -> Option<&Chunk> {
        self.chunks.get(key)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }
}

/// A named value declared by an `EQU` line.
///
/// Coordinates and line number are those of the defining line.
#[derive(Debug, Clone)]
pub struct Constant {
    name: String,
    value: String,
    file_path: Arc<Path>,
    position: u64,
    length: u64,
    line: i64,
}

impl Constant {
    pub(crate) fn new(
        name: &str,
        value: &str,
        file_path: Arc<Path>,
        position: u64,
        length: u64,
        line: i64,
    ) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            file_path,
            position,
            length,
            line,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// Line number of the defining line.
    pub fn line(&self) -> i64 {
        self.line
    }

    /// Key of the defining line chunk.
    pub fn key(&self) -> ChunkKey {
        ChunkKey {
            file_path: Arc::clone(&self.file_path),
            position: self.position,
            length: self.length,
        }
    }

    pub fn int_or_default(&self) -> i64 {
        parse_int_or_default(&self.value)
    }
}

#[derive(Debug, Clone)]
pub struct AsmFile {
    path: Arc<Path>,
    chunks: ChunkSet,
    constants: Vec<Constant>,
}

impl AsmFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Arc::from(path.as_ref()),
            chunks: ChunkSet::new(),
            constants: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn shared_path(&self) -> Arc<Path> {
        Arc::clone(&self.path)
    }

    /// File name without extension.
    pub fn file_name(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    pub fn chunks(&self) -> &ChunkSet {
        &self.chunks
    }

    pub(crate) fn insert_chunk(&mut self, chunk: Chunk) -> bool {
        self.chunks.insert(chunk)
    }

    /// Constants in declaration order.
    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    /// Register a constant unless one with the same coordinates exists.
    pub(crate) fn add_constant(&mut self, constant: Constant) -> bool {
        let key = constant.key();
        if self.constants.iter().any(|c| c.key() == key) {
            return false;
        }
        self.constants.push(constant);
        true
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.chunks.iter().filter_map(Chunk::as_line)
    }

    /// Line chunks ordered by ascending line number.
    pub fn lines_in_order(&self) -> Vec<&Chunk> {
        let mut lines: Vec<&Chunk> = self
            .chunks
            .iter()
            .filter(|chunk| chunk.as_line().is_some())
            .collect();
        lines.sort_by_key(|chunk| chunk.line());
        lines
    }

    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.chunks.iter().filter_map(Chunk::as_comment)
    }

    pub fn macros(&self) -> impl Iterator<Item = &Arc<Macro>> {
        self.chunks.iter().filter_map(Chunk::as_macro)
    }

    pub fn macro_invocations(&self) -> impl Iterator<Item = &MacroInvocation> {
        self.lines().filter_map(Line::as_invocation)
    }

    pub fn constant_exists(&self, name: &str) -> bool {
        self.constants.iter().any(|c| c.name() == name)
    }

    pub fn constant(&self, name: &str) -> Option<&Constant> {
        self.constants.iter().find(|c| c.name() == name)
    }

    pub fn constant_value(&self, name: &str) -> Option<&str> {
        self.constant(name).map(Constant::value)
    }

    /// Numeric value of `constant`, dereferencing names declared in
    /// `includes`.
    pub fn constant_numeric_value(&self, constant: &Constant, includes: &[Arc<AsmFile>]) -> i64 {
        resolve_int(
            constant.value(),
            includes.iter().flat_map(|file| file.constants()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chunk::ChunkKind;

    fn comment_at(file: &AsmFile, position: u64, length: u64) -> Chunk {
        Chunk::new(
            file.shared_path(),
            position,
            0,
            length,
            ChunkKind::Comment(Comment::from_raw("; c")),
        )
    }

    #[test]
    fn chunk_set_rejects_equal_coordinates() {
        let file = AsmFile::new("a.asm");
        let mut set = ChunkSet::new();
        assert!(set.insert(comment_at(&file, 0, 3)));
        assert!(!set.insert(comment_at(&file, 0, 3)));
        assert!(set.insert(comment_at(&file, 0, 4)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn chunk_set_iterates_by_position() {
        let file = AsmFile::new("a.asm");
        let mut set = ChunkSet::new();
        set.insert(comment_at(&file, 9, 1));
        set.insert(comment_at(&file, 2, 1));
        let positions: Vec<u64> = set.iter().map(Chunk::position).collect();
        assert_eq!(positions, vec![2, 9]);
    }

    #[test]
    fn constant_queries_are_exact_case() {
        let mut file = AsmFile::new("vars.inc");
        let path = file.shared_path();
        assert!(file.add_constant(Constant::new("MAX", "$20", path.clone(), 0, 12, 0)));
        assert!(!file.add_constant(Constant::new("MAX", "$20", path, 0, 12, 0)));
        assert!(file.constant_exists("MAX"));
        assert!(!file.constant_exists("max"));
        assert_eq!(file.constant_value("MAX"), Some("$20"));
        assert_eq!(file.constant("MAX").unwrap().int_or_default(), 0x20);
    }

    #[test]
    fn file_name_drops_extension() {
        assert_eq!(AsmFile::new("src/SHMACS.INC").file_name(), "SHMACS");
    }
}
