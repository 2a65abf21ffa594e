// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Comment chunks.

use std::io::{Read, Seek};

use crate::core::chunk::{Chunk, ChunkKind};
use crate::core::error::ImportError;
use crate::core::importer::ImportContext;
use crate::core::text_utils::normalize_formatting;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    text: String,
}

impl Comment {
    /// Build from a raw comment line: every `;` becomes a space, then the
    /// text is trimmed and space runs are collapsed.
    pub fn from_raw(raw: &str) -> Self {
        Self {
            text: normalize_formatting(&raw.replace(';', " ")),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Consume one comment line starting at `position`.
///
/// The chunk length is the byte length of the line as stored in the source,
/// without its terminator, not of the decoded or normalized text.
pub(crate) fn parse_comment<R: Read + Seek>(
    ctx: &mut ImportContext<'_, R>,
    position: u64,
    line: i64,
) -> Result<Option<Chunk>, ImportError> {
    ctx.cursor.seek(position)?;
    let Some(raw) = ctx.cursor.read_line()? else {
        return Ok(None);
    };
    let length = ctx.cursor.last_line_len();
    let comment = Comment::from_raw(&raw);
    Ok(Some(Chunk::new(
        ctx.path(),
        position,
        line,
        length,
        ChunkKind::Comment(comment),
    )))
}
