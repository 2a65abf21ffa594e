// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Macro definitions.
//!
//! A definition is a header line `NAME MACRO [param, ...]` followed by body
//! lines up to and including the first line that contains `endm` in any case.
//! Body lines are classified and parsed through the same dispatch as top-level
//! lines, so a body may itself hold comments, defines or nested definitions.
//! Definitions are cataloged, never expanded.

use std::io::{Read, Seek};
use std::sync::Arc;

use tracing::warn;

use crate::core::chunk::{Chunk, ChunkKind};
use crate::core::error::ImportError;
use crate::core::importer::ImportContext;
use crate::core::options::CompatMode;
use crate::core::text_utils::{contains_ignore_case, normalize_formatting, tokens};

const MACRO_KEYWORD: &str = "macro";
const END_KEYWORD: &str = "endm";

#[derive(Debug, Clone)]
pub struct Macro {
    name: String,
    parameters: Vec<String>,
    body: Vec<Option<Chunk>>,
    is_valid: bool,
}

impl Macro {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter names, in order.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// One entry per consumed body line. Blank lines leave a `None`.
    pub fn body(&self) -> &[Option<Chunk>] {
        &self.body
    }

    pub fn body_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.body.iter().flatten()
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    #[cfg(test)]
    pub(crate) fn detached(name: &str, parameters: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            body: Vec::new(),
            is_valid: true,
        }
    }
}

/// True when the second whitespace-separated token equals `macro`, ignoring case.
pub fn check_macro_header(header: &str) -> bool {
    let normalized = normalize_formatting(header);
    let blocks = tokens(&normalized);
    blocks.len() >= 2 && blocks[1].to_lowercase() == MACRO_KEYWORD
}

/// Name and parameter names of a well-formed header.
fn parse_header(normalized: &str, mode: CompatMode) -> Option<(String, Vec<String>)> {
    let blocks = tokens(normalized);
    if blocks.len() < 2 || blocks[1].to_lowercase() != MACRO_KEYWORD {
        return None;
    }
    let name = blocks[0].to_string();
    if blocks.len() == 2 {
        return Some((name, Vec::new()));
    }
    let parameter_text = match mode {
        // The first "macro " in the header, which may sit inside the name.
        CompatMode::Legacy => {
            let lower = normalized.to_ascii_lowercase();
            let start = lower.find("macro ")? + "macro ".len();
            normalized[start..].to_string()
        }
        CompatMode::Strict => blocks[2..].join(" "),
    };
    let parameters = parameter_text
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();
    Some((name, parameters))
}

/// Consume a macro definition starting at `position`.
///
/// A malformed header still yields a chunk, marked invalid and without a body.
/// A body with no terminator runs to end of input.
pub(crate) fn parse_macro<R: Read + Seek>(
    ctx: &mut ImportContext<'_, R>,
    position: u64,
    line: i64,
) -> Result<Option<Chunk>, ImportError> {
    ctx.cursor.seek(position)?;
    let Some(header) = ctx.cursor.read_line()? else {
        return Ok(None);
    };
    let mut length = ctx.cursor.position() - position;
    let normalized = normalize_formatting(&header);

    let Some((name, parameters)) = parse_header(&normalized, ctx.mode()) else {
        warn!(line, header = %normalized, "malformed macro header");
        let blocks = tokens(&normalized);
        let name = if blocks.len() >= 2 { blocks[0] } else { "" };
        let invalid = Macro {
            name: name.to_string(),
            parameters: Vec::new(),
            body: Vec::new(),
            is_valid: false,
        };
        return Ok(Some(Chunk::new(
            ctx.path(),
            position,
            line,
            length,
            ChunkKind::Macro(Arc::new(invalid)),
        )));
    };

    let mut body = Vec::new();
    let mut terminated = false;
    while !ctx.cursor.is_at_end()? {
        ctx.check_interrupt()?;
        let start = ctx.cursor.position();
        let Some(peeked) = ctx.cursor.peek_line()? else {
            break;
        };
        let child = ctx.process_chunk()?;
        length += ctx.cursor.position() - start;
        body.push(child);
        if contains_ignore_case(&peeked, END_KEYWORD) {
            terminated = true;
            break;
        }
    }
    if !terminated {
        warn!(macro_name = %name, line, "macro body runs to end of input");
    }

    let mac = Macro {
        name,
        parameters,
        body,
        is_valid: true,
    };
    Ok(Some(Chunk::new(
        ctx.path(),
        position,
        line,
        length,
        ChunkKind::Macro(Arc::new(mac)),
    )))
}
