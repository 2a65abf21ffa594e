// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Statement lines and the structures recognized inside them.
//!
//! A line is first stripped of its trailing comment and of a leading `.label`.
//! What remains is tried as a constant definition (`NAME EQU VALUE`) and then
//! as a macro invocation (`name param, <text, with commas>`).

use std::io::{Read, Seek};
use std::sync::Arc;

use crate::core::chunk::{Chunk, ChunkKind};
use crate::core::error::ImportError;
use crate::core::file::Constant;
use crate::core::importer::ImportContext;
use crate::core::macro_def::Macro;
use crate::core::options::CompatMode;
use crate::core::symbols::match_macro;
use crate::core::text_utils::{normalize_formatting, strip_comment, tokens};
use crate::core::value::parse_int_or_default;

#[derive(Debug, Clone)]
pub struct Line {
    text: String,
    inline_label: Option<String>,
    structure: Option<LineStructure>,
    is_unknown_type: bool,
}

impl Line {
    /// The raw line, tabs replaced by spaces.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn inline_label(&self) -> Option<&str> {
        self.inline_label.as_deref()
    }

    pub fn structure(&self) -> Option<&LineStructure> {
        self.structure.as_ref()
    }

    pub fn is_unknown_type(&self) -> bool {
        self.is_unknown_type
    }

    pub fn as_define(&self) -> Option<&DefineStructure> {
        match &self.structure {
            Some(LineStructure::Define(define)) => Some(define),
            _ => None,
        }
    }

    pub fn as_invocation(&self) -> Option<&MacroInvocation> {
        match &self.structure {
            Some(LineStructure::Invoke(invocation)) => Some(invocation),
            _ => None,
        }
    }

    pub fn as_label(&self) -> Option<&LabelStructure> {
        match &self.structure {
            Some(LineStructure::Label(label)) => Some(label),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum LineStructure {
    Define(DefineStructure),
    Invoke(MacroInvocation),
    Label(LabelStructure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineStructure {
    name: String,
    value: String,
}

impl DefineStructure {
    /// `NAME <keyword> VALUE ...` where the keyword contains `equ` (legacy) or
    /// is `equ` (strict), ignoring case.
    pub fn try_parse(input: &str, mode: CompatMode) -> Option<Self> {
        let normalized = normalize_formatting(input);
        let blocks = tokens(&normalized);
        if blocks.len() <= 2 {
            return None;
        }
        let keyword = blocks[1].to_lowercase();
        let matched = match mode {
            CompatMode::Legacy => keyword.contains("equ"),
            CompatMode::Strict => keyword == "equ",
        };
        if !matched {
            return None;
        }
        Some(Self {
            name: blocks[0].to_string(),
            value: blocks[2].to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// `name:` label. Recognized by [`LabelStructure::try_parse`] but never
/// attached by line dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelStructure {
    name: String,
}

impl LabelStructure {
    pub fn try_parse(input: &str) -> Option<Self> {
        let normalized = normalize_formatting(input);
        let idx = normalized.find(':')?;
        Some(Self {
            name: normalized[..idx].to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeParameter {
    content: String,
    name: Option<String>,
}

impl InvokeParameter {
    pub fn new(content: impl Into<String>, name: Option<String>) -> Self {
        Self {
            content: content.into(),
            name,
        }
    }

    /// Text found at the call site.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Declared name of the matching macro parameter, if there is one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn int_or_default(&self) -> i64 {
        parse_int_or_default(&self.content)
    }
}

#[derive(Debug, Clone)]
pub struct MacroInvocation {
    macro_ref: Arc<Macro>,
    parameters: Vec<InvokeParameter>,
}

impl MacroInvocation {
    /// Resolve the first token against `candidates` and split the rest into
    /// parameters.
    pub fn try_parse(input: &str, candidates: &[&Arc<Macro>], mode: CompatMode) -> Option<Self> {
        let input = input.trim();
        let first = input.split(' ').next()?;
        let macro_ref = match_macro(candidates, first, mode)?;
        let parameters = match input.find(' ') {
            Some(idx) => split_invoke_parameters(&input[idx + 1..])
                .into_iter()
                .enumerate()
                .map(|(i, content)| {
                    InvokeParameter::new(content, macro_ref.parameters().get(i).cloned())
                })
                .collect(),
            None => Vec::new(),
        };
        Some(Self {
            macro_ref: Arc::clone(macro_ref),
            parameters,
        })
    }

    pub fn macro_ref(&self) -> &Arc<Macro> {
        &self.macro_ref
    }

    pub fn parameters(&self) -> &[InvokeParameter] {
        &self.parameters
    }

    pub fn parameter(&self, index: usize) -> Option<&InvokeParameter> {
        self.parameters.get(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanMode {
    Regular,
    String,
}

/// Split invocation parameters.
///
/// Outside `<...>` a comma ends a parameter, alphanumerics are kept and any
/// other character is dropped. Inside `<...>` everything is kept verbatim,
/// commas included. The trailing buffer is always pushed, even when empty.
pub fn split_invoke_parameters(text: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut current = String::new();
    let mut mode = ScanMode::Regular;
    for ch in text.chars() {
        match mode {
            ScanMode::Regular => match ch {
                ',' => params.push(std::mem::take(&mut current)),
                '<' => mode = ScanMode::String,
                c if c.is_alphanumeric() => current.push(c),
                _ => {}
            },
            ScanMode::String => match ch {
                '>' => mode = ScanMode::Regular,
                c => current.push(c),
            },
        }
    }
    params.push(current);
    params
}

/// Split a leading `.label` off a statement. The label runs to the first
/// space; the rest of the statement is returned.
fn take_inline_label(statement: &str) -> (Option<String>, &str) {
    let trimmed = statement.trim_start();
    let Some(rest) = trimmed.strip_prefix('.') else {
        return (None, statement);
    };
    match rest.find(' ') {
        Some(idx) => (Some(rest[..idx].to_string()), &rest[idx..]),
        None => (Some(rest.trim_end().to_string()), ""),
    }
}

/// Consume one statement line starting at `position`.
///
/// Defines register a constant on the file being built. The chunk covers the
/// line and its terminator.
pub(crate) fn parse_line<R: Read + Seek>(
    ctx: &mut ImportContext<'_, R>,
    position: u64,
    line: i64,
    is_unknown_type: bool,
) -> Result<Option<Chunk>, ImportError> {
    ctx.cursor.seek(position)?;
    let Some(text) = ctx.cursor.read_line()? else {
        return Ok(None);
    };
    let length = ctx.cursor.position() - position;
    let (inline_label, statement) = take_inline_label(strip_comment(&text));

    let mut structure = None;
    if !statement.trim().is_empty() {
        if let Some(define) = DefineStructure::try_parse(statement, ctx.mode()) {
            ctx.file.add_constant(Constant::new(
                define.name(),
                define.value(),
                ctx.path(),
                position,
                length,
                line,
            ));
            structure = Some(LineStructure::Define(define));
        } else {
            let invocation = {
                let candidates = ctx.visible_macros();
                MacroInvocation::try_parse(statement, &candidates, ctx.mode())
            };
            structure = invocation.map(LineStructure::Invoke);
        }
    }

    let parsed = Line {
        text,
        inline_label,
        structure,
        is_unknown_type,
    };
    Ok(Some(Chunk::new(
        ctx.path(),
        position,
        line,
        length,
        ChunkKind::Line(parsed),
    )))
}
