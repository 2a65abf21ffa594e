// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Advisory include diagnostics, chunk listings and serializable summaries.

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;

use crate::core::chunk::{Chunk, ChunkKind};
use crate::core::file::AsmFile;
use crate::core::line::LineStructure;

/// Expected include names whose basename matches no supplied include.
/// Names compare exactly, case included.
pub fn missing_includes<'a, S: AsRef<str>>(
    expected: &'a [S],
    includes: &[Arc<AsmFile>],
) -> Vec<&'a str> {
    expected
        .iter()
        .map(|name| name.as_ref())
        .filter(|name| {
            !includes.iter().any(|file| {
                file.path()
                    .file_name()
                    .is_some_and(|base| base.to_string_lossy() == *name)
            })
        })
        .collect()
}

/// Text report of missing includes, or `None` when every expected include is
/// present. Never blocks an import.
pub fn include_report<S: AsRef<str>>(expected: &[S], includes: &[Arc<AsmFile>]) -> Option<String> {
    let missing = missing_includes(expected, includes);
    if missing.is_empty() {
        return None;
    }
    let mut out = String::from("The following include files are expected but were not supplied:\n");
    for name in missing {
        out.push_str(&format!("  {name}\n"));
    }
    out.push_str("Symbols they define will not be resolved.");
    Some(out)
}

/// Writer for chunk listings.
pub struct ListingWriter<W: Write> {
    out: W,
}

impl<W: Write> ListingWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn header(&mut self, title: &str) -> std::io::Result<()> {
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "LINE  POS     LEN   KIND     DETAIL")?;
        writeln!(self.out, "----  ------  ----  -------  ------")?;
        Ok(())
    }

    pub fn write_chunk(&mut self, chunk: &Chunk) -> std::io::Result<()> {
        writeln!(
            self.out,
            "{:>4}  {:06X}  {:>4}  {:<7}  {}",
            chunk.line(),
            chunk.position(),
            chunk.length(),
            chunk.chunk_type().as_str(),
            chunk_detail(chunk)
        )
    }

    /// Every top-level chunk of `file`, in line order.
    pub fn write_file(&mut self, file: &AsmFile) -> std::io::Result<()> {
        self.header(&file.path().display().to_string())?;
        let mut chunks: Vec<&Chunk> = file.chunks().iter().collect();
        chunks.sort_by_key(|chunk| chunk.line());
        for chunk in chunks {
            self.write_chunk(chunk)?;
        }
        writeln!(
            self.out,
            "{} chunks, {} constants",
            file.chunks().len(),
            file.constants().len()
        )
    }
}

fn chunk_detail(chunk: &Chunk) -> String {
    match chunk.kind() {
        ChunkKind::Comment(comment) => comment.text().to_string(),
        ChunkKind::Macro(mac) if !mac.is_valid() => "<invalid macro header>".to_string(),
        ChunkKind::Macro(mac) => format!(
            "{}({}) {} body lines",
            mac.name(),
            mac.parameters().join(", "),
            mac.body().len()
        ),
        ChunkKind::Line(line) => match line.structure() {
            Some(LineStructure::Define(define)) => {
                format!("{} = {}", define.name(), define.value())
            }
            Some(LineStructure::Invoke(invocation)) => {
                let params: Vec<String> = invocation
                    .parameters()
                    .iter()
                    .map(|p| match p.name() {
                        Some(name) => format!("{name}={}", p.content()),
                        None => p.content().to_string(),
                    })
                    .collect();
                format!("{}! {}", invocation.macro_ref().name(), params.join(", "))
            }
            Some(LineStructure::Label(label)) => format!("{}:", label.name()),
            None => line.text().trim().to_string(),
        },
    }
}

#[derive(Debug, Serialize)]
pub struct FileSummary {
    pub path: String,
    pub chunks: Vec<ChunkSummary>,
    pub constants: Vec<ConstantSummary>,
}

#[derive(Debug, Serialize)]
pub struct ChunkSummary {
    pub kind: &'static str,
    pub line: i64,
    pub position: u64,
    pub length: u64,
    #[serde(flatten)]
    pub detail: ChunkDetail,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChunkDetail {
    Comment {
        text: String,
    },
    Macro {
        name: String,
        parameters: Vec<String>,
        valid: bool,
        body: Vec<ChunkSummary>,
    },
    Line {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        structure: Option<StructureSummary>,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StructureSummary {
    Define {
        name: String,
        value: String,
    },
    Invoke {
        macro_name: String,
        parameters: Vec<ParameterSummary>,
    },
    Label {
        name: String,
    },
}

#[derive(Debug, Serialize)]
pub struct ParameterSummary {
    pub content: String,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConstantSummary {
    pub name: String,
    pub value: String,
    pub line: i64,
}

impl FileSummary {
    pub fn from_file(file: &AsmFile) -> Self {
        let mut chunks: Vec<&Chunk> = file.chunks().iter().collect();
        chunks.sort_by_key(|chunk| chunk.line());
        Self {
            path: file.path().display().to_string(),
            chunks: chunks.into_iter().map(ChunkSummary::from_chunk).collect(),
            constants: file
                .constants()
                .iter()
                .map(|c| ConstantSummary {
                    name: c.name().to_string(),
                    value: c.value().to_string(),
                    line: c.line(),
                })
                .collect(),
        }
    }
}

impl ChunkSummary {
    pub fn from_chunk(chunk: &Chunk) -> Self {
        let detail = match chunk.kind() {
            ChunkKind::Comment(comment) => ChunkDetail::Comment {
                text: comment.text().to_string(),
            },
            ChunkKind::Macro(mac) => ChunkDetail::Macro {
                name: mac.name().to_string(),
                parameters: mac.parameters().to_vec(),
                valid: mac.is_valid(),
                body: mac.body_chunks().map(ChunkSummary::from_chunk).collect(),
            },
            ChunkKind::Line(line) => ChunkDetail::Line {
                text: line.text().to_string(),
                label: line.inline_label().map(str::to_string),
                structure: line.structure().map(|s| match s {
                    LineStructure::Define(define) => StructureSummary::Define {
                        name: define.name().to_string(),
                        value: define.value().to_string(),
                    },
                    LineStructure::Invoke(invocation) => StructureSummary::Invoke {
                        macro_name: invocation.macro_ref().name().to_string(),
                        parameters: invocation
                            .parameters()
                            .iter()
                            .map(|p| ParameterSummary {
                                content: p.content().to_string(),
                                name: p.name().map(str::to_string),
                            })
                            .collect(),
                    },
                    LineStructure::Label(label) => StructureSummary::Label {
                        name: label.name().to_string(),
                    },
                }),
            },
        };
        Self {
            kind: chunk.chunk_type().as_str(),
            line: chunk.line(),
            position: chunk.position(),
            length: chunk.length(),
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::importer::Importer;
    use std::io::Cursor;

    fn import(path: &str, text: &str) -> AsmFile {
        Importer::new()
            .import_reader(path, Cursor::new(text.as_bytes().to_vec()))
            .unwrap()
    }

    #[test]
    fn reports_missing_expected_includes() {
        let includes = vec![Arc::new(import("src/SHMACS.INC", ""))];
        let expected = ["SHMACS.INC", "VARS.INC", "shmacs.inc"];
        assert_eq!(missing_includes(&expected, &includes), vec!["VARS.INC", "shmacs.inc"]);
        let report = include_report(&expected, &includes).unwrap();
        assert!(report.contains("  VARS.INC\n"));
        assert!(!report.contains("  SHMACS.INC\n"));
    }

    #[test]
    fn no_report_when_all_present() {
        let includes = vec![Arc::new(import("MAPMACS.INC", ""))];
        assert!(include_report(&["MAPMACS.INC"], &includes).is_none());
    }

    #[test]
    fn listing_shows_each_chunk() {
        let file = import("demo.asm", "; intro\nFOO EQU 1\nnop MACRO a\n endm\n");
        let mut out = Vec::new();
        ListingWriter::new(&mut out).write_file(&file).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("demo.asm\n"));
        assert!(text.contains("comment  intro"));
        assert!(text.contains("FOO = 1"));
        assert!(text.contains("nop(a) 1 body lines"));
        assert!(text.ends_with("3 chunks, 1 constants\n"));
    }

    #[test]
    fn summary_serializes_structures() {
        let file = import("demo.asm", "go MACRO x\n endm\ngo <a b>\n");
        let json = serde_json::to_value(FileSummary::from_file(&file)).unwrap();
        let chunks = json["chunks"].as_array().unwrap();
        assert_eq!(chunks[0]["kind"], "macro");
        assert_eq!(chunks[0]["name"], "go");
        assert_eq!(chunks[1]["structure"]["type"], "invoke");
        assert_eq!(chunks[1]["structure"]["parameters"][0]["content"], "a b");
        assert_eq!(chunks[1]["structure"]["parameters"][0]["name"], "x");
    }
}
