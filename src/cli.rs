// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing, argument validation and the import run.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{ArgAction, Parser, ValueEnum};
use thiserror::Error;
use tracing::{info, Level};

use crate::core::error::ImportError;
use crate::core::file::AsmFile;
use crate::core::importer::Importer;
use crate::core::options::{CompatMode, ImportOptions};
use crate::core::report::{include_report, FileSummary, ListingWriter};

pub const VERSION: &str = "1.0";

const LONG_ABOUT: &str = "Importer for 65816 assembly sources.

Splits each input into comments, statement lines and macro definitions, records
EQU constants and resolves macro invocations against the macros of the include
files. Nothing is assembled or expanded.

Includes given with -I are imported first, in order; each one sees the macros
of the includes before it. Inputs given with -i see every include.
Use -e to name include files the inputs expect; missing ones are reported
but never stop the import.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "asm816",
    version = VERSION,
    about = "Importer for 65816 assembly sources",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(
        short = 'i',
        long = "infile",
        value_name = "FILE",
        action = ArgAction::Append,
        long_help = "Assembly source to import (repeatable)."
    )]
    pub infiles: Vec<PathBuf>,
    #[arg(
        short = 'I',
        long = "include",
        value_name = "FILE",
        action = ArgAction::Append,
        long_help = "Include file whose macros are visible to invocations (repeatable). Imported in the order given."
    )]
    pub includes: Vec<PathBuf>,
    #[arg(
        short = 'e',
        long = "expect",
        value_name = "NAME",
        action = ArgAction::Append,
        long_help = "Include file basename the inputs expect, e.g. SHMACS.INC (repeatable). Compared exactly against the basenames given with -I."
    )]
    pub expected: Vec<String>,
    #[arg(
        long = "strict",
        action = ArgAction::SetTrue,
        long_help = "Case-insensitive macro resolution and exact EQU keyword matching."
    )]
    pub strict: bool,
    #[arg(
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        long_help = "Output format: a text listing or a JSON summary."
    )]
    pub format: OutputFormat,
    #[arg(
        long = "timeout-ms",
        value_name = "N",
        long_help = "Abort an import that runs longer than N milliseconds. Each include and input gets its own limit."
    )]
    pub timeout_ms: Option<u64>,
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        default_value_t = Level::WARN,
        long_help = "Diagnostics written to stderr: TRACE, DEBUG, INFO, WARN or ERROR."
    )]
    pub log_level: Level,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("No input files specified. Use -i/--infile")]
    NoInputs,
    #[error("--timeout-ms must be at least 1")]
    ZeroTimeout,
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("Error writing output: {0}")]
    Output(#[from] io::Error),
    #[error("Error encoding JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub infiles: Vec<PathBuf>,
    pub includes: Vec<PathBuf>,
    pub expected: Vec<String>,
    pub mode: CompatMode,
    pub format: OutputFormat,
    pub timeout: Option<Duration>,
}

impl CliConfig {
    /// Options for one import. The deadline, if any, starts now.
    pub fn import_options(&self) -> ImportOptions {
        let options = ImportOptions {
            mode: self.mode,
            ..ImportOptions::default()
        };
        match self.timeout {
            Some(timeout) => options.with_deadline(Instant::now() + timeout),
            None => options,
        }
    }
}

/// Validate CLI arguments and return parsed configuration.
pub fn validate_cli(cli: &Cli) -> Result<CliConfig, CliError> {
    if cli.infiles.is_empty() {
        return Err(CliError::NoInputs);
    }
    if cli.timeout_ms == Some(0) {
        return Err(CliError::ZeroTimeout);
    }
    Ok(CliConfig {
        infiles: cli.infiles.clone(),
        includes: cli.includes.clone(),
        expected: cli.expected.clone(),
        mode: if cli.strict {
            CompatMode::Strict
        } else {
            CompatMode::Legacy
        },
        format: cli.format,
        timeout: cli.timeout_ms.map(Duration::from_millis),
    })
}

/// Importer for one file, seeing `includes`. Each call starts a fresh
/// deadline, so `--timeout-ms` limits every import on its own.
pub fn importer_for(config: &CliConfig, includes: &[Arc<AsmFile>]) -> Importer {
    let mut importer = Importer::with_options(config.import_options());
    importer.set_includes(includes.iter().cloned());
    importer
}

/// Import includes then inputs, as configured.
pub fn import_all(config: &CliConfig) -> Result<(Vec<Arc<AsmFile>>, Vec<AsmFile>), CliError> {
    let mut includes: Vec<Arc<AsmFile>> = Vec::new();
    for path in &config.includes {
        let file = importer_for(config, &includes).import(path)?;
        includes.push(Arc::new(file));
    }

    let mut files = Vec::new();
    for path in &config.infiles {
        files.push(importer_for(config, &includes).import(path)?);
    }
    Ok((includes, files))
}

/// Write the imported files to `out` in the configured format.
pub fn write_output<W: Write>(
    config: &CliConfig,
    includes: &[Arc<AsmFile>],
    files: &[AsmFile],
    mut out: W,
) -> Result<(), CliError> {
    match config.format {
        OutputFormat::Text => {
            let mut listing = ListingWriter::new(&mut out);
            for file in includes.iter().map(Arc::as_ref).chain(files) {
                listing.write_file(file)?;
            }
            if !config.expected.is_empty() {
                if let Some(report) = include_report(&config.expected, includes) {
                    writeln!(out, "{report}")?;
                }
            }
        }
        OutputFormat::Json => {
            let summaries: Vec<FileSummary> = includes
                .iter()
                .map(Arc::as_ref)
                .chain(files)
                .map(FileSummary::from_file)
                .collect();
            serde_json::to_writer_pretty(&mut out, &summaries)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn run(cli: &Cli) -> Result<(), CliError> {
    let config = validate_cli(cli)?;
    let (includes, files) = import_all(&config)?;
    info!(
        includes = includes.len(),
        inputs = files.len(),
        "import finished"
    );
    let stdout = io::stdout();
    write_output(&config, &includes, &files, stdout.lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;

    #[test]
    fn cli_parses_inputs_and_includes() {
        let cli = Cli::parse_from([
            "asm816",
            "-i",
            "game.asm",
            "-I",
            "SHMACS.INC",
            "-I",
            "MAPMACS.INC",
            "-e",
            "SHMACS.INC",
            "--strict",
            "--format",
            "json",
            "--timeout-ms",
            "250",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.infiles, vec![PathBuf::from("game.asm")]);
        assert_eq!(
            cli.includes,
            vec![PathBuf::from("SHMACS.INC"), PathBuf::from("MAPMACS.INC")]
        );
        assert_eq!(cli.expected, vec!["SHMACS.INC".to_string()]);
        assert!(cli.strict);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.timeout_ms, Some(250));
        assert_eq!(cli.log_level, Level::DEBUG);
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["asm816", "-i", "game.asm"]);
        assert!(!cli.strict);
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(cli.timeout_ms, None);
        assert_eq!(cli.log_level, Level::WARN);
        let config = validate_cli(&cli).expect("validate cli");
        assert_eq!(config.mode, CompatMode::Legacy);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn validate_cli_requires_inputs() {
        let cli = Cli::parse_from(["asm816", "-I", "SHMACS.INC"]);
        let err = validate_cli(&cli).unwrap_err();
        assert_eq!(err.to_string(), "No input files specified. Use -i/--infile");
    }

    #[test]
    fn validate_cli_rejects_zero_timeout() {
        let cli = Cli::parse_from(["asm816", "-i", "game.asm", "--timeout-ms", "0"]);
        let err = validate_cli(&cli).unwrap_err();
        assert_eq!(err.to_string(), "--timeout-ms must be at least 1");
    }

    #[test]
    fn strict_flag_selects_strict_mode() {
        let cli = Cli::parse_from(["asm816", "-i", "game.asm", "--strict"]);
        let config = validate_cli(&cli).expect("validate cli");
        assert_eq!(config.import_options().mode, CompatMode::Strict);
    }

    #[test]
    fn imports_inputs_against_includes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let include = dir.path().join("SHMACS.INC");
        let input = dir.path().join("game.asm");
        fs::write(&include, "wait MACRO frames\n endm\n").expect("write include");
        fs::write(&input, "; boot\n wait 3\n").expect("write input");

        let cli = Cli::parse_from([
            "asm816".into(),
            "-i".into(),
            input.clone().into_os_string(),
            "-I".into(),
            include.into_os_string(),
            "-e".into(),
            "SHMACS.INC".into(),
            "-e".into(),
            "VARS.INC".into(),
        ]);
        let config = validate_cli(&cli).expect("validate cli");
        let (includes, files) = import_all(&config).expect("import");
        assert_eq!(includes.len(), 1);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].macro_invocations().count(), 1);

        let mut out = Vec::new();
        write_output(&config, &includes, &files, &mut out).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("wait! frames=3"));
        assert!(text.contains("  VARS.INC\n"));
        assert!(!text.contains("  SHMACS.INC\n"));
    }

    #[test]
    fn later_includes_see_earlier_ones() {
        let dir = tempfile::tempdir().expect("temp dir");
        let first = dir.path().join("a.inc");
        let second = dir.path().join("b.inc");
        let input = dir.path().join("main.asm");
        fs::write(&first, "go MACRO\n endm\n").expect("write");
        fs::write(&second, " go\n").expect("write");
        fs::write(&input, "").expect("write");

        let config = CliConfig {
            infiles: vec![input],
            includes: vec![first, second],
            expected: Vec::new(),
            mode: CompatMode::Legacy,
            format: OutputFormat::Json,
            timeout: None,
        };
        let (includes, _) = import_all(&config).expect("import");
        assert_eq!(includes[1].macro_invocations().count(), 1);
    }

    #[test]
    fn each_import_gets_its_own_deadline() {
        let config = CliConfig {
            infiles: vec![PathBuf::from("game.asm")],
            includes: Vec::new(),
            expected: Vec::new(),
            mode: CompatMode::Legacy,
            format: OutputFormat::Text,
            timeout: Some(Duration::from_millis(200)),
        };
        let first = importer_for(&config, &[]).options().deadline.expect("deadline");
        std::thread::sleep(Duration::from_millis(5));
        let second = importer_for(&config, &[]).options().deadline.expect("deadline");
        assert!(second > first);
    }

    #[test]
    fn timeout_applies_per_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let first = dir.path().join("a.asm");
        let second = dir.path().join("b.asm");
        fs::write(&first, "rts\n").expect("write");
        fs::write(&second, "rts\n").expect("write");
        let config = CliConfig {
            infiles: vec![first, second],
            includes: Vec::new(),
            expected: Vec::new(),
            mode: CompatMode::Legacy,
            format: OutputFormat::Text,
            timeout: Some(Duration::from_millis(300)),
        };
        let importer = importer_for(&config, &[]);
        std::thread::sleep(Duration::from_millis(350));
        assert!(matches!(
            importer.import(&config.infiles[0]),
            Err(ImportError::DeadlineExceeded { .. })
        ));
        let (_, files) = import_all(&config).expect("each file has its own limit");
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn missing_input_is_an_import_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = CliConfig {
            infiles: vec![dir.path().join("absent.asm")],
            includes: Vec::new(),
            expected: Vec::new(),
            mode: CompatMode::Legacy,
            format: OutputFormat::Text,
            timeout: None,
        };
        let err = import_all(&config).unwrap_err();
        assert!(matches!(err, CliError::Import(ImportError::Io { .. })));
    }
}
