// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Import configuration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Case rules applied while recognizing line structures.
///
/// `Legacy` reproduces the historical rules exactly: a define keyword only has
/// to *contain* `equ`, the macro keyword must *equal* `macro`, and a macro is
/// only resolved when the invoked name is already lower case and some macro
/// carries exactly that name. `Strict` compares whole keywords and macro names
/// case-insensitively and takes macro parameters from after the keyword token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompatMode {
    #[default]
    Legacy,
    Strict,
}

/// Shared flag that asks a running import to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub mode: CompatMode,
    /// Abort with `DeadlineExceeded` once this instant has passed.
    pub deadline: Option<Instant>,
    pub cancel: Option<CancelFlag>,
}

impl ImportOptions {
    pub fn strict() -> Self {
        Self {
            mode: CompatMode::Strict,
            ..Self::default()
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }
}
