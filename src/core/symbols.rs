// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Macro name resolution across the file being imported and its includes.

use std::sync::Arc;

use crate::core::file::AsmFile;
use crate::core::macro_def::Macro;
use crate::core::options::CompatMode;

/// Files whose macros are visible: the includes in order, then the file being
/// built. Later files sharing a path with an earlier one are skipped.
pub fn visible_files<'a>(includes: &'a [Arc<AsmFile>], current: &'a AsmFile) -> Vec<&'a AsmFile> {
    let mut files: Vec<&AsmFile> = Vec::with_capacity(includes.len() + 1);
    for file in includes.iter().map(|f| f.as_ref()).chain(std::iter::once(current)) {
        if files.iter().all(|seen| seen.path() != file.path()) {
            files.push(file);
        }
    }
    files
}

/// Every macro defined at the top level of the given files, in file order.
pub fn visible_macros<'a>(files: &[&'a AsmFile]) -> Vec<&'a Arc<Macro>> {
    files.iter().copied().flat_map(|file| file.macros()).collect()
}

/// Find the macro invoked as `name`.
///
/// In legacy mode a match needs some candidate named exactly
/// `name.to_lowercase()` and then returns the first candidate named exactly
/// `name`; mixed-case invocations therefore usually resolve to nothing.
pub fn match_macro<'a>(
    candidates: &[&'a Arc<Macro>],
    name: &str,
    mode: CompatMode,
) -> Option<&'a Arc<Macro>> {
    match mode {
        CompatMode::Legacy => {
            let lowered = name.to_lowercase();
            if !candidates.iter().any(|m| m.name() == lowered) {
                return None;
            }
            candidates.iter().copied().find(|m| m.name() == name)
        }
        CompatMode::Strict => candidates
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(name)),
    }
}
