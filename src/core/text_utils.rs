// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Shared text utilities for chunk classification and parsing.

/// Replace every tab with a single space. Nothing else is touched, so byte
/// lengths are preserved.
pub fn remove_escapes(line: &str) -> String {
    line.replace('\t', " ")
}

/// Remove tabs, trim both ends and collapse runs of spaces to a single space.
pub fn normalize_formatting(line: &str) -> String {
    let line = remove_escapes(line);
    let mut out = String::with_capacity(line.len());
    let mut prev_space = false;
    for ch in line.trim().chars() {
        if ch == ' ' {
            if !prev_space {
                out.push(ch);
            }
            prev_space = true;
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out
}

/// Split already-normalized text on single spaces.
///
/// An empty input yields one empty token, which keeps token counts in line
/// with how headers are measured.
pub fn tokens(normalized: &str) -> Vec<&str> {
    normalized.split(' ').collect()
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Everything before the first `;`. Quotes are not considered.
pub fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_escapes_only_touches_tabs() {
        assert_eq!(remove_escapes("\tLDA\t#$10 "), " LDA #$10 ");
    }

    #[test]
    fn normalize_collapses_and_trims() {
        assert_eq!(normalize_formatting("  FOO\t\tEQU    5  "), "FOO EQU 5");
        assert_eq!(normalize_formatting(""), "");
    }

    #[test]
    fn tokens_of_empty_text() {
        assert_eq!(tokens(""), vec![""]);
        assert_eq!(tokens("a b"), vec!["a", "b"]);
    }

    #[test]
    fn contains_is_case_insensitive() {
        assert!(contains_ignore_case("  EndM", "endm"));
        assert!(!contains_ignore_case("end", "endm"));
    }

    #[test]
    fn strip_comment_cuts_at_first_semicolon() {
        assert_eq!(strip_comment("lda #1 ; load ; again"), "lda #1 ");
        assert_eq!(strip_comment("rts"), "rts");
    }
}
