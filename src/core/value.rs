// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Literal values and constant dereferencing.
//!
//! Only decimal and `$` hex literals are understood. Anything else reads as 0.

use crate::core::file::Constant;
use crate::core::text_utils::normalize_formatting;

/// Rounds of constant substitution before giving up on a chain.
const MAX_DEREF_ROUNDS: usize = 32;

/// Parse a literal: any `$` makes the text hex (every `$` removed), otherwise
/// it is decimal. Unparseable text yields 0.
pub fn parse_int_or_default(text: &str) -> i64 {
    let text = text.trim();
    if text.is_empty() {
        return 0;
    }
    if text.contains('$') {
        return parse_hex_or_default(text);
    }
    text.parse::<i64>().unwrap_or(0)
}

/// Parse hex text with every `$` removed. Unparseable text yields 0.
pub fn parse_hex_or_default(text: &str) -> i64 {
    let digits: String = text.trim().chars().filter(|&c| c != '$').collect();
    let (negative, digits) = match digits.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, digits.as_str()),
    };
    match i64::from_str_radix(digits, 16) {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) => 0,
    }
}

/// Parse `value`, replacing constant names with their values first.
///
/// Names compare case-insensitively and the last matching constant wins. A
/// leading `-` on a name negates the substituted value. Substitution repeats
/// until no name is left, so chains of constants resolve; cyclic chains stop
/// after a fixed number of rounds.
pub fn resolve_int<'a, I>(value: &str, constants: I) -> i64
where
    I: IntoIterator<Item = &'a Constant>,
{
    let constants: Vec<&Constant> = constants.into_iter().collect();
    let mut current = value.to_string();
    for _ in 0..MAX_DEREF_ROUNDS {
        let normalized = normalize_formatting(&current);
        let parts: Vec<&str> = normalized.split(' ').collect();
        if parts.len() == 1 {
            if let Ok(number) = parts[0].parse::<i64>() {
                return number;
            }
        }

        let mut rebuilt = String::new();
        let mut substituted = false;
        for part in &parts {
            let (negate, bare) = match part.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, *part),
            };
            let found = constants
                .iter()
                .rev()
                .find(|c| c.name().to_lowercase() == bare.to_lowercase());
            match found {
                Some(constant) if !bare.is_empty() => {
                    if negate {
                        rebuilt.push('-');
                    }
                    rebuilt.push_str(constant.value());
                    substituted = true;
                }
                _ => rebuilt.push_str(part),
            }
        }
        if !substituted {
            return parse_int_or_default(&rebuilt);
        }
        current = rebuilt;
    }
    parse_int_or_default(&current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    fn constant(name: &str, value: &str) -> Constant {
        Constant::new(name, value, Arc::from(Path::new("vars.inc")), 0, 0, 0)
    }

    #[test]
    fn parses_decimal_and_hex() {
        assert_eq!(parse_int_or_default("42"), 42);
        assert_eq!(parse_int_or_default(" -7 "), -7);
        assert_eq!(parse_int_or_default("$1F"), 0x1f);
        assert_eq!(parse_int_or_default("#$ff"), 0);
        assert_eq!(parse_int_or_default("label"), 0);
        assert_eq!(parse_int_or_default(""), 0);
    }

    #[test]
    fn resolves_constant_chains() {
        let consts = [constant("BASE", "$10"), constant("ALIAS", "base")];
        assert_eq!(resolve_int("alias", &consts), 0x10);
        assert_eq!(resolve_int("12", &consts), 12);
    }

    #[test]
    fn last_definition_wins_and_sign_flips() {
        let consts = [constant("speed", "3"), constant("SPEED", "9")];
        assert_eq!(resolve_int("-speed", &consts), -9);
    }

    #[test]
    fn cyclic_constants_terminate() {
        let consts = [constant("a", "b"), constant("b", "a")];
        assert_eq!(resolve_int("a", &consts), 0);
    }
}
