//! Query input normalization.

use crate::error::LookupError;
use std::fmt;

/// A Unicode code point as an uppercase hex string of at least four digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CodePoint {
    hex: String,
}

impl CodePoint {
    /// Parse a single character or a hex code point (`6578`, `u+6578`,
    /// `U+2A838`).
    ///
    /// Exactly one character is always taken as the character itself, so
    /// `"7"` means U+0037, not U+0007.
    pub fn parse(input: &str) -> Result<Self, LookupError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LookupError::invalid_input(input, "empty input"));
        }

        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Self::from_char(c));
        }

        let digits = strip_unicode_prefix(trimmed).trim();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(LookupError::invalid_input(
                input,
                "expected a single character or a hex code point",
            ));
        }

        let value = u32::from_str_radix(digits, 16)
            .map_err(|e| LookupError::invalid_input(input, e.to_string()))?;
        if value > char::MAX as u32 {
            return Err(LookupError::invalid_input(input, "code point above U+10FFFF"));
        }

        Ok(Self {
            hex: format!("{value:04X}"),
        })
    }

    pub fn from_char(c: char) -> Self {
        Self {
            hex: format!("{:04X}", c as u32),
        }
    }

    /// Uppercase hex digits without prefix, e.g. `6578`.
    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// The character, when the code point is a valid scalar value.
    pub fn as_char(&self) -> Option<char> {
        u32::from_str_radix(&self.hex, 16)
            .ok()
            .and_then(char::from_u32)
    }
}

impl fmt::Display for CodePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U+{}", self.hex)
    }
}

fn strip_unicode_prefix(s: &str) -> &str {
    match s.get(..2) {
        Some(p) if p.eq_ignore_ascii_case("U+") => &s[2..],
        _ => s,
    }
}
