//! Expansion of shorthand assignment listings into question identifiers.
//!
//! A listing such as `sc 1.1, 1.2 ex 3.4, 3.12` names self-check and
//! exercise numbers. `sc` and `ex` switch the section for the numbers that
//! follow; numbers are separated by whitespace and/or commas. The minor part
//! of each number is zero-padded to two digits, so the listing above becomes
//! `Self-Check 1.01`, `Self-Check 1.02`, `Exercise 3.04`, `Exercise 3.12`.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShorthandError {
    #[error("Problem number {0} appears before any 'sc' or 'ex' marker")]
    NoSection(String),
    #[error("Not a problem number: {0}")]
    InvalidNumber(String),
}

pub type ShorthandResult<T> = Result<T, ShorthandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    SelfCheck,
    Exercise,
}

impl Section {
    fn from_marker(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("sc") {
            Some(Self::SelfCheck)
        } else if token.eq_ignore_ascii_case("ex") {
            Some(Self::Exercise)
        } else {
            None
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::SelfCheck => "Self-Check",
            Self::Exercise => "Exercise",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `1.1` -> `1.01`; `3.12` -> `3.12`.
fn pad_number(token: &str) -> ShorthandResult<String> {
    let invalid = || ShorthandError::InvalidNumber(token.to_string());

    let (major, minor) = token.split_once('.').ok_or_else(invalid)?;
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(major) || !is_digits(minor) {
        return Err(invalid());
    }

    Ok(format!("{major}.{minor:0>2}"))
}

pub fn expand(listing: &str) -> ShorthandResult<Vec<String>> {
    let mut section = None;
    let mut questions = Vec::new();

    for token in listing
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        if let Some(marker) = Section::from_marker(token) {
            section = Some(marker);
            continue;
        }

        let number = pad_number(token)?;
        let current = section.ok_or_else(|| ShorthandError::NoSection(token.to_string()))?;
        questions.push(format!("{current} {number}"));
    }

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_switch() {
        let questions = expand("sc 1.1 1.2 ex 3.4 sc 2.5").unwrap();

        assert_eq!(
            questions,
            vec![
                "Self-Check 1.01",
                "Self-Check 1.02",
                "Exercise 3.04",
                "Self-Check 2.05",
            ]
        );
    }

    #[test]
    fn test_commas_and_newlines_separate_numbers() {
        let questions = expand("SC 1.1, 1.2,\nEx 4.10,  4.11,").unwrap();

        assert_eq!(
            questions,
            vec![
                "Self-Check 1.01",
                "Self-Check 1.02",
                "Exercise 4.10",
                "Exercise 4.11",
            ]
        );
    }

    #[test]
    fn test_minor_number_padding() {
        assert_eq!(pad_number("1.1").unwrap(), "1.01");
        assert_eq!(pad_number("12.3").unwrap(), "12.03");
        assert_eq!(pad_number("2.15").unwrap(), "2.15");
        assert_eq!(pad_number("3.05").unwrap(), "3.05");
    }

    #[test]
    fn test_number_before_marker_is_rejected() {
        assert_eq!(
            expand("1.1 sc 1.2"),
            Err(ShorthandError::NoSection("1.1".into()))
        );
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert_eq!(expand("ex 3"), Err(ShorthandError::InvalidNumber("3".into())));
        assert_eq!(expand("ex 3.x"), Err(ShorthandError::InvalidNumber("3.x".into())));
        assert_eq!(expand("ex .4"), Err(ShorthandError::InvalidNumber(".4".into())));
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(expand("  \n"), Ok(Vec::new()));
        assert_eq!(expand("sc ex"), Ok(Vec::new()));
    }
}
