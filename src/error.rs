// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Error types for YAL parsing and participant construction.

use thiserror::Error;

/// Result type alias using [`YalError`].
pub type Result<T> = std::result::Result<T, YalError>;

#[derive(Error, Debug)]
pub enum YalError {
    /// Input does not match the grammar at some position
    #[error("Syntax error at line {line}, column {column}: expected {expected}, found {found}")]
    Syntax {
        line: usize,
        column: usize,
        offset: usize,
        expected: String,
        found: String,
    },

    /// A section was opened and closed without any entry
    #[error(
        "Incomplete {section} section at line {line}, column {column}: \
         at least one entry is required before {end}"
    )]
    IncompleteSection {
        section: &'static str,
        end: &'static str,
        line: usize,
        column: usize,
        offset: usize,
    },

    /// Boundary too small to draw a random position for a participant
    #[error("Invalid placement bound for '{idx}': {axis} bound {bound} must exceed extent {extent}")]
    Configuration {
        idx: String,
        axis: char,
        bound: i64,
        extent: i64,
    },

    /// A span between two coordinates does not fit in `i64`
    #[error("Extent overflow for '{name}': {axis} span from {low} to {high} does not fit in i64")]
    Extent {
        name: String,
        axis: char,
        low: i64,
        high: i64,
    },

    /// Unknown option name, e.g. a field that cannot be retained
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl YalError {
    /// True for every grammar level failure, including empty sections.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            YalError::Syntax { .. } | YalError::IncompleteSection { .. }
        )
    }

    /// Byte offset into the source text, when the error has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            YalError::Syntax { offset, .. } | YalError::IncompleteSection { offset, .. } => {
                Some(*offset)
            }
            _ => None,
        }
    }
}

impl From<serde_yaml::Error> for YalError {
    fn from(e: serde_yaml::Error) -> Self {
        YalError::Serialize(e.to_string())
    }
}

impl From<serde_json::Error> for YalError {
    fn from(e: serde_json::Error) -> Self {
        YalError::Serialize(e.to_string())
    }
}

impl From<csv::Error> for YalError {
    fn from(e: csv::Error) -> Self {
        YalError::Serialize(e.to_string())
    }
}
