// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! YAL Preprocessor
//!
//! Pass 1 of the YAL reader:
//! - Blanks out `// ...` line comments and `/* ... */` block comments
//! - Keeps every newline and every byte offset intact, so grammar positions
//!   map straight back to the original text
//! - Records line starts for offset to line/column conversion

use crate::error::{Result, YalError};

/// Preprocessed YAL content with line mappings
#[derive(Debug, Clone)]
pub struct PreprocessedYal {
    /// Source text with comments replaced by spaces, same length as the input
    pub text: String,
    /// Byte offset of the first character of every line
    pub line_starts: Vec<usize>,
    /// Number of comments removed
    pub comments: usize,
}

impl PreprocessedYal {
    /// 1-based line and column of a byte offset
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        line_col(&self.line_starts, &self.text, offset)
    }

    /// Build a syntax error pointing at `offset`
    pub fn syntax_error(&self, offset: usize, expected: &str) -> YalError {
        let (line, column) = self.line_col(offset);
        YalError::Syntax {
            line,
            column,
            offset,
            expected: expected.to_string(),
            found: describe_found(&self.text[offset.min(self.text.len())..]),
        }
    }
}

/// Preprocess YAL file content
///
/// # Arguments
/// * `content` - Raw file content as string
///
/// # Returns
/// * `PreprocessedYal` - Content with comments blanked out, or a syntax error
///   for a block comment that is never closed
pub fn preprocess(content: &str) -> Result<PreprocessedYal> {
    let line_starts = compute_line_starts(content);
    let mut text = String::with_capacity(content.len());
    let mut comments = 0;
    let mut rest = content;

    while let Some(pos) = rest.find('/') {
        let (before, from_slash) = rest.split_at(pos);
        text.push_str(before);

        if from_slash.starts_with("//") {
            let end = from_slash.find('\n').unwrap_or(from_slash.len());
            blank(&mut text, &from_slash[..end]);
            rest = &from_slash[end..];
            comments += 1;
        } else if from_slash.starts_with("/*") {
            match from_slash[2..].find("*/") {
                Some(close) => {
                    let end = close + 4;
                    blank(&mut text, &from_slash[..end]);
                    rest = &from_slash[end..];
                    comments += 1;
                }
                None => {
                    let offset = content.len() - from_slash.len();
                    let (line, column) = line_col(&line_starts, content, offset);
                    return Err(YalError::Syntax {
                        line,
                        column,
                        offset,
                        expected: "'*/' closing the block comment".to_string(),
                        found: "end of input".to_string(),
                    });
                }
            }
        } else {
            text.push('/');
            rest = &from_slash[1..];
        }
    }
    text.push_str(rest);

    Ok(PreprocessedYal {
        text,
        line_starts,
        comments,
    })
}

/// Replace a comment with spaces, keeping newlines and byte length
fn blank(out: &mut String, comment: &str) {
    for c in comment.chars() {
        if c == '\n' {
            out.push('\n');
        } else {
            out.extend(std::iter::repeat(' ').take(c.len_utf8()));
        }
    }
}

fn compute_line_starts(content: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(content.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

fn line_col(line_starts: &[usize], text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let line = match line_starts.binary_search(&offset) {
        Ok(i) => i,
        Err(i) => i - 1,
    };
    let start = line_starts[line];
    let column = text
        .get(start..offset)
        .map(|s| s.chars().count())
        .unwrap_or(offset - start);
    (line + 1, column + 1)
}

/// Short description of the text at an error position
pub(crate) fn describe_found(rest: &str) -> String {
    let rest = rest.trim_start();
    if rest.is_empty() {
        return "end of input".to_string();
    }
    let token: String = if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_' || c == '-')
    {
        rest.chars()
            .take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
            .collect()
    } else {
        rest.chars().take(1).collect()
    };
    format!("{token:?}")
}
