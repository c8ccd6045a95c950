//! Shader source sanitization
//!
//! Removes comments and squeezes whitespace so shader text can be embedded as
//! a compact string literal. Comment removal is done by a small scanner that
//! tracks quoted literals, so `"a//b"` inside an `#include` survives intact.

use regex::Regex;
use std::sync::OnceLock;

/// Newline followed by any whitespace (blank lines, indentation)
fn blank_lines_regex() -> &'static Regex {
    static BLANK_LINES: OnceLock<Regex> = OnceLock::new();
    BLANK_LINES.get_or_init(|| Regex::new(r"\n\s*").expect("Invalid blank line regex"))
}

/// Runs of horizontal whitespace
fn spaces_regex() -> &'static Regex {
    static SPACES: OnceLock<Regex> = OnceLock::new();
    SPACES.get_or_init(|| Regex::new(r"[ \t]+").expect("Invalid space regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment { spans_lines: bool },
    Quoted(char),
}

/// Strip `/* */` and `//` comments
///
/// A block comment containing a line break is replaced by a single `\n` so the
/// code around it stays on separate lines. An unterminated block comment
/// swallows the rest of the input.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut state = State::Code;

    while let Some(c) = chars.next() {
        state = match state {
            State::Code => match (c, chars.peek()) {
                ('/', Some('/')) => {
                    chars.next();
                    State::LineComment
                }
                ('/', Some('*')) => {
                    chars.next();
                    State::BlockComment { spans_lines: false }
                }
                ('"', _) | ('\'', _) => {
                    out.push(c);
                    State::Quoted(c)
                }
                _ => {
                    out.push(c);
                    State::Code
                }
            },
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    State::Code
                } else {
                    State::LineComment
                }
            }
            State::BlockComment { spans_lines } => match (c, chars.peek()) {
                ('*', Some('/')) => {
                    chars.next();
                    if spans_lines {
                        out.push('\n');
                    }
                    State::Code
                }
                ('\n', _) => State::BlockComment { spans_lines: true },
                _ => State::BlockComment { spans_lines },
            },
            State::Quoted(quote) => {
                out.push(c);
                if c == '\\' {
                    // A line break always ends the literal, even when escaped
                    if let Some(escaped) = chars.next_if(|&next| next != '\n') {
                        out.push(escaped);
                    }
                    State::Quoted(quote)
                } else if c == quote || c == '\n' {
                    State::Code
                } else {
                    State::Quoted(quote)
                }
            }
        };
    }

    out
}

/// Remove blank lines and indentation, squeeze spaces, trim both ends
pub fn collapse_whitespace(source: &str) -> String {
    let text = blank_lines_regex().replace_all(source, "\n");
    let text = spaces_regex().replace_all(&text, " ");
    text.trim().to_string()
}

/// Full sanitization: comments first, then whitespace
pub fn sanitize(source: &str) -> String {
    collapse_whitespace(&strip_comments(source))
}
