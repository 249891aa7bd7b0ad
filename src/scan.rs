//! Lexical primitives: whitespace skipping, escape processing, text scanning
//!
//! All four text contexts of the grammar (unquoted tag text, quoted text,
//! section body, document body) share one escape-processing loop,
//! [`scan_escaped`]; they differ only in their terminator sets.

use crate::cursor::{is_snow_whitespace, Cursor};
use crate::error::{ErrorKind, ParseError};
use crate::flake::Text;

/// Which text context is being scanned. The terminator set doubles as the
/// "special here" set for escape decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    /// Tag-position text outside quotes.
    Unquoted,
    /// Text delimited by the given quote character.
    Quoted(char),
    /// Literal text inside a section body.
    SectionBody,
    /// Literal text at document level.
    DocumentBody,
}

impl TextMode {
    fn terminates(self, c: char) -> bool {
        match self {
            TextMode::Unquoted => {
                is_snow_whitespace(c)
                    || matches!(c, '{' | '}' | ':' | '[' | ']' | '"' | '\'' | '`')
            }
            TextMode::Quoted(q) => c == q,
            TextMode::SectionBody => c == '{' || c == ']',
            TextMode::DocumentBody => c == '{',
        }
    }

    /// Escaping a reserved character drops the backslash; escaping
    /// anything else keeps it. The escape character itself is always
    /// reserved.
    fn reserved(self, c: char) -> bool {
        c == '\\' || self.terminates(c)
    }
}

/// How a scan stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEnd {
    /// Stopped at an unescaped terminator, which was not consumed.
    Terminator(char),
    /// Ran out of input.
    Eof,
    /// Ran out of input immediately after a backslash. Never a silent
    /// success; every caller turns this into its "unexpected end" error.
    DanglingEscape,
}

/// Consume code points into `buf` until an unescaped terminator of `mode`
/// or end of input. Escaped characters still undergo newline
/// normalization before being appended.
pub fn scan_escaped(cursor: &mut Cursor, mode: TextMode, buf: &mut String) -> ScanEnd {
    loop {
        let Some(c) = cursor.peek() else {
            return ScanEnd::Eof;
        };
        if c == '\\' {
            cursor.advance();
            let Some(escaped) = cursor.advance() else {
                return ScanEnd::DanglingEscape;
            };
            if !mode.reserved(escaped) {
                buf.push('\\');
            }
            buf.push(escaped);
            continue;
        }
        if mode.terminates(c) {
            return ScanEnd::Terminator(c);
        }
        if let Some(c) = cursor.advance() {
            buf.push(c);
        }
    }
}

/// Skip as much whitespace as possible.
pub fn skip_whitespace(cursor: &mut Cursor) {
    while cursor.peek().is_some_and(is_snow_whitespace) {
        cursor.advance();
    }
}

/// Scan one text value in tag position.
///
/// Quoted text requires its closing quote (`QuotedTextUnterminated`
/// otherwise, anchored at the opening quote) and may be empty: `""` is a
/// real empty text, distinct from no text at all. Unquoted text returns
/// `None` for a zero-length scan, leaving the stopping character
/// unconsumed, and also for a scan cut short by end of input, so the
/// caller can raise its own unterminated error.
pub fn scan_text(cursor: &mut Cursor) -> Result<Option<Text>, ParseError> {
    let start = cursor.position();
    match cursor.peek() {
        Some(q @ ('"' | '\'' | '`')) => {
            cursor.advance();
            let mut buf = String::new();
            match scan_escaped(cursor, TextMode::Quoted(q), &mut buf) {
                ScanEnd::Terminator(_) => {
                    cursor.advance();
                    Ok(Some(Text::at(buf, start)))
                }
                ScanEnd::Eof | ScanEnd::DanglingEscape => Err(ParseError::new(
                    ErrorKind::QuotedTextUnterminated,
                    start,
                )),
            }
        }
        _ => {
            let mut buf = String::new();
            match scan_escaped(cursor, TextMode::Unquoted, &mut buf) {
                ScanEnd::Terminator(_) if !buf.is_empty() => Ok(Some(Text::at(buf, start))),
                _ => Ok(None),
            }
        }
    }
}
