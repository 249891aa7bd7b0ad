//! Character cursor with position tracking and newline normalization
//!
//! Manages input text as a sequence of Unicode code points for recursive
//! descent parsing. Lookahead is by index, so "pushing back" a code point
//! is simply not consuming it.

use std::fmt;

use unicode_general_category::{get_general_category, GeneralCategory};

/// Where a flake was parsed: 1-based line, 0-based column, absolute code
/// point offset. Synthetically built flakes carry no position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    /// The position baseline of a document with no byte-order mark.
    pub const START: Position = Position {
        line: 1,
        column: 0,
        offset: 0,
    };
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ln: {}, Col: {}", self.line, self.column)
    }
}

/// Unicode `White_Space=Y`, spelled out against the property table.
///
/// `char::is_whitespace` happens to agree today, but the grammar depends on
/// this exact set (C0 controls below U+0020 other than the five here are
/// *not* whitespace), so the predicate is explicit: the six control
/// whitespace code points by literal match, the rest via the `Zs`/`Zl`/`Zp`
/// general categories.
pub fn is_snow_whitespace(c: char) -> bool {
    match c {
        '\t' | '\n' | '\u{000B}' | '\u{000C}' | '\r' | '\u{0085}' => true,
        _ if (c as u32) < 0x20 => false,
        _ => matches!(
            get_general_category(c),
            GeneralCategory::SpaceSeparator
                | GeneralCategory::LineSeparator
                | GeneralCategory::ParagraphSeparator
        ),
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(
        c,
        '\r' | '\n' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

/// Cursor over the input text for parsing, with line/column/offset tracking.
#[derive(Clone)]
pub struct Cursor {
    chars: Vec<char>,
    index: usize,
    line: u32,
    column: u32,
    offset: usize,
}

impl Cursor {
    /// Create a cursor over a string. A leading U+FEFF byte-order mark is
    /// consumed here; it counts as one code point toward the position
    /// baseline of the first token (column 1, offset 1).
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let bom = chars.first() == Some(&'\u{FEFF}');
        Cursor {
            chars,
            index: usize::from(bom),
            line: 1,
            column: u32::from(bom),
            offset: usize::from(bom),
        }
    }

    /// Look at the next code point without consuming it. Line terminators
    /// are reported raw; `advance` is what normalizes them.
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    /// Check if all input has been consumed.
    pub fn at_end(&self) -> bool {
        self.index >= self.chars.len()
    }

    /// The position of the next unconsumed code point.
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            offset: self.offset,
        }
    }

    /// Consume one logical character.
    ///
    /// All Unicode line terminators (CR, LF, CRLF as a single unit, VT, FF,
    /// NEL, LS, PS) come back as `\n` and advance `line` exactly once,
    /// resetting `column`. CRLF consumes both code points (offset grows by
    /// two) but counts as one terminator.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += 1;
        self.offset += 1;
        if is_line_terminator(c) {
            if c == '\r' && self.peek() == Some('\n') {
                self.index += 1;
                self.offset += 1;
            }
            self.line += 1;
            self.column = 0;
            Some('\n')
        } else {
            self.column += 1;
            Some(c)
        }
    }

    /// Consume the next code point only if it is `c`. Meant for delimiter
    /// characters, which are never line terminators.
    pub fn bump_if(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.index += 1;
            self.offset += 1;
            self.column += 1;
            true
        } else {
            false
        }
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let remaining: String = self.chars[self.index..].iter().take(20).collect();
        write!(
            f,
            "Cursor(line={}, column={}, offset={}, remaining={:?})",
            self.line, self.column, self.offset, remaining
        )
    }
}
