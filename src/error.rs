//! Parse error type
//!
//! Every parse failure is a `ParseError`: one category plus the
//! line/column/offset anchor most relevant to the mistake. Parsing never
//! recovers; the first error is propagated straight to the caller.

use thiserror::Error;

use crate::cursor::Position;

/// What went wrong. The last two categories are defensive assertions that
/// no input should be able to reach; seeing one means a parser bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Reached end of input while parsing a section.
    #[error("reached end of input while parsing a section")]
    SectionUnterminated,
    /// A quoted text run was never closed.
    #[error("missing terminating quote character")]
    QuotedTextUnterminated,
    /// A section stopped at something other than a close bracket.
    #[error("expected close bracket ]")]
    ExpectedCloseSection,
    /// Reached end of input while parsing a tag.
    #[error("reached end of input while parsing a tag")]
    TagUnterminated,
    /// A close bracket appeared outside any section.
    #[error("unexpected close bracket ], did you forget to close a tag?")]
    UnexpectedCloseSection,
    /// A named attribute's colon was never followed by a value.
    #[error("forgot to assign a value to the named attribute")]
    UnassignedNamedAttribute,
    /// Two named attributes with structurally equal keys.
    #[error("duplicate named attribute name")]
    DuplicateAttribute,
    /// A bare colon where a value was expected.
    #[error("the colon is disallowed in unquoted text")]
    IllegalColonInText,
    /// A tag definition rejected the tag it was asked to process.
    #[error("tag definition error: {0}")]
    Tagdef(String),
    /// Defensive: value parsing saw whitespace, which callers always skip.
    #[error("expected a value, found whitespace; this is a bug in the parser")]
    UnexpectedWhitespaceAtValue,
    /// Defensive: value parsing saw a code point no grammar path can leave.
    #[error("something went horribly wrong; this is a bug in the parser")]
    InternalInconsistency,
}

/// A parse failure with its anchor position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} ({position})")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub position: Position,
}

impl ParseError {
    pub fn new(kind: ErrorKind, position: Position) -> Self {
        ParseError { kind, position }
    }
}
