//! Recursive descent parser for Snow documents
//!
//! The grammar has three value forms (text, tag, section) and one entry
//! point, the document: an unbracketed section that runs to end of input.
//! Dispatch is by single-character lookahead, so the parser never
//! backtracks; errors are reported at the first offending position and
//! parsing stops there.

use tracing::trace;

use crate::cursor::{is_snow_whitespace, Cursor, Position};
use crate::error::{ErrorKind, ParseError};
use crate::flake::{Document, Flake, Section, Tag, Text};
use crate::scan::{scan_escaped, scan_text, skip_whitespace, ScanEnd, TextMode};
use crate::tagset::Tagset;

/// What to do when a tag repeats a named attribute key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail the parse with `DuplicateAttribute`, anchored at the colon of
    /// the repeated pair.
    #[default]
    Reject,
    /// Collect the values of repeated keys into a synthetic section, in
    /// source order. Section values still fail, since sections cannot
    /// contain sections.
    Merge,
}

/// A reusable parser configuration: a tagset plus a duplicate policy.
///
/// ```
/// use snow::{Parser, Flake, Text};
///
/// let doc = Parser::new().parse("{greet world}")?;
/// let tag = doc.get(0).and_then(Flake::as_tag).ok_or("expected a tag")?;
/// assert_eq!(tag.name(), Some(&Flake::Text(Text::new("greet"))));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    tagset: Tagset,
    duplicates: DuplicatePolicy,
}

impl Parser {
    /// A parser with an empty tagset and the `Reject` duplicate policy.
    pub fn new() -> Self {
        Parser::default()
    }

    /// A parser running the given tagset over every closed tag.
    pub fn with_tagset(tagset: Tagset) -> Self {
        Parser {
            tagset,
            duplicates: DuplicatePolicy::default(),
        }
    }

    /// Set the duplicate named attribute policy.
    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Parse a complete document.
    pub fn parse(&self, input: &str) -> Result<Document, ParseError> {
        let mut run = Run {
            cursor: Cursor::new(input),
            tagset: &self.tagset,
            duplicates: self.duplicates,
            colon: Position::START,
        };
        let doc = run.document()?;
        trace!(children = doc.len(), "parsed document");
        Ok(doc)
    }
}

/// Parse a document with no tagset and default policies.
pub fn parse(input: &str) -> Result<Document, ParseError> {
    Parser::new().parse(input)
}

/// Parse a document, running `tagset` over every closed tag.
pub fn parse_with(input: &str, tagset: &Tagset) -> Result<Document, ParseError> {
    let mut run = Run {
        cursor: Cursor::new(input),
        tagset,
        duplicates: DuplicatePolicy::default(),
        colon: Position::START,
    };
    run.document()
}

/// The mutable state of one parse.
struct Run<'a> {
    cursor: Cursor,
    tagset: &'a Tagset,
    duplicates: DuplicatePolicy,
    /// Position of the most recent named attribute colon. Anchors the
    /// errors blamed on a colon: a missing value, a duplicate key.
    colon: Position,
}

impl Run<'_> {
    /// Document level: free text interrupted only by tags. Everything else,
    /// brackets and colons and quotes included, is literal.
    fn document(&mut self) -> Result<Document, ParseError> {
        let origin = self.cursor.position();
        let mut children = Vec::new();
        loop {
            let start = self.cursor.position();
            let mut buf = String::new();
            match scan_escaped(&mut self.cursor, TextMode::DocumentBody, &mut buf) {
                ScanEnd::Terminator(_) => {
                    if !buf.is_empty() {
                        children.push(Flake::Text(Text::at(buf, start)));
                    }
                    children.push(self.tag()?);
                }
                ScanEnd::Eof => {
                    if !buf.is_empty() {
                        children.push(Flake::Text(Text::at(buf, start)));
                    }
                    return Ok(Document::at(children, origin));
                }
                ScanEnd::DanglingEscape => {
                    return Err(ParseError::new(
                        ErrorKind::SectionUnterminated,
                        self.cursor.position(),
                    ));
                }
            }
        }
    }

    /// A tag, cursor at its open brace. Attributes are whitespace
    /// separated; a colon after an attribute (whitespace allowed on either
    /// side) turns it into the key of a named pair.
    fn tag(&mut self) -> Result<Flake, ParseError> {
        let open = self.cursor.position();
        self.cursor.bump_if('{');

        let mut positional = Vec::new();
        let mut keys: Vec<Flake> = Vec::new();
        let mut values = Vec::new();

        loop {
            skip_whitespace(&mut self.cursor);
            if self.cursor.bump_if('}') {
                break;
            }
            let key = match self.value()? {
                Some(key) => key,
                None => return Err(ParseError::new(ErrorKind::TagUnterminated, open)),
            };
            skip_whitespace(&mut self.cursor);
            if self.cursor.peek() != Some(':') {
                positional.push(key);
                continue;
            }
            self.colon = self.cursor.position();
            self.cursor.bump_if(':');
            skip_whitespace(&mut self.cursor);
            let value = match self.value()? {
                Some(value) => value,
                None => return Err(ParseError::new(ErrorKind::TagUnterminated, open)),
            };
            match keys.iter().position(|k| *k == key) {
                None => {
                    keys.push(key);
                    values.push(value);
                }
                Some(i) => self.merge_duplicate(&mut values[i], value)?,
            }
        }

        trace!(
            positional = positional.len(),
            named = keys.len(),
            "closed tag"
        );
        self.tagset.build(Tag::at(positional, keys, values, open))
    }

    /// Fold a repeated named attribute value into the existing one, or
    /// reject it, per the configured policy.
    ///
    /// Merged values accumulate in a synthetic (position-free) section;
    /// a parsed section on either side of the collision is still an error,
    /// because the merge section could not hold it.
    fn merge_duplicate(&mut self, existing: &mut Flake, value: Flake) -> Result<(), ParseError> {
        let reject = ParseError::new(ErrorKind::DuplicateAttribute, self.colon);
        if self.duplicates == DuplicatePolicy::Reject
            || value.is_section()
            || value.is_document()
        {
            return Err(reject);
        }
        match existing {
            Flake::Section(merged) if merged.position.is_none() => {
                merged.add(value);
                Ok(())
            }
            Flake::Text(_) | Flake::Tag(_) => {
                let first = std::mem::replace(existing, Flake::Text(Text::new("")));
                *existing = Flake::Section(Section::from_children(vec![first, value]));
                Ok(())
            }
            _ => Err(reject),
        }
    }

    /// A section, cursor at its open bracket: literal text interrupted by
    /// tags, until the close bracket.
    fn section(&mut self) -> Result<Section, ParseError> {
        let open = self.cursor.position();
        self.cursor.bump_if('[');
        let mut children = Vec::new();
        loop {
            let start = self.cursor.position();
            let mut buf = String::new();
            match scan_escaped(&mut self.cursor, TextMode::SectionBody, &mut buf) {
                ScanEnd::Terminator(stop) => {
                    if !buf.is_empty() {
                        children.push(Flake::Text(Text::at(buf, start)));
                    }
                    if stop == '{' {
                        children.push(self.tag()?);
                        continue;
                    }
                    if stop != ']' {
                        // Unreachable by grammar; kept as a tripwire.
                        return Err(ParseError::new(
                            ErrorKind::ExpectedCloseSection,
                            self.cursor.position(),
                        ));
                    }
                    self.cursor.bump_if(']');
                    return Ok(Section::at(children, open));
                }
                ScanEnd::Eof | ScanEnd::DanglingEscape => {
                    return Err(ParseError::new(ErrorKind::SectionUnterminated, open));
                }
            }
        }
    }

    /// One value in tag position, dispatched on the next code point.
    /// `Ok(None)` means end of input; the caller owns that error, since it
    /// knows which construct was left open.
    fn value(&mut self) -> Result<Option<Flake>, ParseError> {
        match self.cursor.peek() {
            None => return Ok(None),
            Some('{') => return self.tag().map(Some),
            Some('[') => return self.section().map(|s| Some(Flake::Section(s))),
            Some(_) => {}
        }
        if let Some(text) = scan_text(&mut self.cursor)? {
            return Ok(Some(Flake::Text(text)));
        }

        // No value here. The stopping code point says which common mistake
        // was made; the last two arms can only fire on a parser bug.
        let at = self.cursor.position();
        match self.cursor.peek() {
            None => Ok(None),
            Some(']') => Err(ParseError::new(ErrorKind::UnexpectedCloseSection, at)),
            Some('}') => Err(ParseError::new(
                ErrorKind::UnassignedNamedAttribute,
                self.colon,
            )),
            Some(':') => Err(ParseError::new(ErrorKind::IllegalColonInText, at)),
            Some(c) if is_snow_whitespace(c) => {
                Err(ParseError::new(ErrorKind::UnexpectedWhitespaceAtValue, at))
            }
            Some(_) => Err(ParseError::new(ErrorKind::InternalInconsistency, at)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagset::NamedTagdef;
    use rstest::rstest;

    fn text(s: &str) -> Flake {
        Flake::Text(Text::new(s))
    }

    fn tag1(name: &str) -> Flake {
        let mut tag = Tag::new();
        tag.push(text(name));
        Flake::Tag(tag)
    }

    #[test]
    fn test_empty_input() {
        let doc = parse("").unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_plain_text_document() {
        let doc = parse("just some text, with: punctuation []").unwrap();
        assert_eq!(doc.len(), 1);
        // Colons, quotes, and brackets are literal at document level.
        assert_eq!(doc.get(0), Some(&text("just some text, with: punctuation []")));
    }

    #[test]
    fn test_bom_is_skipped() {
        let doc = parse("\u{FEFF}hello").unwrap();
        assert_eq!(doc.get(0), Some(&text("hello")));
        let pos = doc.get(0).unwrap().position().unwrap();
        assert_eq!(pos.offset, 1);
        assert_eq!(pos.column, 1);
    }

    #[test]
    fn test_mixed_document() {
        let doc = parse("before {x} after").unwrap();
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.get(0), Some(&text("before ")));
        assert_eq!(doc.get(1), Some(&tag1("x")));
        assert_eq!(doc.get(2), Some(&text(" after")));
    }

    #[test]
    fn test_empty_tag() {
        let doc = parse("{}").unwrap();
        assert_eq!(doc.get(0), Some(&Flake::Tag(Tag::new())));
    }

    #[test]
    fn test_whitespace_only_tag() {
        let doc = parse("{ \n\t }").unwrap();
        assert_eq!(doc.get(0), Some(&Flake::Tag(Tag::new())));
    }

    #[test]
    fn test_positional_attributes() {
        let doc = parse("{a b c}").unwrap();
        let tag = doc.get(0).unwrap().as_tag().unwrap();
        assert_eq!(tag.positional(), &[text("a"), text("b"), text("c")]);
        assert_eq!(tag.named_len(), 0);
    }

    #[test]
    fn test_named_attributes() {
        let doc = parse("{a:1 b:2}").unwrap();
        let tag = doc.get(0).unwrap().as_tag().unwrap();
        assert!(tag.positional().is_empty());
        assert_eq!(tag.get(&text("a")), Some(&text("1")));
        assert_eq!(tag.get(&text("b")), Some(&text("2")));
    }

    #[test]
    fn test_mixed_attributes() {
        let doc = parse("{x y:1 z}").unwrap();
        let tag = doc.get(0).unwrap().as_tag().unwrap();
        assert_eq!(tag.positional(), &[text("x"), text("z")]);
        assert_eq!(tag.get(&text("y")), Some(&text("1")));
    }

    #[test]
    fn test_whitespace_around_colon() {
        let doc = parse("{a : b}").unwrap();
        let tag = doc.get(0).unwrap().as_tag().unwrap();
        assert_eq!(tag.get(&text("a")), Some(&text("b")));
        let doc = parse("{a:\n b}").unwrap();
        let tag = doc.get(0).unwrap().as_tag().unwrap();
        assert_eq!(tag.get(&text("a")), Some(&text("b")));
    }

    #[test]
    fn test_quoted_values() {
        let doc = parse("{a:\"x y\" 'b c':`z`}").unwrap();
        let tag = doc.get(0).unwrap().as_tag().unwrap();
        assert_eq!(tag.get(&text("a")), Some(&text("x y")));
        assert_eq!(tag.get(&text("b c")), Some(&text("z")));
    }

    #[test]
    fn test_adjacent_quoted_texts() {
        let doc = parse("{\"a\"'b'`c`}").unwrap();
        let tag = doc.get(0).unwrap().as_tag().unwrap();
        assert_eq!(tag.positional(), &[text("a"), text("b"), text("c")]);
    }

    #[test]
    fn test_nested_tag_and_section_values() {
        let doc = parse("{ {a}: [ {b} text ] }").unwrap();
        let tag = doc.get(0).unwrap().as_tag().unwrap();
        let (key, value) = tag.named().next().unwrap();
        assert_eq!(key, &tag1("a"));
        let section = value.as_section().unwrap();
        assert_eq!(section.get(0), Some(&text(" ")));
        assert_eq!(section.get(1), Some(&tag1("b")));
        assert_eq!(section.get(2), Some(&text(" text ")));
    }

    #[test]
    fn test_empty_section_value() {
        let doc = parse("{a:[]}").unwrap();
        let tag = doc.get(0).unwrap().as_tag().unwrap();
        let section = tag.get(&text("a")).unwrap().as_section().unwrap();
        assert!(section.is_empty());
    }

    #[test]
    fn test_section_body_is_mostly_literal() {
        let doc = parse("{a:[colons: and \"quotes\" and } braces]}").unwrap();
        let tag = doc.get(0).unwrap().as_tag().unwrap();
        let section = tag.get(&text("a")).unwrap().as_section().unwrap();
        assert_eq!(
            section.get(0),
            Some(&text("colons: and \"quotes\" and } braces"))
        );
    }

    #[test]
    fn test_document_escape_transparency() {
        // Escaping a character that needs no escape keeps the backslash.
        let doc = parse("\\{literal}").unwrap();
        assert_eq!(doc.get(0), Some(&text("{literal}")));
        let doc = parse("a\\}b").unwrap();
        assert_eq!(doc.get(0), Some(&text("a\\}b")));
    }

    #[test]
    fn test_tag_position_recorded() {
        let doc = parse("ab{x}").unwrap();
        let pos = doc.get(1).unwrap().position().unwrap();
        assert_eq!((pos.line, pos.column, pos.offset), (1, 2, 2));
    }

    #[test]
    fn test_newlines_normalized_in_values() {
        let doc = parse("{a:\"x\r\ny\"}").unwrap();
        let tag = doc.get(0).unwrap().as_tag().unwrap();
        assert_eq!(tag.get(&text("a")), Some(&text("x\ny")));
    }

    #[rstest]
    #[case("{\"abc", ErrorKind::QuotedTextUnterminated)]
    #[case("{[abc", ErrorKind::SectionUnterminated)]
    #[case("{a:[abc}", ErrorKind::SectionUnterminated)]
    #[case("{", ErrorKind::TagUnterminated)]
    #[case("{a", ErrorKind::TagUnterminated)]
    #[case("{a:", ErrorKind::TagUnterminated)]
    #[case("{a: \t", ErrorKind::TagUnterminated)]
    #[case("{a:1 a:2}", ErrorKind::DuplicateAttribute)]
    #[case("{]}", ErrorKind::UnexpectedCloseSection)]
    #[case("{a:]}", ErrorKind::UnexpectedCloseSection)]
    #[case("{a:}", ErrorKind::UnassignedNamedAttribute)]
    #[case("{:a}", ErrorKind::IllegalColonInText)]
    #[case("{a::b}", ErrorKind::IllegalColonInText)]
    fn test_error_kinds(#[case] input: &str, #[case] kind: ErrorKind) {
        assert_eq!(parse(input).unwrap_err().kind, kind, "input {:?}", input);
    }

    #[test]
    fn test_unterminated_tag_anchored_at_open_brace() {
        let err = parse("ab{x").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TagUnterminated);
        assert_eq!((err.position.line, err.position.column, err.position.offset), (1, 2, 2));
    }

    #[test]
    fn test_unassigned_attribute_anchored_at_colon() {
        let err = parse("{a:}").unwrap_err();
        assert_eq!((err.position.line, err.position.column, err.position.offset), (1, 2, 2));
    }

    #[test]
    fn test_duplicate_anchored_at_second_colon() {
        let err = parse("{a:1 a:2}").unwrap_err();
        assert_eq!((err.position.line, err.position.column, err.position.offset), (1, 6, 6));
    }

    #[test]
    fn test_error_position_across_lines() {
        let err = parse("a\n{b").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TagUnterminated);
        assert_eq!((err.position.line, err.position.column, err.position.offset), (2, 0, 2));
    }

    #[test]
    fn test_dangling_escape_at_document_level() {
        let err = parse("ab\\").unwrap_err();
        assert_eq!(err.kind, ErrorKind::SectionUnterminated);
    }

    #[test]
    fn test_duplicate_structural_keys() {
        let err = parse("{{x}:1 {x}:2}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateAttribute);
    }

    #[test]
    fn test_merge_policy_collects_values() {
        let parser = Parser::new().duplicate_policy(DuplicatePolicy::Merge);
        let doc = parser.parse("{k:a k:b k:c}").unwrap();
        let tag = doc.get(0).unwrap().as_tag().unwrap();
        let merged = tag.get(&text("k")).unwrap().as_section().unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get(0), Some(&text("a")));
        assert_eq!(merged.get(2), Some(&text("c")));
    }

    #[test]
    fn test_merge_policy_rejects_section_values() {
        let parser = Parser::new().duplicate_policy(DuplicatePolicy::Merge);
        let err = parser.parse("{k:a k:[b]}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateAttribute);
        let err = parser.parse("{k:[a] k:b}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateAttribute);
    }

    #[test]
    fn test_parse_with_tagset() {
        let mut ts = Tagset::new();
        ts.register(NamedTagdef::new("img", ["src"]));
        let doc = parse_with("{img photo.png} {other x}", &ts).unwrap();
        let img = doc.get(0).unwrap().as_tag().unwrap();
        assert_eq!(img.get(&text("src")), Some(&text("photo.png")));
        let other = doc.get(2).unwrap().as_tag().unwrap();
        assert_eq!(other.positional(), &[text("other"), text("x")]);
    }

    #[test]
    fn test_deep_nesting() {
        let doc = parse("{a:{b:{c:[x{d}y]}}}").unwrap();
        let a = doc.get(0).unwrap().as_tag().unwrap();
        let b = a.get(&text("a")).unwrap().as_tag().unwrap();
        let c = b.get(&text("b")).unwrap().as_tag().unwrap();
        let section = c.get(&text("c")).unwrap().as_section().unwrap();
        assert_eq!(section.len(), 3);
        assert_eq!(section.get(1), Some(&tag1("d")));
    }
}
