//! Snow document model
//!
//! Every node is a variant of the `Flake` sum type: `Text`, `Tag`,
//! `Section`, or `Document`. Nodes carry an optional parse position which
//! never participates in equality. Canonical (lossless) stringification
//! lives here next to the types, as `to_text` methods and `Display` impls;
//! minimal stringification is in [`crate::minify`].

use std::fmt;

use crate::cursor::{is_snow_whitespace, Position};

/// Characters that force a text value into quotes when rendered in tag
/// position. Backslash is included: a bare backslash would be re-read as
/// an escape.
fn needs_quoting(c: char) -> bool {
    is_snow_whitespace(c) || matches!(c, '{' | '}' | ':' | '[' | ']' | '"' | '\'' | '`' | '\\')
}

/// True when a value can be rendered without quotes in tag position.
pub(crate) fn is_bare(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(needs_quoting)
}

fn push_escaped(out: &mut String, value: &str, reserved: &[char]) {
    for c in value.chars() {
        if reserved.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Render a text value as it appears inside a section body.
pub(crate) fn section_body_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    push_escaped(&mut out, value, &['\\', '{', ']']);
    out
}

/// Render a text value as it appears at document level.
pub(crate) fn document_body_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    push_escaped(&mut out, value, &['\\', '{']);
    out
}

/// Any node in a Snow document tree.
#[derive(Debug, Clone)]
pub enum Flake {
    Text(Text),
    Tag(Tag),
    Section(Section),
    Document(Document),
}

impl Flake {
    pub fn is_text(&self) -> bool {
        matches!(self, Flake::Text(_))
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Flake::Tag(_))
    }

    pub fn is_section(&self) -> bool {
        matches!(self, Flake::Section(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Flake::Document(_))
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Flake::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            Flake::Tag(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Flake::Section(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Flake::Document(d) => Some(d),
            _ => None,
        }
    }

    /// The position at which parsing of this node began, if it was parsed.
    pub fn position(&self) -> Option<Position> {
        match self {
            Flake::Text(t) => t.position,
            Flake::Tag(t) => t.position,
            Flake::Section(s) => s.position,
            Flake::Document(d) => d.position,
        }
    }

    /// Canonical stringification: lossless, reparses to an equal tree.
    pub fn to_text(&self) -> String {
        match self {
            Flake::Text(t) => t.to_text(),
            Flake::Tag(t) => t.to_text(),
            Flake::Section(s) => s.to_text(),
            Flake::Document(d) => d.to_text(),
        }
    }
}

impl PartialEq for Flake {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Flake::Text(a), Flake::Text(b)) => a == b,
            (Flake::Tag(a), Flake::Tag(b)) => a == b,
            (Flake::Section(a), Flake::Section(b)) => a == b,
            (Flake::Document(a), Flake::Document(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Flake {}

impl fmt::Display for Flake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// A leaf holding a Unicode string.
#[derive(Debug, Clone)]
pub struct Text {
    value: String,
    pub position: Option<Position>,
}

impl Text {
    /// A synthetic text node with no parse position.
    pub fn new(value: impl Into<String>) -> Self {
        Text {
            value: value.into(),
            position: None,
        }
    }

    pub(crate) fn at(value: String, position: Position) -> Self {
        Text {
            value,
            position: Some(position),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Canonical rendering in tag position: bare when safe, otherwise
    /// wrapped in whichever quote character occurs least often in the
    /// value (ties resolved in the order `"`, `'`, backtick), escaping
    /// exactly the chosen quote and backslash.
    pub fn to_text(&self) -> String {
        if is_bare(&self.value) {
            return self.value.clone();
        }
        let count = |q: char| self.value.chars().filter(|&c| c == q).count();
        let (dq, sq, bq) = (count('"'), count('\''), count('`'));
        let q = if dq <= sq && dq <= bq {
            '"'
        } else if sq <= bq {
            '\''
        } else {
            '`'
        };
        let mut out = String::with_capacity(self.value.len() + 2);
        out.push(q);
        push_escaped(&mut out, &self.value, &['\\', q]);
        out.push(q);
        out
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Text {}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// An associative node: ordered positional attributes plus named
/// attributes mapping key flakes to value flakes.
///
/// Named attributes are stored as parallel key/value vectors: keys are
/// compared structurally, so a hash map buys nothing, and insertion order
/// must be preserved for deterministic serialization anyway.
#[derive(Debug, Clone, Default)]
pub struct Tag {
    positional: Vec<Flake>,
    keys: Vec<Flake>,
    values: Vec<Flake>,
    pub position: Option<Position>,
}

impl Tag {
    /// An empty synthetic tag.
    pub fn new() -> Self {
        Tag::default()
    }

    pub(crate) fn at(
        positional: Vec<Flake>,
        keys: Vec<Flake>,
        values: Vec<Flake>,
        position: Position,
    ) -> Self {
        Tag {
            positional,
            keys,
            values,
            position: Some(position),
        }
    }

    /// The tag's name: its first positional attribute, by convention.
    pub fn name(&self) -> Option<&Flake> {
        self.positional.first()
    }

    /// The positional attributes, in order.
    pub fn positional(&self) -> &[Flake] {
        &self.positional
    }

    /// Append a positional attribute.
    pub fn push(&mut self, value: Flake) {
        self.positional.push(value);
    }

    /// Remove and return the positional attribute at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn remove_positional(&mut self, index: usize) -> Flake {
        self.positional.remove(index)
    }

    /// Look up a named attribute by structural key equality.
    pub fn get(&self, key: &Flake) -> Option<&Flake> {
        let i = self.keys.iter().position(|k| k == key)?;
        Some(&self.values[i])
    }

    pub fn has(&self, key: &Flake) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Insert or replace a named attribute, preserving insertion order.
    pub fn set(&mut self, key: Flake, value: Flake) {
        if let Some(i) = self.keys.iter().position(|k| *k == key) {
            self.values[i] = value;
        } else {
            self.keys.push(key);
            self.values.push(value);
        }
    }

    /// Remove a named attribute, returning its value.
    pub fn remove(&mut self, key: &Flake) -> Option<Flake> {
        let i = self.keys.iter().position(|k| k == key)?;
        self.keys.remove(i);
        Some(self.values.remove(i))
    }

    /// The named attributes in insertion order.
    pub fn named(&self) -> impl Iterator<Item = (&Flake, &Flake)> {
        self.keys.iter().zip(self.values.iter())
    }

    pub fn named_len(&self) -> usize {
        self.keys.len()
    }

    /// Canonical form: positional attributes first, then `key:value`
    /// pairs, single-space-joined, inside braces.
    pub fn to_text(&self) -> String {
        let mut parts: Vec<String> = self.positional.iter().map(Flake::to_text).collect();
        parts.extend(
            self.named()
                .map(|(k, v)| format!("{}:{}", k.to_text(), v.to_text())),
        );
        format!("{{{}}}", parts.join(" "))
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        // Positional order matters; named attribute order does not.
        self.positional == other.positional
            && self.keys.len() == other.keys.len()
            && self.named().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for Tag {}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// An ordered mixed sequence of literal text and tags.
///
/// Sections never directly contain other sections; `add` and `set` reject
/// such children.
#[derive(Debug, Clone, Default)]
pub struct Section {
    children: Vec<Flake>,
    pub position: Option<Position>,
}

impl Section {
    /// An empty synthetic section.
    pub fn new() -> Self {
        Section::default()
    }

    pub(crate) fn at(children: Vec<Flake>, position: Position) -> Self {
        Section {
            children,
            position: Some(position),
        }
    }

    pub(crate) fn from_children(children: Vec<Flake>) -> Self {
        Section {
            children,
            position: None,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Flake> {
        self.children.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Flake> {
        self.children.get_mut(index)
    }

    /// Replace the child at `index`, returning the old child, or `None`
    /// without touching anything if the new child is itself a section.
    pub fn set(&mut self, index: usize, flake: Flake) -> Option<Flake> {
        if flake.is_section() || flake.is_document() {
            return None;
        }
        Some(std::mem::replace(&mut self.children[index], flake))
    }

    /// Append a child. Returns false (and ignores the child) if it is a
    /// section.
    pub fn add(&mut self, flake: Flake) -> bool {
        if flake.is_section() || flake.is_document() {
            return false;
        }
        self.children.push(flake);
        true
    }

    pub fn remove(&mut self, index: usize) -> Flake {
        self.children.remove(index)
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Flake> {
        self.children.iter()
    }

    /// Canonical form: children concatenated inside brackets, with text
    /// children escaping backslash, open brace, and close bracket.
    pub fn to_text(&self) -> String {
        let mut out = String::from("[");
        for child in &self.children {
            match child {
                Flake::Text(t) => out.push_str(&section_body_text(t.value())),
                other => out.push_str(&other.to_text()),
            }
        }
        out.push(']');
        out
    }
}

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl Eq for Section {}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl<'a> IntoIterator for &'a Section {
    type Item = &'a Flake;
    type IntoIter = std::slice::Iter<'a, Flake>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

/// The parse root: structurally a section, but rendered without brackets
/// and with only backslash and open brace escaped in text children.
#[derive(Debug, Clone, Default)]
pub struct Document {
    children: Vec<Flake>,
    pub position: Option<Position>,
}

impl Document {
    /// An empty synthetic document.
    pub fn new() -> Self {
        Document::default()
    }

    pub(crate) fn at(children: Vec<Flake>, position: Position) -> Self {
        Document {
            children,
            position: Some(position),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Flake> {
        self.children.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Flake> {
        self.children.get_mut(index)
    }

    /// Replace the child at `index`, rejecting section children like
    /// [`Section::set`].
    pub fn set(&mut self, index: usize, flake: Flake) -> Option<Flake> {
        if flake.is_section() || flake.is_document() {
            return None;
        }
        Some(std::mem::replace(&mut self.children[index], flake))
    }

    /// Append a child, rejecting section children like [`Section::add`].
    pub fn add(&mut self, flake: Flake) -> bool {
        if flake.is_section() || flake.is_document() {
            return false;
        }
        self.children.push(flake);
        true
    }

    pub fn remove(&mut self, index: usize) -> Flake {
        self.children.remove(index)
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Flake> {
        self.children.iter()
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Flake::Text(t) => out.push_str(&document_body_text(t.value())),
                other => out.push_str(&other.to_text()),
            }
        }
        out
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl Eq for Document {}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Flake;
    type IntoIter = std::slice::Iter<'a, Flake>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

/// Canonical stringification of any flake.
pub fn to_text(flake: &Flake) -> String {
    flake.to_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Flake {
        Flake::Text(Text::new(s))
    }

    #[test]
    fn test_text_bare_when_safe() {
        assert_eq!(Text::new("hello").to_text(), "hello");
        assert_eq!(Text::new("a.b-c/d").to_text(), "a.b-c/d");
    }

    #[test]
    fn test_text_quoted_when_reserved() {
        assert_eq!(Text::new("a b").to_text(), "\"a b\"");
        assert_eq!(Text::new("a:b").to_text(), "\"a:b\"");
        assert_eq!(Text::new("").to_text(), "\"\"");
        assert_eq!(Text::new("a\\b").to_text(), "\"a\\\\b\"");
    }

    #[test]
    fn test_text_quote_choice_minimizes_escapes() {
        // Two double quotes, one single quote, no backticks: backtick wins.
        assert_eq!(Text::new("a\"b\"c'd").to_text(), "`a\"b\"c'd`");
        // One occurrence of each quote: a three-way tie, `"` preferred.
        assert_eq!(Text::new("\"'`").to_text(), "\"\\\"'`\"");
        // Single quote strictly fewest.
        assert_eq!(Text::new("\"`\"`x'").to_text(), "'\"`\"`x\\''");
    }

    #[test]
    fn test_text_equality_ignores_position() {
        let parsed = Text::at("x".to_string(), Position::START);
        assert_eq!(parsed, Text::new("x"));
    }

    #[test]
    fn test_tag_canonical_positional_then_named() {
        let mut tag = Tag::new();
        tag.push(text("x"));
        tag.push(text("z"));
        tag.set(text("y"), text("1"));
        assert_eq!(tag.to_text(), "{x z y:1}");
    }

    #[test]
    fn test_empty_tag_renders_braces() {
        assert_eq!(Tag::new().to_text(), "{}");
    }

    #[test]
    fn test_tag_named_lookup_is_structural() {
        let mut tag = Tag::new();
        let mut key = Tag::new();
        key.push(text("a"));
        tag.set(Flake::Tag(key.clone()), text("v"));
        assert_eq!(tag.get(&Flake::Tag(key)), Some(&text("v")));
        assert_eq!(tag.get(&text("a")), None);
    }

    #[test]
    fn test_tag_equality_ignores_named_order() {
        let mut a = Tag::new();
        a.set(text("k1"), text("v1"));
        a.set(text("k2"), text("v2"));
        let mut b = Tag::new();
        b.set(text("k2"), text("v2"));
        b.set(text("k1"), text("v1"));
        assert_eq!(a, b);

        let mut c = Tag::new();
        c.set(text("k1"), text("v1"));
        assert_ne!(a, c);
    }

    #[test]
    fn test_tag_set_replaces() {
        let mut tag = Tag::new();
        tag.set(text("k"), text("old"));
        tag.set(text("k"), text("new"));
        assert_eq!(tag.named_len(), 1);
        assert_eq!(tag.get(&text("k")), Some(&text("new")));
    }

    #[test]
    fn test_section_rejects_section_children() {
        let mut sec = Section::new();
        assert!(sec.add(text("a")));
        assert!(!sec.add(Flake::Section(Section::new())));
        assert_eq!(sec.len(), 1);
        assert_eq!(sec.set(0, Flake::Section(Section::new())), None);
        assert_eq!(sec.get(0), Some(&text("a")));
    }

    #[test]
    fn test_section_canonical_escapes_body_text() {
        let mut sec = Section::new();
        sec.add(text("a{b]c\\d"));
        let mut tag = Tag::new();
        tag.push(text("t"));
        sec.add(Flake::Tag(tag));
        assert_eq!(sec.to_text(), "[a\\{b\\]c\\\\d{t}]");
    }

    #[test]
    fn test_document_canonical_no_brackets() {
        let mut doc = Document::new();
        doc.add(text("a{b]c"));
        assert_eq!(doc.to_text(), "a\\{b]c");
    }

    #[test]
    fn test_document_not_equal_to_section() {
        let mut doc = Document::new();
        doc.add(text("a"));
        let mut sec = Section::new();
        sec.add(text("a"));
        assert_ne!(Flake::Document(doc), Flake::Section(sec));
    }

    #[test]
    fn test_section_mutation_surface() {
        let mut sec = Section::new();
        sec.add(text("a"));
        sec.add(text("b"));
        assert_eq!(sec.set(0, text("c")), Some(text("a")));
        assert_eq!(sec.remove(1), text("b"));
        assert_eq!(sec.len(), 1);
        sec.clear();
        assert!(sec.is_empty());
    }
}
