//! Visitor dispatch over flake trees
//!
//! External traversals (renderers, schema checks, extractors) implement
//! [`Visitor`] and let [`Flake::visit`] dispatch on the variant. Recursion
//! is the visitor's business: a tag's attributes or a section's children
//! are only walked if the visitor asks.

use crate::flake::{Document, Flake, Section, Tag, Text};

/// One callback per flake variant.
pub trait Visitor {
    type Output;

    fn visit_text(&mut self, text: &Text) -> Self::Output;
    fn visit_tag(&mut self, tag: &Tag) -> Self::Output;
    fn visit_section(&mut self, section: &Section) -> Self::Output;
    fn visit_document(&mut self, document: &Document) -> Self::Output;
}

impl Flake {
    /// Dispatch to the visitor method for this variant.
    pub fn visit<V: Visitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Flake::Text(t) => visitor.visit_text(t),
            Flake::Tag(t) => visitor.visit_tag(t),
            Flake::Section(s) => visitor.visit_section(s),
            Flake::Document(d) => visitor.visit_document(d),
        }
    }
}
