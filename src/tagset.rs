//! Tag extension hook
//!
//! The format's single extensibility point: after a tag closes, the parser
//! hands it to the registered tagset, which may replace it with any other
//! flake (a validated date tag, a plain text, whatever the schema wants).
//! Definitions are consulted in registration order; the first whose
//! `matches` accepts the tag's name wins. With no match the generic tag
//! passes through unchanged.

use crate::error::ParseError;
use crate::flake::{Flake, Tag, Text};

/// One tag definition: a predicate over the tag's name (its first
/// positional attribute) and a processing function producing the
/// replacement flake.
///
/// Definitions are shared read-only across parses, so they must be
/// `Send + Sync`.
pub trait Tagdef: Send + Sync {
    /// Does this definition apply to a tag with the given name?
    fn matches(&self, name: &Flake) -> bool;

    /// Turn the raw parsed tag into its replacement flake.
    fn process(&self, tag: Tag) -> Result<Flake, ParseError>;
}

/// An ordered registry of tag definitions.
#[derive(Default)]
pub struct Tagset {
    defs: Vec<Box<dyn Tagdef>>,
}

impl Tagset {
    /// An empty tagset: every tag stays generic.
    pub fn new() -> Self {
        Tagset::default()
    }

    /// Append a definition. Earlier registrations take priority.
    pub fn register(&mut self, def: impl Tagdef + 'static) -> &mut Self {
        self.defs.push(Box::new(def));
        self
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Run the hook for one freshly closed tag. Called by the parser
    /// exactly once per tag, after duplicate-attribute handling.
    pub(crate) fn build(&self, tag: Tag) -> Result<Flake, ParseError> {
        if let Some(name) = tag.name() {
            if let Some(def) = self.defs.iter().find(|d| d.matches(name)) {
                return def.process(tag);
            }
        }
        Ok(Flake::Tag(tag))
    }
}

impl std::fmt::Debug for Tagset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tagset").field("defs", &self.defs.len()).finish()
    }
}

/// A common-case definition: matches a fixed text name and promotes
/// leading positional attributes (after the name) to declared attribute
/// names, leaving already-named attributes alone.
///
/// `{img photo.png 100}` with `NamedTagdef::new("img", ["src", "width"])`
/// becomes the tag `{img src:photo.png width:100}`.
pub struct NamedTagdef {
    name: Text,
    attrs: Vec<Text>,
}

impl NamedTagdef {
    pub fn new(name: impl Into<String>, attrs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        NamedTagdef {
            name: Text::new(name),
            attrs: attrs.into_iter().map(Text::new).collect(),
        }
    }
}

impl Tagdef for NamedTagdef {
    fn matches(&self, name: &Flake) -> bool {
        name.as_text() == Some(&self.name)
    }

    fn process(&self, mut tag: Tag) -> Result<Flake, ParseError> {
        for attr in &self.attrs {
            let key = Flake::Text(attr.clone());
            // The name itself stays positional; promoted values are pulled
            // from just after it.
            if tag.positional().len() < 2 {
                break;
            }
            if !tag.has(&key) {
                let value = tag.remove_positional(1);
                tag.set(key, value);
            }
        }
        Ok(Flake::Tag(tag))
    }
}
