//! snow - Snow Parser and Serializer
//!
//! A pure Rust implementation of the Snow compact tag-and-section text
//! format: a recursive descent parser with exact error positions, a
//! mutable document model, and canonical and minimal serializers.
//!
//! # Quick Start
//!
//! ```rust
//! use snow::{parse, to_text, Flake, Text};
//!
//! let doc = parse("Hello {bold world}, nice to meet you.")?;
//!
//! let tag = doc.get(1).and_then(Flake::as_tag).ok_or("expected a tag")?;
//! assert_eq!(tag.name(), Some(&Flake::Text(Text::new("bold"))));
//! assert_eq!(tag.positional()[1], Flake::Text(Text::new("world")));
//!
//! // Canonical output reparses to an equal tree.
//! assert_eq!(to_text(&Flake::Document(doc)), "Hello {bold world}, nice to meet you.");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Features
//!
//! - Exact line/column/offset on every parse error
//! - Full Unicode handling: BOM, all line terminators, `White_Space` set
//! - Tagsets for schema-aware tag processing at parse time
//! - Minimal serializer that rearranges named attributes to drop spaces
//! - Pure safe Rust

pub mod cursor;
pub mod error;
pub mod flake;
pub mod minify;
pub mod parser;
pub mod scan;
pub mod tagset;
pub mod visit;

// Re-export main API
pub use cursor::Position;
pub use error::{ErrorKind, ParseError};
pub use flake::{to_text, Document, Flake, Section, Tag, Text};
pub use minify::minify;
pub use parser::{parse, parse_with, DuplicatePolicy, Parser};
pub use tagset::{NamedTagdef, Tagdef, Tagset};
pub use visit::Visitor;
