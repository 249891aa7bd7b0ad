//! Minimal stringification
//!
//! Canonical output always separates tag attributes with single spaces.
//! The only generic saving left is inside tags: named attribute pairs can
//! be rearranged freely, and a space is only ever required between two
//! bare (unquoted) edges. Everything with brackets, braces, or quotes on
//! an edge is self-delimiting.
//!
//! Tag minification is therefore a placement problem. Each rendered
//! attribute gets two edge bits, LEFT and RIGHT, set when that edge is
//! guarded (self-delimiting). Positional attributes and the surrounding
//! braces are fixed; the named pairs, most-guarded first, are each
//! inserted into the gap with the highest junction score, where a
//! junction pairing a guarded edge with a bare one spends no space and
//! frees a guard for later placements.

use crate::flake::{document_body_text, is_bare, section_body_text, Flake, Tag};

const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTH: u8 = LEFT | RIGHT;

/// Best possible gap: both junctions put a bare edge after a guarded one.
const MAX_GAP_SCORE: u32 = 10;

/// The smallest text that reparses to an equal flake.
pub fn minify(flake: &Flake) -> String {
    match flake {
        Flake::Text(t) => t.to_text(),
        Flake::Tag(t) => minify_tag(t),
        Flake::Section(s) => {
            let mut out = String::from("[");
            for child in s {
                match child {
                    Flake::Text(t) => out.push_str(&section_body_text(t.value())),
                    other => out.push_str(&minify(other)),
                }
            }
            out.push(']');
            out
        }
        Flake::Document(d) => {
            let mut out = String::new();
            for child in d {
                match child {
                    Flake::Text(t) => out.push_str(&document_body_text(t.value())),
                    other => out.push_str(&minify(other)),
                }
            }
            out
        }
    }
}

/// A rendered attribute (or brace sentinel) plus its edge bits.
struct Piece {
    rendered: String,
    edges: u8,
}

fn is_bare_flake(flake: &Flake) -> bool {
    flake.as_text().is_some_and(|t| is_bare(t.value()))
}

/// Score one junction. A bare edge after a guarded one is the ideal (the
/// guard is doing double duty); a guard after a bare edge still saves a
/// space; two guards waste a separator; two bare edges cost a space.
fn junction(left_guarded: bool, right_guarded: bool) -> u32 {
    match (left_guarded, right_guarded) {
        (true, false) => 5,
        (false, true) => 3,
        (true, true) => 2,
        (false, false) => 0,
    }
}

fn minify_tag(tag: &Tag) -> String {
    let mut named: Vec<Piece> = tag
        .named()
        .map(|(key, value)| Piece {
            rendered: format!("{}:{}", minify(key), minify(value)),
            edges: (if is_bare_flake(key) { 0 } else { LEFT })
                | (if is_bare_flake(value) { 0 } else { RIGHT }),
        })
        .collect();
    // Placed by pop, so the most guarded pairs land first and their guards
    // are available as junctions for the bare pairs that follow.
    named.sort_by_key(|piece| piece.edges);

    let mut out = Vec::with_capacity(tag.positional().len() + named.len() + 2);
    out.push(Piece {
        rendered: String::new(),
        edges: RIGHT, // the open brace guards its right side
    });
    for attr in tag.positional() {
        out.push(Piece {
            rendered: minify(attr),
            edges: if is_bare_flake(attr) { 0 } else { BOTH },
        });
    }
    out.push(Piece {
        rendered: String::new(),
        edges: LEFT, // the close brace guards its left side
    });

    while let Some(pair) = named.pop() {
        let mut best = 0;
        let mut best_score = 0;
        for gap in 0..out.len() - 1 {
            let score = junction(out[gap].edges & RIGHT != 0, pair.edges & LEFT != 0)
                + junction(pair.edges & RIGHT != 0, out[gap + 1].edges & LEFT != 0);
            if score > best_score {
                best_score = score;
                best = gap;
                if best_score == MAX_GAP_SCORE {
                    break;
                }
            }
        }
        out.insert(best + 1, pair);
    }

    let mut s = String::from("{");
    for i in 1..out.len() - 1 {
        if out[i - 1].edges & RIGHT == 0 && out[i].edges & LEFT == 0 {
            s.push(' ');
        }
        s.push_str(&out[i].rendered);
    }
    s.push('}');
    s
}
