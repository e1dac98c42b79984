// Copyright 2026 the Overspeed Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The selector subset understood by [`MemTree`](super::mem::MemTree).
//!
//! Compound selectors (`tag`, `*`, `.class`, `[attr]`, `[attr="value"]`)
//! joined by the descendant combinator. Anything else fails to parse and
//! matches nothing.

use alloc::string::{String, ToString as _};
use alloc::vec::Vec;

/// One attribute condition inside a compound selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AttrCondition {
    pub(crate) name: String,
    pub(crate) value: Option<String>,
}

/// A compound selector: every condition must hold on the same element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Compound {
    pub(crate) tag: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<AttrCondition>,
}

/// Compounds joined by descendant combinators, outermost first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Selector {
    pub(crate) parts: Vec<Compound>,
}

impl Selector {
    /// Parses `input`, returning `None` for anything outside the subset.
    pub(crate) fn parse(input: &str) -> Option<Self> {
        let mut parts = Vec::new();
        for token in split_descendants(input) {
            parts.push(parse_compound(token)?);
        }
        if parts.is_empty() {
            return None;
        }
        Some(Self { parts })
    }

    /// The rightmost compound, which the subject element itself must match.
    pub(crate) fn subject(&self) -> &Compound {
        // `parse` never yields an empty selector.
        &self.parts[self.parts.len() - 1]
    }

    /// Compounds that must match ancestors, innermost first.
    pub(crate) fn ancestors(&self) -> impl Iterator<Item = &Compound> {
        self.parts[..self.parts.len() - 1].iter().rev()
    }
}

/// Splits on whitespace outside of `[...]` groups.
fn split_descendants(input: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0_u32;
    let mut start = None;
    for (i, c) in input.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if c.is_whitespace() && depth == 0 {
            if let Some(s) = start.take() {
                out.push(&input[s..i]);
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push(&input[s..]);
    }
    out
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(token: &str) -> Option<Compound> {
    let mut compound = Compound::default();
    let mut rest = token;

    let tag_len = rest
        .find(|c: char| !is_ident_char(c) && c != '*')
        .unwrap_or(rest.len());
    if tag_len > 0 {
        let tag = &rest[..tag_len];
        if tag != "*" {
            compound.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[tag_len..];
    }

    while let Some(c) = rest.chars().next() {
        match c {
            '.' => {
                let body = &rest[1..];
                let len = body.find(|c: char| !is_ident_char(c)).unwrap_or(body.len());
                if len == 0 {
                    return None;
                }
                compound.classes.push(body[..len].to_string());
                rest = &body[len..];
            }
            '[' => {
                let close = rest.find(']')?;
                compound.attrs.push(parse_attr(&rest[1..close])?);
                rest = &rest[close + 1..];
            }
            _ => return None,
        }
    }
    Some(compound)
}

fn parse_attr(body: &str) -> Option<AttrCondition> {
    let Some((name, value)) = body.split_once('=') else {
        let name = body.trim();
        if name.is_empty() || !name.chars().all(is_ident_char) {
            return None;
        }
        return Some(AttrCondition {
            name: name.to_string(),
            value: None,
        });
    };
    let name = name.trim();
    let value = value.trim();
    let unquoted = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);
    if name.is_empty() || !name.chars().all(is_ident_char) {
        return None;
    }
    Some(AttrCondition {
        name: name.to_string(),
        value: Some(unquoted.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compound_chain() {
        let sel = Selector::parse(".ytp-variable-speed-panel-display span").expect("valid");
        assert_eq!(sel.parts.len(), 2);
        assert_eq!(sel.parts[0].classes, ["ytp-variable-speed-panel-display"]);
        assert_eq!(sel.subject().tag.as_deref(), Some("span"));
    }

    #[test]
    fn parses_multiple_classes_and_attributes() {
        let sel = Selector::parse(r#"div.ytp-popup.ytp-settings-menu[data-speed="2.5"]"#)
            .expect("valid");
        let c = sel.subject();
        assert_eq!(c.tag.as_deref(), Some("div"));
        assert_eq!(c.classes, ["ytp-popup", "ytp-settings-menu"]);
        assert_eq!(
            c.attrs,
            [AttrCondition {
                name: "data-speed".into(),
                value: Some("2.5".into()),
            }]
        );
    }

    #[test]
    fn universal_selector_has_no_conditions() {
        let sel = Selector::parse("*").expect("valid");
        assert_eq!(sel.subject(), &Compound::default());
    }

    #[test]
    fn brackets_keep_spaces_together() {
        let sel = Selector::parse(r#"[title="a b"] span"#).expect("valid");
        assert_eq!(sel.parts.len(), 2);
        assert_eq!(sel.parts[0].attrs[0].value.as_deref(), Some("a b"));
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(Selector::parse("").is_none());
        assert!(Selector::parse("a > b").is_none());
        assert!(Selector::parse("a:hover").is_none());
        assert!(Selector::parse(".").is_none());
    }
}
