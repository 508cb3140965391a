//! Newick parsing for somatic-cell lineage trees.
//!
//! # Overview
//!
//! Each sequenced individual carries zero or more somatic lineage trees in
//! Newick form (`(a:0.1,b:0.2)c:0.05;`). The parser here covers the subset
//! that lineage descriptions use:
//!
//! - nested groups with any arity,
//! - a label on every node (required — unlabeled somatic nodes cannot be
//!   matched against the sequenced-sample list, so they are a parse error),
//! - an optional non-negative `:length` per node (default 1.0),
//! - an optional trailing `;`.
//!
//! The output is an owned [`SomaticTree`]; grafting it into the relationship
//! graph is the caller's job, which keeps this parser independent of the
//! graph representation.

use tracing::trace;

use crate::error::{PedigreeError, Result};

// ---------------------------------------------------------------------------
// Tree model
// ---------------------------------------------------------------------------

/// One node of a parsed somatic lineage tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SomaticNode {
    /// Node label, non-empty.
    pub label: String,
    /// Branch length from this node to its parent (or to the germline root
    /// for the tree root). Defaults to 1.0 when the input omits it.
    pub length: f64,
    /// Child lineages, empty for tips.
    pub children: Vec<SomaticNode>,
}

impl SomaticNode {
    /// Longest path from this node's parent down to any tip, including this
    /// node's own branch.
    fn depth(&self) -> f64 {
        let below = self
            .children
            .iter()
            .map(SomaticNode::depth)
            .fold(0.0_f64, f64::max);
        self.length + below
    }

    fn scale(&mut self, factor: f64) {
        self.length *= factor;
        for child in &mut self.children {
            child.scale(factor);
        }
    }
}

/// A parsed somatic lineage tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SomaticTree {
    pub root: SomaticNode,
}

impl SomaticTree {
    /// Rescale branch lengths so the deepest root-to-tip path is 1.0.
    ///
    /// Trees whose total depth is 0 are left untouched.
    pub fn normalize_depth(&mut self) {
        let depth = self.root.depth();
        if depth > 0.0 {
            self.root.scale(1.0 / depth);
        }
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        fn count(node: &SomaticNode) -> usize {
            1 + node.children.iter().map(count).sum::<usize>()
        }
        count(&self.root)
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a Newick somatic lineage description.
///
/// # Errors
///
/// Returns [`PedigreeError::InvalidPedigree`] describing the first syntax
/// problem found: unbalanced parentheses, a missing label, a malformed or
/// negative branch length, or trailing garbage.
pub fn parse(text: &str) -> Result<SomaticTree> {
    let mut parser = Parser {
        bytes: text.as_bytes(),
        pos: 0,
    };
    parser.skip_ws();
    let root = parser.subtree()?;
    parser.skip_ws();
    if parser.peek() == Some(b';') {
        parser.pos += 1;
        parser.skip_ws();
    }
    if let Some(c) = parser.peek() {
        return Err(parser.fail(format!("unexpected character '{}'", char::from(c))));
    }
    let tree = SomaticTree { root };
    trace!(nodes = tree.node_count(), "parsed somatic tree");
    Ok(tree)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn fail(&self, message: impl Into<String>) -> PedigreeError {
        PedigreeError::invalid(format!(
            "newick syntax error at byte {}: {}",
            self.pos,
            message.into()
        ))
    }

    fn subtree(&mut self) -> Result<SomaticNode> {
        self.skip_ws();
        let children = if self.peek() == Some(b'(') {
            self.pos += 1;
            let mut children = vec![self.subtree()?];
            loop {
                self.skip_ws();
                match self.peek() {
                    Some(b',') => {
                        self.pos += 1;
                        children.push(self.subtree()?);
                    }
                    Some(b')') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(self.fail("expected ',' or ')'")),
                }
            }
            children
        } else {
            Vec::new()
        };

        let label = self.label()?;
        let length = self.length()?;
        Ok(SomaticNode {
            label,
            length,
            children,
        })
    }

    fn label(&mut self) -> Result<String> {
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| !matches!(c, b'(' | b')' | b',' | b':' | b';'))
        {
            self.pos += 1;
        }
        let raw = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| self.fail("label is not valid UTF-8"))?;
        let label = raw.trim();
        if label.is_empty() {
            return Err(self.fail("every somatic node must be labeled"));
        }
        Ok(label.to_string())
    }

    fn length(&mut self) -> Result<f64> {
        self.skip_ws();
        if self.peek() != Some(b':') {
            return Ok(1.0);
        }
        self.pos += 1;
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| matches!(c, b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-'))
        {
            self.pos += 1;
        }
        let raw = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| self.fail("branch length is not valid UTF-8"))?;
        let value: f64 = raw
            .parse()
            .map_err(|_| self.fail(format!("malformed branch length '{raw}'")))?;
        if !value.is_finite() || value < 0.0 {
            return Err(self.fail(format!("branch length '{raw}' must be non-negative")));
        }
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn single_node_tree() {
        let tree = parse("a;").unwrap();
        assert_eq!(tree.root.label, "a");
        assert_relative_eq!(tree.root.length, 1.0);
        assert!(tree.root.children.is_empty());
    }

    #[test]
    fn trailing_semicolon_is_optional() {
        let tree = parse("tissue").unwrap();
        assert_eq!(tree.root.label, "tissue");
    }

    #[test]
    fn lengths_parse_and_default() {
        let tree = parse("(a:0.25,b)c:0.5;").unwrap();
        assert_eq!(tree.root.label, "c");
        assert_relative_eq!(tree.root.length, 0.5);
        assert_eq!(tree.root.children.len(), 2);
        assert_relative_eq!(tree.root.children[0].length, 0.25);
        // b has no explicit length
        assert_relative_eq!(tree.root.children[1].length, 1.0);
    }

    #[test]
    fn nested_groups() {
        let tree = parse("((t1:0.1,t2:0.2)inner:0.3,t3:0.4)outer:0.5;").unwrap();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.root.children[0].label, "inner");
        assert_eq!(tree.root.children[0].children[1].label, "t2");
    }

    #[test]
    fn whitespace_tolerated() {
        let tree = parse(" ( a : 0.1 , b : 0.2 ) c ;").unwrap();
        assert_eq!(tree.root.label, "c");
        assert_eq!(tree.root.children[0].label, "a");
    }

    #[test]
    fn scientific_notation_lengths() {
        let tree = parse("a:1e-3;").unwrap();
        assert_relative_eq!(tree.root.length, 1e-3);
    }

    #[test]
    fn missing_label_is_an_error() {
        let err = parse("(a,b);").unwrap_err();
        assert!(err.to_string().contains("labeled"), "err: {err}");
    }

    #[test]
    fn unbalanced_parens_are_an_error() {
        assert!(parse("(a,b").is_err());
        assert!(parse("a)b;").is_err());
    }

    #[test]
    fn negative_length_is_an_error() {
        let err = parse("a:-1;").unwrap_err();
        assert!(err.to_string().contains("non-negative"), "err: {err}");
    }

    #[test]
    fn malformed_length_is_an_error() {
        assert!(parse("a:;").is_err());
    }

    #[test]
    fn trailing_garbage_is_an_error() {
        assert!(parse("a;b").is_err());
    }

    #[test]
    fn normalize_scales_deepest_path_to_one() {
        let mut tree = parse("((t1:0.2,t2:0.6)n:0.2,t3:0.1)r:0.2;").unwrap();
        tree.normalize_depth();
        // Deepest path before: r(0.2) + n(0.2) + t2(0.6) = 1.0, already 1.0.
        assert_relative_eq!(tree.root.depth(), 1.0);

        let mut tree = parse("(t1:1.0,t2:3.0)r:1.0;").unwrap();
        tree.normalize_depth();
        assert_relative_eq!(tree.root.depth(), 1.0);
        assert_relative_eq!(tree.root.length, 0.25);
        assert_relative_eq!(tree.root.children[1].length, 0.75);
    }

    #[test]
    fn normalize_leaves_zero_depth_untouched() {
        let mut tree = parse("a:0;").unwrap();
        tree.normalize_depth();
        assert_relative_eq!(tree.root.length, 0.0);
    }
}
