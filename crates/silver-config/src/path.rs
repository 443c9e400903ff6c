// crates/silver-config/src/path.rs

//! XPath-like expressions for locating nodes in an [`XmlDocument`].
//!
//! Supported syntax:
//! - `/a/b` child steps from the document node (`a/b` is evaluated from
//!   the document node as well);
//! - `//b` any descendant, also in the middle of a path (`/a//c`);
//! - `*` any element, `text()` and `comment()` tests;
//! - predicates `[2]`, `[last()]`, `[@key]` and `[@key='value']`.
//!
//! Matches are returned in document order without duplicates.

use core::fmt;
use core::str::FromStr;
use std::collections::HashMap;

use log::trace;

use crate::document::{NodeId, XmlDocument};
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeTest {
    Name(String),
    AnyElement,
    Text,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    /// 1-based.
    Position(usize),
    Last,
    HasAttribute(String),
    AttributeEquals(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    /// Preceded by `//` rather than `/`.
    descendant: bool,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

/// A compiled path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlPath {
    source: String,
    steps: Vec<Step>,
}

impl XmlPath {
    /// Compiles `path`.
    ///
    /// # Errors
    /// `InvalidPath` if the expression is empty or uses unsupported syntax.
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = |reason| ConfigError::InvalidPath {
            path: path.to_string(),
            reason,
        };

        if path.trim().is_empty() {
            return Err(invalid("empty expression"));
        }

        let mut steps = Vec::new();
        let mut rest = path.trim();
        if rest == "/" {
            return Ok(Self {
                source: path.to_string(),
                steps,
            });
        }

        while !rest.is_empty() {
            let descendant = if let Some(r) = rest.strip_prefix("//") {
                rest = r;
                true
            } else if let Some(r) = rest.strip_prefix('/') {
                rest = r;
                false
            } else if steps.is_empty() {
                false
            } else {
                return Err(invalid("expected `/` between steps"));
            };
            if rest.is_empty() {
                return Err(invalid("trailing separator"));
            }

            let end = rest.find(['/', '[']).unwrap_or(rest.len());
            let test = parse_node_test(rest[..end].trim()).ok_or_else(|| invalid("invalid node test"))?;
            rest = &rest[end..];

            let mut predicates = Vec::new();
            while let Some(r) = rest.strip_prefix('[') {
                let close = find_closing_bracket(r).ok_or_else(|| invalid("unclosed predicate"))?;
                let predicate =
                    parse_predicate(r[..close].trim()).ok_or_else(|| invalid("unsupported predicate"))?;
                predicates.push(predicate);
                rest = &r[close + 1..];
            }

            steps.push(Step {
                descendant,
                test,
                predicates,
            });
        }

        Ok(Self {
            source: path.to_string(),
            steps,
        })
    }

    /// The expression this path was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Every node of `doc` matching this path, in document order.
    pub fn select(&self, doc: &XmlDocument) -> Vec<NodeId> {
        let order: HashMap<NodeId, usize> = core::iter::once(doc.root())
            .chain(doc.descendants(doc.root()))
            .enumerate()
            .map(|(position, id)| (id, position))
            .collect();

        let mut context = vec![doc.root()];
        for step in &self.steps {
            let bases: Vec<NodeId> = if step.descendant {
                let mut all = Vec::new();
                for &node in &context {
                    all.push(node);
                    all.extend(doc.descendants(node));
                }
                sort_unique(all, &order)
            } else {
                context
            };

            let mut next = Vec::new();
            for base in bases {
                let mut matched: Vec<NodeId> = doc
                    .children(base)
                    .into_iter()
                    .filter(|&child| step.test.matches(doc, child))
                    .collect();
                for predicate in &step.predicates {
                    matched = predicate.apply(doc, matched);
                }
                next.extend(matched);
            }
            context = sort_unique(next, &order);
            if context.is_empty() {
                break;
            }
        }

        trace!("Path `{}` matched {} node(s)", self.source, context.len());
        context
    }

    /// The first node of `doc` matching this path in document order.
    pub fn select_first(&self, doc: &XmlDocument) -> Option<NodeId> {
        self.select(doc).into_iter().next()
    }
}

impl NodeTest {
    fn matches(&self, doc: &XmlDocument, node: NodeId) -> bool {
        match self {
            NodeTest::Name(wanted) => doc.name(node) == Some(wanted.as_str()),
            NodeTest::AnyElement => doc.is_element(node),
            NodeTest::Text => doc.is_text(node),
            NodeTest::Comment => doc.is_comment(node),
        }
    }
}

impl Predicate {
    fn apply(&self, doc: &XmlDocument, nodes: Vec<NodeId>) -> Vec<NodeId> {
        match self {
            Predicate::Position(n) => nodes.get(n - 1).copied().into_iter().collect(),
            Predicate::Last => nodes.last().copied().into_iter().collect(),
            Predicate::HasAttribute(key) => nodes
                .into_iter()
                .filter(|&id| doc.attribute(id, key).is_some())
                .collect(),
            Predicate::AttributeEquals(key, value) => nodes
                .into_iter()
                .filter(|&id| doc.attribute(id, key) == Some(value.as_str()))
                .collect(),
        }
    }
}

impl FromStr for XmlPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for XmlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// --- Helper Functions ---

fn parse_node_test(s: &str) -> Option<NodeTest> {
    match s {
        "*" => Some(NodeTest::AnyElement),
        "text()" => Some(NodeTest::Text),
        "comment()" => Some(NodeTest::Comment),
        name if is_valid_name(name) => Some(NodeTest::Name(name.to_string())),
        _ => None,
    }
}

fn parse_predicate(s: &str) -> Option<Predicate> {
    if s == "last()" {
        return Some(Predicate::Last);
    }
    if let Ok(position) = s.parse::<usize>() {
        return (position > 0).then_some(Predicate::Position(position));
    }
    let attr = s.strip_prefix('@')?;
    match attr.split_once('=') {
        None => {
            let key = attr.trim();
            is_valid_name(key).then(|| Predicate::HasAttribute(key.to_string()))
        }
        Some((key, value)) => {
            let key = key.trim();
            let value = unquote(value.trim())?;
            is_valid_name(key).then(|| Predicate::AttributeEquals(key.to_string(), value.to_string()))
        }
    }
}

fn unquote(s: &str) -> Option<&str> {
    let quote = s.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let inner = s.strip_prefix(quote)?.strip_suffix(quote)?;
    (!inner.contains(quote)).then_some(inner)
}

/// Index of the `]` closing a predicate, skipping brackets inside quotes.
fn find_closing_bracket(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, ']') => return Some(i),
            (None, _) => {}
        }
    }
    None
}

/// Loose XML name check: non-empty, no whitespace or markup characters.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

fn sort_unique(mut nodes: Vec<NodeId>, order: &HashMap<NodeId, usize>) -> Vec<NodeId> {
    nodes.sort_by_key(|id| order.get(id).copied().unwrap_or(usize::MAX));
    nodes.dedup();
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"<Settings>
  <Servers>
    <Server name="a"><Port>1</Port></Server>
    <Server name="b"><Port>2</Port></Server>
    <Server><Port>3</Port></Server>
  </Servers>
  <Port>9</Port>
  <!-- trailing -->
</Settings>"#;

    fn texts(doc: &XmlDocument, nodes: &[NodeId]) -> Vec<String> {
        nodes.iter().map(|&id| doc.inner_text(id)).collect()
    }

    #[test]
    fn test_absolute_and_relative_paths() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let abs = XmlPath::parse("/Settings/Port").unwrap().select(&doc);
        let rel = XmlPath::parse("Settings/Port").unwrap().select(&doc);
        assert_eq!(texts(&doc, &abs), ["9"]);
        assert_eq!(abs, rel);
    }

    #[test]
    fn test_descendant_steps_in_document_order() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let ports = XmlPath::parse("//Port").unwrap().select(&doc);
        assert_eq!(texts(&doc, &ports), ["1", "2", "3", "9"]);

        let nested = XmlPath::parse("/Settings//Server/Port").unwrap().select(&doc);
        assert_eq!(texts(&doc, &nested), ["1", "2", "3"]);
    }

    #[test]
    fn test_predicates() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let select = |p: &str| texts(&doc, &XmlPath::parse(p).unwrap().select(&doc));

        assert_eq!(select("/Settings/Servers/Server[2]/Port"), ["2"]);
        assert_eq!(select("/Settings/Servers/Server[last()]/Port"), ["3"]);
        assert_eq!(select("//Server[@name]/Port"), ["1", "2"]);
        assert_eq!(select("//Server[@name='b']/Port"), ["2"]);
        assert_eq!(select(r#"//Server[@name="a"]/Port"#), ["1"]);
        assert!(select("/Settings/Servers/Server[4]").is_empty());
    }

    #[test]
    fn test_position_is_per_parent_for_descendants() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let firsts = XmlPath::parse("//Port[1]").unwrap().select(&doc);
        assert_eq!(texts(&doc, &firsts), ["1", "2", "3", "9"]);
    }

    #[test]
    fn test_node_type_tests() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let comments = XmlPath::parse("/Settings/comment()").unwrap().select(&doc);
        assert_eq!(comments.len(), 1);
        let any = XmlPath::parse("/Settings/*").unwrap().select(&doc);
        assert_eq!(any.len(), 2);
        let text = XmlPath::parse("/Settings/Port/text()").unwrap().select(&doc);
        assert_eq!(texts(&doc, &text), ["9"]);
        let root = XmlPath::parse("/").unwrap().select(&doc);
        assert_eq!(root, [doc.root()]);
    }

    #[test]
    fn test_no_duplicates_from_overlapping_contexts() {
        let doc = XmlDocument::parse("<a><a><b/></a></a>").unwrap();
        let found = XmlPath::parse("//a//b").unwrap().select(&doc);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_invalid_expressions() {
        for bad in ["", "   ", "/a/", "/a[", "/a[0]", "/a[foo]", "/a b", "/a[@k='v]", "a//", "/node()"] {
            assert!(
                matches!(XmlPath::parse(bad), Err(ConfigError::InvalidPath { .. })),
                "expected `{bad}` to be rejected"
            );
        }
    }

    #[test]
    fn test_display_returns_source() {
        let path: XmlPath = "/Settings//Port[1]".parse().unwrap();
        assert_eq!(path.to_string(), "/Settings//Port[1]");
        assert_eq!(path.as_str(), "/Settings//Port[1]");
    }
}
