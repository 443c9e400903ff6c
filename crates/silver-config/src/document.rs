// crates/silver-config/src/document.rs

//! A mutable XML tree for placing comments.
//!
//! [`XmlDocument`] owns a [`Xot`] arena and the document node parsed into
//! it. Navigation and manipulation go through `xot`; text output is written
//! with the `quick-xml` event writer so it follows [`XmlWriterOptions`].

use core::fmt;

use log::{trace, warn};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use xot::{Axis, Value, Xot};

use crate::error::{ConfigError, Result};
use crate::options::XmlWriterOptions;
use crate::path::XmlPath;

/// Handle to a node inside an [`XmlDocument`].
///
/// A handle is only meaningful for the document that returned it.
pub type NodeId = xot::Node;

/// A mutable, in-memory XML document.
pub struct XmlDocument {
    xot: Xot,
    root: NodeId,
}

impl XmlDocument {
    /// Parses `xml` into a tree.
    ///
    /// Whitespace-only text next to elements or comments (indentation) is
    /// not kept. Entity and character references are resolved.
    ///
    /// # Errors
    /// `XmlTree` for anything `xot` rejects: syntax errors, unclosed
    /// elements, several root elements or text outside the root element.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut xot = Xot::new();
        let root = xot.parse(xml).map_err(tree_error)?;
        let mut doc = Self { xot, root };
        doc.strip_indentation()?;
        trace!("Built XML tree with {} nodes", doc.descendants(root).len() + 1);
        Ok(doc)
    }

    fn strip_indentation(&mut self) -> Result<()> {
        let padding: Vec<NodeId> = self
            .descendants(self.root)
            .into_iter()
            .filter(|&node| {
                self.xot.text_str(node).is_some_and(|t| t.trim().is_empty())
                    && self
                        .parent(node)
                        .is_some_and(|parent| self.children(parent).iter().any(|&c| !self.xot.is_text(c)))
            })
            .collect();
        for node in padding {
            self.xot.remove(node).map_err(tree_error)?;
        }
        Ok(())
    }

    // --- Access ---

    /// The document node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The single top-level element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.xot.document_element(self.root).ok()
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.xot.is_element(node)
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        self.xot.is_text(node)
    }

    pub fn is_comment(&self, node: NodeId) -> bool {
        self.xot.is_comment(node)
    }

    /// The element name, or `None` for non-element nodes.
    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.xot
            .element(node)
            .map(|element| self.xot.local_name_str(element.name()))
    }

    /// The text of a comment node.
    pub fn comment_text(&self, node: NodeId) -> Option<&str> {
        self.xot.comment_str(node)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attributes(node)
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    fn attributes(&self, node: NodeId) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.xot
            .axis(Axis::Attribute, node)
            .filter_map(move |attr| match self.xot.value(attr) {
                Value::Attribute(attribute) => {
                    let value: &str = attribute.value();
                    Some((self.xot.local_name_str(attribute.name()), value))
                }
                _ => None,
            })
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.xot.parent(node)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.xot.children(node).collect()
    }

    /// All nodes below `node` in document order, not including `node` itself.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node);
        stack.reverse();
        while let Some(next) = stack.pop() {
            out.push(next);
            let mut children = self.children(next);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Concatenated text content of `node` and its descendants. Comments do
    /// not contribute.
    pub fn inner_text(&self, node: NodeId) -> String {
        if let Some(text) = self.xot.text_str(node).or_else(|| self.xot.comment_str(node)) {
            return text.to_string();
        }
        self.descendants(node)
            .into_iter()
            .filter_map(|n| self.xot.text_str(n))
            .collect()
    }

    // --- Queries ---

    /// Compiles `path` and returns every matching node in document order.
    pub fn select_nodes(&self, path: &str) -> Result<Vec<NodeId>> {
        Ok(XmlPath::parse(path)?.select(self))
    }

    /// Compiles `path` and returns the first matching node in document order.
    pub fn select_single_node(&self, path: &str) -> Result<Option<NodeId>> {
        Ok(XmlPath::parse(path)?.select_first(self))
    }

    // --- Manipulation ---

    /// Creates a detached comment node.
    ///
    /// # Errors
    /// `InvalidComment` if `text` contains `--` or ends with `-`, which
    /// cannot be written inside `<!-- -->`.
    pub fn create_comment(&mut self, text: &str) -> Result<NodeId> {
        if text.contains("--") || text.ends_with('-') {
            return Err(ConfigError::InvalidComment {
                comment: text.to_string(),
            });
        }
        Ok(self.xot.new_comment(text))
    }

    /// Replaces every child of the element `node` with a single text node
    /// holding `text` (stored unescaped).
    pub fn set_inner_text(&mut self, node: NodeId, text: &str) -> Result<()> {
        if !self.xot.is_element(node) {
            return Err(ConfigError::MalformedDocument(
                "inner text can only be set on elements",
            ));
        }
        for child in self.children(node) {
            self.xot.remove(child).map_err(tree_error)?;
        }
        if !text.is_empty() {
            let text = self.xot.new_text(text);
            self.xot.append(node, text).map_err(tree_error)?;
        }
        Ok(())
    }

    /// Inserts a detached node as the first child of `parent`.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.xot.prepend(parent, child).map_err(tree_error)
    }

    /// Inserts a detached node as the sibling immediately preceding
    /// `reference`.
    pub fn insert_before(&mut self, reference: NodeId, new: NodeId) -> Result<()> {
        self.xot.insert_before(reference, new).map_err(tree_error)
    }

    // --- Output ---

    /// Renders the document as text using `options`.
    ///
    /// Elements holding only elements and comments are indented; an element
    /// with text content is written on one line so its value stays intact.
    pub fn to_string_with(&self, options: &XmlWriterOptions) -> Result<String> {
        options.validate()?;
        let mut writer = Writer::new(Vec::new());
        let mut first = true;
        if options.declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
            first = false;
        }
        for child in self.children(self.root) {
            if !first {
                write_break(&mut writer, options, 0)?;
            }
            self.write_node(&mut writer, child, options, 0, options.is_indented())?;
            first = false;
        }
        String::from_utf8(writer.into_inner())
            .map_err(|_| ConfigError::MalformedDocument("writer produced invalid UTF-8"))
    }

    fn write_node(
        &self,
        writer: &mut Writer<Vec<u8>>,
        node: NodeId,
        options: &XmlWriterOptions,
        depth: usize,
        indent: bool,
    ) -> Result<()> {
        match self.xot.value(node) {
            Value::Element(element) => {
                let name = self.xot.local_name_str(element.name());
                let mut start = BytesStart::new(name);
                for attribute in self.attributes(node) {
                    start.push_attribute(attribute);
                }
                let children = self.children(node);
                if children.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                    return Ok(());
                }

                let indent = indent && !children.iter().any(|&c| self.xot.is_text(c));
                writer.write_event(Event::Start(start))?;
                for child in children {
                    if indent {
                        write_break(writer, options, depth + 1)?;
                    }
                    self.write_node(writer, child, options, depth + 1, indent)?;
                }
                if indent {
                    write_break(writer, options, depth)?;
                }
                writer.write_event(Event::End(BytesEnd::new(name)))?;
            }
            Value::Text(text) => writer.write_event(Event::Text(BytesText::new(text.get())))?,
            Value::Comment(comment) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(comment.get())))?
            }
            _ => warn!("Skipping unsupported node while writing XML"),
        }
        Ok(())
    }
}

impl fmt::Debug for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XmlDocument")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for XmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .to_string_with(&XmlWriterOptions::default())
            .map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl core::str::FromStr for XmlDocument {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// --- Helper Functions ---

fn tree_error(err: impl fmt::Display) -> ConfigError {
    ConfigError::XmlTree(err.to_string())
}

/// Line break followed by `depth` levels of indentation.
fn write_break(writer: &mut Writer<Vec<u8>>, options: &XmlWriterOptions, depth: usize) -> Result<()> {
    if options.is_indented() {
        let mut padding = String::from("\n");
        padding.extend(core::iter::repeat_n(options.indent_char, depth * options.indent_size));
        writer.write_event(Event::Text(BytesText::new(&padding)))?;
    }
    Ok(())
}
