// crates/silver-config/src/utils.rs

//! Helpers for turning values into XML and annotating the result with comments.

use core::fmt::Write;

use log::debug;
use serde::Serialize;

use crate::document::{NodeId, XmlDocument};
use crate::error::{ConfigError, Result};
use crate::options::{XML_DECLARATION, XmlWriterOptions};
use crate::path::XmlPath;

/// Serializes `input` into a complete XML document string using the default
/// [`XmlWriterOptions`].
///
/// The root element is named after the serde container (the struct name or
/// its `#[serde(rename)]`).
///
/// # Errors
/// Returns `XmlSerializing` if `quick-xml` cannot represent the value (for
/// example a bare integer, which has no element name), and
/// `InvalidOptions` for an indent character outside ASCII whitespace.
pub fn serialize_to_xml_string<T: Serialize + ?Sized>(input: &T) -> Result<String> {
    serialize_to_xml_string_with(input, &XmlWriterOptions::default())
}

/// Same as [`serialize_to_xml_string`] with explicit options.
pub fn serialize_to_xml_string_with<T: Serialize + ?Sized>(
    input: &T,
    options: &XmlWriterOptions,
) -> Result<String> {
    options.validate()?;
    let mut buffer = String::new();
    if options.declaration {
        write!(&mut buffer, "{}", XML_DECLARATION)
            .map_err(|_| ConfigError::MalformedDocument("failed to write declaration"))?;
        if options.is_indented() {
            buffer.push('\n');
        }
    }

    let mut serializer = quick_xml::se::Serializer::new(&mut buffer);
    if options.is_indented() {
        serializer.indent(options.indent_char, options.indent_size);
    }
    input.serialize(serializer)?;
    Ok(buffer)
}

/// Serializes `input` and loads the result into a mutable [`XmlDocument`].
///
/// Whitespace-only text produced by indentation is not kept in the tree.
pub fn serialize_to_xml_document<T: Serialize + ?Sized>(input: &T) -> Result<XmlDocument> {
    let xml = serialize_to_xml_string(input)?;
    XmlDocument::parse(&xml)
}

/// Prepends `<!--{comment}-->` and a newline to the inner text of the node
/// matching `path`.
///
/// This is a textual splice: the node's children are replaced by a single
/// text node, so the marker is escaped when the document is written. Use
/// [`comment_first_in_object`] for a real comment node.
///
/// # Errors
/// - `EmptyArgument` if `path` is empty.
/// - `InvalidPath` if `path` does not compile.
/// - `ElementNotFound` if nothing matches `path`.
pub fn comment_in_object<'d>(
    document: &'d mut XmlDocument,
    path: &str,
    comment: &str,
) -> Result<&'d mut XmlDocument> {
    let target = find_target(document, path)?;
    let spliced = format!("<!--{}-->\n{}", comment, document.inner_text(target));
    document.set_inner_text(target, &spliced)?;
    debug!("Spliced comment into the text of `{}`", path);
    Ok(document)
}

/// Inserts a comment node immediately before the node matching `path`.
///
/// If nothing matches, or the match has no parent, the document is returned
/// unchanged.
///
/// # Errors
/// - `InvalidPath` if `path` does not compile.
/// - `InvalidComment` if `comment` cannot be written inside `<!-- -->`.
pub fn comment_before_object<'d>(
    document: &'d mut XmlDocument,
    path: &str,
    comment: &str,
) -> Result<&'d mut XmlDocument> {
    let target = XmlPath::parse(path)?.select_first(document);
    let parent = target.and_then(|t| document.parent(t));
    let (Some(target), Some(_)) = (target, parent) else {
        debug!("No element at `{}`, leaving the document unchanged", path);
        return Ok(document);
    };

    let node = document.create_comment(comment)?;
    document.insert_before(target, node)?;
    Ok(document)
}

/// Inserts a comment node as the first child of the element matching `path`.
///
/// # Errors
/// - `EmptyArgument` if `path` is empty.
/// - `InvalidPath` if `path` does not compile.
/// - `ElementNotFound` if nothing matches `path`.
/// - `InvalidComment` if `comment` cannot be written inside `<!-- -->`.
pub fn comment_first_in_object<'d>(
    document: &'d mut XmlDocument,
    path: &str,
    comment: &str,
) -> Result<&'d mut XmlDocument> {
    let target = find_target(document, path)?;
    let node = document.create_comment(comment)?;
    document.prepend_child(target, node)?;
    Ok(document)
}

fn find_target(document: &XmlDocument, path: &str) -> Result<NodeId> {
    if path.is_empty() {
        return Err(ConfigError::EmptyArgument { argument: "path" });
    }
    XmlPath::parse(path)?
        .select_first(document)
        .ok_or_else(|| ConfigError::ElementNotFound {
            path: path.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Server {
        host: String,
        port: u16,
    }

    #[derive(Serialize)]
    #[serde(rename = "Config")]
    struct Config {
        name: String,
        server: Server,
    }

    fn sample() -> Config {
        Config {
            name: "demo".into(),
            server: Server {
                host: "localhost".into(),
                port: 8080,
            },
        }
    }

    fn compact(doc: &XmlDocument) -> String {
        let options = XmlWriterOptions::default()
            .without_indent()
            .with_declaration(false);
        doc.to_string_with(&options).unwrap()
    }

    #[test]
    fn test_serialize_to_xml_string() {
        let xml = serialize_to_xml_string(&sample()).unwrap();
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                        <Config>\n  \
                        <name>demo</name>\n  \
                        <server>\n    \
                        <host>localhost</host>\n    \
                        <port>8080</port>\n  \
                        </server>\n\
                        </Config>";
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_serialize_compact_without_declaration() {
        let options = XmlWriterOptions::default()
            .without_indent()
            .with_declaration(false);
        let xml = serialize_to_xml_string_with(&sample(), &options).unwrap();
        assert_eq!(
            xml,
            "<Config><name>demo</name><server><host>localhost</host><port>8080</port></server></Config>"
        );
    }

    /// The string encoder and the document writer lay out the same value
    /// identically, and reject the same options.
    #[test]
    fn test_writers_agree_on_indentation() {
        let tabs = XmlWriterOptions::default().with_indent('\t', 1);
        let doc = serialize_to_xml_document(&sample()).unwrap();
        assert_eq!(
            doc.to_string_with(&tabs).unwrap(),
            serialize_to_xml_string_with(&sample(), &tabs).unwrap()
        );

        let dots = XmlWriterOptions::default().with_indent('·', 2);
        assert!(matches!(
            serialize_to_xml_string_with(&sample(), &dots),
            Err(ConfigError::InvalidOptions(_))
        ));
        assert!(matches!(doc.to_string_with(&dots), Err(ConfigError::InvalidOptions(_))));
    }

    #[test]
    fn test_serialize_unnamed_root_fails() {
        assert!(matches!(
            serialize_to_xml_string(&42u32),
            Err(ConfigError::XmlSerializing(_))
        ));
    }

    #[test]
    fn test_serialize_to_xml_document() {
        let doc = serialize_to_xml_document(&sample()).unwrap();
        let root = doc.document_element().unwrap();
        assert_eq!(doc.name(root), Some("Config"));
        assert_eq!(doc.children(root).len(), 2);
        assert_eq!(
            compact(&doc),
            "<Config><name>demo</name><server><host>localhost</host><port>8080</port></server></Config>"
        );
    }

    #[test]
    fn test_comment_in_object_splices_text() {
        let mut doc = serialize_to_xml_document(&sample()).unwrap();
        comment_in_object(&mut doc, "/Config/name", "the name").unwrap();

        let name = doc.select_single_node("/Config/name").unwrap().unwrap();
        assert_eq!(doc.inner_text(name), "<!--the name-->\ndemo");
        assert!(compact(&doc).contains("<name>&lt;!--the name--"));
    }

    #[test]
    fn test_comment_in_object_missing_path() {
        let mut doc = serialize_to_xml_document(&sample()).unwrap();
        let before = compact(&doc);
        let err = comment_in_object(&mut doc, "/Config/missing", "x").unwrap_err();
        assert!(matches!(err, ConfigError::ElementNotFound { ref path } if path == "/Config/missing"));
        assert_eq!(compact(&doc), before);
    }

    #[test]
    fn test_comment_in_object_empty_path() {
        let mut doc = serialize_to_xml_document(&sample()).unwrap();
        let before = compact(&doc);
        assert!(matches!(
            comment_in_object(&mut doc, "", "x"),
            Err(ConfigError::EmptyArgument { argument: "path" })
        ));
        assert_eq!(compact(&doc), before);
    }

    #[test]
    fn test_comment_before_object_inserts_sibling() {
        let mut doc = serialize_to_xml_document(&sample()).unwrap();
        comment_before_object(&mut doc, "/Config/server", " where to connect ")
            .unwrap()
            .select_single_node("/Config/comment()")
            .unwrap()
            .expect("comment should be a child of Config");
        assert_eq!(
            compact(&doc),
            "<Config><name>demo</name><!-- where to connect --><server><host>localhost</host>\
             <port>8080</port></server></Config>"
        );
    }

    #[test]
    fn test_comment_before_object_missing_is_noop() {
        let mut doc = serialize_to_xml_document(&sample()).unwrap();
        let before = compact(&doc);
        comment_before_object(&mut doc, "/Config/missing", "x").unwrap();
        assert_eq!(compact(&doc), before);
    }

    #[test]
    fn test_comment_before_document_node_is_noop() {
        let mut doc = serialize_to_xml_document(&sample()).unwrap();
        let before = compact(&doc);
        // The document node has no parent.
        comment_before_object(&mut doc, "/", "x").unwrap();
        assert_eq!(compact(&doc), before);
    }

    #[test]
    fn test_comment_before_root_element() {
        let mut doc = serialize_to_xml_document(&sample()).unwrap();
        comment_before_object(&mut doc, "/Config", "generated").unwrap();
        assert!(compact(&doc).starts_with("<!--generated--><Config>"));
    }

    #[test]
    fn test_comment_first_in_object() {
        let mut doc = serialize_to_xml_document(&sample()).unwrap();
        comment_first_in_object(&mut doc, "/Config/server", "connection").unwrap();
        assert!(compact(&doc).contains("<server><!--connection--><host>"));
        assert!(matches!(
            comment_first_in_object(&mut doc, "/Config/nope", "x"),
            Err(ConfigError::ElementNotFound { .. })
        ));
    }

    #[test]
    fn test_chaining() {
        let mut doc = serialize_to_xml_document(&sample()).unwrap();
        let doc = comment_before_object(&mut doc, "/Config/name", "a").unwrap();
        let doc = comment_before_object(doc, "/Config/server", "b").unwrap();
        assert_eq!(doc.select_nodes("/Config/comment()").unwrap().len(), 2);
    }
}
