// crates/silver-config/src/error.rs

use quick_xml::errors::serialize::{DeError, SeError};
use thiserror::Error;

/// Errors that can occur while reading, writing or annotating a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required string argument was empty.
    #[error("argument `{argument}` may not be empty")]
    EmptyArgument { argument: &'static str },

    /// The element a comment should be attached to does not exist.
    #[error("Could not find the element to comment, looked for {path}")]
    ElementNotFound { path: String },

    /// A path expression could not be compiled.
    #[error("invalid path expression `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// The text cannot be stored inside `<!-- -->`.
    #[error("text cannot be written as an XML comment: {comment:?}")]
    InvalidComment { comment: String },

    /// A tree operation was applied to a node that cannot take it.
    #[error("malformed XML document: {0}")]
    MalformedDocument(&'static str),

    /// The document could not be parsed into, or edited as, a tree.
    #[error("XML tree error: {0}")]
    XmlTree(String),

    /// The writer options cannot produce well-formed output.
    #[error("invalid writer options: {0}")]
    InvalidOptions(&'static str),

    /// An error from the underlying `quick-xml` deserializer.
    #[error("XML parsing error: {0}")]
    XmlParsing(#[from] DeError),

    /// An error from the underlying `quick-xml` serializer.
    #[error("XML serializing error: {0}")]
    XmlSerializing(#[from] SeError),

    /// An error from the `quick-xml` event reader or writer.
    #[error("XML reading error: {0}")]
    XmlReading(#[from] quick_xml::Error),

    /// File access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = ConfigError> = core::result::Result<T, E>;
