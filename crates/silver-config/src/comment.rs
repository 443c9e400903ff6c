// crates/silver-config/src/comment.rs

//! Comment annotations for configuration fields.
//!
//! A configuration type lists the comments for its fields in a static table
//! by implementing [`CommentedConfig`]. Writers that support comments
//! (see [`CommentedXmlConfigReader`](crate::CommentedXmlConfigReader)) walk
//! this table to place an XML comment next to each field's element.

/// A human-readable comment attached to a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Comment {
    /// The comment text.
    pub description: &'static str,
    /// `true` places the comment inside the field's own element (before its
    /// first child), `false` places it immediately before the element.
    pub inside_of_object: bool,
}

impl Comment {
    /// A comment written immediately before the field's element.
    pub const fn new(description: &'static str) -> Self {
        Self {
            description,
            inside_of_object: false,
        }
    }

    /// A comment written inside the field's element.
    pub const fn inside(description: &'static str) -> Self {
        Self {
            description,
            inside_of_object: true,
        }
    }
}

/// Associates a [`Comment`] with the element name of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldComment {
    /// The element name of the field as it appears in the XML (after any
    /// `#[serde(rename)]`).
    pub field: &'static str,
    pub comment: Comment,
}

impl FieldComment {
    pub const fn new(field: &'static str, comment: Comment) -> Self {
        Self { field, comment }
    }
}

/// Implemented by configuration types that carry field comments.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use silver_config::{Comment, CommentedConfig, FieldComment};
///
/// #[derive(Serialize, Deserialize)]
/// struct Settings {
///     port: u16,
/// }
///
/// impl CommentedConfig for Settings {
///     fn field_comments() -> &'static [FieldComment] {
///         const COMMENTS: &[FieldComment] =
///             &[FieldComment::new("port", Comment::new(" TCP port to listen on "))];
///         COMMENTS
///     }
/// }
///
/// assert_eq!(Settings::comment_for("port").unwrap().description, " TCP port to listen on ");
/// assert!(Settings::comment_for("host").is_none());
/// ```
pub trait CommentedConfig {
    /// The comments for this type's fields, in the order they are applied.
    fn field_comments() -> &'static [FieldComment];

    /// Looks up the comment of a single field.
    fn comment_for(field: &str) -> Option<&'static Comment> {
        Self::field_comments()
            .iter()
            .find(|fc| fc.field == field)
            .map(|fc| &fc.comment)
    }
}
