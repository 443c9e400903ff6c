// src/lib.rs

#![doc = "Reads and writes strongly-typed configuration objects as XML."]
#![doc = ""]
#![doc = "Configuration types describe their shape with `serde` derives; `quick-xml`"]
#![doc = "turns them into element-per-field XML and back."]
#![doc = ""]
#![doc = "It provides:"]
#![doc = "- `BasicXmlConfigReader`: file-level `read`/`write` of a typed configuration."]
#![doc = "- `CommentedXmlConfigReader`: the same, annotating the output with the"]
#![doc = "  comments a type declares through `CommentedConfig`."]
#![doc = "- `XmlDictionary`: a map that serializes as `<item><key/><value/></item>` lists."]
#![doc = "- `XmlDocument` and the `comment_*` helpers: a mutable tree with path"]
#![doc = "  queries for placing comments by hand."]

// --- Crate Modules ---

mod comment;
mod dictionary;
mod document;
mod error;
mod options;
mod path;
mod reader;
mod utils;

// --- Public API Re-exports ---

pub use comment::{Comment, CommentedConfig, FieldComment};
pub use dictionary::XmlDictionary;
pub use document::{NodeId, XmlDocument};
pub use error::{ConfigError, Result};
pub use options::XmlWriterOptions;
pub use path::XmlPath;
pub use reader::{BasicXmlConfigReader, CommentedXmlConfigReader, ConfigReader};
pub use utils::{
    comment_before_object, comment_first_in_object, comment_in_object, serialize_to_xml_document,
    serialize_to_xml_string, serialize_to_xml_string_with,
};
