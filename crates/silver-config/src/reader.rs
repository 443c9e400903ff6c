// crates/silver-config/src/reader.rs

//! File-level reading and writing of typed configuration objects.

use core::fmt;
use core::marker::PhantomData;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::comment::CommentedConfig;
use crate::document::XmlDocument;
use crate::error::{ConfigError, Result};
use crate::options::XmlWriterOptions;
use crate::utils::{
    comment_before_object, comment_first_in_object, serialize_to_xml_document,
    serialize_to_xml_string_with,
};

/// Reads and writes configuration files of type `T`.
pub trait ConfigReader<T> {
    /// Reads the file at `path` into a `T`.
    ///
    /// Returns `Ok(None)` if the file holds no root element.
    fn read(&self, path: &Path) -> Result<Option<T>>;

    /// Writes `config` to `path`, creating or truncating the file.
    fn write(&self, config: &T, path: &Path) -> Result<()>;

    /// Whether this reader writes comment annotations along with the data.
    fn supports_comments(&self) -> bool;
}

/// Plain XML reader/writer for `T`, without comments.
///
/// ```no_run
/// use std::path::Path;
/// use serde::{Deserialize, Serialize};
/// use silver_config::{BasicXmlConfigReader, ConfigReader};
///
/// #[derive(Serialize, Deserialize)]
/// struct Settings {
///     port: u16,
/// }
///
/// let reader = BasicXmlConfigReader::<Settings>::new();
/// reader.write(&Settings { port: 8080 }, Path::new("settings.xml"))?;
/// let settings = reader.read(Path::new("settings.xml"))?;
/// assert_eq!(settings.map(|s| s.port), Some(8080));
/// # Ok::<(), silver_config::ConfigError>(())
/// ```
pub struct BasicXmlConfigReader<T> {
    options: XmlWriterOptions,
    _codec: PhantomData<fn() -> T>,
}

impl<T> BasicXmlConfigReader<T> {
    pub const fn new() -> Self {
        Self::with_options(XmlWriterOptions::new())
    }

    pub const fn with_options(options: XmlWriterOptions) -> Self {
        Self {
            options,
            _codec: PhantomData,
        }
    }

    pub const fn options(&self) -> &XmlWriterOptions {
        &self.options
    }
}

impl<T: Serialize + DeserializeOwned> BasicXmlConfigReader<T> {
    /// Decodes a document held in memory.
    pub fn from_xml_str(&self, xml: &str) -> Result<Option<T>> {
        if !has_root_element(xml)? {
            debug!("Document has no root element, nothing to decode");
            return Ok(None);
        }
        Ok(Some(quick_xml::de::from_str(xml)?))
    }

    /// Encodes `config` as it would be written to a file.
    pub fn to_xml_string(&self, config: &T) -> Result<String> {
        serialize_to_xml_string_with(config, &self.options)
    }
}

impl<T> Default for BasicXmlConfigReader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for BasicXmlConfigReader<T> {
    fn clone(&self) -> Self {
        Self::with_options(self.options)
    }
}

impl<T> fmt::Debug for BasicXmlConfigReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicXmlConfigReader")
            .field("type", &core::any::type_name::<T>())
            .field("options", &self.options)
            .finish()
    }
}

impl<T: Serialize + DeserializeOwned> ConfigReader<T> for BasicXmlConfigReader<T> {
    fn read(&self, path: &Path) -> Result<Option<T>> {
        debug!("Reading configuration from {}", path.display());
        let mut content = String::new();
        BufReader::new(File::open(path)?).read_to_string(&mut content)?;
        self.from_xml_str(&content)
    }

    fn write(&self, config: &T, path: &Path) -> Result<()> {
        // Encode first so a serialization error never truncates the file.
        let xml = self.to_xml_string(config)?;
        write_file(path, &xml)
    }

    fn supports_comments(&self) -> bool {
        false
    }
}

/// XML reader/writer that annotates the output with the comments declared by
/// `T`'s [`CommentedConfig`] table.
///
/// Each comment is looked up at `/{root}/{field}`. Comments with
/// `inside_of_object` become the first child of the field's element, the
/// others are placed right before it. Fields missing from the output (for
/// example a skipped `None`) are left without a comment. Comments are
/// ignored when reading.
pub struct CommentedXmlConfigReader<T> {
    inner: BasicXmlConfigReader<T>,
}

impl<T> CommentedXmlConfigReader<T> {
    pub const fn new() -> Self {
        Self {
            inner: BasicXmlConfigReader::new(),
        }
    }

    pub const fn with_options(options: XmlWriterOptions) -> Self {
        Self {
            inner: BasicXmlConfigReader::with_options(options),
        }
    }
}

impl<T> Default for CommentedXmlConfigReader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CommentedXmlConfigReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommentedXmlConfigReader")
            .field("type", &core::any::type_name::<T>())
            .field("options", self.inner.options())
            .finish()
    }
}

impl<T: Serialize + DeserializeOwned + CommentedConfig> CommentedXmlConfigReader<T> {
    /// Builds the annotated document for `config`.
    pub fn to_document(&self, config: &T) -> Result<XmlDocument> {
        let mut doc = serialize_to_xml_document(config)?;
        let Some(root_name) = doc
            .document_element()
            .and_then(|root| doc.name(root))
            .map(str::to_string)
        else {
            return Ok(doc);
        };

        for field_comment in T::field_comments() {
            let path = format!("/{}/{}", root_name, field_comment.field);
            let comment = &field_comment.comment;
            if comment.inside_of_object {
                match comment_first_in_object(&mut doc, &path, comment.description) {
                    Ok(_) => {}
                    Err(ConfigError::ElementNotFound { .. }) => {
                        debug!("Field `{}` not in output, skipping its comment", field_comment.field);
                    }
                    Err(e) => return Err(e),
                }
            } else {
                comment_before_object(&mut doc, &path, comment.description)?;
            }
        }
        Ok(doc)
    }

    /// Encodes `config` with its comments as it would be written to a file.
    pub fn to_xml_string(&self, config: &T) -> Result<String> {
        self.to_document(config)?.to_string_with(self.inner.options())
    }
}

impl<T: Serialize + DeserializeOwned + CommentedConfig> ConfigReader<T>
    for CommentedXmlConfigReader<T>
{
    fn read(&self, path: &Path) -> Result<Option<T>> {
        self.inner.read(path)
    }

    fn write(&self, config: &T, path: &Path) -> Result<()> {
        let xml = self.to_xml_string(config)?;
        write_file(path, &xml)
    }

    fn supports_comments(&self) -> bool {
        true
    }
}

// --- Helper Functions ---

fn write_file(path: &Path, xml: &str) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(xml.as_bytes())?;
    writer.flush()?;
    debug!("Wrote {} bytes of configuration to {}", xml.len(), path.display());
    Ok(())
}

/// Whether `xml` contains an element at all (declaration, comments and
/// whitespace alone do not count).
fn has_root_element(xml: &str) -> Result<bool> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(_) | Event::Empty(_) => return Ok(true),
            Event::Eof => return Ok(false),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::{Comment, FieldComment};
    use crate::dictionary::XmlDictionary;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Limits {
        max: u32,
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct AppConfig {
        name: String,
        limits: Limits,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        motd: Option<String>,
        #[serde(default)]
        weights: XmlDictionary<String, i32>,
    }

    impl CommentedConfig for AppConfig {
        fn field_comments() -> &'static [FieldComment] {
            const COMMENTS: &[FieldComment] = &[
                FieldComment::new("name", Comment::new(" display name ")),
                FieldComment::new("limits", Comment::inside(" resource limits ")),
                FieldComment::new("motd", Comment::inside(" message of the day ")),
            ];
            COMMENTS
        }
    }

    fn sample() -> AppConfig {
        AppConfig {
            name: "demo".into(),
            limits: Limits { max: 10 },
            motd: None,
            weights: XmlDictionary::from([("a".to_string(), 1)]),
        }
    }

    #[test]
    fn test_supports_comments() {
        assert!(!BasicXmlConfigReader::<AppConfig>::new().supports_comments());
        assert!(CommentedXmlConfigReader::<AppConfig>::new().supports_comments());
    }

    #[test]
    fn test_from_xml_str_round_trip() {
        let reader = BasicXmlConfigReader::<AppConfig>::new();
        let xml = reader.to_xml_string(&sample()).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert_eq!(reader.from_xml_str(&xml).unwrap(), Some(sample()));
    }

    #[test]
    fn test_document_without_root_is_none() {
        let reader = BasicXmlConfigReader::<AppConfig>::new();
        let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- nothing here -->\n";
        assert_eq!(reader.from_xml_str(xml).unwrap(), None);
        assert_eq!(reader.from_xml_str("").unwrap(), None);
    }

    #[test]
    fn test_commented_document_layout() {
        let reader = CommentedXmlConfigReader::<AppConfig>::with_options(
            XmlWriterOptions::default()
                .without_indent()
                .with_declaration(false),
        );
        let xml = reader.to_xml_string(&sample()).unwrap();
        assert_eq!(
            xml,
            "<AppConfig><!-- display name --><name>demo</name>\
             <limits><!-- resource limits --><max>10</max></limits>\
             <weights><item><key>a</key><value>1</value></item></weights></AppConfig>"
        );
    }

    #[test]
    fn test_commented_output_reads_back() {
        let reader = CommentedXmlConfigReader::<AppConfig>::new();
        let xml = reader.to_xml_string(&sample()).unwrap();
        assert_eq!(reader.inner.from_xml_str(&xml).unwrap(), Some(sample()));
    }

    #[test]
    fn test_debug_names_type() {
        let reader = BasicXmlConfigReader::<AppConfig>::default();
        assert!(format!("{:?}", reader).contains("AppConfig"));
    }
}
