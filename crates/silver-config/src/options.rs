// crates/silver-config/src/options.rs

//! Settings for the XML text encoder.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// The XML declaration written at the top of every document.
pub(crate) const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Controls how documents are rendered as text.
///
/// The defaults match what the readers write: two-space indentation and a
/// leading `<?xml ...?>` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XmlWriterOptions {
    /// Character repeated `indent_size` times per nesting level. Must be
    /// ASCII whitespace.
    pub indent_char: char,
    /// Zero disables indentation and line breaks entirely.
    pub indent_size: usize,
    /// Whether to emit the XML declaration.
    pub declaration: bool,
}

impl Default for XmlWriterOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriterOptions {
    pub const fn new() -> Self {
        Self {
            indent_char: ' ',
            indent_size: 2,
            declaration: true,
        }
    }

    /// Sets the indentation used per nesting level.
    pub const fn with_indent(mut self, indent_char: char, indent_size: usize) -> Self {
        self.indent_char = indent_char;
        self.indent_size = indent_size;
        self
    }

    /// Renders everything on a single line.
    pub const fn without_indent(mut self) -> Self {
        self.indent_size = 0;
        self
    }

    pub const fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }

    pub(crate) const fn is_indented(&self) -> bool {
        self.indent_size > 0
    }

    /// Checks the options before any output is produced.
    ///
    /// # Errors
    /// `InvalidOptions` if indentation is enabled with a character other
    /// than ASCII whitespace.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.is_indented() && !self.indent_char.is_ascii_whitespace() {
            return Err(ConfigError::InvalidOptions(
                "indent character must be ASCII whitespace",
            ));
        }
        Ok(())
    }
}
