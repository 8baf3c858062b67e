//! The structs
//!
use std::path::Path;
use crate::server::Server;

/// One line of an option file.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionLine {
    Blank,
    /// A comment, including its `#` or `;` marker.
    Comment(String),
    /// A `!include` or `!includedir` directive, kept verbatim.
    Directive(String),
    Section(String),
    /// `key = value`, or a bare flag when value is `None`.
    Option { key: String, value: Option<String> },
}
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionFile {
    pub(crate) lines: Vec<OptionLine>,
}
pub trait ConfigManager: Send + Sync {
    /// Fetch the option file at `path`, or at the server's defaults file.
    fn fetch_config(&self, server: &Server, path: Option<&Path>) -> anyhow::Result<OptionFile>;
    /// Replace the option file at `path`, or at the server's defaults file.
    fn replace_config(&self, server: &Server, config: &OptionFile, path: Option<&Path>) -> anyhow::Result<()>;
}
/// Keeps the option file on the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileConfigManager;
