//! The impls and functions.
//!
use std::{fmt, fs, path::{Path, PathBuf}, str::FromStr};
use log::*;
use anyhow::{bail, Context, Result};
use regex::Regex;
use crate::configmanager::{ConfigManager, FileConfigManager, OptionFile, OptionLine};
use crate::server::Server;

/// Option names treat `-` and `_` as the same character.
fn same_key(left: &str, right: &str) -> bool {
    left.len() == right.len()
        && left.chars().zip(right.chars()).all(|(l, r)| l == r || (l == '-' || l == '_') && (r == '-' || r == '_'))
}

fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[bytes.len() - 1] == bytes[0] {
        value[1..value.len() - 1].to_string()
    } else {
        value.to_string()
    }
}

/// Cut a trailing `# comment` off a value. A quoted value ends at its closing quote.
fn strip_comment(value: &str) -> &str {
    if let Some(quote) = value.chars().next().filter(|first| *first == '"' || *first == '\'') {
        return match value[1..].find(quote) {
            Some(index) => &value[..index + 2],
            None => value,
        };
    }
    match value.find('#') {
        Some(index) => value[..index].trim_end(),
        None => value,
    }
}

fn render_value(value: &str) -> String {
    if value.is_empty() || value.contains(char::is_whitespace) || value.contains('#') {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

impl OptionFile {
    pub fn new() -> Self { Default::default() }
    pub fn parse(
        text: &str,
    ) -> Result<OptionFile>
    {
        let section_regex = Regex::new(r"^\[\s*([^\]]+?)\s*\]$")?;
        let option_regex = Regex::new(r"^([^=\s\[][^=]*?)\s*(?:=\s*(.*))?$")?;

        let mut option_file = OptionFile::new();
        let mut in_section = false;
        for (number, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            let parsed = if line.is_empty() {
                OptionLine::Blank
            } else if line.starts_with('#') || line.starts_with(';') {
                OptionLine::Comment(line.to_string())
            } else if line.starts_with('!') {
                OptionLine::Directive(line.to_string())
            } else if let Some(captures) = section_regex.captures(line) {
                in_section = true;
                OptionLine::Section(captures[1].to_string())
            } else if let Some(captures) = option_regex.captures(line) {
                if !in_section {
                    bail!("line {}: option without preceding section: {}", number + 1, line);
                }
                OptionLine::Option {
                    key: captures[1].to_string(),
                    value: captures.get(2).map(|value| unquote(strip_comment(value.as_str().trim()))),
                }
            } else {
                bail!("line {}: unable to parse: {}", number + 1, line);
            };
            option_file.lines.push(parsed);
        }
        Ok(option_file)
    }
    /// The indexes of all lines setting `key` in `section`.
    fn option_indexes(&self, section: &str, key: &str) -> Vec<usize> {
        let mut current: Option<&str> = None;
        let mut indexes = Vec::new();
        for (index, line) in self.lines.iter().enumerate() {
            match line {
                OptionLine::Section(name) => current = Some(name.as_str()),
                OptionLine::Option { key: option_key, .. } if current == Some(section) && same_key(option_key, key) => indexes.push(index),
                _ => {},
            }
        }
        indexes
    }
    /// Where a new option for `section` goes: after its last option, or after its header.
    fn insertion_point(&self, section: &str) -> Option<usize> {
        let mut current: Option<&str> = None;
        let mut point = None;
        for (index, line) in self.lines.iter().enumerate() {
            match line {
                OptionLine::Section(name) => {
                    current = Some(name.as_str());
                    if name == section {
                        point = Some(index + 1);
                    }
                },
                OptionLine::Option { .. } if current == Some(section) => point = Some(index + 1),
                _ => {},
            }
        }
        point
    }
    /// The section names, in order of first appearance.
    pub fn sections(&self) -> Vec<&str> {
        let mut sections: Vec<&str> = Vec::new();
        for line in &self.lines {
            if let OptionLine::Section(name) = line {
                if !sections.contains(&name.as_str()) {
                    sections.push(name);
                }
            }
        }
        sections
    }
    /// The options of a section in file order; flags have no value.
    pub fn options(&self, section: &str) -> Vec<(&str, Option<&str>)> {
        let mut current: Option<&str> = None;
        let mut options = Vec::new();
        for line in &self.lines {
            match line {
                OptionLine::Section(name) => current = Some(name.as_str()),
                OptionLine::Option { key, value } if current == Some(section) => options.push((key.as_str(), value.as_deref())),
                _ => {},
            }
        }
        options
    }
    pub fn contains(&self, section: &str, key: &str) -> bool {
        !self.option_indexes(section, key).is_empty()
    }
    /// The value of `key` in `section`. The last setting wins, like the server reads it;
    /// a bare flag reads as an empty string.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        let index = *self.option_indexes(section, key).last()?;
        match &self.lines[index] {
            OptionLine::Option { value, .. } => Some(value.as_deref().unwrap_or("")),
            _ => None,
        }
    }
    /// Set `key` in `section`, or add it; `None` sets a bare flag.
    /// The section is appended when it does not exist yet.
    pub fn set(&mut self, section: &str, key: &str, value: Option<&str>) -> &mut Self {
        let new_line = OptionLine::Option { key: key.to_string(), value: value.map(str::to_string) };
        if let Some(&index) = self.option_indexes(section, key).last() {
            self.lines[index] = new_line;
        } else if let Some(index) = self.insertion_point(section) {
            self.lines.insert(index, new_line);
        } else {
            if !matches!(self.lines.last(), None | Some(OptionLine::Blank)) {
                self.lines.push(OptionLine::Blank);
            }
            self.lines.push(OptionLine::Section(section.to_string()));
            self.lines.push(new_line);
        }
        self
    }
    /// Remove every setting of `key` in `section`, returning whether there was one.
    pub fn remove(&mut self, section: &str, key: &str) -> bool {
        let indexes = self.option_indexes(section, key);
        for index in indexes.iter().rev() {
            self.lines.remove(*index);
        }
        !indexes.is_empty()
    }
}

impl FromStr for OptionFile {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> Result<Self> {
        OptionFile::parse(text)
    }
}

impl fmt::Display for OptionFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            match line {
                OptionLine::Blank => writeln!(f)?,
                OptionLine::Comment(text) | OptionLine::Directive(text) => writeln!(f, "{}", text)?,
                OptionLine::Section(name) => writeln!(f, "[{}]", name)?,
                OptionLine::Option { key, value: None } => writeln!(f, "{}", key)?,
                OptionLine::Option { key, value: Some(value) } => writeln!(f, "{} = {}", key, render_value(value))?,
            }
        }
        Ok(())
    }
}

impl FileConfigManager {
    fn resolve_path(server: &Server, path: Option<&Path>) -> PathBuf {
        path.map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&server.defaults_file))
    }
}

impl ConfigManager for FileConfigManager {
    fn fetch_config(&self, server: &Server, path: Option<&Path>) -> Result<OptionFile> {
        let path = FileConfigManager::resolve_path(server, path);
        debug!("{}: fetch config from {}", server.name, path.display());
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Error reading option file: {}", path.display()))?;
        OptionFile::parse(&text)
            .with_context(|| format!("Error parsing option file: {}", path.display()))
    }
    fn replace_config(&self, server: &Server, config: &OptionFile, path: Option<&Path>) -> Result<()> {
        let path = FileConfigManager::resolve_path(server, path);
        info!("{}: replace config {}", server.name, path.display());
        fs::write(&path, config.to_string())
            .with_context(|| format!("Error writing option file: {}", path.display()))
    }
}
