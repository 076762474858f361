//! File-backed source for JSON and TOML documents

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::OnceCell;
use strata_core::types::value;
use strata_core::utils::get_extension;
use strata_core::{KeyPath, StrataError, StrataResult, Value};

use super::Source;

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// JSON document
    Json,
    /// TOML document
    Toml,
}

impl FileFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Utf8Path) -> StrataResult<Self> {
        match get_extension(path.as_std_path()).as_deref() {
            Some("json") => Ok(FileFormat::Json),
            Some("toml") => Ok(FileFormat::Toml),
            other => Err(StrataError::UnsupportedFormat {
                path: path.to_string(),
                extension: other.unwrap_or_default().to_string(),
            }),
        }
    }

    /// Parse document text into a value tree
    pub fn parse(self, content: &str) -> StrataResult<Value> {
        match self {
            FileFormat::Json => parse_json(content),
            FileFormat::Toml => parse_toml(content),
        }
    }
}

/// Read-only source over a JSON or TOML file.
///
/// The file is read on first lookup. A failed read is reported to that
/// caller and attempted again on the next lookup.
#[derive(Debug)]
pub struct FileSource {
    name: String,
    path: Utf8PathBuf,
    format: FileFormat,
    data: OnceCell<Value>,
}

impl FileSource {
    /// Create a source for `path`, named after the path
    pub fn new(path: impl Into<Utf8PathBuf>) -> StrataResult<Self> {
        let path = path.into();
        Self::with_name(path.to_string(), path)
    }

    /// Create a source for `path` with a custom name
    pub fn with_name(name: impl Into<String>, path: impl Into<Utf8PathBuf>) -> StrataResult<Self> {
        let path = path.into();
        let format = FileFormat::from_path(&path)?;

        Ok(Self {
            name: name.into(),
            path,
            format,
            data: OnceCell::new(),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Detected document format
    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Check if the file has been loaded
    pub fn is_loaded(&self) -> bool {
        self.data.get().is_some()
    }

    fn data(&self) -> StrataResult<&Value> {
        self.data.get_or_try_init(|| load_file(&self.path, self.format))
    }
}

impl Source for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, path: &KeyPath) -> StrataResult<Option<Value>> {
        let data = self.data()?;
        Ok(value::lookup(data, path.segments()).cloned())
    }
}

/// Read and parse a document from disk
pub fn load_file(path: &Utf8Path, format: FileFormat) -> StrataResult<Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| StrataError::io(format!("Failed to read {}", path), e))?;

    format.parse(&content).map_err(|e| match e {
        StrataError::JsonParse { message } => StrataError::JsonParse {
            message: format!("In file {}: {}", path, message),
        },
        StrataError::TomlParse { message, line, column } => StrataError::TomlParse {
            message: format!("In file {}: {}", path, message),
            line,
            column,
        },
        other => other,
    })
}

fn parse_json(content: &str) -> StrataResult<Value> {
    serde_json::from_str(content).map_err(|e| StrataError::JsonParse {
        message: format!("{} (line {}, column {})", e, e.line(), e.column()),
    })
}

fn parse_toml(content: &str) -> StrataResult<Value> {
    toml::from_str::<Value>(content).map_err(|e| {
        let (line, column) = e
            .span()
            .map(|span| line_column(content, span.start))
            .unwrap_or((0, 0));

        StrataError::TomlParse {
            message: e.message().to_string(),
            line,
            column,
        }
    })
}

/// 1-based line and column of a byte offset
pub(crate) fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset.min(content.len())];
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map(|newline| before.len() - newline)
        .unwrap_or(before.len() + 1);

    (line, column)
}
