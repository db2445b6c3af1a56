//! Book manifest (`epub_info.json`) loading.
//!
//! ```
//! use bindery::config::Config;
//!
//! let config = Config::from_json(
//!     r#"{ "title": "My Book", "paths": { "text": ["one.md", "two.md"] } }"#,
//!     "/books/mine",
//! ).unwrap();
//!
//! assert_eq!(config.language, "en");
//! assert_eq!(config.text_paths()[1], std::path::Path::new("/books/mine/two.md"));
//! assert!(config.cover_image_path().is_none());
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default manifest file name looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = "epub_info.json";

/// Parsed book manifest. Paths are kept as written; use the `*_path(s)`
/// accessors to get them resolved against [`Config::base_dir`].
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub isbn: String,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_language")]
    pub language: String,
    /// Edition shown on the copyright page; 0 means unspecified.
    #[serde(default)]
    pub edition_number: u32,
    #[serde(default)]
    pub include_contents_page: bool,
    #[serde(default)]
    pub include_copyright_page: bool,
    #[serde(default, rename = "should_capitalize_headings")]
    pub capitalize_headings: bool,
    /// Extra files embedded in the archive even when nothing references them.
    #[serde(default)]
    pub files: Vec<String>,
    pub paths: Paths,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub styles: String,
    pub text: TextSources,
}

/// One text source or an ordered list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextSources {
    One(String),
    Many(Vec<String>),
}

impl TextSources {
    pub fn as_slice(&self) -> &[String] {
        match self {
            TextSources::One(path) => std::slice::from_ref(path),
            TextSources::Many(paths) => paths,
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

impl Config {
    /// Load a manifest from disk. Relative paths resolve against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let mut config: Config = serde_json::from_str(&json).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        config.normalize();

        Ok(config)
    }

    /// Parse a manifest from a JSON string with an explicit base directory.
    pub fn from_json(json: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let mut config: Config = serde_json::from_str(json).map_err(|source| Error::Config {
            path: base_dir.join(DEFAULT_CONFIG_FILE),
            source,
        })?;
        config.base_dir = base_dir;
        config.normalize();
        Ok(config)
    }

    fn normalize(&mut self) {
        if self.language.trim().is_empty() {
            self.language = default_language();
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn resolve_optional(&self, path: &str) -> Option<PathBuf> {
        (!path.trim().is_empty()).then(|| self.resolve(path))
    }

    pub fn cover_image_path(&self) -> Option<PathBuf> {
        self.resolve_optional(&self.paths.cover_image)
    }

    pub fn styles_path(&self) -> Option<PathBuf> {
        self.resolve_optional(&self.paths.styles)
    }

    pub fn text_paths(&self) -> Vec<PathBuf> {
        self.paths
            .text
            .as_slice()
            .iter()
            .map(|p| self.resolve(p))
            .collect()
    }

    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|p| self.resolve(p)).collect()
    }
}
