//! The book being built: metadata, source paths and derived output.

use std::path::PathBuf;

use image::DynamicImage;

use crate::assets::AssetRegistry;
use crate::config::Config;

/// Prefix of the `id` given to each top-level heading in `text.xhtml`.
pub const HEADING_ANCHOR_PREFIX: &str = "bindery_text_heading_";

/// Descriptive metadata written to the OPF and the front matter pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub isbn: String,
    pub title: String,
    pub author: Option<String>,
    pub language: String,
    /// 0 means unspecified.
    pub edition_number: u32,
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            isbn: String::new(),
            title: title.into(),
            author: None,
            language: "en".to_string(),
            edition_number: 0,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// Optional front matter and text treatment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub include_contents_page: bool,
    pub include_copyright_page: bool,
    pub capitalize_headings: bool,
}

/// Resolved input paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sources {
    pub cover_image: Option<PathBuf>,
    pub styles: Option<PathBuf>,
    pub text: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
}

/// A top-level heading found in the text, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub text: String,
    pub anchor: String,
}

impl Heading {
    /// Build the `n`th (1-based) heading.
    pub fn numbered(n: usize, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            anchor: format!("{HEADING_ANCHOR_PREFIX}{n}"),
        }
    }
}

/// Root aggregate threaded through the pipeline stages and handed to the
/// EPUB writer.
#[derive(Debug, Clone)]
pub struct Project {
    pub metadata: Metadata,
    pub flags: Flags,
    pub sources: Sources,

    /// Decoded cover, re-encoded as PNG on output.
    pub cover: Option<DynamicImage>,
    /// Minified stylesheet with rewritten `url()`s.
    pub styles: Vec<u8>,
    /// Normalized body XHTML of every text source, concatenated.
    pub text: Vec<u8>,
    pub headings: Vec<Heading>,
    /// File stem of the produced archive.
    pub output_title: String,
    pub assets: AssetRegistry,
}

impl Project {
    /// An empty project with the given metadata and no sources.
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            flags: Flags::default(),
            sources: Sources::default(),
            cover: None,
            styles: Vec::new(),
            text: Vec::new(),
            headings: Vec::new(),
            output_title: String::new(),
            assets: AssetRegistry::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let author = Some(config.author.trim())
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        let mut project = Project::new(Metadata {
            isbn: config.isbn.trim().to_string(),
            title: config.title.clone(),
            author,
            language: config.language.clone(),
            edition_number: config.edition_number,
        });
        project.flags = Flags {
            include_contents_page: config.include_contents_page,
            include_copyright_page: config.include_copyright_page,
            capitalize_headings: config.capitalize_headings,
        };
        project.sources = Sources {
            cover_image: config.cover_image_path(),
            styles: config.styles_path(),
            text: config.text_paths(),
            files: config.file_paths(),
        };
        project
    }
}
