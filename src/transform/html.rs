//! Text source rendering and body normalization.
//!
//! A text source is first rendered to XHTML ([`render_source`]), then
//! minified by the caller, then normalized ([`Normalizer::normalize`]):
//!
//! - every `h1`..`h6` is optionally title-cased in place
//! - every `h1` gets a sequential `id` and becomes a [`Heading`]
//! - every `img[src]` is registered as an asset and its `src` rewritten
//!
//! The result is the XHTML serialization of the body content.

use std::borrow::Cow;
use std::path::Path;

use log::trace;

use crate::assets::AssetRegistry;
use crate::dom::{self, parse_html, serialize_children};
use crate::error::{Error, Result};
use crate::markdown;
use crate::project::Heading;
use crate::util::{decode_text, extract_xml_encoding, title_case};

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Source format of a text file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Markdown,
    Html,
}

impl TextFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "md" | "markdown" => Ok(TextFormat::Markdown),
            "html" | "htm" | "xhtml" => Ok(TextFormat::Html),
            _ => Err(Error::UnrecognizedTextExtension(path.to_path_buf())),
        }
    }
}

/// Render a text source to an XHTML body fragment.
///
/// Markdown is rendered to HTML first. Either way the HTML is reparsed and
/// only its `<body>` content is serialized, so raw HTML embedded in markdown
/// comes out well-formed.
pub fn render_source(path: &Path, bytes: &[u8]) -> Result<String> {
    let format = TextFormat::from_path(path)?;
    let text = decode_text(bytes, extract_xml_encoding(bytes));

    let html = match format {
        TextFormat::Markdown => Cow::Owned(markdown::render(&text)),
        TextFormat::Html => text,
    };
    Ok(dom::body_inner_xhtml(&html))
}

/// Mutable state shared by the normalization of every text source.
///
/// Heading numbering continues across calls, so several sources can be
/// concatenated into one page with unique anchors.
pub struct Normalizer<'a> {
    pub assets: &'a mut AssetRegistry,
    pub headings: &'a mut Vec<Heading>,
    pub capitalize_headings: bool,
}

impl Normalizer<'_> {
    /// Normalize a body fragment. Relative `img` sources resolve against `base_dir`.
    pub fn normalize(&mut self, markup: &str, base_dir: &Path) -> Result<String> {
        let mut dom = parse_html(markup);
        let body = dom::body(&dom);

        for id in dom.select(body, HEADING_TAGS) {
            let mut text = dom.text(id);
            if self.capitalize_headings {
                text = title_case(&text);
                dom.set_text(id, &text);
            }
            if dom.is(id, "h1") {
                let heading = Heading::numbered(self.headings.len() + 1, text);
                dom.set_attr(id, "id", &heading.anchor);
                self.headings.push(heading);
            }
        }

        for id in dom.select(body, &["img"]) {
            let Some(src) = dom.attr(id, "src").map(str::to_string) else {
                continue;
            };
            if src.is_empty() || src.starts_with("data:") {
                continue;
            }

            let archive_path = self.assets.register(&base_dir.join(&src))?.path.clone();
            trace!("img {src} -> {archive_path}");
            dom.set_attr(id, "src", &archive_path);
        }

        Ok(serialize_children(&dom, body))
    }
}
