//! # bindery
//!
//! Package a markdown or HTML manuscript into an EPUB 2 ebook.
//!
//! ## Features
//!
//! - Markdown (`.md`) and HTML (`.html`, `.xhtml`) text sources, one or many
//! - Optional cover, title, copyright and contents pages
//! - Table of contents built from `h1` headings
//! - Images and stylesheet `url()` targets embedded once, content-addressed
//! - Minified XHTML and CSS
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! let epub = bindery::build(Path::new("epub_info.json"), Path::new("."))?;
//! # Ok::<(), bindery::Error>(())
//! ```
//!
//! ## Step by step
//!
//! ```no_run
//! use std::path::Path;
//! use bindery::{Config, EpubConfig, EpubWriter, Pipeline, Project, minify::Minifier};
//!
//! let config = Config::load("epub_info.json")?;
//! let project = Pipeline::new(&Minifier).run(Project::from_config(&config))?;
//! println!("{} headings, {} assets", project.headings.len(), project.assets.len());
//!
//! let writer = EpubWriter::new().with_config(EpubConfig {
//!     copyright_year: Some(2024),
//!     ..Default::default()
//! });
//! writer.write(&project, Path::new("out"))?;
//! # Ok::<(), bindery::Error>(())
//! ```

pub mod assets;
pub mod config;
pub mod dom;
pub mod epub;
pub mod error;
pub mod markdown;
pub mod minify;
pub mod pipeline;
pub mod project;
pub mod transform;
pub mod util;

pub use assets::{AssetDatum, AssetRegistry};
pub use config::Config;
pub use epub::{EpubConfig, EpubWriter};
pub use error::{Error, Result};
pub use minify::{Minifier, Minify};
pub use pipeline::{Pipeline, build, build_with};
pub use project::{Heading, Metadata, Project};
