//! EPUB 2 assembly.
//!
//! The archive layout is flat:
//!
//! ```text
//! mimetype                  stored, always first
//! META-INF/container.xml
//! styles.css
//! cover.png, cover.xhtml    only with a cover
//! title.xhtml
//! copyright.xhtml           optional
//! contents.xhtml            optional
//! text.xhtml
//! files/<sha1><ext>         one per registered asset
//! content.opf
//! toc.ncx
//! ```

mod package;
mod pages;
mod writer;

pub use package::{CONTAINER_XML, NavPoint, content_opf, identifier, nav_points, toc_ncx};
pub use writer::{EpubConfig, EpubWriter};
