//! Content transforms applied while building a book
//!
//! - CSS: `url()` rewriting and minification
//! - HTML: text source rendering, heading anchors, image rewriting
//! - XML: minification

pub mod css;
pub mod html;
pub mod xml;

pub use css::{minify_css, rewrite_css_urls};
pub use html::{Normalizer, TextFormat, render_source};
pub use xml::minify_xml;
