//! Minification seam used by the pipeline.

use crate::error::Result;
use crate::transform::{minify_css, minify_xml};

/// Shrinks a document of a given media type.
///
/// Implementations must return the input unchanged for media types they do
/// not handle.
pub trait Minify {
    fn minify(&self, media_type: &str, input: &[u8]) -> Result<Vec<u8>>;
}

/// Default minifier for `text/xml` and `text/css`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Minifier;

impl Minify for Minifier {
    fn minify(&self, media_type: &str, input: &[u8]) -> Result<Vec<u8>> {
        match media_type {
            "text/xml" | "application/xml" | "application/xhtml+xml" => minify_xml(input),
            "text/css" => Ok(minify_css(&String::from_utf8_lossy(input)).into_bytes()),
            _ => Ok(input.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_media_type() {
        let m = Minifier;
        assert_eq!(m.minify("text/xml", b"<p>a</p>\n<p>b</p>").unwrap(), b"<p>a</p><p>b</p>");
        assert_eq!(m.minify("text/css", b"a {\n  color: red;\n}").unwrap(), b"a{color:red}");
    }

    #[test]
    fn test_unknown_media_type_passes_through() {
        let input = b"  keep   me  ";
        assert_eq!(Minifier.minify("text/plain", input).unwrap(), input);
    }
}
