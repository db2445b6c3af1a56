//! HTML tree parsing, querying and XHTML serialization.
//!
//! ```
//! use bindery::dom::{body, parse_html, serialize_children};
//!
//! let mut dom = parse_html("<h1>Hi</h1><p>there</p>");
//! let h1 = dom.first("h1").unwrap();
//! dom.set_attr(h1, "id", "top");
//!
//! assert_eq!(serialize_children(&dom, body(&dom)), r#"<h1 id="top">Hi</h1><p>there</p>"#);
//! ```

mod arena;
mod serialize;
mod tree_sink;

pub use arena::{Attribute, Children, Dom, Node, NodeData, NodeId};
pub use serialize::serialize_children;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::DomSink;

/// Parse HTML (a full document or a body fragment) into a [`Dom`].
///
/// Fragments get the implied `html`/`head`/`body` elements, so content is
/// always reachable through [`body`].
pub fn parse_html(html: &str) -> Dom {
    parse_document(DomSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}

/// The `body` element, or the document node if there is none.
pub fn body(dom: &Dom) -> NodeId {
    dom.first("body").unwrap_or_else(|| dom.root())
}

/// XHTML serialization of a document's `<body>` content.
pub fn body_inner_xhtml(html: &str) -> String {
    let dom = parse_html(html);
    serialize_children(&dom, body(&dom))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let dom = parse_html("<html><body><p>Hello</p></body></html>");

        let p = dom.first("p").expect("should find p");
        assert_eq!(dom.tag(p).unwrap().as_ref(), "p");
        let text = dom.children(p).next().expect("p should have child");
        assert_eq!(dom.as_text(text), Some("Hello"));
    }

    #[test]
    fn test_body_inner_xhtml_drops_head() {
        let html = "<!DOCTYPE html><html><head><title>T</title></head>\
                    <body><h1>One</h1><p>Two</p></body></html>";
        assert_eq!(body_inner_xhtml(html), "<h1>One</h1><p>Two</p>");
    }

    #[test]
    fn test_fragment_gets_implied_body() {
        let dom = parse_html("<p>loose</p>");
        let body = body(&dom);
        assert!(dom.is(body, "body"));
        assert_eq!(serialize_children(&dom, body), "<p>loose</p>");
    }

    #[test]
    fn test_misnested_formatting_is_repaired() {
        assert_eq!(
            body_inner_xhtml("<p><b>bold<i>both</b>italic</i></p>"),
            "<p><b>bold<i>both</i></b><i>italic</i></p>"
        );
    }
}
