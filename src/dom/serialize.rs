//! XHTML serialization of arena subtrees.
//!
//! Output is well-formed XML: void elements self-close, text and attribute
//! values are escaped, comments and doctypes are dropped. An element whose
//! namespace differs from its parent's (inline SVG or MathML, HTML inside
//! `foreignObject`) declares it, and `xlink:` attributes get an
//! `xmlns:xlink` declaration where no ancestor provides one.

use html5ever::{Namespace, QualName, ns};

use super::arena::{Attribute, Dom, NodeData, NodeId};

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Namespace declarations in effect at a node.
#[derive(Clone, Copy)]
struct Scope<'a> {
    ns: &'a Namespace,
    xlink: bool,
}

/// Serialize the children of `id` (not `id` itself).
///
/// The surrounding document is assumed to declare the XHTML namespace.
pub fn serialize_children(dom: &Dom, id: NodeId) -> String {
    let html = ns!(html);
    let scope = Scope {
        ns: &html,
        xlink: false,
    };

    let mut out = String::new();
    for child in dom.children(id) {
        write_node(dom, child, scope, &mut out);
    }
    out
}

fn has_prefix(attr: &Attribute, prefix: &str) -> bool {
    attr.name.prefix.as_ref().is_some_and(|p| &**p == prefix)
}

/// `xmlns="..."` for `None`, `xmlns:<prefix>="..."` otherwise.
fn is_declaration(attr: &Attribute, prefix: Option<&str>) -> bool {
    match prefix {
        Some(p) => has_prefix(attr, "xmlns") && &*attr.name.local == p,
        None => attr.name.prefix.is_none() && &*attr.name.local == "xmlns",
    }
}

/// Write the namespace declarations `name` needs and return the inner scope.
fn declare_namespaces<'a>(
    name: &'a QualName,
    attrs: &[Attribute],
    scope: Scope<'a>,
    out: &mut String,
) -> Scope<'a> {
    if name.ns != *scope.ns && !name.ns.is_empty() {
        out.push_str(" xmlns=\"");
        out.push_str(name.ns.as_ref());
        out.push('"');
    }

    let declares_xlink = attrs.iter().any(|a| is_declaration(a, Some("xlink")));
    let uses_xlink = attrs.iter().any(|a| has_prefix(a, "xlink"));
    if uses_xlink && !declares_xlink && !scope.xlink {
        out.push_str(" xmlns:xlink=\"");
        out.push_str(XLINK_NS);
        out.push('"');
    }

    Scope {
        ns: &name.ns,
        xlink: scope.xlink || declares_xlink || uses_xlink,
    }
}

fn write_node(dom: &Dom, id: NodeId, scope: Scope<'_>, out: &mut String) {
    let Some(node) = dom.get(id) else {
        return;
    };

    match &node.data {
        NodeData::Text(text) => escape_text(text, out),
        NodeData::Element { name, attrs } => {
            let tag = name.local.as_ref();
            out.push('<');
            out.push_str(tag);
            let inner = declare_namespaces(name, attrs, scope, out);
            for attr in attrs {
                // Default namespace declarations are written from the element name.
                if is_declaration(attr, None) {
                    continue;
                }
                out.push(' ');
                if let Some(prefix) = &attr.name.prefix {
                    out.push_str(prefix.as_ref());
                    out.push(':');
                }
                out.push_str(attr.name.local.as_ref());
                out.push_str("=\"");
                escape_attr(&attr.value, out);
                out.push('"');
            }

            if VOID_ELEMENTS.contains(&tag) {
                out.push_str("/>");
                return;
            }

            out.push('>');
            for child in dom.children(id) {
                write_node(dom, child, inner, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeData::Document => {
            for child in dom.children(id) {
                write_node(dom, child, scope, out);
            }
        }
        NodeData::Comment(_) | NodeData::Doctype => {}
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&#160;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::{body, body_inner_xhtml, parse_html};

    use super::*;

    #[test]
    fn test_void_elements_self_close() {
        let dom = parse_html("<p>a<br>b</p><img src=\"x.png\" alt=\"\">");
        assert_eq!(
            serialize_children(&dom, body(&dom)),
            r#"<p>a<br/>b</p><img src="x.png" alt=""/>"#
        );
    }

    #[test]
    fn test_text_and_attributes_are_escaped() {
        let html = r#"<p title="a &quot;b&quot; &amp; c">1 &lt; 2 &amp;&amp; 3 &gt; 2</p>"#;
        assert_eq!(body_inner_xhtml(html), html);
    }

    #[test]
    fn test_comments_are_dropped() {
        assert_eq!(body_inner_xhtml("<div><!-- note -->kept</div>"), "<div>kept</div>");
    }

    #[test]
    fn test_inline_svg_gets_namespaces() {
        assert_eq!(
            body_inner_xhtml(r#"<svg viewBox="0 0 2 2"><image xlink:href="a.png"/></svg>"#),
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 2 2"><image xmlns:xlink="http://www.w3.org/1999/xlink" xlink:href="a.png"></image></svg>"#
        );
    }

    #[test]
    fn test_declared_svg_namespaces_not_repeated() {
        let html = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><g><image xlink:href="a.png"/></g></svg>"#;
        assert_eq!(
            body_inner_xhtml(html),
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><g><image xlink:href="a.png"></image></g></svg>"#
        );
    }

    #[test]
    fn test_mathml_and_html_inside_svg() {
        assert_eq!(
            body_inner_xhtml("<p><math><mi>x</mi></math></p>"),
            r#"<p><math xmlns="http://www.w3.org/1998/Math/MathML"><mi>x</mi></math></p>"#
        );
        assert_eq!(
            body_inner_xhtml("<svg><foreignObject><p>t</p></foreignObject></svg>"),
            r#"<svg xmlns="http://www.w3.org/2000/svg"><foreignObject><p xmlns="http://www.w3.org/1999/xhtml">t</p></foreignObject></svg>"#
        );
    }
}
