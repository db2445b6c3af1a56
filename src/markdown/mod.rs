//! Markdown to HTML rendering for `.md` text sources.
//!
//! Rendering uses pulldown-cmark with tables, strikethrough and footnotes
//! enabled.
//! Void elements come out self-closed (`<br />`, `<img ... />`), so the
//! result can go straight through the XML minifier.

use pulldown_cmark::{Options, Parser, html};

/// Render markdown to an HTML body fragment.
///
/// ```
/// use bindery::markdown::render;
///
/// assert_eq!(render("# Hello\nWorld"), "<h1>Hello</h1>\n<p>World</p>\n");
/// ```
pub fn render(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_and_paragraphs() {
        let html = render("# One\n\nSome *text*.\n\n## Two\n");
        assert_eq!(
            html,
            "<h1>One</h1>\n<p>Some <em>text</em>.</p>\n<h2>Two</h2>\n"
        );
    }

    #[test]
    fn test_images_are_self_closed() {
        let html = render("![Logo](img/logo.png)");
        assert_eq!(html, "<p><img src=\"img/logo.png\" alt=\"Logo\" /></p>\n");
    }

    #[test]
    fn test_tables_enabled() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }
}
