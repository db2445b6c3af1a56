//! XHTML front matter and text pages.

use crate::project::Project;
use crate::util::{escape_xml, ordinal};

/// Wrap `body` in an XHTML document linking `styles.css`.
pub fn xhtml_document(project: &Project, head_extra: &str, body: &str) -> String {
    let mut doc = String::with_capacity(body.len() + 256);
    doc.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    doc.push_str(&format!(
        r#"<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{}">"#,
        escape_xml(&project.metadata.language)
    ));
    doc.push_str("<head>");
    doc.push_str(&format!("<title>{}</title>", escape_xml(&project.metadata.title)));
    doc.push_str(r#"<link rel="stylesheet" type="text/css" href="styles.css"/>"#);
    doc.push_str(head_extra);
    doc.push_str("</head><body>");
    doc.push_str(body);
    doc.push_str("</body></html>");
    doc
}

/// Full-bleed SVG cover sized to the decoded image.
pub fn cover_page(project: &Project, width: u32, height: u32) -> String {
    let style = "<style type=\"text/css\">\
                 @page{padding:0pt !important;margin:0pt !important}\
                 body{text-align:center !important;padding:0pt !important;margin:0pt !important}\
                 </style>";
    let body = format!(
        r#"<div><svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" version="1.1" width="100%" height="100%" viewBox="0 0 {width} {height}" preserveAspectRatio="none"><image width="{width}" height="{height}" xlink:href="cover.png"/></svg></div>"#
    );
    xhtml_document(project, style, &body)
}

pub fn title_page(project: &Project) -> String {
    let meta = &project.metadata;
    let mut body = String::from(r#"<div class="title_area">"#);
    body.push_str(&format!(r#"<h1 class="title">{}</h1>"#, escape_xml(&meta.title)));
    if let Some(author) = &meta.author {
        body.push_str(&format!(r#"<h2 class="author">{}</h2>"#, escape_xml(author)));
    }
    body.push_str("</div>");
    xhtml_document(project, "", &body)
}

pub fn copyright_page(project: &Project, year: i32) -> String {
    let meta = &project.metadata;
    let mut body = String::from(r#"<div class="copyright_page">"#);
    body.push_str(
        r#"<p class="disclaimer">While every precaution has been taken in the preparation of this book, the publisher assumes no responsibility for errors or omissions, or for damages resulting from the use of the information contained herein.</p>"#,
    );

    body.push_str(&format!(r#"<p class="notice">Copyright &#169; {year}"#));
    if let Some(author) = &meta.author {
        body.push(' ');
        body.push_str(&escape_xml(author));
    }
    body.push_str(".</p>");

    body.push_str(r#"<p class="title_and_edition">"#);
    body.push_str(&format!(r#"<em class="title">{}</em>"#, escape_xml(&meta.title)));
    if meta.edition_number > 0 {
        body.push_str(&format!(
            r#", <span class="edition">{} Edition</span>."#,
            ordinal(meta.edition_number)
        ));
    }
    body.push_str("</p></div>");

    xhtml_document(project, "", &body)
}

pub fn contents_page(project: &Project) -> String {
    let mut body = String::from(r#"<div class="contents_page"><h1>Contents</h1><ol>"#);
    body.push_str(r#"<li><a href="title.xhtml">Title</a></li>"#);
    if project.flags.include_copyright_page {
        body.push_str(r#"<li><a href="copyright.xhtml">Copyright</a></li>"#);
    }

    if project.headings.is_empty() {
        body.push_str(r#"<li><a href="text.xhtml">Text</a></li>"#);
    }
    for heading in &project.headings {
        body.push_str(&format!(
            r#"<li><a href="text.xhtml#{}">{}</a></li>"#,
            heading.anchor,
            escape_xml(&heading.text)
        ));
    }

    body.push_str("</ol></div>");
    xhtml_document(project, "", &body)
}

pub fn text_page(project: &Project) -> String {
    let text = String::from_utf8_lossy(&project.text);
    let body = format!(r#"<div class="text_page">{text}</div>"#);
    xhtml_document(project, "", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{Heading, Metadata};

    fn project() -> Project {
        Project::new(Metadata::new("Cats & Dogs").with_author("A. Writer"))
    }

    #[test]
    fn test_document_escapes_title() {
        let doc = xhtml_document(&project(), "", "<p/>");
        assert!(doc.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(doc.contains("<title>Cats &amp; Dogs</title>"));
        assert!(doc.contains(r#"xml:lang="en""#));
        assert!(doc.ends_with("<body><p/></body></html>"));
    }

    #[test]
    fn test_cover_page_uses_dimensions() {
        let doc = cover_page(&project(), 600, 800);
        assert!(doc.contains(r#"viewBox="0 0 600 800""#));
        assert!(doc.contains(r#"<image width="600" height="800" xlink:href="cover.png"/>"#));
    }

    #[test]
    fn test_title_page_author_optional() {
        assert!(title_page(&project()).contains(r#"<h2 class="author">A. Writer</h2>"#));

        let anonymous = Project::new(Metadata::new("Untitled"));
        assert!(!title_page(&anonymous).contains("author"));
    }

    #[test]
    fn test_copyright_edition_label() {
        let mut p = project();
        p.metadata.edition_number = 2;
        let page = copyright_page(&p, 2024);
        assert!(page.contains("Copyright &#169; 2024 A. Writer.</p>"));
        assert!(page.contains(r#"<span class="edition">2nd Edition</span>"#));

        p.metadata.edition_number = 0;
        assert!(!copyright_page(&p, 2024).contains("Edition"));
    }

    #[test]
    fn test_contents_page_entries() {
        let mut p = project();
        assert!(contents_page(&p).contains(r#"<li><a href="text.xhtml">Text</a></li>"#));
        assert!(!contents_page(&p).contains("copyright.xhtml"));

        p.flags.include_copyright_page = true;
        p.headings = vec![Heading::numbered(1, "One"), Heading::numbered(2, "Two < Three")];
        let page = contents_page(&p);
        assert!(page.contains("copyright.xhtml"));
        assert!(page.contains(r#"<a href="text.xhtml#bindery_text_heading_2">Two &lt; Three</a>"#));
        assert!(!page.contains(r#"href="text.xhtml""#));
    }
}
