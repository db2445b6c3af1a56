//! OCF container, OPF package document and NCX navigation.

use crate::project::Project;
use crate::util::escape_xml;

/// `META-INF/container.xml`; the package document sits at the archive root.
pub const CONTAINER_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="utf-8"?>"#,
    r#"<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">"#,
    r#"<rootfiles><rootfile full-path="content.opf" media-type="application/oebps-package+xml"/></rootfiles>"#,
    "</container>"
);

/// One entry of the NCX navigation map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavPoint {
    pub id: String,
    pub label: String,
    pub src: String,
}

impl NavPoint {
    fn new(id: impl Into<String>, label: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            src: src.into(),
        }
    }
}

/// Navigation points in reading order: cover, title, copyright, contents,
/// then one per heading (or a single text entry).
pub fn nav_points(project: &Project) -> Vec<NavPoint> {
    let mut points = Vec::new();

    if project.cover.is_some() {
        points.push(NavPoint::new("cover_page", "Cover", "cover.xhtml"));
    }
    points.push(NavPoint::new("title_page", "Title", "title.xhtml"));
    if project.flags.include_copyright_page {
        points.push(NavPoint::new("copyright_page", "Copyright", "copyright.xhtml"));
    }
    if project.flags.include_contents_page {
        points.push(NavPoint::new("contents_page", "Contents", "contents.xhtml"));
    }

    if project.headings.is_empty() {
        points.push(NavPoint::new("text_page", "Text", "text.xhtml"));
    }
    for heading in &project.headings {
        points.push(NavPoint::new(
            format!("text_page_{}", heading.anchor),
            heading.text.clone(),
            format!("text.xhtml#{}", heading.anchor),
        ));
    }

    points
}

/// Package identifier: the ISBN, or a stable URN derived from the title.
pub fn identifier(project: &Project) -> String {
    let isbn = project.metadata.isbn.trim();
    if isbn.is_empty() {
        let digest = sha1_smol::Sha1::from(project.metadata.title.as_bytes()).digest();
        format!("urn:bindery:{digest}")
    } else {
        isbn.to_string()
    }
}

struct ManifestItem {
    id: String,
    href: String,
    media_type: String,
}

impl ManifestItem {
    fn new(id: impl Into<String>, href: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
        }
    }
}

fn manifest(project: &Project) -> Vec<ManifestItem> {
    const XHTML: &str = "application/xhtml+xml";

    let mut items = vec![ManifestItem::new("styles", "styles.css", "text/css")];
    if project.cover.is_some() {
        items.push(ManifestItem::new("cover_image", "cover.png", "image/png"));
        items.push(ManifestItem::new("cover_page", "cover.xhtml", XHTML));
    }
    items.push(ManifestItem::new("title_page", "title.xhtml", XHTML));
    if project.flags.include_copyright_page {
        items.push(ManifestItem::new("copyright_page", "copyright.xhtml", XHTML));
    }
    if project.flags.include_contents_page {
        items.push(ManifestItem::new("contents_page", "contents.xhtml", XHTML));
    }
    items.push(ManifestItem::new("text_page", "text.xhtml", XHTML));

    for asset in &project.assets {
        items.push(ManifestItem::new(
            asset.manifest_id(),
            asset.path.clone(),
            asset.media_type,
        ));
    }

    items.push(ManifestItem::new("ncx", "toc.ncx", "application/x-dtbncx+xml"));
    items
}

fn spine(project: &Project) -> Vec<&'static str> {
    let mut refs = Vec::new();
    if project.cover.is_some() {
        refs.push("cover_page");
    }
    refs.push("title_page");
    if project.flags.include_copyright_page {
        refs.push("copyright_page");
    }
    if project.flags.include_contents_page {
        refs.push("contents_page");
    }
    refs.push("text_page");
    refs
}

/// Generate `content.opf` (OPF 2.0).
pub fn content_opf(project: &Project) -> String {
    let meta = &project.metadata;
    let mut opf = String::new();

    opf.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    opf.push_str(
        r#"<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="unique-id">"#,
    );
    opf.push_str(
        r#"<metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">"#,
    );
    opf.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(&meta.title)));
    if let Some(author) = &meta.author {
        opf.push_str(&format!(
            r#"<dc:creator opf:role="aut">{}</dc:creator>"#,
            escape_xml(author)
        ));
    }
    opf.push_str(&format!("<dc:language>{}</dc:language>", escape_xml(&meta.language)));
    opf.push_str(&format!(
        r#"<dc:identifier id="unique-id">{}</dc:identifier>"#,
        escape_xml(&identifier(project))
    ));
    if project.cover.is_some() {
        opf.push_str(r#"<meta name="cover" content="cover_image"/>"#);
    }
    opf.push_str("</metadata>");

    opf.push_str("<manifest>");
    for item in manifest(project) {
        opf.push_str(&format!(
            r#"<item id="{}" href="{}" media-type="{}"/>"#,
            escape_xml(&item.id),
            escape_xml(&item.href),
            escape_xml(&item.media_type)
        ));
    }
    opf.push_str("</manifest>");

    opf.push_str(r#"<spine toc="ncx">"#);
    for idref in spine(project) {
        opf.push_str(&format!(r#"<itemref idref="{idref}"/>"#));
    }
    opf.push_str("</spine>");

    if project.cover.is_some() {
        opf.push_str(r#"<guide><reference type="cover" title="Cover" href="cover.xhtml"/></guide>"#);
    }

    opf.push_str("</package>");
    opf
}

/// Generate `toc.ncx`; `playOrder` runs 1..=N over `points`.
pub fn toc_ncx(project: &Project, points: &[NavPoint]) -> String {
    let meta = &project.metadata;
    let mut ncx = String::new();

    ncx.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    ncx.push_str(&format!(
        r#"<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1" xml:lang="{}">"#,
        escape_xml(&meta.language)
    ));
    ncx.push_str("<head>");
    ncx.push_str(&format!(
        r#"<meta name="dtb:uid" content="{}"/>"#,
        escape_xml(&identifier(project))
    ));
    ncx.push_str(r#"<meta name="dtb:depth" content="1"/>"#);
    ncx.push_str(r#"<meta name="dtb:totalPageCount" content="0"/>"#);
    ncx.push_str(r#"<meta name="dtb:maxPageNumber" content="0"/>"#);
    ncx.push_str("</head>");
    ncx.push_str(&format!(
        "<docTitle><text>{}</text></docTitle>",
        escape_xml(&meta.title)
    ));

    ncx.push_str("<navMap>");
    for (i, point) in points.iter().enumerate() {
        ncx.push_str(&format!(
            r#"<navPoint id="{}" playOrder="{}"><navLabel><text>{}</text></navLabel><content src="{}"/></navPoint>"#,
            escape_xml(&point.id),
            i + 1,
            escape_xml(&point.label),
            escape_xml(&point.src)
        ));
    }
    ncx.push_str("</navMap></ncx>");
    ncx
}
