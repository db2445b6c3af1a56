//! XML minification over the quick-xml event stream.
//!
//! Comments are dropped and runs of whitespace in text are collapsed to a
//! single space. Whitespace-only text after a block-level tag is layout and
//! is removed; after an inline tag it becomes one space. Text inside `<pre>`
//! is untouched.
//!
//! The reader is lenient about end tags so that HTML-flavoured markup (for
//! example an unclosed `<br>`) passes through. Bare `&` is still an error.

use quick_xml::events::{BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::Result;

const BLOCK_TAGS: &[&[u8]] = &[
    b"address", b"article", b"aside", b"blockquote", b"body", b"dd", b"div", b"dl", b"dt",
    b"figcaption", b"figure", b"footer", b"h1", b"h2", b"h3", b"h4", b"h5", b"h6", b"header",
    b"hr", b"html", b"li", b"nav", b"ol", b"p", b"pre", b"section", b"table", b"tbody", b"td",
    b"tfoot", b"th", b"thead", b"tr", b"ul",
];

fn is_block(name: &[u8]) -> bool {
    BLOCK_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

/// Minify an XML (or XHTML fragment) byte stream.
pub fn minify_xml(input: &[u8]) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(input);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut writer = Writer::new(Vec::with_capacity(input.len()));
    let mut buf = Vec::new();
    let mut pre_depth = 0usize;
    let mut after_block = true;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Comment(_) => {}
            Event::Start(start) => {
                let name = start.name();
                if name.as_ref().eq_ignore_ascii_case(b"pre") {
                    pre_depth += 1;
                }
                after_block = is_block(name.as_ref());
                writer.write_event(Event::Start(start))?;
            }
            Event::End(end) => {
                let name = end.name();
                if name.as_ref().eq_ignore_ascii_case(b"pre") {
                    pre_depth = pre_depth.saturating_sub(1);
                }
                after_block = is_block(name.as_ref());
                writer.write_event(Event::End(end))?;
            }
            Event::Empty(empty) => {
                after_block = is_block(empty.name().as_ref());
                writer.write_event(Event::Empty(empty))?;
            }
            Event::Text(text) if pre_depth == 0 => {
                let raw = String::from_utf8_lossy(&text);
                if let Some(collapsed) = collapse_whitespace(&raw, after_block) {
                    after_block = false;
                    writer.write_event(Event::Text(BytesText::from_escaped(collapsed)))?;
                }
            }
            // `&amp;` and friends arrive as their own events and are inline content.
            Event::GeneralRef(reference) => {
                after_block = false;
                writer.write_event(Event::GeneralRef(reference))?;
            }
            event => writer.write_event(event)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner())
}

/// Collapse whitespace runs to one space; `None` when the text is pure layout.
fn collapse_whitespace(raw: &str, after_block: bool) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if raw.chars().all(|c| c.is_ascii_whitespace()) {
        return (!after_block).then(|| " ".to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut in_space = false;
    for c in raw.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    Some(out)
}
