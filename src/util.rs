//! Small pure helpers shared by the pipeline stages.

use std::borrow::Cow;
use std::path::Path;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from `<?xml encoding="..."?>`)
/// 3. Falls back to Windows-1252 (common in manuscripts exported from old word processors)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract encoding from XML declaration.
///
/// Parses `<?xml ... encoding="..." ?>` within the first 100 bytes.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(100);
    let prefix = &bytes[..check_len];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    if after_enc.is_empty() {
        return None;
    }

    let quote = after_enc[0];
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_end = after_enc[1..].iter().position(|&b| b == quote)? + 1;

    std::str::from_utf8(&after_enc[1..value_end]).ok()
}

// ============================================================================
// Media Types
// ============================================================================

/// Extension of `path` including the leading dot, or an empty string.
///
/// The extension is returned verbatim so that `photo.JPG` keeps `.JPG`.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

/// Look up a media type from a dotted extension such as `.png`.
///
/// Unknown extensions map to `application/octet-stream`.
pub fn media_type_for_extension(ext: &str) -> &'static str {
    match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "xhtml" => "application/xhtml+xml",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "ncx" => "application/x-dtbncx+xml",
        "opf" => "application/oebps-package+xml",
        _ => "application/octet-stream",
    }
}

// ============================================================================
// Text Casing
// ============================================================================

/// Title-case English text: every word starts uppercase, the rest is lowercased.
///
/// A letter starts a word when the previous character is neither alphanumeric
/// nor an apostrophe, so `don't` stays `Don't`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;

    for c in text.chars() {
        let starts_word = match prev {
            None => true,
            Some(p) => !(p.is_alphanumeric() || p == '\'' || p == '\u{2019}'),
        };
        if starts_word {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        prev = Some(c);
    }

    out
}

/// Convert a title to a snake_case file stem.
///
/// Words are split on any non-alphanumeric character and on lower-to-upper
/// camel-case boundaries. Returns `"book"` when nothing usable remains.
///
/// ```
/// use bindery::util::snake_case;
///
/// assert_eq!(snake_case("The Rust Book"), "the_rust_book");
/// assert_eq!(snake_case("HelloWorld: Part 2"), "hello_world_part_2");
/// ```
pub fn snake_case(text: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in text.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }
        if c.is_uppercase()
            && prev.is_some_and(|p| p.is_lowercase() || p.is_numeric())
            && !current.is_empty()
        {
            words.push(std::mem::take(&mut current));
        }
        current.extend(c.to_lowercase());
        prev = Some(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    if words.is_empty() {
        "book".to_string()
    } else {
        words.join("_")
    }
}

/// English ordinal for a positive number: `1st`, `2nd`, `3rd`, `11th`, `22nd`.
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_decode_text_utf8_and_fallback() {
        assert_eq!(decode_text("caf\u{e9}".as_bytes(), None), "caf\u{e9}");
        // 0xE9 alone is invalid UTF-8 but é in Windows-1252
        assert_eq!(decode_text(b"caf\xe9", None), "caf\u{e9}");
    }

    #[test]
    fn test_extract_xml_encoding() {
        let doc = br#"<?xml version="1.0" encoding="ISO-8859-1"?><html/>"#;
        assert_eq!(extract_xml_encoding(doc), Some("ISO-8859-1"));
        assert_eq!(extract_xml_encoding(b"<html/>"), None);
    }

    #[test]
    fn test_dotted_extension() {
        assert_eq!(dotted_extension(Path::new("img/photo.JPG")), ".JPG");
        assert_eq!(dotted_extension(Path::new("img/archive.tar.gz")), ".gz");
        assert_eq!(dotted_extension(Path::new("img/noext")), "");
    }

    #[test]
    fn test_media_type_for_extension() {
        assert_eq!(media_type_for_extension(".png"), "image/png");
        assert_eq!(media_type_for_extension(".JPEG"), "image/jpeg");
        assert_eq!(media_type_for_extension(".woff2"), "font/woff2");
        assert_eq!(media_type_for_extension(".xyz"), "application/octet-stream");
        assert_eq!(media_type_for_extension(""), "application/octet-stream");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("the quick brown fox"), "The Quick Brown Fox");
        assert_eq!(title_case("HELLO wORLD"), "Hello World");
        assert_eq!(title_case("don't stop"), "Don't Stop");
        assert_eq!(title_case("well-known 1st place"), "Well-Known 1st Place");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("My Great Book"), "my_great_book");
        assert_eq!(snake_case("  Leading and trailing!  "), "leading_and_trailing");
        assert_eq!(snake_case("camelCaseTitle"), "camel_case_title");
        assert_eq!(snake_case("???"), "book");
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(102), "102nd");
        assert_eq!(ordinal(111), "111th");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Tom & Jerry"), "Tom &amp; Jerry");
        assert_eq!(escape_xml("<b>\"x\"</b>"), "&lt;b&gt;&quot;x&quot;&lt;/b&gt;");
    }

    proptest! {
        #[test]
        fn snake_case_is_file_safe(title in "[a-zA-Z0-9 _!?.,:-]{0,40}") {
            let stem = snake_case(&title);
            prop_assert!(!stem.is_empty());
            prop_assert!(!stem.starts_with('_') && !stem.ends_with('_'));
            prop_assert!(!stem.contains("__"));
            prop_assert!(stem.chars().all(|c| c == '_' || c.is_alphanumeric()));
        }

        #[test]
        fn title_case_is_idempotent(text in "[a-zA-Z' -]{0,40}") {
            let once = title_case(&text);
            prop_assert_eq!(title_case(&once), once.clone());
        }

        #[test]
        fn ordinal_keeps_number_prefix(n in 1u32..100_000) {
            let s = ordinal(n);
            prop_assert!(s.starts_with(&n.to_string()));
            prop_assert_eq!(s.len(), n.to_string().len() + 2);
        }
    }
}
