//! Stylesheet URL rewriting and minification.
//!
//! - `url("…")` / `url('…')` references are resolved through a caller-supplied
//!   rewriter (the asset registry in practice)
//! - minification walks the cssparser token stream, dropping comments and
//!   redundant whitespace

use std::sync::LazyLock;

use cssparser::{ParseError, Parser, ParserInput, ToCss, Token};
use regex_lite::Regex;

use crate::error::Result;

type CssParseError<'i> = ParseError<'i, ()>;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url\((["'])(\S*?)["']\)"#).expect("valid url() pattern"));

/// Rewrite quoted `url()` references in CSS.
///
/// Each referenced path is passed to `rewriter`; the match is replaced with
/// `url("<new path>")`. The first rewriter error aborts the whole rewrite.
/// `data:` URIs and `#fragment` references are not files and are left alone.
pub fn rewrite_css_urls<F>(css: &str, mut rewriter: F) -> Result<String>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut result = String::with_capacity(css.len());
    let mut last = 0;

    for cap in URL_PATTERN.captures_iter(css) {
        let (Some(full), Some(url)) = (cap.get(0), cap.get(2)) else {
            continue;
        };
        let url = url.as_str();
        if url.starts_with("data:") || url.starts_with('#') {
            continue;
        }

        let new_url = rewriter(url)?;
        result.push_str(&css[last..full.start()]);
        result.push_str("url(\"");
        result.push_str(&new_url);
        result.push_str("\")");
        last = full.end();
    }

    result.push_str(&css[last..]);
    Ok(result)
}

/// Minify CSS: drop comments, collapse whitespace, drop the last `;` in blocks.
pub fn minify_css(css: &str) -> String {
    let mut output = String::with_capacity(css.len());
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);

    minify_recursive(&mut parser, &mut output);
    output
}

fn minify_recursive(parser: &mut Parser, output: &mut String) {
    let mut pending_space = false;

    while let Ok(token) = parser.next_including_whitespace_and_comments() {
        let token = token.clone();
        if matches!(token, Token::WhiteSpace(_) | Token::Comment(_)) {
            pending_space = true;
            continue;
        }

        if pending_space && needs_space(output, &token) {
            output.push(' ');
        }
        pending_space = false;

        output.push_str(&token.to_css_string());

        let close = match token {
            Token::Function(_) | Token::ParenthesisBlock => Some(')'),
            Token::SquareBracketBlock => Some(']'),
            Token::CurlyBracketBlock => Some('}'),
            _ => None,
        };
        if let Some(close) = close {
            let _ = parser.parse_nested_block(|p| {
                minify_recursive(p, output);
                Ok::<_, CssParseError>(())
            });
            if close == '}' && output.ends_with(';') {
                output.pop();
            }
            output.push(close);
        }
    }
}

/// Whether whitespace between the output so far and `next` is significant.
fn needs_space(output: &str, next: &Token) -> bool {
    let Some(last) = output.chars().last() else {
        return false;
    };
    if matches!(last, '{' | '}' | ';' | ':' | ',' | '>' | '(' | '[') {
        return false;
    }
    !matches!(
        next,
        Token::CurlyBracketBlock
            | Token::CloseCurlyBracket
            | Token::CloseParenthesis
            | Token::CloseSquareBracket
            | Token::Semicolon
            | Token::Comma
            | Token::Delim('>')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_css_urls_both_quote_styles() {
        let css = r#"@font-face { src: url("fonts/a.otf"); } body { background: url('img/bg.png'); }"#;
        let out = rewrite_css_urls(css, |url| Ok(format!("files/{}", url.replace('/', "_")))).unwrap();
        assert_eq!(
            out,
            r#"@font-face { src: url("files/fonts_a.otf"); } body { background: url("files/img_bg.png"); }"#
        );
    }

    #[test]
    fn test_rewrite_css_urls_first_error_wins() {
        let css = r#"a { background: url("one.png"); } b { background: url("two.png"); }"#;
        let mut seen = Vec::new();
        let err = rewrite_css_urls(css, |url| {
            seen.push(url.to_string());
            Err(crate::error::Error::Write(std::io::Error::other("boom")))
        });
        assert!(err.is_err());
        assert_eq!(seen, vec!["one.png"]);
    }

    #[test]
    fn test_rewrite_css_urls_skips_data_and_fragments() {
        let css = r#"a { background: url("data:image/png;base64,AAAA"); filter: url('#blur'); }"#;
        let out = rewrite_css_urls(css, |_| panic!("should not be called")).unwrap();
        assert_eq!(out, css);
    }

    #[test]
    fn test_minify_css_drops_comments_and_whitespace() {
        let css = "/* header */\nbody {\n  margin: 0 auto;\n  color: red;\n}\n\nh1 , h2 > span {\n  font-size: 2em;\n}\n";
        assert_eq!(
            minify_css(css),
            "body{margin:0 auto;color:red}h1,h2>span{font-size:2em}"
        );
    }

    #[test]
    fn test_minify_css_keeps_significant_spaces() {
        let css = "@media screen and (min-width: 600px) { div :first-child { width: calc(100% - 2px); } }";
        assert_eq!(
            minify_css(css),
            "@media screen and (min-width:600px){div :first-child{width:calc(100% - 2px)}}"
        );
    }

    #[test]
    fn test_minify_css_preserves_rewritten_urls() {
        let css = r#"body { background: url("files/abc.png") no-repeat; }"#;
        assert_eq!(
            minify_css(css),
            r#"body{background:url("files/abc.png") no-repeat}"#
        );
    }
}
