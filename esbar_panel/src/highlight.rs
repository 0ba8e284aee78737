//! JSON syntax highlighting for HTML output
//!
//! A single-pass lexical classifier, not a parser: malformed JSON is still
//! highlighted token by token.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Quoted string with optional trailing colon, literal word, or number.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#""(\\u[a-zA-Z0-9]{4}|\\[^u]|[^\\"])*"(\s*:)?|\b(true|false|null)\b|-?\d+(?:\.\d*)?(?:[eE][+\-]?\d+)?"#,
    )
    .expect("token pattern is valid")
});

/// Lexical class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Key,
    String,
    Number,
    Bool,
    Null,
}

impl TokenKind {
    /// CSS class used for this kind
    pub fn class(&self) -> &'static str {
        match self {
            TokenKind::Key => "json-key",
            TokenKind::String => "json-string",
            TokenKind::Number => "json-number",
            TokenKind::Bool => "json-bool",
            TokenKind::Null => "json-null",
        }
    }

    fn classify(text: &str) -> Self {
        if text.starts_with('"') {
            if text.ends_with(':') {
                TokenKind::Key
            } else {
                TokenKind::String
            }
        } else if text == "true" || text == "false" {
            TokenKind::Bool
        } else if text == "null" {
            TokenKind::Null
        } else {
            TokenKind::Number
        }
    }
}

/// A classified slice of the scanned text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: Range<usize>,
}

/// Classified tokens of `text`, left to right
pub fn tokenize(text: &str) -> impl Iterator<Item = Token<'_>> {
    TOKEN_PATTERN.find_iter(text).map(|m| Token {
        kind: TokenKind::classify(m.as_str()),
        text: m.as_str(),
        range: m.range(),
    })
}

/// Escape the characters that would start markup or entities
fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape `json` and wrap every token in a classed span
pub fn highlight(json: &str) -> String {
    let text = escape_markup(json);
    let mut out = String::with_capacity(text.len() * 2);
    let mut last = 0;

    for token in tokenize(&text) {
        out.push_str(&text[last..token.range.start]);
        out.push_str("<span class=\"");
        out.push_str(token.kind.class());
        out.push_str("\">");
        out.push_str(token.text);
        out.push_str("</span>");
        last = token.range.end;
    }
    out.push_str(&text[last..]);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(TokenKind, &str)> {
        tokenize(text).map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn test_classifies_object() {
        assert_eq!(
            kinds(r#"{"a":1,"b":"x","c":true,"d":null}"#),
            vec![
                (TokenKind::Key, r#""a":"#),
                (TokenKind::Number, "1"),
                (TokenKind::Key, r#""b":"#),
                (TokenKind::String, r#""x""#),
                (TokenKind::Key, r#""c":"#),
                (TokenKind::Bool, "true"),
                (TokenKind::Key, r#""d":"#),
                (TokenKind::Null, "null"),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("[-1, 2.5, 3e10, -4.0E-2]"),
            vec![
                (TokenKind::Number, "-1"),
                (TokenKind::Number, "2.5"),
                (TokenKind::Number, "3e10"),
                (TokenKind::Number, "-4.0E-2"),
            ]
        );
    }

    #[test]
    fn test_key_with_spaced_colon_and_escapes() {
        assert_eq!(
            kinds(r#"{"say \"hi\"" : "é\n"}"#),
            vec![
                (TokenKind::Key, r#""say \"hi\"" :"#),
                (TokenKind::String, r#""é\n""#),
            ]
        );
    }

    #[test]
    fn test_digits_inside_strings_are_not_numbers() {
        assert_eq!(kinds(r#"["abc123"]"#), vec![(TokenKind::String, r#""abc123""#)]);
    }

    #[test]
    fn test_highlight_markup() {
        assert_eq!(
            highlight(r#"{"a":1}"#),
            r#"{<span class="json-key">"a":</span><span class="json-number">1</span>}"#
        );
    }

    #[test]
    fn test_highlight_escapes_before_tokenizing() {
        let html = highlight(r#"{"q":"a<b && c>d"} <script>"#);
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"<span class="json-string">"a&lt;b &amp;&amp; c&gt;d"</span>"#));

        // The only raw '<' left are span tags, the only raw '&' start entities
        let stripped = html.replace("<span class=\"", "").replace("</span>", "");
        assert!(!stripped.contains('<'));
        for (idx, _) in stripped.match_indices('&') {
            let rest = &stripped[idx..];
            assert!(rest.starts_with("&amp;") || rest.starts_with("&lt;") || rest.starts_with("&gt;"));
        }
    }

    #[test]
    fn test_malformed_json_still_highlighted() {
        let html = highlight(r#"{"a": tru, 12 "#);
        assert!(html.contains(r#"<span class="json-key">"a":</span>"#));
        assert!(html.contains(r#"<span class="json-number">12</span>"#));
        assert!(html.contains(" tru, "));
    }
}
