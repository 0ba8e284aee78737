//! HTML helpers and the stylesheet embedded by the bar

/// Escape text for use in element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub const BAR_CSS: &str = r#"<style>
    .esbar { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; font-size: 13px; color: #333; }
    .esbar-tab { font-weight: 600; }
    .esbar h1 { font-size: 1.1rem; font-weight: 600; margin: 0.5rem 0; }
    .esbar h2 { font-size: 0.95rem; font-weight: 500; color: #666; margin: 0.75rem 0 0.25rem; }
    .esbar table { border-collapse: collapse; width: 100%; }
    .esbar th, .esbar td { border: 1px solid #e0e0e0; padding: 0.3rem 0.5rem; text-align: left; vertical-align: top; }
    .esbar th { background: #fafafa; font-weight: 500; }
    .esbar pre { margin: 0.25rem 0; white-space: pre-wrap; word-break: break-all; font-size: 12px; }
    .esbar-method { font-weight: 600; color: #2563eb; }
    .esbar-error { color: #991b1b; }
    .esbar-explained { font-size: 0.75rem; padding: 0.1rem 0.4rem; border-radius: 3px; background: #dcfce7; color: #166534; }

    /* JSON highlighting */
    .json-key { color: #881391; }
    .json-string { color: #c41a16; }
    .json-number { color: #1c00cf; }
    .json-bool { color: #0d22aa; }
    .json-null { color: #808080; }
</style>"#;
