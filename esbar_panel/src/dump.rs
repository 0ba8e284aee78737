//! Structure dumps rendered as highlighted, size-limited HTML

use crate::config::DumpOptions;
use crate::highlight::highlight;
use crate::html::escape;
use serde::Serialize;
use serde_json::Value;

/// Dump a JSON value
pub fn to_html(value: &Value, options: &DumpOptions) -> String {
    let limited = limit(value, options, 0);
    let text = serde_json::to_string_pretty(&limited).unwrap_or_else(|_| limited.to_string());
    let pre = format!("<pre class=\"esbar-dump\">{}</pre>", highlight(&text));

    if options.collapse {
        format!("<details><summary>{}</summary>{}</details>", summary(value), pre)
    } else {
        pre
    }
}

/// Dump anything serializable; serialization errors are shown instead of the value
pub fn to_html_serialized<T: Serialize + ?Sized>(value: &T, options: &DumpOptions) -> String {
    match serde_json::to_value(value) {
        Ok(value) => to_html(&value, options),
        Err(e) => format!(
            "<pre class=\"esbar-dump esbar-error\">{}</pre>",
            escape(&e.to_string())
        ),
    }
}

/// Copy of `value` with deep containers folded and long strings cut
fn limit(value: &Value, options: &DumpOptions, level: usize) -> Value {
    match value {
        Value::Array(items) if !items.is_empty() && level >= options.depth => {
            Value::String(format!("[…{} items]", items.len()))
        }
        Value::Object(map) if !map.is_empty() && level >= options.depth => {
            Value::String(format!("{{…{} keys}}", map.len()))
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| limit(item, options, level + 1))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), limit(v, options, level + 1)))
                .collect(),
        ),
        Value::String(text) => Value::String(truncate(text, options.truncate)),
        other => other.clone(),
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars).collect();
    format!("{} … ({} chars)", kept, count)
}

fn summary(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("array ({})", items.len()),
        Value::Object(map) => format!("object ({})", map.len()),
        Value::String(_) => "string".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Null => "null".to_string(),
    }
}
