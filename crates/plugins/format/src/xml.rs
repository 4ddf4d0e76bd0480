//! Shared helpers for the XML-like text blocks.

/// Escape `& < > " '` for use in element text and attribute values.
pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Human-readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// `<tag>text</tag>` line at the given indent, skipped when `value` is absent or empty.
pub(crate) fn optional_element(out: &mut String, indent: usize, tag: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        out.push_str(&format!(
            "{:indent$}<{tag}>{}</{tag}>\n",
            "",
            escape_xml(value),
            indent = indent,
            tag = tag
        ));
    }
}

/// `<tag id="N">name</tag>` line for an embedded reference.
pub(crate) fn ref_element(out: &mut String, indent: usize, tag: &str, id: u64, name: &str) {
    out.push_str(&format!(
        "{:indent$}<{tag} id=\"{}\">{}</{tag}>\n",
        "",
        id,
        escape_xml(name),
        indent = indent,
        tag = tag
    ));
}

/// Wrap a detailed block in a `<result>` envelope for create/update.
pub fn action_result(action: &str, detail: &str) -> String {
    format!(
        "<result>\n  <status>success</status>\n  <action>{}</action>\n{}\n</result>",
        action, detail
    )
}

/// Result block for a deleted (or role-updated) resource, e.g. `<version_id>3</version_id>`.
pub fn id_result(action: &str, id_tag: &str, id: u64) -> String {
    format!(
        "<result>\n  <status>success</status>\n  <action>{}</action>\n  <{tag}>{}</{tag}>\n</result>",
        action,
        id,
        tag = id_tag
    )
}

/// `<root>No ... found</root>` marker for empty lists.
pub(crate) fn empty_list(root: &str, what: &str) -> String {
    format!("<{root}>No {} found</{root}>", what, root = root)
}
