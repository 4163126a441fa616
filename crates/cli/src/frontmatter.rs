//! Markdown front matter reader.
//!
//! The leading `---` block of a page is parsed as YAML; only the
//! `contributors` key is carried into [`PageMeta`].

use serde_yaml::Value;
use tracing::warn;

use git_committers_core::PageMeta;

/// Extract page metadata from a Markdown document.
///
/// A page without front matter, or whose front matter is not valid YAML,
/// has no metadata.
pub fn page_meta(markdown: &str) -> PageMeta {
    let Some(block) = front_matter_block(markdown) else {
        return PageMeta::default();
    };
    let frontmatter: Value = match serde_yaml::from_str(&block) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "ignoring unparsable front matter");
            return PageMeta::default();
        }
    };
    PageMeta {
        contributors: frontmatter.get("contributors").and_then(contributors_value),
    }
}

/// The text between the opening `---` line and the closing `---` / `...`.
fn front_matter_block(markdown: &str) -> Option<String> {
    let mut lines = markdown.trim_start_matches('\u{feff}').lines();
    if lines.next()?.trim_end() != "---" {
        return None;
    }
    let mut block = Vec::new();
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            return Some(block.join("\n"));
        }
        block.push(line);
    }
    None
}

/// A comma-separated string as written, or a YAML list joined with commas.
fn contributors_value(value: &Value) -> Option<String> {
    let list = match value {
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(","),
        _ => return None,
    };
    (!list.trim().is_empty()).then_some(list)
}
