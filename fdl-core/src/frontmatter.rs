//! Requirement metadata parsing
//!
//! Requirement documents carry a YAML header delimited by `---` lines.
//! Test files carry a single back-reference line (`Validates: SW-REQ-001`).
//! Both parsers report "nothing found" as `None`: a missing or malformed
//! header is a finding for the caller, not an error.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Line that opens and closes a metadata header
pub const FRONTMATTER_DELIM: &str = "---";

/// Prefixes that introduce a test's back-reference line
pub const BACK_REFERENCE_MARKERS: [&str; 2] = ["Validates:", "Tests:"];

// Longest first so `///` is not consumed as `//` followed by `/`.
const COMMENT_LEADERS: [&str; 8] = ["\"\"\"", "'''", "///", "//!", "//", "--", "#", "*"];

/// Link fields understood by the chain resolver and link validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkField {
    TracesTo,
    RefinedIn,
    TestedBy,
}

impl LinkField {
    pub fn key(&self) -> &'static str {
        match self {
            LinkField::TracesTo => "traces_to",
            LinkField::RefinedIn => "refined_in",
            LinkField::TestedBy => "tested_by",
        }
    }
}

/// Value of a link field as found in a header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Links {
    /// Field absent or null
    Absent,
    List(Vec<String>),
    /// Field present but not a sequence
    NotAList,
}

/// Parsed metadata header of a requirement document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequirementDoc {
    fields: Mapping,
}

impl RequirementDoc {
    pub fn from_mapping(fields: Mapping) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn id(&self) -> Option<String> {
        self.get("id").and_then(scalar_to_string)
    }

    /// Title, or an empty string when the header has none
    pub fn title(&self) -> String {
        self.get("title").and_then(scalar_to_string).unwrap_or_default()
    }

    pub fn links(&self, field: LinkField) -> Links {
        match self.get(field.key()) {
            None | Some(Value::Null) => Links::Absent,
            Some(Value::Sequence(items)) => {
                Links::List(items.iter().filter_map(scalar_to_string).collect())
            }
            Some(_) => Links::NotAList,
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Splits content into (header, body) when it opens with a delimited header
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let mut lines = content.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != FRONTMATTER_DELIM {
        return None;
    }

    let header_start = first.len();
    let mut offset = header_start;
    for line in lines {
        if line.trim_end() == FRONTMATTER_DELIM {
            return Some((&content[header_start..offset], &content[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parses the metadata header of a requirement document.
///
/// Returns `None` when there is no header, the closing delimiter is missing,
/// or the header is not a YAML mapping.
pub fn parse_frontmatter(content: &str) -> Option<RequirementDoc> {
    let (header, _) = split_frontmatter(content)?;
    match serde_yaml::from_str::<Value>(header) {
        Ok(Value::Mapping(fields)) => Some(RequirementDoc::from_mapping(fields)),
        Ok(_) => {
            tracing::warn!("frontmatter is not a mapping");
            None
        }
        Err(e) => {
            tracing::warn!("malformed frontmatter: {}", e);
            None
        }
    }
}

/// Reads a file and parses its metadata header; unreadable files have none
pub fn read_frontmatter(path: &Path) -> Option<RequirementDoc> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let doc = parse_frontmatter(&content);
            if doc.is_none() {
                tracing::debug!("no frontmatter in {}", path.display());
            }
            doc
        }
        Err(e) => {
            tracing::warn!("failed to read {}: {}", path.display(), e);
            None
        }
    }
}

/// Extracts the requirement id a test declares it validates.
///
/// Only the first `Validates:` / `Tests:` line counts. The id is the first
/// token between the first and second colon on that line.
pub fn extract_back_reference(content: &str) -> Option<String> {
    for line in content.lines() {
        let text = strip_comment_leader(line.trim());
        if BACK_REFERENCE_MARKERS.iter().any(|m| text.starts_with(m)) {
            return text
                .split(':')
                .nth(1)
                .and_then(|rest| rest.split_whitespace().next())
                .map(|token| token.trim_matches(|c| c == '"' || c == '\''))
                .filter(|token| !token.is_empty())
                .map(str::to_string);
        }
    }
    None
}

/// Reads a test file and extracts its back-reference
pub fn read_back_reference(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => extract_back_reference(&content),
        Err(e) => {
            tracing::warn!("failed to read {}: {}", path.display(), e);
            None
        }
    }
}

fn strip_comment_leader(text: &str) -> &str {
    COMMENT_LEADERS
        .iter()
        .find_map(|leader| text.strip_prefix(leader))
        .map(str::trim_start)
        .unwrap_or(text)
}
