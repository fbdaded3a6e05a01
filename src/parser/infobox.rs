use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use tracing::warn;

use crate::error::InfoboxError;

pub const OPEN_MARKER: &str = "{{Infobox project";
pub const CLOSE_MARKER: &str = "}}";

static INFOBOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        "(?s){}.*?{}",
        regex::escape(OPEN_MARKER),
        regex::escape(CLOSE_MARKER)
    );
    Regex::new(&pattern).unwrap()
});

/// Fields of one infobox, in order of first appearance. A repeated field
/// keeps its first position but takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInfobox {
    fields: IndexMap<String, String>,
    malformed: Vec<InfoboxError>,
}

impl RawInfobox {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Field lines that were skipped because they could not be split.
    pub fn malformed(&self) -> &[InfoboxError] {
        &self.malformed
    }

    fn insert(&mut self, name: &str, value: &str) {
        self.fields.insert(name.to_string(), value.to_string());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawInfobox {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        RawInfobox {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            malformed: Vec::new(),
        }
    }
}

/// Locate the first infobox block in a page source and tokenize it.
/// `None` means the page has no project infobox, which is not an error.
pub fn extract(page_source: &str) -> Option<RawInfobox> {
    find_block(page_source).map(tokenize)
}

/// The first `{{Infobox project ... }}` block, markers included.
/// Ends at the first `}}`, so a nested template closes the block early.
pub fn find_block(page_source: &str) -> Option<&str> {
    INFOBOX_RE.find(page_source).map(|m| m.as_str())
}

/// Turn a block into fields. Only lines starting with `|` (after trimming)
/// are field lines; malformed ones are recorded and skipped.
pub fn tokenize(block: &str) -> RawInfobox {
    let body = block.strip_suffix(CLOSE_MARKER).unwrap_or(block);
    let mut infobox = RawInfobox::default();

    for line in body.lines() {
        let Some(field) = line.trim().strip_prefix('|') else {
            continue;
        };
        match parse_field_line(field) {
            Ok((name, value)) => infobox.insert(name, value),
            Err(e) => {
                warn!("skipping infobox line: {}", e);
                infobox.malformed.push(e);
            }
        }
    }
    infobox
}

/// Split `name=value` (leading `|` already removed) on the first `=`.
/// Both halves are trimmed; further `=` stay in the value.
pub fn parse_field_line(field: &str) -> Result<(&str, &str), InfoboxError> {
    let (name, value) = field
        .split_once('=')
        .ok_or_else(|| InfoboxError::MissingSeparator(field.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(InfoboxError::EmptyName(field.to_string()));
    }
    Ok((name, value.trim()))
}
