//! File-name safe forms of project titles and image names.

use std::sync::LazyLock;

use regex::Regex;
use url::form_urlencoded::byte_serialize;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]").unwrap());
static FILE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9.)(;,ó_-]").unwrap());

/// Replace everything but ASCII letters and digits with `_`.
pub fn clean_name(name: &str) -> String {
    NAME_RE.replace_all(name, "_").into_owned()
}

/// Cache key for a title. Unlike `clean_name` this is injective: `/`, `%`
/// and every other byte outside `[A-Za-z0-9._-]` is percent-encoded, so two
/// distinct titles never share a cache entry.
pub fn cache_key(title: &str) -> String {
    byte_serialize(title.as_bytes())
        .collect::<String>()
        .replace('*', "%2A")
}

/// Wiki file names keep a few punctuation characters the wiki itself allows.
pub fn clean_file_name(name: &str) -> String {
    FILE_NAME_RE.replace_all(name, "_").into_owned()
}
