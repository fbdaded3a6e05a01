use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::error::FetchError;
use crate::fetch::Fetcher;
use crate::html;
use crate::settings::Settings;

/// Plain article links: one path segment, no namespace.
static CONTENT_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/[^/:]+$").unwrap());

const LIST_CACHE_NAME: &str = "list.html";

/// A source page, identified by its wiki title (as it appears in links).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub title: String,
    /// Canonical page URL, used as the manifest `repo`
    pub url: String,
}

impl Project {
    pub fn new(title: &str, settings: &Settings) -> Self {
        Project {
            title: title.to_string(),
            url: settings.project_url(title),
        }
    }
}

/// Fetch the "what links here" page of the project infobox template and
/// return the linked project titles.
pub fn fetch_titles<F: Fetcher>(fetcher: &F, settings: &Settings) -> Result<Vec<String>, FetchError> {
    info!("Fetching project list");
    let page = fetcher.fetch(&settings.projects_list_url(), LIST_CACHE_NAME)?;
    let titles = titles_from_links(&html::links(&page), settings.start_after());
    info!("Projects found: {}", titles.len());
    Ok(titles)
}

/// Titles of content links after the `start_after` marker link (exclusive),
/// first occurrence only. Without a marker every content link counts.
pub fn titles_from_links(links: &[String], start_after: Option<&str>) -> Vec<String> {
    let mut passed_marker = start_after.is_none();
    let mut seen = HashSet::new();
    let mut titles = Vec::new();

    for link in links.iter().filter(|l| CONTENT_LINK_RE.is_match(l)) {
        let title = &link[1..];
        if !passed_marker {
            passed_marker = Some(title) == start_after;
            continue;
        }
        if seen.insert(title) {
            titles.push(title.to_string());
        }
    }
    titles
}
