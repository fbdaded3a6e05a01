use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use regex::Regex;
use serde::Deserialize;
use url::form_urlencoded::byte_serialize;

static PERCENT_ESCAPE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%[0-9A-Fa-f]{2}").unwrap());

pub const DEFAULT_BASE_URL: &str = "https://www.appropedia.org";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.3; WOW64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/47.0.2526.69 Safari/537.36";

/// Runtime settings. Layered: defaults, `appro.toml`, `APPRO_*` env vars.
/// Command-line flags are applied on top by `main`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Cache and output directory
    pub storage_dir: PathBuf,
    /// Ignore cached pages and download again
    pub force_refresh: bool,
    pub user_agent: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// `limit` parameter of the WhatLinksHere project list
    pub list_limit: u32,
    /// Links on the list page up to and including this title are skipped
    pub list_start_after: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from("tmp"),
            force_refresh: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            max_retries: 3,
            list_limit: 500,
            list_start_after: Some("Permies".to_string()),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from("appro")
    }

    /// `file_stem` names the optional settings file without its extension.
    fn load_from(file_stem: &str) -> Result<Self> {
        let settings: Settings = Config::builder()
            .add_source(File::with_name(file_stem).required(false))
            .add_source(Environment::with_prefix("APPRO"))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        Ok(settings)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn start_after(&self) -> Option<&str> {
        self.list_start_after
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn projects_list_url(&self) -> String {
        format!(
            "{}/w/index.php?title=Special:WhatLinksHere/Template:Infobox_project&limit={}",
            self.base_url(),
            self.list_limit
        )
    }

    pub fn project_url(&self, title: &str) -> String {
        format!("{}/{}", self.base_url(), title)
    }

    pub fn edit_url(&self, title: &str) -> String {
        format!(
            "{}/w/index.php?title={}&action=edit",
            self.base_url(),
            query_title(title)
        )
    }
}

/// Titles taken from list-page links are already percent-encoded and pass
/// through; titles typed on the command line are encoded here.
fn query_title(title: &str) -> Cow<'_, str> {
    if PERCENT_ESCAPE_RE.is_match(title) {
        Cow::Borrowed(title)
    } else {
        Cow::Owned(byte_serialize(title.as_bytes()).collect())
    }
}
