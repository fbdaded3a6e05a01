use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("cache file {path:?}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A template line that starts with `|` but cannot be split into name and value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InfoboxError {
    #[error("field line has no '=': {0:?}")]
    MissingSeparator(String),
    #[error("field line has an empty name: {0:?}")]
    EmptyName(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to fetch image page for {file}: {source}")]
    Fetch {
        file: String,
        #[source]
        source: FetchError,
    },
    #[error("no original image link found for {0}")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to encode manifest: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything that can fail for a single project. Never aborts a batch run.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("fetching edit page: {0}")]
    Fetch(#[from] FetchError),
    #[error("edit page has no source textarea")]
    NoSource,
    #[error(transparent)]
    Output(#[from] OutputError),
}
