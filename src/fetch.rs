use std::cell::Cell;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::settings::Settings;

const BASE_BACKOFF_MS: u64 = 2000;

/// Retrieves a page, going through the on-disk cache.
///
/// `cache_name` is the file name the page is stored under inside the cache
/// directory. Callers derive it deterministically from the logical resource
/// and must sanitize any user-controlled part of it.
pub trait Fetcher {
    fn fetch(&self, url: &str, cache_name: &str) -> Result<String, FetchError>;
}

/// Raw network access, no caching.
pub trait Download {
    fn download(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout())
            .build()?;
        Ok(Self {
            client,
            max_retries: settings.max_retries,
        })
    }

    fn get_once(&self, url: &str) -> Result<(StatusCode, String), FetchError> {
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        let body = resp.text()?;
        Ok((status, body))
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

impl Download for HttpClient {
    fn download(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 0;
        loop {
            let (status, body) = self.get_once(url)?;
            if status.is_success() {
                return Ok(body);
            }
            if !should_retry(status) || attempt == self.max_retries {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
            warn!(
                "HTTP {} on {} (attempt {}/{}), backing off {:.1}s",
                status.as_u16(),
                url,
                attempt + 1,
                self.max_retries,
                backoff.as_secs_f64()
            );
            thread::sleep(backoff);
            attempt += 1;
        }
    }
}

pub struct CachedFetcher<D> {
    download: D,
    cache_dir: PathBuf,
    force_refresh: bool,
    downloads: Cell<usize>,
}

impl<D: Download> CachedFetcher<D> {
    pub fn new(download: D, cache_dir: impl Into<PathBuf>, force_refresh: bool) -> Self {
        Self {
            download,
            cache_dir: cache_dir.into(),
            force_refresh,
            downloads: Cell::new(0),
        }
    }

    /// Number of pages actually downloaded (cache misses) so far.
    pub fn downloads(&self) -> usize {
        self.downloads.get()
    }
}

impl<D: Download> Fetcher for CachedFetcher<D> {
    fn fetch(&self, url: &str, cache_name: &str) -> Result<String, FetchError> {
        let path = self.cache_dir.join(cache_name);

        if !self.force_refresh && path.is_file() {
            debug!("cache hit {:?}", path);
            return fs::read_to_string(&path).map_err(|source| FetchError::Cache { path, source });
        }

        info!("downloading {} to {:?} ...", url, path);
        let body = self.download.download(url)?;
        self.downloads.set(self.downloads.get() + 1);
        write_entry(&self.cache_dir, &path, &body)
            .map_err(|source| FetchError::Cache { path, source })?;
        Ok(body)
    }
}

/// Write to a temporary file in the cache directory, then rename it over the
/// entry. An interrupted write never leaves a truncated entry behind.
fn write_entry(dir: &Path, path: &Path, body: &str) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(body.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
