use tracing::debug;
use url::form_urlencoded::byte_serialize;
use url::Url;

use crate::error::ResolveError;
use crate::fetch::Fetcher;
use crate::html;
use crate::sanitize::{cache_key, clean_file_name};

/// Path prefix of media files hosted by the wiki itself.
pub const LOCAL_MEDIA_PREFIX: &str = "/w/images/";
/// Originals that live on Wikimedia Commons.
pub const COMMONS_PREFIX: &str = "https://upload.wikimedia.org/wikipedia/commons/";

/// Turns an infobox `image` file name into an absolute URL.
pub trait ImageResolver {
    fn resolve(&self, title: &str, image: &str) -> Result<String, ResolveError>;
}

/// Absolute http(s)/ftp URL with a host; such image values are used as-is.
pub fn is_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https" | "ftp") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Looks the file up on its `File:` description page.
pub struct WikiImageResolver<'a, F> {
    fetcher: &'a F,
    base_url: String,
}

impl<'a, F: Fetcher> WikiImageResolver<'a, F> {
    pub fn new(fetcher: &'a F, base_url: &str) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn file_page_url(&self, clean: &str) -> String {
        let quoted: String = byte_serialize(clean.as_bytes()).collect();
        format!("{}/File:{}", self.base_url, quoted)
    }
}

impl<F: Fetcher> ImageResolver for WikiImageResolver<'_, F> {
    fn resolve(&self, title: &str, image: &str) -> Result<String, ResolveError> {
        let clean = clean_file_name(image);
        let page_url = self.file_page_url(&clean);
        let cache_name = format!("image__{}__{}.html", cache_key(title), clean);

        let page = self
            .fetcher
            .fetch(&page_url, &cache_name)
            .map_err(|source| ResolveError::Fetch {
                file: clean.clone(),
                source,
            })?;

        let links = html::links(&page);
        let found = find_original(&links, &self.base_url, &clean)
            .ok_or_else(|| ResolveError::NotFound(clean.clone()))?;
        debug!("image {} of {} -> {}", image, title, found);
        Ok(found)
    }
}

/// Two passes over the page links: first a wiki-hosted media path, then a
/// Commons original whose path ends with the file name.
pub fn find_original(links: &[String], base_url: &str, clean_file: &str) -> Option<String> {
    links
        .iter()
        .find(|l| l.starts_with(LOCAL_MEDIA_PREFIX))
        .map(|l| format!("{}{}", base_url, l))
        .or_else(|| {
            links
                .iter()
                .find(|l| l.starts_with(COMMONS_PREFIX) && l.ends_with(clean_file))
                .cloned()
        })
}
