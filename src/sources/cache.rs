//! On-disk page cache and the offline fetcher that replays it.
//!
//! Pages are stored as `<dir>/<user id>_p<n>.htm` with `n` starting at 1,
//! so a fetch-only run can be tallied later without network access.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use url::Url;

use super::scholar::page_location;
use super::{FetchError, FetchResponse, PageFetcher};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Directory of cached page bodies
#[derive(Debug, Clone)]
pub struct PageCache {
    dir: PathBuf,
}

impl PageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the cache directory if needed
    pub fn ensure_dir(&self) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| CacheError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    /// File for 1-based page `page_number` of `user_id`
    pub fn path_for(&self, user_id: &str, page_number: usize) -> PathBuf {
        self.dir.join(format!("{}_p{}.htm", user_id, page_number))
    }

    /// Write a page body, replacing any earlier copy
    pub fn store(&self, user_id: &str, page_number: usize, body: &str) -> Result<PathBuf, CacheError> {
        let path = self.path_for(user_id, page_number);
        std::fs::write(&path, body).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Cached page {} for {} -> {}", page_number, user_id, path.display());
        Ok(path)
    }

    /// Read a cached page; `None` when it was never cached
    pub async fn load(&self, user_id: &str, page_number: usize) -> Result<Option<String>, CacheError> {
        let path = self.path_for(user_id, page_number);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }
}

/// Serves list-works URLs from a [`PageCache`]; missing pages are 404s.
#[derive(Debug, Clone)]
pub struct CachedPageFetcher {
    cache: PageCache,
}

impl CachedPageFetcher {
    pub fn new(cache: PageCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl PageFetcher for CachedPageFetcher {
    fn id(&self) -> &str {
        "cache"
    }

    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let (user_id, cstart, pagesize) =
            page_location(url).ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;
        let page_number = cstart / pagesize + 1;

        match self.cache.load(&user_id, page_number).await {
            Ok(Some(body)) => {
                tracing::info!("Loaded cached page {} for {}", page_number, user_id);
                Ok(FetchResponse::ok(body))
            }
            Ok(None) => Ok(FetchResponse::new(404, "")),
            Err(e) => Err(FetchError::Io(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_store_and_load() {
        let dir = tempdir().unwrap();
        let cache = PageCache::new(dir.path());

        let path = cache.store("abc", 2, "<html>two</html>").unwrap();
        assert!(path.ends_with("abc_p2.htm"));

        assert_eq!(cache.load("abc", 2).await.unwrap().as_deref(), Some("<html>two</html>"));
        assert_eq!(cache.load("abc", 3).await.unwrap(), None);
    }

    #[test]
    fn test_ensure_dir_creates_nested() {
        let dir = tempdir().unwrap();
        let cache = PageCache::new(dir.path().join("a").join("b"));
        cache.ensure_dir().unwrap();
        assert!(cache.dir().is_dir());
    }

    #[tokio::test]
    async fn test_cached_fetcher_maps_cstart_to_page() {
        let dir = tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        cache.store("abc", 1, "first").unwrap();
        cache.store("abc", 2, "second").unwrap();
        let fetcher = CachedPageFetcher::new(cache);
        assert_eq!(fetcher.id(), "cache");

        let url = |cstart: usize| {
            Url::parse(&format!(
                "https://scholar.google.com/citations?user=abc&hl=en&view_op=list_works&cstart={}&pagesize=100",
                cstart
            ))
            .unwrap()
        };

        assert_eq!(fetcher.fetch(&url(0)).await.unwrap().body, "first");
        assert_eq!(fetcher.fetch(&url(100)).await.unwrap().body, "second");
        assert_eq!(fetcher.fetch(&url(200)).await.unwrap().status, 404);
    }

    #[tokio::test]
    async fn test_cached_fetcher_rejects_non_paging_url() {
        let dir = tempdir().unwrap();
        let fetcher = CachedPageFetcher::new(PageCache::new(dir.path()));
        let url = Url::parse("https://scholar.google.com/citations?user=abc").unwrap();

        assert!(matches!(
            fetcher.fetch(&url).await,
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
