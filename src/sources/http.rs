//! Live page fetching over HTTP.

use async_trait::async_trait;
use url::Url;

use super::{FetchError, FetchResponse, PageFetcher};
use crate::config::PaginationConfig;
use crate::utils::HttpClient;

/// Fetches pages through a shared [`HttpClient`] session.
///
/// Any status is returned as-is; deciding what 429 or 503 means is the
/// controller's job.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: HttpClient,
}

impl HttpFetcher {
    pub fn new(config: &PaginationConfig) -> Result<Self, FetchError> {
        let client =
            HttpClient::new(config).map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    fn id(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .client()
            .get(url.clone())
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read response: {}", e)))?;

        Ok(FetchResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_fetch_returns_status_and_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/citations")
            .match_query(Matcher::UrlEncoded("user".into(), "abc".into()))
            .with_status(200)
            .with_body("<html>profile</html>")
            .expect(1)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&PaginationConfig::default()).unwrap();
        let url = Url::parse(&format!("{}/citations?user=abc", server.url())).unwrap();
        let response = fetcher.fetch(&url).await.unwrap();

        assert_eq!(response, FetchResponse::ok("<html>profile</html>"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_passes_through_block_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/citations")
            .with_status(429)
            .with_body("slow down")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&PaginationConfig::default()).unwrap();
        let url = Url::parse(&format!("{}/citations", server.url())).unwrap();
        let response = fetcher.fetch(&url).await.unwrap();

        assert_eq!(response.status, 429);
        assert!(!response.is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let fetcher = HttpFetcher::new(&PaginationConfig::default()).unwrap();
        let url = Url::parse("http://127.0.0.1:1/citations").unwrap();

        assert!(matches!(
            fetcher.fetch(&url).await,
            Err(FetchError::Transport(_))
        ));
    }
}
