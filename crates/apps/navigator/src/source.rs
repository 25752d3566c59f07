use std::future::Future;
use std::path::PathBuf;

use catalog::{CatalogSnapshot, CatalogSource, FetchError};
use tracing::debug;

/// Metadata feed served over HTTP.
#[derive(Clone, Debug)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

impl CatalogSource for HttpCatalogSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn load(&self) -> impl Future<Output = Result<CatalogSnapshot, FetchError>> + Send {
        let client = self.client.clone();
        let url = self.url.clone();
        async move {
            let resp = client
                .get(&url)
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;
            if !resp.status().is_success() {
                return Err(FetchError::Status(resp.status().as_u16()));
            }
            let bytes = resp
                .bytes()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;
            let snapshot = CatalogSnapshot::from_feed_bytes(&bytes)?;
            debug!(
                url = %url,
                panoramas = snapshot.len(),
                version = snapshot.version(),
                "feed loaded"
            );
            Ok(snapshot)
        }
    }
}

/// Metadata feed stored on disk.
#[derive(Clone, Debug)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for FileCatalogSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> impl Future<Output = Result<CatalogSnapshot, FetchError>> + Send {
        let path = self.path.clone();
        async move {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| FetchError::Network(format!("{}: {e}", path.display())))?;
            let snapshot = CatalogSnapshot::from_feed_bytes(&bytes)?;
            debug!(path = %path.display(), panoramas = snapshot.len(), "feed loaded");
            Ok(snapshot)
        }
    }
}

/// Either kind of feed, chosen from the `--feed` location.
#[derive(Clone, Debug)]
pub enum FeedSource {
    Http(HttpCatalogSource),
    File(FileCatalogSource),
}

impl FeedSource {
    pub fn from_location(location: &str, client: reqwest::Client) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            FeedSource::Http(HttpCatalogSource::new(client, location))
        } else {
            FeedSource::File(FileCatalogSource::new(location))
        }
    }
}

impl CatalogSource for FeedSource {
    fn describe(&self) -> String {
        match self {
            FeedSource::Http(s) => s.describe(),
            FeedSource::File(s) => s.describe(),
        }
    }

    fn load(&self) -> impl Future<Output = Result<CatalogSnapshot, FetchError>> + Send {
        let this = self.clone();
        async move {
            match this {
                FeedSource::Http(s) => s.load().await,
                FeedSource::File(s) => s.load().await,
            }
        }
    }
}

/// Confirms that a panorama image can be fetched before a transition is
/// shown. Remote images get a `HEAD` request; anything else is a path.
#[derive(Clone, Debug)]
pub struct ImageChecker {
    client: reqwest::Client,
}

impl ImageChecker {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn check(&self, url: &str) -> Result<(), FetchError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            let resp = self
                .client
                .head(url)
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;
            if !resp.status().is_success() {
                return Err(FetchError::Status(resp.status().as_u16()));
            }
        } else {
            tokio::fs::metadata(url)
                .await
                .map_err(|e| FetchError::Network(format!("{url}: {e}")))?;
        }
        debug!(url, "panorama image available");
        Ok(())
    }
}
