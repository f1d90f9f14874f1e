//! Network seam used on a full cache miss.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

/// Retrieves raw asset bytes from wherever `url` points.
///
/// Memory-only loads call [`fetch_bytes`](Fetcher::fetch_bytes). Storing loads
/// download to a temporary location first and then read it back, so large
/// payloads need not be buffered by the transport.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_bytes(&self, url: &Url) -> anyhow::Result<Bytes>;

    /// Downloads `url` and returns where the payload was written.
    ///
    /// The loader deletes the returned file once it has been read.
    async fn download_to_temp(&self, url: &Url) -> anyhow::Result<PathBuf>;

    async fn read_bytes(&self, location: &Path) -> anyhow::Result<Bytes> {
        Ok(Bytes::from(tokio::fs::read(location).await?))
    }
}
