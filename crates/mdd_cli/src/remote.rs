//! HTTP client for a remote filter repository.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use mdd_core::consts::METADATA_FILE;
use mdd_core::Catalog;
use reqwest::Client;
use tracing::debug;

pub struct RemoteRepo {
    client: Client,
    base_url: String,
}

impl RemoteRepo {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("building HTTP client")?;
        Ok(Self { client, base_url: base_url.into() })
    }

    fn url(&self, file: &str) -> String {
        format!("{}{}", self.base_url, file)
    }

    async fn get_bytes(&self, file: &str) -> Result<Vec<u8>> {
        let url = self.url(file);
        debug!(%url, "GET");
        let resp = self.client.get(&url).send().await.with_context(|| format!("fetching {url}"))?;
        if !resp.status().is_success() {
            return Err(anyhow!("{url}: HTTP {}", resp.status()));
        }
        Ok(resp.bytes().await?.to_vec())
    }

    /// Raw `METADATA.json` bytes and their parsed catalog.
    pub async fn metadata(&self) -> Result<(Vec<u8>, Catalog)> {
        let raw = self.get_bytes(METADATA_FILE).await?;
        let cat = Catalog::parse(&raw).context("parsing remote metadata")?;
        Ok((raw, cat))
    }

    pub async fn download(&self, name: &str) -> Result<Vec<u8>> {
        self.get_bytes(name).await
    }
}
