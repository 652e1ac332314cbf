//! Blocking HTTP access shared by discovery and asset inlining.

use crate::error::{ErrorKind, Result};
use docarchive_config::SourceConfig;
use exn::ResultExt;
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use tracing::instrument;

/// A fetched resource body together with its declared media type.
#[derive(Debug)]
pub struct Fetched {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

/// Thin wrapper around a [`reqwest`] blocking client carrying the configured
/// user agent and timeout.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
}
impl Fetcher {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(Self { client })
    }

    #[instrument(skip(self), fields(url = %url))]
    pub fn text(&self, url: &Url) -> Result<String> {
        let response = self.get(url)?;
        response.text().or_raise(|| ErrorKind::Body)
    }

    #[instrument(skip(self), fields(url = %url))]
    pub fn bytes(&self, url: &Url) -> Result<Fetched> {
        let response = self.get(url)?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .filter(|v| !v.is_empty());
        let body = response.bytes().or_raise(|| ErrorKind::Body)?.to_vec();
        tracing::trace!(bytes = body.len(), content_type = ?content_type, "Fetched resource");
        Ok(Fetched { body, content_type })
    }

    fn get(&self, url: &Url) -> Result<Response> {
        let response = self.client.get(url.clone()).send().or_raise(|| ErrorKind::Request(url.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status { url: url.to_string(), status: status.as_u16() });
        }
        Ok(response)
    }
}
