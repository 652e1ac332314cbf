//! Discovery of the pages to archive.
//!
//! The documentation index is fetched once and every in-site link is sorted
//! into the configured groups (see [`extract_links`]).

pub mod error;
mod fetch;
mod links;

use crate::error::{ErrorKind, Result};
use docarchive_config::Config;
use exn::ResultExt;
use tracing::instrument;

pub use crate::fetch::{Fetched, Fetcher};
pub use crate::links::{Group, Groups, extract_links};
pub use reqwest::Url;

/// Fetches the configured index page and returns its grouped, limited links.
#[instrument(skip_all, fields(url = %config.source.index_url, limit = config.limit))]
pub fn discover(fetcher: &Fetcher, config: &Config) -> Result<Groups> {
    let index = config.source.index_url.trim();
    let base = Url::parse(index).or_raise(|| ErrorKind::InvalidUrl(index.to_string()))?;
    tracing::info!("Fetching documentation links");
    let html = fetcher.text(&base)?;
    let mut groups = extract_links(&html, &base, &config.groups);
    groups.limit(config.limit);
    for group in groups.iter() {
        tracing::info!(group = %group.name, links = group.links.len(), "Discovered documentation pages");
    }
    Ok(groups)
}
