//! Stylesheet collection and image embedding.

use crate::consts::CSS_URL_REGEX;
use crate::page::Page;
use crate::serialize::absolute;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use docarchive_discover::error::Result as FetchResult;
use docarchive_discover::{Fetched, Fetcher, Url};
use regex::Captures;
use std::collections::{HashMap, HashSet};
use tracing::instrument;

/// Anything that can hand back the bytes behind a URL.
pub trait AssetSource {
    fn fetch(&self, url: &Url) -> FetchResult<Fetched>;
}
impl AssetSource for Fetcher {
    fn fetch(&self, url: &Url) -> FetchResult<Fetched> {
        self.bytes(url)
    }
}

/// CSS gathered from a page.
#[derive(Debug, Default)]
pub struct CollectedCss {
    /// Inline `<style>` text followed by every inlined external stylesheet.
    pub css: String,
    /// Stylesheets that stay external references.
    pub links: Vec<Url>,
    /// Stylesheets whose content now lives in `css`.
    pub inlined: HashSet<String>,
    /// The rewritten CSS of each inlined stylesheet, in link order.
    pub fetched: Vec<String>,
}

/// Gathers the page's CSS, fetching external stylesheets when `inline` is set.
///
/// A stylesheet that can't be fetched stays linked instead of being lost.
#[instrument(level = "debug", skip_all, fields(url = %page.url(), inline))]
pub fn collect_css(page: &Page, inline: bool, source: &impl AssetSource) -> CollectedCss {
    let mut collected = CollectedCss::default();
    for style in page.inline_styles() {
        collected.css.push_str(&style);
        collected.css.push('\n');
    }
    for url in page.stylesheets() {
        if !inline {
            collected.links.push(url);
            continue;
        }
        match source.fetch(&url) {
            Ok(fetched) => {
                let css = rewrite_css_urls(&String::from_utf8_lossy(&fetched.body), &url);
                collected.css.push_str(&css);
                collected.css.push('\n');
                collected.fetched.push(css);
                collected.inlined.insert(url.to_string());
            },
            Err(e) => {
                tracing::warn!(stylesheet = %url, error = ?e, "Failed to fetch stylesheet; keeping it linked");
                collected.links.push(url);
            },
        }
    }
    collected
}

/// Makes every relative `url(...)` in `css` absolute against the stylesheet's
/// own URL, so the CSS still resolves once it is inlined elsewhere.
pub fn rewrite_css_urls(css: &str, stylesheet: &Url) -> String {
    CSS_URL_REGEX
        .replace_all(css, |caps: &Captures| {
            let (value, quote) = match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(v), _, _) => (v.as_str(), "\""),
                (_, Some(v), _) => (v.as_str(), "'"),
                (_, _, Some(v)) => (v.as_str(), ""),
                _ => return caps[0].to_string(),
            };
            match absolute(stylesheet, value) {
                Some(url) => format!("url({quote}{url}{quote})"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Fetches every image and returns a map of absolute URL to `data:` URI.
///
/// Images that fail to download are logged and left out of the map, which
/// keeps their original URL in the output.
#[instrument(level = "debug", skip_all, fields(images = images.len()))]
pub fn embed_images(images: &[Url], source: &impl AssetSource) -> HashMap<String, String> {
    let mut embedded = HashMap::new();
    for url in images {
        match source.fetch(url) {
            Ok(fetched) => {
                let mime = fetched.content_type.unwrap_or_else(|| guess_mime(url).to_string());
                embedded.insert(url.to_string(), format!("data:{mime};base64,{}", BASE64.encode(&fetched.body)));
            },
            Err(e) => tracing::warn!(image = %url, error = ?e, "Failed to embed image; keeping external reference"),
        }
    }
    tracing::debug!(embedded = embedded.len(), "Embedded images as data URIs");
    embedded
}

fn guess_mime(url: &Url) -> &'static str {
    let extension = url.path().rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()).unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        _ => "application/octet-stream",
    }
}
