//! Link extraction from the documentation index page.

use docarchive_config::GroupConfig;
use reqwest::Url;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::instrument;

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Links belonging to one configured group, in first-seen order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub links: Vec<Url>,
}

/// Every configured group, in configuration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Groups {
    groups: Vec<Group>,
}
impl Groups {
    /// Truncates every group to at most `limit` links; `0` leaves them untouched.
    pub fn limit(&mut self, limit: usize) {
        if limit == 0 {
            return;
        }
        for group in &mut self.groups {
            group.links.truncate(limit);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.links.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Returns `true` when `path` equals `prefix` or lies beneath it.
fn in_prefix(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Collects links from every `a[href]`, assigning each to the first group
/// whose prefix contains its path.
///
/// Hrefs are resolved against `base`; links pointing at another host are
/// ignored, fragments are dropped, and duplicates keep their first position.
#[instrument(skip(html, groups), fields(html_size = html.len(), base = %base))]
pub fn extract_links(html: &str, base: &Url, groups: &[GroupConfig]) -> Groups {
    let document = Html::parse_document(html);
    let mut found: Vec<Group> = groups.iter().map(|g| Group { name: g.name.clone(), links: Vec::new() }).collect();
    let mut seen = HashSet::new();
    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(mut url) = base.join(href.trim()) else {
            tracing::trace!(href, "Skipping unparseable href");
            continue;
        };
        if url.host_str() != base.host_str() || !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        url.set_fragment(None);
        let Some(index) = groups.iter().position(|g| in_prefix(url.path(), &g.prefix)) else {
            continue;
        };
        if seen.insert(url.to_string()) {
            found[index].links.push(url);
        }
    }
    Groups { groups: found }
}
