//! Removal of site chrome according to the configured cleanup rules.

use crate::error::{ErrorKind, Result};
use docarchive_config::{CleanupConfig, Theme};
use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use tracing::instrument;

/// Compiled cleanup rules for one theme.
///
/// Every selector is parsed once in [`Cleaner::new`], so a typo in the
/// configuration fails the run before any page is fetched.
#[derive(Debug)]
pub struct Cleaner {
    content: Vec<Selector>,
    remove: Vec<Selector>,
    phrases: Vec<String>,
}
impl Cleaner {
    pub fn new(config: &CleanupConfig, theme: Theme) -> Result<Self> {
        let content = config.content.iter().map(|s| parse_selector(s)).collect::<Result<Vec<_>>>()?;
        let remove = config
            .remove
            .iter()
            .chain(config.theme_remove.for_theme(theme))
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>>>()?;
        let phrases = config.remove_containing_text.iter().filter(|p| !p.trim().is_empty()).cloned().collect();
        Ok(Self { content, remove, phrases })
    }

    /// The first configured content root present in the document.
    pub fn content_root<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.content.iter().find_map(|selector| document.select(selector).next())
    }

    /// Detaches every matching element, returning how many subtrees were removed.
    #[instrument(level = "debug", skip_all)]
    pub fn clean(&self, document: &mut Html) -> usize {
        let mut targets: Vec<NodeId> = Vec::new();
        for selector in &self.remove {
            targets.extend(document.select(selector).map(|el| el.id()));
        }
        let mut removed = detach(document, &targets);
        if !self.phrases.is_empty() {
            let targets = self.innermost_with_phrase(document);
            removed += detach(document, &targets);
        }
        tracing::debug!(removed, "Removed page chrome");
        removed
    }

    /// Elements containing a configured phrase where no child element does.
    fn innermost_with_phrase(&self, document: &Html) -> Vec<NodeId> {
        let contains = |el: &ElementRef| {
            let text = el.text().collect::<String>();
            self.phrases.iter().any(|p| text.contains(p.as_str()))
        };
        document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| contains(el) && !el.children().filter_map(ElementRef::wrap).any(|child| contains(&child)))
            .map(|el| el.id())
            .collect()
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Ok(selector),
        Err(_) => exn::bail!(ErrorKind::InvalidSelector(css.to_string())),
    }
}

fn detach(document: &mut Html, ids: &[NodeId]) -> usize {
    let root = document.tree.root().id();
    let mut count = 0;
    for id in ids {
        // Nodes inside an already-detached subtree keep their parent, so
        // check they still hang off the document root.
        let attached = document.tree.get(*id).is_some_and(|node| node.ancestors().any(|a| a.id() == root));
        if attached && let Some(mut node) = document.tree.get_mut(*id) {
            node.detach();
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head><title>Routing</title></head><body>
          <header class="bg-background-100">Site header</header>
          <nav class="styled-scrollbar"><a href="/docs">Docs</a></nav>
          <main>
            <div class="not-prose">Breadcrumbs <button>Copy page</button></div>
            <article>
              <h1>Routing</h1>
              <p>Content stays.</p>
              <img class="dark-theme:hidden" src="/light.png">
              <img class="hidden dark-theme:block" src="/dark.png">
              <div data-feedback-inline><p>Was this helpful?</p><button>Yes</button></div>
              <section><p>Was this helpful to you?</p></section>
            </article>
          </main>
          <footer>Footer</footer>
        </body></html>
    "#;

    fn cleaned(theme: Theme) -> Html {
        let cleaner = Cleaner::new(&CleanupConfig::default(), theme).unwrap();
        let mut document = Html::parse_document(PAGE);
        cleaner.clean(&mut document);
        document
    }

    #[test]
    fn removes_configured_chrome() {
        let html = cleaned(Theme::Light).root_element().html();
        for gone in ["Site header", "styled-scrollbar", "Breadcrumbs", "Footer", "data-feedback-inline"] {
            assert!(!html.contains(gone), "{gone} should have been removed");
        }
        assert!(html.contains("Content stays."));
    }

    #[test]
    fn removes_innermost_phrase_only() {
        let html = cleaned(Theme::Light).root_element().html();
        assert!(!html.contains("Was this helpful to you?"));
        assert!(html.contains("<section></section>"));
        assert!(html.contains("Content stays."));
    }

    #[test]
    fn dark_theme_drops_light_images() {
        let html = cleaned(Theme::Dark).root_element().html();
        assert!(!html.contains("/light.png"));
        assert!(html.contains("/dark.png"));
    }

    #[test]
    fn light_theme_drops_dark_images() {
        let html = cleaned(Theme::Light).root_element().html();
        assert!(html.contains("/light.png"));
        assert!(!html.contains("/dark.png"));
    }

    #[test]
    fn content_root_prefers_configured_order() {
        let cleaner = Cleaner::new(&CleanupConfig::default(), Theme::Light).unwrap();
        let document = Html::parse_document(PAGE);
        assert_eq!(cleaner.content_root(&document).unwrap().value().name(), "article");
        let document = Html::parse_document("<main><p>only main</p></main>");
        assert_eq!(cleaner.content_root(&document).unwrap().value().name(), "main");
        let document = Html::parse_document("<div>neither</div>");
        assert!(cleaner.content_root(&document).is_none());
    }

    #[test]
    fn invalid_selector_is_rejected() {
        let config = CleanupConfig { remove: vec!["div[".to_string()], ..CleanupConfig::default() };
        let err = Cleaner::new(&config, Theme::Dark).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidSelector("div[".to_string()));
    }

    #[test]
    fn counts_removed_subtrees_once() {
        let config = CleanupConfig {
            content: vec![],
            remove: vec!["div".to_string(), "span".to_string()],
            remove_containing_text: vec![],
            theme_remove: Default::default(),
        };
        let cleaner = Cleaner::new(&config, Theme::Light).unwrap();
        let mut document = Html::parse_document("<div><span>a</span></div><p>b</p>");
        assert_eq!(cleaner.clean(&mut document), 1);
    }
}
