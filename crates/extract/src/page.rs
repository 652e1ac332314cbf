//! A dumped page DOM and the pieces the archive needs from it.

use crate::clean::Cleaner;
use crate::consts::{HEAD_TITLE_SELECTOR, IMAGE_SELECTOR, STYLESHEET_SELECTOR, STYLE_SELECTOR, TITLE_SELECTOR};
use crate::serialize::{Rewrite, absolute, effective_image_src};
use docarchive_discover::Url;
use scraper::{ElementRef, Html};
use std::collections::HashSet;

/// Which part of the page an operation looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Only the configured content root.
    Content,
    /// The whole document.
    Document,
}

pub struct Page {
    document: Html,
    url: Url,
}
impl Page {
    pub fn parse(html: &str, url: Url) -> Self {
        Self { document: Html::parse_document(html), url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The whitespace-normalized document title, if present and non-empty.
    ///
    /// `<head>`'s own title wins; otherwise the first `<title>` that isn't
    /// an SVG's accessible name.
    pub fn title(&self) -> Option<String> {
        self.document
            .select(&HEAD_TITLE_SELECTOR)
            .next()
            .or_else(|| self.document.select(&TITLE_SELECTOR).find(|el| !inside_svg(el)))
            .map(|el| el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|t| !t.is_empty())
    }

    /// Text of every `<style>` element, in document order.
    pub fn inline_styles(&self) -> Vec<String> {
        self.document.select(&STYLE_SELECTOR).map(|el| el.text().collect::<String>()).collect()
    }

    /// Absolute URLs of every linked stylesheet, deduplicated in document order.
    pub fn stylesheets(&self) -> Vec<Url> {
        let mut seen = HashSet::new();
        self.document
            .select(&STYLESHEET_SELECTOR)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| absolute(&self.url, href))
            .filter(|url| seen.insert(url.to_string()))
            .collect()
    }

    /// Absolute URLs of the images that will be displayed within `scope`.
    pub fn images(&self, cleaner: &Cleaner, scope: Scope) -> Vec<Url> {
        let root = match scope {
            Scope::Content => match cleaner.content_root(&self.document) {
                Some(root) => root,
                None => return Vec::new(),
            },
            Scope::Document => self.document.root_element(),
        };
        let mut seen = HashSet::new();
        root.select(&IMAGE_SELECTOR)
            .filter_map(|img| effective_image_src(img.value()))
            .filter_map(|src| absolute(&self.url, src))
            .filter(|url| matches!(url.scheme(), "http" | "https"))
            .filter(|url| seen.insert(url.to_string()))
            .collect()
    }

    /// Applies the cleanup rules in place.
    pub fn clean(&mut self, cleaner: &Cleaner) -> usize {
        cleaner.clean(&mut self.document)
    }

    /// Inner HTML of the content root, or `None` when there isn't one.
    pub(crate) fn content_html(&self, cleaner: &Cleaner, rewrite: &Rewrite) -> Option<String> {
        let root = cleaner.content_root(&self.document)?;
        let mut out = String::new();
        rewrite.children(*root, &mut out);
        Some(out)
    }

    /// The whole document, doctype included.
    pub(crate) fn document_html(&self, rewrite: &Rewrite) -> String {
        let mut out = String::new();
        rewrite.node(self.document.tree.root(), &mut out);
        out
    }
}

fn inside_svg(element: &ElementRef) -> bool {
    element.ancestors().filter_map(ElementRef::wrap).any(|a| a.value().name() == "svg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docarchive_config::{CleanupConfig, Theme};

    const PAGE: &str = r#"
        <html><head>
          <title>
            Routing | Next.js
          </title>
          <style>.a { color: red }</style>
          <link rel="stylesheet" href="/_next/static/css/a.css">
          <link rel="preload stylesheet" href="/_next/static/css/b.css">
          <link rel="stylesheet" href="/_next/static/css/a.css">
          <link rel="icon" href="/favicon.ico">
        </head><body>
          <style>.b { color: blue }</style>
          <img src="/outside.png">
          <article>
            <img src="/inside.png">
            <img loading="lazy" srcset="/lazy.png 1x, /lazy@2x.png 2x">
            <img src="/inside.png">
            <img src="data:image/png;base64,AAAA">
          </article>
        </body></html>
    "#;

    fn page() -> Page {
        Page::parse(PAGE, Url::parse("https://nextjs.org/docs/app/routing").unwrap())
    }

    #[test]
    fn normalizes_title_whitespace() {
        assert_eq!(page().title().as_deref(), Some("Routing | Next.js"));
        let empty = Page::parse("<html><head><title> </title></head></html>", Url::parse("https://a.b/").unwrap());
        assert_eq!(empty.title(), None);
    }

    #[test]
    fn svg_titles_are_not_page_titles() {
        let url = Url::parse("https://a.b/").unwrap();
        let page = Page::parse(
            "<html><head></head><body><svg><title>Copy icon</title></svg><p>text</p></body></html>",
            url.clone(),
        );
        assert_eq!(page.title(), None);
        let page = Page::parse(
            "<html><head><title>Caching</title></head><body><svg><title>Icon</title></svg></body></html>",
            url,
        );
        assert_eq!(page.title().as_deref(), Some("Caching"));
    }

    #[test]
    fn collects_inline_styles_in_order() {
        assert_eq!(page().inline_styles(), vec![".a { color: red }", ".b { color: blue }"]);
    }

    #[test]
    fn collects_unique_absolute_stylesheets() {
        let sheets: Vec<String> = page().stylesheets().iter().map(Url::to_string).collect();
        assert_eq!(
            sheets,
            vec!["https://nextjs.org/_next/static/css/a.css", "https://nextjs.org/_next/static/css/b.css"]
        );
    }

    #[test]
    fn images_respect_scope() {
        let cleaner = Cleaner::new(&CleanupConfig::default(), Theme::Light).unwrap();
        let page = page();
        let content: Vec<String> = page.images(&cleaner, Scope::Content).iter().map(Url::to_string).collect();
        assert_eq!(content, vec!["https://nextjs.org/inside.png", "https://nextjs.org/lazy.png"]);
        assert_eq!(page.images(&cleaner, Scope::Document).len(), 3);
    }
}
