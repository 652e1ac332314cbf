//! Turning a rendered page DOM into a clean, print-ready document.
//!
//! [`prepare`] is the top-level entrypoint: it parses the DOM Chrome dumped,
//! strips chrome per the [`Cleaner`] rules, gathers (and optionally inlines)
//! CSS and images, and emits either a rebuilt document around the content
//! root ([`RenderMode::Extract`]) or the whole cleaned page
//! ([`RenderMode::InPlace`]).

mod assets;
mod clean;
mod compose;
mod consts;
pub mod error;
mod page;
mod serialize;

use crate::error::{ErrorKind, Result};
use crate::serialize::Rewrite;
use docarchive_config::{RenderMode, Theme};
use docarchive_discover::Url;
use std::collections::HashMap;
use tracing::instrument;

pub use crate::assets::{AssetSource, CollectedCss, collect_css, embed_images, rewrite_css_urls};
pub use crate::clean::Cleaner;
pub use crate::compose::{Composition, compose};
pub use crate::page::{Page, Scope};

#[derive(Clone, Copy, Debug)]
pub struct PrepareOptions {
    pub mode: RenderMode,
    pub inline_assets: bool,
    pub theme: Theme,
}

/// A cleaned page, ready to hand to the renderer.
#[derive(Debug)]
pub struct Prepared {
    pub title: Option<String>,
    pub html: String,
    pub removed: usize,
}

#[instrument(skip(dom, cleaner, source), fields(url = %url, dom_size = dom.len()))]
pub fn prepare(
    dom: &str,
    url: &Url,
    cleaner: &Cleaner,
    options: PrepareOptions,
    source: &impl AssetSource,
) -> Result<Prepared> {
    let mut page = Page::parse(dom, url.clone());
    let title = page.title();
    let collected = match (options.mode, options.inline_assets) {
        (RenderMode::InPlace, false) => CollectedCss::default(),
        (_, inline) => collect_css(&page, inline, source),
    };
    let removed = page.clean(cleaner);
    let scope = match options.mode {
        RenderMode::Extract => Scope::Content,
        RenderMode::InPlace => Scope::Document,
    };
    let embedded = match options.inline_assets {
        true => embed_images(&page.images(cleaner, scope), source),
        false => HashMap::new(),
    };
    let html = match options.mode {
        RenderMode::Extract => {
            let rewrite =
                Rewrite {
                    base: url,
                    embedded: &embedded,
                    inlined: &collected.inlined,
                    head_append: None,
                    base_tag: false,
                    theme: None,
                };
            let Some(body) = page.content_html(cleaner, &rewrite) else {
                exn::bail!(ErrorKind::ContentNotFound(url.to_string()));
            };
            compose(&Composition {
                base: url,
                title: title.as_deref().unwrap_or_default(),
                css: &collected.css,
                stylesheets: &collected.links,
                body: &body,
                theme: options.theme,
            })
        },
        RenderMode::InPlace => {
            // Inline `<style>` blocks are still in the page; only the fetched
            // stylesheets need appending.
            let fetched = inlined_only(&collected);
            let head = (!fetched.is_empty()).then(|| format!("<style>\n{fetched}\n</style>"));
            let rewrite = Rewrite {
                base: url,
                embedded: &embedded,
                inlined: &collected.inlined,
                head_append: head.as_deref(),
                base_tag: true,
                theme: Some(options.theme),
            };
            page.document_html(&rewrite)
        },
    };
    tracing::debug!(removed, html_size = html.len(), "Prepared page for printing");
    Ok(Prepared { title, html, removed })
}

/// The part of [`CollectedCss::css`] that came from fetched stylesheets.
fn inlined_only(collected: &CollectedCss) -> String {
    collected.fetched.join("\n").replace("</style", "<\\/style")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::StaticSource;
    use docarchive_config::CleanupConfig;
    use rstest::rstest;

    const DOM: &str = r#"<!DOCTYPE html>
        <html class="light"><head>
          <title>Routing | Next.js</title>
          <style>.prose { color: #111 }</style>
          <link rel="stylesheet" href="/css/site.css">
          <script src="/app.js"></script>
        </head><body>
          <header>Header</header>
          <main>
            <article>
              <h1>Routing</h1>
              <img src="/img/diagram.png" loading="lazy">
              <div data-feedback-inline>Was this helpful?</div>
            </article>
          </main>
          <footer>Footer</footer>
        </body></html>"#;

    fn source() -> StaticSource {
        StaticSource(HashMap::from([
            ("https://nextjs.org/css/site.css".to_string(), (b"h1 { font: bold }".to_vec(), Some("text/css"))),
            ("https://nextjs.org/img/diagram.png".to_string(), (vec![0, 1, 2], Some("image/png"))),
        ]))
    }

    fn run(mode: RenderMode, inline_assets: bool, theme: Theme) -> Prepared {
        let cleaner = Cleaner::new(&CleanupConfig::default(), theme).unwrap();
        let url = Url::parse("https://nextjs.org/docs/app/routing").unwrap();
        prepare(DOM, &url, &cleaner, PrepareOptions { mode, inline_assets, theme }, &source()).unwrap()
    }

    #[test]
    fn extract_rebuilds_document_around_content() {
        let prepared = run(RenderMode::Extract, false, Theme::Dark);
        assert_eq!(prepared.title.as_deref(), Some("Routing | Next.js"));
        let html = &prepared.html;
        assert!(html.contains("<html class=\"dark\" data-theme=\"dark\">"));
        assert!(html.contains("<h1>Routing</h1>"));
        assert!(html.contains(".prose { color: #111 }"));
        assert!(html.contains("href=\"https://nextjs.org/css/site.css\""));
        assert!(html.contains("src=\"https://nextjs.org/img/diagram.png\""));
        for gone in ["Header", "Footer", "Was this helpful", "app.js", "<main>", "<article>"] {
            assert!(!html.contains(gone), "{gone} should not be in the output");
        }
    }

    #[test]
    fn extract_with_inlining_embeds_everything() {
        let html = run(RenderMode::Extract, true, Theme::Light).html;
        assert!(html.contains("h1 { font: bold }"));
        assert!(!html.contains("site.css"));
        assert!(html.contains("src=\"data:image/png;base64,AAEC\""));
    }

    #[test]
    fn in_place_keeps_page_and_applies_theme() {
        let html = run(RenderMode::InPlace, false, Theme::Dark).html;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("class=\"dark\" data-theme=\"dark\""));
        assert!(html.contains("<main>"));
        assert!(html.contains("href=\"https://nextjs.org/css/site.css\""));
        assert!(!html.contains("Header"));
        assert!(!html.contains("app.js"));
    }

    #[test]
    fn in_place_with_inlining_replaces_links() {
        let html = run(RenderMode::InPlace, true, Theme::Light).html;
        assert!(!html.contains("site.css"));
        assert!(html.contains("<style>\nh1 { font: bold }\n</style></head>"));
        // Existing inline styles aren't duplicated.
        assert_eq!(html.matches(".prose { color: #111 }").count(), 1);
    }

    #[rstest]
    #[case(RenderMode::Extract)]
    #[case(RenderMode::InPlace)]
    fn relative_css_urls_resolve_against_page(#[case] mode: RenderMode) {
        let dom = r#"<html><head>
              <style>@font-face { src: url(/_next/static/media/geist.woff2) }</style>
            </head><body><article>
              <div style="background-image: url(/img/x.png)">Hero</div>
            </article></body></html>"#;
        let cleaner = Cleaner::new(&CleanupConfig::default(), Theme::Dark).unwrap();
        let url = Url::parse("https://nextjs.org/docs/app/routing").unwrap();
        let options = PrepareOptions { mode, inline_assets: false, theme: Theme::Dark };
        let html = prepare(dom, &url, &cleaner, options, &source()).unwrap().html;
        let base = html.find("<base href=\"https://nextjs.org/docs/app/routing\">").expect("base element");
        assert!(base < html.find("url(/_next/static/media/geist.woff2)").unwrap());
        assert!(base < html.find("url(/img/x.png)").unwrap());
        assert_eq!(html.matches("<base").count(), 1);
    }

    #[test]
    fn missing_content_root_is_an_error() {
        let cleaner = Cleaner::new(&CleanupConfig::default(), Theme::Dark).unwrap();
        let url = Url::parse("https://nextjs.org/docs/empty").unwrap();
        let options = PrepareOptions { mode: RenderMode::Extract, inline_assets: false, theme: Theme::Dark };
        let err = prepare("<html><body><div>nothing</div></body></html>", &url, &cleaner, options, &source()).unwrap_err();
        assert_eq!(*err, ErrorKind::ContentNotFound(url.to_string()));
    }
}
