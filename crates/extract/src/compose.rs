//! Assembly of the clean, print-ready document.

use crate::serialize::{base_element, escape};
use docarchive_config::Theme;
use docarchive_discover::Url;
use std::fmt::Write;

/// The parts of a clean document.
pub struct Composition<'a> {
    /// The page URL; relative URLs left in `css` and `body` resolve against it.
    pub base: &'a Url,
    pub title: &'a str,
    pub css: &'a str,
    pub stylesheets: &'a [Url],
    pub body: &'a str,
    pub theme: Theme,
}

/// Builds a standalone HTML document around already-serialized body markup.
///
/// The `<html>` element carries the theme as both a class and `data-theme`,
/// the convention most documentation sites key their dark styles on.
pub fn compose(parts: &Composition) -> String {
    let theme = parts.theme.as_str();
    let mut out = String::with_capacity(parts.css.len() + parts.body.len() + 512);
    out.push_str("<!DOCTYPE html>\n");
    let _ = writeln!(out, "<html class=\"{theme}\" data-theme=\"{theme}\">");
    out.push_str("<head>\n");
    out.push_str(&base_element(parts.base));
    out.push_str("\n<meta charset=\"UTF-8\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape(parts.title));
    for link in parts.stylesheets {
        let href = link.as_str().replace('&', "&amp;").replace('"', "&quot;");
        let _ = writeln!(out, "<link rel=\"stylesheet\" href=\"{href}\">");
    }
    if !parts.css.trim().is_empty() {
        // A literal `</style` would end the block early.
        let _ = writeln!(out, "<style>\n{}\n</style>", parts.css.replace("</style", "<\\/style"));
    }
    out.push_str("</head>\n<body>\n");
    out.push_str(parts.body);
    out.push_str("\n</body>\n</html>\n");
    out
}
