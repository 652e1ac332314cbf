//! HTML serialization with attribute rewriting.
//!
//! `scraper` only exposes read access to element attributes, so instead of
//! mutating the tree the rewrites happen while the tree is written back out:
//! URLs become absolute, lazy images get a real `src`, embedded images swap
//! in their `data:` URI, and the `<html>` element can carry theme attributes.

use crate::consts::{RAW_TEXT_ELEMENTS, URL_ATTRIBUTES, VOID_ELEMENTS};
use docarchive_config::Theme;
use docarchive_discover::Url;
use ego_tree::NodeRef;
use scraper::node::{Element, Node};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

/// Rules applied to each element while serializing.
pub struct Rewrite<'a> {
    pub(crate) base: &'a Url,
    /// Absolute image URL to `data:` URI.
    pub(crate) embedded: &'a HashMap<String, String>,
    /// Stylesheet links whose CSS has been inlined and should be dropped.
    pub(crate) inlined: &'a HashSet<String>,
    /// Markup appended to the end of `<head>`.
    pub(crate) head_append: Option<&'a str>,
    /// Opens `<head>` with `<base href>` pointing at the page, replacing any
    /// existing `<base>`, so URLs inside CSS resolve against the site once
    /// the document is loaded from disk.
    pub(crate) base_tag: bool,
    pub(crate) theme: Option<Theme>,
}

/// Resolves `value` against `base`, leaving fragments, `data:` and script
/// URLs untouched.
pub(crate) fn absolute(base: &Url, value: &str) -> Option<Url> {
    let value = value.trim();
    if value.is_empty() || value.starts_with('#') || value.starts_with("data:") || value.starts_with("javascript:") {
        return None;
    }
    base.join(value).ok()
}

/// The URL an image will actually display once lazy-loading is resolved.
///
/// A real `src` wins. Otherwise (missing or a `data:` placeholder) `data-src`
/// is used, then the first `srcset` candidate.
pub(crate) fn effective_image_src(element: &Element) -> Option<&str> {
    let src = element.attr("src").map(str::trim).filter(|s| !s.is_empty());
    match src {
        Some(src) if !src.starts_with("data:") => Some(src),
        _ => element
            .attr("data-src")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or_else(|| element.attr("srcset").and_then(first_srcset_candidate))
            .or(src),
    }
}

fn first_srcset_candidate(srcset: &str) -> Option<&str> {
    srcset.split(',').next()?.split_whitespace().next()
}

/// Absolutizes every candidate URL of a `srcset`, keeping descriptors.
fn absolute_srcset(base: &Url, srcset: &str) -> String {
    srcset
        .split(',')
        .filter_map(|candidate| {
            let mut parts = candidate.split_whitespace();
            let url = parts.next()?;
            let url = absolute(base, url).map(|u| u.to_string()).unwrap_or_else(|| url.to_string());
            Some(match parts.next() {
                Some(descriptor) => format!("{url} {descriptor}"),
                None => url,
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl Rewrite<'_> {
    fn attributes<'e>(&self, element: &'e Element) -> Vec<(&'e str, Cow<'e, str>)> {
        let name = element.name();
        let mut attributes: Vec<(&str, Cow<str>)> = Vec::new();
        if name == "img" {
            let src = effective_image_src(element);
            let resolved = src.and_then(|s| absolute(self.base, s));
            let embedded = resolved.as_ref().and_then(|u| self.embedded.get(u.as_str()));
            for (key, value) in element.attrs() {
                match key {
                    "loading" | "data-src" => continue,
                    "src" => continue,
                    "srcset" | "sizes" if embedded.is_some() => continue,
                    "srcset" => attributes.push((key, Cow::Owned(absolute_srcset(self.base, value)))),
                    _ => attributes.push((key, Cow::Borrowed(value))),
                }
            }
            let src = match (embedded, resolved, src) {
                (Some(data), _, _) => Some(Cow::Owned(data.clone())),
                (None, Some(url), _) => Some(Cow::Owned(url.to_string())),
                (None, None, Some(src)) => Some(Cow::Borrowed(src)),
                (None, None, None) => None,
            };
            if let Some(src) = src {
                attributes.insert(0, ("src", src));
            }
            return attributes;
        }
        for (key, value) in element.attrs() {
            if name == "html" && self.theme.is_some() && matches!(key, "class" | "data-theme") {
                continue;
            }
            let value = if URL_ATTRIBUTES.contains(&key) {
                absolute(self.base, value).map_or(Cow::Borrowed(value), |u| Cow::Owned(u.to_string()))
            } else if key == "srcset" {
                Cow::Owned(absolute_srcset(self.base, value))
            } else {
                Cow::Borrowed(value)
            };
            attributes.push((key, value));
        }
        if name == "html"
            && let Some(theme) = self.theme
        {
            let mut classes: Vec<&str> =
                element.classes().filter(|c| !matches!(*c, "dark" | "light")).collect::<Vec<_>>();
            classes.push(theme.as_str());
            attributes.push(("class", Cow::Owned(classes.join(" "))));
            attributes.push(("data-theme", Cow::Borrowed(theme.as_str())));
        }
        attributes
    }

    fn skipped(&self, element: &Element) -> bool {
        if self.base_tag && element.name() == "base" {
            return true;
        }
        element.name() == "link"
            && element
                .attr("href")
                .and_then(|href| absolute(self.base, href))
                .is_some_and(|url| self.inlined.contains(url.as_str()))
    }

    /// Serializes `node` itself (outer HTML).
    pub(crate) fn node(&self, node: NodeRef<'_, Node>, out: &mut String) {
        match node.value() {
            Node::Document | Node::Fragment => self.children(node, out),
            Node::Doctype(doctype) => {
                let _ = write!(out, "<!DOCTYPE {}>", doctype.name());
            },
            Node::Text(text) => {
                let raw = node
                    .parent()
                    .and_then(|p| p.value().as_element().map(|e| RAW_TEXT_ELEMENTS.contains(&e.name())))
                    .unwrap_or(false);
                if raw { out.push_str(text) } else { escape_text(text, out) }
            },
            Node::Element(element) => {
                if self.skipped(element) {
                    return;
                }
                let name = element.name();
                out.push('<');
                out.push_str(name);
                for (key, value) in self.attributes(element) {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    escape_attribute(&value, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&name) {
                    return;
                }
                if name == "head" && self.base_tag {
                    out.push_str(&base_element(self.base));
                }
                self.children(node, out);
                if name == "head"
                    && let Some(extra) = self.head_append
                {
                    out.push_str(extra);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            },
            // Comments and processing instructions don't survive into print.
            _ => {},
        }
    }

    /// Serializes the children of `node` (inner HTML).
    pub(crate) fn children(&self, node: NodeRef<'_, Node>, out: &mut String) {
        for child in node.children() {
            self.node(child, out);
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

/// `<base href>` for `url`.
pub(crate) fn base_element(url: &Url) -> String {
    let mut out = String::from("<base href=\"");
    escape_attribute(url.as_str(), &mut out);
    out.push_str("\">");
    out
}

/// Escapes text for use inside an element such as `<title>`.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_text(text, &mut out);
    out
}
