//! The print stylesheets shipped with docarchive.
//!
//! `print.css` hides site navigation and chrome, `pagination.css` keeps
//! headings and code blocks off page breaks, and `code-wrap.css` wraps long
//! lines in `<pre>` blocks so they are not clipped at the page edge. They are
//! referenced from configuration as `builtin:<file>`.

use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use rust_embed::Embed;
use std::borrow::Cow;

pub(crate) const BUILTIN_PREFIX: &str = "builtin:";

#[derive(Embed)]
#[folder = "../../assets/styles/"]
pub(crate) struct PrintStyles;
impl PrintStyles {
    /// CSS for `name`, with or without the `builtin:` prefix.
    pub(crate) fn css(name: &str) -> Result<Cow<'static, [u8]>> {
        let file = Self::file_name(name);
        Self::get(file).map(|f| f.data).ok_or_raise(|| ErrorKind::AssetNotFound(Self::entry(name)))
    }

    /// File names of the shipped stylesheets, sorted.
    #[cfg(test)]
    pub(crate) fn names() -> Vec<Cow<'static, str>> {
        let mut names: Vec<_> = Self::iter().filter(|f| f.ends_with(".css")).collect();
        names.sort();
        names
    }

    /// The configuration entry naming `name`, e.g. `builtin:print.css`.
    pub(crate) fn entry(name: &str) -> String {
        format!("{BUILTIN_PREFIX}{}", Self::file_name(name))
    }

    fn file_name(name: &str) -> &str {
        let name = name.trim();
        name.strip_prefix(BUILTIN_PREFIX).unwrap_or(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_style_hides_navigation() {
        let css = PrintStyles::css("builtin:print.css").unwrap();
        assert!(String::from_utf8_lossy(&css).contains("display: none"));
    }

    #[test]
    fn ships_every_print_style() {
        assert_eq!(PrintStyles::names(), vec!["code-wrap.css", "pagination.css", "print.css"]);
    }

    #[test]
    fn entry_names_are_prefixed_once() {
        assert_eq!(PrintStyles::entry(" builtin:print.css"), "builtin:print.css");
        assert_eq!(PrintStyles::entry("pagination.css"), "builtin:pagination.css");
    }

    #[test]
    fn unknown_style_reports_its_entry() {
        let err = PrintStyles::css("missing.css").unwrap_err();
        assert_eq!(*err, ErrorKind::AssetNotFound("builtin:missing.css".to_string()));
    }
}
