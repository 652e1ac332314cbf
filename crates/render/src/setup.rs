//! Page setup block injected ahead of the configured stylesheets.
//!
//! Headless print-to-PDF takes its paper size and margins from CSS `@page`,
//! and only prints backgrounds when `print-color-adjust` asks for it.

use docarchive_config::Theme;
use std::fmt::{Display, Formatter, Result as FmtResult};

pub(crate) struct PageSetup<'a> {
    pub paper: &'a str,
    pub margin: &'a str,
    pub theme: Theme,
}

impl Display for PageSetup<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let (background, scheme) = match self.theme {
            Theme::Dark => ("#000", "dark"),
            Theme::Light => ("#fff", "light"),
        };
        writeln!(f, "<style>")?;
        writeln!(f, "@page {{ size: {}; margin: {}; }}", css_value(self.paper), css_value(self.margin))?;
        writeln!(f, ":root {{ color-scheme: {scheme}; }}")?;
        writeln!(f, "html, body {{ background-color: {background}; }}")?;
        writeln!(f, "* {{ -webkit-print-color-adjust: exact !important; print-color-adjust: exact !important; }}")?;
        write!(f, "</style>")
    }
}

/// Strips characters that would let a configured value escape its declaration.
fn css_value(value: &str) -> String {
    value.chars().filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>' | '\\')).collect::<String>().trim().to_string()
}
