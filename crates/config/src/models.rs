//! Configuration data types and their defaults.

use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Top-level configuration for a single archive run.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub groups: Vec<GroupConfig>,
    /// Maximum links rendered per group; `0` disables the limit.
    pub limit: usize,
    pub theme: Theme,
    pub cleanup: CleanupConfig,
    pub render: RenderConfig,
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            groups: GroupConfig::defaults(),
            limit: 2,
            theme: Theme::default(),
            cleanup: CleanupConfig::default(),
            render: RenderConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Where the documentation index lives and how to request it.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    pub index_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}
impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            index_url: "https://nextjs.org/docs".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: 15,
        }
    }
}
impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// A labelled set of links, selected by href path prefix.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct GroupConfig {
    pub name: String,
    pub prefix: String,
}
impl GroupConfig {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self { name: name.into(), prefix: prefix.into() }
    }

    pub(crate) fn defaults() -> Vec<Self> {
        vec![Self::new("AppRouter", "/docs/app"), Self::new("PagesRouter", "/docs/pages")]
    }
}

/// Colour scheme requested from the browser and applied to the printed page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}
impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Self::Dark)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}
impl FromStr for Theme {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::parse(s) {
            Some(theme) => Ok(theme),
            None => exn::bail!(ErrorKind::Invalid(format!("unknown theme: {}", s.trim()))),
        }
    }
}
// Serde needs a `Display`-able error; the bare kind is enough there.
impl TryFrom<String> for Theme {
    type Error = ErrorKind;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| ErrorKind::Invalid(format!("unknown theme: {}", value.trim())))
    }
}
impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        theme.as_str().to_string()
    }
}
impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Which parts of a rendered page survive into the PDF.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Candidate content roots, first match wins.
    pub content: Vec<String>,
    /// Elements removed from every page.
    pub remove: Vec<String>,
    /// Phrases; the innermost element containing one is removed.
    pub remove_containing_text: Vec<String>,
    /// Elements removed only while the matching theme is active.
    pub theme_remove: ThemeSelectors,
}
impl Default for CleanupConfig {
    fn default() -> Self {
        fn strings(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }
        Self {
            content: strings(&["article", "main"]),
            remove: strings(&[
                "header",
                "footer",
                "aside",
                "nav",
                "[data-feedback-inline]",
                ".not-prose",
                "button[role=\"combobox\"]",
                "script",
                "noscript",
            ]),
            remove_containing_text: strings(&["Was this helpful"]),
            theme_remove: ThemeSelectors {
                light: strings(&["img[class*=\"dark-theme:block\"]"]),
                dark: strings(&["img[class*=\"dark-theme:hidden\"]"]),
            },
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemeSelectors {
    pub light: Vec<String>,
    pub dark: Vec<String>,
}
impl ThemeSelectors {
    pub fn for_theme(&self, theme: Theme) -> &[String] {
        match theme {
            Theme::Light => &self.light,
            Theme::Dark => &self.dark,
        }
    }
}

/// How the cleaned page is turned into a PDF.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Rebuild a minimal document from the content root and collected CSS.
    #[default]
    Extract,
    /// Keep the whole page, minus removed elements, and inject print CSS.
    InPlace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Window {
    pub width: u32,
    pub height: u32,
}
impl Default for Window {
    fn default() -> Self {
        Self { width: 2560, height: 1440 }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub mode: RenderMode,
    /// Fetch stylesheets and images and embed them in the document.
    pub inline_assets: bool,
    pub window: Window,
    pub page_timeout_secs: u64,
    /// Virtual time Chrome lets the page run before it is captured.
    pub settle_millis: u64,
    /// CSS `@page` size, e.g. `A4` or `letter`.
    pub paper: String,
    /// CSS `@page` margin shorthand.
    pub margin: String,
    /// Explicit Chrome/Chromium binary; discovered on `PATH` when unset.
    pub chrome: Option<PathBuf>,
    /// Stylesheets injected into every page: `builtin:<name>` or a file path.
    pub styles: Vec<String>,
}
impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::default(),
            inline_assets: false,
            window: Window::default(),
            page_timeout_secs: 25,
            settle_millis: 5000,
            paper: "A4".to_string(),
            margin: "1cm".to_string(),
            chrome: None,
            styles: vec!["builtin:print.css".to_string(), "builtin:pagination.css".to_string()],
        }
    }
}
impl RenderConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding the per-page PDFs.
    pub directory: PathBuf,
    /// The merged archive.
    pub file: PathBuf,
    /// Per-page filename template, without extension.
    pub template: String,
    /// Keep per-page PDFs after a successful merge.
    pub keep_pages: bool,
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("pdfs"),
            file: PathBuf::from("NextJS_Docs_Archive.pdf"),
            template: "{{ group }}_{{ index|pad }}_{{ title|slug }}".to_string(),
            keep_pages: true,
        }
    }
}
