//! Stylesheets appended to every printed page.
//!
//! A style is named either `builtin:<file>` for one of the stylesheets
//! compiled into the binary, or a path to a CSS file on disk. Everything is
//! read when the [`StyleConfig`] is built so a bad entry fails the run up
//! front.

mod assets;

use crate::error::{ErrorKind, Result};
use crate::style::assets::{BUILTIN_PREFIX, PrintStyles};
use exn::ResultExt;
use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

struct Style {
    origin: String,
    content: Cow<'static, [u8]>,
}
impl Style {
    fn write_all_to(&self, w: &mut impl Write) -> std::io::Result<()> {
        w.write_all(b"<style>")?;
        w.write_all(&self.content)?;
        w.write_all(b"</style>\n")
    }
}

/// Ordered stylesheets; later entries override earlier ones.
///
/// ```no_run
/// use docarchive_render::StyleConfig;
/// # use docarchive_render::error::Result;
///
/// # fn styles() -> Result<StyleConfig> {
/// let styles = StyleConfig::new()
///     .with_builtin("print.css")?
///     .with_file("/path/to/overrides.css")?;
/// # Ok(styles)
/// # }
/// ```
#[derive(Default)]
pub struct StyleConfig {
    styles: Vec<Style>,
}
impl StyleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds from configured entries such as `builtin:print.css` or `./extra.css`.
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        entries.iter().try_fold(Self::new(), |styles, entry| {
            let entry = entry.as_ref().trim();
            match entry.strip_prefix(BUILTIN_PREFIX) {
                Some(name) => styles.with_builtin(name),
                None => styles.with_file(entry),
            }
        })
    }

    /// Appends one of the shipped print stylesheets, e.g. `print.css`.
    pub fn with_builtin(mut self, name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        let content = PrintStyles::css(name)?;
        self.styles.push(Style { origin: PrintStyles::entry(name), content });
        Ok(self)
    }

    /// Appends a stylesheet read from disk.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            exn::bail!(ErrorKind::AssetNotFound(path.display().to_string()));
        }
        let content = std::fs::read(path).or_raise(|| ErrorKind::Io)?;
        self.styles.push(Style { origin: path.display().to_string(), content: Cow::Owned(content) });
        Ok(self)
    }

    #[cfg(test)]
    pub(crate) fn with_content(mut self, content: impl Into<String>) -> Self {
        self.styles.push(Style { origin: "inline".to_string(), content: Cow::Owned(content.into().into_bytes()) });
        self
    }

    /// Where each stylesheet came from, in application order.
    pub(crate) fn origins(&self) -> impl Iterator<Item = &str> {
        self.styles.iter().map(|s| s.origin.as_str())
    }

    pub(crate) fn write_all_to(&self, w: &mut impl Write) -> std::io::Result<usize> {
        for style in &self.styles {
            style.write_all_to(w)?;
        }
        Ok(self.styles.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_builtin_and_file_entries() {
        let mut file = tempfile::Builder::new().suffix(".css").tempfile().unwrap();
        file.write_all(b"body { color: red }").unwrap();
        let path = file.path().display().to_string();
        let styles = StyleConfig::from_entries(&["builtin:print.css".to_string(), path.clone()]).unwrap();
        let origins: Vec<&str> = styles.origins().collect();
        assert_eq!(origins, vec!["builtin:print.css", path.as_str()]);
    }

    #[test]
    fn unknown_builtin_is_rejected() {
        let err = StyleConfig::from_entries(&["builtin:nope.css"]).err().unwrap();
        assert_eq!(*err, ErrorKind::AssetNotFound("builtin:nope.css".to_string()));
    }

    #[test]
    fn missing_file_is_rejected() {
        let err = StyleConfig::new().with_file("/no/such/style.css").err().unwrap();
        assert_eq!(*err, ErrorKind::AssetNotFound("/no/such/style.css".to_string()));
    }

    #[test]
    fn writes_one_block_per_style() {
        let styles = StyleConfig::new().with_content("a{}").with_content("b{}");
        let mut out = Vec::new();
        assert_eq!(styles.write_all_to(&mut out).unwrap(), 2);
        assert_eq!(String::from_utf8(out).unwrap(), "<style>a{}</style>\n<style>b{}</style>\n");
    }

    #[test]
    fn builtin_origins_carry_the_prefix() {
        let styles = StyleConfig::new().with_builtin("code-wrap.css").unwrap();
        assert_eq!(styles.origins().collect::<Vec<_>>(), vec!["builtin:code-wrap.css"]);
    }
}
