//! File names for the per-page PDFs.
//!
//! Names come from an [upon] template with `group`, `index` and `title` in
//! scope, plus two formatters:
//!
//! - **`slug`**: lowercase, hyphen-separated ASCII (quotation marks dropped).
//! - **`pad`**: integers zero-padded to two digits.
//!
//! A page without a usable title falls back to `{group}_{index:02}`.

use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use std::str::FromStr;
use upon::{Engine, Template};

pub struct FileNamer {
    engine: Engine<'static>,
    template: Template<'static>,
}
impl FromStr for FileNamer {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let template = engine.compile(s.trim().to_string()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template })
    }
}
impl FileNamer {
    /// The file stem (no extension) for page `index` (1-based) of `group`.
    pub fn name(&self, group: &str, index: usize, title: Option<&str>) -> Result<String> {
        let title = title.unwrap_or_default();
        if addons::slug(title).is_empty() {
            return Ok(fallback(group, index));
        }
        let rendered = self
            .template
            .render(&self.engine, upon::value! { group: group, index: index as u64, title: title })
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        let name = sanitize(&rendered);
        Ok(if name.is_empty() { fallback(group, index) } else { name })
    }
}

fn fallback(group: &str, index: usize) -> String {
    format!("{}_{index:02}", sanitize(group))
}

/// Keeps the name a single path component.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') || c.is_control() { '-' } else { c })
        .collect::<String>()
        .trim()
        .trim_start_matches('.')
        .to_string()
}

mod addons {
    use rslug::slugify;
    use std::fmt::Write;
    use upon::{Engine, Value, fmt as upon_fmt};

    const QUOTATION_MARKS: [char; 13] = [
        '\u{0027}', '\u{0022}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201B}', '\u{0060}',
        '\u{00AB}', '\u{00BB}', '\u{2039}', '\u{203A}',
    ];

    pub(super) fn slug(s: &str) -> String {
        let stripped: String = s.chars().filter(|c| !QUOTATION_MARKS.contains(c)).collect();
        slugify!(&stripped)
    }

    fn slug_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::String(s) => write!(f, "{}", slug(s))?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    fn pad_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::Integer(n) => write!(f, "{n:02}")?,
            v => upon_fmt::default(f, v)?,
        };
        Ok(())
    }

    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.add_formatter("slug", slug_formatter);
        engine.add_formatter("pad", pad_formatter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const DEFAULT_TEMPLATE: &str = "{{ group }}_{{ index|pad }}_{{ title|slug }}";

    fn namer(template: &str) -> FileNamer {
        template.parse().unwrap()
    }

    #[rstest]
    #[case(1, "Routing: Defining Routes | Next.js", "AppRouter_01_routing-defining-routes-next-js")]
    #[case(12, "Caching in Next.js", "AppRouter_12_caching-in-next-js")]
    #[case(100, "Fonts", "AppRouter_100_fonts")]
    fn default_template(#[case] index: usize, #[case] title: &str, #[case] expected: &str) {
        assert_eq!(namer(DEFAULT_TEMPLATE).name("AppRouter", index, Some(title)).unwrap(), expected);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("  ?!  "))]
    fn missing_title_falls_back(#[case] title: Option<&str>) {
        assert_eq!(namer(DEFAULT_TEMPLATE).name("PagesRouter", 3, title).unwrap(), "PagesRouter_03");
    }

    #[test]
    fn slug_strips_quotes() {
        let name = namer("{{ title|slug }}").name("G", 1, Some("\"Hello\" World's 'Test'")).unwrap();
        assert_eq!(name, "hello-worlds-test");
    }

    #[test]
    fn names_stay_single_components() {
        let name = namer("{{ group }}/{{ title }}").name("../App", 1, Some("A/B")).unwrap();
        assert!(!name.contains('/'));
        assert!(!name.starts_with('.'));
    }

    #[test]
    fn invalid_template_is_rejected() {
        let err = "{{ title|slug".parse::<FileNamer>().err().unwrap();
        assert_eq!(*err, ErrorKind::Template);
    }
}
