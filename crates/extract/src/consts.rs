use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

selector!(HEAD_TITLE_SELECTOR, "head > title");
selector!(TITLE_SELECTOR, "title");
selector!(STYLE_SELECTOR, "style");
selector!(STYLESHEET_SELECTOR, "link[rel~=\"stylesheet\"][href]");
selector!(IMAGE_SELECTOR, "img");
// No backreferences in `regex`, so each quoting style gets its own group.
regex!(CSS_URL_REGEX, r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^)"'\s]*))\s*\)"#);

/// Elements without a closing tag.
pub(crate) const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "source", "track", "wbr",
];
/// Elements whose text children are emitted verbatim.
pub(crate) const RAW_TEXT_ELEMENTS: [&str; 6] = ["style", "script", "xmp", "iframe", "noembed", "noframes"];
/// Attributes holding a single URL.
pub(crate) const URL_ATTRIBUTES: [&str; 4] = ["href", "src", "poster", "data-src"];
