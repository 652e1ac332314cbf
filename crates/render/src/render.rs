use crate::error::{ErrorKind, Result};
use crate::options::RenderOptions;
use crate::setup::PageSetup;
use crate::{Renderer, TempFile};
use exn::ResultExt;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::instrument;

impl Renderer {
    /// Loads `url` in headless Chrome and returns the DOM once virtual time
    /// has settled, so client-rendered content is present.
    #[instrument(skip_all, fields(url = url))]
    pub fn dump_dom(&self, url: &str) -> Result<String> {
        let profile = tempfile::tempdir().or_raise(|| ErrorKind::Io)?;
        let args = dump_args(&self.options, &profile.path().display().to_string(), url);
        let stdout = self.chrome.execute(&args, self.options.timeout)?;
        let dom = String::from_utf8_lossy(&stdout).into_owned();
        if dom.trim().is_empty() {
            exn::bail!(ErrorKind::EmptyOutput);
        }
        tracing::debug!(bytes = dom.len(), "Captured rendered DOM");
        Ok(dom)
    }

    /// Prints `html` to a PDF at `save_to`, after injecting the page setup
    /// and configured stylesheets at the end of its `<head>`.
    #[instrument(skip_all, fields(save_to = tracing::field::Empty))]
    pub fn render_to<R: Read>(&self, html: R, save_to: impl Into<PathBuf>) -> Result<PathBuf> {
        let save_to = std::path::absolute(save_to.into()).or_raise(|| ErrorKind::Io)?;
        tracing::Span::current().record("save_to", tracing::field::display(save_to.display()));
        let input = self.persist_html(html)?;
        let profile = tempfile::tempdir().or_raise(|| ErrorKind::Io)?;
        let args = print_args(&self.options, &profile.path().display().to_string(), input.path(), &save_to);
        self.chrome.execute(&args, self.options.timeout)?;
        let written = std::fs::metadata(&save_to).map(|m| m.len()).unwrap_or(0);
        if written == 0 {
            exn::bail!(ErrorKind::EmptyOutput);
        }
        tracing::debug!(bytes = written, "PDF written");
        Ok(save_to)
    }

    pub fn render_slice_to(&self, html: &[u8], save_to: impl Into<PathBuf>) -> Result<PathBuf> {
        self.render_to(Cursor::new(html), save_to)
    }

    fn persist_html<R: Read>(&self, html: R) -> Result<TempFile> {
        // Chrome decides how to open a file:// URL from its extension.
        let mut tmp = tempfile::Builder::new().prefix("docarchive-").suffix(".html").tempfile().or_raise(|| ErrorKind::Io)?;
        let setup = PageSetup { paper: &self.options.paper, margin: &self.options.margin, theme: self.options.theme };
        let injected = inject_before_head(html, &mut tmp, |w| {
            writeln!(w, "{setup}")?;
            Ok(self.styles.write_all_to(w)? + 1)
        })?;
        match injected {
            Injected::InHead(blocks) => tracing::debug!(blocks, "Print styles injected into head"),
            Injected::AtEnd(blocks) => {
                tracing::warn!(blocks, "Closing head tag not found; print styles appended to the document");
            },
        }
        tmp.flush().or_raise(|| ErrorKind::Io)?;
        Ok(tmp)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Injected {
    InHead(usize),
    AtEnd(usize),
}

/// Streams `html` into `out`, calling `inject` just before the first
/// `</head` (case-insensitive) or at the very end when there is none.
pub(crate) fn inject_before_head<R, W, F>(mut html: R, out: &mut W, inject: F) -> Result<Injected>
where
    R: Read,
    W: Write,
    F: FnOnce(&mut W) -> std::io::Result<usize>,
{
    const NEEDLE: &[u8] = b"</head";
    const CARRY_SIZE: usize = NEEDLE.len() - 1;
    const BUFFER_CAPACITY: usize = 8192;
    const BUFFER_WINDOW: usize = BUFFER_CAPACITY - CARRY_SIZE;
    // Each read lands after the last CARRY_SIZE bytes of the previous one, so
    // a needle split across two reads is still found.
    let mut buffer = vec![0; BUFFER_CAPACITY];
    let mut carry: usize = 0;
    loop {
        let bytes = html.read(&mut buffer[carry..carry + BUFFER_WINDOW]).or_raise(|| ErrorKind::Io)?;
        if bytes == 0 {
            out.write_all(&buffer[..carry]).or_raise(|| ErrorKind::Io)?;
            let blocks = inject(out).or_raise(|| ErrorKind::Io)?;
            return Ok(Injected::AtEnd(blocks));
        }
        let filled = carry + bytes;
        if let Some(pos) = buffer[..filled].windows(NEEDLE.len()).position(|w| w.eq_ignore_ascii_case(NEEDLE)) {
            out.write_all(&buffer[..pos]).or_raise(|| ErrorKind::Io)?;
            let blocks = inject(out).or_raise(|| ErrorKind::Io)?;
            out.write_all(&buffer[pos..filled]).or_raise(|| ErrorKind::Io)?;
            std::io::copy(&mut html, out).or_raise(|| ErrorKind::Io)?;
            return Ok(Injected::InHead(blocks));
        }
        let safe = filled.saturating_sub(CARRY_SIZE);
        out.write_all(&buffer[..safe]).or_raise(|| ErrorKind::Io)?;
        buffer.copy_within(safe..filled, 0);
        carry = filled - safe;
    }
}

fn dump_args(options: &RenderOptions, profile: &str, url: &str) -> Vec<String> {
    let mut args = options.common_args(profile);
    args.push("--dump-dom".to_string());
    args.push(url.to_string());
    args
}

fn print_args(options: &RenderOptions, profile: &str, input: &Path, output: &Path) -> Vec<String> {
    let mut args = options.common_args(profile);
    args.extend([
        "--allow-file-access-from-files".to_string(),
        "--no-pdf-header-footer".to_string(),
        format!("--print-to-pdf={}", output.display()),
        format!("file://{}", input.display()),
    ]);
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use docarchive_config::{Theme, Window};
    use rstest::rstest;
    use std::time::Duration;

    fn options(theme: Theme) -> RenderOptions {
        RenderOptions {
            window: Window { width: 1280, height: 720 },
            user_agent: "Mozilla/5.0".to_string(),
            theme,
            settle: Duration::from_millis(1500),
            timeout: Duration::from_secs(10),
            paper: "A4".to_string(),
            margin: "1cm".to_string(),
            chrome: None,
        }
    }

    fn inject(html: &[u8]) -> (String, Injected) {
        let mut out = Vec::new();
        let injected = inject_before_head(html, &mut out, |w| {
            w.write_all(b"<style>x</style>")?;
            Ok(1)
        })
        .unwrap();
        (String::from_utf8(out).unwrap(), injected)
    }

    #[rstest]
    #[case("<html><head><title>t</title></head><body></body></html>")]
    #[case("<html><HEAD></HEAD><body></body></html>")]
    fn injects_before_closing_head(#[case] html: &str) {
        let (out, injected) = inject(html.as_bytes());
        assert_eq!(injected, Injected::InHead(1));
        assert!(out.to_ascii_lowercase().contains("<style>x</style></head>"), "{out}");
        assert_eq!(out.len(), html.len() + "<style>x</style>".len());
    }

    #[test]
    fn finds_needle_across_buffer_boundary() {
        // Place `</head` so it straddles the first read.
        let mut html = "a".repeat(8192 - 6 - 3);
        let prefix_len = html.len();
        html.push_str("</head><body>tail</body>");
        let (out, injected) = inject(html.as_bytes());
        assert_eq!(injected, Injected::InHead(1));
        assert_eq!(&out[prefix_len..prefix_len + 16], "<style>x</style>");
        assert!(out.ends_with("</head><body>tail</body>"));
    }

    #[test]
    fn appends_when_head_is_missing() {
        let (out, injected) = inject(b"<p>no head here</p>");
        assert_eq!(injected, Injected::AtEnd(1));
        assert_eq!(out, "<p>no head here</p><style>x</style>");
    }

    #[test]
    fn large_documents_are_copied_intact() {
        let mut html = String::from("<html><head></head><body>");
        html.push_str(&"<p>paragraph</p>".repeat(4096));
        html.push_str("</body></html>");
        let (out, _) = inject(html.as_bytes());
        assert_eq!(out.replace("<style>x</style>", ""), html);
    }

    #[test]
    fn dump_args_end_with_url() {
        let args = dump_args(&options(Theme::Light), "/tmp/profile", "https://nextjs.org/docs");
        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--window-size=1280,720".to_string()));
        assert!(args.contains(&"--virtual-time-budget=1500".to_string()));
        assert!(args.contains(&"--user-data-dir=/tmp/profile".to_string()));
        assert_eq!(&args[args.len() - 2..], ["--dump-dom", "https://nextjs.org/docs"]);
    }

    #[rstest]
    #[case(Theme::Dark, "--blink-settings=preferredColorScheme=0", true)]
    #[case(Theme::Light, "--blink-settings=preferredColorScheme=1", false)]
    fn theme_selects_color_scheme(#[case] theme: Theme, #[case] flag: &str, #[case] forced: bool) {
        let args = dump_args(&options(theme), "/tmp/p", "https://a.b/");
        assert!(args.contains(&flag.to_string()));
        assert_eq!(args.contains(&"--force-dark-mode".to_string()), forced);
    }

    #[test]
    fn print_args_target_local_file() {
        let args = print_args(
            &options(Theme::Dark),
            "/tmp/profile",
            Path::new("/tmp/docarchive-1.html"),
            Path::new("/out/app_01_routing.pdf"),
        );
        assert!(args.contains(&"--no-pdf-header-footer".to_string()));
        assert!(args.contains(&"--print-to-pdf=/out/app_01_routing.pdf".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("file:///tmp/docarchive-1.html"));
        assert!(!args.contains(&"--dump-dom".to_string()));
    }
}
