//! The end-to-end archive run.

use crate::error::{ErrorKind, Result};
use crate::naming::FileNamer;
use docarchive_config::Config;
use docarchive_discover::{Fetcher, Group, Url, discover};
use docarchive_extract::{Cleaner, PrepareOptions, prepare};
use docarchive_merge::{MergeStats, Part, merge};
use docarchive_render::{RenderOptions, Renderer, StyleConfig};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::instrument;

/// What a run produced.
#[derive(Debug, Default)]
pub struct Summary {
    pub attempted: usize,
    pub rendered: usize,
    /// The merged archive, absent when no page rendered.
    pub archive: Option<PathBuf>,
    pub merged: MergeStats,
}

struct Archiver<'a> {
    config: &'a Config,
    fetcher: Fetcher,
    cleaner: Cleaner,
    renderer: Renderer,
    namer: FileNamer,
}

/// Discovers, renders and merges every configured page.
///
/// A page that fails at any step is logged and left out; the run as a whole
/// only fails on setup errors or a failed merge.
#[instrument(skip_all, fields(theme = %config.theme, mode = ?config.render.mode))]
pub fn archive(config: &Config) -> Result<Summary> {
    let fetcher = Fetcher::new(&config.source).map_err(ErrorKind::discover)?;
    let groups = discover(&fetcher, config).map_err(ErrorKind::discover)?;
    if groups.is_empty() {
        tracing::warn!(index = %config.source.index_url, "No documentation pages discovered");
        return Ok(Summary::default());
    }
    let cleaner = Cleaner::new(&config.cleanup, config.theme).or_raise(|| ErrorKind::Config)?;
    let styles = StyleConfig::from_entries(&config.render.styles).or_raise(|| ErrorKind::Config)?;
    let renderer = Renderer::new(RenderOptions::from(config), styles).map_err(ErrorKind::render)?;
    let namer: FileNamer = config.output.template.parse()?;
    let directory = &config.output.directory;
    std::fs::create_dir_all(directory).or_raise(|| ErrorKind::Io(directory.display().to_string()))?;

    let archiver = Archiver { config, fetcher, cleaner, renderer, namer };
    let total = groups.total();
    let mut summary = Summary::default();
    let mut parts = Vec::new();
    tracing::info!(total, directory = %directory.display(), "Archiving documentation pages");
    for group in groups.iter() {
        for (offset, url) in group.links.iter().enumerate() {
            summary.attempted += 1;
            let started = Instant::now();
            match archiver.page(group, offset + 1, url) {
                Ok(part) => {
                    tracing::info!(
                        progress = %format_args!("({}/{total})", summary.attempted),
                        title = %part.title,
                        elapsed = ?started.elapsed(),
                        "Rendered page"
                    );
                    parts.push(part);
                },
                Err(e) => tracing::warn!(
                    progress = %format_args!("({}/{total})", summary.attempted),
                    url = %url,
                    retryable = e.is_retryable(),
                    error = ?e,
                    "Failed to render page; skipping"
                ),
            }
        }
    }
    summary.rendered = parts.len();

    if parts.is_empty() {
        tracing::warn!(attempted = summary.attempted, "No pages rendered; nothing to merge");
        return Ok(summary);
    }
    let output = &config.output.file;
    summary.merged = merge(&parts, output).or_raise(|| ErrorKind::Merge)?;
    summary.archive = Some(output.clone());
    if !config.output.keep_pages {
        remove_pages(&parts);
    }
    Ok(summary)
}

impl Archiver<'_> {
    #[instrument(skip_all, fields(group = %group.name, index, url = %url))]
    fn page(&self, group: &Group, index: usize, url: &Url) -> Result<Part> {
        let dom = self.renderer.dump_dom(url.as_str()).map_err(ErrorKind::render)?;
        let options = PrepareOptions {
            mode: self.config.render.mode,
            inline_assets: self.config.render.inline_assets,
            theme: self.config.theme,
        };
        let prepared = prepare(&dom, url, &self.cleaner, options, &self.fetcher)
            .or_raise(|| ErrorKind::Prepare(url.to_string()))?;
        tracing::info!(removed = prepared.removed, "Removed page chrome");
        let stem = self.namer.name(&group.name, index, prepared.title.as_deref())?;
        let path = self.config.output.directory.join(format!("{stem}.pdf"));
        let path = self.renderer.render_slice_to(prepared.html.as_bytes(), path).map_err(ErrorKind::render)?;
        Ok(Part::new(path, outline_title(prepared.title.as_deref(), &group.name, index)))
    }
}

/// The outline entry for a page: its title, or its position when untitled.
pub(crate) fn outline_title(title: Option<&str>, group: &str, index: usize) -> String {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(title) => title.to_string(),
        None => format!("{group} {index:02}"),
    }
}

/// Merges existing PDFs, titling each outline entry after its file name.
pub fn merge_files(files: &[PathBuf], output: &Path) -> Result<MergeStats> {
    let parts: Vec<Part> = files
        .iter()
        .map(|path| {
            let title = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            Part::new(path, title)
        })
        .collect();
    merge(&parts, output).or_raise(|| ErrorKind::Merge)
}

fn remove_pages(parts: &[Part]) {
    for part in parts {
        if let Err(e) = std::fs::remove_file(&part.path) {
            tracing::warn!(pdf = %part.path.display(), error = %e, "Failed to remove intermediate PDF");
        }
    }
    tracing::debug!(removed = parts.len(), "Removed intermediate PDFs");
}
