mod error;
mod naming;
mod pipeline;

use crate::error::{ErrorKind, Result};
use clap::{ArgAction, Parser, Subcommand};
use docarchive_config::{Config, Theme};
use docarchive_discover::{Fetcher, Groups, discover};
use exn::ResultExt;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Archive a documentation site into a single merged PDF.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every discovered page and merge them into one PDF.
    Archive {
        /// Pages per group; 0 archives everything.
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(short, long, value_parser = parse_theme)]
        theme: Option<Theme>,
        /// Path of the merged archive.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Keep the per-page PDFs after merging.
        #[arg(long, overrides_with = "no_keep_pages")]
        keep_pages: bool,
        #[arg(long, overrides_with = "keep_pages")]
        no_keep_pages: bool,
    },
    /// Print the pages that would be archived, per group.
    Links {
        #[arg(short, long)]
        limit: Option<usize>,
        /// Print a JSON object of group name to URLs instead.
        #[arg(long)]
        json: bool,
    },
    /// Merge existing PDFs, in the given order.
    Merge {
        #[arg(short, long)]
        output: PathBuf,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn parse_theme(value: &str) -> std::result::Result<Theme, String> {
    Theme::try_from(value.to_string()).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "{}", *e);
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Command::Archive { limit, theme, output, keep_pages, no_keep_pages } => {
            if let Some(limit) = limit {
                config.limit = limit;
            }
            if let Some(theme) = theme {
                config.theme = theme;
            }
            if let Some(output) = output {
                config.output.file = output;
            }
            if keep_pages {
                config.output.keep_pages = true;
            } else if no_keep_pages {
                config.output.keep_pages = false;
            }
            let summary = pipeline::archive(&config)?;
            match &summary.archive {
                Some(archive) => tracing::info!(
                    archive = %archive.display(),
                    rendered = summary.rendered,
                    attempted = summary.attempted,
                    pages = summary.merged.pages,
                    "Archive complete"
                ),
                None => tracing::warn!(attempted = summary.attempted, "No archive written"),
            }
        },
        Command::Links { limit, json } => {
            if let Some(limit) = limit {
                config.limit = limit;
            }
            let fetcher = Fetcher::new(&config.source).map_err(ErrorKind::discover)?;
            let groups = discover(&fetcher, &config).map_err(ErrorKind::discover)?;
            if json {
                println!("{}", links_json(&groups));
                return Ok(());
            }
            for group in groups.iter() {
                println!("{} ({})", group.name, group.links.len());
                for (offset, url) in group.links.iter().enumerate() {
                    println!("  {:>3}. {url}", offset + 1);
                }
            }
        },
        Command::Merge { output, files } => {
            let stats = pipeline::merge_files(&files, &output)?;
            tracing::info!(output = %output.display(), documents = stats.documents, pages = stats.pages, "Merged PDFs");
        },
    }
    Ok(())
}

fn links_json(groups: &Groups) -> serde_json::Value {
    let groups = groups
        .iter()
        .map(|group| (group.name.clone(), group.links.iter().map(|url| serde_json::Value::from(url.as_str())).collect()))
        .collect::<serde_json::Map<_, _>>();
    serde_json::Value::Object(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use docarchive_config::GroupConfig;
    use docarchive_discover::{Url, extract_links};

    #[test]
    fn links_render_as_json() {
        let base = Url::parse("https://nextjs.org/docs").unwrap();
        let html = r#"<a href="/docs/app/routing">R</a><a href="/docs/pages/api">A</a>"#;
        let groups = extract_links(html, &base, &[GroupConfig::new("App", "/docs/app"), GroupConfig::new("Pages", "/docs/pages")]);
        assert_eq!(
            links_json(&groups),
            serde_json::json!({
                "App": ["https://nextjs.org/docs/app/routing"],
                "Pages": ["https://nextjs.org/docs/pages/api"],
            })
        );
    }

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_archive_overrides() {
        let cli = Cli::try_parse_from(["docarchive", "-vv", "archive", "--limit", "0", "--theme", "light", "--no-keep-pages"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Archive { limit, theme, keep_pages, no_keep_pages, .. } => {
                assert_eq!(limit, Some(0));
                assert_eq!(theme, Some(Theme::Light));
                assert!(!keep_pages);
                assert!(no_keep_pages);
            },
            _ => panic!("expected archive"),
        }
    }

    #[test]
    fn rejects_unknown_theme() {
        assert!(Cli::try_parse_from(["docarchive", "archive", "--theme", "sepia"]).is_err());
    }

    #[test]
    fn merge_requires_files() {
        assert!(Cli::try_parse_from(["docarchive", "merge", "-o", "out.pdf"]).is_err());
        let cli = Cli::try_parse_from(["docarchive", "merge", "-o", "out.pdf", "a.pdf", "b.pdf"]).unwrap();
        assert!(matches!(cli.command, Command::Merge { files, .. } if files.len() == 2));
    }
}
