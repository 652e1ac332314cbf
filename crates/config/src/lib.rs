//! Layered configuration for docarchive.
//!
//! Sources are merged in order of increasing precedence:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. `config.{toml,yaml,yml,json}` in the platform configuration directory.
//! 3. An explicitly provided file (format chosen by extension).
//! 4. `DOCARCHIVE_*` environment variables, `__` separating nested keys
//!    (e.g. `DOCARCHIVE_RENDER__MODE=in-place`).
//! 5. The bare `LIMIT` and `THEME` environment variables.

pub mod error;
mod models;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use std::collections::HashSet;
use std::path::Path;
use tracing::instrument;

pub use crate::models::{
    CleanupConfig, Config, GroupConfig, OutputConfig, RenderConfig, RenderMode, SourceConfig, Theme, ThemeSelectors,
    Window,
};

const ENV_PREFIX: &str = "DOCARCHIVE_";
const USER_CONFIG_NAMES: [&str; 4] = ["config.toml", "config.yaml", "config.yml", "config.json"];

impl Config {
    /// Loads and validates configuration from every source.
    #[instrument(skip_all, fields(explicit = path.map(|p| p.display().to_string())))]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(dirs) = ProjectDirs::from("", "", "docarchive") {
            for name in USER_CONFIG_NAMES {
                let candidate = dirs.config_dir().join(name);
                if candidate.is_file() {
                    tracing::debug!(path = %candidate.display(), "Merging user configuration file");
                    figment = merge_file(figment, &candidate)?;
                }
            }
        }
        if let Some(path) = path {
            if !path.is_file() {
                exn::bail!(ErrorKind::Invalid(format!("configuration file not found: {}", path.display())));
            }
            figment = merge_file(figment, path)?;
        }
        let figment = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(Env::raw().only(&["LIMIT", "THEME"]));
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(groups = config.groups.len(), limit = config.limit, theme = %config.theme, "Configuration loaded");
        Ok(config)
    }

    /// Rejects configurations that would make a run pointless or ambiguous.
    pub fn validate(&self) -> Result<()> {
        if self.source.index_url.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("source.index_url is empty".to_string()));
        }
        if self.source.timeout_secs == 0 || self.render.page_timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("timeouts must be greater than zero".to_string()));
        }
        if self.groups.is_empty() {
            exn::bail!(ErrorKind::Invalid("at least one group is required".to_string()));
        }
        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.name.trim().is_empty() || group.prefix.trim().is_empty() {
                exn::bail!(ErrorKind::Invalid("groups need both a name and a prefix".to_string()));
            }
            if !seen.insert(group.name.as_str()) {
                exn::bail!(ErrorKind::Invalid(format!("duplicate group name: {}", group.name)));
            }
        }
        if self.output.template.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("output.template is empty".to_string()));
        }
        Ok(())
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default().to_ascii_lowercase();
    Ok(match extension.as_str() {
        "toml" => figment.merge(Toml::file(path)),
        "yaml" | "yml" => figment.merge(Yaml::file(path)),
        "json" => figment.merge(Json::file(path)),
        other => exn::bail!(ErrorKind::UnsupportedFormat(other.to_string())),
    })
}
