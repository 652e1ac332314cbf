//! Browser and print settings for a render run.

use docarchive_config::{Config, Theme, Window};
use std::path::PathBuf;
use std::time::Duration;

/// Everything Chrome needs to know about a run, independent of the page.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub window: Window,
    pub user_agent: String,
    pub theme: Theme,
    /// Virtual time granted to the page before its DOM is captured or printed.
    pub settle: Duration,
    /// Wall-clock limit for a single Chrome invocation.
    pub timeout: Duration,
    pub paper: String,
    pub margin: String,
    pub chrome: Option<PathBuf>,
}
impl From<&Config> for RenderOptions {
    fn from(config: &Config) -> Self {
        Self {
            window: config.render.window,
            user_agent: config.source.user_agent.clone(),
            theme: config.theme,
            settle: config.render.settle(),
            timeout: config.render.page_timeout(),
            paper: config.render.paper.clone(),
            margin: config.render.margin.clone(),
            chrome: config.render.chrome.clone(),
        }
    }
}
impl RenderOptions {
    /// Flags shared by every invocation; `profile` is a throwaway user-data directory.
    pub(crate) fn common_args(&self, profile: &str) -> Vec<String> {
        let mut args = vec![
            "--headless=new".to_string(),
            "--disable-gpu".to_string(),
            "--hide-scrollbars".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-extensions".to_string(),
            "--mute-audio".to_string(),
            "--run-all-compositor-stages-before-draw".to_string(),
            format!("--user-data-dir={profile}"),
            format!("--window-size={},{}", self.window.width, self.window.height),
            format!("--user-agent={}", self.user_agent),
            format!("--virtual-time-budget={}", self.settle.as_millis()),
        ];
        // Blink's preferred colour scheme: 0 = dark, 1 = light.
        match self.theme {
            Theme::Dark => {
                args.push("--force-dark-mode".to_string());
                args.push("--blink-settings=preferredColorScheme=0".to_string());
            },
            Theme::Light => args.push("--blink-settings=preferredColorScheme=1".to_string()),
        }
        args
    }
}
