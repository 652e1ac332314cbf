//! Headless Chrome capture and print-to-PDF.

mod chrome;
pub mod error;
mod options;
mod render;
mod setup;
mod style;

use crate::chrome::Chrome;
use crate::error::Result;
pub use crate::options::RenderOptions;
pub use crate::style::StyleConfig;

pub type TempFile = tempfile::NamedTempFile;

pub struct Renderer {
    chrome: Chrome,
    styles: StyleConfig,
    options: RenderOptions,
}
impl Renderer {
    /// Locates Chrome (the configured binary, else the first one found) and
    /// prepares to render with `styles`.
    pub fn new(options: RenderOptions, styles: StyleConfig) -> Result<Self> {
        let chrome = match &options.chrome {
            Some(path) => Chrome::at(path)?,
            None => Chrome::discover()?,
        };
        tracing::info!(chrome = ?chrome, styles = ?styles.origins().collect::<Vec<_>>(), "Using Chrome");
        Ok(Self { chrome, styles, options })
    }
}
