use derive_more::{Display, Error};
use docarchive_discover::error::{Error as DiscoverError, ErrorKind as DiscoverErrorKind};
use docarchive_render::error::{Error as RenderError, ErrorKind as RenderErrorKind};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Which stage of the run failed.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("could not discover documentation pages: {_0}")]
    Discover(DiscoverErrorKind),
    #[display("could not prepare page: {_0}")]
    Prepare(#[error(not(source))] String),
    #[display("browser rendering failed: {_0}")]
    Render(RenderErrorKind),
    #[display("invalid file name template")]
    Template,
    #[display("could not merge PDFs")]
    Merge,
    #[display("I/O error: {_0}")]
    Io(#[error(not(source))] String),
}
impl ErrorKind {
    /// Wraps a discovery error, keeping its frame as a child.
    #[track_caller]
    pub fn discover(err: DiscoverError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Discover(inner))
    }

    /// Wraps a render error, keeping its frame as a child.
    #[track_caller]
    pub fn render(err: RenderError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Render(inner))
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Discover(inner) => inner.is_retryable(),
            Self::Render(inner) => inner.is_retryable(),
            Self::Config | Self::Prepare(_) | Self::Template | Self::Merge | Self::Io(_) => false,
        }
    }
}
