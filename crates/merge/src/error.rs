use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("no PDF files to merge")]
    NothingToMerge,
    /// An input couldn't be parsed as a PDF.
    #[display("could not load PDF: {_0}")]
    Load(#[error(not(source))] String),
    /// An input parsed, but lacks the page tree needed to merge it.
    #[display("PDF has no page tree: {_0}")]
    Invalid(#[error(not(source))] String),
    #[display("could not write merged PDF: {_0}")]
    Write(#[error(not(source))] String),
}
