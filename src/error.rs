use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad magic: {0}")]
    BadMagic(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unexpected end of input: {0}")]
    Truncated(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("requested bounds not covered: {0}")]
    OutOfBounds(String),

    #[error("cancelled by progress callback")]
    Cancelled,
}

impl From<quick_xml::Error> for Error {
    fn from(e: quick_xml::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<osmpbf::Error> for Error {
    fn from(e: osmpbf::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

impl From<time::error::Parse> for Error {
    fn from(e: time::error::Parse) -> Self {
        Error::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
