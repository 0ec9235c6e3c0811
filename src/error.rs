//! Errors for pdfstencil.

use std::error::Error as IError;
use std::fmt;
use std::io::Error as IoError;

use crate::decode::DecodeError;

/// The error-macro crates buy little here: the failure modes are a closed
/// set and callers match on them (a decoder failure skips one document, an
/// I/O or dictionary failure aborts the run). Plain enums, `From` + pattern
/// matching, with one macro for the conversions.
macro_rules! impl_from {
    ($from:ident, $to:ident::$variant:ident) => {
        impl From<$from> for $to {
            fn from(err: $from) -> Self {
                $to::$variant(err.into())
            }
        }
    };
}

#[derive(Debug)]
pub enum Error {
    /// External: std::io::Error
    Io(IoError),
    /// The PDF backend refused or failed on a document
    Decode(DecodeError),
    /// The code-postal dictionary could not be parsed (fatal at startup)
    Dictionary(serde_json::Error),
}

impl Error {
    /// Per-document errors are isolated: the document is skipped and the
    /// corpus run continues. Everything else aborts.
    pub fn is_document_local(&self) -> bool {
        matches!(self, Error::Decode(_))
    }
}

impl_from!(IoError, Error::Io);
impl_from!(DecodeError, Error::Decode);

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Dictionary(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Error::*;
        match self {
            Io(e) => write!(f, "{e}"),
            Decode(e) => write!(f, "{e}"),
            Dictionary(e) => write!(f, "invalid code-postal dictionary: {e}"),
        }
    }
}

impl IError for Error {}
