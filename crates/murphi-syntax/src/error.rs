//! Structured errors carrying the originating source location.

use crate::location::Location;
use thiserror::Error;

/// An error raised by any compiler pass.
///
/// All passes propagate errors to their top-level entry point; no pass
/// catches and continues.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error("not constant: {message} at {loc}")]
    NotConstant { message: String, loc: Location },

    #[error("unknown symbol: {message} at {loc}")]
    UnknownSymbol { message: String, loc: Location },

    #[error("bit operation without bitvectors: {message} at {loc}")]
    BitOpWithoutBitvectors { message: String, loc: Location },

    #[error("unsupported construct: {message} at {loc}")]
    UnsupportedConstruct { message: String, loc: Location },

    #[error("malformed lvalue: {message} at {loc}")]
    MalformedLvalue { message: String, loc: Location },

    #[error("type resolution: {message} at {loc}")]
    TypeResolution { message: String, loc: Location },

    #[error("internal invariant violated: {message} at {loc}")]
    InternalInvariant { message: String, loc: Location },
}

impl Error {
    /// The source location this error originates from.
    pub fn loc(&self) -> &Location {
        match self {
            Error::NotConstant { loc, .. }
            | Error::UnknownSymbol { loc, .. }
            | Error::BitOpWithoutBitvectors { loc, .. }
            | Error::UnsupportedConstruct { loc, .. }
            | Error::MalformedLvalue { loc, .. }
            | Error::TypeResolution { loc, .. }
            | Error::InternalInvariant { loc, .. } => loc,
        }
    }
}

/// Result type used throughout the compiler core.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_rendering() {
        let e = Error::NotConstant {
            message: "const definition is not a constant".to_string(),
            loc: Location::new(Some("model.m".to_string()), 12, 3),
        };
        assert_eq!(
            e.to_string(),
            "not constant: const definition is not a constant at model.m:12:3"
        );
    }
}
