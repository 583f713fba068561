//! Errors raised while reading a request file and while turning its
//! descriptors into transport-level requests.

use std::fmt;

/// Why a request buffer was rejected.
///
/// Parsing is strict: the first error aborts the whole buffer and no
/// descriptors are returned. Variants that point at a line carry the raw
/// text and its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The buffer holds no lines at all.
    EmptyInput,

    /// Input ran out before any line started with a known method.
    NoStartLine,

    /// A start line names a method but no target.
    MissingTarget { line: usize, text: String },

    /// A line inside a header block has no `": "` separator, or an empty name.
    InvalidHeaderLine { line: usize, text: String },
}

impl ParseError {
    /// The offending raw line, when the error points at one.
    pub fn line_text(&self) -> Option<&str> {
        match self {
            ParseError::MissingTarget { text, .. } | ParseError::InvalidHeaderLine { text, .. } => {
                Some(text)
            }
            ParseError::EmptyInput | ParseError::NoStartLine => None,
        }
    }

    pub fn line_number(&self) -> Option<usize> {
        match self {
            ParseError::MissingTarget { line, .. } | ParseError::InvalidHeaderLine { line, .. } => {
                Some(*line)
            }
            ParseError::EmptyInput | ParseError::NoStartLine => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::EmptyInput => write!(f, "no request"),
            ParseError::NoStartLine => write!(f, "invalid request"),
            ParseError::MissingTarget { line, text } => {
                write!(f, "missing target (line {line}): {text}")
            }
            ParseError::InvalidHeaderLine { line, text } => {
                write!(f, "invalid header (line {line}): {text}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// A descriptor could not be turned into an `http::Request`.
#[derive(Debug)]
pub enum BuildError {
    /// The target is a path but no base URL was supplied.
    RelativeTarget(String),

    /// The target (or the base joined with it) is not a valid URL.
    Url { target: String, source: url::ParseError },

    /// A header name or value is not valid on the wire.
    Header { name: String, reason: String },

    /// `http` refused the assembled request.
    Http(http::Error),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::RelativeTarget(target) => {
                write!(f, "relative target {target} needs a base url")
            }
            BuildError::Url { target, source } => write!(f, "invalid url {target}: {source}"),
            BuildError::Header { name, reason } => write!(f, "invalid header {name}: {reason}"),
            BuildError::Http(err) => write!(f, "could not build request: {err}"),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Url { source, .. } => Some(source),
            BuildError::Http(err) => Some(err),
            BuildError::RelativeTarget(_) | BuildError::Header { .. } => None,
        }
    }
}

impl From<http::Error> for BuildError {
    fn from(err: http::Error) -> Self {
        BuildError::Http(err)
    }
}
