//! Structured form of one request read from a request file.
//!
//! A [`RequestDescriptor`] is plain data: the parser fills it in and hands
//! it over, and the transport adapter (or any other HTTP client) consumes
//! it. Its `Display` output is the canonical request-file form, so printing
//! a descriptor with a UTF-8 body and parsing the text again gives back an
//! equal descriptor.

use std::fmt;

use bytes::Bytes;
use http::Version;
use serde::{ser::SerializeSeq, Serialize, Serializer};

use crate::method::Method;
use crate::DELIMITER;

/// Header lines in the order they were written.
///
/// Names keep the case they were written in and are compared exactly.
/// Repeating a name adds another value, it never replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value stored under `name`, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }
}

// Serialised as `[[name, value], ...]`; a JSON object would drop duplicates.
impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for pair in &self.0 {
            seq.serialize_element(pair)?;
        }
        seq.end()
    }
}

/// One request found in a request file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestDescriptor {
    pub method: Method,
    /// URL or path exactly as written on the start line.
    pub target: String,
    /// Protocol version, when the start line names one.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_version"
    )]
    pub version: Option<Version>,
    pub headers: Headers,
    /// Concatenated body lines; always empty unless `method` is `POST`.
    #[serde(serialize_with = "serialize_body")]
    pub body: Bytes,
}

impl RequestDescriptor {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            version: None,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.target)?;
        if let Some(version) = self.version {
            write!(f, " {version:?}")?;
        }
        writeln!(f)?;
        for (name, value) in self.headers.iter() {
            writeln!(f, "{name}: {value}")?;
        }
        writeln!(f)?;
        if !self.body.is_empty() {
            writeln!(f, "{}", String::from_utf8_lossy(&self.body))?;
        }
        writeln!(f, "{DELIMITER}")
    }
}

fn serialize_version<S: Serializer>(
    version: &Option<Version>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match version {
        Some(v) => serializer.serialize_str(&format!("{v:?}")),
        None => serializer.serialize_none(),
    }
}

fn serialize_body<S: Serializer>(body: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(body))
}
