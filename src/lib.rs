//! Parser for REST-client style request files.
//!
//! A request file holds one or more requests separated by `###` lines:
//!
//! ```text
//! POST https://example.com/resource
//! Content-Type: application/json
//!
//! {"key": "value"}
//! ###
//! DELETE https://example.com/resource/123
//! ```
//!
//! [`parse_all`] turns such a buffer into [`RequestDescriptor`]s, and
//! [`RequestDescriptor::to_request`] hands each one to `http` as a ready
//! to send request.

pub mod descriptor;
pub mod error;
pub mod method;
pub mod parser;
pub mod transport;

pub use descriptor::{Headers, RequestDescriptor};
pub use error::{BuildError, ParseError};
pub use method::Method;
pub use parser::{parse_all, parse_one};

/// Line separating two requests in one buffer.
pub const DELIMITER: &str = "###";
