//! Line scanner for request files.
//!
//! Each pass over a buffer repeats the same scan: find a start line, read
//! the header block up to a blank line, then (for `POST` only) read body
//! lines up to a `###` line or the end of input. Anything between a
//! bodiless request and the next start line is skipped.

use bytes::{Bytes, BytesMut};
use http::Version;
use log::{debug, trace};

use crate::descriptor::{Headers, RequestDescriptor};
use crate::error::ParseError;
use crate::method::Method;
use crate::DELIMITER;

type Result<T> = std::result::Result<T, ParseError>;

/// Parses every request in `buffer`, in file order.
///
/// Fails on the first malformed start line or header line; no partial
/// results are returned.
pub fn parse_all(buffer: impl AsRef<[u8]>) -> Result<Vec<RequestDescriptor>> {
    let mut cursor = Cursor::new(buffer.as_ref());

    if !cursor.has_more() {
        return Err(ParseError::EmptyInput);
    }

    let mut requests = Vec::new();
    while let Some((request, next)) = scan_request(&mut cursor)? {
        trace!(
            "parsed {} {} ({} headers, {} body bytes)",
            request.method,
            request.target,
            request.headers.len(),
            request.body.len()
        );
        requests.push(request);
        if next == Continuation::Done {
            break;
        }
    }

    if requests.is_empty() {
        return Err(ParseError::NoStartLine);
    }
    Ok(requests)
}

/// Parses `buffer` and returns only its first request.
pub fn parse_one(buffer: impl AsRef<[u8]>) -> Result<RequestDescriptor> {
    parse_all(buffer)?
        .into_iter()
        .next()
        .ok_or(ParseError::NoStartLine)
}

/// Position over the lines of one buffer.
///
/// Lines stay raw bytes; only start and header lines are decoded, so body
/// bytes reach the descriptor unchanged.
struct Cursor<'a> {
    lines: Vec<&'a [u8]>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buffer: &'a [u8]) -> Self {
        Self {
            lines: split_lines(buffer),
            pos: 0,
        }
    }

    fn has_more(&self) -> bool {
        self.pos < self.lines.len()
    }

    /// Current line and its 1-based number, without consuming it.
    fn peek(&self) -> Option<(usize, &'a [u8])> {
        self.lines.get(self.pos).map(|line| (self.pos + 1, *line))
    }

    fn next_line(&mut self) -> Option<(usize, &'a [u8])> {
        let line = self.peek()?;
        self.pos += 1;
        Some(line)
    }
}

/// Splits on `\n`, `\r\n` and bare `\r`. A final line ending does not
/// start another line.
fn split_lines(buffer: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut rest = buffer;

    while !rest.is_empty() {
        let Some(end) = rest.iter().position(|&b| b == b'\n' || b == b'\r') else {
            lines.push(rest);
            break;
        };
        lines.push(&rest[..end]);
        let ending = if rest[end..].starts_with(b"\r\n") { 2 } else { 1 };
        rest = &rest[end + ending..];
    }

    lines
}

fn is_delimiter(line: &[u8]) -> bool {
    line.trim_ascii() == DELIMITER.as_bytes()
}

/// Whether more requests may follow the one just scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    More,
    Done,
}

struct StartLine {
    method: Method,
    target: String,
    version: Option<Version>,
}

/// Scans one request. `None` means the input ran out before a start line.
fn scan_request(cursor: &mut Cursor<'_>) -> Result<Option<(RequestDescriptor, Continuation)>> {
    let Some(start) = find_start_line(cursor)? else {
        return Ok(None);
    };
    let headers = read_headers(cursor)?;

    let (body, next) = if start.method.has_body() {
        read_body(cursor)
    } else if cursor.has_more() {
        (Bytes::new(), Continuation::More)
    } else {
        (Bytes::new(), Continuation::Done)
    };

    let request = RequestDescriptor {
        method: start.method,
        target: start.target,
        version: start.version,
        headers,
        body,
    };
    Ok(Some((request, next)))
}

fn find_start_line(cursor: &mut Cursor<'_>) -> Result<Option<StartLine>> {
    while let Some((number, raw)) = cursor.next_line() {
        let line = String::from_utf8_lossy(raw);
        let mut tokens = line.split_whitespace();
        let Some(method) = tokens.next().and_then(|token| token.parse::<Method>().ok()) else {
            if !raw.trim_ascii().is_empty() && !is_delimiter(raw) {
                debug!("skipping line {number}: {line}");
            }
            continue;
        };

        let target = tokens.next().ok_or_else(|| ParseError::MissingTarget {
            line: number,
            text: line.to_string(),
        })?;
        let version = tokens.next().and_then(parse_version);

        return Ok(Some(StartLine {
            method,
            target: target.to_string(),
            version,
        }));
    }
    Ok(None)
}

/// Reads `Name: value` lines up to and including a blank line. A `###`
/// line also ends the block but is left for the next scan.
fn read_headers(cursor: &mut Cursor<'_>) -> Result<Headers> {
    let mut headers = Headers::new();

    while let Some((number, raw)) = cursor.peek() {
        if is_delimiter(raw) {
            break;
        }
        cursor.next_line();
        let line = String::from_utf8_lossy(raw.trim_ascii());
        if line.is_empty() {
            break;
        }

        let (name, value) = line
            .split_once(": ")
            .ok_or_else(|| ParseError::InvalidHeaderLine {
                line: number,
                text: String::from_utf8_lossy(raw).into_owned(),
            })?;
        headers.append(name, value);
    }

    Ok(headers)
}

/// Concatenates trimmed, non-blank lines up to a `###` line.
fn read_body(cursor: &mut Cursor<'_>) -> (Bytes, Continuation) {
    let mut body = BytesMut::new();

    while let Some((_, raw)) = cursor.next_line() {
        if is_delimiter(raw) {
            return (body.freeze(), Continuation::More);
        }
        body.extend_from_slice(raw.trim_ascii());
    }

    (body.freeze(), Continuation::Done)
}

fn parse_version(token: &str) -> Option<Version> {
    let version = match token {
        "HTTP/0.9" => Version::HTTP_09,
        "HTTP/1.0" => Version::HTTP_10,
        "HTTP/1.1" => Version::HTTP_11,
        "HTTP/2" | "HTTP/2.0" => Version::HTTP_2,
        "HTTP/3" | "HTTP/3.0" => Version::HTTP_3,
        _ => {
            debug!("ignoring unknown version {token}");
            return None;
        }
    };
    Some(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_get() {
        let requests = parse_all("GET https://example.com\n\n").unwrap();
        assert_eq!(
            requests,
            vec![RequestDescriptor::new(Method::Get, "https://example.com")]
        );
    }

    #[test]
    fn single_get_without_trailing_newline() {
        let request = parse_one("GET https://example.com").unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.target, "https://example.com");
        assert!(request.headers.is_empty());
        assert!(request.body.is_empty());
    }

    #[test]
    fn post_then_delete() {
        let input = "POST https://example.com/resource\n\
                     Content-Type: application/json\n\
                     \n\
                     {\"key\": \"value\"}\n\
                     ###\n\
                     DELETE https://example.com/resource/123";
        let requests = parse_all(input).unwrap();

        assert_eq!(
            requests,
            vec![
                RequestDescriptor::new(Method::Post, "https://example.com/resource")
                    .with_header("Content-Type", "application/json")
                    .with_body(r#"{"key": "value"}"#),
                RequestDescriptor::new(Method::Delete, "https://example.com/resource/123"),
            ]
        );
    }

    #[test]
    fn indented_lines_are_trimmed() {
        let input = "POST https://example.com/resource\n\
                     \t\t\t\tContent-Type: application/json\n\
                     \n\
                     \t\t\t\t{\"key\": \"value\"}\n\
                     \t\t\t\t###\n\
                     \t\t\t\tDELETE https://example.com/resource/123";
        let requests = parse_all(input).unwrap();

        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].headers.get("Content-Type"), Some("application/json"));
        assert_eq!(requests[0].body, Bytes::from_static(br#"{"key": "value"}"#));
        assert_eq!(requests[1].method, Method::Delete);
    }

    #[test]
    fn body_lines_are_joined_without_separators() {
        let input = "POST /items\n\n  {\n\n   \"a\": 1  \n}\n";
        let request = parse_one(input).unwrap();
        assert_eq!(request.body, Bytes::from_static(br#"{"a": 1}"#));
    }

    #[test]
    fn duplicate_headers_are_kept_in_order() {
        let input = "GET /\nX-A: one\nX-B: two\nX-A: three\n\n";
        let request = parse_one(input).unwrap();

        assert_eq!(request.headers.len(), 3);
        assert_eq!(request.headers.get_all("X-A").collect::<Vec<_>>(), vec!["one", "three"]);
        assert_eq!(
            request.headers.iter().collect::<Vec<_>>(),
            vec![("X-A", "one"), ("X-B", "two"), ("X-A", "three")]
        );
    }

    #[test]
    fn header_value_splits_on_first_separator() {
        let request = parse_one("GET /\nX-Note: a: b\n\n").unwrap();
        assert_eq!(request.headers.get("X-Note"), Some("a: b"));
    }

    #[test]
    fn non_post_trailing_lines_are_skipped() {
        let input = "GET /first\n\n{\"ignored\": true}\nstill ignored\n###\nPUT /second\n\nalso ignored";
        let requests = parse_all(input).unwrap();

        assert_eq!(
            requests,
            vec![
                RequestDescriptor::new(Method::Get, "/first"),
                RequestDescriptor::new(Method::Put, "/second"),
            ]
        );
    }

    #[test]
    fn delimiter_ends_header_block() {
        let requests = parse_all("GET /a\nAccept: */*\n###\nHEAD /b\n").unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].headers.get("Accept"), Some("*/*"));
        assert_eq!(requests[1].method, Method::Head);
    }

    #[test]
    fn trailing_delimiter_is_accepted() {
        let requests = parse_all("POST /a\n\nbody\n###\n\n").unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body, Bytes::from_static(b"body"));
    }

    #[test]
    fn post_body_runs_to_end_of_input() {
        let requests = parse_all("POST /a\n\nfirst\nGET /not-a-request\n").unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body, Bytes::from_static(b"firstGET /not-a-request"));
    }

    #[test]
    fn crlf_and_bare_cr_line_endings() {
        let crlf = parse_all("POST /a\r\nX-A: 1\r\n\r\nbody\r\n###\r\nGET /b\r\n").unwrap();
        let cr = parse_all("POST /a\rX-A: 1\r\rbody\r###\rGET /b\r").unwrap();
        let lf = parse_all("POST /a\nX-A: 1\n\nbody\n###\nGET /b\n").unwrap();

        assert_eq!(crlf, lf);
        assert_eq!(cr, lf);
    }

    #[test]
    fn accepts_byte_buffers() {
        let request = parse_one(b"OPTIONS *\n".as_slice()).unwrap();
        assert_eq!(request.method, Method::Options);
        assert_eq!(request.target, "*");
    }

    #[test]
    fn records_protocol_version() {
        let request = parse_one("PATCH /a HTTP/1.1\n\n").unwrap();
        assert_eq!(request.version, Some(Version::HTTP_11));

        let request = parse_one("PATCH /a HTTP/9\n\n").unwrap();
        assert_eq!(request.version, None);
    }

    #[test]
    fn lowercase_method_is_not_a_start_line() {
        let requests = parse_all("get /skipped\nGET /kept\n").unwrap();
        assert_eq!(requests, vec![RequestDescriptor::new(Method::Get, "/kept")]);
    }

    #[test]
    fn empty_input() {
        assert_eq!(parse_all(""), Err(ParseError::EmptyInput));
        assert_eq!(parse_one(b"".as_slice()), Err(ParseError::EmptyInput));
    }

    #[test]
    fn missing_method() {
        let err = parse_all("https://example.com\nAuthorization: Bearer <token>").unwrap_err();
        assert_eq!(err, ParseError::NoStartLine);
        assert_eq!(err.to_string(), "invalid request");
    }

    #[test]
    fn only_blank_lines() {
        assert_eq!(parse_all("\n\n  \n"), Err(ParseError::NoStartLine));
    }

    #[test]
    fn missing_target() {
        assert_eq!(
            parse_all("\nPOST\n"),
            Err(ParseError::MissingTarget {
                line: 2,
                text: "POST".to_string()
            })
        );
    }

    #[test]
    fn invalid_header_line() {
        assert_eq!(
            parse_all("GET /\nBadHeader\n\n"),
            Err(ParseError::InvalidHeaderLine {
                line: 2,
                text: "BadHeader".to_string()
            })
        );
        assert!(matches!(
            parse_all("GET /\nNo-Space:value\n"),
            Err(ParseError::InvalidHeaderLine { line: 2, .. })
        ));
    }

    #[test]
    fn empty_header_name_is_kept() {
        let request = parse_one("GET /a\n: nameless\n\n").unwrap();
        assert_eq!(request.headers.iter().collect::<Vec<_>>(), vec![("", "nameless")]);
    }

    #[test]
    fn body_bytes_are_not_decoded() {
        let request = parse_one(b"POST /a\n\n\xff\xfe\n  \x80abc\t\n".as_slice()).unwrap();
        assert_eq!(request.body, Bytes::from_static(b"\xff\xfe\x80abc"));
    }

    #[test]
    fn later_error_discards_earlier_requests() {
        let err = parse_all("GET /ok\n\n###\nPOST /bad\nBadHeader\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidHeaderLine { line: 5, .. }));
    }

    #[test]
    fn canonical_text_parses_back() {
        let requests = vec![
            RequestDescriptor::new(Method::Post, "https://example.com/resource")
                .with_version(Version::HTTP_2)
                .with_header("Content-Type", "application/json")
                .with_header("X-A", "1")
                .with_header("X-A", "2")
                .with_body(r#"{"key": "value"}"#),
            RequestDescriptor::new(Method::Delete, "/resource/123").with_header("Accept", "*/*"),
            RequestDescriptor::new(Method::Post, "/empty"),
        ];
        let text: String = requests.iter().map(ToString::to_string).collect();

        assert_eq!(parse_all(text).unwrap(), requests);
    }
}
