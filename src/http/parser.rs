use crate::http::request::{KnownHeader, Method, Request};
use thiserror::Error;

/// Longest accepted method token, in bytes.
pub const MAX_METHOD_LEN: usize = 15;
/// Longest accepted request target, in bytes.
pub const MAX_PATH_LEN: usize = 511;
/// Longest accepted version token, in bytes.
pub const MAX_VERSION_LEN: usize = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty request")]
    Empty,
    #[error("empty request line")]
    EmptyRequestLine,
    #[error("request line must be `METHOD SP PATH SP VERSION`")]
    MalformedRequestLine,
    #[error("request method is empty")]
    MissingMethod,
    #[error("request path is empty")]
    MissingPath,
    #[error("{field} exceeds {limit} bytes")]
    FieldTooLong { field: &'static str, limit: usize },
}

/// Parses the head of an HTTP request.
///
/// `buf` is whatever was read from the socket; it does not have to be valid
/// UTF-8 and does not have to contain the blank line that ends the head.
/// Parsing stops at the first empty line or at the end of the buffer, and
/// any bytes after the head are ignored.
pub fn parse_http_request(buf: &[u8]) -> Result<Request, ParseError> {
    if buf.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut lines = split_lines(buf);

    // Request line
    let request_line = lines.next().ok_or(ParseError::Empty)?;
    if request_line.is_empty() {
        return Err(ParseError::EmptyRequestLine);
    }
    let request_line = String::from_utf8_lossy(request_line);

    let parts: Vec<&str> = request_line.split(' ').collect();
    let &[method_str, path, version] = parts.as_slice() else {
        return Err(ParseError::MalformedRequestLine);
    };

    if method_str.is_empty() {
        return Err(ParseError::MissingMethod);
    }
    if path.is_empty() {
        return Err(ParseError::MissingPath);
    }
    if version.is_empty() {
        return Err(ParseError::MalformedRequestLine);
    }

    check_len("method", method_str, MAX_METHOD_LEN)?;
    check_len("path", path, MAX_PATH_LEN)?;
    check_len("version", version, MAX_VERSION_LEN)?;

    let mut request = Request {
        method: Method::from_token(method_str),
        path: path.to_string(),
        version: version.to_string(),
        host: None,
        user_agent: None,
        accept: None,
        connection: None,
    };

    // Headers
    for line in lines {
        if line.is_empty() {
            break;
        }

        let line = String::from_utf8_lossy(line);
        // Lines without a colon are not headers; skip them.
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };

        if let Some(header) = KnownHeader::from_name(name.trim()) {
            let value = truncate_to(value.trim(), header.max_len());
            request.set_header(header, value.to_string());
        }
    }

    Ok(request)
}

/// Splits on CRLF. A trailing fragment without a terminator is still yielded.
fn split_lines(buf: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = Some(buf);
    std::iter::from_fn(move || {
        let current = rest?;
        match find_crlf(current) {
            Some(pos) => {
                rest = Some(&current[pos + 2..]);
                Some(&current[..pos])
            }
            None => {
                rest = None;
                if current.is_empty() { None } else { Some(current) }
            }
        }
    })
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

fn check_len(field: &'static str, value: &str, limit: usize) -> Result<(), ParseError> {
    if value.len() > limit {
        return Err(ParseError::FieldTooLong { field, limit });
    }
    Ok(())
}

/// Cuts `value` to at most `max` bytes without splitting a UTF-8 sequence.
fn truncate_to(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
