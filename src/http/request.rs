use std::fmt;

/// HTTP request methods.
///
/// Represents the HTTP method/verb of a request. The server only serves GET;
/// every other method, including tokens it does not recognize, is answered
/// with 405 Method Not Allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// CONNECT - Establish a tunnel
    CONNECT,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// TRACE - Loop-back test
    TRACE,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// Any token that is not one of the methods above
    Unrecognized,
}

impl Method {
    /// Canonicalizes a method token, ignoring ASCII case.
    ///
    /// Unknown tokens map to [`Method::Unrecognized`] rather than an error, so
    /// the request still parses and can be answered with 405.
    ///
    /// # Example
    ///
    /// ```
    /// # use static_serve::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::GET);
    /// assert_eq!(Method::from_token("get"), Method::GET);
    /// assert_eq!(Method::from_token("BREW"), Method::Unrecognized);
    /// ```
    pub fn from_token(s: &str) -> Self {
        const KNOWN: [(&str, Method); 9] = [
            ("GET", Method::GET),
            ("HEAD", Method::HEAD),
            ("POST", Method::POST),
            ("PUT", Method::PUT),
            ("DELETE", Method::DELETE),
            ("CONNECT", Method::CONNECT),
            ("OPTIONS", Method::OPTIONS),
            ("TRACE", Method::TRACE),
            ("PATCH", Method::PATCH),
        ];

        KNOWN
            .iter()
            .find(|(token, _)| token.eq_ignore_ascii_case(s))
            .map(|(_, method)| *method)
            .unwrap_or(Method::Unrecognized)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::CONNECT => "CONNECT",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
            Method::PATCH => "PATCH",
            Method::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The request headers the server keeps. Everything else is dropped while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownHeader {
    Host,
    UserAgent,
    Accept,
    Connection,
}

impl KnownHeader {
    pub const ALL: [KnownHeader; 4] = [
        KnownHeader::Host,
        KnownHeader::UserAgent,
        KnownHeader::Accept,
        KnownHeader::Connection,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            KnownHeader::Host => "Host",
            KnownHeader::UserAgent => "User-Agent",
            KnownHeader::Accept => "Accept",
            KnownHeader::Connection => "Connection",
        }
    }

    /// Maximum stored length of the value in bytes; longer values are truncated.
    pub fn max_len(&self) -> usize {
        match self {
            KnownHeader::Host => 255,
            KnownHeader::UserAgent => 511,
            KnownHeader::Accept => 255,
            KnownHeader::Connection => 31,
        }
    }

    /// Case-insensitive lookup by exact header name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|h| h.name().eq_ignore_ascii_case(name))
    }
}

/// Represents a parsed HTTP request from a client.
///
/// Only the request line and the four recognized headers survive parsing.
/// The server never reads a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target exactly as sent (e.g., "/index.html")
    pub path: String,
    /// HTTP version token (typically "HTTP/1.1")
    pub version: String,
    pub host: Option<String>,
    pub user_agent: Option<String>,
    pub accept: Option<String>,
    pub connection: Option<String>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    version: Option<String>,
    host: Option<String>,
    user_agent: Option<String>,
    accept: Option<String>,
    connection: Option<String>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            host: None,
            user_agent: None,
            accept: None,
            connection: None,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets a recognized header. Unrecognized names are ignored, like on the wire.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        if let Some(known) = KnownHeader::from_name(name) {
            let value = Some(value.into());
            match known {
                KnownHeader::Host => self.host = value,
                KnownHeader::UserAgent => self.user_agent = value,
                KnownHeader::Accept => self.accept = value,
                KnownHeader::Connection => self.connection = value,
            }
        }
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let path = self.path.ok_or("path missing")?;
        if path.is_empty() {
            return Err("path empty");
        }

        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            host: self.host,
            user_agent: self.user_agent,
            accept: self.accept,
            connection: self.connection,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    /// Retrieves a recognized header value by name (case-insensitive).
    ///
    /// # Returns
    ///
    /// `Some(&str)` with the header value if the client sent it, `None` if it was
    /// absent or the name is not one the server keeps.
    pub fn header(&self, name: &str) -> Option<&str> {
        let slot = match KnownHeader::from_name(name)? {
            KnownHeader::Host => &self.host,
            KnownHeader::UserAgent => &self.user_agent,
            KnownHeader::Accept => &self.accept,
            KnownHeader::Connection => &self.connection,
        };
        slot.as_deref()
    }

    pub(crate) fn set_header(&mut self, header: KnownHeader, value: String) {
        let slot = match header {
            KnownHeader::Host => &mut self.host,
            KnownHeader::UserAgent => &mut self.user_agent,
            KnownHeader::Accept => &mut self.accept,
            KnownHeader::Connection => &mut self.connection,
        };
        *slot = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_header_lookup_is_exact() {
        assert_eq!(KnownHeader::from_name("user-agent"), Some(KnownHeader::UserAgent));
        assert_eq!(KnownHeader::from_name("Accept-Encoding"), None);
    }
}
