use bytes::Bytes;
use std::fmt;
use std::time::SystemTime;
use thiserror::Error;

/// Protocol version written on every response.
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Value of the `Server` header unless configured otherwise.
pub const DEFAULT_SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// HTTP status codes supported by the server.
///
/// This is the complete registry: adding a code means adding a variant here,
/// never formatting a status line by hand.
/// - `Ok` (200): Request successful
/// - `Created` (201): Resource created successfully
/// - `NoContent` (204): Successful request with no content
/// - `BadRequest` (400): Malformed request or unsafe path
/// - `Unauthorized` (401): Authentication required
/// - `Forbidden` (403): Access refused
/// - `NotFound` (404): Resource not found
/// - `MethodNotAllowed` (405): HTTP method not supported
/// - `InternalServerError` (500): Server error
/// - `NotImplemented` (501): Functionality not supported
/// - `ServiceUnavailable` (503): Server temporarily unavailable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 204 No Content
    NoContent,
    /// 400 Bad Request
    BadRequest,
    /// 401 Unauthorized
    Unauthorized,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
    /// 503 Service Unavailable
    ServiceUnavailable,
}

impl StatusCode {
    pub const ALL: [StatusCode; 11] = [
        StatusCode::Ok,
        StatusCode::Created,
        StatusCode::NoContent,
        StatusCode::BadRequest,
        StatusCode::Unauthorized,
        StatusCode::Forbidden,
        StatusCode::NotFound,
        StatusCode::MethodNotAllowed,
        StatusCode::InternalServerError,
        StatusCode::NotImplemented,
        StatusCode::ServiceUnavailable,
    ];

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use static_serve::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::NoContent => 204,
            StatusCode::BadRequest => 400,
            StatusCode::Unauthorized => 401,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
            StatusCode::ServiceUnavailable => 503,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use static_serve::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// Looks a numeric code up in the registry.
    pub fn from_u16(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_u16() == code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("response has no content type")]
    MissingContentType,
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// The header set is fixed: `Date`, `Server`, `Content-Type`, `Content-Length`
/// and `Connection: close`. Content-Length is derived from the body, so it can
/// never disagree with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Generation time in IMF-fixdate form
    pub date: String,
    /// Value of the `Server` header
    pub server: String,
    pub content_type: String,
    body: Option<Bytes>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use static_serve::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .content_type("application/json")
///     .body(b"{}".to_vec())
///     .build()
///     .unwrap();
/// assert_eq!(response.content_length(), 2);
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    content_type: Option<String>,
    server: Option<String>,
    date: Option<SystemTime>,
    body: Option<Bytes>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            server: None,
            date: None,
            body: None,
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Overrides the `Server` token (defaults to [`DEFAULT_SERVER_NAME`]).
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Pins the `Date` header instead of using the current time.
    pub fn date(mut self, date: SystemTime) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the response body. Accepts anything that converts into `Bytes`,
    /// so a file buffer can be moved in without copying.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Builds the final Response.
    ///
    /// Fails when no content type was given or it is empty.
    pub fn build(self) -> Result<Response, ResponseError> {
        let content_type = self
            .content_type
            .filter(|ct| !ct.is_empty())
            .ok_or(ResponseError::MissingContentType)?;

        Ok(Response {
            status: self.status,
            date: httpdate::fmt_http_date(self.date.unwrap_or_else(SystemTime::now)),
            server: self
                .server
                .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string()),
            content_type,
            body: self.body,
        })
    }
}

impl Response {
    /// Creates a response stamped with the current time.
    ///
    /// The body is copied into a buffer owned by the response. `None` yields
    /// Content-Length 0 and no body buffer.
    pub fn create(
        status: StatusCode,
        content_type: &str,
        body: Option<&[u8]>,
    ) -> Result<Self, ResponseError> {
        let builder = ResponseBuilder::new(status).content_type(content_type);
        match body {
            Some(body) => builder.body(Bytes::copy_from_slice(body)).build(),
            None => builder.build(),
        }
    }

    /// Always `HTTP/1.1`.
    pub fn version(&self) -> &'static str {
        HTTP_VERSION
    }

    /// Always `close`: one request per connection.
    pub fn connection(&self) -> &'static str {
        "close"
    }

    /// Byte length of the body, 0 when there is none.
    pub fn content_length(&self) -> usize {
        self.body.as_ref().map_or(0, Bytes::len)
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Replaces the `Server` token after construction.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// A `text/plain` response whose body is the reason phrase.
    pub fn plain(status: StatusCode) -> Self {
        Self::with_reason_body(status, "text/plain")
    }

    /// Like [`Response::plain`] but labeled with `content_type`; used for
    /// error responses that keep the content type selected for the request.
    pub fn with_reason_body(status: StatusCode, content_type: &str) -> Self {
        let content_type = if content_type.is_empty() {
            "text/plain"
        } else {
            content_type
        };
        Response {
            status,
            date: httpdate::fmt_http_date(SystemTime::now()),
            server: DEFAULT_SERVER_NAME.to_string(),
            content_type: content_type.to_string(),
            body: Some(Bytes::from_static(status.reason_phrase().as_bytes())),
        }
    }

    /// Creates a 400 Bad Request response.
    pub fn bad_request() -> Self {
        Self::plain(StatusCode::BadRequest)
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::plain(StatusCode::NotFound)
    }

    /// Creates a 405 Method Not Allowed response.
    pub fn method_not_allowed() -> Self {
        Self::plain(StatusCode::MethodNotAllowed)
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        Self::plain(StatusCode::InternalServerError)
    }
}
