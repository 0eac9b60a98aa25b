//! HTTP response type.

use std::fmt;

/// HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    /// 200 OK
    pub const OK: Self = Self(200);
    /// 204 No Content
    pub const NO_CONTENT: Self = Self(204);
    /// 301 Moved Permanently
    pub const MOVED_PERMANENTLY: Self = Self(301);
    /// 307 Temporary Redirect
    pub const TEMPORARY_REDIRECT: Self = Self(307);
    /// 400 Bad Request
    pub const BAD_REQUEST: Self = Self(400);
    /// 404 Not Found
    pub const NOT_FOUND: Self = Self(404);
    /// 405 Method Not Allowed
    pub const METHOD_NOT_ALLOWED: Self = Self(405);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);

    /// Create a status code from a raw u16.
    #[must_use]
    pub fn from_u16(code: u16) -> Self {
        Self(code)
    }

    /// The numeric code.
    #[must_use]
    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// Whether this is a 2xx status.
    #[must_use]
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }

    /// Whether this is a 3xx status.
    #[must_use]
    pub fn is_redirect(self) -> bool {
        (300..400).contains(&self.0)
    }

    /// The canonical reason phrase for this code.
    #[must_use]
    pub fn canonical_reason(self) -> &'static str {
        match self.0 {
            200 => "OK",
            204 => "No Content",
            301 => "Moved Permanently",
            307 => "Temporary Redirect",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.canonical_reason())
    }
}

/// Response body.
#[derive(Debug, Default)]
pub enum ResponseBody {
    /// Empty body.
    #[default]
    Empty,
    /// Fully-buffered bytes.
    Bytes(Vec<u8>),
}

impl ResponseBody {
    /// Get body as bytes, consuming it.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Empty => Vec::new(),
            Self::Bytes(b) => b,
        }
    }
}

/// HTTP response.
///
/// Built with a consuming builder:
///
/// ```
/// use switchback_http::{Response, StatusCode};
///
/// let response = Response::ok()
///     .header("content-type", b"text/plain".to_vec())
///     .body_text("hello");
/// assert_eq!(response.status(), StatusCode::OK);
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: Vec<(String, Vec<u8>)>,
    body: ResponseBody,
}

impl Response {
    /// Create a response with the given status and no body.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: ResponseBody::Empty,
        }
    }

    /// 200 OK.
    #[must_use]
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// 404 Not Found with a plain-text body.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
            .header("content-type", b"text/plain; charset=utf-8".to_vec())
            .body_text("Not Found")
    }

    /// 405 Method Not Allowed with a plain-text body.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED)
            .header("content-type", b"text/plain; charset=utf-8".to_vec())
            .body_text("Method Not Allowed")
    }

    /// A redirect to `location` with the given 3xx status.
    #[must_use]
    pub fn redirect(status: StatusCode, location: impl Into<String>) -> Self {
        Self::new(status).header("location", location.into().into_bytes())
    }

    /// Append a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body to raw bytes.
    #[must_use]
    pub fn body(mut self, body: ResponseBody) -> Self {
        self.body = body;
        self
    }

    /// Set the body to a UTF-8 string.
    #[must_use]
    pub fn body_text(mut self, text: impl Into<String>) -> Self {
        self.body = ResponseBody::Bytes(text.into().into_bytes());
        self
    }

    /// Serialize `value` as the JSON body and set the content type.
    ///
    /// # Errors
    ///
    /// Returns the underlying serialization error if `value` cannot be
    /// encoded.
    pub fn json<T: serde::Serialize>(self, value: &T) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(value)?;
        Ok(self
            .header("content-type", b"application/json".to_vec())
            .body(ResponseBody::Bytes(bytes)))
    }

    /// Get the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Look up the first header with the given name (case-insensitive).
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }

    /// Borrow the body.
    #[must_use]
    pub fn body_ref(&self) -> &ResponseBody {
        &self.body
    }

    /// Decompose into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, Vec<(String, Vec<u8>)>, ResponseBody) {
        (self.status, self.headers, self.body)
    }
}
