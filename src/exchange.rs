use http::header::{HeaderMap, HeaderName, HeaderValue, LOCATION};
use http::StatusCode;

use crate::error::WriteError;

/// Read-only view of the inbound request handed to a plugin.
pub trait Request {
    /// Request path without the query string.
    fn path(&self) -> &str;

    /// Case-insensitive header lookup.
    fn header(&self, name: &str) -> Option<&str>;
}

/// Write side of the reply. A plugin that writes nothing lets the gateway
/// carry on with the request.
pub trait ResponseWriter {
    fn add_header(&mut self, name: &str, value: &str);

    fn write_status(&mut self, status: StatusCode);

    fn write(&mut self, body: &[u8]) -> Result<usize, WriteError>;
}

/// Replies with `status` pointing the client at `location`. No body is written.
pub fn redirect(writer: &mut dyn ResponseWriter, location: &str, status: StatusCode) {
    writer.add_header(LOCATION.as_str(), location);
    writer.write_status(status);
}

/// Owned request snapshot.
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    path: String,
    headers: HeaderMap,
}

impl RequestParts {
    pub fn new(path: impl Into<String>) -> Self {
        RequestParts {
            path: path.into(),
            headers: HeaderMap::new(),
        }
    }

    /// Builds a request from a raw `:path` value, dropping the query string.
    pub fn from_raw_path(raw_path: &str) -> Self {
        let path = raw_path.split_once('?').map_or(raw_path, |(path, _)| path);
        Self::new(path)
    }

    /// Adds a header, skipping names or values that are not valid HTTP.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.insert_header(name.as_bytes(), value.as_bytes());
        self
    }

    /// Returns `false` when the header was skipped.
    pub fn insert_header(&mut self, name: &[u8], value: &[u8]) -> bool {
        match (HeaderName::from_bytes(name), HeaderValue::from_bytes(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
                true
            }
            _ => false,
        }
    }
}

impl Request for RequestParts {
    fn path(&self) -> &str {
        &self.path
    }

    fn header(&self, name: &str) -> Option<&str> {
        // Any UTF-8 value is usable, not just visible ASCII.
        self.headers
            .get(name)
            .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
    }
}

/// Buffers everything a plugin writes so the host can replay it as a local
/// reply.
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    status: Option<StatusCode>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_untouched(&self) -> bool {
        self.status.is_none() && self.headers.is_empty() && self.body.is_empty()
    }

    /// Status written by the plugin, or 200 once anything else was written.
    pub fn status(&self) -> Option<StatusCode> {
        match self.status {
            Some(status) => Some(status),
            None if !self.is_untouched() => Some(StatusCode::OK),
            None => None,
        }
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl ResponseWriter for ResponseRecorder {
    fn add_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn write_status(&mut self, status: StatusCode) {
        // The first status sticks, as on a real connection.
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    fn write(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.body.extend_from_slice(body);
        Ok(body.len())
    }
}
