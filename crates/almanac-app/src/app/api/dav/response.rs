//! Response assembly.

use salvo::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use salvo::http::{HeaderName, HeaderValue, StatusCode};

/// A fully built response: status, headers and the exact body bytes.
///
/// `Content-Length` is never set by handlers; [`DavResponse::write_into`]
/// derives it from the body.
#[derive(Debug, Clone)]
pub struct DavResponse {
    pub status: StatusCode,
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub body: Vec<u8>,
}

impl DavResponse {
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }

    #[must_use]
    pub fn body(mut self, content_type: &'static str, body: Vec<u8>) -> Self {
        self.headers
            .push((CONTENT_TYPE, HeaderValue::from_static(content_type)));
        self.body = body;
        self
    }

    #[must_use]
    pub fn get_header(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers
            .iter()
            .find(|(header, _)| header == name)
            .map(|(_, value)| value)
    }

    /// ## Summary
    /// Writes status, headers and body to the salvo response, setting
    /// `Content-Length` to the body's byte length.
    pub fn write_into(self, res: &mut salvo::Response) {
        res.status_code(self.status);
        let headers = res.headers_mut();
        for (name, value) in self.headers {
            headers.insert(name, value);
        }
        headers.insert(CONTENT_LENGTH, HeaderValue::from(self.body.len()));
        res.body(self.body);
    }
}
