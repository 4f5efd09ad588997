use std::time::Duration;

use crate::error::Result;
use crate::transport::{HttpResponse, SESSION_COOKIE, Transport};

/// Blocking HTTP transport backed by `reqwest` with a cookie store.
pub struct HttpTransport {
    http: reqwest::blocking::Client,
    server: String,
}

impl HttpTransport {
    /// Create a transport for `server` (for example `http://192.168.1.1`).
    pub fn new(server: &str, timeout: Duration, accept_invalid_certs: bool) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            server: server.trim_end_matches('/').to_owned(),
        })
    }
}

impl Transport for HttpTransport {
    fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<HttpResponse> {
        let response = self
            .http
            .post(format!("{}{path}", self.server))
            .form(form)
            .send()?;

        let status = response.status().as_u16();
        let session_cookie = response.cookies().any(|c| c.name() == SESSION_COOKIE);
        let body = response.text()?;

        Ok(HttpResponse {
            status,
            body,
            session_cookie,
        })
    }
}
