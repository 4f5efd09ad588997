use std::time::Duration;

use crate::error::Result;
use crate::transport::{AsyncTransport, HttpResponse, SESSION_COOKIE};

/// Async HTTP transport backed by `reqwest` with a cookie store.
pub struct HttpTransport {
    http: reqwest::Client,
    server: String,
}

impl HttpTransport {
    /// Create a transport for `server` (for example `http://192.168.1.1`).
    pub fn new(server: &str, timeout: Duration, accept_invalid_certs: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            server: server.trim_end_matches('/').to_owned(),
        })
    }

    async fn post_form_impl(&self, path: &str, form: &[(&str, &str)]) -> Result<HttpResponse> {
        let response = self
            .http
            .post(format!("{}{path}", self.server))
            .form(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let session_cookie = response.cookies().any(|c| c.name() == SESSION_COOKIE);
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            body,
            session_cookie,
        })
    }
}

impl AsyncTransport for HttpTransport {
    fn post_form<'a>(
        &'a self,
        path: &'a str,
        form: &'a [(&'a str, &'a str)],
    ) -> core::pin::Pin<Box<dyn core::future::Future<Output = Result<HttpResponse>> + Send + 'a>>
    {
        Box::pin(async move { self.post_form_impl(path, form).await })
    }
}
