#[cfg(feature = "blocking")]
use crate::error::Result;

/// Name of the session cookie issued by `/cgi/login.cgi`.
pub(crate) const SESSION_COOKIE: &str = "SID";

/// Response to a form POST against the controller's web interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: String,
    /// True when the response set the `SID` session cookie.
    pub session_cookie: bool,
}

impl HttpResponse {
    pub(crate) fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A synchronous transport posting forms to the controller.
///
/// Implementations keep cookies between requests so the session established
/// by a login is sent with later queries.
#[cfg(feature = "blocking")]
pub trait Transport {
    /// POST an url-encoded form to `path` (relative to the server address).
    fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<HttpResponse>;
}

#[cfg(feature = "async")]
mod async_support {
    use core::future::Future;
    use core::pin::Pin;

    use super::HttpResponse;
    use crate::error::Result;

    /// An asynchronous transport posting forms to the controller.
    pub trait AsyncTransport {
        /// POST an url-encoded form to `path` (relative to the server address).
        fn post_form<'a>(
            &'a self,
            path: &'a str,
            form: &'a [(&'a str, &'a str)],
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + 'a>>;
    }
}

#[cfg(feature = "async")]
pub use async_support::AsyncTransport;

#[cfg(feature = "blocking")]
pub(crate) mod blocking;

#[cfg(feature = "async")]
pub(crate) mod tokio;
