use thiserror::Error;

/// Result type used across this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A field value is not valid hexadecimal.
    #[error("malformed hex field: {0:?}")]
    MalformedField(String),

    /// A field is valid hexadecimal but its value does not fit the decoded type.
    #[error("hex field out of range: {0:?}")]
    OutOfRange(String),

    /// A record is missing a field required by the decoder.
    #[error("missing field: {0}")]
    MissingField(String),

    /// The sensor requests a linearisation formula other than linear.
    #[error("linearisation formula {0:#04x} is not implemented")]
    UnimplementedFormula(u8),

    /// A present discrete sensor has a type that cannot be decoded yet.
    #[error("discrete sensor type {0:#04x} is not implemented")]
    UnimplementedDiscreteType(i64),

    /// A wire code outside one of the closed enumerations.
    #[error("unknown {kind} code: {code:#x}")]
    UnknownCode {
        /// Which enumeration the code was parsed for.
        kind: &'static str,
        /// Raw code as found in the response.
        code: i64,
    },

    /// The response body is not well-formed XML.
    #[error("xml error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// HTTP transport error (connect, TLS, body decoding, etc.).
    #[cfg(any(feature = "blocking", feature = "async"))]
    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    /// Operation timed out.
    #[error("timeout waiting for response")]
    Timeout,

    /// The controller answered with a non-success HTTP status.
    #[error("unexpected http status {status} from {path}")]
    Status {
        /// Request path.
        path: String,
        /// HTTP status code.
        status: u16,
    },

    /// Login did not produce a session cookie.
    #[error("authentication failed for user {username:?}")]
    AuthenticationFailed {
        /// Username used for the login attempt.
        username: String,
    },

    /// The same metric was requested more than once.
    #[error("metric requested more than once: {0:?}")]
    DuplicateMetric(String),

    /// An unknown metric was requested.
    #[error("invalid metric: {0:?}")]
    InvalidMetric(String),

    /// Invalid caller-supplied argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A required environment variable is not set.
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),

    /// Internal client state is unusable.
    #[error("protocol error: {0}")]
    Protocol(&'static str),
}

#[cfg(any(feature = "blocking", feature = "async"))]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}
