use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::pmbus::process_pmbus_response;
use crate::record::extract_records;
use crate::secret::SecretString;
use crate::sensor::process_sensor_response;
use crate::transport::HttpResponse;
use crate::types::{Metric, PowerSupply, Sensor};

pub(crate) const LOGIN_PATH: &str = "/cgi/login.cgi";
pub(crate) const IPMI_PATH: &str = "/cgi/ipmi.cgi";

/// Default lifetime of a controller session (`SID` cookie).
const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for the BMC clients.
///
/// `build()` creates a blocking [`Client`](crate::Client) (feature `blocking`),
/// `build_async()` an [`AsyncClient`](crate::AsyncClient) (feature `async`).
/// Neither logs in; the first query does.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    server: String,
    username: Option<String>,
    password: Option<SecretString>,
    session_timeout: Duration,
    timeout: Duration,
    accept_invalid_certs: bool,
}

/// Settings needed to construct an HTTP transport.
#[derive(Debug, Clone)]
pub(crate) struct HttpSettings {
    pub(crate) server: String,
    pub(crate) timeout: Duration,
    pub(crate) accept_invalid_certs: bool,
}

impl ClientBuilder {
    /// Create a new builder for `server`, for example `http://192.168.1.1`.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            username: None,
            password: None,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }

    /// Create a builder from `SMBMC_SERVER`, `SMBMC_USER`, `SMBMC_PASS` and the
    /// optional `SMBMC_SESSION_TIMEOUT` (minutes).
    pub fn from_env() -> Result<Self> {
        let var = |name: &'static str| std::env::var(name).map_err(|_| Error::MissingEnv(name));

        let mut builder = Self::new(var("SMBMC_SERVER")?)
            .username(var("SMBMC_USER")?)
            .password(var("SMBMC_PASS")?);

        if let Ok(minutes) = std::env::var("SMBMC_SESSION_TIMEOUT") {
            let minutes: u64 = minutes
                .trim()
                .parse()
                .map_err(|_| Error::InvalidArgument("SMBMC_SESSION_TIMEOUT must be whole minutes"))?;
            builder = builder.session_timeout(Duration::from_secs(minutes * 60));
        }

        Ok(builder)
    }

    /// Set the web interface username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the web interface password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::new(password));
        self
    }

    /// Set how long a session is reused before logging in again.
    ///
    /// Match the controller's configured web session timeout (30 minutes by default).
    pub fn session_timeout(mut self, session_timeout: Duration) -> Self {
        self.session_timeout = session_timeout;
        self
    }

    /// Set the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Accept self-signed or otherwise invalid TLS certificates.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    pub(crate) fn into_parts(self) -> Result<(ClientCore, HttpSettings)> {
        let username = self
            .username
            .ok_or(Error::InvalidArgument("username is required"))?;
        let password = self
            .password
            .ok_or(Error::InvalidArgument("password is required"))?;

        let server = self.server.trim().trim_end_matches('/').to_owned();
        if !(server.starts_with("http://") || server.starts_with("https://")) {
            return Err(Error::InvalidArgument(
                "server must start with http:// or https://",
            ));
        }
        if self.session_timeout.is_zero() {
            return Err(Error::InvalidArgument("session timeout must be non-zero"));
        }

        Ok((
            ClientCore::new(username, password, self.session_timeout),
            HttpSettings {
                server,
                timeout: self.timeout,
                accept_invalid_certs: self.accept_invalid_certs,
            },
        ))
    }
}

/// Session bookkeeping shared by the blocking and async clients.
#[derive(Debug)]
pub(crate) struct ClientCore {
    username: String,
    password: SecretString,
    session_timeout: Duration,
    logged_in_at: Option<Instant>,
}

impl ClientCore {
    pub(crate) fn new(username: String, password: SecretString, session_timeout: Duration) -> Self {
        Self {
            username,
            password,
            session_timeout,
            logged_in_at: None,
        }
    }

    pub(crate) fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn login_form(&self) -> [(&str, &str); 2] {
        [("name", self.username.as_str()), ("pwd", self.password.expose())]
    }

    /// True when no session exists or the current one has likely expired.
    pub(crate) fn needs_login(&self, now: Instant) -> bool {
        match self.logged_in_at {
            Some(at) => now.saturating_duration_since(at) > self.session_timeout,
            None => true,
        }
    }

    pub(crate) fn finish_login(&mut self, response: &HttpResponse, now: Instant) -> Result<()> {
        if response.session_cookie {
            self.logged_in_at = Some(now);
            Ok(())
        } else {
            self.logged_in_at = None;
            Err(Error::AuthenticationFailed {
                username: self.username.clone(),
            })
        }
    }

    pub(crate) fn session_age(&self, now: Instant) -> Option<Duration> {
        self.logged_in_at
            .map(|at| now.saturating_duration_since(at))
    }
}

/// Form body requesting `metric` from `/cgi/ipmi.cgi`.
pub(crate) fn query_form(metric: Metric) -> [(&'static str, &'static str); 1] {
    match metric {
        Metric::Pmbus => [("Get_PSInfoReadings.XML", "(0,0)")],
        Metric::Sensor => [("SENSOR_INFO.XML", "(1,ff)")],
    }
}

pub(crate) fn check_status(path: &str, response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        Ok(())
    } else {
        Err(Error::Status {
            path: path.to_owned(),
            status: response.status,
        })
    }
}

/// Parse requested metric names, rejecting duplicates first and unknown names second.
pub(crate) fn validate_metrics<S: AsRef<str>>(names: &[S]) -> Result<Vec<Metric>> {
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        if !seen.insert(name) {
            return Err(Error::DuplicateMetric(name.to_owned()));
        }
    }

    names.iter().map(|name| name.as_ref().parse()).collect()
}

pub(crate) fn decode_pmbus(body: &str) -> Result<Vec<PowerSupply>> {
    let records = extract_records(body, "PSItem")?;
    let psus = process_pmbus_response(&records)?;
    crate::observe::record_decoded("pmbus", records.len(), psus.len());
    Ok(psus)
}

pub(crate) fn decode_sensors(body: &str) -> Result<Vec<Sensor>> {
    let records = extract_records(body, "SENSOR")?;
    let sensors = process_sensor_response(&records)?;
    crate::observe::record_decoded("sensor", records.len(), sensors.len());
    Ok(sensors)
}
