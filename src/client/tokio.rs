use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::client::core::{
    ClientBuilder, ClientCore, IPMI_PATH, LOGIN_PATH, check_status, decode_pmbus, decode_sensors,
    query_form, validate_metrics,
};
use crate::error::Result;
use crate::transport::tokio::HttpTransport;
use crate::transport::{AsyncTransport, HttpResponse};
use crate::types::{Metric, Metrics, PowerSupply, Sensor};

/// An async client for the Supermicro BMC web interface.
///
/// Behaves like [`Client`](crate::Client); concurrent callers wait on one
/// session so a refresh is only issued once.
#[derive(Clone)]
pub struct AsyncClient {
    inner: Arc<Mutex<Inner>>,
    server: Arc<str>,
}

struct Inner {
    transport: Box<dyn AsyncTransport + Send + Sync>,
    core: ClientCore,
}

impl ClientBuilder {
    /// Build an [`AsyncClient`]. No request is sent yet.
    pub fn build_async(self) -> Result<AsyncClient> {
        let (core, http) = self.into_parts()?;
        let transport: Box<dyn AsyncTransport + Send + Sync> = Box::new(HttpTransport::new(
            &http.server,
            http.timeout,
            http.accept_invalid_certs,
        )?);

        Ok(AsyncClient {
            inner: Arc::new(Mutex::new(Inner { transport, core })),
            server: http.server.into(),
        })
    }
}

impl AsyncClient {
    /// Create a [`ClientBuilder`].
    pub fn builder(server: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(server)
    }

    /// Server address the client talks to.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Log in and start a new session, replacing the current one.
    pub async fn login(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        login_locked(&mut inner).await
    }

    /// Time since the current session was established, if there is one.
    pub async fn session_age(&self) -> Option<Duration> {
        self.inner.lock().await.core.session_age(Instant::now())
    }

    /// Fetch and decode all power supplies (`Get_PSInfoReadings.XML`).
    pub async fn get_pmbus_metrics(&self) -> Result<Vec<PowerSupply>> {
        let body = self.query(Metric::Pmbus).await?;
        decode_pmbus(&body)
    }

    /// Fetch and decode all sensors (`SENSOR_INFO.XML`).
    pub async fn get_sensor_metrics(&self) -> Result<Vec<Sensor>> {
        let body = self.query(Metric::Sensor).await?;
        decode_sensors(&body)
    }

    /// Fetch the named metric categories (`"pmbus"`, `"sensor"`) in the given order.
    pub async fn get_metrics<S: AsRef<str>>(&self, metrics: &[S]) -> Result<Metrics> {
        let metrics = validate_metrics(metrics)?;

        let mut result = Metrics::default();
        for metric in metrics {
            match metric {
                Metric::Pmbus => result.pmbus = Some(self.get_pmbus_metrics().await?),
                Metric::Sensor => result.sensor = Some(self.get_sensor_metrics().await?),
            }
        }
        Ok(result)
    }

    /// Fetch every known metric category.
    pub async fn get_all_metrics(&self) -> Result<Metrics> {
        self.get_metrics(&Metric::ALL.map(Metric::as_str)).await
    }

    /// POST the query for `metric` and return the raw XML body.
    pub async fn query(&self, metric: Metric) -> Result<String> {
        let mut inner = self.inner.lock().await;
        if inner.core.needs_login(Instant::now()) {
            login_locked(&mut inner).await?;
        }

        let response = post_locked(&inner, IPMI_PATH, &query_form(metric)).await?;
        check_status(IPMI_PATH, &response)?;
        crate::debug::dump_body("ipmi response", IPMI_PATH, &response.body);
        Ok(response.body)
    }
}

async fn login_locked(inner: &mut Inner) -> Result<()> {
    let form = inner.core.login_form();
    let response = post_locked(inner, LOGIN_PATH, &form).await?;
    inner.core.finish_login(&response, Instant::now())?;
    crate::observe::record_login("async", inner.core.username());
    Ok(())
}

async fn post_locked(inner: &Inner, path: &str, form: &[(&str, &str)]) -> Result<HttpResponse> {
    let start = Instant::now();
    let result = inner.transport.post_form(path, form).await;
    let elapsed = start.elapsed();
    match &result {
        Ok(resp) => crate::observe::record_ok("async", path, elapsed, resp.status),
        Err(err) => crate::observe::record_err("async", path, elapsed, err),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::future::Future;
    use core::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::Error;
    use crate::secret::SecretString;

    const SENSOR_XML: &str = r#"<?xml version="1.0"?>
        <IPMI><SENSOR_INFO>
          <SENSOR NAME="PS1 Status" ERTYPE="6f" STYPE="08" OPTION="c0" READING="000100"/>
          <SENSOR NAME="PS2 Status" ERTYPE="6f" STYPE="08" OPTION="00" READING="000000"/>
        </SENSOR_INFO></IPMI>"#;

    struct FakeTransport {
        logins: Arc<AtomicUsize>,
    }

    impl AsyncTransport for FakeTransport {
        fn post_form<'a>(
            &'a self,
            path: &'a str,
            _form: &'a [(&'a str, &'a str)],
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse>> + Send + 'a>> {
            Box::pin(async move {
                let login = path == LOGIN_PATH;
                if login {
                    self.logins.fetch_add(1, Ordering::SeqCst);
                }
                Ok(HttpResponse {
                    status: 200,
                    body: if login { String::new() } else { SENSOR_XML.to_owned() },
                    session_cookie: login,
                })
            })
        }
    }

    #[tokio::test]
    async fn concurrent_queries_share_one_login() {
        let logins = Arc::new(AtomicUsize::new(0));
        let client = AsyncClient {
            inner: Arc::new(Mutex::new(Inner {
                transport: Box::new(FakeTransport {
                    logins: logins.clone(),
                }),
                core: ClientCore::new(
                    "ADMIN".into(),
                    SecretString::new("pw"),
                    Duration::from_secs(1800),
                ),
            })),
            server: "http://bmc".into(),
        };

        let (a, b) = tokio::join!(client.get_sensor_metrics(), client.get_sensor_metrics());
        let (a, b) = (a.expect("sensors"), b.expect("sensors"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 1);
        assert_eq!(logins.load(Ordering::SeqCst), 1);

        let err = client.get_metrics(&["sensor", "sensor"]).await;
        assert!(matches!(err, Err(Error::DuplicateMetric(_))));
    }
}
