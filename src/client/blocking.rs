use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::client::core::{
    ClientBuilder, ClientCore, IPMI_PATH, LOGIN_PATH, check_status, decode_pmbus, decode_sensors,
    query_form, validate_metrics,
};
use crate::error::{Error, Result};
use crate::transport::Transport;
use crate::transport::blocking::HttpTransport;
use crate::types::{Metric, Metrics, PowerSupply, Sensor};

/// A blocking client for the Supermicro BMC web interface.
///
/// The client logs in lazily and logs in again once the session timeout has
/// elapsed. Clones share one session; requests are serialized.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Mutex<Inner>>,
    server: Arc<str>,
}

struct Inner {
    transport: Box<dyn Transport + Send>,
    core: ClientCore,
}

impl ClientBuilder {
    /// Build a blocking [`Client`]. No request is sent yet.
    pub fn build(self) -> Result<Client> {
        let (core, http) = self.into_parts()?;
        let transport: Box<dyn Transport + Send> = Box::new(HttpTransport::new(
            &http.server,
            http.timeout,
            http.accept_invalid_certs,
        )?);

        Ok(Client {
            inner: Arc::new(Mutex::new(Inner { transport, core })),
            server: http.server.into(),
        })
    }
}

impl Client {
    /// Create a [`ClientBuilder`].
    pub fn builder(server: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(server)
    }

    /// Server address the client talks to.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Log in and start a new session, replacing the current one.
    pub fn login(&self) -> Result<()> {
        let mut inner = self.lock_inner()?;
        login_locked(&mut inner)
    }

    /// Time since the current session was established, if there is one.
    pub fn session_age(&self) -> Result<Option<Duration>> {
        Ok(self.lock_inner()?.core.session_age(Instant::now()))
    }

    /// Fetch and decode all power supplies (`Get_PSInfoReadings.XML`).
    pub fn get_pmbus_metrics(&self) -> Result<Vec<PowerSupply>> {
        let body = self.query(Metric::Pmbus)?;
        decode_pmbus(&body)
    }

    /// Fetch and decode all sensors (`SENSOR_INFO.XML`).
    pub fn get_sensor_metrics(&self) -> Result<Vec<Sensor>> {
        let body = self.query(Metric::Sensor)?;
        decode_sensors(&body)
    }

    /// Fetch the named metric categories (`"pmbus"`, `"sensor"`) in the given order.
    ///
    /// Names are validated before any request is sent.
    pub fn get_metrics<S: AsRef<str>>(&self, metrics: &[S]) -> Result<Metrics> {
        let metrics = validate_metrics(metrics)?;

        let mut result = Metrics::default();
        for metric in metrics {
            match metric {
                Metric::Pmbus => result.pmbus = Some(self.get_pmbus_metrics()?),
                Metric::Sensor => result.sensor = Some(self.get_sensor_metrics()?),
            }
        }
        Ok(result)
    }

    /// Fetch every known metric category.
    pub fn get_all_metrics(&self) -> Result<Metrics> {
        self.get_metrics(&Metric::ALL.map(Metric::as_str))
    }

    /// POST the query for `metric` and return the raw XML body.
    pub fn query(&self, metric: Metric) -> Result<String> {
        let mut inner = self.lock_inner()?;
        if inner.core.needs_login(Instant::now()) {
            login_locked(&mut inner)?;
        }

        let response = post_locked(&inner, IPMI_PATH, &query_form(metric))?;
        check_status(IPMI_PATH, &response)?;
        crate::debug::dump_body("ipmi response", IPMI_PATH, &response.body);
        Ok(response.body)
    }

    fn lock_inner(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::Protocol("client lock poisoned"))
    }
}

fn login_locked(inner: &mut Inner) -> Result<()> {
    let response = post_locked(inner, LOGIN_PATH, &inner.core.login_form())?;
    inner.core.finish_login(&response, Instant::now())?;
    crate::observe::record_login("blocking", inner.core.username());
    Ok(())
}

fn post_locked(
    inner: &Inner,
    path: &str,
    form: &[(&str, &str)],
) -> Result<crate::transport::HttpResponse> {
    let start = Instant::now();
    let result = inner.transport.post_form(path, form);
    let elapsed = start.elapsed();
    match &result {
        Ok(resp) => crate::observe::record_ok("blocking", path, elapsed, resp.status),
        Err(err) => crate::observe::record_err("blocking", path, elapsed, err),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::secret::SecretString;
    use crate::transport::HttpResponse;

    const PSU_XML: &str = r#"<?xml version="1.0"?>
        <IPMI><PSInfo>
          <PSItem name="SERIAL" a_b_PS_Status_I2C="1" psType="1" acInVoltage="ef"
                  acInCurrent="167" acInPower="54" dc12OutVoltage="79" dc12OutCurrent="1676"
                  dcOutPower="45" temp1="28" temp2="37" fan1="b4e" fan2="f07"/>
        </PSInfo></IPMI>"#;

    /// Records paths and answers logins with a cookie when `accept` is set.
    struct FakeTransport {
        accept: bool,
        logins: Arc<AtomicUsize>,
        queries: Arc<AtomicUsize>,
    }

    impl Transport for FakeTransport {
        fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<HttpResponse> {
            if path == LOGIN_PATH {
                self.logins.fetch_add(1, Ordering::SeqCst);
                return Ok(HttpResponse {
                    status: 200,
                    body: String::new(),
                    session_cookie: self.accept,
                });
            }
            self.queries.fetch_add(1, Ordering::SeqCst);
            assert_eq!(form, [("Get_PSInfoReadings.XML", "(0,0)")]);
            Ok(HttpResponse {
                status: 200,
                body: PSU_XML.to_owned(),
                session_cookie: false,
            })
        }
    }

    struct TimeoutTransport;

    impl Transport for TimeoutTransport {
        fn post_form(&self, _path: &str, _form: &[(&str, &str)]) -> Result<HttpResponse> {
            Err(Error::Timeout)
        }
    }

    fn client(transport: Box<dyn Transport + Send>, session_timeout: Duration) -> Client {
        Client {
            inner: Arc::new(Mutex::new(Inner {
                transport,
                core: ClientCore::new("ADMIN".into(), SecretString::new("pw"), session_timeout),
            })),
            server: "http://bmc".into(),
        }
    }

    fn fake(accept: bool) -> (FakeTransport, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let logins = Arc::new(AtomicUsize::new(0));
        let queries = Arc::new(AtomicUsize::new(0));
        let transport = FakeTransport {
            accept,
            logins: logins.clone(),
            queries: queries.clone(),
        };
        (transport, logins, queries)
    }

    #[test]
    fn first_query_logs_in_once() {
        let (transport, logins, queries) = fake(true);
        let client = client(Box::new(transport), Duration::from_secs(1800));

        let psus = client.get_pmbus_metrics().expect("pmbus");
        assert_eq!(psus.len(), 1);
        assert_eq!(psus[0].fan_2, 3847);

        client.clone().get_pmbus_metrics().expect("pmbus");
        assert_eq!(logins.load(Ordering::SeqCst), 1);
        assert_eq!(queries.load(Ordering::SeqCst), 2);
        assert!(client.session_age().expect("age").is_some());
    }

    #[test]
    fn expired_session_logs_in_again() {
        let (transport, logins, _) = fake(true);
        let client = client(Box::new(transport), Duration::from_nanos(1));

        client.get_pmbus_metrics().expect("pmbus");
        std::thread::sleep(Duration::from_millis(2));
        client.get_pmbus_metrics().expect("pmbus");
        assert_eq!(logins.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn rejected_login_is_reported() {
        let (transport, _, queries) = fake(false);
        let client = client(Box::new(transport), Duration::from_secs(1800));

        let err = client.get_pmbus_metrics().expect_err("expected auth error");
        assert!(matches!(err, Error::AuthenticationFailed { .. }));
        assert_eq!(queries.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_metrics_fail_before_any_request() {
        let client = client(Box::new(TimeoutTransport), Duration::from_secs(1800));

        let err = client.get_metrics(&["dupe", "dupe"]).expect_err("dupe");
        assert!(matches!(err, Error::DuplicateMetric(_)));

        let err = client
            .get_metrics(&["magic_school_bus"])
            .expect_err("invalid");
        assert!(matches!(err, Error::InvalidMetric(_)));
    }

    #[test]
    fn transport_errors_propagate() {
        let client = client(Box::new(TimeoutTransport), Duration::from_secs(1800));
        assert!(matches!(client.login(), Err(Error::Timeout)));
    }
}
