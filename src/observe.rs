use std::time::Duration;

use crate::error::Error;

pub(crate) fn record_ok(mode: &'static str, path: &str, elapsed: Duration, status: u16) {
    let _ = (mode, path, elapsed, status);

    #[cfg(feature = "metrics")]
    {
        metrics::counter!("smbmc_requests_total", "mode" => mode, "outcome" => "ok").increment(1);
        metrics::histogram!("smbmc_request_seconds", "mode" => mode).record(elapsed.as_secs_f64());
    }

    #[cfg(feature = "tracing")]
    {
        tracing::debug!(
            mode,
            path,
            status,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "bmc request ok"
        );
    }
}

pub(crate) fn record_err(mode: &'static str, path: &str, elapsed: Duration, err: &Error) {
    let _ = (mode, path, elapsed, err);

    #[cfg(feature = "metrics")]
    {
        metrics::counter!("smbmc_requests_total", "mode" => mode, "outcome" => "err").increment(1);
        metrics::counter!(
            "smbmc_request_errors_total",
            "mode" => mode,
            "kind" => error_kind(err)
        )
        .increment(1);
        metrics::histogram!("smbmc_request_seconds", "mode" => mode).record(elapsed.as_secs_f64());
    }

    #[cfg(feature = "tracing")]
    {
        tracing::warn!(
            mode,
            path,
            error = %err,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "bmc request failed"
        );
    }
}

pub(crate) fn record_login(mode: &'static str, username: &str) {
    let _ = (mode, username);

    #[cfg(feature = "metrics")]
    metrics::counter!("smbmc_logins_total", "mode" => mode).increment(1);

    #[cfg(feature = "tracing")]
    tracing::debug!(mode, username, "bmc session established");
}

pub(crate) fn record_decoded(kind: &'static str, records: usize, decoded: usize) {
    let _ = (kind, records, decoded);

    #[cfg(feature = "tracing")]
    tracing::debug!(kind, records, decoded, "decoded bmc response");
}

#[cfg(feature = "metrics")]
fn error_kind(err: &Error) -> &'static str {
    match err {
        Error::MalformedField(_)
        | Error::OutOfRange(_)
        | Error::MissingField(_)
        | Error::UnknownCode { .. } => "decode",
        Error::UnimplementedFormula(_) | Error::UnimplementedDiscreteType(_) => "unimplemented",
        Error::Xml(_) => "xml",
        #[cfg(any(feature = "blocking", feature = "async"))]
        Error::Http(_) => "http",
        Error::Timeout => "timeout",
        Error::Status { .. } => "status",
        Error::AuthenticationFailed { .. } => "authentication",
        Error::DuplicateMetric(_) | Error::InvalidMetric(_) => "invalid_metric",
        Error::InvalidArgument(_) | Error::MissingEnv(_) => "invalid_argument",
        Error::Protocol(_) => "protocol",
    }
}
