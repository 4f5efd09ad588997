pub(crate) fn enabled() -> bool {
    std::env::var("SMBMC_DEBUG")
        .map(|v| !v.is_empty())
        .unwrap_or(false)
}

pub(crate) fn dump_body(label: &str, path: &str, body: &str) {
    if !enabled() {
        return;
    }
    let out = format!("{label} {path} ({} bytes):\n{}", body.len(), body.trim_end());

    #[cfg(feature = "tracing")]
    tracing::trace!("{out}");

    #[cfg(not(feature = "tracing"))]
    eprintln!("{out}");
}
