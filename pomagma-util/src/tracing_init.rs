use tracing_subscriber::EnvFilter;

/// Guard returned by [`init_tracing`]; dropping it flushes the non-blocking file appender, if any.
pub struct TracingGuard(#[allow(dead_code)] Option<tracing_appender::non_blocking::WorkerGuard>);

/// Initializes the process-wide tracing subscriber from `POMAGMA_LOG_LEVEL`/`POMAGMA_LOG_FILE`.
///
/// `level` is a `tracing_subscriber::EnvFilter` directive string (e.g. `"info"`, `"debug"`);
/// `log_file` is an optional path to append structured logs to, in addition to stderr.
pub fn init_tracing(level: &str, log_file: Option<&std::path::Path>) -> TracingGuard {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .map(|n| n.to_owned())
                .unwrap_or_else(|| "pomagma.log".into());
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .init();
            TracingGuard(Some(guard))
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            TracingGuard(None)
        }
    }
}
