use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive, e.g. `taskpad=debug`
pub const LOG_ENV: &str = "TASKPAD_LOG";

/// Install the stderr subscriber.
///
/// `TASKPAD_LOG` wins when set; otherwise `verbose` picks debug, else warn.
/// Calling twice is harmless: the second install is ignored.
pub fn init(verbose: bool) {
    let default = if verbose { "taskpad=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .try_init();
}
