use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `log_level`. Output goes to stderr so it does not
/// interleave with the rendered estimate on stdout.
pub fn init_tracing(service_name: &str, log_level: &str, json: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true);

    let fmt_layer = if json {
        fmt_layer.json().flatten_event(true).boxed()
    } else {
        fmt_layer.boxed()
    };

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();

    match result {
        Ok(()) => tracing::debug!(service = service_name, "Tracing initialized"),
        Err(e) => eprintln!(
            "Failed to initialize tracing for '{}': {}",
            service_name, e
        ),
    }
}
