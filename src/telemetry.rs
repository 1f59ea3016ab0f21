use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Build the JSON subscriber; `RUST_LOG` overrides `default_filter`
pub fn get_subscriber<Sink>(default_filter: &str, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> tracing_subscriber::fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(sink)
        .with_target(true)
        .json();

    Registry::default().with(env_filter).with(formatting_layer)
}

/// Structured JSON logging to stdout at `info` unless `RUST_LOG` says otherwise
pub fn init_telemetry() {
    get_subscriber("info", std::io::stdout).init();
}
