extern crate std;

/// Holds the default subscriber for the duration of a test.
///
/// Drop it at the end of the test, not before, or events emitted later are lost.
#[must_use]
pub(crate) struct TestGuard {
    _default: tracing::subscriber::DefaultGuard,
}

/// Installs a fmt subscriber that writes through the test harness.
///
/// `RUST_LOG` overrides the default filter.
pub(crate) fn trace_init() -> TestGuard {
    trace_init_with_default("mola_typed_list=trace")
}

pub(crate) fn trace_init_with_default(default: &str) -> TestGuard {
    use tracing_subscriber::{
        filter::{EnvFilter, LevelFilter},
        util::SubscriberInitExt,
    };

    let env = std::env::var("RUST_LOG").unwrap_or_default();
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into());
    let filter = if env.is_empty() {
        builder.parse_lossy(default)
    } else {
        builder.parse_lossy(env)
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .without_time()
        .finish();

    TestGuard {
        _default: subscriber.set_default(),
    }
}
