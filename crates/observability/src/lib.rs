//! Process-wide logging setup for the wardcast binaries and tests.

pub mod subscriber;

pub use subscriber::LogFormat;

/// Install the global subscriber, reading `RUST_LOG` and `WARDCAST_LOG_FORMAT`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let format = std::env::var("WARDCAST_LOG_FORMAT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    subscriber::init(format);
}
