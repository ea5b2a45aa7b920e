//! Tracing subscriber setup

use procura_domain::LoggingConfig;
use tracing_subscriber::fmt;

/// Crates whose events are shown at the configured level by default.
const ENGINE_TARGETS: [&str; 3] = ["procura_domain", "procura_core", "procura_infra"];

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise the engine crates log at
/// `config.level`. A second call is a no-op and returns `false`.
pub fn init(config: &LoggingConfig) -> bool {
    let filter = filter_directive(std::env::var("RUST_LOG").ok(), &config.level);

    let installed = if config.json {
        fmt().with_env_filter(filter).json().try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };
    installed.is_ok()
}

fn filter_directive(rust_log: Option<String>, level: &str) -> String {
    rust_log.filter(|value| !value.trim().is_empty()).unwrap_or_else(|| {
        let level = if level.trim().is_empty() { "info" } else { level.trim() };
        ENGINE_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .chain(std::iter::once("warn".to_string()))
            .collect::<Vec<_>>()
            .join(",")
    })
}
