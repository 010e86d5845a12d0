//! Logging setup utilities for the Tsudoi binaries.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, colored output
    #[default]
    Pretty,
    /// One JSON object per line (for container log collectors)
    Json,
}

/// Build the default filter directive for a binary.
///
/// Both the library crate (`tsudoi_server`) and the binary itself log at
/// `default_log_level`; every other crate stays at the subscriber default.
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "tsudoi_server={level},tsudoi_shared={level},{bin}={level},tower_http={level}",
        level = default_log_level,
        bin = binary_name.replace('-', "_"),
    )
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "tsudoi-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
/// * `format` - Pretty or JSON output
///
/// # Examples
///
/// ```no_run
/// use tsudoi_shared::logger::{LogFormat, setup_logger};
///
/// setup_logger("tsudoi-server", "debug", LogFormat::Pretty);
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
    tracing::debug!("Logger initialized for {} ({:?})", binary_name, format);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_covers_library_and_binary() {
        // テスト項目: ライブラリとバイナリの両方にログレベルが設定される
        // given (前提条件):
        let binary_name = "tsudoi-server";

        // when (操作):
        let directive = default_directive(binary_name, "debug");

        // then (期待する結果):
        assert!(directive.contains("tsudoi_server=debug"));
        assert!(directive.contains("tsudoi_shared=debug"));
        assert!(directive.split(',').all(|d| d.ends_with("=debug")));
    }
}
