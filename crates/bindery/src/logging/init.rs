use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` names one. Bind and
/// unbind summaries are `debug`, per-element sync decisions are `trace`.
const DEFAULT_FILTER: &str = "info";

/// Filter that shows every sync decision the engine makes.
const TRACE_FILTER: &str = "bindery=trace";

/// How [`init_logging`] sets up `env_logger`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` directives such as `"warn"` or `"bindery::propagate=trace"`.
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { env_filter: None, write_style: env_logger::WriteStyle::Auto }
    }
}

impl LoggingConfig {
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Trace every element read and write made by bound views.
    pub fn trace_bindings(self) -> Self {
        self.filter(TRACE_FILTER)
    }

    /// The directives in effect: the configured filter, else `rust_log`, else
    /// [`DEFAULT_FILTER`].
    fn directives(&self, rust_log: Option<String>) -> String {
        self.env_filter
            .clone()
            .or(rust_log)
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }
}

static INIT: Once = Once::new();

/// Install `env_logger` for the process. Only the first call has an effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let directives = config.directives(std::env::var("RUST_LOG").ok());
        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&directives).write_style(config.write_style);

        // A test harness or host app may have installed a logger already.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized with {directives:?}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_prefer_config_then_env() {
        let traced = LoggingConfig::default().trace_bindings();
        assert_eq!(traced.directives(Some("warn".into())), "bindery=trace");
        assert_eq!(LoggingConfig::default().directives(Some("warn".into())), "warn");
        assert_eq!(LoggingConfig::default().directives(None), "info");
        assert_eq!(LoggingConfig::default().directives(Some("  ".into())), "info");
    }

    #[test]
    fn init_is_idempotent() {
        init_logging(LoggingConfig::default().trace_bindings());
        init_logging(LoggingConfig::default());
        log::trace!("still alive");
    }
}
