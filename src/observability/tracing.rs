use tracing::subscriber::set_global_default;
use tracing_subscriber::{
    fmt::{self, format::JsonFields},
    layer::SubscriberExt,
    EnvFilter, Registry,
};
use crate::error::{EngineError, EngineResult};

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info,employee_search_proxy=debug,tower_http=debug";

/// Initialize global tracing subscriber with JSON formatting
pub fn init_tracing() -> EngineResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let formatting_layer = fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(false)
        .with_span_list(true)
        .fmt_fields(JsonFields::new());

    let subscriber = Registry::default()
        .with(env_filter)
        .with(formatting_layer);

    set_global_default(subscriber)
        .map_err(|e| EngineError::Internal(format!("Failed to set global subscriber: {}", e)))?;

    Ok(())
}
