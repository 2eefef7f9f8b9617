pub mod tracing;
pub mod logging;

pub use self::tracing::init_tracing;
pub use logging::{sanitize_url_for_logging, truncate_body, LoggingService};
