use serde_json::{json, Value};
use std::collections::HashMap;
use std::env;
use tracing::{event, Level};
use uuid::Uuid;
use crate::error::EngineError;

/// Longest engine response body echoed into a log line
const MAX_LOGGED_BODY: usize = 2048;

/// Structured JSON logging for engine calls
#[derive(Debug, Clone)]
pub struct LoggingService {
    service_name: String,
    service_version: String,
}

impl LoggingService {
    /// Create a new logging service
    pub fn new() -> Self {
        let service_name = env::var("SERVICE_NAME")
            .unwrap_or_else(|_| env!("CARGO_PKG_NAME").to_string());

        let service_version = env::var("SERVICE_VERSION")
            .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

        Self {
            service_name,
            service_version,
        }
    }

    /// Log a structured message tagged with a call id
    pub fn log_structured(&self, level: Level, call_id: Uuid, message: &str, fields: Option<HashMap<String, Value>>) {
        let mut log_entry = json!({
            "message": message,
            "service": {
                "name": self.service_name,
                "version": self.service_version,
            }
        });

        if let Some(fields) = fields {
            if let Value::Object(ref mut map) = log_entry {
                for (key, value) in fields {
                    map.insert(key, value);
                }
            }
        }

        match level {
            Level::ERROR => event!(Level::ERROR, %call_id, "{}", log_entry),
            Level::WARN => event!(Level::WARN, %call_id, "{}", log_entry),
            Level::INFO => event!(Level::INFO, %call_id, "{}", log_entry),
            Level::DEBUG => event!(Level::DEBUG, %call_id, "{}", log_entry),
            Level::TRACE => event!(Level::TRACE, %call_id, "{}", log_entry),
        }
    }

    /// Log a completed engine round trip. The body goes out at debug level whatever the status.
    pub fn log_engine_call(
        &self,
        call_id: Uuid,
        operation: &str,
        method: &str,
        path: &str,
        status: u16,
        duration_ms: f64,
        body: &str,
    ) {
        let fields = HashMap::from([
            ("operation".to_string(), json!(operation)),
            ("method".to_string(), json!(method)),
            ("path".to_string(), json!(path)),
            ("status".to_string(), json!(status)),
            ("duration_ms".to_string(), json!(duration_ms)),
        ]);

        let level = if (200..300).contains(&status) { Level::INFO } else { Level::WARN };
        self.log_structured(level, call_id, "Engine call completed", Some(fields));

        let body_fields = HashMap::from([
            ("operation".to_string(), json!(operation)),
            ("body".to_string(), json!(truncate_body(body))),
        ]);
        self.log_structured(Level::DEBUG, call_id, "Engine response body", Some(body_fields));
    }

    /// Log error with context
    pub fn log_error(&self, call_id: Uuid, error: &EngineError, context: Option<HashMap<String, Value>>) {
        let mut fields = HashMap::from([
            ("error_type".to_string(), json!(error.error_type())),
            ("error_message".to_string(), json!(error.to_string())),
        ]);

        if let Some(context) = context {
            fields.extend(context);
        }

        self.log_structured(Level::ERROR, call_id, "Engine call failed", Some(fields));
    }
}

impl Default for LoggingService {
    fn default() -> Self {
        Self::new()
    }
}

/// Cut an engine body down to a loggable size on a char boundary
pub fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_LOGGED_BODY {
        return body.to_string();
    }
    let mut end = MAX_LOGGED_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

/// Sanitize URL for logging by masking credentials and dropping the query
pub fn sanitize_url_for_logging(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut sanitized = parsed.clone();
        if parsed.password().is_some() {
            let _ = sanitized.set_password(Some("***"));
        }
        if !parsed.username().is_empty() {
            let _ = sanitized.set_username("***");
        }
        sanitized.set_query(None);
        sanitized.to_string()
    } else if let Some(pos) = url.find("://") {
        format!("{}://***", &url[..pos])
    } else {
        "***".to_string()
    }
}
