use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        DefaultBodyLimit, Query, Request, State,
    },
    http::{HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::any,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::engine::EngineClient;
use crate::error::{EngineError, EngineResult, ValidationError};
use crate::types::{DeletedEmployee, Employee, ErrorResponse, HealthResponse};

/// HTTP front service for the employee index
pub struct ProxyServer {
    app: Router,
    config: Config,
}

/// Shared application state
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// Engine client every handler delegates to
    pub engine: Arc<EngineClient>,
}

/// Query parameters of `/delete`
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
}

/// Query parameters of `/search`
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
}

impl ProxyServer {
    /// Build the engine client, verify the engine, declare the index and seed if configured
    pub async fn new(config: Config) -> EngineResult<Self> {
        info!("Initializing employee proxy components...");

        let engine = Arc::new(EngineClient::new(config.engine.clone())?);

        engine.check_health().await?;
        info!("Engine health check passed");

        engine.create_index().await?;

        if let Some(seed) = &config.seed {
            info!("Seeding employees in [{}, {})", seed.id_start, seed.id_end);
            engine.seeding_data(seed.id_start, seed.id_end).await?;
        }

        Ok(Self::with_engine(config, engine))
    }

    /// Wire the router around an already prepared engine client
    pub fn with_engine(config: Config, engine: Arc<EngineClient>) -> Self {
        let state = Arc::new(AppState {
            config: config.clone(),
            engine,
        });

        let app = create_router(state);

        info!("Employee proxy initialized successfully");
        ProxyServer { app, config }
    }

    /// Router, for embedding or testing
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Run the HTTP server until ctrl-c
    pub async fn run(self) -> EngineResult<()> {
        let bind_addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| EngineError::ConfigError(format!("Failed to bind to {}: {}", bind_addr, e)))?;

        info!("listening server on {}", bind_addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| EngineError::Internal(format!("Server error: {}", e)))?;

        info!("Server stopped");
        Ok(())
    }
}

/// Build the router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/insert", any(insert_handler))
        .route("/update", any(update_handler))
        .route("/delete", any(delete_handler))
        .route("/search", any(search_handler))
        .route("/health", any(health_handler))
        .layer(DefaultBodyLimit::max(state.config.server.max_request_size))
        .layer(middleware::from_fn_with_state(state.clone(), request_timeout_middleware))
        .layer(middleware::from_fn(security_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// Middleware bounding the whole request, engine round trip included
async fn request_timeout_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    match timeout(Duration::from_millis(state.config.server.request_timeout_ms), next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            error!("Request timeout on {}", path);
            EngineError::Timeout.into_response()
        }
    }
}

/// Middleware for security headers
async fn security_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));

    response
}

/// Decode an employee from the raw body, whatever content type the caller sent
fn decode_employee(payload: Result<Bytes, BytesRejection>) -> EngineResult<Employee> {
    let body = payload.map_err(|rejection| {
        warn!("Rejected employee body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            EngineError::PayloadTooLarge(rejection.body_text())
        } else {
            EngineError::from(ValidationError::InvalidBody(rejection.body_text()))
        }
    })?;

    serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected employee body: {}", e);
        EngineError::from(ValidationError::InvalidBody(e.to_string()))
    })
}

fn decode_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ValidationError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| ValidationError::InvalidQuery(rejection.body_text()))
}

/// Parse the `id` query parameter, rejecting anything that is not an integer
fn parse_id(params: &DeleteParams) -> Result<i64, ValidationError> {
    let raw = params
        .id
        .as_deref()
        .ok_or(ValidationError::MissingParam("id"))?;
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::InvalidId(raw.to_string()))
}

/// Handler for `/insert`
async fn insert_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Bytes, BytesRejection>,
) -> EngineResult<Json<Employee>> {
    let employee = decode_employee(payload)?;
    info!("Inserting employee {}", employee.id);

    state.engine.insert_data(&employee).await?;
    Ok(Json(employee))
}

/// Handler for `/update`
async fn update_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Bytes, BytesRejection>,
) -> EngineResult<Json<Employee>> {
    let employee = decode_employee(payload)?;
    info!("Updating employee {}", employee.id);

    state.engine.update_data(&employee).await?;
    Ok(Json(employee))
}

/// Handler for `/delete`
async fn delete_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DeleteParams>, QueryRejection>,
) -> EngineResult<Json<DeletedEmployee>> {
    let id = parse_id(&decode_query(query)?)?;
    info!("Deleting employee {}", id);

    state.engine.delete_data(id).await?;
    Ok(Json(DeletedEmployee { id }))
}

/// Handler for `/search`
async fn search_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> EngineResult<Json<Vec<Employee>>> {
    let keyword = decode_query(query)?.keyword.unwrap_or_default();
    let employees = state.engine.search_data(&keyword).await?;
    Ok(Json(employees))
}

/// Handler for `/health`
async fn health_handler(State(state): State<Arc<AppState>>) -> EngineResult<Json<HealthResponse>> {
    state.engine.check_health().await?;
    Ok(Json(HealthResponse::ok()))
}
