pub mod server;
pub mod engine;
pub mod observability;
pub mod error;
pub mod types;
pub mod config;

pub use error::{EngineError, EngineResult, ValidationError};
pub use types::*;
pub use server::{ProxyServer, AppState, create_router};
pub use engine::{EngineClient, IndexSchema};
pub use config::Config;
