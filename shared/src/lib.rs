pub mod db;
pub mod error;
pub mod extract;

use serde::{Deserialize, Serialize};

pub use db::{build_pool, run_migrations, DbPool};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use extract::{ApiJson, ApiPath};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

impl DeleteResponse {
    pub fn deleted(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupResponse {
    pub message: String,
    pub applied: Vec<String>,
}

impl SetupResponse {
    pub fn new(applied: Vec<String>) -> Self {
        let message = if applied.is_empty() {
            "Database schema already up to date".to_string()
        } else {
            format!("Database setup complete, applied {} migration(s)", applied.len())
        };
        Self { message, applied }
    }
}
