//! Application state with shared `DictionaryService` for concurrent access.
//!
//! [`AppState`] wraps the service in `Arc<tokio::sync::Mutex<>>` for use with
//! axum handlers. Uses `tokio::sync::Mutex` (async-aware) instead of
//! `std::sync::Mutex` (blocking) so handlers await the lock without blocking
//! the tokio runtime.
//!
//! Note: `tokio::sync::RwLock` would allow concurrent reads, but the SQLite
//! backend holds a `rusqlite::Connection`, which is `!Sync`.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::service::DictionaryService;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// The shared dictionary service (async Mutex, non-blocking await).
    pub service: Arc<tokio::sync::Mutex<DictionaryService>>,
    /// Settings read by extractors and list handlers.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Creates a new `AppState` with the backend selected by
    /// `config.db_path`.
    pub fn new(config: ServerConfig) -> Result<Self, ApiError> {
        let service = DictionaryService::open(&config.db_path)?;
        Ok(Self::with_service(service, config))
    }

    /// Creates a new `AppState` with an in-memory store and default settings
    /// (for testing).
    pub fn in_memory() -> Self {
        Self::with_service(DictionaryService::in_memory(), ServerConfig::default())
    }

    pub fn with_service(service: DictionaryService, config: ServerConfig) -> Self {
        AppState {
            service: Arc::new(tokio::sync::Mutex::new(service)),
            config: Arc::new(config),
        }
    }
}
