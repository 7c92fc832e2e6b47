/// Content Service Library
///
/// Posts and comments endpoints for the blog backend, with ownership-based
/// authorization decided by `content-authz`.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: Post and comment data structures
/// - `services`: Resolve → decide → mutate business logic
/// - `db`: Repositories (also the ownership-chain locator)
/// - `cache`: Redis post cache
/// - `middleware`: JWT identity and request metrics
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
