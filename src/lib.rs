/// Posts Service Library
///
/// A small social-blogging backend: users publish text/image posts, organize
/// them into groups, comment on posts, and follow authors to build a
/// personalized feed. Routing dispatch, session establishment, templating and
/// media serving are external collaborators; this crate owns the data model,
/// form validation, the feed/follow query engine, and the time-based index
/// page cache.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `models`: entities, row types and API views
/// - `services`: validation, post/comment/follow writes, feed assembly
/// - `db`: pool construction, repositories and the `ContentStore` read seam
/// - `cache`: TTL-based page cache with a disabled passthrough mode
/// - `middleware`: viewer identity extractors
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
