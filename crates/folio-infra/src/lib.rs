//! # Folio Infrastructure
//!
//! Concrete implementations of the ports defined in `folio-core`.
//! This crate contains the database, local draft cache, and identity adapters.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL database support via SeaORM
//! - `auth` - JWT bearer-token identity

pub mod local_cache;
pub mod memory;

#[cfg(feature = "postgres")]
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use local_cache::{FileLocalCache, InMemoryLocalCache};
pub use memory::{
    InMemoryCommentRepository, InMemoryDraftRepository, InMemoryPostRepository,
    InMemoryTermRepository,
};

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConfig, DatabaseConnections, PostgresCommentRepository, PostgresDraftRepository,
    PostgresPostRepository, PostgresTermRepository,
};

#[cfg(feature = "auth")]
pub use auth::{JwtConfig, JwtTokenService};
