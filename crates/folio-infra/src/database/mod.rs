//! Relational persistence via SeaORM.

mod connections;
mod postgres_base;
pub mod postgres_repo;

pub mod entity;

pub use connections::{DatabaseConfig, DatabaseConnections};
pub use postgres_base::{Keyed, PostgresBaseRepository};
pub use postgres_repo::{
    PostgresCommentRepository, PostgresDraftRepository, PostgresPostRepository,
    PostgresTermRepository,
};
