//! In-memory repositories - used when no database is configured and in tests.
//!
//! Each store enforces the same uniqueness rules as the relational schema so
//! the core sees identical conflict behavior.
//! Note: Data is lost on process restart.

mod comments;
mod drafts;
mod posts;
mod terms;

pub use comments::InMemoryCommentRepository;
pub use drafts::InMemoryDraftRepository;
pub use posts::InMemoryPostRepository;
pub use terms::InMemoryTermRepository;
