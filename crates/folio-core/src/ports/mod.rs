//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod draft_store;
mod local_cache;
mod repository;

pub use auth::{AuthError, TokenClaims, TokenService};
pub use draft_store::DraftStore;
pub use local_cache::{LocalCache, LocalCacheError};
pub use repository::{
    BaseRepository, CommentRepository, DraftRepository, PostRepository, TermRepository,
};
