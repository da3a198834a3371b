//! SeaORM entities.

pub mod comment;
pub mod draft;
pub mod post;
pub mod post_term;
pub mod term;
