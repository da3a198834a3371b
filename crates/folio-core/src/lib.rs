//! # Folio Core
//!
//! The domain layer of the Folio publishing backend: the rich-text document
//! model, slugs, taxonomy resolution, drafts and autosave, the publishing
//! workflow and comment threading.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod document;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod slug;

pub use error::{DomainError, PublishError, RepoError};
