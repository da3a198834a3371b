//! # Folio Shared
//!
//! Wire types shared between the server and its clients.
//! Kept free of server dependencies so an editor client can compile it too.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, FieldErrorDto, PublishResponse};
