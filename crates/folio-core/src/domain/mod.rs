//! Domain entities - the core business objects.

mod comment;
mod draft;
mod post;
mod taxonomy;
mod user;

pub use comment::{Comment, CommentThread};
pub use draft::{Draft, DraftInput};
pub use post::{Post, PostStatus};
pub use taxonomy::{Category, Tag, Term, TermKind};
pub use user::CurrentUser;
