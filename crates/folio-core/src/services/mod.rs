//! Application services built on the ports.

pub mod autosave;
pub mod comments;
pub mod drafts;
pub mod publishing;
pub mod taxonomy;

pub use autosave::{
    AuthoringState, AutosaveConfig, AutosaveSession, AutosaveStatus, LOCAL_DRAFT_KEY,
    LocalDraftRecord, SessionStart,
};
pub use comments::{CommentService, build_tree, cascade_delete};
pub use drafts::{AuthorDrafts, DraftService};
pub use publishing::{PostInput, PublishConfig, PublishOutcome, PublishingWorkflow};
pub use taxonomy::{Resolution, TaxonomyResolver};
