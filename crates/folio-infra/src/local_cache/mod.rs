//! Local draft caches - where an authoring session mirrors unsaved edits.

mod file;
mod memory;

pub use file::FileLocalCache;
pub use memory::InMemoryLocalCache;
