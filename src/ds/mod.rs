pub mod entry_arena;
pub mod entry_collection;

pub use entry_arena::{EntryArena, EntryId};
pub use entry_collection::EntryCollection;
