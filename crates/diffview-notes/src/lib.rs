mod dir;
mod store;
pub mod version;

pub use dir::{LoadError, NoteDir};
pub use store::{DuplicateVersionError, NotFoundError, NoteStore, ReleaseNote, Versions};
pub use version::{InvalidVersion, Prerelease, Version};
