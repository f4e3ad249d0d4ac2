//! The diff model behind DiffView: Git diffs split into files and hunks, the lines each hunk
//! touches on either side, and merging hunks from one side to the other.

mod file;
mod hunk;
mod merge;

pub use file::{parse_git_diff, Entry, FileDiff, Highlights, Padding, ParseError};
pub use hunk::{Hunk, HunkKind, LineRegion, RegionKind};
pub use merge::{Direction, MergeError, MergeState, Side};
