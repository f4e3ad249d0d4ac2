use std::ops::Not;

use serde::{Deserialize, Serialize};

/// The `[diff]` section of `diffview.toml`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Diff {
    /// List an entry for the start of each changed file as well as its hunks.
    #[serde(default, skip_serializing_if = "<&bool>::not")]
    pub include_headers: bool,
}
