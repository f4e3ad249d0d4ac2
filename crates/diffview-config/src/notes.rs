use relative_path::RelativePathBuf;
use serde::{Deserialize, Serialize};

/// The `[notes]` section of `diffview.toml`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Notes {
    /// The directory holding one `<version>.txt` per release, relative to the config file.
    #[serde(default = "default_dir")]
    pub dir: RelativePathBuf,
}

impl Default for Notes {
    fn default() -> Self {
        Self { dir: default_dir() }
    }
}

fn default_dir() -> RelativePathBuf {
    RelativePathBuf::from("messages")
}
