pub use diff::Diff;
#[cfg(feature = "miette")]
use miette::Diagnostic;
pub use notes::Notes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod diff;
mod notes;

/// Everything that can be set in `diffview.toml`. Every section is optional.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub notes: Notes,
    #[serde(default)]
    pub diff: Diff,
}

impl Config {
    pub const FILE_NAME: &'static str = "diffview.toml";

    /// Parse the contents of a `diffview.toml` file.
    ///
    /// # Errors
    ///
    /// If the contents aren't valid TOML or contain unknown keys.
    pub fn from_toml(source: &str) -> Result<Self, Error> {
        toml::from_str(source).map_err(Error)
    }

    /// Render this config the way it would be written in `diffview.toml`.
    ///
    /// # Errors
    ///
    /// If the config can't be represented as TOML, which shouldn't happen.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

#[derive(Debug, Error)]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
#[error("Invalid {file}: {0}", file = Config::FILE_NAME)]
#[cfg_attr(
    feature = "miette",
    diagnostic(
        code(config::parse),
        help("Check the keys against the [notes] and [diff] sections DiffView understands")
    )
)]
pub struct Error(#[source] toml::de::Error);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test_config {
    use pretty_assertions::assert_eq;
    use relative_path::RelativePathBuf;

    use super::*;

    #[test]
    fn empty_file_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.notes.dir, RelativePathBuf::from("messages"));
        assert!(!config.diff.include_headers);
    }

    #[test]
    fn every_key() {
        let config = Config::from_toml(
            r#"
            [notes]
            dir = "release-notes"

            [diff]
            include_headers = true
            "#,
        )
        .unwrap();
        assert_eq!(config.notes.dir, RelativePathBuf::from("release-notes"));
        assert!(config.diff.include_headers);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_toml("[notes]\nfolder = \"x\"").is_err());
        assert!(Config::from_toml("[settings]").is_err());
    }

    #[test]
    fn written_config_reads_back() {
        let config = Config::from_toml("[diff]\ninclude_headers = true").unwrap();
        let written = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&written).unwrap(), config);
    }
}
