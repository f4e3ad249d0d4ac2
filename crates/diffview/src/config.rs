use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use diffview_config::Config;
use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

use crate::{fs, state::State};

/// Load the config at `path`, falling back to the defaults if there's no file there.
///
/// ## Errors
/// 1. The file exists but can't be read
/// 2. Can't parse file contents into a Config
pub(crate) fn load(path: &Path) -> Result<State, Error> {
    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !path.exists() {
        debug!("No {} found, using default config", path.display());
        return Ok(State {
            config: Config::default(),
            root,
        });
    }
    let source_code = fs::read_to_string(path)?;
    let config = Config::from_toml(&source_code)?;
    debug!("Loaded config from {}", path.display());
    Ok(State { config, root })
}

/// Print the config in use, as it would be written in `diffview.toml`.
pub(crate) fn show(state: &State, stdout: &mut impl Write) -> Result<(), Error> {
    let rendered = state.config.to_toml()?;
    write!(stdout, "{rendered}").map_err(Error::Stdout)
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fs(#[from] fs::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] diffview_config::Error),
    #[error("Could not render the config: {0}")]
    #[diagnostic(
        code(config::serialize),
        help("This is probably a bug in DiffView, please open an issue.")
    )]
    Serialize(#[from] toml::ser::Error),
    #[error("Error writing to stdout: {0}")]
    #[diagnostic(code(config::stdout))]
    Stdout(#[source] io::Error),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test_load {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let state = load(&temp_dir.path().join(Config::FILE_NAME)).unwrap();
        assert_eq!(state.config, Config::default());
        assert_eq!(state.root, temp_dir.path());
        assert_eq!(state.notes_dir().path(), temp_dir.path().join("messages"));
    }

    #[test]
    fn bare_file_name_is_relative_to_cwd() {
        let state = load(Path::new("does-not-exist.toml")).unwrap();
        assert_eq!(state.root, PathBuf::from("."));
    }

    #[test]
    fn invalid_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(Config::FILE_NAME);
        std::fs::write(&path, "[notes]\ndir = 5\n").unwrap();
        assert!(matches!(load(&path), Err(Error::Parse(_))));
    }

    #[test]
    fn show_defaults() {
        let state = load(Path::new("does-not-exist.toml")).unwrap();
        let mut out = Vec::new();
        show(&state, &mut out).unwrap();
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("dir = \"messages\""));
        assert_eq!(Config::from_toml(&shown).unwrap(), state.config);
    }
}
