//! Proxies to FS utils that _either_ actually write to files or log what they would do (for dry runs).

use std::{
    fmt::Display,
    fs::OpenOptions,
    io,
    io::Write,
    path::{Path, PathBuf},
};

use miette::Diagnostic;
use thiserror::Error;
use tracing::{info, trace};

use crate::state::RunType;

/// Create a new file containing `contents`, refusing to touch a file that already exists.
///
/// On a dry run, only logs what would be written.
pub(crate) fn write_new<C: AsRef<[u8]> + Display>(
    contents: RunType<C>,
    path: &Path,
) -> Result<(), Error> {
    match contents {
        RunType::DryRun(contents) => {
            info!("Would create {} containing:\n{contents}", path.display());
            Ok(())
        }
        RunType::Real(contents) => {
            trace!("Writing {} to {}", contents, path.display());
            let mut file = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .map_err(|source| {
                    if source.kind() == io::ErrorKind::AlreadyExists {
                        Error::Exists { path: path.into() }
                    } else {
                        Error::Write {
                            path: path.into(),
                            source,
                        }
                    }
                })?;
            file.write_all(contents.as_ref())
                .map_err(|source| Error::Write {
                    path: path.into(),
                    source,
                })
        }
    }
}

pub(crate) fn create_dir(path: RunType<&Path>) -> Result<(), Error> {
    match path {
        RunType::DryRun(path) => {
            if !path.exists() {
                info!("Would create directory {}", path.display());
            }
            Ok(())
        }
        RunType::Real(path) => {
            trace!("Creating directory {}", path.display());
            std::fs::create_dir_all(path).map_err(|source| Error::Write {
                path: path.into(),
                source,
            })
        }
    }
}

pub(crate) fn read_to_string<P: AsRef<Path> + Into<PathBuf>>(path: P) -> Result<String, Error> {
    std::fs::read_to_string(path.as_ref()).map_err(|source| Error::Read {
        path: path.into(),
        source,
    })
}

pub(crate) fn read_stdin() -> Result<String, Error> {
    io::read_to_string(io::stdin()).map_err(Error::Stdin)
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum Error {
    #[error("Error writing to {path}: {source}")]
    #[diagnostic(
        code(fs::write),
        help("Make sure you have permission to write to this file.")
    )]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} already exists")]
    #[diagnostic(
        code(fs::exists),
        help("Release notes are never overwritten, publish a new version instead.")
    )]
    Exists { path: PathBuf },
    #[error("Error reading from {path}: {source}")]
    #[diagnostic(
        code(fs::read),
        help("Make sure you have permission to read this file.")
    )]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error reading from stdin: {0}")]
    #[diagnostic(code(fs::stdin))]
    Stdin(#[source] io::Error),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test_fs {
    use super::*;

    #[test]
    fn write_new_refuses_to_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("1.0.0.txt");
        write_new(RunType::Real("first"), &path).unwrap();
        let err = write_new(RunType::Real("second"), &path).unwrap_err();
        assert!(matches!(err, Error::Exists { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");
    }

    #[test]
    fn dry_run_writes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("messages");
        create_dir(RunType::DryRun(dir.as_path())).unwrap();
        write_new(RunType::DryRun("hello"), &dir.join("1.0.0.txt")).unwrap();
        assert!(!dir.exists());
    }
}
