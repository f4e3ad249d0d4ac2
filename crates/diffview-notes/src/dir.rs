use std::{
    io,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;
#[cfg(feature = "miette")]
use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

use crate::{
    store::{DuplicateVersionError, NoteStore},
    version::{InvalidVersion, Version},
};

/// A directory of release notes, one `<version>.txt` file per release.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NoteDir {
    path: PathBuf,
}

impl NoteDir {
    pub const EXTENSION: &'static str = "txt";

    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the note for `version` lives (or would live).
    #[must_use]
    pub fn path_for(&self, version: &Version) -> PathBuf {
        self.path.join(format!("{version}.{ext}", ext = Self::EXTENSION))
    }

    /// Read every note in the directory into a [`NoteStore`], lowest version first.
    ///
    /// A directory that doesn't exist has no notes.
    ///
    /// # Errors
    ///
    /// 1. The directory or one of its notes can't be read
    /// 2. A `.txt` file isn't named after a version
    /// 3. Two files name the same version
    pub fn load(&self) -> Result<NoteStore, LoadError> {
        let entries = match std::fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(
                    "No release notes directory at {}, nothing to load",
                    self.path.display()
                );
                return Ok(NoteStore::new());
            }
            Err(source) => {
                return Err(LoadError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LoadError::Read {
                path: self.path.clone(),
                source,
            })?;
            let path = entry.path();
            let is_file = entry
                .file_type()
                .map_err(|source| LoadError::Read {
                    path: path.clone(),
                    source,
                })?
                .is_file();
            if !is_file || path.extension().map_or(true, |ext| ext != Self::EXTENSION) {
                debug!("Skipping {}, it isn't a release note", path.display());
                continue;
            }
            let stem = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let version = Version::from_str(&stem)
                .map_err(|source| LoadError::InvalidFileName {
                    path: path.clone(),
                    source,
                })?;
            files.push((version, path));
        }

        let mut store = NoteStore::new();
        for (version, path) in files
            .into_iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
        {
            let body = std::fs::read_to_string(&path).map_err(|source| LoadError::Read {
                path: path.clone(),
                source,
            })?;
            store
                .put(version, body)
                .map_err(|source| LoadError::DuplicateVersion { path, source })?;
        }
        debug!(
            "Loaded {count} release notes from {dir}",
            count = store.len(),
            dir = self.path.display()
        );
        Ok(store)
    }
}

#[derive(Debug, Error)]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
pub enum LoadError {
    #[error("Error reading from {path}: {source}")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(notes::read),
            help("Make sure you have permission to read this file.")
        )
    )]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not named after a version")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(notes::invalid_file_name),
            help("Every .txt file in the notes directory must be named like 1.0.1.txt")
        )
    )]
    InvalidFileName {
        path: PathBuf,
        #[source]
        source: InvalidVersion,
    },
    #[error("{path} describes a version that already has a release note")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(notes::duplicate_file),
            help("Each version can only have one release note")
        )
    )]
    DuplicateVersion {
        path: PathBuf,
        #[source]
        source: DuplicateVersionError,
    },
}
