use indexmap::{map::Keys, IndexMap};
use itertools::Itertools;
#[cfg(feature = "miette")]
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, trace};

use crate::version::Version;

/// The announcement shown to users for a single release.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReleaseNote {
    version: Version,
    /// The full text, rendered verbatim by whatever displays it
    body: String,
}

impl ReleaseNote {
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// A write-once collection of release notes keyed by version.
///
/// Notes keep the order they were added in. Once a version has a note, that note can never be
/// replaced or removed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NoteStore {
    notes: IndexMap<Version, ReleaseNote>,
}

impl NoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the body of the note for `version`.
    ///
    /// # Errors
    ///
    /// If no note was ever stored for `version`.
    pub fn get(&self, version: &Version) -> Result<&str, NotFoundError> {
        self.notes
            .get(version)
            .map(ReleaseNote::body)
            .ok_or_else(|| NotFoundError {
                version: version.clone(),
            })
    }

    /// Store a new note.
    ///
    /// # Errors
    ///
    /// If a note for `version` already exists. The existing note is left untouched.
    pub fn put(
        &mut self,
        version: Version,
        body: impl Into<String>,
    ) -> Result<(), DuplicateVersionError> {
        if self.notes.contains_key(&version) {
            return Err(DuplicateVersionError { version });
        }
        debug!("Adding release note for {version}");
        let note = ReleaseNote {
            version: version.clone(),
            body: body.into(),
        };
        self.notes.insert(version, note);
        Ok(())
    }

    /// Every known version, in the order they were added.
    ///
    /// Call this again (or clone the result) to start over.
    #[must_use]
    pub fn list(&self) -> Versions<'_> {
        Versions {
            inner: self.notes.keys(),
        }
    }

    /// All notes, in the order they were added.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ReleaseNote> + Clone {
        self.notes.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// The note for the highest version, regardless of insertion order.
    #[must_use]
    pub fn latest(&self) -> Option<&ReleaseNote> {
        self.notes.values().max_by(|a, b| a.version.cmp(&b.version))
    }

    /// The notes someone moving from `from` to `to` hasn't seen yet, oldest first.
    ///
    /// `from` is exclusive and `to` inclusive. `None` for `from` means a fresh install, which
    /// sees every note up to `to`.
    #[must_use]
    pub fn upgrade_notes(&self, from: Option<&Version>, to: &Version) -> Vec<&ReleaseNote> {
        let notes = self
            .notes
            .values()
            .filter(|note| from.map_or(true, |from| note.version > *from))
            .filter(|note| note.version <= *to)
            .sorted_by(|a, b| a.version.cmp(&b.version))
            .collect_vec();
        trace!(
            "Found {count} release notes between {from} and {to}",
            count = notes.len(),
            from = from.map_or_else(|| "install".to_string(), ToString::to_string),
        );
        notes
    }
}

impl<'store> IntoIterator for &'store NoteStore {
    type Item = &'store ReleaseNote;
    type IntoIter = indexmap::map::Values<'store, Version, ReleaseNote>;

    fn into_iter(self) -> Self::IntoIter {
        self.notes.values()
    }
}

/// A lazy, restartable sequence of versions created by [`NoteStore::list`].
#[derive(Clone, Debug)]
pub struct Versions<'store> {
    inner: Keys<'store, Version, ReleaseNote>,
}

impl<'store> Iterator for Versions<'store> {
    type Item = &'store Version;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Versions<'_> {}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
#[error("There is no release note for version {version}")]
#[cfg_attr(
    feature = "miette",
    diagnostic(
        code(notes::not_found),
        help("Only versions that announced something have a release note")
    )
)]
pub struct NotFoundError {
    pub version: Version,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
#[error("A release note for version {version} already exists")]
#[cfg_attr(
    feature = "miette",
    diagnostic(
        code(notes::duplicate_version),
        help("Release notes can't be changed once published, use a new version instead")
    )
)]
pub struct DuplicateVersionError {
    pub version: Version,
}
