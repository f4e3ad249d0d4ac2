use std::{
    io::{self, Write},
    path::Path,
};

use diffview_notes::{DuplicateVersionError, LoadError, NotFoundError, NoteStore, Version};
use miette::Diagnostic;
use thiserror::Error;
use tracing::info;

use crate::{
    fs,
    state::{RunType, State},
};

fn load(state: &State) -> Result<NoteStore, Error> {
    Ok(state.notes_dir().load()?)
}

/// Print every version that has a note, one per line.
pub(crate) fn list(state: &State, stdout: &mut impl Write) -> Result<(), Error> {
    let notes = load(state)?;
    for version in notes.list() {
        writeln!(stdout, "{version}").map_err(Error::Stdout)?;
    }
    Ok(())
}

/// Print the note for `version` byte-for-byte.
pub(crate) fn show(state: &State, version: &Version, stdout: &mut impl Write) -> Result<(), Error> {
    let notes = load(state)?;
    let body = notes.get(version)?;
    stdout.write_all(body.as_bytes()).map_err(Error::Stdout)
}

/// Print every note between `from` (exclusive) and `to` (inclusive), oldest first.
///
/// Having nothing to announce isn't an error, it just prints nothing.
pub(crate) fn upgrade(
    state: &State,
    from: Option<&Version>,
    to: &Version,
    stdout: &mut impl Write,
) -> Result<(), Error> {
    let notes = load(state)?;
    let upgrade_notes = notes.upgrade_notes(from, to);
    if upgrade_notes.is_empty() {
        info!("No release notes to show for {to}");
        return Ok(());
    }
    for (index, note) in upgrade_notes.into_iter().enumerate() {
        if index > 0 {
            writeln!(stdout).map_err(Error::Stdout)?;
        }
        write!(stdout, "## {}\n\n{}", note.version(), note.body()).map_err(Error::Stdout)?;
        if !note.body().ends_with('\n') {
            writeln!(stdout).map_err(Error::Stdout)?;
        }
    }
    Ok(())
}

/// Publish the note for a new version, read from `source` or stdin.
pub(crate) fn add(
    state: &State,
    version: RunType<&Version>,
    source: Option<&Path>,
) -> Result<(), Error> {
    let (run_type, version) = version.take();
    let body = match source {
        Some(path) => fs::read_to_string(path)?,
        None => fs::read_stdin()?,
    };

    let dir = state.notes_dir();
    let mut notes = dir.load()?;
    notes.put(version.clone(), body.as_str())?;

    fs::create_dir(run_type.of(dir.path()))?;
    let path = dir.path_for(version);
    fs::write_new(run_type.of(body.as_str()), &path)?;
    if let RunType::Real(()) = run_type {
        info!("Published release note for {version} at {}", path.display());
    }
    Ok(())
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    DuplicateVersion(#[from] DuplicateVersionError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fs(#[from] fs::Error),
    #[error("Error writing to stdout: {0}")]
    #[diagnostic(code(notes::stdout))]
    Stdout(#[source] io::Error),
}
