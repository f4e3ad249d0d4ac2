use std::path::PathBuf;

use diffview_config::Config;
use diffview_notes::NoteDir;

/// Everything loaded before a command runs.
#[derive(Clone, Debug)]
pub(crate) struct State {
    pub(crate) config: Config,
    /// The directory the config file lives in (or would live in), which its paths are relative to
    pub(crate) root: PathBuf,
}

impl State {
    pub(crate) fn notes_dir(&self) -> NoteDir {
        NoteDir::new(self.config.notes.dir.to_path(&self.root))
    }
}

/// Whether a command should really change files or only say what it would do.
#[derive(Clone, Copy, Debug)]
pub(crate) enum RunType<T> {
    /// Don't write anything, log what would have been written instead.
    DryRun(T),
    /// Actually do the thing.
    Real(T),
}

impl<T> RunType<T> {
    #[must_use]
    pub(crate) fn of<R>(&self, new_value: R) -> RunType<R> {
        match self {
            RunType::DryRun(_) => RunType::DryRun(new_value),
            RunType::Real(_) => RunType::Real(new_value),
        }
    }

    pub(crate) fn take(self) -> (RunType<()>, T) {
        match self {
            RunType::DryRun(inner) => (RunType::DryRun(()), inner),
            RunType::Real(inner) => (RunType::Real(()), inner),
        }
    }
}
