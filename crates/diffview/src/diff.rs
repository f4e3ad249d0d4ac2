use std::{
    io::{self, Write},
    path::Path,
};

use diffview_diff::{parse_git_diff, ParseError};
use itertools::Itertools;
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info};

use crate::{fs, state::State};

/// How `diffview diff` lists hunks.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Format {
    /// Three lines per hunk instead of one
    pub(crate) long: bool,
    pub(crate) include_headers: bool,
}

/// Read a Git diff from `input` (or stdin) and list its hunks.
pub(crate) fn run(
    input: Option<&Path>,
    format: Format,
    state: &State,
    stdout: &mut impl Write,
) -> Result<(), Error> {
    let text = match input {
        Some(path) => fs::read_to_string(path)?,
        None => fs::read_stdin()?,
    };
    list_hunks(&text, format, state, stdout)
}

fn list_hunks(
    text: &str,
    format: Format,
    state: &State,
    stdout: &mut impl Write,
) -> Result<(), Error> {
    let files = parse_git_diff(text, &state.root);
    debug!("Diff covers {} files", files.len());

    let mut descriptions = Vec::new();
    for file in &files {
        for entry in file.entries(format.include_headers)? {
            if format.long {
                descriptions.push(entry.description().iter().join("\n"));
            } else {
                descriptions.push(entry.oneline_description());
            }
        }
    }
    if descriptions.is_empty() {
        info!("No changes found");
        return Ok(());
    }

    let separator = if format.long { "\n\n" } else { "\n" };
    writeln!(stdout, "{}", descriptions.iter().join(separator)).map_err(Error::Stdout)
}

#[derive(Debug, Diagnostic, Error)]
pub(crate) enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fs(#[from] fs::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),
    #[error("Error writing to stdout: {0}")]
    #[diagnostic(code(diff::stdout))]
    Stdout(#[source] io::Error),
}
