use std::{
    cell::OnceCell,
    num::ParseIntError,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use itertools::Itertools;
#[cfg(feature = "miette")]
use miette::Diagnostic;
use regex::{Captures, Regex};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    hunk::{Hunk, HunkHeader, HunkKind, LineRegion},
    merge::{Direction, MergeError, Shift, Side},
};

/// Stands in for a file name Git didn't report.
const UNDEFINED: &str = "UNDEFINED";

#[allow(clippy::unwrap_used)] // A constant pattern, covered by every test in this module
fn hunk_header() -> &'static Regex {
    static HUNK_HEADER: OnceLock<Regex> = OnceLock::new();
    HUNK_HEADER.get_or_init(|| Regex::new(r"\r?\n@@ -(\d+),?(\d*) \+(\d+),?(\d*) @@").unwrap())
}

/// The diff of a single file.
#[derive(Debug)]
pub struct FileDiff {
    /// The name as Git reports it, relative to the repository root
    filename: String,
    abs_filename: PathBuf,
    old_file: String,
    new_file: String,
    diff_text: String,
    hunks: OnceCell<Vec<Hunk>>,
}

impl FileDiff {
    #[must_use]
    pub fn new(filename: String, abs_filename: PathBuf, diff_text: String) -> Self {
        let (old_file, new_file) = file_names(&diff_text);
        Self {
            filename,
            abs_filename,
            old_file: old_file.unwrap_or(UNDEFINED).to_string(),
            new_file: new_file.unwrap_or(UNDEFINED).to_string(),
            diff_text,
            hunks: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn abs_filename(&self) -> &Path {
        &self.abs_filename
    }

    /// The name on the `---` line, without Git's `a/` prefix.
    #[must_use]
    pub fn old_file(&self) -> &str {
        &self.old_file
    }

    /// The name on the `+++` line, without Git's `b/` prefix.
    #[must_use]
    pub fn new_file(&self) -> &str {
        &self.new_file
    }

    #[must_use]
    pub fn diff_text(&self) -> &str {
        &self.diff_text
    }

    /// The hunks of this file, parsed the first time they're asked for.
    ///
    /// # Errors
    ///
    /// If a hunk header has a line number too large to represent.
    pub fn hunks(&self) -> Result<&[Hunk], ParseError> {
        if let Some(hunks) = self.hunks.get() {
            return Ok(hunks);
        }
        let hunks = parse_hunks(&self.diff_text)?;
        debug!("Found {} hunks in {}", hunks.len(), self.filename);
        Ok(self.hunks.get_or_init(|| hunks))
    }

    fn hunks_mut(&mut self) -> Result<&mut [Hunk], ParseError> {
        self.hunks()?;
        Ok(self
            .hunks
            .get_mut()
            .map(Vec::as_mut_slice)
            .unwrap_or_default())
    }

    /// The hunks, optionally preceded by an entry for the start of the file.
    ///
    /// # Errors
    ///
    /// See [`FileDiff::hunks`].
    pub fn entries(&self, include_headers: bool) -> Result<Vec<Entry<'_>>, ParseError> {
        let hunks = self.hunks()?;
        let header = include_headers.then_some(Entry::Header {
            file: self,
            hunk_count: hunks.len(),
        });
        Ok(header
            .into_iter()
            .chain(hunks.iter().map(|hunk| Entry::Hunk { file: self, hunk }))
            .collect())
    }

    /// The regions and padding needed to show the old version of this file.
    ///
    /// # Errors
    ///
    /// See [`FileDiff::hunks`].
    pub fn old_highlights(&self) -> Result<Highlights, ParseError> {
        let mut highlights = Highlights::default();
        for hunk in self.hunks()? {
            highlights.extend(hunk.kind(), hunk.old_regions());
            match hunk.kind() {
                HunkKind::Add => highlights.pad(hunk.old_line_start(), hunk.new_hunk_len()),
                HunkKind::Mod if hunk.new_hunk_len() > hunk.old_hunk_len() => highlights.pad(
                    (hunk.old_line_start() + hunk.old_hunk_len()).saturating_sub(1),
                    hunk.new_hunk_len() - hunk.old_hunk_len(),
                ),
                HunkKind::Mod | HunkKind::Del => {}
            }
        }
        Ok(highlights)
    }

    /// The regions and padding needed to show the new version of this file.
    ///
    /// # Errors
    ///
    /// See [`FileDiff::hunks`].
    pub fn new_highlights(&self) -> Result<Highlights, ParseError> {
        let mut highlights = Highlights::default();
        for hunk in self.hunks()? {
            highlights.extend(hunk.kind(), hunk.new_regions());
            match hunk.kind() {
                HunkKind::Del => highlights.pad(hunk.new_line_start(), hunk.old_hunk_len()),
                HunkKind::Mod if hunk.old_hunk_len() > hunk.new_hunk_len() => highlights.pad(
                    (hunk.new_line_start() + hunk.new_hunk_len()).saturating_sub(1),
                    hunk.old_hunk_len() - hunk.new_hunk_len(),
                ),
                HunkKind::Mod | HunkKind::Add => {}
            }
        }
        Ok(highlights)
    }

    /// Merge hunk number `index` in `direction`, editing the old (`left`) or new (`right`) lines.
    ///
    /// Hunks before `index` that were already merged are accounted for.
    ///
    /// # Errors
    ///
    /// 1. The hunks can't be parsed, or there is no hunk `index`
    /// 2. The hunk can't be merged in `direction` (see [`Hunk::merge_valid`])
    /// 3. The documents don't have the lines the hunk refers to
    pub fn merge(
        &mut self,
        index: usize,
        direction: Direction,
        left: &mut Vec<String>,
        right: &mut Vec<String>,
    ) -> Result<(), MergeError> {
        let hunks = self.hunks_mut()?;
        let count = hunks.len();
        if index >= count {
            return Err(MergeError::NoSuchHunk { index, count });
        }
        let (before, rest) = hunks.split_at_mut(index);
        let shift = Shift {
            left: len_change(before, Side::Left),
            right: len_change(before, Side::Right),
        };
        match rest.first_mut() {
            Some(hunk) => hunk.merge(direction, left, right, shift),
            None => Err(MergeError::NoSuchHunk { index, count }),
        }
    }
}

#[allow(clippy::cast_possible_wrap)] // Line counts are nowhere near isize::MAX
fn len_change(hunks: &[Hunk], side: Side) -> isize {
    hunks
        .iter()
        .map(|hunk| hunk.current_len(side) as isize - hunk.original_len(side) as isize)
        .sum()
}

fn file_names(diff_text: &str) -> (Option<&str>, Option<&str>) {
    let mut old_file = None;
    let mut new_file = None;
    for line in diff_text.lines() {
        if line.starts_with("@@") {
            break;
        }
        if let Some(name) = line.strip_prefix("--- ") {
            old_file = Some(name.strip_prefix("a/").unwrap_or(name).trim_end());
        } else if let Some(name) = line.strip_prefix("+++ ") {
            new_file = Some(name.strip_prefix("b/").unwrap_or(name).trim_end());
        }
    }
    (old_file, new_file)
}

fn parse_hunks(diff_text: &str) -> Result<Vec<Hunk>, ParseError> {
    let headers = hunk_header().captures_iter(diff_text).collect_vec();
    let mut hunks = Vec::with_capacity(headers.len());
    // Everything before the first header is the file header, which isn't part of any hunk
    for (index, captures) in headers.iter().enumerate() {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let body_end = headers
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map_or(diff_text.len(), |next| next.start());
        let body = diff_text.get(whole.end()..body_end).unwrap_or_default();
        let header = HunkHeader {
            old_line_start: number(captures, 1)?.unwrap_or(0),
            old_hunk_len: number(captures, 2)?.unwrap_or(1),
            new_line_start: number(captures, 3)?.unwrap_or(0),
            new_hunk_len: number(captures, 4)?.unwrap_or(1),
        };
        let ends_in_range = header
            .old_line_start
            .checked_add(header.old_hunk_len)
            .zip(header.new_line_start.checked_add(header.new_hunk_len))
            .is_some();
        if !ends_in_range {
            return Err(ParseError::OutOfRange {
                header: header_text(captures),
            });
        }
        trace!("Parsing hunk {header:?}");
        hunks.push(Hunk::new(header, body));
    }
    Ok(hunks)
}

/// A number from the hunk header, `None` if that (optional) group is empty.
fn number(captures: &Captures, group: usize) -> Result<Option<usize>, ParseError> {
    let Some(found) = captures.get(group).filter(|found| !found.is_empty()) else {
        return Ok(None);
    };
    found
        .as_str()
        .parse()
        .map(Some)
        .map_err(|source| ParseError::Number {
            header: header_text(captures),
            source,
        })
}

fn header_text(captures: &Captures) -> String {
    captures
        .get(0)
        .map(|whole| whole.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Split the output of `git diff` into one [`FileDiff`] per file.
///
/// `root` is the directory Git's relative names are relative to. Text without any
/// `diff --git` lines is treated as the diff of a single file.
#[must_use]
pub fn parse_git_diff(text: &str, root: &Path) -> Vec<FileDiff> {
    let starts = text
        .match_indices("diff --git ")
        .filter(|(index, _)| *index == 0 || text.get(index - 1..*index) == Some("\n"))
        .map(|(index, _)| index)
        .collect_vec();
    let chunks = if starts.is_empty() {
        vec![text]
    } else {
        starts
            .iter()
            .enumerate()
            .filter_map(|(i, start)| {
                let end = starts.get(i + 1).copied().unwrap_or(text.len());
                text.get(*start..end)
            })
            .collect_vec()
    };

    chunks
        .into_iter()
        .filter_map(|chunk| {
            let Some(filename) = filename(chunk) else {
                debug!("Skipping a section of the diff with no file name");
                return None;
            };
            let abs_filename = root.join(&filename);
            Some(FileDiff::new(filename, abs_filename, chunk.to_string()))
        })
        .collect()
}

/// The name of the file a section of a diff is about, preferring the new name.
fn filename(chunk: &str) -> Option<String> {
    let (old_file, new_file) = file_names(chunk);
    let from_header = || {
        chunk
            .lines()
            .next()?
            .strip_prefix("diff --git ")?
            .rsplit_once(" b/")
            .map(|(_, name)| name)
    };
    new_file
        .filter(|name| *name != "/dev/null")
        .or(old_file.filter(|name| *name != "/dev/null"))
        .or_else(from_header)
        .map(String::from)
}

/// One item in a list of changes: either a hunk or the start of a file.
#[derive(Clone, Copy, Debug)]
pub enum Entry<'file> {
    Header {
        file: &'file FileDiff,
        hunk_count: usize,
    },
    Hunk {
        file: &'file FileDiff,
        hunk: &'file Hunk,
    },
}

impl Entry<'_> {
    #[must_use]
    pub fn oneline_description(&self) -> String {
        match self {
            Self::Header { file, hunk_count } => {
                format!("{:40} {:60} {}", file.filename(), "", hunk_count_text(*hunk_count))
            }
            Self::Hunk { file, hunk } => hunk.oneline_description(file),
        }
    }

    #[must_use]
    pub fn description(&self) -> [String; 3] {
        match self {
            Self::Header { file, hunk_count } => [
                file.filename().to_string(),
                file.abs_filename().display().to_string(),
                hunk_count_text(*hunk_count),
            ],
            Self::Hunk { file, hunk } => hunk.description(file),
        }
    }
}

fn hunk_count_text(count: usize) -> String {
    if count == 1 {
        "1 hunk".to_string()
    } else {
        format!("{count} hunks")
    }
}

/// Blank lines to show before a line so both sides of a diff stay aligned.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Padding {
    /// 1-based line the blank lines go in front of
    pub line: usize,
    pub count: usize,
}

/// The changed lines of one side of a file, grouped by the kind of hunk they came from.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Highlights {
    pub added: Vec<LineRegion>,
    pub modified: Vec<LineRegion>,
    pub deleted: Vec<LineRegion>,
    pub padding: Vec<Padding>,
}

impl Highlights {
    fn extend(&mut self, kind: HunkKind, regions: &[LineRegion]) {
        let bucket = match kind {
            HunkKind::Add => &mut self.added,
            HunkKind::Mod => &mut self.modified,
            HunkKind::Del => &mut self.deleted,
        };
        bucket.extend_from_slice(regions);
    }

    fn pad(&mut self, line: usize, count: usize) {
        if count > 0 {
            self.padding.push(Padding { line, count });
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
pub enum ParseError {
    #[error("Invalid hunk header {header}: {source}")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(diff::hunk_header),
            help("Hunk headers look like `@@ -12,3 +12,4 @@`, make sure the input is a Git diff")
        )
    )]
    Number {
        header: String,
        #[source]
        source: ParseIntError,
    },
    #[error("Hunk header {header} covers lines past the end of any file")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(diff::hunk_range),
            help("A hunk's start line plus its length must be a line number, make sure the input is a Git diff")
        )
    )]
    OutOfRange { header: String },
}
