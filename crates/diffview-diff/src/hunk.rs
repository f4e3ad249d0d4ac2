use std::fmt::{self, Display};

use crate::{
    file::FileDiff,
    merge::{MergeState, Originals, Side},
};

/// What a hunk does overall, judged by which kinds of lines it contains.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HunkKind {
    /// Only adds lines
    Add,
    /// Only removes lines
    Del,
    /// Both adds and removes lines
    Mod,
}

impl HunkKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Del => "DEL",
            Self::Mod => "MOD",
        }
    }
}

impl Display for HunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RegionKind {
    /// A run of added lines, in the new file
    Add,
    /// A run of removed lines, in the old file
    Del,
}

/// A run of changed lines. Lines are 1-based and `end_line` is exclusive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LineRegion {
    pub kind: RegionKind,
    pub start_line: usize,
    pub end_line: usize,
}

impl LineRegion {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end_line.saturating_sub(self.start_line)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The numbers from a `@@ -old_start,old_len +new_start,new_len @@` line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct HunkHeader {
    pub(crate) old_line_start: usize,
    pub(crate) old_hunk_len: usize,
    pub(crate) new_line_start: usize,
    pub(crate) new_hunk_len: usize,
}

/// A single `@@` section of a diff.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Hunk {
    header: HunkHeader,
    /// Whatever Git printed after the closing `@@`, usually the enclosing function
    context: String,
    lines: Vec<String>,
    add_lines: usize,
    del_lines: usize,
    kind: HunkKind,
    old_regions: Vec<LineRegion>,
    new_regions: Vec<LineRegion>,
    old_line_focus: usize,
    new_line_focus: usize,
    pub(crate) merge_state: MergeState,
    pub(crate) originals: Option<Originals>,
}

enum DiffLine {
    Add,
    Del,
    Context,
}

impl DiffLine {
    fn classify(line: &str) -> Option<Self> {
        match line.as_bytes().first() {
            Some(b'+') => Some(Self::Add),
            Some(b'-') => Some(Self::Del),
            // "\ No newline at end of file" belongs to the line before it
            Some(b'\\') => None,
            _ => Some(Self::Context),
        }
    }
}

impl Hunk {
    /// Build a hunk from its header and everything after the header's closing `@@`.
    pub(crate) fn new(header: HunkHeader, body: &str) -> Self {
        let mut lines = body
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line));
        let context = lines.next().unwrap_or_default().trim().to_string();
        let lines: Vec<String> = lines.map(String::from).collect();

        let mut hunk = Self {
            header,
            context,
            lines,
            add_lines: 0,
            del_lines: 0,
            kind: HunkKind::Add,
            old_regions: Vec::new(),
            new_regions: Vec::new(),
            old_line_focus: header.old_line_start,
            new_line_focus: header.new_line_start,
            merge_state: MergeState::Unmerged,
            originals: None,
        };
        hunk.find_regions();
        hunk.kind = if hunk.del_lines == 0 {
            HunkKind::Add
        } else if hunk.add_lines == 0 {
            HunkKind::Del
        } else {
            HunkKind::Mod
        };
        hunk
    }

    /// Walk the body, tracking the current line on each side, to find the runs of added and
    /// removed lines and the first changed line.
    fn find_regions(&mut self) {
        let mut old_cur_line = self.header.old_line_start;
        let mut new_cur_line = self.header.new_line_start;
        let mut add_start = None;
        let mut del_start = None;
        let mut focus_found = false;

        // A trailing context line closes any region that runs to the end of the hunk
        let lines = self
            .lines
            .iter()
            .filter_map(|line| DiffLine::classify(line))
            .chain(std::iter::once(DiffLine::Context));

        for line in lines {
            if !matches!(line, DiffLine::Add) {
                if let Some(start_line) = add_start.take() {
                    self.new_regions.push(LineRegion {
                        kind: RegionKind::Add,
                        start_line,
                        end_line: new_cur_line,
                    });
                }
            }
            if !matches!(line, DiffLine::Del) {
                if let Some(start_line) = del_start.take() {
                    self.old_regions.push(LineRegion {
                        kind: RegionKind::Del,
                        start_line,
                        end_line: old_cur_line,
                    });
                }
            }

            match line {
                DiffLine::Add => {
                    self.add_lines += 1;
                    add_start.get_or_insert(new_cur_line);
                }
                DiffLine::Del => {
                    self.del_lines += 1;
                    del_start.get_or_insert(old_cur_line);
                }
                DiffLine::Context => {}
            }

            if !focus_found && !matches!(line, DiffLine::Context) {
                self.old_line_focus = old_cur_line;
                self.new_line_focus = new_cur_line;
                focus_found = true;
            }

            // Bodies can run longer than their header claims
            if !matches!(line, DiffLine::Add) {
                old_cur_line = old_cur_line.saturating_add(1);
            }
            if !matches!(line, DiffLine::Del) {
                new_cur_line = new_cur_line.saturating_add(1);
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> HunkKind {
        self.kind
    }

    #[must_use]
    pub fn old_line_start(&self) -> usize {
        self.header.old_line_start
    }

    #[must_use]
    pub fn old_hunk_len(&self) -> usize {
        self.header.old_hunk_len
    }

    #[must_use]
    pub fn new_line_start(&self) -> usize {
        self.header.new_line_start
    }

    #[must_use]
    pub fn new_hunk_len(&self) -> usize {
        self.header.new_hunk_len
    }

    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// The body of the hunk, one entry per line, each still carrying its `+`, `-` or ` ` prefix.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn add_lines(&self) -> usize {
        self.add_lines
    }

    #[must_use]
    pub fn del_lines(&self) -> usize {
        self.del_lines
    }

    /// Runs of removed lines, numbered in the old file.
    #[must_use]
    pub fn old_regions(&self) -> &[LineRegion] {
        &self.old_regions
    }

    /// Runs of added lines, numbered in the new file.
    #[must_use]
    pub fn new_regions(&self) -> &[LineRegion] {
        &self.new_regions
    }

    /// The first changed line in the old file, where a viewer should jump to.
    #[must_use]
    pub fn old_line_focus(&self) -> usize {
        self.old_line_focus
    }

    /// The first changed line in the new file, where a viewer should jump to.
    #[must_use]
    pub fn new_line_focus(&self) -> usize {
        self.new_line_focus
    }

    #[must_use]
    pub fn merge_state(&self) -> MergeState {
        self.merge_state
    }

    pub(crate) fn original_len(&self, side: Side) -> usize {
        match side {
            Side::Left => self.header.old_hunk_len,
            Side::Right => self.header.new_hunk_len,
        }
    }

    pub(crate) fn original_start(&self, side: Side) -> usize {
        match side {
            Side::Left => self.header.old_line_start,
            Side::Right => self.header.new_line_start,
        }
    }

    fn plus_minus(&self) -> String {
        match self.kind {
            HunkKind::Add => format!("{}+", self.add_lines),
            HunkKind::Del => format!("{}-", self.del_lines),
            HunkKind::Mod => format!("{}+/{}-", self.add_lines, self.del_lines),
        }
    }

    fn location(&self, file: &FileDiff) -> String {
        format!("{} : {}", file.filename(), self.new_line_focus)
    }

    /// A single, column-aligned line describing this hunk, for listing every change at once.
    #[must_use]
    pub fn oneline_description(&self, file: &FileDiff) -> String {
        format!(
            "{:40} {:60} {}",
            self.location(file),
            self.context,
            self.plus_minus()
        )
    }

    /// Location, context and a `+`/`-` histogram, for showing as a multi-line list item.
    #[must_use]
    pub fn description(&self, file: &FileDiff) -> [String; 3] {
        [
            self.location(file),
            self.context.clone(),
            format!(
                "{} | {}{}",
                self.add_lines + self.del_lines,
                "+".repeat(self.add_lines),
                "-".repeat(self.del_lines)
            ),
        ]
    }

    /// The old and new `file:line` locations this hunk refers to.
    #[must_use]
    pub fn filespecs(&self, file: &FileDiff) -> (String, String) {
        (
            format!("{}:{}", file.old_file(), self.old_line_focus),
            format!("{}:{}", file.new_file(), self.new_line_focus),
        )
    }
}
