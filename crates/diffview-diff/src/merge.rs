use std::fmt::{self, Display};

#[cfg(feature = "miette")]
use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

use crate::{file::ParseError, hunk::Hunk};

/// Which way a hunk is copied: `Right` copies the old (left) text over the new (right) side.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Left,
    Right,
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// One side of a two-way diff. The left side is the old file, the right side the new one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
}

impl Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MergeState {
    #[default]
    Unmerged,
    MergedRight,
    MergedLeft,
}

impl MergeState {
    const fn step(self, direction: Direction) -> Self {
        match (self, direction) {
            (Self::Unmerged, Direction::Right) => Self::MergedRight,
            (Self::Unmerged, Direction::Left) => Self::MergedLeft,
            (Self::MergedLeft, Direction::Right) | (Self::MergedRight, Direction::Left) => {
                Self::Unmerged
            }
            (state, _) => state,
        }
    }
}

/// The text each side of a hunk had before anything was merged.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Originals {
    old: Vec<String>,
    new: Vec<String>,
}

impl Hunk {
    /// Whether merging in `direction` is allowed: anything can be merged once, and a merge can
    /// be undone by merging back the other way.
    #[must_use]
    pub fn merge_valid(&self, direction: Direction) -> bool {
        matches!(
            (self.merge_state, direction),
            (MergeState::Unmerged, _)
                | (MergeState::MergedLeft, Direction::Right)
                | (MergeState::MergedRight, Direction::Left)
        )
    }

    /// The side whose text a merge in `direction` replaces. Doesn't check [`Hunk::merge_valid`].
    #[must_use]
    pub fn merge_changing_side(&self, direction: Direction) -> Side {
        match (direction, self.merge_state) {
            (Direction::Right, MergeState::MergedLeft) => Side::Left,
            (Direction::Right, _) => Side::Right,
            (Direction::Left, MergeState::MergedRight) => Side::Right,
            (Direction::Left, _) => Side::Left,
        }
    }

    /// How many lines this hunk covers on `side` right now, after any merges.
    pub(crate) fn current_len(&self, side: Side) -> usize {
        let shows_old = match side {
            Side::Left => self.merge_state != MergeState::MergedLeft,
            Side::Right => self.merge_state == MergeState::MergedRight,
        };
        if shows_old {
            self.original_len(Side::Left)
        } else {
            self.original_len(Side::Right)
        }
    }

    /// Index of the first line of this hunk on `side`, before any earlier hunks were merged.
    ///
    /// An empty range (`-5,0`) sits after the line it names rather than on it.
    fn start_index(&self, side: Side) -> usize {
        let start = self.original_start(side);
        if self.original_len(side) == 0 {
            start
        } else {
            start.saturating_sub(1)
        }
    }

    /// Copy this hunk's text from one side to the other.
    ///
    /// `left` and `right` are the lines of the old and new documents. `shift` is how far earlier
    /// merges in the same file have moved this hunk on each side.
    pub(crate) fn merge(
        &mut self,
        direction: Direction,
        left: &mut Vec<String>,
        right: &mut Vec<String>,
        shift: Shift,
    ) -> Result<(), MergeError> {
        if !self.merge_valid(direction) {
            return Err(MergeError::InvalidDirection {
                direction,
                state: self.merge_state,
            });
        }

        let left_start = shifted(self.start_index(Side::Left), shift.left)?;
        let right_start = shifted(self.start_index(Side::Right), shift.right)?;

        let originals = match self.originals.take() {
            Some(originals) => originals,
            None => Originals {
                old: copy_range(left, left_start, self.original_len(Side::Left), Side::Left)?,
                new: copy_range(right, right_start, self.original_len(Side::Right), Side::Right)?,
            },
        };
        let text = match direction {
            Direction::Right => originals.old.clone(),
            Direction::Left => originals.new.clone(),
        };
        self.originals = Some(originals);

        let side = self.merge_changing_side(direction);
        let (document, start) = match side {
            Side::Left => (left, left_start),
            Side::Right => (right, right_start),
        };
        let len = document.len();
        let end = start
            .checked_add(self.current_len(side))
            .filter(|end| *end <= len)
            .ok_or(MergeError::OutOfRange {
                side,
                end: start.saturating_add(self.current_len(side)),
                len,
            })?;
        debug!("Merging hunk {direction}, replacing lines {start}..{end} on the {side} side");
        document.splice(start..end, text);

        self.merge_state = self.merge_state.step(direction);
        Ok(())
    }
}

/// How many lines earlier merges added (positive) or removed (negative) before a hunk.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Shift {
    pub(crate) left: isize,
    pub(crate) right: isize,
}

fn shifted(index: usize, shift: isize) -> Result<usize, MergeError> {
    index
        .checked_add_signed(shift)
        .ok_or(MergeError::Shifted { index, shift })
}

fn copy_range(
    document: &[String],
    start: usize,
    len: usize,
    side: Side,
) -> Result<Vec<String>, MergeError> {
    start
        .checked_add(len)
        .and_then(|end| document.get(start..end))
        .map(<[String]>::to_vec)
        .ok_or(MergeError::OutOfRange {
            side,
            end: start.saturating_add(len),
            len: document.len(),
        })
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
pub enum MergeError {
    #[error("Can't merge {direction} a hunk that is {state:?}")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(diff::merge::direction),
            help("A merged hunk can only be merged back the other way to undo it")
        )
    )]
    InvalidDirection {
        direction: Direction,
        state: MergeState,
    },
    #[error("The hunk ends at line {end} but the {side} side only has {len} lines")]
    #[cfg_attr(
        feature = "miette",
        diagnostic(
            code(diff::merge::out_of_range),
            help("The documents being merged must be the ones the diff was created from")
        )
    )]
    OutOfRange { side: Side, end: usize, len: usize },
    #[error("Line {index} moved by {shift} lines is before the start of the document")]
    #[cfg_attr(feature = "miette", diagnostic(code(diff::merge::shifted)))]
    Shifted { index: usize, shift: isize },
    #[error("There is no hunk {index}, the file only has {count}")]
    #[cfg_attr(feature = "miette", diagnostic(code(diff::merge::no_such_hunk)))]
    NoSuchHunk { index: usize, count: usize },
    #[error(transparent)]
    #[cfg_attr(feature = "miette", diagnostic(transparent))]
    Parse(#[from] ParseError),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test_merge_state {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::hunk::HunkHeader;

    fn hunk() -> Hunk {
        Hunk::new(
            HunkHeader {
                old_line_start: 2,
                old_hunk_len: 1,
                new_line_start: 2,
                new_hunk_len: 2,
            },
            "\n-b\n+B\n+B2",
        )
    }

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn valid_directions() {
        let mut hunk = hunk();
        assert!(hunk.merge_valid(Direction::Left));
        assert!(hunk.merge_valid(Direction::Right));
        hunk.merge_state = MergeState::MergedRight;
        assert!(hunk.merge_valid(Direction::Left));
        assert!(!hunk.merge_valid(Direction::Right));
        hunk.merge_state = MergeState::MergedLeft;
        assert!(hunk.merge_valid(Direction::Right));
        assert!(!hunk.merge_valid(Direction::Left));
    }

    #[test]
    fn changing_side() {
        let mut hunk = hunk();
        assert_eq!(hunk.merge_changing_side(Direction::Right), Side::Right);
        assert_eq!(hunk.merge_changing_side(Direction::Left), Side::Left);
        hunk.merge_state = MergeState::MergedLeft;
        assert_eq!(hunk.merge_changing_side(Direction::Right), Side::Left);
        hunk.merge_state = MergeState::MergedRight;
        assert_eq!(hunk.merge_changing_side(Direction::Left), Side::Right);
    }

    #[test]
    fn merge_right_and_undo() {
        let mut hunk = hunk();
        let mut left = lines(&["a", "b", "c"]);
        let mut right = lines(&["a", "B", "B2", "c"]);

        hunk.merge(Direction::Right, &mut left, &mut right, Shift::default())
            .unwrap();
        assert_eq!(hunk.merge_state(), MergeState::MergedRight);
        assert_eq!(right, lines(&["a", "b", "c"]));
        assert_eq!(left, lines(&["a", "b", "c"]));

        let err = hunk
            .merge(Direction::Right, &mut left, &mut right, Shift::default())
            .unwrap_err();
        assert_eq!(
            err,
            MergeError::InvalidDirection {
                direction: Direction::Right,
                state: MergeState::MergedRight
            }
        );

        hunk.merge(Direction::Left, &mut left, &mut right, Shift::default())
            .unwrap();
        assert_eq!(hunk.merge_state(), MergeState::Unmerged);
        assert_eq!(right, lines(&["a", "B", "B2", "c"]));
        assert_eq!(left, lines(&["a", "b", "c"]));
    }

    #[test]
    fn merge_left() {
        let mut hunk = hunk();
        let mut left = lines(&["a", "b", "c"]);
        let mut right = lines(&["a", "B", "B2", "c"]);
        hunk.merge(Direction::Left, &mut left, &mut right, Shift::default())
            .unwrap();
        assert_eq!(left, lines(&["a", "B", "B2", "c"]));
        assert_eq!(hunk.current_len(Side::Left), 2);
    }

    #[test]
    fn insertion_point_after_line() {
        let mut hunk = Hunk::new(
            HunkHeader {
                old_line_start: 1,
                old_hunk_len: 0,
                new_line_start: 2,
                new_hunk_len: 1,
            },
            "\n+inserted",
        );
        let mut left = lines(&["first", "last"]);
        let mut right = lines(&["first", "inserted", "last"]);
        hunk.merge(Direction::Left, &mut left, &mut right, Shift::default())
            .unwrap();
        assert_eq!(left, lines(&["first", "inserted", "last"]));
    }

    #[test]
    fn shift_past_last_line() {
        let mut hunk = hunk();
        let mut left = lines(&["a", "b", "c"]);
        let mut right = lines(&["a", "B", "B2", "c"]);
        let shift = Shift {
            left: isize::MAX,
            right: isize::MAX,
        };
        let err = hunk
            .merge(Direction::Right, &mut left, &mut right, shift)
            .unwrap_err();
        assert!(matches!(err, MergeError::OutOfRange { .. }));
        assert_eq!(right, lines(&["a", "B", "B2", "c"]));
    }

    #[test]
    fn document_too_short() {
        let mut hunk = hunk();
        let mut left = lines(&["a"]);
        let mut right = lines(&["a", "B", "B2"]);
        let err = hunk
            .merge(Direction::Right, &mut left, &mut right, Shift::default())
            .unwrap_err();
        assert!(matches!(
            err,
            MergeError::OutOfRange {
                side: Side::Left,
                ..
            }
        ));
        assert_eq!(hunk.merge_state(), MergeState::Unmerged);
    }
}
