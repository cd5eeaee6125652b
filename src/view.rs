//! Building display-ready views from a hunk sequence.
//!
//! This module turns a flat [`Hunk`] sequence into the rows a renderer paints.
//! Two shapes are supported:
//!
//! - [`SplitView`]: two equal-length columns, one per document version. Lines
//!   present on only one side are paired with an [`LineKind::Empty`] filler on
//!   the other so that row `i` of the left column always lines up with row `i`
//!   of the right column.
//! - [`UnifiedView`]: one column of lines, each carrying a `+`, `-` or space
//!   marker.
//!
//! ## Line numbering
//!
//! In the split view each side keeps its own counter starting at 1 and only
//! non-filler lines consume a number, so the numbers on a side run `1..=k`
//! without gaps. In the unified view only unchanged lines are numbered.
//!
//! Both builders are pure: building twice from the same hunks gives identical
//! output, and switching modes never needs the diff to be recomputed.

use crate::hunk::{Hunk, HunkKind};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Classification of one side of a split row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Added,
    Removed,
    Unchanged,
    /// Placeholder keeping the two columns aligned.
    Empty,
}

impl LineKind {
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LineKind::Added => "added",
            LineKind::Removed => "removed",
            LineKind::Unchanged => "unchanged",
            LineKind::Empty => "empty",
        }
    }
}

impl From<HunkKind> for LineKind {
    fn from(kind: HunkKind) -> Self {
        match kind {
            HunkKind::Added => LineKind::Added,
            HunkKind::Removed => LineKind::Removed,
            HunkKind::Unchanged => LineKind::Unchanged,
        }
    }
}

/// One side of a split row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    pub kind: LineKind,

    /// The text content of this line. Empty for fillers.
    pub text: String,

    /// 1-indexed line number on this side; `None` for fillers.
    pub number: Option<u32>,
}

impl LineRecord {
    #[inline]
    fn numbered(kind: LineKind, text: &str, number: u32) -> Self {
        Self {
            kind,
            text: text.to_owned(),
            number: Some(number),
        }
    }

    /// Creates a filler (placeholder) record.
    #[inline]
    #[must_use]
    pub fn filler() -> Self {
        Self {
            kind: LineKind::Empty,
            text: String::new(),
            number: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_filler(&self) -> bool {
        self.kind == LineKind::Empty
    }
}

/// Two aligned columns. `left.len() == right.len()` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitView {
    pub left: Vec<LineRecord>,
    pub right: Vec<LineRecord>,

    /// Row indices (0-indexed) where runs of changed rows start.
    pub hunk_starts: Vec<u32>,
}

impl SplitView {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.left.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Iterates rows as `(left, right)` pairs.
    pub fn rows(&self) -> impl Iterator<Item = (&LineRecord, &LineRecord)> {
        self.left.iter().zip(&self.right)
    }
}

/// Change marker shown in front of a unified line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Added,
    Removed,
    Context,
}

impl Marker {
    #[inline]
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Marker::Added => '+',
            Marker::Removed => '-',
            Marker::Context => ' ',
        }
    }
}

impl From<HunkKind> for Marker {
    fn from(kind: HunkKind) -> Self {
        match kind {
            HunkKind::Added => Marker::Added,
            HunkKind::Removed => Marker::Removed,
            HunkKind::Unchanged => Marker::Context,
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One line of the unified view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedLine {
    pub kind: HunkKind,
    pub text: String,

    /// Present only for unchanged lines.
    pub number: Option<u32>,
}

impl UnifiedLine {
    #[inline]
    #[must_use]
    pub fn marker(&self) -> Marker {
        self.kind.into()
    }
}

/// A single annotated column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedView {
    pub lines: Vec<UnifiedLine>,

    /// Row indices (0-indexed) where runs of changed lines start.
    pub hunk_starts: Vec<u32>,
}

/// Which of the two views is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Split,
    Unified,
}

impl ViewMode {
    #[inline]
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::Split => ViewMode::Unified,
            ViewMode::Unified => ViewMode::Split,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Split => "split",
            ViewMode::Unified => "unified",
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "split" => Ok(ViewMode::Split),
            "unified" => Ok(ViewMode::Unified),
            other => Err(format!("unknown view mode {other:?}, expected \"split\" or \"unified\"")),
        }
    }
}

/// A built view of either shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewModel {
    Split(SplitView),
    Unified(UnifiedView),
}

impl ViewModel {
    #[must_use]
    pub fn mode(&self) -> ViewMode {
        match self {
            ViewModel::Split(_) => ViewMode::Split,
            ViewModel::Unified(_) => ViewMode::Unified,
        }
    }

    #[must_use]
    pub fn hunk_starts(&self) -> &[u32] {
        match self {
            ViewModel::Split(view) => &view.hunk_starts,
            ViewModel::Unified(view) => &view.hunk_starts,
        }
    }

    /// Number of display rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ViewModel::Split(view) => view.len(),
            ViewModel::Unified(view) => view.lines.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds the view for `mode`.
#[must_use]
pub fn build(hunks: &[Hunk], mode: ViewMode) -> ViewModel {
    log::debug!("building {} view from {} hunks", mode.as_str(), hunks.len());
    match mode {
        ViewMode::Split => ViewModel::Split(build_split(hunks)),
        ViewMode::Unified => ViewModel::Unified(build_unified(hunks)),
    }
}

/// Builds two aligned, filler-padded columns.
#[must_use]
pub fn build_split(hunks: &[Hunk]) -> SplitView {
    let capacity: usize = hunks.iter().map(Hunk::line_count).sum();
    let mut left = Vec::with_capacity(capacity);
    let mut right = Vec::with_capacity(capacity);
    let mut left_num = 1;
    let mut right_num = 1;

    for hunk in hunks {
        for line in hunk.lines() {
            let (l, r) = match hunk.kind {
                HunkKind::Unchanged => {
                    let row = (
                        LineRecord::numbered(LineKind::Unchanged, line, left_num),
                        LineRecord::numbered(LineKind::Unchanged, line, right_num),
                    );
                    left_num += 1;
                    right_num += 1;
                    row
                }
                HunkKind::Removed => {
                    let row = (
                        LineRecord::numbered(LineKind::Removed, line, left_num),
                        LineRecord::filler(),
                    );
                    left_num += 1;
                    row
                }
                HunkKind::Added => {
                    let row = (
                        LineRecord::filler(),
                        LineRecord::numbered(LineKind::Added, line, right_num),
                    );
                    right_num += 1;
                    row
                }
            };
            left.push(l);
            right.push(r);
        }
    }

    let hunk_starts = hunk_starts(
        left.iter()
            .zip(&right)
            .map(|(l, r)| l.kind != LineKind::Unchanged || r.kind != LineKind::Unchanged)
            .enumerate(),
    );

    SplitView {
        left,
        right,
        hunk_starts,
    }
}

/// Builds one marker-annotated column where only unchanged lines are numbered.
#[must_use]
pub fn build_unified(hunks: &[Hunk]) -> UnifiedView {
    let capacity: usize = hunks.iter().map(Hunk::line_count).sum();
    let mut lines = Vec::with_capacity(capacity);
    let mut line_num = 1;

    for hunk in hunks {
        for line in hunk.lines() {
            let number = (hunk.kind == HunkKind::Unchanged).then(|| {
                let n = line_num;
                line_num += 1;
                n
            });
            lines.push(UnifiedLine {
                kind: hunk.kind,
                text: line.to_owned(),
                number,
            });
        }
    }

    let hunk_starts = hunk_starts(
        lines
            .iter()
            .map(|l| l.kind != HunkKind::Unchanged)
            .enumerate(),
    );

    UnifiedView { lines, hunk_starts }
}

/// Collects the indices where a run of changed rows begins.
///
/// Rows past `u32::MAX` cannot be addressed and are not scanned.
fn hunk_starts(rows: impl IntoIterator<Item = (usize, bool)>) -> Vec<u32> {
    let mut starts = Vec::new();
    let mut in_hunk = false;

    for (row_idx, is_changed) in rows {
        if is_changed && !in_hunk {
            let Ok(row) = u32::try_from(row_idx) else {
                log::warn!("row {row_idx} is past the last addressable hunk start");
                break;
            };
            starts.push(row);
            in_hunk = true;
        } else if !is_changed {
            in_hunk = false;
        }
    }

    starts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rec(kind: LineKind, text: &str, number: Option<u32>) -> LineRecord {
        LineRecord {
            kind,
            text: text.into(),
            number,
        }
    }

    fn replacement() -> Vec<Hunk> {
        vec![
            Hunk::unchanged("a\n"),
            Hunk::removed("b\n"),
            Hunk::added("x\n"),
            Hunk::unchanged("c"),
        ]
    }

    /// A mix of every hunk kind, blank lines and terminal separators.
    fn mixed() -> Vec<Hunk> {
        vec![
            Hunk::removed("r1\nr2\n"),
            Hunk::unchanged("u1\n\n"),
            Hunk::added("a1\n"),
            Hunk::unchanged("u2\n"),
            Hunk::removed("r3\n"),
            Hunk::added("a2\na3\n\n"),
            Hunk::unchanged("u3\nu4"),
        ]
    }

    fn assert_gapless(numbers: impl Iterator<Item = u32>) {
        for (expected, n) in (1..).zip(numbers) {
            assert_eq!(n, expected);
        }
    }

    #[test]
    fn split_single_replacement() {
        let view = build_split(&replacement());

        assert_eq!(
            view.left,
            vec![
                rec(LineKind::Unchanged, "a", Some(1)),
                rec(LineKind::Removed, "b", Some(2)),
                LineRecord::filler(),
                rec(LineKind::Unchanged, "c", Some(3)),
            ]
        );
        assert_eq!(
            view.right,
            vec![
                rec(LineKind::Unchanged, "a", Some(1)),
                LineRecord::filler(),
                rec(LineKind::Added, "x", Some(2)),
                rec(LineKind::Unchanged, "c", Some(3)),
            ]
        );
        assert_eq!(view.hunk_starts, vec![1]);
    }

    #[test]
    fn split_pure_addition() {
        let view = build_split(&[Hunk::added("new")]);
        assert_eq!(view.left, vec![LineRecord::filler()]);
        assert_eq!(view.right, vec![rec(LineKind::Added, "new", Some(1))]);
    }

    #[test]
    fn split_identical_input_has_no_fillers() {
        let view = build_split(&[Hunk::unchanged("line1\nline2")]);
        assert_eq!(view.len(), 2);
        assert!(view.rows().all(|(l, r)| !l.is_filler() && !r.is_filler()));
        assert!(view.hunk_starts.is_empty());
    }

    #[test]
    fn split_empty_sequence() {
        let view = build_split(&[]);
        assert!(view.is_empty());
        assert!(view.right.is_empty());
    }

    #[test]
    fn split_columns_stay_aligned() {
        let view = build_split(&mixed());
        assert_eq!(view.left.len(), view.right.len());

        for (l, r) in view.rows() {
            match (l.kind, r.kind) {
                (LineKind::Unchanged, LineKind::Unchanged) => assert_eq!(l.text, r.text),
                (LineKind::Removed, LineKind::Empty) => assert!(l.number.is_some()),
                (LineKind::Empty, LineKind::Added) => assert!(r.number.is_some()),
                other => panic!("misaligned row {other:?}"),
            }
        }
    }

    #[test]
    fn split_numbers_are_gapless_per_side() {
        let view = build_split(&mixed());
        let left: Vec<u32> = view.left.iter().filter_map(|l| l.number).collect();
        let right: Vec<u32> = view.right.iter().filter_map(|r| r.number).collect();

        assert_eq!(left.len(), 8);
        assert_eq!(right.len(), 9);
        assert_gapless(left.into_iter());
        assert_gapless(right.into_iter());
        assert!(view.rows().all(|(l, r)| l.is_filler() == l.number.is_none()
            && r.is_filler() == r.number.is_none()));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn hunk_starts_stop_at_last_addressable_row() {
        let last = u32::MAX as usize;
        let rows = [
            (last - 1, false),
            (last, true),
            (last + 1, false),
            (last + 2, true),
        ];
        assert_eq!(hunk_starts(rows), vec![u32::MAX]);
    }

    #[test]
    fn split_hunk_starts_merge_adjacent_changes() {
        let view = build_split(&mixed());
        // rows: r1 r2 | u1 "" | a1 | u2 | r3 a2 a3 "" | u3 u4
        assert_eq!(view.hunk_starts, vec![0, 4, 6]);
    }

    #[test]
    fn split_keeps_multiple_blank_lines() {
        let view = build_split(&[Hunk::unchanged("a\n\n\n"), Hunk::added("\n\n")]);
        let texts: Vec<&str> = view.right.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "", "", "", ""]);
        assert_eq!(view.right[4].number, Some(5));
        assert!(view.left[3].is_filler());
    }

    #[test]
    fn unified_numbers_only_unchanged() {
        let view = build_unified(&replacement());

        assert_eq!(
            view.lines,
            vec![
                UnifiedLine {
                    kind: HunkKind::Unchanged,
                    text: "a".into(),
                    number: Some(1)
                },
                UnifiedLine {
                    kind: HunkKind::Removed,
                    text: "b".into(),
                    number: None
                },
                UnifiedLine {
                    kind: HunkKind::Added,
                    text: "x".into(),
                    number: None
                },
                UnifiedLine {
                    kind: HunkKind::Unchanged,
                    text: "c".into(),
                    number: Some(2)
                },
            ]
        );
        let markers: String = view.lines.iter().map(|l| l.marker().as_char()).collect();
        assert_eq!(markers, " -+ ");
        assert_eq!(view.hunk_starts, vec![1]);
    }

    #[test]
    fn unified_numbering_is_gapless() {
        let view = build_unified(&mixed());
        let numbers: Vec<u32> = view.lines.iter().filter_map(|l| l.number).collect();
        let unchanged = view
            .lines
            .iter()
            .filter(|l| l.kind == HunkKind::Unchanged)
            .count();

        assert_eq!(numbers.len(), unchanged);
        assert_gapless(numbers.into_iter());
        assert_eq!(view.lines.len(), 12);
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let hunks = mixed();
        assert_eq!(build_split(&hunks), build_split(&hunks));
        assert_eq!(build_unified(&hunks), build_unified(&hunks));
    }

    #[test]
    fn build_dispatches_on_mode() {
        let hunks = replacement();
        let split = build(&hunks, ViewMode::Split);
        let unified = build(&hunks, ViewMode::Unified);

        assert_eq!(split.mode(), ViewMode::Split);
        assert_eq!(unified.mode(), ViewMode::Unified);
        assert_eq!(split.len(), 4);
        assert_eq!(unified.hunk_starts(), &[1]);
    }

    #[test]
    fn view_mode_toggle_and_parse() {
        assert_eq!(ViewMode::Split.toggle(), ViewMode::Unified);
        assert_eq!(ViewMode::Unified.toggle(), ViewMode::Split);
        assert_eq!("unified".parse::<ViewMode>(), Ok(ViewMode::Unified));
        assert!("side-by-side".parse::<ViewMode>().is_err());
    }
}
