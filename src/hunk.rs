//! Hunk sequences produced by a line-level diff.
//!
//! A hunk is a maximal run of whole lines that share one classification:
//! added, removed or unchanged. Hunks arrive in document order and are never
//! mutated once produced; every view in [`crate::view`] is derived from them.
//!
//! ## Line splitting
//!
//! A hunk's text keeps its line separators (`"a\nb\n"`). Splitting on `\n`
//! leaves a trailing empty segment when the text ends with a separator; that
//! segment is an artifact of the split, not a blank line, and exactly one of
//! them is dropped. Every other segment is significant, so `"a\n\n\n"` holds
//! three lines: `"a"`, `""`, `""`.
//!
//! ## JSON Format
//!
//! Hunks produced outside this crate (for example by jsdiff's `diffLines`) are
//! accepted as a JSON array in either of two shapes:
//!
//! ```json
//! [
//!   { "value": "a\n", "count": 1 },
//!   { "value": "b\n", "count": 1, "removed": true },
//!   { "kind": "added", "text": "x\n" }
//! ]
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Lines of a single hunk. Most hunks are a handful of lines long.
pub type Lines<'a> = SmallVec<[&'a str; 8]>;

/// Classification of a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HunkKind {
    Added,
    Removed,
    Unchanged,
}

impl HunkKind {
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HunkKind::Added => "added",
            HunkKind::Removed => "removed",
            HunkKind::Unchanged => "unchanged",
        }
    }
}

/// A contiguous block of whole lines sharing one [`HunkKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hunk {
    pub kind: HunkKind,

    /// Zero or more complete lines, separators included.
    pub text: String,
}

impl Hunk {
    #[must_use]
    pub fn new(kind: HunkKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn added(text: impl Into<String>) -> Self {
        Self::new(HunkKind::Added, text)
    }

    #[must_use]
    pub fn removed(text: impl Into<String>) -> Self {
        Self::new(HunkKind::Removed, text)
    }

    #[must_use]
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self::new(HunkKind::Unchanged, text)
    }

    /// The lines of this hunk, in source order.
    #[inline]
    #[must_use]
    pub fn lines(&self) -> Lines<'_> {
        split_lines(&self.text)
    }

    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        line_count(&self.text)
    }
}

/// Splits text into lines, dropping the single trailing segment left behind
/// by a terminal separator.
///
/// Empty text has no lines.
#[must_use]
pub fn split_lines(text: &str) -> Lines<'_> {
    let mut lines: Lines<'_> = text.split('\n').collect();
    if lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines
}

/// Counts lines with the same rule as [`split_lines`] without collecting them.
#[must_use]
pub fn line_count(text: &str) -> usize {
    let segments = text.split('\n').count();
    segments - usize::from(text.is_empty() || text.ends_with('\n'))
}

/// Merges neighbouring hunks of the same kind and drops hunks without text,
/// so every remaining hunk is a maximal run.
#[must_use]
pub fn coalesce(hunks: Vec<Hunk>) -> Vec<Hunk> {
    let mut merged: Vec<Hunk> = Vec::with_capacity(hunks.len());

    for hunk in hunks {
        if hunk.text.is_empty() {
            continue;
        }
        if let Some(last) = merged.last_mut()
            && last.kind == hunk.kind
        {
            last.text.push_str(&hunk.text);
            continue;
        }
        merged.push(hunk);
    }

    merged
}

/// A hunk as it appears in external JSON or Lua data.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HunkRecord {
    /// `{ "kind": "added", "text": "..." }`
    Tagged { kind: String, text: String },

    /// jsdiff's `{ "value": "...", "added": true }`; `count` is ignored.
    Jsdiff {
        value: String,
        #[serde(default)]
        added: Option<bool>,
        #[serde(default)]
        removed: Option<bool>,
    },
}

impl From<HunkRecord> for Hunk {
    fn from(record: HunkRecord) -> Self {
        match record {
            HunkRecord::Tagged { kind, text } => {
                let kind = match kind.as_str() {
                    "added" => HunkKind::Added,
                    "removed" => HunkKind::Removed,
                    "unchanged" => HunkKind::Unchanged,
                    other => {
                        log::warn!("unknown hunk kind {other:?}, treating it as unchanged");
                        HunkKind::Unchanged
                    }
                };
                Hunk::new(kind, text)
            }
            HunkRecord::Jsdiff {
                value,
                added,
                removed,
            } => {
                let kind = match (added.unwrap_or(false), removed.unwrap_or(false)) {
                    (true, false) => HunkKind::Added,
                    (false, true) => HunkKind::Removed,
                    (false, false) => HunkKind::Unchanged,
                    (true, true) => {
                        log::warn!("hunk flagged both added and removed, treating it as unchanged");
                        HunkKind::Unchanged
                    }
                };
                Hunk::new(kind, value)
            }
        }
    }
}

/// Converts external records into a hunk sequence, preserving their order.
#[must_use]
pub fn from_records(records: Vec<HunkRecord>) -> Vec<Hunk> {
    records.into_iter().map(Hunk::from).collect()
}

/// Parses a JSON array of hunks.
pub fn parse(json: &str) -> Result<Vec<Hunk>, serde_json::Error> {
    serde_json::from_str::<Vec<HunkRecord>>(json).map(from_records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_drops_single_trailing_artifact() {
        assert_eq!(split_lines("a\nb\n").as_slice(), ["a", "b"]);
        assert_eq!(split_lines("a\nb").as_slice(), ["a", "b"]);
    }

    #[test]
    fn split_empty_text_has_no_lines() {
        assert!(split_lines("").is_empty());
        assert_eq!(line_count(""), 0);
    }

    #[test]
    fn split_lone_separator_is_one_blank_line() {
        assert_eq!(split_lines("\n").as_slice(), [""]);
        assert_eq!(line_count("\n"), 1);
    }

    #[test]
    fn split_keeps_consecutive_blank_lines() {
        assert_eq!(split_lines("a\n\n\n").as_slice(), ["a", "", ""]);
        assert_eq!(split_lines("\n\n").as_slice(), ["", ""]);
        assert_eq!(line_count("a\n\n\n"), 3);
    }

    #[test]
    fn line_count_matches_split() {
        for text in ["", "x", "x\n", "x\ny", "x\ny\n", "\n\nx", "\n\n\n", "a\n\nb\n"] {
            assert_eq!(line_count(text), split_lines(text).len(), "{text:?}");
        }
    }

    #[test]
    fn coalesce_merges_runs_and_drops_empty() {
        let hunks = vec![
            Hunk::unchanged("a\n"),
            Hunk::unchanged("b\n"),
            Hunk::removed(""),
            Hunk::added("x\n"),
            Hunk::added("y\n"),
        ];
        assert_eq!(
            coalesce(hunks),
            vec![Hunk::unchanged("a\nb\n"), Hunk::added("x\ny\n")]
        );
    }

    #[test]
    fn parse_jsdiff_shape() {
        let json = r#"[
            {"count": 1, "value": "a\n"},
            {"count": 1, "added": false, "removed": true, "value": "b\n"},
            {"count": 1, "added": true, "removed": false, "value": "x\n"},
            {"count": 1, "value": "c"}
        ]"#;

        let hunks = parse(json).unwrap();
        assert_eq!(
            hunks,
            vec![
                Hunk::unchanged("a\n"),
                Hunk::removed("b\n"),
                Hunk::added("x\n"),
                Hunk::unchanged("c"),
            ]
        );
    }

    #[test]
    fn parse_tagged_shape() {
        let json = r#"[{"kind": "removed", "text": "old\n"}, {"kind": "added", "text": "new\n"}]"#;
        let hunks = parse(json).unwrap();
        assert_eq!(hunks, vec![Hunk::removed("old\n"), Hunk::added("new\n")]);
    }

    #[test]
    fn parse_unknown_kind_falls_back_to_unchanged() {
        let json = r#"[{"kind": "moved", "text": "m\n"}]"#;
        let hunks = parse(json).unwrap();
        assert_eq!(hunks, vec![Hunk::unchanged("m\n")]);
    }

    #[test]
    fn parse_conflicting_flags_fall_back_to_unchanged() {
        let json = r#"[{"value": "m\n", "added": true, "removed": true}]"#;
        let hunks = parse(json).unwrap();
        assert_eq!(hunks[0].kind, HunkKind::Unchanged);
    }

    #[test]
    fn parse_null_flags() {
        let json = r#"[{"value": "m", "added": null, "removed": null}]"#;
        let hunks = parse(json).unwrap();
        assert_eq!(hunks, vec![Hunk::unchanged("m")]);
    }

    #[test]
    fn parse_empty_array() {
        assert!(parse("[]").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_invalid_json() {
        assert!(parse("{not json").is_err());
    }
}
