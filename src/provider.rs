//! The line-diff algorithm behind a comparison.
//!
//! The view builders only need an ordered hunk sequence; where it comes from
//! is a [`DiffProvider`]. [`LineDiff`] is the default, built on `similar`.

use crate::hunk::{self, Hunk, HunkKind};
use similar::{Algorithm, DiffOp, TextDiff};

/// Produces a line-granular hunk sequence for an `(original, modified)` pair.
pub trait DiffProvider {
    fn diff_lines(&self, original: &str, modified: &str) -> Vec<Hunk>;
}

impl<F> DiffProvider for F
where
    F: Fn(&str, &str) -> Vec<Hunk>,
{
    fn diff_lines(&self, original: &str, modified: &str) -> Vec<Hunk> {
        self(original, modified)
    }
}

/// Line diff backed by [`similar::TextDiff`].
///
/// Replacements come out as a removed hunk followed by an added hunk, and
/// each hunk keeps the line separators of its source text.
#[derive(Debug, Clone, Copy)]
pub struct LineDiff {
    algorithm: Algorithm,
}

impl LineDiff {
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }
}

impl Default for LineDiff {
    fn default() -> Self {
        Self::new(Algorithm::Myers)
    }
}

impl DiffProvider for LineDiff {
    fn diff_lines(&self, original: &str, modified: &str) -> Vec<Hunk> {
        // Only `\n` ends a line; a lone `\r` stays inside its line.
        let original: Vec<&str> = original.split_inclusive('\n').collect();
        let modified: Vec<&str> = modified.split_inclusive('\n').collect();
        let diff = TextDiff::configure()
            .algorithm(self.algorithm)
            .diff_slices(&original[..], &modified[..]);
        let old = diff.old_slices();
        let new = diff.new_slices();

        let mut hunks = Vec::with_capacity(diff.ops().len() + 1);
        for op in diff.ops() {
            match *op {
                DiffOp::Equal { old_index, len, .. } => {
                    hunks.push(join(HunkKind::Unchanged, &old[old_index..old_index + len]));
                }
                DiffOp::Delete {
                    old_index, old_len, ..
                } => {
                    hunks.push(join(HunkKind::Removed, &old[old_index..old_index + old_len]));
                }
                DiffOp::Insert {
                    new_index, new_len, ..
                } => {
                    hunks.push(join(HunkKind::Added, &new[new_index..new_index + new_len]));
                }
                DiffOp::Replace {
                    old_index,
                    old_len,
                    new_index,
                    new_len,
                } => {
                    hunks.push(join(HunkKind::Removed, &old[old_index..old_index + old_len]));
                    hunks.push(join(HunkKind::Added, &new[new_index..new_index + new_len]));
                }
            }
        }

        hunk::coalesce(hunks)
    }
}

fn join(kind: HunkKind, slices: &[&str]) -> Hunk {
    Hunk::new(kind, slices.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_line_replacement() {
        let hunks = LineDiff::default().diff_lines("a\nb\nc", "a\nx\nc");
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
    fn test_identical_input_is_one_unchanged_hunk() {
        let hunks = LineDiff::default().diff_lines("line1\nline2", "line1\nline2");
        assert_eq!(hunks, vec![Hunk::unchanged("line1\nline2")]);
    }

    #[test]
    fn test_pure_addition() {
        let hunks = LineDiff::default().diff_lines("", "new");
        assert_eq!(hunks, vec![Hunk::added("new")]);
    }

    #[test]
    fn test_pure_removal() {
        let hunks = LineDiff::default().diff_lines("gone\n", "");
        assert_eq!(hunks, vec![Hunk::removed("gone\n")]);
    }

    #[test]
    fn test_both_empty_yields_nothing() {
        assert!(LineDiff::default().diff_lines("", "").is_empty());
    }

    #[test]
    fn test_hunks_concatenate_back_to_inputs() {
        let original = "fn a() {}\n\nfn b() {}\nfn c() {}\n";
        let modified = "fn a() {}\nfn b2() {}\n\nfn c() {}\nfn d() {}\n";
        let hunks = LineDiff::new(Algorithm::Patience).diff_lines(original, modified);

        let rebuilt = |skip: HunkKind| -> String {
            hunks
                .iter()
                .filter(|h| h.kind != skip)
                .map(|h| h.text.as_str())
                .collect()
        };
        assert_eq!(rebuilt(HunkKind::Added), original);
        assert_eq!(rebuilt(HunkKind::Removed), modified);
    }

    #[test]
    fn test_closures_are_providers() {
        let provider = |_: &str, modified: &str| vec![Hunk::added(modified)];
        assert_eq!(provider.diff_lines("", "z"), vec![Hunk::added("z")]);
    }

    #[test]
    fn test_carriage_return_stays_inside_its_line() {
        let hunks = LineDiff::default().diff_lines("x\ry", "x\rz");
        assert_eq!(hunks, vec![Hunk::removed("x\ry"), Hunk::added("x\rz")]);
    }

    #[test]
    fn test_crlf_lines_keep_their_endings() {
        let hunks = LineDiff::default().diff_lines("a\r\nb\r\n", "a\r\nc\r\n");
        assert_eq!(
            hunks,
            vec![
                Hunk::unchanged("a\r\n"),
                Hunk::removed("b\r\n"),
                Hunk::added("c\r\n"),
            ]
        );
    }
}
