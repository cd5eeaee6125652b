//! Added/removed line counts for a hunk sequence.

use crate::hunk::{Hunk, HunkKind};

/// Line counts across a hunk sequence.
///
/// An empty or fully unchanged sequence yields zero on both sides; "no
/// comparison yet" is modelled by the caller as `Option<Stats>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub added: u32,
    pub removed: u32,
}

impl Stats {
    /// Counts added and removed lines; unchanged hunks contribute nothing.
    #[must_use]
    pub fn from_hunks(hunks: &[Hunk]) -> Self {
        hunks.iter().fold(Self::default(), |mut stats, hunk| {
            let count = u32::try_from(hunk.line_count()).unwrap_or(u32::MAX);
            match hunk.kind {
                HunkKind::Added => stats.added = stats.added.saturating_add(count),
                HunkKind::Removed => stats.removed = stats.removed.saturating_add(count),
                HunkKind::Unchanged => {}
            }
            stats
        })
    }
}
