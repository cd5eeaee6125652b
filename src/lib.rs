//! # linediff-nvim
//!
//! A line-diff viewer core for Neovim: compares two texts line by line and
//! turns the result into display-ready split or unified views.
//!
//! ## Architecture
//!
//! The crate is organized into these modules:
//!
//! - `hunk` - The hunk sequence a line diff produces, and the line-splitting rule
//! - `provider` - The diff algorithm behind a comparison (`similar` by default)
//! - `stats` - Added/removed line counts
//! - `view` - Transforms hunks into aligned side-by-side rows or a unified column
//! - `export` - Markdown and HTML serializers, PDF pagination, raster/document hooks
//! - `session` - Comparison state, user actions and split-pane scroll sync
//! - `config` / `error` - Session options and error types
//! - `lua` - Lua bindings (behind the `lua` feature)
//!
//! Control flows one way: input texts go through a [`DiffProvider`] into a
//! hunk sequence, from which [`Stats`] and views are derived. Views are never
//! mutated; switching modes rebuilds them from the same hunks.
//!
//! ## Usage from Lua
//!
//! Build with `--features lua` and put the library on `package.cpath`:
//!
//! ```lua
//! local linediff = require("linediff_nvim")
//!
//! local result = linediff.compare("a\nb\nc", "a\nx\nc")
//! -- result.stats.added == 1, result.view.left[2].kind == "removed"
//!
//! -- Switch modes without diffing again
//! local unified = linediff.from_hunks(result.hunks, "unified")
//!
//! local md = linediff.markdown("a\nb", "a\nc")
//! ```
//!
//! ## Usage from Rust
//!
//! ```
//! use linediff_nvim::{LineDiff, Session, ViewModel};
//!
//! let mut session = Session::builder()
//!     .diff_provider(LineDiff::default())
//!     .build()?;
//!
//! let Some(ViewModel::Split(view)) = session.compare("a\nb\nc", "a\nx\nc") else {
//!     unreachable!();
//! };
//! assert_eq!(view.left.len(), view.right.len());
//! assert_eq!(session.stats().map(|s| (s.added, s.removed)), Some((1, 1)));
//! # Ok::<(), linediff_nvim::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod hunk;
pub mod provider;
pub mod session;
pub mod stats;
pub mod view;

#[cfg(feature = "lua")]
mod lua;

pub use config::Config;
pub use error::{Error, Result};
pub use export::{Artifact, DocumentEncoder, ExportFormat, PageLayout, PageSize, Raster, Rasterizer};
pub use hunk::{Hunk, HunkKind};
pub use provider::{DiffProvider, LineDiff};
pub use session::{Action, DisplayMode, Outcome, Pane, ScrollSync, Session};
pub use stats::Stats;
pub use view::{LineKind, LineRecord, Marker, SplitView, UnifiedLine, UnifiedView, ViewMode, ViewModel};
