//! The state behind one viewer: current input, the last comparison and the
//! mode it is shown in.
//!
//! A [`Session`] owns its collaborators, which are injected through
//! [`SessionBuilder`]. User actions arrive as [`Action`]s through
//! [`Session::dispatch`]; a new comparison replaces the previous hunks and
//! every view is rebuilt from them on demand.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::export::{self, Artifact, DocumentEncoder, ExportFormat, Rasterizer};
use crate::hunk::Hunk;
use crate::provider::DiffProvider;
use crate::stats::Stats;
use crate::view::{self, ViewMode, ViewModel};
use chrono::Local;
use std::time::Instant;

/// Whether the session is editing input or showing a diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayMode {
    #[default]
    Input,
    Diff,
}

/// Named user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Compare the current input, or go back to editing when a diff is shown.
    Compare,
    Clear,
    SplitView,
    UnifiedView,
    ToggleView,
    Export(ExportFormat),
}

/// What a dispatched action produced for the host to paint or save.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The view to paint; `None` means the idle state.
    View(Option<ViewModel>),
    Artifact(Artifact),
}

#[derive(Debug, Clone)]
struct Transient {
    message: String,
    /// `None` when the timeout is too long to represent; the message stays.
    until: Option<Instant>,
}

/// Collects the collaborators and configuration of a [`Session`].
#[derive(Default)]
pub struct SessionBuilder {
    config: Option<Config>,
    provider: Option<Box<dyn DiffProvider>>,
    rasterizer: Option<Box<dyn Rasterizer>>,
    encoder: Option<Box<dyn DocumentEncoder>>,
}

impl SessionBuilder {
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn diff_provider(mut self, provider: impl DiffProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    #[must_use]
    pub fn rasterizer(mut self, rasterizer: impl Rasterizer + 'static) -> Self {
        self.rasterizer = Some(Box::new(rasterizer));
        self
    }

    #[must_use]
    pub fn document_encoder(mut self, encoder: impl DocumentEncoder + 'static) -> Self {
        self.encoder = Some(Box::new(encoder));
        self
    }

    /// Fails with [`Error::MissingDependency`] when no diff provider was given
    /// and with [`Error::InvalidConfig`] when the configuration is out of range.
    pub fn build(self) -> Result<Session> {
        let provider = self
            .provider
            .ok_or(Error::MissingDependency("diff provider"))?;
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Session {
            view_mode: config.view_mode,
            config,
            provider,
            rasterizer: self.rasterizer,
            encoder: self.encoder,
            original: String::new(),
            modified: String::new(),
            display: DisplayMode::Input,
            hunks: None,
            stats: None,
            transient: None,
        })
    }
}

/// One viewer's input, last comparison and view mode.
///
/// Views are rebuilt from the stored hunks, so switching modes never runs the
/// diff again.
pub struct Session {
    config: Config,
    provider: Box<dyn DiffProvider>,
    rasterizer: Option<Box<dyn Rasterizer>>,
    encoder: Option<Box<dyn DocumentEncoder>>,
    original: String,
    modified: String,
    view_mode: ViewMode,
    display: DisplayMode,
    hunks: Option<Vec<Hunk>>,
    stats: Option<Stats>,
    transient: Option<Transient>,
}

impl Session {
    #[must_use]
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Replaces the input texts without comparing them.
    pub fn set_input(&mut self, original: impl Into<String>, modified: impl Into<String>) {
        self.original = original.into();
        self.modified = modified.into();
    }

    /// Sets the input and compares it.
    ///
    /// Two empty texts reset the session to its idle state and return `None`.
    pub fn compare(
        &mut self,
        original: impl Into<String>,
        modified: impl Into<String>,
    ) -> Option<ViewModel> {
        self.set_input(original, modified);
        self.run_comparison()
    }

    fn run_comparison(&mut self) -> Option<ViewModel> {
        if self.original.is_empty() && self.modified.is_empty() {
            log::debug!("both inputs empty, nothing to compare");
            self.reset_comparison();
            return None;
        }

        let hunks = self.provider.diff_lines(&self.original, &self.modified);
        let stats = Stats::from_hunks(&hunks);
        log::debug!(
            "compared {} hunks: +{} -{}",
            hunks.len(),
            stats.added,
            stats.removed
        );

        let view = view::build(&hunks, self.view_mode);
        self.hunks = Some(hunks);
        self.stats = Some(stats);
        self.display = DisplayMode::Diff;
        self.transient = None;
        Some(view)
    }

    fn reset_comparison(&mut self) {
        self.hunks = None;
        self.stats = None;
        self.display = DisplayMode::Input;
        self.transient = None;
    }

    /// Clears the input and the last comparison.
    pub fn clear(&mut self) {
        self.original.clear();
        self.modified.clear();
        self.reset_comparison();
    }

    /// Switches the view mode and rebuilds the view from the stored hunks.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> Option<ViewModel> {
        self.view_mode = mode;
        self.view()
    }

    /// Flips between split and unified and rebuilds the view.
    pub fn toggle_view_mode(&mut self) -> Option<ViewModel> {
        self.set_view_mode(self.view_mode.toggle())
    }

    /// The view of the last comparison in the current mode.
    #[must_use]
    pub fn view(&self) -> Option<ViewModel> {
        self.hunks
            .as_deref()
            .map(|hunks| view::build(hunks, self.view_mode))
    }

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    #[must_use]
    pub fn display_mode(&self) -> DisplayMode {
        self.display
    }

    #[must_use]
    pub fn hunks(&self) -> Option<&[Hunk]> {
        self.hunks.as_deref()
    }

    /// Counts of the last comparison; `None` until one has run.
    #[must_use]
    pub fn stats(&self) -> Option<Stats> {
        self.stats
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Status line text right now.
    #[must_use]
    pub fn status(&self) -> &str {
        self.status_at(Instant::now())
    }

    /// Status line text at `now`; transient messages expire by then.
    #[must_use]
    pub fn status_at(&self, now: Instant) -> &str {
        match &self.transient {
            Some(transient) if transient.until.is_none_or(|until| now < until) => {
                transient.message.as_str()
            }
            _ if self.hunks.is_some() => "Compared",
            _ => "Ready",
        }
    }

    fn notify(&mut self, message: String) {
        self.transient = Some(Transient {
            message,
            until: Instant::now().checked_add(self.config.status_timeout()),
        });
    }

    /// Exports the last comparison in the current view mode.
    ///
    /// Success, a failed collaborator and a missing comparison each post a
    /// transient status. A missing collaborator does not.
    pub fn export(&mut self, format: ExportFormat) -> Result<Artifact> {
        let now = Local::now();
        match self.render_export(format, &now.format("%Y-%m-%d %H:%M:%S").to_string()) {
            Ok(bytes) => {
                self.notify(format!("{format} exported successfully"));
                Ok(Artifact {
                    file_name: format.file_name(now.timestamp_millis()),
                    mime: format.mime(),
                    bytes,
                })
            }
            Err(err @ Error::Export { .. }) => {
                log::error!("{err}");
                self.notify(format!("Failed to export {format}"));
                Err(err)
            }
            Err(Error::NothingToExport) => {
                self.notify("No diff to export".to_owned());
                Err(Error::NothingToExport)
            }
            Err(err) => Err(err),
        }
    }

    fn render_export(&self, format: ExportFormat, timestamp: &str) -> Result<Vec<u8>> {
        let (Some(hunks), Some(stats)) = (self.hunks.as_deref(), self.stats) else {
            return Err(Error::NothingToExport);
        };
        let failed = |source: export::CollaboratorError| Error::Export {
            format,
            message: source.to_string(),
        };

        match format {
            ExportFormat::Markdown => Ok(export::markdown(hunks).into_bytes()),
            ExportFormat::Html => {
                let view = view::build(hunks, self.view_mode);
                Ok(export::html_report(&view, stats, &self.config.report_title, timestamp)
                    .into_bytes())
            }
            ExportFormat::Png => {
                let rasterizer = self
                    .rasterizer
                    .as_deref()
                    .ok_or(Error::MissingDependency("rasterizer"))?;
                let view = view::build(hunks, self.view_mode);
                let raster = rasterizer.rasterize(&view, stats).map_err(failed)?;
                Ok(raster.bytes)
            }
            ExportFormat::Pdf => {
                let rasterizer = self
                    .rasterizer
                    .as_deref()
                    .ok_or(Error::MissingDependency("rasterizer"))?;
                let encoder = self
                    .encoder
                    .as_deref()
                    .ok_or(Error::MissingDependency("document encoder"))?;
                let view = view::build(hunks, self.view_mode);
                let raster = rasterizer.rasterize(&view, stats).map_err(failed)?;
                let layout = export::plan_pages(raster.width, raster.height, self.config.page)?;
                encoder.encode(&raster, &layout).map_err(failed)
            }
        }
    }

    /// Runs a named user action.
    pub fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        log::debug!("dispatching {action:?}");
        match action {
            Action::Compare if self.display == DisplayMode::Diff => {
                self.display = DisplayMode::Input;
                Ok(Outcome::View(None))
            }
            Action::Compare => Ok(Outcome::View(self.run_comparison())),
            Action::Clear => {
                self.clear();
                Ok(Outcome::View(None))
            }
            Action::SplitView => Ok(Outcome::View(self.set_view_mode(ViewMode::Split))),
            Action::UnifiedView => Ok(Outcome::View(self.set_view_mode(ViewMode::Unified))),
            Action::ToggleView => Ok(Outcome::View(self.toggle_view_mode())),
            Action::Export(format) => self.export(format).map(Outcome::Artifact),
        }
    }
}

/// One of the two panes of a split view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Left,
    Right,
}

impl Pane {
    #[inline]
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Pane::Left => Pane::Right,
            Pane::Right => Pane::Left,
        }
    }
}

/// Mirrors vertical scrolling between the two panes of a split view.
///
/// Writing the offset into the other pane makes that pane report a scroll of
/// its own; the coordinator swallows that single echo instead of bouncing it
/// back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollSync {
    echo: Option<Pane>,
}

impl ScrollSync {
    /// Returns the pane and offset to apply, or `None` for an echo.
    pub fn scrolled(&mut self, pane: Pane, offset: f64) -> Option<(Pane, f64)> {
        if self.echo == Some(pane) {
            self.echo = None;
            return None;
        }
        let target = pane.other();
        self.echo = Some(target);
        Some((target, offset))
    }
}
