//! Serializing a comparison for use outside the viewer.
//!
//! Markdown and HTML are produced here directly. Raster images and paginated
//! documents need a renderer, so they are delegated to a [`Rasterizer`] and a
//! [`DocumentEncoder`] supplied by the host; this module only plans the page
//! layout the encoder should follow.

use crate::error::{Error, Result};
use crate::hunk::{self, Hunk, HunkKind};
use crate::stats::Stats;
use crate::view::{LineRecord, UnifiedLine, ViewModel};
use serde::Deserialize;
use std::fmt::{self, Write as _};

const FENCE_OPEN: &str = "```diff\n";
const FENCE_CLOSE: &str = "```";

/// Error type returned by host-supplied collaborators.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

/// Formats a comparison can be exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Pdf,
    Html,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Html => "text/html;charset=utf-8",
            ExportFormat::Markdown => "text/markdown",
        }
    }

    /// File name for an export taken at `unix_millis`.
    #[must_use]
    pub fn file_name(self, unix_millis: i64) -> String {
        match self {
            ExportFormat::Png => format!("diff-{unix_millis}.png"),
            ExportFormat::Pdf => format!("diff-{unix_millis}.pdf"),
            ExportFormat::Html => format!("diff-report-{unix_millis}.html"),
            ExportFormat::Markdown => format!("diff-{unix_millis}.md"),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Pdf => "PDF",
            ExportFormat::Html => "HTML",
            ExportFormat::Markdown => "Markdown",
        })
    }
}

/// A finished export, ready to be saved or copied by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Serializes hunks as a fenced ```` ```diff ```` block.
///
/// One line per source line: `+ ` for added, `- ` for removed and two spaces
/// for unchanged lines.
#[must_use]
pub fn markdown(hunks: &[Hunk]) -> String {
    let mut out = String::from(FENCE_OPEN);

    for hunk in hunks {
        let prefix = match hunk.kind {
            HunkKind::Added => "+ ",
            HunkKind::Removed => "- ",
            HunkKind::Unchanged => "  ",
        };
        for line in hunk.lines() {
            out.push_str(prefix);
            out.push_str(line);
            out.push('\n');
        }
    }

    out.push_str(FENCE_CLOSE);
    out
}

/// Recovers `(original, modified)` from [`markdown`] output.
///
/// Lines are joined with `\n`; a terminal separator on the source texts is
/// not representable in the Markdown and is not restored.
#[must_use]
pub fn reconstruct(markdown: &str) -> (String, String) {
    let body = markdown.strip_prefix(FENCE_OPEN).unwrap_or(markdown);
    let body = body.strip_suffix(FENCE_CLOSE).unwrap_or(body);

    let mut original = Vec::new();
    let mut modified = Vec::new();
    for line in hunk::split_lines(body) {
        let (Some(prefix), Some(text)) = (line.get(..2), line.get(2..)) else {
            continue;
        };
        match prefix {
            "+ " => modified.push(text),
            "- " => original.push(text),
            "  " => {
                original.push(text);
                modified.push(text);
            }
            _ => {}
        }
    }

    (original.join("\n"), modified.join("\n"))
}

/// Escapes text for inclusion in HTML element content or attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

const REPORT_STYLE: &str = "\
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: sans-serif; background: #0a0a0a; color: #ffffff; padding: 2rem; }
.report-header { border-bottom: 1px solid #222; padding-bottom: 1.5rem; margin-bottom: 2rem; }
.report-header p { color: #a0a0a0; font-size: 0.875rem; }
.stats { margin-top: 1rem; display: flex; gap: 1.5rem; }
.stat-added { color: #22c55e; }
.stat-removed { color: #ef4444; }
.diff-view { font-family: monospace; display: flex; }
.diff-side { flex: 1; }
.diff-line, .unified-line { display: flex; min-height: 1.6em; }
.line-number { color: #a0a0a0; min-width: 3.5rem; padding: 0 0.75rem; text-align: right; user-select: none; }
.line-content { flex: 1; padding: 0 1rem; white-space: pre-wrap; word-break: break-all; }
.line-added { background: rgba(34, 197, 94, 0.15); }
.line-removed { background: rgba(239, 68, 68, 0.15); }
.line-unchanged { color: #a0a0a0; }
.unified-view { font-family: monospace; padding: 1rem; }
";

/// Renders a standalone HTML report of `view`.
///
/// `timestamp` is embedded verbatim, so the output is reproducible for a
/// given input.
#[must_use]
pub fn html_report(view: &ViewModel, stats: Stats, title: &str, timestamp: &str) -> String {
    let title = escape_html(title);
    let timestamp = escape_html(timestamp);
    let mut out = String::new();

    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>{title} - {timestamp}</title>\n<style>\n{REPORT_STYLE}</style>\n</head>\n<body>\n\
         <div class=\"report-header\">\n<h1>{title}</h1>\n<p>Generated on {timestamp}</p>\n\
         <div class=\"stats\">\n<span class=\"stat-added\">+{added} additions</span>\n\
         <span class=\"stat-removed\">\u{2212}{removed} deletions</span>\n</div>\n</div>\n",
        added = stats.added,
        removed = stats.removed,
    );

    match view {
        ViewModel::Split(split) => {
            out.push_str("<div class=\"diff-view\">\n");
            for side in [&split.left, &split.right] {
                out.push_str("<div class=\"diff-side\">\n");
                for record in side {
                    push_split_line(&mut out, record);
                }
                out.push_str("</div>\n");
            }
            out.push_str("</div>\n");
        }
        ViewModel::Unified(unified) => {
            out.push_str("<div class=\"unified-view\">\n");
            for line in &unified.lines {
                push_unified_line(&mut out, line);
            }
            out.push_str("</div>\n");
        }
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn push_split_line(out: &mut String, record: &LineRecord) {
    let _ = writeln!(
        out,
        "<div class=\"diff-line line-{kind}\"><div class=\"line-number\">{number}</div>\
         <div class=\"line-content\">{text}</div></div>",
        kind = record.kind.as_str(),
        number = NumberCell(record.number),
        text = escape_html(&record.text),
    );
}

fn push_unified_line(out: &mut String, line: &UnifiedLine) {
    let _ = writeln!(
        out,
        "<div class=\"unified-line line-{kind}\"><div class=\"line-number\">{number}</div>\
         <div class=\"line-content\">{marker} {text}</div></div>",
        kind = line.kind.as_str(),
        number = NumberCell(line.number),
        marker = line.marker(),
        text = escape_html(&line.text),
    );
}

/// Renders an optional line number, leaving the cell blank when absent.
struct NumberCell(Option<u32>);

impl fmt::Display for NumberCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{n}"),
            None => Ok(()),
        }
    }
}

/// Physical page dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSize {
    pub const A4: Self = Self {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    /// Both dimensions must be finite and positive.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("width_mm", self.width_mm), ("height_mm", self.height_mm)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "page {name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// A rendered view in device pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,

    /// PNG-encoded image data.
    pub bytes: Vec<u8>,
}

/// How a raster is spread over pages.
///
/// The image is scaled to the page width and drawn once per page, shifted up
/// by one page height each time, so page `i` shows the slice starting at
/// `i * page.height_mm`.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub page: PageSize,
    pub image_width_mm: f64,
    pub image_height_mm: f64,

    /// Vertical image offset on each page: `0, -h, -2h, ...`.
    pub offsets_mm: Vec<f64>,
}

impl PageLayout {
    #[inline]
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.offsets_mm.len()
    }
}

/// Upper bound on the pages of a single document.
pub const MAX_PAGES: usize = 10_000;

/// Plans how a `width` × `height` pixel raster is paginated on `page`.
///
/// Always yields at least one page. Fails for an invalid page size and for
/// rasters that would need more than [`MAX_PAGES`] pages.
pub fn plan_pages(width: u32, height: u32, page: PageSize) -> Result<PageLayout> {
    page.validate()?;

    let image_height_mm = if width == 0 {
        0.0
    } else {
        f64::from(height) * page.width_mm / f64::from(width)
    };

    let pages = (image_height_mm / page.height_mm).ceil();
    if !(pages <= MAX_PAGES as f64) {
        return Err(Error::Export {
            format: ExportFormat::Pdf,
            message: format!("{image_height_mm}mm tall image needs more than {MAX_PAGES} pages"),
        });
    }
    let pages = (pages as usize).max(1);

    Ok(PageLayout {
        page,
        image_width_mm: page.width_mm,
        image_height_mm,
        offsets_mm: (0..pages).map(|i| -(i as f64) * page.height_mm).collect(),
    })
}

/// Paints a view into a raster image.
pub trait Rasterizer {
    fn rasterize(&self, view: &ViewModel, stats: Stats) -> std::result::Result<Raster, CollaboratorError>;
}

/// Assembles a paginated document from a raster and its page layout.
pub trait DocumentEncoder {
    fn encode(&self, raster: &Raster, layout: &PageLayout) -> std::result::Result<Vec<u8>, CollaboratorError>;
}
