//! Session configuration.
//!
//! Every field has a default, so hosts only pass what they want to change:
//!
//! ```json
//! { "view_mode": "unified", "page": { "height_mm": 279.4 } }
//! ```

use crate::error::Result;
use crate::export::PageSize;
use crate::view::ViewMode;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// View shown after the first comparison.
    pub view_mode: ViewMode,

    /// Page used when paginating a PDF export.
    pub page: PageSize,

    /// How long transient status messages stay visible.
    pub status_timeout_ms: u64,

    /// Heading of the HTML report.
    pub report_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Split,
            page: PageSize::A4,
            status_timeout_ms: 3000,
            report_title: "Diff Report".to_owned(),
        }
    }
}

impl Config {
    /// Parses a JSON options object and validates it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot: the page must have finite, positive dimensions.
    pub fn validate(&self) -> Result<()> {
        self.page.validate()
    }

    #[inline]
    #[must_use]
    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }
}
