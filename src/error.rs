//! Errors raised around the view builders.
//!
//! Building views and counting stats never fails. Errors only come from the
//! collaborators a [`crate::Session`] talks to and from external data.

use crate::export::ExportFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A collaborator the operation needs was never supplied.
    #[error("missing dependency: {0}")]
    MissingDependency(&'static str),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no diff to export")]
    NothingToExport,

    /// A collaborator failed while producing an export.
    #[error("failed to export {format}: {message}")]
    Export {
        format: ExportFormat,
        message: String,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
