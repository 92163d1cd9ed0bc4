//! Client-side artifact export.
//!
//! Pure, synchronous transforms of already-decoded artifacts into OOXML
//! containers (`.pptx`, `.xlsx`).  No network access; the only I/O is the
//! writer handed in by the caller.

pub mod pptx;
pub mod xlsx;

pub(crate) mod xml;

use thiserror::Error;

/// Errors surfaced by the exporters.  Callers report these as a user-facing
/// message; a failed export never disturbs the session state.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("container error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The artifact has nothing exportable (e.g. a deck with zero slides).
    #[error("nothing to export: {0}")]
    Empty(&'static str),

    /// A part written by this crate came back in an unexpected shape.
    #[error("malformed workbook part: {0}")]
    MalformedPart(&'static str),
}
