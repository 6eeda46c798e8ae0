//! Error types for the annotation core.

use thiserror::Error;

/// Errors produced by the annotation core.
///
/// No variant is fatal: every failure is scoped to a single frame or
/// request, and only an active-frame fetch failure is ever user-visible.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnnotatorError {
    /// Retrieving a frame from the remote store failed.
    #[error("frame fetch failed: {message}")]
    FetchFailed {
        /// Server or transport error text, shown verbatim for the active frame
        message: String,
    },

    /// Writing an annotation to the remote store failed.
    #[error("annotation push failed: {message}")]
    PushFailed {
        /// Server or transport error text
        message: String,
    },

    /// The render surface has a zero dimension.
    #[error("invalid render surface dimensions: {width}x{height}")]
    InvalidDimension {
        /// Surface width in pixels
        width: u32,
        /// Surface height in pixels
        height: u32,
    },

    /// A look-ahead fetch failed. Always swallowed after logging.
    #[error("prefetch failed: {message}")]
    PrefetchFailed {
        /// Underlying error text
        message: String,
    },

    /// A segmentation request was rejected before reaching the server.
    #[error("segmentation request rejected: {message}")]
    SegmentationRejected {
        /// Reason the frame range was rejected
        message: String,
    },
}
