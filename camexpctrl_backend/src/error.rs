//! Error conditions surfaced by the frame-readout path.
//!
//! Only two conditions carry a dedicated name: exhausting the wait budget for
//! the oldest frame, and reading a frame while the image geometry is still
//! unknown. Every other acquisition-interface failure is passed through as
//! the raw integer status code the service returned, without
//! reinterpretation.

use std::time::Duration;
use thiserror::Error;

/// Convenience alias for results on the camera readout path.
pub type CamResult<T> = std::result::Result<T, CameraError>;

#[derive(Error, Debug)]
pub enum CameraError {
    /// The acquisition service produced no frame within the caller's wait
    /// budget. Raised only once the budget is exhausted, never on the first
    /// unsuccessful poll.
    #[error("no frame became available within {0:?}")]
    ReadOldestFrameTimeout(Duration),

    /// Image width/height are still zero after a refresh attempt; the caller
    /// must retry once at least one frame has been captured.
    #[error("image width/height not available yet, refresh needed after the first captured frame")]
    ImageSizeRefreshNeeded,

    /// A frame arrived whose byte count does not match the reported geometry.
    #[error("frame of {nbytes} bytes does not match geometry {height}x{width}")]
    FrameGeometryMismatch {
        nbytes: usize,
        height: usize,
        width: usize,
    },

    /// Raw status code from the acquisition interface, passed through as-is.
    #[error("camera interface call failed with status {0}")]
    Status(i32),
}
