//! Consumer-side contract and wrapper for the camera acquisition interface.
//!
//! ## The service contract
//!
//! The vendor DLL runs a worker thread that captures frames into an internal
//! queue; the exports are thin accessors around that state. The
//! [`FrameAcquisitionService`] trait reproduces that surface one-to-one so
//! the rest of this crate never depends on the binding mechanism: the real
//! FFI binding (`camera_dll` feature) and the in-process simulator both
//! implement it.
//!
//! Status-code conventions follow the C side: `0` on success, negative raw
//! codes on failure. [`FrameAcquisitionService::try_read_oldest_frame`] does
//! not block; it returns [`FRAME_NOT_READY`] while the queue is empty and the
//! caller retries against its own deadline. The frames-to-grab target uses
//! the `size_t` rendition of `-1` ([`NOT_GRABBING`]) to mean "not currently
//! grabbing".
//!
//! ## The wrapper
//!
//! [`PupilCamera`] layers the consumer conveniences on top: the composite
//! `arm` sequence, lazy image-geometry refresh, the deadline-bounded
//! [`PupilCamera::read_oldest_frame`] returning a `height x width` array,
//! and bulk readout into an internal frame list.

use ndarray::{Array1, Array2};
use std::time::{Duration, Instant};

use crate::error::{CamResult, CameraError};

/// Sentinel returned by `try_read_oldest_frame` while no frame is queued.
pub const FRAME_NOT_READY: i32 = -1;

/// `size_t` rendition of `-1`: grabbing is disabled.
pub const NOT_GRABBING: usize = usize::MAX;

/// Interval between polls of the non-blocking frame read.
const READ_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Operations exported by the camera acquisition interface.
///
/// Callers must serialize their own start/arm/stop/join sequencing: the
/// service is not specified as safe for concurrent lifecycle calls from
/// multiple threads.
pub trait FrameAcquisitionService: Sync + Send {
    /// Begins the background worker. Call once after loading the interface.
    fn start(&self) -> i32;
    /// Signals the worker to halt; does not block for completion.
    fn stop(&self) -> i32;
    /// Blocks until the worker thread has fully exited; call after `stop`.
    fn join(&self) -> i32;

    /// Gates frame capture on the external trigger line vs free-running.
    fn set_external_trigger_enable(&self, val: bool) -> i32;

    fn set_frames_grabbed(&self, val: usize) -> i32;
    fn get_frames_grabbed(&self) -> usize;
    /// Set to [`NOT_GRABBING`] to disable grabbing.
    fn set_frames_to_grab(&self, val: usize) -> i32;
    fn get_frames_to_grab(&self) -> usize;

    /// Number of frames currently queued internally.
    fn get_number_of_frames(&self) -> usize;
    /// Total byte size of one frame's buffer.
    fn get_frame_size_in_bytes(&self) -> usize;
    /// Zero until at least one frame has been captured.
    fn get_image_width(&self) -> usize;
    /// Zero until at least one frame has been captured.
    fn get_image_height(&self) -> usize;

    /// Copies the oldest queued frame into `buf` and pops it. Returns
    /// [`FRAME_NOT_READY`] if none is available yet; does not block.
    fn try_read_oldest_frame(&self, buf: &mut [u8]) -> i32;
    /// Discards all currently queued frames.
    fn clear_frame_list(&self) -> i32;
}

/// High-level camera handle over any [`FrameAcquisitionService`].
pub struct PupilCamera<S: FrameAcquisitionService> {
    svc: S,
    height: usize,
    width: usize,
    need_to_refresh_height_width: bool,
    frame_list: Vec<Array2<u8>>,
}

impl<S: FrameAcquisitionService> PupilCamera<S> {
    pub fn new(svc: S) -> Self {
        Self {
            svc,
            height: 0,
            width: 0,
            need_to_refresh_height_width: true,
            frame_list: Vec::new(),
        }
    }

    /// Direct access to the underlying service, for calls the wrapper does
    /// not mediate (e.g. toggling the external trigger mid-test).
    pub fn svc(&self) -> &S {
        &self.svc
    }

    /// Starts the camera interface. Call this once after construction.
    pub fn start(&self) -> CamResult<()> {
        status_to_result(self.svc.start())
    }

    /// Signals the acquisition worker to halt.
    pub fn stop(&self) -> CamResult<()> {
        status_to_result(self.svc.stop())
    }

    /// Stops, then blocks until the worker thread has exited.
    pub fn join(&self) -> CamResult<()> {
        status_to_result(self.svc.stop())?;
        status_to_result(self.svc.join())
    }

    pub fn set_external_trigger_enable(&self, val: bool) -> CamResult<()> {
        status_to_result(self.svc.set_external_trigger_enable(val))
    }

    /// Prepares the interface to acquire another sequence of frames.
    ///
    /// The order is fixed: disable grabbing, discard the queued frames,
    /// reset the grabbed count, then set the target. Acquisition begins
    /// immediately once the target is set and frames arrive.
    pub fn arm(&mut self, frames_to_grab: usize) -> CamResult<()> {
        status_to_result(self.svc.set_frames_to_grab(NOT_GRABBING))?;
        status_to_result(self.svc.clear_frame_list())?;
        status_to_result(self.svc.set_frames_grabbed(0))?;
        status_to_result(self.svc.set_frames_to_grab(frames_to_grab))?;
        Ok(())
    }

    pub fn frames_grabbed(&self) -> usize {
        self.svc.get_frames_grabbed()
    }

    /// Refreshes the image geometry from the frames stored internally.
    ///
    /// Valid only once both dimensions are non-zero, which requires at least
    /// one captured frame; until then the refresh-needed flag stays set.
    pub fn fetch_image_sizes(&mut self) {
        self.height = self.svc.get_image_height();
        self.width = self.svc.get_image_width();
        self.need_to_refresh_height_width = self.height == 0 || self.width == 0;
    }

    /// Reads the oldest queued frame, blocking up to `timeout`.
    ///
    /// The non-blocking service read is polled at a short interval;
    /// [`CameraError::ReadOldestFrameTimeout`] is returned only once the
    /// budget is exhausted, never on the first unsuccessful poll. On success
    /// the image geometry is refreshed if still unknown
    /// ([`CameraError::ImageSizeRefreshNeeded`] when it cannot be) and the
    /// frame is reshaped into a `height x width` array.
    pub fn read_oldest_frame(&mut self, timeout: Duration) -> CamResult<Array2<u8>> {
        let mut buf = vec![0u8; self.svc.get_frame_size_in_bytes()];
        let deadline = Instant::now() + timeout;
        loop {
            // The reported frame size stays 0 until the interface has
            // captured its first frame; keep re-querying so a frame arriving
            // mid-poll is not copied into an empty buffer.
            if buf.is_empty() {
                buf = vec![0u8; self.svc.get_frame_size_in_bytes()];
            }
            if !buf.is_empty() {
                match self.svc.try_read_oldest_frame(&mut buf) {
                    FRAME_NOT_READY => {}
                    status if status < 0 => return Err(CameraError::Status(status)),
                    _ => break,
                }
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(CameraError::ReadOldestFrameTimeout(timeout));
            }
            std::thread::sleep(READ_POLL_INTERVAL.min(deadline - now));
        }

        if self.need_to_refresh_height_width {
            self.fetch_image_sizes();
            if self.need_to_refresh_height_width {
                return Err(CameraError::ImageSizeRefreshNeeded);
            }
        }

        let nbytes = buf.len();
        Array1::from(buf)
            .into_shape((self.height, self.width))
            .map_err(|_| CameraError::FrameGeometryMismatch {
                nbytes,
                height: self.height,
                width: self.width,
            })
    }

    /// Reads frames into the internal frame list.
    ///
    /// With `only_read_available` the grabbed count bounds the readout (the
    /// bench default); otherwise the armed target is drained, blocking up to
    /// `timeout_per_frame` for each missing frame.
    pub fn read_all_frames(
        &mut self,
        only_read_available: bool,
        timeout_per_frame: Duration,
    ) -> CamResult<usize> {
        let frames_to_read = if only_read_available {
            self.svc.get_frames_grabbed()
        } else {
            self.svc.get_frames_to_grab()
        };
        self.frame_list.clear();
        for _ in 0..frames_to_read {
            let frame = self.read_oldest_frame(timeout_per_frame)?;
            self.frame_list.push(frame);
        }
        Ok(self.frame_list.len())
    }

    pub fn frame_list(&self) -> &[Array2<u8>] {
        &self.frame_list
    }

    pub fn take_frame_list(&mut self) -> Vec<Array2<u8>> {
        std::mem::take(&mut self.frame_list)
    }
}

fn status_to_result(status: i32) -> CamResult<()> {
    if status < 0 {
        Err(CameraError::Status(status))
    } else {
        Ok(())
    }
}
