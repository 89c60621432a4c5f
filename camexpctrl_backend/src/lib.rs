//! # camexpctrl_backend
//!
//! Streaming and acquisition layer of the camera trigger testbench.
//!
//! The sibling `camtrig_backend` crate computes trigger waveforms and lays
//! out device buffers without touching any hardware. This crate does the
//! hardware-facing half:
//!
//! - [`nidaqmx`] wraps the parts of the NI-DAQmx C library the bench needs;
//!   without the `nidaqmx` feature a call-recording dummy with the same API
//!   is compiled instead, so everything above it runs on machines without
//!   the driver.
//! - [`device`] turns a `TrigOutputDevice` description into a configured,
//!   preloaded digital output task with a start/wait/stop trial loop.
//! - [`camera`] defines the [`FrameAcquisitionService`] contract of the
//!   vendor camera interface and the [`PupilCamera`] wrapper with arming,
//!   deadline-bounded reads and bulk readout. The real DLL binding lives in
//!   [`camera_dll`] (behind the `camera_dll` feature); [`sim_camera`]
//!   provides an in-process implementation for tests and demos.
//! - [`experiment`] ties both sides together into one triggered scan-grid
//!   acquisition.
//! - [`storage`] (behind `storage_hdf5`) persists captured frame stacks.
//!
//! [`FrameAcquisitionService`]: camera::FrameAcquisitionService
//! [`PupilCamera`]: camera::PupilCamera

pub mod camera;
pub mod device;
pub mod error;
pub mod experiment;
pub mod sim_camera;
pub mod utils;
pub mod worker_cmd_chan;

#[cfg(feature = "nidaqmx")]
pub mod nidaqmx;
#[cfg(not(feature = "nidaqmx"))]
pub mod nidaqmx_dummy;
#[cfg(not(feature = "nidaqmx"))]
pub use nidaqmx_dummy as nidaqmx;

#[cfg(feature = "camera_dll")]
pub mod camera_dll;

#[cfg(feature = "storage_hdf5")]
pub mod storage;

pub use camera::{FrameAcquisitionService, PupilCamera, FRAME_NOT_READY, NOT_GRABBING};
pub use device::CameraTrigOutputTask;
pub use error::{CamResult, CameraError};
pub use experiment::TriggeredAcquisition;
pub use sim_camera::SimCamera;
