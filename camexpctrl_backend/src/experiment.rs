//! Orchestrates one triggered acquisition: NI trigger output plus camera
//! readout.
//!
//! [`TriggeredAcquisition`] mirrors the bench workflow for imaging a scan
//! grid. The camera expects one trigger per grid point, `num_x * num_y`, plus
//! `extra_trigs` warm-up pulses at the head of the train whose frames are
//! discarded. A run arms the camera for the full trigger count, then drives
//! the preloaded trigger task and drains the frame queue concurrently, since
//! the vendor interface queues frames faster than the consumer can reshape
//! them only for short trains.

use ndarray::Array2;
use std::time::Duration;

use crate::camera::{FrameAcquisitionService, PupilCamera};
use crate::device::CameraTrigOutputTask;
use crate::error::CamResult;
use camtrig_backend::device::TrigOutputDevice;

/// Default wait budget per frame during the concurrent readout.
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// One scan-grid acquisition: a trigger task and the camera it drives.
pub struct TriggeredAcquisition<S: FrameAcquisitionService> {
    camera: PupilCamera<S>,
    trig_task: CameraTrigOutputTask,
    num_trigs: usize,
    extra_trigs: usize,
    read_timeout: Duration,
}

impl<S: FrameAcquisitionService> TriggeredAcquisition<S> {
    /// Builds the trigger task for a `num_x` by `num_y` grid on `dev` and
    /// wraps `svc` for readout.
    ///
    /// The task is preloaded with `num_x * num_y + extra_trigs` pulses and
    /// starts on software start, not on an external start trigger.
    pub fn new(
        svc: S,
        dev: &TrigOutputDevice,
        num_x: usize,
        num_y: usize,
        extra_trigs: usize,
    ) -> Self {
        let num_trigs = num_x * num_y + extra_trigs;
        let trig_task = CameraTrigOutputTask::new(dev, num_trigs, None, false);
        Self {
            camera: PupilCamera::new(svc),
            trig_task,
            num_trigs,
            extra_trigs,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = timeout;
    }

    pub fn num_trigs(&self) -> usize {
        self.num_trigs
    }

    pub fn camera(&self) -> &PupilCamera<S> {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PupilCamera<S> {
        &mut self.camera
    }

    pub fn trig_task(&self) -> &CameraTrigOutputTask {
        &self.trig_task
    }

    /// Starts the camera interface. Call once before the first [`run`].
    ///
    /// [`run`]: TriggeredAcquisition::run
    pub fn start(&self) -> CamResult<()> {
        self.camera.start()
    }

    /// Stops the camera interface and waits for its worker to exit.
    pub fn shutdown(&self) -> CamResult<()> {
        self.camera.join()
    }

    /// Executes one trigger-and-grab cycle and returns the useful frames.
    ///
    /// Arms the camera for the full trigger count with external triggering
    /// enabled, runs the trigger train while draining the frame queue in
    /// parallel, then drops the `extra_trigs` warm-up frames from the head of
    /// the list.
    pub fn run(&mut self) -> CamResult<Vec<Array2<u8>>> {
        self.camera.set_external_trigger_enable(true)?;
        self.camera.arm(self.num_trigs)?;

        let camera = &mut self.camera;
        let trig_task = &self.trig_task;
        let read_timeout = self.read_timeout;
        let (read_res, ()) = rayon::join(
            || camera.read_all_frames(false, read_timeout),
            || trig_task.run(1),
        );
        let num_read = read_res?;
        log::info!(
            "acquisition run complete: {} frames read, discarding {} warm-up frames",
            num_read,
            self.extra_trigs
        );

        let mut frames = self.camera.take_frame_list();
        frames.drain(..self.extra_trigs.min(frames.len()));
        Ok(frames)
    }
}
