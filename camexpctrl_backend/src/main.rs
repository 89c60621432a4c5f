//! Demo run of the triggered acquisition against the simulated camera.
//!
//! Uses a small scan grid and a fast trigger clock so the whole cycle
//! completes in well under a second. With default features the dummy
//! NI-DAQmx wrapper is compiled in, so this runs on any machine; rebuild
//! with `--features nidaqmx,camera_dll` on the bench itself.

use std::time::Duration;

use camexpctrl_backend::experiment::TriggeredAcquisition;
use camexpctrl_backend::sim_camera::SimCamera;
use camexpctrl_backend::utils::init_logging;
use camtrig_backend::device::TrigOutputDevice;

fn main() {
    init_logging();

    let mut dev = TrigOutputDevice::from_terminal("/Dev3/port0/line0", 1e4, 1e3);
    dev.add_line(0, 1); // mirror for scope verification
    log::info!(
        "device {}: {} samps per trigger period on lines {:?}",
        dev.physical_name(),
        dev.waveform().num_samps(),
        dev.line_names()
    );

    let (num_x, num_y, extra_trigs) = (4, 3, 2);
    let sim = SimCamera::new(32, 24, Duration::from_millis(2));
    let mut acq = TriggeredAcquisition::new(sim, &dev, num_x, num_y, extra_trigs);
    acq.set_read_timeout(Duration::from_secs(2));

    acq.start().expect("failed to start camera interface");
    let frames = acq.run().expect("acquisition run failed");
    log::info!(
        "acquired {} frames for a {}x{} grid (target {} triggers)",
        frames.len(),
        num_x,
        num_y,
        acq.num_trigs()
    );
    if let Some(frame) = frames.first() {
        log::info!("frame geometry: {:?}", frame.dim());
    }

    #[cfg(feature = "storage_hdf5")]
    {
        let path = std::path::Path::new("camera_frames.h5");
        camexpctrl_backend::storage::save_frames_hdf5(path, &frames)
            .expect("failed to save frames");
        log::info!("frames saved to {:?}", path);
    }

    acq.shutdown().expect("failed to shut down camera interface");
}
