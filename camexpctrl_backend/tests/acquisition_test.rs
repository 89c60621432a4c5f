//! Integration tests for the acquisition stack against the simulated camera
//! and, where noted, the dummy NI-DAQmx wrapper.

use std::time::{Duration, Instant};

use camexpctrl_backend::camera::{FrameAcquisitionService, PupilCamera};
use camexpctrl_backend::device::CameraTrigOutputTask;
use camexpctrl_backend::error::CameraError;
use camexpctrl_backend::experiment::TriggeredAcquisition;
use camexpctrl_backend::sim_camera::SimCamera;
use camtrig_backend::device::TrigOutputDevice;

fn bench_device() -> TrigOutputDevice {
    // 10 samples per trigger period
    let mut dev = TrigOutputDevice::from_terminal("/Dev3/port0/line0", 1e3, 1e2);
    dev.add_line(0, 1);
    dev
}

#[test]
fn full_triggered_acquisition_on_sim_camera() {
    let dev = bench_device();
    let (num_x, num_y, extra_trigs) = (2, 3, 2);
    let (width, height) = (8, 6);
    let sim = SimCamera::new(width, height, Duration::from_millis(5));

    let mut acq = TriggeredAcquisition::new(sim, &dev, num_x, num_y, extra_trigs);
    acq.set_read_timeout(Duration::from_secs(2));
    assert_eq!(acq.num_trigs(), num_x * num_y + extra_trigs);

    acq.start().unwrap();
    // Geometry is unknown until the first frame has been captured.
    assert_eq!(acq.camera().svc().get_image_width(), 0);
    assert_eq!(acq.camera().svc().get_image_height(), 0);

    let frames = acq.run().unwrap();

    // Warm-up frames are discarded, one frame per grid point remains.
    assert_eq!(frames.len(), num_x * num_y);
    assert!(acq.camera().svc().external_trigger_enabled());
    assert_eq!(acq.camera().svc().get_image_width(), width);
    assert_eq!(acq.camera().svc().get_image_height(), height);

    // The simulator emits a deterministic gradient keyed on the global frame
    // index, so the first kept frame must be the one right after the warm-up.
    for (k, frame) in frames.iter().enumerate() {
        assert_eq!(frame.dim(), (height, width));
        for row in 0..height {
            for col in 0..width {
                assert_eq!(
                    frame[[row, col]],
                    ((k + extra_trigs + row + col) % 256) as u8,
                    "frame {} pixel ({}, {})",
                    k,
                    row,
                    col
                );
            }
        }
    }

    acq.shutdown().unwrap();
}

#[test]
fn read_oldest_frame_times_out_only_after_budget() {
    // Interface never started, so no frame can ever arrive.
    let mut camera = PupilCamera::new(SimCamera::new(4, 4, Duration::from_millis(1)));
    let timeout = Duration::from_millis(200);

    let begin = Instant::now();
    let err = camera.read_oldest_frame(timeout).unwrap_err();
    let elapsed = begin.elapsed();

    assert!(
        elapsed >= timeout,
        "timed out after {:?}, before the {:?} budget was exhausted",
        elapsed,
        timeout
    );
    match err {
        CameraError::ReadOldestFrameTimeout(budget) => assert_eq!(budget, timeout),
        other => panic!("expected a read timeout, got {:?}", other),
    }
}

#[test]
fn arm_discards_queued_frames_and_resets_counters() {
    let mut camera = PupilCamera::new(SimCamera::new(4, 4, Duration::from_millis(2)));
    camera.start().unwrap();
    camera.arm(3).unwrap();

    // Wait for the first grab sequence to complete.
    let deadline = Instant::now() + Duration::from_secs(2);
    while camera.frames_grabbed() < 3 {
        assert!(Instant::now() < deadline, "simulator never produced 3 frames");
        std::thread::sleep(Duration::from_millis(2));
    }
    assert_eq!(camera.svc().get_number_of_frames(), 3);

    // Re-arming must discard the stale frames and restart the counters.
    camera.arm(5).unwrap();
    assert_eq!(camera.frames_grabbed(), 0);
    assert_eq!(camera.svc().get_frames_to_grab(), 5);
    assert_eq!(camera.svc().get_number_of_frames(), 0);

    camera.join().unwrap();
}

#[test]
fn read_all_available_reads_at_most_the_grabbed_count() {
    let mut camera = PupilCamera::new(SimCamera::new(4, 4, Duration::from_millis(2)));
    camera.start().unwrap();
    camera.arm(100).unwrap();

    // Let a few frames accumulate, then read only what is already there.
    let deadline = Instant::now() + Duration::from_secs(2);
    while camera.frames_grabbed() < 5 {
        assert!(Instant::now() < deadline, "simulator never produced 5 frames");
        std::thread::sleep(Duration::from_millis(2));
    }
    let num_read = camera
        .read_all_frames(true, Duration::from_millis(500))
        .unwrap();

    assert!(num_read >= 5);
    assert!(num_read < 100);
    assert_eq!(camera.frame_list().len(), num_read);

    camera.join().unwrap();
}

#[test]
fn geometry_is_valid_whenever_a_frame_can_be_read() {
    // Arm and read back-to-back with no settling sleep: if a frame ever
    // becomes readable before the geometry getters return non-zero, the
    // read fails with ImageSizeRefreshNeeded and drops the frame.
    for _ in 0..20 {
        let mut camera = PupilCamera::new(SimCamera::new(8, 6, Duration::from_millis(1)));
        camera.start().unwrap();
        camera.arm(1).unwrap();
        let frame = camera.read_oldest_frame(Duration::from_secs(2)).unwrap();
        assert_eq!(frame.dim(), (6, 8));
        camera.join().unwrap();
    }
}

#[test]
fn frame_size_is_requeried_until_the_first_frame_arrives() {
    // The real interface reports a frame size of 0 before the first capture.
    // A frame arriving mid-poll must land in a correctly sized buffer, not
    // in the empty one allocated when polling started.
    let svc = late_size::LateSizeCamera::new(8, 6);
    let producer = svc.clone();
    let mut camera = PupilCamera::new(svc);

    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        producer.publish_frame(vec![7u8; 48]);
    });

    let frame = camera.read_oldest_frame(Duration::from_secs(2)).unwrap();
    assert_eq!(frame.dim(), (6, 8));
    assert!(frame.iter().all(|&p| p == 7));
}

#[test]
fn tick_timer_measures_elapsed_time_between_calls() {
    let mut timer = camexpctrl_backend::utils::TickTimer::new();
    std::thread::sleep(Duration::from_millis(10));
    assert!(timer.tick() >= Duration::from_millis(10));
    std::thread::sleep(Duration::from_millis(5));
    assert!(timer.tick() >= Duration::from_millis(5));
}

/// Service stub whose reported frame size stays 0 until a frame exists,
/// mirroring the startup behavior of the real acquisition interface.
mod late_size {
    use camexpctrl_backend::camera::{FrameAcquisitionService, FRAME_NOT_READY};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Inner {
        frames: Mutex<VecDeque<Vec<u8>>>,
        width: AtomicUsize,
        height: AtomicUsize,
        grabbed: AtomicUsize,
        to_grab: AtomicUsize,
    }

    #[derive(Clone)]
    pub struct LateSizeCamera {
        inner: Arc<Inner>,
        sensor_width: usize,
        sensor_height: usize,
    }

    impl LateSizeCamera {
        pub fn new(sensor_width: usize, sensor_height: usize) -> Self {
            Self {
                inner: Arc::new(Inner {
                    frames: Mutex::new(VecDeque::new()),
                    width: AtomicUsize::new(0),
                    height: AtomicUsize::new(0),
                    grabbed: AtomicUsize::new(0),
                    to_grab: AtomicUsize::new(0),
                }),
                sensor_width,
                sensor_height,
            }
        }

        /// Makes geometry and size visible, then queues the frame.
        pub fn publish_frame(&self, frame: Vec<u8>) {
            self.inner.width.store(self.sensor_width, Ordering::SeqCst);
            self.inner.height.store(self.sensor_height, Ordering::SeqCst);
            self.inner.frames.lock().push_back(frame);
            self.inner.grabbed.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl FrameAcquisitionService for LateSizeCamera {
        fn start(&self) -> i32 {
            0
        }
        fn stop(&self) -> i32 {
            0
        }
        fn join(&self) -> i32 {
            0
        }
        fn set_external_trigger_enable(&self, _val: bool) -> i32 {
            0
        }
        fn set_frames_grabbed(&self, val: usize) -> i32 {
            self.inner.grabbed.store(val, Ordering::SeqCst);
            0
        }
        fn get_frames_grabbed(&self) -> usize {
            self.inner.grabbed.load(Ordering::SeqCst)
        }
        fn set_frames_to_grab(&self, val: usize) -> i32 {
            self.inner.to_grab.store(val, Ordering::SeqCst);
            0
        }
        fn get_frames_to_grab(&self) -> usize {
            self.inner.to_grab.load(Ordering::SeqCst)
        }
        fn get_number_of_frames(&self) -> usize {
            self.inner.frames.lock().len()
        }
        fn get_frame_size_in_bytes(&self) -> usize {
            self.get_image_width() * self.get_image_height()
        }
        fn get_image_width(&self) -> usize {
            self.inner.width.load(Ordering::SeqCst)
        }
        fn get_image_height(&self) -> usize {
            self.inner.height.load(Ordering::SeqCst)
        }
        fn try_read_oldest_frame(&self, buf: &mut [u8]) -> i32 {
            let mut frames = self.inner.frames.lock();
            match frames.front() {
                None => FRAME_NOT_READY,
                Some(frame) => {
                    if buf.len() < frame.len() {
                        return -2;
                    }
                    let frame = frames.pop_front().unwrap();
                    buf[..frame.len()].copy_from_slice(&frame);
                    0
                }
            }
        }
        fn clear_frame_list(&self) -> i32 {
            self.inner.frames.lock().clear();
            0
        }
    }
}

#[test]
fn double_start_is_rejected_by_sim_camera() {
    let camera = PupilCamera::new(SimCamera::new(4, 4, Duration::from_millis(2)));
    camera.start().unwrap();
    assert!(camera.start().is_err());
    camera.join().unwrap();
}

#[cfg(not(feature = "nidaqmx"))]
mod dummy_driver {
    use super::*;

    #[test]
    fn trig_task_configures_one_chan_per_line_and_preloads_buffer() {
        let dev = bench_device();
        let num_trigs = 10;
        let task = CameraTrigOutputTask::new(&dev, num_trigs, None, false);

        // 10 samples per period, 10 triggers
        assert_eq!(task.samps_per_chan(), 100);
        assert_eq!(
            task.task().dummy_do_chans(),
            vec![
                "/Dev3/port0/line0".to_string(),
                "/Dev3/port0/line1".to_string()
            ]
        );
        assert_eq!(task.task().dummy_written_shape(), Some((2, 100)));
    }

    #[test]
    fn run_executes_the_requested_number_of_trials() {
        let dev = bench_device();
        let task = CameraTrigOutputTask::new(&dev, 5, None, false);
        task.run(3);
        assert_eq!(task.task().dummy_num_starts(), 3);
    }
}

#[cfg(feature = "storage_hdf5")]
mod hdf5_storage {
    use super::*;
    use camexpctrl_backend::storage::{save_frames_hdf5, FRAME_GROUP};
    use ndarray::Array2;

    #[test]
    fn saved_frame_stack_round_trips() {
        let frames: Vec<Array2<u8>> = (0..3)
            .map(|k| Array2::from_shape_fn((6, 8), |(r, c)| ((k + r + c) % 256) as u8))
            .collect();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.h5");
        save_frames_hdf5(&path, &frames).unwrap();

        let file = hdf5::File::open(&path).unwrap();
        let dataset = file.group(FRAME_GROUP).unwrap().dataset("data").unwrap();
        let stack = dataset.read_dyn::<u8>().unwrap();
        assert_eq!(stack.shape(), &[3, 6, 8]);
        for (k, frame) in frames.iter().enumerate() {
            assert_eq!(stack.index_axis(ndarray::Axis(0), k), frame.view().into_dyn());
        }
    }

    #[test]
    fn empty_frame_list_creates_group_without_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.h5");
        save_frames_hdf5(&path, &[]).unwrap();

        let file = hdf5::File::open(&path).unwrap();
        let group = file.group(FRAME_GROUP).unwrap();
        assert!(group.dataset("data").is_err());
    }
}
