//! In-process simulated camera acquisition service.
//!
//! [`SimCamera`] implements [`FrameAcquisitionService`] the way the vendor
//! DLL presents it to consumers: a background worker fills an internal frame
//! queue while the accessors poke at shared counters. It exists to exercise
//! the consumer-side contract (arm sequencing, the `NOT_GRABBING` sentinel,
//! geometry-valid-after-first-frame, non-blocking reads) in tests and the
//! demo binary; it does not model the vendor internals.
//!
//! The worker is paced by [`CmdRecvr::recv_timeout`]: every tick it produces
//! one synthetic gradient frame if grabbing is active, i.e. the target is
//! not the [`NOT_GRABBING`] sentinel and the grabbed count has not reached
//! it. The simulator free-runs when armed; the external-trigger flag is
//! stored and reported but does not gate the synthetic source.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::camera::{FrameAcquisitionService, FRAME_NOT_READY, NOT_GRABBING};
use crate::worker_cmd_chan::{CmdChan, WorkerCmd};

struct SimShared {
    frames: Mutex<VecDeque<Vec<u8>>>,
    frames_grabbed: AtomicUsize,
    frames_to_grab: AtomicUsize,
    // 0 until the first frame has been produced, like the real interface
    image_width: AtomicUsize,
    image_height: AtomicUsize,
    ext_trig: AtomicBool,
}

/// Simulated camera with a configurable sensor geometry and frame period.
pub struct SimCamera {
    shared: Arc<SimShared>,
    cmd: CmdChan,
    worker: Mutex<Option<JoinHandle<()>>>,
    width: usize,
    height: usize,
    frame_period: Duration,
}

impl SimCamera {
    pub fn new(width: usize, height: usize, frame_period: Duration) -> Self {
        Self {
            shared: Arc::new(SimShared {
                frames: Mutex::new(VecDeque::new()),
                frames_grabbed: AtomicUsize::new(0),
                frames_to_grab: AtomicUsize::new(NOT_GRABBING),
                image_width: AtomicUsize::new(0),
                image_height: AtomicUsize::new(0),
                ext_trig: AtomicBool::new(false),
            }),
            cmd: CmdChan::new(),
            worker: Mutex::new(None),
            width,
            height,
            frame_period,
        }
    }

    pub fn external_trigger_enabled(&self) -> bool {
        self.shared.ext_trig.load(Ordering::SeqCst)
    }

    /// Deterministic gradient so tests can verify frame contents and order.
    fn synth_frame(frame_idx: usize, width: usize, height: usize) -> Vec<u8> {
        let mut data = vec![0u8; width * height];
        for row in 0..height {
            for col in 0..width {
                data[row * width + col] = ((frame_idx + row + col) % 256) as u8;
            }
        }
        data
    }

    fn worker_loop(
        shared: Arc<SimShared>,
        mut recvr: crate::worker_cmd_chan::CmdRecvr,
        width: usize,
        height: usize,
        frame_period: Duration,
    ) {
        loop {
            match recvr.recv_timeout(frame_period) {
                Some(WorkerCmd::Halt) => break,
                None => {
                    // Pacing tick: produce one frame if grabbing is active.
                    let to_grab = shared.frames_to_grab.load(Ordering::SeqCst);
                    if to_grab == NOT_GRABBING {
                        continue;
                    }
                    let grabbed = shared.frames_grabbed.load(Ordering::SeqCst);
                    if grabbed >= to_grab {
                        continue;
                    }
                    let frame = Self::synth_frame(grabbed, width, height);
                    // Geometry must be readable before the frame is, so the
                    // stores go first; a reader popping the frame acquires
                    // the queue mutex after this thread released it.
                    shared.image_width.store(width, Ordering::SeqCst);
                    shared.image_height.store(height, Ordering::SeqCst);
                    shared.frames.lock().push_back(frame);
                    shared.frames_grabbed.store(grabbed + 1, Ordering::SeqCst);
                }
            }
        }
        log::debug!("sim camera worker exited");
    }
}

impl FrameAcquisitionService for SimCamera {
    fn start(&self) -> i32 {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            // Worker already running; starting twice is caller misuse.
            return -2;
        }
        let shared = self.shared.clone();
        let recvr = self.cmd.new_recvr();
        let (width, height, period) = (self.width, self.height, self.frame_period);
        *worker = Some(std::thread::spawn(move || {
            Self::worker_loop(shared, recvr, width, height, period)
        }));
        0
    }

    fn stop(&self) -> i32 {
        self.cmd.send(WorkerCmd::Halt);
        0
    }

    fn join(&self) -> i32 {
        let handle = self.worker.lock().take();
        match handle {
            Some(handle) => match handle.join() {
                Ok(()) => 0,
                Err(_) => -3,
            },
            None => 0,
        }
    }

    fn set_external_trigger_enable(&self, val: bool) -> i32 {
        self.shared.ext_trig.store(val, Ordering::SeqCst);
        0
    }

    fn set_frames_grabbed(&self, val: usize) -> i32 {
        self.shared.frames_grabbed.store(val, Ordering::SeqCst);
        0
    }
    fn get_frames_grabbed(&self) -> usize {
        self.shared.frames_grabbed.load(Ordering::SeqCst)
    }
    fn set_frames_to_grab(&self, val: usize) -> i32 {
        self.shared.frames_to_grab.store(val, Ordering::SeqCst);
        0
    }
    fn get_frames_to_grab(&self) -> usize {
        self.shared.frames_to_grab.load(Ordering::SeqCst)
    }

    fn get_number_of_frames(&self) -> usize {
        self.shared.frames.lock().len()
    }
    fn get_frame_size_in_bytes(&self) -> usize {
        self.width * self.height
    }
    fn get_image_width(&self) -> usize {
        self.shared.image_width.load(Ordering::SeqCst)
    }
    fn get_image_height(&self) -> usize {
        self.shared.image_height.load(Ordering::SeqCst)
    }

    fn try_read_oldest_frame(&self, buf: &mut [u8]) -> i32 {
        let mut frames = self.shared.frames.lock();
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
        self.shared.frames.lock().clear();
        0
    }
}
