//! Provides a dummy of the minimal rust wrapper for parts of the NI-DAQmx C
//! library.
//!
//! This module mirrors the API of the real wrapper in `nidaqmx.rs` without
//! linking the driver: every [`NiTask`] method records the call in an
//! internal state guarded by a mutex and emits a `trace` log line. It is
//! compiled whenever the `nidaqmx` feature is off, so the control layer and
//! its tests run on machines without the NI-DAQmx installation.
//!
//! Behavioral shortcuts: `wait_until_done` returns immediately (the dummy
//! generation is instantaneous) and `write_digital_lines` reports the full
//! per-channel sample count as written. Gross misuse (starting a task before
//! configuring its sample clock, stopping a task that never started) panics
//! the same way a driver error would.

use libc;
use ndarray::Array2;
use parking_lot::Mutex;

type CFloat64 = libc::c_double;
type CBool32 = libc::c_uint;
type CInt32 = libc::c_int;

pub const DAQMX_VAL_RISING: CInt32 = 10280;
pub const DAQMX_VAL_FINITESAMPS: CInt32 = 10178;
pub const DAQMX_VAL_GROUPBYCHANNEL: CBool32 = 0;
pub const DAQMX_VAL_WAITINFINITELY: CFloat64 = -1.0;
pub const DAQMX_VAL_CHANPERLINE: CInt32 = 0;

/// Resets a specified National Instruments (NI) device. Dummy: logged, no-op.
pub fn reset_ni_device(name: &str) {
    log::trace!("DAQmxResetDevice({})", name);
}

#[derive(Default)]
struct DummyState {
    do_chans: Vec<String>,
    samp_rate: Option<f64>,
    samps_per_chan: Option<u64>,
    written_shape: Option<(usize, usize)>,
    start_trig_src: Option<String>,
    start_trig_disabled: bool,
    retriggerable: bool,
    started: bool,
    num_starts: usize,
}

/// Call-recording stand-in for an NI-DAQmx task.
pub struct NiTask {
    state: Mutex<DummyState>,
}

impl NiTask {
    pub fn new() -> Self {
        log::trace!("DAQmxCreateTask(\"\")");
        Self {
            state: Mutex::new(DummyState::default()),
        }
    }

    pub fn clear(&self) {
        log::trace!("DAQmxClearTask");
        let mut state = self.state.lock();
        *state = DummyState::default();
    }

    pub fn start(&self) {
        let mut state = self.state.lock();
        if state.samps_per_chan.is_none() {
            panic!("DAQmx Error: starting a task with no sample clock configured");
        }
        if state.started {
            panic!("DAQmx Error: task started twice without an intervening stop");
        }
        state.started = true;
        state.num_starts += 1;
        log::trace!("DAQmxStartTask (run {})", state.num_starts);
    }

    pub fn stop(&self) {
        let mut state = self.state.lock();
        if !state.started {
            panic!("DAQmx Error: stopping a task that was not started");
        }
        state.started = false;
        log::trace!("DAQmxStopTask");
    }

    pub fn wait_until_done(&self, timeout: f64) {
        let state = self.state.lock();
        if !state.started {
            panic!("DAQmx Error: waiting on a task that was not started");
        }
        log::trace!("DAQmxWaitUntilTaskDone(timeout={})", timeout);
    }

    pub fn cfg_sample_clk(&self, clk_src: &str, samp_rate: f64, seq_len: u64) {
        let mut state = self.state.lock();
        state.samp_rate = Some(samp_rate);
        state.samps_per_chan = Some(seq_len);
        log::trace!(
            "DAQmxCfgSampClkTiming(src={:?}, rate={}, finite {} samps)",
            clk_src,
            samp_rate,
            seq_len
        );
    }

    pub fn create_do_chan(&self, name: &str) {
        let mut state = self.state.lock();
        state.do_chans.push(name.to_string());
        log::trace!("DAQmxCreateDOChan({}, chan-per-line)", name);
    }

    pub fn write_digital_lines(&self, signal_arr: &Array2<u8>) -> usize {
        let mut state = self.state.lock();
        let shape = (signal_arr.shape()[0], signal_arr.shape()[1]);
        if !state.do_chans.is_empty() && shape.0 != state.do_chans.len() {
            panic!(
                "DAQmx Error: buffer holds {} channel rows but task has {} DO channels",
                shape.0,
                state.do_chans.len()
            );
        }
        state.written_shape = Some(shape);
        log::trace!(
            "DAQmxWriteDigitalLines({} chans x {} samps, group-by-channel)",
            shape.0,
            shape.1
        );
        shape.1
    }

    pub fn disable_start_trig(&self) {
        let mut state = self.state.lock();
        state.start_trig_disabled = true;
        state.start_trig_src = None;
        log::trace!("DAQmxDisableStartTrig");
    }

    pub fn cfg_dig_edge_start_trigger(&self, trigger_source: &str) {
        let mut state = self.state.lock();
        state.start_trig_disabled = false;
        state.start_trig_src = Some(trigger_source.to_string());
        log::trace!("DAQmxCfgDigEdgeStartTrig({})", trigger_source);
    }

    pub fn set_start_trig_retriggerable(&self, val: bool) {
        let mut state = self.state.lock();
        state.retriggerable = val;
        log::trace!("DAQmxSetStartTrigRetriggerable({})", val);
    }

    // Introspection for tests; the real wrapper has no counterparts.

    pub fn dummy_do_chans(&self) -> Vec<String> {
        self.state.lock().do_chans.clone()
    }
    pub fn dummy_written_shape(&self) -> Option<(usize, usize)> {
        self.state.lock().written_shape
    }
    pub fn dummy_num_starts(&self) -> usize {
        self.state.lock().num_starts
    }
}

impl Drop for NiTask {
    fn drop(&mut self) {
        log::trace!("DAQmxClearTask (drop)");
    }
}
