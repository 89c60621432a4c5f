//! Streams the compiled trigger buffer to the NI card.
//!
//! [`CameraTrigOutputTask`] takes a [`TrigOutputDevice`] description from the
//! core crate and turns it into a configured NI-DAQmx digital output task:
//! one channel per registered line, finite sample clock at the device rate,
//! start trigger disabled unless a source terminal is given, and the full
//! waveform buffer preloaded without auto-start. The task then exposes the
//! start / wait-until-done / stop / clear lifecycle plus a trial loop
//! mirroring the bench workflow (start the finite generation, block until
//! all pulses went out, stop, repeat).

use crate::nidaqmx::{NiTask, DAQMX_VAL_WAITINFINITELY};
use crate::utils::TickTimer;
use camtrig_backend::device::TrigOutputDevice;

/// A configured, preloaded digital output task emitting camera triggers.
pub struct CameraTrigOutputTask {
    task: NiTask,
    samps_per_chan: usize,
}

impl CameraTrigOutputTask {
    /// Configures an NI task for `dev` and preloads `num_trigs` pulses.
    ///
    /// `start_trig_src`: `None` disables the start trigger so the output
    /// begins on [`CameraTrigOutputTask::start`]; `Some(terminal)` arms a
    /// rising-edge digital start trigger on that terminal instead.
    /// `retriggerable` re-arms the start trigger after each finite
    /// generation (default false in all bench configurations).
    ///
    /// Panics if `dev` has no registered lines (via the buffer calculation)
    /// or on any driver error.
    pub fn new(
        dev: &TrigOutputDevice,
        num_trigs: usize,
        start_trig_src: Option<&str>,
        retriggerable: bool,
    ) -> Self {
        let mut timer = TickTimer::new();
        let wfm_buffer = dev.calc_wfm_buffer(num_trigs);
        let samps_per_chan = dev.samps_per_chan(num_trigs);

        let task = NiTask::new();
        for terminal in dev.line_terminals() {
            task.create_do_chan(&terminal);
        }
        task.cfg_sample_clk("", dev.samp_rate(), samps_per_chan as u64);

        match start_trig_src {
            None => task.disable_start_trig(),
            Some(src) => task.cfg_dig_edge_start_trigger(src),
        }
        if retriggerable {
            task.set_start_trig_retriggerable(true);
        }

        // Preload the full finite buffer; the per-channel count is the
        // buffer length divided by the number of lines.
        let samps_written = task.write_digital_lines(&wfm_buffer);
        log::debug!(
            "{}: preloaded {} samps per chan across {} lines ({} trigs)",
            dev.physical_name(),
            samps_written,
            dev.num_lines(),
            num_trigs
        );
        timer.tick_log(&format!("{} cfg (chans, clk, trig, bufwrite)", dev.physical_name()));

        Self {
            task,
            samps_per_chan,
        }
    }

    pub fn samps_per_chan(&self) -> usize {
        self.samps_per_chan
    }

    /// Starts the digital output.
    pub fn start(&self) {
        self.task.start();
    }

    /// Blocks until the finite generation finishes. Negative `timeout` waits
    /// indefinitely.
    pub fn wait_until_done(&self, timeout: f64) {
        self.task.wait_until_done(timeout);
    }

    /// Stops the digital output.
    pub fn stop(&self) {
        self.task.stop();
    }

    /// Stops and clears the task.
    pub fn clear(&self) {
        self.task.stop();
        self.task.clear();
    }

    /// Runs `n_trials` start/wait/stop cycles of the preloaded buffer.
    ///
    /// `n_trials = -1` loops until the process is killed, matching the bench
    /// convention for soak runs.
    pub fn run(&self, n_trials: i64) {
        let mut timer = TickTimer::new();
        let mut loop_ctr: i64 = 0;
        loop {
            log::debug!("trigger output: start (trial {})", loop_ctr);
            self.start();
            self.wait_until_done(DAQMX_VAL_WAITINFINITELY);
            self.stop();
            timer.tick_log("trigger output trial");

            loop_ctr += 1;
            if n_trials > -1 && loop_ctr >= n_trials {
                break;
            }
        }
    }

    /// Access to the underlying task, used by integration tests against the
    /// dummy driver.
    pub fn task(&self) -> &NiTask {
        &self.task
    }
}
