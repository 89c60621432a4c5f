//! Models the digital-output trigger task of one NI device (card).
//!
//! A [`TrigOutputDevice`] groups the digital lines that should carry the
//! camera trigger signal, together with the device-wide sample clock rate and
//! the requested trigger frequency. It knows nothing about the NI-DAQmx
//! driver; its sole job is to lay out the sample buffer the streaming layer
//! hands to the card.
//!
//! ## Lines and buffer layout
//!
//! Lines are registered channel-per-line and written group-by-channel: the
//! raw buffer is the per-channel waveform repeated once per line, while the
//! reported per-channel sample count stays at one copy. Every registered line
//! therefore plays the identical single-period-tiled sequence in lockstep.
//! Registering a second line is how the testbench mirrors the trigger onto a
//! spare terminal for independent oscilloscope verification.
//!
//! ## Example
//!
//! ```
//! use camtrig_backend::device::TrigOutputDevice;
//!
//! let mut dev = TrigOutputDevice::new("Dev3", 1e6, 1e3);
//! dev.add_line(0, 0);
//! dev.add_line(0, 1); // debug mirror line
//!
//! let buf = dev.calc_wfm_buffer(10);
//! assert_eq!(buf.shape(), &[2, 10_000]);
//! assert_eq!(dev.samps_per_chan(10), 10_000);
//! ```

use indexmap::IndexMap;
use ndarray::{Array2, Axis};

use crate::channel::{parse_terminal, TrigLine};
use crate::waveform::TrigWaveform;

/// Digital-output trigger task description for one NI device.
pub struct TrigOutputDevice {
    physical_name: String,
    samp_rate: f64,
    trig_freq: f64,
    lines: IndexMap<String, TrigLine>,
}

impl TrigOutputDevice {
    /// Creates a device with no registered lines.
    ///
    /// `samp_rate` is the digital output sample clock in Hz, `trig_freq` the
    /// desired camera trigger frequency in Hz. Both must be positive.
    pub fn new(physical_name: &str, samp_rate: f64, trig_freq: f64) -> Self {
        assert!(
            samp_rate > 0. && trig_freq > 0.,
            "Device {} requires positive samp_rate and trig_freq, got {} and {}",
            physical_name,
            samp_rate,
            trig_freq
        );
        Self {
            physical_name: physical_name.to_string(),
            samp_rate,
            trig_freq,
            lines: IndexMap::new(),
        }
    }

    /// Convenience constructor from a full output terminal such as
    /// `/Dev3/port0/line0`; the named line is registered as the first line.
    pub fn from_terminal(terminal: &str, samp_rate: f64, trig_freq: f64) -> Self {
        let (device_name, line) = parse_terminal(terminal);
        let mut dev = Self::new(&device_name, samp_rate, trig_freq);
        dev.add_line(line.port, line.line);
        dev
    }

    pub fn physical_name(&self) -> &str {
        &self.physical_name
    }
    pub fn samp_rate(&self) -> f64 {
        self.samp_rate
    }
    pub fn trig_freq(&self) -> f64 {
        self.trig_freq
    }
    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// Registers a digital line on this device. Panics on duplicates.
    pub fn add_line(&mut self, port: usize, line: usize) {
        let trig_line = TrigLine::new(port, line);
        let name = trig_line.physical_name();
        if self.lines.contains_key(&name) {
            panic!(
                "Device {} already contains line {}",
                self.physical_name, name
            );
        }
        self.lines.insert(name, trig_line);
    }

    /// Channel names relative to the device, in registration order.
    pub fn line_names(&self) -> Vec<String> {
        self.lines.keys().cloned().collect()
    }

    /// Full terminal names (`/Dev3/port0/line0`), in registration order.
    pub fn line_terminals(&self) -> Vec<String> {
        self.lines
            .keys()
            .map(|name| format!("/{}/{}", self.physical_name, name))
            .collect()
    }

    /// One period of the trigger waveform at this device's rates.
    pub fn waveform(&self) -> TrigWaveform {
        TrigWaveform::one_period(self.samp_rate, self.trig_freq)
    }

    /// Per-channel sample count for a run of `num_trigs` trigger pulses.
    pub fn samps_per_chan(&self, num_trigs: usize) -> usize {
        self.waveform().num_samps() * num_trigs
    }

    /// Computes the full output buffer for `num_trigs` trigger pulses.
    ///
    /// Shape is `(num_lines, samps_per_chan)` with every row the identical
    /// tiled waveform, matching the channel-per-line / group-by-channel
    /// write layout. Panics if no lines have been registered.
    pub fn calc_wfm_buffer(&self, num_trigs: usize) -> Array2<u8> {
        assert!(
            !self.lines.is_empty(),
            "Attempting to calculate buffer for device {} with no registered lines",
            self.physical_name
        );
        let tiled = self.waveform().tile(num_trigs);
        let row = tiled.view().insert_axis(Axis(0));
        let mut buf = Array2::zeros((self.lines.len(), tiled.len()));
        for mut chan_row in buf.axis_iter_mut(Axis(0)) {
            chan_row.assign(&row.index_axis(Axis(0), 0));
        }
        buf
    }
}
