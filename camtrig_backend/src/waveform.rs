//! Generation of the periodic digital trigger waveform for the camera.
//!
//! ## Overview
//!
//! The camera in the OCM system is exposed by a trigger edge on a digital
//! output line of the NI card. One period of that trigger signal is a square
//! wave with an approximately 50% duty cycle whose high part sits in the
//! middle of the period (low samples at the start and the end). The
//! [`TrigWaveform`] struct computes one such period from two scalar
//! parameters and is immutable afterwards.
//!
//! ## Sampling
//!
//! The period length is `samp_rate / trig_freq` truncated towards zero, so
//! the generated frequency is as close as possible *below* the requested
//! ratio. For best results choose `samp_rate` as an exact integer multiple of
//! `trig_freq`, ideally an even one, to obtain a clean symmetric pulse.
//!
//! ## Degenerate periods
//!
//! For very low ratios of sample rate to trigger frequency the quarter marks
//! collapse and the high region can degenerate to zero width (e.g. a
//! one-sample period is a single low sample). This is accepted behavior and
//! intentionally kept as-is: downstream numeric equality checks rely on the
//! truncation semantics, so short periods are never "fixed up".
//!
//! ## Example
//!
//! ```
//! use camtrig_backend::waveform::TrigWaveform;
//!
//! let wfm = TrigWaveform::one_period(1e6, 1e3);
//! assert_eq!(wfm.num_samps(), 1000);
//! // High pulse spans the middle half of the period
//! assert_eq!(wfm.samples()[250], 1);
//! assert_eq!(wfm.samples()[0], 0);
//! ```

use ndarray::Array1;

/// One period of the digital (0/1) camera trigger waveform.
///
/// Samples are `u8` values restricted to `{0, 1}`, ready to be handed to
/// `DAQmxWriteDigitalLines`-style writers without conversion.
#[derive(Clone, PartialEq, Debug)]
pub struct TrigWaveform {
    samples: Array1<u8>,
}

impl TrigWaveform {
    /// Computes one period of the trigger waveform for the camera.
    ///
    /// The period holds `floor(samp_rate / trig_freq)` samples. With `q1` and
    /// `q3` the floored first- and third-quarter marks, the sample at 1-based
    /// ramp position `i` is high iff `q1 < i < q3` (strict on both ends, so
    /// the boundary samples are low). The net effect is a single high pulse
    /// centered in the period, spanning roughly its middle 50%.
    ///
    /// # Arguments
    ///
    /// * `samp_rate` - output sample clock frequency in Hz. Typically `1e6`.
    /// * `trig_freq` - desired trigger frequency in Hz. Typically `1e3`.
    ///
    /// Both arguments must be positive and finite, with
    /// `samp_rate >= trig_freq` for a period of at least one sample. The
    /// function performs no validation; feasibility of the trigger rate on
    /// the actual device is the caller's responsibility.
    ///
    /// # Example
    ///
    /// ```
    /// # use camtrig_backend::waveform::TrigWaveform;
    /// let wfm = TrigWaveform::one_period(20., 20.);
    /// // Degenerate single-sample period stays all-low
    /// assert_eq!(wfm.samples().to_vec(), vec![0]);
    /// ```
    pub fn one_period(samp_rate: f64, trig_freq: f64) -> Self {
        let num_samps = (samp_rate / trig_freq) as usize;
        let q1 = (num_samps as f64 * 0.25) as usize;
        let q3 = (num_samps as f64 * 0.75) as usize;
        // 1-based ramp over the period, high strictly between the quarter marks
        let samples = Array1::from_iter(
            (1..=num_samps).map(|i| if i > q1 && i < q3 { 1u8 } else { 0u8 }),
        );
        Self { samples }
    }

    /// Number of samples in one period.
    pub fn num_samps(&self) -> usize {
        self.samples.len()
    }

    /// Read-only view of the period samples.
    pub fn samples(&self) -> &Array1<u8> {
        &self.samples
    }

    /// Tiles the period end-to-end into the full output buffer.
    ///
    /// `num_trigs` is the total number of trigger pulses for the acquisition
    /// run (frames wanted, plus any extra pulses covering the junk frames the
    /// consumer discards). `num_trigs = 0` yields an empty buffer, which is a
    /// legal degenerate output producing no trigger pulses.
    pub fn tile(&self, num_trigs: usize) -> Array1<u8> {
        let mut buf = Vec::with_capacity(num_trigs * self.samples.len());
        for _ in 0..num_trigs {
            buf.extend_from_slice(self.samples.as_slice().unwrap());
        }
        Array1::from(buf)
    }
}
