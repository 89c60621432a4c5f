use camtrig_backend::channel::parse_terminal;
use camtrig_backend::device::TrigOutputDevice;
use camtrig_backend::waveform::TrigWaveform;

#[test]
fn period_length_for_exact_multiples() {
    for k in [1usize, 2, 3, 4, 10, 500, 1000] {
        let wfm = TrigWaveform::one_period(1e3 * k as f64, 1e3);
        assert_eq!(wfm.num_samps(), k);
    }
}

#[test]
fn benchmark_period_1mhz_1khz() {
    // fs=1e6, trig_freq=1e3: 1000 samples, q1=250, q3=750.
    // 1-based ramp positions 251..=749 are high, 499 samples in total.
    let wfm = TrigWaveform::one_period(1e6, 1e3);
    assert_eq!(wfm.num_samps(), 1000);

    let samples = wfm.samples();
    let num_high: usize = samples.iter().map(|&x| x as usize).sum();
    assert_eq!(num_high, 499);
    for i in 1..=1000usize {
        let expected = if i > 250 && i < 750 { 1 } else { 0 };
        assert_eq!(samples[i - 1], expected, "mismatch at ramp position {}", i);
    }
}

#[test]
fn single_contiguous_high_run_inside_open_quarter_interval() {
    for k in [4usize, 5, 7, 10, 50, 999, 1000] {
        let wfm = TrigWaveform::one_period(k as f64, 1.);
        let samples = wfm.samples();
        let q1 = (k as f64 * 0.25) as usize;
        let q3 = (k as f64 * 0.75) as usize;

        // All high samples sit strictly inside (q1, q3) on the 1-based ramp
        // and form one contiguous run.
        let high_positions: Vec<usize> = (1..=k).filter(|&i| samples[i - 1] == 1).collect();
        assert!(!high_positions.is_empty(), "period of {} has no high pulse", k);
        for &i in &high_positions {
            assert!(i > q1 && i < q3);
        }
        let first = high_positions[0];
        let last = *high_positions.last().unwrap();
        assert_eq!(high_positions.len(), last - first + 1, "run not contiguous for k={}", k);
    }
}

#[test]
fn degenerate_single_sample_period_stays_low() {
    // fs=20, trig_freq=20: one sample, q1=q3=0, condition 0<1<0 never holds.
    let wfm = TrigWaveform::one_period(20., 20.);
    assert_eq!(wfm.num_samps(), 1);
    assert_eq!(wfm.samples()[0], 0);
}

#[test]
fn short_periods_keep_truncation_semantics() {
    // Truncation quirks below 4 samples are load-bearing and must not be
    // "fixed": n=2 is all-low, n=3 puts its only high sample at position 1.
    assert_eq!(TrigWaveform::one_period(2., 1.).samples().to_vec(), vec![0, 0]);
    assert_eq!(TrigWaveform::one_period(3., 1.).samples().to_vec(), vec![1, 0, 0]);
}

#[test]
fn non_integer_ratio_truncates_down() {
    let wfm = TrigWaveform::one_period(1e6, 3e3);
    assert_eq!(wfm.num_samps(), 333);
}

#[test]
fn tile_zero_is_empty() {
    let wfm = TrigWaveform::one_period(1e6, 1e3);
    assert_eq!(wfm.tile(0).len(), 0);
}

#[test]
fn tile_is_back_to_back_copies() {
    let wfm = TrigWaveform::one_period(100., 10.);
    let n = 7;
    let tiled = wfm.tile(n);
    assert_eq!(tiled.len(), n * wfm.num_samps());
    for rep in 0..n {
        for (i, &s) in wfm.samples().iter().enumerate() {
            assert_eq!(tiled[rep * wfm.num_samps() + i], s);
        }
    }
}

#[test]
fn device_buffer_duplicates_waveform_per_line() {
    let mut dev = TrigOutputDevice::new("Dev3", 1e6, 1e3);
    dev.add_line(0, 0);
    dev.add_line(0, 1);

    let num_trigs = 5;
    let buf = dev.calc_wfm_buffer(num_trigs);
    assert_eq!(buf.shape(), &[2, dev.samps_per_chan(num_trigs)]);

    // Both lines play the identical sequence in lockstep
    let expected = dev.waveform().tile(num_trigs);
    for row in 0..2 {
        for (i, &s) in expected.iter().enumerate() {
            assert_eq!(buf[[row, i]], s);
        }
    }
}

#[test]
fn device_line_names_keep_registration_order() {
    let mut dev = TrigOutputDevice::new("Dev3", 1e6, 1e3);
    dev.add_line(0, 1);
    dev.add_line(0, 0);
    assert_eq!(dev.line_names(), vec!["port0/line1", "port0/line0"]);
    assert_eq!(
        dev.line_terminals(),
        vec!["/Dev3/port0/line1", "/Dev3/port0/line0"]
    );
}

#[test]
#[should_panic(expected = "already contains line")]
fn duplicate_line_panics() {
    let mut dev = TrigOutputDevice::new("Dev3", 1e6, 1e3);
    dev.add_line(0, 0);
    dev.add_line(0, 0);
}

#[test]
#[should_panic(expected = "no registered lines")]
fn buffer_without_lines_panics() {
    let dev = TrigOutputDevice::new("Dev3", 1e6, 1e3);
    dev.calc_wfm_buffer(1);
}

#[test]
fn terminal_parsing() {
    let (dev, line) = parse_terminal("/Dev3/port0/line0");
    assert_eq!(dev, "Dev3");
    assert_eq!(line.physical_name(), "port0/line0");

    // Leading slash is optional
    let (dev, line) = parse_terminal("PXI1Slot6/port2/line17");
    assert_eq!(dev, "PXI1Slot6");
    assert_eq!((line.port, line.line), (2, 17));
}

#[test]
#[should_panic(expected = "should be of the form")]
fn malformed_terminal_panics() {
    parse_terminal("/Dev3/ao0");
}

#[test]
fn from_terminal_registers_first_line() {
    let dev = TrigOutputDevice::from_terminal("/Dev3/port0/line0", 1e6, 1e3);
    assert_eq!(dev.physical_name(), "Dev3");
    assert_eq!(dev.num_lines(), 1);
    assert_eq!(dev.line_names(), vec!["port0/line0"]);
}
