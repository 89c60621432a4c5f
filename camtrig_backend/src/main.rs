use camtrig_backend::device::TrigOutputDevice;

fn main() {
    // Parameter set from the low-rate bench run: 10x1 image, 20 Hz triggers
    // sampled at 10x the trigger rate.
    let mut dev = TrigOutputDevice::new("Dev3", 200., 20.);
    dev.add_line(0, 0);
    dev.add_line(0, 1);

    let num_trigs = 10 * 1;
    println!("one period: {:?}", dev.waveform().samples());
    println!(
        "buffer shape: {:?}, samps per chan: {}",
        dev.calc_wfm_buffer(num_trigs).shape(),
        dev.samps_per_chan(num_trigs)
    );
}
