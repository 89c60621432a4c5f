pub mod channel;
pub mod device;
pub mod waveform;

pub use channel::*;
pub use device::*;
pub use waveform::*;
