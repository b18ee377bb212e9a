mod phase;
mod waveform;

pub use self::phase::{phase_increment, Phase};
pub use self::waveform::{deserialize_lenient as deserialize_waveform, Waveform};
