//! Audio input: decoding, playback and amplitude analysis.
//!
//! A decoded file is played through `cpal` (or a silent clock) while a
//! browser-style byte-spectrum analyser reduces the most recent window of
//! samples to a single amplitude on the 0-255 scale.

mod analyser;
mod decode;
mod loader;
mod playback;
mod sampler;

// Re-export public types
pub use analyser::{blackman_window, FrequencyAnalyser};
pub use decode::{decode_bytes, decode_file, DecodedAudio};
pub use loader::PendingAudio;
pub use playback::{ClockPlayback, DevicePlayback, Playback};
pub use sampler::{AudioAmplitudeSampler, PlaybackMode};
