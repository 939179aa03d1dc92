//! Media inspection for uploaded videos.
//!
//! Only playback duration is extracted. [`probe_with_timeout`] bounds any
//! [`DurationProbe`] so a hung external tool delays just its own upload.

pub mod ffprobe;
pub mod probe;

pub use ffprobe::{parse_ffprobe_duration, FfprobeDurationProbe};
pub use probe::{probe_with_timeout, DurationProbe, ProbeError};
