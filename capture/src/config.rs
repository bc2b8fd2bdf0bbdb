use crate::event::Edge;

/// Ring buffer size used by the firmware. Power of two, at most 256.
pub const CAPTURE_BUFFER_SIZE: usize = 64;

/// How the capture channel is armed at startup.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CaptureConfig {
    pub initial_edge: Edge,
    pub noise_filter: bool,
}

impl CaptureConfig {
    /// Configuration selected by the crate features of this build.
    pub const BUILD: Self = CaptureConfig {
        initial_edge: Edge::Rising,
        noise_filter: cfg!(feature = "noise-filter"),
    };
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::BUILD
    }
}
