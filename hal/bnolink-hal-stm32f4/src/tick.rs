//! Millisecond tick on the embassy time driver

use bnolink_hal::TickSource;
use embassy_time::Instant;

/// [`TickSource`] backed by [`Instant::now`]
///
/// Truncated to 32 bits, which wraps after about 49 days; callers only
/// ever compare differences.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyTick;

impl TickSource for EmbassyTick {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}
