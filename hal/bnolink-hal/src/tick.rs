//! Millisecond time base

/// Free-running millisecond counter
///
/// Advanced by a periodic interrupt. The counter wraps; use
/// [`TickSource::elapsed_since`] rather than comparing raw values.
pub trait TickSource {
    /// Current tick value in milliseconds
    fn now_ms(&self) -> u32;

    /// Milliseconds elapsed since `start`, wrap-safe
    fn elapsed_since(&self, start: u32) -> u32 {
        self.now_ms().wrapping_sub(start)
    }
}

impl<T: TickSource + ?Sized> TickSource for &T {
    fn now_ms(&self) -> u32 {
        (**self).now_ms()
    }
}
