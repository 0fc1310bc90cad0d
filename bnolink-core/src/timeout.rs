//! Transfer timeout calculation
//!
//! The expected time on the wire is one bit period times the bits per
//! character times the number of characters. A margin multiplier turns
//! that into a deadline.

use bnolink_hal::UartConfig;

use crate::transport::TransportError;

/// Margin applied when waiting for a sensor response
pub const RX_TIMEOUT_MARGIN: f32 = 5.0;

/// Margin applied to polled blocking transmits
pub const BLOCKING_TIMEOUT_MARGIN: f32 = 2.0;

/// Base data bits per character
const DATA_BITS: f32 = 8.0;

/// Deadline in milliseconds for moving `length` characters over the line
///
/// `timeout = (1000 / baud) * (8 + word_ext + parity + stop) * length * margin`
///
/// The result must be recomputed per transfer as both `length` and `margin`
/// vary between callers.
pub fn compute_timeout_ms(
    config: &UartConfig,
    length: usize,
    margin: f32,
) -> Result<f32, TransportError> {
    if config.baudrate == 0 || !margin.is_finite() || margin <= 0.0 {
        return Err(TransportError::InvalidParam);
    }

    let bit_period_ms = 1000.0 / config.baudrate as f32;
    let total_bits = DATA_BITS
        + config.data_bits.extension_bits()
        + config.parity.bits()
        + config.stop_bits.bits();

    Ok(bit_period_ms * total_bits * length as f32 * margin)
}

/// Whether `elapsed_ms` has passed the deadline
///
/// Strictly greater, so a wait always spans at least `timeout_ms`.
pub fn is_expired(elapsed_ms: u32, timeout_ms: f32) -> bool {
    elapsed_ms as f32 > timeout_ms
}
