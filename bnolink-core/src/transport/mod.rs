//! Serial transport engine
//!
//! One [`Port`] per physical USART. Each port allows exactly one transmit
//! and one receive in flight; a second request while busy is rejected, never
//! queued. Completion is observed by polling.

mod port;
mod shared;

pub use port::{Port, PortState, RX_BUFFER_SIZE, TX_BUFFER_SIZE};
pub use shared::SharedPort;

use bnolink_hal::UartConfig;

/// Transport errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Empty or over-capacity request, or the port is not installed
    InvalidParam,
    /// A transfer in the same direction is already in flight
    Busy,
    /// Polled transmit did not finish before its deadline
    Timeout,
}

/// Per-direction transfer status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkStatus {
    #[default]
    Idle,
    Busy,
}

/// How a receive transfer ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxOutcome {
    /// All requested bytes arrived
    Complete,
    /// A line error (framing, parity, overrun, noise) stopped the transfer
    Partial { received: usize },
    /// The transfer was aborted by the waiting side
    TimedOut { received: usize },
}

impl RxOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, RxOutcome::Complete)
    }
}

/// Non-blocking serial link
///
/// The contract the register protocol is written against. Implemented by
/// [`Port`] for exclusive ownership and by `&SharedPort` when the port is
/// shared with its interrupt handler.
pub trait SerialLink {
    /// Line configuration the port was brought up with
    fn config(&self) -> Result<UartConfig, TransportError>;

    /// Queue `bytes` for interrupt-driven transmission
    fn begin_transmit(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    fn is_transmit_busy(&self) -> bool;

    /// Arm reception of exactly `len` bytes
    fn begin_receive(&mut self, len: usize) -> Result<(), TransportError>;

    fn is_receive_busy(&self) -> bool;

    /// Stop an in-flight receive regardless of progress
    fn abort_receive(&mut self);

    /// Copy out the bytes of the last finished receive
    ///
    /// Returns `None` while the receive is still in flight or when the
    /// outcome was already taken.
    fn take_received(&mut self, dest: &mut [u8]) -> Option<RxOutcome>;
}

impl<L: SerialLink + ?Sized> SerialLink for &mut L {
    fn config(&self) -> Result<UartConfig, TransportError> {
        (**self).config()
    }

    fn begin_transmit(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        (**self).begin_transmit(bytes)
    }

    fn is_transmit_busy(&self) -> bool {
        (**self).is_transmit_busy()
    }

    fn begin_receive(&mut self, len: usize) -> Result<(), TransportError> {
        (**self).begin_receive(len)
    }

    fn is_receive_busy(&self) -> bool {
        (**self).is_receive_busy()
    }

    fn abort_receive(&mut self) {
        (**self).abort_receive()
    }

    fn take_received(&mut self, dest: &mut [u8]) -> Option<RxOutcome> {
        (**self).take_received(dest)
    }
}
