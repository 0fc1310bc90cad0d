//! Serial transport engine for the bnolink sensor stack
//!
//! This crate owns everything between the USART registers and the framed
//! register protocol:
//!
//! - Per-port transmit/receive state machine driven from the USART interrupt
//! - Interrupt-safe handoff of that state between foreground code and the ISR
//! - The [`SerialLink`] trait the protocol layer is written against
//! - Transfer timeout calculation from the line configuration
//!
//! # Data flow
//!
//! ```text
//!  foreground                         USART interrupt
//!  ──────────                         ───────────────
//!  begin_transmit ──► PortState ◄──── on_interrupt (TXE/TC)
//!  begin_receive  ──► PortState ◄──── on_interrupt (RXNE)
//!  poll busy/take_received ◄──┘
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod timeout;
pub mod transport;

pub use timeout::{compute_timeout_ms, BLOCKING_TIMEOUT_MARGIN, RX_TIMEOUT_MARGIN};
pub use transport::{
    LinkStatus, Port, PortState, RxOutcome, SerialLink, SharedPort, TransportError,
    RX_BUFFER_SIZE, TX_BUFFER_SIZE,
};
