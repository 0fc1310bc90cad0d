//! bnolink Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the serial transport
//! is written against. Chip-specific HALs implement them on top of their
//! peripheral register blocks, so the transport engine and the sensor
//! driver can be tested on the host against simulated hardware.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Sensor driver (bnolink-drivers)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  Serial transport (bnolink-core)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bnolink-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ bnolink-hal-  │
//!             │   stm32f4     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UsartRegisters`] - Byte-level USART register access for interrupt handlers
//! - [`tick::TickSource`] - Free-running millisecond counter

#![no_std]
#![deny(unsafe_code)]

pub mod tick;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use tick::TickSource;
pub use uart::{DataBits, LineStatus, Parity, StopBits, UartConfig, UsartInterrupt, UsartRegisters};
