//! BNO055 UART Register Protocol
//!
//! This crate defines the byte framing the BNO055 speaks on its UART
//! interface. The host issues a command frame and the sensor answers with a
//! short response:
//!
//! ```text
//! Command (host → sensor)
//! ┌───────┬────┬──────────┬────────┬──────────────────┐
//! │ START │ OP │ REGISTER │ LENGTH │ PAYLOAD (writes) │
//! │ 0xAA  │ 1B │ 1B       │ 1B     │ LENGTH bytes     │
//! └───────┴────┴──────────┴────────┴──────────────────┘
//!
//! Response (sensor → host)
//! ┌────────┬────────┬──────────────────┐
//! │ BYTE 0 │ BYTE 1 │ PAYLOAD (reads)  │
//! └────────┴────────┴──────────────────┘
//! ```
//!
//! A response whose first byte is `0xEE` reports a device-side error with
//! the status code in the second byte.

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod response;

pub use frame::{Command, FrameError, MAX_COMMAND_SIZE, MAX_LENGTH, START_BYTE};
pub use response::{read_error, write_error, ResponseStatus, ERROR_SENTINEL, READ_SUCCESS};
