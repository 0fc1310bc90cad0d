//! Sensor drivers for the bnolink stack
//!
//! This crate implements the register-level drivers that sit on top of the
//! serial transport in `bnolink-core`:
//!
//! - BNO055 9-axis absolute orientation sensor (UART mode)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod log;

pub mod bno055;

pub use bno055::{Bno055, Error};
