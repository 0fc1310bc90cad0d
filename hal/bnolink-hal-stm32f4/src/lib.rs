//! STM32F4-specific HAL for the bnolink stack
//!
//! Implements the `bnolink-hal` traits on top of embassy-stm32:
//!
//! - [`Stm32Usart`]: raw USART register block (SR/DR/CR1) for the
//!   interrupt-driven transport in `bnolink-core`
//! - [`EmbassyTick`]: millisecond tick on the embassy time driver
//! - Conversions between `bnolink-hal` line settings and embassy-stm32
//!   USART configuration for peripheral bring-up
//!
//! # Features
//!
//! - `stm32f411ce` - STM32F411CE ("blackpill")
//! - `stm32f401cc` - STM32F401CC
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! Clocks, pins and the baud rate generator are configured once through
//! embassy-stm32's blocking `Uart`. The register block is then handed to a
//! `bnolink_core::SharedPort`, which owns it from that point on.

#![no_std]

pub mod tick;
pub mod uart;

pub use tick::EmbassyTick;
pub use uart::{line_config, Stm32Usart, UartSetupError};
