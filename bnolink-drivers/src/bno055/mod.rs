//! BNO055 absolute orientation sensor (UART mode)
//!
//! The BNO055 combines an accelerometer, magnetometer and gyroscope with an
//! on-chip fusion core. In UART mode every register access is a command
//! frame answered by a short response; see `bnolink-protocol` for the wire
//! format.
//!
//! # Register pages
//!
//! The register map is split in two pages selected through PAGE_ID. Page 0
//! holds data outputs and system registers; page 1 holds the per-sensor
//! configuration. The driver selects the page before each access that
//! depends on it and skips the write when the page already matches.
//!
//! # Operating modes
//!
//! Configuration registers only accept writes in CONFIG mode. Mutators
//! bracket their writes with [`ConfigModeGuard`], which restores the
//! previous mode on every exit path, including errors.
//!
//! ```text
//!   any mode ──19 ms──► CONFIG ──7 ms──► any mode
//! ```

mod axis;
mod calibration;
mod context;
mod data;
mod protocol;
pub mod reg;
mod sensor_config;
mod system;
mod types;

#[cfg(test)]
mod sim;

pub use context::{ConfigModeGuard, CONFIG_ENTER_DELAY_MS, CONFIG_EXIT_DELAY_MS};
pub use data::Output;
pub use sensor_config::{
    AccelBandwidth, AccelConfig, AccelPowerMode, AccelRange, GyroBandwidth, GyroConfig,
    GyroPowerMode, GyroRange, MagConfig, MagDataRate, MagOperationMode, MagPowerMode,
};
pub use types::*;

use bnolink_core::{SerialLink, TransportError};
use bnolink_hal::TickSource;
use bnolink_protocol::{FrameError, ResponseStatus};
use embedded_hal::delay::DelayNs;

/// BNO055 driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Bad argument, unsupported combination, or missing transport
    InvalidParam,
    /// The serial link is busy with another transfer
    Busy,
    /// The link did not finish a polled transfer in time
    Timeout,
    /// The sensor answered with an error status
    Device(ResponseStatus),
    /// Fewer response bytes arrived than expected
    Incomplete { received: usize, expected: usize },
    /// A register held a value with no defined meaning
    UnexpectedValue(u8),
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::InvalidParam => Error::InvalidParam,
            TransportError::Busy => Error::Busy,
            TransportError::Timeout => Error::Timeout,
        }
    }
}

impl From<FrameError> for Error {
    fn from(_: FrameError) -> Self {
        Error::InvalidParam
    }
}

pub type Result<T> = core::result::Result<T, Error>;

/// Register protocol timing
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtocolConfig {
    /// Extra attempts after the first one fails
    pub max_retries: u8,
    /// Wait between arming the receiver and polling, first attempt
    pub initial_delay_ms: u32,
    /// Wait between arming the receiver and polling, retries
    pub retry_delay_ms: u32,
    /// Pause before a retry is transmitted
    pub retry_backoff_ms: u32,
    /// Margin applied to the response deadline
    pub rx_timeout_margin: f32,
    /// Pause before writing PAGE_ID
    pub page_switch_delay_ms: u32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 10,
            retry_delay_ms: 15,
            retry_backoff_ms: 10,
            rx_timeout_margin: bnolink_core::RX_TIMEOUT_MARGIN,
            page_switch_delay_ms: 2,
        }
    }
}

/// Settings applied by [`Bno055::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    pub power_mode: PowerMode,
    pub operating_mode: OperatingMode,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            power_mode: PowerMode::Normal,
            operating_mode: OperatingMode::Ndof,
        }
    }
}

/// BNO055 driver
///
/// Generic over the serial link, the millisecond tick used for response
/// deadlines, and the delay provider used for settle times.
pub struct Bno055<L, C, D> {
    link: L,
    clock: C,
    delay: D,
    config: ProtocolConfig,
    retries_taken: u32,
}

impl<L, C, D> Bno055<L, C, D>
where
    L: SerialLink,
    C: TickSource,
    D: DelayNs,
{
    pub fn new(link: L, clock: C, delay: D) -> Self {
        Self::with_config(link, clock, delay, ProtocolConfig::default())
    }

    pub fn with_config(link: L, clock: C, delay: D, config: ProtocolConfig) -> Self {
        Self {
            link,
            clock,
            delay,
            config,
            retries_taken: 0,
        }
    }

    /// Give back the link, clock and delay
    pub fn release(self) -> (L, C, D) {
        (self.link, self.clock, self.delay)
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn protocol_config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Retries performed since construction
    pub fn retries_taken(&self) -> u32 {
        self.retries_taken
    }

    /// Bring the sensor into the requested power and operating mode
    ///
    /// Verifies the chip id first so a miswired or absent sensor fails
    /// before anything is written. A failed power mode write puts the
    /// sensor back in the mode it was found in.
    pub fn init(&mut self, config: DeviceConfig) -> Result<()> {
        self.verify_chip_id()?;
        self.select_page(Page::Zero)?;

        let mut guard = self.enter_config_mode()?;
        guard.update_bits(reg::PWR_MODE, reg::PWR_MODE_MASK, config.power_mode as u8)?;
        guard.finish_into(config.operating_mode)?;
        debug!("bno055 ready");
        Ok(())
    }
}
