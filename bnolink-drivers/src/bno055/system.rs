//! Identification, power and health

use bnolink_core::SerialLink;
use bnolink_hal::TickSource;
use embedded_hal::delay::DelayNs;

use super::{reg, Bno055, Error, Page, PowerMode, Result, SelfTestResult, SystemError, SystemStatus};

/// Time the built-in self test needs before SYS_ERR is valid
pub const SELF_TEST_DURATION_MS: u32 = 800;

impl<L, C, D> Bno055<L, C, D>
where
    L: SerialLink,
    C: TickSource,
    D: DelayNs,
{
    pub fn chip_id(&mut self) -> Result<u8> {
        self.select_page(Page::Zero)?;
        self.read_byte(reg::CHIP_ID)
    }

    /// Fail with [`Error::UnexpectedValue`] unless the chip id is 0xA0
    pub fn verify_chip_id(&mut self) -> Result<()> {
        match self.chip_id()? {
            reg::CHIP_ID_VALUE => Ok(()),
            other => {
                warn!("bno055 unexpected chip id {=u8:#x}", other);
                Err(Error::UnexpectedValue(other))
            }
        }
    }

    pub fn power_mode(&mut self) -> Result<PowerMode> {
        self.select_page(Page::Zero)?;
        let raw = self.read_byte(reg::PWR_MODE)?;
        PowerMode::from_bits(raw).ok_or(Error::UnexpectedValue(raw))
    }

    pub fn set_power_mode(&mut self, mode: PowerMode) -> Result<()> {
        self.with_config_mode(|dev| {
            dev.select_page(Page::Zero)?;
            dev.update_bits(reg::PWR_MODE, reg::PWR_MODE_MASK, mode as u8)
        })
    }

    /// Power-on self-test result
    pub fn self_test_result(&mut self) -> Result<SelfTestResult> {
        self.select_page(Page::Zero)?;
        self.read_byte(reg::ST_RESULT).map(SelfTestResult::from_register)
    }

    /// Trigger the built-in self test and report SYS_ERR afterwards
    ///
    /// Blocks for [`SELF_TEST_DURATION_MS`].
    pub fn run_self_test(&mut self) -> Result<SystemError> {
        self.with_config_mode(|dev| {
            dev.select_page(Page::Zero)?;
            dev.update_bits(
                reg::SYS_TRIGGER,
                reg::SYS_TRIGGER_SELF_TEST,
                reg::SYS_TRIGGER_SELF_TEST,
            )?;
            dev.delay.delay_ms(SELF_TEST_DURATION_MS);
            dev.read_byte(reg::SYS_ERR).map(SystemError::from_register)
        })
    }

    pub fn system_status(&mut self) -> Result<SystemStatus> {
        self.select_page(Page::Zero)?;
        self.read_byte(reg::SYS_STATUS).map(SystemStatus::from_register)
    }

    pub fn system_error(&mut self) -> Result<SystemError> {
        self.select_page(Page::Zero)?;
        self.read_byte(reg::SYS_ERR).map(SystemError::from_register)
    }
}
