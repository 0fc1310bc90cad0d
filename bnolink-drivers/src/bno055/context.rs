//! Page and operating-mode context

use core::ops::{Deref, DerefMut};

use bnolink_core::SerialLink;
use bnolink_hal::TickSource;
use embedded_hal::delay::DelayNs;

use super::{reg, Bno055, Error, OperatingMode, Page, Result};

/// Settle time after switching into CONFIG
pub const CONFIG_ENTER_DELAY_MS: u32 = 19;

/// Settle time after switching out of CONFIG
pub const CONFIG_EXIT_DELAY_MS: u32 = 7;

impl<L, C, D> Bno055<L, C, D>
where
    L: SerialLink,
    C: TickSource,
    D: DelayNs,
{
    /// Make `page` the active register page
    ///
    /// PAGE_ID is readable on both pages; the write is skipped when it
    /// already matches.
    pub fn select_page(&mut self, page: Page) -> Result<()> {
        let current = self.read_byte(reg::PAGE_ID)?;
        if current == page as u8 {
            return Ok(());
        }
        self.delay.delay_ms(self.config.page_switch_delay_ms);
        self.write_byte(reg::PAGE_ID, page as u8)?;
        trace!("bno055 page {}", page as u8);
        Ok(())
    }

    pub fn operating_mode(&mut self) -> Result<OperatingMode> {
        let raw = self.read_mode_register()?;
        OperatingMode::from_bits(raw).ok_or(Error::UnexpectedValue(raw))
    }

    /// Switch operating mode and wait for the sensor to settle
    ///
    /// Only transitions into or out of CONFIG wait. When the sensor already
    /// reports `mode` nothing is written, so restoring an unchanged mode
    /// costs a single read.
    pub fn set_operating_mode(&mut self, mode: OperatingMode) -> Result<()> {
        let raw = self.read_mode_register()?;
        let current = raw & reg::OPR_MODE_MASK;
        if current == mode as u8 {
            return Ok(());
        }

        self.write_byte(
            reg::OPR_MODE,
            (raw & !reg::OPR_MODE_MASK) | (mode as u8 & reg::OPR_MODE_MASK),
        )?;

        if mode == OperatingMode::Config {
            self.delay.delay_ms(CONFIG_ENTER_DELAY_MS);
        } else if current == OperatingMode::Config as u8 {
            self.delay.delay_ms(CONFIG_EXIT_DELAY_MS);
        }
        debug!("bno055 mode {}", mode);
        Ok(())
    }

    /// Enter CONFIG if not already there, returning the mode left behind
    pub fn ensure_config_mode(&mut self) -> Result<OperatingMode> {
        let previous = self.operating_mode()?;
        if previous != OperatingMode::Config {
            self.set_operating_mode(OperatingMode::Config)?;
        }
        Ok(previous)
    }

    /// Return to a mode captured by [`Bno055::ensure_config_mode`]
    pub fn restore_mode(&mut self, previous: OperatingMode) -> Result<()> {
        self.set_operating_mode(previous)
    }

    /// Enter CONFIG for the lifetime of the returned guard
    pub fn enter_config_mode(&mut self) -> Result<ConfigModeGuard<'_, L, C, D>> {
        let previous = self.ensure_config_mode()?;
        Ok(ConfigModeGuard {
            device: self,
            previous,
            restored: false,
        })
    }

    /// Run `f` in CONFIG mode and restore the previous mode afterwards
    ///
    /// The mode is restored whether or not `f` succeeds. An error from `f`
    /// takes precedence over one from the restore.
    pub fn with_config_mode<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let mut guard = self.enter_config_mode()?;
        let value = f(&mut *guard)?;
        guard.finish()?;
        Ok(value)
    }

    fn read_mode_register(&mut self) -> Result<u8> {
        self.select_page(Page::Zero)?;
        self.read_byte(reg::OPR_MODE)
    }
}

/// Keeps the sensor in CONFIG mode until dropped
///
/// Dropping the guard restores the previous mode on a best-effort basis
/// and logs a failure. Call [`ConfigModeGuard::finish`] to observe the
/// restore result instead.
pub struct ConfigModeGuard<'a, L, C, D>
where
    L: SerialLink,
    C: TickSource,
    D: DelayNs,
{
    device: &'a mut Bno055<L, C, D>,
    previous: OperatingMode,
    restored: bool,
}

impl<L, C, D> ConfigModeGuard<'_, L, C, D>
where
    L: SerialLink,
    C: TickSource,
    D: DelayNs,
{
    /// Mode that will be restored
    pub fn previous_mode(&self) -> OperatingMode {
        self.previous
    }

    /// Restore the previous mode now
    pub fn finish(mut self) -> Result<()> {
        self.restored = true;
        self.device.restore_mode(self.previous)
    }

    /// Leave CONFIG for `mode` instead of the captured one
    pub fn finish_into(mut self, mode: OperatingMode) -> Result<()> {
        self.restored = true;
        self.device.set_operating_mode(mode)
    }
}

impl<L, C, D> Deref for ConfigModeGuard<'_, L, C, D>
where
    L: SerialLink,
    C: TickSource,
    D: DelayNs,
{
    type Target = Bno055<L, C, D>;

    fn deref(&self) -> &Self::Target {
        self.device
    }
}

impl<L, C, D> DerefMut for ConfigModeGuard<'_, L, C, D>
where
    L: SerialLink,
    C: TickSource,
    D: DelayNs,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.device
    }
}

impl<L, C, D> Drop for ConfigModeGuard<'_, L, C, D>
where
    L: SerialLink,
    C: TickSource,
    D: DelayNs,
{
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.device.restore_mode(self.previous) {
            warn!("bno055 failed to restore mode {}: {}", self.previous, e);
        }
    }
}
