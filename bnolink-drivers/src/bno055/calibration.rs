//! Calibration status, offsets and radii

use bnolink_core::SerialLink;
use bnolink_hal::TickSource;
use embedded_hal::delay::DelayNs;

use super::{
    reg, Bno055, CalibrationProfile, CalibrationStatus, Error, Offsets, Page, Result, Sensor,
};

fn offset_register(sensor: Sensor) -> u8 {
    match sensor {
        Sensor::Accelerometer => reg::ACC_OFFSET,
        Sensor::Magnetometer => reg::MAG_OFFSET,
        Sensor::Gyroscope => reg::GYR_OFFSET,
    }
}

/// The gyroscope has no radius register
fn radius_register(sensor: Sensor) -> Result<u8> {
    match sensor {
        Sensor::Accelerometer => Ok(reg::ACC_RADIUS),
        Sensor::Magnetometer => Ok(reg::MAG_RADIUS),
        Sensor::Gyroscope => Err(Error::InvalidParam),
    }
}

impl<L, C, D> Bno055<L, C, D>
where
    L: SerialLink,
    C: TickSource,
    D: DelayNs,
{
    pub fn calibration_status(&mut self) -> Result<CalibrationStatus> {
        self.select_page(Page::Zero)?;
        self.read_byte(reg::CALIB_STAT)
            .map(CalibrationStatus::from_register)
    }

    pub fn sensor_offset(&mut self, sensor: Sensor) -> Result<Offsets> {
        self.with_config_mode(|dev| {
            let mut bytes = [0u8; reg::VECTOR_LENGTH];
            dev.select_page(Page::Zero)?;
            dev.read_register(offset_register(sensor), &mut bytes)?;
            Ok(Offsets::from_le_bytes(&bytes))
        })
    }

    pub fn set_sensor_offset(&mut self, sensor: Sensor, offsets: Offsets) -> Result<()> {
        self.with_config_mode(|dev| {
            dev.select_page(Page::Zero)?;
            dev.write_register(offset_register(sensor), &offsets.to_le_bytes())
        })
    }

    pub fn sensor_radius(&mut self, sensor: Sensor) -> Result<i16> {
        let register = radius_register(sensor)?;
        self.with_config_mode(|dev| {
            let mut bytes = [0u8; 2];
            dev.select_page(Page::Zero)?;
            dev.read_register(register, &mut bytes)?;
            Ok(i16::from_le_bytes(bytes))
        })
    }

    pub fn set_sensor_radius(&mut self, sensor: Sensor, radius: i16) -> Result<()> {
        let register = radius_register(sensor)?;
        self.with_config_mode(|dev| {
            dev.select_page(Page::Zero)?;
            dev.write_register(register, &radius.to_le_bytes())
        })
    }

    /// All offsets and radii in one transfer
    pub fn calibration_profile(&mut self) -> Result<CalibrationProfile> {
        self.with_config_mode(|dev| {
            let mut bytes = [0u8; reg::CALIBRATION_LENGTH];
            dev.select_page(Page::Zero)?;
            dev.read_register(reg::ACC_OFFSET, &mut bytes)?;
            Ok(CalibrationProfile::from_le_bytes(&bytes))
        })
    }

    /// Restore a profile captured with [`Bno055::calibration_profile`]
    pub fn set_calibration_profile(&mut self, profile: &CalibrationProfile) -> Result<()> {
        let bytes = profile.to_le_bytes();
        self.with_config_mode(|dev| {
            dev.select_page(Page::Zero)?;
            dev.write_register(reg::ACC_OFFSET, &bytes)
        })
    }
}
