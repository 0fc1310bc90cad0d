//! Sensor and fusion outputs

use bnolink_core::SerialLink;
use bnolink_hal::TickSource;
use embedded_hal::delay::DelayNs;

use super::types::QUATERNION_SCALE;
use super::{
    reg, Bno055, Error, OperatingMode, Page, Quaternion, RawVector3, Result, Sensor, Unit, Units,
    Vector3,
};

/// A readable data output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Output {
    Accelerometer,
    Magnetometer,
    Gyroscope,
    Euler,
    Quaternion,
    LinearAcceleration,
    Gravity,
    Temperature,
}

impl Output {
    /// First register of the output block
    pub fn register(self) -> u8 {
        match self {
            Output::Accelerometer => reg::ACC_DATA,
            Output::Magnetometer => reg::MAG_DATA,
            Output::Gyroscope => reg::GYR_DATA,
            Output::Euler => reg::EUL_DATA,
            Output::Quaternion => reg::QUA_DATA,
            Output::LinearAcceleration => reg::LIA_DATA,
            Output::Gravity => reg::GRV_DATA,
            Output::Temperature => reg::TEMP,
        }
    }

    /// Whether the sensor updates this output in `mode`
    pub fn is_available(self, mode: OperatingMode) -> bool {
        match self {
            Output::Accelerometer => mode.uses(Sensor::Accelerometer),
            Output::Magnetometer => mode.uses(Sensor::Magnetometer),
            Output::Gyroscope => mode.uses(Sensor::Gyroscope),
            Output::Euler | Output::Quaternion | Output::LinearAcceleration | Output::Gravity => {
                mode.is_fusion()
            }
            Output::Temperature => true,
        }
    }

    fn is_vector(self) -> bool {
        !matches!(self, Output::Quaternion | Output::Temperature)
    }
}

impl<L, C, D> Bno055<L, C, D>
where
    L: SerialLink,
    C: TickSource,
    D: DelayNs,
{
    /// Unscaled three-axis output
    ///
    /// [`Output::Quaternion`] and [`Output::Temperature`] are not vectors
    /// and yield [`Error::InvalidParam`].
    pub fn raw_vector(&mut self, output: Output) -> Result<RawVector3> {
        if !output.is_vector() {
            return Err(Error::InvalidParam);
        }
        self.require_output(output)?;

        let mut bytes = [0u8; reg::VECTOR_LENGTH];
        self.read_register(output.register(), &mut bytes)?;
        Ok(RawVector3::from_le_bytes(&bytes))
    }

    /// Acceleration in the selected unit
    pub fn accelerometer(&mut self) -> Result<Vector3> {
        let raw = self.raw_vector(Output::Accelerometer)?;
        Ok(raw.scaled(self.units()?.accel_scale()))
    }

    /// Magnetic field in µT
    pub fn magnetometer(&mut self) -> Result<Vector3> {
        let raw = self.raw_vector(Output::Magnetometer)?;
        Ok(raw.scaled(self.units()?.mag_scale()))
    }

    pub fn gyroscope(&mut self) -> Result<Vector3> {
        let raw = self.raw_vector(Output::Gyroscope)?;
        Ok(raw.scaled(self.units()?.gyro_scale()))
    }

    /// Heading, roll and pitch
    pub fn euler(&mut self) -> Result<Vector3> {
        let raw = self.raw_vector(Output::Euler)?;
        Ok(raw.scaled(self.units()?.euler_scale()))
    }

    pub fn linear_acceleration(&mut self) -> Result<Vector3> {
        let raw = self.raw_vector(Output::LinearAcceleration)?;
        Ok(raw.scaled(self.units()?.accel_scale()))
    }

    pub fn gravity(&mut self) -> Result<Vector3> {
        let raw = self.raw_vector(Output::Gravity)?;
        Ok(raw.scaled(self.units()?.accel_scale()))
    }

    /// Unit quaternion
    pub fn quaternion(&mut self) -> Result<Quaternion> {
        self.require_output(Output::Quaternion)?;

        let mut bytes = [0u8; reg::QUATERNION_LENGTH];
        self.read_register(reg::QUA_DATA, &mut bytes)?;
        let word = |i: usize| i16::from_le_bytes([bytes[2 * i], bytes[2 * i + 1]]) as f32;
        Ok(Quaternion {
            w: word(0) / QUATERNION_SCALE,
            x: word(1) / QUATERNION_SCALE,
            y: word(2) / QUATERNION_SCALE,
            z: word(3) / QUATERNION_SCALE,
        })
    }

    /// Chip temperature in the selected unit
    pub fn temperature(&mut self) -> Result<f32> {
        self.select_page(Page::Zero)?;
        let raw = self.read_byte(reg::TEMP)? as i8;
        Ok(raw as f32 / self.units()?.temperature_scale())
    }

    pub fn units(&mut self) -> Result<Units> {
        self.select_page(Page::Zero)?;
        self.read_byte(reg::UNIT_SEL).map(Units::from_register)
    }

    /// Change one unit selection
    pub fn set_unit(&mut self, unit: Unit) -> Result<()> {
        let (pos, set) = unit.bit();
        let mask = 1 << pos;
        self.with_config_mode(|dev| {
            dev.select_page(Page::Zero)?;
            dev.update_bits(reg::UNIT_SEL, mask, if set { mask } else { 0 })
        })
    }

    fn require_output(&mut self, output: Output) -> Result<()> {
        let mode = self.operating_mode()?;
        if output.is_available(mode) {
            Ok(())
        } else {
            debug!("bno055 {} unavailable in {}", output, mode);
            Err(Error::InvalidParam)
        }
    }
}
