//! Page-1 sensor configuration
//!
//! ```text
//! ACC_CONFIG   (0x08)  [7:5] power  [4:2] bandwidth  [1:0] range
//! MAG_CONFIG   (0x09)  [6:5] power  [4:3] operation  [2:0] data rate
//! GYR_CONFIG_0 (0x0A)  [5:3] bandwidth  [2:0] range
//! GYR_CONFIG_1 (0x0B)  [2:0] power
//! ```
//!
//! In fusion modes the sensor manages these settings itself and ignores
//! what is written here.

use bnolink_core::SerialLink;
use bnolink_hal::TickSource;
use embedded_hal::delay::DelayNs;

use super::{reg, Bno055, Error, Page, Result, Sensor};

/// Field enum with an explicit encoding and a position in its register
macro_rules! register_field {
    (
        $(#[$meta:meta])*
        $name:ident, shift = $shift:expr, width = $width:expr,
        { $($variant:ident = $value:expr),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $($variant = $value),+
        }

        impl $name {
            const SHIFT: u8 = $shift;
            const MASK: u8 = ((1u8 << $width) - 1) << $shift;

            fn bits(self) -> u8 {
                (self as u8) << Self::SHIFT
            }

            fn from_register(value: u8) -> Result<Self> {
                match (value & Self::MASK) >> Self::SHIFT {
                    $(v if v == $value => Ok(Self::$variant),)+
                    _ => Err(Error::UnexpectedValue(value)),
                }
            }
        }
    };
}

register_field!(
    /// Full-scale range
    AccelRange, shift = 0, width = 2,
    { G2 = 0, G4 = 1, G8 = 2, G16 = 3 }
);

register_field!(
    /// Low-pass filter bandwidth
    AccelBandwidth, shift = 2, width = 3,
    {
        Hz7_81 = 0,
        Hz15_63 = 1,
        Hz31_25 = 2,
        Hz62_5 = 3,
        Hz125 = 4,
        Hz250 = 5,
        Hz500 = 6,
        Hz1000 = 7,
    }
);

register_field!(
    AccelPowerMode, shift = 5, width = 3,
    {
        Normal = 0,
        Suspend = 1,
        LowPower1 = 2,
        Standby = 3,
        LowPower2 = 4,
        DeepSuspend = 5,
    }
);

register_field!(
    /// Output data rate
    MagDataRate, shift = 0, width = 3,
    {
        Hz2 = 0,
        Hz6 = 1,
        Hz8 = 2,
        Hz10 = 3,
        Hz15 = 4,
        Hz20 = 5,
        Hz25 = 6,
        Hz30 = 7,
    }
);

register_field!(
    MagOperationMode, shift = 3, width = 2,
    { LowPower = 0, Regular = 1, EnhancedRegular = 2, HighAccuracy = 3 }
);

register_field!(
    MagPowerMode, shift = 5, width = 2,
    { Normal = 0, Sleep = 1, Suspend = 2, Force = 3 }
);

register_field!(
    /// Full-scale range in degrees per second
    GyroRange, shift = 0, width = 3,
    { Dps2000 = 0, Dps1000 = 1, Dps500 = 2, Dps250 = 3, Dps125 = 4 }
);

register_field!(
    GyroBandwidth, shift = 3, width = 3,
    {
        Hz523 = 0,
        Hz230 = 1,
        Hz116 = 2,
        Hz47 = 3,
        Hz23 = 4,
        Hz12 = 5,
        Hz64 = 6,
        Hz32 = 7,
    }
);

register_field!(
    GyroPowerMode, shift = 0, width = 3,
    {
        Normal = 0,
        FastPowerUp = 1,
        DeepSuspend = 2,
        Suspend = 3,
        AdvancedPowerSave = 4,
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccelConfig {
    pub range: AccelRange,
    pub bandwidth: AccelBandwidth,
    pub power_mode: AccelPowerMode,
}

impl Default for AccelConfig {
    fn default() -> Self {
        Self {
            range: AccelRange::G4,
            bandwidth: AccelBandwidth::Hz62_5,
            power_mode: AccelPowerMode::Normal,
        }
    }
}

impl AccelConfig {
    const MASK: u8 = AccelRange::MASK | AccelBandwidth::MASK | AccelPowerMode::MASK;

    fn bits(&self) -> u8 {
        self.range.bits() | self.bandwidth.bits() | self.power_mode.bits()
    }

    fn from_register(value: u8) -> Result<Self> {
        Ok(Self {
            range: AccelRange::from_register(value)?,
            bandwidth: AccelBandwidth::from_register(value)?,
            power_mode: AccelPowerMode::from_register(value)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MagConfig {
    pub data_rate: MagDataRate,
    pub operation_mode: MagOperationMode,
    pub power_mode: MagPowerMode,
}

impl Default for MagConfig {
    fn default() -> Self {
        Self {
            data_rate: MagDataRate::Hz20,
            operation_mode: MagOperationMode::Regular,
            power_mode: MagPowerMode::Force,
        }
    }
}

impl MagConfig {
    const MASK: u8 = MagDataRate::MASK | MagOperationMode::MASK | MagPowerMode::MASK;

    fn bits(&self) -> u8 {
        self.data_rate.bits() | self.operation_mode.bits() | self.power_mode.bits()
    }

    fn from_register(value: u8) -> Result<Self> {
        Ok(Self {
            data_rate: MagDataRate::from_register(value)?,
            operation_mode: MagOperationMode::from_register(value)?,
            power_mode: MagPowerMode::from_register(value)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GyroConfig {
    pub range: GyroRange,
    pub bandwidth: GyroBandwidth,
    pub power_mode: GyroPowerMode,
}

impl Default for GyroConfig {
    fn default() -> Self {
        Self {
            range: GyroRange::Dps2000,
            bandwidth: GyroBandwidth::Hz32,
            power_mode: GyroPowerMode::Normal,
        }
    }
}

impl GyroConfig {
    const MASK_0: u8 = GyroRange::MASK | GyroBandwidth::MASK;

    fn bits_0(&self) -> u8 {
        self.range.bits() | self.bandwidth.bits()
    }
}

impl<L, C, D> Bno055<L, C, D>
where
    L: SerialLink,
    C: TickSource,
    D: DelayNs,
{
    /// Write the accelerometer configuration
    ///
    /// Refused with [`Error::InvalidParam`] when the current operating mode
    /// does not run the accelerometer. Page 0 is reselected when the
    /// previous mode is restored.
    pub fn configure_accelerometer(&mut self, config: &AccelConfig) -> Result<()> {
        self.require_sensor(Sensor::Accelerometer)?;
        self.with_config_mode(|dev| {
            dev.select_page(Page::One)?;
            dev.update_bits(reg::ACC_CONFIG, AccelConfig::MASK, config.bits())
        })
    }

    pub fn accelerometer_config(&mut self) -> Result<AccelConfig> {
        let value = self.read_page_one(reg::ACC_CONFIG)?;
        AccelConfig::from_register(value)
    }

    pub fn configure_magnetometer(&mut self, config: &MagConfig) -> Result<()> {
        self.require_sensor(Sensor::Magnetometer)?;
        self.with_config_mode(|dev| {
            dev.select_page(Page::One)?;
            dev.update_bits(reg::MAG_CONFIG, MagConfig::MASK, config.bits())
        })
    }

    pub fn magnetometer_config(&mut self) -> Result<MagConfig> {
        let value = self.read_page_one(reg::MAG_CONFIG)?;
        MagConfig::from_register(value)
    }

    pub fn configure_gyroscope(&mut self, config: &GyroConfig) -> Result<()> {
        self.require_sensor(Sensor::Gyroscope)?;
        self.with_config_mode(|dev| {
            dev.select_page(Page::One)?;
            dev.update_bits(reg::GYR_CONFIG_0, GyroConfig::MASK_0, config.bits_0())?;
            dev.update_bits(reg::GYR_CONFIG_1, GyroPowerMode::MASK, config.power_mode.bits())
        })
    }

    pub fn gyroscope_config(&mut self) -> Result<GyroConfig> {
        let config_0 = self.read_page_one(reg::GYR_CONFIG_0)?;
        let config_1 = self.read_page_one(reg::GYR_CONFIG_1)?;
        Ok(GyroConfig {
            range: GyroRange::from_register(config_0)?,
            bandwidth: GyroBandwidth::from_register(config_0)?,
            power_mode: GyroPowerMode::from_register(config_1)?,
        })
    }

    /// Sensor must be running in the current operating mode
    fn require_sensor(&mut self, sensor: Sensor) -> Result<()> {
        let mode = self.operating_mode()?;
        if mode.uses(sensor) {
            Ok(())
        } else {
            debug!("bno055 {} unused in {}", sensor, mode);
            Err(Error::InvalidParam)
        }
    }

    /// Read a page-1 register and return to page 0
    fn read_page_one(&mut self, register: u8) -> Result<u8> {
        self.select_page(Page::One)?;
        let value = self.read_byte(register)?;
        self.select_page(Page::Zero)?;
        Ok(value)
    }
}
