//! Device-level value types

/// Register page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Page {
    Zero = 0,
    One = 1,
}

/// Sensor operating mode
///
/// Only [`OperatingMode::Config`] accepts configuration writes. The
/// remaining modes select which sensors run and whether fusion is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperatingMode {
    Config = 0,
    AccOnly = 1,
    MagOnly = 2,
    GyroOnly = 3,
    AccMag = 4,
    AccGyro = 5,
    MagGyro = 6,
    Amg = 7,
    Imu = 8,
    Compass = 9,
    M4g = 10,
    NdofFmcOff = 11,
    Ndof = 12,
}

impl OperatingMode {
    /// Decode the low nibble of OPR_MODE
    pub fn from_bits(bits: u8) -> Option<Self> {
        Some(match bits & 0x0F {
            0 => Self::Config,
            1 => Self::AccOnly,
            2 => Self::MagOnly,
            3 => Self::GyroOnly,
            4 => Self::AccMag,
            5 => Self::AccGyro,
            6 => Self::MagGyro,
            7 => Self::Amg,
            8 => Self::Imu,
            9 => Self::Compass,
            10 => Self::M4g,
            11 => Self::NdofFmcOff,
            12 => Self::Ndof,
            _ => return None,
        })
    }

    /// Sensor fusion running in this mode
    pub fn is_fusion(self) -> bool {
        matches!(
            self,
            Self::Imu | Self::Compass | Self::M4g | Self::NdofFmcOff | Self::Ndof
        )
    }

    /// Whether `sensor` produces data in this mode
    pub fn uses(self, sensor: Sensor) -> bool {
        match sensor {
            Sensor::Accelerometer => !matches!(
                self,
                Self::Config | Self::MagOnly | Self::GyroOnly | Self::MagGyro
            ),
            Sensor::Magnetometer => !matches!(
                self,
                Self::Config | Self::AccOnly | Self::GyroOnly | Self::AccGyro | Self::Imu
            ),
            Sensor::Gyroscope => !matches!(
                self,
                Self::Config
                    | Self::AccOnly
                    | Self::MagOnly
                    | Self::AccMag
                    | Self::Compass
                    | Self::M4g
            ),
        }
    }
}

/// Power mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PowerMode {
    Normal = 0,
    LowPower = 1,
    Suspend = 2,
}

impl PowerMode {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0x03 {
            0 => Some(Self::Normal),
            1 => Some(Self::LowPower),
            2 => Some(Self::Suspend),
            _ => None,
        }
    }
}

/// Physical sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sensor {
    Accelerometer,
    Magnetometer,
    Gyroscope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelUnit {
    /// m/s²
    MetersPerSecondSquared,
    MilliG,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroUnit {
    DegreesPerSecond,
    RadiansPerSecond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EulerUnit {
    Degrees,
    Radians,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

/// Sign convention of the fusion outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OrientationFormat {
    Windows,
    Android,
}

/// A single UNIT_SEL selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Unit {
    Accel(AccelUnit),
    Gyro(GyroUnit),
    Euler(EulerUnit),
    Temperature(TemperatureUnit),
    Orientation(OrientationFormat),
}

impl Unit {
    /// UNIT_SEL bit position and whether the bit is set
    pub fn bit(self) -> (u8, bool) {
        use super::reg::*;
        match self {
            Unit::Accel(u) => (UNIT_SEL_ACC_POS, u == AccelUnit::MilliG),
            Unit::Gyro(u) => (UNIT_SEL_GYR_POS, u == GyroUnit::RadiansPerSecond),
            Unit::Euler(u) => (UNIT_SEL_EUL_POS, u == EulerUnit::Radians),
            Unit::Temperature(u) => (UNIT_SEL_TEMP_POS, u == TemperatureUnit::Fahrenheit),
            Unit::Orientation(u) => (UNIT_SEL_ORI_POS, u == OrientationFormat::Android),
        }
    }
}

/// Decoded UNIT_SEL register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Units {
    pub accel: AccelUnit,
    pub gyro: GyroUnit,
    pub euler: EulerUnit,
    pub temperature: TemperatureUnit,
    pub orientation: OrientationFormat,
}

impl Units {
    pub fn from_register(value: u8) -> Self {
        use super::reg::*;
        let bit = |pos: u8| value & (1 << pos) != 0;
        Self {
            accel: if bit(UNIT_SEL_ACC_POS) {
                AccelUnit::MilliG
            } else {
                AccelUnit::MetersPerSecondSquared
            },
            gyro: if bit(UNIT_SEL_GYR_POS) {
                GyroUnit::RadiansPerSecond
            } else {
                GyroUnit::DegreesPerSecond
            },
            euler: if bit(UNIT_SEL_EUL_POS) {
                EulerUnit::Radians
            } else {
                EulerUnit::Degrees
            },
            temperature: if bit(UNIT_SEL_TEMP_POS) {
                TemperatureUnit::Fahrenheit
            } else {
                TemperatureUnit::Celsius
            },
            orientation: if bit(UNIT_SEL_ORI_POS) {
                OrientationFormat::Android
            } else {
                OrientationFormat::Windows
            },
        }
    }

    /// LSB per m/s² or per mg
    pub fn accel_scale(&self) -> f32 {
        match self.accel {
            AccelUnit::MetersPerSecondSquared => 100.0,
            AccelUnit::MilliG => 1.0,
        }
    }

    /// LSB per µT, fixed
    pub fn mag_scale(&self) -> f32 {
        16.0
    }

    pub fn gyro_scale(&self) -> f32 {
        match self.gyro {
            GyroUnit::DegreesPerSecond => 16.0,
            GyroUnit::RadiansPerSecond => 900.0,
        }
    }

    pub fn euler_scale(&self) -> f32 {
        match self.euler {
            EulerUnit::Degrees => 16.0,
            EulerUnit::Radians => 900.0,
        }
    }

    /// LSB per degree; Fahrenheit reads at two degrees per LSB
    pub fn temperature_scale(&self) -> f32 {
        match self.temperature {
            TemperatureUnit::Celsius => 1.0,
            TemperatureUnit::Fahrenheit => 0.5,
        }
    }
}

/// LSB per unit quaternion
pub const QUATERNION_SCALE: f32 = 16384.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits & 0x03 {
            0 => Some(Self::X),
            1 => Some(Self::Y),
            2 => Some(Self::Z),
            _ => None,
        }
    }

    /// Field position in AXIS_MAP_CONFIG
    pub fn map_shift(self) -> u8 {
        self as u8 * 2
    }

    /// Bit in AXIS_MAP_SIGN
    pub fn sign_bit(self) -> u8 {
        match self {
            Axis::X => 1 << 2,
            Axis::Y => 1 << 1,
            Axis::Z => 1 << 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisSign {
    Positive,
    Negative,
}

/// Decoded AXIS_MAP_CONFIG and AXIS_MAP_SIGN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisMapping {
    /// Source axis feeding each output axis, indexed by [`Axis`]
    pub source: [Axis; 3],
    pub sign: [AxisSign; 3],
}

impl AxisMapping {
    /// `None` when the map register holds the reserved value 3
    pub fn from_registers(map: u8, sign: u8) -> Option<Self> {
        let source = |axis: Axis| Axis::from_bits(map >> axis.map_shift());
        let sign_of = |axis: Axis| {
            if sign & axis.sign_bit() != 0 {
                AxisSign::Negative
            } else {
                AxisSign::Positive
            }
        };
        Some(Self {
            source: [source(Axis::X)?, source(Axis::Y)?, source(Axis::Z)?],
            sign: [sign_of(Axis::X), sign_of(Axis::Y), sign_of(Axis::Z)],
        })
    }
}

/// Calibration levels, 0 (uncalibrated) to 3 (fully calibrated)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationStatus {
    pub system: u8,
    pub gyroscope: u8,
    pub accelerometer: u8,
    pub magnetometer: u8,
}

impl CalibrationStatus {
    pub fn from_register(value: u8) -> Self {
        Self {
            magnetometer: value & 0x03,
            accelerometer: (value >> 2) & 0x03,
            gyroscope: (value >> 4) & 0x03,
            system: (value >> 6) & 0x03,
        }
    }

    pub fn is_fully_calibrated(&self) -> bool {
        self.system == 3 && self.gyroscope == 3 && self.accelerometer == 3 && self.magnetometer == 3
    }
}

/// Power-on self-test result, `true` meaning passed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SelfTestResult {
    pub accelerometer: bool,
    pub magnetometer: bool,
    pub gyroscope: bool,
    pub mcu: bool,
}

impl SelfTestResult {
    pub fn from_register(value: u8) -> Self {
        Self {
            accelerometer: value & (1 << 0) != 0,
            magnetometer: value & (1 << 1) != 0,
            gyroscope: value & (1 << 2) != 0,
            mcu: value & (1 << 3) != 0,
        }
    }

    pub fn all_passed(&self) -> bool {
        self.accelerometer && self.magnetometer && self.gyroscope && self.mcu
    }
}

/// SYS_STATUS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemStatus {
    Idle,
    SystemError,
    InitializingPeripherals,
    SystemInitialization,
    ExecutingSelfTest,
    FusionRunning,
    RunningWithoutFusion,
    Unknown(u8),
}

impl SystemStatus {
    pub fn from_register(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::SystemError,
            2 => Self::InitializingPeripherals,
            3 => Self::SystemInitialization,
            4 => Self::ExecutingSelfTest,
            5 => Self::FusionRunning,
            6 => Self::RunningWithoutFusion,
            other => Self::Unknown(other),
        }
    }
}

/// SYS_ERR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemError {
    NoError,
    PeripheralInit,
    SystemInit,
    SelfTestFailed,
    RegisterValueOutOfRange,
    RegisterAddressOutOfRange,
    RegisterWrite,
    LowPowerModeUnavailable,
    AccelPowerModeUnavailable,
    FusionConfig,
    SensorConfig,
    Unknown(u8),
}

impl SystemError {
    pub fn from_register(value: u8) -> Self {
        match value {
            0x00 => Self::NoError,
            0x01 => Self::PeripheralInit,
            0x02 => Self::SystemInit,
            0x03 => Self::SelfTestFailed,
            0x04 => Self::RegisterValueOutOfRange,
            0x05 => Self::RegisterAddressOutOfRange,
            0x06 => Self::RegisterWrite,
            0x07 => Self::LowPowerModeUnavailable,
            0x08 => Self::AccelPowerModeUnavailable,
            0x09 => Self::FusionConfig,
            0x0A => Self::SensorConfig,
            other => Self::Unknown(other),
        }
    }
}

/// Raw three-axis sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawVector3 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawVector3 {
    pub fn from_le_bytes(bytes: &[u8; 6]) -> Self {
        Self {
            x: i16::from_le_bytes([bytes[0], bytes[1]]),
            y: i16::from_le_bytes([bytes[2], bytes[3]]),
            z: i16::from_le_bytes([bytes[4], bytes[5]]),
        }
    }

    pub fn to_le_bytes(self) -> [u8; 6] {
        let [x0, x1] = self.x.to_le_bytes();
        let [y0, y1] = self.y.to_le_bytes();
        let [z0, z1] = self.z.to_le_bytes();
        [x0, x1, y0, y1, z0, z1]
    }

    pub fn scaled(self, lsb_per_unit: f32) -> Vector3 {
        Vector3 {
            x: self.x as f32 / lsb_per_unit,
            y: self.y as f32 / lsb_per_unit,
            z: self.z as f32 / lsb_per_unit,
        }
    }
}

/// Scaled three-axis sample
///
/// For Euler angles the components are heading, roll, pitch.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Sensor offsets; same layout as [`RawVector3`]
pub type Offsets = RawVector3;

/// Complete calibration block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationProfile {
    pub accel_offset: [i16; 3],
    pub mag_offset: [i16; 3],
    pub gyro_offset: [i16; 3],
    pub accel_radius: i16,
    pub mag_radius: i16,
}

impl CalibrationProfile {
    /// Decode the 22-byte block starting at ACC_OFFSET
    pub fn from_le_bytes(bytes: &[u8; 22]) -> Self {
        let word = |i: usize| i16::from_le_bytes([bytes[2 * i], bytes[2 * i + 1]]);
        Self {
            accel_offset: [word(0), word(1), word(2)],
            mag_offset: [word(3), word(4), word(5)],
            gyro_offset: [word(6), word(7), word(8)],
            accel_radius: word(9),
            mag_radius: word(10),
        }
    }

    pub fn to_le_bytes(&self) -> [u8; 22] {
        let words = [
            self.accel_offset[0],
            self.accel_offset[1],
            self.accel_offset[2],
            self.mag_offset[0],
            self.mag_offset[1],
            self.mag_offset[2],
            self.gyro_offset[0],
            self.gyro_offset[1],
            self.gyro_offset[2],
            self.accel_radius,
            self.mag_radius,
        ];
        let mut bytes = [0u8; 22];
        for (chunk, word) in bytes.chunks_exact_mut(2).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }
}
