//! BNO055 register map

// Page 0

/// Chip identification, reads [`CHIP_ID_VALUE`]
pub const CHIP_ID: u8 = 0x00;
/// Active register page (present on both pages)
pub const PAGE_ID: u8 = 0x07;

/// Accelerometer data, X/Y/Z little-endian i16
pub const ACC_DATA: u8 = 0x08;
/// Magnetometer data
pub const MAG_DATA: u8 = 0x0E;
/// Gyroscope data
pub const GYR_DATA: u8 = 0x14;
/// Euler angles: heading, roll, pitch
pub const EUL_DATA: u8 = 0x1A;
/// Quaternion: W, X, Y, Z
pub const QUA_DATA: u8 = 0x20;
/// Linear acceleration
pub const LIA_DATA: u8 = 0x28;
/// Gravity vector
pub const GRV_DATA: u8 = 0x2E;
/// Temperature, signed byte
pub const TEMP: u8 = 0x34;

pub const CALIB_STAT: u8 = 0x35;
/// Power-on self-test result
pub const ST_RESULT: u8 = 0x36;
pub const SYS_STATUS: u8 = 0x39;
pub const SYS_ERR: u8 = 0x3A;
pub const UNIT_SEL: u8 = 0x3B;
pub const OPR_MODE: u8 = 0x3D;
pub const PWR_MODE: u8 = 0x3E;
pub const SYS_TRIGGER: u8 = 0x3F;
pub const AXIS_MAP_CONFIG: u8 = 0x41;
pub const AXIS_MAP_SIGN: u8 = 0x42;

/// Start of the calibration block: offsets then radii
pub const ACC_OFFSET: u8 = 0x55;
pub const MAG_OFFSET: u8 = 0x5B;
pub const GYR_OFFSET: u8 = 0x61;
pub const ACC_RADIUS: u8 = 0x67;
pub const MAG_RADIUS: u8 = 0x69;

// Page 1

pub const ACC_CONFIG: u8 = 0x08;
pub const MAG_CONFIG: u8 = 0x09;
pub const GYR_CONFIG_0: u8 = 0x0A;
pub const GYR_CONFIG_1: u8 = 0x0B;

/// Value of [`CHIP_ID`] on a BNO055
pub const CHIP_ID_VALUE: u8 = 0xA0;

pub const OPR_MODE_MASK: u8 = 0x0F;
pub const PWR_MODE_MASK: u8 = 0x03;

/// SYS_TRIGGER: start built-in self-test
pub const SYS_TRIGGER_SELF_TEST: u8 = 1 << 0;

/// UNIT_SEL bit positions
pub const UNIT_SEL_ACC_POS: u8 = 0;
pub const UNIT_SEL_GYR_POS: u8 = 1;
pub const UNIT_SEL_EUL_POS: u8 = 2;
pub const UNIT_SEL_TEMP_POS: u8 = 4;
pub const UNIT_SEL_ORI_POS: u8 = 7;

/// Vector outputs are three i16 axes
pub const VECTOR_LENGTH: usize = 6;
pub const QUATERNION_LENGTH: usize = 8;
/// Offsets for three sensors plus two radii
pub const CALIBRATION_LENGTH: usize = 22;
