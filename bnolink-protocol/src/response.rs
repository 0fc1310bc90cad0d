//! Response classification.
//!
//! Successful reads answer `[0xBB, LENGTH, DATA...]` and successful writes
//! answer `[0xEE, 0x01]`. Any other response starting with `0xEE` carries an
//! error status in byte 1.

/// First byte of a status response
pub const ERROR_SENTINEL: u8 = 0xEE;

/// First byte of a successful read response
pub const READ_SUCCESS: u8 = 0xBB;

/// Status code carried in byte 1 of a `0xEE` response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResponseStatus {
    WriteSuccess,
    ReadFail,
    WriteFail,
    RegmapInvalidAddress,
    RegmapWriteDisabled,
    WrongStartByte,
    BusOverRunError,
    MaxLengthError,
    MinLengthError,
    ReceiveCharacterTimeout,
    /// Code not documented for this sensor
    Unknown(u8),
}

impl ResponseStatus {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x01 => ResponseStatus::WriteSuccess,
            0x02 => ResponseStatus::ReadFail,
            0x03 => ResponseStatus::WriteFail,
            0x04 => ResponseStatus::RegmapInvalidAddress,
            0x05 => ResponseStatus::RegmapWriteDisabled,
            0x06 => ResponseStatus::WrongStartByte,
            0x07 => ResponseStatus::BusOverRunError,
            0x08 => ResponseStatus::MaxLengthError,
            0x09 => ResponseStatus::MinLengthError,
            0x0A => ResponseStatus::ReceiveCharacterTimeout,
            other => ResponseStatus::Unknown(other),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            ResponseStatus::WriteSuccess => 0x01,
            ResponseStatus::ReadFail => 0x02,
            ResponseStatus::WriteFail => 0x03,
            ResponseStatus::RegmapInvalidAddress => 0x04,
            ResponseStatus::RegmapWriteDisabled => 0x05,
            ResponseStatus::WrongStartByte => 0x06,
            ResponseStatus::BusOverRunError => 0x07,
            ResponseStatus::MaxLengthError => 0x08,
            ResponseStatus::MinLengthError => 0x09,
            ResponseStatus::ReceiveCharacterTimeout => 0x0A,
            ResponseStatus::Unknown(other) => other,
        }
    }
}

/// Device error reported in a read response, if any
///
/// Only the sentinel is checked; the rest of the buffer is undefined when it
/// is present.
pub fn read_error(response: &[u8]) -> Option<ResponseStatus> {
    match response {
        [ERROR_SENTINEL, code, ..] => Some(ResponseStatus::from_byte(*code)),
        [ERROR_SENTINEL] => Some(ResponseStatus::Unknown(0)),
        _ => None,
    }
}

/// Device error reported in a write acknowledgement, if any
///
/// `[0xEE, 0x01]` is the acknowledgement itself and is not an error. Any
/// other first byte is accepted as well; only `0xEE` with a status other
/// than 0x01 fails.
pub fn write_error(response: &[u8]) -> Option<ResponseStatus> {
    match response {
        [ERROR_SENTINEL, code, ..] if *code != 0x01 => Some(ResponseStatus::from_byte(*code)),
        _ => None,
    }
}
