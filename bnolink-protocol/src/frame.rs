//! Command frame composition.
//!
//! Frame format:
//! - START (1 byte): 0xAA
//! - OP (1 byte): 0x00 write, 0x01 read
//! - REGISTER (1 byte): register address on the active page
//! - LENGTH (1 byte): number of bytes to read or write (1-255)
//! - PAYLOAD (LENGTH bytes): write data only

use heapless::Vec;

/// Frame start byte
pub const START_BYTE: u8 = 0xAA;

/// Write opcode
pub const OP_WRITE: u8 = 0x00;

/// Read opcode
pub const OP_READ: u8 = 0x01;

/// Command header size (START + OP + REGISTER + LENGTH)
pub const HEADER_SIZE: usize = 4;

/// Response header size
pub const RESPONSE_HEADER_SIZE: usize = 2;

/// Largest length the one-byte LENGTH field can carry
pub const MAX_LENGTH: usize = u8::MAX as usize;

/// Largest complete command frame
pub const MAX_COMMAND_SIZE: usize = HEADER_SIZE + MAX_LENGTH;

/// Errors that can occur while composing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Length is zero
    InvalidLength,
    /// Length does not fit the LENGTH field
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A register command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Read `length` bytes starting at `register`
    Read { register: u8, length: u8 },
    /// Write `payload` starting at `register`
    Write { register: u8, payload: &'a [u8] },
}

impl<'a> Command<'a> {
    /// Read command for `length` bytes
    pub fn read(register: u8, length: usize) -> Result<Self, FrameError> {
        Ok(Command::Read {
            register,
            length: checked_length(length)?,
        })
    }

    /// Write command carrying `payload`
    pub fn write(register: u8, payload: &'a [u8]) -> Result<Self, FrameError> {
        checked_length(payload.len())?;
        Ok(Command::Write { register, payload })
    }

    /// Encoded size of this command
    pub fn encoded_len(&self) -> usize {
        match self {
            Command::Read { .. } => HEADER_SIZE,
            Command::Write { payload, .. } => HEADER_SIZE + payload.len(),
        }
    }

    /// Number of response bytes the sensor sends back
    pub fn response_len(&self) -> usize {
        match self {
            Command::Read { length, .. } => RESPONSE_HEADER_SIZE + *length as usize,
            Command::Write { .. } => RESPONSE_HEADER_SIZE,
        }
    }

    /// Encode this command into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = START_BYTE;
        match *self {
            Command::Read { register, length } => {
                buffer[1] = OP_READ;
                buffer[2] = register;
                buffer[3] = length;
            }
            Command::Write { register, payload } => {
                buffer[1] = OP_WRITE;
                buffer[2] = register;
                buffer[3] = payload.len() as u8;
                buffer[HEADER_SIZE..frame_len].copy_from_slice(payload);
            }
        }

        Ok(frame_len)
    }

    /// Encode this command into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_COMMAND_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_COMMAND_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

fn checked_length(length: usize) -> Result<u8, FrameError> {
    match length {
        0 => Err(FrameError::InvalidLength),
        n if n > MAX_LENGTH => Err(FrameError::PayloadTooLarge),
        n => Ok(n as u8),
    }
}
