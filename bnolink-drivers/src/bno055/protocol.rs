//! Register transactions with retry

use bnolink_core::timeout::{compute_timeout_ms, is_expired};
use bnolink_core::{RxOutcome, SerialLink};
use bnolink_hal::TickSource;
use bnolink_protocol::frame::RESPONSE_HEADER_SIZE;
use bnolink_protocol::{read_error, write_error, Command, ResponseStatus, MAX_LENGTH};
use embedded_hal::delay::DelayNs;

use super::{Bno055, Error, Result};

/// Decides whether a received response carries a device error
type Classify = fn(&[u8]) -> Option<ResponseStatus>;

impl<L, C, D> Bno055<L, C, D>
where
    L: SerialLink,
    C: TickSource,
    D: DelayNs,
{
    /// Read `out.len()` consecutive registers starting at `register`
    pub fn read_register(&mut self, register: u8, out: &mut [u8]) -> Result<()> {
        let command = Command::read(register, out.len())?;
        let mut buffer = [0u8; RESPONSE_HEADER_SIZE + MAX_LENGTH];
        let response = &mut buffer[..command.response_len()];

        self.transact(&command, response, read_error)?;
        out.copy_from_slice(&response[RESPONSE_HEADER_SIZE..]);
        trace!("bno055 read {=u8:#x} len {}", register, out.len());
        Ok(())
    }

    /// Write `payload` to consecutive registers starting at `register`
    pub fn write_register(&mut self, register: u8, payload: &[u8]) -> Result<()> {
        let command = Command::write(register, payload)?;
        let mut response = [0u8; RESPONSE_HEADER_SIZE];

        self.transact(&command, &mut response, write_error)?;
        trace!("bno055 write {=u8:#x} len {}", register, payload.len());
        Ok(())
    }

    pub(crate) fn read_byte(&mut self, register: u8) -> Result<u8> {
        let mut value = [0u8; 1];
        self.read_register(register, &mut value)?;
        Ok(value[0])
    }

    pub(crate) fn write_byte(&mut self, register: u8, value: u8) -> Result<()> {
        self.write_register(register, &[value])
    }

    /// Read-modify-write of the bits under `mask`
    ///
    /// `bits` must already be shifted into position.
    pub(crate) fn update_bits(&mut self, register: u8, mask: u8, bits: u8) -> Result<()> {
        let current = self.read_byte(register)?;
        self.write_byte(register, (current & !mask) | (bits & mask))
    }

    fn transact(&mut self, command: &Command<'_>, response: &mut [u8], classify: Classify) -> Result<()> {
        let frame = command.encode_to_vec()?;
        let expected = response.len();
        let mut attempt: u8 = 0;

        loop {
            let settle_ms = if attempt == 0 {
                self.config.initial_delay_ms
            } else {
                self.delay.delay_ms(self.config.retry_backoff_ms);
                self.config.retry_delay_ms
            };

            let outcome = self.attempt(&frame, response, settle_ms)?;
            let received = match outcome {
                RxOutcome::Complete => expected,
                RxOutcome::Partial { received } | RxOutcome::TimedOut { received } => received,
            };

            // An error reply is shorter than a read reply, so check the
            // sentinel before completeness.
            let error = if let Some(status) = classify(&response[..received]) {
                Error::Device(status)
            } else if !outcome.is_complete() {
                Error::Incomplete { received, expected }
            } else {
                return Ok(());
            };

            if attempt >= self.config.max_retries {
                warn!("bno055 transfer failed after {} attempts: {}", attempt + 1, error);
                return Err(error);
            }
            attempt += 1;
            self.retries_taken = self.retries_taken.wrapping_add(1);
            debug!("bno055 retry {}: {}", attempt, error);
        }
    }

    fn attempt(&mut self, frame: &[u8], response: &mut [u8], settle_ms: u32) -> Result<RxOutcome> {
        response.fill(0);

        self.link.begin_transmit(frame)?;
        while self.link.is_transmit_busy() {
            core::hint::spin_loop();
        }

        self.link.begin_receive(response.len())?;
        self.delay.delay_ms(settle_ms);

        let line = self.link.config()?;
        let timeout_ms = compute_timeout_ms(&line, response.len(), self.config.rx_timeout_margin)?;
        let start = self.clock.now_ms();
        while self.link.is_receive_busy() {
            if is_expired(self.clock.elapsed_since(start), timeout_ms) {
                self.link.abort_receive();
                break;
            }
            core::hint::spin_loop();
        }

        Ok(self
            .link
            .take_received(response)
            .unwrap_or(RxOutcome::TimedOut { received: 0 }))
    }
}
