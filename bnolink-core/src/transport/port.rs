//! Per-port transfer state and interrupt handler

use bnolink_hal::{TickSource, UartConfig, UsartInterrupt, UsartRegisters};
use heapless::Vec;

use super::{LinkStatus, RxOutcome, SerialLink, TransportError};
use crate::timeout::{compute_timeout_ms, is_expired, BLOCKING_TIMEOUT_MARGIN};

/// Transmit buffer capacity in bytes
pub const TX_BUFFER_SIZE: usize = 512;

/// Receive buffer capacity in bytes
pub const RX_BUFFER_SIZE: usize = 512;

/// Transfer state shared between foreground calls and the interrupt handler
#[derive(Debug, Clone, Default)]
pub struct PortState {
    tx_buffer: Vec<u8, TX_BUFFER_SIZE>,
    tx_index: usize,
    tx_status: LinkStatus,
    rx_buffer: Vec<u8, RX_BUFFER_SIZE>,
    rx_length: usize,
    rx_status: LinkStatus,
    rx_outcome: Option<RxOutcome>,
}

impl PortState {
    pub fn tx_status(&self) -> LinkStatus {
        self.tx_status
    }

    pub fn rx_status(&self) -> LinkStatus {
        self.rx_status
    }

    /// Bytes of the current transmit already handed to the data register
    pub fn tx_sent(&self) -> usize {
        self.tx_index
    }

    /// Bytes of the current receive stored so far
    pub fn rx_received(&self) -> usize {
        self.rx_buffer.len()
    }

    /// Target length of the current receive
    pub fn rx_length(&self) -> usize {
        self.rx_length
    }
}

/// A USART port owned by the transport engine
pub struct Port<U> {
    regs: U,
    config: UartConfig,
    state: PortState,
}

impl<U: UsartRegisters> Port<U> {
    /// Take over a brought-up USART
    ///
    /// All transport interrupts start disabled.
    pub fn new(mut regs: U, config: UartConfig) -> Self {
        for irq in UsartInterrupt::ALL {
            regs.disable_interrupt(irq);
        }
        Self {
            regs,
            config,
            state: PortState::default(),
        }
    }

    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    pub fn state(&self) -> &PortState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn regs_mut(&mut self) -> &mut U {
        &mut self.regs
    }

    /// Disable the transport interrupts and hand the registers back
    pub fn teardown(mut self) -> U {
        for irq in UsartInterrupt::ALL {
            self.regs.disable_interrupt(irq);
        }
        self.regs
    }

    /// Start an interrupt-driven transmit
    pub fn begin_transmit(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if bytes.is_empty() || bytes.len() > TX_BUFFER_SIZE {
            return Err(TransportError::InvalidParam);
        }
        if self.state.tx_status == LinkStatus::Busy {
            return Err(TransportError::Busy);
        }

        self.state.tx_buffer.clear();
        self.state
            .tx_buffer
            .extend_from_slice(bytes)
            .map_err(|_| TransportError::InvalidParam)?;
        self.state.tx_index = 0;
        self.state.tx_status = LinkStatus::Busy;
        self.regs.enable_interrupt(UsartInterrupt::TxEmpty);
        Ok(())
    }

    /// Arm an interrupt-driven receive of `len` bytes
    ///
    /// Clears any outcome left over from the previous receive and discards a
    /// byte that latched while no receive was armed.
    pub fn begin_receive(&mut self, len: usize) -> Result<(), TransportError> {
        if len == 0 || len > RX_BUFFER_SIZE {
            return Err(TransportError::InvalidParam);
        }
        if self.state.rx_status == LinkStatus::Busy {
            return Err(TransportError::Busy);
        }

        // Status then data, which also clears a pending overrun
        if self.regs.status().rx_not_empty {
            let _ = self.regs.read_data();
        }

        self.state.rx_buffer.clear();
        self.state.rx_length = len;
        self.state.rx_outcome = None;
        self.state.rx_status = LinkStatus::Busy;
        self.regs.enable_interrupt(UsartInterrupt::RxNotEmpty);
        Ok(())
    }

    /// Force the receive side back to idle
    ///
    /// An in-flight receive ends as [`RxOutcome::TimedOut`]; the bytes it
    /// collected stay available but are not a coherent response.
    pub fn abort_receive(&mut self) {
        self.regs.disable_interrupt(UsartInterrupt::RxNotEmpty);
        if self.state.rx_status == LinkStatus::Busy {
            self.state.rx_outcome = Some(RxOutcome::TimedOut {
                received: self.state.rx_buffer.len(),
            });
        }
        self.state.rx_status = LinkStatus::Idle;
    }

    pub fn take_received(&mut self, dest: &mut [u8]) -> Option<RxOutcome> {
        if self.state.rx_status == LinkStatus::Busy {
            return None;
        }
        let outcome = self.state.rx_outcome.take()?;
        let n = dest.len().min(self.state.rx_buffer.len());
        dest[..n].copy_from_slice(&self.state.rx_buffer[..n]);
        Some(outcome)
    }

    /// Polled transmit that bypasses the interrupt path
    ///
    /// Bounded by the line timeout at [`BLOCKING_TIMEOUT_MARGIN`]. Refused
    /// while an interrupt-driven transmit is in flight.
    pub fn write_blocking<T: TickSource>(
        &mut self,
        bytes: &[u8],
        tick: &T,
    ) -> Result<(), TransportError> {
        if bytes.is_empty() || bytes.len() > TX_BUFFER_SIZE {
            return Err(TransportError::InvalidParam);
        }
        if self.state.tx_status == LinkStatus::Busy {
            return Err(TransportError::Busy);
        }

        let timeout_ms = compute_timeout_ms(&self.config, bytes.len(), BLOCKING_TIMEOUT_MARGIN)?;
        let start = tick.now_ms();

        for &byte in bytes {
            while !self.regs.status().tx_empty {
                if is_expired(tick.elapsed_since(start), timeout_ms) {
                    return Err(TransportError::Timeout);
                }
            }
            self.regs.write_data(byte);
        }

        while !self.regs.status().tx_complete {
            if is_expired(tick.elapsed_since(start), timeout_ms) {
                return Err(TransportError::Timeout);
            }
        }
        Ok(())
    }

    /// USART interrupt handler body
    ///
    /// Each source is serviced only while its interrupt is enabled, and the
    /// status register is re-read per source since servicing one source
    /// changes the flags of the next.
    pub fn on_interrupt(&mut self) {
        if self.regs.is_interrupt_enabled(UsartInterrupt::TxEmpty) && self.regs.status().tx_empty {
            self.on_tx_empty();
        }

        if self.regs.is_interrupt_enabled(UsartInterrupt::RxNotEmpty)
            && self.regs.status().rx_not_empty
        {
            self.on_rx_not_empty();
        }

        if self.regs.is_interrupt_enabled(UsartInterrupt::TxComplete)
            && self.regs.status().tx_complete
        {
            self.regs.disable_interrupt(UsartInterrupt::TxComplete);
            self.regs.clear_transmit_complete();
            self.state.tx_status = LinkStatus::Idle;
        }
    }

    fn on_tx_empty(&mut self) {
        if let Some(&byte) = self.state.tx_buffer.get(self.state.tx_index) {
            self.regs.write_data(byte);
            self.state.tx_index += 1;
        }

        if self.state.tx_index >= self.state.tx_buffer.len() {
            self.regs.disable_interrupt(UsartInterrupt::TxEmpty);
            self.regs.enable_interrupt(UsartInterrupt::TxComplete);
        }
    }

    fn on_rx_not_empty(&mut self) {
        // Status then data, so the error flags belong to this byte
        let status = self.regs.status();
        let byte = self.regs.read_data();

        if self.state.rx_status != LinkStatus::Busy {
            self.regs.disable_interrupt(UsartInterrupt::RxNotEmpty);
            return;
        }

        if status.has_error() {
            self.regs.disable_interrupt(UsartInterrupt::RxNotEmpty);
            self.state.rx_status = LinkStatus::Idle;
            self.state.rx_outcome = Some(RxOutcome::Partial {
                received: self.state.rx_buffer.len(),
            });
            return;
        }

        // Cannot overflow: rx_length is capped at capacity and we stop there
        let _ = self.state.rx_buffer.push(byte);

        if self.state.rx_buffer.len() >= self.state.rx_length {
            self.regs.disable_interrupt(UsartInterrupt::RxNotEmpty);
            self.state.rx_status = LinkStatus::Idle;
            self.state.rx_outcome = Some(RxOutcome::Complete);
        }
    }
}

impl<U: UsartRegisters> SerialLink for Port<U> {
    fn config(&self) -> Result<UartConfig, TransportError> {
        Ok(self.config)
    }

    fn begin_transmit(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        Port::begin_transmit(self, bytes)
    }

    fn is_transmit_busy(&self) -> bool {
        self.state.tx_status == LinkStatus::Busy
    }

    fn begin_receive(&mut self, len: usize) -> Result<(), TransportError> {
        Port::begin_receive(self, len)
    }

    fn is_receive_busy(&self) -> bool {
        self.state.rx_status == LinkStatus::Busy
    }

    fn abort_receive(&mut self) {
        Port::abort_receive(self)
    }

    fn take_received(&mut self, dest: &mut [u8]) -> Option<RxOutcome> {
        Port::take_received(self, dest)
    }
}
