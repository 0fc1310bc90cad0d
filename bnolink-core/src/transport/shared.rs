//! Interrupt-safe port cell
//!
//! The USART interrupt and foreground code both need the same [`Port`].
//! A `SharedPort` lives in a `static`, is filled once at bring-up, and every
//! access from either side runs inside a short critical section.

use core::cell::RefCell;

use bnolink_hal::{UartConfig, UsartRegisters};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use super::{Port, RxOutcome, SerialLink, TransportError};

/// A [`Port`] shared between foreground code and its interrupt handler
pub struct SharedPort<U> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Option<Port<U>>>>,
}

impl<U> SharedPort<U> {
    /// Empty cell, suitable for `static` initialisation
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }
}

impl<U> Default for SharedPort<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: UsartRegisters> SharedPort<U> {
    /// Install a brought-up port, returning any port it replaces
    pub fn install(&self, port: Port<U>) -> Option<Port<U>> {
        self.inner.lock(|cell| cell.borrow_mut().replace(port))
    }

    /// Remove the port and release its registers
    pub fn teardown(&self) -> Option<U> {
        self.inner
            .lock(|cell| cell.borrow_mut().take())
            .map(Port::teardown)
    }

    pub fn is_installed(&self) -> bool {
        self.inner.lock(|cell| cell.borrow().is_some())
    }

    /// Run `f` against the installed port
    ///
    /// Fails with [`TransportError::InvalidParam`] when no port is installed.
    pub fn with<R>(&self, f: impl FnOnce(&mut Port<U>) -> R) -> Result<R, TransportError> {
        self.inner.lock(|cell| {
            cell.borrow_mut()
                .as_mut()
                .map(f)
                .ok_or(TransportError::InvalidParam)
        })
    }

    /// Entry point for the USART interrupt
    pub fn on_interrupt(&self) {
        let _ = self.with(Port::on_interrupt);
    }
}

impl<U: UsartRegisters> SerialLink for &SharedPort<U> {
    fn config(&self) -> Result<UartConfig, TransportError> {
        self.with(|port| *Port::config(port))
    }

    fn begin_transmit(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.with(|port| port.begin_transmit(bytes))?
    }

    fn is_transmit_busy(&self) -> bool {
        self.with(|port| port.is_transmit_busy()).unwrap_or(false)
    }

    fn begin_receive(&mut self, len: usize) -> Result<(), TransportError> {
        self.with(|port| port.begin_receive(len))?
    }

    fn is_receive_busy(&self) -> bool {
        self.with(|port| port.is_receive_busy()).unwrap_or(false)
    }

    fn abort_receive(&mut self) {
        let _ = self.with(|port| port.abort_receive());
    }

    fn take_received(&mut self, dest: &mut [u8]) -> Option<RxOutcome> {
        self.with(|port| port.take_received(dest)).ok().flatten()
    }
}
