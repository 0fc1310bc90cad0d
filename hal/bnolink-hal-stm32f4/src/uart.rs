//! USART register access for STM32F4
//!
//! The F4 USART has a single status register (SR) whose RXNE and error
//! flags clear on the SR-then-DR read sequence, and a TC flag that clears
//! by writing zero to it.

use bnolink_hal::{DataBits, LineStatus, Parity, StopBits, UartConfig, UsartInterrupt, UsartRegisters};
use embassy_stm32::pac::usart::{regs, Usart};
use embassy_stm32::usart::{self, ConfigError};

/// USART register block handed to the transport after bring-up
pub struct Stm32Usart {
    regs: Usart,
}

impl Stm32Usart {
    /// Wrap an already configured USART
    ///
    /// Baud rate, frame format and pins must have been set up beforehand;
    /// this type only touches SR, DR and the CR1 interrupt enables.
    pub fn new(regs: Usart) -> Self {
        Self { regs }
    }

    /// USART2, present on every supported chip
    pub fn usart2() -> Self {
        Self::new(embassy_stm32::pac::USART2)
    }
}

impl UsartRegisters for Stm32Usart {
    fn status(&self) -> LineStatus {
        let sr = self.regs.sr().read();
        LineStatus {
            tx_empty: sr.txe(),
            tx_complete: sr.tc(),
            rx_not_empty: sr.rxne(),
            overrun: sr.ore(),
            framing: sr.fe(),
            noise: sr.ne(),
            parity: sr.pe(),
        }
    }

    fn read_data(&mut self) -> u8 {
        self.regs.dr().read().dr() as u8
    }

    fn write_data(&mut self, byte: u8) {
        self.regs.dr().write(|w| w.set_dr(byte as u16));
    }

    fn enable_interrupt(&mut self, irq: UsartInterrupt) {
        set_interrupt(&self.regs, irq, true);
    }

    fn disable_interrupt(&mut self, irq: UsartInterrupt) {
        set_interrupt(&self.regs, irq, false);
    }

    fn is_interrupt_enabled(&self, irq: UsartInterrupt) -> bool {
        let cr1 = self.regs.cr1().read();
        match irq {
            UsartInterrupt::TxEmpty => cr1.txeie(),
            UsartInterrupt::TxComplete => cr1.tcie(),
            UsartInterrupt::RxNotEmpty => cr1.rxneie(),
        }
    }

    fn clear_transmit_complete(&mut self) {
        // rc_w0: writing one leaves a flag untouched
        let mut sr = regs::Sr(!0);
        sr.set_tc(false);
        self.regs.sr().write_value(sr);
    }
}

fn set_interrupt(regs: &Usart, irq: UsartInterrupt, enabled: bool) {
    regs.cr1().modify(|w| match irq {
        UsartInterrupt::TxEmpty => w.set_txeie(enabled),
        UsartInterrupt::TxComplete => w.set_tcie(enabled),
        UsartInterrupt::RxNotEmpty => w.set_rxneie(enabled),
    });
}

/// embassy-stm32 USART configuration matching `config`
pub fn line_config(config: &UartConfig) -> usart::Config {
    let mut line = usart::Config::default();
    line.baudrate = config.baudrate;
    line.data_bits = match config.data_bits {
        DataBits::Eight => usart::DataBits::DataBits8,
        DataBits::Nine => usart::DataBits::DataBits9,
    };
    line.parity = match config.parity {
        Parity::None => usart::Parity::ParityNone,
        Parity::Even => usart::Parity::ParityEven,
        Parity::Odd => usart::Parity::ParityOdd,
    };
    line.stop_bits = match config.stop_bits {
        StopBits::Half => usart::StopBits::STOP0P5,
        StopBits::One => usart::StopBits::STOP1,
        StopBits::Two => usart::StopBits::STOP2,
    };
    line
}

/// Error from USART bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartSetupError {
    /// Baud rate below what the kernel clock can divide down to
    BaudrateTooLow,
    /// Baud rate above the kernel clock
    BaudrateTooHigh,
    /// Frame format the peripheral cannot produce
    Unsupported,
}

impl From<ConfigError> for UartSetupError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::BaudrateTooLow => UartSetupError::BaudrateTooLow,
            ConfigError::BaudrateTooHigh => UartSetupError::BaudrateTooHigh,
            _ => UartSetupError::Unsupported,
        }
    }
}
