//! USART abstractions
//!
//! The transport engine drives the peripheral one byte at a time from its
//! interrupt handler, so the abstraction here is the register level rather
//! than a blocking read/write stream: a status snapshot, the data register,
//! and the three interrupt enables the engine toggles.

/// Byte-level access to a USART peripheral
///
/// Implementations must not buffer. `status()` followed by `read_data()` is
/// the hardware sequence that clears the receive error flags, so the two
/// calls must map directly onto the status and data registers.
pub trait UsartRegisters {
    /// Snapshot of the status register
    fn status(&self) -> LineStatus;

    /// Read the data register
    fn read_data(&mut self) -> u8;

    /// Write the data register
    fn write_data(&mut self, byte: u8);

    /// Enable one interrupt source
    fn enable_interrupt(&mut self, irq: UsartInterrupt);

    /// Disable one interrupt source
    fn disable_interrupt(&mut self, irq: UsartInterrupt);

    /// Whether an interrupt source is currently enabled
    fn is_interrupt_enabled(&self, irq: UsartInterrupt) -> bool;

    /// Clear the transmission-complete flag
    fn clear_transmit_complete(&mut self);
}

/// Interrupt sources used by the transport engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsartInterrupt {
    /// Transmit data register empty (TXE)
    TxEmpty,
    /// Transmission complete (TC)
    TxComplete,
    /// Receive data register not empty (RXNE)
    RxNotEmpty,
}

impl UsartInterrupt {
    /// All interrupt sources, in the order they are torn down
    pub const ALL: [UsartInterrupt; 3] = [
        UsartInterrupt::TxEmpty,
        UsartInterrupt::TxComplete,
        UsartInterrupt::RxNotEmpty,
    ];
}

/// Decoded USART status register
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineStatus {
    /// Transmit data register empty
    pub tx_empty: bool,
    /// Transmission complete
    pub tx_complete: bool,
    /// Received byte waiting in the data register
    pub rx_not_empty: bool,
    /// Overrun error
    pub overrun: bool,
    /// Framing error
    pub framing: bool,
    /// Noise detected
    pub noise: bool,
    /// Parity error
    pub parity: bool,
}

impl LineStatus {
    /// Any receive error flag set
    pub fn has_error(&self) -> bool {
        self.overrun || self.framing || self.noise || self.parity
    }
}

/// UART line configuration
///
/// Applied by the peripheral bring-up layer. The transport engine only
/// reads it back to size its timeouts.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Word length
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
    /// NVIC priority of the port interrupt
    pub irq_priority: u8,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            irq_priority: 1,
        }
    }
}

/// Word length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataBits {
    Eight,
    Nine,
}

impl DataBits {
    /// Bits beyond the base eight
    pub fn extension_bits(self) -> f32 {
        match self {
            DataBits::Eight => 0.0,
            DataBits::Nine => 1.0,
        }
    }
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parity {
    None,
    Even,
    Odd,
}

impl Parity {
    /// Parity bits per character
    pub fn bits(self) -> f32 {
        match self {
            Parity::None => 0.0,
            Parity::Even | Parity::Odd => 1.0,
        }
    }
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopBits {
    Half,
    One,
    Two,
}

impl StopBits {
    /// Stop bit duration in bit times
    pub fn bits(self) -> f32 {
        match self {
            StopBits::Half => 0.5,
            StopBits::One => 1.0,
            StopBits::Two => 2.0,
        }
    }
}
