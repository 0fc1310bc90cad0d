//! bnolink Firmware
//!
//! Orientation logger for an STM32F411 "blackpill" with a BNO055 wired in
//! UART mode (PS1 high) to USART2. Streams Euler angles and the quaternion
//! over defmt-rtt.
//!
//! # Wiring
//!
//! ```text
//!  STM32F411          BNO055
//!  PA2 (USART2 TX) ──► RX (SCL)
//!  PA3 (USART2 RX) ◄── TX (SDA)
//! ```

#![no_std]
#![no_main]

use bnolink_core::{Port, SharedPort};
use bnolink_drivers::bno055::{Bno055, DeviceConfig};
use bnolink_hal_stm32f4::{line_config, EmbassyTick, Stm32Usart, UartSetupError};
use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_stm32::usart::Uart;
use embassy_time::{Delay, Duration, Ticker, Timer};
use {defmt_rtt as _, panic_probe as _};

/// Board configuration
mod board {
    use bnolink_drivers::bno055::{OperatingMode, PowerMode};
    use bnolink_hal::{DataBits, Parity, StopBits, UartConfig};

    /// BNO055 UART interface runs at a fixed 115200 8N1
    pub const SENSOR_UART: UartConfig = UartConfig {
        baudrate: 115_200,
        data_bits: DataBits::Eight,
        parity: Parity::None,
        stop_bits: StopBits::One,
        irq_priority: 1,
    };

    pub const POWER_MODE: PowerMode = PowerMode::Normal;
    pub const OPERATING_MODE: OperatingMode = OperatingMode::Ndof;

    /// Power-on to configurable, from the BNO055 datasheet
    pub const BOOT_DELAY_MS: u64 = 650;

    pub const SAMPLE_PERIOD_MS: u64 = 100;
}

/// Sensor port shared with the USART2 interrupt
static SENSOR_PORT: SharedPort<Stm32Usart> = SharedPort::new();

#[interrupt]
fn USART2() {
    SENSOR_PORT.on_interrupt();
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("bnolink firmware starting...");

    let p = embassy_stm32::init(Default::default());

    // embassy-stm32 sets up clocks, pins and the baud rate; the transport
    // owns the register block afterwards. The handle must stay alive or the
    // peripheral is disabled again.
    let _uart = match Uart::new_blocking(p.USART2, p.PA3, p.PA2, line_config(&board::SENSOR_UART))
    {
        Ok(uart) => uart,
        Err(e) => {
            let e = UartSetupError::from(e);
            defmt::panic!("USART2 setup failed: {}", e);
        }
    };

    SENSOR_PORT.install(Port::new(Stm32Usart::usart2(), board::SENSOR_UART));

    // NVIC uses the upper four priority bits on F4
    interrupt::USART2.set_priority(Priority::from(board::SENSOR_UART.irq_priority << 4));
    // SAFETY: the handler only touches SENSOR_PORT, which is installed above
    unsafe { interrupt::USART2.enable() };

    Timer::after_millis(board::BOOT_DELAY_MS).await;

    let mut bno = Bno055::new(&SENSOR_PORT, EmbassyTick, Delay);

    let device = DeviceConfig {
        power_mode: board::POWER_MODE,
        operating_mode: board::OPERATING_MODE,
    };
    loop {
        match bno.init(device) {
            Ok(()) => break,
            Err(e) => {
                warn!("BNO055 init failed: {}, retrying", e);
                Timer::after_millis(board::BOOT_DELAY_MS).await;
            }
        }
    }

    match bno.chip_id() {
        Ok(id) => info!("BNO055 chip id {=u8:#x}", id),
        Err(e) => warn!("chip id read failed: {}", e),
    }
    match bno.self_test_result() {
        Ok(post) => info!("POST: {}", post),
        Err(e) => warn!("POST read failed: {}", e),
    }

    let mut ticker = Ticker::every(Duration::from_millis(board::SAMPLE_PERIOD_MS));
    loop {
        match bno.calibration_status() {
            Ok(calib) => debug!("calibration: {}", calib),
            Err(e) => warn!("calibration status failed: {}", e),
        }

        match bno.euler() {
            Ok(euler) => info!(
                "heading {} roll {} pitch {}",
                euler.x, euler.y, euler.z
            ),
            Err(e) => warn!("euler read failed: {}", e),
        }

        match bno.quaternion() {
            Ok(q) => info!("quaternion w {} x {} y {} z {}", q.w, q.x, q.y, q.z),
            Err(e) => warn!("quaternion read failed: {}", e),
        }

        if bno.retries_taken() > 0 {
            trace!("retries so far: {}", bno.retries_taken());
        }

        ticker.next().await;
    }
}
