//! Simulated BNO055 on the far side of a serial link
//!
//! Answers command frames from a two-page register file. Faults queued in
//! [`SimDevice::faults`] replace the answer to the next command, one fault
//! per command.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use bnolink_core::{RxOutcome, SerialLink, SharedPort, TransportError};
use bnolink_hal::{LineStatus, TickSource, UartConfig, UsartInterrupt, UsartRegisters};
use bnolink_protocol::{ERROR_SENTINEL, READ_SUCCESS, START_BYTE};
use embedded_hal::delay::DelayNs;

use super::{reg, Bno055, OperatingMode};

const PAGE_SIZE: usize = 0x80;

#[derive(Debug, Clone)]
pub enum Fault {
    /// Answer `[0xEE, code]`
    Sentinel(u8),
    /// Answer nothing
    Silent,
    /// Normal answer cut off by a line error after `after` bytes
    LineError { after: usize },
    /// Answer these bytes verbatim without executing the command
    Raw(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub op: u8,
    pub register: u8,
    pub length: u8,
}

impl Frame {
    pub fn is_write(&self) -> bool {
        self.op == 0
    }
}

pub struct SimDevice {
    pub pages: [[u8; PAGE_SIZE]; 2],
    pub page: u8,
    pub faults: VecDeque<Fault>,
    pub frames: Vec<Frame>,
    /// Refuse configuration writes outside CONFIG like the real part
    pub enforce_config: bool,
    /// Report the transmitter as busy to every caller
    pub transmit_busy: bool,
    /// Answer writes to this register with a write failure
    pub refuse_writes_to: Option<u8>,
    /// Clock readings when a receive was armed
    pub armed_at: Vec<u32>,
    /// Clock readings when an in-flight receive was aborted
    pub aborted_at: Vec<u32>,
    clock: Rc<Cell<u32>>,
    config: UartConfig,
    answer: Vec<u8>,
    answer_cut: bool,
    rx_buffer: Vec<u8>,
    rx_busy: bool,
    rx_outcome: Option<RxOutcome>,
}

impl SimDevice {
    /// Register file at its power-on values, CONFIG mode, page 0
    pub fn new() -> Self {
        let mut pages = [[0u8; PAGE_SIZE]; 2];
        pages[0][reg::CHIP_ID as usize] = reg::CHIP_ID_VALUE;
        pages[0][reg::ST_RESULT as usize] = 0x0F;
        pages[0][reg::UNIT_SEL as usize] = 0x80;
        pages[0][reg::AXIS_MAP_CONFIG as usize] = 0x24;
        pages[1][reg::ACC_CONFIG as usize] = 0x0D;
        pages[1][reg::MAG_CONFIG as usize] = 0x6D;
        pages[1][reg::GYR_CONFIG_0 as usize] = 0x38;

        Self {
            pages,
            page: 0,
            faults: VecDeque::new(),
            frames: Vec::new(),
            enforce_config: false,
            transmit_busy: false,
            refuse_writes_to: None,
            armed_at: Vec::new(),
            aborted_at: Vec::new(),
            clock: Rc::default(),
            config: UartConfig::default(),
            answer: Vec::new(),
            answer_cut: false,
            rx_buffer: Vec::new(),
            rx_busy: false,
            rx_outcome: None,
        }
    }

    pub fn in_mode(mode: OperatingMode) -> Self {
        let mut sim = Self::new();
        sim.pages[0][reg::OPR_MODE as usize] = mode as u8;
        sim
    }

    pub fn mode(&self) -> Option<OperatingMode> {
        OperatingMode::from_bits(self.pages[0][reg::OPR_MODE as usize])
    }

    pub fn register(&self, page: usize, register: u8) -> u8 {
        self.pages[page][register as usize]
    }

    pub fn set_register(&mut self, page: usize, register: u8, value: u8) {
        self.pages[page][register as usize] = value;
    }

    pub fn writes(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter().filter(|f| f.is_write())
    }

    fn load(&self, register: u8) -> u8 {
        if register == reg::PAGE_ID {
            return self.page;
        }
        self.pages[self.page as usize]
            .get(register as usize)
            .copied()
            .unwrap_or(0)
    }

    fn store(&mut self, register: u8, value: u8) {
        if register == reg::PAGE_ID {
            self.page = value & 0x01;
            return;
        }
        if let Some(slot) = self.pages[self.page as usize].get_mut(register as usize) {
            *slot = value;
        }
    }

    fn write_allowed(&self, register: u8) -> bool {
        !self.enforce_config
            || register == reg::PAGE_ID
            || (self.page == 0 && register == reg::OPR_MODE)
            || self.mode() == Some(OperatingMode::Config)
    }

    fn execute(&mut self, bytes: &[u8]) -> Vec<u8> {
        let (op, register, length) = match bytes {
            [START_BYTE, op, register, length, ..] => (*op, *register, *length),
            _ => return vec![ERROR_SENTINEL, 0x06],
        };
        self.frames.push(Frame {
            op,
            register,
            length,
        });

        let fault = self.faults.pop_front();
        match &fault {
            Some(Fault::Sentinel(code)) => return vec![ERROR_SENTINEL, *code],
            Some(Fault::Silent) => return Vec::new(),
            Some(Fault::Raw(answer)) => return answer.clone(),
            Some(Fault::LineError { .. }) | None => {}
        }

        let mut answer = if op == 1 {
            let mut answer = vec![READ_SUCCESS, length];
            answer.extend((0..length).map(|i| self.load(register.wrapping_add(i))));
            answer
        } else if self.refuse_writes_to == Some(register) {
            vec![ERROR_SENTINEL, 0x03]
        } else if self.write_allowed(register) {
            for (i, value) in bytes[4..].iter().enumerate() {
                self.store(register.wrapping_add(i as u8), *value);
            }
            vec![ERROR_SENTINEL, 0x01]
        } else {
            vec![ERROR_SENTINEL, 0x05]
        };

        if let Some(Fault::LineError { after }) = fault {
            answer.truncate(after);
            self.answer_cut = true;
        }
        answer
    }
}

impl SerialLink for SimDevice {
    fn config(&self) -> Result<UartConfig, TransportError> {
        Ok(self.config)
    }

    fn begin_transmit(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if self.transmit_busy {
            return Err(TransportError::Busy);
        }
        self.answer_cut = false;
        self.answer = self.execute(bytes);
        Ok(())
    }

    fn is_transmit_busy(&self) -> bool {
        self.transmit_busy
    }

    fn begin_receive(&mut self, len: usize) -> Result<(), TransportError> {
        if len == 0 {
            return Err(TransportError::InvalidParam);
        }
        if self.rx_busy {
            return Err(TransportError::Busy);
        }

        self.armed_at.push(self.clock.get());
        let answer = core::mem::take(&mut self.answer);
        if self.answer_cut {
            self.rx_outcome = Some(RxOutcome::Partial {
                received: answer.len(),
            });
            self.rx_buffer = answer;
        } else if answer.len() >= len {
            self.rx_buffer = answer[..len].to_vec();
            self.rx_outcome = Some(RxOutcome::Complete);
        } else {
            self.rx_buffer = answer;
            self.rx_outcome = None;
            self.rx_busy = true;
        }
        Ok(())
    }

    fn is_receive_busy(&self) -> bool {
        self.rx_busy
    }

    fn abort_receive(&mut self) {
        if self.rx_busy {
            self.aborted_at.push(self.clock.get());
            self.rx_busy = false;
            self.rx_outcome = Some(RxOutcome::TimedOut {
                received: self.rx_buffer.len(),
            });
        }
    }

    fn take_received(&mut self, dest: &mut [u8]) -> Option<RxOutcome> {
        if self.rx_busy {
            return None;
        }
        let outcome = self.rx_outcome.take()?;
        let n = dest.len().min(self.rx_buffer.len());
        dest[..n].copy_from_slice(&self.rx_buffer[..n]);
        Some(outcome)
    }
}

/// Millisecond counter that advances on every read
#[derive(Clone, Default)]
pub struct SimClock(Rc<Cell<u32>>);

impl TickSource for SimClock {
    fn now_ms(&self) -> u32 {
        let now = self.0.get();
        self.0.set(now.wrapping_add(1));
        now
    }
}

/// Delay that advances the shared clock and records each millisecond wait
#[derive(Clone)]
pub struct SimDelay {
    clock: Rc<Cell<u32>>,
    log: Rc<RefCell<Vec<u32>>>,
}

impl SimDelay {
    pub fn waits(&self) -> Vec<u32> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        let ms = ns.div_ceil(1_000_000);
        self.clock.set(self.clock.get().wrapping_add(ms));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.borrow_mut().push(ms);
        self.clock.set(self.clock.get().wrapping_add(ms));
    }
}

pub type SimBno = Bno055<SimDevice, SimClock, SimDelay>;

/// Clock and delay sharing one time base
pub fn timing() -> (SimClock, SimDelay) {
    let clock = SimClock::default();
    let delay = SimDelay {
        clock: clock.0.clone(),
        log: Rc::new(RefCell::new(Vec::new())),
    };
    (clock, delay)
}

/// Driver on a simulated device, plus a handle on its delay log
pub fn driver(mut sim: SimDevice) -> (SimBno, SimDelay) {
    let (clock, delay) = timing();
    sim.clock = clock.0.clone();
    (Bno055::new(sim, clock, delay.clone()), delay)
}

/// USART register block wired to a [`SimDevice`]
///
/// Frames written to the data register are executed once complete. The
/// reply only shows up while RXNE is enabled, since the sensor answers
/// long after the host has armed its receive.
pub struct WireUsart {
    pub device: SimDevice,
    frame: Vec<u8>,
    reply: VecDeque<u8>,
    tx_complete: bool,
    txe_enabled: bool,
    tc_enabled: bool,
    rxne_enabled: bool,
}

impl WireUsart {
    pub fn new(device: SimDevice) -> Self {
        Self {
            device,
            frame: Vec::new(),
            reply: VecDeque::new(),
            tx_complete: true,
            txe_enabled: false,
            tc_enabled: false,
            rxne_enabled: false,
        }
    }

    fn frame_complete(&self) -> bool {
        match self.frame.as_slice() {
            [START_BYTE, 0, _, length, payload @ ..] => payload.len() >= *length as usize,
            [START_BYTE, _, _, _] => true,
            _ => false,
        }
    }
}

impl UsartRegisters for WireUsart {
    fn status(&self) -> LineStatus {
        LineStatus {
            tx_empty: true,
            tx_complete: self.tx_complete,
            rx_not_empty: self.rxne_enabled && !self.reply.is_empty(),
            ..Default::default()
        }
    }

    fn read_data(&mut self) -> u8 {
        self.reply.pop_front().unwrap_or(0)
    }

    fn write_data(&mut self, byte: u8) {
        self.frame.push(byte);
        self.tx_complete = true;
        if self.frame_complete() {
            let frame = core::mem::take(&mut self.frame);
            let reply = self.device.execute(&frame);
            self.reply.extend(reply);
        }
    }

    fn enable_interrupt(&mut self, irq: UsartInterrupt) {
        self.set_interrupt(irq, true);
    }

    fn disable_interrupt(&mut self, irq: UsartInterrupt) {
        self.set_interrupt(irq, false);
    }

    fn is_interrupt_enabled(&self, irq: UsartInterrupt) -> bool {
        match irq {
            UsartInterrupt::TxEmpty => self.txe_enabled,
            UsartInterrupt::TxComplete => self.tc_enabled,
            UsartInterrupt::RxNotEmpty => self.rxne_enabled,
        }
    }

    fn clear_transmit_complete(&mut self) {
        self.tx_complete = false;
    }
}

impl WireUsart {
    fn set_interrupt(&mut self, irq: UsartInterrupt, enabled: bool) {
        match irq {
            UsartInterrupt::TxEmpty => self.txe_enabled = enabled,
            UsartInterrupt::TxComplete => self.tc_enabled = enabled,
            UsartInterrupt::RxNotEmpty => self.rxne_enabled = enabled,
        }
    }
}

/// Characters per millisecond at 115200 8N1
const CHARS_PER_MS: usize = 12;

/// Shared port whose interrupt fires between foreground polls
pub struct Interrupting<'a>(pub &'a SharedPort<WireUsart>);

impl Interrupting<'_> {
    fn fire(&self) {
        for _ in 0..CHARS_PER_MS {
            self.0.on_interrupt();
        }
    }
}

impl SerialLink for Interrupting<'_> {
    fn config(&self) -> Result<UartConfig, TransportError> {
        SerialLink::config(&self.0)
    }

    fn begin_transmit(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut link = self.0;
        link.begin_transmit(bytes)
    }

    fn is_transmit_busy(&self) -> bool {
        self.fire();
        SerialLink::is_transmit_busy(&self.0)
    }

    fn begin_receive(&mut self, len: usize) -> Result<(), TransportError> {
        let mut link = self.0;
        link.begin_receive(len)
    }

    fn is_receive_busy(&self) -> bool {
        self.fire();
        SerialLink::is_receive_busy(&self.0)
    }

    fn abort_receive(&mut self) {
        let mut link = self.0;
        link.abort_receive()
    }

    fn take_received(&mut self, dest: &mut [u8]) -> Option<RxOutcome> {
        let mut link = self.0;
        link.take_received(dest)
    }
}

mod tests {
    use super::*;
    use crate::bno055::{
        AccelBandwidth, AccelConfig, AccelPowerMode, AccelRange, Axis, CalibrationProfile,
        DeviceConfig, Error, Page, PowerMode, Sensor, SystemError, TemperatureUnit, Unit,
        CONFIG_ENTER_DELAY_MS, CONFIG_EXIT_DELAY_MS,
    };
    use bnolink_core::timeout::compute_timeout_ms;
    use bnolink_core::{Port, RX_TIMEOUT_MARGIN};
    use bnolink_protocol::ResponseStatus;
    use proptest::prelude::*;

    #[test]
    fn test_read_register_returns_payload_only() {
        let mut sim = SimDevice::new();
        sim.set_register(0, 0x20, 0x11);
        sim.set_register(0, 0x21, 0x22);
        let (mut bno, delay) = driver(sim);

        let mut out = [0u8; 2];
        bno.read_register(0x20, &mut out).unwrap();

        assert_eq!(out, [0x11, 0x22]);
        assert_eq!(bno.retries_taken(), 0);
        assert_eq!(delay.waits(), vec![10]);
        assert_eq!(
            bno.link_mut().frames,
            vec![Frame {
                op: 1,
                register: 0x20,
                length: 2
            }]
        );
    }

    #[test]
    fn test_length_outside_frame_range_is_rejected() {
        let (mut bno, delay) = driver(SimDevice::new());

        assert_eq!(bno.read_register(0x00, &mut []), Err(Error::InvalidParam));
        assert_eq!(bno.write_register(0x40, &[0u8; 256]), Err(Error::InvalidParam));
        assert!(bno.link_mut().frames.is_empty());
        assert!(delay.waits().is_empty());
    }

    #[test]
    fn test_one_retry_after_silence() {
        let mut sim = SimDevice::new();
        sim.faults.push_back(Fault::Silent);
        let (mut bno, delay) = driver(sim);

        let mut out = [0u8; 1];
        bno.read_register(reg::CHIP_ID, &mut out).unwrap();

        assert_eq!(out, [0xA0]);
        assert_eq!(bno.retries_taken(), 1);
        // First attempt, back-off, retry start-up
        assert_eq!(delay.waits(), vec![10, 10, 15]);
        assert_eq!(bno.link_mut().frames.len(), 2);
    }

    #[test]
    fn test_silent_device_gives_up_after_two_retries() {
        let mut sim = SimDevice::new();
        sim.faults.extend([Fault::Silent, Fault::Silent, Fault::Silent]);
        let (mut bno, delay) = driver(sim);

        let mut out = [0u8; 1];
        let result = bno.read_register(reg::CHIP_ID, &mut out);

        assert_eq!(
            result,
            Err(Error::Incomplete {
                received: 0,
                expected: 3
            })
        );
        assert_eq!(bno.link_mut().frames.len(), 3);
        assert_eq!(delay.waits(), vec![10, 10, 15, 10, 15]);
    }

    #[test]
    fn test_read_sentinel_reports_device_status() {
        let mut sim = SimDevice::new();
        sim.faults.extend([
            Fault::Sentinel(0x02),
            Fault::Sentinel(0x02),
            Fault::Sentinel(0x07),
        ]);
        let (mut bno, _) = driver(sim);

        let mut out = [0u8; 6];
        let result = bno.read_register(reg::ACC_DATA, &mut out);

        // Classification of the last attempt wins
        assert_eq!(result, Err(Error::Device(ResponseStatus::BusOverRunError)));
        assert_eq!(bno.retries_taken(), 2);
    }

    #[test]
    fn test_read_sentinel_then_valid_retries_once() {
        let mut sim = SimDevice::new();
        sim.faults.push_back(Fault::Sentinel(0x07));
        let (mut bno, delay) = driver(sim);

        let mut out = [0u8; 1];
        bno.read_register(reg::CHIP_ID, &mut out).unwrap();

        assert_eq!(out, [0xA0]);
        assert_eq!(bno.retries_taken(), 1);
        assert_eq!(delay.waits(), vec![10, 10, 15]);
    }

    #[test]
    fn test_silent_device_abandoned_after_timeout() {
        let mut sim = SimDevice::new();
        sim.faults.push_back(Fault::Silent);
        let (mut bno, _) = driver(sim);

        let mut out = [0u8; 1];
        bno.read_register(reg::CHIP_ID, &mut out).unwrap();

        let sim = bno.link_mut();
        assert_eq!(sim.aborted_at.len(), 1);
        let timeout = compute_timeout_ms(&UartConfig::default(), 3, RX_TIMEOUT_MARGIN).unwrap();
        // Start-up delay, then the poll; each clock read advances 1 ms
        let polled = (sim.aborted_at[0] - sim.armed_at[0] - 10) as f32;
        assert!(polled > timeout);
        assert!(polled <= timeout + 2.0);
    }

    #[test]
    fn test_driver_over_interrupt_driven_port() {
        let mut device = SimDevice::new();
        device.faults.push_back(Fault::Silent);
        let shared = SharedPort::new();
        shared.install(Port::new(WireUsart::new(device), UartConfig::default()));
        let (clock, delay) = timing();
        let mut bno = Bno055::new(Interrupting(&shared), clock, delay);

        // First answer never comes; the port aborts and the retry succeeds
        let mut out = [0u8; 1];
        bno.read_register(reg::CHIP_ID, &mut out).unwrap();
        assert_eq!(out, [0xA0]);
        assert_eq!(bno.retries_taken(), 1);

        bno.write_register(0x40, &[0x12, 0x34]).unwrap();
        let mut out = [0u8; 2];
        bno.read_register(0x40, &mut out).unwrap();
        assert_eq!(out, [0x12, 0x34]);

        let regs = shared.teardown().unwrap();
        assert_eq!(regs.device.frames.len(), 4);
        assert!(!regs.rxne_enabled);
    }

    #[test]
    fn test_line_error_is_retried() {
        let mut sim = SimDevice::new();
        sim.set_register(0, reg::TEMP, 25);
        sim.faults.push_back(Fault::LineError { after: 1 });
        let (mut bno, _) = driver(sim);

        let mut out = [0u8; 1];
        bno.read_register(reg::TEMP, &mut out).unwrap();

        assert_eq!(out, [25]);
        assert_eq!(bno.retries_taken(), 1);
    }

    #[test]
    fn test_busy_link_is_not_retried() {
        let mut sim = SimDevice::new();
        sim.transmit_busy = true;
        let (mut bno, delay) = driver(sim);

        assert_eq!(bno.write_register(reg::UNIT_SEL, &[0]), Err(Error::Busy));
        assert_eq!(bno.retries_taken(), 0);
        assert!(delay.waits().is_empty());
    }

    #[test]
    fn test_write_acknowledgement_and_failure() {
        let mut sim = SimDevice::new();
        sim.faults.extend([
            Fault::Sentinel(0x03),
            Fault::Sentinel(0x03),
            Fault::Sentinel(0x03),
        ]);
        let (mut bno, _) = driver(sim);

        assert_eq!(
            bno.write_register(reg::UNIT_SEL, &[0x01]),
            Err(Error::Device(ResponseStatus::WriteFail))
        );

        bno.write_register(reg::UNIT_SEL, &[0x01]).unwrap();
        assert_eq!(bno.link_mut().register(0, reg::UNIT_SEL), 0x01);
    }

    #[test]
    fn test_write_accepts_any_non_sentinel_answer() {
        // Only 0xEE with a status other than 0x01 fails a write; a garbage
        // answer without the sentinel passes.
        let mut sim = SimDevice::new();
        sim.faults.push_back(Fault::Raw(vec![0xAB, 0xCD]));
        let (mut bno, _) = driver(sim);

        assert_eq!(bno.write_register(reg::UNIT_SEL, &[0x01]), Ok(()));
        assert_eq!(bno.retries_taken(), 0);
        // The answer was canned, so nothing reached the register file
        assert_eq!(bno.link_mut().register(0, reg::UNIT_SEL), 0x80);
    }

    #[test]
    fn test_select_page_writes_only_on_change() {
        let (mut bno, delay) = driver(SimDevice::new());

        bno.select_page(Page::One).unwrap();
        bno.select_page(Page::One).unwrap();

        let sim = bno.link_mut();
        assert_eq!(sim.page, 1);
        assert_eq!(sim.writes().count(), 1);
        assert_eq!(sim.frames.len(), 3);
        // 2 ms pre-write pause between the read and the write
        assert_eq!(delay.waits(), vec![10, 2, 10, 10]);
    }

    #[test]
    fn test_mode_switch_settle_times() {
        let (mut bno, delay) = driver(SimDevice::new());

        bno.set_operating_mode(OperatingMode::Ndof).unwrap();
        assert!(delay.waits().contains(&CONFIG_EXIT_DELAY_MS));
        assert!(!delay.waits().contains(&CONFIG_ENTER_DELAY_MS));
        delay.clear();

        bno.set_operating_mode(OperatingMode::Imu).unwrap();
        assert!(delay.waits().iter().all(|&ms| ms == 10));
        delay.clear();

        bno.set_operating_mode(OperatingMode::Config).unwrap();
        assert_eq!(delay.waits().last(), Some(&CONFIG_ENTER_DELAY_MS));
        assert_eq!(bno.operating_mode(), Ok(OperatingMode::Config));
    }

    #[test]
    fn test_mode_switch_preserves_reserved_bits() {
        let mut sim = SimDevice::new();
        sim.set_register(0, reg::OPR_MODE, 0x70);
        let (mut bno, _) = driver(sim);

        bno.set_operating_mode(OperatingMode::Ndof).unwrap();
        assert_eq!(bno.link_mut().register(0, reg::OPR_MODE), 0x7C);
    }

    #[test]
    fn test_undecodable_mode_is_reported() {
        let mut sim = SimDevice::new();
        sim.set_register(0, reg::OPR_MODE, 0x0E);
        let (mut bno, _) = driver(sim);

        assert_eq!(bno.operating_mode(), Err(Error::UnexpectedValue(0x0E)));
    }

    #[test]
    fn test_config_guard_restores_on_error() {
        let mut sim = SimDevice::in_mode(OperatingMode::Ndof);
        sim.enforce_config = true;
        let (mut bno, _) = driver(sim);

        let result: Result<(), Error> = bno.with_config_mode(|dev| {
            assert_eq!(dev.operating_mode()?, OperatingMode::Config);
            Err(Error::InvalidParam)
        });

        assert_eq!(result, Err(Error::InvalidParam));
        assert_eq!(bno.link_mut().mode(), Some(OperatingMode::Ndof));
    }

    #[test]
    fn test_config_guard_restores_on_drop() {
        let (mut bno, _) = driver(SimDevice::in_mode(OperatingMode::Amg));

        {
            let guard = bno.enter_config_mode().unwrap();
            assert_eq!(guard.previous_mode(), OperatingMode::Amg);
        }

        assert_eq!(bno.link_mut().mode(), Some(OperatingMode::Amg));
    }

    #[test]
    fn test_config_guard_from_config_is_noop() {
        let (mut bno, delay) = driver(SimDevice::new());

        bno.with_config_mode(|_| Ok(())).unwrap();

        assert_eq!(bno.link_mut().writes().count(), 0);
        assert!(!delay.waits().contains(&CONFIG_ENTER_DELAY_MS));
    }

    #[test]
    fn test_init_applies_device_config() {
        let mut sim = SimDevice::new();
        sim.enforce_config = true;
        sim.set_register(0, reg::PWR_MODE, 0x01);
        let (mut bno, _) = driver(sim);

        bno.init(DeviceConfig::default()).unwrap();

        assert_eq!(bno.power_mode(), Ok(PowerMode::Normal));
        assert_eq!(bno.link_mut().mode(), Some(OperatingMode::Ndof));
    }

    #[test]
    fn test_init_failure_restores_previous_mode() {
        let mut sim = SimDevice::in_mode(OperatingMode::Imu);
        sim.refuse_writes_to = Some(reg::PWR_MODE);
        let (mut bno, _) = driver(sim);

        assert_eq!(
            bno.init(DeviceConfig::default()),
            Err(Error::Device(ResponseStatus::WriteFail))
        );
        assert_eq!(bno.link_mut().mode(), Some(OperatingMode::Imu));
    }

    #[test]
    fn test_init_rejects_wrong_chip() {
        let mut sim = SimDevice::new();
        sim.set_register(0, reg::CHIP_ID, 0x55);
        let (mut bno, _) = driver(sim);

        assert_eq!(
            bno.init(DeviceConfig::default()),
            Err(Error::UnexpectedValue(0x55))
        );
        assert_eq!(bno.link_mut().writes().count(), 0);
    }

    #[test]
    fn test_fusion_output_unavailable_without_fusion() {
        let (mut bno, _) = driver(SimDevice::in_mode(OperatingMode::AccOnly));

        assert_eq!(bno.euler(), Err(Error::InvalidParam));
        // Page check and mode read only
        assert_eq!(bno.link_mut().frames.len(), 2);
    }

    #[test]
    fn test_euler_scaled_by_unit_selection() {
        let mut sim = SimDevice::in_mode(OperatingMode::Ndof);
        // heading 90 deg, roll -1 deg, pitch 0
        for (i, byte) in [0xA0, 0x05, 0xF0, 0xFF, 0x00, 0x00].into_iter().enumerate() {
            sim.set_register(0, reg::EUL_DATA + i as u8, byte);
        }
        let (mut bno, _) = driver(sim);

        let euler = bno.euler().unwrap();
        assert_eq!(euler.x, 90.0);
        assert_eq!(euler.y, -1.0);
        assert_eq!(euler.z, 0.0);
    }

    #[test]
    fn test_quaternion_scaling() {
        let mut sim = SimDevice::in_mode(OperatingMode::Imu);
        sim.set_register(0, reg::QUA_DATA, 0x00);
        sim.set_register(0, reg::QUA_DATA + 1, 0x40);
        let (mut bno, _) = driver(sim);

        let q = bno.quaternion().unwrap();
        assert_eq!(q.w, 1.0);
        assert_eq!(q.x, 0.0);
    }

    #[test]
    fn test_temperature_in_fahrenheit() {
        let mut sim = SimDevice::in_mode(OperatingMode::Ndof);
        sim.set_register(0, reg::TEMP, 50);
        sim.enforce_config = true;
        let (mut bno, _) = driver(sim);

        bno.set_unit(Unit::Temperature(TemperatureUnit::Fahrenheit))
            .unwrap();

        assert_eq!(bno.units().unwrap().temperature, TemperatureUnit::Fahrenheit);
        assert_eq!(bno.temperature(), Ok(100.0));
        assert_eq!(bno.link_mut().mode(), Some(OperatingMode::Ndof));
    }

    #[test]
    fn test_calibration_profile_single_transfer() {
        let mut sim = SimDevice::in_mode(OperatingMode::Ndof);
        sim.enforce_config = true;
        let (mut bno, _) = driver(sim);
        let profile = CalibrationProfile {
            accel_offset: [-20, 5, 12],
            mag_offset: [100, -200, 300],
            gyro_offset: [-1, 0, 1],
            accel_radius: 1000,
            mag_radius: 620,
        };

        bno.set_calibration_profile(&profile).unwrap();

        let block_writes: Vec<_> = bno
            .link_mut()
            .writes()
            .filter(|f| f.register == reg::ACC_OFFSET)
            .copied()
            .collect();
        assert_eq!(block_writes.len(), 1);
        assert_eq!(block_writes[0].length, 22);

        assert_eq!(bno.calibration_profile(), Ok(profile));
        assert_eq!(bno.sensor_radius(Sensor::Magnetometer), Ok(620));
        assert_eq!(bno.sensor_offset(Sensor::Gyroscope).unwrap().z, 1);
        assert_eq!(bno.link_mut().mode(), Some(OperatingMode::Ndof));
    }

    #[test]
    fn test_gyroscope_has_no_radius() {
        let (mut bno, _) = driver(SimDevice::new());

        assert_eq!(bno.sensor_radius(Sensor::Gyroscope), Err(Error::InvalidParam));
        assert_eq!(
            bno.set_sensor_radius(Sensor::Gyroscope, 1),
            Err(Error::InvalidParam)
        );
        assert!(bno.link_mut().frames.is_empty());
    }

    #[test]
    fn test_accelerometer_config_on_page_one() {
        let mut sim = SimDevice::in_mode(OperatingMode::Amg);
        sim.enforce_config = true;
        let (mut bno, _) = driver(sim);
        let config = AccelConfig {
            range: AccelRange::G8,
            bandwidth: AccelBandwidth::Hz125,
            power_mode: AccelPowerMode::Normal,
        };

        bno.configure_accelerometer(&config).unwrap();

        let sim = bno.link_mut();
        assert_eq!(sim.register(1, reg::ACC_CONFIG), 0b000_100_10);
        // Page-0 register at the same address is untouched
        assert_eq!(sim.register(0, reg::ACC_CONFIG), 0);
        assert_eq!(sim.page, 0);
        assert_eq!(sim.mode(), Some(OperatingMode::Amg));
        assert_eq!(bno.accelerometer_config(), Ok(config));
    }

    #[test]
    fn test_sensor_config_refused_when_sensor_idle() {
        let (mut bno, _) = driver(SimDevice::in_mode(OperatingMode::MagOnly));

        assert_eq!(
            bno.configure_accelerometer(&AccelConfig::default()),
            Err(Error::InvalidParam)
        );
        assert_eq!(bno.link_mut().writes().count(), 0);
    }

    #[test]
    fn test_remap_to_current_source_is_noop() {
        let (mut bno, _) = driver(SimDevice::in_mode(OperatingMode::Ndof));

        bno.remap_axis(Axis::Z, Axis::Z).unwrap();
        assert_eq!(bno.link_mut().writes().count(), 0);

        bno.remap_axis(Axis::Z, Axis::X).unwrap();
        assert_eq!(bno.link_mut().register(0, reg::AXIS_MAP_CONFIG), 0x04);
        assert_eq!(bno.link_mut().mode(), Some(OperatingMode::Ndof));
    }

    #[test]
    fn test_self_test_waits_and_reports() {
        let (mut bno, delay) = driver(SimDevice::in_mode(OperatingMode::Ndof));

        assert_eq!(bno.run_self_test(), Ok(SystemError::NoError));
        assert!(delay.waits().contains(&800));
        assert_eq!(bno.link_mut().register(0, reg::SYS_TRIGGER), 0x01);
        assert!(bno.self_test_result().unwrap().all_passed());
    }

    proptest! {
        #[test]
        fn prop_write_then_read_returns_payload(
            register in 0x40u8..0x60,
            payload in proptest::collection::vec(any::<u8>(), 1..16),
        ) {
            let (mut bno, _) = driver(SimDevice::new());

            bno.write_register(register, &payload).unwrap();
            let mut out = vec![0u8; payload.len()];
            bno.read_register(register, &mut out).unwrap();

            prop_assert_eq!(out, payload);
        }
    }
}
