//! Test doubles shared by the unit tests
//!
//! * [`PinSpy`] records every level a pin is driven to.
//! * [`Chip`] behind [`SimSpi`] answers transactions like the transceiver
//!   does: register file, TX/RX FIFOs, write-1-to-clear STATUS flags.
//! * [`mk_mock_radio`] wires the driver to `embedded-hal-mock` for
//!   wire-exact expectations.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::OutputPin;
use embedded_hal_mock::pin::{Mock as PinMock, State as PinState, Transaction as PinTransaction};
use embedded_hal_mock::spi::{Mock as SpiMock, Transaction as SpiTransaction};

use crate::command::{
    ACTIVATE, ACTIVATE_KEY, FLUSH_RX, FLUSH_TX, NOP, REGISTER_MASK, R_REGISTER, R_RX_PAYLOAD,
    R_RX_PL_WID, W_ACK_PAYLOAD, W_REGISTER, W_TX_PAYLOAD, W_TX_PAYLOAD_NOACK,
};
use crate::registers::*;
use crate::NRF24L01;

/// A pin level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Levels a [`PinSpy`] was driven to, oldest first
pub type Levels = Rc<RefCell<Vec<Level>>>;

/// Failure reported by [`PinSpy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinFault;

/// Output pin that records instead of driving anything
pub struct PinSpy {
    levels: Levels,
    high_faults: Rc<Cell<usize>>,
}

impl PinSpy {
    pub fn new() -> (Self, Levels) {
        let levels = Rc::new(RefCell::new(Vec::new()));
        let pin = PinSpy {
            levels: levels.clone(),
            high_faults: Rc::new(Cell::new(0)),
        };
        (pin, levels)
    }

    /// Number of upcoming `set_high` calls that fail without driving the pin
    pub fn high_faults(&self) -> Rc<Cell<usize>> {
        self.high_faults.clone()
    }
}

impl OutputPin for PinSpy {
    type Error = PinFault;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(Level::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let faults = self.high_faults.get();
        if faults > 0 {
            self.high_faults.set(faults - 1);
            return Err(PinFault);
        }
        self.levels.borrow_mut().push(Level::High);
        Ok(())
    }
}

const FIFO_DEPTH: usize = 3;
const FLAGS_MASK: u8 = 0x70;

/// Simulated transceiver
pub struct Chip {
    registers: [[u8; 5]; 0x20],
    flags: u8,
    /// Payloads waiting to be sent
    pub tx_fifo: VecDeque<Vec<u8>>,
    /// Received `(pipe, payload)` pairs
    pub rx_fifo: VecDeque<(u8, Vec<u8>)>,
    /// Flags raised one entry per NOP, simulating the air
    pub status_script: VecDeque<u8>,
    /// Every frame as clocked in by the driver
    pub frames: Vec<Vec<u8>>,
    /// Number of upcoming transfers that fail
    pub failures: usize,
    /// Toggled by ACTIVATE
    pub activated: bool,
}

impl Chip {
    /// Register file at its power-on reset values
    pub fn new() -> Self {
        let mut registers = [[0; 5]; 0x20];
        registers[CONFIG as usize][0] = 0x08;
        registers[EN_AA as usize][0] = 0x3F;
        registers[EN_RXADDR as usize][0] = 0x03;
        registers[SETUP_AW as usize][0] = 0x03;
        registers[SETUP_RETR as usize][0] = 0x03;
        registers[RF_CH as usize][0] = 0x02;
        registers[RF_SETUP as usize][0] = 0x0F;
        registers[RX_ADDR_P0 as usize] = [0xE7; 5];
        registers[RX_ADDR_P1 as usize] = [0xC2; 5];
        registers[RX_ADDR_P2 as usize][0] = 0xC3;
        registers[RX_ADDR_P3 as usize][0] = 0xC4;
        registers[RX_ADDR_P4 as usize][0] = 0xC5;
        registers[RX_ADDR_P5 as usize][0] = 0xC6;
        registers[TX_ADDR as usize] = [0xE7; 5];

        Chip {
            registers,
            flags: 0,
            tx_fifo: VecDeque::new(),
            rx_fifo: VecDeque::new(),
            status_script: VecDeque::new(),
            frames: Vec::new(),
            failures: 0,
            activated: false,
        }
    }

    pub fn status(&self) -> u8 {
        let rx_p_no = self.rx_fifo.front().map(|(pipe, _)| *pipe).unwrap_or(7);
        let tx_full = (self.tx_fifo.len() >= FIFO_DEPTH) as u8;
        self.flags | (rx_p_no << 1) | tx_full
    }

    pub fn fifo_status(&self) -> u8 {
        let tx_full = (self.tx_fifo.len() >= FIFO_DEPTH) as u8;
        let tx_empty = self.tx_fifo.is_empty() as u8;
        let rx_full = (self.rx_fifo.len() >= FIFO_DEPTH) as u8;
        let rx_empty = self.rx_fifo.is_empty() as u8;
        (tx_full << 5) | (tx_empty << 4) | (rx_full << 1) | rx_empty
    }

    /// First byte of the register at `addr`
    pub fn register(&self, addr: u8) -> u8 {
        match addr {
            STATUS => self.status(),
            FIFO_STATUS => self.fifo_status(),
            _ => self.registers[addr as usize][0],
        }
    }

    /// All 5 bytes of an address register
    pub fn address(&self, addr: u8) -> [u8; 5] {
        self.registers[addr as usize]
    }

    pub fn set_register(&mut self, addr: u8, value: u8) {
        self.registers[addr as usize][0] = value;
    }

    pub fn raise(&mut self, flags: u8) {
        self.flags |= flags & FLAGS_MASK;
    }

    /// A payload arrives on `pipe`
    pub fn receive(&mut self, pipe: u8, payload: &[u8]) {
        self.rx_fifo.push_back((pipe, payload.to_vec()));
        self.raise(0x40);
    }

    /// Frames that started with `command`
    pub fn count(&self, command: u8) -> usize {
        self.frames.iter().filter(|frame| frame[0] == command).count()
    }

    fn execute(&mut self, frame: &mut [u8]) {
        let command = frame[0];
        if command == NOP {
            if let Some(flags) = self.status_script.pop_front() {
                self.raise(flags);
            }
        }
        frame[0] = self.status();
        let data = &mut frame[1..];

        match command {
            c if c & !REGISTER_MASK == R_REGISTER => {
                let addr = c & REGISTER_MASK;
                let value = match addr {
                    STATUS | FIFO_STATUS => [self.register(addr), 0, 0, 0, 0],
                    _ => self.registers[addr as usize],
                };
                for (i, byte) in data.iter_mut().enumerate() {
                    *byte = value.get(i).copied().unwrap_or(0);
                }
            }
            c if c & !REGISTER_MASK == W_REGISTER => match c & REGISTER_MASK {
                STATUS => self.flags &= !(data[0] & FLAGS_MASK),
                FIFO_STATUS => {}
                addr => {
                    for (i, byte) in data.iter().take(5).enumerate() {
                        self.registers[addr as usize][i] = *byte;
                    }
                }
            },
            R_RX_PAYLOAD => {
                if let Some((_, payload)) = self.rx_fifo.pop_front() {
                    for (byte, value) in data.iter_mut().zip(payload.iter()) {
                        *byte = *value;
                    }
                }
            }
            R_RX_PL_WID => {
                data[0] = self.rx_fifo.front().map(|(_, payload)| payload.len() as u8).unwrap_or(0);
            }
            W_TX_PAYLOAD | W_TX_PAYLOAD_NOACK => {
                if self.tx_fifo.len() < FIFO_DEPTH {
                    self.tx_fifo.push_back(data.to_vec());
                }
            }
            c if c & !0b111 == W_ACK_PAYLOAD => {
                if self.tx_fifo.len() < FIFO_DEPTH {
                    self.tx_fifo.push_back(data.to_vec());
                }
            }
            FLUSH_TX => self.tx_fifo.clear(),
            FLUSH_RX => self.rx_fifo.clear(),
            ACTIVATE if data.first() == Some(&ACTIVATE_KEY) => self.activated = !self.activated,
            _ => {}
        }
    }
}

/// Failure reported by [`SimSpi`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiFault;

/// SPI bus with a [`Chip`] on the other end
pub struct SimSpi {
    chip: Rc<RefCell<Chip>>,
}

impl Transfer<u8> for SimSpi {
    type Error = SpiFault;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], SpiFault> {
        let mut chip = self.chip.borrow_mut();
        chip.frames.push(words.to_vec());
        if chip.failures > 0 {
            chip.failures -= 1;
            return Err(SpiFault);
        }
        chip.execute(words);
        Ok(words)
    }
}

/// Driver wired to a simulated chip
pub type SimRadio = NRF24L01<PinFault, PinSpy, PinSpy, SimSpi>;

/// Handles into the simulation behind a [`SimRadio`]
pub struct Sim {
    pub chip: Rc<RefCell<Chip>>,
    pub ce: Levels,
    pub csn: Levels,
    /// See [`PinSpy::high_faults`]
    pub csn_high_faults: Rc<Cell<usize>>,
}

impl Sim {
    /// Forget the frames and pin levels seen so far
    pub fn reset_log(&self) {
        self.chip.borrow_mut().frames.clear();
        self.ce.borrow_mut().clear();
        self.csn.borrow_mut().clear();
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.chip.borrow().frames.clone()
    }
}

/// Fresh driver on a chip at reset values, with empty logs
pub fn mk_radio() -> (SimRadio, Sim) {
    let chip = Rc::new(RefCell::new(Chip::new()));
    let (ce, ce_levels) = PinSpy::new();
    let (csn, csn_levels) = PinSpy::new();
    let csn_high_faults = csn.high_faults();
    let spi = SimSpi { chip: chip.clone() };
    let radio = NRF24L01::new(ce, csn, spi).unwrap();
    let sim = Sim {
        chip,
        ce: ce_levels,
        csn: csn_levels,
        csn_high_faults,
    };
    sim.reset_log();
    (radio, sim)
}

/// Like [`mk_radio`] but after [`NRF24L01::init`]
pub fn mk_initialized_radio() -> (SimRadio, Sim) {
    let (mut radio, sim) = mk_radio();
    radio.init().unwrap();
    sim.reset_log();
    (radio, sim)
}

/// Driver wired to `embedded-hal-mock`
pub type MockRadio = NRF24L01<embedded_hal_mock::MockError, PinMock, PinMock, SpiMock>;

/// Build a driver whose bus and pins expect exactly the given traffic
///
/// `new` drives CE low and CSN high, those two are expected up front.
/// Every SPI transaction is framed by a CSN low/high pair, which is
/// expected for each entry of `spi_expectations`.
pub fn mk_mock_radio(ce_expectations: &[PinTransaction], spi_expectations: &[SpiTransaction]) -> MockRadio {
    let mut ce = vec![PinTransaction::set(PinState::Low)];
    ce.extend_from_slice(ce_expectations);
    let mut csn = vec![PinTransaction::set(PinState::High)];
    for _ in spi_expectations {
        csn.push(PinTransaction::set(PinState::Low));
        csn.push(PinTransaction::set(PinState::High));
    }

    let ce = PinMock::new(&ce);
    let csn = PinMock::new(&csn);
    let spi = SpiMock::new(spi_expectations);
    NRF24L01::new(ce, csn, spi).unwrap()
}

/// Give the mocks back and check that every expectation was met
pub fn done(radio: MockRadio) {
    let (mut ce, mut csn, mut spi) = radio.release();
    ce.done();
    csn.done();
    spi.done();
}
