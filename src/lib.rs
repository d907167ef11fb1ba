// Copyright 2018, Astro <astro@spaceboyz.net>
//
// Licensed under the Apache License, Version 2.0 <LICENSE>. This file
// may not be copied, modified, or distributed except according to
// those terms.

//! nRF24L01 register level driver for use with [embedded-hal](https://crates.io/crates/embedded-hal)
//!
//! The driver owns the SPI bus and the CE and CSN pins of exactly one
//! transceiver. Every operation is a sequence of CSN-framed SPI
//! transactions; completion is detected by polling STATUS, there is no
//! interrupt handling.
//!
//! Typical use:
//!
//! 1. [`NRF24L01::new`] and [`NRF24L01::init`] to reach a known state,
//! 2. [`Configuration`] to pick channel, rate, power and addresses,
//! 3. [`Tx::send`] or [`ChangeModes::enable_rx_mode`] with [`Rx::read`].
//!
//! The driver is not reentrant. Share it between contexts only behind a
//! mutex.

#![warn(missing_docs, unused)]
#![cfg_attr(not(test), no_std)]
#[macro_use]
extern crate bitfield;

use core::fmt;
use core::fmt::Debug;

use bitflags::bitflags;
use embedded_hal::blocking::spi::Transfer as SpiTransfer;
use embedded_hal::digital::v2::OutputPin;

macro_rules! trace {
    ($($arg: tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::trace!($($arg)*);
    };
}

macro_rules! debug {
    ($($arg: tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::debug!($($arg)*);
    };
}

mod config;
pub use crate::config::{
    ard_code, arc_code, aw_code, Configuration, CrcMode, DataRate, PALevel, RadioConfig,
    RetransmitConfig, MAX_RF_CHANNEL,
};

pub mod registers;
use crate::registers::{
    Cd, Dynpd, EnAa, EnRxaddr, Feature, FifoStatus, ObserveTx, Register, RfCh, RfSetup,
    SetupAw, SetupRetr, Status,
};
pub mod command;
use crate::command::{
    Activate, Command, FlushRx, FlushTx, Nop, ReadRegister, ReadRxPayload, ReadRxPayloadWidth,
    ReuseTxPayload, WriteAckPayload, WriteRegister, WriteTxPayload, WriteTxPayloadNoAck,
    MAX_FRAME_LEN, R_REGISTER, R_RX_PAYLOAD, W_REGISTER,
};
mod payload;
pub use crate::payload::Payload;
mod error;
pub use crate::error::Error;
mod chip_select;
use crate::chip_select::ChipSelect;
mod deadline;
pub use crate::deadline::{Deadline, DeadlineFn, Forever, PollBudget};

mod device;
pub use crate::device::Device;
mod rx;
pub use crate::rx::Rx;
mod tx;
pub use crate::tx::{Tx, TxOutcome};
mod mode;
pub use crate::mode::{ChangeModes, Mode};

#[cfg(test)]
mod test;

/// Number of RX pipes with configurable addresses
pub const PIPES_COUNT: usize = 6;
/// Minimum address length
pub const MIN_ADDR_BYTES: usize = 3;
/// Maximum address length
pub const MAX_ADDR_BYTES: usize = 5;
/// Size of one FIFO slot
pub const MAX_PAYLOAD_LEN: usize = 32;

bitflags! {
    /// Interrupt flags as laid out in STATUS
    ///
    /// The same bit positions mask the interrupts in CONFIG.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Interrupts: u8 {
        /// Data ready in the RX FIFO
        const RX_DR = 1 << 6;
        /// Payload sent (and acknowledged, with auto-ack)
        const TX_DS = 1 << 5;
        /// Retransmit budget exhausted
        const MAX_RT = 1 << 4;
    }
}

/// Driver for the nRF24L01
///
/// The single handle for one transceiver. Its behaviour is split over the
/// traits [`Device`], [`ChangeModes`], [`Rx`], [`Tx`] and
/// [`Configuration`].
pub struct NRF24L01<E: Debug, CE: OutputPin<Error = E>, CSN: OutputPin<Error = E>, SPI: SpiTransfer<u8>> {
    ce: CE,
    csn: CSN,
    spi: SPI,
    status: Status,
    mode: Option<Mode>,
    features_activated: bool,
}

impl<E: Debug, CE: OutputPin<Error = E>, CSN: OutputPin<Error = E>, SPI: SpiTransfer<u8, Error = SPIE>, SPIE: Debug> fmt::Debug
    for NRF24L01<E, CE, CSN, SPI>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NRF24L01({:?}, {:?})", self.mode, self.status)
    }
}

impl<E: Debug, CE: OutputPin<Error = E>, CSN: OutputPin<Error = E>, SPI: SpiTransfer<u8, Error = SPIE>, SPIE: Debug>
    NRF24L01<E, CE, CSN, SPI>
{
    /// Construct a new driver instance.
    ///
    /// Drives CE low and CSN high but does not talk to the chip, whose
    /// state stays unknown until [`init`](NRF24L01::init).
    pub fn new(mut ce: CE, mut csn: CSN, spi: SPI) -> Result<Self, Error<SPIE, E>> {
        ce.set_low().map_err(Error::<SPIE, E>::PinError)?;
        csn.set_high().map_err(Error::<SPIE, E>::PinError)?;

        Ok(NRF24L01 {
            ce,
            csn,
            spi,
            status: Status::from_bits(0),
            mode: None,
            features_activated: false,
        })
    }

    /// Bring every register to the defaults of [`RadioConfig`]
    pub fn init(&mut self) -> Result<(), Error<SPIE, E>> {
        self.init_with(&RadioConfig::default())
    }

    /// Flush both FIFOs, drop CE and write every register from `config`
    ///
    /// Leaves the chip powered up in Standby. The oscillator needs up to
    /// 1.5ms after this before RX or TX can be armed.
    pub fn init_with(&mut self, config: &RadioConfig) -> Result<(), Error<SPIE, E>> {
        if !config.is_valid() {
            return Err(Error::InvalidArgument);
        }

        self.flush_tx()?;
        self.flush_rx()?;
        self.ce_disable()?;

        self.write_register(config.config_register())?;
        self.write_register(EnAa::from_bools(&config.auto_ack_pipes))?;
        self.write_register(EnRxaddr::from_bools(&config.rx_pipes))?;
        let mut setup_aw = SetupAw::from_bits(0);
        setup_aw.set_aw(aw_code(config.address_width));
        self.write_register(setup_aw)?;
        self.write_register(config.retransmit.to_register())?;
        let mut rf_ch = RfCh::from_bits(0);
        rf_ch.set_rf_ch(config.rf_channel);
        self.write_register(rf_ch)?;
        self.write_register(config.rf_setup_register())?;
        self.clear_interrupts(Interrupts::all())?;

        self.write_register_multi(registers::RX_ADDR_P0, &config.rx_addr_p0)?;
        self.write_register_multi(registers::RX_ADDR_P1, &config.rx_addr_p1)?;
        for (addr, lsb) in (registers::RX_ADDR_P2..=registers::RX_ADDR_P5).zip(config.rx_addr_lsb.iter()) {
            self.write_register_8(addr, *lsb)?;
        }
        self.write_register_multi(registers::TX_ADDR, &config.tx_addr)?;
        for addr in registers::RX_PW_P0..=registers::RX_PW_P5 {
            self.write_register_8(addr, 0)?;
        }
        self.write_register(Dynpd(0))?;
        self.write_register(Feature::from_bits(0))?;

        self.mode = Some(Mode::Standby);
        debug!("nRF24L01 registers initialized");
        Ok(())
    }

    /// Reads and validates content of the `SETUP_AW` register.
    pub fn is_connected(&mut self) -> Result<bool, Error<SPIE, E>> {
        let (_, setup_aw) = self.read_register::<SetupAw>()?;
        let valid = (1..=3).contains(&setup_aw.aw());
        Ok(valid)
    }

    /// Give back CE, CSN and the SPI bus
    pub fn release(self) -> (CE, CSN, SPI) {
        (self.ce, self.csn, self.spi)
    }

    fn check_payload(payload: &[u8]) -> Result<(), Error<SPIE, E>> {
        if payload.is_empty() || payload.len() > MAX_PAYLOAD_LEN {
            Err(Error::InvalidArgument)
        } else {
            Ok(())
        }
    }

    fn check_standby(&self) -> Result<(), Error<SPIE, E>> {
        match self.mode {
            Some(Mode::Rx) | Some(Mode::Tx) => Err(Error::WrongMode),
            _ => Ok(()),
        }
    }

    fn activate_features(&mut self) -> Result<(), Error<SPIE, E>> {
        // ACTIVATE toggles on the nRF24L01, send it only once
        if !self.features_activated {
            self.send_command(&Activate)?;
            self.features_activated = true;
        }
        Ok(())
    }

    fn payload_width_of(&mut self, pipe: usize) -> Result<u8, Error<SPIE, E>> {
        let (_, dynpd) = self.read_register::<Dynpd>()?;
        if dynpd.pipe(pipe) {
            self.rx_payload_width()
        } else {
            self.pipe_payload_width(pipe)
        }
    }

    /// Pipe and width of the payload at the head of the RX FIFO
    ///
    /// Reads FIFO_STATUS instead of trusting RX_DR, which stays clear
    /// while further payloads are still queued. A head whose width is 0
    /// or above 32 can never be dequeued, so the RX FIFO is flushed.
    fn rx_head(&mut self) -> Result<Option<(u8, usize)>, Error<SPIE, E>> {
        let (status, fifo_status) = self.read_register::<FifoStatus>()?;
        let pipe = status.rx_p_no();
        if fifo_status.rx_empty() || pipe as usize >= PIPES_COUNT {
            return Ok(None);
        }

        let width = self.payload_width_of(pipe as usize)? as usize;
        if width == 0 || width > MAX_PAYLOAD_LEN {
            debug!("nRF24L01 flushing RX, pipe {} width {}", pipe, width);
            self.flush_rx()?;
            return Ok(None);
        }
        Ok(Some((pipe, width)))
    }

    fn leave_armed_mode(&mut self) {
        self.mode = match self.mode {
            Some(Mode::Rx) | Some(Mode::Tx) => Some(Mode::Standby),
            mode => mode,
        };
    }
}

impl<E: Debug, CE: OutputPin<Error = E>, CSN: OutputPin<Error = E>, SPI: SpiTransfer<u8, Error = SPIE>, SPIE: Debug> Device
    for NRF24L01<E, CE, CSN, SPI>
{
    type Error = Error<SPIE, E>;

    fn ce_enable(&mut self) -> Result<(), Self::Error> {
        self.ce.set_high().map_err(Error::PinError)
    }

    fn ce_disable(&mut self) -> Result<(), Self::Error> {
        self.ce.set_low().map_err(Error::PinError)
    }

    fn transfer(&mut self, frame: &mut [u8]) -> Result<Status, Self::Error> {
        if frame.is_empty() {
            return Err(Error::InvalidArgument);
        }

        // SPI transaction
        let selected = ChipSelect::select(&mut self.csn).map_err(Error::<SPIE, E>::PinError)?;
        let transfer_result = self.spi.transfer(frame).map(|_| {});
        let release_result = selected.release();
        // Propagate Err only after csn.set_high(), the bus error first
        transfer_result?;
        release_result.map_err(Error::<SPIE, E>::PinError)?;

        self.status = Status::from_bits(frame[0]);
        Ok(self.status)
    }

    fn send_command<C: Command>(
        &mut self,
        command: &C,
    ) -> Result<(Status, C::Response), Self::Error> {
        // Allocate storage
        let mut buf_storage = [0; MAX_FRAME_LEN];
        let len = command.len();
        let buf = buf_storage.get_mut(0..len).ok_or(Error::<SPIE, E>::InvalidArgument)?;
        // Serialize the command
        command.encode(buf);

        let status = self.transfer(buf)?;

        // Parse response
        let response = C::decode_response(buf);
        Ok((status, response))
    }

    fn last_status(&self) -> Status {
        self.status
    }

    fn get_status(&mut self) -> Result<Status, Self::Error> {
        let (status, ()) = self.send_command(&Nop)?;
        Ok(status)
    }

    fn read_register_8(&mut self, addr: u8) -> Result<u8, Self::Error> {
        if addr > registers::MAX_ADDR {
            return Err(Error::InvalidArgument);
        }
        let mut frame = [R_REGISTER | addr, 0];
        self.transfer(&mut frame)?;
        Ok(frame[1])
    }

    fn read_register_multi(&mut self, addr: u8, buf: &mut [u8]) -> Result<Status, Self::Error> {
        if addr > registers::MAX_ADDR {
            return Err(Error::InvalidArgument);
        }
        self.read_raw_command(R_REGISTER | addr, buf)
    }

    fn write_register_8(&mut self, addr: u8, value: u8) -> Result<Status, Self::Error> {
        if addr > registers::MAX_ADDR {
            return Err(Error::InvalidArgument);
        }
        let mut frame = [W_REGISTER | addr, value];
        self.transfer(&mut frame)
    }

    fn write_register_multi(&mut self, addr: u8, data: &[u8]) -> Result<Status, Self::Error> {
        if addr > registers::MAX_ADDR {
            return Err(Error::InvalidArgument);
        }
        self.send_raw_command(W_REGISTER | addr, data)
    }

    fn send_raw_command(&mut self, command: u8, payload: &[u8]) -> Result<Status, Self::Error> {
        if payload.len() > MAX_PAYLOAD_LEN || (payload.is_empty() && crate::command::requires_data(command)) {
            return Err(Error::InvalidArgument);
        }
        let mut storage = [0; MAX_FRAME_LEN];
        let frame = &mut storage[..=payload.len()];
        frame[0] = command;
        frame[1..].copy_from_slice(payload);
        self.transfer(frame)
    }

    fn read_raw_command(&mut self, command: u8, buf: &mut [u8]) -> Result<Status, Self::Error> {
        if buf.is_empty() || buf.len() > MAX_PAYLOAD_LEN {
            return Err(Error::InvalidArgument);
        }
        let mut storage = [0; MAX_FRAME_LEN];
        let frame = &mut storage[..=buf.len()];
        frame[0] = command;
        let status = self.transfer(frame)?;
        buf.copy_from_slice(&frame[1..]);
        Ok(status)
    }

    fn read_register<R: Register>(&mut self) -> Result<(Status, R), Self::Error> {
        self.send_command(&ReadRegister::new())
    }

    fn write_register<R: Register>(&mut self, register: R) -> Result<Status, Self::Error> {
        let (status, ()) = self.send_command(&WriteRegister::new(register))?;
        Ok(status)
    }

    fn update_register<R, F, T>(&mut self, f: F) -> Result<T, Self::Error>
    where
        R: Register + Copy + PartialEq,
        F: FnOnce(&mut R) -> T,
    {
        let (_, old) = self.read_register::<R>()?;
        // Mutate
        let mut register = old;
        let result = f(&mut register);

        if register != old {
            self.write_register(register)?;
        }
        Ok(result)
    }
}

impl<E: Debug, CE: OutputPin<Error = E>, CSN: OutputPin<Error = E>, SPI: SpiTransfer<u8, Error = SPIE>, SPIE: Debug> ChangeModes
    for NRF24L01<E, CE, CSN, SPI>
{
    type Error = Error<SPIE, E>;

    fn mode(&self) -> Option<Mode> {
        self.mode
    }

    fn power_down(&mut self) -> Result<(), Self::Error> {
        self.update_config(|config| config.set_pwr_up(false))?;
        self.ce_disable()?;
        self.mode = Some(Mode::PowerDown);
        trace!("nRF24L01 mode: power down");
        Ok(())
    }

    fn power_up(&mut self) -> Result<(), Self::Error> {
        self.update_config(|config| config.set_pwr_up(true))?;
        match self.mode {
            Some(Mode::Rx) | Some(Mode::Tx) => {}
            _ => self.mode = Some(Mode::Standby),
        }
        trace!("nRF24L01 mode: standby");
        Ok(())
    }

    fn enable_rx_mode(&mut self) -> Result<(), Self::Error> {
        if self.mode == Some(Mode::Tx) {
            self.ce_disable()?;
        }
        self.update_config(|config| {
            config.set_pwr_up(true);
            config.set_prim_rx(true);
        })?;
        self.ce_enable()?;
        self.mode = Some(Mode::Rx);
        trace!("nRF24L01 mode: rx");
        Ok(())
    }

    fn disable_rx_mode(&mut self) -> Result<(), Self::Error> {
        self.ce_disable()?;
        self.leave_armed_mode();
        Ok(())
    }

    fn enable_tx_mode(&mut self) -> Result<(), Self::Error> {
        if self.mode == Some(Mode::Rx) {
            self.ce_disable()?;
        }
        self.clear_interrupts(Interrupts::TX_DS | Interrupts::MAX_RT)?;
        self.update_config(|config| {
            config.set_pwr_up(true);
            config.set_prim_rx(false);
        })?;
        self.ce_enable()?;
        self.mode = Some(Mode::Tx);
        trace!("nRF24L01 mode: tx");
        Ok(())
    }

    fn disable_tx_mode(&mut self) -> Result<(), Self::Error> {
        self.ce_disable()?;
        self.clear_interrupts(Interrupts::TX_DS | Interrupts::MAX_RT)?;
        self.leave_armed_mode();
        Ok(())
    }
}

impl<E: Debug, CE: OutputPin<Error = E>, CSN: OutputPin<Error = E>, SPI: SpiTransfer<u8, Error = SPIE>, SPIE: Debug> Rx
    for NRF24L01<E, CE, CSN, SPI>
{
    type Error = Error<SPIE, E>;

    fn flush_rx(&mut self) -> Result<(), Self::Error> {
        self.send_command(&FlushRx)?;
        Ok(())
    }

    fn is_rx_fifo_empty(&mut self) -> Result<bool, Self::Error> {
        self.read_register::<FifoStatus>()
            .map(|(_, fifo_status)| fifo_status.rx_empty())
    }

    fn is_rx_fifo_full(&mut self) -> Result<bool, Self::Error> {
        self.read_register::<FifoStatus>()
            .map(|(_, fifo_status)| fifo_status.rx_full())
    }

    fn pipe_payload_width(&mut self, pipe: usize) -> Result<u8, Self::Error> {
        match registers::rx_pw(pipe) {
            Some(addr) => Ok(self.read_register_8(addr)? & 0x3F),
            None => Ok(0),
        }
    }

    fn rx_payload_width(&mut self) -> Result<u8, Self::Error> {
        let (_, width) = self.send_command(&ReadRxPayloadWidth)?;
        Ok(width)
    }

    fn data_ready(&mut self) -> Result<Option<u8>, Self::Error> {
        let status = self.get_status()?;
        let pipe = status.rx_p_no();
        if status.rx_dr() && (pipe as usize) < PIPES_COUNT {
            Ok(Some(pipe))
        } else {
            Ok(None)
        }
    }

    fn wait_for_data<D: Deadline>(&mut self, deadline: &mut D) -> Result<Option<u8>, Self::Error> {
        self.enable_rx_mode()?;

        let result = loop {
            match self.data_ready() {
                Ok(Some(pipe)) => break Ok(Some(pipe)),
                Ok(None) if deadline.expired() => break Ok(None),
                Ok(None) => {}
                Err(err) => break Err(err),
            }
        };

        self.disable_rx_mode()?;
        result
    }

    fn dequeue_rx_payload(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.read_raw_command(R_RX_PAYLOAD, buf)?;
        Ok(())
    }

    fn read(&mut self) -> Result<Option<Payload>, Self::Error> {
        let width = match self.rx_head()? {
            Some((_, width)) => width,
            None => return Ok(None),
        };

        let (_, payload) = self.send_command(&ReadRxPayload::new(width))?;
        self.clear_interrupts(Interrupts::RX_DR)?;
        Ok(Some(payload))
    }

    fn read_pipe(&mut self, pipe: u8, buf: &mut [u8]) -> Result<Option<usize>, Self::Error> {
        if pipe as usize >= PIPES_COUNT {
            return Err(Error::InvalidArgument);
        }
        let width = match self.rx_head()? {
            Some((head, width)) if head == pipe => width,
            _ => return Ok(None),
        };
        if buf.len() < width {
            return Err(Error::BufferTooSmall);
        }

        self.dequeue_rx_payload(&mut buf[..width])?;
        self.clear_interrupts(Interrupts::RX_DR)?;
        Ok(Some(width))
    }

    fn has_carrier(&mut self) -> Result<bool, Self::Error> {
        self.read_register::<Cd>().map(|(_, cd)| cd.cd())
    }
}

impl<E: Debug, CE: OutputPin<Error = E>, CSN: OutputPin<Error = E>, SPI: SpiTransfer<u8, Error = SPIE>, SPIE: Debug> Tx
    for NRF24L01<E, CE, CSN, SPI>
{
    type Error = Error<SPIE, E>;

    fn flush_tx(&mut self) -> Result<(), Self::Error> {
        self.send_command(&FlushTx)?;
        Ok(())
    }

    fn is_tx_fifo_empty(&mut self) -> Result<bool, Self::Error> {
        let (_, fifo_status) = self.read_register::<FifoStatus>()?;
        Ok(fifo_status.tx_empty())
    }

    fn is_tx_fifo_full(&mut self) -> Result<bool, Self::Error> {
        let (_, fifo_status) = self.read_register::<FifoStatus>()?;
        Ok(fifo_status.tx_full())
    }

    fn enqueue_tx_payload(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        Self::check_payload(payload)?;
        if self.is_tx_fifo_full()? {
            debug!("nRF24L01 TX FIFO full");
            return Err(Error::TxFifoFull);
        }

        self.send_command(&WriteTxPayload::new(payload))?;
        Ok(())
    }

    fn enqueue_tx_payload_no_ack(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        Self::check_payload(payload)?;
        if self.is_tx_fifo_full()? {
            debug!("nRF24L01 TX FIFO full");
            return Err(Error::TxFifoFull);
        }

        self.send_command(&WriteTxPayloadNoAck::new(payload))?;
        Ok(())
    }

    fn write_ack_payload(&mut self, pipe: u8, payload: &[u8]) -> Result<(), Self::Error> {
        if pipe as usize >= PIPES_COUNT {
            return Err(Error::InvalidArgument);
        }
        Self::check_payload(payload)?;
        if self.is_tx_fifo_full()? {
            debug!("nRF24L01 TX FIFO full");
            return Err(Error::TxFifoFull);
        }

        self.send_command(&WriteAckPayload::new(pipe, payload))?;
        Ok(())
    }

    fn reuse_tx_payload(&mut self) -> Result<(), Self::Error> {
        self.send_command(&ReuseTxPayload)?;
        Ok(())
    }

    fn poll_tx_complete(&mut self) -> nb::Result<TxOutcome, Self::Error> {
        let status = self.get_status()?;
        if status.tx_ds() {
            Ok(TxOutcome::Succeeded)
        } else if status.max_rt() {
            Ok(TxOutcome::Failed)
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    fn wait_for_tx_complete<D: Deadline>(
        &mut self,
        blocking: bool,
        deadline: &mut D,
    ) -> Result<TxOutcome, Self::Error> {
        let outcome = loop {
            match self.poll_tx_complete() {
                Ok(outcome) => break outcome,
                Err(nb::Error::Other(err)) => return Err(err),
                Err(nb::Error::WouldBlock) if !blocking => break TxOutcome::Pending,
                Err(nb::Error::WouldBlock) if deadline.expired() => break TxOutcome::DeadlineExceeded,
                Err(nb::Error::WouldBlock) => {}
            }
        };
        trace!("nRF24L01 tx outcome: {}", outcome);
        Ok(outcome)
    }

    fn submit(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        Self::check_payload(payload)?;

        // The ACK comes back to the TX address on pipe 0
        let (_, en_aa) = self.read_register::<EnAa>()?;
        if en_aa.pipe(0) {
            let mut address = [0; MAX_ADDR_BYTES];
            self.read_register_multi(registers::TX_ADDR, &mut address)?;
            self.set_rx_address(0, &address)?;
        }

        self.enqueue_tx_payload(payload)
    }

    fn attempt_tx<D: Deadline>(&mut self, deadline: &mut D) -> Result<TxOutcome, Self::Error> {
        self.enable_tx_mode()?;
        let outcome = self.wait_for_tx_complete(true, deadline);
        self.disable_tx_mode()?;
        self.power_down()?;
        outcome
    }

    fn send<D: Deadline>(&mut self, payload: &[u8], deadline: &mut D) -> Result<TxOutcome, Self::Error> {
        self.submit(payload)?;
        self.attempt_tx(deadline)
    }

    fn send_to<D: Deadline>(
        &mut self,
        address: &[u8; 5],
        payload: &[u8],
        deadline: &mut D,
    ) -> Result<TxOutcome, Self::Error> {
        Self::check_payload(payload)?;
        self.set_tx_address(address)?;
        self.send(payload, deadline)
    }

    fn observe(&mut self) -> Result<ObserveTx, Self::Error> {
        let (_, observe_tx) = self.read_register()?;
        Ok(observe_tx)
    }
}

impl<E: Debug, CE: OutputPin<Error = E>, CSN: OutputPin<Error = E>, SPI: SpiTransfer<u8, Error = SPIE>, SPIE: Debug> Configuration
    for NRF24L01<E, CE, CSN, SPI>
{
    type Error = Error<SPIE, E>;

    fn set_rf_channel(&mut self, channel: u8) -> Result<(), Self::Error> {
        if channel > MAX_RF_CHANNEL {
            return Err(Error::InvalidArgument);
        }
        let mut rf_ch = RfCh::from_bits(0);
        rf_ch.set_rf_ch(channel);
        self.write_register(rf_ch)?;
        Ok(())
    }

    fn rf_channel(&mut self) -> Result<u8, Self::Error> {
        let (_, rf_ch) = self.read_register::<RfCh>()?;
        Ok(rf_ch.rf_ch())
    }

    fn set_air_data_rate(&mut self, rate: DataRate) -> Result<(), Self::Error> {
        self.update_register::<RfSetup, _, _>(|rf_setup| rf_setup.set_rf_dr(rate == DataRate::R2Mbps))
    }

    fn air_data_rate(&mut self) -> Result<DataRate, Self::Error> {
        let (_, rf_setup) = self.read_register::<RfSetup>()?;
        if rf_setup.rf_dr() {
            Ok(DataRate::R2Mbps)
        } else {
            Ok(DataRate::R1Mbps)
        }
    }

    fn set_pa_gain(&mut self, level: PALevel) -> Result<(), Self::Error> {
        self.update_register::<RfSetup, _, _>(|rf_setup| rf_setup.set_rf_pwr(level.rf_pwr()))
    }

    fn pa_gain(&mut self) -> Result<PALevel, Self::Error> {
        let (_, rf_setup) = self.read_register::<RfSetup>()?;
        Ok(PALevel::from_rf_pwr(rf_setup.rf_pwr()))
    }

    fn set_lna_gain(&mut self, enabled: bool) -> Result<(), Self::Error> {
        self.update_register::<RfSetup, _, _>(|rf_setup| rf_setup.set_lna_hcurr(enabled))
    }

    fn set_tx_address(&mut self, address: &[u8; 5]) -> Result<(), Self::Error> {
        self.write_register_multi(registers::TX_ADDR, address)?;
        Ok(())
    }

    fn set_rx_address(&mut self, pipe: usize, address: &[u8]) -> Result<(), Self::Error> {
        let addr = match registers::rx_addr(pipe) {
            Some(addr) => addr,
            None => return Ok(()),
        };
        if pipe < 2 {
            if address.len() != MAX_ADDR_BYTES {
                return Err(Error::InvalidArgument);
            }
            self.write_register_multi(addr, address)?;
        } else {
            let lsb = address.first().ok_or(Error::<SPIE, E>::InvalidArgument)?;
            self.write_register_8(addr, *lsb)?;
        }
        Ok(())
    }

    fn set_rx_payload_width(&mut self, pipe: usize, width: u8) -> Result<(), Self::Error> {
        let addr = registers::rx_pw(pipe).ok_or(Error::<SPIE, E>::InvalidArgument)?;
        if width as usize > MAX_PAYLOAD_LEN {
            return Err(Error::InvalidArgument);
        }
        self.write_register_8(addr, width)?;
        Ok(())
    }

    fn set_retransmit_count(&mut self, count: u8) -> Result<(), Self::Error> {
        self.update_register::<SetupRetr, _, _>(|setup_retr| setup_retr.set_arc(arc_code(count)))
    }

    fn set_retransmit_delay(&mut self, delay_us: u16) -> Result<(), Self::Error> {
        self.update_register::<SetupRetr, _, _>(|setup_retr| setup_retr.set_ard(ard_code(delay_us)))
    }

    fn set_address_width(&mut self, width: u8) -> Result<(), Self::Error> {
        let mut setup_aw = SetupAw::from_bits(0);
        setup_aw.set_aw(aw_code(width));
        self.write_register(setup_aw)?;
        Ok(())
    }

    fn address_width(&mut self) -> Result<u8, Self::Error> {
        let (_, setup_aw) = self.read_register::<SetupAw>()?;
        Ok(setup_aw.aw() + 2)
    }

    fn set_crc_mode(&mut self, mode: CrcMode) -> Result<(), Self::Error> {
        self.update_config(|config| mode.apply(config))
    }

    fn set_interrupt_mask(&mut self, mask: Interrupts) -> Result<(), Self::Error> {
        self.update_config(|config| {
            config.set_mask_rx_dr(mask.contains(Interrupts::RX_DR));
            config.set_mask_tx_ds(mask.contains(Interrupts::TX_DS));
            config.set_mask_max_rt(mask.contains(Interrupts::MAX_RT));
        })
    }

    fn set_auto_ack(&mut self, pipes: &[bool; PIPES_COUNT]) -> Result<(), Self::Error> {
        self.write_register(EnAa::from_bools(pipes))?;
        Ok(())
    }

    fn set_rx_pipes_enabled(&mut self, pipes: &[bool; PIPES_COUNT]) -> Result<(), Self::Error> {
        self.write_register(EnRxaddr::from_bools(pipes))?;
        Ok(())
    }

    fn enable_dynamic_payload(&mut self, pipe: usize) -> Result<(), Self::Error> {
        if pipe >= PIPES_COUNT {
            return Err(Error::InvalidArgument);
        }
        self.check_standby()?;
        self.activate_features()?;
        self.update_register::<Feature, _, _>(|feature| feature.set_en_dpl(true))?;
        self.update_register::<Dynpd, _, _>(|dynpd| dynpd.set_pipe(pipe, true))
    }

    fn enable_ack_payload(&mut self) -> Result<(), Self::Error> {
        self.enable_dynamic_payload(0)?;
        // 250µs is too short to receive an ACK carrying a payload
        let (_, setup_retr) = self.read_register::<SetupRetr>()?;
        if setup_retr.ard() == 0 {
            self.set_retransmit_delay(500)?;
        }
        self.update_register::<Feature, _, _>(|feature| feature.set_en_ack_pay(true))
    }

    fn enable_no_ack_tx(&mut self) -> Result<(), Self::Error> {
        self.check_standby()?;
        self.activate_features()?;
        self.update_register::<Feature, _, _>(|feature| feature.set_en_dyn_ack(true))
    }
}
