//! SPI commands of the nRF24L01
//!
//! A command is serialized into one frame: the command byte followed by
//! its data bytes. The chip answers with the STATUS byte in place of the
//! command byte and, for reads, with the requested data in place of the
//! (zero) filler bytes.

use core::marker::PhantomData;

use crate::payload::Payload;
use crate::registers::Register;
use crate::MAX_PAYLOAD_LEN;

/// Read register, OR'd with the register address
pub const R_REGISTER: u8 = 0b0000_0000;
/// Write register, OR'd with the register address
pub const W_REGISTER: u8 = 0b0010_0000;
/// Bits of a register command that carry the address
pub const REGISTER_MASK: u8 = 0b0001_1111;
/// Read RX payload
pub const R_RX_PAYLOAD: u8 = 0b0110_0001;
/// Write TX payload
pub const W_TX_PAYLOAD: u8 = 0b1010_0000;
/// Flush TX FIFO
pub const FLUSH_TX: u8 = 0b1110_0001;
/// Flush RX FIFO
pub const FLUSH_RX: u8 = 0b1110_0010;
/// Reuse last transmitted payload
pub const REUSE_TX_PL: u8 = 0b1110_0011;
/// Activate the feature registers, followed by `ACTIVATE_KEY`
pub const ACTIVATE: u8 = 0b0101_0000;
/// Data byte that goes with `ACTIVATE`
pub const ACTIVATE_KEY: u8 = 0x73;
/// Read width of the payload at the head of the RX FIFO
pub const R_RX_PL_WID: u8 = 0b0110_0000;
/// Write ACK payload, OR'd with the pipe number
pub const W_ACK_PAYLOAD: u8 = 0b1010_1000;
/// Write TX payload with auto acknowledgement disabled
pub const W_TX_PAYLOAD_NOACK: u8 = 0b1011_0000;
/// No operation, clocks out STATUS
pub const NOP: u8 = 0b1111_1111;

/// Does `command` have to be followed by at least one data byte?
pub fn requires_data(command: u8) -> bool {
    match command {
        W_TX_PAYLOAD | W_TX_PAYLOAD_NOACK | ACTIVATE => true,
        c if c & !REGISTER_MASK == W_REGISTER => true,
        c if c & !0b111 == W_ACK_PAYLOAD => true,
        _ => false,
    }
}

/// A command with a typed response
pub trait Command {
    /// Bytes on the wire, command byte included
    fn len(&self) -> usize;

    /// Serialize into `buf`, which holds exactly `len()` zeroed bytes
    fn encode(&self, buf: &mut [u8]);

    /// Type of the data clocked out after the STATUS byte
    type Response;

    /// Parse the received frame, STATUS byte included
    fn decode_response(buf: &[u8]) -> Self::Response;
}

/// Read a typed register
pub struct ReadRegister<R: Register> {
    register: PhantomData<R>,
}

impl<R: Register> ReadRegister<R> {
    /// Read `R`
    pub fn new() -> Self {
        ReadRegister {
            register: PhantomData,
        }
    }
}

impl<R: Register> Command for ReadRegister<R> {
    fn len(&self) -> usize {
        1 + R::read_len()
    }

    fn encode(&self, buf: &mut [u8]) {
        buf[0] = R_REGISTER | (R::addr() & REGISTER_MASK);
    }

    type Response = R;

    fn decode_response(buf: &[u8]) -> Self::Response {
        R::decode(&buf[1..])
    }
}

/// Write a typed register
pub struct WriteRegister<R: Register> {
    register: R,
}

impl<R: Register> WriteRegister<R> {
    /// Write `register` to its address
    pub fn new(register: R) -> Self {
        WriteRegister { register }
    }
}

impl<R: Register> Command for WriteRegister<R> {
    fn len(&self) -> usize {
        1 + R::read_len()
    }

    fn encode(&self, buf: &mut [u8]) {
        buf[0] = W_REGISTER | (R::addr() & REGISTER_MASK);
        self.register.encode(&mut buf[1..]);
    }

    type Response = ();

    fn decode_response(_: &[u8]) -> Self::Response {}
}

/// Dequeue `len` bytes from the RX FIFO
pub struct ReadRxPayload {
    payload_width: usize,
}

impl ReadRxPayload {
    /// Read a payload of `payload_width` bytes
    pub fn new(payload_width: usize) -> Self {
        ReadRxPayload { payload_width }
    }
}

impl Command for ReadRxPayload {
    fn len(&self) -> usize {
        1 + self.payload_width
    }

    fn encode(&self, buf: &mut [u8]) {
        buf[0] = R_RX_PAYLOAD;
    }

    type Response = Payload;

    fn decode_response(buf: &[u8]) -> Self::Response {
        Payload::new(&buf[1..])
    }
}

/// Enqueue a payload into the TX FIFO
pub struct WriteTxPayload<'a> {
    data: &'a [u8],
}

impl<'a> WriteTxPayload<'a> {
    /// Enqueue `data`, 1 to 32 bytes
    pub fn new(data: &'a [u8]) -> Self {
        WriteTxPayload { data }
    }
}

impl<'a> Command for WriteTxPayload<'a> {
    fn len(&self) -> usize {
        1 + self.data.len()
    }

    fn encode(&self, buf: &mut [u8]) {
        buf[0] = W_TX_PAYLOAD;
        buf[1..].copy_from_slice(self.data);
    }

    type Response = ();

    fn decode_response(_: &[u8]) -> Self::Response {}
}

/// Enqueue a payload that the receiver must not acknowledge
pub struct WriteTxPayloadNoAck<'a> {
    data: &'a [u8],
}

impl<'a> WriteTxPayloadNoAck<'a> {
    /// Enqueue `data`, 1 to 32 bytes
    pub fn new(data: &'a [u8]) -> Self {
        WriteTxPayloadNoAck { data }
    }
}

impl<'a> Command for WriteTxPayloadNoAck<'a> {
    fn len(&self) -> usize {
        1 + self.data.len()
    }

    fn encode(&self, buf: &mut [u8]) {
        buf[0] = W_TX_PAYLOAD_NOACK;
        buf[1..].copy_from_slice(self.data);
    }

    type Response = ();

    fn decode_response(_: &[u8]) -> Self::Response {}
}

/// Queue a payload to be sent along with the next ACK on `pipe`
pub struct WriteAckPayload<'a> {
    pipe: u8,
    data: &'a [u8],
}

impl<'a> WriteAckPayload<'a> {
    /// Queue `data` for the next ACK on `pipe`
    pub fn new(pipe: u8, data: &'a [u8]) -> Self {
        WriteAckPayload { pipe, data }
    }
}

impl<'a> Command for WriteAckPayload<'a> {
    fn len(&self) -> usize {
        1 + self.data.len()
    }

    fn encode(&self, buf: &mut [u8]) {
        buf[0] = W_ACK_PAYLOAD | (self.pipe & 0b111);
        buf[1..].copy_from_slice(self.data);
    }

    type Response = ();

    fn decode_response(_: &[u8]) -> Self::Response {}
}

/// Width of the payload at the head of the RX FIFO
pub struct ReadRxPayloadWidth;

impl Command for ReadRxPayloadWidth {
    fn len(&self) -> usize {
        2
    }

    fn encode(&self, buf: &mut [u8]) {
        buf[0] = R_RX_PL_WID;
    }

    type Response = u8;

    fn decode_response(buf: &[u8]) -> Self::Response {
        buf[1]
    }
}

/// Unlock FEATURE, DYNPD and the extra commands on the nRF24L01
pub struct Activate;

impl Command for Activate {
    fn len(&self) -> usize {
        2
    }

    fn encode(&self, buf: &mut [u8]) {
        buf[0] = ACTIVATE;
        buf[1] = ACTIVATE_KEY;
    }

    type Response = ();

    fn decode_response(_: &[u8]) -> Self::Response {}
}

macro_rules! def_simple_command {
    ($(#[$doc: meta])* $name: ident, $opcode: expr) => {
        $(#[$doc])*
        pub struct $name;

        impl Command for $name {
            fn len(&self) -> usize {
                1
            }

            fn encode(&self, buf: &mut [u8]) {
                buf[0] = $opcode;
            }

            type Response = ();

            fn decode_response(_: &[u8]) -> Self::Response {}
        }
    };
}

def_simple_command!(
    /// Discard the TX FIFO
    FlushTx,
    FLUSH_TX
);
def_simple_command!(
    /// Discard the RX FIFO
    FlushRx,
    FLUSH_RX
);
def_simple_command!(
    /// Retransmit the last payload for as long as CE is high
    ReuseTxPayload,
    REUSE_TX_PL
);
def_simple_command!(
    /// Only clocks out STATUS
    Nop,
    NOP
);

/// Longest frame: command byte plus a full payload
pub const MAX_FRAME_LEN: usize = 1 + MAX_PAYLOAD_LEN;
