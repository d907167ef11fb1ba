//! Register map of the nRF24L01
//!
//! Every register is addressed by one of the constants below. The 8-bit
//! registers that the driver inspects bit by bit also get a
//! [`bitfield`](https://crates.io/crates/bitfield) struct implementing
//! [`Register`]. Address registers (`RX_ADDR_P0`, `RX_ADDR_P1`, `TX_ADDR`)
//! are up to 5 bytes wide and are only accessed through the raw
//! multi-byte operations of [`Device`](crate::Device).

use crate::PIPES_COUNT;

/// Configuration register
pub const CONFIG: u8 = 0x00;
/// Enable auto acknowledgement
pub const EN_AA: u8 = 0x01;
/// Enabled RX addresses
pub const EN_RXADDR: u8 = 0x02;
/// Address width
pub const SETUP_AW: u8 = 0x03;
/// Automatic retransmission
pub const SETUP_RETR: u8 = 0x04;
/// RF channel
pub const RF_CH: u8 = 0x05;
/// RF setup
pub const RF_SETUP: u8 = 0x06;
/// Status
pub const STATUS: u8 = 0x07;
/// Transmit observe
pub const OBSERVE_TX: u8 = 0x08;
/// Carrier detect
pub const CD: u8 = 0x09;
/// Receive address of pipe 0 (5 bytes)
pub const RX_ADDR_P0: u8 = 0x0A;
/// Receive address of pipe 1 (5 bytes)
pub const RX_ADDR_P1: u8 = 0x0B;
/// Receive address of pipe 2 (low byte only)
pub const RX_ADDR_P2: u8 = 0x0C;
/// Receive address of pipe 3 (low byte only)
pub const RX_ADDR_P3: u8 = 0x0D;
/// Receive address of pipe 4 (low byte only)
pub const RX_ADDR_P4: u8 = 0x0E;
/// Receive address of pipe 5 (low byte only)
pub const RX_ADDR_P5: u8 = 0x0F;
/// Transmit address (5 bytes)
pub const TX_ADDR: u8 = 0x10;
/// Static payload width of pipe 0
pub const RX_PW_P0: u8 = 0x11;
/// Static payload width of pipe 1
pub const RX_PW_P1: u8 = 0x12;
/// Static payload width of pipe 2
pub const RX_PW_P2: u8 = 0x13;
/// Static payload width of pipe 3
pub const RX_PW_P3: u8 = 0x14;
/// Static payload width of pipe 4
pub const RX_PW_P4: u8 = 0x15;
/// Static payload width of pipe 5
pub const RX_PW_P5: u8 = 0x16;
/// FIFO status
pub const FIFO_STATUS: u8 = 0x17;
/// Enable dynamic payload length
pub const DYNPD: u8 = 0x1C;
/// Feature register
pub const FEATURE: u8 = 0x1D;

/// Highest valid register address
pub const MAX_ADDR: u8 = FEATURE;

/// Address of the receive address register of `pipe`
pub fn rx_addr(pipe: usize) -> Option<u8> {
    if pipe < PIPES_COUNT {
        Some(RX_ADDR_P0 + pipe as u8)
    } else {
        None
    }
}

/// Address of the static payload width register of `pipe`
pub fn rx_pw(pipe: usize) -> Option<u8> {
    if pipe < PIPES_COUNT {
        Some(RX_PW_P0 + pipe as u8)
    } else {
        None
    }
}

/// A register with a fixed address and width that can be (de)serialized
/// from the bytes following the command byte.
pub trait Register {
    /// Address in the register map
    fn addr() -> u8;
    /// Number of data bytes
    fn read_len() -> usize;
    /// Serialize into `buf`, which holds exactly `read_len()` bytes
    fn encode(&self, buf: &mut [u8]);
    /// Deserialize from `buf`, which holds exactly `read_len()` bytes
    fn decode(buf: &[u8]) -> Self;
}

macro_rules! def_register {
    ($name: ident, $addr: expr) => {
        impl Register for $name {
            fn addr() -> u8 {
                $addr
            }

            fn read_len() -> usize {
                1
            }

            fn encode(&self, buf: &mut [u8]) {
                buf[0] = self.0;
            }

            fn decode(buf: &[u8]) -> Self {
                $name(buf[0])
            }
        }

        impl $name {
            /// Wrap a raw register value
            pub fn from_bits(bits: u8) -> Self {
                $name(bits)
            }

            /// Raw register value
            pub fn bits(&self) -> u8 {
                self.0
            }
        }
    };
}

/// One enable bit per pipe in bits 0..=5
macro_rules! def_pipe_bits {
    ($name: ident) => {
        impl $name {
            /// Build from one flag per pipe
            pub fn from_bools(pipes: &[bool; PIPES_COUNT]) -> Self {
                let mut value = 0;
                for (pipe, enabled) in pipes.iter().enumerate() {
                    if *enabled {
                        value |= 1 << pipe;
                    }
                }
                $name(value)
            }

            /// One flag per pipe
            pub fn to_bools(&self) -> [bool; PIPES_COUNT] {
                let mut pipes = [false; PIPES_COUNT];
                for (pipe, enabled) in pipes.iter_mut().enumerate() {
                    *enabled = self.pipe(pipe);
                }
                pipes
            }

            /// Is the bit of `pipe` set? Out-of-range pipes read as unset.
            pub fn pipe(&self, pipe: usize) -> bool {
                pipe < PIPES_COUNT && self.0 & (1 << pipe) != 0
            }

            /// Set or clear the bit of `pipe`. Out-of-range pipes are ignored.
            pub fn set_pipe(&mut self, pipe: usize, enabled: bool) {
                if pipe >= PIPES_COUNT {
                    return;
                }
                if enabled {
                    self.0 |= 1 << pipe;
                } else {
                    self.0 &= !(1 << pipe);
                }
            }
        }
    };
}

bitfield! {
    /// Configuration register
    #[derive(Clone, Copy, PartialEq)]
    pub struct Config(u8);
    impl Debug;

    /// Mask interrupt caused by RX_DR
    pub mask_rx_dr, set_mask_rx_dr: 6;
    /// Mask interrupt caused by TX_DS
    pub mask_tx_ds, set_mask_tx_ds: 5;
    /// Mask interrupt caused by MAX_RT
    pub mask_max_rt, set_mask_max_rt: 4;
    /// Enable CRC
    pub en_crc, set_en_crc: 3;
    /// CRC encoding scheme, `false` = 1 byte, `true` = 2 bytes
    pub crco, set_crco: 2;
    /// Power up
    pub pwr_up, set_pwr_up: 1;
    /// RX/TX control, `true` = primary receiver
    pub prim_rx, set_prim_rx: 0;
}
def_register!(Config, CONFIG);

/// Enable auto acknowledgement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnAa(pub u8);
def_register!(EnAa, EN_AA);
def_pipe_bits!(EnAa);

/// Enabled RX addresses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnRxaddr(pub u8);
def_register!(EnRxaddr, EN_RXADDR);
def_pipe_bits!(EnRxaddr);

bitfield! {
    /// Address width
    #[derive(Clone, Copy, PartialEq)]
    pub struct SetupAw(u8);
    impl Debug;

    /// `1` = 3 bytes, `2` = 4 bytes, `3` = 5 bytes, `0` is illegal
    pub u8, aw, set_aw: 1, 0;
}
def_register!(SetupAw, SETUP_AW);

bitfield! {
    /// Automatic retransmission
    #[derive(Clone, Copy, PartialEq)]
    pub struct SetupRetr(u8);
    impl Debug;

    /// Auto retransmit delay, `(ard + 1) * 250µs`
    pub u8, ard, set_ard: 7, 4;
    /// Auto retransmit count
    pub u8, arc, set_arc: 3, 0;
}
def_register!(SetupRetr, SETUP_RETR);

bitfield! {
    /// RF channel
    #[derive(Clone, Copy, PartialEq)]
    pub struct RfCh(u8);
    impl Debug;

    /// Carrier frequency is 2400 MHz + `rf_ch`
    pub u8, rf_ch, set_rf_ch: 6, 0;
}
def_register!(RfCh, RF_CH);

bitfield! {
    /// RF setup
    #[derive(Clone, Copy, PartialEq)]
    pub struct RfSetup(u8);
    impl Debug;

    /// Force PLL lock signal, test only
    pub pll_lock, set_pll_lock: 4;
    /// Air data rate, `false` = 1 Mbps, `true` = 2 Mbps
    pub rf_dr, set_rf_dr: 3;
    /// Power amplifier output level
    pub u8, rf_pwr, set_rf_pwr: 2, 1;
    /// LNA gain
    pub lna_hcurr, set_lna_hcurr: 0;
}
def_register!(RfSetup, RF_SETUP);

bitfield! {
    /// Status register
    ///
    /// Also clocked out on the first byte of every transaction.
    #[derive(Clone, Copy, PartialEq)]
    pub struct Status(u8);
    impl Debug;

    /// Data ready in RX FIFO, write 1 to clear
    pub rx_dr, set_rx_dr: 6;
    /// Data sent, write 1 to clear
    pub tx_ds, set_tx_ds: 5;
    /// Maximum number of retransmits, write 1 to clear
    pub max_rt, set_max_rt: 4;
    /// Pipe of the payload at the head of the RX FIFO, `7` when empty
    pub u8, rx_p_no, _: 3, 1;
    /// TX FIFO full
    pub tx_full, _: 0;
}
def_register!(Status, STATUS);

bitfield! {
    /// Transmit observe
    #[derive(Clone, Copy, PartialEq)]
    pub struct ObserveTx(u8);
    impl Debug;

    /// Lost packets, saturates at 15
    pub u8, plos_cnt, _: 7, 4;
    /// Retransmissions of the current packet
    pub u8, arc_cnt, _: 3, 0;
}
def_register!(ObserveTx, OBSERVE_TX);

bitfield! {
    /// Carrier detect
    #[derive(Clone, Copy, PartialEq)]
    pub struct Cd(u8);
    impl Debug;

    /// In-band carrier present
    pub cd, _: 0;
}
def_register!(Cd, CD);

bitfield! {
    /// FIFO status
    #[derive(Clone, Copy, PartialEq)]
    pub struct FifoStatus(u8);
    impl Debug;

    /// Reuse of the last TX payload is active
    pub tx_reuse, _: 6;
    /// TX FIFO full
    pub tx_full, _: 5;
    /// TX FIFO empty
    pub tx_empty, _: 4;
    /// RX FIFO full
    pub rx_full, _: 1;
    /// RX FIFO empty
    pub rx_empty, _: 0;
}
def_register!(FifoStatus, FIFO_STATUS);

/// Enable dynamic payload length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dynpd(pub u8);
def_register!(Dynpd, DYNPD);
def_pipe_bits!(Dynpd);

bitfield! {
    /// Feature register
    #[derive(Clone, Copy, PartialEq)]
    pub struct Feature(u8);
    impl Debug;

    /// Enable dynamic payload length
    pub en_dpl, set_en_dpl: 2;
    /// Enable payload with ACK
    pub en_ack_pay, set_en_ack_pay: 1;
    /// Enable the W_TX_PAYLOAD_NOACK command
    pub en_dyn_ack, set_en_dyn_ack: 0;
}
def_register!(Feature, FEATURE);
