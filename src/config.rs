use crate::registers::{Config, RfSetup, SetupRetr};
use crate::{Interrupts, MAX_ADDR_BYTES, MIN_ADDR_BYTES, PIPES_COUNT};

/// Highest RF channel, 2400 MHz + 127 MHz
pub const MAX_RF_CHANNEL: u8 = 127;

/// Supported air data rates.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRate {
    /// 1 Mbps
    R1Mbps,
    /// 2 Mbps
    R2Mbps,
}

impl Default for DataRate {
    fn default() -> DataRate {
        DataRate::R2Mbps
    }
}

/// Supported CRC modes
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrcMode {
    /// Disable all CRC generation/checking
    Disabled,
    /// One byte checksum
    OneByte,
    /// Two bytes checksum
    TwoBytes,
}

impl CrcMode {
    /// Set EN_CRC and CRCO in `config`
    pub fn apply(self, config: &mut Config) {
        let (en_crc, crco) = match self {
            CrcMode::Disabled => (false, false),
            CrcMode::OneByte => (true, false),
            CrcMode::TwoBytes => (true, true),
        };
        config.set_en_crc(en_crc);
        config.set_crco(crco);
    }
}

/// The Power Amplifier Control Level for the nRF24L01 power amplifier (negative)
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PALevel {
    /// 0 dBm
    PA0dBm,
    /// -6 dBm
    PA6dBm,
    /// -12 dBm
    PA12dBm,
    /// -18 dBm
    PA18dBm,
}

impl PALevel {
    /// Level for `dbm`, clamped to -18..=0 dBm and truncated towards
    /// 0 dBm in 6 dB steps
    pub fn from_dbm(dbm: i8) -> Self {
        match dbm.max(-18).min(0) {
            -5..=0 => PALevel::PA0dBm,
            -11..=-6 => PALevel::PA6dBm,
            -17..=-12 => PALevel::PA12dBm,
            _ => PALevel::PA18dBm,
        }
    }

    /// Output power in dBm
    pub fn dbm(self) -> i8 {
        match self {
            PALevel::PA0dBm => 0,
            PALevel::PA6dBm => -6,
            PALevel::PA12dBm => -12,
            PALevel::PA18dBm => -18,
        }
    }

    /// Value of the 2-bit RF_PWR field
    pub fn rf_pwr(self) -> u8 {
        match self {
            PALevel::PA0dBm => 0b11,
            PALevel::PA6dBm => 0b10,
            PALevel::PA12dBm => 0b01,
            PALevel::PA18dBm => 0b00,
        }
    }

    /// Decode the 2-bit RF_PWR field
    pub fn from_rf_pwr(rf_pwr: u8) -> Self {
        match rf_pwr & 0b11 {
            0b11 => PALevel::PA0dBm,
            0b10 => PALevel::PA6dBm,
            0b01 => PALevel::PA12dBm,
            _ => PALevel::PA18dBm,
        }
    }
}

/// Automatic retransmission settings
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RetransmitConfig {
    /// Delay between retransmissions in µs, 250 to 4000 in steps of 250
    pub delay_us: u16,
    /// Number of retransmissions, 0 (disabled) to 15
    pub count: u8,
}

impl RetransmitConfig {
    /// `SETUP_RETR` value, clamping both fields
    pub fn to_register(self) -> SetupRetr {
        let mut setup_retr = SetupRetr::from_bits(0);
        setup_retr.set_ard(ard_code(self.delay_us));
        setup_retr.set_arc(arc_code(self.count));
        setup_retr
    }
}

/// ARD code for a delay, clamped to 250..=4000µs and rounded up to 250µs
pub fn ard_code(delay_us: u16) -> u8 {
    let delay_us = delay_us.max(250).min(4000);
    ((delay_us + 249) / 250 - 1) as u8
}

/// ARC value clamped to 15
pub fn arc_code(count: u8) -> u8 {
    count.min(15)
}

/// SETUP_AW code for an address width clamped to 3..=5 bytes
pub fn aw_code(width: u8) -> u8 {
    width.max(MIN_ADDR_BYTES as u8).min(MAX_ADDR_BYTES as u8) - 2
}

/// Register values applied by [`NRF24L01::init_with`](crate::NRF24L01::init_with)
///
/// `Default` is the canonical reset state used by
/// [`NRF24L01::init`](crate::NRF24L01::init).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RadioConfig {
    /// CRC mode
    pub crc_mode: CrcMode,
    /// Interrupts kept off the IRQ pin
    pub interrupt_mask: Interrupts,
    /// Pipes that send auto acknowledgements
    pub auto_ack_pipes: [bool; PIPES_COUNT],
    /// Pipes that receive
    pub rx_pipes: [bool; PIPES_COUNT],
    /// Address width in bytes, 3 to 5
    pub address_width: u8,
    /// Automatic retransmission
    pub retransmit: RetransmitConfig,
    /// RF channel, 0 to 127
    pub rf_channel: u8,
    /// Air data rate
    pub data_rate: DataRate,
    /// Power amplifier level
    pub pa_level: PALevel,
    /// LNA gain
    pub lna_gain: bool,
    /// Address of pipe 0
    pub rx_addr_p0: [u8; 5],
    /// Address of pipe 1, its upper 4 bytes are shared with pipes 2 to 5
    pub rx_addr_p1: [u8; 5],
    /// Low address bytes of pipes 2 to 5
    pub rx_addr_lsb: [u8; 4],
    /// Transmit address
    pub tx_addr: [u8; 5],
}

impl Default for RadioConfig {
    fn default() -> Self {
        RadioConfig {
            crc_mode: CrcMode::OneByte,
            interrupt_mask: Interrupts::empty(),
            auto_ack_pipes: [true; PIPES_COUNT],
            rx_pipes: [true, true, false, false, false, false],
            address_width: 5,
            retransmit: RetransmitConfig {
                delay_us: 250,
                count: 3,
            },
            rf_channel: 2,
            data_rate: DataRate::R2Mbps,
            pa_level: PALevel::PA0dBm,
            lna_gain: true,
            rx_addr_p0: [0xE7; 5],
            rx_addr_p1: [0xC2; 5],
            rx_addr_lsb: [0xC3, 0xC4, 0xC5, 0xC6],
            tx_addr: [0xC2; 5],
        }
    }
}

impl RadioConfig {
    /// Are all fields inside their register's domain?
    pub fn is_valid(&self) -> bool {
        self.rf_channel <= MAX_RF_CHANNEL
            && (MIN_ADDR_BYTES as u8..=MAX_ADDR_BYTES as u8).contains(&self.address_width)
    }

    /// `CONFIG` value: powered up, primary transmitter
    pub fn config_register(&self) -> Config {
        let mut config = Config::from_bits(0);
        config.set_mask_rx_dr(self.interrupt_mask.contains(Interrupts::RX_DR));
        config.set_mask_tx_ds(self.interrupt_mask.contains(Interrupts::TX_DS));
        config.set_mask_max_rt(self.interrupt_mask.contains(Interrupts::MAX_RT));
        self.crc_mode.apply(&mut config);
        config.set_pwr_up(true);
        config
    }

    /// `RF_SETUP` value
    pub fn rf_setup_register(&self) -> RfSetup {
        let mut rf_setup = RfSetup::from_bits(0);
        rf_setup.set_rf_dr(self.data_rate == DataRate::R2Mbps);
        rf_setup.set_rf_pwr(self.pa_level.rf_pwr());
        rf_setup.set_lna_hcurr(self.lna_gain);
        rf_setup
    }
}

/// Runtime configuration of the radio
///
/// Setters are read-modify-writes of a single register unless noted.
pub trait Configuration {
    /// The error type to return on unsuccessful operation (most likely SPI error)
    type Error;

    /// Set the RF channel (0 to 127), carrier frequency 2400 MHz + `channel`
    fn set_rf_channel(&mut self, channel: u8) -> Result<(), Self::Error>;

    /// RF channel read back from the chip
    fn rf_channel(&mut self) -> Result<u8, Self::Error>;

    /// Sets the data rate to transmit data
    fn set_air_data_rate(&mut self, rate: DataRate) -> Result<(), Self::Error>;

    /// Air data rate read back from the chip
    fn air_data_rate(&mut self) -> Result<DataRate, Self::Error>;

    /// Sets the power amplifier level
    fn set_pa_gain(&mut self, level: PALevel) -> Result<(), Self::Error>;

    /// Power amplifier level read back from the chip
    fn pa_gain(&mut self) -> Result<PALevel, Self::Error>;

    /// Enable or disable the LNA gain
    fn set_lna_gain(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Sets the 5-byte address to send data to
    fn set_tx_address(&mut self, address: &[u8; 5]) -> Result<(), Self::Error>;

    /// Sets the receive address of `pipe`
    ///
    /// Pipes 0 and 1 take exactly 5 bytes. Pipes 2 to 5 take only the low
    /// byte, `address[0]`, and share the rest with pipe 1. Other pipes are
    /// ignored.
    fn set_rx_address(&mut self, pipe: usize, address: &[u8]) -> Result<(), Self::Error>;

    /// Sets the static payload width (0 to 32) of `pipe`, `0` disables the pipe
    fn set_rx_payload_width(&mut self, pipe: usize, width: u8) -> Result<(), Self::Error>;

    /// Sets the number of retransmissions, clamped to 15
    fn set_retransmit_count(&mut self, count: u8) -> Result<(), Self::Error>;

    /// Sets the retransmission delay in µs, see [`ard_code`]
    fn set_retransmit_delay(&mut self, delay_us: u16) -> Result<(), Self::Error>;

    /// Sets the address width, clamped to 3 to 5 bytes
    fn set_address_width(&mut self, width: u8) -> Result<(), Self::Error>;

    /// Address width in bytes read back from the chip
    fn address_width(&mut self) -> Result<u8, Self::Error>;

    /// Sets the bit correction mode
    fn set_crc_mode(&mut self, mode: CrcMode) -> Result<(), Self::Error>;

    /// Sets which interrupts are kept off the IRQ pin
    fn set_interrupt_mask(&mut self, mask: Interrupts) -> Result<(), Self::Error>;

    /// Sets which pipes should automatically send an ack message
    fn set_auto_ack(&mut self, pipes: &[bool; PIPES_COUNT]) -> Result<(), Self::Error>;

    /// Sets the pipes that are read-enabled
    fn set_rx_pipes_enabled(&mut self, pipes: &[bool; PIPES_COUNT]) -> Result<(), Self::Error>;

    /// Enable dynamic payload length on `pipe`
    ///
    /// Only allowed in Standby or Power Down.
    fn enable_dynamic_payload(&mut self, pipe: usize) -> Result<(), Self::Error>;

    /// Enable payloads on ACK packets, implies dynamic payload length on
    /// pipe 0 and a retransmit delay of at least 500µs
    ///
    /// Only allowed in Standby or Power Down.
    fn enable_ack_payload(&mut self) -> Result<(), Self::Error>;

    /// Enable the W_TX_PAYLOAD_NOACK command
    ///
    /// Only allowed in Standby or Power Down.
    fn enable_no_ack_tx(&mut self) -> Result<(), Self::Error>;
}
