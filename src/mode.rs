/// Operating mode of the nRF24L01 as tracked by the driver
///
/// Mode    | PWR_UP | PRIM_RX | CE
/// --------|--------|---------|----
/// PowerDown |  0   |    -    |  -
/// Standby |    1   |    -    |  0
/// Rx      |    1   |    1    |  1
/// Tx      |    1   |    0    |  1
///
/// `Tx` includes Standby-II, i.e. CE high with an empty TX FIFO.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Power Down Mode.  This mode is used for the nRF24L01 to consumer minimal
    /// current.  The register values of the device are maintained, but switching
    /// to Standby takes up to 1.5ms
    PowerDown,
    /// Standby Mode (Standby-I Mode in the Datasheet).  This mode is meant
    /// to ensure low power usage when there is no data being sent or received.
    Standby,
    /// Sets the Device as a Receiver.  In this mode the nRF24L01 device will
    /// actively receive packets and insert them into the RX FIFOs slots
    Rx,
    /// Sets the Device as a Transmitter.  In this mode the nRF24L01 device will
    /// actively send packets from the TX FIFO register.  The datasheet warns
    /// against staying in TX for more than 4ms at a time.
    Tx,
}

/// Change the nRF24L01+ Device between different modes defined in the datasheet
///
/// The transitions write CONFIG before raising CE. None of them can be
/// acknowledged by the chip, so the caller must have brought the registers
/// into a known state first, see [`NRF24L01::init`](crate::NRF24L01::init).
pub trait ChangeModes {
    /// Error for changing the device types (most likely a SPI error)
    type Error;

    /// Mode the driver last put the chip into, `None` before it was
    /// brought into a known state
    fn mode(&self) -> Option<Mode>;

    /// Clear PWR_UP and drive CE low. Allowed from every mode.
    fn power_down(&mut self) -> Result<(), Self::Error>;

    /// Set PWR_UP, moving Power Down to Standby
    ///
    /// The oscillator needs up to 1.5ms to settle. This call does not wait;
    /// the caller must delay before arming RX or TX.
    fn power_up(&mut self) -> Result<(), Self::Error>;

    /// Set PRIM_RX (and PWR_UP), then drive CE high
    fn enable_rx_mode(&mut self) -> Result<(), Self::Error>;

    /// Drive CE low, back to Standby
    fn disable_rx_mode(&mut self) -> Result<(), Self::Error>;

    /// Clear TX_DS and MAX_RT, clear PRIM_RX (and set PWR_UP), then drive
    /// CE high
    fn enable_tx_mode(&mut self) -> Result<(), Self::Error>;

    /// Drive CE low and clear TX_DS and MAX_RT, back to Standby
    fn disable_tx_mode(&mut self) -> Result<(), Self::Error>;
}
