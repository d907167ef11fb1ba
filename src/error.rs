use core::fmt::Debug;

/// Errors of the driver
///
/// Transmission failure after the retransmit budget is exhausted is not an
/// error but a [`TxOutcome`](crate::TxOutcome).
#[derive(Debug)]
pub enum Error<SPIE: Debug, PE: Debug> {
    /// The SPI transfer failed. Chip select was released before returning.
    SpiError(SPIE),
    /// Driving chip select or chip enable failed
    PinError(PE),
    /// An argument was outside of its documented domain. Nothing was sent.
    InvalidArgument,
    /// The TX FIFO holds 3 payloads already. Nothing was sent.
    TxFifoFull,
    /// The waiting payload is longer than the supplied buffer
    BufferTooSmall,
    /// The operation is only allowed in Standby or Power Down
    WrongMode,
}

impl<SPIE: Debug, PE: Debug> From<SPIE> for Error<SPIE, PE> {
    fn from(e: SPIE) -> Self {
        Error::SpiError(e)
    }
}
