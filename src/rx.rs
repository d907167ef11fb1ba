use crate::deadline::Deadline;
use crate::payload::Payload;

/// Receiving side: RX FIFO queries and payload dequeueing
///
/// Apart from [`wait_for_data`](Rx::wait_for_data) none of these change
/// the mode; arm the receiver with
/// [`enable_rx_mode`](crate::ChangeModes::enable_rx_mode).
pub trait Rx {
    /// Error from RX operations (most commonly SPI errors)
    type Error;

    /// Flush RX queue
    ///
    /// Discards all received packets that have not yet been read from the RX FIFO
    fn flush_rx(&mut self) -> Result<(), Self::Error>;

    /// Is the RX queue empty?
    fn is_rx_fifo_empty(&mut self) -> Result<bool, Self::Error>;

    /// Is the RX queue full?
    fn is_rx_fifo_full(&mut self) -> Result<bool, Self::Error>;

    /// Static payload width configured for `pipe`, `0` for pipes above 5
    fn pipe_payload_width(&mut self, pipe: usize) -> Result<u8, Self::Error>;

    /// Width of the payload at the head of the RX FIFO when dynamic
    /// payloads are enabled
    fn rx_payload_width(&mut self) -> Result<u8, Self::Error>;

    /// Pipe of a received payload if RX_DR is set
    fn data_ready(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Arm the receiver, poll [`data_ready`](Rx::data_ready) until data
    /// arrives or `deadline` expires, then drop CE again
    fn wait_for_data<D: Deadline>(&mut self, deadline: &mut D) -> Result<Option<u8>, Self::Error>;

    /// Dequeue `buf.len()` bytes (1 to 32) from the RX FIFO
    ///
    /// Size `buf` to the width of the pipe, see
    /// [`pipe_payload_width`](Rx::pipe_payload_width).
    fn dequeue_rx_payload(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Dequeue the next payload, sized by its pipe's static or dynamic
    /// width, and clear RX_DR
    fn read(&mut self) -> Result<Option<Payload>, Self::Error>;

    /// Dequeue the next payload into `buf` if it arrived on `pipe`
    ///
    /// Returns the number of bytes read, or `None` if nothing is waiting
    /// for `pipe`.
    fn read_pipe(&mut self, pipe: u8, buf: &mut [u8]) -> Result<Option<usize>, Self::Error>;

    /// Is an in-band RF signal detected?
    ///
    /// The internal carrier detect signal must be high for 128μs before
    /// the carrier detect register is set. Note that changing from
    /// standby to receive mode also takes 130μs.
    fn has_carrier(&mut self) -> Result<bool, Self::Error>;
}
