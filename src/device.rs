use crate::command::Command;
use crate::registers::{Config, Register, Status};
use crate::Interrupts;

/// Transaction framing and register access
///
/// Every method results in at most one SPI transaction framed by CSN,
/// unless documented otherwise. The STATUS byte clocked out on the first
/// byte of each transaction is kept as [`last_status`](Device::last_status).
pub trait Device {
    /// Error type (SPI or pin errors, contract violations)
    type Error;

    /// Set CE high
    fn ce_enable(&mut self) -> Result<(), Self::Error>;

    /// Set CE low
    fn ce_disable(&mut self) -> Result<(), Self::Error>;

    /// Exchange `frame` in place, framed by CSN
    ///
    /// `frame[0]` is the command byte and is replaced by STATUS, the
    /// remaining bytes are written out and replaced by what the chip
    /// clocks back. CSN is driven high again on every exit path. When both
    /// the bus and the deselect fail, the bus error is returned.
    fn transfer(&mut self, frame: &mut [u8]) -> Result<Status, Self::Error>;

    /// Serialize `command`, transfer it and parse the response
    fn send_command<C: Command>(
        &mut self,
        command: &C,
    ) -> Result<(Status, C::Response), Self::Error>;

    /// STATUS as seen on the most recent transaction
    fn last_status(&self) -> Status;

    /// Refresh STATUS with a `NOP` transaction
    fn get_status(&mut self) -> Result<Status, Self::Error>;

    /// Read one 8-bit register by address
    fn read_register_8(&mut self, addr: u8) -> Result<u8, Self::Error>;

    /// Read `buf.len()` bytes (1 to 32) from the register at `addr`
    fn read_register_multi(&mut self, addr: u8, buf: &mut [u8]) -> Result<Status, Self::Error>;

    /// Write one 8-bit register by address
    fn write_register_8(&mut self, addr: u8, value: u8) -> Result<Status, Self::Error>;

    /// Write all of `data` (1 to 32 bytes) to the register at `addr`
    ///
    /// There is no length prefix: `data` must match the width of the
    /// register, e.g. exactly 5 bytes for a full pipe address.
    fn write_register_multi(&mut self, addr: u8, data: &[u8]) -> Result<Status, Self::Error>;

    /// Send a command byte followed by `payload`
    ///
    /// Commands that need data (payload writes, `ACTIVATE`, register
    /// writes) are rejected with an empty `payload`.
    fn send_raw_command(&mut self, command: u8, payload: &[u8]) -> Result<Status, Self::Error>;

    /// Send a command byte and clock `buf.len()` bytes back into `buf`
    fn read_raw_command(&mut self, command: u8, buf: &mut [u8]) -> Result<Status, Self::Error>;

    /// Read a typed register
    fn read_register<R: Register>(&mut self) -> Result<(Status, R), Self::Error>;

    /// Write a typed register
    fn write_register<R: Register>(&mut self, register: R) -> Result<Status, Self::Error>;

    /// Read-modify-write a typed register. Nothing is written when `f`
    /// leaves the value unchanged.
    fn update_register<R, F, T>(&mut self, f: F) -> Result<T, Self::Error>
    where
        R: Register + Copy + PartialEq,
        F: FnOnce(&mut R) -> T;

    /// Read-modify-write of `CONFIG`
    fn update_config<F, T>(&mut self, f: F) -> Result<T, Self::Error>
    where
        F: FnOnce(&mut Config) -> T,
    {
        self.update_register(f)
    }

    /// Pending RX_DR, TX_DS and MAX_RT flags
    fn interrupts(&mut self) -> Result<Interrupts, Self::Error> {
        let status = self.get_status()?;
        Ok(Interrupts::from_bits_truncate(status.bits()))
    }

    /// Clear the given flags by writing 1s to STATUS
    fn clear_interrupts(&mut self, flags: Interrupts) -> Result<(), Self::Error> {
        self.write_register(Status::from_bits(flags.bits()))?;
        Ok(())
    }
}
