use crate::deadline::Deadline;
use crate::registers::ObserveTx;

/// Result of waiting for a transmission
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxOutcome {
    /// Neither TX_DS nor MAX_RT is set yet
    Pending,
    /// MAX_RT: the retransmit budget was exhausted without an ACK. The
    /// payload stays in the TX FIFO until flushed.
    Failed,
    /// TX_DS: the payload was acknowledged (or sent, without auto-ack)
    Succeeded,
    /// The deadline expired before either flag was set
    DeadlineExceeded,
}

/// Represents **TX Mode** and the associated **TX Settling** and
/// **Standby-II** states
///
/// # Timing
///
/// The datasheet states the follwing:
///
/// > It is important to never keep the nRF24L01 in TX mode for more than 4ms at a time.
pub trait Tx {
    /// Error from performing TX Operations (Most commonly this will only be spi errors)
    type Error;

    /// Flush TX queue, discarding any unsent packets
    fn flush_tx(&mut self) -> Result<(), Self::Error>;

    /// Is TX FIFO empty?
    fn is_tx_fifo_empty(&mut self) -> Result<bool, Self::Error>;

    /// Is TX FIFO full?
    fn is_tx_fifo_full(&mut self) -> Result<bool, Self::Error>;

    /// Enqueue 1 to 32 bytes for transmission
    ///
    /// Fails with `TxFifoFull` without writing anything when the FIFO has
    /// no free slot.
    fn enqueue_tx_payload(&mut self, payload: &[u8]) -> Result<(), Self::Error>;

    /// Like [`enqueue_tx_payload`](Tx::enqueue_tx_payload) but the
    /// receiver will not acknowledge. Needs
    /// [`enable_no_ack_tx`](crate::Configuration::enable_no_ack_tx).
    fn enqueue_tx_payload_no_ack(&mut self, payload: &[u8]) -> Result<(), Self::Error>;

    /// Queue 1 to 32 bytes to go out with the next ACK on `pipe`. Needs
    /// [`enable_ack_payload`](crate::Configuration::enable_ack_payload).
    fn write_ack_payload(&mut self, pipe: u8, payload: &[u8]) -> Result<(), Self::Error>;

    /// Keep retransmitting the last payload while CE is high
    fn reuse_tx_payload(&mut self) -> Result<(), Self::Error>;

    /// Poll STATUS once
    ///
    /// `Succeeded` on TX_DS, `Failed` on MAX_RT, `WouldBlock` if neither
    /// is set. TX_DS wins if both are set. The flags are not cleared.
    fn poll_tx_complete(&mut self) -> nb::Result<TxOutcome, Self::Error>;

    /// Wait for TX_DS or MAX_RT
    ///
    /// Without `blocking` STATUS is polled exactly once and `Pending` is
    /// returned if neither flag is set. With `blocking` polling continues
    /// until a flag is set or `deadline` expires.
    fn wait_for_tx_complete<D: Deadline>(
        &mut self,
        blocking: bool,
        deadline: &mut D,
    ) -> Result<TxOutcome, Self::Error>;

    /// Enqueue `payload`, first mirroring TX_ADDR into RX_ADDR_P0 when
    /// auto-ack is enabled on pipe 0 so that the ACK can be received
    fn submit(&mut self, payload: &[u8]) -> Result<(), Self::Error>;

    /// Arm TX, wait for the outcome, disarm and power down
    fn attempt_tx<D: Deadline>(&mut self, deadline: &mut D) -> Result<TxOutcome, Self::Error>;

    /// [`submit`](Tx::submit) followed by [`attempt_tx`](Tx::attempt_tx)
    fn send<D: Deadline>(&mut self, payload: &[u8], deadline: &mut D) -> Result<TxOutcome, Self::Error>;

    /// Set TX_ADDR to `address`, then [`send`](Tx::send)
    fn send_to<D: Deadline>(
        &mut self,
        address: &[u8; 5],
        payload: &[u8],
        deadline: &mut D,
    ) -> Result<TxOutcome, Self::Error>;

    /// Read the `OBSERVE_TX` register
    fn observe(&mut self) -> Result<ObserveTx, Self::Error>;
}

#[cfg(test)]
mod tests {
    use embedded_hal_mock::spi::Transaction as SpiTransaction;

    use super::{Tx, TxOutcome};
    use crate::command::{NOP, W_ACK_PAYLOAD, W_TX_PAYLOAD, W_TX_PAYLOAD_NOACK};
    use crate::registers::{OBSERVE_TX, RX_ADDR_P0, STATUS, TX_ADDR};
    use crate::test::{done, mk_initialized_radio, mk_mock_radio};
    use crate::{ChangeModes, Configuration, Error, Forever, Mode, PollBudget};

    #[test]
    fn enqueue_on_the_wire() {
        let mut radio = mk_mock_radio(
            &[],
            &[
                SpiTransaction::transfer(vec![0x17, 0x00], vec![0x0E, 0x11]),
                SpiTransaction::transfer(vec![0xA0, 0x01, 0x02, 0x03], vec![0x0E, 0, 0, 0]),
            ],
        );
        radio.enqueue_tx_payload(&[1, 2, 3]).unwrap();
        done(radio);
    }

    #[test]
    fn full_fifo_is_not_written() {
        let (mut radio, sim) = mk_initialized_radio();
        for i in 0..3 {
            radio.enqueue_tx_payload(&[i]).unwrap();
        }
        assert!(radio.is_tx_fifo_full().unwrap());
        sim.reset_log();

        assert!(matches!(radio.enqueue_tx_payload(&[4]), Err(Error::TxFifoFull)));
        assert_eq!(sim.chip.borrow().count(W_TX_PAYLOAD), 0);
        assert_eq!(sim.chip.borrow().tx_fifo.len(), 3);

        radio.flush_tx().unwrap();
        assert!(radio.is_tx_fifo_empty().unwrap());
    }

    #[test]
    fn payload_length_is_checked_first() {
        let (mut radio, sim) = mk_initialized_radio();
        assert!(matches!(radio.enqueue_tx_payload(&[]), Err(Error::InvalidArgument)));
        assert!(matches!(radio.enqueue_tx_payload(&[0; 33]), Err(Error::InvalidArgument)));
        assert!(matches!(radio.submit(&[]), Err(Error::InvalidArgument)));
        assert!(sim.frames().is_empty());
    }

    #[test]
    fn non_blocking_wait_polls_once() {
        let (mut radio, sim) = mk_initialized_radio();
        assert_eq!(radio.wait_for_tx_complete(false, &mut Forever).unwrap(), TxOutcome::Pending);
        assert_eq!(sim.frames().len(), 1);

        sim.chip.borrow_mut().raise(0x10);
        assert_eq!(radio.wait_for_tx_complete(false, &mut Forever).unwrap(), TxOutcome::Failed);

        sim.chip.borrow_mut().raise(0x20);
        assert_eq!(radio.wait_for_tx_complete(false, &mut Forever).unwrap(), TxOutcome::Succeeded);
    }

    #[test]
    fn tx_ds_wins_over_max_rt() {
        let (mut radio, sim) = mk_initialized_radio();
        sim.chip.borrow_mut().raise(0x30);
        assert!(matches!(radio.poll_tx_complete(), Ok(TxOutcome::Succeeded)));
        assert_eq!(radio.wait_for_tx_complete(true, &mut Forever).unwrap(), TxOutcome::Succeeded);
    }

    #[test]
    fn poll_reports_outcome() {
        let (mut radio, sim) = mk_initialized_radio();
        assert!(matches!(radio.poll_tx_complete(), Err(nb::Error::WouldBlock)));

        sim.chip.borrow_mut().raise(0x10);
        assert!(matches!(radio.poll_tx_complete(), Ok(TxOutcome::Failed)));
        // Flags stay raised until cleared
        assert!(matches!(radio.poll_tx_complete(), Ok(TxOutcome::Failed)));
        assert_eq!(sim.chip.borrow().register(STATUS) & 0x10, 0x10);
    }

    #[test]
    fn blocking_wait_after_two_polls() {
        let (mut radio, sim) = mk_initialized_radio();
        radio.enable_tx_mode().unwrap();
        radio.enqueue_tx_payload(&[0x01, 0x02, 0x03]).unwrap();
        sim.chip.borrow_mut().status_script.extend(&[0x00, 0x20]);
        sim.reset_log();

        assert_eq!(radio.wait_for_tx_complete(true, &mut Forever).unwrap(), TxOutcome::Succeeded);
        assert_eq!(sim.chip.borrow().count(NOP), 2);
        assert_eq!(sim.frames().len(), 2);
    }

    #[test]
    fn blocking_wait_respects_deadline() {
        let (mut radio, sim) = mk_initialized_radio();
        radio.enable_tx_mode().unwrap();
        sim.reset_log();

        let mut budget = PollBudget::new(3);
        assert_eq!(
            radio.wait_for_tx_complete(true, &mut budget).unwrap(),
            TxOutcome::DeadlineExceeded
        );
        assert_eq!(sim.chip.borrow().count(NOP), 3);
    }

    #[test]
    fn send_mirrors_address_and_powers_down() {
        let (mut radio, sim) = mk_initialized_radio();
        radio.set_tx_address(&[1, 2, 3, 4, 5]).unwrap();
        sim.chip.borrow_mut().status_script.push_back(0x20);

        assert_eq!(radio.send(&[42], &mut Forever).unwrap(), TxOutcome::Succeeded);
        assert_eq!(sim.chip.borrow().address(RX_ADDR_P0), [1, 2, 3, 4, 5]);
        assert_eq!(sim.chip.borrow().register(STATUS) & 0x30, 0);
        assert_eq!(radio.mode(), Some(Mode::PowerDown));
    }

    #[test]
    fn send_reports_exhausted_retries() {
        let (mut radio, sim) = mk_initialized_radio();
        sim.chip.borrow_mut().status_script.extend(&[0x00, 0x10]);
        assert_eq!(
            radio.send_to(&[9; 5], &[1, 2], &mut Forever).unwrap(),
            TxOutcome::Failed
        );
        assert_eq!(sim.chip.borrow().address(TX_ADDR), [9; 5]);
        // the payload stays queued until flushed
        assert_eq!(sim.chip.borrow().tx_fifo.len(), 1);
    }

    #[test]
    fn submit_without_auto_ack_keeps_pipe_0() {
        let (mut radio, sim) = mk_initialized_radio();
        radio.set_auto_ack(&[false; 6]).unwrap();
        radio.set_tx_address(&[1, 2, 3, 4, 5]).unwrap();
        radio.submit(&[1]).unwrap();
        assert_eq!(sim.chip.borrow().address(RX_ADDR_P0), [0xE7; 5]);
    }

    #[test]
    fn special_payloads() {
        let (mut radio, sim) = mk_initialized_radio();
        radio.enable_no_ack_tx().unwrap();
        radio.enable_ack_payload().unwrap();

        radio.enqueue_tx_payload_no_ack(&[1]).unwrap();
        radio.write_ack_payload(5, &[2]).unwrap();
        radio.reuse_tx_payload().unwrap();
        assert!(matches!(radio.write_ack_payload(6, &[3]), Err(Error::InvalidArgument)));

        assert_eq!(sim.chip.borrow().count(W_TX_PAYLOAD_NOACK), 1);
        assert_eq!(sim.chip.borrow().count(W_ACK_PAYLOAD | 5), 1);
    }

    #[test]
    fn observe_counters() {
        let (mut radio, sim) = mk_initialized_radio();
        sim.chip.borrow_mut().set_register(OBSERVE_TX, 0x25);
        let observe_tx = radio.observe().unwrap();
        assert_eq!(observe_tx.plos_cnt(), 2);
        assert_eq!(observe_tx.arc_cnt(), 5);
    }
}
