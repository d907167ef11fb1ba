use embedded_hal::digital::v2::OutputPin;

/// CSN held low for the lifetime of one transaction
///
/// [`release`](ChipSelect::release) drives CSN high and reports a pin
/// failure. If the guard is dropped without being released, CSN is still
/// driven high and the pin error is lost.
pub(crate) struct ChipSelect<'a, CSN: OutputPin> {
    csn: Option<&'a mut CSN>,
}

impl<'a, CSN: OutputPin> ChipSelect<'a, CSN> {
    /// Drive CSN low, starting a transaction
    pub fn select(csn: &'a mut CSN) -> Result<Self, CSN::Error> {
        csn.set_low()?;
        Ok(ChipSelect { csn: Some(csn) })
    }

    /// Drive CSN high, ending the transaction
    pub fn release(mut self) -> Result<(), CSN::Error> {
        match self.csn.take() {
            Some(csn) => csn.set_high(),
            None => Ok(()),
        }
    }
}

impl<'a, CSN: OutputPin> Drop for ChipSelect<'a, CSN> {
    fn drop(&mut self) {
        if let Some(csn) = self.csn.take() {
            let _ = csn.set_high();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChipSelect;
    use crate::test::{Level, PinSpy};

    #[test]
    fn release_deselects_once() {
        let (mut csn, levels) = PinSpy::new();
        let selected = ChipSelect::select(&mut csn).unwrap();
        selected.release().unwrap();
        assert_eq!(*levels.borrow(), vec![Level::Low, Level::High]);
    }

    #[test]
    fn drop_deselects() {
        let (mut csn, levels) = PinSpy::new();
        {
            let _selected = ChipSelect::select(&mut csn).unwrap();
        }
        assert_eq!(*levels.borrow(), vec![Level::Low, Level::High]);
    }
}
