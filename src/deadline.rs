//! Bounds for the polling loops
//!
//! The chip signals completion only through STATUS bits, so every wait is
//! a poll loop. A [`Deadline`] is asked after each poll that found nothing
//! whether the loop should give up.

/// Decides when a poll loop gives up
pub trait Deadline {
    /// Called after every unsuccessful poll. `true` ends the wait.
    fn expired(&mut self) -> bool;
}

/// Never expires. The wait ends only when the chip sets a status bit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Forever;

impl Deadline for Forever {
    fn expired(&mut self) -> bool {
        false
    }
}

/// Expires after a fixed number of polls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollBudget {
    max_polls: u32,
    polls: u32,
}

impl PollBudget {
    /// Allow `max_polls` polls. At least one poll is always made.
    pub fn new(max_polls: u32) -> Self {
        PollBudget { max_polls, polls: 0 }
    }

    /// Polls made so far
    pub fn polls(&self) -> u32 {
        self.polls
    }
}

impl Deadline for PollBudget {
    fn expired(&mut self) -> bool {
        self.polls = self.polls.saturating_add(1);
        self.polls >= self.max_polls
    }
}

/// Expires when the closure says so, e.g. by comparing against a timer
pub struct DeadlineFn<F: FnMut() -> bool>(pub F);

impl<F: FnMut() -> bool> Deadline for DeadlineFn<F> {
    fn expired(&mut self) -> bool {
        (self.0)()
    }
}
