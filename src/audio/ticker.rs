//! Cancellable, self-re-arming progress timer.
//!
//! The ticker owns no thread. It holds at most one deadline, tagged with the
//! session generation it was armed for; the event loop asks it whether that
//! deadline has passed. Cancelling just forgets the deadline.

use std::time::{Duration, Instant};

use super::types::Generation;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Armed {
    generation: Generation,
    deadline: Instant,
}

#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    armed: Option<Armed>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            armed: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Schedule the next tick one period after `now`, replacing any pending one.
    pub fn arm(&mut self, generation: Generation, now: Instant) {
        self.armed = Some(Armed {
            generation,
            deadline: now + self.period,
        });
    }

    pub fn cancel(&mut self) {
        self.armed = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.armed.map(|a| a.deadline)
    }

    /// Take the pending tick if it is due. The ticker is left disarmed; whoever
    /// handles the tick decides whether to arm it again.
    pub fn take_due(&mut self, now: Instant) -> Option<Generation> {
        match self.armed {
            Some(a) if a.deadline <= now => {
                self.armed = None;
                Some(a.generation)
            }
            _ => None,
        }
    }
}
