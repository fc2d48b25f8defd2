//! Phase timer: a short countdown followed by the main round clock.
//!
//! The timer is advanced only by [`PhaseTimer::tick`], one call per second.
//! Every arming bumps a generation counter and hands out a [`TimerToken`];
//! ticks carrying an older token are stale and change nothing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds of pre-roll before the main clock starts.
pub const COUNTDOWN_SECONDS: u32 = 2;

/// Main clock of the letters round.
pub const LETTERS_SECONDS: u32 = 45;

/// Main clock of the numbers (target) round.
pub const NUMBERS_SECONDS: u32 = 60;

/// Identifies one armed timer instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Where the timer is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Countdown {
        remaining: u32,
    },
    Running {
        remaining: u32,
        total: u32,
    },
    Expired,
}

impl TimerState {
    pub fn is_countdown(&self) -> bool {
        matches!(self, TimerState::Countdown { .. })
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TimerState::Running { .. })
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, TimerState::Expired)
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The token belongs to a discarded instance.
    Stale,
    /// The timer is idle or already expired.
    Inactive,
    /// A counter was decremented.
    Counted { remaining: u32 },
    /// The countdown reached zero and the main clock started.
    Started { total: u32 },
    /// The main clock reached zero.
    Expired,
}

/// A single phase's timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseTimer {
    state: TimerState,
    generation: u64,
    countdown_seconds: u32,
    main_seconds: u32,
}

impl PhaseTimer {
    pub fn new(countdown_seconds: u32) -> Self {
        Self {
            state: TimerState::Idle,
            generation: 0,
            countdown_seconds,
            main_seconds: 0,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Token of the currently armed instance, if any.
    pub fn token(&self) -> Option<TimerToken> {
        match self.state {
            TimerState::Countdown { .. } | TimerState::Running { .. } => {
                Some(TimerToken(self.generation))
            }
            TimerState::Idle | TimerState::Expired => None,
        }
    }

    /// Arm a new instance: countdown first, then `main_seconds` of play.
    ///
    /// Any previously armed instance becomes stale.
    pub fn arm(&mut self, main_seconds: u32) -> TimerToken {
        self.generation += 1;
        self.main_seconds = main_seconds;
        self.state = if self.countdown_seconds == 0 {
            TimerState::Running {
                remaining: main_seconds,
                total: main_seconds,
            }
        } else {
            TimerState::Countdown {
                remaining: self.countdown_seconds,
            }
        };
        TimerToken(self.generation)
    }

    /// Discard the current instance and go back to idle.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.state = TimerState::Idle;
    }

    /// Stop the clock for good (word submitted, answer finalized).
    pub fn halt(&mut self) {
        self.generation += 1;
        self.state = TimerState::Expired;
    }

    /// Advance the armed instance by one second.
    pub fn tick(&mut self, token: TimerToken) -> TickOutcome {
        if token.0 != self.generation {
            return TickOutcome::Stale;
        }

        match self.state {
            TimerState::Idle | TimerState::Expired => TickOutcome::Inactive,
            TimerState::Countdown { remaining } if remaining > 1 => {
                self.state = TimerState::Countdown {
                    remaining: remaining - 1,
                };
                TickOutcome::Counted {
                    remaining: remaining - 1,
                }
            }
            TimerState::Countdown { .. } => {
                self.state = TimerState::Running {
                    remaining: self.main_seconds,
                    total: self.main_seconds,
                };
                TickOutcome::Started {
                    total: self.main_seconds,
                }
            }
            TimerState::Running { remaining, total } if remaining > 1 => {
                self.state = TimerState::Running {
                    remaining: remaining - 1,
                    total,
                };
                TickOutcome::Counted {
                    remaining: remaining - 1,
                }
            }
            TimerState::Running { .. } => {
                self.state = TimerState::Expired;
                TickOutcome::Expired
            }
        }
    }
}

impl Default for PhaseTimer {
    fn default() -> Self {
        Self::new(COUNTDOWN_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick_n(timer: &mut PhaseTimer, token: TimerToken, n: u32) -> TickOutcome {
        let mut last = TickOutcome::Inactive;
        for _ in 0..n {
            last = timer.tick(token);
        }
        last
    }

    #[test]
    fn test_countdown_precedes_running() {
        let mut timer = PhaseTimer::new(2);
        let token = timer.arm(45);
        assert_eq!(timer.state(), TimerState::Countdown { remaining: 2 });

        assert_eq!(timer.tick(token), TickOutcome::Counted { remaining: 1 });
        assert_eq!(timer.tick(token), TickOutcome::Started { total: 45 });
        assert_eq!(
            timer.state(),
            TimerState::Running {
                remaining: 45,
                total: 45
            }
        );
    }

    #[test]
    fn test_running_expires() {
        let mut timer = PhaseTimer::new(2);
        let token = timer.arm(3);
        tick_n(&mut timer, token, 2);
        assert_eq!(tick_n(&mut timer, token, 2), TickOutcome::Counted { remaining: 1 });
        assert_eq!(timer.tick(token), TickOutcome::Expired);
        assert!(timer.state().is_expired());
        assert_eq!(timer.tick(token), TickOutcome::Inactive);
        assert_eq!(timer.token(), None);
    }

    #[test]
    fn test_stale_token_ignored_after_cancel() {
        let mut timer = PhaseTimer::new(2);
        let old = timer.arm(5);
        tick_n(&mut timer, old, 2);
        timer.cancel();

        for _ in 0..10 {
            assert_eq!(timer.tick(old), TickOutcome::Stale);
        }
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn test_rearm_invalidates_previous_instance() {
        let mut timer = PhaseTimer::new(2);
        let first = timer.arm(45);
        let second = timer.arm(60);
        assert_ne!(first, second);
        assert_eq!(timer.tick(first), TickOutcome::Stale);
        assert_eq!(timer.tick(second), TickOutcome::Counted { remaining: 1 });
    }

    #[test]
    fn test_halt_expires_without_tick() {
        let mut timer = PhaseTimer::new(2);
        let token = timer.arm(45);
        timer.halt();
        assert!(timer.state().is_expired());
        assert_eq!(timer.tick(token), TickOutcome::Stale);
    }

    #[test]
    fn test_zero_countdown_starts_running() {
        let mut timer = PhaseTimer::new(0);
        timer.arm(10);
        assert!(timer.state().is_running());
    }
}
