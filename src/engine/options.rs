use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TURN_TIMER_SECS: u64 = 15;
pub const MIN_TURN_TIMER_SECS: i64 = 5;
pub const MAX_TURN_TIMER_SECS: i64 = 60;

/// Per-game settings chosen by the creator, already normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptions {
    turn_timer_secs: u64,
    bet: u64,
}

impl GameOptions {
    /// Normalize raw user input.
    ///
    /// A turn timer outside `[5, 60]` seconds, or none at all, becomes 15 seconds.
    /// A negative bet becomes 0.
    pub fn new(turn_timer_secs: Option<i64>, bet: i64) -> Self {
        let turn_timer_secs = match turn_timer_secs {
            Some(secs) if (MIN_TURN_TIMER_SECS..=MAX_TURN_TIMER_SECS).contains(&secs) => {
                secs as u64
            }
            _ => DEFAULT_TURN_TIMER_SECS,
        };
        GameOptions {
            turn_timer_secs,
            bet: bet.max(0) as u64,
        }
    }

    pub fn turn_timer(&self) -> Duration {
        Duration::from_secs(self.turn_timer_secs)
    }

    pub fn turn_timer_secs(&self) -> u64 {
        self.turn_timer_secs
    }

    pub fn bet(&self) -> u64 {
        self.bet
    }
}

impl Default for GameOptions {
    fn default() -> Self {
        GameOptions::new(None, 0)
    }
}
