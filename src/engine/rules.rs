use std::time::Duration;

use crate::error::CreateError;
use crate::game::{COLS, ROWS};

/// Host-wide settings shared by every game: board size, how long a game
/// waits for an opponent, and the payout rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameRules {
    pub rows: usize,
    pub columns: usize,
    pub join_timeout: Duration,
    /// Winner's credit as a percentage of the bet.
    pub payout_percent: u64,
}

impl GameRules {
    /// Reject boards with no cells and a zero-length join window
    pub fn validate(&self) -> Result<(), CreateError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(CreateError::InvalidRules(format!(
                "board must have at least one row and column, got {}x{}",
                self.rows, self.columns
            )));
        }
        if self.join_timeout.is_zero() {
            return Err(CreateError::InvalidRules(
                "join timeout must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Winnings for a decisive game, rounded down
    pub fn payout(&self, bet: u64) -> u64 {
        let amount = u128::from(bet) * u128::from(self.payout_percent) / 100;
        u64::try_from(amount).unwrap_or(u64::MAX)
    }
}

impl Default for GameRules {
    fn default() -> Self {
        GameRules {
            rows: ROWS,
            columns: COLS,
            join_timeout: Duration::from_secs(15),
            payout_percent: 198,
        }
    }
}
