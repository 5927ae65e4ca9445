//! Currency ledger the engine escrows stakes with and settles against.
//!
//! The host bot owns balances; the engine only asks for atomic debits and
//! credits through the [`Ledger`] trait.

mod memory;

pub use memory::{InMemoryLedger, LedgerEntry};

use async_trait::async_trait;

use crate::game::ParticipantId;

/// Reason attached to escrow debits.
pub const BET_REASON: &str = "connect4-bet";
/// Reason attached to winnings.
pub const WIN_REASON: &str = "connect4-win";
/// Reason attached to draw and failed-to-start refunds.
pub const REFUND_REASON: &str = "connect4-refund";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("participant {participant} has {available}, needs {requested}")]
    InsufficientFunds {
        participant: ParticipantId,
        requested: u64,
        available: u64,
    },

    #[error("ledger backend failure: {0}")]
    Backend(String),
}

/// Atomic debit/credit service.
///
/// Implementations must apply each call entirely or not at all.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Remove `amount` from the participant's balance. Fails with
    /// [`LedgerError::InsufficientFunds`] without touching the balance.
    async fn debit(
        &self,
        participant: ParticipantId,
        reason: &str,
        amount: u64,
    ) -> Result<(), LedgerError>;

    /// Add `amount` to the participant's balance.
    async fn credit(
        &self,
        participant: ParticipantId,
        reason: &str,
        amount: u64,
    ) -> Result<(), LedgerError>;
}
