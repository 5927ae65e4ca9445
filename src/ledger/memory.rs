use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use super::{Ledger, LedgerError};
use crate::game::ParticipantId;

/// One applied debit or credit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub participant: ParticipantId,
    pub reason: String,
    /// Positive for credits, negative for debits.
    pub delta: i128,
}

#[derive(Debug, Default)]
struct Accounts {
    balances: HashMap<ParticipantId, u64>,
    journal: Vec<LedgerEntry>,
}

/// Process-local ledger with a transaction journal.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    accounts: Mutex<Accounts>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger where every listed participant starts with `balance`
    pub fn with_balances(participants: &[ParticipantId], balance: u64) -> Self {
        let balances = participants.iter().map(|&id| (id, balance)).collect();
        InMemoryLedger {
            accounts: Mutex::new(Accounts {
                balances,
                journal: Vec::new(),
            }),
        }
    }

    pub async fn balance(&self, participant: ParticipantId) -> u64 {
        let accounts = self.accounts.lock().await;
        accounts.balances.get(&participant).copied().unwrap_or(0)
    }

    /// Set a balance directly, without a journal entry
    pub async fn set_balance(&self, participant: ParticipantId, balance: u64) {
        let mut accounts = self.accounts.lock().await;
        accounts.balances.insert(participant, balance);
    }

    pub async fn journal(&self) -> Vec<LedgerEntry> {
        self.accounts.lock().await.journal.clone()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn debit(
        &self,
        participant: ParticipantId,
        reason: &str,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let mut accounts = self.accounts.lock().await;
        let available = accounts.balances.get(&participant).copied().unwrap_or(0);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                participant,
                requested: amount,
                available,
            });
        }
        accounts.balances.insert(participant, available - amount);
        accounts.journal.push(LedgerEntry {
            participant,
            reason: reason.to_string(),
            delta: -i128::from(amount),
        });
        Ok(())
    }

    async fn credit(
        &self,
        participant: ParticipantId,
        reason: &str,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let mut accounts = self.accounts.lock().await;
        let balance = accounts.balances.entry(participant).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Backend(format!("balance overflow for {participant}")))?;
        accounts.journal.push(LedgerEntry {
            participant,
            reason: reason.to_string(),
            delta: i128::from(amount),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: ParticipantId = ParticipantId(1);
    const BOB: ParticipantId = ParticipantId(2);

    #[tokio::test]
    async fn test_debit_within_balance() {
        let ledger = InMemoryLedger::with_balances(&[ALICE], 100);
        ledger.debit(ALICE, "bet", 40).await.unwrap();
        assert_eq!(ledger.balance(ALICE).await, 60);
    }

    #[tokio::test]
    async fn test_debit_never_applies_partially() {
        let ledger = InMemoryLedger::with_balances(&[ALICE], 10);
        let err = ledger.debit(ALICE, "bet", 11).await.unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                participant: ALICE,
                requested: 11,
                available: 10,
            }
        );
        assert_eq!(ledger.balance(ALICE).await, 10);
        assert!(ledger.journal().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_participant_has_nothing() {
        let ledger = InMemoryLedger::new();
        assert!(ledger.debit(BOB, "bet", 1).await.is_err());
        ledger.credit(BOB, "win", 5).await.unwrap();
        assert_eq!(ledger.balance(BOB).await, 5);
    }

    #[tokio::test]
    async fn test_journal_records_signed_deltas() {
        let ledger = InMemoryLedger::with_balances(&[ALICE], 50);
        ledger.debit(ALICE, "bet", 20).await.unwrap();
        ledger.credit(ALICE, "refund", 20).await.unwrap();
        let journal = ledger.journal().await;
        assert_eq!(journal.len(), 2);
        assert_eq!(journal[0].delta, -20);
        assert_eq!(journal[1].delta, 20);
        assert_eq!(journal[1].reason, "refund");
    }

    #[tokio::test]
    async fn test_journal_delta_holds_full_u64_range() {
        let ledger = InMemoryLedger::new();
        ledger.credit(BOB, "win", u64::MAX).await.unwrap();
        ledger.debit(BOB, "bet", u64::MAX).await.unwrap();
        let journal = ledger.journal().await;
        assert_eq!(journal[0].delta, i128::from(u64::MAX));
        assert!(journal[0].delta > 0);
        assert_eq!(journal[1].delta, -i128::from(u64::MAX));
    }
}
