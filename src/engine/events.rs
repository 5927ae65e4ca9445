use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use super::options::GameOptions;
use crate::game::{
    Board, GameOutcome, GameState, LastMove, Participant, Phase, Slot, WinningLine,
};

/// Self-consistent copy of a game taken under the engine lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub game_id: u64,
    pub phase: Phase,
    pub board: Board,
    pub players: [Option<Participant>; 2],
    pub bet: u64,
    pub turn_timer_secs: u64,
    pub last_move: Option<LastMove>,
    pub winning_line: Option<WinningLine>,
    pub outcome: Option<GameOutcome>,
    pub winner: Option<Participant>,
}

impl GameSnapshot {
    pub(crate) fn capture(game_id: u64, state: &GameState, options: &GameOptions) -> Self {
        GameSnapshot {
            game_id,
            phase: state.phase(),
            board: state.board().clone(),
            players: [
                state.player(Slot::First).cloned(),
                state.player(Slot::Second).cloned(),
            ],
            bet: options.bet(),
            turn_timer_secs: options.turn_timer_secs(),
            last_move: state.last_move(),
            winning_line: state.winning_line(),
            outcome: state.outcome(),
            winner: state.winner_player().cloned(),
        }
    }

    pub fn player(&self, slot: Slot) -> Option<&Participant> {
        self.players[slot.index()].as_ref()
    }

    /// The participant due to move; `None` while joining or after the end
    pub fn current_player(&self) -> Option<&Participant> {
        self.phase.slot_to_move().and_then(|slot| self.player(slot))
    }
}

/// Life-cycle notifications, delivered after the state they describe is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A join or drop was accepted.
    StateUpdated(GameSnapshot),
    /// Nobody joined before the join window closed.
    FailedToStart(GameSnapshot),
    /// Terminal transition; sent once per finished game.
    Ended {
        snapshot: GameSnapshot,
        outcome: GameOutcome,
    },
}

/// Fan-out to listeners. Sending never blocks; closed receivers are pruned.
#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    senders: Vec<UnboundedSender<GameEvent>>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, sender: UnboundedSender<GameEvent>) {
        self.senders.push(sender);
    }

    pub(crate) fn publish(&mut self, event: GameEvent) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub(crate) fn clear(&mut self) {
        self.senders.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn snapshot() -> GameSnapshot {
        let state = GameState::initial(Participant::new(1, "alice"), 6, 7);
        GameSnapshot::capture(3, &state, &GameOptions::default())
    }

    #[test]
    fn test_snapshot_while_joining() {
        let snapshot = snapshot();
        assert_eq!(snapshot.phase, Phase::Joining);
        assert_eq!(snapshot.player(Slot::First).unwrap().name, "alice");
        assert!(snapshot.player(Slot::Second).is_none());
        assert!(snapshot.current_player().is_none());
    }

    #[test]
    fn test_closed_receivers_are_pruned() {
        let mut subscribers = Subscribers::default();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, rx2) = mpsc::unbounded_channel();
        subscribers.add(tx1);
        subscribers.add(tx2);
        drop(rx2);

        subscribers.publish(GameEvent::StateUpdated(snapshot()));
        assert_eq!(subscribers.len(), 1);
        assert!(matches!(rx1.try_recv(), Ok(GameEvent::StateUpdated(_))));
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = GameEvent::FailedToStart(snapshot());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "failed_to_start");
        assert_eq!(json["game_id"], 3);
    }
}
