use serde::{Deserialize, Serialize};

use super::board::{Board, BoardError, WinningLine};
use super::player::{Participant, ParticipantId, Slot};
use crate::error::JoinError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Joining,
    P1Move,
    P2Move,
    Ended,
}

impl Phase {
    fn for_slot(slot: Slot) -> Phase {
        match slot {
            Slot::First => Phase::P1Move,
            Slot::Second => Phase::P2Move,
        }
    }

    /// The slot due to move, if a turn is in progress
    pub fn slot_to_move(self) -> Option<Slot> {
        match self {
            Phase::P1Move => Some(Slot::First),
            Phase::P2Move => Some(Slot::Second),
            Phase::Joining | Phase::Ended => None,
        }
    }
}

/// How a finished game ended, relative to the slot that was due to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    Draw,
    /// The player who just moved completed a line.
    CurrentPlayerWon,
    /// The player due to move ran out of time.
    OtherPlayerWon,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropError {
    #[error("the game has not started yet")]
    NotStarted,
    #[error("the game is over")]
    GameOver,
    #[error("it is not this participant's turn")]
    NotYourTurn,
    #[error("column {0} is out of range")]
    InvalidColumn(usize),
    #[error("column {0} is full")]
    ColumnFull(usize),
}

/// Who sits where. Slot 1 only exists once someone has joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seats {
    Waiting { creator: Participant },
    Seated { players: [Participant; 2] },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub slot: Slot,
    /// Zero-indexed column.
    pub column: usize,
    pub row: usize,
}

/// Result of an accepted drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropResult {
    pub mover: Slot,
    pub row: usize,
    pub outcome: Option<GameOutcome>,
}

/// Board, seats and phase of a single game, without timers or money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    creator_id: ParticipantId,
    board: Board,
    seats: Seats,
    phase: Phase,
    last_move: Option<LastMove>,
    winning_line: Option<WinningLine>,
    outcome: Option<GameOutcome>,
    winner: Option<Slot>,
}

impl GameState {
    /// Create a game waiting for a second participant
    pub fn initial(creator: Participant, rows: usize, columns: usize) -> Self {
        GameState {
            creator_id: creator.id,
            board: Board::new(rows, columns),
            seats: Seats::Waiting { creator },
            phase: Phase::Joining,
            last_move: None,
            winning_line: None,
            outcome: None,
            winner: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn seats(&self) -> &Seats {
        &self.seats
    }

    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    pub fn winning_line(&self) -> Option<WinningLine> {
        self.winning_line
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn is_terminal(&self) -> bool {
        self.phase == Phase::Ended
    }

    /// The participant who opened the game, wherever they ended up seated
    pub fn creator(&self) -> &Participant {
        match &self.seats {
            Seats::Waiting { creator } => creator,
            Seats::Seated { players } => {
                if players[1].id == self.creator_id {
                    &players[1]
                } else {
                    &players[0]
                }
            }
        }
    }

    /// The participant in a slot; slot 1 is empty while joining
    pub fn player(&self, slot: Slot) -> Option<&Participant> {
        match (&self.seats, slot) {
            (Seats::Waiting { creator }, Slot::First) => Some(creator),
            (Seats::Waiting { .. }, Slot::Second) => None,
            (Seats::Seated { players }, slot) => Some(&players[slot.index()]),
        }
    }

    pub fn players(&self) -> Option<&[Participant; 2]> {
        match &self.seats {
            Seats::Seated { players } => Some(players),
            Seats::Waiting { .. } => None,
        }
    }

    /// The slot a seated participant occupies
    pub fn slot_of(&self, id: ParticipantId) -> Option<Slot> {
        let players = self.players()?;
        [Slot::First, Slot::Second]
            .into_iter()
            .find(|slot| players[slot.index()].id == id)
    }

    /// The participant due to move
    pub fn current_player(&self) -> Option<&Participant> {
        self.phase.slot_to_move().and_then(|slot| self.player(slot))
    }

    pub fn winner(&self) -> Option<Slot> {
        self.winner
    }

    pub fn winner_player(&self) -> Option<&Participant> {
        self.winner.and_then(|slot| self.player(slot))
    }

    /// Check whether `id` may take the free seat
    pub fn check_join(&self, id: ParticipantId) -> Result<(), JoinError> {
        match &self.seats {
            Seats::Waiting { creator } if self.phase == Phase::Joining => {
                if creator.id == id {
                    Err(JoinError::SelfJoin)
                } else {
                    Ok(())
                }
            }
            _ => Err(JoinError::NotJoinable),
        }
    }

    /// Seat the joiner, first if `joiner_first`, and start the first turn
    pub fn seat(&mut self, joiner: Participant, joiner_first: bool) -> Result<(), JoinError> {
        self.check_join(joiner.id)?;
        let Seats::Waiting { creator } = &self.seats else {
            return Err(JoinError::NotJoinable);
        };
        let creator = creator.clone();
        let players = if joiner_first {
            [joiner, creator]
        } else {
            [creator, joiner]
        };
        self.seats = Seats::Seated { players };
        self.phase = Phase::P1Move;
        Ok(())
    }

    /// Drop a piece for `id` into a one-indexed column
    pub fn apply_drop(
        &mut self,
        id: ParticipantId,
        column_number: usize,
    ) -> Result<DropResult, DropError> {
        let mover = match self.phase {
            Phase::Joining => return Err(DropError::NotStarted),
            Phase::Ended => return Err(DropError::GameOver),
            phase => phase.slot_to_move().ok_or(DropError::NotStarted)?,
        };
        if self.slot_of(id) != Some(mover) {
            return Err(DropError::NotYourTurn);
        }
        if column_number == 0 || column_number > self.board.columns() {
            return Err(DropError::InvalidColumn(column_number));
        }

        let column = column_number - 1;
        let row = self
            .board
            .drop_piece(column, mover.to_cell())
            .map_err(|e| match e {
                BoardError::ColumnFull(_) => DropError::ColumnFull(column_number),
                BoardError::InvalidColumn(_) => DropError::InvalidColumn(column_number),
            })?;
        self.last_move = Some(LastMove { slot: mover, column, row });

        let outcome = if let Some(line) = self.board.winning_line() {
            self.winning_line = Some(line);
            self.winner = Some(mover);
            Some(GameOutcome::CurrentPlayerWon)
        } else if self.board.is_full() {
            Some(GameOutcome::Draw)
        } else {
            None
        };

        match outcome {
            Some(outcome) => {
                self.outcome = Some(outcome);
                self.phase = Phase::Ended;
            }
            None => self.phase = Phase::for_slot(mover.other()),
        }

        Ok(DropResult { mover, row, outcome })
    }

    /// End the game because the player due to move ran out of time.
    /// Returns the slot that wins by forfeit.
    pub fn forfeit_turn(&mut self) -> Option<Slot> {
        let timed_out = self.phase.slot_to_move()?;
        let winner = timed_out.other();
        self.winner = Some(winner);
        self.outcome = Some(GameOutcome::OtherPlayerWon);
        self.phase = Phase::Ended;
        Some(winner)
    }

    /// End a game nobody joined. Returns false if it already started or ended.
    pub fn abandon(&mut self) -> bool {
        if self.phase != Phase::Joining {
            return false;
        }
        self.phase = Phase::Ended;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Cell, COLS, ROWS};

    fn alice() -> Participant {
        Participant::new(1, "alice")
    }

    fn bob() -> Participant {
        Participant::new(2, "bob")
    }

    /// Alice first, Bob second
    fn started() -> GameState {
        let mut state = GameState::initial(alice(), ROWS, COLS);
        state.seat(bob(), false).unwrap();
        state
    }

    fn play(state: &mut GameState, columns: &[usize]) -> Option<GameOutcome> {
        let mut last = None;
        for &column in columns {
            let id = state.current_player().unwrap().id;
            last = state.apply_drop(id, column).unwrap().outcome;
        }
        last
    }

    #[test]
    fn test_initial_state() {
        let state = GameState::initial(alice(), ROWS, COLS);
        assert_eq!(state.phase(), Phase::Joining);
        assert_eq!(state.player(Slot::First), Some(&alice()));
        assert!(state.player(Slot::Second).is_none());
        assert!(state.current_player().is_none());
    }

    #[test]
    fn test_join_rules() {
        let mut state = GameState::initial(alice(), ROWS, COLS);
        assert_eq!(state.check_join(alice().id), Err(JoinError::SelfJoin));
        state.seat(bob(), true).unwrap();
        assert_eq!(state.player(Slot::First), Some(&bob()));
        assert_eq!(state.player(Slot::Second), Some(&alice()));
        assert_eq!(state.creator(), &alice());
        assert_eq!(state.phase(), Phase::P1Move);
        assert_eq!(
            state.seat(Participant::new(3, "carol"), false),
            Err(JoinError::NotJoinable)
        );
    }

    #[test]
    fn test_drop_before_start() {
        let mut state = GameState::initial(alice(), ROWS, COLS);
        assert_eq!(state.apply_drop(alice().id, 1), Err(DropError::NotStarted));
    }

    #[test]
    fn test_turn_order_enforced() {
        let mut state = started();
        assert_eq!(state.apply_drop(bob().id, 1), Err(DropError::NotYourTurn));
        assert_eq!(
            state.apply_drop(ParticipantId(99), 1),
            Err(DropError::NotYourTurn)
        );
        state.apply_drop(alice().id, 4).unwrap();
        assert_eq!(state.phase(), Phase::P2Move);
        assert_eq!(state.apply_drop(alice().id, 4), Err(DropError::NotYourTurn));
    }

    #[test]
    fn test_column_bounds_are_one_indexed() {
        let mut state = started();
        assert_eq!(
            state.apply_drop(alice().id, 0),
            Err(DropError::InvalidColumn(0))
        );
        assert_eq!(
            state.apply_drop(alice().id, 8),
            Err(DropError::InvalidColumn(8))
        );
        let result = state.apply_drop(alice().id, 7).unwrap();
        assert_eq!(result.row, 0);
        assert_eq!(state.board().get(6, 0), Cell::PlayerOne);
    }

    #[test]
    fn test_full_column_rejected_without_turn_change() {
        let mut state = started();
        play(&mut state, &[1, 1, 1, 1, 1, 1]);
        assert_eq!(state.apply_drop(alice().id, 1), Err(DropError::ColumnFull(1)));
        assert_eq!(state.phase(), Phase::P1Move);
    }

    #[test]
    fn test_horizontal_win_for_first_slot() {
        let mut state = started();
        let outcome = play(&mut state, &[1, 7, 2, 7, 3, 7, 4]);
        assert_eq!(outcome, Some(GameOutcome::CurrentPlayerWon));
        assert!(state.is_terminal());
        assert_eq!(state.winner_player(), Some(&alice()));
        assert_eq!(state.apply_drop(bob().id, 5), Err(DropError::GameOver));
    }

    #[test]
    fn test_vertical_win() {
        let mut state = started();
        let outcome = play(&mut state, &[1, 2, 1, 2, 1, 2, 1]);
        assert_eq!(outcome, Some(GameOutcome::CurrentPlayerWon));
        assert_eq!(state.winner(), Some(Slot::First));
    }

    #[test]
    fn test_second_slot_can_win() {
        let mut state = started();
        let outcome = play(&mut state, &[1, 2, 1, 2, 1, 2, 3, 2]);
        assert_eq!(outcome, Some(GameOutcome::CurrentPlayerWon));
        assert_eq!(state.winner_player(), Some(&bob()));
    }

    #[test]
    fn test_draw_on_full_board() {
        let mut state = started();
        let order = [1, 3, 2, 4, 5, 7, 6];
        let moves: Vec<usize> = order.iter().copied().cycle().take(ROWS * COLS).collect();
        let outcome = play(&mut state, &moves);
        assert_eq!(outcome, Some(GameOutcome::Draw));
        assert!(state.winner().is_none());
        assert!(state.board().is_full());
    }

    #[test]
    fn test_forfeit_awards_other_slot() {
        let mut state = started();
        play(&mut state, &[4]);
        assert_eq!(state.forfeit_turn(), Some(Slot::First));
        assert_eq!(state.outcome(), Some(GameOutcome::OtherPlayerWon));
        assert_eq!(state.forfeit_turn(), None);
    }

    #[test]
    fn test_abandon_only_while_joining() {
        let mut state = GameState::initial(alice(), ROWS, COLS);
        assert!(state.abandon());
        assert_eq!(state.phase(), Phase::Ended);
        assert!(!state.abandon());
        assert!(!started().abandon());
    }
}
