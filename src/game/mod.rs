//! Core Connect Four game logic: board representation, seats, and the game
//! phase machine, with no timers or money attached.

mod board;
mod player;
mod state;

pub use board::{Axis, Board, BoardError, Cell, WinningLine, COLS, CONNECT, ROWS};
pub use player::{Participant, ParticipantId, Slot};
pub use state::{DropError, DropResult, GameOutcome, GameState, LastMove, Phase, Seats};
