use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::Cell;

/// Discord-style 64-bit user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
}

impl Participant {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Participant {
            id: ParticipantId(id),
            name: name.into(),
        }
    }
}

/// One of the two fixed seats. `First` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    /// Get the other slot
    pub fn other(self) -> Slot {
        match self {
            Slot::First => Slot::Second,
            Slot::Second => Slot::First,
        }
    }

    /// Convert slot to the piece it drops
    pub fn to_cell(self) -> Cell {
        match self {
            Slot::First => Cell::PlayerOne,
            Slot::Second => Cell::PlayerTwo,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }
}
