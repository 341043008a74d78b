//! Core types for the ninefold rules and protocol
//!
//! Newtype wrappers carry the validation the wire format cannot express:
//! a [`ShuffleMapping`] is always a bijection on [0,9), and a [`Move`] is
//! always a pair of in-range indices.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::errors::{NinefoldError, ProtocolError};

// ----------------------------------------------------------------------------
// Player
// ----------------------------------------------------------------------------

/// One of the two mark owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// The other player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

// ----------------------------------------------------------------------------
// Board Status
// ----------------------------------------------------------------------------

/// The decided outcome of one small board.
///
/// An undecided board is represented as `None` at the use site; this enum only
/// covers the decided cases so a decided board can never "un-decide".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BoardStatus {
    X,
    O,
    #[serde(rename = "DRAW")]
    Draw,
}

impl BoardStatus {
    /// The winning player, if this board was won rather than drawn.
    pub fn winner(self) -> Option<Player> {
        match self {
            BoardStatus::X => Some(Player::X),
            BoardStatus::O => Some(Player::O),
            BoardStatus::Draw => None,
        }
    }

    /// Whether a player conquered this board (draws do not count).
    pub fn is_conquered(self) -> bool {
        self.winner().is_some()
    }
}

impl From<Player> for BoardStatus {
    fn from(player: Player) -> Self {
        match player {
            Player::X => BoardStatus::X,
            Player::O => BoardStatus::O,
        }
    }
}

// ----------------------------------------------------------------------------
// Move
// ----------------------------------------------------------------------------

/// A single cell placement: board 0-8, cell 0-8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub board_index: usize,
    pub cell_index: usize,
}

impl Move {
    /// Create a move, rejecting out-of-range indices.
    pub fn new(board_index: usize, cell_index: usize) -> Result<Self, NinefoldError> {
        if board_index >= 9 {
            return Err(ProtocolError::IndexOutOfRange { index: board_index }.into());
        }
        if cell_index >= 9 {
            return Err(ProtocolError::IndexOutOfRange { index: cell_index }.into());
        }
        Ok(Self {
            board_index,
            cell_index,
        })
    }

    /// Whether both indices are in range.
    ///
    /// Relayed moves arrive unvalidated, so receivers re-check bounds
    /// before indexing into the grid.
    pub fn in_range(&self) -> bool {
        self.board_index < 9 && self.cell_index < 9
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "board {} cell {}", self.board_index, self.cell_index)
    }
}

// ----------------------------------------------------------------------------
// Shuffle Mapping
// ----------------------------------------------------------------------------

/// A bijection on [0,9): the board at old position `i` relocates to
/// `mapping[i]`.
///
/// Serialized as a bare 9-element JSON array so it matches the
/// `{"shuffleMapping": [...]}` payload on the wire.
// Crate-internal construction (Fisher-Yates) yields permutations by
// construction; everything crossing the crate boundary goes through `new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct ShuffleMapping(pub(crate) [usize; 9]);

impl ShuffleMapping {
    /// Create a mapping, rejecting anything that is not a permutation of 0-8.
    pub fn new(mapping: [usize; 9]) -> Result<Self, NinefoldError> {
        let mut seen = [false; 9];
        for &target in &mapping {
            if target >= 9 || seen[target] {
                return Err(ProtocolError::InvalidMapping.into());
            }
            seen[target] = true;
        }
        Ok(Self(mapping))
    }

    /// The identity permutation.
    pub fn identity() -> Self {
        Self([0, 1, 2, 3, 4, 5, 6, 7, 8])
    }

    /// New position of the board currently at `old_index`.
    pub fn target(&self, old_index: usize) -> usize {
        self.0[old_index]
    }
}

impl TryFrom<Vec<usize>> for ShuffleMapping {
    type Error = NinefoldError;

    fn try_from(v: Vec<usize>) -> Result<Self, Self::Error> {
        let arr: [usize; 9] = v
            .try_into()
            .map_err(|_| NinefoldError::from(ProtocolError::InvalidMapping))?;
        Self::new(arr)
    }
}

impl From<ShuffleMapping> for Vec<usize> {
    fn from(m: ShuffleMapping) -> Self {
        m.0.to_vec()
    }
}

// ----------------------------------------------------------------------------
// Room Identifier
// ----------------------------------------------------------------------------

/// Opaque room identifier used to scope relay traffic.
///
/// The relay treats this as a plain key; any human-friendly formatting
/// (e.g. `A9X-2B4` codes) is owned by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_is_involutive() {
        assert_eq!(Player::X.opponent(), Player::O);
        assert_eq!(Player::O.opponent().opponent(), Player::O);
    }

    #[test]
    fn test_board_status_serde_shape() {
        assert_eq!(serde_json::to_string(&BoardStatus::X).unwrap(), "\"X\"");
        assert_eq!(serde_json::to_string(&BoardStatus::Draw).unwrap(), "\"DRAW\"");
        let parsed: BoardStatus = serde_json::from_str("\"DRAW\"").unwrap();
        assert_eq!(parsed, BoardStatus::Draw);
    }

    #[test]
    fn test_move_bounds() {
        assert!(Move::new(8, 8).is_ok());
        assert!(Move::new(9, 0).is_err());
        assert!(Move::new(0, 9).is_err());
    }

    #[test]
    fn test_mapping_rejects_non_permutations() {
        assert!(ShuffleMapping::new([0, 1, 2, 3, 4, 5, 6, 7, 7]).is_err());
        assert!(ShuffleMapping::new([0, 1, 2, 3, 4, 5, 6, 7, 9]).is_err());
        assert!(ShuffleMapping::new([1, 0, 2, 3, 4, 5, 6, 7, 8]).is_ok());
    }

    #[test]
    fn test_mapping_serde_round_trip() {
        let mapping = ShuffleMapping::new([1, 0, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, "[1,0,2,3,4,5,6,7,8]");
        let back: ShuffleMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mapping);

        let bad: Result<ShuffleMapping, _> = serde_json::from_str("[0,0,2,3,4,5,6,7,8]");
        assert!(bad.is_err());
    }
}
