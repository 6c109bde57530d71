use serde::{Deserialize, Serialize};

pub mod cell;
pub mod compatibility;
pub mod grid;
pub mod socket;
pub mod tile;
pub mod wfc;

pub use cell::Cell;
pub use compatibility::{CompatibilityError, CompatibilityMode, CompatibilityRule};
pub use grid::{Grid, GridError};
pub use socket::Socket;
pub use tile::{
    Palette, PaletteId, PaletteMode, PaletteSet, State, StateFactory, SymmetryType, TileError,
    TileId, TileInfo,
};
pub use wfc::{
    EntropyRule, Solver, WaveFunctionCollapse, WaveFunctionCollapseError,
    WaveFunctionCollapseOptions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Side {
    Up,
    Right,
    Down,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Up, Side::Right, Side::Down, Side::Left];

    pub fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Grid offset of the neighbor on this side. Row 0 is the top edge.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Side;

    #[test]
    fn test_opposite_is_involution() {
        for side in Side::ALL {
            assert_ne!(side, side.opposite());
            assert_eq!(side, side.opposite().opposite());
        }
    }

    #[test]
    fn test_opposite_delta_cancels() {
        for side in Side::ALL {
            let (dx, dy) = side.delta();
            let (ox, oy) = side.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }
}
