use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::socket::Socket;
use crate::tile::{PaletteMode, State};
use crate::Side;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum CompatibilityError {
    #[error("Asymmetric rule: {0} accepts {2} on its {1:?} side but not the other way around")]
    Asymmetric(State, Side, State),
}

/// Global adjacency policy, fixed for a whole solve.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum CompatibilityMode {
    /// Every socket value is a plain id, sides match iff the ids are equal.
    Single,
    /// Same palette follows its [`PaletteMode`], different palettes only meet on empty edges.
    #[default]
    Multiple,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompatibilityRule {
    mode: CompatibilityMode,
}

impl CompatibilityRule {
    pub fn new(mode: CompatibilityMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> CompatibilityMode {
        self.mode
    }

    /// Whether `neighbor` may sit on the `side` of `current`.
    pub fn is_compatible(&self, side: Side, current: &State, neighbor: &State) -> bool {
        let a = current.socket.get(side);
        let b = neighbor.socket.get(side.opposite());
        match self.mode {
            CompatibilityMode::Single => a == b,
            CompatibilityMode::Multiple if current.palette_id == neighbor.palette_id => {
                match current.palette_mode {
                    PaletteMode::Unfold => a == b && a != Socket::NONE,
                    PaletteMode::Fold => a == b,
                }
            }
            CompatibilityMode::Multiple => a == b && a == Socket::NONE,
        }
    }

    /// Verifies that every pair of `states` is judged the same from both sides.
    pub fn check_symmetry(&self, states: &[State]) -> Result<(), CompatibilityError> {
        for current in states {
            for neighbor in states {
                for side in Side::ALL {
                    if self.is_compatible(side, current, neighbor)
                        != self.is_compatible(side.opposite(), neighbor, current)
                    {
                        return Err(CompatibilityError::Asymmetric(*current, side, *neighbor));
                    }
                }
            }
        }
        Ok(())
    }
}
