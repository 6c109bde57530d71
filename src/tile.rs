use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::compatibility::CompatibilityMode;
use crate::socket::Socket;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    #[error("invalid symmetry class {0:?}")]
    InvalidSymmetry(String),
}

/// Rotational symmetry of a tile's artwork, which decides how many rotated states it expands to.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum SymmetryType {
    /// The art can not be rotated, only the base orientation is used.
    CanNotRotate,
    /// Every rotation looks the same.
    #[default]
    X,
    T,
    /// Rotating twice restores the original.
    I,
    L,
}

impl SymmetryType {
    pub fn rotations(&self) -> u8 {
        match self {
            SymmetryType::CanNotRotate | SymmetryType::X => 1,
            SymmetryType::I => 2,
            SymmetryType::T | SymmetryType::L => 4,
        }
    }
}

impl FromStr for SymmetryType {
    type Err = TileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "X" | "x" => Self::X,
            "T" | "t" => Self::T,
            "I" | "i" => Self::I,
            "L" | "l" => Self::L,
            "N" | "n" | "CanNotRotate" => Self::CanNotRotate,
            other => return Err(TileError::InvalidSymmetry(other.to_string())),
        })
    }
}

impl TryFrom<char> for SymmetryType {
    type Error = TileError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        value.to_string().parse()
    }
}

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct TileId(pub u32);

impl Display for TileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of the source palette inside its [`PaletteSet`].
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct PaletteId(pub usize);

/// How tiles of one palette treat their own connector-less edges.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum PaletteMode {
    /// Two empty edges of the same palette may never touch.
    #[default]
    Unfold,
    /// Empty edges may fold onto each other.
    Fold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileInfo {
    pub tile_id: TileId,
    pub symmetry: SymmetryType,
    pub socket: Socket,
    #[serde(default)]
    pub disabled: bool,
}

impl TileInfo {
    pub fn new(tile_id: u32, symmetry: SymmetryType, socket: Socket) -> Self {
        Self {
            tile_id: TileId(tile_id),
            symmetry,
            socket,
            disabled: false,
        }
    }

    pub fn blank(tile_id: u32) -> Self {
        Self::new(tile_id, SymmetryType::X, Socket::EMPTY)
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub name: String,
    pub mode: PaletteMode,
    pub tiles: Vec<TileInfo>,
}

impl Palette {
    pub fn new(name: impl Into<String>, mode: PaletteMode, tiles: Vec<TileInfo>) -> Self {
        Self {
            name: name.into(),
            mode,
            tiles,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteSet {
    pub name: String,
    pub compatibility: CompatibilityMode,
    pub palettes: Vec<Palette>,
}

impl PaletteSet {
    pub fn new(
        name: impl Into<String>,
        compatibility: CompatibilityMode,
        palettes: Vec<Palette>,
    ) -> Self {
        Self {
            name: name.into(),
            compatibility,
            palettes,
        }
    }

    pub fn single(palette: Palette, compatibility: CompatibilityMode) -> Self {
        Self::new(palette.name.clone(), compatibility, vec![palette])
    }

    /// Maps the older "fill false sockets" switch onto a compatibility mode.
    pub fn from_fill_false_sockets(
        name: impl Into<String>,
        fill_false_sockets: bool,
        palettes: Vec<Palette>,
    ) -> Self {
        let compatibility = if fill_false_sockets {
            CompatibilityMode::Multiple
        } else {
            CompatibilityMode::Single
        };
        Self::new(name, compatibility, palettes)
    }
}

/// One candidate for a cell: a tile in a fixed rotation, with the rotation already applied to its socket.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct State {
    pub tile_id: TileId,
    pub socket: Socket,
    pub palette_id: PaletteId,
    pub palette_mode: PaletteMode,
    /// Clockwise quarter turns, 0..=3.
    pub rotation: u8,
}

impl State {
    /// Identifies the source tile. Tile ids are only unique within one palette.
    pub fn tile_key(&self) -> (PaletteId, TileId) {
        (self.palette_id, self.tile_id)
    }

    pub fn rotated_clockwise(&self) -> Self {
        Self {
            socket: self.socket.rotated_clockwise(),
            rotation: (self.rotation + 1) % 4,
            ..*self
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tile {} (palette {}, rotation {}) [{}]",
            self.tile_id, self.palette_id.0, self.rotation, self.socket
        )
    }
}

pub struct StateFactory;

impl StateFactory {
    pub fn expand_palette(palette_id: PaletteId, palette: &Palette) -> Vec<State> {
        let mut states = Vec::new();
        for tile in palette.tiles.iter().filter(|t| !t.disabled) {
            let mut state = State {
                tile_id: tile.tile_id,
                socket: tile.socket,
                palette_id,
                palette_mode: palette.mode,
                rotation: 0,
            };
            states.push(state);
            for _ in 1..tile.symmetry.rotations() {
                state = state.rotated_clockwise();
                states.push(state);
            }
        }
        states
    }

    /// Expands every enabled tile of every palette, in palette then tile then rotation order.
    pub fn expand(palette_set: &PaletteSet) -> Vec<State> {
        let mut seen = HashSet::new();
        let states = palette_set
            .palettes
            .iter()
            .enumerate()
            .flat_map(|(ix, palette)| Self::expand_palette(PaletteId(ix), palette))
            .filter(|state| seen.insert(*state))
            .collect::<Vec<_>>();
        debug!(
            "expanded palette set {:?} into {} states",
            palette_set.name,
            states.len()
        );
        states
    }
}
