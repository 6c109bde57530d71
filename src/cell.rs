use std::collections::BTreeSet;

use rand::prelude::*;

use crate::tile::{PaletteId, State, TileId};

/// The states still possible at one grid position.
///
/// Backed by an ordered set so that seeded collapses are reproducible.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    states: BTreeSet<State>,
}

impl Cell {
    pub fn new<I: IntoIterator<Item = State>>(states: I) -> Self {
        Self {
            states: states.into_iter().collect(),
        }
    }

    pub fn states(&self) -> &BTreeSet<State> {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn is_collapsed(&self) -> bool {
        self.states.len() == 1
    }

    pub fn contains(&self, state: &State) -> bool {
        self.states.contains(state)
    }

    /// The single remaining state, if collapsed.
    pub fn state(&self) -> Option<&State> {
        if self.is_collapsed() {
            self.states.first()
        } else {
            None
        }
    }

    /// Distinct tiles in ascending order. Tile ids are scoped to their palette.
    pub fn tiles(&self) -> Vec<(PaletteId, TileId)> {
        self.states
            .iter()
            .map(State::tile_key)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Picks a tile uniformly, then one of that tile's rotations uniformly, and keeps only it.
    pub(crate) fn collapse(&mut self, rng: &mut impl Rng) -> Option<State> {
        let tile = *self.tiles().choose(rng)?;
        let variants = self
            .states
            .iter()
            .filter(|s| s.tile_key() == tile)
            .collect::<Vec<_>>();
        let state = **variants.choose(rng)?;
        self.force(state);
        Some(state)
    }

    pub(crate) fn force(&mut self, state: State) {
        self.states = BTreeSet::from([state]);
    }

    /// Keeps only the states matching `keep`. Returns `true` if anything was removed.
    pub(crate) fn retain<F: FnMut(&State) -> bool>(&mut self, keep: F) -> bool {
        let before = self.states.len();
        self.states.retain(keep);
        self.states.len() < before
    }
}
