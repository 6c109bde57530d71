use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::cell::Cell;
use crate::compatibility::CompatibilityRule;
use crate::grid::{Grid, GridError};
use crate::tile::{PaletteSet, State, StateFactory, TileError};

#[derive(Debug, Error)]
pub enum WaveFunctionCollapseError {
    #[error("{0}")]
    GridError(#[from] GridError),
    #[error("{0}")]
    TileError(#[from] TileError),
    #[error("palette set {0:?} has no enabled tiles")]
    EmptyPalette(String),
    #[error("cell ({x}, {y}) is already collapsed")]
    AlreadyCollapsed { x: usize, y: usize },
    #[error("{state} is not a candidate of cell ({x}, {y})")]
    StateNotCandidate { x: usize, y: usize, state: State },
    #[error("grid has a contradiction, reset before stepping again")]
    Contradicted,
}

/// How the entropy of a cell is measured when looking for the next cell to collapse.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub enum EntropyRule {
    /// Number of distinct tiles, rotations of one tile count once.
    #[default]
    DistinctTiles,
    /// Number of remaining states.
    States,
}

impl EntropyRule {
    pub fn entropy(&self, cell: &Cell) -> usize {
        match self {
            EntropyRule::DistinctTiles => cell.tiles().len(),
            EntropyRule::States => cell.len(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveFunctionCollapseOptions {
    #[serde(default)]
    pub entropy: EntropyRule,
}

pub type Solver = WaveFunctionCollapse<StdRng>;

pub struct WaveFunctionCollapse<R: Rng = StdRng> {
    grid: Grid,
    palette_set: PaletteSet,
    states: Vec<State>,
    rule: CompatibilityRule,
    options: WaveFunctionCollapseOptions,
    rng: R,
    propagation_stack: Vec<usize>,
    queued: Vec<bool>,
}

impl WaveFunctionCollapse<StdRng> {
    pub fn new(
        width: usize,
        height: usize,
        palette_set: PaletteSet,
        seed: u64,
    ) -> Result<Self, WaveFunctionCollapseError> {
        Self::new_with_options(
            width,
            height,
            palette_set,
            WaveFunctionCollapseOptions::default(),
            seed,
        )
    }

    pub fn new_with_options(
        width: usize,
        height: usize,
        palette_set: PaletteSet,
        options: WaveFunctionCollapseOptions,
        seed: u64,
    ) -> Result<Self, WaveFunctionCollapseError> {
        Self::with_rng(
            width,
            height,
            palette_set,
            options,
            StdRng::seed_from_u64(seed),
        )
    }

    /// Restarts the random stream, usually paired with [`Self::reset`] after a contradiction.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

impl<R: Rng> WaveFunctionCollapse<R> {
    pub fn with_rng(
        width: usize,
        height: usize,
        palette_set: PaletteSet,
        options: WaveFunctionCollapseOptions,
        rng: R,
    ) -> Result<Self, WaveFunctionCollapseError> {
        let states = StateFactory::expand(&palette_set);
        if states.is_empty() {
            return Err(WaveFunctionCollapseError::EmptyPalette(palette_set.name));
        }
        let grid = Grid::new(width, height, &states)?;
        info!(
            "new {width}x{height} grid from {:?} with {} states ({:?})",
            palette_set.name,
            states.len(),
            palette_set.compatibility
        );
        let mut wfc = Self {
            queued: vec![false; grid.size()],
            grid,
            rule: CompatibilityRule::new(palette_set.compatibility),
            palette_set,
            states,
            options,
            rng,
            propagation_stack: Vec::new(),
        };
        wfc.check_initial_cells();
        Ok(wfc)
    }

    /// Rebuilds the grid from scratch. The random stream carries on where it left off.
    pub fn reset(
        &mut self,
        width: usize,
        height: usize,
        palette_set: PaletteSet,
    ) -> Result<(), WaveFunctionCollapseError> {
        let states = StateFactory::expand(&palette_set);
        if states.is_empty() {
            return Err(WaveFunctionCollapseError::EmptyPalette(palette_set.name));
        }
        let grid = Grid::new(width, height, &states)?;
        info!(
            "reset to {width}x{height} grid from {:?} with {} states",
            palette_set.name,
            states.len()
        );
        self.queued = vec![false; grid.size()];
        self.propagation_stack.clear();
        self.grid = grid;
        self.rule = CompatibilityRule::new(palette_set.compatibility);
        self.palette_set = palette_set;
        self.states = states;
        self.check_initial_cells();
        Ok(())
    }

    /// Cells seeded with a single candidate start out collapsed and are never propagated from,
    /// so their pairings are checked once up front.
    fn check_initial_cells(&mut self) {
        if !self.is_valid(true) {
            warn!("seeded cells are incompatible with each other");
            self.grid.set_contradiction();
        }
    }

    pub fn resize_width(&mut self, width: usize) -> Result<(), WaveFunctionCollapseError> {
        let palette_set = self.palette_set.clone();
        self.reset(width, self.grid.height(), palette_set)
    }

    pub fn resize_height(&mut self, height: usize) -> Result<(), WaveFunctionCollapseError> {
        let palette_set = self.palette_set.clone();
        self.reset(self.grid.width(), height, palette_set)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_width(&self) -> usize {
        self.grid.width()
    }

    pub fn grid_height(&self) -> usize {
        self.grid.height()
    }

    pub fn palette_set(&self) -> &PaletteSet {
        &self.palette_set
    }

    pub fn options(&self) -> WaveFunctionCollapseOptions {
        self.options
    }

    pub fn rule(&self) -> CompatibilityRule {
        self.rule
    }

    /// Every candidate state, as expanded from the palette set.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn cell_at(&self, x: usize, y: usize) -> Result<&Cell, WaveFunctionCollapseError> {
        let index = self.grid.check_bounds(x, y)?;
        Ok(&self.grid.cells()[index])
    }

    pub fn is_collapsed_at(&self, x: usize, y: usize) -> Result<bool, WaveFunctionCollapseError> {
        Ok(self.cell_at(x, y)?.is_collapsed())
    }

    pub fn is_fully_collapsed(&self) -> bool {
        self.grid.is_fully_collapsed()
    }

    pub fn has_contradiction(&self) -> bool {
        self.grid.has_contradiction()
    }

    pub fn collapsed_states(&self) -> Vec<Vec<Option<State>>> {
        self.grid.matrix()
    }

    /// First cell in row-major order with the lowest entropy that is not collapsed yet.
    pub fn pick_lowest_entropy_cell(&self) -> Option<(usize, usize)> {
        let mut min = usize::MAX;
        let mut found = None;
        for (index, cell) in self.grid.cells().iter().enumerate() {
            if cell.is_collapsed() {
                continue;
            }
            let entropy = self.options.entropy.entropy(cell);
            if entropy < min {
                min = entropy;
                found = Some(index);
            }
        }
        found.map(|index| self.grid.index_to_xy(index))
    }

    /// Collapses the lowest entropy cell and propagates from it.
    ///
    /// Returns the collapsed position, or `None` once the grid is fully collapsed or contradicted.
    pub fn iterate(&mut self) -> Option<(usize, usize)> {
        if self.has_contradiction() {
            return None;
        }
        let (x, y) = self.pick_lowest_entropy_cell()?;
        let index = self.grid.xy_to_index(x, y);
        self.collapse(index);
        Some((x, y))
    }

    /// Collapses a chosen cell at random and propagates from it.
    pub fn iterate_at(&mut self, x: usize, y: usize) -> Result<State, WaveFunctionCollapseError> {
        let index = self.check_target(x, y)?;
        if self.grid.cells()[index].is_collapsed() {
            return Err(WaveFunctionCollapseError::AlreadyCollapsed { x, y });
        }
        self.collapse(index).ok_or(WaveFunctionCollapseError::Contradicted)
    }

    /// Forces a cell to `state` and propagates from it. `state` must still be a candidate of that cell.
    pub fn iterate_with_state(
        &mut self,
        x: usize,
        y: usize,
        state: State,
    ) -> Result<(), WaveFunctionCollapseError> {
        let index = self.check_target(x, y)?;
        if !self.grid.cells()[index].contains(&state) {
            return Err(WaveFunctionCollapseError::StateNotCandidate { x, y, state });
        }
        debug!("force ({x}, {y}) - {state}");
        self.grid.cell_mut(index).force(state);
        self.propagate(index);
        Ok(())
    }

    /// Steps until the grid is fully collapsed or contradicted. Returns `true` if fully collapsed.
    pub fn run(&mut self) -> bool {
        while self.iterate().is_some() {}
        self.is_fully_collapsed()
    }

    fn check_target(&self, x: usize, y: usize) -> Result<usize, WaveFunctionCollapseError> {
        let index = self.grid.check_bounds(x, y)?;
        if self.has_contradiction() {
            return Err(WaveFunctionCollapseError::Contradicted);
        }
        Ok(index)
    }

    fn collapse(&mut self, index: usize) -> Option<State> {
        let Some(state) = self.grid.cell_mut(index).collapse(&mut self.rng) else {
            warn!("cannot collapse empty cell {:?}", self.grid.index_to_xy(index));
            self.grid.set_contradiction();
            return None;
        };
        let (x, y) = self.grid.index_to_xy(index);
        debug!("collapse ({x}, {y}) - {state}");
        self.propagate(index);
        Some(state)
    }

    /// Propagates from a cell without collapsing anything.
    pub fn propagate_from(&mut self, x: usize, y: usize) -> Result<(), WaveFunctionCollapseError> {
        let index = self.check_target(x, y)?;
        self.propagate(index);
        Ok(())
    }

    /// Narrows neighbors until every remaining candidate next to a changed cell has support.
    fn propagate(&mut self, origin: usize) {
        if self.has_contradiction() {
            return;
        }
        self.propagation_stack.clear();
        self.queued.fill(false);
        self.push(origin);

        while let Some(index) = self.propagation_stack.pop() {
            self.queued[index] = false;
            let (x, y) = self.grid.index_to_xy(index);
            let current = self.grid.cells()[index]
                .states()
                .iter()
                .copied()
                .collect::<Vec<_>>();

            for (side, neighbor_index) in self.grid.neighbor_indexes(x, y) {
                let Some(neighbor_index) = neighbor_index else {
                    continue;
                };
                let (nx, ny) = self.grid.index_to_xy(neighbor_index);
                let rule = self.rule;
                let neighbor = self.grid.cell_mut(neighbor_index);
                if neighbor.is_collapsed() {
                    continue;
                }
                let changed = neighbor
                    .retain(|n| current.iter().any(|c| rule.is_compatible(side, c, n)));
                if !changed {
                    continue;
                }
                trace!("narrowed ({nx}, {ny}) to {} states", neighbor.len());
                if neighbor.is_empty() {
                    self.contradiction(neighbor_index);
                    return;
                }
                self.push(neighbor_index);
            }
        }
    }

    fn push(&mut self, index: usize) {
        if !self.queued[index] {
            self.queued[index] = true;
            self.propagation_stack.push(index);
        }
    }

    fn contradiction(&mut self, index: usize) {
        warn!("contradiction at {:?}", self.grid.index_to_xy(index));
        self.grid.set_contradiction();
        self.propagation_stack.clear();
    }

    /// Checks every pair of adjacent collapsed cells against the rule.
    pub fn is_valid(&self, allow_uncollapsed: bool) -> bool {
        for (index, cell) in self.grid.cells().iter().enumerate() {
            let Some(state) = cell.state() else {
                if allow_uncollapsed {
                    continue;
                } else {
                    return false;
                }
            };
            let (x, y) = self.grid.index_to_xy(index);
            for (side, neighbor_index) in self.grid.neighbor_indexes(x, y) {
                let Some(neighbor) = neighbor_index.and_then(|nix| self.grid.get_by_index(nix))
                else {
                    continue;
                };
                let Some(neighbor_state) = neighbor.state() else {
                    // caught when the loop reaches that cell
                    continue;
                };
                if !self.rule.is_compatible(side, state, neighbor_state) {
                    return false;
                }
            }
        }
        true
    }
}
