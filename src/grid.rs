use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::cell::Cell;
use crate::tile::State;
use crate::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("invalid grid dimensions {width}x{height}, both must be at least 1")]
    InvalidDimensions { width: usize, height: usize },
    #[error("({x}, {y}) is outside of the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// Row-major cells, row 0 is the top edge.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    contradiction: bool,
}

impl Grid {
    /// Seeds every cell with the same candidate states.
    pub fn new(width: usize, height: usize, states: &[State]) -> Result<Grid, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }
        let cell = Cell::new(states.iter().copied());
        Ok(Self {
            width,
            height,
            cells: vec![cell; width * height],
            contradiction: false,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> usize {
        self.width * self.height
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    pub fn has_contradiction(&self) -> bool {
        self.contradiction
    }

    pub(crate) fn set_contradiction(&mut self) {
        self.contradiction = true;
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn check_bounds(&self, x: usize, y: usize) -> Result<usize, GridError> {
        if self.contains(x, y) {
            Ok(self.xy_to_index(x, y))
        } else {
            Err(GridError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        if self.contains(x, y) {
            self.cells.get(self.xy_to_index(x, y))
        } else {
            None
        }
    }

    pub fn is_fully_collapsed(&self) -> bool {
        self.cells.iter().all(Cell::is_collapsed)
    }

    pub fn collapsed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_collapsed()).count()
    }

    /// Sum of all candidate counts. Strictly decreases with every narrowing step.
    pub fn total_candidates(&self) -> usize {
        self.cells.iter().map(Cell::len).sum()
    }

    #[inline]
    pub fn xy_to_index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn index_to_xy(&self, index: usize) -> (usize, usize) {
        let y = index / self.width;
        let x = index % self.width;
        (x, y)
    }

    pub fn get_by_index(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn neighbor_index(&self, x: usize, y: usize, side: Side) -> Option<usize> {
        let (dx, dy) = side.delta();
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        if (0..self.width as i64).contains(&nx) && (0..self.height as i64).contains(&ny) {
            Some(self.xy_to_index(nx as usize, ny as usize))
        } else {
            None
        }
    }

    pub fn neighbor_indexes(&self, x: usize, y: usize) -> [(Side, Option<usize>); 4] {
        Side::ALL.map(|side| (side, self.neighbor_index(x, y, side)))
    }

    pub fn matrix(&self) -> Vec<Vec<Option<State>>> {
        let mut rows = Vec::with_capacity(self.height);
        for y in 0..self.height {
            let mut row = Vec::with_capacity(self.width);
            for x in 0..self.width {
                row.push(self.get(x, y).and_then(|c| c.state().copied()));
            }
            rows.push(row);
        }
        rows
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.width) {
            let line = row
                .iter()
                .map(|cell| match cell.state() {
                    Some(state) => state.tile_id.to_string(),
                    None if cell.is_empty() => "!".to_string(),
                    None => "?".to_string(),
                })
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::Socket;
    use crate::tile::{PaletteId, PaletteMode, TileId};

    fn states() -> Vec<State> {
        (0..3)
            .map(|id| State {
                tile_id: TileId(id),
                socket: Socket::EMPTY,
                palette_id: PaletteId(0),
                palette_mode: PaletteMode::Fold,
                rotation: 0,
            })
            .collect()
    }

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            Grid::new(0, 3, &states()).map(|_| ()),
            Err(GridError::InvalidDimensions {
                width: 0,
                height: 3
            })
        );
        assert!(Grid::new(3, 0, &states()).is_err());
    }

    #[test]
    fn test_new_seeds_every_cell() -> anyhow::Result<()> {
        let grid = Grid::new(4, 3, &states())?;
        assert_eq!(grid.cells().len(), 12);
        assert!(grid.cells().iter().all(|c| c.len() == 3));
        assert_eq!(grid.total_candidates(), 36);
        assert!(!grid.has_contradiction());
        assert!(!grid.is_fully_collapsed());
        Ok(())
    }

    #[test]
    fn test_index_round_trip() -> anyhow::Result<()> {
        let grid = Grid::new(4, 3, &states())?;
        assert_eq!(grid.xy_to_index(3, 2), 11);
        assert_eq!(grid.index_to_xy(5), (1, 1));
        Ok(())
    }

    #[test]
    fn test_neighbors() -> anyhow::Result<()> {
        let grid = Grid::new(3, 3, &states())?;
        assert_eq!(
            grid.neighbor_indexes(0, 0),
            [
                (Side::Up, None),
                (Side::Right, Some(1)),
                (Side::Down, Some(3)),
                (Side::Left, None),
            ]
        );
        assert_eq!(
            grid.neighbor_indexes(1, 1),
            [
                (Side::Up, Some(1)),
                (Side::Right, Some(5)),
                (Side::Down, Some(7)),
                (Side::Left, Some(3)),
            ]
        );
        assert_eq!(grid.neighbor_index(2, 2, Side::Right), None);
        assert_eq!(grid.neighbor_index(2, 2, Side::Down), None);
        Ok(())
    }

    #[test]
    fn test_bounds() -> anyhow::Result<()> {
        let grid = Grid::new(2, 2, &states())?;
        assert_eq!(grid.check_bounds(1, 1), Ok(3));
        assert_eq!(
            grid.check_bounds(2, 0),
            Err(GridError::OutOfBounds {
                x: 2,
                y: 0,
                width: 2,
                height: 2
            })
        );
        assert!(grid.get(0, 2).is_none());
        Ok(())
    }

    #[test]
    fn test_display() -> anyhow::Result<()> {
        let all = states();
        let mut grid = Grid::new(3, 1, &all)?;
        grid.cell_mut(0).force(all[2]);
        grid.cell_mut(2).retain(|_| false);
        assert_eq!(grid.to_string(), "2 ? !\n");
        assert_eq!(grid.matrix(), vec![vec![Some(all[2]), None, None]]);
        Ok(())
    }
}
