//! Per-kernel cell storage.

use trellis_common::{Bits, BitsError};
use trellis_elaborate::{Cell, Location};

/// The values of every storage cell of one kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimState {
    cells: Vec<Bits>,
}

impl SimState {
    /// Creates storage with each cell at its initial value.
    pub fn new(cells: &[Cell]) -> Self {
        Self {
            cells: cells.iter().map(|c| c.init.clone()).collect(),
        }
    }

    /// Reads the bits at a location.
    pub fn read(&self, loc: Location) -> Result<Bits, BitsError> {
        self.cell(loc)?.slice(loc.range)
    }

    /// Overwrites the bits at a location.
    pub fn write(&mut self, loc: Location, value: &Bits) -> Result<(), BitsError> {
        match self.cells.get_mut(loc.cell.index()) {
            Some(cell) => cell.splice(loc.range.start, value),
            None => Err(BitsError::OutOfRange {
                range: loc.range,
                width: 0,
            }),
        }
    }

    /// Returns every cell value.
    pub fn cells(&self) -> &[Bits] {
        &self.cells
    }

    fn cell(&self, loc: Location) -> Result<&Bits, BitsError> {
        self.cells.get(loc.cell.index()).ok_or(BitsError::OutOfRange {
            range: loc.range,
            width: 0,
        })
    }
}
