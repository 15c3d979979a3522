/// TileGrid: the stage map plus the blocks living in it.
///
/// ## Coordinates
///
/// Two spaces, converted only here:
///   - WORLD: continuous `f32` units, origin at the top-left of the map.
///   - CELL:  integer `(col, row)`; `col = floor(x / chip_size)`.
///
/// Every world coordinate maps to exactly one cell. Negative coordinates map
/// to negative cells, which are out of bounds.
///
/// ## Solidity
///
/// | Cell                     | Solid? |
/// |--------------------------|--------|
/// | out of bounds            | YES    |
/// | `Tile::Solid`            | YES    |
/// | intact block             | YES    |
/// | broken block (pending)   | no     |
/// | empty / goal             | no     |
///
/// Dimensions and chip size are fixed at construction; only cell contents change.

use super::block::Block;
use super::tile::{CellKind, Tile};

/// Integer cell address. May lie outside the grid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct CellPos {
    pub col: i32,
    pub row: i32,
}

impl CellPos {
    pub const fn new(col: i32, row: i32) -> Self {
        CellPos { col, row }
    }

    pub fn offset(self, dcol: i32, drow: i32) -> Self {
        CellPos { col: self.col + dcol, row: self.row + drow }
    }

    /// World coordinate of the cell's center.
    pub fn center(self, chip_size: f32) -> (f32, f32) {
        (
            self.col as f32 * chip_size + chip_size * 0.5,
            self.row as f32 * chip_size + chip_size * 0.5,
        )
    }
}

/// Contents of one cell: a static tile, or an owned block.
#[derive(Clone, Debug)]
pub enum Cell {
    Tile(Tile),
    Block(Block),
}

impl Cell {
    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Tile(t) => CellKind::from(*t),
            Cell::Block(_) => CellKind::Block,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Tile(Tile::Empty)
    }
}

#[derive(Clone, Debug)]
pub struct TileGrid {
    cells: Vec<Vec<Cell>>,
    width: usize,
    height: usize,
    chip_size: f32,
}

// ── Construction ──

impl TileGrid {
    /// All-empty grid.
    pub fn new(width: usize, height: usize, chip_size: f32) -> Self {
        TileGrid {
            cells: vec![vec![Cell::default(); width]; height],
            width,
            height,
            chip_size,
        }
    }

    /// Grid from rows of cells. Short rows are padded with empty cells.
    pub fn from_rows(mut rows: Vec<Vec<Cell>>, chip_size: f32) -> Self {
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        for row in &mut rows {
            row.resize_with(width, Cell::default);
        }
        TileGrid { height: rows.len(), cells: rows, width, chip_size }
    }
}

// ── Dimensions / coordinate mapping ──

impl TileGrid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn chip_size(&self) -> f32 {
        self.chip_size
    }

    /// Map extent in world units.
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * self.chip_size
    }

    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * self.chip_size
    }

    #[inline]
    pub fn cell_of(&self, x: f32, y: f32) -> CellPos {
        CellPos {
            col: (x / self.chip_size).floor() as i32,
            row: (y / self.chip_size).floor() as i32,
        }
    }

    #[inline]
    pub fn in_bounds(&self, pos: CellPos) -> bool {
        pos.col >= 0 && pos.row >= 0
            && (pos.col as usize) < self.width
            && (pos.row as usize) < self.height
    }

    fn cell(&self, pos: CellPos) -> Option<&Cell> {
        if !self.in_bounds(pos) { return None; }
        Some(&self.cells[pos.row as usize][pos.col as usize])
    }

    fn cell_mut(&mut self, pos: CellPos) -> Option<&mut Cell> {
        if !self.in_bounds(pos) { return None; }
        Some(&mut self.cells[pos.row as usize][pos.col as usize])
    }
}

// ── Queries ──

impl TileGrid {
    /// Kind of the cell containing world point (x, y). Out of bounds = Solid.
    pub fn cell_at(&self, x: f32, y: f32) -> CellKind {
        self.kind_at(self.cell_of(x, y))
    }

    pub fn kind_at(&self, pos: CellPos) -> CellKind {
        self.cell(pos).map_or(CellKind::Solid, Cell::kind)
    }

    pub fn block_at(&self, x: f32, y: f32) -> Option<&Block> {
        self.block_in(self.cell_of(x, y))
    }

    pub fn block_in(&self, pos: CellPos) -> Option<&Block> {
        match self.cell(pos) {
            Some(Cell::Block(b)) => Some(b),
            _ => None,
        }
    }

    pub fn block_in_mut(&mut self, pos: CellPos) -> Option<&mut Block> {
        match self.cell_mut(pos) {
            Some(Cell::Block(b)) => Some(b),
            _ => None,
        }
    }

    /// Does the world point (x, y) block movement? See table above.
    #[inline]
    pub fn is_solid(&self, x: f32, y: f32) -> bool {
        self.is_solid_cell(self.cell_of(x, y))
    }

    pub fn is_solid_cell(&self, pos: CellPos) -> bool {
        match self.cell(pos) {
            None => true,
            Some(Cell::Tile(t)) => t.is_solid(),
            Some(Cell::Block(b)) => !b.is_broken(),
        }
    }

    pub fn is_goal(&self, x: f32, y: f32) -> bool {
        matches!(self.cell(self.cell_of(x, y)), Some(Cell::Tile(t)) if t.is_goal())
    }

    /// Can a block be placed in the cell containing (x, y)?
    pub fn can_place(&self, x: f32, y: f32) -> bool {
        self.can_place_in(self.cell_of(x, y))
    }

    pub fn can_place_in(&self, pos: CellPos) -> bool {
        self.in_bounds(pos) && self.kind_at(pos).is_empty()
    }
}

// ── Mutation ──

impl TileGrid {
    /// Put `block` into `pos`. Does nothing (and returns false) unless
    /// `can_place_in(pos)`; callers are expected to check first.
    pub fn place(&mut self, pos: CellPos, block: Block) -> bool {
        if !self.can_place_in(pos) {
            return false;
        }
        if let Some(cell) = self.cell_mut(pos) {
            *cell = Cell::Block(block);
        }
        true
    }

    /// One erase pass: advance every broken block's removal countdown and
    /// clear the cells whose countdown has elapsed. Returns the cleared cells.
    pub fn erase_broken_blocks(&mut self, break_frames: u32) -> Vec<CellPos> {
        let mut erased = vec![];
        for (row, cells) in self.cells.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                let done = match cell {
                    Cell::Block(b) => b.erase_tick(break_frames),
                    Cell::Tile(_) => false,
                };
                if done {
                    *cell = Cell::default();
                    erased.push(CellPos::new(col as i32, row as i32));
                }
            }
        }
        erased
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::block::BlockKind;

    const CHIP: f32 = 32.0;

    fn grid_from(rows: &[&str]) -> TileGrid {
        let cells = rows.iter().map(|row| {
            row.chars().map(|ch| match ch {
                '#' => Cell::Tile(Tile::Solid),
                'G' => Cell::Tile(Tile::Goal),
                'd' => Cell::Block(Block::new(BlockKind::Dirt)),
                's' => Cell::Block(Block::new(BlockKind::Stone)),
                _ => Cell::Tile(Tile::Empty),
            }).collect()
        }).collect();
        TileGrid::from_rows(cells, CHIP)
    }

    #[test]
    fn world_to_cell_uses_floor_division() {
        let g = grid_from(&["   ", "   "]);
        assert_eq!(g.cell_of(0.0, 0.0), CellPos::new(0, 0));
        assert_eq!(g.cell_of(31.9, 32.0), CellPos::new(0, 1));
        assert_eq!(g.cell_of(-0.5, 10.0), CellPos::new(-1, 0));
    }

    #[test]
    fn center_of_cell() {
        assert_eq!(CellPos::new(2, 1).center(CHIP), (80.0, 48.0));
    }

    #[test]
    fn out_of_bounds_is_solid() {
        let g = grid_from(&["  "]);
        assert!(g.is_solid(-1.0, 5.0));
        assert!(g.is_solid(5.0, -1.0));
        assert!(g.is_solid(64.0, 5.0));
        assert!(g.is_solid(5.0, 32.0));
        assert_eq!(g.cell_at(100.0, 100.0), CellKind::Solid);
        assert!(!g.is_solid(5.0, 5.0));
    }

    #[test]
    fn kinds_and_solidity() {
        let g = grid_from(&["#Gd "]);
        assert_eq!(g.cell_at(5.0, 5.0), CellKind::Solid);
        assert_eq!(g.cell_at(40.0, 5.0), CellKind::Goal);
        assert_eq!(g.cell_at(70.0, 5.0), CellKind::Block);
        assert_eq!(g.cell_at(100.0, 5.0), CellKind::Empty);
        assert!(g.is_solid(70.0, 5.0));
        assert!(!g.is_solid(40.0, 5.0));
        assert!(g.is_goal(40.0, 5.0));
    }

    #[test]
    fn broken_block_is_not_solid_but_still_occupies() {
        let mut g = grid_from(&["d "]);
        let pos = CellPos::new(0, 0);
        g.block_in_mut(pos).unwrap().attacked(1);
        assert!(!g.is_solid_cell(pos));
        assert_eq!(g.kind_at(pos), CellKind::Block);
        assert!(!g.can_place_in(pos));
        assert!(g.block_at(5.0, 5.0).is_some());
    }

    #[test]
    fn can_place_only_on_empty_in_bounds() {
        let g = grid_from(&["#Gd "]);
        assert!(!g.can_place(5.0, 5.0));
        assert!(!g.can_place(40.0, 5.0));
        assert!(!g.can_place(70.0, 5.0));
        assert!(g.can_place(100.0, 5.0));
        assert!(!g.can_place(200.0, 5.0));
    }

    #[test]
    fn place_fails_silently_on_occupied_cell() {
        let mut g = grid_from(&["s "]);
        assert!(!g.place(CellPos::new(0, 0), Block::new(BlockKind::Dirt)));
        assert_eq!(g.block_in(CellPos::new(0, 0)).unwrap().kind(), BlockKind::Stone);
        assert!(g.place(CellPos::new(1, 0), Block::new(BlockKind::Dirt)));
        assert!(g.is_solid_cell(CellPos::new(1, 0)));
        assert!(!g.place(CellPos::new(7, 0), Block::new(BlockKind::Dirt)));
    }

    #[test]
    fn erase_pass_clears_only_elapsed_broken_blocks() {
        let mut g = grid_from(&["dds"]);
        g.block_in_mut(CellPos::new(0, 0)).unwrap().attacked(1);
        assert!(g.erase_broken_blocks(1).is_empty());
        g.block_in_mut(CellPos::new(1, 0)).unwrap().attacked(1);

        let erased = g.erase_broken_blocks(1);
        assert_eq!(erased, vec![CellPos::new(0, 0)]);
        assert_eq!(g.kind_at(CellPos::new(0, 0)), CellKind::Empty);
        assert_eq!(g.kind_at(CellPos::new(1, 0)), CellKind::Block);

        assert_eq!(g.erase_broken_blocks(1), vec![CellPos::new(1, 0)]);
        assert_eq!(g.kind_at(CellPos::new(2, 0)), CellKind::Block); // intact stays
    }

    #[test]
    fn ragged_rows_are_padded() {
        let g = grid_from(&["#", "###"]);
        assert_eq!(g.width(), 3);
        assert_eq!(g.height(), 2);
        assert_eq!(g.kind_at(CellPos::new(2, 0)), CellKind::Empty);
        assert_eq!(g.pixel_width(), 96.0);
    }
}
