/// Static tile types and the per-cell query result.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,
    Solid, // indestructible wall
    Goal,  // stage exit marker, passable
}

impl Tile {
    /// Does this tile block movement?
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Solid)
    }

    pub fn is_goal(self) -> bool {
        matches!(self, Tile::Goal)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}

/// What a grid query sees at a cell: the static tile, or a block on top of it.
///
/// Out-of-bounds cells report `Solid` so map edges behave like walls.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellKind {
    Empty,
    Solid,
    Goal,
    Block,
}

impl CellKind {
    pub fn is_empty(self) -> bool {
        matches!(self, CellKind::Empty)
    }
}

impl From<Tile> for CellKind {
    fn from(tile: Tile) -> Self {
        match tile {
            Tile::Empty => CellKind::Empty,
            Tile::Solid => CellKind::Solid,
            Tile::Goal => CellKind::Goal,
        }
    }
}
