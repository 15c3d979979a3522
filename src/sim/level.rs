/// Stage loader.
///
/// ## Stage format (`.txt`):
///   Optional: `= Stage Name`
///   Optional: `+ d3 w1 ...` (starting inventory: kind token + count)
///   Lines: map rows, top row first
///
/// Name and inventory lines are only recognised before the first map row.
/// Empty lines before the map and after it are ignored; a line of spaces is
/// a row. Short rows (including empty lines inside the map) are padded with
/// empty cells.
///
/// ## Tile legend:
///   ' ' / '.' = Empty            '#' = Solid
///   'G' = Goal                   'P' = Player start (exactly one)
///   'd' = Dirt block             'w' = Wood block
///   's' = Stone block            'i' = Iron block

use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::config::GameConfig;
use crate::domain::block::{Block, BlockKind};
use crate::domain::entity::MAX_STACK;
use crate::domain::grid::{Cell, CellPos, TileGrid};
use crate::domain::tile::Tile;
use crate::sim::world::WorldState;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("could not read stage {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stage has no map rows")]
    Empty,

    #[error("unknown tile '{ch}' at line {line}, column {column}")]
    UnknownToken { line: usize, column: usize, ch: char },

    #[error("stage has no start marker 'P'")]
    MissingStart,

    #[error("more than one start marker: ({}, {}) and ({}, {})", first.col, first.row, second.col, second.row)]
    MultipleStarts { first: CellPos, second: CellPos },

    #[error("malformed inventory line {line}")]
    BadMetadata { line: usize },
}

/// A parsed stage, independent of chip size and tuning.
#[derive(Clone, Debug)]
pub struct StageDef {
    pub name: String,
    pub cells: Vec<Vec<Cell>>,
    pub start: CellPos,
    /// Starting inventory, in file order.
    pub inventory: Vec<(BlockKind, u32)>,
}

impl StageDef {
    /// Build a fresh world for this stage.
    pub fn into_world(self, config: &GameConfig) -> WorldState {
        let grid = TileGrid::from_rows(self.cells, config.physics.chip_size);
        let mut world = WorldState::new(grid, self.start, self.name, config);
        for (kind, count) in self.inventory {
            world.player.inventory.add_n(kind, kind.max_durability(), count);
        }
        world
    }
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

pub fn load_stage(path: &Path) -> Result<StageDef, StageError> {
    let text = std::fs::read_to_string(path).map_err(|source| StageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let def = parse_stage(&text)?;
    info!(
        "loaded stage '{}' from {} ({}x{})",
        def.name, path.display(),
        def.cells.first().map_or(0, |r| r.len()), def.cells.len(),
    );
    Ok(def)
}

pub fn parse_stage(text: &str) -> Result<StageDef, StageError> {
    let mut name = String::new();
    let mut inventory = vec![];
    let mut rows: Vec<(usize, &str)> = vec![];

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches('\r');
        if rows.is_empty() {
            if line.is_empty() {
                continue;
            }
            if let Some(rest) = line.strip_prefix('=') {
                name = rest.trim().to_string();
                continue;
            }
            if let Some(rest) = line.strip_prefix('+') {
                inventory.extend(parse_inventory(rest, line_no)?);
                continue;
            }
        }
        rows.push((line_no, line));
    }

    while rows.last().map_or(false, |(_, r)| r.is_empty()) {
        rows.pop();
    }
    if rows.is_empty() {
        return Err(StageError::Empty);
    }

    let mut start: Option<CellPos> = None;
    let mut cells = Vec::with_capacity(rows.len());
    for (row_idx, (line_no, line)) in rows.iter().enumerate() {
        let mut row = vec![];
        for (col_idx, ch) in line.chars().enumerate() {
            let pos = CellPos::new(col_idx as i32, row_idx as i32);
            let cell = match ch {
                ' ' | '.' => Cell::Tile(Tile::Empty),
                '#' => Cell::Tile(Tile::Solid),
                'G' => Cell::Tile(Tile::Goal),
                'P' => {
                    if let Some(first) = start {
                        return Err(StageError::MultipleStarts { first, second: pos });
                    }
                    start = Some(pos);
                    Cell::Tile(Tile::Empty)
                }
                other => match BlockKind::from_token(other) {
                    Some(kind) => Cell::Block(Block::new(kind)),
                    None => {
                        return Err(StageError::UnknownToken {
                            line: *line_no,
                            column: col_idx + 1,
                            ch: other,
                        })
                    }
                },
            };
            row.push(cell);
        }
        cells.push(row);
    }

    let start = start.ok_or(StageError::MissingStart)?;
    if name.is_empty() {
        name = "Unnamed Stage".to_string();
    }

    Ok(StageDef { name, cells, start, inventory })
}

/// `d3 w1` → [(Dirt, 3), (Wood, 1)]. A bare token counts as 1.
fn parse_inventory(rest: &str, line: usize) -> Result<Vec<(BlockKind, u32)>, StageError> {
    rest.split_whitespace()
        .map(|entry| {
            let mut chars = entry.chars();
            let kind = chars.next()
                .and_then(BlockKind::from_token)
                .ok_or(StageError::BadMetadata { line })?;
            let digits = chars.as_str();
            let count = if digits.is_empty() {
                1
            } else {
                digits.parse::<u32>().ok()
                    .filter(|n| *n <= MAX_STACK)
                    .ok_or(StageError::BadMetadata { line })?
            };
            Ok((kind, count))
        })
        .collect()
}
