/// Direction resolver, table driven.
///
/// Turns the held-key snapshot into the cell an attack or placement aims at.
/// One resolver serves both actions; only the trigger key and the side
/// effects differ.
///
/// ## Aim table
///
/// Rules are tried top to bottom; the first match wins. "held" = counter ≥ 1,
/// "free" = counter == 0.
///
/// ┌───────────┬──────────────────────────────────────────┬────────┬──────────┐
/// │ Aim       │ Keys                                      │ Facing │ Offset   │
/// ├───────────┼──────────────────────────────────────────┼────────┼──────────┤
/// │ UpLeft    │ Shift, Left, Up held; Right, Down free    │ Left   │ (-1, -1) │
/// │ UpRight   │ Shift, Right, Up held; Left, Down free    │ Right  │ (+1, -1) │
/// │ DownLeft  │ Shift, Left, Down held; Right, Up free    │ Left   │ (-1, +1) │
/// │ DownRight │ Shift, Right, Down held; Left, Up free    │ Right  │ (+1, +1) │
/// │ Side      │ Up, Down free                             │ -      │ (f, 0)   │
/// │ Up        │ Up held, Down free                        │ -      │ (0, -1)  │
/// │ Down      │ Down held, Up free                        │ -      │ (0, +1)  │
/// │ (none)    │ otherwise (Up and Down both held)         │ -      │ -        │
/// └───────────┴──────────────────────────────────────────┴────────┴──────────┘
///
/// `f` is the player's current facing sign.
///
/// ## Corner veto
///
/// A diagonal aim (h, v) is refused when BOTH orthogonal neighbours are
/// non-empty: the cell beside the player (h, 0) and the cell above/below
/// it (0, v). The player cannot reach through a closed corner.
///
/// ## Side effects
///
/// Once a rule matches (even if the corner veto then refuses it):
///   - diagonals turn the player to the diagonal's horizontal side
///   - an attack starts the player's attack animation
///
/// Placement never animates the player.

use super::entity::{Facing, Player};
use super::grid::{CellPos, TileGrid};
use super::keys::{Key, KeyState};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AimDir {
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    Side,
    Up,
    Down,
}

impl AimDir {
    /// Forced facing for diagonals.
    pub fn facing(self) -> Option<Facing> {
        match self {
            AimDir::UpLeft | AimDir::DownLeft => Some(Facing::Left),
            AimDir::UpRight | AimDir::DownRight => Some(Facing::Right),
            _ => None,
        }
    }

    pub fn is_diagonal(self) -> bool {
        self.facing().is_some()
    }

    /// Cell offset (dcol, drow) relative to the player's center cell.
    pub fn offset(self, facing: Facing) -> (i32, i32) {
        match self {
            AimDir::UpLeft => (-1, -1),
            AimDir::UpRight => (1, -1),
            AimDir::DownLeft => (-1, 1),
            AimDir::DownRight => (1, 1),
            AimDir::Side => (facing.sign(), 0),
            AimDir::Up => (0, -1),
            AimDir::Down => (0, 1),
        }
    }

    /// Would a block placed at `target` overlap the player's own body?
    /// Each aim checks the body corner (or edge) facing the target.
    pub fn hits_body(self, target: CellPos, body: &BodyCells) -> bool {
        match self {
            AimDir::UpLeft => target == CellPos::new(body.left_col, body.top_row),
            AimDir::UpRight => target == CellPos::new(body.right_col, body.top_row),
            AimDir::DownLeft => target == CellPos::new(body.left_col, body.bottom_row),
            AimDir::DownRight => target == CellPos::new(body.right_col, body.bottom_row),
            AimDir::Side => target.col == body.left_col || target.col == body.right_col,
            AimDir::Up => target.row == body.top_row,
            AimDir::Down => target.row == body.bottom_row,
        }
    }
}

struct AimRule {
    dir: AimDir,
    when: fn(&KeyState) -> bool,
}

fn diagonal(k: &KeyState, side: Key, other_side: Key, vert: Key, other_vert: Key) -> bool {
    k.held(Key::Shift) && k.held(side) && !k.held(other_side) && k.held(vert) && !k.held(other_vert)
}

fn up_left(k: &KeyState) -> bool { diagonal(k, Key::Left, Key::Right, Key::Up, Key::Down) }
fn up_right(k: &KeyState) -> bool { diagonal(k, Key::Right, Key::Left, Key::Up, Key::Down) }
fn down_left(k: &KeyState) -> bool { diagonal(k, Key::Left, Key::Right, Key::Down, Key::Up) }
fn down_right(k: &KeyState) -> bool { diagonal(k, Key::Right, Key::Left, Key::Down, Key::Up) }
fn side(k: &KeyState) -> bool { !k.held(Key::Up) && !k.held(Key::Down) }
fn up(k: &KeyState) -> bool { k.held(Key::Up) && !k.held(Key::Down) }
fn down(k: &KeyState) -> bool { !k.held(Key::Up) && k.held(Key::Down) }

const AIM_TABLE: [AimRule; 7] = [
    AimRule { dir: AimDir::UpLeft, when: up_left },
    AimRule { dir: AimDir::UpRight, when: up_right },
    AimRule { dir: AimDir::DownLeft, when: down_left },
    AimRule { dir: AimDir::DownRight, when: down_right },
    AimRule { dir: AimDir::Side, when: side },
    AimRule { dir: AimDir::Up, when: up },
    AimRule { dir: AimDir::Down, when: down },
];

/// First matching row of the aim table, ignoring trigger keys.
pub fn pick_dir(keys: &KeyState) -> Option<AimDir> {
    AIM_TABLE.iter().find(|rule| (rule.when)(keys)).map(|rule| rule.dir)
}

/// Which interaction is being aimed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    /// Attack; starts an attack animation of `frames` frames.
    Attack { frames: u32 },
    Place,
}

impl Action {
    pub fn trigger(self) -> Key {
        match self {
            Action::Attack { .. } => Key::Attack,
            Action::Place => Key::Place,
        }
    }
}

/// A resolved aim: which table row matched, the world point it reaches
/// and the cell containing that point.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Aim {
    pub dir: AimDir,
    pub point: (f32, f32),
    pub target: CellPos,
}

/// Resolve `action` for this frame. Returns None when the trigger key was not
/// freshly pressed, no table row matched, or the corner veto refused a diagonal.
pub fn resolve(grid: &TileGrid, player: &mut Player, keys: &KeyState, action: Action) -> Option<Aim> {
    if !keys.pressed(action.trigger()) {
        return None;
    }
    let dir = pick_dir(keys)?;

    if let Some(facing) = dir.facing() {
        player.facing = facing;
    }
    if let Action::Attack { frames } = action {
        player.attack(frames);
    }

    let chip = grid.chip_size();
    let (dcol, drow) = dir.offset(player.facing);
    let (px, py) = (player.x, player.y);

    if dir.is_diagonal() && corner_closed(grid, px, py, dcol, drow, chip) {
        return None;
    }

    let point = (px + dcol as f32 * chip, py + drow as f32 * chip);
    let target = grid.cell_of(point.0, point.1);
    Some(Aim { dir, point, target })
}

fn corner_closed(grid: &TileGrid, px: f32, py: f32, dcol: i32, drow: i32, chip: f32) -> bool {
    let beside = grid.cell_at(px + dcol as f32 * chip, py);
    let over = grid.cell_at(px, py + drow as f32 * chip);
    !beside.is_empty() && !over.is_empty()
}

/// Cells containing the player's body edges.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BodyCells {
    pub left_col: i32,
    pub right_col: i32,
    pub top_row: i32,
    pub bottom_row: i32,
}

impl BodyCells {
    pub fn of(grid: &TileGrid, player: &Player) -> Self {
        let tl = grid.cell_of(player.left(), player.top());
        let br = grid.cell_of(player.right(), player.bottom());
        BodyCells {
            left_col: tl.col,
            right_col: br.col,
            top_row: tl.row,
            bottom_row: br.row,
        }
    }
}
