/// Collision resolver: the single source of truth for player motion.
///
/// ## Model
///
/// The player body is an axis-aligned box smaller than one cell in both axes
/// (config loading enforces this), so its leading edge spans at most two
/// cells. Each move sweeps that edge cell by cell from where it starts to
/// where it would end and stops at the first solid row or column, so an
/// uncapped fall can never skip over a floor.
///
/// ## Per frame (axis separated)
///
///   1. Horizontal intent: ±speed from held Left/Right, unless Shift is held
///      (Shift belongs to diagonal aiming).
///   2. Jump: fresh Jump press while grounded sets `vy = -jump_power`.
///   3. Gravity: `vy += g` whenever not grounded. `dy = vy`.
///   4. Vertical: sweep the rows under the two leading corners. On a hit,
///      clamp to `margin` units short of the tile face.
///        - ceiling: `vy = -vy` (small rebound, gravity resumes next frame)
///        - floor:   `vy = 0`
///   5. Horizontal: recompute edges, sweep the columns beside the two
///      leading corners, clamp the same way.
///
/// "Grounded" probes `margin` units below the bottom edge, so a body resting
/// exactly `margin` above a floor is grounded. The clamp and the probe must
/// use the same margin or the body jitters between frames.

use crate::config::PhysicsConfig;
use super::entity::{Facing, Player};
use super::grid::{CellPos, TileGrid};
use super::keys::{Key, KeyState};

/// What happened during one `move_player` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveReport {
    pub jumped: bool,
    pub landed: bool,
    pub hit_ceiling: bool,
    pub hit_wall: bool,
}

/// Is there a solid tile directly under either bottom corner?
#[inline]
pub fn is_grounded(grid: &TileGrid, player: &Player, margin: f32) -> bool {
    let probe_y = player.bottom() + margin;
    grid.is_solid(player.left(), probe_y) || grid.is_solid(player.right(), probe_y)
}

pub fn move_player(grid: &TileGrid, player: &mut Player, keys: &KeyState, cfg: &PhysicsConfig) -> MoveReport {
    let mut report = MoveReport::default();
    let chip = grid.chip_size();
    let margin = cfg.edge_margin;

    // 1. Horizontal intent
    let mut dx = 0.0;
    if !keys.held(Key::Shift) {
        if keys.held(Key::Left) {
            dx -= cfg.player_speed;
            player.facing = Facing::Left;
        }
        if keys.held(Key::Right) {
            dx += cfg.player_speed;
            player.facing = Facing::Right;
        }
    }

    // 2. Jump
    let grounded = is_grounded(grid, player, margin);
    if keys.pressed(Key::Jump) && grounded {
        player.vy = -cfg.jump_power;
        report.jumped = true;
    }

    // 3. Gravity
    if !grounded {
        player.vy += cfg.gravity;
    }
    let mut dy = player.vy;

    // 4. Vertical
    let (top, bottom) = (player.top(), player.bottom());
    let (lcol, rcol) = (grid.cell_of(player.left(), 0.0).col, grid.cell_of(player.right(), 0.0).col);
    let row_blocked = |row: i32| {
        grid.is_solid_cell(CellPos::new(lcol, row)) || grid.is_solid_cell(CellPos::new(rcol, row))
    };
    if dy < 0.0 {
        if let Some(row) = first_blocked(top, top + dy, chip, row_blocked) {
            let tile_bottom = (row + 1) as f32 * chip;
            dy = tile_bottom - top + margin;
            player.vy = -player.vy;
            report.hit_ceiling = true;
        }
    } else if dy > 0.0 {
        if let Some(row) = first_blocked(bottom, bottom + dy, chip, row_blocked) {
            let tile_top = row as f32 * chip;
            dy = tile_top - bottom - margin;
            player.vy = 0.0;
            report.landed = true;
        }
    }
    player.y += dy;

    // 5. Horizontal (edges after the vertical move)
    let (left, right) = (player.left(), player.right());
    let (trow, brow) = (grid.cell_of(0.0, player.top()).row, grid.cell_of(0.0, player.bottom()).row);
    let col_blocked = |col: i32| {
        grid.is_solid_cell(CellPos::new(col, trow)) || grid.is_solid_cell(CellPos::new(col, brow))
    };
    if dx < 0.0 {
        if let Some(col) = first_blocked(left, left + dx, chip, col_blocked) {
            let tile_right = (col + 1) as f32 * chip;
            dx = tile_right - left + margin;
            report.hit_wall = true;
        }
    } else if dx > 0.0 {
        if let Some(col) = first_blocked(right, right + dx, chip, col_blocked) {
            let tile_left = col as f32 * chip;
            dx = tile_left - right - margin;
            report.hit_wall = true;
        }
    }
    player.x += dx;
    player.vx = dx;

    report
}

/// Walk the cell lines from the one holding `from` to the one holding `to`
/// and return the first that `blocked` rejects.
fn first_blocked(from: f32, to: f32, chip: f32, blocked: impl Fn(i32) -> bool) -> Option<i32> {
    let start = (from / chip).floor() as i32;
    let end = (to / chip).floor() as i32;
    let step = if end >= start { 1 } else { -1 };
    let mut line = start;
    loop {
        if blocked(line) {
            return Some(line);
        }
        if line == end {
            return None;
        }
        line += step;
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::{Cell, CellPos};
    use crate::domain::tile::Tile;
    use proptest::prelude::*;

    const CHIP: f32 = 32.0;

    fn cfg() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    fn grid_from(rows: &[&str]) -> TileGrid {
        let cells = rows.iter().map(|row| {
            row.chars().map(|ch| match ch {
                '#' => Cell::Tile(Tile::Solid),
                _ => Cell::Tile(Tile::Empty),
            }).collect()
        }).collect();
        TileGrid::from_rows(cells, CHIP)
    }

    fn player_in(col: i32, row: i32) -> Player {
        let (x, y) = CellPos::new(col, row).center(CHIP);
        Player::new(x, y, 12.0, 15.0, 1)
    }

    fn corners_clear(grid: &TileGrid, p: &Player) -> bool {
        !grid.is_solid(p.left(), p.top())
            && !grid.is_solid(p.right(), p.top())
            && !grid.is_solid(p.left(), p.bottom())
            && !grid.is_solid(p.right(), p.bottom())
    }

    // ── gravity / landing ──

    #[test]
    fn free_fall_adds_gravity_once() {
        let g = grid_from(&["   ", "   ", "   ", "   "]);
        let mut p = player_in(1, 1);
        let y0 = p.y;
        move_player(&g, &mut p, &KeyState::new(), &cfg());
        assert_eq!(p.vy, 0.4);
        assert!((p.y - (y0 + 0.4)).abs() < 1e-5);
    }

    #[test]
    fn resting_on_floor_is_stable() {
        let g = grid_from(&["   ", "   ", "###"]);
        let mut p = player_in(1, 1); // bottom = 63, floor top = 64
        assert!(is_grounded(&g, &p, 1.0));
        for _ in 0..10 {
            move_player(&g, &mut p, &KeyState::new(), &cfg());
        }
        assert_eq!(p.y, 48.0);
        assert_eq!(p.vy, 0.0);
    }

    #[test]
    fn falling_body_lands_one_unit_above_floor() {
        let g = grid_from(&["   ", "   ", "   ", "###"]);
        let mut p = player_in(1, 1);
        let mut landed = false;
        for _ in 0..60 {
            landed |= move_player(&g, &mut p, &KeyState::new(), &cfg()).landed;
        }
        assert!(landed);
        assert!((p.bottom() - 95.0).abs() < 1e-3);
        assert_eq!(p.vy, 0.0);
        assert!(is_grounded(&g, &p, 1.0));
    }

    // ── jump / ceiling ──

    #[test]
    fn jump_needs_ground_and_fresh_press() {
        let g = grid_from(&["   ", "   ", "   ", "###"]);
        let mut p = player_in(1, 2);
        let held = KeyState::new().hold(Key::Jump);
        assert!(!move_player(&g, &mut p, &held, &cfg()).jumped);

        let r = move_player(&g, &mut p, &KeyState::new().press(Key::Jump), &cfg());
        assert!(r.jumped);
        assert!(p.y < 80.0);
        assert_eq!(p.vy, -8.0); // no gravity on the take-off frame

        // airborne: a second press does nothing
        let vy = p.vy;
        assert!(!move_player(&g, &mut p, &KeyState::new().press(Key::Jump), &cfg()).jumped);
        assert!((p.vy - (vy + 0.4)).abs() < 1e-5);
    }

    #[test]
    fn ceiling_stops_rise_and_flips_velocity() {
        let g = grid_from(&["###", "   ", "###"]);
        let mut p = player_in(1, 1);
        let r = move_player(&g, &mut p, &KeyState::new().press(Key::Jump), &cfg());
        assert!(r.jumped);
        assert!(r.hit_ceiling);
        assert!((p.top() - 33.0).abs() < 1e-4); // margin below ceiling tile
        assert_eq!(p.vy, 8.0);
    }

    #[test]
    fn map_top_acts_as_ceiling() {
        let g = grid_from(&["   ", "###"]);
        let mut p = player_in(1, 0);
        let r = move_player(&g, &mut p, &KeyState::new().press(Key::Jump), &cfg());
        assert!(r.hit_ceiling);
        assert!(p.top() >= 0.0);
    }

    // ── horizontal ──

    #[test]
    fn walking_sets_facing_and_moves() {
        let g = grid_from(&["   ", "   ", "###"]);
        let mut p = player_in(1, 1);
        move_player(&g, &mut p, &KeyState::new().hold(Key::Left), &cfg());
        assert_eq!(p.x, 45.0);
        assert_eq!(p.facing, Facing::Left);
        move_player(&g, &mut p, &KeyState::new().hold(Key::Right), &cfg());
        assert_eq!(p.x, 48.0);
        assert_eq!(p.facing, Facing::Right);
    }

    #[test]
    fn shift_freezes_horizontal_motion() {
        let g = grid_from(&["   ", "   ", "###"]);
        let mut p = player_in(1, 1);
        move_player(&g, &mut p, &KeyState::new().hold(Key::Shift).hold(Key::Right), &cfg());
        assert_eq!(p.x, 48.0);
        assert_eq!(p.facing, Facing::Right);
    }

    #[test]
    fn wall_clamps_one_unit_short() {
        let g = grid_from(&["   ", "  #", "###"]);
        let mut p = player_in(1, 1);
        let mut hit = false;
        for _ in 0..10 {
            hit |= move_player(&g, &mut p, &KeyState::new().hold(Key::Right), &cfg()).hit_wall;
        }
        assert!(hit);
        assert!((p.right() - 63.0).abs() < 1e-4);
    }

    #[test]
    fn map_edge_acts_as_wall() {
        let g = grid_from(&["   ", "   ", "###"]);
        let mut p = player_in(0, 1);
        for _ in 0..10 {
            move_player(&g, &mut p, &KeyState::new().hold(Key::Left), &cfg());
        }
        assert!((p.left() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn broken_blocks_do_not_support() {
        use crate::domain::block::{Block, BlockKind};
        let mut cells: Vec<Vec<Cell>> = vec![vec![Cell::default(); 3]; 3];
        cells[2][1] = Cell::Block(Block::new(BlockKind::Dirt));
        let mut g = TileGrid::from_rows(cells, CHIP);
        let p = player_in(1, 1);
        assert!(is_grounded(&g, &p, 1.0));
        g.block_in_mut(CellPos::new(1, 2)).unwrap().attacked(1);
        assert!(!is_grounded(&g, &p, 1.0));
    }

    #[test]
    fn long_fall_lands_on_floor_instead_of_inside_it() {
        let mut rows = vec!["   "; 79];
        rows.push("###");
        let g = grid_from(&rows);
        let mut p = player_in(1, 0);
        let mut landed = false;
        for frame in 0..200 {
            landed |= move_player(&g, &mut p, &KeyState::new(), &cfg()).landed;
            assert!(corners_clear(&g, &p), "embedded on frame {frame} at y={}", p.y);
        }
        assert!(landed);
        assert!((p.bottom() - (79.0 * CHIP - 1.0)).abs() < 1e-2);
        assert_eq!(p.vy, 0.0);
        assert!(is_grounded(&g, &p, 1.0));
    }

    #[test]
    fn fast_fall_stops_at_thin_platform() {
        let mut rows = vec!["   "; 40];
        rows[30] = "###";
        let g = grid_from(&rows);
        let mut p = player_in(1, 0);
        p.vy = 60.0; // faster than one cell per frame
        for _ in 0..60 {
            move_player(&g, &mut p, &KeyState::new(), &cfg());
        }
        assert!((p.bottom() - (30.0 * CHIP - 1.0)).abs() < 1e-2);
    }

    // ── property: the body never ends a frame inside a solid ──

    const W: usize = 8;
    const H: usize = 8;

    fn arb_layout() -> impl Strategy<Value = (Vec<bool>, usize)> {
        (prop::collection::vec(prop::bool::weighted(0.3), W * H), 0..W * H)
    }

    fn arb_frames() -> impl Strategy<Value = Vec<(bool, bool, bool, bool)>> {
        prop::collection::vec(any::<(bool, bool, bool, bool)>(), 1..40)
    }

    proptest! {
        #[test]
        fn body_never_embeds_in_solids((mut solids, start) in arb_layout(), frames in arb_frames()) {
            solids[start] = false;
            let cells = (0..H).map(|r| (0..W).map(|c| {
                if solids[r * W + c] { Cell::Tile(Tile::Solid) } else { Cell::default() }
            }).collect()).collect();
            let g = TileGrid::from_rows(cells, CHIP);
            let mut p = player_in((start % W) as i32, (start / W) as i32);
            prop_assert!(corners_clear(&g, &p));

            for (left, right, jump, shift) in frames {
                let mut k = KeyState::new();
                if left { k = k.hold(Key::Left); }
                if right { k = k.hold(Key::Right); }
                if jump { k = k.press(Key::Jump); }
                if shift { k = k.hold(Key::Shift); }
                move_player(&g, &mut p, &k, &cfg());
                prop_assert!(corners_clear(&g, &p), "embedded at ({}, {})", p.x, p.y);
            }
        }
    }
}
