/// WorldState: the complete snapshot of a running stage.
///
/// ## Ownership
///
/// The grid owns every block. The world holds only a `CellPos` handle to the
/// block the player last hit; the block behind it is looked up again every
/// frame and may have been erased in between, in which case the handle is
/// simply stale and resolves to nothing.
///
/// ## Camera / Viewport
///
/// World coordinates and screen coordinates are separate:
///   - `camera`: viewport into the world (top-left corner + size)
///   - Renderer maps: `screen = world - camera`
///   - Camera keeps the player centered, clamped to the map extent

use crate::config::{GameConfig, PhysicsConfig, PlayConfig};
use crate::domain::entity::Player;
use crate::domain::grid::{CellPos, TileGrid};

/// Camera: a viewport into the world, in world units.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// World X of the top-left corner of the view.
    pub x: f32,
    /// World Y of the top-left corner of the view.
    pub y: f32,
    pub view_w: f32,
    pub view_h: f32,
}

impl Camera {
    pub fn new(view_w: f32, view_h: f32) -> Self {
        Camera { x: 0.0, y: 0.0, view_w, view_h }
    }

    /// Center on `(target_x, target_y)`, then clamp each axis to `[0, extent - view]`.
    /// The 0 bound is applied last, so a map smaller than the view pins at 0.
    pub fn follow(&mut self, target_x: f32, target_y: f32, extent_w: f32, extent_h: f32) {
        self.x = clamp_axis(target_x, self.view_w, extent_w);
        self.y = clamp_axis(target_y, self.view_h, extent_h);
    }
}

fn clamp_axis(target: f32, view: f32, extent: f32) -> f32 {
    (target - view / 2.0).min(extent - view).max(0.0)
}

pub struct WorldState {
    // ── Map ──
    pub grid: TileGrid,
    pub stage_name: String,

    // ── Entities ──
    pub player: Player,
    /// Handle to the block last hit. Weak: re-resolved through the grid.
    pub target: Option<CellPos>,

    // ── Goal ──
    pub goal_frames: u32,

    // ── Tuning ──
    pub physics: PhysicsConfig,
    pub play: PlayConfig,

    // ── Meta ──
    pub camera: Camera,
    pub tick: u64,
}

impl WorldState {
    /// Build a world with the player centered in `start` and the camera
    /// already clamped around it.
    pub fn new(grid: TileGrid, start: CellPos, stage_name: String, config: &GameConfig) -> Self {
        let (x, y) = start.center(grid.chip_size());
        let physics = config.physics.clone();
        let player = Player::new(
            x, y,
            physics.player_half_width,
            physics.player_half_height,
            config.play.player_power,
        );
        let mut world = WorldState {
            grid,
            stage_name,
            player,
            target: None,
            goal_frames: 0,
            physics,
            play: config.play.clone(),
            camera: Camera::new(config.view.view_width, config.view.view_height),
            tick: 0,
        };
        world.follow_player();
        world
    }

    /// Is the player's center inside a goal cell?
    pub fn at_goal(&self) -> bool {
        self.grid.is_goal(self.player.x, self.player.y)
    }

    /// Has the player waited at the goal long enough for cancel to exit?
    pub fn goal_ready(&self) -> bool {
        self.goal_frames >= self.play.goal_wait_frames
    }

    pub fn follow_player(&mut self) {
        self.camera.follow(
            self.player.x, self.player.y,
            self.grid.pixel_width(), self.grid.pixel_height(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn camera_centers_when_room() {
        let mut cam = Camera::new(640.0, 480.0);
        cam.follow(1000.0, 600.0, 2000.0, 1200.0);
        assert_eq!((cam.x, cam.y), (680.0, 360.0));
    }

    #[test]
    fn camera_clamps_at_both_ends() {
        let mut cam = Camera::new(640.0, 480.0);
        cam.follow(10.0, 10.0, 2000.0, 1200.0);
        assert_eq!((cam.x, cam.y), (0.0, 0.0));
        cam.follow(1990.0, 1190.0, 2000.0, 1200.0);
        assert_eq!((cam.x, cam.y), (1360.0, 720.0));
    }

    #[test]
    fn small_map_pins_to_origin() {
        let mut cam = Camera::new(640.0, 480.0);
        cam.follow(100.0, 100.0, 320.0, 320.0);
        assert_eq!((cam.x, cam.y), (0.0, 0.0));
        // past the view's half-width on a map narrower than the view
        cam.follow(400.0, 300.0, 480.0, 320.0);
        assert_eq!((cam.x, cam.y), (0.0, 0.0));
    }

    #[test]
    fn short_bundled_stage_keeps_camera_at_origin() {
        use crate::sim::level::parse_stage;
        let def = parse_stage(include_str!("../../stages/stage2.txt")).unwrap();
        let world = def.into_world(&GameConfig::default());
        assert!(world.grid.pixel_height() < world.camera.view_h);
        assert_eq!(world.camera.y, 0.0);
        assert!(world.camera.x >= 0.0);
    }

    #[test]
    fn new_world_starts_centered_in_start_cell() {
        let grid = TileGrid::new(4, 4, 32.0);
        let world = WorldState::new(grid, CellPos::new(2, 1), "t".into(), &GameConfig::default());
        assert_eq!((world.player.x, world.player.y), (80.0, 48.0));
        assert_eq!(world.camera, Camera { x: 0.0, y: 0.0, view_w: 640.0, view_h: 480.0 });
        assert_eq!(world.target, None);
        assert!(!world.at_goal());
    }

    proptest! {
        #[test]
        fn camera_stays_inside_map(
            px in 0.0f32..4000.0,
            py in 0.0f32..4000.0,
            w in 32.0f32..3000.0,
            h in 32.0f32..3000.0,
        ) {
            let (px, py) = (px.min(w), py.min(h));
            let mut cam = Camera::new(640.0, 480.0);
            cam.follow(px, py, w, h);
            prop_assert!(cam.x >= 0.0 && cam.x <= (w - 640.0).max(0.0) + 1e-3);
            prop_assert!(cam.y >= 0.0 && cam.y <= (h - 480.0).max(0.0) + 1e-3);
        }
    }
}
