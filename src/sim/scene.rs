/// Game scene: a loaded stage, or the record of a failed load.
///
/// The outer loop checks the returned `Transition` after every frame and
/// drops the scene (grid, blocks, player) before building the next one.

use std::path::Path;

use log::{debug, error, info};

use crate::config::GameConfig;
use crate::domain::keys::KeyState;
use super::event::GameEvent;
use super::level::{self, StageDef, StageError};
use super::step;
use super::world::WorldState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Transition {
    Continue,
    Title,
}

pub enum GameScene {
    Playing(WorldState),
    /// Load failed: no physics, no interaction; the next update leaves.
    Failed(StageError),
}

impl GameScene {
    pub fn load(path: &Path, config: &GameConfig) -> Self {
        match level::load_stage(path) {
            Ok(def) => GameScene::from_stage(def, config),
            Err(e) => {
                error!("stage load failed: {e}");
                GameScene::Failed(e)
            }
        }
    }

    pub fn from_stage(def: StageDef, config: &GameConfig) -> Self {
        info!("entering stage '{}'", def.name);
        GameScene::Playing(def.into_world(config))
    }

    pub fn update(&mut self, keys: &KeyState) -> Transition {
        let world = match self {
            GameScene::Playing(w) => w,
            GameScene::Failed(_) => return Transition::Title,
        };

        let events = step::step(world, keys);
        let mut transition = Transition::Continue;
        for event in &events {
            debug!(target: "events", "[tick {}] {:?}", world.tick, event);
            if *event == GameEvent::ExitRequested {
                transition = Transition::Title;
            }
        }
        if transition == Transition::Title {
            info!("leaving stage '{}'", world.stage_name);
        }
        transition
    }

    pub fn world(&self) -> Option<&WorldState> {
        match self {
            GameScene::Playing(w) => Some(w),
            GameScene::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&StageError> {
        match self {
            GameScene::Playing(_) => None,
            GameScene::Failed(e) => Some(e),
        }
    }
}
