/// Entry point and scene loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use log::{info, warn};
use simplelog::WriteLogger;

use config::GameConfig;
use sim::scene::{GameScene, Transition};
use ui::input::InputState;
use ui::renderer::{Renderer, Screen};

const FRAME_SLEEP: Duration = Duration::from_millis(2);
const LOG_FILE: &str = "blockrunner.log";

enum Scene {
    Title,
    Game(GameScene),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = GameConfig::load();
    init_logging(&config);
    for w in &config.warnings {
        warn!("{w}");
    }
    info!("stage path: {}", config.stage_path.display());

    let mut renderer = Renderer::new();
    renderer.init()?;

    let result = scene_loop(&mut renderer, &config);

    renderer.cleanup()?;
    result
}

/// The terminal belongs to the renderer, so logs go to a file.
fn init_logging(config: &GameConfig) {
    let file = match File::create(LOG_FILE) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Logging disabled, could not create {LOG_FILE}: {e}");
            return;
        }
    };
    if let Err(e) = WriteLogger::init(config.log_level, simplelog::Config::default(), file) {
        eprintln!("Logging disabled: {e}");
    }
}

fn scene_loop(
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = InputState::new();
    let mut scene = Scene::Title;
    let mut last_error: Option<String> = None;
    let stage_label = config.stage_path.display().to_string();

    let tick_rate = Duration::from_millis(config.play.tick_rate_ms);
    let mut last_tick = Instant::now();

    loop {
        input.drain_events();
        if input.ctrl_c_pressed() {
            break;
        }

        let mut next: Option<Scene> = None;
        match &mut scene {
            Scene::Title => {
                if input.was_pressed(KeyCode::Esc) {
                    break;
                }
                if input.was_pressed(KeyCode::Enter) {
                    let game = GameScene::load(&config.stage_path, config);
                    last_error = game.error().map(|e| e.to_string());
                    next = Some(Scene::Game(game));
                    last_tick = Instant::now();
                }
            }
            Scene::Game(game) => {
                if last_tick.elapsed() >= tick_rate {
                    last_tick = Instant::now();
                    let keys = input.tick(last_tick);
                    if game.update(&keys) == Transition::Title {
                        info!("returning to title");
                        next = Some(Scene::Title);
                    }
                }
            }
        }
        if let Some(s) = next {
            scene = s;
            renderer.invalidate();
        }

        let title = Screen::Title { stage: &stage_label, last_error: last_error.as_deref() };
        let screen = match &scene {
            Scene::Title => title,
            Scene::Game(game) => game.world().map_or(title, Screen::Game),
        };
        renderer.render(screen)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
