/// The step function: advances the world by one frame.
///
/// Processing order:
///   0. Goal freeze (at goal: only the goal counter runs)
///   1. Item cycling
///   2. Attack animation tick
///   3. Attack resolution (collect last target, hit new one)
///   4. Erase pass for broken blocks
///   5. Placement resolution
///   6. Movement / collision
///   7. Camera
///   8. Goal entry (the entering frame counts as the first goal frame)
///
/// Ordering within the frame is the only synchronisation: every phase sees
/// the grid exactly as the previous phase left it.

use log::trace;

use crate::domain::aim::{self, Action, BodyCells};
use crate::domain::block::Block;
use crate::domain::keys::{Key, KeyState};
use crate::domain::physics;
use super::event::GameEvent;
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, keys: &KeyState) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    if world.at_goal() {
        resolve_goal(world, keys, &mut events);
        return events;
    }

    resolve_item_cycle(world, keys);
    world.player.tick_attack();
    resolve_attack(world, keys, &mut events);
    resolve_erase(world, &mut events);
    resolve_place(world, keys, &mut events);
    resolve_movement(world, keys, &mut events);
    world.follow_player();
    if world.at_goal() {
        events.push(GameEvent::GoalReached);
        world.goal_frames = 1;
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Goal
// ══════════════════════════════════════════════════════════════

/// The counter is checked before it advances, so the n-th frame spent at the
/// goal sees a count of n. A stage that starts the player on the goal has no
/// entering frame and reports the goal here instead.
fn resolve_goal(world: &mut WorldState, keys: &KeyState, events: &mut Vec<GameEvent>) {
    if world.goal_frames == 0 {
        events.push(GameEvent::GoalReached);
    }
    if world.goal_ready() && keys.pressed(Key::Cancel) {
        events.push(GameEvent::ExitRequested);
        return;
    }
    world.goal_frames = (world.goal_frames + 1).min(world.play.goal_wait_frames);
}

// ══════════════════════════════════════════════════════════════
// Inventory
// ══════════════════════════════════════════════════════════════

fn resolve_item_cycle(world: &mut WorldState, keys: &KeyState) {
    if keys.pressed(Key::NextItem) {
        world.player.inventory.cycle();
        trace!("selected {:?}", world.player.inventory.selected());
    }
}

// ══════════════════════════════════════════════════════════════
// Attack
// ══════════════════════════════════════════════════════════════

fn resolve_attack(world: &mut WorldState, keys: &KeyState, events: &mut Vec<GameEvent>) {
    if world.player.is_attacking() { return; }

    collect_target(world, events);

    let action = Action::Attack { frames: world.play.attack_frames };
    let aim = match aim::resolve(&world.grid, &mut world.player, keys, action) {
        Some(a) => a,
        None => return,
    };

    let power = world.player.power;
    world.target = match world.grid.block_in_mut(aim.target) {
        Some(block) if !block.is_broken() => {
            let broke = block.attacked(power);
            events.push(GameEvent::BlockHit { pos: aim.target, durability: block.durability() });
            if broke {
                events.push(GameEvent::BlockBroken { pos: aim.target, kind: block.kind() });
            }
            Some(aim.target)
        }
        _ => {
            trace!("attack at {:?} hit nothing", aim.target);
            None
        }
    };
}

/// Move the last-hit block into the inventory once it is broken. A handle
/// whose block has already been erased just lapses.
fn collect_target(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let pos = match world.target { Some(p) => p, None => return };
    match world.grid.block_in(pos) {
        Some(block) if block.is_broken() => {
            let kind = block.kind();
            world.player.inventory.add(kind, block.max_durability());
            world.target = None;
            events.push(GameEvent::BlockCollected { pos, kind });
        }
        Some(_) => {}
        None => {
            trace!("target at {:?} vanished before collection", pos);
            world.target = None;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Erase
// ══════════════════════════════════════════════════════════════

fn resolve_erase(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    for pos in world.grid.erase_broken_blocks(world.play.break_frames) {
        events.push(GameEvent::BlockErased { pos });
    }
}

// ══════════════════════════════════════════════════════════════
// Placement
// ══════════════════════════════════════════════════════════════

fn resolve_place(world: &mut WorldState, keys: &KeyState, events: &mut Vec<GameEvent>) {
    let aim = match aim::resolve(&world.grid, &mut world.player, keys, Action::Place) {
        Some(a) => a,
        None => return,
    };

    let body = BodyCells::of(&world.grid, &world.player);
    if aim.dir.hits_body(aim.target, &body) {
        trace!("placement at {:?} overlaps the player", aim.target);
        return;
    }
    let (tx, ty) = aim.point;
    if !world.grid.can_place(tx, ty) {
        trace!("placement at {:?} is blocked", aim.target);
        return;
    }
    let (kind, max_durability) = match world.player.inventory.take_selected() {
        Some(item) => item,
        None => {
            trace!("nothing to place");
            return;
        }
    };

    world.grid.place(aim.target, Block::with_max(kind, max_durability));
    events.push(GameEvent::BlockPlaced { pos: aim.target, kind });
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

fn resolve_movement(world: &mut WorldState, keys: &KeyState, events: &mut Vec<GameEvent>) {
    let report = physics::move_player(&world.grid, &mut world.player, keys, &world.physics);
    if report.jumped {
        events.push(GameEvent::Jumped);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
