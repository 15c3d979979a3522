/// Input state tracker.
///
/// Turns terminal key events into the per-frame `KeyState` snapshot:
///   - Keys are tracked by logical `Key`, not by raw `KeyCode`
///   - Each simulation tick advances the hold counters once
///   - A press that arrives and releases between two ticks still counts
///     as held for one tick, so quick taps are never lost
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.
///
/// Terminals rarely report Shift on its own, so Shift is also considered
/// held while any key event carries the SHIFT modifier (or is an uppercase letter).

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode, poll,
};

use crate::domain::keys::{Key, KeyState};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Logical key for a raw key code. Letters are matched case-insensitively.
pub fn bind(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Esc => Key::Cancel,
        KeyCode::Tab => Key::NextItem,
        KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift) => Key::Shift,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'a' => Key::Left,
            'd' => Key::Right,
            'w' => Key::Up,
            's' => Key::Down,
            'z' | 'j' => Key::Attack,
            'x' | 'k' => Key::Place,
            ' ' => Key::Jump,
            'q' => Key::Cancel,
            'e' => Key::NextItem,
            _ => return None,
        },
        _ => return None,
    };
    Some(key)
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<Key, Instant>,

    /// Keys that went down since the last `tick()`.
    pressed_since_tick: HashSet<Key>,

    /// Hold counters handed to the simulation.
    keys: KeyState,

    /// Raw key events collected during drain, for menu and meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            pressed_since_tick: HashSet::with_capacity(8),
            keys: KeyState::new(),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per loop iteration.
    pub fn drain_events(&mut self) {
        self.raw_events.clear();

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.handle_key(key, Instant::now());
            }
        }
    }

    /// Record one key event observed at `now`.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);

        let shifted = key.modifiers.contains(KeyModifiers::SHIFT)
            || matches!(key.code, KeyCode::Char(c) if c.is_ascii_uppercase());

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                if let Some(k) = bind(key.code) {
                    self.last_active.remove(&k);
                }
            }
            KeyEventKind::Release => {
                // Ignore release when enhancement not confirmed;
                // rely on timeout-based expiry instead
            }
            _ => {
                if let Some(k) = bind(key.code) {
                    self.activate(k, now);
                }
                if shifted {
                    self.activate(Key::Shift, now);
                }
            }
        }
    }

    fn activate(&mut self, key: Key, now: Instant) {
        self.last_active.insert(key, now);
        self.pressed_since_tick.insert(key);
    }

    /// Advance the hold counters by one simulation frame and return the
    /// snapshot for that frame.
    pub fn tick(&mut self, now: Instant) -> KeyState {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        let held = &self.last_active;
        let pressed = &self.pressed_since_tick;
        self.keys.advance(|k| held.contains_key(&k) || pressed.contains(&k));
        self.pressed_since_tick.clear();
        self.keys
    }

    /// Was this raw key pressed during the last drain? Used by menus.
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.raw_events.iter().any(|k| k.code == code && k.kind != KeyEventKind::Release)
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
