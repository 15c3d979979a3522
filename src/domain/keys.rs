/// Per-frame key snapshot.
///
/// Each logical key carries a hold counter:
///   0  = released
///   1  = pressed this frame       (edge-triggered actions: jump, attack, place, cancel)
///   ≥1 = held for N frames        (level-triggered: movement, diagonal modifiers)
///
/// The simulation only ever reads a `KeyState` value passed in explicitly,
/// so any recorded sequence of snapshots replays deterministically.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Shift,
    Attack,
    Place,
    Jump,
    Cancel,
    NextItem,
}

impl Key {
    pub const ALL: [Key; 10] = [
        Key::Left, Key::Right, Key::Up, Key::Down, Key::Shift,
        Key::Attack, Key::Place, Key::Jump, Key::Cancel, Key::NextItem,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct KeyState {
    counters: [u32; Key::ALL.len()],
}

impl KeyState {
    /// Everything released.
    pub fn new() -> Self {
        KeyState::default()
    }

    /// Builder: same snapshot with `key` at `count`.
    pub fn with(mut self, key: Key, count: u32) -> Self {
        self.set(key, count);
        self
    }

    /// Builder: `key` pressed this frame.
    pub fn press(self, key: Key) -> Self {
        self.with(key, 1)
    }

    /// Builder: `key` held for a while (not a fresh press).
    pub fn hold(self, key: Key) -> Self {
        self.with(key, 2)
    }

    pub fn set(&mut self, key: Key, count: u32) {
        self.counters[key.index()] = count;
    }

    pub fn count(&self, key: Key) -> u32 {
        self.counters[key.index()]
    }

    /// Level trigger: held this frame (fresh or not).
    #[inline]
    pub fn held(&self, key: Key) -> bool {
        self.count(key) >= 1
    }

    /// Edge trigger: went down exactly this frame.
    #[inline]
    pub fn pressed(&self, key: Key) -> bool {
        self.count(key) == 1
    }

    /// Advance one frame from raw "is down" samples: held keys count up,
    /// released keys reset to 0.
    pub fn advance(&mut self, is_down: impl Fn(Key) -> bool) {
        for key in Key::ALL {
            let c = &mut self.counters[key.index()];
            *c = if is_down(key) { c.saturating_add(1) } else { 0 };
        }
    }
}
