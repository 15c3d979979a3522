/// Entities: the Player and its block inventory.
///
/// The player is an axis-aligned box around a center point `(x, y)` in world
/// units. Its four edges are derived, never stored.

use std::collections::BTreeMap;

use super::block::BlockKind;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// -1 for left, +1 for right.
    pub fn sign(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }
}

/// Most blocks one stack can hold. Extra blocks of a full kind are dropped.
pub const MAX_STACK: u32 = 999;

/// One inventory slot: how many blocks of a kind are held, and the durability
/// a re-placed block of that kind gets.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ItemStack {
    pub count: u32,
    pub max_durability: u32,
}

/// Blocks carried by the player, keyed by kind, with a selected kind for placement.
#[derive(Clone, Debug, Default)]
pub struct Inventory {
    items: BTreeMap<BlockKind, ItemStack>,
    selected: Option<BlockKind>,
}

impl Inventory {
    pub fn new() -> Self {
        Inventory::default()
    }

    /// Add one block. The first kind ever added becomes the selection.
    pub fn add(&mut self, kind: BlockKind, max_durability: u32) {
        self.add_n(kind, max_durability, 1);
    }

    /// Add `n` blocks of one kind, saturating at `MAX_STACK`.
    pub fn add_n(&mut self, kind: BlockKind, max_durability: u32, n: u32) {
        if n == 0 {
            return;
        }
        let stack = self.items.entry(kind).or_insert(ItemStack { count: 0, max_durability });
        stack.count = stack.count.saturating_add(n).min(MAX_STACK);
        stack.max_durability = max_durability;
        if self.selected.is_none() {
            self.selected = Some(kind);
        }
    }

    pub fn count(&self, kind: BlockKind) -> u32 {
        self.items.get(&kind).map_or(0, |s| s.count)
    }

    pub fn selected(&self) -> Option<BlockKind> {
        self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockKind, ItemStack)> + '_ {
        self.items.iter().map(|(k, s)| (*k, *s))
    }

    /// Remove one of the selected kind. Returns its kind and durability,
    /// or None when nothing is selected. An emptied stack is dropped and
    /// the selection moves on to the next held kind.
    pub fn take_selected(&mut self) -> Option<(BlockKind, u32)> {
        let kind = self.selected?;
        let stack = self.items.get_mut(&kind)?;
        stack.count -= 1;
        let max_durability = stack.max_durability;
        if stack.count == 0 {
            self.items.remove(&kind);
            self.selected = self.next_after(kind);
        }
        Some((kind, max_durability))
    }

    /// Select the next held kind after the current one (wrapping).
    pub fn cycle(&mut self) {
        self.selected = match self.selected {
            Some(kind) => self.next_after(kind),
            None => self.items.keys().next().copied(),
        };
    }

    fn next_after(&self, kind: BlockKind) -> Option<BlockKind> {
        self.items.range(kind..).map(|(k, _)| *k).find(|k| *k != kind)
            .or_else(|| self.items.keys().next().copied())
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub half_width: f32,
    pub half_height: f32,
    /// Horizontal displacement applied last frame.
    pub vx: f32,
    /// Vertical velocity; negative is upward.
    pub vy: f32,
    pub facing: Facing,
    pub power: u32,
    pub inventory: Inventory,
    attack_timer: u32,
}

impl Player {
    pub fn new(x: f32, y: f32, half_width: f32, half_height: f32, power: u32) -> Self {
        Player {
            x, y,
            half_width,
            half_height,
            vx: 0.0,
            vy: 0.0,
            facing: Facing::Right,
            power,
            inventory: Inventory::new(),
            attack_timer: 0,
        }
    }

    pub fn top(&self) -> f32 {
        self.y - self.half_height
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.half_height
    }

    pub fn left(&self) -> f32 {
        self.x - self.half_width
    }

    pub fn right(&self) -> f32 {
        self.x + self.half_width
    }

    pub fn is_attacking(&self) -> bool {
        self.attack_timer > 0
    }

    /// Start (or restart) the attack animation.
    pub fn attack(&mut self, frames: u32) {
        self.attack_timer = frames;
    }

    /// Advance the attack animation by one frame.
    pub fn tick_attack(&mut self) {
        self.attack_timer = self.attack_timer.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_follow_center() {
        let p = Player::new(48.0, 48.0, 12.0, 15.0, 1);
        assert_eq!(p.left(), 36.0);
        assert_eq!(p.right(), 60.0);
        assert_eq!(p.top(), 33.0);
        assert_eq!(p.bottom(), 63.0);
    }

    #[test]
    fn attack_timer_runs_out() {
        let mut p = Player::new(0.0, 0.0, 12.0, 15.0, 1);
        assert!(!p.is_attacking());
        p.attack(2);
        assert!(p.is_attacking());
        p.tick_attack();
        assert!(p.is_attacking());
        p.tick_attack();
        assert!(!p.is_attacking());
        p.tick_attack(); // saturates
        assert!(!p.is_attacking());
    }

    #[test]
    fn inventory_counts_by_kind() {
        let mut inv = Inventory::new();
        inv.add(BlockKind::Wood, 2);
        inv.add(BlockKind::Wood, 2);
        inv.add(BlockKind::Dirt, 1);
        assert_eq!(inv.count(BlockKind::Wood), 2);
        assert_eq!(inv.count(BlockKind::Dirt), 1);
        assert_eq!(inv.count(BlockKind::Iron), 0);
        assert_eq!(inv.selected(), Some(BlockKind::Wood)); // first added
    }

    #[test]
    fn bulk_add_saturates_without_overflow() {
        let mut inv = Inventory::new();
        inv.add_n(BlockKind::Stone, 3, 0);
        assert!(inv.is_empty());
        assert_eq!(inv.selected(), None);
        inv.add_n(BlockKind::Stone, 3, u32::MAX);
        inv.add(BlockKind::Stone, 3);
        assert_eq!(inv.count(BlockKind::Stone), MAX_STACK);
        assert_eq!(inv.selected(), Some(BlockKind::Stone));
    }

    #[test]
    fn take_selected_moves_on_when_stack_empties() {
        let mut inv = Inventory::new();
        inv.add(BlockKind::Stone, 3);
        inv.add(BlockKind::Dirt, 1);
        assert_eq!(inv.take_selected(), Some((BlockKind::Stone, 3)));
        assert_eq!(inv.count(BlockKind::Stone), 0);
        assert_eq!(inv.selected(), Some(BlockKind::Dirt));
        assert_eq!(inv.take_selected(), Some((BlockKind::Dirt, 1)));
        assert_eq!(inv.selected(), None);
        assert!(inv.is_empty());
        assert_eq!(inv.take_selected(), None);
    }

    #[test]
    fn cycle_wraps_through_held_kinds() {
        let mut inv = Inventory::new();
        inv.add(BlockKind::Wood, 2);
        inv.add(BlockKind::Dirt, 1);
        inv.add(BlockKind::Iron, 5);
        assert_eq!(inv.selected(), Some(BlockKind::Wood));
        inv.cycle();
        assert_eq!(inv.selected(), Some(BlockKind::Iron));
        inv.cycle();
        assert_eq!(inv.selected(), Some(BlockKind::Dirt));
        inv.cycle();
        assert_eq!(inv.selected(), Some(BlockKind::Wood));
    }

    #[test]
    fn cycle_on_empty_inventory_selects_nothing() {
        let mut inv = Inventory::new();
        inv.cycle();
        assert_eq!(inv.selected(), None);
    }
}
