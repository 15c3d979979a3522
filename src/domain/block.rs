/// Breakable / placeable blocks.
///
/// A block lives in exactly one grid cell. Its lifecycle has two states:
///   1. **Intact**: solid, takes damage from attacks.
///   2. **Broken**: durability hit 0. Inert to further damage and no longer
///      solid, but still occupies (and is drawn in) its cell until the grid's
///      erase pass removes it. `age` counts erase passes survived so the
///      break animation can play out.

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum BlockKind {
    Dirt,
    Wood,
    Stone,
    Iron,
}

impl BlockKind {
    pub const ALL: [BlockKind; 4] = [BlockKind::Dirt, BlockKind::Wood, BlockKind::Stone, BlockKind::Iron];

    /// Durability a freshly generated block of this kind starts with.
    pub fn max_durability(self) -> u32 {
        match self {
            BlockKind::Dirt => 1,
            BlockKind::Wood => 2,
            BlockKind::Stone => 3,
            BlockKind::Iron => 5,
        }
    }

    /// Stage-file token for this kind.
    pub fn token(self) -> char {
        match self {
            BlockKind::Dirt => 'd',
            BlockKind::Wood => 'w',
            BlockKind::Stone => 's',
            BlockKind::Iron => 'i',
        }
    }

    pub fn from_token(ch: char) -> Option<BlockKind> {
        BlockKind::ALL.into_iter().find(|k| k.token() == ch)
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Dirt => "Dirt",
            BlockKind::Wood => "Wood",
            BlockKind::Stone => "Stone",
            BlockKind::Iron => "Iron",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockState {
    Intact,
    Broken { age: u32 },
}

#[derive(Clone, Debug)]
pub struct Block {
    kind: BlockKind,
    durability: u32,
    max_durability: u32,
    state: BlockState,
}

impl Block {
    /// Full-durability block with the kind's default maximum.
    pub fn new(kind: BlockKind) -> Self {
        Block::with_max(kind, kind.max_durability())
    }

    /// Full-durability block with an explicit maximum (re-placing a collected block).
    pub fn with_max(kind: BlockKind, max_durability: u32) -> Self {
        let max_durability = max_durability.max(1);
        Block {
            kind,
            durability: max_durability,
            max_durability,
            state: BlockState::Intact,
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn durability(&self) -> u32 {
        self.durability
    }

    pub fn max_durability(&self) -> u32 {
        self.max_durability
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    pub fn is_broken(&self) -> bool {
        matches!(self.state, BlockState::Broken { .. })
    }

    /// Apply `power` damage. Durability clamps at 0.
    /// Returns true on the single call that breaks the block.
    /// A broken block ignores further attacks.
    pub fn attacked(&mut self, power: u32) -> bool {
        if self.is_broken() {
            return false;
        }
        self.durability = self.durability.saturating_sub(power);
        if self.durability == 0 {
            self.state = BlockState::Broken { age: 0 };
            return true;
        }
        false
    }

    /// One erase pass over a broken block. Returns true once the block has
    /// been broken for at least `break_frames` passes and may be removed.
    pub fn erase_tick(&mut self, break_frames: u32) -> bool {
        match &mut self.state {
            BlockState::Intact => false,
            BlockState::Broken { age } => {
                if *age >= break_frames {
                    true
                } else {
                    *age += 1;
                    false
                }
            }
        }
    }

    /// Crack stage 0..3 for rendering (0 = undamaged, 3 = nearly broken).
    pub fn crack_stage(&self) -> u8 {
        if self.durability >= self.max_durability { return 0; }
        let lost = 1.0 - (self.durability as f32 / self.max_durability as f32);
        if lost < 0.34 { 1 }
        else if lost < 0.67 { 2 }
        else { 3 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_hits_break_a_three_durability_block() {
        let mut b = Block::with_max(BlockKind::Stone, 3);
        assert!(!b.attacked(1));
        assert!(!b.is_broken());
        assert!(!b.attacked(1));
        assert!(!b.is_broken());
        assert!(b.attacked(1)); // third hit breaks
        assert!(b.is_broken());
        assert_eq!(b.durability(), 0);
    }

    #[test]
    fn overkill_clamps_at_zero() {
        let mut b = Block::new(BlockKind::Wood);
        assert!(b.attacked(100));
        assert_eq!(b.durability(), 0);
    }

    #[test]
    fn broken_block_ignores_attacks() {
        let mut b = Block::new(BlockKind::Dirt);
        assert!(b.attacked(1));
        let before = b.state();
        assert!(!b.attacked(1));
        assert_eq!(b.state(), before);
        assert_eq!(b.durability(), 0);
    }

    #[test]
    fn durability_never_exceeds_max() {
        let b = Block::with_max(BlockKind::Iron, 0);
        assert_eq!(b.max_durability(), 1);
        assert!(b.durability() <= b.max_durability());
        for kind in BlockKind::ALL {
            let b = Block::new(kind);
            assert_eq!(b.durability(), b.max_durability());
        }
    }

    #[test]
    fn erase_waits_for_break_animation() {
        let mut b = Block::new(BlockKind::Dirt);
        assert!(!b.erase_tick(2)); // intact: never erased
        b.attacked(1);
        assert!(!b.erase_tick(2)); // age 0→1
        assert!(!b.erase_tick(2)); // age 1→2
        assert!(b.erase_tick(2));
    }

    #[test]
    fn erase_immediately_without_animation() {
        let mut b = Block::new(BlockKind::Dirt);
        b.attacked(1);
        assert!(b.erase_tick(0));
    }

    #[test]
    fn crack_stage_tracks_damage() {
        let mut b = Block::with_max(BlockKind::Stone, 3);
        assert_eq!(b.crack_stage(), 0);
        b.attacked(1);
        assert_eq!(b.crack_stage(), 1);
        b.attacked(1);
        assert_eq!(b.crack_stage(), 2);
    }

    #[test]
    fn tokens_round_trip_kinds() {
        for kind in BlockKind::ALL {
            assert_eq!(BlockKind::from_token(kind.token()), Some(kind));
        }
        assert_eq!(BlockKind::from_token('x'), None);
    }
}
