/// Events emitted during a simulation step.
/// The loop logs them; the renderer ignores them. They never feed back
/// into the simulation.

use crate::domain::block::BlockKind;
use crate::domain::grid::CellPos;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    BlockHit { pos: CellPos, durability: u32 },
    BlockBroken { pos: CellPos, kind: BlockKind },
    BlockCollected { pos: CellPos, kind: BlockKind },
    BlockErased { pos: CellPos },
    BlockPlaced { pos: CellPos, kind: BlockKind },
    Jumped,
    GoalReached,
    ExitRequested,
}
