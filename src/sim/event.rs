/// Events emitted during a simulation step.
/// The presentation layer consumes these for animation/sound.

use crate::domain::entity::{Actor, Pos};
use crate::domain::rules::BlockKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    ActorMoved { actor: Actor, from: Pos, to: Pos },
    ActorBlocked { actor: Actor, reason: Option<BlockKind> }, // None = grid edge
    DoorGroupOpened { group: String },
    ExitReached { actor: Actor, at: Pos },
    LevelCompleted { level_id: u32 },
}
