/// Movement rules — truth-table driven.
///
/// Pure functions operating on a read-only view of the level.
/// These encode "what is legal" without performing the action.
///
/// ## Passability Truth Table
///
/// ┌──────────────────────────────┬───────────┬──────────────┐
/// │ Condition (priority order)    │ Passable? │ Outcome      │
/// ├──────────────────────────────┼───────────┼──────────────┤
/// │ Candidate off the grid        │ NO        │ OutOfBounds  │
/// │ Tile is a wall                │ NO        │ Blocked(Wall)│
/// │ Door, group not yet open      │ NO        │ Blocked(Door)│
/// │ Door, group open              │ YES       │ Moved        │
/// │ Floor / exit / plate          │ YES       │ Moved        │
/// └──────────────────────────────┴───────────┴──────────────┘
///
/// ## Mirror Rule
///
/// One input direction `v` yields two candidates:
///   - player: `player + v`
///   - twin:   `twin − v`
///
/// Each candidate is judged alone against the table above. The other
/// actor's position and outcome never enter the decision; the two
/// characters may share a cell.

use std::collections::{BTreeSet, HashMap};

use super::entity::{Actor, Direction, Pos};
use super::tile::Tile;

/// Why a candidate cell refused an actor.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockKind {
    Wall,
    LockedDoor,
}

/// Result of one actor's half of a move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StepOutcome {
    Moved { from: Pos, to: Pos },
    OutOfBounds,
    Blocked(BlockKind),
}

impl StepOutcome {
    pub fn moved(self) -> bool {
        matches!(self, StepOutcome::Moved { .. })
    }
}

/// Immutable view of the level for rule queries.
pub struct MapView<'a> {
    pub tiles: &'a [Vec<Tile>],
    pub width: usize,
    pub height: usize,
    pub door_groups: &'a HashMap<Pos, String>,
    pub open_groups: &'a BTreeSet<String>,
}

impl<'a> MapView<'a> {
    /// `None` off the grid.
    pub fn tile_at(&self, pos: Pos) -> Option<Tile> {
        if pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        Some(self.tiles[pos.y][pos.x])
    }

    /// Judge a cell. See truth table above.
    pub fn check(&self, pos: Pos) -> Result<(), Option<BlockKind>> {
        let tile = self.tile_at(pos).ok_or(None)?;
        if tile.is_wall() {
            return Err(Some(BlockKind::Wall));
        }
        if let Some(group) = self.door_groups.get(&pos) {
            if !self.open_groups.contains(group) {
                return Err(Some(BlockKind::LockedDoor));
            }
        }
        Ok(())
    }

    pub fn is_passable(&self, pos: Pos) -> bool {
        self.check(pos).is_ok()
    }
}

/// The cell `actor` would try to enter for `input`, if it exists at all.
pub fn candidate(from: Pos, actor: Actor, input: Direction) -> Option<Pos> {
    from.step(actor.heading(input))
}

/// Resolve one actor's half of a move without mutating anything.
pub fn resolve_step(map: &MapView, from: Pos, actor: Actor, input: Direction) -> StepOutcome {
    let Some(to) = candidate(from, actor, input) else {
        return StepOutcome::OutOfBounds;
    };
    match map.check(to) {
        Ok(()) => StepOutcome::Moved { from, to },
        Err(None) => StepOutcome::OutOfBounds,
        Err(Some(kind)) => StepOutcome::Blocked(kind),
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
