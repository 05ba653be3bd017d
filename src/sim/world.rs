/// SimState: the live state of one attempt at one level.
///
/// ## Layers
///
/// Static, fixed at parse time:
///   - `tiles`       — terrain grid (walls, exits, plates, door cells)
///   - `door_groups` — door cell → group name
///   - `buttons`     — button cell → group it opens
///   - `exits`       — player's exit (first 'E' in scan order), twin's exit
///
/// Live, reset by `restart()`:
///   - `positions`   — player / twin
///   - `open_groups` — unlocked door groups, only ever grows
///   - `was_at_exit` — previous tick's exit occupancy (edge trigger only)
///   - `completed`   — set by the win evaluator; refuses further moves
///
/// Positions are private. The only way to move an actor is
/// `commit_step`, which re-checks passability before writing.

use std::collections::{BTreeSet, HashMap};

use crate::domain::entity::{Actor, PerActor, Pos};
use crate::domain::rules::{MapView, StepOutcome};
use crate::domain::tile::Tile;

/// A pressure plate that unlocks a door group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Button {
    pub pos: Pos,
    pub opens: String,
}

#[derive(Clone, Debug)]
pub struct SimState {
    level_id: u32,

    // ── Static ──
    tiles: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
    door_groups: HashMap<Pos, String>,
    buttons: Vec<Button>,
    exits: PerActor<Pos>,
    start: PerActor<Pos>,

    // ── Live ──
    positions: PerActor<Pos>,
    open_groups: BTreeSet<String>,
    was_at_exit: PerActor<bool>,
    completed: bool,
}

// ── Construction ──

impl SimState {
    /// Built by the level parser once every invariant has been checked.
    pub(crate) fn new(
        level_id: u32,
        tiles: Vec<Vec<Tile>>,
        door_groups: HashMap<Pos, String>,
        buttons: Vec<Button>,
        exits: PerActor<Pos>,
        start: PerActor<Pos>,
    ) -> Self {
        let height = tiles.len();
        let width = tiles.first().map_or(0, |row| row.len());
        SimState {
            level_id,
            tiles,
            width,
            height,
            door_groups,
            buttons,
            exits,
            start,
            positions: start,
            open_groups: BTreeSet::new(),
            was_at_exit: PerActor::default(),
            completed: false,
        }
    }

    /// Begin a fresh attempt: actors back on their starts, every door shut.
    pub fn restart(&mut self) {
        self.positions = self.start;
        self.open_groups.clear();
        self.was_at_exit = PerActor::default();
        self.completed = false;
        log::debug!("level {} restarted", self.level_id);
    }
}

// ── Queries ──

impl SimState {
    pub fn level_id(&self) -> u32 {
        self.level_id
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn position(&self, actor: Actor) -> Pos {
        self.positions[actor]
    }

    pub fn positions(&self) -> PerActor<Pos> {
        self.positions
    }

    pub fn player(&self) -> Pos {
        self.positions.player
    }

    pub fn twin(&self) -> Pos {
        self.positions.twin
    }

    /// The exit `actor` must reach: exit A for the player, exit B for the twin.
    pub fn exit(&self, actor: Actor) -> Pos {
        self.exits[actor]
    }

    pub fn exit_a(&self) -> Pos {
        self.exits.player
    }

    pub fn exit_b(&self) -> Pos {
        self.exits.twin
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }

    /// Group of the door at `pos`, if that cell is a door.
    pub fn door_group(&self, pos: Pos) -> Option<&str> {
        self.door_groups.get(&pos).map(String::as_str)
    }

    /// Every door cell of `group`, in scan order.
    pub fn door_cells(&self, group: &str) -> Vec<Pos> {
        let mut cells: Vec<Pos> = self
            .door_groups
            .iter()
            .filter(|(_, g)| g.as_str() == group)
            .map(|(p, _)| *p)
            .collect();
        cells.sort_by_key(|p| (p.y, p.x));
        cells
    }

    pub fn open_groups(&self) -> &BTreeSet<String> {
        &self.open_groups
    }

    pub fn is_open(&self, group: &str) -> bool {
        self.open_groups.contains(group)
    }

    pub fn was_at_exit(&self, actor: Actor) -> bool {
        self.was_at_exit[actor]
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn tile_at(&self, pos: Pos) -> Option<Tile> {
        self.map().tile_at(pos)
    }

    pub fn is_passable(&self, pos: Pos) -> bool {
        self.map().is_passable(pos)
    }

    /// Read-only view for rule queries.
    #[inline]
    pub fn map(&self) -> MapView<'_> {
        MapView {
            tiles: &self.tiles,
            width: self.width,
            height: self.height,
            door_groups: &self.door_groups,
            open_groups: &self.open_groups,
        }
    }
}

// ── Mutation (engine only) ──

impl SimState {
    /// Apply one actor's resolved step. Returns whether the position changed.
    ///
    /// The destination is checked again here, so a stale or forged outcome
    /// can never place an actor on an impassable cell.
    pub(crate) fn commit_step(&mut self, actor: Actor, outcome: StepOutcome) -> bool {
        let StepOutcome::Moved { from, to } = outcome else {
            return false;
        };
        if from != self.positions[actor] || !self.is_passable(to) {
            log::warn!("{actor}: refused stale step {from} -> {to}");
            return false;
        }
        self.positions[actor] = to;
        true
    }

    /// Unlock a group. Returns `true` only the first time.
    pub(crate) fn open_group(&mut self, group: &str) -> bool {
        if self.open_groups.contains(group) {
            return false;
        }
        self.open_groups.insert(group.to_string());
        true
    }

    pub(crate) fn set_was_at_exit(&mut self, flags: PerActor<bool>) {
        self.was_at_exit = flags;
    }

    pub(crate) fn mark_completed(&mut self) {
        self.completed = true;
    }

    /// Place an actor directly, for scenario tests. Still refuses
    /// impassable cells.
    #[cfg(test)]
    pub(crate) fn place(&mut self, actor: Actor, pos: Pos) {
        assert!(self.is_passable(pos), "{actor} cannot stand on {pos}");
        self.positions[actor] = pos;
    }
}
