/// The step function: advances an attempt by one tick.
///
/// Processing order:
///   1. Movement (mirror rule, each actor judged alone)
///   2. Triggers (button occupancy → door groups, permanent)
///   3. Win check (joint exit occupancy, edge-triggered arrivals)
///
/// Each stage is also a public operation on its own so hosts and tests can
/// drive them individually. `step` is the canonical pipeline.

use std::collections::BTreeSet;

use crate::domain::entity::{Actor, Direction, PerActor};
use crate::domain::rules::{self, StepOutcome};
use super::event::GameEvent;
use super::world::SimState;

/// What happened to each actor on one move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveResult {
    Resolved(PerActor<StepOutcome>),
    /// The level is already complete; nothing moves.
    Refused,
}

impl MoveResult {
    pub fn outcome(&self, actor: Actor) -> Option<StepOutcome> {
        match self {
            MoveResult::Resolved(outcomes) => Some(outcomes[actor]),
            MoveResult::Refused => None,
        }
    }

    pub fn moved(&self, actor: Actor) -> bool {
        self.outcome(actor).is_some_and(StepOutcome::moved)
    }

    pub fn player_moved(&self) -> bool {
        self.moved(Actor::Player)
    }

    pub fn twin_moved(&self) -> bool {
        self.moved(Actor::Twin)
    }

    pub fn any_moved(&self) -> bool {
        self.player_moved() || self.twin_moved()
    }

    pub fn refused(&self) -> bool {
        matches!(self, MoveResult::Refused)
    }
}

/// Win evaluator output for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WinStatus {
    pub completed: bool,
    pub just_arrived: PerActor<bool>,
}

/// Everything a host needs after one tick.
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub moves: Option<MoveResult>,
    pub opened: BTreeSet<String>,
    pub win: WinStatus,
    pub events: Vec<GameEvent>,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(state: &mut SimState, intent: Option<Direction>) -> TickReport {
    if state.is_completed() {
        return TickReport {
            win: WinStatus { completed: true, just_arrived: PerActor::default() },
            ..TickReport::default()
        };
    }

    let mut events = Vec::new();

    let moves = intent.map(|dir| attempt_move(state, dir));
    if let Some(MoveResult::Resolved(outcomes)) = moves {
        for actor in Actor::BOTH {
            events.push(match outcomes[actor] {
                StepOutcome::Moved { from, to } => GameEvent::ActorMoved { actor, from, to },
                StepOutcome::OutOfBounds => GameEvent::ActorBlocked { actor, reason: None },
                StepOutcome::Blocked(kind) => GameEvent::ActorBlocked { actor, reason: Some(kind) },
            });
        }
    }

    let opened = evaluate_triggers(state);
    events.extend(opened.iter().map(|g| GameEvent::DoorGroupOpened { group: g.clone() }));

    let win = evaluate_win(state);
    for actor in Actor::BOTH {
        if win.just_arrived[actor] {
            events.push(GameEvent::ExitReached { actor, at: state.exit(actor) });
        }
    }
    if win.completed {
        events.push(GameEvent::LevelCompleted { level_id: state.level_id() });
    }

    TickReport { moves, opened, win, events }
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

/// Move the player by `dir` and the twin by its opposite.
///
/// Both candidates are judged against the same pre-move state before either
/// is committed, so one actor's outcome never influences the other's.
pub fn attempt_move(state: &mut SimState, dir: Direction) -> MoveResult {
    if state.is_completed() {
        log::debug!("level {} complete, move {:?} refused", state.level_id(), dir);
        return MoveResult::Refused;
    }

    let map = state.map();
    let outcomes = state
        .positions()
        .map(|actor, from| rules::resolve_step(&map, from, actor, dir));

    for actor in Actor::BOTH {
        state.commit_step(actor, outcomes[actor]);
    }
    log::debug!("move {:?}: player {:?}, twin {:?}", dir, outcomes.player, outcomes.twin);

    MoveResult::Resolved(outcomes)
}

// ══════════════════════════════════════════════════════════════
// Triggers
// ══════════════════════════════════════════════════════════════

/// Open every group whose button is occupied by either actor.
/// Returns only the groups that were not already open.
pub fn evaluate_triggers(state: &mut SimState) -> BTreeSet<String> {
    let at = state.positions();
    let pressed: Vec<String> = state
        .buttons()
        .iter()
        .filter(|b| b.pos == at.player || b.pos == at.twin)
        .map(|b| b.opens.clone())
        .collect();

    let mut opened = BTreeSet::new();
    for group in pressed {
        if state.open_group(&group) {
            log::debug!("door group {group:?} opened");
            opened.insert(group);
        }
    }
    opened
}

// ══════════════════════════════════════════════════════════════
// Win
// ══════════════════════════════════════════════════════════════

/// Check joint exit occupancy and update the arrival edge flags.
pub fn evaluate_win(state: &mut SimState) -> WinStatus {
    let at_exit = state.positions().map(|actor, pos| pos == state.exit(actor));
    let just_arrived = at_exit.map(|actor, here| here && !state.was_at_exit(actor));
    state.set_was_at_exit(at_exit);

    let completed = at_exit.player && at_exit.twin;
    if completed && !state.is_completed() {
        state.mark_completed();
        log::info!("level {} complete", state.level_id());
    }
    WinStatus { completed, just_arrived }
}
