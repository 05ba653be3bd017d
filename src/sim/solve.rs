/// Breadth-first solver.
///
/// Search state is (player, twin, open groups). Exit arrival flags are not
/// part of the key because completion depends on positions alone. Successors
/// come from the real tick pipeline run on cloned states, so the solver can
/// never disagree with play.

use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::domain::entity::{Direction, PerActor, Pos};
use super::step::step;
use super::world::SimState;

type Key = (PerActor<Pos>, BTreeSet<String>);

fn key(state: &SimState) -> Key {
    (state.positions(), state.open_groups().clone())
}

/// Shortest move sequence that completes the level from `start`.
///
/// Returns `None` when the level cannot be completed or when more than
/// `max_states` distinct states would have to be visited.
pub fn solve(start: &SimState, max_states: usize) -> Option<Vec<Direction>> {
    let mut root = start.clone();
    // Settle the starting cell the same way an idle tick would.
    if step(&mut root, None).win.completed {
        return Some(Vec::new());
    }

    // parent map: key → (previous key, move taken)
    let mut parent: HashMap<Key, Option<(Key, Direction)>> = HashMap::new();
    let mut queue = VecDeque::new();
    parent.insert(key(&root), None);
    queue.push_back(root);

    while let Some(state) = queue.pop_front() {
        let from = key(&state);
        for dir in Direction::ALL {
            let mut next = state.clone();
            let report = step(&mut next, Some(dir));
            if !report.moves.is_some_and(|m| m.any_moved()) {
                continue;
            }
            let k = key(&next);
            if parent.contains_key(&k) {
                continue;
            }
            parent.insert(k.clone(), Some((from.clone(), dir)));

            if report.win.completed {
                let path = rebuild(&parent, k);
                log::debug!("level {} solved in {} moves ({} states)", start.level_id(), path.len(), parent.len());
                return Some(path);
            }
            if parent.len() >= max_states {
                log::warn!("level {}: search budget of {max_states} states exhausted", start.level_id());
                return None;
            }
            queue.push_back(next);
        }
    }
    log::debug!("level {} unsolvable ({} states)", start.level_id(), parent.len());
    None
}

fn rebuild(parent: &HashMap<Key, Option<(Key, Direction)>>, mut at: Key) -> Vec<Direction> {
    let mut path = Vec::new();
    while let Some(Some((prev, dir))) = parent.get(&at) {
        path.push(*dir);
        at = prev.clone();
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::format_moves;
    use crate::sim::level::{LevelDef, LevelPack};

    const BUDGET: usize = 200_000;

    #[test]
    fn level1_is_a_straight_walk() {
        let s = LevelPack::embedded().unwrap().start(1).unwrap();
        let path = solve(&s, BUDGET).unwrap();
        assert_eq!(format_moves(&path), "RRRRRRR");
    }

    #[test]
    fn every_shipped_level_is_solvable() {
        let pack = LevelPack::embedded().unwrap();
        for def in &pack.levels {
            let start = pack.start(def.id).unwrap();
            let path = solve(&start, BUDGET)
                .unwrap_or_else(|| panic!("level {} ({}) has no solution", def.id, def.name));

            // The path must actually complete the level when replayed.
            let mut s = start.clone();
            for d in &path {
                step(&mut s, Some(*d));
            }
            assert!(s.is_completed(), "level {} replay failed", def.id);
        }
    }

    #[test]
    fn solver_does_not_mutate_start() {
        let s = LevelPack::embedded().unwrap().start(11).unwrap();
        let before = (s.positions(), s.open_groups().clone());
        solve(&s, BUDGET).unwrap();
        assert_eq!((s.positions(), s.open_groups().clone()), before);
    }

    #[test]
    fn sealed_level_is_unsolvable() {
        let def = LevelDef {
            id: 1,
            name: "sealed".into(),
            difficulty: String::new(),
            grid: vec!["P#E".into(), "###".into(), "E#M".into()],
            buttons: vec![],
            doors: vec![],
        };
        let s = def.start().unwrap();
        assert_eq!(solve(&s, BUDGET), None);
    }

    #[test]
    fn tiny_budget_gives_up() {
        let s = LevelPack::embedded().unwrap().start(20).unwrap();
        assert_eq!(solve(&s, 10), None);
    }
}
