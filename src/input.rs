/// Input state tracker.
///
/// Turns held direction keys into at most one move intent per call:
///   - Right beats Left, Down beats Up on the same axis
///   - With both axes held, the axis of the most recent press wins
///   - Repeats are rate-limited per key by `repeat_delay_ms`
///
/// Pure: the host passes the current time in milliseconds, so the resolver
/// works the same under a terminal, a test, or a replay.

use std::collections::HashMap;

use crate::config::InputConfig;
use crate::domain::entity::Direction;

pub struct InputResolver {
    /// Held keys with the sequence number of their press.
    held: HashMap<Direction, u64>,

    /// Monotonic press counter, so "most recent" survives releases.
    seq: u64,

    /// Timestamp (ms) of the last emitted move, per key.
    last_emit: HashMap<Direction, u64>,

    repeat_delay_ms: u64,
}

impl InputResolver {
    pub fn new(cfg: &InputConfig) -> Self {
        Self::with_delay(cfg.repeat_delay_ms)
    }

    pub fn with_delay(repeat_delay_ms: u64) -> Self {
        InputResolver {
            held: HashMap::with_capacity(4),
            seq: 0,
            last_emit: HashMap::with_capacity(4),
            repeat_delay_ms,
        }
    }

    /// Key went down (or auto-repeated).
    pub fn press(&mut self, dir: Direction) {
        if self.held.contains_key(&dir) {
            return;
        }
        self.seq += 1;
        self.held.insert(dir, self.seq);
    }

    pub fn release(&mut self, dir: Direction) {
        self.held.remove(&dir);
    }

    /// Forget everything, e.g. on focus loss or level change.
    pub fn clear(&mut self) {
        self.held.clear();
        self.last_emit.clear();
    }

    pub fn is_held(&self, dir: Direction) -> bool {
        self.held.contains_key(&dir)
    }

    /// Most recently pressed key that is still held.
    pub fn last_pressed(&self) -> Option<Direction> {
        self.held.iter().max_by_key(|(_, seq)| **seq).map(|(d, _)| *d)
    }

    /// The direction to move this call, if any.
    pub fn resolve(&mut self, now_ms: u64) -> Option<Direction> {
        let horizontal = if self.is_held(Direction::Right) {
            Some(Direction::Right)
        } else if self.is_held(Direction::Left) {
            Some(Direction::Left)
        } else {
            None
        };
        let vertical = if self.is_held(Direction::Down) {
            Some(Direction::Down)
        } else if self.is_held(Direction::Up) {
            Some(Direction::Up)
        } else {
            None
        };

        let last = self.last_pressed()?;
        let dir = match (horizontal, vertical) {
            (Some(h), Some(v)) => if last.is_vertical() { v } else { h },
            (Some(h), None) => h,
            (None, Some(v)) => v,
            (None, None) => return None,
        };

        // Gate on the key the player touched last, not the resolved one.
        if let Some(&t) = self.last_emit.get(&last) {
            if now_ms.saturating_sub(t) < self.repeat_delay_ms {
                return None;
            }
        }
        self.last_emit.insert(last, now_ms);
        Some(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::*;

    fn resolver() -> InputResolver {
        InputResolver::new(&InputConfig::default())
    }

    #[test]
    fn nothing_held_gives_nothing() {
        let mut r = resolver();
        assert_eq!(r.resolve(0), None);
    }

    #[test]
    fn first_press_fires_immediately() {
        let mut r = resolver();
        r.press(Left);
        assert_eq!(r.resolve(0), Some(Left));
    }

    #[test]
    fn right_beats_left_and_down_beats_up() {
        let mut r = resolver();
        r.press(Right);
        r.press(Left);
        assert_eq!(r.resolve(0), Some(Right));

        let mut r = resolver();
        r.press(Down);
        r.press(Up);
        assert_eq!(r.resolve(0), Some(Down));
    }

    #[test]
    fn both_axes_keep_last_pressed_axis() {
        let mut r = resolver();
        r.press(Left);
        r.press(Up);
        assert_eq!(r.resolve(0), Some(Up));

        let mut r = resolver();
        r.press(Up);
        r.press(Left);
        assert_eq!(r.resolve(0), Some(Left));
    }

    #[test]
    fn held_key_repeats_after_delay() {
        let mut r = resolver();
        r.press(Right);
        assert_eq!(r.resolve(1000), Some(Right));
        assert_eq!(r.resolve(1100), None);
        assert_eq!(r.resolve(1139), None);
        assert_eq!(r.resolve(1140), Some(Right));
        assert_eq!(r.resolve(1200), None);
    }

    #[test]
    fn new_key_is_not_gated_by_another() {
        let mut r = resolver();
        r.press(Right);
        assert_eq!(r.resolve(1000), Some(Right));
        r.release(Right);
        r.press(Down);
        assert_eq!(r.resolve(1010), Some(Down));
    }

    #[test]
    fn release_falls_back_to_remaining_key() {
        let mut r = resolver();
        r.press(Left);
        r.press(Up);
        assert_eq!(r.last_pressed(), Some(Up));
        r.release(Up);
        assert_eq!(r.last_pressed(), Some(Left));
        assert_eq!(r.resolve(0), Some(Left));
    }

    #[test]
    fn auto_repeat_press_does_not_reorder() {
        let mut r = resolver();
        r.press(Left);
        r.press(Up);
        r.press(Left); // OS key repeat while still held
        assert_eq!(r.last_pressed(), Some(Up));
    }

    #[test]
    fn clear_forgets_keys_and_timers() {
        let mut r = resolver();
        r.press(Right);
        assert_eq!(r.resolve(1000), Some(Right));
        r.clear();
        assert_eq!(r.resolve(1001), None);
        r.press(Right);
        assert_eq!(r.resolve(1002), Some(Right));
    }

    #[test]
    fn custom_delay() {
        let mut r = InputResolver::with_delay(0);
        r.press(Up);
        assert_eq!(r.resolve(5), Some(Up));
        assert_eq!(r.resolve(5), Some(Up));
    }
}
