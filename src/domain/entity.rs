/// Entities: the two actors, their positions, and directional intents.
///
/// The player and its twin are the same kind of thing: a position that moves
/// by a heading derived from the shared input. The only difference is the
/// sign of that heading, captured by `Actor::heading`.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Grid coordinate. `x` = column, `y` = row, both zero-based.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }

    /// Neighbour one step along `dir`. `None` when that would leave the
    /// non-negative quadrant; the upper bound is the grid's business.
    pub fn step(self, dir: Direction) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        Some(Pos {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Movement direction: one axis-aligned unit step.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// (dx, dy) with y growing downwards.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// `U`/`D`/`L`/`R`, case-insensitive.
    pub fn from_letter(ch: char) -> Option<Direction> {
        match ch.to_ascii_uppercase() {
            'U' => Some(Direction::Up),
            'D' => Some(Direction::Down),
            'L' => Some(Direction::Left),
            'R' => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }
}

/// Parse a move script such as `"RRDL"`. Whitespace is ignored.
/// Returns the offending character on failure.
pub fn parse_moves(script: &str) -> Result<Vec<Direction>, char> {
    script
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| Direction::from_letter(c).ok_or(c))
        .collect()
}

pub fn format_moves(moves: &[Direction]) -> String {
    moves.iter().map(|d| d.letter()).collect()
}

/// One of the two mirrored characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Actor {
    Player,
    Twin,
}

impl Actor {
    pub const BOTH: [Actor; 2] = [Actor::Player, Actor::Twin];

    /// The heading this actor takes for a given input.
    /// The twin always moves by the opposite vector: this is the mirror rule.
    pub fn heading(self, input: Direction) -> Direction {
        match self {
            Actor::Player => input,
            Actor::Twin => input.opposite(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Actor::Player => "player",
            Actor::Twin => "twin",
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value held once per actor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct PerActor<T> {
    pub player: T,
    pub twin: T,
}

impl<T> PerActor<T> {
    pub fn new(player: T, twin: T) -> Self {
        PerActor { player, twin }
    }

    pub fn map<U>(self, mut f: impl FnMut(Actor, T) -> U) -> PerActor<U> {
        PerActor {
            player: f(Actor::Player, self.player),
            twin: f(Actor::Twin, self.twin),
        }
    }
}

impl<T> Index<Actor> for PerActor<T> {
    type Output = T;

    fn index(&self, actor: Actor) -> &T {
        match actor {
            Actor::Player => &self.player,
            Actor::Twin => &self.twin,
        }
    }
}

impl<T> IndexMut<Actor> for PerActor<T> {
    fn index_mut(&mut self, actor: Actor) -> &mut T {
        match actor {
            Actor::Player => &mut self.player,
            Actor::Twin => &mut self.twin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twin_heading_is_opposite() {
        for d in Direction::ALL {
            assert_eq!(Actor::Player.heading(d), d);
            assert_eq!(Actor::Twin.heading(d), d.opposite());
            let (dx, dy) = d.delta();
            let (tx, ty) = Actor::Twin.heading(d).delta();
            assert_eq!((tx, ty), (-dx, -dy));
        }
    }

    #[test]
    fn step_off_top_left_is_none() {
        assert_eq!(Pos::new(0, 3).step(Direction::Left), None);
        assert_eq!(Pos::new(3, 0).step(Direction::Up), None);
        assert_eq!(Pos::new(3, 0).step(Direction::Down), Some(Pos::new(3, 1)));
    }

    #[test]
    fn move_script_parsing() {
        assert_eq!(
            parse_moves("Rr d L\nu"),
            Ok(vec![Direction::Right, Direction::Right, Direction::Down, Direction::Left, Direction::Up])
        );
        assert_eq!(parse_moves("RX"), Err('X'));
        assert_eq!(format_moves(&parse_moves("UDLR").unwrap()), "UDLR");
    }

    #[test]
    fn per_actor_indexing() {
        let mut p = PerActor::new(1, 2);
        p[Actor::Twin] += 10;
        assert_eq!(p[Actor::Player], 1);
        assert_eq!(p[Actor::Twin], 12);
        assert_eq!(p.map(|a, v| (a, v * 2)).twin, (Actor::Twin, 24));
    }
}
