/// Mirror Maze: a two-character grid puzzle where the twin moves opposite
/// to the player.
///
/// `domain` holds tiles, positions and the movement rule. `sim` holds the
/// level loader, the per-attempt state and the tick pipeline. Everything
/// here is headless; hosts drive it through `sim::step::step`.

pub mod config;
pub mod domain;
pub mod error;
pub mod input;
pub mod sim;

pub use domain::entity::{Actor, Direction, PerActor, Pos};
pub use error::{MalformedLevelError, PackError};
pub use sim::level::{LevelDef, LevelPack};
pub use sim::step::{step, TickReport};
pub use sim::world::SimState;
