pub mod event;
pub mod level;
pub mod progress;
pub mod solve;
pub mod step;
pub mod world;
