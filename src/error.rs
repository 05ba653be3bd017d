/// Load-time errors.
///
/// Blocked and out-of-bounds moves are not errors; they are ordinary
/// `StepOutcome` values. Only authoring defects end up here.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::entity::Pos;

/// A level definition that cannot produce a valid simulation state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedLevelError {
    #[error("level id must be positive")]
    ZeroId,

    #[error("grid has no rows")]
    EmptyGrid,

    #[error("row {row} is {found} cells wide, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("unknown glyph {glyph:?} at {pos}")]
    UnknownGlyph { glyph: char, pos: Pos },

    #[error("missing '{glyph}' marker")]
    MissingMarker { glyph: char },

    #[error("duplicate '{glyph}' marker at {first} and {second}")]
    DuplicateMarker { glyph: char, first: Pos, second: Pos },

    #[error("expected exactly two exits, found {found}")]
    ExitCount { found: usize },

    #[error("{what} record at {pos} lies outside the grid")]
    RecordOutOfBounds { what: &'static str, pos: Pos },

    #[error("button record at {pos} is not on a 'B' cell")]
    ButtonOffPlate { pos: Pos },

    #[error("door record at {pos} is not on a 'D' cell")]
    DoorRecordOffDoor { pos: Pos },

    #[error("door glyph at {pos} has no door record")]
    DoorWithoutRecord { pos: Pos },

    #[error("door at {pos} claimed by groups {first:?} and {second:?}")]
    DoorGroupConflict { pos: Pos, first: String, second: String },

    #[error("door group {group:?} is not opened by any button")]
    OrphanDoorGroup { group: String },
}

/// Failure to obtain a usable level pack.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("level pack parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("level id {id} appears more than once")]
    DuplicateId { id: u32 },

    #[error("level ids must run 1..=N: expected {expected}, found {found}")]
    IdGap { expected: u32, found: u32 },

    #[error("level pack contains no levels")]
    Empty,

    #[error("level {id} is malformed: {source}")]
    Malformed {
        id: u32,
        #[source]
        source: MalformedLevelError,
    },

    #[error("no level with id {id}")]
    UnknownLevel { id: u32 },
}
