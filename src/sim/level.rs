/// Level definitions, level packs, and the parser that turns a definition
/// into a fresh `SimState`.
///
/// ## Pack format (TOML):
///   ```toml
///   name = "Pack Name"
///   author = "someone"
///   description = "blah blah"
///
///   [[level]]
///   id = 11
///   name = "First Switch"
///   difficulty = "Medium"
///   grid = ["##########", "#P B  D E#", ...]
///   buttons = [{ x = 3, y = 1, opens = "d11" }]
///   doors = [{ group = "d11", x = 6, y = 1 }]
///   ```
///
/// Level ids must run 1..=N without gaps; they define unlock order.
///
/// ## Tile legend:
///   '#' = Wall                  ' ' = Floor
///   'P' = Player start          'M' = Twin start
///   'E' = Exit (first = player's, second = twin's, row-major scan)
///   'B' = Plate (a button only if a button record targets it)
///   'D' = Door (needs a door record naming its group)

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::entity::{PerActor, Pos};
use crate::domain::tile::{Marker, Tile};
use crate::error::{MalformedLevelError, PackError};
use crate::sim::world::{Button, SimState};

/// The built-in pack, compiled into the binary.
const EMBEDDED_PACK: &str = include_str!("../../levels/levels.toml");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonDef {
    pub x: usize,
    pub y: usize,
    pub opens: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorDef {
    pub group: String,
    pub x: usize,
    pub y: usize,
}

/// Authored description of one puzzle. Never mutated after load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDef {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub difficulty: String,
    pub grid: Vec<String>,
    #[serde(default)]
    pub buttons: Vec<ButtonDef>,
    #[serde(default)]
    pub doors: Vec<DoorDef>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LevelPack {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "level")]
    pub levels: Vec<LevelDef>,
}

// ══════════════════════════════════════════════════════════════
// Parser
// ══════════════════════════════════════════════════════════════

/// Build the initial state for one attempt at `def`.
pub fn parse_level(def: &LevelDef) -> Result<SimState, MalformedLevelError> {
    if def.id == 0 {
        return Err(MalformedLevelError::ZeroId);
    }

    let height = def.grid.len();
    let width = def.grid.first().map_or(0, |row| row.chars().count());
    if height == 0 || width == 0 {
        return Err(MalformedLevelError::EmptyGrid);
    }

    let mut tiles = vec![vec![Tile::Floor; width]; height];
    let mut player: Option<Pos> = None;
    let mut twin: Option<Pos> = None;
    let mut exits: Vec<Pos> = Vec::with_capacity(2);

    for (y, row) in def.grid.iter().enumerate() {
        let found = row.chars().count();
        if found != width {
            return Err(MalformedLevelError::RaggedRow { row: y, expected: width, found });
        }
        for (x, ch) in row.chars().enumerate() {
            let pos = Pos::new(x, y);
            let (tile, marker) =
                Tile::from_glyph(ch).ok_or(MalformedLevelError::UnknownGlyph { glyph: ch, pos })?;
            tiles[y][x] = tile;
            match marker {
                Some(Marker::PlayerStart) => place_marker(&mut player, 'P', pos)?,
                Some(Marker::TwinStart) => place_marker(&mut twin, 'M', pos)?,
                None => {}
            }
            if tile == Tile::Exit {
                exits.push(pos);
            }
        }
    }

    let player = player.ok_or(MalformedLevelError::MissingMarker { glyph: 'P' })?;
    let twin = twin.ok_or(MalformedLevelError::MissingMarker { glyph: 'M' })?;
    let &[exit_a, exit_b] = exits.as_slice() else {
        return Err(MalformedLevelError::ExitCount { found: exits.len() });
    };

    let tile_at = |pos: Pos| tiles.get(pos.y).and_then(|row| row.get(pos.x)).copied();

    let mut buttons = Vec::with_capacity(def.buttons.len());
    for b in &def.buttons {
        let pos = Pos::new(b.x, b.y);
        match tile_at(pos) {
            None => return Err(MalformedLevelError::RecordOutOfBounds { what: "button", pos }),
            Some(Tile::Plate) => buttons.push(Button { pos, opens: b.opens.clone() }),
            Some(_) => return Err(MalformedLevelError::ButtonOffPlate { pos }),
        }
    }

    let mut door_groups: HashMap<Pos, String> = HashMap::with_capacity(def.doors.len());
    for d in &def.doors {
        let pos = Pos::new(d.x, d.y);
        match tile_at(pos) {
            None => return Err(MalformedLevelError::RecordOutOfBounds { what: "door", pos }),
            Some(Tile::Door) => {}
            Some(_) => return Err(MalformedLevelError::DoorRecordOffDoor { pos }),
        }
        if let Some(existing) = door_groups.get(&pos) {
            if existing != &d.group {
                return Err(MalformedLevelError::DoorGroupConflict {
                    pos,
                    first: existing.clone(),
                    second: d.group.clone(),
                });
            }
        }
        door_groups.insert(pos, d.group.clone());
    }

    for (y, row) in tiles.iter().enumerate() {
        for (x, tile) in row.iter().enumerate() {
            let pos = Pos::new(x, y);
            if tile.is_door() && !door_groups.contains_key(&pos) {
                return Err(MalformedLevelError::DoorWithoutRecord { pos });
            }
        }
    }

    if let Some(group) = def.orphan_door_groups().into_iter().next() {
        return Err(MalformedLevelError::OrphanDoorGroup { group });
    }

    log::debug!(
        "parsed level {} ({}x{}, {} buttons, {} doors)",
        def.id, width, height, buttons.len(), door_groups.len(),
    );

    Ok(SimState::new(
        def.id,
        tiles,
        door_groups,
        buttons,
        PerActor::new(exit_a, exit_b),
        PerActor::new(player, twin),
    ))
}

fn place_marker(slot: &mut Option<Pos>, glyph: char, pos: Pos) -> Result<(), MalformedLevelError> {
    match *slot {
        Some(first) => Err(MalformedLevelError::DuplicateMarker { glyph, first, second: pos }),
        None => {
            *slot = Some(pos);
            Ok(())
        }
    }
}

impl LevelDef {
    /// Fresh attempt at this level.
    pub fn start(&self) -> Result<SimState, MalformedLevelError> {
        parse_level(self)
    }

    /// Run every load-time check without keeping the state.
    pub fn validate(&self) -> Result<(), MalformedLevelError> {
        parse_level(self).map(|_| ())
    }

    /// Door groups that no button opens, sorted. Such doors can never open.
    pub fn orphan_door_groups(&self) -> Vec<String> {
        let opened: BTreeSet<&str> = self.buttons.iter().map(|b| b.opens.as_str()).collect();
        let orphans: BTreeSet<&str> = self
            .doors
            .iter()
            .map(|d| d.group.as_str())
            .filter(|g| !opened.contains(g))
            .collect();
        orphans.into_iter().map(str::to_string).collect()
    }
}

// ══════════════════════════════════════════════════════════════
// Packs
// ══════════════════════════════════════════════════════════════

impl LevelPack {
    /// The built-in twenty-level set.
    pub fn embedded() -> Result<Self, PackError> {
        Self::from_toml_str(EMBEDDED_PACK)
    }

    /// Read and validate a pack file.
    pub fn load(path: &Path) -> Result<Self, PackError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| PackError::Io { path: path.to_path_buf(), source })?;
        let pack = Self::from_toml_str(&text)?;
        log::info!("loaded pack {:?} from {} ({} levels)", pack.name, path.display(), pack.len());
        Ok(pack)
    }

    /// Parse, order by id, validate.
    pub fn from_toml_str(text: &str) -> Result<Self, PackError> {
        let mut pack: LevelPack = toml::from_str(text)?;
        pack.levels.sort_by_key(|l| l.id);
        pack.validate()?;
        Ok(pack)
    }

    /// Ids must be exactly 1..=N and every level must parse.
    pub fn validate(&self) -> Result<(), PackError> {
        if self.levels.is_empty() {
            return Err(PackError::Empty);
        }
        let mut seen = BTreeSet::new();
        for level in &self.levels {
            if !seen.insert(level.id) {
                return Err(PackError::DuplicateId { id: level.id });
            }
            level
                .validate()
                .map_err(|source| PackError::Malformed { id: level.id, source })?;
        }
        for (expected, id) in (1u32..).zip(&seen) {
            if *id != expected {
                return Err(PackError::IdGap { expected, found: *id });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Highest level id, equal to the level count in a valid pack.
    pub fn total(&self) -> u32 {
        self.levels.last().map_or(0, |l| l.id)
    }

    pub fn get(&self, id: u32) -> Option<&LevelDef> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// Zero-based index of level `id` within the pack.
    pub fn position(&self, id: u32) -> Option<usize> {
        self.levels.iter().position(|l| l.id == id)
    }

    /// Fresh attempt at level `id`.
    pub fn start(&self, id: u32) -> Result<SimState, PackError> {
        let def = self.get(id).ok_or(PackError::UnknownLevel { id })?;
        let state = def
            .start()
            .map_err(|source| PackError::Malformed { id, source })?;
        log::info!("level {} ({}) started", id, def.name);
        Ok(state)
    }

    /// The level played after `id`, or `None` at the end of the pack.
    pub fn next_after(&self, id: u32) -> Option<&LevelDef> {
        self.levels.iter().find(|l| l.id > id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Actor;

    fn def(grid: &[&str]) -> LevelDef {
        LevelDef {
            id: 1,
            name: "test".into(),
            difficulty: String::new(),
            grid: grid.iter().map(|s| s.to_string()).collect(),
            buttons: vec![],
            doors: vec![],
        }
    }

    const OPEN: &[&str] = &[
        "#####",
        "#P E#",
        "#   #",
        "#E M#",
        "#####",
    ];

    #[test]
    fn parses_markers_and_exits_in_scan_order() {
        let s = parse_level(&def(OPEN)).unwrap();
        assert_eq!(s.player(), Pos::new(1, 1));
        assert_eq!(s.twin(), Pos::new(3, 3));
        assert_eq!(s.exit_a(), Pos::new(3, 1));
        assert_eq!(s.exit_b(), Pos::new(1, 3));
        assert_eq!(s.exit(Actor::Twin), s.exit_b());
        assert_eq!((s.width(), s.height()), (5, 5));
        assert!(s.open_groups().is_empty());
        assert!(!s.is_completed());
    }

    #[test]
    fn dimensions_come_from_the_grid() {
        let s = parse_level(&def(&["PEEM"])).unwrap();
        assert_eq!((s.width(), s.height()), (4, 1));
    }

    #[test]
    fn missing_player_fails() {
        let err = parse_level(&def(&["#  E#", "#E M#"])).unwrap_err();
        assert_eq!(err, MalformedLevelError::MissingMarker { glyph: 'P' });
    }

    #[test]
    fn duplicate_twin_fails() {
        let err = parse_level(&def(&["PM E", "M  E"])).unwrap_err();
        assert_eq!(
            err,
            MalformedLevelError::DuplicateMarker { glyph: 'M', first: Pos::new(1, 0), second: Pos::new(0, 1) }
        );
    }

    #[test]
    fn exit_count_must_be_two() {
        assert_eq!(
            parse_level(&def(&["P E M"])).unwrap_err(),
            MalformedLevelError::ExitCount { found: 1 }
        );
        assert_eq!(
            parse_level(&def(&["PEEEM"])).unwrap_err(),
            MalformedLevelError::ExitCount { found: 3 }
        );
    }

    #[test]
    fn ragged_and_unknown_glyphs_fail() {
        assert_eq!(
            parse_level(&def(&["P  E", "M E"])).unwrap_err(),
            MalformedLevelError::RaggedRow { row: 1, expected: 4, found: 3 }
        );
        assert_eq!(
            parse_level(&def(&["P$EEM"])).unwrap_err(),
            MalformedLevelError::UnknownGlyph { glyph: '$', pos: Pos::new(1, 0) }
        );
        assert_eq!(parse_level(&def(&[])).unwrap_err(), MalformedLevelError::EmptyGrid);
    }

    #[test]
    fn orphan_door_group_is_reported() {
        let mut d = def(&["PBDEEM"]);
        d.buttons.push(ButtonDef { x: 1, y: 0, opens: "a".into() });
        d.doors.push(DoorDef { group: "b".into(), x: 2, y: 0 });
        assert_eq!(d.orphan_door_groups(), vec!["b".to_string()]);
        assert_eq!(d.validate(), Err(MalformedLevelError::OrphanDoorGroup { group: "b".into() }));

        d.doors[0].group = "a".into();
        assert!(d.orphan_door_groups().is_empty());
        assert!(d.validate().is_ok());
    }

    #[test]
    fn door_records_must_match_glyphs() {
        let mut d = def(&["PBD EEM"]);
        d.buttons.push(ButtonDef { x: 1, y: 0, opens: "a".into() });
        assert_eq!(d.validate(), Err(MalformedLevelError::DoorWithoutRecord { pos: Pos::new(2, 0) }));

        d.doors.push(DoorDef { group: "a".into(), x: 3, y: 0 });
        assert_eq!(d.validate(), Err(MalformedLevelError::DoorRecordOffDoor { pos: Pos::new(3, 0) }));

        d.doors[0] = DoorDef { group: "a".into(), x: 2, y: 0 };
        d.doors.push(DoorDef { group: "z".into(), x: 2, y: 0 });
        d.buttons.push(ButtonDef { x: 1, y: 0, opens: "z".into() });
        assert!(matches!(d.validate(), Err(MalformedLevelError::DoorGroupConflict { .. })));
    }

    #[test]
    fn button_records_must_sit_on_plates() {
        let mut d = def(&["P DEEM"]);
        d.buttons.push(ButtonDef { x: 1, y: 0, opens: "a".into() });
        d.doors.push(DoorDef { group: "a".into(), x: 2, y: 0 });
        assert_eq!(d.validate(), Err(MalformedLevelError::ButtonOffPlate { pos: Pos::new(1, 0) }));

        d.buttons[0] = ButtonDef { x: 9, y: 0, opens: "a".into() };
        assert_eq!(
            d.validate(),
            Err(MalformedLevelError::RecordOutOfBounds { what: "button", pos: Pos::new(9, 0) })
        );
    }

    #[test]
    fn decoy_plate_is_floor() {
        let s = parse_level(&def(&["PB EEM"])).unwrap();
        assert!(s.buttons().is_empty());
        assert!(s.is_passable(Pos::new(1, 0)));
    }

    #[test]
    fn zero_id_rejected() {
        let mut d = def(OPEN);
        d.id = 0;
        assert_eq!(d.validate(), Err(MalformedLevelError::ZeroId));
    }

    #[test]
    fn parsing_does_not_touch_the_definition() {
        let d = def(OPEN);
        let before = d.clone();
        let _ = d.start().unwrap();
        assert_eq!(d, before);
    }

    // ── Packs ──

    #[test]
    fn embedded_pack_is_valid() {
        let pack = LevelPack::embedded().unwrap();
        assert_eq!(pack.len(), 20);
        assert_eq!(pack.total(), 20);
        for level in &pack.levels {
            assert!(level.orphan_door_groups().is_empty(), "level {}", level.id);
            let s = level.start().unwrap();
            // the shipped set happens to be 10x10
            assert_eq!((s.width(), s.height()), (10, 10), "level {}", level.id);
        }
    }

    #[test]
    fn pack_navigation() {
        let pack = LevelPack::embedded().unwrap();
        assert_eq!(pack.get(11).unwrap().name, "First Switch");
        assert_eq!(pack.next_after(1).map(|l| l.id), Some(2));
        assert!(pack.next_after(20).is_none());
        assert_eq!(pack.position(1), Some(0));
        assert_eq!(pack.position(20), Some(19));
        assert_eq!(pack.position(21), None);
        assert!(matches!(pack.start(21), Err(PackError::UnknownLevel { id: 21 })));
    }

    #[test]
    fn pack_rejects_duplicates_and_gaps() {
        let dup = r#"
            [[level]]
            id = 1
            grid = ["PEEM"]
            [[level]]
            id = 1
            grid = ["PEEM"]
        "#;
        assert!(matches!(LevelPack::from_toml_str(dup), Err(PackError::DuplicateId { id: 1 })));

        let gap = r#"
            [[level]]
            id = 1
            grid = ["PEEM"]
            [[level]]
            id = 3
            grid = ["PEEM"]
        "#;
        assert!(matches!(
            LevelPack::from_toml_str(gap),
            Err(PackError::IdGap { expected: 2, found: 3 })
        ));

        assert!(matches!(LevelPack::from_toml_str("name = \"x\""), Err(PackError::Empty)));
    }

    #[test]
    fn pack_surfaces_malformed_level() {
        let bad = r#"
            [[level]]
            id = 1
            grid = ["P EE"]
        "#;
        match LevelPack::from_toml_str(bad) {
            Err(PackError::Malformed { id: 1, source }) => {
                assert_eq!(source, MalformedLevelError::MissingMarker { glyph: 'M' });
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn pack_levels_are_ordered_by_id() {
        let text = r#"
            [[level]]
            id = 2
            grid = ["PEEM"]
            [[level]]
            id = 1
            grid = ["MEEP"]
        "#;
        let pack = LevelPack::from_toml_str(text).unwrap();
        assert_eq!(pack.levels.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
