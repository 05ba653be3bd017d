/// Static cell kinds and their glyphs.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.
///
/// Door state is not a tile property: whether a door cell is open depends on
/// the live set of unlocked groups, which `SimState` owns.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Floor,
    Wall,
    Exit,
    Plate, // 'B' glyph; only a button if a record targets it
    Door,  // 'D' glyph; group comes from the level's door records
}

/// What a glyph contributes to the grid: terrain, plus an optional marker
/// recorded separately by the parser.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Marker {
    PlayerStart,
    TwinStart,
}

impl Tile {
    /// Decode one grid glyph. `None` for characters outside the alphabet.
    pub fn from_glyph(ch: char) -> Option<(Tile, Option<Marker>)> {
        let decoded = match ch {
            ' ' => (Tile::Floor, None),
            '#' => (Tile::Wall, None),
            'E' => (Tile::Exit, None),
            'B' => (Tile::Plate, None),
            'D' => (Tile::Door, None),
            'P' => (Tile::Floor, Some(Marker::PlayerStart)),
            'M' => (Tile::Floor, Some(Marker::TwinStart)),
            _ => return None,
        };
        Some(decoded)
    }

    pub fn glyph(self) -> char {
        match self {
            Tile::Floor => ' ',
            Tile::Wall => '#',
            Tile::Exit => 'E',
            Tile::Plate => 'B',
            Tile::Door => 'D',
        }
    }

    /// Walls block unconditionally.
    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// Doors block until their group opens.
    pub fn is_door(self) -> bool {
        matches!(self, Tile::Door)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_sit_on_floor() {
        assert_eq!(Tile::from_glyph('P'), Some((Tile::Floor, Some(Marker::PlayerStart))));
        assert_eq!(Tile::from_glyph('M'), Some((Tile::Floor, Some(Marker::TwinStart))));
    }

    #[test]
    fn unknown_glyph_rejected() {
        assert_eq!(Tile::from_glyph('$'), None);
        assert_eq!(Tile::from_glyph('x'), None);
    }

    #[test]
    fn glyph_roundtrip_for_terrain() {
        for t in [Tile::Floor, Tile::Wall, Tile::Exit, Tile::Plate, Tile::Door] {
            assert_eq!(Tile::from_glyph(t.glyph()), Some((t, None)));
        }
    }
}
