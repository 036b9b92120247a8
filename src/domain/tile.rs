/// Map cell kinds and the palette draw events are painted with.
/// Properties are queried via methods, so cell semantics live here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Floor,
    Wall,
}

impl Tile {
    /// Blocks movement; committed into the solids registry.
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Wall)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Floor
    }
}

/// Named colours. The renderer decides the concrete RGB.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Paint {
    Red,
    Yellow,
    Green,
    Black,
    /// Translucent grey used for the path overlay.
    Shade,
}

// ── Glyphs ──

pub const WALL_GLYPH: char = '#';
pub const PLAYER_GLYPH: char = '@';
pub const NPC_FALLBACK_GLYPH: char = 'N';

pub const WALL_FG: Paint = Paint::Green;
pub const PLAYER_FG: Paint = Paint::Red;
pub const PLAYER_BG: Paint = Paint::Black;
pub const NPC_FG: Paint = Paint::Yellow;
pub const NPC_BG: Paint = Paint::Black;
pub const PATH_BG: Paint = Paint::Shade;
