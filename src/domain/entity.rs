/// Entities: the player and the wandering NPC.
/// Both are the same shape; only the step function treats them differently.

pub const PLAYER_ID: usize = 0;
pub const NPC_ID: usize = 1;

/// Movement direction (latched until another direction is chosen)
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
    Up,
    Down,
}

impl MoveDir {
    pub const ALL: [MoveDir; 4] = [MoveDir::Left, MoveDir::Right, MoveDir::Up, MoveDir::Down];

    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
            MoveDir::Up => (0, -1),
            MoveDir::Down => (0, 1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entity {
    pub id: usize,
    pub x: i32,
    pub y: i32,
    /// Glyph override. `None` lets the renderer pick a default.
    pub icon: Option<char>,
}

impl Entity {
    pub fn new(id: usize, x: i32, y: i32) -> Self {
        Entity { id, x, y, icon: None }
    }

    pub fn pos(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Candidate cell one step in `dir`. Not validated.
    pub fn target(&self, dir: MoveDir) -> (i32, i32) {
        let (dx, dy) = dir.delta();
        (self.x + dx, self.y + dy)
    }

    pub fn same_cell(&self, other: &Entity) -> bool {
        self.x == other.x && self.y == other.y
    }

    pub fn place(&mut self, (x, y): (i32, i32)) {
        self.x = x;
        self.y = y;
    }
}
