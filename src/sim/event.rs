/// Events emitted during a simulation step.
/// `main` traces them; tests assert on them.

use crate::domain::entity::MoveDir;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PlayerMoved { x: i32, y: i32 },
    MoveBlocked { dir: MoveDir },
    /// Player walked into the NPC. `revealed` is the cursor after advancing.
    NpcEncountered { icon: Option<char>, revealed: usize },
    MapRegenerated { attempts: u32 },
    NpcRelocated { x: i32, y: i32, attempts: u32 },
    PathTraced { len: usize },
    /// The whole message is out. Emitted once per session.
    MessageComplete,
}
