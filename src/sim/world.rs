/// WorldState: the complete snapshot of a running session.
///
/// ## Map
///
/// The cave exists only as the `solids` registry. `generate_map()` rebuilds
/// it wholesale; there is no incremental terrain change. Every walkability
/// query goes through `map_view()`.
///
/// ## Drawing
///
/// Systems queue cells into `draws` during a tick; the step flushes them
/// into `grid`, which the renderer reads. `log` is rendered separately into
/// its own panel.

use tracing::{debug, info};

use crate::config::{GameConfig, MAX_MAP_SIDE};
use crate::domain::ai::{self, Placement, Relocation};
use crate::domain::entity::{Entity, NPC_ID, PLAYER_ID};
use crate::domain::mapgen::{self, CellularConfig};
use crate::domain::rng::GameRng;
use crate::domain::rules::{Bounds, MapView};
use crate::domain::solids::Solids;
use crate::domain::tile::NPC_FALLBACK_GLYPH;
use crate::error::GameError;
use super::draw::{DrawBatch, GridBuffer};
use super::log::MessageLog;
use super::message::Reveal;

pub const PLAYER_SPAWN: (i32, i32) = (0, 0);

pub struct WorldState {
    // ── Map ──
    pub bounds: Bounds,
    pub solids: Solids,
    pub cave: CellularConfig,
    pub max_regen_attempts: u32,
    /// Maps generated so far, including the first.
    pub generation: u32,

    // ── Entities ──
    pub player: Entity,
    pub npc: Entity,
    pub relocation: Relocation,
    pub max_relocation_attempts: u32,
    pub show_path: bool,

    // ── Message ──
    pub reveal: Reveal,
    pub completed: bool,
    pub log: MessageLog,

    // ── Output ──
    pub draws: DrawBatch,
    pub grid: GridBuffer,

    // ── Meta ──
    pub rng: GameRng,
    pub tick: u64,
}

// ── Construction ──

impl WorldState {
    /// Build the first cave (retrying until the player's spawn is open)
    /// and settle the NPC near its configured spawn.
    pub fn new(cfg: &GameConfig, reveal: Reveal, rng: GameRng) -> Result<Self, GameError> {
        let width = cfg.display.width.clamp(1, MAX_MAP_SIDE);
        let height = cfg.display.height.clamp(1, MAX_MAP_SIDE);
        let bounds = Bounds::new(width as i32, height as i32);
        let (nx, ny) = bounds.clamp(cfg.npc.spawn.0, cfg.npc.spawn.1);

        let mut world = WorldState {
            bounds,
            solids: Solids::new(),
            cave: cfg.map.cellular.clone(),
            max_regen_attempts: cfg.map.max_regen_attempts,
            generation: 0,
            player: Entity::new(PLAYER_ID, PLAYER_SPAWN.0, PLAYER_SPAWN.1),
            npc: Entity::new(NPC_ID, nx, ny),
            relocation: cfg.npc.relocation,
            max_relocation_attempts: cfg.npc.max_relocation_attempts,
            show_path: cfg.npc.show_path,
            reveal,
            completed: false,
            log: MessageLog::new(cfg.log.visible_lines, cfg.log.history_limit, cfg.log.order),
            draws: DrawBatch::new(),
            grid: GridBuffer::new(width, height),
            rng,
            tick: 0,
        };

        let (px, py) = world.player.pos();
        let attempts = world.regenerate_until_walkable(px, py)?;
        let placed = world.place_npc(false)?;
        info!(
            seed = world.rng.seed(),
            attempts,
            npc_x = placed.x,
            npc_y = placed.y,
            message_len = world.reveal.len(),
            "world_created"
        );
        Ok(world)
    }
}

// ── Map ──

impl WorldState {
    pub fn map_view(&self) -> MapView<'_> {
        MapView::new(&self.solids, self.bounds)
    }

    #[inline]
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.map_view().is_walkable(x, y)
    }

    /// Replace the cave with a freshly generated one.
    pub fn generate_map(&mut self) {
        let tiles = mapgen::generate(
            self.bounds.width as usize,
            self.bounds.height as usize,
            &self.cave,
            &mut self.rng,
        );
        self.solids.commit(&tiles);
        self.generation += 1;
    }

    /// Generate until (x, y) is walkable. Returns the attempts used.
    /// The last generated map stays committed on failure.
    pub fn regenerate_until_walkable(&mut self, x: i32, y: i32) -> Result<u32, GameError> {
        for attempt in 1..=self.max_regen_attempts {
            self.generate_map();
            if self.is_walkable(x, y) {
                debug!(x, y, attempt, generation = self.generation, "map_regenerated");
                return Ok(attempt);
            }
        }
        Err(GameError::MapUnsatisfiable { x, y, attempts: self.max_regen_attempts })
    }
}

// ── NPC ──

impl WorldState {
    /// Glyph the NPC is drawn with: its icon, else the message's first
    /// character, else `N`.
    pub fn npc_glyph(&self) -> char {
        self.npc
            .icon
            .or_else(|| self.reveal.first())
            .filter(|c| !c.is_whitespace())
            .unwrap_or(NPC_FALLBACK_GLYPH)
    }

    /// Keep the NPC where it is if it may stand there, otherwise relocate it.
    ///
    /// With `jump`, it always moves at least once. The player's cell is
    /// avoided unless it is the only walkable one.
    pub fn place_npc(&mut self, jump: bool) -> Result<Placement, GameError> {
        match self.place_npc_with(jump, true) {
            Err(GameError::NoWalkableCell) => self.place_npc_with(jump, false),
            other => other,
        }
    }

    fn place_npc_with(&mut self, jump: bool, avoid_player: bool) -> Result<Placement, GameError> {
        let map = MapView::new(&self.solids, self.bounds);
        let player = self.player.pos();
        let passable = |x: i32, y: i32| map.is_walkable(x, y) && !(avoid_player && (x, y) == player);
        if jump {
            ai::relocate(&mut self.npc, self.relocation, self.bounds, &mut self.rng, self.max_relocation_attempts, passable)
        } else {
            ai::settle(&mut self.npc, self.relocation, self.bounds, &mut self.rng, self.max_relocation_attempts, passable)
        }
    }
}
