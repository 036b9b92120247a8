/// NPC placement.
///
/// Two relocation strategies:
///   1. **Normal**: jump to `(round(N(0, W)), round(N(0, H)))` and retry
///      until the cell is walkable. Samples cluster near the top-left corner;
///      negative or out-of-map samples are simply rejected.
///   2. **Shuffle**: step diagonally `(x+1, y+1)`, wrapping at the edges,
///      until unblocked. Deterministic.
///
/// Both loops are bounded. When the budget runs out, the first walkable
/// cell in row-major order is used; a map without any walkable cell is an
/// error rather than an endless loop.

use serde::Deserialize;
use tracing::{debug, warn};

use super::entity::Entity;
use super::rng::GameRng;
use super::rules::Bounds;
use crate::error::GameError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relocation {
    Normal,
    Shuffle,
}

/// Outcome of a relocation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    /// Candidate cells tried, including the accepted one.
    pub attempts: u32,
    /// True if the bounded search gave up and the scan fallback was used.
    pub fell_back: bool,
}

/// One jump, no walkability check.
pub fn random_move(npc: &mut Entity, strategy: Relocation, bounds: Bounds, rng: &mut GameRng) {
    let next = match strategy {
        Relocation::Normal => sample_normal(bounds, rng),
        Relocation::Shuffle => shuffle_step(npc.pos(), bounds),
    };
    npc.place(next);
}

fn sample_normal(bounds: Bounds, rng: &mut GameRng) -> (i32, i32) {
    let x = rng.normal(0.0, bounds.width as f64).round() as i32;
    let y = rng.normal(0.0, bounds.height as f64).round() as i32;
    (x, y)
}

fn shuffle_step((x, y): (i32, i32), bounds: Bounds) -> (i32, i32) {
    ((x + 1).rem_euclid(bounds.width.max(1)), (y + 1).rem_euclid(bounds.height.max(1)))
}

/// Jump once, then keep jumping until `passable` accepts the cell.
pub fn relocate<F>(
    npc: &mut Entity,
    strategy: Relocation,
    bounds: Bounds,
    rng: &mut GameRng,
    max_attempts: u32,
    passable: F,
) -> Result<Placement, GameError>
where
    F: Fn(i32, i32) -> bool,
{
    random_move(npc, strategy, bounds, rng);
    settle(npc, strategy, bounds, rng, max_attempts, passable)
}

/// Leave the NPC where it is if `passable`, otherwise keep jumping.
pub fn settle<F>(
    npc: &mut Entity,
    strategy: Relocation,
    bounds: Bounds,
    rng: &mut GameRng,
    max_attempts: u32,
    passable: F,
) -> Result<Placement, GameError>
where
    F: Fn(i32, i32) -> bool,
{
    let mut attempts = 1;
    while !passable(npc.x, npc.y) {
        if attempts >= max_attempts {
            return scan_fallback(npc, bounds, attempts, &passable);
        }
        random_move(npc, strategy, bounds, rng);
        attempts += 1;
    }
    debug!(x = npc.x, y = npc.y, attempts, "npc_settled");
    Ok(Placement { x: npc.x, y: npc.y, attempts, fell_back: false })
}

fn scan_fallback<F>(npc: &mut Entity, bounds: Bounds, attempts: u32, passable: &F) -> Result<Placement, GameError>
where
    F: Fn(i32, i32) -> bool,
{
    let found = bounds.cells().find(|&(x, y)| passable(x, y));
    match found {
        Some(pos) => {
            warn!(attempts, x = pos.0, y = pos.1, "npc_relocation_budget_exhausted");
            npc.place(pos);
            Ok(Placement { x: pos.0, y: pos.1, attempts, fell_back: true })
        }
        None => Err(GameError::NoWalkableCell),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::NPC_ID;
    use crate::domain::mapgen::{self, CellularConfig};
    use crate::domain::rules::MapView;
    use crate::domain::solids::Solids;

    fn cave(seed: u64) -> (Solids, Bounds) {
        let mut rng = GameRng::new(seed);
        let tiles = mapgen::generate(25, 25, &CellularConfig::default(), &mut rng);
        let mut solids = Solids::new();
        solids.commit(&tiles);
        (solids, Bounds::new(25, 25))
    }

    #[test]
    fn normal_relocation_never_lands_on_solid() {
        for seed in 0..20 {
            let (solids, bounds) = cave(seed);
            let map = MapView::new(&solids, bounds);
            let mut rng = GameRng::new(seed + 100);
            let mut npc = Entity::new(NPC_ID, 20, 20);
            for _ in 0..10 {
                let p = relocate(&mut npc, Relocation::Normal, bounds, &mut rng, 4096, |x, y| map.is_walkable(x, y))
                    .unwrap();
                assert!(map.is_walkable(npc.x, npc.y), "seed {seed}: ({}, {})", npc.x, npc.y);
                assert_eq!((p.x, p.y), npc.pos());
            }
        }
    }

    #[test]
    fn shuffle_relocation_never_lands_on_solid() {
        for seed in 0..10 {
            let (solids, bounds) = cave(seed);
            let map = MapView::new(&solids, bounds);
            let mut rng = GameRng::new(seed);
            let mut npc = Entity::new(NPC_ID, 3, 7);
            relocate(&mut npc, Relocation::Shuffle, bounds, &mut rng, 4096, |x, y| map.is_walkable(x, y))
                .unwrap();
            assert!(map.is_walkable(npc.x, npc.y));
        }
    }

    #[test]
    fn shuffle_wraps_at_edges() {
        let b = Bounds::new(5, 4);
        assert_eq!(shuffle_step((4, 3), b), (0, 0));
        assert_eq!(shuffle_step((1, 1), b), (2, 2));
    }

    #[test]
    fn settle_keeps_walkable_position() {
        let mut rng = GameRng::new(0);
        let mut npc = Entity::new(NPC_ID, 2, 2);
        let p = settle(&mut npc, Relocation::Normal, Bounds::new(5, 5), &mut rng, 10, |_, _| true).unwrap();
        assert_eq!(npc.pos(), (2, 2));
        assert_eq!(p.attempts, 1);
        assert!(!p.fell_back);
    }

    #[test]
    fn exhausted_budget_falls_back_to_scan() {
        let mut rng = GameRng::new(0);
        let mut npc = Entity::new(NPC_ID, 0, 0);
        // only one free cell, and the shuffle walk from (0,0) on a 4x4 map never visits it
        let p = settle(&mut npc, Relocation::Shuffle, Bounds::new(4, 4), &mut rng, 16, |x, y| (x, y) == (3, 0))
            .unwrap();
        assert!(p.fell_back);
        assert_eq!(npc.pos(), (3, 0));
    }

    #[test]
    fn no_walkable_cell_is_error() {
        let mut rng = GameRng::new(0);
        let mut npc = Entity::new(NPC_ID, 1, 1);
        let r = relocate(&mut npc, Relocation::Normal, Bounds::new(5, 5), &mut rng, 50, |_, _| false);
        assert!(matches!(r, Err(GameError::NoWalkableCell)));
    }
}
