/// Walkability and movement rules.
///
/// Pure functions: they decide what is legal without performing it.
///
/// ## Walkability
/// ┌────────────────────────────┬──────────┐
/// │ Condition                  │ Walkable │
/// ├────────────────────────────┼──────────┤
/// │ x < 0 or x >= width        │ NO       │
/// │ y < 0 or y >= height       │ NO       │
/// │ cell in solids registry    │ NO       │
/// │ Otherwise                  │ YES      │
/// └────────────────────────────┴──────────┘
///
/// ## Movement
/// A step in any direction is allowed iff the destination is walkable.
/// A denied step is dropped silently; the entity stays where it was.

use super::entity::{Entity, MoveDir};
use super::solids::Solids;

/// Map dimensions. Valid cells are `0..width` × `0..height`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bounds {
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub fn new(width: i32, height: i32) -> Self {
        Bounds { width, height }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && x <= self.width - 1 && y >= 0 && y <= self.height - 1
    }

    /// Every cell, row-major.
    pub fn cells(self) -> impl Iterator<Item = (i32, i32)> {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| (x, y)))
    }

    /// Pull a position into the map (used for configured spawn points).
    pub fn clamp(&self, x: i32, y: i32) -> (i32, i32) {
        (x.clamp(0, (self.width - 1).max(0)), y.clamp(0, (self.height - 1).max(0)))
    }
}

/// Read-only view used by every walkability query.
#[derive(Clone, Copy)]
pub struct MapView<'a> {
    pub solids: &'a Solids,
    pub bounds: Bounds,
}

impl<'a> MapView<'a> {
    pub fn new(solids: &'a Solids, bounds: Bounds) -> Self {
        MapView { solids, bounds }
    }

    /// Both checks must pass: inside the edges and not solid.
    #[inline]
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.bounds.contains(x, y) && self.solids.not(x, y)
    }
}

/// Destination of a step if it is legal.
pub fn can_move(map: &MapView, entity: &Entity, dir: MoveDir) -> Option<(i32, i32)> {
    let (tx, ty) = entity.target(dir);
    if map.is_walkable(tx, ty) {
        Some((tx, ty))
    } else {
        None
    }
}
