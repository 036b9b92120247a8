/// Solids registry: the set of blocked cells.
///
/// Rebuilt wholesale from a generated map; never patched cell by cell
/// during play. A cell is either in the set (solid) or not (walkable).

use std::collections::HashSet;

use super::tile::Tile;

#[derive(Clone, Debug, Default)]
pub struct Solids {
    cells: HashSet<(i32, i32)>,
}

impl Solids {
    pub fn new() -> Self {
        Solids { cells: HashSet::with_capacity(256) }
    }

    pub fn add(&mut self, x: i32, y: i32) {
        self.cells.insert((x, y));
    }

    /// Is (x, y) blocked?
    #[inline]
    pub fn is(&self, x: i32, y: i32) -> bool {
        self.cells.contains(&(x, y))
    }

    /// Is (x, y) free of solids? Says nothing about map bounds.
    #[inline]
    pub fn not(&self, x: i32, y: i32) -> bool {
        !self.is(x, y)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells.iter().copied()
    }

    /// Replace the whole registry with the walls of a generated map.
    pub fn commit(&mut self, tiles: &[Vec<Tile>]) {
        self.cells.clear();
        for (y, row) in tiles.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if tile.is_solid() {
                    self.add(x as i32, y as i32);
                }
            }
        }
    }
}
