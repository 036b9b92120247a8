/// Cellular-automaton cave generator.
///
/// Pipeline:
///   1. `randomize`: every cell becomes a wall with probability `p`
///   2. `smooth`: one automaton generation (8 neighbours)
///   3. `connect`: tunnel every floor region into one
///   4. repeat 2–3 for the configured number of passes
///
/// Walls are "alive" cells. A wall survives with a neighbour count in
/// `survive`; a floor cell turns to wall with a count in `born`.
/// Neighbours outside the map are not counted, so corners erode.

use std::collections::VecDeque;

use tracing::debug;

use super::rng::GameRng;
use super::tile::Tile;

const NEIGHBOURS_8: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];
const NEIGHBOURS_4: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

#[derive(Clone, Debug, PartialEq)]
pub struct CellularConfig {
    pub fill_probability: f64,
    pub smoothing_passes: u32,
    pub connect: bool,
    pub born: Vec<u8>,
    pub survive: Vec<u8>,
}

impl Default for CellularConfig {
    fn default() -> Self {
        CellularConfig {
            fill_probability: 0.5,
            smoothing_passes: 2,
            connect: true,
            born: vec![5, 6, 7, 8],
            survive: vec![4, 5, 6, 7, 8],
        }
    }
}

pub struct Cellular {
    width: usize,
    height: usize,
    cells: Vec<Vec<Tile>>,
}

impl Cellular {
    /// All-floor grid.
    pub fn new(width: usize, height: usize) -> Self {
        Cellular { width, height, cells: vec![vec![Tile::Floor; width]; height] }
    }

    #[cfg(test)]
    pub fn from_tiles(cells: Vec<Vec<Tile>>) -> Self {
        let height = cells.len();
        let width = cells.first().map_or(0, |r| r.len());
        Cellular { width, height, cells }
    }

    #[cfg(test)]
    pub fn tiles(&self) -> &[Vec<Tile>] {
        &self.cells
    }

    pub fn into_tiles(self) -> Vec<Vec<Tile>> {
        self.cells
    }

    pub fn randomize(&mut self, rng: &mut GameRng, probability: f64) {
        for row in &mut self.cells {
            for cell in row.iter_mut() {
                *cell = if rng.chance(probability) { Tile::Wall } else { Tile::Floor };
            }
        }
    }

    /// Advance one generation. All cells update from the previous state.
    pub fn smooth(&mut self, born: &[u8], survive: &[u8]) {
        let mut next = self.cells.clone();
        for y in 0..self.height {
            for x in 0..self.width {
                let n = self.wall_neighbours(x, y);
                next[y][x] = match self.cells[y][x] {
                    Tile::Wall if survive.contains(&n) => Tile::Wall,
                    Tile::Floor if born.contains(&n) => Tile::Wall,
                    _ => Tile::Floor,
                };
            }
        }
        self.cells = next;
    }

    fn wall_neighbours(&self, x: usize, y: usize) -> u8 {
        NEIGHBOURS_8
            .iter()
            .filter(|&&(dx, dy)| {
                self.at(x as i32 + dx, y as i32 + dy) == Some(Tile::Wall)
            })
            .count() as u8
    }

    fn at(&self, x: i32, y: i32) -> Option<Tile> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.cells[y as usize][x as usize])
    }

    /// 4-connected floor regions, in row-major order of their first cell.
    pub fn regions(&self) -> Vec<Vec<(usize, usize)>> {
        let mut seen = vec![vec![false; self.width]; self.height];
        let mut regions = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if seen[y][x] || self.cells[y][x].is_solid() {
                    continue;
                }
                regions.push(self.flood(x, y, &mut seen));
            }
        }
        regions
    }

    /// BFS over floor cells from (x, y), marking `seen`.
    fn flood(&self, x: usize, y: usize, seen: &mut [Vec<bool>]) -> Vec<(usize, usize)> {
        let mut region = Vec::new();
        let mut queue = VecDeque::with_capacity(64);
        seen[y][x] = true;
        queue.push_back((x, y));
        while let Some((cx, cy)) = queue.pop_front() {
            region.push((cx, cy));
            for &(dx, dy) in &NEIGHBOURS_4 {
                let (nx, ny) = (cx as i32 + dx, cy as i32 + dy);
                if self.at(nx, ny) != Some(Tile::Floor) {
                    continue;
                }
                let (nx, ny) = (nx as usize, ny as usize);
                if !seen[ny][nx] {
                    seen[ny][nx] = true;
                    queue.push_back((nx, ny));
                }
            }
        }
        region
    }

    /// Join every floor region into one by carving L-shaped tunnels.
    ///
    /// A random region seeds the connected set. Each remaining region
    /// tunnels from a random cell of its own to the nearest connected cell.
    /// Returns the number of tunnels carved.
    pub fn connect(&mut self, rng: &mut GameRng) -> usize {
        let regions = self.regions();
        if regions.len() <= 1 {
            return 0;
        }

        let mut connected = vec![vec![false; self.width]; self.height];
        let seed = &regions[rng.below(regions.len())];
        let (sx, sy) = seed[0];
        self.flood(sx, sy, &mut connected);

        let mut tunnels = 0;
        loop {
            let region = match self.first_unconnected(&connected) {
                Some((x, y)) => {
                    let mut scratch = vec![vec![false; self.width]; self.height];
                    self.flood(x, y, &mut scratch)
                }
                None => break,
            };
            let from = region[rng.below(region.len())];
            let to = match nearest_connected(&connected, from) {
                Some(p) => p,
                None => break,
            };
            self.carve(from, to);
            tunnels += 1;
            // The tunnel may have merged other regions along the way.
            let mut merged = vec![vec![false; self.width]; self.height];
            for cell in self.flood(to.0, to.1, &mut merged) {
                connected[cell.1][cell.0] = true;
            }
        }
        tunnels
    }

    fn first_unconnected(&self, connected: &[Vec<bool>]) -> Option<(usize, usize)> {
        for y in 0..self.height {
            for x in 0..self.width {
                if self.cells[y][x] == Tile::Floor && !connected[y][x] {
                    return Some((x, y));
                }
            }
        }
        None
    }

    /// Horizontal leg along `from.y`, then vertical leg along `to.x`.
    fn carve(&mut self, from: (usize, usize), to: (usize, usize)) {
        let (fx, fy) = from;
        let (tx, ty) = to;
        for x in fx.min(tx)..=fx.max(tx) {
            self.cells[fy][x] = Tile::Floor;
        }
        for y in fy.min(ty)..=fy.max(ty) {
            self.cells[y][tx] = Tile::Floor;
        }
    }
}

fn nearest_connected(connected: &[Vec<bool>], from: (usize, usize)) -> Option<(usize, usize)> {
    let mut best: Option<((usize, usize), usize)> = None;
    for (y, row) in connected.iter().enumerate() {
        for (x, &c) in row.iter().enumerate() {
            if !c {
                continue;
            }
            let dx = x.abs_diff(from.0);
            let dy = y.abs_diff(from.1);
            let d = dx * dx + dy * dy;
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some(((x, y), d));
            }
        }
    }
    best.map(|(p, _)| p)
}

/// Run the full pipeline and return the finished grid.
pub fn generate(width: usize, height: usize, cfg: &CellularConfig, rng: &mut GameRng) -> Vec<Vec<Tile>> {
    let mut map = Cellular::new(width, height);
    map.randomize(rng, cfg.fill_probability);
    let mut tunnels = 0;
    for _ in 0..cfg.smoothing_passes {
        map.smooth(&cfg.born, &cfg.survive);
        if cfg.connect {
            tunnels += map.connect(rng);
        }
    }
    debug!(width, height, tunnels, "cave_generated");
    map.into_tiles()
}
