/// A* shortest path on the 4-connected grid.
///
/// Used for the NPC → player overlay, recomputed every tick. The goal is
/// expanded first and the search walks toward `from`, so the start cell only
/// needs to be reachable, and the returned path runs `from` → `to`
/// inclusive of both ends.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

const DIRS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

fn manhattan(a: (i32, i32), b: (i32, i32)) -> i32 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}

/// `passable` must be false outside the map, otherwise the search is unbounded.
pub fn astar<F>(from: (i32, i32), to: (i32, i32), passable: F) -> Option<Vec<(i32, i32)>>
where
    F: Fn(i32, i32) -> bool,
{
    if from == to {
        return Some(vec![from]);
    }

    // Search runs from `to` toward `from`; `prev` then points back to `to`.
    let mut prev: HashMap<(i32, i32), (i32, i32)> = HashMap::new();
    let mut cost: HashMap<(i32, i32), i32> = HashMap::new();
    let mut open = BinaryHeap::new();

    cost.insert(to, 0);
    open.push(Reverse((manhattan(to, from), 0, to)));

    while let Some(Reverse((_, g, cell))) = open.pop() {
        if cell == from {
            let mut path = vec![from];
            let mut cur = from;
            while let Some(&p) = prev.get(&cur) {
                path.push(p);
                cur = p;
            }
            return Some(path);
        }
        if cost.get(&cell).map_or(false, |&best| g > best) {
            continue;
        }
        for &(dx, dy) in &DIRS {
            let next = (cell.0 + dx, cell.1 + dy);
            if !passable(next.0, next.1) {
                continue;
            }
            let ng = g + 1;
            if cost.get(&next).map_or(true, |&c| ng < c) {
                cost.insert(next, ng);
                prev.insert(next, cell);
                open.push(Reverse((ng + manhattan(next, from), ng, next)));
            }
        }
    }

    None
}
