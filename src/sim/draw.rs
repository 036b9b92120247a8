/// Draw-event batching and the drawing surfaces it flushes to.
///
/// ## Batching
///
/// During a tick, systems call `DrawBatch::add()` for every cell they want
/// repainted. Calls for the same cell merge into one pending event whose
/// glyph / fg / bg layers stack in call order. Once per tick, `flush()`:
///   1. clears the surface
///   2. paints every solid
///   3. paints each pending event (first-insertion order)
///   4. empties the batch
///
/// Invariant: at most one pending event per coordinate.
///
/// ## Surfaces
///
/// `GridSurface` takes (x, y, glyph, fg, bg) per cell; `TextSurface` takes
/// strings at a position. `GridBuffer` and `TextBuffer` are the in-memory
/// implementations the renderer composes from.

use std::collections::HashMap;

use crate::domain::solids::Solids;
use crate::domain::tile::{Paint, WALL_FG, WALL_GLYPH};

pub trait GridSurface {
    fn clear(&mut self);
    fn draw(&mut self, x: i32, y: i32, glyph: Option<char>, fg: Option<Paint>, bg: Option<Paint>);
}

pub trait TextSurface {
    fn clear(&mut self);
    fn draw_text(&mut self, x: usize, y: usize, text: &str);
}

// ── Draw events ──

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawEvent {
    pub x: i32,
    pub y: i32,
    pub glyphs: Vec<char>,
    pub fg: Vec<Paint>,
    pub bg: Vec<Paint>,
}

impl DrawEvent {
    fn new(x: i32, y: i32) -> Self {
        DrawEvent { x, y, glyphs: Vec::new(), fg: Vec::new(), bg: Vec::new() }
    }

    /// Topmost glyph.
    pub fn glyph(&self) -> Option<char> {
        self.glyphs.last().copied()
    }

    pub fn foreground(&self) -> Option<Paint> {
        self.fg.last().copied()
    }

    pub fn background(&self) -> Option<Paint> {
        self.bg.last().copied()
    }
}

#[derive(Debug, Default)]
pub struct DrawBatch {
    events: Vec<DrawEvent>,
    index: HashMap<(i32, i32), usize>,
}

impl DrawBatch {
    pub fn new() -> Self {
        DrawBatch { events: Vec::with_capacity(64), index: HashMap::with_capacity(64) }
    }

    /// Queue layers for (x, y). `None` layers are not pushed.
    pub fn add(&mut self, x: i32, y: i32, glyph: Option<char>, fg: Option<Paint>, bg: Option<Paint>) {
        let idx = match self.index.get(&(x, y)) {
            Some(&i) => i,
            None => {
                self.events.push(DrawEvent::new(x, y));
                let i = self.events.len() - 1;
                self.index.insert((x, y), i);
                i
            }
        };
        let ev = &mut self.events[idx];
        if let Some(g) = glyph {
            ev.glyphs.push(g);
        }
        if let Some(f) = fg {
            ev.fg.push(f);
        }
        if let Some(b) = bg {
            ev.bg.push(b);
        }
    }

    #[cfg(test)]
    pub fn get(&self, x: i32, y: i32) -> Option<&DrawEvent> {
        self.index.get(&(x, y)).map(|&i| &self.events[i])
    }

    #[cfg(test)]
    pub fn pending(&self) -> &[DrawEvent] {
        &self.events
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Repaint the surface from scratch and empty the batch.
    /// Returns the number of events drawn.
    pub fn flush<S: GridSurface>(&mut self, surface: &mut S, solids: &Solids) -> usize {
        surface.clear();
        for (x, y) in solids.iter() {
            surface.draw(x, y, Some(WALL_GLYPH), Some(WALL_FG), None);
        }
        let drawn = self.events.len();
        for ev in self.events.drain(..) {
            surface.draw(ev.x, ev.y, ev.glyph(), ev.foreground(), ev.background());
        }
        self.index.clear();
        drawn
    }
}

// ── In-memory surfaces ──

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct GridCell {
    pub glyph: Option<char>,
    pub fg: Option<Paint>,
    pub bg: Option<Paint>,
}

/// Map-sized cell grid. Draws outside the grid are ignored.
#[derive(Clone, Debug)]
pub struct GridBuffer {
    width: usize,
    height: usize,
    cells: Vec<GridCell>,
}

impl GridBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        GridBuffer { width, height, cells: vec![GridCell::default(); width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> GridCell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            GridCell::default()
        }
    }
}

impl GridSurface for GridBuffer {
    fn clear(&mut self) {
        self.cells.fill(GridCell::default());
    }

    fn draw(&mut self, x: i32, y: i32, glyph: Option<char>, fg: Option<Paint>, bg: Option<Paint>) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.cells[y as usize * self.width + x as usize] = GridCell { glyph, fg, bg };
    }
}

/// Fixed-size character panel. Text past the right edge is cut.
#[derive(Clone, Debug)]
pub struct TextBuffer {
    width: usize,
    rows: Vec<Vec<char>>,
}

impl TextBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        TextBuffer { width, rows: vec![vec![' '; width]; height] }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, y: usize) -> String {
        self.rows.get(y).map(|r| r.iter().collect()).unwrap_or_default()
    }
}

impl TextSurface for TextBuffer {
    fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(' ');
        }
    }

    fn draw_text(&mut self, x: usize, y: usize, text: &str) {
        let width = self.width;
        let row = match self.rows.get_mut(y) {
            Some(r) => r,
            None => return,
        };
        for (cx, ch) in (x..width).zip(text.chars()) {
            row[cx] = ch;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_event_per_coordinate() {
        let mut b = DrawBatch::new();
        b.add(1, 1, Some('@'), Some(Paint::Red), Some(Paint::Black));
        b.add(1, 1, None, None, Some(Paint::Shade));
        b.add(2, 1, Some('N'), Some(Paint::Yellow), None);
        assert_eq!(b.len(), 2);
        let ev = b.get(1, 1).unwrap();
        assert_eq!(ev.glyphs, vec!['@']);
        assert_eq!(ev.bg, vec![Paint::Black, Paint::Shade]);
        assert_eq!(ev.background(), Some(Paint::Shade));
    }

    #[test]
    fn each_layer_is_pushed_independently() {
        let mut b = DrawBatch::new();
        b.add(0, 0, Some('a'), None, None);
        b.add(0, 0, None, Some(Paint::Green), None);
        b.add(0, 0, None, None, None);
        let ev = b.get(0, 0).unwrap();
        assert_eq!(ev.glyphs, vec!['a']);
        assert_eq!(ev.fg, vec![Paint::Green]);
        assert!(ev.bg.is_empty());
        assert_eq!(ev.background(), None);
    }

    #[test]
    fn flush_empties_batch_and_paints_solids_first() {
        let mut solids = Solids::new();
        solids.add(0, 0);
        solids.add(3, 2);
        let mut grid = GridBuffer::new(4, 3);
        let mut b = DrawBatch::new();
        b.add(1, 0, Some('@'), Some(Paint::Red), Some(Paint::Black));
        // an event on a solid cell overrides the wall glyph
        b.add(3, 2, Some('x'), None, None);

        let drawn = b.flush(&mut grid, &solids);
        assert_eq!(drawn, 2);
        assert!(b.is_empty());
        assert!(b.get(1, 0).is_none());

        assert_eq!(grid.get(0, 0).glyph, Some(WALL_GLYPH));
        assert_eq!(grid.get(0, 0).fg, Some(WALL_FG));
        assert_eq!(grid.get(1, 0), GridCell { glyph: Some('@'), fg: Some(Paint::Red), bg: Some(Paint::Black) });
        assert_eq!(grid.get(3, 2).glyph, Some('x'));
        assert_eq!(grid.get(2, 2), GridCell::default());
    }

    #[test]
    fn flush_clears_stale_cells() {
        let solids = Solids::new();
        let mut grid = GridBuffer::new(3, 3);
        let mut b = DrawBatch::new();
        b.add(0, 0, Some('@'), None, None);
        b.flush(&mut grid, &solids);
        b.add(1, 0, Some('@'), None, None);
        b.flush(&mut grid, &solids);
        assert_eq!(grid.get(0, 0).glyph, None);
        assert_eq!(grid.get(1, 0).glyph, Some('@'));
    }

    #[test]
    fn flush_preserves_insertion_order() {
        let mut b = DrawBatch::new();
        b.add(2, 0, Some('a'), None, None);
        b.add(0, 0, Some('b'), None, None);
        b.add(2, 0, Some('c'), None, None);
        let order: Vec<_> = b.pending().iter().map(|e| (e.x, e.glyph())).collect();
        assert_eq!(order, vec![(2, Some('c')), (0, Some('b'))]);
    }

    #[test]
    fn grid_ignores_out_of_bounds() {
        let mut grid = GridBuffer::new(2, 2);
        grid.draw(-1, 0, Some('x'), None, None);
        grid.draw(2, 1, Some('x'), None, None);
        assert!((0..2).all(|y| (0..2).all(|x| grid.get(x, y).glyph.is_none())));
    }

    #[test]
    fn text_buffer_cuts_at_width() {
        let mut t = TextBuffer::new(6, 2);
        t.draw_text(1, 0, "hello world");
        assert_eq!(t.row(0), " hello");
        t.draw_text(0, 5, "ignored");
        t.clear();
        assert_eq!(t.row(0), "      ");
    }
}
