/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The map comes from `WorldState::grid` (already flushed by the step) and
/// the log from `MessageLog::render` into a fixed-size text panel. Neither is
/// touched by the renderer.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::tile::Paint;
use crate::sim::draw::{GridCell, TextBuffer};
use crate::sim::log::{PANEL_HEIGHT, PANEL_WIDTH};
use crate::sim::world::WorldState;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every empty cell, so the gaps between rows
    /// match the cells on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never produced by composition; marks every position as changed.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn invalidate(&mut self) {
        self.cells.fill(Cell::INVALID);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// One column per char; cut at the right edge.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (cx, ch) in (x..self.width).zip(s.chars()) {
            self.set(cx, y, Cell::new(ch, fg, bg));
        }
    }
}

// ── Layout ──

/// Each map cell is two terminal columns wide so the grid looks square.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
const MAP_COL: usize = 1;


const PANEL_BG: Color = Color::Rgb { r: 30, g: 30, b: 30 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

const HELP: &str = " WASD/Arrows:Move  Space:Stop  Esc/Q:Quit";

fn paint_color(p: Paint) -> Color {
    match p {
        Paint::Red => Color::Red,
        Paint::Yellow => Color::Yellow,
        Paint::Green => Color::Green,
        Paint::Black => Color::Black,
        // half-transparent grey over the base background
        Paint::Shade => Color::Rgb { r: 78, g: 78, b: 85 },
    }
}

fn grid_cell_colors(cell: GridCell) -> (Color, Color) {
    let fg = cell.fg.map_or(Color::White, paint_color);
    let bg = cell.bg.map_or(Cell::BASE_BG, paint_color);
    (fg, bg)
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    panel: TextBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            panel: TextBuffer::new(PANEL_WIDTH, PANEL_HEIGHT),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        self.back.invalidate();
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Repaint every cell on the next frame.
    pub fn force_redraw(&mut self) {
        self.back.invalidate();
    }

    pub fn render(&mut self, world: &WorldState) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.invalidate();
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        world.log.render(&mut self.panel);
        compose(&mut self.front, world, &self.panel);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit colors, never ResetColor: the terminal default may differ
        // from BASE_BG.
        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

// ── Compose: build front buffer content ──

fn compose(buf: &mut FrameBuffer, w: &WorldState, panel: &TextBuffer) {
    compose_hud(buf, w);

    let map_w = w.grid.width();
    let map_h = w.grid.height();
    for gy in 0..map_h {
        let row = MAP_ROW + gy;
        if row >= buf.height {
            break;
        }
        for gx in 0..map_w {
            let col = MAP_COL + gx * CELL_W;
            if col + 1 >= buf.width {
                break;
            }
            let cell = w.grid.get(gx, gy);
            let (fg, bg) = grid_cell_colors(cell);
            buf.set(col, row, Cell::new(cell.glyph.unwrap_or(' '), fg, bg));
            // right half carries the background so overlays read as blocks
            buf.set(col + 1, row, Cell::new(' ', fg, bg));
        }
    }

    // ── Log panel, right of the map ──
    let panel_col = MAP_COL + map_w * CELL_W + 2;
    for py in 0..panel.height() {
        let row = MAP_ROW + py;
        let text: String = panel.row(py);
        for (i, ch) in text.chars().enumerate() {
            buf.set(panel_col + i, row, Cell::new(ch, Color::White, PANEL_BG));
        }
    }

    // ── Help bar ──
    let help_row = MAP_ROW + map_h + 1;
    buf.put_str(0, help_row, HELP, Color::DarkGrey, Cell::BASE_BG);
}

fn compose_hud(buf: &mut FrameBuffer, w: &WorldState) {
    let status = if w.completed { "  Message complete!" } else { "" };
    let hud = format!(
        " cavecipher  {}/{} revealed  map #{}{}",
        w.reveal.cursor(),
        w.reveal.len(),
        w.generation,
        status,
    );
    for x in 0..buf.width {
        buf.set(x, HUD_ROW, Cell::new(' ', Color::White, HUD_BG));
    }
    buf.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
}
