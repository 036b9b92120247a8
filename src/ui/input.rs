/// Keyboard event collector.
///
/// Movement is latched by the game loop, so only key presses matter here:
/// each frame the pending terminal events are drained into a list of fresh
/// presses. Release events are ignored. A terminal resize is remembered so
/// the renderer can repaint from scratch.

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub struct InputState {
    /// Key codes pressed (or auto-repeated) during the last drain, in order.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for modifier checks.
    raw_events: Vec<KeyEvent>,

    resized: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            resized: false,
        }
    }

    /// Drain all pending terminal events without blocking.
    /// Call once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.resized = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.record(key),
                Ok(Event::Resize(_, _)) => self.resized = true,
                _ => {}
            }
        }
    }

    fn record(&mut self, key: KeyEvent) {
        self.raw_events.push(key);
        if key.kind != KeyEventKind::Release {
            self.fresh_presses.push(key.code);
        }
    }

    /// Presses of this frame, oldest first.
    pub fn presses(&self) -> &[KeyCode] {
        &self.fresh_presses
    }

    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    pub fn resized(&self) -> bool {
        self.resized
    }

    /// Feed a key event directly, bypassing the terminal.
    #[cfg(test)]
    pub fn inject(&mut self, key: KeyEvent) {
        self.record(key);
    }
}
