/// Gamepad input using gilrs (optional `gamepad` feature).
///
/// D-pad and left stick steer the player; a press (or the stick crossing
/// its deadzone) latches a direction. Stop and quit buttons come from
/// `[gamepad]` in config.toml.
/// Without the feature, or without a pad, every query returns false.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::MoveDir;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Face and shoulder buttons that can be bound to an action.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    Start,
    Select,
}

impl Btn {
    const COUNT: usize = 8;

    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

fn dir_index(dir: MoveDir) -> usize {
    match dir {
        MoveDir::Left => 0,
        MoveDir::Right => 1,
        MoveDir::Up => 2,
        MoveDir::Down => 3,
    }
}

/// Which buttons trigger which action.
#[derive(Clone, Debug, PartialEq)]
struct ActionMap {
    stop: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap { stop: vec![Btn::A], quit: vec![Btn::Select] }
    }
}

impl ActionMap {
    /// Unknown names are skipped; an empty result keeps the default.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if parsed.is_empty() { fallback } else { parsed }
        }
        let def = ActionMap::default();
        ActionMap { stop: parse(&cfg.stop, def.stop), quit: parse(&cfg.quit, def.quit) }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    /// Edge flags, reset on every `update()`.
    pressed: [bool; Btn::COUNT],

    /// Digitised stick, indexed by `dir_index`.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick: [bool; 4],
    /// Directions that became held during the last `update()`.
    dir_pressed: [bool; 4],

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    actions: ActionMap,
    connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                tracing::warn!(error = %e, "gamepad_unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            pressed: [false; Btn::COUNT],
            stick: [false; 4],
            dir_pressed: [false; 4],
            stick_x: 0.0,
            stick_y: 0.0,
            actions: ActionMap::from_config(cfg),
            connected,
        }
    }

    pub fn update(&mut self) {
        self.pressed = [false; Btn::COUNT];
        self.dir_pressed = [false; 4];

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.press(btn);
                }
                EventType::AxisChanged(Axis::LeftStickX, v, _) => self.stick_x = v,
                EventType::AxisChanged(Axis::LeftStickY, v, _) => self.stick_y = v,
                EventType::Connected => self.connected = true,
                EventType::Disconnected => {
                    self.connected = false;
                    self.stick_x = 0.0;
                    self.stick_y = 0.0;
                }
                _ => {}
            }
        }

        let prev = self.stick;
        self.stick[dir_index(MoveDir::Left)] = self.stick_x < -STICK_DEADZONE;
        self.stick[dir_index(MoveDir::Right)] = self.stick_x > STICK_DEADZONE;
        self.stick[dir_index(MoveDir::Up)] = self.stick_y > STICK_DEADZONE;
        self.stick[dir_index(MoveDir::Down)] = self.stick_y < -STICK_DEADZONE;
        for i in 0..4 {
            if self.stick[i] && !prev[i] {
                self.dir_pressed[i] = true;
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn press(&mut self, btn: Button) {
        let dir = match btn {
            Button::DPadUp => Some(MoveDir::Up),
            Button::DPadDown => Some(MoveDir::Down),
            Button::DPadLeft => Some(MoveDir::Left),
            Button::DPadRight => Some(MoveDir::Right),
            _ => None,
        };
        if let Some(d) = dir {
            self.dir_pressed[dir_index(d)] = true;
        } else if let Some(b) = Btn::from_gilrs(btn) {
            self.pressed[b as usize] = true;
        }
    }

    // ── Queries ──

    /// A pad is attached; always false without the `gamepad` feature.
    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Direction that started being held this frame, if any.
    pub fn direction_pressed(&self) -> Option<MoveDir> {
        MoveDir::ALL.into_iter().find(|&d| self.dir_pressed[dir_index(d)])
    }

    pub fn stop_pressed(&self) -> bool {
        self.actions.stop.iter().any(|&b| self.pressed[b as usize])
    }

    pub fn quit_pressed(&self) -> bool {
        self.actions.quit.iter().any(|&b| self.pressed[b as usize])
    }
}
