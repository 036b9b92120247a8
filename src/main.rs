/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossterm::event::KeyCode;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::entity::MoveDir;
use domain::rng::GameRng;
use error::GameError;
use sim::event::GameEvent;
use sim::message::{self, Reveal, DEFAULT_MESSAGE, QUERY_KEY};
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_ENV: &str = "CAVECIPHER_LOG";

#[derive(Parser, Debug)]
#[command(name = "cavecipher", version, about = "Chase the NPC through the cave to spell out a hidden message")]
struct Cli {
    /// Base64-encoded message to reveal
    #[arg(long, conflicts_with = "url")]
    msg: Option<String>,

    /// Share link carrying the message in its `msg` query parameter
    #[arg(long)]
    url: Option<String>,

    /// RNG seed (overrides config.toml)
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a share link for a message and exit
    Link {
        #[arg(required = true)]
        text: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let (config, config_error) = match GameConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => {
            eprintln!("Warning: {e}");
            eprintln!("Using default settings.");
            (GameConfig::default(), Some(e))
        }
    };

    if let Some(Command::Link { text }) = &cli.command {
        println!("{}", message::share_link(&config.link.base_url, &text.join(" ")));
        return;
    }

    init_logging(config.general.log_file.as_deref());
    if let Some(e) = config_error {
        warn!(error = %e, "config_rejected_using_defaults");
    }

    let reveal = resolve_message(&cli);
    let rng = match cli.seed.or(config.general.seed) {
        Some(seed) => GameRng::new(seed),
        None => GameRng::from_entropy(),
    };

    let mut world = match WorldState::new(&config, reveal, rng) {
        Ok(w) => w,
        Err(e) => {
            error!(error = %e, "world_init_failed");
            eprintln!("Could not build a playable map: {e}");
            std::process::exit(1);
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!(error = %e, "game_loop_failed");
        eprintln!("Game error: {e}");
    }

    info!(tick = world.tick, cursor = world.reveal.cursor(), "session_ended");
    println!();
    if world.completed {
        println!("Message: {}", world.reveal.text());
    } else {
        println!("Revealed so far: {}", world.reveal.revealed());
    }
}

/// Trace to a file: stdout belongs to the game screen.
fn init_logging(path: Option<&Path>) {
    let Some(path) = path else { return };
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", path.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .try_init();
}

/// `--msg` wins over `--url`. A malformed message falls back to the default.
fn resolve_message(cli: &Cli) -> Reveal {
    let param = match (&cli.msg, &cli.url) {
        (Some(m), _) => Some(m.clone()),
        (None, Some(url)) => message::query_param(url, QUERY_KEY),
        (None, None) => None,
    };
    match Reveal::from_param(param.as_deref()) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "message_param_rejected");
            Reveal::new(DEFAULT_MESSAGE)
        }
    }
}

fn game_loop(world: &mut WorldState, renderer: &mut Renderer, config: &GameConfig) -> Result<(), GameError> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&config.gamepad);
    let tick_rate = Duration::from_millis(config.display.tick_rate_ms);
    let mut intent: Option<MoveDir> = None;
    let mut pad_connected = gp.connected();
    info!(connected = pad_connected, "gamepad_status");

    // First frame shows both entities before any input.
    trace_events(&step::step(world, None)?);
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        gp.update();
        if gp.connected() != pad_connected {
            pad_connected = gp.connected();
            info!(connected = pad_connected, "gamepad_status");
        }

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            break;
        }
        if kb.resized() {
            renderer.force_redraw();
        }

        intent = next_intent(intent, kb.presses(), gp.direction_pressed(), gp.stop_pressed());

        if last_tick.elapsed() >= tick_rate {
            trace_events(&step::step(world, intent)?);
            last_tick = Instant::now();
        }

        renderer.render(world)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn trace_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::PlayerMoved { x, y } => trace!(x, y, "player_moved"),
            GameEvent::MoveBlocked { dir } => trace!(?dir, "move_blocked"),
            GameEvent::PathTraced { len } => trace!(len, "path_traced"),
            GameEvent::NpcEncountered { icon, revealed } => info!(?icon, revealed, "npc_encountered"),
            GameEvent::MapRegenerated { attempts } => debug!(attempts, "map_regenerated"),
            GameEvent::NpcRelocated { x, y, attempts } => debug!(x, y, attempts, "npc_relocated"),
            GameEvent::MessageComplete => info!("message_complete"),
        }
    }
}

// ── Key bindings ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_STOP: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

fn key_direction(code: KeyCode) -> Option<MoveDir> {
    if KEYS_LEFT.contains(&code) {
        Some(MoveDir::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(MoveDir::Right)
    } else if KEYS_UP.contains(&code) {
        Some(MoveDir::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(MoveDir::Down)
    } else {
        None
    }
}

/// The movement intent stays latched until another direction or a stop.
/// Later presses in the frame win; the gamepad is applied after the keyboard.
fn next_intent(
    current: Option<MoveDir>,
    presses: &[KeyCode],
    pad_dir: Option<MoveDir>,
    pad_stop: bool,
) -> Option<MoveDir> {
    let mut intent = current;
    for &code in presses {
        if KEYS_STOP.contains(&code) {
            intent = None;
        } else if let Some(dir) = key_direction(code) {
            intent = Some(dir);
        }
    }
    if pad_dir.is_some() {
        intent = pad_dir;
    }
    if pad_stop {
        intent = None;
    }
    intent
}
