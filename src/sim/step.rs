/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Player movement (only with an intent)
///   2. Encounter: player and NPC on the same cell reveal the next character
///   3. NPC tick (relocate if stranded, draw, trace the path overlay)
///   4. Flush the draw batch into the world grid
///
/// Blocked moves are events, not errors. Errors only come from the bounded
/// map regeneration and NPC placement loops.

use tracing::{debug, info};

use crate::domain::entity::MoveDir;
use crate::domain::path;
use crate::domain::rules;
use crate::domain::tile::{NPC_BG, NPC_FG, PATH_BG, PLAYER_BG, PLAYER_FG, PLAYER_GLYPH};
use crate::error::GameError;
use super::event::GameEvent;
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, intent: Option<MoveDir>) -> Result<Vec<GameEvent>, GameError> {
    let mut events = Vec::new();
    world.tick += 1;

    if let Some(dir) = intent {
        resolve_player_movement(world, dir, &mut events);
    }
    let (px, py) = world.player.pos();
    world.draws.add(px, py, Some(PLAYER_GLYPH), Some(PLAYER_FG), Some(PLAYER_BG));

    if world.player.same_cell(&world.npc) {
        resolve_encounter(world, &mut events)?;
    }
    resolve_npc(world, &mut events)?;

    world.draws.flush(&mut world.grid, &world.solids);
    Ok(events)
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player_movement(world: &mut WorldState, dir: MoveDir, events: &mut Vec<GameEvent>) {
    let dest = rules::can_move(&world.map_view(), &world.player, dir);
    match dest {
        Some(dest) => {
            world.player.place(dest);
            events.push(GameEvent::PlayerMoved { x: dest.0, y: dest.1 });
        }
        None => events.push(GameEvent::MoveBlocked { dir }),
    }
}

// ══════════════════════════════════════════════════════════════
// Encounter
// ══════════════════════════════════════════════════════════════

/// Advance the reveal, rebuild the cave around the player and send the
/// NPC somewhere else.
fn resolve_encounter(world: &mut WorldState, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    // `None` once the message is out: the NPC goes back to its default glyph.
    world.reveal.advance();
    world.npc.icon = world.reveal.current();
    events.push(GameEvent::NpcEncountered {
        icon: world.npc.icon,
        revealed: world.reveal.cursor(),
    });

    let (px, py) = world.player.pos();
    let attempts = world.regenerate_until_walkable(px, py)?;
    events.push(GameEvent::MapRegenerated { attempts });

    let placed = world.place_npc(true)?;
    events.push(GameEvent::NpcRelocated { x: placed.x, y: placed.y, attempts: placed.attempts });

    let revealed = world.reveal.revealed();
    debug!(cursor = world.reveal.cursor(), revealed = %revealed, "message_advanced");
    world.log.add_line(&revealed);

    if world.reveal.is_complete() && !world.completed {
        world.completed = true;
        info!(tick = world.tick, generation = world.generation, "message_complete");
        events.push(GameEvent::MessageComplete);
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════
// NPC
// ══════════════════════════════════════════════════════════════

fn resolve_npc(world: &mut WorldState, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
    if !world.is_walkable(world.npc.x, world.npc.y) {
        let placed = world.place_npc(true)?;
        events.push(GameEvent::NpcRelocated { x: placed.x, y: placed.y, attempts: placed.attempts });
    }

    let (nx, ny) = world.npc.pos();
    let glyph = world.npc_glyph();
    world.draws.add(nx, ny, Some(glyph), Some(NPC_FG), Some(NPC_BG));

    if world.show_path {
        let map = world.map_view();
        let route = path::astar((nx, ny), world.player.pos(), |x, y| map.is_walkable(x, y));
        if let Some(cells) = route {
            for &(x, y) in &cells {
                world.draws.add(x, y, None, None, Some(PATH_BG));
            }
            events.push(GameEvent::PathTraced { len: cells.len() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::rng::GameRng;
    use crate::domain::tile::{Paint, NPC_FALLBACK_GLYPH};
    use crate::sim::message::Reveal;

    fn world_with(message: &str, seed: u64) -> WorldState {
        WorldState::new(&GameConfig::default(), Reveal::new(message), GameRng::new(seed)).unwrap()
    }

    fn encounter(world: &mut WorldState) -> Vec<GameEvent> {
        world.npc.place(world.player.pos());
        step(world, None).unwrap()
    }

    #[test]
    fn move_applied_iff_walkable() {
        let mut rng = GameRng::new(99);
        for seed in 0..8 {
            let mut w = world_with("You Win!", seed);
            for _ in 0..100 {
                let dir = MoveDir::ALL[rng.below(4)];
                let before = w.player.pos();
                let target = w.player.target(dir);
                let open = w.is_walkable(target.0, target.1);
                let events = step(&mut w, Some(dir)).unwrap();
                if events.iter().any(|e| matches!(e, GameEvent::NpcEncountered { .. })) {
                    continue;
                }
                if open {
                    assert_eq!(w.player.pos(), target);
                    assert!(events.contains(&GameEvent::PlayerMoved { x: target.0, y: target.1 }));
                } else {
                    assert_eq!(w.player.pos(), before);
                    assert!(events.contains(&GameEvent::MoveBlocked { dir }));
                }
            }
        }
    }

    #[test]
    fn moving_off_the_map_is_blocked() {
        let mut w = world_with("x", 3);
        w.player.place((0, 0));
        let events = step(&mut w, Some(MoveDir::Left)).unwrap();
        assert_eq!(w.player.pos(), (0, 0));
        assert!(events.contains(&GameEvent::MoveBlocked { dir: MoveDir::Left }));
        step(&mut w, Some(MoveDir::Up)).unwrap();
        assert_eq!(w.player.pos(), (0, 0));
    }

    #[test]
    fn first_frame_shows_both_entities() {
        let mut w = world_with("You Win!", 5);
        step(&mut w, None).unwrap();
        let (px, py) = w.player.pos();
        let (nx, ny) = w.npc.pos();
        let player = w.grid.get(px as usize, py as usize);
        assert_eq!(player.glyph, Some(PLAYER_GLYPH));
        assert_eq!(player.fg, Some(PLAYER_FG));
        let npc = w.grid.get(nx as usize, ny as usize);
        assert_eq!(npc.glyph, Some('Y'));
        assert_eq!(npc.fg, Some(NPC_FG));
        assert!(w.draws.is_empty());
    }

    #[test]
    fn leading_space_never_draws_a_blank_npc() {
        let mut w = world_with(" hi", 5);
        step(&mut w, None).unwrap();
        let (nx, ny) = w.npc.pos();
        assert_eq!(w.grid.get(nx as usize, ny as usize).glyph, Some('h'));

        let events = encounter(&mut w);
        assert!(events.contains(&GameEvent::NpcEncountered { icon: Some('i'), revealed: 2 }));
    }

    #[test]
    fn path_overlay_shades_background() {
        let mut w = world_with("You Win!", 5);
        let events = step(&mut w, None).unwrap();
        // the cave is connected, so a path always exists
        assert!(events.iter().any(|e| matches!(e, GameEvent::PathTraced { .. })));
        let (nx, ny) = w.npc.pos();
        assert_eq!(w.grid.get(nx as usize, ny as usize).bg, Some(Paint::Shade));

        let mut w = world_with("You Win!", 5);
        w.show_path = false;
        let events = step(&mut w, None).unwrap();
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PathTraced { .. })));
    }

    #[test]
    fn encounter_reveals_next_character() {
        let mut w = world_with("You Win!", 11);
        let gen_before = w.generation;
        let events = encounter(&mut w);

        assert!(events.contains(&GameEvent::NpcEncountered { icon: Some('o'), revealed: 1 }));
        assert!(w.generation > gen_before);
        assert_eq!(w.npc.icon, Some('o'));
        assert_eq!(w.log.last(), Some("Y"));
        assert!(w.is_walkable(w.player.x, w.player.y));
        assert!(w.is_walkable(w.npc.x, w.npc.y));
        assert!(!w.npc.same_cell(&w.player));

        encounter(&mut w);
        encounter(&mut w);
        // "You " then the space is skipped
        assert_eq!(w.reveal.cursor(), 4);
        assert_eq!(w.npc.icon, Some('W'));
        assert_eq!(w.log.last(), Some("You "));
    }

    #[test]
    fn message_complete_is_emitted_once() {
        let mut w = world_with("ab", 2);
        let mut completions = 0;
        for _ in 0..6 {
            let events = encounter(&mut w);
            completions += events.iter().filter(|e| **e == GameEvent::MessageComplete).count();
        }
        assert_eq!(completions, 1);
        assert!(w.completed);
        assert_eq!(w.reveal.cursor(), 2);
        assert_eq!(w.npc.icon, None);
        assert_eq!(w.npc_glyph(), 'a');
        assert_eq!(w.log.last(), Some("Ab"));
    }

    #[test]
    fn empty_message_completes_on_first_encounter() {
        let mut w = world_with("", 4);
        let events = encounter(&mut w);
        assert!(events.contains(&GameEvent::MessageComplete));
        assert_eq!(w.npc_glyph(), NPC_FALLBACK_GLYPH);
    }

    #[test]
    fn log_never_shows_more_than_ten_lines() {
        let mut w = world_with("the quick brown fox jumps over the lazy dog", 8);
        for _ in 0..40 {
            encounter(&mut w);
            assert!(w.log.visible_lines().len() <= 10);
        }
        assert_eq!(w.log.visible_lines().len(), 10);
    }

    #[test]
    fn npc_never_rests_on_solid() {
        let mut rng = GameRng::new(1234);
        let mut w = world_with("You Win!", 21);
        for i in 0..300 {
            if i % 25 == 0 {
                w.npc.place(w.player.pos());
            }
            let dir = MoveDir::ALL[rng.below(4)];
            step(&mut w, Some(dir)).unwrap();
            assert!(w.is_walkable(w.npc.x, w.npc.y));
        }
    }

    #[test]
    fn stranded_npc_is_relocated() {
        let mut w = world_with("You Win!", 6);
        let wall = w.solids.iter().next().unwrap();
        w.npc.place(wall);
        let events = step(&mut w, None).unwrap();
        assert!(events.iter().any(|e| matches!(e, GameEvent::NpcRelocated { .. })));
        assert!(w.is_walkable(w.npc.x, w.npc.y));
    }
}
