//! Fixed per-frame simulation tick
//!
//! One call advances the whole game by one display frame: physics for each
//! player (player 0 strictly before player 1, so contention for the same
//! platform edge resolves deterministically), then hazards and transmutation,
//! then the door/win state machine.

use super::collision;
use super::level::LevelData;
use super::state::{Element, GameEvent, GamePhase, GameState, Player, PlayerId};
use crate::consts;

/// Held-key snapshot for one player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub ability: bool,
}

/// Input commands for a single tick (deterministic)
///
/// Snapshotted from the live key state before any physics runs, so one tick
/// never sees a key change between the left/right and ability checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Fire player first, water player second
    pub players: [PlayerInput; 2],
}

/// Advance the game state by one frame and return the events it produced.
pub fn tick(state: &mut GameState, level: &LevelData, input: &FrameInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    // Terminal phase: the driver keeps scheduling ticks, but nothing moves
    // and the victory side effect cannot repeat.
    if state.phase == GamePhase::Won {
        return events;
    }

    state.time_ticks += 1;

    for (id, player) in state.players.iter_mut().enumerate() {
        step_player(id, player, input.players[id], level, &mut events);
    }

    resolve_hazards_and_transmutes(state, level, &mut events);
    collect_gems(state, level, &mut events);
    advance_win_machine(state, level, &mut events);

    events
}

/// Physics for one player: horizontal displacement, ability handling,
/// gravity, integration, and every collision clamp.
fn step_player(
    id: PlayerId,
    player: &mut Player,
    input: PlayerInput,
    level: &LevelData,
    events: &mut Vec<GameEvent>,
) {
    let phys = &level.physics;

    // Horizontal: direct displacement, no inertia
    let dir = (input.right as i32 - input.left as i32) as f32;
    player.vel.x = dir * phys.move_speed;
    player.pos.x += player.vel.x;

    // Water shrink tracks the held key. The hitbox is top-anchored, so the
    // feet lift on shrink and gravity settles them; the clamps below must
    // see the new height.
    player.shrunk = player.element == Element::Water && input.ability;

    // Jump from last frame's footing
    if input.jump && player.grounded {
        player.vel.y = -phys.jump_power;
        player.grounded = false;
        events.push(GameEvent::Jumped { player: id });
    }

    // Vertical: fire float overrides gravity while held; releasing the key
    // cancels any remaining rise.
    if player.element == Element::Fire && input.ability {
        player.vel.y = phys.float_rise;
    } else {
        if player.element == Element::Fire && player.ability_was_down && player.vel.y < 0.0 {
            player.vel.y = 0.0;
        }
        player.vel.y += phys.gravity;
    }
    player.ability_was_down = input.ability;

    player.pos.y += player.vel.y;
    player.grounded = false;

    player.pos.x = collision::clamp_to_world_x(player.pos.x, player.size.x, level.world.x);

    let res = collision::resolve_solids(player.rect(), player.vel, level.solids());
    player.pos = res.pos;
    player.vel = res.vel;
    if res.landed {
        player.grounded = true;
    }

    // Gated platforms block horizontally unless the element-specific ability
    // condition holds; vertical motion stays free so the platform can be
    // crossed over the top (fire, floating) or under the bottom (water, shrunk).
    for platform in level.gated() {
        if !player.rect().overlaps(&platform) {
            continue;
        }
        let passable = match player.element {
            Element::Fire => input.ability && player.rect().bottom() < platform.top(),
            Element::Water => {
                player.shrunk
                    && player.rect().bottom() >= platform.bottom() - consts::GATED_BOTTOM_TOLERANCE
            }
        };
        if !passable {
            player.pos.x = collision::gated_push_x(player.rect(), platform);
        }
    }

    let clamp = collision::clamp_to_world_y(
        player.pos.y,
        player.hitbox_height(),
        player.vel.y,
        level.world.y,
    );
    player.pos.y = clamp.y;
    player.vel.y = clamp.vel_y;
    if clamp.grounded {
        player.grounded = true;
    }
}

/// Deaths first, then transmutation. A player that died this frame respawns
/// immediately and skips the transmute check until it overlaps a zone alive;
/// the other player's state is never touched.
fn resolve_hazards_and_transmutes(
    state: &mut GameState,
    level: &LevelData,
    events: &mut Vec<GameEvent>,
) {
    for (id, player) in state.players.iter_mut().enumerate() {
        let body = player.rect();

        let deadly = level
            .hazards()
            .any(|(rect, element)| element != player.element && body.overlaps(&rect));
        if deadly {
            player.respawn();
            events.push(GameEvent::Died { player: id });
            continue;
        }

        // Edge-triggered over the union of all transmute zones: at most one
        // flip per discrete entry, no matter how many zones overlap.
        let inside = level.transmutes().any(|zone| body.overlaps(&zone));
        if inside {
            if !player.in_transmute {
                player.element = player.element.opposite();
                player.shrunk = false;
                player.in_transmute = true;
                events.push(GameEvent::Transmuted {
                    player: id,
                    now: player.element,
                });
            }
        } else {
            player.in_transmute = false;
        }
    }
}

fn collect_gems(state: &mut GameState, level: &LevelData, events: &mut Vec<GameEvent>) {
    for (i, gem) in level.gems.iter().enumerate() {
        if state.gems_collected[i] {
            continue;
        }
        let rect = gem.rect();
        for (id, player) in state.players.iter().enumerate() {
            if player.element == gem.element && player.rect().overlaps(&rect) {
                state.gems_collected[i] = true;
                events.push(GameEvent::GemCollected { player: id, gem: i });
                break;
            }
        }
    }
}

/// The door/win state machine. The joint condition: each player touching a
/// door its element satisfies under the level's rule, the two doors distinct,
/// and every gem collected. The countdown is armed once, cancelled the frame
/// the condition breaks, and fires the victory exactly once.
fn advance_win_machine(state: &mut GameState, level: &LevelData, events: &mut Vec<GameEvent>) {
    let mut contacts = [None, None];
    for (id, player) in state.players.iter().enumerate() {
        contacts[id] = level.doors().position(|(rect, element)| {
            level.door_rule.admits(element, player.element) && player.rect().overlaps(&rect)
        });
    }

    for (id, player) in state.players.iter_mut().enumerate() {
        let touching = contacts[id].is_some();
        if touching && !player.at_door {
            events.push(GameEvent::DoorEntered { player: id });
        }
        player.at_door = touching;
    }

    let at_distinct_doors = matches!((contacts[0], contacts[1]), (Some(a), Some(b)) if a != b);
    let condition = at_distinct_doors && state.all_gems_collected();

    state.phase = match state.phase {
        GamePhase::Playing if condition => GamePhase::WinPending {
            ticks_left: level.win_delay_ticks,
        },
        GamePhase::Playing => GamePhase::Playing,
        GamePhase::WinPending { .. } if !condition => GamePhase::Playing,
        GamePhase::WinPending { ticks_left } => {
            let remaining = ticks_left - 1;
            if remaining == 0 {
                events.push(GameEvent::Won);
                GamePhase::Won
            } else {
                GamePhase::WinPending {
                    ticks_left: remaining,
                }
            }
        }
        GamePhase::Won => GamePhase::Won,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    /// Flat arena: solid floor, doors on the right, a lava pool, a transmute
    /// pool, and a gated wall column.
    const TEST_LEVEL: &str = r#"{
        "number": 9,
        "name": "test arena",
        "world": [800.0, 480.0],
        "spawns": [[50.0, 418.0], [100.0, 418.0]],
        "player_size": [20.0, 30.0],
        "win_delay_ticks": 60,
        "zones": [
            {"kind": "solid", "x": 0.0, "y": 448.0, "w": 800.0, "h": 32.0},
            {"kind": "door", "element": "fire", "x": 700.0, "y": 384.0, "w": 32.0, "h": 64.0},
            {"kind": "door", "element": "water", "x": 750.0, "y": 384.0, "w": 32.0, "h": 64.0},
            {"kind": "hazard", "element": "fire", "x": 300.0, "y": 416.0, "w": 64.0, "h": 32.0},
            {"kind": "transmute", "x": 400.0, "y": 416.0, "w": 64.0, "h": 32.0},
            {"kind": "gated", "x": 500.0, "y": 348.0, "w": 32.0, "h": 100.0}
        ]
    }"#;

    fn test_level() -> LevelData {
        LevelData::from_json(TEST_LEVEL).unwrap()
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn both_at_doors(state: &mut GameState) {
        state.players[0].pos = Vec2::new(706.0, 418.0);
        state.players[1].pos = Vec2::new(756.0, 418.0);
    }

    #[test]
    fn test_standing_still_is_stable() {
        let level = test_level();
        let mut state = GameState::new(&level);
        for _ in 0..10 {
            let events = tick(&mut state, &level, &idle());
            assert!(events.is_empty());
        }
        assert_eq!(state.players[0].pos, Vec2::new(50.0, 418.0));
        assert_eq!(state.players[1].pos, Vec2::new(100.0, 418.0));
        assert_eq!(state.players[0].element, Element::Fire);
        assert!(state.players[0].grounded);
    }

    #[test]
    fn test_jump_and_land() {
        let level = test_level();
        let mut state = GameState::new(&level);
        let mut input = idle();
        input.players[0].jump = true;

        let events = tick(&mut state, &level, &input);
        assert!(events.contains(&GameEvent::Jumped { player: 0 }));
        assert!(state.players[0].pos.y < 418.0);
        assert!(!state.players[0].grounded);

        // Released the key; gravity brings the player back down
        let mut jumped_again = false;
        for _ in 0..120 {
            let events = tick(&mut state, &level, &idle());
            jumped_again |= events.contains(&GameEvent::Jumped { player: 0 });
        }
        assert!(!jumped_again);
        assert_eq!(state.players[0].pos.y, 418.0);
        assert!(state.players[0].grounded);
    }

    #[test]
    fn test_fire_float_rises_and_release_stops_rise() {
        let level = test_level();
        let mut state = GameState::new(&level);
        let mut input = idle();
        input.players[0].ability = true;

        for _ in 0..5 {
            tick(&mut state, &level, &input);
        }
        let risen_to = state.players[0].pos.y;
        assert_eq!(state.players[0].vel.y, level.physics.float_rise);
        assert!(risen_to < 418.0);

        // Release: the rise is cancelled, not continued
        tick(&mut state, &level, &idle());
        assert!(state.players[0].pos.y >= risen_to);
    }

    #[test]
    fn test_fire_float_clamps_at_ceiling() {
        let level = test_level();
        let mut state = GameState::new(&level);
        let mut input = idle();
        input.players[0].ability = true;
        for _ in 0..300 {
            tick(&mut state, &level, &input);
        }
        assert_eq!(state.players[0].pos.y, 0.0);
    }

    #[test]
    fn test_right_boundary_clamp_persists() {
        let level = test_level();
        let mut state = GameState::new(&level);
        state.players[0].pos.x = level.world.x - level.player_size.x;
        let mut input = idle();
        input.players[0].right = true;
        for _ in 0..50 {
            tick(&mut state, &level, &input);
            assert_eq!(state.players[0].pos.x, level.world.x - level.player_size.x);
        }
    }

    #[test]
    fn test_water_shrink_and_restore_recomputes_ground() {
        let level = test_level();
        let mut state = GameState::new(&level);
        let mut input = idle();
        input.players[1].ability = true;

        // Shrunk: half-height box settles with its feet back on the floor
        for _ in 0..40 {
            tick(&mut state, &level, &input);
        }
        assert!(state.players[1].shrunk);
        assert_eq!(state.players[1].hitbox_height(), 15.0);
        assert_eq!(state.players[1].pos.y, 448.0 - 15.0);

        // Released: full height again, clamped on top of the floor, no clipping
        for _ in 0..5 {
            tick(&mut state, &level, &idle());
        }
        assert!(!state.players[1].shrunk);
        assert_eq!(state.players[1].pos.y, 418.0);
        assert!(state.players[1].grounded);
    }

    #[test]
    fn test_same_element_hazard_is_harmless_until_transmuted() {
        let level = test_level();
        let mut state = GameState::new(&level);

        // Fire player standing in the lava pool: fine
        state.players[0].pos = Vec2::new(310.0, 418.0);
        let events = tick(&mut state, &level, &idle());
        assert!(events.is_empty());
        assert_eq!(state.players[0].pos.x, 310.0);

        // Flip the same player to water; the next resolver pass kills it
        state.players[0].element = Element::Water;
        let events = tick(&mut state, &level, &idle());
        assert!(events.contains(&GameEvent::Died { player: 0 }));
        assert_eq!(state.players[0].pos, Vec2::new(50.0, 418.0));
        assert_eq!(state.players[0].vel, Vec2::ZERO);
        assert!(state.players[0].grounded);
        // Death does not undo the element
        assert_eq!(state.players[0].element, Element::Water);
        // And the other player was never touched
        assert_eq!(state.players[1].pos, Vec2::new(100.0, 418.0));
    }

    #[test]
    fn test_transmute_flips_exactly_once_while_lingering() {
        let level = test_level();
        let mut state = GameState::new(&level);
        state.players[0].pos = Vec2::new(410.0, 418.0);

        let mut flips = 0;
        for _ in 0..30 {
            let events = tick(&mut state, &level, &idle());
            flips += events
                .iter()
                .filter(|e| matches!(e, GameEvent::Transmuted { player: 0, .. }))
                .count();
        }
        assert_eq!(flips, 1);
        assert_eq!(state.players[0].element, Element::Water);

        // Leave and re-enter: exactly one more flip
        state.players[0].pos = Vec2::new(50.0, 418.0);
        tick(&mut state, &level, &idle());
        assert!(!state.players[0].in_transmute);
        state.players[0].pos = Vec2::new(410.0, 418.0);
        let events = tick(&mut state, &level, &idle());
        assert!(events.contains(&GameEvent::Transmuted {
            player: 0,
            now: Element::Fire
        }));
    }

    #[test]
    fn test_gated_wall_blocks_fire_but_passes_shrunk_water() {
        let level = test_level();
        let mut state = GameState::new(&level);

        // Fire player walking right into the gated wall is held at its left edge
        state.players[0].pos = Vec2::new(470.0, 418.0);
        let mut input = idle();
        input.players[0].right = true;
        for _ in 0..20 {
            tick(&mut state, &level, &input);
        }
        assert_eq!(state.players[0].pos.x, 480.0);

        // Shrunk water player slips under along the floor
        state.players[1].pos = Vec2::new(470.0, 433.0);
        let mut input = idle();
        input.players[1].right = true;
        input.players[1].ability = true;
        for _ in 0..40 {
            tick(&mut state, &level, &input);
        }
        assert!(state.players[1].pos.x > 532.0);

        // Without the ability the water player is blocked like anyone else
        state.players[1].pos = Vec2::new(470.0, 418.0);
        state.players[1].shrunk = false;
        let mut input = idle();
        input.players[1].right = true;
        for _ in 0..20 {
            tick(&mut state, &level, &input);
        }
        assert_eq!(state.players[1].pos.x, 480.0);
    }

    #[test]
    fn test_win_debounce_full_hold() {
        let level = test_level();
        let mut state = GameState::new(&level);
        both_at_doors(&mut state);

        // Arming tick
        let events = tick(&mut state, &level, &idle());
        assert!(events.contains(&GameEvent::DoorEntered { player: 0 }));
        assert!(events.contains(&GameEvent::DoorEntered { player: 1 }));
        assert_eq!(
            state.phase,
            GamePhase::WinPending {
                ticks_left: level.win_delay_ticks
            }
        );

        // The countdown runs for win_delay_ticks further ticks, then fires once
        let mut wins = 0;
        for i in 1..=level.win_delay_ticks {
            let events = tick(&mut state, &level, &idle());
            wins += events.iter().filter(|e| **e == GameEvent::Won).count();
            if i < level.win_delay_ticks {
                assert_eq!(
                    state.phase,
                    GamePhase::WinPending {
                        ticks_left: level.win_delay_ticks - i
                    }
                );
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(state.phase, GamePhase::Won);

        // Terminal: further ticks change nothing and repeat nothing
        let ticks_before = state.time_ticks;
        let events = tick(&mut state, &level, &idle());
        assert!(events.is_empty());
        assert_eq!(state.time_ticks, ticks_before);
    }

    #[test]
    fn test_win_debounce_cancelled_by_leaving() {
        let level = test_level();
        let mut state = GameState::new(&level);
        both_at_doors(&mut state);

        for _ in 0..30 {
            tick(&mut state, &level, &idle());
        }
        assert!(matches!(state.phase, GamePhase::WinPending { .. }));

        // Player 1 steps away: countdown cancelled, no win ever fires
        state.players[1].pos = Vec2::new(600.0, 418.0);
        let events = tick(&mut state, &level, &idle());
        assert!(!events.contains(&GameEvent::Won));
        assert_eq!(state.phase, GamePhase::Playing);

        // Coming back re-arms from the full duration
        state.players[1].pos = Vec2::new(756.0, 418.0);
        tick(&mut state, &level, &idle());
        assert_eq!(
            state.phase,
            GamePhase::WinPending {
                ticks_left: level.win_delay_ticks
            }
        );
    }

    #[test]
    fn test_same_door_for_both_players_does_not_arm() {
        let level = test_level();
        let mut state = GameState::new(&level);
        // Both players fire would be needed to share the fire door under the
        // same-element rule; transmute player 1 to fire and stack them there.
        state.players[1].element = Element::Fire;
        state.players[0].pos = Vec2::new(702.0, 418.0);
        state.players[1].pos = Vec2::new(710.0, 418.0);
        tick(&mut state, &level, &idle());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_death_breaks_door_contact_same_frame() {
        // A water pool floods the fire door: the fire player standing there
        // dies, respawns, and can never hold the win condition.
        let json = TEST_LEVEL.replace(
            r#"{"kind": "hazard", "element": "fire", "x": 300.0, "y": 416.0, "w": 64.0, "h": 32.0}"#,
            r#"{"kind": "hazard", "element": "water", "x": 700.0, "y": 416.0, "w": 32.0, "h": 32.0}"#,
        );
        let level = LevelData::from_json(&json).unwrap();
        let mut state = GameState::new(&level);
        both_at_doors(&mut state);

        let events = tick(&mut state, &level, &idle());
        assert!(events.contains(&GameEvent::Died { player: 0 }));
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.players[0].at_door);
    }

    #[test]
    fn test_gems_gate_the_win_condition() {
        let json = TEST_LEVEL.replace(
            r#""zones": ["#,
            r#""gems": [{"element": "fire", "x": 200.0, "y": 420.0}],
               "zones": ["#,
        );
        let level = LevelData::from_json(&json).unwrap();
        let mut state = GameState::new(&level);
        both_at_doors(&mut state);

        // Uncollected gem: standing at the doors arms nothing
        tick(&mut state, &level, &idle());
        assert_eq!(state.phase, GamePhase::Playing);

        // Only the matching element collects
        state.players[1].pos = Vec2::new(200.0, 418.0);
        let events = tick(&mut state, &level, &idle());
        assert!(!events.iter().any(|e| matches!(e, GameEvent::GemCollected { .. })));

        state.players[0].pos = Vec2::new(200.0, 418.0);
        let events = tick(&mut state, &level, &idle());
        assert!(events.contains(&GameEvent::GemCollected { player: 0, gem: 0 }));

        // With the gem in hand the doors arm normally
        both_at_doors(&mut state);
        tick(&mut state, &level, &idle());
        assert!(matches!(state.phase, GamePhase::WinPending { .. }));
    }

    #[test]
    fn test_opposite_door_rule() {
        let json = TEST_LEVEL.replace(
            r#""win_delay_ticks": 60,"#,
            r#""win_delay_ticks": 60, "door_rule": "opposite","#,
        );
        let level = LevelData::from_json(&json).unwrap();
        let mut state = GameState::new(&level);

        // Under the opposite rule the fire player takes the water door
        state.players[0].pos = Vec2::new(756.0, 418.0);
        state.players[1].pos = Vec2::new(706.0, 418.0);
        tick(&mut state, &level, &idle());
        assert!(matches!(state.phase, GamePhase::WinPending { .. }));

        // The straight pairing no longer counts
        state.reset();
        both_at_doors(&mut state);
        tick(&mut state, &level, &idle());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_external_reset_restores_start_configuration() {
        let level = test_level();
        let mut state = GameState::new(&level);
        both_at_doors(&mut state);
        state.players[0].element = Element::Water;
        for _ in 0..=level.win_delay_ticks {
            tick(&mut state, &level, &idle());
        }

        state.reset();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.players[0].pos, Vec2::new(50.0, 418.0));
        assert_eq!(state.players[0].element, Element::Fire);
        assert_eq!(state.players[1].element, Element::Water);
    }

    fn input_from_bits(bits: u8) -> PlayerInput {
        PlayerInput {
            left: bits & 1 != 0,
            right: bits & 2 != 0,
            jump: bits & 4 != 0,
            ability: bits & 8 != 0,
        }
    }

    proptest! {
        /// No input sequence can push a player out of the world, measured
        /// against the current hitbox.
        #[test]
        fn prop_players_stay_in_bounds(frames in proptest::collection::vec((0u8..16, 0u8..16), 0..300)) {
            let level = test_level();
            let mut state = GameState::new(&level);
            for (a, b) in frames {
                let input = FrameInput {
                    players: [input_from_bits(a), input_from_bits(b)],
                };
                tick(&mut state, &level, &input);
                for player in &state.players {
                    prop_assert!(player.pos.x >= 0.0);
                    prop_assert!(player.pos.x <= level.world.x - player.size.x);
                    prop_assert!(player.pos.y >= 0.0);
                    prop_assert!(player.pos.y <= level.world.y - player.hitbox_height());
                }
            }
        }
    }
}
