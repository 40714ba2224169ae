//! Action Resolver
//!
//! Turns a frame's action tokens into combatant mutations (facing, movement,
//! level changes, dashes, shots and charges) and runs the per-frame combatant
//! update that follows input resolution: level reversion, held movement and
//! charge auto-release.

use crate::core::grid::GridVec;
use crate::core::time::Timestamp;
use crate::game::config::{
    MovementMode, CHARGE_MAX_MS, CHARGE_RELEASE_WINDOW_MS, DASH_DISTANCE,
    HELD_MOVE_WINDOW_MS, TRAIL_TTL_MS,
};
use crate::game::events::GameEvent;
use crate::game::input::{ActionToken, FrameInput};
use crate::game::state::{
    ChargeState, CombatantId, DashTrail, HeldMove, MatchState, Projectile, ShotSize, Stance,
};

// =============================================================================
// INPUT RESOLUTION
// =============================================================================

/// Resolve every combatant's tokens for this frame, P1 first.
///
/// Tokens for dead combatants are dropped.
pub fn resolve_inputs(state: &mut MatchState, input: &FrameInput, now: Timestamp) {
    for id in CombatantId::ALL {
        if !state.combatant(id).alive {
            continue;
        }
        let mut aim = Aim::default();
        for &token in input.tokens(id) {
            apply_token(state, id, token, &mut aim, now);
        }
    }
}

/// Per-frame aim accumulator. Facing is the combination of the last
/// horizontal and last vertical token seen this frame.
#[derive(Clone, Copy, Debug, Default)]
struct Aim {
    x: Option<i32>,
    y: Option<i32>,
}

impl Aim {
    fn push(&mut self, dir: GridVec) -> GridVec {
        if dir.x != 0 {
            self.x = Some(dir.x);
        }
        if dir.y != 0 {
            self.y = Some(dir.y);
        }
        GridVec::new(self.x.unwrap_or(0), self.y.unwrap_or(0))
    }
}

fn apply_token(state: &mut MatchState, id: CombatantId, token: ActionToken, aim: &mut Aim, now: Timestamp) {
    if let Some(dir) = token.direction() {
        let facing = aim.push(dir);
        apply_direction(state, id, dir, facing, now);
        return;
    }

    let rules = state.config.rules;
    match token {
        ActionToken::Jump => {
            state.combatant_mut(id).stance = Stance::Jumping {
                until: rules.jump_hold.map(|hold| now.after(hold)),
            };
        }
        ActionToken::Crouch => {
            if rules.has_crouch {
                state.combatant_mut(id).stance = Stance::Crouching {
                    until: rules.crouch_hold.map(|hold| now.after(hold)),
                };
            }
        }
        ActionToken::Stand => {
            state.combatant_mut(id).stance = Stance::Standing;
        }
        ActionToken::Dash => {
            if let Some(event) = dash(state, id, now) {
                state.push_event(event);
            }
        }
        ActionToken::Shoot => {
            if rules.has_charged_shots {
                press_charge(state, id, now);
            } else {
                fire(state, id, now);
            }
        }
        ActionToken::Up | ActionToken::Down | ActionToken::Left | ActionToken::Right => {}
    }
}

fn apply_direction(state: &mut MatchState, id: CombatantId, dir: GridVec, facing: GridVec, now: Timestamp) {
    let bounds = state.bounds;
    let movement = state.config.rules.movement;

    let c = state.combatant_mut(id);
    c.facing = facing;

    // Charging pins the combatant in place; aim still follows input.
    if c.is_charging() {
        return;
    }

    match movement {
        MovementMode::Step => c.position = bounds.clamp(c.position + dir),
        MovementMode::Held => {
            c.held_move = Some(HeldMove {
                direction: facing,
                until: now.after(HELD_MOVE_WINDOW_MS),
            });
        }
    }
}

// =============================================================================
// DASH
// =============================================================================

/// Dash along facing. Returns the dash event, or `None` while on cooldown.
///
/// The dash is atomic: passed cells are never collision-tested.
pub fn dash(state: &mut MatchState, id: CombatantId, now: Timestamp) -> Option<GameEvent> {
    let bounds = state.bounds;
    let leaves_trail = state.config.rules.has_dash_trail;

    let c = state.combatant_mut(id);
    if !c.can_dash(now) {
        return None;
    }
    c.last_dash_at = now;

    let dir = if c.facing.is_zero() { id.outward() } else { c.facing };
    let from = c.position;

    // Walk cell by cell so the trail stops where the wall stops us.
    let mut passed = Vec::with_capacity(DASH_DISTANCE as usize);
    let mut cell = from;
    for _ in 0..DASH_DISTANCE {
        let next = bounds.clamp(cell + dir);
        if next == cell {
            break;
        }
        passed.push(cell);
        cell = next;
    }
    c.position = cell;

    if leaves_trail {
        let glyph = trail_glyph(dir);
        let expires_at = now.after(TRAIL_TTL_MS);
        state.trails.extend(passed.into_iter().map(|position| DashTrail {
            position,
            glyph,
            expires_at,
        }));
    }

    Some(GameEvent::dashed(state.frame, now, id, from, cell))
}

/// Trail glyph for a dash direction (screen y grows downward).
pub fn trail_glyph(dir: GridVec) -> char {
    match (dir.x.signum(), dir.y.signum()) {
        (_, 0) => '-',
        (0, _) => '|',
        (1, -1) | (-1, 1) => '/',
        _ => '\\',
    }
}

// =============================================================================
// SHOOTING
// =============================================================================

/// Fire an uncharged shot if the shot cooldown allows it.
pub fn fire(state: &mut MatchState, id: CombatantId, now: Timestamp) -> bool {
    if !state.combatant(id).can_shoot(now) {
        return false;
    }
    spawn_shots(state, id, now, ShotSize::Small, false);
    true
}

/// Shoot token in the charge variant: start a charge, or refresh one.
fn press_charge(state: &mut MatchState, id: CombatantId, now: Timestamp) {
    let frame = state.frame;
    let c = state.combatant_mut(id);

    if let Some(charge) = c.charge.as_mut() {
        charge.last_input_at = now;
        return;
    }
    if !c.can_shoot(now) {
        return;
    }

    c.charge = Some(ChargeState {
        started_at: now,
        last_input_at: now,
    });
    c.held_move = None;
    state.push_event(GameEvent::charge_started(frame, now, id));
}

/// Release a charge and fire at the size its hold time earned.
pub fn release_charge(state: &mut MatchState, id: CombatantId, now: Timestamp) {
    let Some(charge) = state.combatant_mut(id).charge.take() else {
        return;
    };

    let held = charge.held_for(now);
    let size = ShotSize::from_charge(held);
    state.push_event(GameEvent::charge_released(state.frame, now, id, held, size));
    spawn_shots(state, id, now, size, true);
}

/// Shotgun side directions for an aim: the two rotated variants, each
/// reduced to unit components. A degenerate result aims right.
pub fn spread_directions(aim: GridVec) -> [GridVec; 2] {
    let (fx, fy) = (aim.x, aim.y);
    [
        GridVec::new(fx + fy, fy + fx),
        GridVec::new(fx - fy, fy - fx),
    ]
    .map(|d| {
        let d = d.signum();
        if d.is_zero() { GridVec::RIGHT } else { d }
    })
}

/// Spawn the projectiles for one shot and start the shot cooldown.
///
/// With `offset_sides`, shotgun side shots start one cell to either side of
/// the shooter instead of on its own cell; an offset cell outside the arena
/// drops that side shot.
fn spawn_shots(state: &mut MatchState, id: CombatantId, now: Timestamp, size: ShotSize, offset_sides: bool) {
    let bounds = state.bounds;
    let c = state.combatant_mut(id);
    c.last_shot_at = now;

    let aim = if c.facing.is_zero() { GridVec::RIGHT } else { c.facing };
    let origin = c.position;
    let level = c.level();
    let shotgun = c.has_shotgun(now);

    let mut shots = vec![(origin, aim)];
    if shotgun {
        let side = aim.perpendicular();
        for dir in spread_directions(aim) {
            if !offset_sides {
                shots.push((origin, dir));
                continue;
            }
            let offset = if (dir - aim).dot(side) >= 0 { side } else { -side };
            let cell = origin + offset;
            if bounds.contains(cell) {
                shots.push((cell, dir));
            }
        }
    }

    let count = shots.len() as u8;
    state.projectiles.extend(shots.into_iter().map(|(position, velocity)| Projectile {
        position,
        velocity,
        level,
        owner: id,
        size,
    }));

    #[cfg(feature = "debug-tracing")]
    tracing::trace!(combatant = %id, count, ?size, "shot fired");

    state.push_event(GameEvent::shot_fired(state.frame, now, id, count, size));
}

// =============================================================================
// PER-FRAME UPDATE
// =============================================================================

/// Time-driven combatant updates, run after input resolution each frame.
pub fn update_combatants(state: &mut MatchState, now: Timestamp) {
    let bounds = state.bounds;

    for id in CombatantId::ALL {
        let c = state.combatant_mut(id);
        if !c.alive {
            continue;
        }

        if c.stance.reverts_at().is_some_and(|until| now.has_reached(until)) {
            c.stance = Stance::Standing;
        }

        if let Some(held) = c.held_move {
            if now < held.until {
                if !c.is_charging() {
                    c.position = bounds.clamp(c.position + held.direction);
                }
            } else {
                c.held_move = None;
            }
        }

        let release = c.charge.is_some_and(|charge| {
            now.since(charge.last_input_at) > CHARGE_RELEASE_WINDOW_MS
                || charge.held_for(now) >= CHARGE_MAX_MS
        });
        if release {
            release_charge(state, id, now);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::{
        GameConfig, RuleSet, DASH_BOOST_COOLDOWN_MS, JUMP_WINDOW_MS, SHOT_COOLDOWN_MS,
    };
    use crate::game::events::GameEventData;
    use crate::game::state::Level;

    fn t(ms: i64) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    fn classic() -> MatchState {
        MatchState::new(GameConfig::default(), Timestamp::ZERO)
    }

    fn arcade() -> MatchState {
        let config = GameConfig {
            rules: RuleSet::arcade(),
            ..GameConfig::default()
        };
        MatchState::new(config, Timestamp::ZERO)
    }

    fn press(state: &mut MatchState, id: CombatantId, tokens: &[ActionToken], now: Timestamp) {
        let mut frame = FrameInput::new();
        for &token in tokens {
            frame.push(id, token);
        }
        resolve_inputs(state, &frame, now);
    }

    #[test]
    fn test_step_movement_and_facing() {
        let mut state = classic();
        let start = state.combatant(CombatantId::One).position;

        press(&mut state, CombatantId::One, &[ActionToken::Up, ActionToken::Up], t(0));
        let p1 = state.combatant(CombatantId::One);
        assert_eq!(p1.position, start + GridVec::new(0, -2));
        assert_eq!(p1.facing, GridVec::UP);

        // Next frame starts a fresh aim
        press(&mut state, CombatantId::One, &[ActionToken::Left], t(50));
        assert_eq!(state.combatant(CombatantId::One).facing, GridVec::LEFT);
    }

    #[test]
    fn test_diagonal_aim_within_frame() {
        let mut state = classic();
        press(&mut state, CombatantId::Two, &[ActionToken::Right, ActionToken::Down], t(0));
        assert_eq!(state.combatant(CombatantId::Two).facing, GridVec::new(1, 1));

        // Last horizontal wins
        press(&mut state, CombatantId::Two, &[ActionToken::Right, ActionToken::Left], t(50));
        assert_eq!(state.combatant(CombatantId::Two).facing, GridVec::LEFT);
    }

    #[test]
    fn test_facing_kept_when_blocked_by_wall() {
        let mut state = classic();
        state.combatant_mut(CombatantId::One).position = GridVec::new(0, 5);

        press(&mut state, CombatantId::One, &[ActionToken::Left], t(0));
        let p1 = state.combatant(CombatantId::One);
        assert_eq!(p1.position, GridVec::new(0, 5));
        assert_eq!(p1.facing, GridVec::LEFT);
    }

    #[test]
    fn test_dead_combatant_ignores_input() {
        let mut state = classic();
        state.combatant_mut(CombatantId::Two).alive = false;
        let before = state.combatant(CombatantId::Two).clone();

        press(&mut state, CombatantId::Two, &[ActionToken::Up, ActionToken::Shoot], t(0));
        assert_eq!(state.combatant(CombatantId::Two), &before);
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_sticky_levels_in_classic() {
        let mut state = classic();
        press(&mut state, CombatantId::One, &[ActionToken::Jump], t(0));
        update_combatants(&mut state, t(60_000));
        assert_eq!(state.combatant(CombatantId::One).level(), Level::Jump);

        press(&mut state, CombatantId::One, &[ActionToken::Crouch], t(60_050));
        assert_eq!(state.combatant(CombatantId::One).level(), Level::Crouch);

        press(&mut state, CombatantId::One, &[ActionToken::Stand], t(60_100));
        assert_eq!(state.combatant(CombatantId::One).level(), Level::Normal);
    }

    #[test]
    fn test_timed_jump_reverts() {
        let mut state = arcade();
        press(&mut state, CombatantId::One, &[ActionToken::Jump], t(1_000));

        update_combatants(&mut state, t(1_000 + JUMP_WINDOW_MS - 1));
        assert_eq!(state.combatant(CombatantId::One).level(), Level::Jump);

        update_combatants(&mut state, t(1_000 + JUMP_WINDOW_MS));
        assert_eq!(state.combatant(CombatantId::One).level(), Level::Normal);
    }

    #[test]
    fn test_crouch_ignored_without_crouch_level() {
        let mut rules = RuleSet::classic();
        rules.has_crouch = false;
        let config = GameConfig { rules, ..GameConfig::default() };
        let mut state = MatchState::new(config, Timestamp::ZERO);

        press(&mut state, CombatantId::One, &[ActionToken::Crouch], t(0));
        assert_eq!(state.combatant(CombatantId::One).level(), Level::Normal);
    }

    #[test]
    fn test_dash_moves_and_gates_on_cooldown() {
        let mut state = classic();
        let start = state.combatant(CombatantId::One).position;

        let event = dash(&mut state, CombatantId::One, t(0)).unwrap();
        let p1 = state.combatant(CombatantId::One);
        assert_eq!(p1.position, start + GridVec::new(DASH_DISTANCE, 0));
        assert_eq!(p1.last_dash_at, t(0));
        assert!(matches!(event.data, GameEventData::Dashed { from, .. } if from == start));

        assert!(dash(&mut state, CombatantId::One, t(1_000)).is_none());
        assert_eq!(state.combatant(CombatantId::One).position, start + GridVec::new(DASH_DISTANCE, 0));
    }

    #[test]
    fn test_dash_clamped_at_wall() {
        let mut state = classic();
        state.combatant_mut(CombatantId::Two).position = GridVec::new(2, 1);
        state.combatant_mut(CombatantId::Two).facing = GridVec::new(-1, -1);

        dash(&mut state, CombatantId::Two, t(0)).unwrap();
        assert_eq!(state.combatant(CombatantId::Two).position, GridVec::new(0, 0));
    }

    #[test]
    fn test_dash_zero_facing_falls_back_outward() {
        let mut state = classic();
        let start = state.combatant(CombatantId::Two).position;
        state.combatant_mut(CombatantId::Two).facing = GridVec::ZERO;

        dash(&mut state, CombatantId::Two, t(0)).unwrap();
        assert_eq!(state.combatant(CombatantId::Two).position, start + GridVec::new(-DASH_DISTANCE, 0));
    }

    #[test]
    fn test_dash_boost_shortens_cooldown() {
        let mut state = classic();
        state.combatant_mut(CombatantId::One).dash_boost_until = t(10_000);

        assert!(dash(&mut state, CombatantId::One, t(0)).is_some());
        assert!(dash(&mut state, CombatantId::One, t(DASH_BOOST_COOLDOWN_MS - 1)).is_none());
        assert!(dash(&mut state, CombatantId::One, t(DASH_BOOST_COOLDOWN_MS)).is_some());
    }

    #[test]
    fn test_dash_trail_excludes_destination() {
        let mut state = arcade();
        state.combatant_mut(CombatantId::One).position = GridVec::new(10, 5);
        state.combatant_mut(CombatantId::One).facing = GridVec::RIGHT;

        dash(&mut state, CombatantId::One, t(0)).unwrap();
        let cells: Vec<GridVec> = state.trails.iter().map(|tr| tr.position).collect();
        assert_eq!(
            cells,
            vec![GridVec::new(10, 5), GridVec::new(11, 5), GridVec::new(12, 5), GridVec::new(13, 5)]
        );
        assert!(state.trails.iter().all(|tr| tr.glyph == '-' && tr.expires_at == t(TRAIL_TTL_MS)));
        assert_eq!(state.combatant(CombatantId::One).position, GridVec::new(14, 5));
    }

    #[test]
    fn test_dash_trail_stops_at_wall() {
        let mut state = arcade();
        state.combatant_mut(CombatantId::One).position = GridVec::new(1, 5);
        state.combatant_mut(CombatantId::One).facing = GridVec::LEFT;

        dash(&mut state, CombatantId::One, t(0)).unwrap();
        assert_eq!(state.trails.len(), 1);
        assert_eq!(state.trails[0].position, GridVec::new(1, 5));
    }

    #[test]
    fn test_no_trail_in_classic() {
        let mut state = classic();
        dash(&mut state, CombatantId::One, t(0)).unwrap();
        assert!(state.trails.is_empty());
    }

    #[test]
    fn test_trail_glyphs() {
        assert_eq!(trail_glyph(GridVec::LEFT), '-');
        assert_eq!(trail_glyph(GridVec::DOWN), '|');
        assert_eq!(trail_glyph(GridVec::new(1, -1)), '/');
        assert_eq!(trail_glyph(GridVec::new(1, 1)), '\\');
    }

    #[test]
    fn test_simple_shot_and_cooldown() {
        let mut state = classic();
        assert!(fire(&mut state, CombatantId::One, t(0)));
        assert_eq!(state.projectiles.len(), 1);

        let shot = state.projectiles[0];
        assert_eq!(shot.velocity, GridVec::RIGHT);
        assert_eq!(shot.level, Level::Normal);
        assert_eq!(shot.owner, CombatantId::One);
        assert_eq!(shot.size, ShotSize::Small);

        assert!(!fire(&mut state, CombatantId::One, t(SHOT_COOLDOWN_MS - 1)));
        assert!(fire(&mut state, CombatantId::One, t(SHOT_COOLDOWN_MS)));
        assert_eq!(state.projectiles.len(), 2);
    }

    #[test]
    fn test_shot_takes_shooter_level() {
        let mut state = classic();
        press(&mut state, CombatantId::Two, &[ActionToken::Crouch, ActionToken::Shoot], t(0));
        assert_eq!(state.projectiles[0].level, Level::Crouch);
        assert_eq!(state.projectiles[0].velocity, GridVec::LEFT);
    }

    #[test]
    fn test_zero_facing_shoots_right() {
        let mut state = classic();
        state.combatant_mut(CombatantId::Two).facing = GridVec::ZERO;
        fire(&mut state, CombatantId::Two, t(0));
        assert_eq!(state.projectiles[0].velocity, GridVec::RIGHT);
    }

    #[test]
    fn test_spread_directions() {
        assert_eq!(spread_directions(GridVec::RIGHT), [GridVec::new(1, 1), GridVec::new(1, -1)]);
        assert_eq!(spread_directions(GridVec::UP), [GridVec::new(-1, -1), GridVec::new(1, -1)]);
        // Diagonal aim degenerates one side to the default direction
        assert_eq!(spread_directions(GridVec::new(1, 1)), [GridVec::new(1, 1), GridVec::RIGHT]);
    }

    #[test]
    fn test_shotgun_fires_three_from_own_cell() {
        let mut state = classic();
        state.combatant_mut(CombatantId::One).shotgun_until = t(10_000);
        let origin = state.combatant(CombatantId::One).position;

        fire(&mut state, CombatantId::One, t(0));
        assert_eq!(state.projectiles.len(), 3);
        assert!(state.projectiles.iter().all(|p| p.position == origin));
        assert!(state.projectiles.iter().all(|p| !p.velocity.is_zero()));
    }

    #[test]
    fn test_charge_starts_refreshes_and_releases() {
        let mut state = arcade();
        press(&mut state, CombatantId::One, &[ActionToken::Shoot], t(0));
        assert!(state.combatant(CombatantId::One).is_charging());
        assert!(state.projectiles.is_empty());

        // Keep refreshing past the tier-2 threshold
        for ms in (50..=400).step_by(50) {
            press(&mut state, CombatantId::One, &[ActionToken::Shoot], t(ms));
            update_combatants(&mut state, t(ms));
        }
        assert!(state.combatant(CombatantId::One).is_charging());

        // Key released: no shoot token for longer than the release window
        update_combatants(&mut state, t(400 + CHARGE_RELEASE_WINDOW_MS + 1));
        assert!(!state.combatant(CombatantId::One).is_charging());
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].size, ShotSize::Medium);
    }

    #[test]
    fn test_charge_auto_releases_at_cap() {
        let mut state = arcade();
        press(&mut state, CombatantId::One, &[ActionToken::Shoot], t(0));

        let mut ms = 0;
        while state.combatant(CombatantId::One).is_charging() {
            ms += 50;
            press(&mut state, CombatantId::One, &[ActionToken::Shoot], t(ms));
            update_combatants(&mut state, t(ms));
        }
        assert_eq!(ms, CHARGE_MAX_MS);
        assert_eq!(state.projectiles[0].size, ShotSize::Large);
    }

    #[test]
    fn test_charge_suppresses_movement() {
        let mut state = arcade();
        let start = state.combatant(CombatantId::One).position;

        press(&mut state, CombatantId::One, &[ActionToken::Shoot, ActionToken::Up], t(0));
        update_combatants(&mut state, t(0));

        let p1 = state.combatant(CombatantId::One);
        assert_eq!(p1.position, start);
        assert_eq!(p1.facing, GridVec::UP);
        assert!(p1.held_move.is_none());
    }

    #[test]
    fn test_held_movement_expires() {
        let mut state = arcade();
        let start = state.combatant(CombatantId::One).position;

        press(&mut state, CombatantId::One, &[ActionToken::Down], t(0));
        update_combatants(&mut state, t(0));
        update_combatants(&mut state, t(50));
        update_combatants(&mut state, t(100));
        update_combatants(&mut state, t(HELD_MOVE_WINDOW_MS));

        let p1 = state.combatant(CombatantId::One);
        assert_eq!(p1.position, start + GridVec::new(0, 3));
        assert!(p1.held_move.is_none());
    }

    #[test]
    fn test_charged_shotgun_offsets_side_shots() {
        let mut state = arcade();
        state.combatant_mut(CombatantId::One).position = GridVec::new(10, 5);
        state.combatant_mut(CombatantId::One).shotgun_until = t(10_000);

        press(&mut state, CombatantId::One, &[ActionToken::Shoot], t(0));
        release_charge(&mut state, CombatantId::One, t(100));

        let mut cells: Vec<GridVec> = state.projectiles.iter().map(|p| p.position).collect();
        cells.sort_by_key(|c| c.y);
        assert_eq!(cells, vec![GridVec::new(10, 4), GridVec::new(10, 5), GridVec::new(10, 6)]);

        let lower = state.projectiles.iter().find(|p| p.position.y == 6).unwrap();
        assert_eq!(lower.velocity, GridVec::new(1, 1));
    }

    #[test]
    fn test_charged_shotgun_drops_offscreen_side() {
        let mut state = arcade();
        state.combatant_mut(CombatantId::One).position = GridVec::new(10, 0);
        state.combatant_mut(CombatantId::One).shotgun_until = t(10_000);

        press(&mut state, CombatantId::One, &[ActionToken::Shoot], t(0));
        release_charge(&mut state, CombatantId::One, t(100));
        assert_eq!(state.projectiles.len(), 2);
        assert!(state.projectiles.iter().all(|p| state.bounds.contains(p.position)));
    }

    #[test]
    fn test_charge_needs_shot_cooldown() {
        let mut state = arcade();
        state.combatant_mut(CombatantId::One).last_shot_at = t(0);

        press(&mut state, CombatantId::One, &[ActionToken::Shoot], t(100));
        assert!(!state.combatant(CombatantId::One).is_charging());
    }
}
