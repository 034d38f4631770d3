//! Fixed timestep simulation tick, the per-frame director
//!
//! One call advances the whole session: difficulty scaling, the player,
//! then the branch matching the player's realm (surface enemies or
//! under-realm echoes plus projectiles and their collisions), and finally
//! the pending-echo drain that bridges the two realms. Order matters and
//! is fixed here; entity methods never reach across subsystems.

use glam::Vec2;
use rand::Rng;

use crate::consts::{DIVIDE_Y, SCREEN_WIDTH};

use super::collision::{bodies_overlap, hitbox_overlaps};
use super::player::Realm;
use super::state::{
    Echo, EchoOrigin, EscapePortal, GameEvent, GamePhase, GameState, PendingEcho,
};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Swim up; only meaningful in the under-realm
    pub move_up: bool,
    /// Swim down; only meaningful in the under-realm
    pub move_down: bool,
    /// Jump off the divide (down-jump off its underside while Soul)
    pub jump: bool,
    /// Fire trigger (held)
    pub fire: bool,
    /// World-space aim point for firing
    pub aim: Option<Vec2>,
    pub melee: bool,
    pub dash: bool,
    /// Debug: self-inflict full damage to exercise the Shatter path
    pub hurt_self: bool,
    /// Autoplayer mode - synthesizes the other fields
    pub demo: bool,
}

/// Advance the session by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase == GamePhase::GameOver {
        return;
    }

    state.events.clear();
    state.time_ticks += 1;

    let mut input = input.clone();
    if input.demo {
        synthesize_demo_input(state, &mut input);
    }
    let input = &input;

    if input.hurt_self {
        let amount = state.tuning.player.max_health;
        state.player.take_damage(amount, &state.tuning);
        let pos = state.player.body.pos;
        state.events.push(GameEvent::PlayerHurt {
            pos,
            damage: amount,
        });
    }

    advance_difficulty(state, dt);

    // Health-gated bullet time slows gameplay on the surface; camera and
    // other presentation layers keep consuming real dt on their side.
    let bullet_time = state.player.realm == Realm::Alive
        && state.player.health < state.tuning.bullet_time.health_threshold;
    let time_scale = if bullet_time {
        state.tuning.bullet_time.time_scale
    } else {
        1.0
    };
    let dt_scaled = dt * time_scale;
    let timer_dt = if state.tuning.bullet_time.scales_timers {
        dt_scaled
    } else {
        dt
    };

    // Player first: cooldowns, input, combat triggers, physics.
    state.player.tick_cooldowns(timer_dt);
    state.player.apply_move_input(input, &state.tuning);
    if input.dash {
        state.player.try_dash(&state.tuning);
    }
    if input.fire {
        if let Some(target) = input.aim {
            fire_projectile(state, target);
        }
    }
    state
        .player
        .integrate(input.jump, &state.portals, dt_scaled, &state.tuning);

    match state.player.realm {
        Realm::Alive => advance_surface(state, input, dt_scaled, timer_dt),
        Realm::Soul => advance_under_realm(state, input, dt, timer_dt),
    }

    // The bridge drains in both realms, so kills made while alive surface
    // as echoes whenever the under-realm population allows.
    drain_pending_echoes(state);

    state.normalize_order();
}

fn fire_projectile(state: &mut GameState, target: Vec2) {
    if state.player.fire_cooldown.is_active() {
        return;
    }
    let id = state.next_entity_id();
    if let Some(shot) = state.player.shoot(id, target, &state.tuning) {
        state.projectiles.push(shot);
    }
}

/// Survival-time level scaling; only the living accumulate survival.
fn advance_difficulty(state: &mut GameState, dt: f32) {
    if state.player.realm != Realm::Alive {
        return;
    }
    state.time_survived += dt;
    let new_level = (state.time_survived / state.tuning.difficulty.level_seconds) as u32 + 1;
    if new_level > state.level {
        state.level = new_level;
        state.spawn_interval = state.tuning.difficulty.spawn_interval_for(new_level);
        state.player.fire_interval = state.tuning.difficulty.fire_interval_for(new_level);
        log::debug!(
            "level {}: spawn interval {:.2}s, fire interval {:.3}s",
            new_level,
            state.spawn_interval,
            state.player.fire_interval
        );
    }
}

/// Surface branch: enemies, projectiles, combat, spawning, Shatter.
fn advance_surface(state: &mut GameState, input: &TickInput, dt: f32, timer_dt: f32) {
    for enemy in &mut state.enemies {
        enemy.update(&mut state.rng, &state.tuning, dt);
    }

    // Enemies that recede far past the player were never engaged; they
    // despawn quietly, leaving no record.
    let px = state.player.body.pos.x;
    let despawn_range = state.tuning.enemy.despawn_range;
    state.enemies.retain(|enemy| {
        let dx = enemy.body.pos.x - px;
        let receding = dx * enemy.body.vel.x >= 0.0;
        dx.abs() <= despawn_range || !receding
    });

    update_projectiles(state, dt, timer_dt);

    if input.melee {
        let (center, half) = state.player.melee_hitbox(&state.tuning);
        let damage = state.tuning.player.melee_damage;
        for enemy in &mut state.enemies {
            if hitbox_overlaps(center, half, &enemy.body) {
                enemy.health -= damage;
                state.events.push(GameEvent::MeleeHit {
                    pos: enemy.body.pos,
                });
            }
        }
    }

    // Projectile ↔ enemy: one hit consumes the shot.
    let projectile_damage = state.tuning.player.projectile_damage;
    let mut spent = Vec::new();
    for (shot_idx, shot) in state.projectiles.iter().enumerate() {
        for enemy in &mut state.enemies {
            if enemy.health > 0.0 && bodies_overlap(&shot.body, &enemy.body) {
                enemy.health -= projectile_damage;
                spent.push(shot_idx);
                break;
            }
        }
    }
    for shot_idx in spent.into_iter().rev() {
        state.projectiles.remove(shot_idx);
    }

    // Enemy ↔ player: fixed contact damage, and the enemy dies doing it
    // (still leaving its record behind).
    let player_body = state.player.body;
    let contact_damage = state.tuning.enemy.contact_damage;
    for enemy in &mut state.enemies {
        if enemy.health > 0.0 && bodies_overlap(&enemy.body, &player_body) {
            enemy.health = 0.0;
            state.player.take_damage(contact_damage, &state.tuning);
            state.events.push(GameEvent::PlayerHurt {
                pos: player_body.pos,
                damage: contact_damage,
            });
        }
    }

    reap_fallen_enemies(state);

    // Spawn cadence: a fresh grunt just off-screen, walking inward.
    state.spawn_timer.tick(dt);
    if state.spawn_timer.is_ready() {
        state.spawn_timer.arm(state.spawn_interval);
        spawn_surface_enemy(state);
    }

    // Shatter: edge-triggered by the latch, not by the health value alone.
    if state.player.health <= 0.0 && !state.shattered {
        state.shattered = true;
        state.player.shatter(&state.tuning);
        open_escape_portals(state);
        let pos = state.player.body.pos;
        state.events.push(GameEvent::Shattered { pos });
        log::debug!("shattered into the under-realm at x {:.0}", pos.x);
    }
}

/// Under-realm branch: echoes, projectiles, harvest, guards, Resurrection,
/// and the soul-extinguished fail state.
fn advance_under_realm(state: &mut GameState, _input: &TickInput, dt: f32, timer_dt: f32) {
    let px = state.player.body.pos.x;
    for echo in &mut state.echoes {
        echo.update(px, &mut state.rng, &state.tuning, dt);
    }

    update_projectiles(state, dt, timer_dt);

    // Guards trickle in near the portals while the population has room.
    state.guard_timer.tick(dt);
    if state.guard_timer.is_ready() && state.echoes.len() < state.tuning.echo.guard_cap {
        state.guard_timer.arm(state.tuning.echo.guard_interval);
        if !state.portals.is_empty() {
            let portal = state.portals[state.rng.random_range(0..state.portals.len())];
            let scatter = state.tuning.echo.guard_scatter;
            let x = portal.pos.x + state.rng.random_range(-scatter..=scatter);
            let id = state.next_entity_id();
            let guard = Echo::new(
                id,
                EchoOrigin::Guard,
                Vec2::new(x, DIVIDE_Y + 60.0),
                &state.tuning,
            );
            state.echoes.push(guard);
        }
    }

    // Projectile ↔ echo: the killing shot harvests soul energy.
    let projectile_damage = state.tuning.player.projectile_damage;
    let harvest_energy = state.tuning.echo.harvest_energy;
    let mut spent = Vec::new();
    for (shot_idx, shot) in state.projectiles.iter().enumerate() {
        for echo in &mut state.echoes {
            if echo.health > 0.0 && bodies_overlap(&shot.body, &echo.body) {
                echo.health -= projectile_damage;
                spent.push(shot_idx);
                if echo.health <= 0.0 {
                    state.player.harvest(harvest_energy, &state.tuning);
                    state.events.push(GameEvent::EchoDied {
                        pos: echo.body.pos,
                        origin: echo.origin,
                        harvested: true,
                    });
                }
                break;
            }
        }
    }
    for shot_idx in spent.into_iter().rev() {
        state.projectiles.remove(shot_idx);
    }

    // Echo ↔ player: drains soul energy and spends the echo.
    let player_body = state.player.body;
    let contact_drain = state.tuning.echo.contact_drain;
    for echo in &mut state.echoes {
        if echo.health > 0.0 && bodies_overlap(&echo.body, &player_body) {
            echo.health = 0.0;
            state.player.drain_soul(contact_drain);
            state.events.push(GameEvent::SoulDrained {
                pos: player_body.pos,
                amount: contact_drain,
            });
            state.events.push(GameEvent::EchoDied {
                pos: echo.body.pos,
                origin: echo.origin,
                harvested: false,
            });
        }
    }

    // Echo deaths are terminal: no records, just removal.
    state.echoes.retain(|echo| echo.health > 0.0);

    // Resurrection: saturation or portal contact, whichever comes first.
    let soul_maxed = state.player.soul_energy >= state.tuning.player.max_soul_energy;
    if soul_maxed || state.player.escaped_through_portal {
        state.echoes.clear();
        state.portals.clear();
        state.player.resurrect(&state.tuning);
        state.shattered = false;
        let pos = state.player.body.pos;
        state.events.push(GameEvent::Resurrected { pos });
        log::debug!("resurrected at x {:.0}", pos.x);
        return;
    }

    // The designed fail state: an extinguished soul ends the session.
    if state.shattered && state.player.soul_energy <= 0.0 {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::SessionEnded);
        log::info!("soul extinguished after {} ticks", state.time_ticks);
    }
}

fn update_projectiles(state: &mut GameState, dt: f32, timer_dt: f32) {
    let cross_factor = state.tuning.player.projectile_cross_factor;
    for shot in &mut state.projectiles {
        shot.update(dt, timer_dt, cross_factor);
    }
    state.projectiles.retain(|shot| !shot.expired());
}

/// Remove dead enemies, each leaving exactly one pending record behind.
fn reap_fallen_enemies(state: &mut GameState) {
    let mut idx = 0;
    while idx < state.enemies.len() {
        if state.enemies[idx].health > 0.0 {
            idx += 1;
            continue;
        }
        let enemy = state.enemies.remove(idx);
        state.pending_echoes.push_back(PendingEcho {
            kind: enemy.kind,
            spawn: Vec2::new(enemy.body.pos.x, DIVIDE_Y + 50.0),
        });
        state.events.push(GameEvent::EnemyDied {
            pos: enemy.body.pos,
            kind: enemy.kind,
        });
    }
}

/// Spawn a grunt just outside the view, on a random side of the player,
/// walking toward where the player is.
fn spawn_surface_enemy(state: &mut GameState) {
    let lead = SCREEN_WIDTH + state.tuning.enemy.spawn_lead;
    let px = state.player.body.pos.x;
    let (x, walk_dir) = if state.rng.random_bool(0.5) {
        (px - lead, 1.0)
    } else {
        (px + lead, -1.0)
    };
    state.spawn_enemy_at(x, walk_dir);
}

/// Open the (single) escape portal batch somewhere out in the dark.
fn open_escape_portals(state: &mut GameState) {
    state.portals.clear();
    let px = state.player.body.pos.x;
    let side = if state.rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let x = px + side * state.rng.random_range(200.0..=800.0);
    let y = DIVIDE_Y + state.rng.random_range(50.0..=200.0);
    let radius = state.rng.random_range(38.0..=50.0);
    state.portals.push(EscapePortal {
        pos: Vec2::new(x, y),
        radius,
    });
    log::debug!("escape portal opened at ({:.0}, {:.0})", x, y);
}

/// Materialize pending records into echoes while the population is under
/// the cap. Runs every tick; an empty queue is a no-op.
fn drain_pending_echoes(state: &mut GameState) {
    while state.echoes.len() < state.tuning.echo.drain_cap {
        let Some(record) = state.pending_echoes.pop_front() else {
            break;
        };
        let scatter = state.tuning.echo.materialize_scatter;
        let x = state.player.body.pos.x + state.rng.random_range(-scatter..=scatter);
        let id = state.next_entity_id();
        let echo = Echo::new(
            id,
            EchoOrigin::Fallen(record.kind),
            Vec2::new(x, record.spawn.y),
            &state.tuning,
        );
        state.echoes.push(echo);
    }
}

/// Scripted autoplayer: chase and shoot the nearest threat while alive,
/// head for the portal and harvest while a soul. Keeps headless sessions
/// exercising every subsystem.
fn synthesize_demo_input(state: &mut GameState, input: &mut TickInput) {
    let player_pos = state.player.body.pos;
    match state.player.realm {
        Realm::Alive => {
            let nearest = state.enemies.iter().min_by(|a, b| {
                let da = (a.body.pos.x - player_pos.x).abs();
                let db = (b.body.pos.x - player_pos.x).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });
            if let Some(enemy) = nearest {
                let dx = enemy.body.pos.x - player_pos.x;
                input.aim = Some(enemy.body.pos);
                input.fire = true;
                input.melee = dx.abs() < 80.0;
                if dx.abs() > 320.0 {
                    input.move_left = dx < 0.0;
                    input.move_right = dx > 0.0;
                }
            }
            input.jump = state.rng.random::<f32>() < 0.005;
        }
        Realm::Soul => {
            if let Some(portal) = state.portals.first() {
                input.move_left = portal.pos.x < player_pos.x - 10.0;
                input.move_right = portal.pos.x > player_pos.x + 10.0;
                input.move_up = portal.pos.y < player_pos.y - 10.0;
                input.move_down = portal.pos.y > player_pos.y + 10.0;
            }
            let nearest = state.echoes.iter().min_by(|a, b| {
                let da = a.body.pos.distance_squared(player_pos);
                let db = b.body.pos.distance_squared(player_pos);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });
            if let Some(echo) = nearest {
                input.aim = Some(echo.body.pos);
                input.fire = true;
            }
        }
    }
}
