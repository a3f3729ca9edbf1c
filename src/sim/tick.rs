//! Per-tick simulation pipeline
//!
//! Order within a tick: clock, player, entity motion, collisions,
//! difficulty, generation, cleanup, energy. Every step finishes before the
//! next starts and nothing here waits on I/O.

use super::clock::WorldClock;
use super::collision::{self, Outcome};
use super::session::RunSession;
use super::state::{GameEvent, GamePhase, TerminationReason};

/// Safety valve for the generation loop
const MAX_SECTORS_PER_TICK: usize = 8;

/// Control state for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Run forward
    pub right: bool,
    /// Back up at reduced speed
    pub left: bool,
    pub sprint: bool,
    /// Jump; should be true only on the tick the key went down
    pub jump: bool,
    /// Held to slide
    pub duck: bool,
}

/// Advance an active session by `dt` seconds. Does nothing unless active.
pub fn tick(session: &mut RunSession, input: &TickInput, dt: f32) {
    if session.phase != GamePhase::Active {
        return;
    }
    let s = session;
    let t = &s.config.tuning;

    // Clock
    let dt = s.clock.advance(dt);
    let now = s.clock.elapsed;

    // Player
    let effects = s.controller.apply_input(input, s.energy.value(), t);
    if effects.jumped {
        s.events.push(GameEvent::Jumped);
    }
    if effects.slide_started {
        s.events.push(GameEvent::SlideStarted);
    }
    s.controller.integrate(dt, t);

    // Entity motion, laser included
    let player_x = s.controller.player().pos.x;
    s.registry.advance(now);
    s.registry
        .advance_pursuit(dt, s.run.pursuit_speed, player_x, t.pursuit_max_gap);

    // Collisions: settle onto surfaces first, then look for hazards and pickups
    let support = collision::resolve_support(s.controller.player(), s.registry.iter());
    s.controller.apply_support(support);
    if s.controller.safety_net(t) {
        log::debug!("Safety net caught the player at x={:.0}", player_x);
    }

    s.run.distance = s
        .clock
        .distance(s.config.distance_basis, s.controller.player().pos.x, t);
    s.run.max_speed = s.run.max_speed.max(s.controller.player().vel.x.abs());

    match collision::resolve(s.controller.player(), s.registry.iter()) {
        Outcome::Terminate(reason) => {
            s.end(reason);
            return;
        }
        Outcome::Collect(id) => {
            s.registry.destroy(id);
            let energy = s.energy.collect(t.pickup_energy);
            s.events.push(GameEvent::Collected { id, energy });
        }
        Outcome::Continue => {}
    }

    // Difficulty only ever goes up
    let level = WorldClock::level_for_distance(s.run.distance, t);
    if level > s.run.difficulty_level {
        s.run.difficulty_level = level;
        s.run.pursuit_speed = t.pursuit_speed_for_level(level);
        log::info!(
            "SECTOR {} - speed increasing (laser {:.0})",
            level,
            s.run.pursuit_speed
        );
        s.events.push(GameEvent::LevelUp { level });
    }

    // Generation ahead of the player
    let player_x = s.controller.player().pos.x;
    let mut generated = 0;
    while s.generator.needs_sector(player_x, t.lookahead) && generated < MAX_SECTORS_PER_TICK {
        let sector = s
            .generator
            .generate_next(&mut s.rng, s.run.difficulty_level, &s.config);
        s.registry.spawn_all(sector.requests, now);
        generated += 1;
    }
    s.run.next_frontier = s.generator.next_frontier();

    // Cleanup behind the player, then publish this tick's changes
    s.registry.cull_behind(player_x - t.cull_distance);
    s.registry.commit();

    // Energy
    s.run.energy = s.energy.tick(dt, input.sprint);
    if s.energy.is_depleted() {
        s.end(TerminationReason::Exhausted);
    }
}
