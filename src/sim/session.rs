//! Run lifecycle
//!
//! A session owns everything one playthrough needs and walks it through
//! `Idle -> Active -> Ended`, with `retry` going straight back to `Active`.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::aabb::Aabb;
use super::clock::WorldClock;
use super::energy::Energy;
use super::entity::EntityKind;
use super::generator::ProceduralGenerator;
use super::player::{Player, PlayerController};
use super::registry::EntityRegistry;
use super::state::{GameEvent, GamePhase, RunState, ScoreRecord, TerminationReason};
use super::tick::{self, TickInput};
use crate::config::RunConfig;
use crate::persistence::{OfflineSink, ScoreSink, ServerReply, SubmitBody};

pub struct RunSession {
    pub(super) config: RunConfig,
    pub(super) phase: GamePhase,
    /// Base seed; run `n` plays with `seed + n`
    seed: u64,
    pub(super) rng: Pcg32,
    pub(super) clock: WorldClock,
    pub(super) energy: Energy,
    pub(super) registry: EntityRegistry,
    pub(super) generator: ProceduralGenerator,
    pub(super) controller: PlayerController,
    pub(super) run: RunState,
    /// Events since the last drain
    pub(super) events: Vec<GameEvent>,
    termination: Option<TerminationReason>,
    last_record: Option<ScoreRecord>,
    /// Best known score, from the server or from finished runs
    best_score: u64,
    server_message: Option<String>,
    sink: Box<dyn ScoreSink>,
    runs_started: u64,
}

impl RunSession {
    /// Create an idle session showing the starting world, and ask the score
    /// service for the current best
    pub fn new(seed: u64, config: RunConfig, sink: Box<dyn ScoreSink>) -> Self {
        let t = &config.tuning;
        let mut session = Self {
            phase: GamePhase::Idle,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            clock: WorldClock::new(),
            energy: Energy::from_tuning(t),
            registry: EntityRegistry::new(),
            generator: ProceduralGenerator::new(t.initial_sector_x),
            controller: PlayerController::new(t),
            run: RunState::new(t.energy_max, t.pursuit_base_speed, t.initial_sector_x),
            events: Vec::new(),
            termination: None,
            last_record: None,
            best_score: 0,
            server_message: None,
            sink,
            runs_started: 0,
            config,
        };
        session.lay_initial_world();
        session.sink.request_best();
        session
    }

    /// Session that never talks to a server
    pub fn offline(seed: u64, config: RunConfig) -> Self {
        Self::new(seed, config, Box::new(OfflineSink))
    }

    /// Safe starting sector plus the laser, committed immediately
    fn lay_initial_world(&mut self) {
        let t = &self.config.tuning;
        let sector = self.generator.generate_sector(
            &mut self.rng,
            t.initial_sector_x,
            t.initial_sector_width,
            1,
            true,
            &self.config,
        );
        self.registry.spawn_all(sector.requests, 0.0);
        self.registry.create(
            EntityKind::PursuitHazard,
            Aabb::new(t.pursuit_start_x, t.pursuit_top, t.pursuit_width, t.pursuit_height),
            None,
            0.0,
        );
        self.registry.commit();
        self.run.next_frontier = self.generator.next_frontier();
    }

    /// Begin a run. Ignored while a run is already active.
    pub fn start(&mut self) {
        if self.phase == GamePhase::Active {
            return;
        }
        let t = &self.config.tuning;

        self.rng = Pcg32::seed_from_u64(self.seed.wrapping_add(self.runs_started));
        self.runs_started += 1;
        self.clock.reset();
        self.energy.reset();
        self.controller.reset(t);
        self.generator.reset(t.initial_sector_x);
        self.run = RunState::new(self.energy.value(), t.pursuit_base_speed, t.initial_sector_x);
        self.registry.clear();
        self.lay_initial_world();

        self.termination = None;
        self.last_record = None;
        self.events.clear();
        self.run.is_active = true;
        self.phase = GamePhase::Active;

        log::info!(
            "Run {} started: variant '{}', seed {}",
            self.runs_started,
            self.config.name,
            self.seed.wrapping_add(self.runs_started - 1)
        );
        self.events.push(GameEvent::RunStarted);
    }

    /// Start over after a run ended
    pub fn retry(&mut self) {
        self.start();
    }

    /// Advance one tick; a no-op unless a run is active
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        tick::tick(self, input, dt);
    }

    /// Drop the active run without scoring it and go back to idle
    pub fn abandon(&mut self) {
        if self.phase != GamePhase::Active {
            return;
        }
        log::info!("Run {} abandoned at {:.0}m", self.runs_started, self.run.distance);
        self.controller.freeze();
        self.run.is_active = false;
        self.phase = GamePhase::Idle;
    }

    /// Finish the active run: freeze, score, and hand the record off
    pub(super) fn end(&mut self, reason: TerminationReason) {
        if self.phase != GamePhase::Active {
            return;
        }
        self.controller.freeze();
        self.registry.commit();
        self.phase = GamePhase::Ended;
        self.run.is_active = false;
        self.termination = Some(reason);

        let record = ScoreRecord {
            score: self.run.score(),
            reason,
            distance: self.run.distance,
            duration: self.clock.elapsed,
            stamina_collected: self.energy.collected(),
            max_speed: self.run.max_speed,
            level: self.run.difficulty_level,
            identity_dropped: self.config.anonymous,
        };
        log::info!(
            "Run ended: {} after {:.1}s, score {} (level {})",
            reason,
            record.duration,
            record.score,
            record.level
        );

        self.best_score = self.best_score.max(record.score);
        self.events.push(GameEvent::RunEnded {
            reason,
            score: record.score,
        });
        self.sink
            .submit(SubmitBody::from_record(&record, self.config.submit_format));
        self.last_record = Some(record);
    }

    /// Pick up whatever the score service has answered since the last call
    pub fn poll_persistence(&mut self) {
        for reply in self.sink.poll() {
            match reply {
                ServerReply::Best(best) => {
                    self.best_score = self.best_score.max(best);
                }
                ServerReply::Submitted(reply) => {
                    self.best_score = self.best_score.max(reply.high_score);
                    if !reply.message.is_empty() {
                        log::info!("Server: {}", reply.message);
                        self.server_message = Some(reply.message);
                    }
                }
            }
        }
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn player(&self) -> &Player {
        self.controller.player()
    }

    pub fn energy(&self) -> &Energy {
        &self.energy
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn clock(&self) -> &WorldClock {
        &self.clock
    }

    /// Why the last run ended, while it is over
    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    pub fn last_record(&self) -> Option<&ScoreRecord> {
        self.last_record.as_ref()
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    /// Last message from the score server
    pub fn server_message(&self) -> Option<&str> {
        self.server_message.as_deref()
    }

    pub fn runs_started(&self) -> u64 {
        self.runs_started
    }

    /// Seed the best score from a local source, e.g. the offline leaderboard
    pub fn note_best(&mut self, score: u64) {
        self.best_score = self.best_score.max(score);
    }

    #[cfg(test)]
    pub(crate) fn energy_mut(&mut self) -> &mut Energy {
        &mut self.energy
    }

    #[cfg(test)]
    pub(crate) fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    #[cfg(test)]
    pub(crate) fn teleport_player(&mut self, x: f32, y: f32) {
        self.controller.teleport(glam::Vec2::new(x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::persistence::{MemorySink, SubmitReply};

    fn forward() -> TickInput {
        TickInput {
            right: true,
            ..Default::default()
        }
    }

    /// Kinds and rest boxes of every live entity, in id order
    fn world_shape(session: &RunSession) -> Vec<(EntityKind, Aabb)> {
        session.registry().iter().map(|e| (e.kind, e.rest)).collect()
    }

    #[test]
    fn test_new_session_is_idle_with_world() {
        let session = RunSession::offline(1, RunConfig::default());
        assert_eq!(session.phase(), GamePhase::Idle);
        assert_eq!(session.run().next_frontier, 4000.0);
        let laser = session
            .registry()
            .matching(|e| e.kind == EntityKind::PursuitHazard)
            .count();
        assert_eq!(laser, 1);
        assert_eq!(session.registry().len(), 6);
    }

    #[test]
    fn test_start_resets_run() {
        let mut session = RunSession::offline(2, RunConfig::default());
        session.start();
        assert_eq!(session.seed(), 2);
        assert_eq!(session.phase(), GamePhase::Active);
        assert!(session.run().is_active);
        assert_eq!(session.energy().value(), 100.0);
        assert_eq!(session.run().difficulty_level, 1);
        assert_eq!(session.run().pursuit_speed, 300.0);
        assert_eq!(session.drain_events(), vec![GameEvent::RunStarted]);
    }

    #[test]
    fn test_collect_caps_energy() {
        let mut session = RunSession::offline(3, RunConfig::default());
        session.start();
        session.energy_mut().set(90.0);
        assert_eq!(session.energy_mut().collect(25.0), 100.0);
    }

    #[test]
    fn test_retry_restores_initial_world() {
        let mut session = RunSession::offline(4, RunConfig::default());
        session.start();
        let first = world_shape(&session);

        for _ in 0..300 {
            session.tick(&forward(), SIM_DT);
        }
        session.energy_mut().set(0.0);
        session.tick(&forward(), SIM_DT);
        assert_eq!(session.phase(), GamePhase::Ended);

        session.retry();
        assert_eq!(session.phase(), GamePhase::Active);
        assert_eq!(session.energy().value(), 100.0);
        assert_eq!(session.energy().collected(), 0.0);
        assert_eq!(session.run().distance, 0.0);
        assert_eq!(session.run().next_frontier, 4000.0);
        assert_eq!(session.clock().ticks, 0);
        assert!(session.termination().is_none());
        assert_eq!(world_shape(&session), first);
    }

    #[test]
    fn test_retry_from_every_reason() {
        for reason in [
            TerminationReason::Crashed,
            TerminationReason::Impaled,
            TerminationReason::Incinerated,
            TerminationReason::Exhausted,
        ] {
            let mut session = RunSession::offline(5, RunConfig::default());
            session.start();
            let first = world_shape(&session);
            session.tick(&forward(), SIM_DT);
            session.end(reason);
            assert_eq!(session.termination(), Some(reason));

            session.retry();
            assert_eq!(session.energy().value(), 100.0);
            assert_eq!(session.run().next_frontier, 4000.0);
            assert_eq!(world_shape(&session), first);
        }
    }

    #[test]
    fn test_end_submits_record() {
        let sink = MemorySink::new();
        let mut session = RunSession::new(6, RunConfig::default(), Box::new(sink.clone()));
        assert_eq!(sink.best_requests(), 1);

        session.start();
        for _ in 0..120 {
            session.tick(&forward(), SIM_DT);
        }
        session.end(TerminationReason::Crashed);

        let record = session.last_record().cloned().unwrap();
        assert_eq!(record.reason, TerminationReason::Crashed);
        assert!(record.duration > 1.9);
        assert_eq!(record.score, (record.distance.floor()) as u64);
        assert_eq!(sink.submitted(), vec![SubmitBody::Simple { score: record.score }]);
        assert_eq!(session.best_score(), record.score);
    }

    #[test]
    fn test_end_only_once() {
        let sink = MemorySink::new();
        let mut session = RunSession::new(7, RunConfig::default(), Box::new(sink.clone()));
        session.start();
        session.end(TerminationReason::Impaled);
        session.end(TerminationReason::Crashed);
        assert_eq!(session.termination(), Some(TerminationReason::Impaled));
        assert_eq!(sink.submitted().len(), 1);
    }

    #[test]
    fn test_detailed_submission_carries_stats() {
        let sink = MemorySink::new();
        let mut config = RunConfig::time_trial();
        config.anonymous = true;
        let mut session = RunSession::new(8, config, Box::new(sink.clone()));
        session.start();
        for _ in 0..30 {
            session.tick(&forward(), SIM_DT);
        }
        session.end(TerminationReason::Exhausted);

        match sink.submitted().as_slice() {
            [SubmitBody::Detailed {
                duration,
                max_speed,
                identity_dropped,
                ..
            }] => {
                assert!((*duration - 0.5).abs() < 0.01);
                assert_eq!(*max_speed, 350.0);
                assert!(*identity_dropped);
            }
            other => panic!("unexpected submissions: {other:?}"),
        }
    }

    #[test]
    fn test_abandon_submits_nothing() {
        let sink = MemorySink::new();
        let mut session = RunSession::new(12, RunConfig::default(), Box::new(sink.clone()));
        session.start();
        session.tick(&forward(), SIM_DT);
        session.abandon();
        assert_eq!(session.phase(), GamePhase::Idle);
        assert!(session.last_record().is_none());
        assert!(sink.submitted().is_empty());

        session.start();
        assert_eq!(session.phase(), GamePhase::Active);
        assert_eq!(session.runs_started(), 2);
    }

    #[test]
    fn test_server_replies_update_best() {
        let sink = MemorySink::new();
        let mut session = RunSession::new(9, RunConfig::default(), Box::new(sink.clone()));
        sink.push_reply(ServerReply::Best(1500));
        session.poll_persistence();
        assert_eq!(session.best_score(), 1500);

        sink.push_reply(ServerReply::Submitted(SubmitReply {
            high_score: 2100,
            message: "NEW SERVER RECORD!".to_string(),
        }));
        session.poll_persistence();
        assert_eq!(session.best_score(), 2100);
        assert_eq!(session.server_message(), Some("NEW SERVER RECORD!"));

        // A lower best never replaces a higher one
        sink.push_reply(ServerReply::Best(10));
        session.poll_persistence();
        assert_eq!(session.best_score(), 2100);
    }

    #[test]
    fn test_offline_session_is_playable() {
        let mut session = RunSession::offline(10, RunConfig::default());
        session.poll_persistence();
        assert_eq!(session.best_score(), 0);
        session.start();
        session.tick(&forward(), SIM_DT);
        assert_eq!(session.phase(), GamePhase::Active);
    }

    #[test]
    fn test_runs_are_deterministic_per_seed() {
        let play = |seed| {
            let mut session = RunSession::offline(seed, RunConfig::default());
            session.start();
            for _ in 0..120 {
                session.tick(&forward(), SIM_DT);
            }
            (world_shape(&session), session.player().pos)
        };
        assert_eq!(play(42), play(42));
    }

    #[test]
    fn test_each_run_reseeds() {
        let mut session = RunSession::offline(11, RunConfig::default());
        let mut generated = Vec::new();
        for _ in 0..2 {
            session.start();
            session.tick(&forward(), SIM_DT);
            generated.push(world_shape(&session));
            session.end(TerminationReason::Crashed);
        }
        assert_ne!(generated[0], generated[1]);
        assert_eq!(session.runs_started(), 2);
    }
}
