//! Midnight Run entry point
//!
//! Headless host: drives sessions with the autopilot through a fixed-step
//! frame loop, logs cues and a text strip, and keeps the local leaderboard.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::Duration;

    use clap::{Parser, ValueEnum};

    use midnight_run::audio::{AudioManager, LogBackend};
    use midnight_run::consts::SIM_DT;
    use midnight_run::highscores::{self, HighScores};
    use midnight_run::logging;
    use midnight_run::persistence::http::DEFAULT_TIMEOUT;
    use midnight_run::persistence::{
        BackgroundClient, DEFAULT_SERVER_URL, HttpScoreService, OfflineSink, ScoreSink,
    };
    use midnight_run::platform::{Autopilot, FixedStep, InputMapper};
    use midnight_run::renderer::{Renderer, StripRenderer, build_frame};
    use midnight_run::sim::{GamePhase, RunSession};
    use midnight_run::RunConfig;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum Variant {
        /// Distance from position; spikes and platforms from sector 2
        MidnightRun,
        /// Distance from time survived; detailed score submissions
        TimeTrial,
    }

    /// Endless-runner simulation, played by the autopilot
    #[derive(Parser)]
    #[command(author, version, about, long_about = None)]
    struct Args {
        /// World seed; run n uses seed + n
        #[arg(long, default_value_t = 12345)]
        seed: u64,

        /// Give up on a run after this many ticks
        #[arg(long, default_value_t = 36_000)]
        ticks: u64,

        /// Number of runs to play
        #[arg(long, default_value_t = 1)]
        runs: u32,

        #[arg(long, value_enum, default_value_t = Variant::MidnightRun)]
        variant: Variant,

        /// Run config JSON; overrides --variant
        #[arg(long)]
        config: Option<PathBuf>,

        /// Score server base URL
        #[arg(long, default_value = DEFAULT_SERVER_URL)]
        server: String,

        /// Never contact the score server
        #[arg(long)]
        offline: bool,

        /// Local leaderboard file
        #[arg(long, default_value = "midnight-run-scores.json")]
        scores: PathBuf,

        /// Master volume for sound cues (0.0 - 1.0)
        #[arg(long, default_value_t = 0.3)]
        volume: f32,

        /// Sound effect volume (0.0 - 1.0)
        #[arg(long, default_value_t = 1.0)]
        sfx_volume: f32,

        /// Silence all sound cues
        #[arg(long)]
        mute: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    }

    /// Frames between strip renders (one per second of game time)
    const RENDER_EVERY: u64 = 60;

    pub fn run() {
        let args = Args::parse();
        logging::init(args.verbose);

        let config = match &args.config {
            Some(path) => RunConfig::load_or_default(path),
            None => match args.variant {
                Variant::MidnightRun => RunConfig::midnight_run(),
                Variant::TimeTrial => RunConfig::time_trial(),
            },
        };
        log::info!("Midnight Run starting: variant '{}'", config.name);

        let sink: Box<dyn ScoreSink> = if args.offline {
            Box::new(OfflineSink)
        } else {
            Box::new(BackgroundClient::new(HttpScoreService::new(
                &args.server,
                DEFAULT_TIMEOUT,
            )))
        };

        let mut scores = HighScores::load(&args.scores);
        let mut session = RunSession::new(args.seed, config, sink);
        if let Some(top) = scores.top_score() {
            session.note_best(top);
        }

        log::info!("Session seed {}", session.seed());

        let mut audio = AudioManager::new(LogBackend);
        audio.set_master_volume(args.volume);
        audio.set_sfx_volume(args.sfx_volume);
        audio.set_muted(args.mute);
        let mut renderer = StripRenderer::new(80);
        let pilot = Autopilot::new();
        let mut mapper = InputMapper::new();
        let mut stepper = FixedStep::new();

        for _ in 0..args.runs {
            session.start();
            mapper.reset();
            stepper.reset();

            let mut frames = 0u64;
            while session.phase() == GamePhase::Active {
                for _ in 0..stepper.advance(SIM_DT) {
                    let input = mapper.sample(&pilot.controls(&session));
                    session.tick(&input, SIM_DT);
                    audio.handle_events(&session.drain_events());
                }
                session.poll_persistence();

                frames += 1;
                if frames % RENDER_EVERY == 0 {
                    renderer.render(&build_frame(&session));
                    log::debug!("{}", renderer.last_line());
                }
                if session.clock().ticks >= args.ticks {
                    session.abandon();
                }
            }

            match session.last_record() {
                Some(record) if session.phase() == GamePhase::Ended => {
                    let rank = scores.add_record(record, highscores::now_millis());
                    println!(
                        "{:<12} {:>6}m  level {}  {:.1}s  +{:.0} energy{}",
                        record.reason.label(),
                        record.score,
                        record.level,
                        record.duration,
                        record.stamina_collected,
                        rank.map(|r| format!("  (#{r} locally)")).unwrap_or_default()
                    );
                }
                _ => println!("ABANDONED    {:>6}m", session.run().score()),
            }
        }

        scores.save(&args.scores);

        // Give in-flight submissions a moment to land
        for _ in 0..20 {
            std::thread::sleep(Duration::from_millis(50));
            session.poll_persistence();
        }
        println!("BEST {}", session.best_score());
        if let Some(message) = session.server_message() {
            println!("{message}");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library builds for the web; the headless host is native only
}
