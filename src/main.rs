//! Tako Jump entry point
//!
//! The browser build is driven from JavaScript through `platform::web`. Natively
//! this runs a headless demo: the autopilot plays on a fixed clock and the run
//! is reported through the log.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result, anyhow};
    use clap::Parser;
    use tako_jump::consts::SIM_DT;
    use tako_jump::sim::{Autopilot, Screen, Session, build_stage};
    use tako_jump::{FileStore, HighScoreStore, MemoryStore, Tuning};

    #[derive(Debug, Parser)]
    #[command(name = "tako-jump")]
    #[command(about = "Run the Tako Jump autopilot headless, or dump a generated stage")]
    pub struct Args {
        /// Stage table JSON (defaults to the built-in table)
        #[arg(long)]
        pub tuning: Option<PathBuf>,
        /// High score file; kept in memory when omitted
        #[arg(long)]
        pub best: Option<PathBuf>,
        /// Simulated seconds of play
        #[arg(long, default_value_t = 180.0)]
        pub seconds: f32,
        /// Print the layout of this stage as JSON and exit
        #[arg(long)]
        pub dump_stage: Option<u32>,
    }

    pub fn run(args: Args) -> Result<()> {
        if !(args.seconds.is_finite() && args.seconds > 0.0) {
            return Err(anyhow!("--seconds must be positive, got {}", args.seconds));
        }

        let tuning = match &args.tuning {
            Some(path) => Tuning::load(path)
                .with_context(|| format!("failed loading tuning {}", path.display()))?,
            None => Tuning::default(),
        };

        if let Some(stage) = args.dump_stage {
            let config = tuning
                .stage(stage)
                .ok_or_else(|| anyhow!("no stage {stage} (table has {})", tuning.stage_count()))?;
            let layout = build_stage(stage, config);
            let json = serde_json::to_string_pretty(&layout).context("failed encoding stage layout")?;
            println!("{json}");
            return Ok(());
        }

        let store: Box<dyn HighScoreStore> = match &args.best {
            Some(path) => Box::new(FileStore::new(path)),
            None => Box::new(MemoryStore::new()),
        };
        let mut session = Session::new(tuning, store).context("invalid tuning")?;
        let mut pilot = Autopilot::new();

        let ticks = (args.seconds / SIM_DT).ceil() as u64;
        let mut best_stage = 0;
        let mut games = 0;
        let mut last_screen = session.state().screen;
        for _ in 0..ticks {
            let mut input = pilot.next_input(session.state());
            session.step(&mut input);

            let state = session.state();
            if state.screen != last_screen {
                match state.screen {
                    Screen::Cleared => best_stage = best_stage.max(state.stage),
                    Screen::GameOver => games += 1,
                    _ => {}
                }
                last_screen = state.screen;
            }
        }

        let state = session.state();
        log::info!(
            "Demo finished after {:.0}s: {} game(s) over, best stage cleared {}, score {}, high score {}",
            args.seconds,
            games,
            best_stage,
            state.score,
            state.high_score
        );
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();
    let args = native::Args::parse();
    log::info!("Tako Jump (native headless) starting...");

    if let Err(e) = native::run(args) {
        log::error!("{e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm entry point is `platform::web::start`
}
