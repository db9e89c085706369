//! walkraced - The walkrace service
//!
//! This is the main entry point for the walkrace service.
//! It wires together all the components:
//! - Configuration loading
//! - Store initialization
//! - Pedometer gateway (simulated)
//! - Game core
//! - Console commands and the JSON event stream

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use walkrace_api::{EventPayload, StepCount};
use walkrace_config::{GameConfig, load_config_or_default};
use walkrace_core::{Game, TickSchedule};
use walkrace_pedometer::{
    PedometerGateway, SimulatedPedometer, SimulatedSettings, StepStream,
};
use walkrace_store::{SqliteStore, Store};
use walkrace_util::{DB_FILENAME, MonotonicInstant, default_config_path, format_elapsed};
use walkraced::{ConsoleCommand, EventPublisher};

/// How often the calendar day is checked for the daily reset
const ROLLOVER_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// walkraced - Walk a race against simulated opponents
#[derive(Parser, Debug)]
#[command(name = "walkraced")]
#[command(about = "Walk a race against simulated opponents", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/walkrace/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set WALKRACE_DATA_DIR env var)
    #[arg(short, long, env = "WALKRACE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Seed for opponents, chat and the simulated pedometer
    #[arg(long)]
    seed: Option<u64>,

    /// Start walking immediately
    #[arg(long)]
    start: bool,
}

/// Main service state
struct Service {
    game: Game,
    publisher: EventPublisher<Stdout>,
    opponent_ticks: TickSchedule,
    chat_ticks: TickSchedule,
    steps: Option<StepStream>,
    start_immediately: bool,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        let mut config = load_config_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        if let Some(data_dir) = &args.data_dir {
            config.service.data_dir = data_dir.clone();
        }
        if args.seed.is_some() {
            config.service.seed = args.seed;
        }

        info!(
            config_path = %args.config.display(),
            players = config.race.players.len(),
            goal_steps = config.race.goal_steps,
            "Configuration loaded"
        );

        let data_dir = config.service.data_dir.clone();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let db_path = data_dir.join(DB_FILENAME);
        let store: Arc<dyn Store> = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?,
        );

        info!(db_path = %db_path.display(), "Store initialized");

        let gateway: Arc<dyn PedometerGateway> = Arc::new(simulated_pedometer(&config));
        let game = Game::new(&config, gateway, store, walkrace_util::now());

        Ok(Self {
            game,
            publisher: EventPublisher::new(std::io::stdout()),
            opponent_ticks: TickSchedule::new(config.opponents.tick),
            chat_ticks: TickSchedule::new(config.chat.tick),
            steps: None,
            start_immediately: args.start,
        })
    }

    async fn run(mut self) -> Result<()> {
        let state = self.game.check_pedometer().await;
        info!(state = ?state, "Pedometer checked");

        let now_mono = MonotonicInstant::now();
        self.publisher
            .publish(EventPayload::StateChanged(self.game.snapshot(now_mono)));
        self.publisher.publish(EventPayload::StandingsChanged {
            players: self.game.race().standings(),
        });

        if self.start_immediately {
            self.start().await;
        }

        let mut console: Lines<BufReader<Stdin>> = BufReader::new(tokio::io::stdin()).lines();
        let mut console_open = true;
        let mut rollover_timer = tokio::time::interval(ROLLOVER_CHECK_INTERVAL);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        info!("Service running");
        eprintln!("{}", ConsoleCommand::HELP);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Received interrupt, shutting down gracefully");
                    break;
                }

                // Pedometer updates for the active session
                update = next_update(&mut self.steps) => {
                    match update {
                        Some(update) => {
                            let events = self.game.on_steps(update.steps, walkrace_util::now());
                            self.publisher.publish_all(events);
                        }
                        None => {
                            debug!("Step stream closed");
                            self.steps = None;
                        }
                    }
                }

                _ = self.opponent_ticks.next() => {
                    let events = self.game.opponent_tick();
                    self.publisher.publish_all(events);
                }

                _ = self.chat_ticks.next() => {
                    let events = self.game.chat_tick(MonotonicInstant::now());
                    self.publisher.publish_all(events);
                }

                _ = rollover_timer.tick() => {
                    let events = self.game.roll_over(walkrace_util::now());
                    self.publisher.publish_all(events);
                }

                line = console.next_line(), if console_open => {
                    match line {
                        Ok(Some(line)) if line.trim().is_empty() => {}
                        Ok(Some(line)) => match line.parse::<ConsoleCommand>() {
                            Ok(ConsoleCommand::Quit) => {
                                info!("Quit requested");
                                break;
                            }
                            Ok(command) => self.handle_command(command).await,
                            Err(e) => eprintln!("{e}; {}", ConsoleCommand::HELP),
                        },
                        Ok(None) => {
                            debug!("Console closed");
                            console_open = false;
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to read console");
                            console_open = false;
                        }
                    }
                }
            }
        }

        info!("Shutting down walkraced");

        // Totals are already persisted; dropping the game releases tracking
        self.steps = None;
        self.publisher.publish(EventPayload::Shutdown);

        info!("Shutdown complete");
        Ok(())
    }

    async fn handle_command(&mut self, command: ConsoleCommand) {
        match command {
            ConsoleCommand::Start => self.start().await,
            ConsoleCommand::Stop => self.stop(),
            ConsoleCommand::Toggle => {
                if self.game.is_active() {
                    self.stop();
                } else {
                    self.start().await;
                }
            }
            ConsoleCommand::Status => self.print_status().await,
            ConsoleCommand::ResetDaily => {
                let events = self.game.reset_daily();
                self.publisher.publish_all(events);
            }
            // Handled by the main loop
            ConsoleCommand::Quit => {}
        }
    }

    async fn start(&mut self) {
        let (events, steps) = self
            .game
            .start(walkrace_util::now(), MonotonicInstant::now())
            .await;

        if self.game.is_active() {
            if steps.is_some() {
                self.steps = steps;
            }
            if !self.opponent_ticks.is_armed() {
                self.opponent_ticks.arm();
            }
            if !self.chat_ticks.is_armed() {
                self.chat_ticks.arm();
            }
        }

        self.publisher.publish_all(events);
    }

    fn stop(&mut self) {
        let events = self.game.stop(walkrace_util::now(), MonotonicInstant::now());
        if !events.is_empty() {
            self.steps = None;
            self.opponent_ticks.disarm();
            self.chat_ticks.disarm();
        }
        self.publisher.publish_all(events);
    }

    async fn print_status(&mut self) {
        let now_mono = MonotonicInstant::now();
        let view = self.game.snapshot(now_mono);
        let goal = self.game.daily_goal();

        let device_today = self
            .game
            .device_steps_this_session(walkrace_util::now())
            .await;

        eprintln!(
            "walking: {} | session: {} steps in {} | today: {} steps ({}% of {}) | total: {}",
            if self.game.is_active() { "yes" } else { "no" },
            view.session_steps,
            format_elapsed(view.session_duration_secs),
            view.daily_steps,
            goal.percent,
            goal.goal,
            view.total_steps,
        );
        if let Some(StepCount { steps }) = device_today {
            eprintln!("device reports {steps} steps since the session started");
        }
        for player in self.game.race().standings() {
            eprintln!(
                "  #{} {:<10} {:>6} steps{}",
                player.rank,
                player.name,
                player.steps,
                if player.is_walking { " (walking)" } else { "" },
            );
        }

        self.publisher.publish(EventPayload::StateChanged(view));
    }
}

/// Next pedometer update, or never when no stream is attached
async fn next_update(steps: &mut Option<StepStream>) -> Option<walkrace_pedometer::StepUpdate> {
    match steps.as_mut() {
        Some(stream) => stream.recv().await,
        None => std::future::pending().await,
    }
}

fn simulated_pedometer(config: &GameConfig) -> SimulatedPedometer {
    let pedometer = &config.pedometer;
    let settings = SimulatedSettings {
        available: pedometer.available,
        initial_permission: pedometer.initial_permission,
        grant_on_request: pedometer.grant_on_request,
        update_interval: pedometer.update_interval,
        steps_per_update: pedometer.steps_per_update.clone(),
    };
    SimulatedPedometer::new(settings, config.service.seed)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the event stream
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "walkraced starting"
    );

    if walkrace_util::is_mock_time_active() {
        warn!(now = %walkrace_util::now(), "Mock time is active; daily rollover follows it");
    }

    let service = Service::new(&args)?;
    service.run().await
}
