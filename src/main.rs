use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::filter::EnvFilter;
use vc_snake::game::{GameConfig, GameEngine};
use vc_snake::leaderboard::LeaderboardClient;
use vc_snake::modes::{LeaderboardSubmitter, PlayMode, ServeMode};
use vc_snake::storage::{FileHighScoreStore, Paths, project_paths};

#[derive(Parser)]
#[command(name = "vc_snake")]
#[command(version, about = "Grid snake that acquires startups")]
struct Cli {
    #[arg(long, value_enum, default_value = "play")]
    mode: Mode,

    /// Grid width in cells
    #[arg(long)]
    width: Option<usize>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<usize>,

    /// JSON file with game tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name submitted to the leaderboard at game over
    #[arg(long)]
    player: Option<String>,

    /// Base URL of a leaderboard service, e.g. http://127.0.0.1:8080
    #[arg(long)]
    leaderboard_url: Option<String>,

    /// Address the leaderboard service listens on
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Leaderboard JSON file (serve mode)
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Override the platform data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Play in the terminal
    Play,
    /// Host the leaderboard service
    Serve,
}

fn game_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(width) = cli.width {
        config.grid_cols = width;
    }
    if let Some(height) = cli.height {
        config.grid_rows = height;
    }
    config.validate()?;
    Ok(config)
}

fn init_tracing(mode: &Mode, paths: &Paths) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match mode {
        Mode::Serve => tracing_subscriber::fmt().with_env_filter(filter).init(),
        // the terminal belongs to the UI while playing
        Mode::Play => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&paths.log_path)
                .with_context(|| format!("Failed to open log file {:?}", paths.log_path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
    }
    Ok(())
}

async fn play(cli: Cli, paths: Paths) -> Result<()> {
    let config = game_config(&cli)?;
    let high_scores = FileHighScoreStore::open(&paths.high_score_path);
    let engine = GameEngine::new(config, Box::new(high_scores));

    let leaderboard = match (cli.player, cli.leaderboard_url) {
        (Some(player), Some(url)) => {
            let client = LeaderboardClient::new(url)?;
            tracing::info!(
                endpoint = %client.endpoint(),
                %player,
                "submitting runs to leaderboard"
            );
            Some(LeaderboardSubmitter::new(client, player))
        }
        _ => None,
    };

    PlayMode::new(engine, leaderboard).run().await
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = project_paths(cli.data_dir.as_deref())?;
    init_tracing(&cli.mode, &paths)?;

    match cli.mode {
        Mode::Play => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("Failed to start async runtime")?;
            runtime.block_on(play(cli, paths))
        }
        // actix drives its own system runtime
        Mode::Serve => {
            let data_file = cli.data_file.unwrap_or(paths.leaderboard_path);
            actix_web::rt::System::new().block_on(ServeMode::new(cli.bind, data_file).run())
        }
    }
}
