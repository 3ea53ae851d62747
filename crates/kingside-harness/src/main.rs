//! Kingside simulation binary.
//!
//! # Usage
//!
//! ```bash
//! # Play a scripted game between two simulated clients
//! kingside-sim --moves "e2e4 e7e5 f1c4 b8c6 d1h5 g8f6 h5f7"
//!
//! # Host as black from a custom position, with a fixed seed
//! kingside-sim --host-color black --seed 7 --fen "8/P7/8/8/8/8/8/k6K w - - 0 1" --moves "a7a8q"
//! ```

use clap::{Parser, ValueEnum};
use kingside_client::ClientConfig;
use kingside_core::Color;
use kingside_harness::script::{play_script, split_moves};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Kingside game simulator
#[derive(Parser, Debug)]
#[command(name = "kingside-sim")]
#[command(about = "Play a scripted Kingside game through a simulated relay")]
#[command(version)]
struct Args {
    /// Moves in coordinate notation, separated by spaces or commas
    #[arg(short, long, default_value = "")]
    moves: String,

    /// Color the hosting client plays
    #[arg(long, value_enum, default_value = "white")]
    host_color: HostColor,

    /// Starting position as FEN
    #[arg(long)]
    fen: Option<String>,

    /// RNG seed for room codes
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HostColor {
    White,
    Black,
}

impl From<HostColor> for Color {
    fn from(color: HostColor) -> Self {
        match color {
            HostColor::White => Color::White,
            HostColor::Black => Color::Black,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = ClientConfig { initial_fen: args.fen, ..ClientConfig::default() };
    let moves = split_moves(&args.moves);
    tracing::info!(seed = args.seed, moves = moves.len(), "Kingside simulation starting");

    let report = play_script(args.seed, args.host_color.into(), &config, &moves)?;

    tracing::info!(played = report.moves_played, in_sync = report.in_sync, "script finished");
    tracing::info!(to_move = %report.board.side_to_move, pieces = report.board.pieces.len(), "final board");
    for (who, result) in ["host", "guest"].into_iter().zip(report.results) {
        match result {
            Some(result) => tracing::info!(who, kind = %result.kind, outcome = ?result.outcome, "game over"),
            None => tracing::info!(who, "game still in progress"),
        }
    }

    if !report.in_sync {
        tracing::error!("clients disagree on the final position");
    }

    Ok(())
}
