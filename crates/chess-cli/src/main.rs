//! chess-cli - query and drive the chess engine from the shell.

use anyhow::Context;
use chess_cli::config::{validate_search, CliConfig};
use chess_cli::report::{render, BestMoveReport, PerftReport};
use chess_cli::setup_game;
use chess_core::Square;
use chess_engine::{perft, perft_divide, spawn_search, Game, SearchConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess-cli")]
#[command(about = "Mailbox chess engine: search, perft and position queries")]
struct Cli {
    /// Path to the engine config file (default: engine.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Position to start from.
#[derive(Args)]
struct PositionArgs {
    /// FEN of the position (default: the initial position)
    #[arg(long)]
    fen: Option<String>,

    /// Moves in coordinate notation played before the command runs
    #[arg(long, num_args = 1.., value_delimiter = ' ')]
    moves: Vec<String>,
}

/// Search settings that override the config file.
#[derive(Args)]
struct SearchArgs {
    /// Search depth in plies
    #[arg(short, long)]
    depth: Option<u32>,

    /// Time limit in milliseconds
    #[arg(long)]
    movetime: Option<u64>,

    /// Node budget
    #[arg(long)]
    nodes: Option<u64>,
}

impl SearchArgs {
    fn apply(&self, mut config: SearchConfig) -> anyhow::Result<SearchConfig> {
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if self.movetime.is_some() {
            config.movetime_ms = self.movetime;
        }
        if self.nodes.is_some() {
            config.node_budget = self.nodes;
        }
        validate_search(&config).context("Invalid search options")?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Search for the best move
    Best {
        #[command(flatten)]
        position: PositionArgs,
        #[command(flatten)]
        search: SearchArgs,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the static evaluation
    Eval {
        #[command(flatten)]
        position: PositionArgs,
    },
    /// Count leaf nodes of the move tree
    Perft {
        #[command(flatten)]
        position: PositionArgs,
        /// Depth in plies
        #[arg(short, long, default_value = "3")]
        depth: u32,
        /// Break the count down per root move
        #[arg(long)]
        divide: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List legal moves
    Moves {
        #[command(flatten)]
        position: PositionArgs,
        /// Only moves of the piece on this square
        #[arg(long)]
        square: Option<String>,
    },
    /// Let the engine play against itself
    Play {
        #[command(flatten)]
        position: PositionArgs,
        #[command(flatten)]
        search: SearchArgs,
        /// Number of plies to play
        #[arg(long, default_value = "20")]
        plies: u32,
    },
    /// Show the board, FEN and game state
    State {
        #[command(flatten)]
        position: PositionArgs,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_game(position: &PositionArgs, config: SearchConfig) -> anyhow::Result<Game> {
    setup_game(position.fen.as_deref(), &position.moves, config)
        .context("Failed to set up position")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let config = CliConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    let base = config.search.to_search_config();
    tracing::debug!(?base, "search settings");

    match cli.command {
        Commands::Best {
            position,
            search,
            json,
        } => {
            let search_config = search.apply(base)?;
            let game = load_game(&position, search_config)?;
            let started = Instant::now();
            let result = spawn_search(game.position().clone(), search_config)
                .join()
                .map_err(|_| anyhow::anyhow!("Search thread panicked"))?;
            let report = BestMoveReport::new(
                game.to_fen(),
                search_config.depth,
                &result,
                started.elapsed().as_millis() as u64,
            );
            println!("{}", render(&report, json)?);
        }
        Commands::Eval { position } => {
            let game = load_game(&position, base)?;
            println!("{}", game.position());
            println!();
            println!("eval {} (white positive)", game.evaluate());
        }
        Commands::Perft {
            position,
            depth,
            divide,
            json,
        } => {
            let game = load_game(&position, base)?;
            let started = Instant::now();
            let report = if divide {
                let entries = perft_divide(game.position(), depth);
                let elapsed_ms = started.elapsed().as_millis() as u64;
                PerftReport::new(game.to_fen(), depth, entries, elapsed_ms)
            } else {
                let nodes = perft(game.position(), depth);
                let elapsed_ms = started.elapsed().as_millis() as u64;
                PerftReport::total(game.to_fen(), depth, nodes, elapsed_ms)
            };
            tracing::info!(depth, nodes = report.nodes, "perft finished");
            println!("{}", render(&report, json)?);
        }
        Commands::Moves { position, square } => {
            let game = load_game(&position, base)?;
            let moves = match square {
                Some(text) => {
                    let sq = Square::from_algebraic(&text)
                        .with_context(|| format!("Invalid square: {}", text))?;
                    game.valid_moves(sq)
                }
                None => game.all_moves(game.side_to_move()),
            };
            let list: Vec<String> = moves.iter().map(|m| m.to_coordinate()).collect();
            println!("{} moves: {}", list.len(), list.join(" "));
        }
        Commands::Play {
            position,
            search,
            plies,
        } => {
            let search_config = search.apply(base)?;
            let mut game = load_game(&position, search_config)?;
            self_play(&mut game, plies)?;
        }
        Commands::State { position } => {
            let game = load_game(&position, base)?;
            print_state(&game);
        }
    }

    Ok(())
}

fn self_play(game: &mut Game, plies: u32) -> anyhow::Result<()> {
    tracing::info!(plies, fen = %game.to_fen(), "starting self-play");
    for ply in 1..=plies {
        if game.game_state().is_over() {
            break;
        }
        let result = game.find_best_move(game.config().depth);
        let Some(m) = result.best_move else {
            break;
        };
        let mover = game.side_to_move();
        game.move_piece(m.from, m.to)
            .with_context(|| format!("Engine chose an unplayable move {}", m))?;
        println!(
            "{:>3}. {:<5} {} {:>6}  {}  {}",
            ply,
            mover.to_string(),
            m.to_coordinate(),
            result.value,
            game.to_fen(),
            game.game_state()
        );
    }
    println!();
    println!("{}", game.position());
    println!("state: {}", game.game_state());
    Ok(())
}

fn print_state(game: &Game) {
    println!("{}", game.position());
    println!();
    println!("fen:   {}", game.to_fen());
    println!("turn:  {}", game.side_to_move());
    println!("state: {}", game.game_state());

    let threatened: Vec<String> = game
        .threats(game.side_to_move())
        .iter()
        .map(|sq| sq.to_string())
        .collect();
    if !threatened.is_empty() {
        println!("attacked: {}", threatened.join(" "));
    }
}
