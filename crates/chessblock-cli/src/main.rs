//! Command-line front end: parse a chess block, optionally walk or play
//! through it, and print the result.

mod config;

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chessblock::{
    parse_block, Autoplay, BlockKind, BoardUpdate, BoardView, MoveOutcome, Navigator,
    ParsedResult, PromotionPiece, PuzzleFeedback, PuzzleSession,
};
use clap::{Parser, ValueEnum};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Config;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Human readable overview
    Summary,
    /// The full parse result as JSON
    Json,
    /// PGN text, including moves played with --play
    Export,
}

#[derive(Parser)]
#[command(name = "chessblock")]
#[command(about = "Parse and step through interactive chess blocks")]
struct Args {
    /// Block file to read (stdin when omitted or `-`)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "summary")]
    format: Format,

    /// Main-line ply to show
    #[arg(short, long, value_name = "PLY")]
    goto: Option<usize>,

    /// Board moves to play, as origin and destination squares (`e2e4`, `e7e8q`)
    #[arg(short, long, value_delimiter = ',', value_name = "MOVES")]
    play: Vec<String>,

    /// Step through the current line on a timer
    #[arg(long)]
    autoplay: bool,

    /// Print every board update
    #[arg(short, long)]
    verbose: bool,
}

/// Board that prints updates to stdout.
struct StdoutBoard {
    echo: bool,
    last: Option<BoardUpdate>,
}

impl BoardView for StdoutBoard {
    fn render(&mut self, update: &BoardUpdate) {
        if self.echo {
            let last = update
                .last_move
                .as_ref()
                .map(|(from, to)| format!(" ({from}-{to})"))
                .unwrap_or_default();
            println!("[{}:{}] {}{}", update.cursor.line.0, update.cursor.index, update.fen, last);
        }
        self.last = Some(update.clone());
    }

    fn request_promotion(&mut self, from: &str, to: &str) {
        info!(from, to, "Promotion piece requested");
    }
}

fn read_input(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// `e2e4` or `e7e8q` into squares and promotion piece.
fn parse_board_move(text: &str) -> anyhow::Result<(String, String, Option<PromotionPiece>)> {
    let text = text.trim();
    if !text.is_ascii() || !(text.len() == 4 || text.len() == 5) {
        bail!("Expected a move like e2e4 or e7e8q, got {text:?}");
    }
    let promotion = match text[4..].chars().next() {
        Some(c) => Some(
            PromotionPiece::from_char(c).with_context(|| format!("Unknown promotion piece in {text:?}"))?,
        ),
        None => None,
    };
    Ok((text[..2].to_string(), text[2..4].to_string(), promotion))
}

fn print_summary(result: &ParsedResult, fen: &str) {
    println!("kind:        {:?}", result.kind);
    println!("orientation: {:?}", result.orientation);
    println!("editable:    {}", result.editable && !result.static_board);
    if !result.headers.is_empty() {
        for (key, value) in result.headers.iter() {
            println!("header:      {key} = {value}");
        }
    }
    match result.kind {
        BlockKind::Puzzle => {
            println!("solution:    {} plies", result.solution.len());
            if let Some(solver) = result.puzzle.solver {
                println!("solver:      {solver:?}");
            }
            if let Some(rating) = result.puzzle.rating {
                println!("rating:      {rating}");
            }
            if !result.puzzle.themes.is_empty() {
                println!("themes:      {}", result.puzzle.themes.join(", "));
            }
        }
        _ => println!("moves:       {}", result.tree.node_count()),
    }
    for warning in &result.warnings {
        println!("warning:     {warning}");
    }
    println!("position:    {fen}");
}

fn run_puzzle(result: &ParsedResult, args: &Args) -> anyhow::Result<String> {
    let mut session = PuzzleSession::new(result).context("Block is not a playable puzzle")?;
    for text in &args.play {
        let (from, to, promotion) = parse_board_move(text)?;
        let mut feedback = session.submit(&from, &to, promotion);
        if feedback == PuzzleFeedback::PromotionRequired {
            feedback = session.resolve_promotion(None);
        }
        match feedback {
            PuzzleFeedback::Correct { reply } => match reply {
                Some(reply) => println!("{text}: correct, reply {reply}"),
                None => println!("{text}: correct"),
            },
            PuzzleFeedback::Solved => println!("{text}: solved"),
            PuzzleFeedback::Incorrect { san } => println!("{text}: {san} is not the solution"),
            PuzzleFeedback::Illegal => println!("{text}: illegal"),
            PuzzleFeedback::Finished => println!("{text}: puzzle already solved"),
            PuzzleFeedback::PromotionRequired | PuzzleFeedback::Rejected => {
                println!("{text}: not applied")
            }
        }
    }
    if !session.is_solved() {
        if let Some(square) = session.hint() {
            info!(square, "Next move starts from");
        }
    }
    Ok(session.fen())
}

async fn run_game(result: ParsedResult, args: &Args, config: &Config) -> anyhow::Result<Navigator<StdoutBoard>> {
    let board = StdoutBoard {
        echo: args.verbose || args.autoplay,
        last: None,
    };
    let mut nav = Navigator::new(result, board)?;

    if let Some(ply) = args.goto {
        let reached = nav.go_to_move(ply);
        if reached != ply {
            warn!(requested = ply, reached, "Could not reach requested ply");
        }
    }

    for text in &args.play {
        let (from, to, promotion) = parse_board_move(text)?;
        let mut outcome = nav.handle_user_move(&from, &to, promotion);
        if outcome == MoveOutcome::PromotionRequired {
            outcome = nav.resolve_promotion(None);
        }
        info!(mv = %text, ?outcome, "Played board move");
        if matches!(outcome, MoveOutcome::Illegal | MoveOutcome::Rejected) {
            warn!(mv = %text, ?outcome, "Board move not applied");
        }
    }

    if args.autoplay {
        let shared = Arc::new(Mutex::new(nav));
        Autoplay::start(shared.clone(), config.autoplay_interval)
            .finished()
            .await;
        nav = Arc::try_unwrap(shared)
            .map_err(|_| anyhow::anyhow!("Autoplay still holds the navigator"))?
            .into_inner();
    }
    Ok(nav)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_env();
    let input = read_input(args.input.as_ref())?;

    let result = parse_block(&input, &config.parse_options());
    if let Some(err) = &result.error {
        if matches!(args.format, Format::Json) {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        bail!("{err}");
    }

    if result.kind == BlockKind::Puzzle {
        let fen = run_puzzle(&result, &args)?;
        match args.format {
            Format::Summary => print_summary(&result, &fen),
            Format::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            Format::Export => println!("{}", chessblock::export_text(&result)),
        }
        return Ok(());
    }

    let nav = run_game(result, &args, &config).await?;
    match args.format {
        Format::Summary => {
            let fen = nav
                .board()
                .last
                .as_ref()
                .map(|update| update.fen.clone())
                .unwrap_or_else(|| nav.current_fen());
            print_summary(nav.result(), &fen);
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(nav.result())?),
        Format::Export => println!("{}", nav.export_text()),
    }
    Ok(())
}
