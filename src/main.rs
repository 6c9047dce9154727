//! MTG Duel - Main Binary
//!
//! Plays a two-player game from two deck files, or checks a deck

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mtg_duel::{
    core::PlayerId,
    game::{
        GameEndReason, GameLoop, GameState, InteractiveController, OutputFormat, PlayerController,
        RandomController, VerbosityLevel,
    },
    loader::{CardFactory, DeckLoader},
};
use std::path::{Path, PathBuf};

/// Controller type for each seat
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ControllerType {
    /// Text UI controller for human play via stdin
    Tui,
    /// Makes random choices
    Random,
}

/// Verbosity level for game output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[derive(Parser)]
#[command(name = "mtg-duel")]
#[command(about = "Two-player card duel engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game between two decks
    Play {
        /// Deck file for player 1
        #[arg(value_name = "PLAYER1_DECK")]
        deck1: PathBuf,

        /// Deck file for player 2
        #[arg(value_name = "PLAYER2_DECK")]
        deck2: PathBuf,

        /// Player 1 controller type
        #[arg(long, value_enum, default_value = "tui")]
        p1: ControllerType,

        /// Player 2 controller type
        #[arg(long, value_enum, default_value = "tui")]
        p2: ControllerType,

        /// Player 1 name
        #[arg(long, default_value = "Player 1")]
        p1_name: String,

        /// Player 2 name
        #[arg(long, default_value = "Player 2")]
        p2_name: String,

        /// Set random seed for deterministic games
        #[arg(long)]
        seed: Option<u64>,

        /// Stop after this many turns without a winner
        #[arg(long, default_value_t = 1000)]
        max_turns: u32,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,

        /// Log line format
        #[arg(long, value_enum, default_value = "text")]
        output_format: FormatArg,
    },

    /// Build every card of a deck and print the list
    Check {
        #[arg(value_name = "DECK")]
        deck: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            deck1,
            deck2,
            p1,
            p2,
            p1_name,
            p2_name,
            seed,
            max_turns,
            verbosity,
            output_format,
        } => {
            let mut game = GameState::new_two_player(p1_name, p2_name);
            game.logger.set_output_format(output_format.into());
            if let Some(seed) = seed {
                game.seed_rng(seed);
            }
            load_deck(&mut game, PlayerId::new(0), &deck1)?;
            load_deck(&mut game, PlayerId::new(1), &deck2)?;

            // Controller seeds are kept distinct from the game RNG seed
            let mut controller1 = make_controller(p1, PlayerId::new(0), seed.map(|s| s ^ 0x5eed_0001));
            let mut controller2 = make_controller(p2, PlayerId::new(1), seed.map(|s| s ^ 0x5eed_0002));

            let result = GameLoop::new(&mut game)
                .with_max_turns(max_turns)
                .with_verbosity(verbosity.0)
                .run_game(controller1.as_mut(), controller2.as_mut())
                .context("game aborted")?;

            match (result.winner, &result.end_reason) {
                (Some(winner), _) => println!("{} won the game!", game.player_name(winner)),
                (None, GameEndReason::TurnLimit) => {
                    println!("No winner after {} turns", result.turns_played)
                }
                (None, reason) => println!("Game ended without a winner: {reason:?}"),
            }
        }
        Commands::Check { deck } => check_deck(&deck)?,
    }

    Ok(())
}

fn load_deck(game: &mut GameState, player: PlayerId, path: &Path) -> Result<()> {
    let deck = DeckLoader::load_from_file(path)
        .with_context(|| format!("failed to read deck {}", path.display()))?;
    game.load_deck(player, &deck)
        .with_context(|| format!("failed to build deck {}", path.display()))?;
    Ok(())
}

fn make_controller(
    kind: ControllerType,
    player: PlayerId,
    seed: Option<u64>,
) -> Box<dyn PlayerController> {
    match kind {
        ControllerType::Tui => Box::new(InteractiveController::stdio(player)),
        ControllerType::Random => match seed {
            Some(seed) => Box::new(RandomController::with_seed(player, seed)),
            None => Box::new(RandomController::new(player)),
        },
    }
}

fn check_deck(path: &Path) -> Result<()> {
    let deck = DeckLoader::load_from_file(path)
        .with_context(|| format!("failed to read deck {}", path.display()))?;

    let mut next = 0;
    let cards = CardFactory::build_deck(&deck, PlayerId::new(0), || {
        next += 1;
        mtg_duel::core::CardId::new(next)
    })
    .with_context(|| format!("failed to build deck {}", path.display()))?;

    println!("{} ({} cards)", path.display(), cards.len());
    for card in &cards {
        println!("  {card}");
    }
    Ok(())
}
