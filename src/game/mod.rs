//! Game state, turn structure and the decision interface

pub mod actions;
pub mod combat;
pub mod controller;
pub mod game_loop;
pub mod interactive_controller;
pub mod logger;
pub mod phase;
pub mod random_controller;
pub mod scripted_controller;
pub mod state;

pub use combat::{CombatHook, CombatState};
pub use controller::{GameStateView, PlayerAction, PlayerController};
pub use game_loop::{GameEndReason, GameLoop, GameResult, VerbosityLevel};
pub use interactive_controller::InteractiveController;
pub use logger::{GameLogger, LogEntry, OutputFormat, OutputMode};
pub use phase::{Step, TurnStructure};
pub use random_controller::RandomController;
pub use scripted_controller::ScriptedController;
pub use state::GameState;
