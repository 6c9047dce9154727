//! MTG Duel - two-player turn-based card game engine
//!
//! Cards are built from sectioned deck files, live in per-player zones, and
//! move through a fixed Untap/Upkeep/Draw/Main/Combat/End turn cycle. Every
//! player decision goes through the [`game::PlayerController`] trait so games
//! can be driven from a console, a script, or an AI.

pub mod core;
pub mod error;
pub mod game;
pub mod loader;
pub mod zones;

pub use error::{MtgError, Result};
