//! Card and deck loaders
//!
//! Parsers for sectioned deck files and the factory that turns their
//! attributes into cards

pub mod card;
pub mod deck;

pub use card::{parse_effect, CardFactory};
pub use deck::{CardAttributes, DeckData, DeckLoader};
