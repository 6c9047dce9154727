//! Core game types and entities

pub mod card;
pub mod effects;
pub mod entity;
pub mod mana;
pub mod player;
pub mod types;

pub use card::{Card, CardKind, CardType, Creature, Damageable, Land, Spell};
pub use effects::{Effect, Keyword, TargetRef, TargetToken};
pub use entity::{CardId, EntityId, GameEntity, PlayerId};
pub use mana::{Color, ManaCost, ManaPool};
pub use player::{DrawOutcome, Player};
pub use types::{CardName, PlayerName, Subtype};
