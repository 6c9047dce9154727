//! Spell effects, keyword abilities and effect targets

use crate::core::{CardId, PlayerId};
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// What a spell does when it resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Reduce a player's life or a creature's health
    DealDamage(i32),
    /// Negative damage
    Heal(i32),
    /// Target player draws cards
    Draw(u32),
    /// Target player discards cards of their choice
    Discard(u32),
    /// Send target creature to its owner's graveyard
    DestroyPermanent,
    /// Does nothing and never asks for a target
    NoOp,
}

impl Effect {
    /// Whether resolving this effect prompts for a target
    pub fn needs_target(&self) -> bool {
        !matches!(self, Effect::NoOp)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Effect::DealDamage(_) => "deal_damage",
            Effect::Heal(_) => "heal",
            Effect::Draw(_) => "draw",
            Effect::Discard(_) => "discard",
            Effect::DestroyPermanent => "destroy_permanent",
            Effect::NoOp => "nothing",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::DealDamage(n) | Effect::Heal(n) => write!(f, "{}({n})", self.name()),
            Effect::Draw(n) | Effect::Discard(n) => write!(f, "{}({n})", self.name()),
            Effect::DestroyPermanent | Effect::NoOp => write!(f, "{}", self.name()),
        }
    }
}

/// Creature keyword abilities
///
/// Keywords are carried on creatures so deck files round-trip, but nothing in
/// combat or resolution consults them yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Haste,
    Lifelink,
    Trample,
    Vigilance,
    Deathtouch,
    Flying,
    Reach,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "haste" => Some(Keyword::Haste),
            "lifelink" => Some(Keyword::Lifelink),
            "trample" => Some(Keyword::Trample),
            "vigilance" => Some(Keyword::Vigilance),
            "deathtouch" => Some(Keyword::Deathtouch),
            "flying" => Some(Keyword::Flying),
            "reach" => Some(Keyword::Reach),
            _ => None,
        }
    }

    /// Parse an `Ability` attribute such as "Flying, Haste"
    ///
    /// Unknown words are skipped.
    pub fn parse_list(s: &str) -> SmallVec<[Keyword; 2]> {
        s.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|w| !w.is_empty())
            .filter_map(Keyword::from_word)
            .collect()
    }
}

/// A resolved effect target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRef {
    Player(PlayerId),
    Creature { controller: PlayerId, card: CardId },
}

/// Parsed form of a target string typed by a player
///
/// Grammar:
/// - `me` or the caster's name: the caster
/// - `opp` or the opponent's name: the opponent
/// - `me-<name>` / `opp-<name>`: a creature with that name on that player's battlefield
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetToken {
    Me,
    Opponent,
    MyCreature(String),
    OpponentCreature(String),
}

impl TargetToken {
    pub fn parse(token: &str, my_name: &str, opponent_name: &str) -> Result<Self> {
        let token = token.trim();
        if token == "me" || token == my_name {
            return Ok(TargetToken::Me);
        }
        if token == "opp" || token == opponent_name {
            return Ok(TargetToken::Opponent);
        }

        match token.split_once('-') {
            Some(("me", name)) if !name.is_empty() => Ok(TargetToken::MyCreature(name.to_string())),
            Some(("opp", name)) if !name.is_empty() => {
                Ok(TargetToken::OpponentCreature(name.to_string()))
            }
            _ => Err(MtgError::TargetNotFound(token.to_string())),
        }
    }
}
