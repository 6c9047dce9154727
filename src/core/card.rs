//! Card types and definitions

use crate::core::{CardId, CardName, Color, Effect, GameEntity, Keyword, ManaCost, PlayerId, Subtype};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Card type tag as written in deck files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Land,
    Instant,
    Sorcery,
    Creature,
}

impl CardType {
    /// Parse a `Type` attribute (case-insensitive)
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "land" => Some(CardType::Land),
            "instant" => Some(CardType::Instant),
            "sorcery" => Some(CardType::Sorcery),
            "creature" => Some(CardType::Creature),
            _ => None,
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CardType::Land => "land",
            CardType::Instant => "instant",
            CardType::Sorcery => "sorcery",
            CardType::Creature => "creature",
        };
        write!(f, "{name}")
    }
}

/// Something that can be dealt damage: players and creatures
pub trait Damageable {
    /// Deal damage; negative amounts heal
    fn take_damage(&mut self, amount: i32);

    fn damageable_name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Land {
    pub subtype: Subtype,
    /// Color added to the pool when tapped
    pub produces: Color,
}

/// Castable part shared by instants, sorceries and creatures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub cost: ManaCost,
    /// Applied in order on resolution
    pub effects: SmallVec<[Effect; 1]>,
}

impl Spell {
    pub fn new(cost: ManaCost) -> Self {
        Spell {
            cost,
            effects: SmallVec::new(),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub spell: Spell,
    pub subtype: Subtype,
    pub power: i32,
    pub toughness: i32,
    /// Current health; restored to toughness at end of turn
    pub health: i32,
    pub summoning_sick: bool,
    pub dead: bool,
    pub abilities: SmallVec<[Keyword; 2]>,
}

impl Creature {
    pub fn new(spell: Spell, subtype: Subtype, power: i32, toughness: i32) -> Self {
        Creature {
            spell,
            subtype,
            power,
            toughness,
            health: toughness,
            summoning_sick: true,
            dead: false,
            abilities: SmallVec::new(),
        }
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.health -= amount;
        if self.health <= 0 {
            self.dead = true;
        }
    }

    pub fn heal(&mut self) {
        self.health = self.toughness;
    }

    pub fn is_dead(&self) -> bool {
        self.dead || self.health <= 0
    }

    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.abilities.contains(&keyword)
    }
}

/// Type-specific part of a card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    Land(Land),
    Instant(Spell),
    Sorcery(Spell),
    Creature(Creature),
}

/// Represents a card in the game
///
/// Every physical copy gets its own `CardId`, so two copies of the same card
/// are still distinguishable. `owner` only records attribution; the zone the
/// card sits in is what holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: CardName,
    pub owner: PlayerId,
    pub tapped: bool,
    pub kind: CardKind,
}

impl Card {
    pub fn new(id: CardId, name: impl Into<CardName>, owner: PlayerId, kind: CardKind) -> Self {
        Card {
            id,
            name: name.into(),
            owner,
            tapped: false,
            kind,
        }
    }

    pub fn card_type(&self) -> CardType {
        match self.kind {
            CardKind::Land(_) => CardType::Land,
            CardKind::Instant(_) => CardType::Instant,
            CardKind::Sorcery(_) => CardType::Sorcery,
            CardKind::Creature(_) => CardType::Creature,
        }
    }

    pub fn is_land(&self) -> bool {
        matches!(self.kind, CardKind::Land(_))
    }

    pub fn is_creature(&self) -> bool {
        matches!(self.kind, CardKind::Creature(_))
    }

    pub fn as_land(&self) -> Option<&Land> {
        match &self.kind {
            CardKind::Land(land) => Some(land),
            _ => None,
        }
    }

    pub fn as_creature(&self) -> Option<&Creature> {
        match &self.kind {
            CardKind::Creature(creature) => Some(creature),
            _ => None,
        }
    }

    pub fn as_creature_mut(&mut self) -> Option<&mut Creature> {
        match &mut self.kind {
            CardKind::Creature(creature) => Some(creature),
            _ => None,
        }
    }

    /// The castable part of the card, `None` for lands
    pub fn spell(&self) -> Option<&Spell> {
        match &self.kind {
            CardKind::Land(_) => None,
            CardKind::Instant(spell) | CardKind::Sorcery(spell) => Some(spell),
            CardKind::Creature(creature) => Some(&creature.spell),
        }
    }

    pub fn mana_cost(&self) -> Option<&ManaCost> {
        self.spell().map(|s| &s.cost)
    }

    pub fn tap(&mut self) {
        self.tapped = true;
    }

    pub fn untap(&mut self) {
        self.tapped = false;
    }

    /// Creature power, 0 for anything else
    pub fn power(&self) -> i32 {
        self.as_creature().map_or(0, |c| c.power)
    }

    /// Creature toughness, 0 for anything else
    pub fn toughness(&self) -> i32 {
        self.as_creature().map_or(0, |c| c.toughness)
    }

    pub fn is_dead_creature(&self) -> bool {
        self.as_creature().is_some_and(|c| c.is_dead())
    }
}

impl Damageable for Card {
    /// Only creatures track damage; other cards ignore it
    fn take_damage(&mut self, amount: i32) {
        if let Some(creature) = self.as_creature_mut() {
            creature.take_damage(amount);
        }
    }

    fn damageable_name(&self) -> &str {
        self.name.as_str()
    }
}

impl GameEntity<Card> for Card {
    fn id(&self) -> CardId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.card_type())?;
        match &self.kind {
            CardKind::Land(land) => write!(f, " ({})", land.produces)?,
            CardKind::Instant(spell) | CardKind::Sorcery(spell) => write!(f, " - {}", spell.cost)?,
            CardKind::Creature(c) => write!(
                f,
                " - {} - {}/{} ({} health)",
                c.spell.cost, c.power, c.toughness, c.health
            )?,
        }
        if self.tapped {
            write!(f, " [tapped]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bear(id: u32) -> Card {
        let spell = Spell::new(ManaCost::parse("1G").unwrap());
        Card::new(
            CardId::new(id),
            "Grizzly Bears",
            PlayerId::new(0),
            CardKind::Creature(Creature::new(spell, Subtype::new("Bear"), 2, 2)),
        )
    }

    #[test]
    fn test_new_creature_is_sick_and_healthy() {
        let card = bear(1);
        let creature = card.as_creature().unwrap();
        assert!(creature.summoning_sick);
        assert_eq!(creature.health, 2);
        assert!(!creature.dead);
        assert_eq!(card.card_type(), CardType::Creature);
    }

    #[test]
    fn test_damage_marks_dead_at_zero() {
        let mut card = bear(1);
        card.take_damage(1);
        assert!(!card.is_dead_creature());
        card.take_damage(1);
        assert!(card.is_dead_creature());
    }

    #[test]
    fn test_heal_restores_toughness() {
        let mut card = bear(1);
        card.take_damage(1);
        card.as_creature_mut().unwrap().heal();
        assert_eq!(card.as_creature().unwrap().health, 2);
    }

    #[test]
    fn test_negative_damage_heals() {
        let mut card = bear(1);
        card.take_damage(-3);
        assert_eq!(card.as_creature().unwrap().health, 5);
    }

    #[test]
    fn test_land_ignores_damage() {
        let mut land = Card::new(
            CardId::new(2),
            "Mountain",
            PlayerId::new(0),
            CardKind::Land(Land {
                subtype: Subtype::new("Mountain"),
                produces: Color::Red,
            }),
        );
        land.take_damage(5);
        assert!(!land.is_dead_creature());
        assert!(land.spell().is_none());
        assert_eq!(land.power(), 0);
    }

    #[test]
    fn test_copies_have_distinct_identity() {
        assert_ne!(bear(1), bear(2));
        assert_eq!(bear(1).name, bear(2).name);
    }

    #[test]
    fn test_card_type_names() {
        assert_eq!(CardType::from_name("Creature"), Some(CardType::Creature));
        assert_eq!(CardType::from_name("sorcery"), Some(CardType::Sorcery));
        assert_eq!(CardType::from_name("enchantment"), None);
    }
}
