//! Card factory: turns deck attributes into game cards

use crate::core::{
    Card, CardId, CardKind, CardType, Color, Creature, Effect, Keyword, Land, ManaCost, PlayerId,
    Spell, Subtype,
};
use crate::loader::deck::{CardAttributes, DeckData};
use crate::{MtgError, Result};
use nom::{
    bytes::complete::take_until,
    character::complete::{char, digit1, multispace0},
    combinator::{map_res, opt, recognize},
    sequence::{pair, preceded, tuple},
    IResult,
};

/// Integer inside the first `(...)` of an effect string
fn effect_argument(input: &str) -> IResult<&str, i64> {
    preceded(
        tuple((take_until("("), char('('), multispace0)),
        map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<i64>),
    )(input)
}

/// Parse an effect description such as `damage_target(3)`
///
/// Known names are matched as substrings, in a fixed order, so `draw` also
/// matches `draw_cards(2)`. Anything unrecognized, or a known name without a
/// usable argument, becomes [`Effect::NoOp`].
pub fn parse_effect(description: &str) -> Effect {
    let argument = || effect_argument(description).ok().map(|(_, n)| n);
    let amount = || argument().and_then(|n| i32::try_from(n).ok());
    let count = || argument().and_then(|n| u32::try_from(n).ok());

    let effect = if description.contains("damage_target") {
        amount().map(Effect::DealDamage)
    } else if description.contains("discard_opponent") {
        count().map(Effect::Discard)
    } else if description.contains("draw") {
        count().map(Effect::Draw)
    } else if description.contains("damage_opponent") {
        amount().map(Effect::DealDamage)
    } else {
        None
    };
    effect.unwrap_or(Effect::NoOp)
}

/// Builds cards from their deck attributes
pub struct CardFactory;

impl CardFactory {
    /// Build one card
    ///
    /// Required keys depend on `Type`:
    /// - land: Name, Type, Subtype, Colors
    /// - instant / sorcery: Name, Type, ManaCost, Effect
    /// - creature: Name, Type, Subtype, ManaCost, Power, Toughness (Ability and Effect optional)
    pub fn build(id: CardId, owner: PlayerId, attrs: &CardAttributes) -> Result<Card> {
        let name = attrs.require("Name")?;
        let type_name = attrs.require("Type")?;
        let card_type = CardType::from_name(type_name).ok_or_else(|| {
            MtgError::InvalidCardFormat(format!("{name}: unknown card type '{type_name}'"))
        })?;

        let kind = match card_type {
            CardType::Land => CardKind::Land(Land {
                subtype: Subtype::new(attrs.require("Subtype")?),
                produces: Color::parse(attrs.require("Colors")?)?,
            }),
            CardType::Instant => CardKind::Instant(Self::spell(attrs, true)?),
            CardType::Sorcery => CardKind::Sorcery(Self::spell(attrs, true)?),
            CardType::Creature => {
                let subtype = Subtype::new(attrs.require("Subtype")?);
                let spell = Self::spell(attrs, false)?;
                let power = Self::stat(attrs, "Power")?;
                let toughness = Self::stat(attrs, "Toughness")?;
                let mut creature = Creature::new(spell, subtype, power, toughness);
                if let Some(abilities) = attrs.get("Ability") {
                    creature.abilities = Keyword::parse_list(abilities);
                }
                CardKind::Creature(creature)
            }
        };

        Ok(Card::new(id, name, owner, kind))
    }

    /// Build every card of a deck, in file order
    ///
    /// The first bad card fails the whole deck.
    pub fn build_deck(
        deck: &DeckData,
        owner: PlayerId,
        mut next_id: impl FnMut() -> CardId,
    ) -> Result<Vec<Card>> {
        deck.cards
            .iter()
            .map(|attrs| Self::build(next_id(), owner, attrs))
            .collect()
    }

    fn spell(attrs: &CardAttributes, effect_required: bool) -> Result<Spell> {
        let cost = ManaCost::parse(attrs.require("ManaCost")?)?;
        let effect = if effect_required {
            Some(attrs.require("Effect")?)
        } else {
            attrs.get("Effect")
        };
        let mut spell = Spell::new(cost);
        if let Some(description) = effect {
            spell.effects.push(parse_effect(description));
        }
        Ok(spell)
    }

    fn stat(attrs: &CardAttributes, key: &'static str) -> Result<i32> {
        let raw = attrs.require(key)?;
        raw.trim().parse().map_err(|_| {
            MtgError::InvalidCardFormat(format!("{}: {key} '{raw}' is not a number", attrs.label()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> CardAttributes {
        let mut a = CardAttributes::new("test");
        for (k, v) in pairs {
            a.insert(*k, *v);
        }
        a
    }

    #[test]
    fn test_parse_effect_names() {
        assert_eq!(parse_effect("damage_target(3)"), Effect::DealDamage(3));
        assert_eq!(parse_effect("damage_opponent(2)"), Effect::DealDamage(2));
        assert_eq!(parse_effect("discard_opponent(1)"), Effect::Discard(1));
        assert_eq!(parse_effect("draw(2)"), Effect::Draw(2));
        assert_eq!(parse_effect("gain_life(4)"), Effect::NoOp);
        assert_eq!(parse_effect(""), Effect::NoOp);
    }

    #[test]
    fn test_parse_effect_bad_argument_is_noop() {
        assert_eq!(parse_effect("draw(x)"), Effect::NoOp);
        assert_eq!(parse_effect("damage_target"), Effect::NoOp);
        assert_eq!(parse_effect("draw(-1)"), Effect::NoOp);
    }

    #[test]
    fn test_parse_effect_match_order() {
        // "damage_target" is checked before "draw"
        assert_eq!(parse_effect("damage_target_draw(5)"), Effect::DealDamage(5));
        assert_eq!(parse_effect("damage_target( 4)"), Effect::DealDamage(4));
    }

    #[test]
    fn test_build_land() {
        let card = CardFactory::build(
            CardId::new(1),
            PlayerId::new(0),
            &attrs(&[
                ("Name", "Mountain"),
                ("Type", "land"),
                ("Subtype", "Mountain"),
                ("Colors", "R"),
            ]),
        )
        .unwrap();
        assert_eq!(card.as_land().unwrap().produces, Color::Red);
    }

    #[test]
    fn test_build_creature_with_abilities() {
        let card = CardFactory::build(
            CardId::new(2),
            PlayerId::new(0),
            &attrs(&[
                ("Name", "Goblin Guide"),
                ("Type", "creature"),
                ("Subtype", "Goblin"),
                ("ManaCost", "R"),
                ("Power", "2"),
                ("Toughness", "2"),
                ("Ability", "Haste"),
            ]),
        )
        .unwrap();
        let creature = card.as_creature().unwrap();
        assert_eq!(creature.power, 2);
        assert!(creature.has_keyword(Keyword::Haste));
        assert!(creature.spell.effects.is_empty());
    }

    #[test]
    fn test_build_instant_requires_effect() {
        let err = CardFactory::build(
            CardId::new(3),
            PlayerId::new(0),
            &attrs(&[("Name", "Shock"), ("Type", "instant"), ("ManaCost", "R")]),
        )
        .unwrap_err();
        assert!(matches!(err, MtgError::MissingAttribute { key: "Effect", .. }));
    }

    #[test]
    fn test_build_rejects_bad_stats_and_types() {
        let err = CardFactory::build(
            CardId::new(4),
            PlayerId::new(0),
            &attrs(&[
                ("Name", "Bear"),
                ("Type", "creature"),
                ("Subtype", "Bear"),
                ("ManaCost", "1G"),
                ("Power", "two"),
                ("Toughness", "2"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, MtgError::InvalidCardFormat(_)));

        let err = CardFactory::build(
            CardId::new(5),
            PlayerId::new(0),
            &attrs(&[("Name", "Ward"), ("Type", "enchantment")]),
        )
        .unwrap_err();
        assert!(matches!(err, MtgError::InvalidCardFormat(_)));
    }

    #[test]
    fn test_build_rejects_bad_mana_letters() {
        let err = CardFactory::build(
            CardId::new(6),
            PlayerId::new(0),
            &attrs(&[
                ("Name", "Odd"),
                ("Type", "sorcery"),
                ("ManaCost", "1X"),
                ("Effect", "draw(1)"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, MtgError::InvalidColor('X')));
    }

    #[test]
    fn test_build_deck_assigns_fresh_ids() {
        let mut deck = DeckData::default();
        for i in 0..3 {
            let mut a = attrs(&[
                ("Name", "Mountain"),
                ("Type", "land"),
                ("Subtype", "Mountain"),
                ("Colors", "R"),
            ]);
            a.section = format!("Mountain {i}");
            deck.cards.push(a);
        }
        let mut next = 10;
        let cards = CardFactory::build_deck(&deck, PlayerId::new(1), || {
            next += 1;
            CardId::new(next)
        })
        .unwrap();
        let ids: Vec<u32> = cards.iter().map(|c| c.id.as_u32()).collect();
        assert_eq!(ids, vec![11, 12, 13]);
        assert!(cards.iter().all(|c| c.owner == PlayerId::new(1)));
    }
}
