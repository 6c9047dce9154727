//! Game zones (Library, Hand, Battlefield, Graveyard)
//!
//! Each zone owns the cards it holds. Moving a card removes the value from one
//! zone and appends it to another, so a card can never be in two places.

use crate::core::{Card, CardId, PlayerId};
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Different zones where cards can exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Library,
    Hand,
    Battlefield,
    Graveyard,
}

impl Zone {
    pub const ALL: [Zone; 4] = [Zone::Library, Zone::Hand, Zone::Battlefield, Zone::Graveyard];
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Library => "library",
            Zone::Hand => "hand",
            Zone::Battlefield => "battlefield",
            Zone::Graveyard => "graveyard",
        };
        write!(f, "{name}")
    }
}

/// An ordered zone holding cards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardZone {
    pub zone_type: Zone,

    /// Player whose zone this is
    pub owner: PlayerId,

    /// The last card is the top of a library
    pub cards: Vec<Card>,
}

impl CardZone {
    pub fn new(zone_type: Zone, owner: PlayerId) -> Self {
        CardZone {
            zone_type,
            owner,
            cards: Vec::new(),
        }
    }

    pub fn add(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Take a card out of the zone, keeping the order of the rest
    pub fn remove(&mut self, card_id: CardId) -> Option<Card> {
        let pos = self.position(card_id)?;
        Some(self.cards.remove(pos))
    }

    pub fn position(&self, card_id: CardId) -> Option<usize> {
        self.cards.iter().position(|c| c.id == card_id)
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.position(card_id).is_some()
    }

    pub fn get(&self, card_id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    pub fn get_mut(&mut self, card_id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == card_id)
    }

    /// First card with the given name
    pub fn find_by_name(&self, name: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.name.as_str() == name)
    }

    pub fn ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|c| c.id).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Card> {
        self.cards.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Card> {
        self.cards.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Draw from top (for Library)
    pub fn draw_top(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Shuffle the zone (for Library)
    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }

    /// Remove every card matching the predicate, keeping the order of both
    /// the removed and the remaining cards
    pub fn extract_where(&mut self, mut pred: impl FnMut(&Card) -> bool) -> Vec<Card> {
        let mut taken = Vec::new();
        let mut kept = Vec::with_capacity(self.cards.len());
        for card in self.cards.drain(..) {
            if pred(&card) {
                taken.push(card);
            } else {
                kept.push(card);
            }
        }
        self.cards = kept;
        taken
    }

    pub fn take_all(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }
}

/// Collection of all zones for a player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerZones {
    pub library: CardZone,
    pub hand: CardZone,
    pub battlefield: CardZone,
    pub graveyard: CardZone,
}

impl PlayerZones {
    pub fn new(player_id: PlayerId) -> Self {
        PlayerZones {
            library: CardZone::new(Zone::Library, player_id),
            hand: CardZone::new(Zone::Hand, player_id),
            battlefield: CardZone::new(Zone::Battlefield, player_id),
            graveyard: CardZone::new(Zone::Graveyard, player_id),
        }
    }

    pub fn get_zone(&self, zone: Zone) -> &CardZone {
        match zone {
            Zone::Library => &self.library,
            Zone::Hand => &self.hand,
            Zone::Battlefield => &self.battlefield,
            Zone::Graveyard => &self.graveyard,
        }
    }

    pub fn get_zone_mut(&mut self, zone: Zone) -> &mut CardZone {
        match zone {
            Zone::Library => &mut self.library,
            Zone::Hand => &mut self.hand,
            Zone::Battlefield => &mut self.battlefield,
            Zone::Graveyard => &mut self.graveyard,
        }
    }

    /// Move a card between two of this player's zones
    pub fn move_card(&mut self, card_id: CardId, from: Zone, to: Zone) -> Result<()> {
        let card = self
            .get_zone_mut(from)
            .remove(card_id)
            .ok_or_else(|| MtgError::CardNotFound(format!("card {card_id} is not in the {from}")))?;
        self.get_zone_mut(to).add(card);
        Ok(())
    }

    /// Which zone currently holds the card
    pub fn find_card(&self, card_id: CardId) -> Option<Zone> {
        Zone::ALL
            .into_iter()
            .find(|&zone| self.get_zone(zone).contains(card_id))
    }

    pub fn total_cards(&self) -> usize {
        Zone::ALL.iter().map(|&z| self.get_zone(z).len()).sum()
    }
}
