//! Player representation

use crate::core::{CardId, Color, Damageable, GameEntity, ManaPool, PlayerId, PlayerName};
use crate::game::state::LIBRARY_EXHAUSTED_LIFE;
use crate::zones::{PlayerZones, Zone};
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};

/// What happened when a player tried to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Drew(usize),
    /// Not enough cards left; the player has lost
    LibraryExhausted,
}

/// Represents a player in the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,

    pub name: PlayerName,

    /// Life total (may go far below zero)
    pub life: i32,

    pub mana_pool: ManaPool,

    pub lands_played_this_turn: u8,

    /// Maximum lands per turn (usually 1)
    pub max_lands_per_turn: u8,

    /// Tried to draw from a library that was too small
    pub decked: bool,

    pub conceded: bool,

    pub zones: PlayerZones,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<PlayerName>, starting_life: i32) -> Self {
        Player {
            id,
            name: name.into(),
            life: starting_life,
            mana_pool: ManaPool::new(),
            lands_played_this_turn: 0,
            max_lands_per_turn: 1,
            decked: false,
            conceded: false,
            zones: PlayerZones::new(id),
        }
    }

    pub fn has_lost(&self) -> bool {
        self.life <= 0
    }

    pub fn can_play_land(&self) -> bool {
        self.lands_played_this_turn < self.max_lands_per_turn
    }

    pub fn reset_lands_played(&mut self) {
        self.lands_played_this_turn = 0;
    }

    pub fn empty_mana_pool(&mut self) {
        self.mana_pool.clear();
    }

    /// Draw `count` cards from the top of the library
    ///
    /// Asking for more cards than the library holds draws nothing and forces
    /// life down to [`LIBRARY_EXHAUSTED_LIFE`].
    pub fn draw(&mut self, count: usize) -> DrawOutcome {
        if count > self.zones.library.len() {
            self.life = LIBRARY_EXHAUSTED_LIFE;
            self.decked = true;
            return DrawOutcome::LibraryExhausted;
        }
        for _ in 0..count {
            if let Some(card) = self.zones.library.draw_top() {
                self.zones.hand.add(card);
            }
        }
        DrawOutcome::Drew(count)
    }

    /// Put the whole hand back into the library
    pub fn return_hand_to_library(&mut self) {
        let hand = self.zones.hand.take_all();
        self.zones.library.cards.extend(hand);
    }

    /// Move the given cards from hand to graveyard, in the given order
    ///
    /// Fails without moving anything if a card is not in hand or is listed twice.
    pub fn discard(&mut self, cards: &[CardId]) -> Result<()> {
        for (i, id) in cards.iter().enumerate() {
            if !self.zones.hand.contains(*id) || cards[..i].contains(id) {
                return Err(MtgError::CardNotFound(format!(
                    "card {id} cannot be discarded from {}'s hand",
                    self.name
                )));
            }
        }
        for &id in cards {
            self.zones.move_card(id, Zone::Hand, Zone::Graveyard)?;
        }
        Ok(())
    }

    /// Discard the entire hand
    pub fn discard_hand(&mut self) -> usize {
        let hand = self.zones.hand.take_all();
        let count = hand.len();
        self.zones.graveyard.cards.extend(hand);
        count
    }

    /// Tap the first untapped land with the given name for mana
    pub fn tap_land(&mut self, name: &str) -> Result<Color> {
        let land = self
            .zones
            .battlefield
            .iter_mut()
            .find(|c| c.name.as_str() == name && !c.tapped && c.is_land())
            .ok_or_else(|| MtgError::CardNotFound(format!("no untapped land named '{name}'")))?;

        let color = land
            .as_land()
            .map(|l| l.produces)
            .ok_or_else(|| MtgError::InvalidAction(format!("{name} is not a land")))?;
        land.tap();
        self.mana_pool.add_color(color);
        Ok(color)
    }

    /// Move a land from hand to battlefield, counting the land drop
    pub fn play_land(&mut self, card_id: CardId) -> Result<()> {
        if !self.can_play_land() {
            return Err(MtgError::LandAlreadyPlayed);
        }
        self.zones.move_card(card_id, Zone::Hand, Zone::Battlefield)?;
        self.lands_played_this_turn += 1;
        Ok(())
    }

    /// Untap step: untap everything and clear summoning sickness
    pub fn untap_all(&mut self) {
        for card in self.zones.battlefield.iter_mut() {
            card.untap();
            if let Some(creature) = card.as_creature_mut() {
                creature.summoning_sick = false;
            }
        }
    }

    /// Restore every creature's health to its toughness
    pub fn heal_creatures(&mut self) {
        for card in self.zones.battlefield.iter_mut() {
            if let Some(creature) = card.as_creature_mut() {
                creature.heal();
            }
        }
    }

    pub fn concede(&mut self) {
        self.conceded = true;
        self.life = self.life.min(0);
    }

    /// First card in hand with the given name
    pub fn find_in_hand(&self, name: &str) -> Option<CardId> {
        self.zones.hand.find_by_name(name).map(|c| c.id)
    }
}

impl Damageable for Player {
    fn take_damage(&mut self, amount: i32) {
        self.life = self.life.saturating_sub(amount);
    }

    fn damageable_name(&self) -> &str {
        self.name.as_str()
    }
}

impl GameEntity<Player> for Player {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}
