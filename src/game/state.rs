//! Main game state structure

use crate::core::{
    Card, CardId, Damageable, DrawOutcome, Player, PlayerId, TargetRef, TargetToken,
};
use crate::game::{CombatState, GameLogger, TurnStructure};
use crate::loader::{CardFactory, DeckData};
use crate::zones::Zone;
use crate::{MtgError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

pub const STARTING_LIFE: i32 = 20;

/// Cards drawn at game start, and the hand size kept after the End phase
pub const STARTING_HAND_SIZE: usize = 7;

/// Life a player is forced to when drawing from a too-small library
pub const LIBRARY_EXHAUSTED_LIFE: i32 = -999_999_999;

/// Complete game state
///
/// Owns both players, and through them every card in the game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Player `i` always has `PlayerId::new(i)`
    pub players: [Player; 2],

    pub turn: TurnStructure,

    /// Attack and block declarations of the most recent combat
    pub combat: CombatState,

    /// Set once a life total drops to 0 or below; every step is skipped after that
    pub ended: bool,

    /// Random number generator for shuffles and dice (serializable for replay)
    ///
    /// Wrapped in RefCell so it can be used while the state is borrowed
    /// immutably.
    pub rng: RefCell<ChaCha12Rng>,

    /// Card ids continue after the player ids
    next_entity_id: u32,

    pub logger: GameLogger,
}

impl GameState {
    /// Create a new game with two players and no cards
    pub fn new_two_player(player1_name: impl Into<String>, player2_name: impl Into<String>) -> Self {
        Self::with_starting_life(player1_name, player2_name, STARTING_LIFE)
    }

    pub fn with_starting_life(
        player1_name: impl Into<String>,
        player2_name: impl Into<String>,
        starting_life: i32,
    ) -> Self {
        let player1 = Player::new(PlayerId::new(0), player1_name.into(), starting_life);
        let player2 = Player::new(PlayerId::new(1), player2_name.into(), starting_life);

        GameState {
            players: [player1, player2],
            turn: TurnStructure::new(0),
            combat: CombatState::new(),
            ended: false,
            rng: RefCell::new(ChaCha12Rng::seed_from_u64(0)),
            next_entity_id: 2,
            logger: GameLogger::new(),
        }
    }

    /// Set the RNG seed for deterministic gameplay
    pub fn seed_rng(&mut self, seed: u64) {
        *self.rng.borrow_mut() = ChaCha12Rng::seed_from_u64(seed);
    }

    pub fn next_card_id(&mut self) -> CardId {
        let id = CardId::new(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    pub fn player_index(&self, player_id: PlayerId) -> Result<usize> {
        let idx = player_id.as_u32() as usize;
        if idx < self.players.len() {
            Ok(idx)
        } else {
            Err(MtgError::InvalidAction(format!("unknown player {player_id}")))
        }
    }

    pub fn get_player(&self, player_id: PlayerId) -> Result<&Player> {
        let idx = self.player_index(player_id)?;
        Ok(&self.players[idx])
    }

    pub fn get_player_mut(&mut self, player_id: PlayerId) -> Result<&mut Player> {
        let idx = self.player_index(player_id)?;
        Ok(&mut self.players[idx])
    }

    pub fn opponent_of(&self, player_id: PlayerId) -> PlayerId {
        if player_id.as_u32() == 0 {
            PlayerId::new(1)
        } else {
            PlayerId::new(0)
        }
    }

    pub fn active_player(&self) -> &Player {
        &self.players[self.turn.active_player_idx]
    }

    pub fn non_active_player(&self) -> &Player {
        &self.players[self.turn.non_active_player_idx()]
    }

    pub fn player_name(&self, player_id: PlayerId) -> String {
        self.get_player(player_id)
            .map(|p| p.name.to_string())
            .unwrap_or_else(|_| format!("Player {player_id}"))
    }

    /// Find a card anywhere in the game
    pub fn find_card(&self, card_id: CardId) -> Option<(PlayerId, Zone, &Card)> {
        self.players.iter().find_map(|p| {
            let zone = p.zones.find_card(card_id)?;
            let card = p.zones.get_zone(zone).get(card_id)?;
            Some((p.id, zone, card))
        })
    }

    /// Build a deck and put it into the player's library, in file order
    pub fn load_deck(&mut self, player_id: PlayerId, deck: &DeckData) -> Result<usize> {
        let idx = self.player_index(player_id)?;
        let mut next = self.next_entity_id;
        let cards = CardFactory::build_deck(deck, player_id, || {
            let id = CardId::new(next);
            next += 1;
            id
        })?;
        self.next_entity_id = next;

        let count = cards.len();
        self.players[idx].zones.library.cards.extend(cards);
        Ok(count)
    }

    /// Shuffle a player's library using the game's RNG
    pub fn shuffle_library(&mut self, player_id: PlayerId) -> Result<()> {
        let idx = self.player_index(player_id)?;
        self.players[idx]
            .zones
            .library
            .shuffle(&mut *self.rng.borrow_mut());
        Ok(())
    }

    /// Roll one six-sided die
    pub fn roll_d6(&self) -> u32 {
        self.rng.borrow_mut().gen_range(1..=6)
    }

    /// Draw cards, logging the outcome
    pub fn draw_cards(&mut self, player_id: PlayerId, count: usize) -> Result<DrawOutcome> {
        let idx = self.player_index(player_id)?;
        let outcome = self.players[idx].draw(count);
        let name = &self.players[idx].name;
        match outcome {
            DrawOutcome::Drew(n) => self.logger.verbose(&format!("{name} draws {n} card(s)")),
            DrawOutcome::LibraryExhausted => self.logger.normal(&format!(
                "{name} tried to draw {count} card(s) from a library of {} and loses",
                self.players[idx].zones.library.len()
            )),
        }
        Ok(outcome)
    }

    /// Set `ended` if any life total is at or below zero
    pub fn check_ended(&mut self) -> bool {
        if self.players.iter().any(|p| p.has_lost()) {
            self.ended = true;
        }
        self.ended
    }

    /// Winner of an ended game
    ///
    /// The active player if still alive, otherwise the non-active player,
    /// even when both are at or below zero.
    pub fn winner(&self) -> PlayerId {
        if self.active_player().life > 0 {
            self.turn.active_player()
        } else {
            self.turn.non_active_player()
        }
    }

    /// Move every dead creature from both battlefields to its owner's graveyard
    ///
    /// Survivors keep their battlefield order. Running it twice in a row
    /// changes nothing the second time.
    pub fn sweep_dead(&mut self) -> usize {
        let mut dead: Vec<Card> = Vec::new();
        for player in self.players.iter_mut() {
            dead.extend(
                player
                    .zones
                    .battlefield
                    .extract_where(|c| c.is_dead_creature()),
            );
        }

        let count = dead.len();
        for card in dead {
            let owner = self.player_index(card.owner).unwrap_or(0);
            self.logger.normal(&format!("{} dies", card.name));
            self.players[owner].zones.graveyard.add(card);
        }
        count
    }

    /// Turn a typed target string into a concrete target for `caster`
    pub fn resolve_target(&self, caster: PlayerId, token: &str) -> Result<TargetRef> {
        let opponent = self.opponent_of(caster);
        let me = self.get_player(caster)?;
        let opp = self.get_player(opponent)?;

        let (controller, name) = match TargetToken::parse(token, me.name.as_str(), opp.name.as_str())? {
            TargetToken::Me => return Ok(TargetRef::Player(caster)),
            TargetToken::Opponent => return Ok(TargetRef::Player(opponent)),
            TargetToken::MyCreature(name) => (me, name),
            TargetToken::OpponentCreature(name) => (opp, name),
        };

        controller
            .zones
            .battlefield
            .iter()
            .find(|c| c.is_creature() && c.name.as_str() == name)
            .map(|c| TargetRef::Creature {
                controller: controller.id,
                card: c.id,
            })
            .ok_or_else(|| MtgError::TargetNotFound(token.trim().to_string()))
    }

    /// Deal damage to a resolved target; negative amounts heal
    pub fn damage_target(&mut self, target: TargetRef, amount: i32) -> Result<()> {
        match target {
            TargetRef::Player(player_id) => {
                let player = self.get_player_mut(player_id)?;
                player.take_damage(amount);
                let msg = format!("{} is dealt {amount} damage (life {})", player.name, player.life);
                self.logger.normal(&msg);
            }
            TargetRef::Creature { controller, card } => {
                let player = self.get_player_mut(controller)?;
                let creature = player
                    .zones
                    .battlefield
                    .get_mut(card)
                    .ok_or_else(|| MtgError::TargetNotFound(format!("creature {card}")))?;
                creature.take_damage(amount);
                let health = creature.as_creature().map_or(0, |c| c.health);
                let msg = format!("{} is dealt {amount} damage (health {health})", creature.name);
                self.logger.normal(&msg);
            }
        }
        Ok(())
    }

    /// Move a creature from the battlefield to its owner's graveyard
    pub fn destroy_permanent(&mut self, controller: PlayerId, card_id: CardId) -> Result<()> {
        let idx = self.player_index(controller)?;
        let card = self.players[idx]
            .zones
            .battlefield
            .remove(card_id)
            .ok_or_else(|| MtgError::TargetNotFound(format!("permanent {card_id}")))?;
        let owner = self.player_index(card.owner)?;
        self.logger.normal(&format!("{} is destroyed", card.name));
        self.players[owner].zones.graveyard.add(card);
        Ok(())
    }

    /// End phase bookkeeping that does not need a decision
    pub fn end_of_turn_cleanup(&mut self) {
        for player in self.players.iter_mut() {
            player.empty_mana_pool();
            player.heal_creatures();
        }
        let active = self.turn.active_player_idx;
        self.players[active].reset_lands_played();
    }

    /// Total number of cards across every zone of both players
    pub fn total_cards(&self) -> usize {
        self.players.iter().map(|p| p.zones.total_cards()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardKind, Creature, ManaCost, Spell, Subtype};

    fn creature(game: &mut GameState, owner: PlayerId, name: &str, p: i32, t: i32) -> CardId {
        let id = game.next_card_id();
        let spell = Spell::new(ManaCost::new());
        let card = Card::new(
            id,
            name,
            owner,
            CardKind::Creature(Creature::new(spell, Subtype::new("Test"), p, t)),
        );
        game.get_player_mut(owner).unwrap().zones.battlefield.add(card);
        id
    }

    #[test]
    fn test_new_game() {
        let game = GameState::new_two_player("Alice", "Bob");
        assert_eq!(game.players[0].life, STARTING_LIFE);
        assert_eq!(game.players[1].name.as_str(), "Bob");
        assert_eq!(game.opponent_of(PlayerId::new(0)), PlayerId::new(1));
        assert!(!game.ended);
    }

    #[test]
    fn test_card_ids_are_unique() {
        let mut game = GameState::new_two_player("Alice", "Bob");
        let a = game.next_card_id();
        let b = game.next_card_id();
        assert_ne!(a, b);
        // Player ids are never reused for cards
        assert!(a.as_u32() >= 2);
    }

    #[test]
    fn test_resolve_target_tokens() {
        let mut game = GameState::new_two_player("Alice", "Bob");
        let alice = PlayerId::new(0);
        let bob = PlayerId::new(1);
        let goblin = creature(&mut game, bob, "Goblin", 1, 1);

        assert_eq!(game.resolve_target(alice, "me").unwrap(), TargetRef::Player(alice));
        assert_eq!(game.resolve_target(alice, "Bob").unwrap(), TargetRef::Player(bob));
        assert_eq!(
            game.resolve_target(alice, "opp-Goblin").unwrap(),
            TargetRef::Creature {
                controller: bob,
                card: goblin
            }
        );
        assert!(matches!(
            game.resolve_target(alice, "me-Goblin"),
            Err(MtgError::TargetNotFound(_))
        ));
    }

    #[test]
    fn test_sweep_dead_is_idempotent() {
        let mut game = GameState::new_two_player("Alice", "Bob");
        let alice = PlayerId::new(0);
        let a = creature(&mut game, alice, "A", 1, 1);
        let b = creature(&mut game, alice, "B", 1, 1);
        let c = creature(&mut game, alice, "C", 1, 1);
        game.damage_target(TargetRef::Creature { controller: alice, card: b }, 1)
            .unwrap();

        assert_eq!(game.sweep_dead(), 1);
        assert_eq!(game.sweep_dead(), 0);
        assert_eq!(game.players[0].zones.battlefield.ids(), vec![a, c]);
        assert_eq!(game.players[0].zones.graveyard.ids(), vec![b]);
    }

    #[test]
    fn test_destroy_goes_to_owner_graveyard() {
        let mut game = GameState::new_two_player("Alice", "Bob");
        let bob = PlayerId::new(1);
        let goblin = creature(&mut game, bob, "Goblin", 1, 1);

        game.destroy_permanent(bob, goblin).unwrap();
        assert!(game.players[1].zones.battlefield.is_empty());
        assert_eq!(game.players[1].zones.graveyard.ids(), vec![goblin]);
        assert!(game.destroy_permanent(bob, goblin).is_err());
    }

    #[test]
    fn test_check_ended() {
        let mut game = GameState::new_two_player("Alice", "Bob");
        assert!(!game.check_ended());
        game.players[1].life = 0;
        assert!(game.check_ended());
    }

    #[test]
    fn test_roll_d6_range_and_seed() {
        let mut a = GameState::new_two_player("Alice", "Bob");
        let mut b = GameState::new_two_player("Alice", "Bob");
        a.seed_rng(7);
        b.seed_rng(7);
        for _ in 0..50 {
            let roll = a.roll_d6();
            assert!((1..=6).contains(&roll));
            assert_eq!(roll, b.roll_d6());
        }
    }

    #[test]
    fn test_state_serializes() {
        let game = GameState::new_two_player("Alice", "Bob");
        let json = serde_json::to_string(&game).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.players[0].name.as_str(), "Alice");
    }
}
