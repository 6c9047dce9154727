//! Player controller trait and game state view
//!
//! This module defines the interface between the game engine and player
//! controllers (AI, scripts or humans). The engine calls the controller when
//! a decision is needed, and the controller inspects a read-only view of the
//! game state to make its choice. Only one decision is ever outstanding.

use crate::core::{Card, CardId, Effect, ManaPool, Player, PlayerId};
use crate::game::{GameLogger, GameState, Step};
use crate::MtgError;
use smallvec::SmallVec;

/// Main-phase actions a player can take
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    /// Tap the first untapped land with this name for mana
    TapLand(String),

    /// Play a land or cast a spell from hand, by name
    PlayCard(String),

    /// Informational commands, they do not change the game
    ShowHand,
    ShowBattlefield,
    ShowGraveyard,

    /// End the main phase
    Pass,

    /// Give up the game
    Concede,
}

impl PlayerAction {
    /// Decode a console command line
    ///
    /// `play` and `cast` are synonyms. Unrecognized input yields `None`.
    pub fn decode(line: &str) -> Option<PlayerAction> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match (command, rest.is_empty()) {
            ("tap", false) => Some(PlayerAction::TapLand(rest.to_string())),
            ("play" | "cast", false) => Some(PlayerAction::PlayCard(rest.to_string())),
            ("hand", true) => Some(PlayerAction::ShowHand),
            ("battlefield", true) => Some(PlayerAction::ShowBattlefield),
            ("graveyard", true) => Some(PlayerAction::ShowGraveyard),
            ("pass", true) => Some(PlayerAction::Pass),
            ("concede", true) => Some(PlayerAction::Concede),
            _ => None,
        }
    }

    /// Whether this action ends the main phase
    pub fn ends_main_phase(&self) -> bool {
        matches!(self, PlayerAction::Pass | PlayerAction::Concede)
    }
}

/// Read-only view of game state for controllers
///
/// This provides access to game information without allowing mutation.
pub struct GameStateView<'a> {
    game: &'a GameState,
    player_id: PlayerId,
}

impl<'a> GameStateView<'a> {
    /// Create a new view of the game state from a player's perspective
    pub fn new(game: &'a GameState, player_id: PlayerId) -> Self {
        GameStateView { game, player_id }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn opponent_id(&self) -> PlayerId {
        self.game.opponent_of(self.player_id)
    }

    fn me(&self) -> &'a Player {
        &self.game.players[self.player_id.as_u32() as usize % 2]
    }

    fn opponent(&self) -> &'a Player {
        &self.game.players[self.opponent_id().as_u32() as usize % 2]
    }

    pub fn player_name(&self) -> &'a str {
        self.me().name.as_str()
    }

    pub fn opponent_name(&self) -> &'a str {
        self.opponent().name.as_str()
    }

    pub fn life(&self) -> i32 {
        self.me().life
    }

    pub fn opponent_life(&self) -> i32 {
        self.opponent().life
    }

    pub fn mana_pool(&self) -> &'a ManaPool {
        &self.me().mana_pool
    }

    pub fn can_play_land(&self) -> bool {
        self.me().can_play_land()
    }

    pub fn hand(&self) -> &'a [Card] {
        &self.me().zones.hand.cards
    }

    pub fn battlefield(&self) -> &'a [Card] {
        &self.me().zones.battlefield.cards
    }

    pub fn graveyard(&self) -> &'a [Card] {
        &self.me().zones.graveyard.cards
    }

    pub fn library_size(&self) -> usize {
        self.me().zones.library.len()
    }

    pub fn opponent_battlefield(&self) -> &'a [Card] {
        &self.opponent().zones.battlefield.cards
    }

    pub fn opponent_hand_size(&self) -> usize {
        self.opponent().zones.hand.len()
    }

    /// Look up a card anywhere in the game
    pub fn card(&self, card_id: CardId) -> Option<&'a Card> {
        self.game.find_card(card_id).map(|(_, _, card)| card)
    }

    pub fn card_name(&self, card_id: CardId) -> Option<&'a str> {
        self.card(card_id).map(|c| c.name.as_str())
    }

    pub fn turn_number(&self) -> u32 {
        self.game.turn.turn_number
    }

    pub fn current_step(&self) -> Step {
        self.game.turn.current_step
    }

    pub fn is_active_player(&self) -> bool {
        self.game.turn.active_player() == self.player_id
    }

    /// Game logger, for controllers that narrate their choices
    pub fn logger(&self) -> &'a GameLogger {
        &self.game.logger
    }
}

/// Decision provider for one player
///
/// Every choice the rules leave to a player goes through this trait. All
/// methods use slices for options and return SmallVec to avoid heap
/// allocation in the common case.
pub trait PlayerController {
    /// Get the player ID this controller is responsible for
    fn player_id(&self) -> PlayerId;

    /// Offered after drawing an opening hand of `hand_size` cards
    ///
    /// Return true to shuffle the hand back and draw one card fewer.
    fn choose_mulligan(&mut self, view: &GameStateView, hand_size: usize) -> bool;

    /// Next main-phase action; called until Pass or Concede
    fn choose_main_action(&mut self, view: &GameStateView) -> PlayerAction;

    /// Choose which creatures attack
    fn choose_attackers(
        &mut self,
        view: &GameStateView,
        available_creatures: &[CardId],
    ) -> SmallVec<[CardId; 8]>;

    /// Choose which creatures block which attackers
    ///
    /// Returns pairs of (blocker, attacker). A blocker may appear once.
    fn choose_blockers(
        &mut self,
        view: &GameStateView,
        available_blockers: &[CardId],
        attackers: &[CardId],
    ) -> SmallVec<[(CardId, CardId); 8]>;

    /// Order the blockers of one attacker for damage assignment
    ///
    /// Must return a permutation of `blockers`.
    fn choose_blocker_order(
        &mut self,
        view: &GameStateView,
        attacker: CardId,
        blockers: &[CardId],
    ) -> SmallVec<[CardId; 4]>;

    /// Choose `count` cards from `hand` to discard
    fn choose_cards_to_discard(
        &mut self,
        view: &GameStateView,
        hand: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 7]>;

    /// Target string for one effect of a spell being cast
    ///
    /// See [`crate::core::TargetToken`] for the grammar.
    fn choose_target(&mut self, view: &GameStateView, effect: &Effect) -> String;

    /// A decision was rejected by the rules; the engine will ask again
    fn on_action_rejected(&mut self, _view: &GameStateView, _error: &MtgError) {}

    /// Called once when the game ends
    fn on_game_end(&mut self, _view: &GameStateView, _won: bool) {}
}

/// Order two controllers as (active, non-active)
pub fn by_role<'c>(
    first: &'c mut dyn PlayerController,
    second: &'c mut dyn PlayerController,
    active: PlayerId,
) -> (
    &'c mut dyn PlayerController,
    &'c mut dyn PlayerController,
) {
    if second.player_id() == active {
        (second, first)
    } else {
        (first, second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_commands() {
        assert_eq!(
            PlayerAction::decode("tap Mountain"),
            Some(PlayerAction::TapLand("Mountain".to_string()))
        );
        assert_eq!(
            PlayerAction::decode("cast Lightning Bolt"),
            Some(PlayerAction::PlayCard("Lightning Bolt".to_string()))
        );
        assert_eq!(
            PlayerAction::decode("  play   Goblin Guide "),
            Some(PlayerAction::PlayCard("Goblin Guide".to_string()))
        );
        assert_eq!(PlayerAction::decode("hand"), Some(PlayerAction::ShowHand));
        assert_eq!(PlayerAction::decode("pass"), Some(PlayerAction::Pass));
        assert_eq!(PlayerAction::decode("concede"), Some(PlayerAction::Concede));
    }

    #[test]
    fn test_decode_ignores_unknown_input() {
        assert_eq!(PlayerAction::decode(""), None);
        assert_eq!(PlayerAction::decode("attack"), None);
        assert_eq!(PlayerAction::decode("tap"), None);
        assert_eq!(PlayerAction::decode("pass now"), None);
    }

    #[test]
    fn test_view_reads_own_and_opponent() {
        let mut game = GameState::new_two_player("Alice", "Bob");
        game.players[1].life = 13;
        let view = GameStateView::new(&game, PlayerId::new(0));

        assert_eq!(view.player_name(), "Alice");
        assert_eq!(view.opponent_name(), "Bob");
        assert_eq!(view.opponent_life(), 13);
        assert!(view.hand().is_empty());
        assert!(view.is_active_player());
    }
}
