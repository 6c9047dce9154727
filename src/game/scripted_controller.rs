//! Scripted player controller for testing
//!
//! Replays queued decisions in order, one queue per decision type. When a
//! queue runs dry the controller falls back to the most passive choice.

use crate::core::{CardId, Effect, PlayerId};
use crate::game::controller::{GameStateView, PlayerAction, PlayerController};
use crate::MtgError;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// A controller that follows predetermined sequences of decisions
#[derive(Debug)]
pub struct ScriptedController {
    player_id: PlayerId,
    actions: VecDeque<PlayerAction>,
    mulligans: VecDeque<bool>,
    attackers: VecDeque<SmallVec<[CardId; 8]>>,
    blocks: VecDeque<SmallVec<[(CardId, CardId); 8]>>,
    blocker_orders: VecDeque<SmallVec<[CardId; 4]>>,
    discards: VecDeque<SmallVec<[CardId; 7]>>,
    targets: VecDeque<String>,
    /// Errors reported back by the engine, for assertions
    pub rejections: Vec<String>,
    pub game_result: Option<bool>,
}

impl ScriptedController {
    pub fn new(player_id: PlayerId) -> Self {
        ScriptedController {
            player_id,
            actions: VecDeque::new(),
            mulligans: VecDeque::new(),
            attackers: VecDeque::new(),
            blocks: VecDeque::new(),
            blocker_orders: VecDeque::new(),
            discards: VecDeque::new(),
            targets: VecDeque::new(),
            rejections: Vec::new(),
            game_result: None,
        }
    }

    /// Create a controller with a sequence of main-phase actions
    pub fn with_actions(player_id: PlayerId, actions: Vec<PlayerAction>) -> Self {
        let mut controller = Self::new(player_id);
        controller.actions.extend(actions);
        controller
    }

    pub fn push_action(&mut self, action: PlayerAction) {
        self.actions.push_back(action);
    }

    /// Queue console-style commands, e.g. `"tap Mountain"`
    ///
    /// Lines that do not decode are skipped.
    pub fn push_commands(&mut self, lines: &[&str]) {
        self.actions
            .extend(lines.iter().filter_map(|l| PlayerAction::decode(l)));
    }

    pub fn push_mulligans(&mut self, answers: &[bool]) {
        self.mulligans.extend(answers.iter().copied());
    }

    pub fn push_attackers(&mut self, attackers: &[CardId]) {
        self.attackers.push_back(attackers.into());
    }

    /// Queue one blocker declaration of (blocker, attacker) pairs
    pub fn push_blocks(&mut self, blocks: &[(CardId, CardId)]) {
        self.blocks.push_back(blocks.into());
    }

    pub fn push_blocker_order(&mut self, order: &[CardId]) {
        self.blocker_orders.push_back(order.into());
    }

    pub fn push_discard(&mut self, cards: &[CardId]) {
        self.discards.push_back(cards.into());
    }

    pub fn push_target(&mut self, target: impl Into<String>) {
        self.targets.push_back(target.into());
    }

    /// Whether every queued decision has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.actions.is_empty()
            && self.mulligans.is_empty()
            && self.attackers.is_empty()
            && self.blocks.is_empty()
            && self.blocker_orders.is_empty()
            && self.discards.is_empty()
            && self.targets.is_empty()
    }
}

impl PlayerController for ScriptedController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_mulligan(&mut self, _view: &GameStateView, _hand_size: usize) -> bool {
        self.mulligans.pop_front().unwrap_or(false)
    }

    fn choose_main_action(&mut self, _view: &GameStateView) -> PlayerAction {
        self.actions.pop_front().unwrap_or(PlayerAction::Pass)
    }

    fn choose_attackers(
        &mut self,
        _view: &GameStateView,
        _available_creatures: &[CardId],
    ) -> SmallVec<[CardId; 8]> {
        self.attackers.pop_front().unwrap_or_default()
    }

    fn choose_blockers(
        &mut self,
        _view: &GameStateView,
        _available_blockers: &[CardId],
        _attackers: &[CardId],
    ) -> SmallVec<[(CardId, CardId); 8]> {
        self.blocks.pop_front().unwrap_or_default()
    }

    fn choose_blocker_order(
        &mut self,
        _view: &GameStateView,
        _attacker: CardId,
        blockers: &[CardId],
    ) -> SmallVec<[CardId; 4]> {
        self.blocker_orders
            .pop_front()
            .unwrap_or_else(|| blockers.into())
    }

    fn choose_cards_to_discard(
        &mut self,
        _view: &GameStateView,
        hand: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 7]> {
        // Default: the first N cards in hand
        self.discards
            .pop_front()
            .unwrap_or_else(|| hand.iter().take(count).copied().collect())
    }

    fn choose_target(&mut self, _view: &GameStateView, _effect: &Effect) -> String {
        self.targets.pop_front().unwrap_or_else(|| "opp".to_string())
    }

    fn on_action_rejected(&mut self, _view: &GameStateView, error: &MtgError) {
        self.rejections.push(error.to_string());
    }

    fn on_game_end(&mut self, _view: &GameStateView, won: bool) {
        self.game_result = Some(won);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;

    #[test]
    fn test_scripted_controller_replays_then_passes() {
        let game = GameState::new_two_player("Alice", "Bob");
        let player_id = PlayerId::new(0);
        let mut controller = ScriptedController::with_actions(
            player_id,
            vec![PlayerAction::TapLand("Mountain".to_string())],
        );
        controller.push_commands(&["cast Shock", "dance", "pass"]);
        let view = GameStateView::new(&game, player_id);

        assert_eq!(
            controller.choose_main_action(&view),
            PlayerAction::TapLand("Mountain".to_string())
        );
        assert_eq!(
            controller.choose_main_action(&view),
            PlayerAction::PlayCard("Shock".to_string())
        );
        assert_eq!(controller.choose_main_action(&view), PlayerAction::Pass);
        assert!(controller.is_exhausted());
        assert_eq!(controller.choose_main_action(&view), PlayerAction::Pass);
    }

    #[test]
    fn test_defaults_when_exhausted() {
        let game = GameState::new_two_player("Alice", "Bob");
        let mut controller = ScriptedController::new(PlayerId::new(1));
        let view = GameStateView::new(&game, PlayerId::new(1));
        let cards = [CardId::new(5), CardId::new(6), CardId::new(7)];

        assert!(!controller.choose_mulligan(&view, 7));
        assert!(controller.choose_attackers(&view, &cards).is_empty());
        assert!(controller.choose_blockers(&view, &cards, &cards).is_empty());
        assert_eq!(
            controller.choose_blocker_order(&view, cards[0], &cards[1..]).as_slice(),
            &cards[1..]
        );
        assert_eq!(
            controller.choose_cards_to_discard(&view, &cards, 2).as_slice(),
            &cards[..2]
        );
        assert_eq!(controller.choose_target(&view, &Effect::DealDamage(1)), "opp");
    }
}
