//! Random AI controller
//!
//! Makes random but legal-looking choices from the options visible in the
//! game state view. Seeded for reproducible AI-vs-AI runs.

use crate::core::{CardId, Effect, PlayerId};
use crate::game::controller::{GameStateView, PlayerAction, PlayerController};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use smallvec::SmallVec;

/// A controller that makes random choices
pub struct RandomController {
    player_id: PlayerId,
    rng: ChaCha12Rng,
}

impl RandomController {
    /// Create a new random controller seeded from system entropy
    pub fn new(player_id: PlayerId) -> Self {
        RandomController {
            player_id,
            rng: ChaCha12Rng::from_entropy(),
        }
    }

    /// Create a random controller with a seeded RNG (for deterministic testing)
    pub fn with_seed(player_id: PlayerId, seed: u64) -> Self {
        RandomController {
            player_id,
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }

    fn random_creature_target(&mut self, view: &GameStateView) -> Option<String> {
        let names: SmallVec<[&str; 8]> = view
            .opponent_battlefield()
            .iter()
            .filter(|c| c.is_creature())
            .map(|c| c.name.as_str())
            .collect();
        names.choose(&mut self.rng).map(|name| format!("opp-{name}"))
    }
}

impl PlayerController for RandomController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_mulligan(&mut self, view: &GameStateView, hand_size: usize) -> bool {
        // Only consider it for a hand without lands
        hand_size > 4 && !view.hand().iter().any(|c| c.is_land()) && self.rng.gen_bool(0.5)
    }

    fn choose_main_action(&mut self, view: &GameStateView) -> PlayerAction {
        let mut options: Vec<PlayerAction> = vec![PlayerAction::Pass];

        for card in view.battlefield() {
            if card.is_land() && !card.tapped {
                options.push(PlayerAction::TapLand(card.name.to_string()));
            }
        }
        for card in view.hand() {
            let playable = if card.is_land() {
                view.can_play_land()
            } else {
                card.mana_cost()
                    .is_some_and(|cost| view.mana_pool().can_pay(cost))
            };
            if playable {
                options.push(PlayerAction::PlayCard(card.name.to_string()));
            }
        }

        let index = self.rng.gen_range(0..options.len());
        options.swap_remove(index)
    }

    fn choose_attackers(
        &mut self,
        _view: &GameStateView,
        available_creatures: &[CardId],
    ) -> SmallVec<[CardId; 8]> {
        // 50% chance each creature attacks
        available_creatures
            .iter()
            .copied()
            .filter(|_| self.rng.gen_bool(0.5))
            .collect()
    }

    fn choose_blockers(
        &mut self,
        _view: &GameStateView,
        available_blockers: &[CardId],
        attackers: &[CardId],
    ) -> SmallVec<[(CardId, CardId); 8]> {
        let mut blocks = SmallVec::new();
        if attackers.is_empty() {
            return blocks;
        }
        for &blocker in available_blockers {
            if self.rng.gen_bool(0.5) {
                let attacker = attackers[self.rng.gen_range(0..attackers.len())];
                blocks.push((blocker, attacker));
            }
        }
        blocks
    }

    fn choose_blocker_order(
        &mut self,
        _view: &GameStateView,
        _attacker: CardId,
        blockers: &[CardId],
    ) -> SmallVec<[CardId; 4]> {
        let mut order: SmallVec<[CardId; 4]> = blockers.into();
        order.shuffle(&mut self.rng);
        order
    }

    fn choose_cards_to_discard(
        &mut self,
        _view: &GameStateView,
        hand: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 7]> {
        hand.choose_multiple(&mut self.rng, count).copied().collect()
    }

    fn choose_target(&mut self, view: &GameStateView, effect: &Effect) -> String {
        match effect {
            Effect::Heal(_) | Effect::Draw(_) => "me".to_string(),
            Effect::Discard(_) => "opp".to_string(),
            Effect::DestroyPermanent => self
                .random_creature_target(view)
                .unwrap_or_else(|| "opp".to_string()),
            Effect::DealDamage(_) | Effect::NoOp => {
                if self.rng.gen_bool(0.5) {
                    if let Some(target) = self.random_creature_target(view) {
                        return target;
                    }
                }
                "opp".to_string()
            }
        }
    }
}
