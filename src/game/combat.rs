//! Combat system
//!
//! Handles declaring attackers, declaring blockers, and combat damage

use crate::core::{CardId, Damageable, PlayerId};
use crate::game::{GameState, GameStateView, PlayerController};
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Combat state for the current combat phase
///
/// Attackers and their blockers are kept in declaration order, which is the
/// order damage is resolved in.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CombatState {
    pub attackers: SmallVec<[CardId; 8]>,

    /// Attacker -> blockers, one entry per blocked attacker
    pub blocks: SmallVec<[(CardId, SmallVec<[CardId; 4]>); 8]>,

    /// Damage dealt to the defending player by the last resolution
    pub unblocked_damage: i32,
}

impl CombatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_attacker(&mut self, attacker: CardId) {
        if !self.attackers.contains(&attacker) {
            self.attackers.push(attacker);
        }
    }

    pub fn declare_blocker(&mut self, blocker: CardId, attacker: CardId) {
        match self.blocks.iter_mut().find(|(a, _)| *a == attacker) {
            Some((_, blockers)) => blockers.push(blocker),
            None => {
                let mut blockers = SmallVec::new();
                blockers.push(blocker);
                self.blocks.push((attacker, blockers));
            }
        }
    }

    pub fn is_attacking(&self, card_id: CardId) -> bool {
        self.attackers.contains(&card_id)
    }

    pub fn is_blocking(&self, card_id: CardId) -> bool {
        self.blocks.iter().any(|(_, b)| b.contains(&card_id))
    }

    pub fn is_blocked(&self, attacker: CardId) -> bool {
        !self.blockers_of(attacker).is_empty()
    }

    /// Blockers of an attacker, in declaration order
    pub fn blockers_of(&self, attacker: CardId) -> &[CardId] {
        self.blocks
            .iter()
            .find(|(a, _)| *a == attacker)
            .map_or(&[], |(_, b)| b.as_slice())
    }

    pub fn clear(&mut self) {
        self.attackers.clear();
        self.blocks.clear();
        self.unblocked_damage = 0;
    }
}

/// Extension point around combat damage
///
/// Hooks see the state with attackers tapped and blocks declared. The
/// engine's own rules never depend on them.
pub trait CombatHook {
    fn before_damage(&mut self, _game: &mut GameState) {}

    /// Called after damage is dealt, with the unblocked damage total
    fn after_damage(&mut self, _game: &mut GameState, _unblocked_damage: i32) {}
}

impl GameState {
    /// Untapped, non-sick creatures of the active player
    pub fn available_attackers(&self) -> SmallVec<[CardId; 8]> {
        self.active_player()
            .zones
            .battlefield
            .iter()
            .filter(|c| !c.tapped && c.as_creature().is_some_and(|cr| !cr.summoning_sick))
            .map(|c| c.id)
            .collect()
    }

    /// Untapped creatures of the non-active player
    pub fn available_blockers(&self) -> SmallVec<[CardId; 8]> {
        self.non_active_player()
            .zones
            .battlefield
            .iter()
            .filter(|c| !c.tapped && c.is_creature())
            .map(|c| c.id)
            .collect()
    }

    pub fn validate_attackers(&self, attackers: &[CardId]) -> Result<()> {
        let available = self.available_attackers();
        for (i, id) in attackers.iter().enumerate() {
            if !available.contains(id) {
                return Err(MtgError::InvalidAction(format!(
                    "card {id} is not an untapped creature that can attack"
                )));
            }
            if attackers[..i].contains(id) {
                return Err(MtgError::InvalidAction(format!(
                    "card {id} was declared as an attacker twice"
                )));
            }
        }
        Ok(())
    }

    /// Check a (blocker, attacker) assignment against the current attackers
    pub fn validate_blocks(&self, blocks: &[(CardId, CardId)]) -> Result<()> {
        let available = self.available_blockers();
        for (i, (blocker, attacker)) in blocks.iter().enumerate() {
            if !available.contains(blocker) {
                return Err(MtgError::InvalidAction(format!(
                    "card {blocker} is not an untapped creature that can block"
                )));
            }
            if blocks[..i].iter().any(|(b, _)| b == blocker) {
                return Err(MtgError::InvalidAction(format!(
                    "card {blocker} was assigned to block twice"
                )));
            }
            if !self.combat.is_attacking(*attacker) {
                return Err(MtgError::InvalidAction(format!(
                    "card {attacker} is not attacking"
                )));
            }
        }
        Ok(())
    }

    /// Resolve combat damage for every declared attacker
    ///
    /// Blocked attackers deal damage to their blockers (ordered by the
    /// attacking player when the blockers can absorb it all), blockers deal
    /// their combined power back. The unblocked total is applied to the
    /// defending player once, and returned.
    pub fn resolve_blocks(&mut self, attacker_ctrl: &mut dyn PlayerController) -> Result<i32> {
        let attacking_player = self.turn.active_player();
        let defending_player = self.turn.non_active_player();
        let attackers = self.combat.attackers.clone();
        let mut unblocked = 0;

        for attacker_id in attackers {
            let Some((power, toughness)) = self
                .get_player(attacking_player)?
                .zones
                .battlefield
                .get(attacker_id)
                .map(|c| (c.power(), c.toughness()))
            else {
                continue;
            };

            let blockers: SmallVec<[CardId; 4]> = self.combat.blockers_of(attacker_id).into();
            if blockers.is_empty() {
                unblocked += power;
                continue;
            }

            let defender = self.get_player(defending_player)?;
            let stats: SmallVec<[(i32, i32); 4]> = blockers
                .iter()
                .filter_map(|id| defender.zones.battlefield.get(*id))
                .map(|c| (c.power(), c.toughness()))
                .collect();
            let block_toughness: i32 = stats.iter().map(|(_, t)| t).sum();
            let block_power: i32 = stats.iter().map(|(p, _)| p).sum();

            if power >= block_toughness {
                for &blocker in &blockers {
                    self.damage_creature(defending_player, blocker, power)?;
                }
            } else if blockers.len() > 1 {
                let order = self.ask_blocker_order(attacker_ctrl, attacker_id, &blockers);
                let mut remaining = power;
                for blocker in order {
                    if remaining == 0 {
                        break;
                    }
                    let blocker_toughness = self
                        .get_player(defending_player)?
                        .zones
                        .battlefield
                        .get(blocker)
                        .map_or(0, |c| c.toughness());
                    if remaining >= blocker_toughness {
                        self.damage_creature(defending_player, blocker, blocker_toughness)?;
                        remaining -= blocker_toughness;
                    }
                }
            }

            if block_power >= toughness {
                self.damage_creature(attacking_player, attacker_id, block_power)?;
            }
        }

        self.combat.unblocked_damage = unblocked;
        if unblocked > 0 {
            let defender = self.get_player_mut(defending_player)?;
            defender.take_damage(unblocked);
            let msg = format!(
                "{} takes {unblocked} combat damage (life {})",
                defender.name, defender.life
            );
            self.logger.normal(&msg);
        }
        Ok(unblocked)
    }

    /// Ask for a blocker order until the answer is a permutation of `blockers`
    fn ask_blocker_order(
        &self,
        ctrl: &mut dyn PlayerController,
        attacker: CardId,
        blockers: &[CardId],
    ) -> SmallVec<[CardId; 4]> {
        let view = GameStateView::new(self, ctrl.player_id());
        loop {
            let order = ctrl.choose_blocker_order(&view, attacker, blockers);
            if is_valid_blocker_order(&order, blockers) {
                return order;
            }
            let err = MtgError::InvalidAction(format!(
                "blocker order must list each of the {} blockers exactly once",
                blockers.len()
            ));
            self.logger.rejected(view.player_name(), &err.to_string());
            ctrl.on_action_rejected(&view, &err);
        }
    }

    fn damage_creature(&mut self, controller: PlayerId, card_id: CardId, amount: i32) -> Result<()> {
        let player = self.get_player_mut(controller)?;
        if let Some(card) = player.zones.battlefield.get_mut(card_id) {
            card.take_damage(amount);
            let health = card.as_creature().map_or(0, |c| c.health);
            let msg = format!("{} takes {amount} damage (health {health})", card.name);
            self.logger.verbose(&msg);
        }
        Ok(())
    }
}

/// Whether `order` is a permutation of `blockers`
pub fn is_valid_blocker_order(order: &[CardId], blockers: &[CardId]) -> bool {
    if order.len() != blockers.len() {
        return false;
    }
    let mut a: SmallVec<[CardId; 4]> = order.into();
    let mut b: SmallVec<[CardId; 4]> = blockers.into();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}
