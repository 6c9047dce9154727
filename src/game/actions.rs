//! Game actions and mechanics
//!
//! Main-phase actions, spell casting and effect resolution

use crate::core::{CardId, Effect, PlayerId, TargetRef};
use crate::game::{GameState, GameStateView, PlayerAction, PlayerController};
use crate::zones::Zone;
use crate::{MtgError, Result};
use smallvec::SmallVec;

impl GameState {
    /// Execute one main-phase action for `player_id`
    ///
    /// Rule violations come back as recoverable errors and leave the state
    /// unchanged, except that a spell whose effect fails partway keeps the
    /// effects already applied.
    pub fn execute_action(
        &mut self,
        player_id: PlayerId,
        action: &PlayerAction,
        own_ctrl: &mut dyn PlayerController,
        opp_ctrl: &mut dyn PlayerController,
    ) -> Result<()> {
        match action {
            PlayerAction::TapLand(name) => self.tap_land(player_id, name),
            PlayerAction::PlayCard(name) => self.cast_card(player_id, name, own_ctrl, opp_ctrl),
            PlayerAction::ShowHand | PlayerAction::ShowBattlefield | PlayerAction::ShowGraveyard => {
                Ok(())
            }
            PlayerAction::Pass => {
                let name = self.player_name(player_id);
                self.logger.verbose(&format!("{name} passes"));
                Ok(())
            }
            PlayerAction::Concede => {
                let player = self.get_player_mut(player_id)?;
                player.concede();
                let msg = format!("{} concedes", player.name);
                self.logger.normal(&msg);
                Ok(())
            }
        }
    }

    /// Tap an untapped land by name, adding its color to the pool
    pub fn tap_land(&mut self, player_id: PlayerId, land_name: &str) -> Result<()> {
        let player = self.get_player_mut(player_id)?;
        let color = player.tap_land(land_name)?;
        let msg = format!("{} taps {land_name} for {color}", player.name);
        self.logger.verbose(&msg);
        Ok(())
    }

    /// Play a land or cast a spell from hand by name
    ///
    /// Spells are checked for mana, then every target is chosen and resolved,
    /// and only then is the cost paid and the card moved. A bad target
    /// rejects the cast with hand and pool untouched.
    pub fn cast_card(
        &mut self,
        player_id: PlayerId,
        card_name: &str,
        own_ctrl: &mut dyn PlayerController,
        opp_ctrl: &mut dyn PlayerController,
    ) -> Result<()> {
        let idx = self.player_index(player_id)?;
        let player = &self.players[idx];
        let card = player
            .find_in_hand(card_name)
            .and_then(|id| player.zones.hand.get(id))
            .ok_or_else(|| {
                MtgError::CardNotFound(format!("no card named '{card_name}' in hand"))
            })?;
        let card_id = card.id;

        if card.is_land() {
            self.players[idx].play_land(card_id)?;
            let msg = format!("{} plays {card_name}", self.players[idx].name);
            self.logger.normal(&msg);
            return Ok(());
        }

        let is_creature = card.is_creature();
        let spell = card
            .spell()
            .cloned()
            .ok_or_else(|| MtgError::InvalidAction(format!("{card_name} cannot be cast")))?;

        let pool = self.players[idx].mana_pool;
        if !pool.can_pay(&spell.cost) {
            return Err(MtgError::InsufficientMana {
                cost: spell.cost.to_string(),
                pool: pool.to_string(),
            });
        }

        let mut targets: SmallVec<[Option<TargetRef>; 1]> = SmallVec::new();
        for effect in &spell.effects {
            if !effect.needs_target() {
                targets.push(None);
                continue;
            }
            let token = {
                let view = GameStateView::new(self, player_id);
                own_ctrl.choose_target(&view, effect)
            };
            let target = self.resolve_target(player_id, &token)?;
            check_target_kind(*effect, target)?;
            targets.push(Some(target));
        }

        let player = &mut self.players[idx];
        player.mana_pool.pay(&spell.cost)?;
        let destination = if is_creature {
            Zone::Battlefield
        } else {
            Zone::Graveyard
        };
        player.zones.move_card(card_id, Zone::Hand, destination)?;
        let msg = format!("{} casts {card_name}", player.name);
        self.logger.normal(&msg);

        for (effect, target) in spell.effects.iter().zip(targets) {
            if let Some(target) = target {
                self.apply_effect(*effect, target, own_ctrl, opp_ctrl)?;
            }
        }
        Ok(())
    }

    /// Apply one resolved effect
    pub fn apply_effect(
        &mut self,
        effect: Effect,
        target: TargetRef,
        own_ctrl: &mut dyn PlayerController,
        opp_ctrl: &mut dyn PlayerController,
    ) -> Result<()> {
        match (effect, target) {
            (Effect::NoOp, _) => Ok(()),
            (Effect::DealDamage(n), target) => self.damage_target(target, n),
            (Effect::Heal(n), target) => self.damage_target(target, -n),
            (Effect::Draw(n), TargetRef::Player(player_id)) => {
                self.draw_cards(player_id, n as usize)?;
                Ok(())
            }
            (Effect::Discard(n), TargetRef::Player(player_id)) => {
                let chooser: &mut dyn PlayerController = if own_ctrl.player_id() == player_id {
                    own_ctrl
                } else {
                    opp_ctrl
                };
                self.discard_cards(player_id, n as usize, chooser)?;
                Ok(())
            }
            (Effect::DestroyPermanent, TargetRef::Creature { controller, card }) => {
                self.destroy_permanent(controller, card)
            }
            (Effect::Draw(_) | Effect::Discard(_), TargetRef::Creature { .. })
            | (Effect::DestroyPermanent, TargetRef::Player(_)) => check_target_kind(effect, target),
        }
    }

    /// Make a player discard `count` cards of their controller's choice
    ///
    /// A count at or above the hand size discards the whole hand without
    /// asking. Invalid selections are rejected and asked again.
    pub fn discard_cards(
        &mut self,
        player_id: PlayerId,
        count: usize,
        ctrl: &mut dyn PlayerController,
    ) -> Result<usize> {
        let idx = self.player_index(player_id)?;
        if count == 0 {
            return Ok(0);
        }
        if count >= self.players[idx].zones.hand.len() {
            let discarded = self.players[idx].discard_hand();
            let msg = format!("{} discards their hand", self.players[idx].name);
            self.logger.normal(&msg);
            return Ok(discarded);
        }

        let hand: SmallVec<[CardId; 8]> = self.players[idx].zones.hand.ids().into();
        loop {
            let choice = {
                let view = GameStateView::new(self, player_id);
                ctrl.choose_cards_to_discard(&view, &hand, count)
            };
            let result = if choice.len() == count {
                self.players[idx].discard(&choice)
            } else {
                Err(MtgError::InvalidAction(format!(
                    "choose exactly {count} card(s) to discard, got {}",
                    choice.len()
                )))
            };
            match result {
                Ok(()) => {
                    let msg = format!("{} discards {count} card(s)", self.players[idx].name);
                    self.logger.normal(&msg);
                    return Ok(count);
                }
                Err(err) => {
                    let view = GameStateView::new(self, player_id);
                    self.logger.rejected(view.player_name(), &err.to_string());
                    ctrl.on_action_rejected(&view, &err);
                }
            }
        }
    }
}

/// Reject a target of the wrong kind for the effect
///
/// Draw and discard need a player; destroy needs a creature.
fn check_target_kind(effect: Effect, target: TargetRef) -> Result<()> {
    match (effect, target) {
        (Effect::Draw(_) | Effect::Discard(_), TargetRef::Creature { .. }) => Err(
            MtgError::InvalidTarget(format!("{} needs a player target", effect.name())),
        ),
        (Effect::DestroyPermanent, TargetRef::Player(_)) => Err(MtgError::InvalidTarget(
            "destroy_permanent needs a creature target".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Card, CardKind, Color, Creature, Land, ManaCost, Spell, Subtype};
    use crate::game::ScriptedController;

    fn add_to_hand(game: &mut GameState, owner: PlayerId, name: &str, kind: CardKind) -> CardId {
        let id = game.next_card_id();
        let card = Card::new(id, name, owner, kind);
        game.get_player_mut(owner).unwrap().zones.hand.add(card);
        id
    }

    fn mountain() -> CardKind {
        CardKind::Land(Land {
            subtype: Subtype::new("Mountain"),
            produces: Color::Red,
        })
    }

    fn shock() -> CardKind {
        CardKind::Instant(Spell::new(ManaCost::parse("R").unwrap()).with_effect(Effect::DealDamage(2)))
    }

    fn setup() -> (GameState, ScriptedController, ScriptedController) {
        let mut game = GameState::new_two_player("Alice", "Bob");
        game.logger.enable_capture();
        let alice = ScriptedController::new(PlayerId::new(0));
        let bob = ScriptedController::new(PlayerId::new(1));
        (game, alice, bob)
    }

    #[test]
    fn test_play_land_once_per_turn() {
        let (mut game, mut alice, mut bob) = setup();
        let p0 = PlayerId::new(0);
        add_to_hand(&mut game, p0, "Mountain", mountain());
        add_to_hand(&mut game, p0, "Mountain", mountain());

        game.cast_card(p0, "Mountain", &mut alice, &mut bob).unwrap();
        let err = game.cast_card(p0, "Mountain", &mut alice, &mut bob).unwrap_err();
        assert!(matches!(err, MtgError::LandAlreadyPlayed));
        assert_eq!(game.players[0].zones.battlefield.len(), 1);
        assert_eq!(game.players[0].zones.hand.len(), 1);
    }

    #[test]
    fn test_cast_without_mana_is_rejected() {
        let (mut game, mut alice, mut bob) = setup();
        let p0 = PlayerId::new(0);
        let shock_id = add_to_hand(&mut game, p0, "Shock", shock());

        let err = game.cast_card(p0, "Shock", &mut alice, &mut bob).unwrap_err();
        assert!(matches!(err, MtgError::InsufficientMana { .. }));
        assert!(game.players[0].zones.hand.contains(shock_id));
    }

    #[test]
    fn test_cast_shock_at_opponent() {
        let (mut game, mut alice, mut bob) = setup();
        let p0 = PlayerId::new(0);
        let shock_id = add_to_hand(&mut game, p0, "Shock", shock());
        game.players[0].mana_pool.add_color(Color::Red);
        game.players[0].mana_pool.add_color(Color::Green);
        alice.push_target("opp");

        game.cast_card(p0, "Shock", &mut alice, &mut bob).unwrap();
        assert_eq!(game.players[1].life, 18);
        assert!(game.players[0].zones.graveyard.contains(shock_id));
        // Overpayment is lost
        assert!(game.players[0].mana_pool.is_empty());
    }

    #[test]
    fn test_bad_target_leaves_hand_and_pool() {
        let (mut game, mut alice, mut bob) = setup();
        let p0 = PlayerId::new(0);
        let shock_id = add_to_hand(&mut game, p0, "Shock", shock());
        game.players[0].mana_pool.add_color(Color::Red);
        alice.push_target("opp-Nobody");

        let err = game.cast_card(p0, "Shock", &mut alice, &mut bob).unwrap_err();
        assert!(matches!(err, MtgError::TargetNotFound(_)));
        assert!(game.players[0].zones.hand.contains(shock_id));
        assert_eq!(game.players[0].mana_pool.amount(Color::Red), 1);
        assert_eq!(game.players[1].life, 20);
    }

    #[test]
    fn test_creature_enters_sick() {
        let (mut game, mut alice, mut bob) = setup();
        let p0 = PlayerId::new(0);
        let spell = Spell::new(ManaCost::parse("R").unwrap());
        let goblin = add_to_hand(
            &mut game,
            p0,
            "Goblin",
            CardKind::Creature(Creature::new(spell, Subtype::new("Goblin"), 1, 1)),
        );
        game.players[0].mana_pool.add_color(Color::Red);

        game.cast_card(p0, "Goblin", &mut alice, &mut bob).unwrap();
        let card = game.players[0].zones.battlefield.get(goblin).unwrap();
        assert!(card.as_creature().unwrap().summoning_sick);
        assert!(game.available_attackers().is_empty());
    }

    #[test]
    fn test_draw_on_creature_is_invalid() {
        let (mut game, mut alice, mut bob) = setup();
        let target = TargetRef::Creature {
            controller: PlayerId::new(1),
            card: CardId::new(99),
        };
        let err = game
            .apply_effect(Effect::Draw(1), target, &mut alice, &mut bob)
            .unwrap_err();
        assert!(matches!(err, MtgError::InvalidTarget(_)));

        let err = game
            .apply_effect(
                Effect::DestroyPermanent,
                TargetRef::Player(PlayerId::new(1)),
                &mut alice,
                &mut bob,
            )
            .unwrap_err();
        assert!(matches!(err, MtgError::InvalidTarget(_)));
    }

    #[test]
    fn test_discard_is_chosen_by_target_player() {
        let (mut game, mut alice, mut bob) = setup();
        let p1 = PlayerId::new(1);
        let a = add_to_hand(&mut game, p1, "Mountain", mountain());
        let b = add_to_hand(&mut game, p1, "Shock", shock());
        bob.push_discard(&[b]);

        game.apply_effect(Effect::Discard(1), TargetRef::Player(p1), &mut alice, &mut bob)
            .unwrap();
        assert_eq!(game.players[1].zones.hand.ids(), vec![a]);
        assert_eq!(game.players[1].zones.graveyard.ids(), vec![b]);
    }

    #[test]
    fn test_discard_more_than_hand_takes_all() {
        let (mut game, mut alice, mut bob) = setup();
        let p1 = PlayerId::new(1);
        add_to_hand(&mut game, p1, "Mountain", mountain());
        add_to_hand(&mut game, p1, "Shock", shock());

        game.apply_effect(Effect::Discard(5), TargetRef::Player(p1), &mut alice, &mut bob)
            .unwrap();
        assert!(game.players[1].zones.hand.is_empty());
        assert_eq!(game.players[1].zones.graveyard.len(), 2);
    }

    #[test]
    fn test_concede_drops_life() {
        let (mut game, mut alice, mut bob) = setup();
        game.execute_action(PlayerId::new(0), &PlayerAction::Concede, &mut alice, &mut bob)
            .unwrap();
        assert!(game.players[0].conceded);
        assert!(game.check_ended());
    }

    fn put_creature(game: &mut GameState, owner: PlayerId, name: &str, toughness: i32) -> CardId {
        let id = game.next_card_id();
        let creature = Creature::new(Spell::new(ManaCost::new()), Subtype::new("Test"), 2, toughness);
        let card = Card::new(id, name, owner, CardKind::Creature(creature));
        game.get_player_mut(owner).unwrap().zones.battlefield.add(card);
        id
    }

    #[test]
    fn test_wrong_target_kind_leaves_hand_and_pool() {
        let (mut game, mut alice, mut bob) = setup();
        let p0 = PlayerId::new(0);
        put_creature(&mut game, PlayerId::new(1), "Goblin", 1);
        let divination = add_to_hand(
            &mut game,
            p0,
            "Divination",
            CardKind::Sorcery(Spell::new(ManaCost::parse("R").unwrap()).with_effect(Effect::Draw(2))),
        );
        game.players[0].mana_pool.add_color(Color::Red);
        alice.push_target("opp-Goblin");

        let err = game.cast_card(p0, "Divination", &mut alice, &mut bob).unwrap_err();
        assert!(matches!(err, MtgError::InvalidTarget(_)));
        assert!(err.is_recoverable());
        assert!(game.players[0].zones.hand.contains(divination));
        assert!(game.players[0].zones.graveyard.is_empty());
        assert_eq!(game.players[0].mana_pool.amount(Color::Red), 1);
    }

    #[test]
    fn test_destroy_aimed_at_player_is_rejected_before_paying() {
        let (mut game, mut alice, mut bob) = setup();
        let p0 = PlayerId::new(0);
        let murder = add_to_hand(
            &mut game,
            p0,
            "Murder",
            CardKind::Instant(
                Spell::new(ManaCost::parse("R").unwrap()).with_effect(Effect::DestroyPermanent),
            ),
        );
        game.players[0].mana_pool.add_color(Color::Red);
        alice.push_target("opp");

        let err = game.cast_card(p0, "Murder", &mut alice, &mut bob).unwrap_err();
        assert!(matches!(err, MtgError::InvalidTarget(_)));
        assert!(game.players[0].zones.hand.contains(murder));
        assert_eq!(game.players[0].mana_pool.amount(Color::Red), 1);
    }

    #[test]
    fn test_heal_player_and_creature() {
        let (mut game, mut alice, mut bob) = setup();
        let p1 = PlayerId::new(1);
        let wall = put_creature(&mut game, p1, "Wall", 4);
        game.players[1].life = 15;

        game.apply_effect(Effect::Heal(3), TargetRef::Player(p1), &mut alice, &mut bob)
            .unwrap();
        assert_eq!(game.players[1].life, 18);

        let target = TargetRef::Creature {
            controller: p1,
            card: wall,
        };
        game.apply_effect(Effect::Heal(3), target, &mut alice, &mut bob)
            .unwrap();
        let health = |game: &GameState| {
            game.players[1]
                .zones
                .battlefield
                .get(wall)
                .and_then(|c| c.as_creature())
                .map(|c| c.health)
        };
        // Healing may go above toughness until the End phase
        assert_eq!(health(&game), Some(7));

        game.end_of_turn_cleanup();
        assert_eq!(health(&game), Some(4));
    }
}

