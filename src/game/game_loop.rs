//! Game loop implementation
//!
//! Manages game setup, the mulligan, turn progression and win detection

use crate::core::{CardId, PlayerId};
use crate::game::controller::{by_role, GameStateView, PlayerController};
use crate::game::phase::{Step, TurnStructure};
use crate::game::state::STARTING_HAND_SIZE;
use crate::game::{CombatHook, GameState};
use crate::{MtgError, Result};
use smallvec::SmallVec;

/// Verbosity level for game output
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum VerbosityLevel {
    /// Silent - no output during game
    Silent = 0,
    /// Minimal - only game outcome
    Minimal = 1,
    /// Normal - turns, steps, and key actions (default)
    #[default]
    Normal = 2,
    /// Verbose - all actions and state changes
    Verbose = 3,
}

/// Result of running a game to completion
#[derive(Debug, Clone)]
pub struct GameResult {
    /// Winner of the game (None if the turn limit was hit)
    pub winner: Option<PlayerId>,
    /// Total number of turns played
    pub turns_played: u32,
    /// Reason the game ended
    pub end_reason: GameEndReason,
}

/// Reason the game ended, naming the losing player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEndReason {
    /// Life dropped to 0 or less
    PlayerDeath(PlayerId),
    /// Tried to draw more cards than the library held
    Decking(PlayerId),
    Concession(PlayerId),
    /// Game reached maximum turn limit
    TurnLimit,
}

/// Game loop manager
///
/// Drives a [`GameState`] through its turns, asking the two controllers for
/// every decision.
pub struct GameLoop<'a> {
    /// The game state
    pub game: &'a mut GameState,
    /// Maximum turns before stopping without a winner
    max_turns: u32,
    /// Turn counter for the loop
    turns_elapsed: u32,
    combat_hook: Option<Box<dyn CombatHook + 'a>>,
}

impl<'a> GameLoop<'a> {
    /// Create a new game loop for the given game state
    pub fn new(game: &'a mut GameState) -> Self {
        GameLoop {
            game,
            max_turns: 1000,
            turns_elapsed: 0,
            combat_hook: None,
        }
    }

    /// Set maximum turns before the game is stopped
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set verbosity on the game's logger
    ///
    /// Controllers see the same logger through [`GameStateView::logger`].
    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.game.logger.set_verbosity(verbosity);
        self
    }

    /// Install a hook that runs around combat damage
    pub fn with_combat_hook(mut self, hook: impl CombatHook + 'a) -> Self {
        self.combat_hook = Some(Box::new(hook));
        self
    }

    pub fn turns_elapsed(&self) -> u32 {
        self.turns_elapsed
    }

    /// Run the game loop with the given player controllers
    ///
    /// Sets the game up, then runs turns until a player loses or the turn
    /// limit is reached.
    pub fn run_game(
        &mut self,
        controller1: &mut dyn PlayerController,
        controller2: &mut dyn PlayerController,
    ) -> Result<GameResult> {
        self.start_game(controller1, controller2)?;

        loop {
            if let Some(result) = self.run_turn_once(controller1, controller2)? {
                self.notify_game_end(controller1, controller2, result.winner);
                if let Some(winner) = result.winner {
                    let name = self.game.player_name(winner);
                    self.game.logger.minimal(&format!(
                        "{name} wins after {} turn(s)",
                        result.turns_played
                    ));
                }
                return Ok(result);
            }
        }
    }

    /// Roll for the first turn, shuffle, draw opening hands and offer mulligans
    pub fn start_game(
        &mut self,
        controller1: &mut dyn PlayerController,
        controller2: &mut dyn PlayerController,
    ) -> Result<()> {
        let first = self.roll_for_first_player();
        self.game.turn = TurnStructure::new(first);
        let name = self.game.player_name(self.game.turn.active_player());
        self.game.logger.normal(&format!("{name} goes first"));

        for idx in 0..self.game.players.len() {
            let player_id = self.game.players[idx].id;
            self.game.shuffle_library(player_id)?;
            self.game.draw_cards(player_id, STARTING_HAND_SIZE)?;
        }

        self.offer_mulligan(controller1)?;
        self.offer_mulligan(controller2)?;
        self.game.check_ended();
        Ok(())
    }

    /// Two d6 per player, higher total starts; ties roll again
    fn roll_for_first_player(&mut self) -> usize {
        loop {
            let first = self.game.roll_d6() + self.game.roll_d6();
            let second = self.game.roll_d6() + self.game.roll_d6();
            self.game.logger.verbose(&format!(
                "{} rolled {first}, {} rolled {second}",
                self.game.players[0].name, self.game.players[1].name
            ));
            if first != second {
                return if first > second { 0 } else { 1 };
            }
        }
    }

    /// Offer a mulligan on the current hand; returns the final hand size
    pub fn offer_mulligan(&mut self, ctrl: &mut dyn PlayerController) -> Result<usize> {
        let player_id = ctrl.player_id();
        let hand_size = self.game.get_player(player_id)?.zones.hand.len();
        if hand_size > 1 && self.ask_mulligan(ctrl, hand_size) {
            self.mulligan(ctrl, hand_size - 1)
        } else {
            Ok(hand_size)
        }
    }

    /// Shuffle the hand back, draw `cards`, and offer to go one lower
    ///
    /// At a single card the player is still asked, but the answer is ignored.
    pub fn mulligan(&mut self, ctrl: &mut dyn PlayerController, cards: usize) -> Result<usize> {
        let player_id = ctrl.player_id();
        let mut cards = cards;
        loop {
            let name = self.game.player_name(player_id);
            self.game.logger.normal(&format!("{name} mulligans to {cards}"));
            self.game.get_player_mut(player_id)?.return_hand_to_library();
            self.game.shuffle_library(player_id)?;
            self.game.draw_cards(player_id, cards)?;

            if cards <= 1 {
                let view = GameStateView::new(self.game, player_id);
                ctrl.choose_mulligan(&view, cards);
                self.game
                    .logger
                    .normal("You can't mulligan anymore, you have 1 card in your hand");
                return Ok(cards);
            }
            if !self.ask_mulligan(ctrl, cards) {
                return Ok(cards);
            }
            cards -= 1;
        }
    }

    fn ask_mulligan(&self, ctrl: &mut dyn PlayerController, hand_size: usize) -> bool {
        let view = GameStateView::new(self.game, ctrl.player_id());
        let wants = ctrl.choose_mulligan(&view, hand_size);
        if wants {
            view.logger()
                .controller_choice(view.player_name(), &format!("mulligan from {hand_size}"));
        }
        wants
    }

    fn notify_game_end(
        &self,
        controller1: &mut dyn PlayerController,
        controller2: &mut dyn PlayerController,
        winner: Option<PlayerId>,
    ) {
        let id1 = controller1.player_id();
        let id2 = controller2.player_id();
        controller1.on_game_end(&GameStateView::new(self.game, id1), winner == Some(id1));
        controller2.on_game_end(&GameStateView::new(self.game, id2), winner == Some(id2));
    }

    /// Run a single turn and check for game-ending conditions
    ///
    /// Returns:
    /// - `Ok(Some(GameResult))` if the game is over (a player lost or turn limit reached)
    /// - `Ok(None)` if the game should continue with another turn
    pub fn run_turn_once(
        &mut self,
        controller1: &mut dyn PlayerController,
        controller2: &mut dyn PlayerController,
    ) -> Result<Option<GameResult>> {
        if self.game.check_ended() {
            return Ok(Some(self.finished_result()));
        }
        if self.turns_elapsed >= self.max_turns {
            return Ok(Some(GameResult {
                winner: None,
                turns_played: self.turns_elapsed,
                end_reason: GameEndReason::TurnLimit,
            }));
        }

        self.run_turn(controller1, controller2)?;
        self.turns_elapsed += 1;

        if self.game.check_ended() {
            return Ok(Some(self.finished_result()));
        }
        Ok(None)
    }

    fn run_turn(
        &mut self,
        controller1: &mut dyn PlayerController,
        controller2: &mut dyn PlayerController,
    ) -> Result<()> {
        let active = self.game.active_player();
        let msg = format!(
            "Turn {}: {}'s turn ({} life, opponent {} life)",
            self.game.turn.turn_number,
            active.name,
            active.life,
            self.game.non_active_player().life
        );
        self.game.logger.normal(&msg);

        loop {
            let step = self.game.turn.current_step;
            self.execute_step(controller1, controller2)?;
            if step == Step::End || !self.game.turn.advance_step() {
                break;
            }
        }
        Ok(())
    }

    /// Execute the current step; does nothing once the game has ended
    pub fn execute_step(
        &mut self,
        controller1: &mut dyn PlayerController,
        controller2: &mut dyn PlayerController,
    ) -> Result<()> {
        if self.game.ended {
            return Ok(());
        }

        let step = self.game.turn.current_step;
        self.game.logger.verbose(&format!("--- {step} ---"));

        let active = self.game.turn.active_player();
        let (active_ctrl, other_ctrl) = by_role(controller1, controller2, active);

        match step {
            Step::Untap => {
                self.game.get_player_mut(active)?.untap_all();
                Ok(())
            }
            Step::Upkeep => Ok(()),
            Step::Draw => {
                self.game.draw_cards(active, 1)?;
                self.game.check_ended();
                Ok(())
            }
            Step::Main => self.main_phase(active_ctrl, other_ctrl),
            Step::Combat => self.combat_phase(active_ctrl, other_ctrl),
            Step::End => self.end_phase(active_ctrl),
        }
    }

    /// Ask for actions until the player passes, concedes, or someone is dead
    fn main_phase(
        &mut self,
        active_ctrl: &mut dyn PlayerController,
        other_ctrl: &mut dyn PlayerController,
    ) -> Result<()> {
        let active = active_ctrl.player_id();

        while !self.game.players.iter().any(|p| p.has_lost()) {
            let action = {
                let view = GameStateView::new(self.game, active);
                active_ctrl.choose_main_action(&view)
            };
            self.game.logger.verbose(&format!(
                "{} chooses {action:?}",
                self.game.player_name(active)
            ));

            match self
                .game
                .execute_action(active, &action, active_ctrl, other_ctrl)
            {
                Ok(()) => {}
                Err(err) if err.is_recoverable() => self.reject(active_ctrl, &err),
                Err(err) => return Err(err),
            }

            if action.ends_main_phase() {
                break;
            }
        }

        self.game.check_ended();
        self.game.sweep_dead();
        Ok(())
    }

    fn combat_phase(
        &mut self,
        active_ctrl: &mut dyn PlayerController,
        other_ctrl: &mut dyn PlayerController,
    ) -> Result<()> {
        let attacking = active_ctrl.player_id();
        let defending = other_ctrl.player_id();
        self.game.combat.clear();

        let available = self.game.available_attackers();
        if available.is_empty() {
            return Ok(());
        }
        let attackers = loop {
            let choice = {
                let view = GameStateView::new(self.game, attacking);
                active_ctrl.choose_attackers(&view, &available)
            };
            match self.game.validate_attackers(&choice) {
                Ok(()) => break choice,
                Err(err) => self.reject(active_ctrl, &err),
            }
        };
        if attackers.is_empty() {
            return Ok(());
        }

        let attacker_player = self.game.get_player_mut(attacking)?;
        for &id in &attackers {
            if let Some(card) = attacker_player.zones.battlefield.get_mut(id) {
                card.tap();
            }
        }
        for &id in &attackers {
            self.game.combat.declare_attacker(id);
            self.log_card_choice(attacking, id, "attacks");
        }

        let blockers = self.game.available_blockers();
        let blocks: SmallVec<[(CardId, CardId); 8]> = if blockers.is_empty() {
            SmallVec::new()
        } else {
            loop {
                let choice = {
                    let view = GameStateView::new(self.game, defending);
                    other_ctrl.choose_blockers(&view, &blockers, &attackers)
                };
                match self.game.validate_blocks(&choice) {
                    Ok(()) => break choice,
                    Err(err) => self.reject(other_ctrl, &err),
                }
            }
        };
        for &(blocker, attacker) in &blocks {
            self.game.combat.declare_blocker(blocker, attacker);
            self.log_card_choice(defending, blocker, "blocks");
        }

        if let Some(hook) = self.combat_hook.as_mut() {
            hook.before_damage(self.game);
        }
        let unblocked = self.game.resolve_blocks(active_ctrl)?;
        if let Some(hook) = self.combat_hook.as_mut() {
            hook.after_damage(self.game, unblocked);
        }

        self.game.sweep_dead();
        Ok(())
    }

    /// Clean up and pass the turn to the other player
    fn end_phase(&mut self, active_ctrl: &mut dyn PlayerController) -> Result<()> {
        let active = active_ctrl.player_id();
        self.game.end_of_turn_cleanup();

        let hand_size = self.game.get_player(active)?.zones.hand.len();
        if hand_size > STARTING_HAND_SIZE {
            self.game
                .discard_cards(active, hand_size - STARTING_HAND_SIZE, active_ctrl)?;
        }

        self.game.turn.next_turn();
        Ok(())
    }

    fn reject(&self, ctrl: &mut dyn PlayerController, err: &MtgError) {
        let view = GameStateView::new(self.game, ctrl.player_id());
        self.game.logger.rejected(view.player_name(), &err.to_string());
        ctrl.on_action_rejected(&view, err);
    }

    fn log_card_choice(&self, player_id: PlayerId, card_id: CardId, verb: &str) {
        let view = GameStateView::new(self.game, player_id);
        let card = view.card_name(card_id).unwrap_or("?");
        view.logger()
            .controller_choice(view.player_name(), &format!("{card} {verb}"));
    }

    /// Result for a game whose `ended` flag is set
    fn finished_result(&self) -> GameResult {
        let winner = self.game.winner();
        let loser_id = self.game.opponent_of(winner);
        let loser = &self.game.players[loser_id.as_u32() as usize];
        let end_reason = if loser.conceded {
            GameEndReason::Concession(loser_id)
        } else if loser.decked {
            GameEndReason::Decking(loser_id)
        } else {
            GameEndReason::PlayerDeath(loser_id)
        };
        GameResult {
            winner: Some(winner),
            turns_played: self.turns_elapsed,
            end_reason,
        }
    }
}
