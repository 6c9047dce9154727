//! Interactive console controller for human players
//!
//! Reads choices from any `BufRead` and writes prompts to any `Write`, so the
//! same code serves stdin/stdout and scripted tests. Selections are
//! whitespace-separated 1-based indices.

use crate::core::{Card, CardId, Effect, PlayerId};
use crate::game::controller::{GameStateView, PlayerAction, PlayerController};
use crate::MtgError;
use smallvec::SmallVec;
use std::io::{self, BufRead, Stdin, StdinLock, Stdout, Write};

/// A controller that prompts a human player for decisions
pub struct InteractiveController<R, W> {
    player_id: PlayerId,
    input: R,
    output: W,
}

impl InteractiveController<StdinLock<'static>, Stdout> {
    /// Controller reading stdin and writing stdout
    pub fn stdio(player_id: PlayerId) -> Self {
        let stdin: Stdin = io::stdin();
        InteractiveController::new(player_id, stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> InteractiveController<R, W> {
    pub fn new(player_id: PlayerId, input: R, output: W) -> Self {
        InteractiveController {
            player_id,
            input,
            output,
        }
    }

    /// Give back the output sink (for inspecting transcripts)
    pub fn into_output(self) -> W {
        self.output
    }

    // Console write failures are not game errors; the prompt is simply lost.
    fn say(&mut self, text: &str) {
        let _ = writeln!(self.output, "{text}");
    }

    /// Prompt and read one trimmed line, `None` at end of input
    fn ask(&mut self, prompt: &str) -> Option<String> {
        let _ = write!(self.output, "{prompt} ");
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    /// Read 1-based indices into `options`, `None` at end of input
    ///
    /// Out-of-range and non-numeric entries are dropped.
    fn ask_indices(&mut self, prompt: &str, options: usize) -> Option<SmallVec<[usize; 8]>> {
        let line = self.ask(prompt)?;
        Some(
            line.split_whitespace()
                .filter_map(|tok| tok.parse::<usize>().ok())
                .filter(|&i| i >= 1 && i <= options)
                .map(|i| i - 1)
                .collect(),
        )
    }

    fn show_cards(&mut self, title: &str, cards: &[Card]) {
        self.say(&format!("{title}:"));
        if cards.is_empty() {
            self.say("  (empty)");
        }
        for (i, card) in cards.iter().enumerate() {
            self.say(&format!("  {}. {card}", i + 1));
        }
    }

    fn show_ids(&mut self, view: &GameStateView, ids: &[CardId]) {
        for (i, &id) in ids.iter().enumerate() {
            let line = match view.card(id) {
                Some(card) => format!("  {}. {card}", i + 1),
                None => format!("  {}. card {id}", i + 1),
            };
            self.say(&line);
        }
    }

    fn show_help(&mut self) {
        self.say("Commands:");
        self.say("  tap <land>      - tap an untapped land for mana");
        self.say("  play <card>     - play a land or cast a spell (also: cast)");
        self.say("  hand            - show your hand");
        self.say("  battlefield     - show both battlefields");
        self.say("  graveyard       - show your graveyard");
        self.say("  pass            - end your main phase");
        self.say("  concede         - give up the game");
    }
}

impl<R: BufRead, W: Write> PlayerController for InteractiveController<R, W> {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_mulligan(&mut self, view: &GameStateView, hand_size: usize) -> bool {
        self.show_cards(&format!("{}'s opening hand", view.player_name()), view.hand());
        let prompt = if hand_size > 1 {
            format!("Mulligan down to {}? (y/N)", hand_size - 1)
        } else {
            "Mulligan? (y/N)".to_string()
        };
        let answer = self.ask(&prompt);
        matches!(answer.as_deref(), Some("y" | "Y"))
    }

    fn choose_main_action(&mut self, view: &GameStateView) -> PlayerAction {
        loop {
            let prompt = format!(
                "[{} | life {} | opp {} | {}]>",
                view.player_name(),
                view.life(),
                view.opponent_life(),
                view.mana_pool()
            );
            // Closed input ends the game for this player
            let Some(line) = self.ask(&prompt) else {
                return PlayerAction::Concede;
            };

            match PlayerAction::decode(&line) {
                Some(PlayerAction::ShowHand) => self.show_cards("Hand", view.hand()),
                Some(PlayerAction::ShowBattlefield) => {
                    self.show_cards("Your battlefield", view.battlefield());
                    self.show_cards("Opponent's battlefield", view.opponent_battlefield());
                }
                Some(PlayerAction::ShowGraveyard) => self.show_cards("Graveyard", view.graveyard()),
                Some(action) => return action,
                None => self.show_help(),
            }
        }
    }

    fn choose_attackers(
        &mut self,
        view: &GameStateView,
        available_creatures: &[CardId],
    ) -> SmallVec<[CardId; 8]> {
        self.say("--- Declare Attackers ---");
        self.show_ids(view, available_creatures);
        self.ask_indices("Attack with (indices, blank for none):", available_creatures.len())
            .unwrap_or_default()
            .into_iter()
            .map(|i| available_creatures[i])
            .collect()
    }

    fn choose_blockers(
        &mut self,
        view: &GameStateView,
        available_blockers: &[CardId],
        attackers: &[CardId],
    ) -> SmallVec<[(CardId, CardId); 8]> {
        self.say("--- Declare Blockers ---");
        self.say("Your blockers:");
        self.show_ids(view, available_blockers);

        let mut blocks = SmallVec::new();
        for &attacker in attackers {
            let name = view.card_name(attacker).unwrap_or("?");
            let prompt = format!("Block {name} with (indices, blank for none):");
            let chosen = self
                .ask_indices(&prompt, available_blockers.len())
                .unwrap_or_default();
            for i in chosen {
                blocks.push((available_blockers[i], attacker));
            }
        }
        blocks
    }

    fn choose_blocker_order(
        &mut self,
        view: &GameStateView,
        attacker: CardId,
        blockers: &[CardId],
    ) -> SmallVec<[CardId; 4]> {
        let name = view.card_name(attacker).unwrap_or("?");
        self.say(&format!("Order damage assignment for {name}:"));
        self.show_ids(view, blockers);
        // Closed input keeps the declared order
        match self.ask_indices("Blocker order (all indices):", blockers.len()) {
            Some(indices) => indices.into_iter().map(|i| blockers[i]).collect(),
            None => blockers.into(),
        }
    }

    fn choose_cards_to_discard(
        &mut self,
        view: &GameStateView,
        hand: &[CardId],
        count: usize,
    ) -> SmallVec<[CardId; 7]> {
        self.say(&format!("Discard {count} card(s):"));
        self.show_ids(view, hand);
        match self.ask_indices("Discard (indices):", hand.len()) {
            Some(indices) => indices.into_iter().map(|i| hand[i]).collect(),
            None => hand.iter().copied().take(count).collect(),
        }
    }

    fn choose_target(&mut self, _view: &GameStateView, effect: &Effect) -> String {
        let prompt = format!("Target for {effect} (me, opp, me-<creature>, opp-<creature>):");
        self.ask(&prompt).unwrap_or_else(|| "opp".to_string())
    }

    fn on_action_rejected(&mut self, _view: &GameStateView, error: &MtgError) {
        self.say(&format!("Rejected: {error}"));
    }

    fn on_game_end(&mut self, view: &GameStateView, won: bool) {
        let outcome = if won { "won" } else { "lost" };
        self.say(&format!("{} {outcome} the game.", view.player_name()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;
    use std::io::Cursor;

    fn controller(input: &str) -> InteractiveController<Cursor<Vec<u8>>, Vec<u8>> {
        InteractiveController::new(
            PlayerId::new(0),
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
        )
    }

    #[test]
    fn test_main_action_skips_info_commands() {
        let game = GameState::new_two_player("Alice", "Bob");
        let view = GameStateView::new(&game, PlayerId::new(0));
        let mut ctrl = controller("hand\nbogus\ntap Mountain\n");

        assert_eq!(
            ctrl.choose_main_action(&view),
            PlayerAction::TapLand("Mountain".to_string())
        );
        let transcript = String::from_utf8(ctrl.into_output()).unwrap();
        assert!(transcript.contains("Hand:"));
        assert!(transcript.contains("Commands:"));
    }

    #[test]
    fn test_closed_input_concedes() {
        let game = GameState::new_two_player("Alice", "Bob");
        let view = GameStateView::new(&game, PlayerId::new(0));
        let mut ctrl = controller("");
        assert_eq!(ctrl.choose_main_action(&view), PlayerAction::Concede);
    }

    #[test]
    fn test_indices_are_one_based() {
        let game = GameState::new_two_player("Alice", "Bob");
        let view = GameStateView::new(&game, PlayerId::new(0));
        let ids = [CardId::new(4), CardId::new(5), CardId::new(6)];
        let mut ctrl = controller("3 x 1 9\n");

        let chosen = ctrl.choose_attackers(&view, &ids);
        assert_eq!(chosen.as_slice(), &[CardId::new(6), CardId::new(4)]);
    }

    #[test]
    fn test_mulligan_answers() {
        let game = GameState::new_two_player("Alice", "Bob");
        let view = GameStateView::new(&game, PlayerId::new(0));
        let mut ctrl = controller("Y\nyes\n");
        assert!(ctrl.choose_mulligan(&view, 7));
        assert!(!ctrl.choose_mulligan(&view, 6));
    }

    #[test]
    fn test_blockers_per_attacker() {
        let game = GameState::new_two_player("Alice", "Bob");
        let view = GameStateView::new(&game, PlayerId::new(0));
        let blockers = [CardId::new(1), CardId::new(2)];
        let attackers = [CardId::new(8), CardId::new(9)];
        let mut ctrl = controller("2\n\n");

        let blocks = ctrl.choose_blockers(&view, &blockers, &attackers);
        assert_eq!(blocks.as_slice(), &[(CardId::new(2), CardId::new(8))]);
    }

    #[test]
    fn test_closed_input_picks_valid_defaults() {
        let game = GameState::new_two_player("Alice", "Bob");
        let view = GameStateView::new(&game, PlayerId::new(0));
        let ids = [CardId::new(4), CardId::new(5), CardId::new(6)];
        let mut ctrl = controller("");

        let discard = ctrl.choose_cards_to_discard(&view, &ids, 2);
        assert_eq!(discard.as_slice(), &[CardId::new(4), CardId::new(5)]);
        let order = ctrl.choose_blocker_order(&view, CardId::new(9), &ids);
        assert_eq!(order.as_slice(), &ids);
    }
}
