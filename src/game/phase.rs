//! Turn steps and turn structure

use crate::core::PlayerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Steps of a turn, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    Untap,
    Upkeep,
    Draw,
    Main,
    Combat,
    End,
}

impl Step {
    pub const ORDER: [Step; 6] = [
        Step::Untap,
        Step::Upkeep,
        Step::Draw,
        Step::Main,
        Step::Combat,
        Step::End,
    ];

    /// Get the next step in turn order, `None` after End
    pub fn next(&self) -> Option<Step> {
        match self {
            Step::Untap => Some(Step::Upkeep),
            Step::Upkeep => Some(Step::Draw),
            Step::Draw => Some(Step::Main),
            Step::Main => Some(Step::Combat),
            Step::Combat => Some(Step::End),
            Step::End => None,
        }
    }

    /// Can the active player play lands and cast spells in this step?
    pub fn is_main(&self) -> bool {
        matches!(self, Step::Main)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Untap => "Untap Step",
            Step::Upkeep => "Upkeep Step",
            Step::Draw => "Draw Step",
            Step::Main => "Main Phase",
            Step::Combat => "Combat Phase",
            Step::End => "End Phase",
        };
        write!(f, "{name}")
    }
}

/// Represents the current turn structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnStructure {
    /// Current turn number (starts at 1)
    pub turn_number: u32,

    pub current_step: Step,

    /// Active player's index in `GameState::players`
    pub active_player_idx: usize,
}

impl TurnStructure {
    pub fn new(starting_idx: usize) -> Self {
        TurnStructure {
            turn_number: 1,
            current_step: Step::Untap,
            active_player_idx: starting_idx,
        }
    }

    pub fn non_active_player_idx(&self) -> usize {
        1 - self.active_player_idx
    }

    pub fn active_player(&self) -> PlayerId {
        PlayerId::new(self.active_player_idx as u32)
    }

    pub fn non_active_player(&self) -> PlayerId {
        PlayerId::new(self.non_active_player_idx() as u32)
    }

    /// Advance to the next step, returns false at end of turn
    pub fn advance_step(&mut self) -> bool {
        if let Some(next_step) = self.current_step.next() {
            self.current_step = next_step;
            true
        } else {
            false
        }
    }

    /// Swap active and non-active players and start the next turn
    pub fn next_turn(&mut self) {
        self.turn_number += 1;
        self.current_step = Step::Untap;
        self.active_player_idx = self.non_active_player_idx();
    }
}
