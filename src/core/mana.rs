//! Mana system for casting spells

use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five mana colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    /// Parse a single color letter (W, U, B, R, G)
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'W' => Ok(Color::White),
            'U' => Ok(Color::Blue),
            'B' => Ok(Color::Black),
            'R' => Ok(Color::Red),
            'G' => Ok(Color::Green),
            other => Err(MtgError::InvalidColor(other)),
        }
    }

    /// Parse a color attribute value such as "R"
    ///
    /// The value must be exactly one color letter.
    pub fn parse(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Color::from_char(c),
            (Some(c), Some(_)) => Err(MtgError::InvalidColor(c)),
            (None, _) => Err(MtgError::InvalidColor(' ')),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::White => "White",
            Color::Blue => "Blue",
            Color::Black => "Black",
            Color::Red => "Red",
            Color::Green => "Green",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "W"),
            Color::Blue => write!(f, "U"),
            Color::Black => write!(f, "B"),
            Color::Red => write!(f, "R"),
            Color::Green => write!(f, "G"),
        }
    }
}

/// Represents a mana cost (e.g., "2RR" = 2 generic + 2 red)
///
/// Only a single leading digit counts as generic mana; every colored pip
/// needs one mana of exactly that color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManaCost {
    pub generic: u8,
    pub white: u8,
    pub blue: u8,
    pub black: u8,
    pub red: u8,
    pub green: u8,
}

impl ManaCost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a mana cost string like "2RR" or "UB"
    ///
    /// Non-alphabetic characters after the leading digit are ignored. An
    /// alphabetic character that is not a color letter is an error.
    pub fn parse(s: &str) -> Result<Self> {
        let mut cost = ManaCost::new();
        let mut chars = s.trim().chars().peekable();

        if let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            cost.generic = digit as u8;
            chars.next();
        }

        for c in chars {
            if c.is_alphabetic() {
                cost.add_pip(Color::from_char(c)?);
            }
        }

        Ok(cost)
    }

    pub fn add_pip(&mut self, color: Color) {
        let slot = match color {
            Color::White => &mut self.white,
            Color::Blue => &mut self.blue,
            Color::Black => &mut self.black,
            Color::Red => &mut self.red,
            Color::Green => &mut self.green,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn pips(&self, color: Color) -> u8 {
        match color {
            Color::White => self.white,
            Color::Blue => self.blue,
            Color::Black => self.black,
            Color::Red => self.red,
            Color::Green => self.green,
        }
    }

    /// Total converted mana cost
    pub fn cmc(&self) -> u32 {
        self.generic as u32
            + Color::ALL
                .iter()
                .map(|&c| self.pips(c) as u32)
                .sum::<u32>()
    }
}

impl fmt::Display for ManaCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generic > 0 || self.cmc() == 0 {
            write!(f, "{}", self.generic)?;
        }
        for color in Color::ALL {
            for _ in 0..self.pips(color) {
                write!(f, "{color}")?;
            }
        }
        Ok(())
    }
}

/// Mana pool for a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManaPool {
    pub white: u8,
    pub blue: u8,
    pub black: u8,
    pub red: u8,
    pub green: u8,
}

impl ManaPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_color(&mut self, color: Color) {
        let slot = self.slot_mut(color);
        *slot = slot.saturating_add(1);
    }

    pub fn amount(&self, color: Color) -> u8 {
        match color {
            Color::White => self.white,
            Color::Blue => self.blue,
            Color::Black => self.black,
            Color::Red => self.red,
            Color::Green => self.green,
        }
    }

    fn slot_mut(&mut self, color: Color) -> &mut u8 {
        match color {
            Color::White => &mut self.white,
            Color::Blue => &mut self.blue,
            Color::Black => &mut self.black,
            Color::Red => &mut self.red,
            Color::Green => &mut self.green,
        }
    }

    pub fn clear(&mut self) {
        *self = ManaPool::default();
    }

    pub fn total(&self) -> u32 {
        Color::ALL.iter().map(|&c| self.amount(c) as u32).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Check if we can pay the given mana cost
    ///
    /// Works on a copy: each colored pip consumes one mana of its color, then
    /// whatever is left must cover the generic part.
    pub fn can_pay(&self, cost: &ManaCost) -> bool {
        let mut remaining = *self;
        for color in Color::ALL {
            let needed = cost.pips(color);
            let slot = remaining.slot_mut(color);
            if *slot < needed {
                return false;
            }
            *slot -= needed;
        }
        remaining.total() >= cost.generic as u32
    }

    /// Pay a mana cost from this pool
    ///
    /// On success the whole pool is emptied, including any mana beyond what
    /// the cost required. On failure the pool is left untouched.
    pub fn pay(&mut self, cost: &ManaCost) -> Result<()> {
        if !self.can_pay(cost) {
            return Err(MtgError::InsufficientMana {
                cost: cost.to_string(),
                pool: self.to_string(),
            });
        }
        self.clear();
        Ok(())
    }
}

impl fmt::Display for ManaPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Color::ALL
            .iter()
            .map(|&c| format!("{} {}", self.amount(c), c.name()))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pool(white: u8, blue: u8, black: u8, red: u8, green: u8) -> ManaPool {
        ManaPool {
            white,
            blue,
            black,
            red,
            green,
        }
    }

    #[test]
    fn test_parse_cost() {
        let cost = ManaCost::parse("2RR").unwrap();
        assert_eq!(cost.generic, 2);
        assert_eq!(cost.red, 2);
        assert_eq!(cost.cmc(), 4);

        let cost = ManaCost::parse("UB").unwrap();
        assert_eq!(cost.generic, 0);
        assert_eq!(cost.blue, 1);
        assert_eq!(cost.black, 1);
    }

    #[test]
    fn test_only_leading_digit_is_generic() {
        // The second digit is not a pip and not part of the generic amount
        let cost = ManaCost::parse("12R").unwrap();
        assert_eq!(cost.generic, 1);
        assert_eq!(cost.red, 1);
        assert_eq!(cost.cmc(), 2);
    }

    #[test]
    fn test_parse_rejects_unknown_letter() {
        let err = ManaCost::parse("1X").unwrap_err();
        assert!(matches!(err, MtgError::InvalidColor('X')));
    }

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("R").unwrap(), Color::Red);
        assert_eq!(Color::parse(" G ").unwrap(), Color::Green);
        assert!(Color::parse("Q").is_err());
        assert!(Color::parse("").is_err());
        assert!(Color::parse("RG").is_err());
    }

    #[test]
    fn test_cost_display() {
        assert_eq!(ManaCost::parse("2RR").unwrap().to_string(), "2RR");
        assert_eq!(ManaCost::parse("WU").unwrap().to_string(), "WU");
        assert_eq!(ManaCost::new().to_string(), "0");
    }

    #[test]
    fn test_colored_pip_needs_its_color() {
        let cost = ManaCost::parse("R").unwrap();
        assert!(!pool(0, 0, 0, 0, 3).can_pay(&cost));
        assert!(pool(0, 0, 0, 1, 0).can_pay(&cost));
    }

    #[test]
    fn test_generic_uses_leftover_mana() {
        let cost = ManaCost::parse("2R").unwrap();
        assert!(pool(1, 0, 0, 2, 0).can_pay(&cost));
        assert!(!pool(0, 0, 0, 2, 0).can_pay(&cost));
    }

    #[test]
    fn test_pay_empties_pool_including_overpayment() {
        let mut p = pool(0, 0, 0, 3, 1);
        let cost = ManaCost::parse("1R").unwrap();

        p.pay(&cost).unwrap();
        assert!(p.is_empty());
    }

    #[test]
    fn test_failed_payment_leaves_pool_unchanged() {
        let mut p = pool(0, 0, 0, 1, 0);
        let before = p;
        let cost = ManaCost::parse("RR").unwrap();

        let err = p.pay(&cost).unwrap_err();
        assert!(matches!(err, MtgError::InsufficientMana { .. }));
        assert_eq!(p, before);
    }

    fn arb_pool() -> impl Strategy<Value = ManaPool> {
        (0u8..5, 0u8..5, 0u8..5, 0u8..5, 0u8..5).prop_map(|(w, u, b, r, g)| pool(w, u, b, r, g))
    }

    fn arb_cost() -> impl Strategy<Value = ManaCost> {
        (0u8..10, 0u8..3, 0u8..3, 0u8..3, 0u8..3, 0u8..3).prop_map(|(generic, w, u, b, r, g)| {
            ManaCost {
                generic,
                white: w,
                blue: u,
                black: b,
                red: r,
                green: g,
            }
        })
    }

    proptest! {
        #[test]
        fn prop_can_pay_iff_pips_and_total_covered(p in arb_pool(), cost in arb_cost()) {
            let pips_covered = Color::ALL.iter().all(|&c| p.amount(c) >= cost.pips(c));
            let expected = pips_covered && p.total() >= cost.cmc();
            prop_assert_eq!(p.can_pay(&cost), expected);
        }

        #[test]
        fn prop_pay_matches_can_pay(p in arb_pool(), cost in arb_cost()) {
            let mut live = p;
            let result = live.pay(&cost);
            if p.can_pay(&cost) {
                prop_assert!(result.is_ok());
                prop_assert!(live.is_empty());
            } else {
                prop_assert!(result.is_err());
                prop_assert_eq!(live, p);
            }
        }
    }
}
