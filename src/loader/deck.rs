//! Deck file loader (sectioned key/value format)
//!
//! Every `[section]` describes one physical card:
//!
//! ```text
//! [Mountain 1]
//! Name = Mountain
//! Type = land
//! Subtype = Mountain
//! Colors = R
//! ```

use crate::{MtgError, Result};
use rustc_hash::FxHashMap;
use std::fs;
use std::path::Path;

/// Key/value attributes of one deck section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardAttributes {
    /// Section header the attributes came from
    pub section: String,
    values: FxHashMap<String, String>,
}

impl CardAttributes {
    pub fn new(section: impl Into<String>) -> Self {
        CardAttributes {
            section: section.into(),
            values: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Look up a key that the card type cannot do without
    pub fn require(&self, key: &'static str) -> Result<&str> {
        self.get(key).ok_or_else(|| MtgError::MissingAttribute {
            card: self.label().to_string(),
            key,
        })
    }

    /// Card name if present, otherwise the section header
    pub fn label(&self) -> &str {
        self.get("Name").unwrap_or(&self.section)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// Parsed deck file: card sections in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckData {
    pub cards: Vec<CardAttributes>,
}

impl DeckData {
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Deck loader for sectioned deck files
pub struct DeckLoader;

impl DeckLoader {
    /// Load a deck from a file
    pub fn load_from_file(path: &Path) -> Result<DeckData> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a deck from its text content
    ///
    /// A repeated section header starts that section over, keeping its place
    /// in the deck. Lines that are
    /// neither headers nor `key = value` pairs are skipped, as are pairs that
    /// appear before the first header.
    pub fn parse(content: &str) -> Result<DeckData> {
        let mut deck = DeckData::default();
        let mut current: Option<usize> = None;

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let header = header.trim();
                let idx = match deck.cards.iter().position(|c| c.section == header) {
                    Some(idx) => {
                        deck.cards[idx].clear();
                        idx
                    }
                    None => {
                        deck.cards.push(CardAttributes::new(header));
                        deck.cards.len() - 1
                    }
                };
                current = Some(idx);
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                if let Some(idx) = current {
                    deck.cards[idx].insert(key.trim(), value.trim());
                }
            }
        }

        if deck.is_empty() {
            return Err(MtgError::InvalidDeckFormat("Empty deck".to_string()));
        }

        Ok(deck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections_in_file_order() {
        let content = r#"
[Mountain 1]
Name = Mountain
Type = land
Subtype = Mountain
Colors = R

[Shock]
Name=Shock
Type=instant
ManaCost=R
Effect=damage_target(2)
"#;

        let deck = DeckLoader::parse(content).unwrap();
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.cards[0].section, "Mountain 1");
        assert_eq!(deck.cards[0].get("Name"), Some("Mountain"));
        assert_eq!(deck.cards[0].get("Colors"), Some("R"));
        assert_eq!(deck.cards[1].get("Effect"), Some("damage_target(2)"));
        assert_eq!(deck.cards[1].len(), 4);
    }

    #[test]
    fn test_ignores_stray_lines_and_orphan_keys() {
        let content = "Owner = nobody\n; comment\n[A]\nthis line is noise\nName = A\n";
        let deck = DeckLoader::parse(content).unwrap();
        assert_eq!(deck.len(), 1);
        assert_eq!(deck.cards[0].len(), 1);
    }

    #[test]
    fn test_repeated_section_starts_over() {
        let content = "[A]\nName = A\n[B]\nName = B\n[A]\nType = land\n";
        let deck = DeckLoader::parse(content).unwrap();
        assert_eq!(deck.len(), 2);
        assert_eq!(deck.cards[0].section, "A");
        assert_eq!(deck.cards[0].get("Type"), Some("land"));
        assert_eq!(deck.cards[0].get("Name"), None);
        assert_eq!(deck.cards[0].len(), 1);
    }

    #[test]
    fn test_value_keeps_inner_equals() {
        let deck = DeckLoader::parse("[A]\nEffect = a=b\n").unwrap();
        assert_eq!(deck.cards[0].get("Effect"), Some("a=b"));
    }

    #[test]
    fn test_empty_deck_is_an_error() {
        let err = DeckLoader::parse("just text\n").unwrap_err();
        assert!(matches!(err, MtgError::InvalidDeckFormat(_)));
    }

    #[test]
    fn test_require_reports_missing_key() {
        let mut attrs = CardAttributes::new("Bolt 1");
        attrs.insert("Name", "Bolt");
        let err = attrs.require("ManaCost").unwrap_err();
        match err {
            MtgError::MissingAttribute { card, key } => {
                assert_eq!(card, "Bolt");
                assert_eq!(key, "ManaCost");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
