//! Error types for the duel engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MtgError {
    #[error("Invalid card format: {0}")]
    InvalidCardFormat(String),

    #[error("Card '{card}' is missing required attribute '{key}'")]
    MissingAttribute { card: String, key: &'static str },

    #[error("Invalid deck format: {0}")]
    InvalidDeckFormat(String),

    #[error("Invalid color code: '{0}' (expected one of W, U, B, R, G)")]
    InvalidColor(char),

    #[error("Insufficient mana to pay {cost} (pool: {pool})")]
    InsufficientMana { cost: String, pool: String },

    #[error("You can only play one land per turn")]
    LandAlreadyPlayed,

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Invalid game action: {0}")]
    InvalidAction(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MtgError {
    /// Rule violations the acting player can recover from by choosing again
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MtgError::InsufficientMana { .. }
                | MtgError::LandAlreadyPlayed
                | MtgError::TargetNotFound(_)
                | MtgError::InvalidTarget(_)
                | MtgError::CardNotFound(_)
                | MtgError::InvalidAction(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MtgError>;
