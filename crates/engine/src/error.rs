//! The module contains the errors the engine can throw.
//!
//! Errors fall in a few families, see [`ErrorKind`]:
//!
//! - validation errors ([`InsufficientGold`], [`InvalidMix`], ...) reject a
//!   request before anything is written;
//! - [`CapacityExceeded`] is reported on its own so callers can decide to buy
//!   more capacity;
//! - [`Integrity`] means a ledger invariant broke inside a transaction, which
//!   is always rolled back.
//!
//!  [`InsufficientGold`]: EngineError::InsufficientGold
//!  [`InvalidMix`]: EngineError::InvalidMix
//!  [`CapacityExceeded`]: EngineError::CapacityExceeded
//!  [`Integrity`]: EngineError::Integrity
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Insufficient gold: {0}")]
    InsufficientGold(String),
    #[error("Insufficient ml: {0}")]
    InsufficientMl(String),
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),
    #[error("Invalid mix: {0}")]
    InvalidMix(String),
    #[error("Ambiguous recipe: {0}")]
    AmbiguousRecipe(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Payment mismatch: {0}")]
    PaymentMismatch(String),
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),
    #[error("Integrity violation: {0}")]
    Integrity(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Coarse classification used by callers to decide how to react.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Capacity,
    Integrity,
    NotFound,
    Conflict,
    Storage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Capacity => "capacity",
            Self::Integrity => "integrity",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Storage => "storage",
        }
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientGold(_)
            | Self::InsufficientMl(_)
            | Self::InsufficientStock(_)
            | Self::InvalidMix(_)
            | Self::AmbiguousRecipe(_)
            | Self::InvalidQuantity(_)
            | Self::PaymentMismatch(_) => ErrorKind::Validation,
            Self::CapacityExceeded(_) => ErrorKind::Capacity,
            Self::Integrity(_) => ErrorKind::Integrity,
            Self::KeyNotFound(_) => ErrorKind::NotFound,
            Self::ExistingKey(_) => ErrorKind::Conflict,
            Self::Database(_) => ErrorKind::Storage,
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InsufficientGold(a), Self::InsufficientGold(b)) => a == b,
            (Self::InsufficientMl(a), Self::InsufficientMl(b)) => a == b,
            (Self::InsufficientStock(a), Self::InsufficientStock(b)) => a == b,
            (Self::InvalidMix(a), Self::InvalidMix(b)) => a == b,
            (Self::AmbiguousRecipe(a), Self::AmbiguousRecipe(b)) => a == b,
            (Self::InvalidQuantity(a), Self::InvalidQuantity(b)) => a == b,
            (Self::PaymentMismatch(a), Self::PaymentMismatch(b)) => a == b,
            (Self::CapacityExceeded(a), Self::CapacityExceeded(b)) => a == b,
            (Self::Integrity(a), Self::Integrity(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
