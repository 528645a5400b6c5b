//! The module contains the errors the engine can throw.
//!
//! The errors are grouped as:
//!
//! - validation: [`InvalidAmount`], [`InvalidShare`], [`InvalidCurrency`]
//! - lookup: [`KeyNotFound`], always raised from a parent-scoped lookup
//! - conflict: [`ExistingKey`]
//! - permission: [`Forbidden`]
//!
//! Live-rate failures are [`RateError`]s and never leave the resolver.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidShare`]: EngineError::InvalidShare
//!  [`InvalidCurrency`]: EngineError::InvalidCurrency
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Forbidden`]: EngineError::Forbidden
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid share: {0}")]
    InvalidShare(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidShare(a), Self::InvalidShare(b)) => a == b,
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// Failures of the rate lookup.
///
/// These are absorbed by [`RateResolver`](crate::RateResolver), which always
/// produces a usable rate map.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    #[error("rate snapshot is not valid: {0}")]
    InvalidSnapshot(String),
    #[error("live rate source failed: {0}")]
    Source(String),
    #[error("live rate source timed out")]
    Timeout,
}
