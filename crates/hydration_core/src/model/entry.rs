//! Drink entry record.
//!
//! # Responsibility
//! - Define one logged intake event and its stable identifier.
//! - Keep the `{id, amount, time}` shape stored under `drinkHistory`.
//!
//! # Invariants
//! - `amount` is strictly positive.
//! - `id` is non-empty and never reused within a day.
//! - Entries are immutable after creation; only deletion removes them.

use super::Milliliters;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque entry identifier.
///
/// Fresh ids are UUIDv7 strings, so lexical order follows creation time.
/// Ids read back from storage are kept verbatim, whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generates a fresh time-ordered id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Validation failure for entry construction and decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    /// Identifier is empty or whitespace.
    EmptyId,
    /// Amount is zero.
    NonPositiveAmount,
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "entry id must not be empty"),
            Self::NonPositiveAmount => write!(f, "entry amount must be greater than 0 ml"),
        }
    }
}

impl Error for EntryValidationError {}

/// One logged intake event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DrinkEntryWire")]
pub struct DrinkEntry {
    pub id: EntryId,
    /// Amount in milliliters, always > 0.
    pub amount: Milliliters,
    /// Local time-of-day label for display, e.g. `02:05 PM`.
    pub time: String,
}

impl DrinkEntry {
    /// Creates an entry with a freshly generated id.
    pub fn new(amount: Milliliters, time: impl Into<String>) -> Result<Self, EntryValidationError> {
        Self::with_id(EntryId::generate(), amount, time)
    }

    /// Creates an entry with a caller-provided id.
    pub fn with_id(
        id: EntryId,
        amount: Milliliters,
        time: impl Into<String>,
    ) -> Result<Self, EntryValidationError> {
        let entry = Self {
            id,
            amount,
            time: time.into(),
        };
        entry.validate()?;
        Ok(entry)
    }

    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(EntryValidationError::EmptyId);
        }
        if self.amount == 0 {
            return Err(EntryValidationError::NonPositiveAmount);
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct DrinkEntryWire {
    id: EntryId,
    amount: Milliliters,
    time: String,
}

impl TryFrom<DrinkEntryWire> for DrinkEntry {
    type Error = EntryValidationError;

    fn try_from(value: DrinkEntryWire) -> Result<Self, Self::Error> {
        Self::with_id(value.id, value.amount, value.time)
    }
}
