//! Quick-add presets offered next to the free-form amount field.

use super::Milliliters;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Fixed one-tap intake amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuickAdd {
    Glass,
    Bottle,
    Large,
}

impl QuickAdd {
    pub const ALL: [QuickAdd; 3] = [QuickAdd::Glass, QuickAdd::Bottle, QuickAdd::Large];

    pub fn amount(self) -> Milliliters {
        match self {
            Self::Glass => 250,
            Self::Bottle => 500,
            Self::Large => 750,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Glass => "Glass",
            Self::Bottle => "Bottle",
            Self::Large => "Large",
        }
    }
}

impl Display for QuickAdd {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}ml)", self.label(), self.amount())
    }
}

/// Returned when a preset name is not one of `glass|bottle|large`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPresetError(pub String);

impl Display for UnknownPresetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown quick-add preset `{}`; expected glass|bottle|large",
            self.0
        )
    }
}

impl Error for UnknownPresetError {}

impl FromStr for QuickAdd {
    type Err = UnknownPresetError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "glass" => Ok(Self::Glass),
            "bottle" => Ok(Self::Bottle),
            "large" => Ok(Self::Large),
            other => Err(UnknownPresetError(other.to_string())),
        }
    }
}
