//! Stability levels accepted by `alloy run --stability.level`.

use std::fmt;
use std::str::FromStr;

/// Minimum stability a configuration is allowed to use, least strict first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StabilityLevel {
    Experimental,
    PublicPreview,
    GenerallyAvailable,
}

impl StabilityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            StabilityLevel::Experimental => "experimental",
            StabilityLevel::PublicPreview => "public-preview",
            StabilityLevel::GenerallyAvailable => "generally-available",
        }
    }

    /// Level required to use a component whose catalog stability is
    /// `stability`. Unknown values yield `None`.
    pub fn required_for(stability: &str) -> Option<Self> {
        match stability {
            "experimental" => Some(StabilityLevel::Experimental),
            "beta" | "public-preview" => Some(StabilityLevel::PublicPreview),
            "stable" | "generally-available" => Some(StabilityLevel::GenerallyAvailable),
            _ => None,
        }
    }

    /// Whether a component needing `required` may be used at this level.
    pub fn permits(self, required: StabilityLevel) -> bool {
        required >= self
    }
}

impl fmt::Display for StabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StabilityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "experimental" => Ok(StabilityLevel::Experimental),
            "public-preview" => Ok(StabilityLevel::PublicPreview),
            "generally-available" => Ok(StabilityLevel::GenerallyAvailable),
            other => Err(format!("unknown stability level '{}'", other)),
        }
    }
}
