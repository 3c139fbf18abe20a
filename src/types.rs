// =============================================================================
// Shared types
// =============================================================================

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The reports a caller can request for a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Price,
    Fundamentals,
    Tech,
    News,
    Dividends,
    Earnings,
}

impl ReportKind {
    pub const ALL: [ReportKind; 6] = [
        Self::Price,
        Self::Fundamentals,
        Self::Tech,
        Self::News,
        Self::Dividends,
        Self::Earnings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Fundamentals => "fundamentals",
            Self::Tech => "tech",
            Self::News => "news",
            Self::Dividends => "dividends",
            Self::Earnings => "earnings",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown report '{0}' (expected one of: price, fundamentals, tech, news, dividends, earnings)")]
pub struct ReportKindError(pub String);

impl FromStr for ReportKind {
    type Err = ReportKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ReportKindError(s.to_string()))
    }
}

/// Normalise a user-supplied ticker symbol.
pub fn normalize_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}
