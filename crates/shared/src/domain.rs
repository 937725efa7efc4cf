use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status labels carried by a card's submit controls in `data-type`.
///
/// Every transaction starts out `Pending` and ends `Settled`, possibly passing
/// through `NeedsSplit` on the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    #[serde(rename = "Settled")]
    Settled,
    #[serde(rename = "Needs Split")]
    NeedsSplit,
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "Mapped")]
    Mapped,
    #[serde(rename = "In Process")]
    InProcess,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl TransactionStatus {
    pub const ALL: [TransactionStatus; 6] = [
        TransactionStatus::Settled,
        TransactionStatus::NeedsSplit,
        TransactionStatus::Pending,
        TransactionStatus::Mapped,
        TransactionStatus::InProcess,
        TransactionStatus::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TransactionStatus::Settled => "Settled",
            TransactionStatus::NeedsSplit => "Needs Split",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Mapped => "Mapped",
            TransactionStatus::InProcess => "In Process",
            TransactionStatus::Unknown => "Unknown",
        }
    }

    /// Whether a card submitted with this status leaves the working set.
    pub fn is_terminal(self) -> bool {
        matches!(self, TransactionStatus::Settled)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown transaction status label '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for TransactionStatus {
    type Err = UnknownStatus;

    /// Accepts the display label, ignoring case and treating `_`/`-` as spaces,
    /// so `needs_split` and `Needs Split` both parse.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().replace(['_', '-'], " ");
        TransactionStatus::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}
