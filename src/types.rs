/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a physical asset. Names follow the inventory team's
/// Dutch vocabulary and are stored verbatim in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetStatus {
    InGebruik,
    Stock,
    Herstelling,
    Defect,
    UitDienst,
    Nieuw,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 6] = [
        AssetStatus::InGebruik,
        AssetStatus::Stock,
        AssetStatus::Herstelling,
        AssetStatus::Defect,
        AssetStatus::UitDienst,
        AssetStatus::Nieuw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::InGebruik => "InGebruik",
            AssetStatus::Stock => "Stock",
            AssetStatus::Herstelling => "Herstelling",
            AssetStatus::Defect => "Defect",
            AssetStatus::UitDienst => "UitDienst",
            AssetStatus::Nieuw => "Nieuw",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown asset status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for AssetStatus {
    type Err = UnknownStatus;

    /// Case-insensitive; also accepts the numeric position used by older
    /// clients (0 = InGebruik .. 5 = Nieuw).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<usize>() {
            return AssetStatus::ALL
                .get(index)
                .copied()
                .ok_or_else(|| UnknownStatus(s.to_string()));
        }
        AssetStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
