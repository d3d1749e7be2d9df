//! Data sources re-acquired by the refresh scheduler

use crate::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One independently refreshed input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    CallRecords,
    Tariffs,
    Trunks,
    Servers,
    Hubs,
    SystemStats,
    Config,
}

impl SourceKind {
    /// Every source, in start-up order
    pub const ALL: [SourceKind; 7] = [
        SourceKind::Tariffs,
        SourceKind::Trunks,
        SourceKind::Servers,
        SourceKind::Hubs,
        SourceKind::CallRecords,
        SourceKind::SystemStats,
        SourceKind::Config,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CallRecords => "call_records",
            Self::Tariffs => "tariffs",
            Self::Trunks => "trunks",
            Self::Servers => "servers",
            Self::Hubs => "hubs",
            Self::SystemStats => "system_stats",
            Self::Config => "config",
        }
    }

    /// Upstream path of the source
    pub fn path(&self) -> &'static str {
        match self {
            Self::CallRecords => "/get/call-statistics",
            Self::Tariffs => "/get/tarif",
            Self::Trunks => "/get/trunk",
            Self::Servers => "/get/server",
            Self::Hubs => "/get/hub",
            Self::SystemStats => "/system/stats",
            Self::Config => "/config",
        }
    }

    /// Reference lists are small and only refreshed on demand by default
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Self::Tariffs | Self::Trunks | Self::Servers | Self::Hubs
        )
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AppError::UnknownSource(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for kind in SourceKind::ALL {
            assert_eq!(kind.as_str().parse::<SourceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_source() {
        assert!(matches!(
            "pricelists".parse::<SourceKind>(),
            Err(AppError::UnknownSource(_))
        ));
    }

    #[test]
    fn test_paths() {
        assert_eq!(SourceKind::CallRecords.path(), "/get/call-statistics");
        assert_eq!(SourceKind::Tariffs.path(), "/get/tarif");
        assert!(SourceKind::Hubs.is_reference());
        assert!(!SourceKind::Config.is_reference());
    }
}
