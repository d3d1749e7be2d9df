//! System statistics document served by the upstream backend

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Snapshot of `/system/stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub database: DatabaseCounts,
    pub calls: CallTotals,
}

/// Total/active pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCount {
    pub total: i64,
    pub active: i64,
}

/// Reference table sizes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseCounts {
    pub hubs: ActiveCount,
    pub servers: ActiveCount,
    pub trunks: i64,
    pub nas_ips: i64,
    pub tarifs: i64,
    pub pricelists: ActiveCount,
}

/// Call totals as computed by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallTotals {
    pub total: i64,
    pub total_revenue: Decimal,
    pub total_duration_seconds: i64,
    pub total_duration_minutes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_system_stats() {
        let raw = r#"{
            "database": {
                "hubs": {"total": 3, "active": 2},
                "servers": {"total": 6, "active": 5},
                "trunks": 12,
                "nas_ips": 4,
                "tarifs": 5,
                "pricelists": {"total": 2, "active": 1}
            },
            "calls": {
                "total": 150,
                "total_revenue": 1234.5,
                "total_duration_seconds": 9000,
                "total_duration_minutes": 150
            }
        }"#;

        let stats: SystemStats = serde_json::from_str(raw).unwrap();
        assert_eq!(stats.database.hubs.active, 2);
        assert_eq!(stats.database.trunks, 12);
        assert_eq!(stats.calls.total, 150);
        assert_eq!(stats.calls.total_revenue, Decimal::new(12345, 1));
    }
}
