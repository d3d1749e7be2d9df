//! Reference entities
//!
//! Small lists owned by the CRUD screens. Only `id` and `name` are consumed by
//! the analytics; the remaining fields are carried for the reference tables.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of reference entity, used for fallback labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Tariff,
    Trunk,
    Server,
    Hub,
}

impl EntityKind {
    /// Display name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tariff => "Tariff",
            Self::Trunk => "Trunk",
            Self::Server => "Server",
            Self::Hub => "Hub",
        }
    }

    /// Deterministic label for an id that does not resolve (`"Trunk #7"`)
    pub fn fallback_label(&self, id: i32) -> String {
        format!("{} #{}", self.as_str(), id)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything with an id and a display name
pub trait ReferenceEntity {
    /// Kind used for fallback labels
    const KIND: EntityKind;

    fn id(&self) -> i32;

    fn name(&self) -> &str;
}

/// Billing profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub pricelist_id: i32,
    #[serde(default)]
    pub markup_percent: i32,
    #[serde(default)]
    pub free_minutes: i32,
}

/// Capacity-bounded call path on a server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trunk {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub server_id: i32,
    #[serde(default)]
    pub capacity: i32,
    #[serde(default)]
    pub cost_per_channel: Decimal,
}

/// Routing server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub hub_id: i32,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub is_active: bool,
}

/// Group of servers at one location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hub {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_active: bool,
}

macro_rules! impl_reference_entity {
    ($ty:ty, $kind:expr) => {
        impl ReferenceEntity for $ty {
            const KIND: EntityKind = $kind;

            #[inline]
            fn id(&self) -> i32 {
                self.id
            }

            #[inline]
            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

impl_reference_entity!(Tariff, EntityKind::Tariff);
impl_reference_entity!(Trunk, EntityKind::Trunk);
impl_reference_entity!(Server, EntityKind::Server);
impl_reference_entity!(Hub, EntityKind::Hub);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_label() {
        assert_eq!(EntityKind::Trunk.fallback_label(7), "Trunk #7");
        assert_eq!(EntityKind::Tariff.fallback_label(0), "Tariff #0");
    }

    #[test]
    fn test_optional_fields_default() {
        let trunk: Trunk = serde_json::from_str(r#"{"id": 3, "name": "T-3"}"#).unwrap();
        assert_eq!(trunk.id(), 3);
        assert_eq!(trunk.name(), "T-3");
        assert_eq!(trunk.capacity, 0);
        assert_eq!(trunk.cost_per_channel, Decimal::ZERO);
    }

    #[test]
    fn test_full_trunk_payload() {
        let trunk: Trunk = serde_json::from_str(
            r#"{"id": 1, "server_id": 2, "name": "Main", "capacity": 30, "cost_per_channel": 0.25}"#,
        )
        .unwrap();
        assert_eq!(trunk.server_id, 2);
        assert_eq!(trunk.cost_per_channel, Decimal::new(25, 2));
    }

    #[test]
    fn test_name_is_required() {
        assert!(serde_json::from_str::<Tariff>(r#"{"id": 1}"#).is_err());
    }
}
