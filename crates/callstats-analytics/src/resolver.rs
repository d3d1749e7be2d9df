//! Reference resolution
//!
//! Builds id to name lookups from the reference lists. Unknown ids never
//! match; callers get a deterministic `"<Kind> #<id>"` label instead.

use crate::topology::Topology;
use callstats_core::models::{EntityKind, Hub, ReferenceEntity, Server, Tariff, Trunk};
use std::collections::HashMap;
use tracing::warn;

/// Id to name lookup for one entity kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameResolver {
    kind: EntityKind,
    names: HashMap<i32, String>,
}

impl NameResolver {
    /// Empty resolver; every lookup falls back
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            names: HashMap::new(),
        }
    }

    /// Build from a reference list. When ids collide the last entry wins.
    pub fn from_entities<'a, E, I>(entities: I) -> Self
    where
        E: ReferenceEntity + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let mut resolver = Self::new(E::KIND);

        for entity in entities {
            if let Some(previous) = resolver
                .names
                .insert(entity.id(), entity.name().to_string())
            {
                warn!(
                    kind = %E::KIND,
                    id = entity.id(),
                    previous = %previous,
                    "Duplicate reference id, keeping the last name"
                );
            }
        }

        resolver
    }

    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Name for `id`, if the reference list knows it
    #[inline]
    pub fn lookup(&self, id: i32) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Name for `id`, or the fallback label
    pub fn label(&self, id: i32) -> String {
        self.lookup(id)
            .map(str::to_string)
            .unwrap_or_else(|| self.kind.fallback_label(id))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// All lookups needed to label a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceLookups {
    pub tariffs: NameResolver,
    pub trunks: NameResolver,
    pub servers: NameResolver,
    pub hubs: NameResolver,
    pub topology: Topology,
}

impl ReferenceLookups {
    /// Build every lookup from one point-in-time copy of the reference lists
    pub fn build(tariffs: &[Tariff], trunks: &[Trunk], servers: &[Server], hubs: &[Hub]) -> Self {
        Self {
            tariffs: NameResolver::from_entities(tariffs),
            trunks: NameResolver::from_entities(trunks),
            servers: NameResolver::from_entities(servers),
            hubs: NameResolver::from_entities(hubs),
            topology: Topology::build(trunks, servers),
        }
    }
}

impl Default for ReferenceLookups {
    fn default() -> Self {
        Self {
            tariffs: NameResolver::new(EntityKind::Tariff),
            trunks: NameResolver::new(EntityKind::Trunk),
            servers: NameResolver::new(EntityKind::Server),
            hubs: NameResolver::new(EntityKind::Hub),
            topology: Topology::default(),
        }
    }
}
