//! Routing topology
//!
//! Walks trunk -> server -> hub so per-trunk totals can be rolled up per hub.

use crate::aggregation::GroupAggregate;
use callstats_core::models::{Server, Trunk};
use std::collections::{BTreeMap, HashMap};

/// Parent links between trunks, servers and hubs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    trunk_server: HashMap<i32, i32>,
    server_hub: HashMap<i32, i32>,
}

impl Topology {
    pub fn build(trunks: &[Trunk], servers: &[Server]) -> Self {
        Self {
            trunk_server: trunks.iter().map(|t| (t.id, t.server_id)).collect(),
            server_hub: servers.iter().map(|s| (s.id, s.hub_id)).collect(),
        }
    }

    #[inline]
    pub fn server_of(&self, trunk_id: i32) -> Option<i32> {
        self.trunk_server.get(&trunk_id).copied()
    }

    /// Hub reached from a trunk; `None` when any link is missing
    pub fn hub_of(&self, trunk_id: i32) -> Option<i32> {
        self.server_of(trunk_id)
            .and_then(|server_id| self.server_hub.get(&server_id).copied())
    }
}

/// Merge per-trunk groups into per-hub groups.
///
/// Trunks that cannot be traced to a hub are collected under `None`.
pub fn rollup_by_hub(
    by_trunk: &BTreeMap<i32, GroupAggregate>,
    topology: &Topology,
) -> BTreeMap<Option<i32>, GroupAggregate> {
    let mut hubs: BTreeMap<Option<i32>, GroupAggregate> = BTreeMap::new();

    for (trunk_id, group) in by_trunk {
        hubs.entry(topology.hub_of(*trunk_id))
            .or_default()
            .merge(group);
    }

    hubs
}
