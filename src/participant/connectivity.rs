// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Weighted connectivity between modules.
//!
//! The universe of instances is the NETWORK section of the `bound` module. Two
//! instances are connected with a weight equal to the number of distinct
//! signals they share, ignoring the ground and power rails. Weights are
//! collected per instantiated module name, which is also the participant
//! `idx` they end up on.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;

use super::BOUND;
use crate::yal::{Module, NetworkEntry};

/// Ground and power rail names, never counted as shared connectivity
pub const RAIL_SIGNALS: [&str; 2] = ["G", "P"];

/// Connection weights per module name
pub type ConnectionMap = IndexMap<String, IndexMap<String, u64>>;

fn signal_set(entry: &NetworkEntry) -> HashSet<&str> {
    entry
        .signal_names
        .iter()
        .map(String::as_str)
        .filter(|s| !RAIL_SIGNALS.contains(s))
        .collect()
}

/// Number of distinct non-rail signals shared by two instances
pub fn connection_weight(a: &NetworkEntry, b: &NetworkEntry) -> u64 {
    let a_signals = signal_set(a);
    let b_signals = signal_set(b);
    a_signals.intersection(&b_signals).count() as u64
}

/// Weights between the instances of one NETWORK section.
///
/// Instances of `bound` itself are skipped. Every other instantiated module
/// gets an entry, possibly empty. Pairs sharing nothing produce no edge, and
/// several instances of the same module add up onto one key. A module never
/// gets an edge to itself.
pub fn network_connections(entries: &[NetworkEntry]) -> ConnectionMap {
    let entries: Vec<(&NetworkEntry, HashSet<&str>)> = entries
        .iter()
        .filter(|e| e.module_name != BOUND)
        .map(|e| (e, signal_set(e)))
        .collect();

    let mut map = ConnectionMap::new();
    for (i, (a, a_signals)) in entries.iter().enumerate() {
        let weights = map.entry(a.module_name.clone()).or_default();
        for (j, (b, b_signals)) in entries.iter().enumerate() {
            if i == j || a.module_name == b.module_name {
                continue;
            }
            let weight = a_signals.intersection(b_signals).count() as u64;
            if weight > 0 {
                *weights.entry(b.module_name.clone()).or_insert(0) += weight;
            }
        }
    }
    map
}

/// Connection map from the first module named `bound`, if there is one
pub fn connection_map(modules: &[Module]) -> Option<ConnectionMap> {
    let bound = modules.iter().find(|m| m.name == BOUND)?;
    let map = network_connections(&bound.network);
    debug!(
        "[GRAPH] {} instances in '{BOUND}' network, {} modules connected",
        bound.network.len(),
        map.values().filter(|w| !w.is_empty()).count()
    );
    Some(map)
}
