// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Translation from the grammar's parse tree into typed [`Module`] records.
//!
//! All defaulting and integer coercion lives here. A value missing from the
//! tree becomes `None` (or an empty collection for an absent section), never a
//! zero or an empty string.

use indexmap::IndexMap;
use log::{debug, warn};
use nom::Offset;

use super::parser::{
    CriticalNetTree, GeometryTree, ModuleTree, NetworkTree, PlacementTree, TerminalTree,
};
use super::preprocessor::PreprocessedYal;
use super::{Decimal, Module, NetworkEntry, Placement, Point, Terminal, TerminalGeometry};
use crate::error::Result;

/// Numeric coercion against the text the tokens were borrowed from
struct Coercer<'p> {
    pre: &'p PreprocessedYal,
}

impl Coercer<'_> {
    fn offset_of(&self, token: &str) -> usize {
        self.pre.text.as_str().offset(token)
    }

    fn integer(&self, token: &str) -> Result<i64> {
        token
            .parse::<i64>()
            .map_err(|_| self.pre.syntax_error(self.offset_of(token), "integer"))
    }

    fn unsigned(&self, token: &str) -> Result<u64> {
        token
            .parse::<u64>()
            .map_err(|_| self.pre.syntax_error(self.offset_of(token), "non-negative integer"))
    }
}

/// Build one [`Module`] from its parse tree.
///
/// `pre` must be the preprocessed text the tree was parsed from; it is used to
/// position errors for malformed numerals such as `1-2`.
pub fn build_module(tree: &ModuleTree<'_>, pre: &PreprocessedYal) -> Result<Module> {
    let c = Coercer { pre };

    let dimensions = tree
        .dimensions
        .iter()
        .map(|(x, y)| Ok(Point::new(c.integer(x)?, c.integer(y)?)))
        .collect::<Result<Vec<_>>>()?;

    let terminals = tree
        .terminals
        .iter()
        .map(|t| build_terminal(t, &c))
        .collect::<Result<Vec<_>>>()?;

    let network = tree
        .network
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(build_network_entry)
        .collect();

    let mut placement = IndexMap::new();
    for p in tree.placement.as_deref().unwrap_or_default() {
        let (instance, value) = build_placement(p, &c)?;
        if placement.insert(instance.clone(), value).is_some() {
            warn!(
                "[WARN] Module {}: instance {instance} placed more than once, keeping the last placement",
                tree.name
            );
        }
    }

    let mut critical_nets = IndexMap::new();
    for net in tree.critical_nets.as_deref().unwrap_or_default() {
        let (signal, max_length) = build_critical_net(net, &c)?;
        if critical_nets.insert(signal.clone(), max_length).is_some() {
            warn!(
                "[WARN] Module {}: critical net {signal} listed more than once, keeping the last length",
                tree.name
            );
        }
    }

    let module = Module {
        name: tree.name.to_string(),
        module_type: tree.module_type,
        dimensions,
        terminals,
        network,
        placement,
        critical_nets,
    };

    debug!(
        "[BUILD] Module {} ({}): {} points, {} terminals, {} instances, {} placements, {} critical nets",
        module.name,
        module.module_type,
        module.dimensions.len(),
        module.terminals.len(),
        module.network.len(),
        module.placement.len(),
        module.critical_nets.len()
    );

    Ok(module)
}

fn build_terminal(tree: &TerminalTree<'_>, c: &Coercer<'_>) -> Result<Terminal> {
    let geometry = match &tree.geometry {
        GeometryTree::Absolute { x, y } => TerminalGeometry::Absolute {
            x_position: c.integer(x)?,
            y_position: c.integer(y)?,
        },
        GeometryTree::Relative { side, position } => TerminalGeometry::Relative {
            side: *side,
            position: c.integer(position)?,
        },
    };

    let (width, layer) = match tree.width {
        Some((width, layer)) => (Some(c.unsigned(width)?), Some(layer)),
        None => (None, None),
    };

    Ok(Terminal {
        signal_name: tree.signal_name.to_string(),
        terminal_type: tree.terminal_type,
        geometry,
        width,
        layer,
        current: tree.current.map(Decimal::new),
        voltage: tree.voltage.map(Decimal::new),
    })
}

fn build_network_entry(tree: &NetworkTree<'_>) -> NetworkEntry {
    NetworkEntry {
        instance_name: tree.instance_name.to_string(),
        module_name: tree.module_name.to_string(),
        signal_names: tree.signal_names.iter().map(|s| s.to_string()).collect(),
    }
}

fn build_placement(tree: &PlacementTree<'_>, c: &Coercer<'_>) -> Result<(String, Placement)> {
    Ok((
        tree.instance_name.to_string(),
        Placement {
            x: c.integer(tree.x)?,
            y: c.integer(tree.y)?,
            reflection: tree.reflection,
            rotation: tree.rotation,
        },
    ))
}

fn build_critical_net(tree: &CriticalNetTree<'_>, c: &Coercer<'_>) -> Result<(String, u64)> {
    Ok((tree.signal_name.to_string(), c.unsigned(tree.max_length)?))
}
