// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Placement participants derived from parsed modules.
//!
//! Every [`Module`] becomes one [`Participant`]: its bounding box, the scratch
//! state an external placer works on, and a weighted connection map built from
//! the `bound` module's NETWORK section (see [`connectivity`]).
//!
//! The module named [`BOUND`] is the placement frame. It keeps its own
//! position, never appears in another participant's connections, and its size
//! bounds the random initial placement of everything else.

pub mod connectivity;
pub mod placement;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, YalError};
use crate::yal::{Module, ModuleType, NetworkEntry, Placement, Point, Terminal};

/// Reserved name of the boundary frame module
pub const BOUND: &str = "bound";

/// Placement area used when no `bound` module is present
pub const DEFAULT_BOUND: (i64, i64) = (120, 120);

/// Which raw module fields are copied into each participant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetainFields {
    pub module_type: bool,
    pub dimensions: bool,
    pub terminals: bool,
    pub network: bool,
    pub placement: bool,
    pub critical_nets: bool,
}

impl RetainFields {
    pub const NAMES: [&'static str; 6] = [
        "module_type",
        "dimensions",
        "terminals",
        "network",
        "placement",
        "critical_nets",
    ];

    pub fn none() -> Self {
        Self {
            module_type: false,
            dimensions: false,
            terminals: false,
            network: false,
            placement: false,
            critical_nets: false,
        }
    }

    pub fn all() -> Self {
        Self {
            module_type: true,
            dimensions: true,
            terminals: true,
            network: true,
            placement: true,
            critical_nets: true,
        }
    }

    /// Select fields by their names; unknown names are rejected
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = Self::none();
        for name in names {
            match name.as_ref() {
                "module_type" => fields.module_type = true,
                "dimensions" => fields.dimensions = true,
                "terminals" => fields.terminals = true,
                "network" => fields.network = true,
                "placement" => fields.placement = true,
                "critical_nets" => fields.critical_nets = true,
                other => {
                    return Err(YalError::InvalidOption(format!(
                        "cannot retain unknown field '{other}', expected one of {}",
                        Self::NAMES.join(", ")
                    )))
                }
            }
        }
        Ok(fields)
    }
}

impl Default for RetainFields {
    fn default() -> Self {
        Self {
            network: true,
            ..Self::none()
        }
    }
}

/// Options for [`as_participants`]
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantOptions {
    pub randomize_placement: bool,
    pub colorize: bool,
    /// Placement area `(x, y)` when no `bound` module is present
    pub default_bound: (i64, i64),
    pub retain: RetainFields,
}

impl Default for ParticipantOptions {
    fn default() -> Self {
        Self {
            randomize_placement: true,
            colorize: false,
            default_bound: DEFAULT_BOUND,
            retain: RetainFields::default(),
        }
    }
}

/// Placement state of one module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub idx: String,
    pub xmin: i64,
    pub ymin: i64,
    pub width: i64,
    pub height: i64,
    pub clashes: BTreeMap<String, f64>,
    pub aversions: BTreeMap<String, f64>,
    pub inference: f64,
    pub connections: IndexMap<String, u64>,
    pub turmoil: f64,
    pub wounds: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_type: Option<ModuleType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Vec<Point>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminals: Option<Vec<Terminal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Vec<NetworkEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<IndexMap<String, Placement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical_nets: Option<IndexMap<String, u64>>,
}

impl Participant {
    /// Zeroed participant with nothing but its identity
    pub fn new(idx: impl Into<String>) -> Self {
        Self {
            idx: idx.into(),
            xmin: 0,
            ymin: 0,
            width: 0,
            height: 0,
            clashes: BTreeMap::new(),
            aversions: BTreeMap::new(),
            inference: 0.0,
            connections: IndexMap::new(),
            turmoil: 0.0,
            wounds: Vec::new(),
            color: None,
            module_type: None,
            dimensions: None,
            terminals: None,
            network: None,
            placement: None,
            critical_nets: None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.idx == BOUND
    }
}

/// Assembles a participant in a fixed order: zeroed state, retained module
/// fields, computed geometry, computed connections. Each step overwrites what
/// the previous ones set.
pub struct ParticipantBuilder<'m> {
    module: &'m Module,
    participant: Participant,
}

impl<'m> ParticipantBuilder<'m> {
    pub fn new(module: &'m Module) -> Self {
        Self {
            module,
            participant: Participant::new(module.name.clone()),
        }
    }

    pub fn retain(mut self, fields: &RetainFields) -> Self {
        let m = self.module;
        let p = &mut self.participant;
        p.module_type = fields.module_type.then_some(m.module_type);
        p.dimensions = fields.dimensions.then(|| m.dimensions.clone());
        p.terminals = fields.terminals.then(|| m.terminals.clone());
        p.network = fields.network.then(|| m.network.clone());
        p.placement = fields.placement.then(|| m.placement.clone());
        p.critical_nets = fields.critical_nets.then(|| m.critical_nets.clone());
        self
    }

    /// Fails when the outline spans more than `i64` can hold
    pub fn geometry(mut self) -> Result<Self> {
        let bbox = self.module.bounding_box()?.unwrap_or_default();
        self.participant.xmin = bbox.xmin;
        self.participant.ymin = bbox.ymin;
        self.participant.width = bbox.width;
        self.participant.height = bbox.height;
        Ok(self)
    }

    pub fn connections(mut self, connections: Option<&IndexMap<String, u64>>) -> Self {
        self.participant.connections = connections.cloned().unwrap_or_default();
        self
    }

    pub fn build(self) -> Participant {
        self.participant
    }
}

/// Participant for a single module, without connections or randomization
pub fn as_participant(module: &Module, retain: &RetainFields) -> Result<Participant> {
    Ok(ParticipantBuilder::new(module)
        .retain(retain)
        .geometry()?
        .build())
}

/// Convert parsed modules into placement participants.
///
/// With `randomize_placement`, every participant except `bound` is moved to a
/// random position inside the bound frame (or `default_bound` without one),
/// and the bound participants are emitted after the others.
pub fn as_participants<R: Rng + ?Sized>(
    modules: &[Module],
    options: &ParticipantOptions,
    rng: &mut R,
) -> Result<Vec<Participant>> {
    let graph = connectivity::connection_map(modules);
    if graph.is_none() {
        debug!("[GRAPH] No '{BOUND}' module, connections left empty");
    }

    let parts = modules
        .iter()
        .map(|m| {
            Ok(ParticipantBuilder::new(m)
                .retain(&options.retain)
                .geometry()?
                .connections(graph.as_ref().and_then(|g| g.get(&m.name)))
                .build())
        })
        .collect::<Result<Vec<_>>>()?;

    let mut participants = if options.randomize_placement {
        let (bound, mut movable): (Vec<_>, Vec<_>) =
            parts.into_iter().partition(Participant::is_bound);
        let frame = bound
            .first()
            .map(|b| (b.width, b.height))
            .unwrap_or(options.default_bound);
        debug!("[PLACE] Randomizing within {} x {}", frame.0, frame.1);
        for p in movable.iter_mut() {
            placement::randomize_placement(p, frame, rng)?;
        }
        movable.extend(bound);
        movable
    } else {
        parts
    };

    if options.colorize {
        for p in participants.iter_mut().filter(|p| !p.is_bound()) {
            p.color = Some(placement::random_color(rng));
        }
    }

    let edges: usize = participants.iter().map(|p| p.connections.len()).sum();
    info!(
        "[INFO] Built {} participants with {edges} weighted connections",
        participants.len()
    );

    Ok(participants)
}
