// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Typed YAL data model.
//!
//! A YAL document is a sequence of `MODULE ... ENDMODULE;` blocks. Each block is
//! translated into a [`Module`]: its outline, its I/O terminals and the optional
//! NETWORK, PLACEMENT and CRITICALNETS sections. Optional values that were not
//! written in the source are `None` and serialize as `null`.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, YalError};

pub mod builder;
pub mod parser;
pub mod preprocessor;
pub mod reader;

/// A closed set of YAL keywords mapped onto a Rust enum.
pub trait Keyword: Copy + Sized + 'static {
    /// Human readable name of the keyword class, used in error messages
    const WHAT: &'static str;
    const ALL: &'static [Self];

    fn keyword(self) -> &'static str;
}

macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident, $what:literal { $($variant:ident => $kw:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $kw)]
                $variant,
            )+
        }

        impl Keyword for $name {
            const WHAT: &'static str = $what;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn keyword(self) -> &'static str {
                match self {
                    $($name::$variant => $kw,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($kw => Ok($name::$variant),)+
                    _ => Err(format!("unknown {}: {s}", $what)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.keyword())
            }
        }
    };
}

keyword_enum! {
    /// Module class from the `TYPE` statement
    ModuleType, "module type" {
        Standard => "STANDARD",
        Pad => "PAD",
        General => "GENERAL",
        Parent => "PARENT",
        Feedthrough => "FEEDTHROUGH",
    }
}

keyword_enum! {
    /// Electrical role of a terminal
    TerminalType, "terminal type" {
        Input => "I",
        Output => "O",
        Bidirectional => "B",
        PadInput => "PI",
        PadOutput => "PO",
        PadBidirectional => "PB",
        Feedthrough => "F",
        Power => "PWR",
        Ground => "GND",
    }
}

keyword_enum! {
    /// Module edge a relative terminal sits on
    Side, "side" {
        Bottom => "BOTTOM",
        Right => "RIGHT",
        Top => "TOP",
        Left => "LEFT",
    }
}

keyword_enum! {
    Layer, "layer" {
        Pdiff => "PDIFF",
        Ndiff => "NDIFF",
        Poly => "POLY",
        Metal1 => "METAL1",
        Metal2 => "METAL2",
    }
}

keyword_enum! {
    Reflection, "reflection" {
        Identity => "RFLNONE",
        MirrorY => "RFLY",
    }
}

keyword_enum! {
    Rotation, "rotation" {
        Rot0 => "ROT0",
        Rot90 => "ROT90",
        Rot180 => "ROT180",
        Rot270 => "ROT270",
    }
}

/// One outline vertex. Ordering is lexicographic on `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<(i64, i64)> for Point {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// Extent derived from the lexicographically first and last outline points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: i64,
    pub ymin: i64,
    pub width: i64,
    pub height: i64,
}

/// Terminal position, either absolute or relative to a module side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TerminalGeometry {
    Absolute { x_position: i64, y_position: i64 },
    Relative { side: Side, position: i64 },
}

/// Free-form numeric value of `CURRENT` or `VOLTAGE`, kept as written.
///
/// Any run of digits, `.` and `-` is accepted, so the text need not be a
/// valid number; [`Decimal::value`] parses it on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Decimal(String);

impl Decimal {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The text as `f64`, when it is one
    pub fn value(&self) -> Option<f64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One element of the IOLIST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Terminal {
    pub signal_name: String,
    pub terminal_type: TerminalType,
    #[serde(flatten)]
    pub geometry: TerminalGeometry,
    pub width: Option<u64>,
    pub layer: Option<Layer>,
    pub current: Option<Decimal>,
    pub voltage: Option<Decimal>,
}

impl Terminal {
    pub fn is_absolute(&self) -> bool {
        matches!(self.geometry, TerminalGeometry::Absolute { .. })
    }

    pub fn side(&self) -> Option<Side> {
        match self.geometry {
            TerminalGeometry::Relative { side, .. } => Some(side),
            TerminalGeometry::Absolute { .. } => None,
        }
    }
}

/// One instance in the NETWORK section, wired to `signal_names` in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub instance_name: String,
    pub module_name: String,
    pub signal_names: Vec<String>,
}

/// Location of an instance. Reflection and rotation are left out, not padded,
/// when the source omits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<Reflection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Rotation>,
}

impl Placement {
    /// Number of values written in the source: 2, 3 or 4.
    pub fn arity(&self) -> usize {
        2 + usize::from(self.reflection.is_some()) + usize::from(self.rotation.is_some())
    }
}

/// A MODULE block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(rename = "module_name")]
    pub name: String,
    pub module_type: ModuleType,
    pub dimensions: Vec<Point>,
    pub terminals: Vec<Terminal>,
    pub network: Vec<NetworkEntry>,
    pub placement: IndexMap<String, Placement>,
    pub critical_nets: IndexMap<String, u64>,
}

impl Module {
    /// Bounding box over the sorted outline. The sort is lexicographic, so for
    /// non-rectangular outlines the extremes are the first and last sorted
    /// points rather than true polygon corners.
    ///
    /// `Ok(None)` for an empty outline. Fails with [`YalError::Extent`] when a
    /// span does not fit in `i64`.
    pub fn bounding_box(&self) -> Result<Option<BoundingBox>> {
        let mut dims = self.dimensions.clone();
        dims.sort();
        let (Some(first), Some(last)) = (dims.first(), dims.last()) else {
            return Ok(None);
        };
        Ok(Some(BoundingBox {
            xmin: first.x,
            ymin: first.y,
            width: span(&self.name, 'x', first.x, last.x)?,
            height: span(&self.name, 'y', first.y, last.y)?,
        }))
    }

    pub fn width(&self) -> Result<i64> {
        Ok(self.bounding_box()?.map(|b| b.width).unwrap_or(0))
    }

    pub fn height(&self) -> Result<i64> {
        Ok(self.bounding_box()?.map(|b| b.height).unwrap_or(0))
    }
}

/// `high - low`, checked
pub(crate) fn span(name: &str, axis: char, low: i64, high: i64) -> Result<i64> {
    high.checked_sub(low).ok_or_else(|| YalError::Extent {
        name: name.to_string(),
        axis,
        low,
        high,
    })
}

/// Parse a YAL document into its modules, in document order.
///
/// The whole input must consist of complete module blocks; the first syntax
/// error aborts the call and no partial result is returned.
pub fn parse(content: &str) -> Result<Vec<Module>> {
    let pre = preprocessor::preprocess(content)?;
    let trees = parser::parse_tree(&pre)?;
    let modules = trees
        .iter()
        .map(|tree| builder::build_module(tree, &pre))
        .collect::<Result<Vec<_>>>()?;

    let mut seen = HashSet::new();
    for m in &modules {
        if !seen.insert(m.name.as_str()) {
            warn!("[WARN] Module name {} appears more than once", m.name);
        }
    }
    info!(
        "[INFO] Parsed {} modules ({} comments removed)",
        modules.len(),
        pre.comments
    );

    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module_with_dims(points: &[(i64, i64)]) -> Module {
        Module {
            name: "m".to_string(),
            module_type: ModuleType::General,
            dimensions: points.iter().copied().map(Point::from).collect(),
            terminals: Vec::new(),
            network: Vec::new(),
            placement: IndexMap::new(),
            critical_nets: IndexMap::new(),
        }
    }

    #[test]
    fn test_bounding_box_is_order_independent() {
        let a = module_with_dims(&[(0, 0), (0, 10), (10, 10), (10, 0)]);
        let b = module_with_dims(&[(10, 10), (0, 0), (10, 0), (0, 10)]);
        let expected = BoundingBox {
            xmin: 0,
            ymin: 0,
            width: 10,
            height: 10,
        };
        assert_eq!(a.bounding_box().unwrap(), Some(expected));
        assert_eq!(b.bounding_box().unwrap(), Some(expected));
    }

    #[test]
    fn test_bounding_box_uses_sorted_extremes() {
        // L-shaped outline: last sorted point is (20, 10), not (20, 20)
        let m = module_with_dims(&[(0, 0), (0, 20), (10, 20), (10, 10), (20, 10), (20, 0)]);
        let bbox = m.bounding_box().unwrap().unwrap();
        assert_eq!(bbox.width, 20);
        assert_eq!(bbox.height, 10);
    }

    #[test]
    fn test_bounding_box_empty_outline() {
        let m = module_with_dims(&[]);
        assert_eq!(m.bounding_box().unwrap(), None);
        assert_eq!(m.width().unwrap(), 0);
    }

    #[test]
    fn test_bounding_box_span_overflow() {
        let m = module_with_dims(&[(i64::MIN, 0), (i64::MAX, 0)]);
        match m.bounding_box() {
            Err(YalError::Extent {
                name,
                axis,
                low,
                high,
            }) => {
                assert_eq!(name, "m");
                assert_eq!(axis, 'x');
                assert_eq!((low, high), (i64::MIN, i64::MAX));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(m.width().is_err());

        // Largest span that still fits
        let m = module_with_dims(&[(0, -1), (i64::MAX, -1)]);
        assert_eq!(m.width().unwrap(), i64::MAX);
        assert_eq!(m.height().unwrap(), 0);
    }

    #[test]
    fn test_decimal_keeps_text() {
        let d = Decimal::new("1.2.3");
        assert_eq!(d.as_str(), "1.2.3");
        assert_eq!(d.value(), None);
        assert_eq!(Decimal::new("-0.5").value(), Some(-0.5));
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"1.2.3\"");
    }

    #[test]
    fn test_keyword_round_trip() {
        for t in TerminalType::ALL {
            assert_eq!(t.keyword().parse::<TerminalType>(), Ok(*t));
        }
        assert_eq!(Rotation::Rot90.to_string(), "ROT90");
        assert!("METAL3".parse::<Layer>().is_err());
    }

    #[test]
    fn test_placement_arity() {
        let p = Placement {
            x: 1,
            y: 2,
            reflection: None,
            rotation: Some(Rotation::Rot180),
        };
        assert_eq!(p.arity(), 3);
    }
}
