//! YAL Parser Library
//!
//! This library parses YAL module descriptions used in VLSI floorplanning
//! into a typed model, and derives placement participants with a weighted
//! connectivity graph for an external placer.

pub mod error;
pub mod export;
pub mod participant;
pub mod yal;

// Re-export commonly used types
pub use error::{Result, YalError};
pub use participant::{as_participants, Participant, ParticipantOptions, RetainFields};
pub use yal::{parse, Decimal, Module, NetworkEntry, Placement, Point, Terminal, TerminalGeometry};
