use thiserror::Error;

use crate::support::constraint::ConstraintError;

/// Errors raised while building a mesh or assembling its equations.
///
/// All variants are unrecoverable at the point of detection: construction or
/// assembly aborts and no partial mesh or partial system is returned. They
/// are deterministic, input-driven failures, so retrying is never useful.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    /// A boundary-table row carries a kind tag outside the recognized
    /// enumeration.
    ///
    /// Raised before any node is built; the node model itself is a closed
    /// enum, so an unknown kind cannot survive past assembly.
    #[error("unrecognized boundary kind tag {tag} in boundary row {row}")]
    UnknownVolumeKind { row: usize, tag: u32 },

    /// A table, row, or vector has a length inconsistent with the mesh.
    #[error("{table} has {found} entries, expected {expected}")]
    DimensionMismatch {
        table: &'static str,
        expected: usize,
        found: usize,
    },

    /// An attribute value is physically meaningless (zero volume, negative
    /// surface area, NaN conductivity, ...).
    #[error("{table} row {row}, {field}: {source}")]
    NonPhysical {
        table: &'static str,
        row: usize,
        field: &'static str,
        #[source]
        source: ConstraintError,
    },

    /// A connectivity entry cannot be resolved into a usable neighbor.
    #[error("volume {volume} face {face}: {source}")]
    InvalidTopology {
        volume: usize,
        face: usize,
        #[source]
        source: TopologyError,
    },
}

/// Reasons a neighbor reference is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    /// The referenced index lies outside the combined solid+boundary space.
    #[error("neighbor {neighbor} is outside the {nodes}-node index space")]
    OutOfRange { neighbor: usize, nodes: usize },

    /// A face points back at its own volume.
    #[error("face references its own volume")]
    SelfReference,
}
