//! Flat tabular mesh description.
//!
//! This is the wire format emitted by external geometry generators: plain SI
//! floats keyed by row index, with boundary kinds encoded as small integer
//! tags. Everything is validated once, before any node is built, so the
//! assembler and the equation code never see a malformed or non-physical
//! value.

use crate::support::constraint::{ConstraintError, NonNegative, StrictlyPositive};

use super::error::{MeshError, TopologyError};
use super::{DIM, FACES};

/// Boundary kind tag for a convection boundary (`value_1` = T_ext in K,
/// `value_2` = α in W/(m²·K)).
pub const CONVECTION_BOUNDARY: u32 = 1;

/// Boundary kind tag for a fixed-temperature boundary (`value_1` = T in K,
/// `value_2` = distance to the volume center in m).
pub const FIXED_T_BOUNDARY: u32 = 2;

/// Attributes of one solid volume: volume in m³, conductivity λ in
/// W/(K·m), volumetric heat generation qv in W/m³.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeRow {
    pub volume: f64,
    pub conductivity: f64,
    pub source: f64,
}

/// Geometry of one solid volume: face surface areas in m² and the volume
/// center position in m, both in the fixed face/axis ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryRow {
    pub surfaces: [f64; FACES],
    pub position: [f64; DIM],
}

/// One boundary condition, dispatched on [`BoundaryRow::kind`].
///
/// The tag stays a raw integer because the table is an external format; an
/// unrecognized tag fails assembly with [`MeshError::UnknownVolumeKind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryRow {
    pub kind: u32,
    pub value_1: f64,
    pub value_2: f64,
}

impl BoundaryRow {
    /// A convection boundary at external temperature `t_ext` (K) with
    /// heat-transfer coefficient `alpha` (W/(m²·K)).
    #[must_use]
    pub fn convection(t_ext: f64, alpha: f64) -> Self {
        Self {
            kind: CONVECTION_BOUNDARY,
            value_1: t_ext,
            value_2: alpha,
        }
    }

    /// A fixed-temperature boundary at `temperature` (K), `distance` (m)
    /// away from the neighboring volume's center.
    #[must_use]
    pub fn fixed_temperature(temperature: f64, distance: f64) -> Self {
        Self {
            kind: FIXED_T_BOUNDARY,
            value_1: temperature,
            value_2: distance,
        }
    }
}

/// Complete tabular description of a mesh.
///
/// The three solid tables are keyed by volume index and must have the same
/// number of rows. Connectivity entries index the combined node space:
/// `0..num_volumes` are solids, `num_volumes..` the boundary rows in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshDescription {
    pub volumes: Vec<VolumeRow>,
    pub geometry: Vec<GeometryRow>,
    pub connectivity: Vec<[usize; FACES]>,
    pub boundaries: Vec<BoundaryRow>,
}

impl MeshDescription {
    #[must_use]
    pub fn num_volumes(&self) -> usize {
        self.volumes.len()
    }

    #[must_use]
    pub fn num_boundaries(&self) -> usize {
        self.boundaries.len()
    }

    /// Validates the whole description: cross-table row counts, physical
    /// attribute ranges, connectivity, and boundary kind tags.
    ///
    /// # Errors
    ///
    /// Returns the first [`MeshError`] encountered; nothing is built from a
    /// description that fails here.
    pub fn validate(&self) -> Result<(), MeshError> {
        let n_volumes = self.num_volumes();

        if self.geometry.len() != n_volumes {
            return Err(MeshError::DimensionMismatch {
                table: "geometry table",
                expected: n_volumes,
                found: self.geometry.len(),
            });
        }
        if self.connectivity.len() != n_volumes {
            return Err(MeshError::DimensionMismatch {
                table: "connectivity table",
                expected: n_volumes,
                found: self.connectivity.len(),
            });
        }

        for (row, attributes) in self.volumes.iter().enumerate() {
            validate_volume_row(attributes, row)?;
        }
        for (row, geometry) in self.geometry.iter().enumerate() {
            validate_geometry_row(geometry, row)?;
        }
        for (row, boundary) in self.boundaries.iter().enumerate() {
            validate_boundary_row(boundary, row)?;
        }

        let nodes = n_volumes + self.num_boundaries();
        for (volume, faces) in self.connectivity.iter().enumerate() {
            for (face, &neighbor) in faces.iter().enumerate() {
                let reason = if neighbor >= nodes {
                    Some(TopologyError::OutOfRange { neighbor, nodes })
                } else if neighbor == volume {
                    Some(TopologyError::SelfReference)
                } else {
                    None
                };
                if let Some(source) = reason {
                    return Err(MeshError::InvalidTopology {
                        volume,
                        face,
                        source,
                    });
                }
            }
        }

        Ok(())
    }
}

pub(super) fn validate_volume_row(row: &VolumeRow, index: usize) -> Result<(), MeshError> {
    physical("volume attributes", index, "volume", StrictlyPositive::new(row.volume).err())?;
    physical(
        "volume attributes",
        index,
        "conductivity",
        StrictlyPositive::new(row.conductivity).err(),
    )?;
    // qv may be negative (a heat sink) but must be a number.
    physical(
        "volume attributes",
        index,
        "source",
        finite(row.source).err(),
    )
}

pub(super) fn validate_geometry_row(row: &GeometryRow, index: usize) -> Result<(), MeshError> {
    for &surface in &row.surfaces {
        physical("geometry table", index, "surface", StrictlyPositive::new(surface).err())?;
    }
    for &coordinate in &row.position {
        physical("geometry table", index, "position", finite(coordinate).err())?;
    }
    Ok(())
}

pub(super) fn validate_boundary_row(row: &BoundaryRow, index: usize) -> Result<(), MeshError> {
    match row.kind {
        CONVECTION_BOUNDARY => {
            physical("boundary table", index, "T_ext", finite(row.value_1).err())?;
            physical(
                "boundary table",
                index,
                "alpha",
                NonNegative::new(row.value_2).err(),
            )
        }
        FIXED_T_BOUNDARY => {
            physical("boundary table", index, "T", finite(row.value_1).err())?;
            physical(
                "boundary table",
                index,
                "distance",
                StrictlyPositive::new(row.value_2).err(),
            )
        }
        tag => Err(MeshError::UnknownVolumeKind { row: index, tag }),
    }
}

fn physical(
    table: &'static str,
    row: usize,
    field: &'static str,
    violation: Option<ConstraintError>,
) -> Result<(), MeshError> {
    match violation {
        None => Ok(()),
        Some(source) => Err(MeshError::NonPhysical {
            table,
            row,
            field,
            source,
        }),
    }
}

fn finite(value: f64) -> Result<(), ConstraintError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConstraintError::NotANumber)
    }
}
