//! The thermal node model.
//!
//! A node is either a solid control volume or one of two boundary kinds.
//! Solid volumes own the energy-balance algorithm: each one can emit its row
//! of the steady-state linear system and, given a candidate solution,
//! recompute its net heat flow as an independent check. Boundary nodes only
//! carry the parameters the solid's face formulas read.
//!
//! Nodes live in a single arena owned by the [`Mesh`](super::Mesh); neighbor
//! references are [`NodeId`] indices into that arena, so a solid can be built
//! before the nodes its faces point at.

use uom::ConstZero;
use uom::si::{
    f64::{
        Area, HeatTransfer, Length, Power, ThermalConductance, ThermalConductivity,
        ThermodynamicTemperature, Volume,
    },
    power::watt,
    thermal_conductance::watt_per_kelvin,
    thermodynamic_temperature::kelvin,
};

use crate::support::constraint::{Constrained, NonNegative, StrictlyPositive};
use crate::support::units::{TemperatureDifference, VolumetricHeatSource};

use super::error::{MeshError, TopologyError};
use super::{DIM, FACES};

/// Handle to a node in the mesh arena.
///
/// Solids occupy `0..num_volumes`, boundaries the indices after them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in the combined solid+boundary index space.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Variant tag of a [`ThermalNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Solid,
    Convection,
    FixedT,
}

/// A node of the discretized domain.
#[derive(Debug, Clone, PartialEq)]
pub enum ThermalNode {
    /// A solid control volume exchanging heat by conduction.
    Solid(SolidVolume),
    /// A face exposed to a fluid at a fixed external temperature.
    Convection(ConvectionBoundary),
    /// A face held at a prescribed temperature.
    FixedT(FixedTBoundary),
}

impl ThermalNode {
    /// Returns the node's variant tag.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Solid(_) => NodeKind::Solid,
            Self::Convection(_) => NodeKind::Convection,
            Self::FixedT(_) => NodeKind::FixedT,
        }
    }
}

/// A solid control volume.
///
/// Carries the lumped geometry and material attributes of one cell plus the
/// `FACES` neighbor handles, one per face. Surfaces, position, and neighbors
/// all follow the same fixed face ordering; a mismatch between those tables
/// produces a numerically well-formed but physically wrong system, which is
/// why the assembler validates them together.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidVolume {
    volume: Volume,
    conductivity: ThermalConductivity,
    source: VolumetricHeatSource,
    surfaces: [Area; FACES],
    position: [Length; DIM],
    index: usize,
    neighbors: [NodeId; FACES],
}

impl SolidVolume {
    pub(crate) fn new(
        volume: Volume,
        conductivity: ThermalConductivity,
        source: VolumetricHeatSource,
        surfaces: [Area; FACES],
        index: usize,
        position: [Length; DIM],
        neighbors: [NodeId; FACES],
    ) -> Self {
        Self {
            volume,
            conductivity,
            source,
            surfaces,
            position,
            index,
            neighbors,
        }
    }

    /// Row/column of this volume in the linear system.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn volume(&self) -> Volume {
        self.volume
    }

    #[must_use]
    pub fn conductivity(&self) -> ThermalConductivity {
        self.conductivity
    }

    /// Volumetric internal heat generation rate (qv).
    #[must_use]
    pub fn source(&self) -> VolumetricHeatSource {
        self.source
    }

    #[must_use]
    pub fn surfaces(&self) -> &[Area; FACES] {
        &self.surfaces
    }

    #[must_use]
    pub fn position(&self) -> &[Length; DIM] {
        &self.position
    }

    #[must_use]
    pub fn neighbors(&self) -> &[NodeId; FACES] {
        &self.neighbors
    }

    /// Replaces the thermal conductivity, e.g. to re-solve under a changed
    /// material without rebuilding the mesh.
    pub fn set_conductivity(&mut self, value: Constrained<ThermalConductivity, StrictlyPositive>) {
        self.conductivity = value.into_inner();
    }

    /// Replaces the face surface areas, in face order.
    pub fn set_surfaces(&mut self, surfaces: [Constrained<Area, StrictlyPositive>; FACES]) {
        self.surfaces = surfaces.map(Constrained::into_inner);
    }

    /// Replaces the volumetric heat generation rate.
    pub fn set_source(&mut self, value: VolumetricHeatSource) {
        self.source = value;
    }

    /// Bulk attribute replacement for `Mesh::set_node_data`; values are
    /// validated at the table level before this is called.
    pub(crate) fn replace_attributes(
        &mut self,
        volume: Volume,
        conductivity: ThermalConductivity,
        source: VolumetricHeatSource,
    ) {
        self.volume = volume;
        self.conductivity = conductivity;
        self.source = source;
    }

    /// Fills `row` with this volume's steady-state energy balance,
    /// `Σ a_j·T_j = b`, where `row[..n]` holds the coefficients over the
    /// solid-volume columns and `row[n]` the constant term.
    ///
    /// The row is zeroed first, so repeated calls overwrite rather than
    /// accumulate. Per face:
    ///
    /// - solid neighbor: conductance `λ_self·S/d` (center-to-center distance)
    ///   leaves this volume's coefficient and enters the neighbor's;
    /// - convection boundary: `α·S` on the own coefficient, `α·S·T_ext` on
    ///   the constant term;
    /// - fixed-temperature boundary: `λ_self·S/d` with the boundary's fixed
    ///   distance, `λ_self·S/d·T` on the constant term.
    ///
    /// Internal generation contributes `qv·V` to the constant term.
    ///
    /// Coefficients are W/K, the constant term W.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::DimensionMismatch`] if the row is too short for
    /// the solid indices it must hold, and [`MeshError::InvalidTopology`] if
    /// a neighbor handle does not resolve inside `nodes`.
    pub fn equation(&self, nodes: &[ThermalNode], row: &mut [f64]) -> Result<(), MeshError> {
        if row.len() < self.index + 2 {
            return Err(MeshError::DimensionMismatch {
                table: "equation row",
                expected: self.index + 2,
                found: row.len(),
            });
        }
        let constant = row.len() - 1;
        row.fill(0.0);

        for (face, (&neighbor, &surface)) in
            self.neighbors.iter().zip(&self.surfaces).enumerate()
        {
            match self.resolve(nodes, face, neighbor)? {
                ThermalNode::Solid(other) => {
                    if other.index >= constant {
                        return Err(MeshError::DimensionMismatch {
                            table: "equation row",
                            expected: other.index + 2,
                            found: row.len(),
                        });
                    }
                    let conductance: ThermalConductance =
                        self.conductivity * surface / self.distance_to(&other.position);
                    let g = conductance.get::<watt_per_kelvin>();
                    row[self.index] -= g;
                    row[other.index] += g;
                }
                ThermalNode::Convection(boundary) => {
                    let conductance: ThermalConductance = boundary.alpha * surface;
                    let g = conductance.get::<watt_per_kelvin>();
                    row[self.index] -= g;
                    row[constant] -= g * boundary.t_ext.get::<kelvin>();
                }
                ThermalNode::FixedT(boundary) => {
                    let conductance: ThermalConductance =
                        self.conductivity * surface / boundary.distance;
                    let g = conductance.get::<watt_per_kelvin>();
                    row[self.index] -= g;
                    row[constant] -= g * boundary.temperature.get::<kelvin>();
                }
            }
        }

        row[constant] -= (self.source * self.volume).get::<watt>();
        Ok(())
    }

    /// Net heat flow into this volume at the given temperatures.
    ///
    /// Evaluates the same face-by-face formulas as [`SolidVolume::equation`],
    /// but directly at the candidate temperatures instead of rearranged into
    /// coefficients. At the exact steady state the result is zero; away from
    /// it the sign gives the direction of the imbalance. Used as a
    /// correctness oracle for a converged solution, never for assembly.
    ///
    /// `temperatures[i]` is the temperature of solid volume `i` in kelvin.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::DimensionMismatch`] if the temperature vector is
    /// too short, and [`MeshError::InvalidTopology`] if a neighbor handle
    /// does not resolve inside `nodes`.
    pub fn energy_balance(
        &self,
        nodes: &[ThermalNode],
        temperatures: &[f64],
    ) -> Result<Power, MeshError> {
        let temperature_of = |index: usize| -> Result<ThermodynamicTemperature, MeshError> {
            temperatures
                .get(index)
                .map(|&t| ThermodynamicTemperature::new::<kelvin>(t))
                .ok_or(MeshError::DimensionMismatch {
                    table: "temperature vector",
                    expected: index + 1,
                    found: temperatures.len(),
                })
        };

        let t_self = temperature_of(self.index)?;
        let mut net = Power::ZERO;

        for (face, (&neighbor, &surface)) in
            self.neighbors.iter().zip(&self.surfaces).enumerate()
        {
            match self.resolve(nodes, face, neighbor)? {
                ThermalNode::Solid(other) => {
                    let conductance: ThermalConductance =
                        self.conductivity * surface / self.distance_to(&other.position);
                    net += conductance * temperature_of(other.index)?.minus(t_self);
                }
                ThermalNode::Convection(boundary) => {
                    let conductance: ThermalConductance = boundary.alpha * surface;
                    net += conductance * boundary.t_ext.minus(t_self);
                }
                ThermalNode::FixedT(boundary) => {
                    let conductance: ThermalConductance =
                        self.conductivity * surface / boundary.distance;
                    net += conductance * boundary.temperature.minus(t_self);
                }
            }
        }

        net += self.source * self.volume;
        Ok(net)
    }

    fn resolve<'a>(
        &self,
        nodes: &'a [ThermalNode],
        face: usize,
        neighbor: NodeId,
    ) -> Result<&'a ThermalNode, MeshError> {
        if neighbor.index() == self.index {
            return Err(MeshError::InvalidTopology {
                volume: self.index,
                face,
                source: TopologyError::SelfReference,
            });
        }
        nodes
            .get(neighbor.index())
            .ok_or(MeshError::InvalidTopology {
                volume: self.index,
                face,
                source: TopologyError::OutOfRange {
                    neighbor: neighbor.index(),
                    nodes: nodes.len(),
                },
            })
    }

    /// Euclidean distance between the two volume centers.
    fn distance_to(&self, other: &[Length; DIM]) -> Length {
        let mut sum = Area::ZERO;
        for (a, b) in self.position.iter().zip(other) {
            let delta = *a - *b;
            sum += delta * delta;
        }
        sum.sqrt()
    }
}

/// A convection boundary: a face exchanging heat with a fluid at fixed
/// external temperature via the heat-transfer coefficient α.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvectionBoundary {
    t_ext: ThermodynamicTemperature,
    alpha: HeatTransfer,
}

impl ConvectionBoundary {
    pub(crate) fn new(t_ext: ThermodynamicTemperature, alpha: HeatTransfer) -> Self {
        Self { t_ext, alpha }
    }

    #[must_use]
    pub fn external_temperature(&self) -> ThermodynamicTemperature {
        self.t_ext
    }

    #[must_use]
    pub fn alpha(&self) -> HeatTransfer {
        self.alpha
    }

    /// Replaces the external fluid temperature, e.g. to re-solve under a
    /// changed ambient condition.
    pub fn set_external_temperature(&mut self, value: ThermodynamicTemperature) {
        self.t_ext = value;
    }

    /// Replaces the heat-transfer coefficient.
    pub fn set_alpha(&mut self, value: Constrained<HeatTransfer, NonNegative>) {
        self.alpha = value.into_inner();
    }
}

/// A fixed-temperature boundary.
///
/// The node does not occupy mesh space, so instead of a position it carries
/// the fixed distance from the prescribed temperature to the neighboring
/// volume's center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTBoundary {
    temperature: ThermodynamicTemperature,
    distance: Length,
}

impl FixedTBoundary {
    pub(crate) fn new(temperature: ThermodynamicTemperature, distance: Length) -> Self {
        Self {
            temperature,
            distance,
        }
    }

    #[must_use]
    pub fn temperature(&self) -> ThermodynamicTemperature {
        self.temperature
    }

    #[must_use]
    pub fn distance(&self) -> Length {
        self.distance
    }

    /// Replaces the pinned temperature.
    pub fn set_temperature(&mut self, value: ThermodynamicTemperature) {
        self.temperature = value;
    }

    /// Replaces the distance to the neighboring volume's center.
    pub fn set_distance(&mut self, value: Constrained<Length, StrictlyPositive>) {
        self.distance = value.into_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        area::square_meter, heat_transfer::watt_per_square_meter_kelvin, length::meter,
        thermal_conductivity::watt_per_meter_kelvin, volume::cubic_meter,
    };

    use crate::support::units::watts_per_cubic_meter;

    fn solid(
        index: usize,
        conductivity: f64,
        source: f64,
        position: [f64; DIM],
        neighbors: [usize; FACES],
    ) -> SolidVolume {
        SolidVolume::new(
            Volume::new::<cubic_meter>(1.0),
            ThermalConductivity::new::<watt_per_meter_kelvin>(conductivity),
            watts_per_cubic_meter(source),
            [Area::new::<square_meter>(1.0); FACES],
            index,
            position.map(Length::new::<meter>),
            neighbors.map(NodeId::new),
        )
    }

    fn convection(t_ext: f64, alpha: f64) -> ThermalNode {
        ThermalNode::Convection(ConvectionBoundary::new(
            ThermodynamicTemperature::new::<kelvin>(t_ext),
            HeatTransfer::new::<watt_per_square_meter_kelvin>(alpha),
        ))
    }

    fn fixed(temperature: f64, distance: f64) -> ThermalNode {
        ThermalNode::FixedT(FixedTBoundary::new(
            ThermodynamicTemperature::new::<kelvin>(temperature),
            Length::new::<meter>(distance),
        ))
    }

    /// Two solids side by side, one fixed-T face, convection elsewhere.
    fn two_volume_arena() -> Vec<ThermalNode> {
        vec![
            // (0): faces = [fixed 2, solid 1, conv 3, conv 4]
            ThermalNode::Solid(solid(0, 2.0, -5.0, [0.5, 0.5], [2, 1, 3, 4])),
            // (1): faces = [solid 0, conv 5, conv 3, conv 4]
            ThermalNode::Solid(solid(1, 2.0, 0.0, [2.5, 0.5], [0, 5, 3, 4])),
            fixed(342.0, 0.5),
            convection(303.0, 10.0),
            convection(305.0, 20.0),
            convection(300.0, 8.0),
        ]
    }

    #[test]
    fn kind_reports_variant() {
        let nodes = two_volume_arena();
        assert_eq!(nodes[0].kind(), NodeKind::Solid);
        assert_eq!(nodes[3].kind(), NodeKind::Convection);
        assert_eq!(nodes[2].kind(), NodeKind::FixedT);
    }

    #[test]
    fn equation_mixes_face_contributions() {
        let nodes = two_volume_arena();
        let ThermalNode::Solid(volume) = &nodes[0] else {
            unreachable!()
        };

        let mut row = [0.0; 3];
        volume.equation(&nodes, &mut row).unwrap();

        // fixed: 2*1/0.5 = 4, solid: 2*1/2 = 1, convection: 10 and 20.
        assert_relative_eq!(row[0], -(4.0 + 1.0 + 10.0 + 20.0));
        assert_relative_eq!(row[1], 1.0);
        // b = -4*342 - 10*303 - 20*305 - (-5*1)
        assert_relative_eq!(row[2], -1368.0 - 3030.0 - 6100.0 + 5.0);
    }

    #[test]
    fn equation_overwrites_previous_row() {
        let nodes = two_volume_arena();
        let ThermalNode::Solid(volume) = &nodes[0] else {
            unreachable!()
        };

        let mut row = [0.0; 3];
        volume.equation(&nodes, &mut row).unwrap();
        let first = row;
        volume.equation(&nodes, &mut row).unwrap();

        assert_eq!(row, first);
    }

    #[test]
    fn conductance_is_symmetric_for_equal_conductivities() {
        let nodes = two_volume_arena();
        let mut rows = [[0.0; 3]; 2];
        for i in 0..2 {
            let ThermalNode::Solid(volume) = &nodes[i] else {
                unreachable!()
            };
            volume.equation(&nodes, &mut rows[i]).unwrap();
        }
        assert_relative_eq!(rows[0][1], rows[1][0]);
    }

    #[test]
    fn row_sum_equals_negated_boundary_couplings() {
        let nodes = two_volume_arena();
        let ThermalNode::Solid(volume) = &nodes[0] else {
            unreachable!()
        };

        let mut row = [0.0; 3];
        volume.equation(&nodes, &mut row).unwrap();

        let solid_sum: f64 = row[..2].iter().sum();
        assert_relative_eq!(solid_sum, -(4.0 + 10.0 + 20.0));
        assert!(solid_sum < 0.0);
    }

    #[test]
    fn short_row_is_rejected() {
        let nodes = two_volume_arena();
        let ThermalNode::Solid(volume) = &nodes[1] else {
            unreachable!()
        };

        let mut row = [0.0; 2];
        assert!(matches!(
            volume.equation(&nodes, &mut row),
            Err(MeshError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn self_reference_is_rejected() {
        let mut nodes = two_volume_arena();
        nodes[0] = ThermalNode::Solid(solid(0, 2.0, 0.0, [0.5, 0.5], [0, 1, 3, 4]));
        let ThermalNode::Solid(volume) = &nodes[0] else {
            unreachable!()
        };

        let mut row = [0.0; 3];
        assert!(matches!(
            volume.equation(&nodes, &mut row),
            Err(MeshError::InvalidTopology {
                volume: 0,
                face: 0,
                source: TopologyError::SelfReference,
            })
        ));
    }

    #[test]
    fn energy_balance_signs_follow_the_imbalance() {
        let nodes = vec![
            ThermalNode::Solid(solid(0, 1.0, 0.0, [0.5, 0.5], [1, 1, 1, 1])),
            fixed(100.0, 1.0),
        ];
        let ThermalNode::Solid(volume) = &nodes[0] else {
            unreachable!()
        };

        // Colder than the boundary: heat flows in.
        let net = volume.energy_balance(&nodes, &[90.0]).unwrap();
        assert_relative_eq!(net.get::<watt>(), 40.0);

        // At the boundary temperature the volume is in equilibrium.
        let net = volume.energy_balance(&nodes, &[100.0]).unwrap();
        assert_relative_eq!(net.get::<watt>(), 0.0);

        // Hotter: heat flows out.
        let net = volume.energy_balance(&nodes, &[110.0]).unwrap();
        assert_relative_eq!(net.get::<watt>(), -40.0);
    }

    #[test]
    fn boundary_mutators_store_the_new_values() {
        let mut boundary = ConvectionBoundary::new(
            ThermodynamicTemperature::new::<kelvin>(300.0),
            HeatTransfer::new::<watt_per_square_meter_kelvin>(10.0),
        );
        boundary.set_external_temperature(ThermodynamicTemperature::new::<kelvin>(310.0));
        boundary
            .set_alpha(crate::support::constraint::NonNegative::new(HeatTransfer::new::<
                watt_per_square_meter_kelvin,
            >(12.0))
            .unwrap());
        assert_relative_eq!(boundary.external_temperature().get::<kelvin>(), 310.0);
        assert_relative_eq!(
            boundary.alpha().get::<watt_per_square_meter_kelvin>(),
            12.0
        );

        let mut solid = solid(0, 2.0, 0.0, [0.5, 0.5], [1, 1, 1, 1]);
        let surface = StrictlyPositive::new(Area::new::<square_meter>(3.0)).unwrap();
        solid.set_surfaces([surface; FACES]);
        assert_relative_eq!(solid.surfaces()[2].get::<square_meter>(), 3.0);
    }
}
