//! Extensions to [`uom`].
//!
//! This crate uses [`uom`] for all physical quantities carried by mesh nodes
//! (volumes, conductivities, surface areas, temperatures). Two gaps matter
//! here:
//!
//! - [`uom`] has no quantity for volumetric heat generation (W/m³), so
//!   [`VolumetricHeatSource`] defines one.
//! - [`uom`] does not allow subtracting one [`ThermodynamicTemperature`] from
//!   another, so [`TemperatureDifference`] provides a `minus` method that
//!   returns the [`TemperatureInterval`] the energy-balance formulas need.
//!   See uom issues [#380](https://github.com/iliekturtles/uom/issues/380)
//!   and [#289](https://github.com/iliekturtles/uom/issues/289).

use uom::si::{
    ISQ, Quantity, SI,
    f64::{Power, TemperatureInterval, ThermodynamicTemperature, Volume},
    power::watt,
    temperature_interval::kelvin as delta_kelvin,
    thermodynamic_temperature::kelvin as abs_kelvin,
    volume::cubic_meter,
};
use uom::typenum::{N1, N3, P1, Z0};

/// Volumetric heat generation rate, W/m³ in SI.
///
/// Positive values are internal heat sources; negative values are sinks.
pub type VolumetricHeatSource = Quantity<ISQ<N1, P1, N3, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Constructs a [`VolumetricHeatSource`] from a raw W/m³ value.
///
/// The quantity has no named unit in [`uom`], so construction goes through
/// a power-per-volume division.
#[must_use]
pub fn watts_per_cubic_meter(value: f64) -> VolumetricHeatSource {
    Power::new::<watt>(value) / Volume::new::<cubic_meter>(1.0)
}

/// Extension trait for computing temperature differences.
///
/// Subtracts two [`ThermodynamicTemperature`] values (absolute temperatures)
/// and returns a [`TemperatureInterval`] (temperature difference), which can
/// participate in ordinary quantity arithmetic such as
/// `conductance * interval = power`.
pub trait TemperatureDifference {
    /// Returns the temperature difference `self - other`.
    fn minus(self, other: Self) -> TemperatureInterval;
}

impl TemperatureDifference for ThermodynamicTemperature {
    fn minus(self, other: Self) -> TemperatureInterval {
        TemperatureInterval::new::<delta_kelvin>(
            self.get::<abs_kelvin>() - other.get::<abs_kelvin>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        f64::ThermalConductance, thermal_conductance::watt_per_kelvin,
        thermodynamic_temperature::kelvin,
    };

    #[test]
    fn volumetric_source_roundtrips_through_power() {
        let qv = watts_per_cubic_meter(-9.0);
        let volume = Volume::new::<cubic_meter>(3.0);

        let generated: Power = qv * volume;
        assert_relative_eq!(generated.get::<watt>(), -27.0);
    }

    #[test]
    fn conductance_times_difference_is_power() {
        let wall = ThermodynamicTemperature::new::<kelvin>(342.0);
        let volume_center = ThermodynamicTemperature::new::<kelvin>(320.0);
        let conductance = ThermalConductance::new::<watt_per_kelvin>(6.0);

        let flux: Power = conductance * wall.minus(volume_center);
        assert_relative_eq!(flux.get::<watt>(), 132.0);

        // Reversing the difference reverses the flux direction.
        let flux: Power = conductance * volume_center.minus(wall);
        assert_relative_eq!(flux.get::<watt>(), -132.0);
    }
}
