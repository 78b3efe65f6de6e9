use serde::Serialize;

use crate::constants::REFTEMP;

/// Circuit-wide options consumed by the device kernel.
///
/// Temperatures are in kelvin.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationConfig {
    /// Circuit temperature, used by instances without their own `temp`.
    pub temp: f64,
    /// Nominal temperature, used by models without their own `tnom`.
    pub nominal_temp: f64,
    /// Conductance added in parallel with every junction.
    pub gmin: f64,
    pub reltol: f64,
    /// Absolute current tolerance (A).
    pub abstol: f64,
    /// Absolute voltage tolerance (V).
    pub vntol: f64,
    /// Skip re-evaluation of devices whose operating point did not move.
    pub bypass: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            temp: REFTEMP,
            nominal_temp: REFTEMP,
            gmin: 1e-12,
            reltol: 1e-3,
            abstol: 1e-12,
            vntol: 1e-6,
            bypass: true,
        }
    }
}

impl SimulationConfig {
    /// `|a - b|` is within `reltol * max(|a|, |b|) + abs`.
    pub(crate) fn within_tolerance(&self, a: f64, b: f64, abs: f64) -> bool {
        (a - b).abs() < self.reltol * a.abs().max(b.abs()) + abs
    }
}
