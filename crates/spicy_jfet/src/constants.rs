//! Physical constants and the temperature helpers shared by junction devices.

/// Boltzmann constant (J/K).
pub const BOLTZMANN: f64 = 1.3806226e-23;
/// Elementary charge (C).
pub const CHARGE: f64 = 1.6021918e-19;
/// k/q (V/K).
pub const K_OVER_Q: f64 = BOLTZMANN / CHARGE;
/// Reference temperature for the bandgap model (K).
pub const REFTEMP: f64 = 300.15;
/// Offset between Celsius and Kelvin.
pub const CELSIUS_TO_KELVIN: f64 = 273.15;
/// Silicon bandgap at `REFTEMP` divided by 2k, used by the junction potential model.
const EG_REF_OVER_2K: f64 = 1.1150877 / (BOLTZMANN * (REFTEMP + REFTEMP));

/// Thermal voltage kT/q at `temp` kelvin.
pub fn thermal_voltage(temp: f64) -> f64 {
    temp * K_OVER_Q
}

/// Silicon bandgap energy (eV) at `temp` kelvin.
pub fn silicon_bandgap(temp: f64) -> f64 {
    1.16 - (7.02e-4 * temp * temp) / (temp + 1108.0)
}

/// Additive term of the junction potential temperature model.
///
/// A built-in potential `pbo` extrapolated to `REFTEMP` maps to
/// `pb(T) = T/REFTEMP * pbo + junction_potential_shift(T)`.
pub fn junction_potential_shift(temp: f64) -> f64 {
    let vt = thermal_voltage(temp);
    let fact = temp / REFTEMP;
    let kt = BOLTZMANN * temp;
    let arg = -silicon_bandgap(temp) / (kt + kt) + EG_REF_OVER_2K;
    -2.0 * vt * (1.5 * fact.ln() + CHARGE * arg)
}
