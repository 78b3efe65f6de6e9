use log::warn;

use super::instance::{InstanceThermal, JfetInstance};
use super::model::{JfetModel, ModelDerived, ModelParams};
use crate::config::SimulationConfig;
use crate::constants::{REFTEMP, junction_potential_shift, thermal_voltage};

/// Largest forward-bias fit coefficient the depletion charge supports.
pub const MAX_FC: f64 = 0.95;

/// A recoverable problem found while scaling a model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelWarning {
    /// `fc` exceeded `MAX_FC` and was limited to it.
    DepletionCapClamped { model: String, given: f64 },
}

impl std::fmt::Display for ModelWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DepletionCapClamped { model, .. } => write!(
                f,
                "{model}: depletion cap. coefficient too large, limited to {MAX_FC}"
            ),
        }
    }
}

impl JfetModel {
    /// Recompute every temperature-dependent quantity of the model and its
    /// instances.
    pub fn temperature(&mut self, config: &SimulationConfig) -> Vec<ModelWarning> {
        let mut warnings = Vec::new();

        let fc = self.params.fc();
        if fc > MAX_FC {
            let warning = ModelWarning::DepletionCapClamped {
                model: self.name.clone(),
                given: fc,
            };
            warn!("{warning}");
            warnings.push(warning);
            self.params.fc = Some(MAX_FC);
        }

        self.derived = model_derived(self, config);
        for instance in &mut self.instances {
            instance.thermal = instance_thermal(&self.params, &self.derived, instance, config);
        }
        warnings
    }
}

fn model_derived(model: &JfetModel, config: &SimulationConfig) -> ModelDerived {
    let p = &model.params;
    let tnom = p.tnom.unwrap_or(config.nominal_temp);
    let fact1 = tnom / REFTEMP;
    let pbo = (p.pb() - junction_potential_shift(tnom)) / fact1;
    let gmaold = (p.pb() - pbo) / pbo;
    let cjfact = 1.0 / (1.0 + 0.5 * (4e-4 * (tnom - REFTEMP) - gmaold));

    let conductance = |r: f64| if r != 0.0 { 1.0 / r } else { 0.0 };

    let xfc = (1.0 - p.fc()).ln();
    ModelDerived {
        tnom,
        drain_conductance: conductance(p.rd()),
        source_conductance: conductance(p.rs()),
        f2: (1.5 * xfc).exp(),
        f3: 1.0 - 1.5 * p.fc(),
        b_fac: (1.0 - p.b()) / (p.pb() - p.vto()),
        pbo,
        cjfact,
        xfc,
    }
}

fn instance_thermal(
    params: &ModelParams,
    derived: &ModelDerived,
    instance: &JfetInstance,
    config: &SimulationConfig,
) -> InstanceThermal {
    let temp = instance.params.temp.unwrap_or(config.temp);
    let vt = thermal_voltage(temp);
    let ratio1 = temp / derived.tnom - 1.0;
    let sat_cur = params.is() * (ratio1 * 1.11 / vt).exp();

    let gate_pot = temp / REFTEMP * derived.pbo + junction_potential_shift(temp);
    let gmanew = (gate_pot - derived.pbo) / derived.pbo;
    let cjfact1 = 1.0 + 0.5 * (4e-4 * (temp - REFTEMP) - gmanew);

    InstanceThermal {
        temp,
        vt,
        sat_cur,
        gate_pot,
        cgs: params.cgs() * derived.cjfact * cjfact1,
        cgd: params.cgd() * derived.cjfact * cjfact1,
        dep_cap: params.fc() * gate_pot,
        f1: gate_pot * (1.0 - (0.5 * derived.xfc).exp()) / 0.5,
        vcrit: vt * (vt / (std::f64::consts::SQRT_2 * sat_cur)).ln(),
    }
}
