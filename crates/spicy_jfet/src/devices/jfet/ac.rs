use num_complex::Complex64;

use super::instance::{JfetInstance, JfetState};
use super::load::{ModelConstants, OperatingPoint};
use super::model::JfetModel;
use crate::error::JfetResult;
use crate::matrix::SolverMatrix;
use crate::state::{History, StateHistory};
use crate::util::get_complex_diff;

/// Small-signal terminal quantities of one instance at one frequency.
/// Currents flow into the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcCurrents {
    pub vgs: Complex64,
    pub vgd: Complex64,
    pub gate: Complex64,
    pub drain: Complex64,
    pub source: Complex64,
    /// Gate-drain junction current.
    pub gate_drain: Complex64,
}

/// Small-signal admittances read back from a converged operating point.
#[derive(Debug, Clone, Copy)]
struct SmallSignal {
    op: OperatingPoint,
    xgs: f64,
    xgd: f64,
}

impl SmallSignal {
    fn read(inst: &JfetInstance, states: &StateHistory, omega: f64) -> JfetResult<Self> {
        let slot = inst.slot()?;
        Ok(Self {
            op: OperatingPoint::read(states, slot),
            xgs: states.get(History::Current, slot, JfetState::Qgs) * omega,
            xgd: states.get(History::Current, slot, JfetState::Qgd) * omega,
        })
    }
}

impl JfetModel {
    /// Stamp the complex small-signal admittances of every instance.
    ///
    /// Expects a small-signal load to have left the junction capacitances
    /// in the charge slots. Nothing is added to the RHS.
    pub fn ac_load(
        &self,
        omega: f64,
        states: &StateHistory,
        matrix: &mut SolverMatrix,
    ) -> JfetResult<()> {
        let constants = ModelConstants::of(self);
        for inst in &self.instances {
            let SmallSignal { op, xgs, xgd } = SmallSignal::read(inst, states, omega)?;
            let (gdpr, gspr) = constants.series_conductances(inst);
            let s = &inst.stamp;

            matrix.add(s.d_d, gdpr);
            matrix.add(s.g_g, op.ggd + op.ggs);
            matrix.add_imag(s.g_g, xgd + xgs);
            matrix.add(s.s_s, gspr);
            matrix.add(s.dp_dp, gdpr + op.gds + op.ggd);
            matrix.add_imag(s.dp_dp, xgd);
            matrix.add(s.sp_sp, gspr + op.gds + op.gm + op.ggs);
            matrix.add_imag(s.sp_sp, xgs);
            matrix.add(s.d_dp, -gdpr);
            matrix.add(s.g_dp, -op.ggd);
            matrix.add_imag(s.g_dp, -xgd);
            matrix.add(s.g_sp, -op.ggs);
            matrix.add_imag(s.g_sp, -xgs);
            matrix.add(s.s_sp, -gspr);
            matrix.add(s.dp_d, -gdpr);
            matrix.add(s.dp_g, -op.ggd + op.gm);
            matrix.add_imag(s.dp_g, -xgd);
            matrix.add(s.dp_sp, -op.gds - op.gm);
            matrix.add(s.sp_g, -op.ggs - op.gm);
            matrix.add_imag(s.sp_g, -xgs);
            matrix.add(s.sp_s, -gspr);
            matrix.add(s.sp_dp, -op.gds);
        }
        Ok(())
    }
}

impl JfetInstance {
    /// Terminal currents for a complex node-voltage solution at `omega`.
    pub fn ac_currents(
        &self,
        states: &StateHistory,
        omega: f64,
        voltages: &[Complex64],
    ) -> JfetResult<AcCurrents> {
        let SmallSignal { op, xgs, xgd } = SmallSignal::read(self, states, omega)?;
        let n = &self.nodes;
        let vgs = get_complex_diff(voltages, n.gate, n.source_prime);
        let vgd = get_complex_diff(voltages, n.gate, n.drain_prime);
        let vds = get_complex_diff(voltages, n.drain_prime, n.source_prime);

        let ygs = Complex64::new(op.ggs, xgs);
        let ygd = Complex64::new(op.ggd, xgd);
        let gate_drain = ygd * vgd;
        let gate = ygs * vgs + gate_drain;
        let drain = op.gm * vgs + op.gds * vds - gate_drain;
        Ok(AcCurrents {
            vgs,
            vgd,
            gate,
            drain,
            source: -(gate + drain),
            gate_drain,
        })
    }
}
