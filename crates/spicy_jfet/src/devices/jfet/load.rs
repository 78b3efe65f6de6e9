use super::charge::DepletionCharge;
use super::evaluate::{ChannelParams, DcSolution, JunctionParams, evaluate};
use super::instance::{JfetInstance, JfetState};
use super::model::JfetModel;
use crate::analysis::{InitPhase, LoadMode};
use crate::config::SimulationConfig;
use crate::convergence::ConvergenceReport;
use crate::devices::limit::{fetlim, pnjlim};
use crate::error::JfetResult;
use crate::integrate::Integrator;
use crate::matrix::SolverMatrix;
use crate::state::{History, StateHistory, StateSlot};
use crate::util::get_voltage_diff;

/// What the driver hands every load call.
#[derive(Debug, Clone, Copy)]
pub struct LoadContext<'a> {
    pub mode: LoadMode,
    pub config: &'a SimulationConfig,
    pub integrator: &'a Integrator,
    /// Previous Newton solution, MNA-indexed.
    pub solution: &'a [f64],
}

/// Model quantities a load needs, copied out so instances can be borrowed
/// mutably while they are used.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ModelConstants {
    pub sign: f64,
    beta: f64,
    lambda: f64,
    pub vto: f64,
    b: f64,
    b_fac: f64,
    drain_conductance: f64,
    source_conductance: f64,
    f2: f64,
    f3: f64,
}

impl ModelConstants {
    pub(crate) fn of(model: &JfetModel) -> Self {
        let p = &model.params;
        Self {
            sign: model.sign(),
            beta: p.beta(),
            lambda: p.lambda(),
            vto: p.vto(),
            b: p.b(),
            b_fac: model.derived.b_fac,
            drain_conductance: model.derived.drain_conductance,
            source_conductance: model.derived.source_conductance,
            f2: model.derived.f2,
            f3: model.derived.f3,
        }
    }

    pub(crate) fn channel(&self, inst: &JfetInstance) -> ChannelParams {
        ChannelParams {
            beta: self.beta * inst.params.area(),
            lambda: self.lambda,
            vto: self.vto,
            b: self.b,
            b_fac: self.b_fac,
        }
    }

    pub(crate) fn junction(&self, inst: &JfetInstance, gmin: f64) -> JunctionParams {
        JunctionParams {
            csat: inst.thermal.sat_cur * inst.params.area(),
            vt: inst.thermal.vt,
            gmin,
        }
    }

    /// Charge laws of the gate-source and gate-drain junctions.
    pub(crate) fn depletion(&self, inst: &JfetInstance) -> (DepletionCharge, DepletionCharge) {
        let t = &inst.thermal;
        let law = |cz: f64| DepletionCharge {
            cz: cz * inst.params.area(),
            pb: t.gate_pot,
            dep_cap: t.dep_cap,
            f1: t.f1,
            f2: self.f2,
            f3: self.f3,
        };
        (law(t.cgs), law(t.cgd))
    }

    /// Ohmic drain and source conductances, area applied.
    pub(crate) fn series_conductances(&self, inst: &JfetInstance) -> (f64, f64) {
        let area = inst.params.area();
        (
            self.drain_conductance * area,
            self.source_conductance * area,
        )
    }
}

/// The quantities stamped for one instance, also kept in state0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct OperatingPoint {
    pub vgs: f64,
    pub vgd: f64,
    pub cg: f64,
    pub cd: f64,
    pub cgd: f64,
    pub gm: f64,
    pub gds: f64,
    pub ggs: f64,
    pub ggd: f64,
}

impl From<DcSolution> for OperatingPoint {
    fn from(dc: DcSolution) -> Self {
        Self {
            vgs: dc.vgs,
            vgd: dc.vgd,
            cg: dc.cg,
            cd: dc.cd,
            cgd: dc.cgd,
            gm: dc.gm,
            gds: dc.gds,
            ggs: dc.ggs,
            ggd: dc.ggd,
        }
    }
}

impl OperatingPoint {
    pub(crate) fn read(states: &StateHistory, slot: StateSlot) -> Self {
        let s0 = |field: JfetState| states.get(History::Current, slot, field);
        Self {
            vgs: s0(JfetState::Vgs),
            vgd: s0(JfetState::Vgd),
            cg: s0(JfetState::Cg),
            cd: s0(JfetState::Cd),
            cgd: s0(JfetState::Cgd),
            gm: s0(JfetState::Gm),
            gds: s0(JfetState::Gds),
            ggs: s0(JfetState::Ggs),
            ggd: s0(JfetState::Ggd),
        }
    }

    fn write(&self, states: &mut StateHistory, slot: StateSlot) {
        for (field, value) in [
            (JfetState::Vgs, self.vgs),
            (JfetState::Vgd, self.vgd),
            (JfetState::Cg, self.cg),
            (JfetState::Cd, self.cd),
            (JfetState::Cgd, self.cgd),
            (JfetState::Gm, self.gm),
            (JfetState::Gds, self.gds),
            (JfetState::Ggs, self.ggs),
            (JfetState::Ggd, self.ggd),
        ] {
            states.set(History::Current, slot, field, value);
        }
    }
}

impl JfetModel {
    /// DC equations of `inst` at external terminal voltages, without
    /// limiting or history. The result is in the device's own polarity.
    ///
    /// Needs a temperature pass first.
    pub fn dc_solution(&self, inst: &JfetInstance, vgs: f64, vds: f64, gmin: f64) -> DcSolution {
        let constants = ModelConstants::of(self);
        let vgs = constants.sign * vgs;
        let vgd = vgs - constants.sign * vds;
        evaluate(
            &constants.channel(inst),
            &constants.junction(inst, gmin),
            vgs,
            vgd,
        )
    }
}

impl JfetModel {
    /// Load every instance of the model into `matrix` for one Newton iteration.
    pub fn load(
        &mut self,
        ctx: &LoadContext,
        states: &mut StateHistory,
        matrix: &mut SolverMatrix,
        report: &mut ConvergenceReport,
    ) -> JfetResult<()> {
        let constants = ModelConstants::of(self);
        for inst in &mut self.instances {
            load_instance(&constants, inst, ctx, states, matrix, report)?;
        }
        Ok(())
    }
}

fn load_instance(
    model: &ModelConstants,
    inst: &mut JfetInstance,
    ctx: &LoadContext,
    states: &mut StateHistory,
    matrix: &mut SolverMatrix,
    report: &mut ConvergenceReport,
) -> JfetResult<()> {
    let slot = inst.slot()?;
    let mode = ctx.mode;
    let config = ctx.config;
    let sign = model.sign;

    let mut icheck = true;
    let mut cghat = 0.0;
    let mut cdhat = 0.0;

    let (vgs, vgd) = match mode.init {
        InitPhase::SmallSignal => (
            states.get(History::Current, slot, JfetState::Vgs),
            states.get(History::Current, slot, JfetState::Vgd),
        ),
        InitPhase::Transient => (
            states.get(History::Previous, slot, JfetState::Vgs),
            states.get(History::Previous, slot, JfetState::Vgd),
        ),
        InitPhase::Junction if mode.is_tranop_uic() => {
            let vds = sign * inst.params.ic_vds.unwrap_or(0.0);
            let vgs = sign * inst.params.ic_vgs.unwrap_or(0.0);
            (vgs, vgs - vds)
        }
        InitPhase::Junction if !inst.params.off => (-1.0, -1.0),
        InitPhase::Junction => (0.0, 0.0),
        InitPhase::Fix if inst.params.off => (0.0, 0.0),
        _ => {
            let (vgs, vgd) = if mode.init == InitPhase::Predict {
                predict(states, slot, ctx.integrator.predictor_factor())
            } else {
                let n = inst.nodes;
                (
                    sign * get_voltage_diff(ctx.solution, n.gate, n.source_prime),
                    sign * get_voltage_diff(ctx.solution, n.gate, n.drain_prime),
                )
            };

            let last = OperatingPoint::read(states, slot);
            let delvgs = vgs - last.vgs;
            let delvgd = vgd - last.vgd;
            let delvds = delvgs - delvgd;
            cghat = last.cg + last.ggd * delvgd + last.ggs * delvgs;
            cdhat = last.cd + last.gm * delvgs + last.gds * delvds - last.ggd * delvgd;

            if config.bypass
                && mode.init != InitPhase::Predict
                && config.within_tolerance(vgs, last.vgs, config.vntol)
                && config.within_tolerance(vgd, last.vgd, config.vntol)
                && config.within_tolerance(cghat, last.cg, config.abstol)
                && config.within_tolerance(cdhat, last.cd, config.abstol)
            {
                report.bypassed += 1;
                stamp(model, inst, &last, matrix);
                return Ok(());
            }

            let vt = inst.thermal.vt;
            let vcrit = inst.thermal.vcrit;
            let (vgs, gs_limited) = pnjlim(vgs, last.vgs, vt, vcrit);
            let (vgd, gd_limited) = pnjlim(vgd, last.vgd, vt, vcrit);
            let (vgs, gs_fet_limited) = fetlim(vgs, last.vgs, model.vto);
            let (vgd, gd_fet_limited) = fetlim(vgd, last.vgd, model.vto);
            icheck = gs_limited || gd_limited || gs_fet_limited || gd_fet_limited;
            (vgs, vgd)
        }
    };

    let dc = evaluate(
        &model.channel(inst),
        &model.junction(inst, config.gmin),
        vgs,
        vgd,
    );
    inst.mode = dc.mode;
    let mut op = OperatingPoint::from(dc);

    if mode.needs_charge() {
        let (gs_law, gd_law) = model.depletion(inst);
        let (qgs, capgs) = gs_law.charge(vgs);
        let (qgd, capgd) = gd_law.charge(vgd);
        states.set(History::Current, slot, JfetState::Qgs, qgs);
        states.set(History::Current, slot, JfetState::Qgd, qgd);

        if !mode.is_tranop_uic() {
            if mode.init == InitPhase::SmallSignal {
                // AC reads capacitances from the charge slots
                states.set(History::Current, slot, JfetState::Qgs, capgs);
                states.set(History::Current, slot, JfetState::Qgd, capgd);
                return Ok(());
            }

            if mode.init == InitPhase::Transient {
                states.copy_current_to_previous(slot, JfetState::Qgs);
                states.copy_current_to_previous(slot, JfetState::Qgd);
            }

            let integrator = ctx.integrator;
            let (geq, _) =
                integrator.integrate(states, slot, JfetState::Qgs, JfetState::Cqgs, capgs);
            op.ggs += geq;
            op.cg += states.get(History::Current, slot, JfetState::Cqgs);

            let (geq, _) =
                integrator.integrate(states, slot, JfetState::Qgd, JfetState::Cqgd, capgd);
            let cqgd = states.get(History::Current, slot, JfetState::Cqgd);
            op.ggd += geq;
            op.cg += cqgd;
            op.cd -= cqgd;
            op.cgd += cqgd;

            if mode.init == InitPhase::Transient {
                states.copy_current_to_previous(slot, JfetState::Cqgs);
                states.copy_current_to_previous(slot, JfetState::Cqgd);
            }
        }
    }

    if !(mode.init == InitPhase::Fix && mode.uic) {
        let tol =
            |hat: f64, actual: f64| config.reltol * hat.abs().max(actual.abs()) + config.abstol;
        if icheck
            || (cghat - op.cg).abs() >= tol(cghat, op.cg)
            || (cdhat - op.cd).abs() > tol(cdhat, op.cd)
        {
            report.not_converged(&inst.name);
        }
    }

    op.write(states, slot);
    stamp(model, inst, &op, matrix);
    Ok(())
}

/// Extrapolate the junction voltages of a new time point from the two
/// previous ones and carry the last operating point into state0.
fn predict(states: &mut StateHistory, slot: StateSlot, xfact: f64) -> (f64, f64) {
    let mut extrapolate = |field: JfetState| {
        let v1 = states.get(History::Previous, slot, field);
        let v2 = states.get(History::BeforePrevious, slot, field);
        states.set(History::Current, slot, field, v1);
        (1.0 + xfact) * v1 - xfact * v2
    };
    let vgs = extrapolate(JfetState::Vgs);
    let vgd = extrapolate(JfetState::Vgd);
    for field in JfetState::OPERATING_POINT {
        let v1 = states.get(History::Previous, slot, field);
        states.set(History::Current, slot, field, v1);
    }
    (vgs, vgd)
}

/// Stamp the linearized device: equivalent currents into the RHS and
/// conductances into the matrix.
fn stamp(model: &ModelConstants, inst: &JfetInstance, op: &OperatingPoint, m: &mut SolverMatrix) {
    let sign = model.sign;
    let (gdpr, gspr) = model.series_conductances(inst);
    let vds = op.vgs - op.vgd;

    let ceqgd = sign * (op.cgd - op.ggd * op.vgd);
    let ceqgs = sign * ((op.cg - op.cgd) - op.ggs * op.vgs);
    let cdreq = sign * ((op.cd + op.cgd) - op.gds * vds - op.gm * op.vgs);

    let n = &inst.nodes;
    m.add_rhs(n.gate, -ceqgs - ceqgd);
    m.add_rhs(n.drain_prime, -cdreq + ceqgd);
    m.add_rhs(n.source_prime, cdreq + ceqgs);

    let s = &inst.stamp;
    m.add(s.d_dp, -gdpr);
    m.add(s.g_dp, -op.ggd);
    m.add(s.g_sp, -op.ggs);
    m.add(s.s_sp, -gspr);
    m.add(s.dp_d, -gdpr);
    m.add(s.dp_g, op.gm - op.ggd);
    m.add(s.dp_sp, -op.gds - op.gm);
    m.add(s.sp_g, -op.ggs - op.gm);
    m.add(s.sp_s, -gspr);
    m.add(s.sp_dp, -op.gds);
    m.add(s.d_d, gdpr);
    m.add(s.g_g, op.ggd + op.ggs);
    m.add(s.s_s, gspr);
    m.add(s.dp_dp, gdpr + op.gds + op.ggd);
    m.add(s.sp_sp, gspr + op.gds + op.gm + op.ggs);
}
