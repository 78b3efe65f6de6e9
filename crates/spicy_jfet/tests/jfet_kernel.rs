use insta::assert_snapshot;
use num_complex::Complex64;
use rstest::rstest;
use spicy_jfet::devices::jfet::evaluate::Region;
use spicy_jfet::devices::jfet::instance::JfetState;
use spicy_jfet::devices::jfet::params::{
    AcSolution, InstanceParam, ModelParam, ParamValue, QueryContext,
};
use spicy_jfet::volterra::MixingInputs;
use spicy_jfet::{
    Analysis, ConvergenceReport, History, InitPhase, IntegrationMethod, Integrator, JfetDevices,
    JfetError, JfetInstance, JfetModel, JfetType, LoadContext, LoadMode, ModelParams, NodeTable,
    SimulationConfig, SolverMatrix, StateAllocator, StateHistory,
};

/// One JFET between three floating nodes `d`, `g` and `s`.
struct Circuit {
    nodes: NodeTable,
    devices: JfetDevices,
    states: StateHistory,
    matrix: SolverMatrix,
    config: SimulationConfig,
    integrator: Integrator,
}

impl Circuit {
    fn new(model: JfetModel, config: SimulationConfig) -> Self {
        let mut nodes = NodeTable::new();
        let d = nodes.node("d");
        let g = nodes.node("g");
        let s = nodes.node("s");
        let mut model = model;
        model.add_instance(JfetInstance::new("J1", d, g, s));

        let mut devices = JfetDevices::new();
        devices.add_model(model);
        let mut alloc = StateAllocator::new();
        let matrix = devices.setup(&mut nodes, &mut alloc).unwrap();
        assert!(devices.temperature(&config).is_empty());

        Self {
            nodes,
            devices,
            states: StateHistory::new(alloc.len()),
            matrix,
            config,
            integrator: Integrator::new(IntegrationMethod::BackwardEuler, 1e-9),
        }
    }

    fn index(&self, name: &str) -> usize {
        let node = self.nodes.get(name).unwrap();
        self.nodes.mna_index(node).unwrap()
    }

    /// MNA solution with the given terminal voltages; internal nodes sit
    /// at their external node's voltage.
    fn bias(&self, vd: f64, vg: f64, vs: f64) -> Vec<f64> {
        let mut x = vec![0.0; self.matrix.dim()];
        let n = self.devices.instance("J1").unwrap().1.mna_nodes();
        for (node, v) in [
            (n.drain, vd),
            (n.drain_prime, vd),
            (n.gate, vg),
            (n.source, vs),
            (n.source_prime, vs),
        ] {
            if let Some(i) = node {
                x[i] = v;
            }
        }
        x
    }

    fn load(&mut self, mode: LoadMode, solution: &[f64]) -> ConvergenceReport {
        let ctx = LoadContext {
            mode,
            config: &self.config,
            integrator: &self.integrator,
            solution,
        };
        let mut report = ConvergenceReport::new();
        self.matrix.clear();
        self.devices
            .load(&ctx, &mut self.states, &mut self.matrix, &mut report)
            .unwrap();
        report
    }

    /// Repeat DC loads at a fixed solution until the device stops limiting
    /// and its currents agree with their prediction.
    fn settle(&mut self, solution: &[f64]) -> usize {
        let mode = LoadMode::new(Analysis::DcOp, InitPhase::Float);
        for pass in 1..=20 {
            if self.load(mode, solution).converged() {
                return pass;
            }
        }
        panic!("device did not settle");
    }

    fn ask(&self, param: InstanceParam) -> ParamValue {
        let ctx = QueryContext {
            states: &self.states,
            ac: None,
        };
        self.devices.ask_instance("J1", param, &ctx).unwrap()
    }

    fn real(&self, param: InstanceParam) -> f64 {
        match self.ask(param) {
            ParamValue::Real(v) => v,
            other => panic!("{param:?} is not real: {other:?}"),
        }
    }

    fn rhs_sum(&self) -> f64 {
        self.matrix.rhs().iter().sum()
    }

    /// Largest absolute column sum of the real (or imaginary) part.
    fn worst_column_sum(&self, imag: bool) -> f64 {
        let n = self.matrix.dim();
        (0..n)
            .map(|col| {
                (0..n)
                    .map(|row| {
                        if imag {
                            self.matrix.imag_value(row, col)
                        } else {
                            self.matrix.value(row, col)
                        }
                    })
                    .sum::<f64>()
                    .abs()
            })
            .fold(0.0, f64::max)
    }
}

fn plain_model(jfet_type: JfetType) -> JfetModel {
    JfetModel::new("jmod", jfet_type).with_params(ModelParams {
        vto: Some(-2.0),
        beta: Some(1e-4),
        lambda: Some(0.0),
        ..ModelParams::default()
    })
}

fn parasitic_model() -> JfetModel {
    JfetModel::new("jpar", JfetType::N).with_params(ModelParams {
        vto: Some(-2.0),
        beta: Some(1e-3),
        lambda: Some(0.02),
        rd: Some(10.0),
        rs: Some(5.0),
        cgs: Some(1e-12),
        cgd: Some(0.5e-12),
        b: Some(0.7),
        ..ModelParams::default()
    })
}

#[test]
fn cutoff_stamps_only_gate_junctions() {
    let mut c = Circuit::new(plain_model(JfetType::N), SimulationConfig::default());
    // vgs = -3, vgd = -5
    let x = c.bias(2.0, -3.0, 0.0);
    c.settle(&x);

    assert_eq!(c.real(InstanceParam::Vgs), -3.0);
    assert_eq!(c.real(InstanceParam::Vgd), -5.0);
    assert_eq!(c.real(InstanceParam::Gm), 0.0);
    assert_eq!(c.real(InstanceParam::Gds), 0.0);
    // no channel current: the drain carries only the gate-drain junction
    let id = c.real(InstanceParam::Cd);
    let igd = c.real(InstanceParam::Cgd);
    assert_eq!(id + igd, 0.0);

    let ggs = c.real(InstanceParam::Ggs);
    let ggd = c.real(InstanceParam::Ggd);
    assert!(ggs > 0.0 && ggd > 0.0);

    let (d, g, s) = (c.index("d"), c.index("g"), c.index("s"));
    let m = &c.matrix;
    assert_eq!(m.value(g, g), ggs + ggd);
    assert_eq!(m.value(d, d), ggd);
    assert_eq!(m.value(s, s), ggs);
    assert_eq!(m.value(d, g), -ggd);
    assert_eq!(m.value(g, d), -ggd);
    assert_eq!(m.value(s, g), -ggs);
    assert_eq!(m.value(g, s), -ggs);
    assert_eq!(m.value(d, s), 0.0);
    assert_eq!(m.value(s, d), 0.0);
}

#[rstest]
#[case(JfetType::N, 0.5, Region::Linear, 1.75e-4)]
#[case(JfetType::N, 3.0, Region::Saturation, 4e-4)]
#[case(JfetType::P, 0.5, Region::Linear, 1.75e-4)]
#[case(JfetType::P, 3.0, Region::Saturation, 4e-4)]
fn conducting_channel_follows_the_square_law(
    #[case] jfet_type: JfetType,
    #[case] vds: f64,
    #[case] region: Region,
    #[case] expected: f64,
) {
    let mut c = Circuit::new(plain_model(jfet_type), SimulationConfig::default());
    let sign = jfet_type.sign();
    let x = c.bias(sign * vds, 0.0, 0.0);
    c.settle(&x);

    let (model, inst) = c.devices.instance("J1").unwrap();
    let dc = model.dc_solution(inst, 0.0, sign * vds, c.config.gmin);
    assert_eq!(dc.region, region);

    // drain current in the terminal's own sign, gate leakage aside
    let id = c.real(InstanceParam::Cd) + c.real(InstanceParam::Cgd);
    assert!(
        (sign * id - expected).abs() < 1e-9 * expected,
        "{jfet_type:?} vds={vds}: {id}"
    );
    assert_eq!(c.real(InstanceParam::Vgs), 0.0);
}

#[rstest]
#[case(3.0, -0.5)]
#[case(0.3, 0.0)]
#[case(-1.5, -1.8)]
fn stamps_conserve_current(#[case] vds: f64, #[case] vgs: f64) {
    let mut c = Circuit::new(parasitic_model(), SimulationConfig::default());
    let x = c.bias(1.0 + vds, 1.0 + vgs, 1.0);
    c.settle(&x);

    assert!(c.rhs_sum().abs() < 1e-15);
    assert!(c.worst_column_sum(false) < 1e-12);
}

#[test]
fn transient_step_adds_capacitor_companions() {
    let mut c = Circuit::new(parasitic_model(), SimulationConfig::default());
    let x = c.bias(3.0, -0.5, 0.0);
    c.settle(&x);
    let g = c.index("g");
    let dc_gate = c.matrix.value(g, g);

    c.states.rotate();
    let report = c.load(LoadMode::new(Analysis::Transient, InitPhase::Transient), &x);
    // the first step never claims convergence
    assert!(!report.converged());
    assert!(c.rhs_sum().abs() < 1e-15);
    assert!(c.worst_column_sum(false) < 1e-9);

    // zero-bias 1 pF and 0.5 pF at vgs = -0.5 and vgd = -3.5
    let caps = 1e-12 / 1.5f64.sqrt() + 0.5e-12 / 4.5f64.sqrt();
    let added = c.matrix.value(g, g) - dc_gate;
    let expected = caps / 1e-9;
    assert!(
        (added - expected).abs() < 2e-2 * expected,
        "{added} vs {expected}"
    );
    // the charge history starts flat
    assert_eq!(c.real(InstanceParam::Cqgs), 0.0);
    let qgs = c.real(InstanceParam::Qgs);
    let slot = c.devices.instance("J1").unwrap().1.state_slot().unwrap();
    assert_eq!(c.states.get(History::Previous, slot, JfetState::Qgs), qgs);
}

#[test]
fn bypass_reuses_the_stored_linearization() {
    let bias = |c: &Circuit| c.bias(2.5, -0.7, 0.0);

    let mut with = Circuit::new(parasitic_model(), SimulationConfig::default());
    let x = bias(&with);
    with.settle(&x);
    let report = with.load(LoadMode::new(Analysis::DcOp, InitPhase::Float), &x);
    assert_eq!(report.bypassed, 1);
    assert!(report.converged());

    let mut without = Circuit::new(
        parasitic_model(),
        SimulationConfig {
            bypass: false,
            ..SimulationConfig::default()
        },
    );
    without.settle(&x);
    let report = without.load(LoadMode::new(Analysis::DcOp, InitPhase::Float), &x);
    assert_eq!(report.bypassed, 0);

    assert_eq!(with.matrix.rhs(), without.matrix.rhs());
    let n = with.matrix.dim();
    for row in 0..n {
        for col in 0..n {
            assert_eq!(with.matrix.value(row, col), without.matrix.value(row, col));
        }
    }
}

#[test]
fn junction_init_starts_below_threshold_unless_off() {
    let mut c = Circuit::new(plain_model(JfetType::N), SimulationConfig::default());
    let x = c.bias(0.0, 0.0, 0.0);
    let report = c.load(LoadMode::new(Analysis::DcOp, InitPhase::Junction), &x);
    assert!(!report.converged());
    assert_eq!(report.trouble.as_deref(), Some("J1"));
    assert_eq!(c.real(InstanceParam::Vgs), -1.0);
    assert_eq!(c.real(InstanceParam::Vgd), -1.0);

    c.devices
        .set_instance_param("J1", InstanceParam::Off, &ParamValue::Flag(true))
        .unwrap();
    c.load(LoadMode::new(Analysis::DcOp, InitPhase::Junction), &x);
    assert_eq!(c.real(InstanceParam::Vgs), 0.0);
}

#[test]
fn small_signal_pass_feeds_the_ac_stamp() {
    let mut c = Circuit::new(parasitic_model(), SimulationConfig::default());
    let x = c.bias(3.0, -0.5, 0.0);
    c.settle(&x);
    let gm = c.real(InstanceParam::Gm);

    let report = c.load(LoadMode::new(Analysis::Ac, InitPhase::SmallSignal), &x);
    // nothing is stamped by the small-signal pass
    assert!(c.matrix.rhs().iter().all(|&v| v == 0.0));
    assert!(report.converged());

    let omega = 2.0 * std::f64::consts::PI * 1e6;
    c.devices.ac_load(omega, &c.states, &mut c.matrix).unwrap();
    assert!(c.worst_column_sum(false) < 1e-12);
    assert!(c.worst_column_sum(true) < 1e-18);
    assert!(c.matrix.rhs().iter().all(|&v| v == 0.0));

    let g = c.index("g");
    let capgs = c.real(InstanceParam::Qgs);
    let capgd = c.real(InstanceParam::Qgd);
    assert!(capgs > capgd && capgd > 0.0);
    let xg = c.matrix.imag_value(g, g);
    assert!((xg - omega * (capgs + capgd)).abs() < 1e-12 * xg);

    // a 1 V gate phasor drives gm into the drain
    let mut v = vec![Complex64::new(0.0, 0.0); c.matrix.dim()];
    v[g] = Complex64::new(1.0, 0.0);
    let ctx = QueryContext {
        states: &c.states,
        ac: Some(AcSolution {
            omega,
            voltages: &v,
        }),
    };
    let ask = |p| match c.devices.ask_instance("J1", p, &ctx).unwrap() {
        ParamValue::Complex(z) => z,
        other => panic!("{p:?} is not complex: {other:?}"),
    };
    let (ig, id, is) = (
        ask(InstanceParam::Cg),
        ask(InstanceParam::Cd),
        ask(InstanceParam::Cs),
    );
    assert!((ig + id + is).norm() < 1e-18);
    assert!(ig.im > 0.0);
    // drain and source are grounded in this phasor, so only gm and the
    // gate-drain capacitance reach the drain
    assert!((id.re - gm).abs() < 1e-6 * gm);
}

#[test]
fn distortion_currents_balance() {
    let mut c = Circuit::new(parasitic_model(), SimulationConfig::default());
    let x = c.bias(3.0, -0.5, 0.0);
    c.settle(&x);

    let n = c.matrix.dim();
    let h1: Vec<Complex64> = (0..n)
        .map(|i| Complex64::new(0.1 * (i as f64 + 1.0), -0.05 * i as f64))
        .collect();

    c.matrix.clear();
    let inputs = MixingInputs::SecondHarmonic { h1: h1.as_slice() };
    let err = c
        .devices
        .distortion_load(&inputs, 1e6, 0.0, &mut c.matrix)
        .unwrap_err();
    assert!(matches!(err, JfetError::DistortionNotSetUp { .. }));

    c.devices.distortion_setup(&c.config, &x);
    let coeffs = *c.devices.instance("J1").unwrap().1.distortion().unwrap();
    assert!(coeffs.channel.x > 0.0);

    c.devices
        .distortion_load(&inputs, 1e6, 0.0, &mut c.matrix)
        .unwrap();
    let re: f64 = c.matrix.rhs().iter().sum();
    let im: f64 = c.matrix.irhs().iter().sum();
    assert!(re.abs() < 1e-18 && im.abs() < 1e-18);
    assert!(c.matrix.rhs().iter().any(|&v| v != 0.0));
    assert!(c.matrix.irhs().iter().any(|&v| v != 0.0));
}

#[test]
fn resetup_returns_internal_nodes() {
    let mut c = Circuit::new(parasitic_model(), SimulationConfig::default());
    assert_eq!(c.matrix.dim(), 5);

    let grid: Vec<String> = (0..5)
        .map(|row| {
            (0..5)
                .map(|col| {
                    if c.matrix.matrix().find(row, col).is_some() {
                        'x'
                    } else {
                        '.'
                    }
                })
                .collect()
        })
        .collect();
    assert_snapshot!(grid.join("\n"), @r"
    x..x.
    .x.xx
    ..x.x
    xx.xx
    .xxxx
    ");

    let internal = |c: &Circuit| {
        let inst = c.devices.instance("J1").unwrap().1;
        let mut nodes = [inst.drain_prime, inst.source_prime];
        nodes.sort();
        nodes
    };
    let before = internal(&c);

    c.devices.unsetup(&mut c.nodes);
    assert_eq!(c.nodes.len(), 4);
    assert!(c.devices.instance("J1").unwrap().1.state_slot().is_none());

    let mut alloc = StateAllocator::new();
    let matrix = c.devices.setup(&mut c.nodes, &mut alloc).unwrap();
    assert_eq!(matrix.dim(), 5);
    assert_eq!(internal(&c), before);
    assert_eq!(c.nodes.name(before[0]).map(|n| n.starts_with("J1#")), Some(true));
}

#[test]
fn initial_conditions_fill_only_missing_values() {
    let mut c = Circuit::new(plain_model(JfetType::N), SimulationConfig::default());
    c.devices
        .set_instance_param("J1", InstanceParam::IcVds, &ParamValue::Real(4.0))
        .unwrap();
    let x = c.bias(2.0, -0.25, 0.5);
    c.devices.set_initial_conditions(&x);

    assert_eq!(
        c.ask(InstanceParam::Ic),
        ParamValue::Vector(vec![4.0, -0.75])
    );
}

#[test]
fn unknown_instances_are_reported() {
    let c = Circuit::new(plain_model(JfetType::N), SimulationConfig::default());
    let ctx = QueryContext {
        states: &c.states,
        ac: None,
    };
    let err = c
        .devices
        .ask_instance("J9", InstanceParam::Vgs, &ctx)
        .unwrap_err();
    assert_snapshot!(err.to_string(), @"no such device: J9");
}

#[test]
fn dropping_a_series_resistance_releases_its_internal_node() {
    let mut c = Circuit::new(parasitic_model(), SimulationConfig::default());
    let drain_prime = c.devices.instance("J1").unwrap().1.drain_prime;
    assert_eq!(c.nodes.get("J1#drain"), Some(drain_prime));

    c.devices
        .set_model_param("jpar", ModelParam::Rd, &ParamValue::Real(0.0))
        .unwrap();
    let mut alloc = StateAllocator::new();
    c.devices.setup(&mut c.nodes, &mut alloc).unwrap();

    let d = c.nodes.get("d").unwrap();
    assert_eq!(c.devices.instance("J1").unwrap().1.drain_prime, d);
    assert_eq!(c.nodes.get("J1#drain"), None);

    c.devices.unsetup(&mut c.nodes);
    assert_eq!(c.nodes.get("d"), Some(d));
    assert_eq!(c.nodes.get("J1#source"), None);
    assert_eq!(c.nodes.len(), 4);
}

#[rstest]
// forward gate step: pnjlim compresses it onto a log scale
#[case(2.0, None)]
// deep reverse step: fetlim stops it half a volt below threshold
#[case(-10.0, Some(-2.5))]
fn limited_steps_are_reported_as_not_converged(
    #[case] vg: f64,
    #[case] expected: Option<f64>,
) {
    let mut c = Circuit::new(plain_model(JfetType::N), SimulationConfig::default());
    let x = c.bias(0.0, vg, 0.0);
    let report = c.load(LoadMode::new(Analysis::DcOp, InitPhase::Float), &x);

    assert_eq!(report.noncon, 1);
    assert_eq!(report.trouble.as_deref(), Some("J1"));

    let vt = c.devices.instance("J1").unwrap().1.thermal.vt;
    let expected = expected.unwrap_or(vt * (vg / vt).ln());
    let vgs = c.real(InstanceParam::Vgs);
    assert!((vgs - expected).abs() < 1e-12, "{vgs} vs {expected}");
    assert_eq!(c.real(InstanceParam::Vgd), vgs);
}

#[test]
fn predictor_extrapolates_the_last_two_time_points() {
    let mut c = Circuit::new(plain_model(JfetType::N), SimulationConfig::default());
    // xfact = step / previous step = 0.5
    c.integrator.previous_step = 2e-9;
    let xfact = c.integrator.predictor_factor();
    assert_eq!(xfact, 0.5);

    let slot = c.devices.instance("J1").unwrap().1.state_slot().unwrap();
    for (which, vgs, vgd) in [
        (History::Previous, -0.4, -2.4),
        (History::BeforePrevious, -0.6, -2.6),
    ] {
        c.states.set(which, slot, JfetState::Vgs, vgs);
        c.states.set(which, slot, JfetState::Vgd, vgd);
    }

    // the predicted voltages win over whatever the solution holds
    let x = c.bias(5.0, 1.0, 0.0);
    let report = c.load(LoadMode::new(Analysis::Transient, InitPhase::Predict), &x);
    assert_eq!(report.bypassed, 0);

    let vgs = (1.0 + xfact) * -0.4 - xfact * -0.6;
    let vgd = (1.0 + xfact) * -2.4 - xfact * -2.6;
    assert!((c.real(InstanceParam::Vgs) - vgs).abs() < 1e-12);
    assert!((c.real(InstanceParam::Vgd) - vgd).abs() < 1e-12);
}

#[rstest]
#[case(JfetType::N, 2.0, -0.5)]
#[case(JfetType::P, -2.0, 0.5)]
fn tranop_with_uic_starts_from_initial_conditions(
    #[case] jfet_type: JfetType,
    #[case] ic_vds: f64,
    #[case] ic_vgs: f64,
) {
    let mut c = Circuit::new(plain_model(jfet_type), SimulationConfig::default());
    c.devices
        .set_instance_param("J1", InstanceParam::Ic, &ParamValue::Vector(vec![ic_vds, ic_vgs]))
        .unwrap();

    let x = c.bias(1.0, 1.0, 1.0);
    let mode = LoadMode::new(Analysis::TranOp, InitPhase::Junction).with_uic(true);
    c.load(mode, &x);

    assert_eq!(c.real(InstanceParam::Vgs), ic_vgs);
    assert_eq!(c.real(InstanceParam::Vgd), ic_vgs - ic_vds);
}

#[rstest]
#[case(true, false, 0.0, false)]
// no convergence check when fixing with initial conditions
#[case(true, true, 0.0, true)]
#[case(false, false, -1.0, false)]
fn fix_phase_holds_off_devices_at_zero_bias(
    #[case] off: bool,
    #[case] uic: bool,
    #[case] vgs: f64,
    #[case] converged: bool,
) {
    let mut c = Circuit::new(plain_model(JfetType::N), SimulationConfig::default());
    c.devices
        .set_instance_param("J1", InstanceParam::Off, &ParamValue::Flag(off))
        .unwrap();

    let x = c.bias(3.0, -1.0, 0.0);
    let mode = LoadMode::new(Analysis::DcOp, InitPhase::Fix).with_uic(uic);
    let report = c.load(mode, &x);

    assert_eq!(report.converged(), converged);
    assert_eq!(c.real(InstanceParam::Vgs), vgs);
    if off {
        assert_eq!(c.real(InstanceParam::Vgd), 0.0);
    }
}

#[rstest]
// 2 f1 = 2 MHz-rad: c2 h^2
#[case(false, 2e6, 1.0)]
// f1 + f2 = 3 MHz-rad: 2 c2 h h
#[case(true, 3e6, 2.0)]
fn charge_products_scale_with_the_output_frequency(
    #[case] sum: bool,
    #[case] omega_out: f64,
    #[case] weight: f64,
) {
    // gate-source charge is the only nonlinearity left: the channel is cut
    // off and both junctions are deeply reverse biased
    let model = JfetModel::new("jcap", JfetType::N).with_params(ModelParams {
        vto: Some(-2.0),
        beta: Some(1e-4),
        cgs: Some(1e-12),
        ..ModelParams::default()
    });
    let mut c = Circuit::new(model, SimulationConfig::default());
    let x = c.bias(0.0, -3.0, 0.0);
    c.devices.distortion_setup(&c.config, &x);

    let inst = c.devices.instance("J1").unwrap().1;
    let (cz, pb) = (inst.thermal.cgs, inst.thermal.gate_pot);
    let c2 = cz / (4.0 * pb) * (1.0 + 3.0 / pb).powf(-1.5);
    let coeffs = *inst.distortion().unwrap();
    assert!((coeffs.cap_gs.c2 - c2).abs() < 1e-12 * c2);
    assert_eq!(coeffs.cap_gd.c2, 0.0);
    assert_eq!((coeffs.gate_source.c2, coeffs.gate_drain.c2), (0.0, 0.0));
    assert_eq!(coeffs.channel.xx, 0.0);

    let h = Complex64::new(0.2, 0.1);
    let mut h1 = vec![Complex64::new(0.0, 0.0); c.matrix.dim()];
    h1[c.index("g")] = h;
    let inputs = if sum {
        MixingInputs::SumFrequency {
            h1_f1: h1.as_slice(),
            h1_f2: h1.as_slice(),
        }
    } else {
        MixingInputs::SecondHarmonic { h1: h1.as_slice() }
    };

    c.matrix.clear();
    c.devices
        .distortion_load(&inputs, 1e6, 2e6, &mut c.matrix)
        .unwrap();

    // the current leaves the gate and enters the source
    let current = Complex64::new(0.0, omega_out) * weight * coeffs.cap_gs.c2 * h * h;
    let (g, s) = (c.index("g"), c.index("s"));
    for (node, expected) in [(g, -current), (s, current)] {
        let got = Complex64::new(c.matrix.rhs()[node], c.matrix.irhs()[node]);
        assert!((got - expected).norm() < 1e-12 * expected.norm(), "{got} vs {expected}");
    }
    assert_eq!(c.matrix.rhs()[c.index("d")], 0.0);
    assert_eq!(c.matrix.irhs()[c.index("d")], 0.0);
}
