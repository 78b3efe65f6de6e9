use serde::Serialize;

use super::distortion::DistortionCoefficients;
use super::evaluate::ChannelMode;
use crate::devices::stamp::{JfetNodes, JfetStamp};
use crate::error::{JfetError, JfetResult};
use crate::state::{StateField, StateSlot};

/// The run of state slots each JFET owns, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum JfetState {
    Vgs,
    Vgd,
    /// Gate current.
    Cg,
    /// Drain current (channel minus gate-drain junction).
    Cd,
    /// Gate-drain junction current.
    Cgd,
    Gm,
    Gds,
    Ggs,
    Ggd,
    /// Gate-source charge; capacitance during small-signal passes.
    Qgs,
    Cqgs,
    /// Gate-drain charge; capacitance during small-signal passes.
    Qgd,
    Cqgd,
}

impl StateField for JfetState {
    const COUNT: usize = 13;

    fn offset(self) -> usize {
        self as usize
    }
}

impl JfetState {
    /// Operating-point fields carried over by the predictor.
    pub(crate) const OPERATING_POINT: [JfetState; 7] = [
        JfetState::Cg,
        JfetState::Cd,
        JfetState::Cgd,
        JfetState::Gm,
        JfetState::Gds,
        JfetState::Ggs,
        JfetState::Ggd,
    ];
}

/// User-supplied instance parameters. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstanceParams {
    pub area: Option<f64>,
    /// Instance temperature (K).
    pub temp: Option<f64>,
    /// Initial drain-source voltage.
    pub ic_vds: Option<f64>,
    /// Initial gate-source voltage.
    pub ic_vgs: Option<f64>,
    /// Start the operating point with the device off.
    pub off: bool,
}

impl InstanceParams {
    pub fn area(&self) -> f64 {
        self.area.unwrap_or(1.0)
    }
}

/// Temperature-scaled instance quantities.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstanceThermal {
    /// Temperature actually used (K).
    pub temp: f64,
    pub vt: f64,
    pub sat_cur: f64,
    pub gate_pot: f64,
    pub cgs: f64,
    pub cgd: f64,
    /// Junction voltage above which the depletion charge is linearized.
    pub dep_cap: f64,
    pub f1: f64,
    /// Junction voltage above which `pnjlim` starts limiting.
    pub vcrit: f64,
}

#[derive(Debug, Clone)]
pub struct JfetInstance {
    pub name: String,
    pub drain: usize,
    pub gate: usize,
    pub source: usize,
    /// Internal drain node; equals `drain` when `rd` is zero.
    pub drain_prime: usize,
    /// Internal source node; equals `source` when `rs` is zero.
    pub source_prime: usize,
    pub(crate) owns_drain_prime: bool,
    pub(crate) owns_source_prime: bool,
    pub params: InstanceParams,
    pub mode: ChannelMode,
    pub thermal: InstanceThermal,
    pub(crate) nodes: JfetNodes,
    pub(crate) stamp: JfetStamp,
    pub(crate) state: Option<StateSlot>,
    pub(crate) distortion: Option<DistortionCoefficients>,
}

impl JfetInstance {
    pub fn new(name: impl Into<String>, drain: usize, gate: usize, source: usize) -> Self {
        Self {
            name: name.into(),
            drain,
            gate,
            source,
            drain_prime: drain,
            source_prime: source,
            owns_drain_prime: false,
            owns_source_prime: false,
            params: InstanceParams::default(),
            mode: ChannelMode::Normal,
            thermal: InstanceThermal::default(),
            nodes: JfetNodes {
                drain: None,
                gate: None,
                source: None,
                drain_prime: None,
                source_prime: None,
            },
            stamp: JfetStamp::uninitialized(),
            state: None,
            distortion: None,
        }
    }

    pub fn with_params(mut self, params: InstanceParams) -> Self {
        self.params = params;
        self
    }

    /// MNA indices resolved at setup.
    pub fn mna_nodes(&self) -> JfetNodes {
        self.nodes
    }

    pub fn stamp(&self) -> &JfetStamp {
        &self.stamp
    }

    pub fn state_slot(&self) -> Option<StateSlot> {
        self.state
    }

    pub(crate) fn slot(&self) -> JfetResult<StateSlot> {
        self.state.ok_or_else(|| JfetError::NotSetUp {
            instance: self.name.clone(),
        })
    }

    pub fn distortion(&self) -> Option<&DistortionCoefficients> {
        self.distortion.as_ref()
    }
}
