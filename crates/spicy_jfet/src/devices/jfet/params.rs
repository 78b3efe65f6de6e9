//! Parameter accessors addressed by numeric id or by name.
//!
//! Temperatures cross this boundary in degrees Celsius. Voltages, currents
//! and charges read from the state are reported with the channel polarity
//! applied, so a P-channel device reads with its external sign.

use num_complex::Complex64;

use super::instance::{JfetInstance, JfetState};
use super::model::{JfetModel, JfetType, ModelParams};
use super::JfetDevices;
use crate::constants::CELSIUS_TO_KELVIN;
use crate::error::{JfetError, JfetResult};
use crate::state::{History, StateHistory};

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Real(f64),
    Complex(Complex64),
    Flag(bool),
    Node(usize),
    Vector(Vec<f64>),
    Text(&'static str),
}

impl ParamValue {
    fn real(&self, name: &str) -> JfetResult<f64> {
        match self {
            Self::Real(v) => Ok(*v),
            _ => Err(JfetError::bad_parameter(name)),
        }
    }

    fn flag(&self, name: &str) -> JfetResult<bool> {
        match self {
            Self::Flag(v) => Ok(*v),
            _ => Err(JfetError::bad_parameter(name)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum InstanceParam {
    Area = 1,
    IcVds = 2,
    IcVgs = 3,
    /// `[vds, vgs]` or `[vds]`.
    Ic = 4,
    Off = 5,
    Temp = 6,

    DrainNode = 301,
    GateNode = 302,
    SourceNode = 303,
    DrainPrimeNode = 304,
    SourcePrimeNode = 305,
    Vgs = 306,
    Vgd = 307,
    Cg = 308,
    Cd = 309,
    Cgd = 310,
    Gm = 311,
    Gds = 312,
    Ggs = 313,
    Ggd = 314,
    Qgs = 315,
    Cqgs = 316,
    Qgd = 317,
    Cqgd = 318,
    Cs = 319,
    Power = 320,
}

const INSTANCE_PARAMS: &[(&str, InstanceParam)] = &[
    ("area", InstanceParam::Area),
    ("ic-vds", InstanceParam::IcVds),
    ("ic-vgs", InstanceParam::IcVgs),
    ("ic", InstanceParam::Ic),
    ("off", InstanceParam::Off),
    ("temp", InstanceParam::Temp),
    ("drain-node", InstanceParam::DrainNode),
    ("gate-node", InstanceParam::GateNode),
    ("source-node", InstanceParam::SourceNode),
    ("drain-prime-node", InstanceParam::DrainPrimeNode),
    ("source-prime-node", InstanceParam::SourcePrimeNode),
    ("vgs", InstanceParam::Vgs),
    ("vgd", InstanceParam::Vgd),
    ("ig", InstanceParam::Cg),
    ("id", InstanceParam::Cd),
    ("igd", InstanceParam::Cgd),
    ("gm", InstanceParam::Gm),
    ("gds", InstanceParam::Gds),
    ("ggs", InstanceParam::Ggs),
    ("ggd", InstanceParam::Ggd),
    ("qgs", InstanceParam::Qgs),
    ("cqgs", InstanceParam::Cqgs),
    ("qgd", InstanceParam::Qgd),
    ("cqgd", InstanceParam::Cqgd),
    ("is", InstanceParam::Cs),
    ("p", InstanceParam::Power),
];

impl InstanceParam {
    pub fn from_name(name: &str) -> JfetResult<Self> {
        INSTANCE_PARAMS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, p)| *p)
            .ok_or_else(|| JfetError::bad_parameter(name))
    }

    pub fn name(self) -> &'static str {
        INSTANCE_PARAMS
            .iter()
            .find(|(_, p)| *p == self)
            .map(|(n, _)| *n)
            .unwrap_or("?")
    }

    fn state_field(self) -> Option<JfetState> {
        Some(match self {
            Self::Vgs => JfetState::Vgs,
            Self::Vgd => JfetState::Vgd,
            Self::Cg => JfetState::Cg,
            Self::Cd => JfetState::Cd,
            Self::Cgd => JfetState::Cgd,
            Self::Gm => JfetState::Gm,
            Self::Gds => JfetState::Gds,
            Self::Ggs => JfetState::Ggs,
            Self::Ggd => JfetState::Ggd,
            Self::Qgs => JfetState::Qgs,
            Self::Cqgs => JfetState::Cqgs,
            Self::Qgd => JfetState::Qgd,
            Self::Cqgd => JfetState::Cqgd,
            _ => return None,
        })
    }
}

impl TryFrom<u32> for InstanceParam {
    type Error = JfetError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        INSTANCE_PARAMS
            .iter()
            .find(|(_, p)| *p as u32 == id)
            .map(|(_, p)| *p)
            .ok_or_else(|| JfetError::bad_parameter(id.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ModelParam {
    Vto = 101,
    Beta = 102,
    Lambda = 103,
    Rd = 104,
    Rs = 105,
    Cgs = 106,
    Cgd = 107,
    Pb = 108,
    Is = 109,
    Fc = 110,
    Njf = 111,
    Pjf = 112,
    Tnom = 113,
    B = 116,

    DrainConductance = 301,
    SourceConductance = 302,
    Type = 305,
}

const MODEL_PARAMS: &[(&str, ModelParam)] = &[
    ("vto", ModelParam::Vto),
    ("vt0", ModelParam::Vto),
    ("beta", ModelParam::Beta),
    ("lambda", ModelParam::Lambda),
    ("rd", ModelParam::Rd),
    ("rs", ModelParam::Rs),
    ("cgs", ModelParam::Cgs),
    ("cgd", ModelParam::Cgd),
    ("pb", ModelParam::Pb),
    ("is", ModelParam::Is),
    ("fc", ModelParam::Fc),
    ("njf", ModelParam::Njf),
    ("pjf", ModelParam::Pjf),
    ("tnom", ModelParam::Tnom),
    ("b", ModelParam::B),
    ("gd", ModelParam::DrainConductance),
    ("gs", ModelParam::SourceConductance),
    ("type", ModelParam::Type),
];

impl ModelParam {
    pub fn from_name(name: &str) -> JfetResult<Self> {
        MODEL_PARAMS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, p)| *p)
            .ok_or_else(|| JfetError::bad_parameter(name))
    }

    pub fn name(self) -> &'static str {
        MODEL_PARAMS
            .iter()
            .find(|(_, p)| *p == self)
            .map(|(n, _)| *n)
            .unwrap_or("?")
    }

    fn field(self, params: &mut ModelParams) -> Option<&mut Option<f64>> {
        Some(match self {
            Self::Vto => &mut params.vto,
            Self::Beta => &mut params.beta,
            Self::Lambda => &mut params.lambda,
            Self::Rd => &mut params.rd,
            Self::Rs => &mut params.rs,
            Self::Cgs => &mut params.cgs,
            Self::Cgd => &mut params.cgd,
            Self::Pb => &mut params.pb,
            Self::Is => &mut params.is,
            Self::Fc => &mut params.fc,
            Self::B => &mut params.b,
            _ => return None,
        })
    }
}

impl TryFrom<u32> for ModelParam {
    type Error = JfetError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        MODEL_PARAMS
            .iter()
            .find(|(_, p)| *p as u32 == id)
            .map(|(_, p)| *p)
            .ok_or_else(|| JfetError::bad_parameter(id.to_string()))
    }
}

/// A complex node solution at one frequency.
#[derive(Debug, Clone, Copy)]
pub struct AcSolution<'a> {
    pub omega: f64,
    /// MNA-indexed node voltages.
    pub voltages: &'a [Complex64],
}

/// What a query may read besides the device itself.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub states: &'a StateHistory,
    /// When present, terminal voltages and currents are small-signal
    /// phasors instead of operating-point values.
    pub ac: Option<AcSolution<'a>>,
}

impl JfetInstance {
    pub fn set_param(&mut self, param: InstanceParam, value: &ParamValue) -> JfetResult<()> {
        let name = param.name();
        match param {
            InstanceParam::Area => self.params.area = Some(value.real(name)?),
            InstanceParam::IcVds => self.params.ic_vds = Some(value.real(name)?),
            InstanceParam::IcVgs => self.params.ic_vgs = Some(value.real(name)?),
            InstanceParam::Ic => match value {
                ParamValue::Vector(v) if v.len() == 2 => {
                    self.params.ic_vds = Some(v[0]);
                    self.params.ic_vgs = Some(v[1]);
                }
                ParamValue::Vector(v) if v.len() == 1 => self.params.ic_vds = Some(v[0]),
                _ => return Err(JfetError::bad_parameter(name)),
            },
            InstanceParam::Off => self.params.off = value.flag(name)?,
            InstanceParam::Temp => {
                self.params.temp = Some(value.real(name)? + CELSIUS_TO_KELVIN);
            }
            _ => return Err(JfetError::bad_parameter(name)),
        }
        Ok(())
    }
}

impl JfetModel {
    pub fn set_param(&mut self, param: ModelParam, value: &ParamValue) -> JfetResult<()> {
        let name = param.name();
        match param {
            ModelParam::Njf => {
                if value.flag(name)? {
                    self.jfet_type = JfetType::N;
                }
            }
            ModelParam::Pjf => {
                if value.flag(name)? {
                    self.jfet_type = JfetType::P;
                }
            }
            ModelParam::Tnom => self.params.tnom = Some(value.real(name)? + CELSIUS_TO_KELVIN),
            _ => {
                let v = value.real(name)?;
                let field = param
                    .field(&mut self.params)
                    .ok_or_else(|| JfetError::bad_parameter(name))?;
                *field = Some(v);
            }
        }
        Ok(())
    }

    /// Set real-valued parameters by name, the way a `.model` card lists them.
    pub fn set_params_by_name(&mut self, pairs: &[(&str, f64)]) -> JfetResult<()> {
        for (name, value) in pairs {
            let param = ModelParam::from_name(name)?;
            let value = match param {
                ModelParam::Njf | ModelParam::Pjf => ParamValue::Flag(*value != 0.0),
                _ => ParamValue::Real(*value),
            };
            self.set_param(param, &value)?;
        }
        Ok(())
    }

    pub fn param(&self, param: ModelParam) -> JfetResult<ParamValue> {
        let p = &self.params;
        let value = match param {
            ModelParam::Vto => p.vto(),
            ModelParam::Beta => p.beta(),
            ModelParam::Lambda => p.lambda(),
            ModelParam::Rd => p.rd(),
            ModelParam::Rs => p.rs(),
            ModelParam::Cgs => p.cgs(),
            ModelParam::Cgd => p.cgd(),
            ModelParam::Pb => p.pb(),
            ModelParam::Is => p.is(),
            ModelParam::Fc => p.fc(),
            ModelParam::B => p.b(),
            ModelParam::Tnom => p.tnom.unwrap_or(self.derived.tnom) - CELSIUS_TO_KELVIN,
            ModelParam::DrainConductance => self.derived.drain_conductance,
            ModelParam::SourceConductance => self.derived.source_conductance,
            ModelParam::Njf => return Ok(ParamValue::Flag(self.jfet_type == JfetType::N)),
            ModelParam::Pjf => return Ok(ParamValue::Flag(self.jfet_type == JfetType::P)),
            ModelParam::Type => return Ok(ParamValue::Text(self.jfet_type.name())),
        };
        Ok(ParamValue::Real(value))
    }

    /// Read an instance parameter or operating-point output of `inst`,
    /// which must belong to this model.
    pub fn instance_param(
        &self,
        inst: &JfetInstance,
        param: InstanceParam,
        ctx: &QueryContext,
    ) -> JfetResult<ParamValue> {
        let ip = &inst.params;
        let value = match param {
            InstanceParam::Area => ParamValue::Real(ip.area()),
            InstanceParam::IcVds => ParamValue::Real(ip.ic_vds.unwrap_or(0.0)),
            InstanceParam::IcVgs => ParamValue::Real(ip.ic_vgs.unwrap_or(0.0)),
            InstanceParam::Ic => {
                ParamValue::Vector(vec![ip.ic_vds.unwrap_or(0.0), ip.ic_vgs.unwrap_or(0.0)])
            }
            InstanceParam::Off => ParamValue::Flag(ip.off),
            InstanceParam::Temp => {
                ParamValue::Real(ip.temp.unwrap_or(inst.thermal.temp) - CELSIUS_TO_KELVIN)
            }
            InstanceParam::DrainNode => ParamValue::Node(inst.drain),
            InstanceParam::GateNode => ParamValue::Node(inst.gate),
            InstanceParam::SourceNode => ParamValue::Node(inst.source),
            InstanceParam::DrainPrimeNode => ParamValue::Node(inst.drain_prime),
            InstanceParam::SourcePrimeNode => ParamValue::Node(inst.source_prime),
            _ => return self.operating_output(inst, param, ctx),
        };
        Ok(value)
    }

    fn operating_output(
        &self,
        inst: &JfetInstance,
        param: InstanceParam,
        ctx: &QueryContext,
    ) -> JfetResult<ParamValue> {
        if let Some(ac) = ctx.ac {
            let currents = inst.ac_currents(ctx.states, ac.omega, ac.voltages)?;
            let phasor = match param {
                InstanceParam::Vgs => Some(currents.vgs),
                InstanceParam::Vgd => Some(currents.vgd),
                InstanceParam::Cg => Some(currents.gate),
                InstanceParam::Cd => Some(currents.drain),
                InstanceParam::Cs => Some(currents.source),
                InstanceParam::Cgd => Some(currents.gate_drain),
                _ => None,
            };
            if let Some(phasor) = phasor {
                return Ok(ParamValue::Complex(phasor));
            }
        }

        let slot = inst.slot()?;
        let state = |field: JfetState| ctx.states.get(History::Current, slot, field);
        let sign = self.sign();
        let value = match param {
            InstanceParam::Cs => -sign * (state(JfetState::Cd) + state(JfetState::Cg)),
            InstanceParam::Power => {
                let vds = state(JfetState::Vgs) - state(JfetState::Vgd);
                state(JfetState::Cd) * vds + state(JfetState::Cg) * state(JfetState::Vgs)
            }
            InstanceParam::Gm | InstanceParam::Gds | InstanceParam::Ggs | InstanceParam::Ggd => {
                param.state_field().map(state).unwrap_or_default()
            }
            _ => {
                let field = param
                    .state_field()
                    .ok_or_else(|| JfetError::bad_parameter(param.name()))?;
                sign * state(field)
            }
        };
        Ok(ParamValue::Real(value))
    }
}

impl JfetDevices {
    pub fn set_instance_param(
        &mut self,
        instance: &str,
        param: InstanceParam,
        value: &ParamValue,
    ) -> JfetResult<()> {
        self.instance_mut(instance)
            .ok_or_else(|| JfetError::UnknownDevice {
                name: instance.to_string(),
            })?
            .set_param(param, value)
    }

    pub fn ask_instance(
        &self,
        instance: &str,
        param: InstanceParam,
        ctx: &QueryContext,
    ) -> JfetResult<ParamValue> {
        let (model, inst) = self
            .instance(instance)
            .ok_or_else(|| JfetError::UnknownDevice {
                name: instance.to_string(),
            })?;
        model.instance_param(inst, param, ctx)
    }

    pub fn set_model_param(
        &mut self,
        model: &str,
        param: ModelParam,
        value: &ParamValue,
    ) -> JfetResult<()> {
        self.model_mut(model)
            .ok_or_else(|| JfetError::UnknownDevice {
                name: model.to_string(),
            })?
            .set_param(param, value)
    }

    pub fn ask_model(&self, model: &str, param: ModelParam) -> JfetResult<ParamValue> {
        self.model(model)
            .ok_or_else(|| JfetError::UnknownDevice {
                name: model.to_string(),
            })?
            .param(param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{StateAllocator, StateField};
    use insta::assert_snapshot;
    use rstest::rstest;

    #[rstest]
    #[case("vto", 101)]
    #[case("VT0", 101)]
    #[case("tnom", 113)]
    #[case("b", 116)]
    #[case("type", 305)]
    fn model_names_resolve(#[case] name: &str, #[case] id: u32) {
        let param = ModelParam::from_name(name).unwrap();
        assert_eq!(param as u32, id);
        assert_eq!(ModelParam::try_from(id).unwrap(), param);
    }

    #[test]
    fn unknown_names_are_bad_parameters() {
        let err = InstanceParam::from_name("kf").unwrap_err();
        assert_snapshot!(err.to_string(), @"bad parameter: kf");
        assert!(ModelParam::try_from(114).is_err());
        assert!(InstanceParam::try_from(7).is_err());
    }

    #[test]
    fn temperatures_are_celsius_at_the_boundary() {
        let mut model = JfetModel::new("jmod", JfetType::N);
        model
            .set_param(ModelParam::Tnom, &ParamValue::Real(50.0))
            .unwrap();
        assert_eq!(model.params.tnom, Some(50.0 + CELSIUS_TO_KELVIN));
        assert_eq!(model.param(ModelParam::Tnom).unwrap(), ParamValue::Real(50.0));

        let mut inst = JfetInstance::new("j1", 1, 2, 0);
        inst.set_param(InstanceParam::Temp, &ParamValue::Real(-10.0))
            .unwrap();
        let states = StateHistory::new(0);
        let ctx = QueryContext { states: &states, ac: None };
        let temp = model
            .instance_param(&inst, InstanceParam::Temp, &ctx)
            .unwrap();
        let ParamValue::Real(t) = temp else {
            panic!("expected a real temperature, got {temp:?}");
        };
        assert!((t + 10.0).abs() < 1e-12);
    }

    #[test]
    fn type_flags_and_card_style_setting() {
        let mut model = JfetModel::new("jmod", JfetType::N);
        model
            .set_params_by_name(&[("pjf", 1.0), ("vt0", -1.5), ("beta", 2e-4)])
            .unwrap();
        assert_eq!(model.jfet_type, JfetType::P);
        assert_eq!(model.params.vto, Some(-1.5));
        assert_eq!(model.param(ModelParam::Type).unwrap(), ParamValue::Text("pjf"));

        let err = model
            .set_param(ModelParam::DrainConductance, &ParamValue::Real(1.0))
            .unwrap_err();
        assert!(matches!(err, JfetError::BadParameter { .. }));
        assert!(model.set_param(ModelParam::Beta, &ParamValue::Flag(true)).is_err());
    }

    #[rstest]
    #[case(vec![1.5, -0.5], Some(1.5), Some(-0.5))]
    #[case(vec![3.0], Some(3.0), None)]
    fn initial_condition_vector(
        #[case] ic: Vec<f64>,
        #[case] vds: Option<f64>,
        #[case] vgs: Option<f64>,
    ) {
        let mut inst = JfetInstance::new("j1", 1, 2, 0);
        inst.set_param(InstanceParam::Ic, &ParamValue::Vector(ic))
            .unwrap();
        assert_eq!((inst.params.ic_vds, inst.params.ic_vgs), (vds, vgs));
        assert!(inst
            .set_param(InstanceParam::Ic, &ParamValue::Vector(vec![]))
            .is_err());
    }

    #[test]
    fn outputs_carry_the_channel_polarity() {
        let model = JfetModel::new("jmod", JfetType::P);
        let mut inst = JfetInstance::new("j1", 1, 2, 3);
        let mut alloc = StateAllocator::new();
        let slot = alloc.reserve(JfetState::COUNT);
        inst.state = Some(slot);

        let mut states = StateHistory::new(alloc.len());
        states.set(History::Current, slot, JfetState::Vgs, -0.5);
        states.set(History::Current, slot, JfetState::Vgd, -3.0);
        states.set(History::Current, slot, JfetState::Cd, 2e-4);
        states.set(History::Current, slot, JfetState::Cg, -1e-12);
        states.set(History::Current, slot, JfetState::Gm, 3e-4);
        let ctx = QueryContext { states: &states, ac: None };
        let ask = |p| model.instance_param(&inst, p, &ctx).unwrap();

        assert_eq!(ask(InstanceParam::Vgs), ParamValue::Real(0.5));
        assert_eq!(ask(InstanceParam::Cd), ParamValue::Real(-2e-4));
        assert_eq!(ask(InstanceParam::Gm), ParamValue::Real(3e-4));
        assert_eq!(ask(InstanceParam::Cs), ParamValue::Real(2e-4 - 1e-12));
        let ParamValue::Real(power) = ask(InstanceParam::Power) else {
            panic!("power is real");
        };
        assert!((power - (2e-4 * 2.5 + 1e-12 * 0.5)).abs() < 1e-15);
        assert_eq!(ask(InstanceParam::GateNode), ParamValue::Node(2));
    }

    #[test]
    fn outputs_need_a_set_up_instance() {
        let model = JfetModel::new("jmod", JfetType::N);
        let inst = JfetInstance::new("j1", 1, 2, 0);
        let states = StateHistory::new(0);
        let ctx = QueryContext { states: &states, ac: None };
        let err = model
            .instance_param(&inst, InstanceParam::Vgs, &ctx)
            .unwrap_err();
        assert_snapshot!(err.to_string(), @"instance j1 has not been set up");
    }
}
