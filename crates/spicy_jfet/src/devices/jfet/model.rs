use serde::Serialize;

use super::instance::JfetInstance;

/// Channel polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum JfetType {
    /// N-channel
    #[default]
    N,
    /// P-channel
    P,
}

impl JfetType {
    /// +1 for N-channel, -1 for P-channel.
    pub fn sign(self) -> f64 {
        match self {
            Self::N => 1.0,
            Self::P => -1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::N => "njf",
            Self::P => "pjf",
        }
    }
}

/// User-supplied model parameters. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelParams {
    /// Threshold voltage (V).
    pub vto: Option<f64>,
    /// Transconductance parameter (A/V^2).
    pub beta: Option<f64>,
    /// Channel length modulation (1/V).
    pub lambda: Option<f64>,
    /// Drain ohmic resistance.
    pub rd: Option<f64>,
    /// Source ohmic resistance.
    pub rs: Option<f64>,
    /// Zero-bias gate-source capacitance (F).
    pub cgs: Option<f64>,
    /// Zero-bias gate-drain capacitance (F).
    pub cgd: Option<f64>,
    /// Gate junction potential (V).
    pub pb: Option<f64>,
    /// Gate saturation current (A).
    pub is: Option<f64>,
    /// Forward bias junction fit coefficient.
    pub fc: Option<f64>,
    /// Doping tail parameter.
    pub b: Option<f64>,
    /// Nominal temperature (K).
    pub tnom: Option<f64>,
}

impl ModelParams {
    pub fn vto(&self) -> f64 {
        self.vto.unwrap_or(-2.0)
    }
    pub fn beta(&self) -> f64 {
        self.beta.unwrap_or(1e-4)
    }
    pub fn lambda(&self) -> f64 {
        self.lambda.unwrap_or(0.0)
    }
    pub fn rd(&self) -> f64 {
        self.rd.unwrap_or(0.0)
    }
    pub fn rs(&self) -> f64 {
        self.rs.unwrap_or(0.0)
    }
    pub fn cgs(&self) -> f64 {
        self.cgs.unwrap_or(0.0)
    }
    pub fn cgd(&self) -> f64 {
        self.cgd.unwrap_or(0.0)
    }
    pub fn pb(&self) -> f64 {
        self.pb.unwrap_or(1.0)
    }
    pub fn is(&self) -> f64 {
        self.is.unwrap_or(1e-14)
    }
    pub fn fc(&self) -> f64 {
        self.fc.unwrap_or(0.5)
    }
    pub fn b(&self) -> f64 {
        self.b.unwrap_or(1.0)
    }
}

/// Model quantities recomputed by every temperature pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelDerived {
    /// Nominal temperature actually used (K).
    pub tnom: f64,
    pub drain_conductance: f64,
    pub source_conductance: f64,
    /// `(1 - fc)^1.5`
    pub f2: f64,
    /// `1 - 1.5 fc`
    pub f3: f64,
    /// `(1 - b) / (pb - vto)`
    pub b_fac: f64,
    /// Junction potential extrapolated to the bandgap reference temperature.
    pub(crate) pbo: f64,
    /// Capacitance factor at `tnom`.
    pub(crate) cjfact: f64,
    /// `ln(1 - fc)`
    pub(crate) xfc: f64,
}

#[derive(Debug, Clone)]
pub struct JfetModel {
    pub name: String,
    pub jfet_type: JfetType,
    pub params: ModelParams,
    pub derived: ModelDerived,
    pub instances: Vec<JfetInstance>,
}

impl JfetModel {
    pub fn new(name: impl Into<String>, jfet_type: JfetType) -> Self {
        Self {
            name: name.into(),
            jfet_type,
            params: ModelParams::default(),
            derived: ModelDerived::default(),
            instances: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    pub fn add_instance(&mut self, instance: JfetInstance) -> &mut JfetInstance {
        self.instances.push(instance);
        let last = self.instances.len() - 1;
        &mut self.instances[last]
    }

    pub fn sign(&self) -> f64 {
        self.jfet_type.sign()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_defaults_to_n() {
        assert_eq!(JfetType::default(), JfetType::N);
        assert_eq!(JfetType::default().name(), "njf");
        assert_eq!(JfetType::P.sign(), -1.0);
    }
}
