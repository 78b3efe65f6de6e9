use crate::state::{History, StateField, StateHistory, StateSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationMethod {
    BackwardEuler,
    Trapezoidal,
}

/// Turns a stored charge history into a companion conductance and current.
#[derive(Debug, Clone, Copy)]
pub struct Integrator {
    pub method: IntegrationMethod,
    /// Current time step.
    pub step: f64,
    /// Step that led to the previous time point.
    pub previous_step: f64,
}

impl Default for Integrator {
    fn default() -> Self {
        Self {
            method: IntegrationMethod::Trapezoidal,
            step: 1e-9,
            previous_step: 1e-9,
        }
    }
}

impl Integrator {
    pub fn new(method: IntegrationMethod, step: f64) -> Self {
        Self {
            method,
            step,
            previous_step: step,
        }
    }

    /// Leading coefficient of dq/dt = ag0 * q + history.
    pub fn ag0(&self) -> f64 {
        match self.method {
            IntegrationMethod::BackwardEuler => 1.0 / self.step,
            IntegrationMethod::Trapezoidal => 2.0 / self.step,
        }
    }

    /// Integrate the charge at `charge` and write the capacitor current into
    /// `current` (state0). Returns the companion model `(geq, ceq)` for a
    /// capacitor of value `cap` where `i = geq * v + ceq` linearizes the
    /// current around the present charge.
    pub fn integrate<F: StateField>(
        &self,
        states: &mut StateHistory,
        slot: StateSlot,
        charge: F,
        current: F,
        cap: f64,
    ) -> (f64, f64) {
        let ag0 = self.ag0();
        let q0 = states.get(History::Current, slot, charge);
        let q1 = states.get(History::Previous, slot, charge);
        let ccap = match self.method {
            IntegrationMethod::BackwardEuler => ag0 * (q0 - q1),
            IntegrationMethod::Trapezoidal => {
                -states.get(History::Previous, slot, current) + ag0 * (q0 - q1)
            }
        };
        states.set(History::Current, slot, current, ccap);
        (ag0 * cap, ccap - ag0 * q0)
    }

    /// Extrapolation factor for predicted voltages: `step / previous_step`.
    pub fn predictor_factor(&self) -> f64 {
        self.step / self.previous_step
    }
}
