//! Analysis-mode flags seen by the device load routines.

/// The analysis the surrounding driver is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    /// DC operating point or DC sweep.
    DcOp,
    /// Operating point that precedes a transient run.
    TranOp,
    /// Transient time stepping.
    Transient,
    /// AC small-signal sweep.
    Ac,
}

/// Where the driver is inside its Newton iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPhase {
    /// Ordinary iteration: voltages come from the previous solution.
    Float,
    /// First iteration of an operating point: junction voltages are seeded.
    Junction,
    /// Iterations that hold `off` devices at zero bias.
    Fix,
    /// Capacitance evaluation at a converged operating point ahead of AC.
    SmallSignal,
    /// First load of a transient time point: reuse the previous time point.
    Transient,
    /// First load of a time point using predicted voltages.
    Predict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadMode {
    pub analysis: Analysis,
    pub init: InitPhase,
    /// Use initial conditions instead of solving for the operating point.
    pub uic: bool,
}

impl LoadMode {
    pub fn new(analysis: Analysis, init: InitPhase) -> Self {
        Self {
            analysis,
            init,
            uic: false,
        }
    }

    pub fn with_uic(mut self, uic: bool) -> Self {
        self.uic = uic;
        self
    }

    pub(crate) fn is_tranop_uic(&self) -> bool {
        self.analysis == Analysis::TranOp && self.uic
    }

    /// Junction charges are tracked in transient, AC and small-signal passes.
    pub(crate) fn needs_charge(&self) -> bool {
        matches!(self.analysis, Analysis::Transient | Analysis::Ac)
            || self.init == InitPhase::SmallSignal
            || self.is_tranop_uic()
    }
}
