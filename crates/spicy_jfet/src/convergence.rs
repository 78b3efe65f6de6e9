/// What one load pass tells the Newton driver about convergence.
///
/// Limiting or a failed current prediction is not an error: the load still
/// stamps a valid linearization and asks for another iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvergenceReport {
    /// Number of instances that did not converge in this pass.
    pub noncon: usize,
    /// Last instance that reported non-convergence.
    pub trouble: Option<String>,
    /// Number of instances whose evaluation was bypassed.
    pub bypassed: usize,
}

impl ConvergenceReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn converged(&self) -> bool {
        self.noncon == 0
    }

    pub(crate) fn not_converged(&mut self, instance: &str) {
        self.noncon += 1;
        self.trouble = Some(instance.to_string());
    }

    /// Start a new Newton iteration.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
