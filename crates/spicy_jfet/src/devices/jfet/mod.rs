//! Junction field-effect transistor.
//!
//! Models own their instances; every pass visits models in insertion order
//! and, within a model, instances in insertion order.

pub mod ac;
pub mod charge;
pub mod distortion;
pub mod evaluate;
pub mod instance;
pub mod load;
pub mod model;
pub mod params;
pub mod setup;
pub mod temperature;

use num_complex::Complex64;

use crate::config::SimulationConfig;
use crate::convergence::ConvergenceReport;
use crate::error::JfetResult;
use crate::matrix::SolverMatrix;
use crate::matrix::builder::MatrixBuilder;
use crate::nodes::NodeTable;
use crate::state::{StateAllocator, StateHistory};
use crate::volterra::MixingInputs;

use instance::JfetInstance;
use load::LoadContext;
use model::JfetModel;
use temperature::ModelWarning;

#[derive(Debug, Default)]
pub struct JfetDevices {
    pub models: Vec<JfetModel>,
}

impl JfetDevices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_model(&mut self, model: JfetModel) -> &mut JfetModel {
        self.models.push(model);
        let last = self.models.len() - 1;
        &mut self.models[last]
    }

    pub fn model(&self, name: &str) -> Option<&JfetModel> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn model_mut(&mut self, name: &str) -> Option<&mut JfetModel> {
        self.models.iter_mut().find(|m| m.name == name)
    }

    /// Instance by name together with its model.
    pub fn instance(&self, name: &str) -> Option<(&JfetModel, &JfetInstance)> {
        self.models.iter().find_map(|m| {
            m.instances
                .iter()
                .find(|i| i.name == name)
                .map(|i| (m, i))
        })
    }

    pub fn instance_mut(&mut self, name: &str) -> Option<&mut JfetInstance> {
        self.models
            .iter_mut()
            .flat_map(|m| m.instances.iter_mut())
            .find(|i| i.name == name)
    }

    pub fn instances(&self) -> impl Iterator<Item = (&JfetModel, &JfetInstance)> {
        self.models
            .iter()
            .flat_map(|m| m.instances.iter().map(move |i| (m, i)))
    }

    /// Allocate nodes and state, then build the matrix pattern.
    pub fn setup(
        &mut self,
        nodes: &mut NodeTable,
        states: &mut StateAllocator,
    ) -> JfetResult<SolverMatrix> {
        for model in &mut self.models {
            model.setup(nodes, states);
        }
        self.resetup(nodes)
    }

    /// Rebuild the matrix pattern and every cached matrix slot.
    pub fn resetup(&mut self, nodes: &NodeTable) -> JfetResult<SolverMatrix> {
        let mut builder = MatrixBuilder::new(nodes.mna_dim());
        builder.reserve(15 * self.instances().count());
        for model in &mut self.models {
            model.push_entries(nodes, &mut builder)?;
        }
        let (pattern, mapping) = builder.build_csc_pattern()?;
        for model in &mut self.models {
            model.finalize(&mapping);
        }
        Ok(SolverMatrix::new(pattern))
    }

    pub fn unsetup(&mut self, nodes: &mut NodeTable) {
        for model in &mut self.models {
            model.unsetup(nodes);
        }
    }

    pub fn temperature(&mut self, config: &SimulationConfig) -> Vec<ModelWarning> {
        self.models
            .iter_mut()
            .flat_map(|m| m.temperature(config))
            .collect()
    }

    pub fn load(
        &mut self,
        ctx: &LoadContext,
        states: &mut StateHistory,
        matrix: &mut SolverMatrix,
        report: &mut ConvergenceReport,
    ) -> JfetResult<()> {
        for model in &mut self.models {
            model.load(ctx, states, matrix, report)?;
        }
        Ok(())
    }

    pub fn ac_load(
        &self,
        omega: f64,
        states: &StateHistory,
        matrix: &mut SolverMatrix,
    ) -> JfetResult<()> {
        for model in &self.models {
            model.ac_load(omega, states, matrix)?;
        }
        Ok(())
    }

    pub fn distortion_setup(&mut self, config: &SimulationConfig, solution: &[f64]) {
        for model in &mut self.models {
            model.distortion_setup(config, solution);
        }
    }

    pub fn distortion_load(
        &self,
        inputs: &MixingInputs<&[Complex64]>,
        omega1: f64,
        omega2: f64,
        matrix: &mut SolverMatrix,
    ) -> JfetResult<()> {
        for model in &self.models {
            model.distortion_load(inputs, omega1, omega2, matrix)?;
        }
        Ok(())
    }

    pub fn set_initial_conditions(&mut self, solution: &[f64]) {
        for model in &mut self.models {
            model.set_initial_conditions(solution);
        }
    }
}
