//! Junction field-effect transistor device kernel for a modified nodal
//! analysis circuit simulator.
//!
//! The kernel never solves anything itself. A driver owns the node table,
//! the state vectors and the sparse matrix, and calls into [`JfetDevices`]
//! for setup, temperature, load, small-signal and distortion passes.

pub mod analysis;
pub mod config;
pub mod constants;
pub mod convergence;
pub mod devices;
pub mod error;
pub mod integrate;
pub mod matrix;
pub mod nodes;
pub mod state;
pub(crate) mod util;
pub mod volterra;

pub use analysis::{Analysis, InitPhase, LoadMode};
pub use config::SimulationConfig;
pub use convergence::ConvergenceReport;
pub use devices::jfet::JfetDevices;
pub use devices::jfet::instance::{InstanceParams, JfetInstance};
pub use devices::jfet::load::LoadContext;
pub use devices::jfet::model::{JfetModel, JfetType, ModelParams};
pub use error::{JfetError, JfetResult};
pub use integrate::{IntegrationMethod, Integrator};
pub use matrix::SolverMatrix;
pub use nodes::NodeTable;
pub use state::{History, StateAllocator, StateHistory};
