use log::debug;

use super::instance::{JfetInstance, JfetState};
use super::model::JfetModel;
use crate::devices::stamp::{JfetNodes, JfetStamp};
use crate::error::JfetResult;
use crate::matrix::builder::{EntryMapping, MatrixBuilder};
use crate::nodes::NodeTable;
use crate::state::{StateAllocator, StateField};
use crate::util::get_voltage_diff;

impl JfetModel {
    /// Create internal nodes where the ohmic resistances need them and
    /// reserve the state slots of every instance.
    pub fn setup(&mut self, nodes: &mut NodeTable, states: &mut StateAllocator) {
        let has_rd = self.params.rd() != 0.0;
        let has_rs = self.params.rs() != 0.0;

        for inst in &mut self.instances {
            if has_rd {
                if !inst.owns_drain_prime {
                    inst.drain_prime = nodes.make_internal(&inst.name, "drain");
                    inst.owns_drain_prime = true;
                    debug!("{}: internal drain node {}", inst.name, inst.drain_prime);
                }
            } else {
                if inst.owns_drain_prime {
                    debug!("{}: releasing internal drain node {}", inst.name, inst.drain_prime);
                    nodes.release(inst.drain_prime);
                    inst.owns_drain_prime = false;
                }
                inst.drain_prime = inst.drain;
            }

            if has_rs {
                if !inst.owns_source_prime {
                    inst.source_prime = nodes.make_internal(&inst.name, "source");
                    inst.owns_source_prime = true;
                    debug!("{}: internal source node {}", inst.name, inst.source_prime);
                }
            } else {
                if inst.owns_source_prime {
                    debug!("{}: releasing internal source node {}", inst.name, inst.source_prime);
                    nodes.release(inst.source_prime);
                    inst.owns_source_prime = false;
                }
                inst.source_prime = inst.source;
            }

            if inst.state.is_none() {
                inst.state = Some(states.reserve(JfetState::COUNT));
            }
            inst.nodes = resolve(inst, nodes);
        }
    }

    /// Request the matrix entries of every instance from `builder`.
    ///
    /// Node and state allocation are left alone, so this can be repeated
    /// after the matrix is renumbered.
    pub fn push_entries(
        &mut self,
        nodes: &NodeTable,
        builder: &mut MatrixBuilder,
    ) -> JfetResult<()> {
        for inst in &mut self.instances {
            inst.nodes = resolve(inst, nodes);
            inst.stamp
                .set_temp_indices_from_nodes(inst.nodes, |column, row| builder.push(column, row))?;
        }
        Ok(())
    }

    /// Swap builder entry indices for final matrix slots.
    pub fn finalize(&mut self, mapping: &EntryMapping) {
        for inst in &mut self.instances {
            inst.stamp.set_final_indices(|i| mapping.get(i));
        }
    }

    /// Give internal nodes back and forget matrix slots and state.
    pub fn unsetup(&mut self, nodes: &mut NodeTable) {
        for inst in &mut self.instances {
            if inst.owns_drain_prime {
                debug!("{}: releasing internal drain node {}", inst.name, inst.drain_prime);
                nodes.release(inst.drain_prime);
                inst.owns_drain_prime = false;
            }
            if inst.owns_source_prime {
                debug!("{}: releasing internal source node {}", inst.name, inst.source_prime);
                nodes.release(inst.source_prime);
                inst.owns_source_prime = false;
            }
            inst.drain_prime = inst.drain;
            inst.source_prime = inst.source;
            inst.stamp = JfetStamp::uninitialized();
            inst.state = None;
            inst.distortion = None;
        }
    }

    /// Fill initial-condition voltages that were not given from an
    /// operating-point `solution` (MNA-indexed).
    pub fn set_initial_conditions(&mut self, solution: &[f64]) {
        for inst in &mut self.instances {
            let n = inst.nodes;
            if inst.params.ic_vds.is_none() {
                inst.params.ic_vds = Some(get_voltage_diff(solution, n.drain, n.source));
            }
            if inst.params.ic_vgs.is_none() {
                inst.params.ic_vgs = Some(get_voltage_diff(solution, n.gate, n.source));
            }
        }
    }
}

fn resolve(inst: &JfetInstance, nodes: &NodeTable) -> JfetNodes {
    JfetNodes {
        drain: nodes.mna_index(inst.drain),
        gate: nodes.mna_index(inst.gate),
        source: nodes.mna_index(inst.source),
        drain_prime: nodes.mna_index(inst.drain_prime),
        source_prime: nodes.mna_index(inst.source_prime),
    }
}
