//! Volterra distortion of the JFET.
//!
//! A distortion setup pass stores the Taylor coefficients of every
//! nonlinearity at the operating point. Each mixing product then turns the
//! node responses into nonlinear branch currents and adds them to the RHS.

use log::debug;
use num_complex::Complex64;

use super::evaluate::{ChannelMode, ChannelParams, JunctionParams, Polynomial, local_coordinates};
use super::load::ModelConstants;
use super::model::JfetModel;
use crate::config::SimulationConfig;
use crate::error::{JfetError, JfetResult};
use crate::matrix::SolverMatrix;
use crate::util::{get_complex_diff, get_voltage_diff};
use crate::volterra::{MixingInputs, Pair, Taylor1, Taylor2, mixing_response};

/// Taylor coefficients of the JFET nonlinearities, in terminal voltages
/// and with the channel polarity applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DistortionCoefficients {
    /// Drain current in `(vgs, vds)`.
    pub channel: Taylor2,
    /// Gate-source junction current in `vgs`.
    pub gate_source: Taylor1,
    /// Gate-drain junction current in `vgd`.
    pub gate_drain: Taylor1,
    /// Gate-source charge in `vgs`.
    pub cap_gs: Taylor1,
    /// Gate-drain charge in `vgd`.
    pub cap_gd: Taylor1,
}

/// Taylor coefficients of the channel current around `(vgs, vgd)`.
pub(crate) fn channel_taylor(p: &ChannelParams, sign: f64, vgs: f64, vgd: f64) -> Taylor2 {
    let (mode, x, z) = local_coordinates(p.vto, vgs, vgd);
    let (_, d) = Polynomial::at(p.b, p.b_fac, x, z);

    let betap = p.beta * (1.0 + p.lambda * z);
    let bl = p.beta * p.lambda;
    let a = Taylor2 {
        x: betap * d.x,
        z: bl * d.p + betap * d.z,
        xx: betap * d.xx / 2.0,
        xz: bl * d.x + betap * d.xz,
        zz: (2.0 * bl * d.z + betap * d.zz) / 2.0,
        xxx: betap * d.xxx / 6.0,
        xxz: (bl * d.xx + betap * d.xxz) / 2.0,
        xzz: (2.0 * bl * d.xz + betap * d.xzz) / 2.0,
        zzz: (3.0 * bl * d.zz + betap * d.zzz) / 6.0,
    };

    // I = -f(vgs - vds - vto, -vds) in inverse mode
    let t = match mode {
        ChannelMode::Normal => a,
        ChannelMode::Inverse => Taylor2 {
            x: -a.x,
            z: a.x + a.z,
            xx: -a.xx,
            xz: 2.0 * a.xx + a.xz,
            zz: -(a.xx + a.xz + a.zz),
            xxx: -a.xxx,
            xxz: 3.0 * a.xxx + a.xxz,
            xzz: -(3.0 * a.xxx + 2.0 * a.xxz + a.xzz),
            zzz: a.xxx + a.xxz + a.xzz + a.zzz,
        },
    };

    // even orders pick up the polarity
    Taylor2 {
        xx: sign * t.xx,
        xz: sign * t.xz,
        zz: sign * t.zz,
        ..t
    }
}

/// Taylor coefficients of a junction current around `v`.
pub(crate) fn junction_taylor(j: &JunctionParams, sign: f64, v: f64) -> Taylor1 {
    if v <= -5.0 * j.vt {
        Taylor1 {
            c1: -j.csat / v + j.gmin,
            c2: 0.0,
            c3: 0.0,
        }
    } else {
        let g = j.csat * (v / j.vt).exp() / j.vt;
        Taylor1 {
            c1: g + j.gmin,
            c2: sign * g / (2.0 * j.vt),
            c3: g / (6.0 * j.vt * j.vt),
        }
    }
}

fn with_polarity(t: Taylor1, sign: f64) -> Taylor1 {
    Taylor1 {
        c2: sign * t.c2,
        ..t
    }
}

impl JfetModel {
    /// Compute the distortion coefficients of every instance at the
    /// operating point `solution` (MNA-indexed).
    pub fn distortion_setup(&mut self, config: &SimulationConfig, solution: &[f64]) {
        let constants = ModelConstants::of(self);
        let sign = constants.sign;
        for inst in &mut self.instances {
            let n = inst.nodes;
            let vgs = sign * get_voltage_diff(solution, n.gate, n.source_prime);
            let vgd = sign * get_voltage_diff(solution, n.gate, n.drain_prime);

            let junction = constants.junction(inst, config.gmin);
            let (gs_law, gd_law) = constants.depletion(inst);
            inst.mode = ChannelMode::from_vds(vgs - vgd);
            inst.distortion = Some(DistortionCoefficients {
                channel: channel_taylor(&constants.channel(inst), sign, vgs, vgd),
                gate_source: junction_taylor(&junction, sign, vgs),
                gate_drain: junction_taylor(&junction, sign, vgd),
                cap_gs: with_polarity(gs_law.taylor(vgs), sign),
                cap_gd: with_polarity(gd_law.taylor(vgd), sign),
            });
            debug!("{}: distortion coefficients at vgs={vgs}, vgd={vgd}", inst.name);
        }
    }

    /// Add the nonlinear currents of one mixing product to the RHS.
    ///
    /// `inputs` holds MNA-indexed node responses; the matrix is left alone.
    pub fn distortion_load(
        &self,
        inputs: &MixingInputs<&[Complex64]>,
        omega1: f64,
        omega2: f64,
        matrix: &mut SolverMatrix,
    ) -> JfetResult<()> {
        let jw = Complex64::new(0.0, inputs.output_omega(omega1, omega2));
        for inst in &self.instances {
            let coeffs = inst
                .distortion
                .as_ref()
                .ok_or_else(|| JfetError::DistortionNotSetUp {
                    instance: inst.name.clone(),
                })?;
            let n = inst.nodes;

            let vgs = inputs.map(|v| get_complex_diff(v, n.gate, n.source_prime));
            let vgd = inputs.map(|v| get_complex_diff(v, n.gate, n.drain_prime));
            let channel_inputs = inputs.map(|v| Pair {
                x: get_complex_diff(v, n.gate, n.source_prime),
                z: get_complex_diff(v, n.drain_prime, n.source_prime),
            });

            let i_channel = mixing_response(&coeffs.channel, &channel_inputs);
            let i_gs = mixing_response(&coeffs.gate_source, &vgs)
                + jw * mixing_response(&coeffs.cap_gs, &vgs);
            let i_gd = mixing_response(&coeffs.gate_drain, &vgd)
                + jw * mixing_response(&coeffs.cap_gd, &vgd);

            // each current leaves the first node and enters the second
            for (from, to, current) in [
                (n.drain_prime, n.source_prime, i_channel),
                (n.gate, n.source_prime, i_gs),
                (n.gate, n.drain_prime, i_gd),
            ] {
                matrix.add_rhs_complex(from, -current);
                matrix.add_rhs_complex(to, current);
            }
        }
        Ok(())
    }
}
