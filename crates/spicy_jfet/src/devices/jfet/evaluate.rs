//! DC evaluation of the JFET: gate junctions and the channel.
//!
//! The channel uses the doping-tail corrected polynomial of the Sydney
//! University model. Written in normal-mode coordinates `x = vgs - vto`
//! and `z = vds`:
//!
//! ```text
//! linear     (x >= z):  P = B z^3 - b z^2 + 2 b x z + 3 B x^2 z - 3 B x z^2
//! saturation (x <  z):  P = b x^2 + B x^3
//! cutoff     (x <= 0):  P = 0
//! I = beta (1 + lambda z) P
//! ```
//!
//! with `B = (1 - b) / (pb - vto)`. For `b = 1` this is the square law.

use serde::Serialize;

/// Which physical terminal acts as the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ChannelMode {
    /// `vds >= 0`: the source terminal is the source.
    #[default]
    Normal,
    /// `vds < 0`: drain and source swap roles.
    Inverse,
}

impl ChannelMode {
    pub fn from_vds(vds: f64) -> Self {
        if vds >= 0.0 { Self::Normal } else { Self::Inverse }
    }

    pub fn sign(self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::Inverse => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Region {
    Cutoff,
    Linear,
    Saturation,
}

/// Current and conductance of one gate junction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Junction {
    pub current: f64,
    pub conductance: f64,
}

/// Diode law with a gmin shunt. Below `-5 vt` the exponential is replaced
/// by a conductance floor.
pub fn junction(v: f64, csat: f64, vt: f64, gmin: f64) -> Junction {
    if v <= -5.0 * vt {
        let conductance = -csat / v + gmin;
        Junction {
            current: conductance * v,
            conductance,
        }
    } else {
        let e = (v / vt).exp();
        Junction {
            current: csat * (e - 1.0) + gmin * v,
            conductance: csat * e / vt + gmin,
        }
    }
}

/// Channel parameters with area already applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelParams {
    pub beta: f64,
    pub lambda: f64,
    pub vto: f64,
    pub b: f64,
    pub b_fac: f64,
}

/// The channel polynomial and its partial derivatives at one point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Polynomial {
    pub p: f64,
    pub x: f64,
    pub z: f64,
    pub xx: f64,
    pub xz: f64,
    pub zz: f64,
    pub xxx: f64,
    pub xxz: f64,
    pub xzz: f64,
    pub zzz: f64,
}

impl Polynomial {
    pub(crate) fn at(b: f64, bf: f64, x: f64, z: f64) -> (Region, Self) {
        if x <= 0.0 {
            (Region::Cutoff, Self::default())
        } else if x >= z {
            let poly = Self {
                p: z * (z * (bf * z - b) + x * (2.0 * b + 3.0 * bf * (x - z))),
                x: z * (2.0 * b + 6.0 * bf * x - 3.0 * bf * z),
                z: (x - z) * (2.0 * b + 3.0 * bf * (x - z)),
                xx: 6.0 * bf * z,
                xz: 2.0 * b + 6.0 * bf * (x - z),
                zz: 6.0 * bf * (z - x) - 2.0 * b,
                xxx: 0.0,
                xxz: 6.0 * bf,
                xzz: -6.0 * bf,
                zzz: 6.0 * bf,
            };
            (Region::Linear, poly)
        } else {
            let poly = Self {
                p: x * x * (b + bf * x),
                x: x * (2.0 * b + 3.0 * bf * x),
                xx: 2.0 * b + 6.0 * bf * x,
                xxx: 6.0 * bf,
                ..Self::default()
            };
            (Region::Saturation, poly)
        }
    }
}

/// Channel current and its derivatives with respect to the external
/// `vgs` and `vds`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Channel {
    pub current: f64,
    pub gm: f64,
    pub gds: f64,
    pub mode: ChannelMode,
    pub region: Region,
}

/// Normal-mode coordinates `(x, z)` for the given junction voltages.
pub(crate) fn local_coordinates(vto: f64, vgs: f64, vgd: f64) -> (ChannelMode, f64, f64) {
    let vds = vgs - vgd;
    match ChannelMode::from_vds(vds) {
        ChannelMode::Normal => (ChannelMode::Normal, vgs - vto, vds),
        ChannelMode::Inverse => (ChannelMode::Inverse, vgd - vto, -vds),
    }
}

pub fn channel(p: &ChannelParams, vgs: f64, vgd: f64) -> Channel {
    let (mode, x, z) = local_coordinates(p.vto, vgs, vgd);
    let (region, poly) = Polynomial::at(p.b, p.b_fac, x, z);
    if region == Region::Cutoff {
        return Channel {
            current: 0.0,
            gm: 0.0,
            gds: 0.0,
            mode,
            region,
        };
    }

    let betap = p.beta * (1.0 + p.lambda * z);
    let f = betap * poly.p;
    let fx = betap * poly.x;
    let fz = p.beta * p.lambda * poly.p + betap * poly.z;

    let (current, gm, gds) = match mode {
        ChannelMode::Normal => (f, fx, fz),
        ChannelMode::Inverse => (-f, -fx, fx + fz),
    };
    Channel {
        current,
        gm,
        gds,
        mode,
        region,
    }
}

/// Everything the DC kernel produces for one bias point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DcSolution {
    pub vgs: f64,
    pub vgd: f64,
    pub ggs: f64,
    pub ggd: f64,
    /// Total gate current (both junctions).
    pub cg: f64,
    /// Gate-drain junction current.
    pub cgd: f64,
    /// Drain terminal current: channel minus gate-drain junction.
    pub cd: f64,
    pub cdrain: f64,
    pub gm: f64,
    pub gds: f64,
    pub mode: ChannelMode,
    pub region: Region,
}

/// Junction temperature quantities with area applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JunctionParams {
    pub csat: f64,
    pub vt: f64,
    pub gmin: f64,
}

pub fn evaluate(c: &ChannelParams, j: &JunctionParams, vgs: f64, vgd: f64) -> DcSolution {
    let gs = junction(vgs, j.csat, j.vt, j.gmin);
    let gd = junction(vgd, j.csat, j.vt, j.gmin);
    let ch = channel(c, vgs, vgd);
    DcSolution {
        vgs,
        vgd,
        ggs: gs.conductance,
        ggd: gd.conductance,
        cg: gs.current + gd.current,
        cgd: gd.current,
        cd: ch.current - gd.current,
        cdrain: ch.current,
        gm: ch.gm,
        gds: ch.gds,
        mode: ch.mode,
        region: ch.region,
    }
}
