//! Volterra-series helpers for weakly nonlinear distortion.
//!
//! A nonlinear branch is described by the 2nd and 3rd order Taylor
//! coefficients of its current (or charge) around the operating point. The
//! mixing products below combine them with the first and second order
//! node responses to give the branch current at each output frequency.

use num_complex::Complex64;

/// Taylor coefficients that can be evaluated as symmetric multilinear forms.
pub trait TaylorForm {
    /// A small-signal value of the controlling voltage(s).
    type Point: Copy;

    /// Symmetric bilinear form: `B(u, u)` is the second-order term.
    fn bilinear(&self, u: Self::Point, v: Self::Point) -> Complex64;

    /// Symmetric trilinear form: `T(u, u, u)` is the third-order term.
    fn trilinear(&self, u: Self::Point, v: Self::Point, w: Self::Point) -> Complex64;

    fn conj(p: Self::Point) -> Self::Point;
}

/// Taylor coefficients of a one-port: `f(v0 + v) = f(v0) + c1 v + c2 v^2 + c3 v^3`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Taylor1 {
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
}

impl TaylorForm for Taylor1 {
    type Point = Complex64;

    fn bilinear(&self, u: Complex64, v: Complex64) -> Complex64 {
        self.c2 * u * v
    }

    fn trilinear(&self, u: Complex64, v: Complex64, w: Complex64) -> Complex64 {
        self.c3 * u * v * w
    }

    fn conj(p: Complex64) -> Complex64 {
        p.conj()
    }
}

/// Small-signal value of a two-port's controlling voltages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pair {
    pub x: Complex64,
    pub z: Complex64,
}

/// Taylor coefficients of a function of two voltages `x` and `z`,
/// named by the monomial they multiply.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Taylor2 {
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

impl TaylorForm for Taylor2 {
    type Point = Pair;

    fn bilinear(&self, u: Pair, v: Pair) -> Complex64 {
        self.xx * u.x * v.x + self.zz * u.z * v.z + 0.5 * self.xz * (u.x * v.z + u.z * v.x)
    }

    fn trilinear(&self, u: Pair, v: Pair, w: Pair) -> Complex64 {
        let xxz = u.x * v.x * w.z + u.x * v.z * w.x + u.z * v.x * w.x;
        let xzz = u.x * v.z * w.z + u.z * v.x * w.z + u.z * v.z * w.x;
        self.xxx * u.x * v.x * w.x
            + self.xxz * xxz / 3.0
            + self.xzz * xzz / 3.0
            + self.zzz * u.z * v.z * w.z
    }

    fn conj(p: Pair) -> Pair {
        Pair {
            x: p.x.conj(),
            z: p.z.conj(),
        }
    }
}

/// Inputs of one mixing product: the node responses it is built from.
///
/// `h1_*` are first-order responses at the stimulus frequencies, `h2_11`
/// the second-order response at `2 f1` and `h2_1m2` the one at `f1 - f2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MixingInputs<P> {
    /// `2 f1`
    SecondHarmonic { h1: P },
    /// `3 f1`
    ThirdHarmonic { h1: P, h2_11: P },
    /// `f1 + f2`
    SumFrequency { h1_f1: P, h1_f2: P },
    /// `f1 - f2`
    DifferenceFrequency { h1_f1: P, h1_f2: P },
    /// `2 f1 - f2`
    ThirdOrderIntermod {
        h1_f1: P,
        h1_f2: P,
        h2_11: P,
        h2_1m2: P,
    },
}

impl<P: Copy> MixingInputs<P> {
    pub fn map<Q>(&self, mut f: impl FnMut(P) -> Q) -> MixingInputs<Q> {
        match *self {
            Self::SecondHarmonic { h1 } => MixingInputs::SecondHarmonic { h1: f(h1) },
            Self::ThirdHarmonic { h1, h2_11 } => MixingInputs::ThirdHarmonic {
                h1: f(h1),
                h2_11: f(h2_11),
            },
            Self::SumFrequency { h1_f1, h1_f2 } => MixingInputs::SumFrequency {
                h1_f1: f(h1_f1),
                h1_f2: f(h1_f2),
            },
            Self::DifferenceFrequency { h1_f1, h1_f2 } => MixingInputs::DifferenceFrequency {
                h1_f1: f(h1_f1),
                h1_f2: f(h1_f2),
            },
            Self::ThirdOrderIntermod {
                h1_f1,
                h1_f2,
                h2_11,
                h2_1m2,
            } => MixingInputs::ThirdOrderIntermod {
                h1_f1: f(h1_f1),
                h1_f2: f(h1_f2),
                h2_11: f(h2_11),
                h2_1m2: f(h2_1m2),
            },
        }
    }

    /// Angular frequency of the product given the two stimulus frequencies.
    pub fn output_omega(&self, omega1: f64, omega2: f64) -> f64 {
        match self {
            Self::SecondHarmonic { .. } => 2.0 * omega1,
            Self::ThirdHarmonic { .. } => 3.0 * omega1,
            Self::SumFrequency { .. } => omega1 + omega2,
            Self::DifferenceFrequency { .. } => omega1 - omega2,
            Self::ThirdOrderIntermod { .. } => 2.0 * omega1 - omega2,
        }
    }
}

/// Nonlinear response of `kernel` for one mixing product.
pub fn mixing_response<K: TaylorForm>(kernel: &K, inputs: &MixingInputs<K::Point>) -> Complex64 {
    match *inputs {
        MixingInputs::SecondHarmonic { h1 } => kernel.bilinear(h1, h1),
        MixingInputs::ThirdHarmonic { h1, h2_11 } => {
            kernel.trilinear(h1, h1, h1) + 2.0 * kernel.bilinear(h1, h2_11)
        }
        MixingInputs::SumFrequency { h1_f1, h1_f2 } => 2.0 * kernel.bilinear(h1_f1, h1_f2),
        MixingInputs::DifferenceFrequency { h1_f1, h1_f2 } => {
            2.0 * kernel.bilinear(h1_f1, K::conj(h1_f2))
        }
        MixingInputs::ThirdOrderIntermod {
            h1_f1,
            h1_f2,
            h2_11,
            h2_1m2,
        } => {
            let b = K::conj(h1_f2);
            3.0 * kernel.trilinear(h1_f1, h1_f1, b)
                + 2.0 * kernel.bilinear(h1_f1, h2_1m2)
                + 2.0 * kernel.bilinear(b, h2_11)
        }
    }
}
