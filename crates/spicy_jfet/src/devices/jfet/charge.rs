use crate::volterra::Taylor1;

/// Depletion charge law of one gate junction at a fixed temperature.
///
/// Below `dep_cap` the charge follows the square-root depletion law; above
/// it the capacitance is extended linearly so it stays finite through
/// `v = pb`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepletionCharge {
    /// Zero-bias capacitance, area applied.
    pub cz: f64,
    /// Junction potential.
    pub pb: f64,
    pub dep_cap: f64,
    pub f1: f64,
    pub f2: f64,
    pub f3: f64,
}

impl DepletionCharge {
    /// Stored charge and small-signal capacitance at `v`.
    pub fn charge(&self, v: f64) -> (f64, f64) {
        let twop = self.pb + self.pb;
        if v < self.dep_cap {
            let sarg = (1.0 - v / self.pb).sqrt();
            (twop * self.cz * (1.0 - sarg), self.cz / sarg)
        } else {
            let czf2 = self.cz / self.f2;
            let q = self.cz * self.f1
                + czf2
                    * (self.f3 * (v - self.dep_cap)
                        + (v * v - self.dep_cap * self.dep_cap) / (twop + twop));
            (q, czf2 * (self.f3 + v / twop))
        }
    }

    /// Taylor coefficients of the charge around `v`.
    pub fn taylor(&self, v: f64) -> Taylor1 {
        let (_, c1) = self.charge(v);
        if v < self.dep_cap {
            let base = 1.0 - v / self.pb;
            Taylor1 {
                c1,
                c2: 0.5 * self.cz / (2.0 * self.pb) * base.powf(-1.5),
                c3: self.cz * 3.0 / (4.0 * self.pb * self.pb) * base.powf(-2.5) / 6.0,
            }
        } else {
            Taylor1 {
                c1,
                c2: 0.5 * (self.cz / self.f2) / (2.0 * self.pb),
                c3: 0.0,
            }
        }
    }
}
