//! Newton step limiters for junction and FET control voltages.
//!
//! Both return the (possibly) limited voltage together with a flag telling
//! whether the value was changed.

/// Limit the step of a pn-junction voltage.
///
/// Above `vcrit` the exponential law makes large forward steps overshoot, so
/// the step is replaced by the voltage that gives the same current change on
/// a logarithmic scale.
pub fn pnjlim(vnew: f64, vold: f64, vt: f64, vcrit: f64) -> (f64, bool) {
    if vnew > vcrit && (vnew - vold).abs() > vt + vt {
        let limited = if vold > 0.0 {
            let arg = 1.0 + (vnew - vold) / vt;
            if arg > 0.0 {
                vold + vt * arg.ln()
            } else {
                vcrit
            }
        } else {
            vt * (vnew / vt).ln()
        };
        (limited, true)
    } else {
        (vnew, false)
    }
}

/// Limit the step of a FET control voltage relative to threshold `vto`.
pub fn fetlim(vnew: f64, vold: f64, vto: f64) -> (f64, bool) {
    let vtsthi = (2.0 * (vold - vto)).abs() + 2.0;
    let vtstlo = vtsthi / 2.0 + 2.0;
    let vtox = vto + 3.5;
    let delv = vnew - vold;

    let limited = if vold >= vto {
        if vold >= vtox {
            if delv <= 0.0 {
                // going off
                if vnew >= vtox {
                    if -delv > vtstlo { vold - vtstlo } else { vnew }
                } else {
                    vnew.max(vto + 2.0)
                }
            } else if delv >= vtsthi {
                // staying on
                vold + vtsthi
            } else {
                vnew
            }
        } else if delv <= 0.0 {
            // middle region
            vnew.max(vto - 0.5)
        } else {
            vnew.min(vto + 4.0)
        }
    } else if delv <= 0.0 {
        // off
        if -delv > vtsthi { vold - vtsthi } else { vnew }
    } else {
        let vtemp = vto + 0.5;
        if vnew <= vtemp {
            if delv > vtstlo { vold + vtstlo } else { vnew }
        } else {
            vtemp
        }
    };
    (limited, limited != vnew)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const VT: f64 = 0.025864;
    const VCRIT: f64 = 0.7;

    #[test]
    fn pnjlim_passes_small_steps() {
        assert_eq!(pnjlim(0.75, 0.74, VT, VCRIT), (0.75, false));
        assert_eq!(pnjlim(0.5, -3.0, VT, VCRIT), (0.5, false));
    }

    #[test]
    fn pnjlim_compresses_forward_steps() {
        let (v, limited) = pnjlim(2.0, 0.6, VT, VCRIT);
        assert!(limited);
        assert!((v - (0.6 + VT * (1.0 + 1.4 / VT).ln())).abs() < 1e-12);
        assert!(v < 2.0 && v > 0.6);
    }

    #[test]
    fn pnjlim_from_reverse_bias_uses_log() {
        let (v, limited) = pnjlim(1.5, -1.0, VT, VCRIT);
        assert!(limited);
        assert!((v - VT * (1.5 / VT).ln()).abs() < 1e-12);
    }

    #[rstest]
    // middle region, increasing: capped at vto + 4
    #[case(5.0, 0.0, -2.0, 2.0)]
    // middle region, decreasing: floored at vto - 0.5
    #[case(-10.0, 0.0, -2.0, -2.5)]
    // off, increasing past vto + 0.5
    #[case(1.0, -5.0, -2.0, -1.5)]
    // off, large negative step
    #[case(-20.0, -3.0, -2.0, -7.0)]
    // fully on, large positive step
    #[case(15.0, 2.0, -2.0, 12.0)]
    // fully on, going off below vtox
    #[case(-10.0, 2.0, -2.0, 0.0)]
    fn fetlim_clamps_steps(
        #[case] vnew: f64,
        #[case] vold: f64,
        #[case] vto: f64,
        #[case] expected: f64,
    ) {
        let (v, limited) = fetlim(vnew, vold, vto);
        assert!((v - expected).abs() < 1e-12, "v = {v}");
        assert!(limited);
    }

    #[test]
    fn fetlim_leaves_small_steps() {
        assert_eq!(fetlim(-0.5, -0.4, -2.0), (-0.5, false));
    }
}
