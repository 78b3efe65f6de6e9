use num_complex::Complex64;

pub(crate) fn get_voltage_diff(
    voltages: &[f64],
    positive: Option<usize>,
    negative: Option<usize>,
) -> f64 {
    get_voltage(voltages, positive) - get_voltage(voltages, negative)
}

pub(crate) fn get_voltage(voltages: &[f64], node: Option<usize>) -> f64 {
    node.map_or(0.0, |n| voltages[n])
}

pub(crate) fn get_complex_diff(
    voltages: &[Complex64],
    positive: Option<usize>,
    negative: Option<usize>,
) -> Complex64 {
    let v = |node: Option<usize>| node.map_or(Complex64::new(0.0, 0.0), |n| voltages[n]);
    v(positive) - v(negative)
}
