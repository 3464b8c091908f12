/// Writes a value the way the imaging host's log window
/// shows floats: shortest round-trip digits, integral values
/// keep a trailing `.0`, and magnitudes outside `[1e-4, 1e16)`
/// switch to exponent notation with a signed two-digit
/// exponent (`1e-05`, `1.5e+16`).
///
/// ## Example
///
/// ```rust, ignore
/// assert_eq!(format_value(1.0), "1.0");
/// assert_eq!(format_value(-12.5), "-12.5");
/// assert_eq!(format_value(0.00001), "1e-05");
/// ```
pub fn format_value(value : f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return exponent_form(value);
    }
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// `1.5e-5` -> `1.5e-05`, `1e16` -> `1e+16`
fn exponent_form(value : f64) -> String {
    let shortest = format!("{:e}", value);
    match shortest.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        },
        None => shortest,
    }
}
