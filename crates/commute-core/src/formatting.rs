/// Round `value` to `decimals` places, half away from zero.
///
/// # Examples
///
/// ```
/// use commute_core::formatting::round_to;
///
/// assert_eq!(round_to(12.345, 2), 12.35);
/// assert_eq!(round_to(5.0, 2), 5.0);
/// assert_eq!(round_to(-1.005, 1), -1.0);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    // Nudge by a few ULPs so binary midpoints like 12.345 round up.
    let epsilon = f64::EPSILON * value.abs() * factor;
    let scaled = value * factor;
    let nudged = if scaled >= 0.0 {
        scaled + epsilon
    } else {
        scaled - epsilon
    };
    nudged.round() / factor
}

/// Format a kilometre distance with two decimals and a unit suffix.
///
/// ```
/// use commute_core::formatting::format_km;
///
/// assert_eq!(format_km(10.0), "10.00 km");
/// assert_eq!(format_km(3.14159), "3.14 km");
/// ```
pub fn format_km(km: f64) -> String {
    format!("{:.2} km", round_to(km, 2))
}
