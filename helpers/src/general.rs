use std::error::Error;
use std::f64::consts::PI;
use std::fmt;

/// InputValueError is used if some engine option or parameter does not fulfill the posed
/// requirements, e.g., a non-positive scale factor.
#[derive(Debug, Clone)]
pub struct InputValueError {
    pub parameter: String,
}

impl InputValueError {
    pub fn new(parameter: &str) -> InputValueError {
        InputValueError {
            parameter: parameter.to_owned(),
        }
    }
}

impl fmt::Display for InputValueError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid input value for {}", self.parameter)
    }
}

impl Error for InputValueError {}

/// ease_in_out maps the traversal progress p to the covered share of the distance. The curve has
/// zero slope at p = 0 and p = 1 and its steepest point at p = 0.5.
pub fn ease_in_out(p: f64) -> f64 {
    0.5 * (1.0 - (PI * p).cos())
}

/// inverse_ease_in_out returns the progress p at which ease_in_out(p) equals the given share of
/// the distance. The share is clamped to [0, 1].
pub fn inverse_ease_in_out(share: f64) -> f64 {
    (1.0 - 2.0 * share.max(0.0).min(1.0)).acos() / PI
}

/// round_millis rounds a duration given in seconds to three decimal places.
pub fn round_millis(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

/// fmt_secs formats seconds the way the race timer displays them, e.g. "12.345".
pub fn fmt_secs(secs: f64) -> String {
    format!("{:.3}", secs)
}
