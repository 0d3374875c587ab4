// Pure Functions Module
// Series synthesis and aggregation. No I/O, no clocks, no globals: the current
// time and the random source are always passed in.

pub mod aggregator;
pub mod synthesizer;

pub use aggregator::{aggregate, compare_periods, p75};
pub use synthesizer::{synthesize, synthesize_for_label};

/// Round `value` to `decimals` fractional digits, half away from zero.
/// Negative zero is normalized so it serializes as `0`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1834.4999, 0), 1834.0);
        assert_eq!(round_to(1834.5, 0), 1835.0);
        assert_eq!(round_to(0.09449, 3), 0.094);
        assert_eq!(round_to(-2.449, 1), -2.4);
        assert_eq!(round_to(3.0, 3), 3.0);
    }

    #[test]
    fn test_round_to_normalizes_negative_zero() {
        let rounded = round_to(-0.04, 1);
        assert_eq!(rounded, 0.0);
        assert!(rounded.is_sign_positive());
    }
}
