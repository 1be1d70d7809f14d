//! Ratio-preserving scaling helpers shared across the engine.

/// Scales `components` down so their sum does not exceed `cap_total`,
/// preserving the ratios between them.
///
/// Returns the components unchanged when their sum is already within the
/// cap, when the sum is zero, or when the cap is not a positive finite
/// number (nothing meaningful to scale against).
pub fn scale_to_cap(components: &[f32], cap_total: f32) -> Vec<f32> {
    let sum: f32 = components.iter().sum();
    if sum <= cap_total || sum <= 0.0 || !cap_total.is_finite() || cap_total < 0.0 {
        return components.to_vec();
    }
    let k = cap_total / sum;
    components.iter().map(|c| c * k).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn under_cap_is_unchanged() {
        let scaled = scale_to_cap(&[1.0, 2.0], 5.0);
        assert_eq!(scaled, vec![1.0, 2.0]);
    }

    #[test]
    fn over_cap_scales_proportionally() {
        let scaled = scale_to_cap(&[6.0, 2.0], 4.0);
        assert!((scaled[0] - 3.0).abs() < 1e-5);
        assert!((scaled[1] - 1.0).abs() < 1e-5);
        // Ratio preserved
        assert!((scaled[0] / scaled[1] - 3.0).abs() < 1e-5);
    }

    #[test]
    fn scaled_sum_equals_cap() {
        let scaled = scale_to_cap(&[10.0, 30.0, 60.0], 25.0);
        let sum: f32 = scaled.iter().sum();
        assert!((sum - 25.0).abs() < 1e-4);
    }

    #[test]
    fn zero_sum_is_unchanged() {
        let scaled = scale_to_cap(&[0.0, 0.0], 10.0);
        assert_eq!(scaled, vec![0.0, 0.0]);
    }

    #[test]
    fn zero_cap_zeroes_components() {
        let scaled = scale_to_cap(&[1.0, 1.0], 0.0);
        assert_eq!(scaled, vec![0.0, 0.0]);
    }
}
