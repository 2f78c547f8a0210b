use crate::consts::THRESHOLD_SLIDER_STEPS;

/// Threshold applied to the raw scores of the displayed kind.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterState {
    fraction: f32,
}

impl FilterState {
    pub fn new(fraction: f32) -> Self {
        let mut state = Self::default();
        state.set_fraction(fraction);
        state
    }

    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    /// Clamps into `[0, 1]`; NaN resets the filter.
    pub fn set_fraction(&mut self, fraction: f32) {
        self.fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
    }

    pub fn set_percent(&mut self, percent: u32) {
        let step = percent.min(THRESHOLD_SLIDER_STEPS);
        self.set_fraction(step as f32 / THRESHOLD_SLIDER_STEPS as f32);
    }

    pub fn reset(&mut self) {
        self.fraction = 0.0;
    }

    /// Value below which cells are hidden.
    pub fn cutoff(&self, raw: &[f32]) -> f32 {
        max_value(raw) * self.fraction
    }

    /// Derives the display grid: cells below `fraction * max(raw)` become 0.
    pub fn apply(&self, raw: &[f32]) -> Vec<f32> {
        if self.fraction == 0.0 {
            return raw.to_vec();
        }
        let cutoff = self.cutoff(raw);
        raw.iter()
            .map(|&v| if v < cutoff { 0.0 } else { v })
            .collect()
    }
}

/// Largest finite value, 0.0 for an empty slice.
pub fn max_value(values: &[f32]) -> f32 {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<f32>, v| Some(acc.map_or(v, |a| a.max(v))))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_fraction_is_clamped() {
        assert_eq!(FilterState::new(-0.3).fraction(), 0.0);
        assert_eq!(FilterState::new(4.0).fraction(), 1.0);
        assert_eq!(FilterState::new(f32::NAN).fraction(), 0.0);
    }

    #[test]
    fn test_percent_slider_maps_to_fraction() {
        let mut f = FilterState::default();
        f.set_percent(25);
        assert!((f.fraction() - 0.25).abs() < 1e-6);
        f.set_percent(250);
        assert_eq!(f.fraction(), 1.0);
    }

    #[test]
    fn test_max_ignores_non_finite() {
        assert_eq!(max_value(&[1.0, f32::NAN, 3.0, f32::INFINITY]), 3.0);
        assert_eq!(max_value(&[]), 0.0);
        assert_eq!(max_value(&[-2.0, -1.0]), -1.0);
    }
}
