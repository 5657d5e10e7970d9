//! Volume slider with a logarithmic response.
//!
//! Loudness is perceived logarithmically, so the slider position is mapped to
//! linear gain with `gain = 1 - ln(max - value) / ln(max)`.

/// Map a slider position in `0..=max` to a linear gain in `[0, 1]`.
///
/// `value >= max` is full gain: `ln(0)` is undefined, so that end is
/// special-cased rather than computed.
pub fn slider_to_gain(value: u32, max: u32) -> f32 {
    if value >= max {
        return 1.0;
    }
    // With max == 1 the only position below the top is 0, and ln(1) == 0
    // would make the formula divide by zero.
    if max <= 1 {
        return 0.0;
    }

    let gain = 1.0 - f64::from(max - value).ln() / f64::from(max).ln();
    gain.clamp(0.0, 1.0) as f32
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VolumeSlider {
    value: u32,
    max: u32,
}

impl VolumeSlider {
    pub fn new(value: u32, max: u32) -> Self {
        let max = max.max(1);
        Self {
            value: value.min(max),
            max,
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn gain(&self) -> f32 {
        slider_to_gain(self.value, self.max)
    }

    /// Slider position as a fraction of its travel, for drawing.
    pub fn fraction(&self) -> f64 {
        f64::from(self.value) / f64::from(self.max)
    }

    pub fn raise(&mut self, step: u32) {
        self.value = self.value.saturating_add(step).min(self.max);
    }

    pub fn lower(&mut self, step: u32) {
        self.value = self.value.saturating_sub(step);
    }
}
