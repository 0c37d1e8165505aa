//! Band and linear scales used by the bar chart.

/// Evenly spaced bands over `[0, range]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    pub start: f32,
    pub step: f32,
    pub bandwidth: f32,
}

impl BandScale {
    /// Centered bands with the given inner/outer padding, as fractions of the step.
    pub fn new(count: usize, range: f32, padding_inner: f32, padding_outer: f32) -> Self {
        let n = count as f32;
        let step = range / (n - padding_inner + 2.0 * padding_outer).max(1.0);
        let start = (range - step * (n - padding_inner)) * 0.5;
        Self {
            start,
            step,
            bandwidth: step * (1.0 - padding_inner),
        }
    }

    pub fn position(&self, index: usize) -> f32 {
        self.start + self.step * index as f32
    }
}

/// Tick step for `[0, max]` split into about `count` intervals (1, 2 or 5 × 10ⁿ).
pub fn tick_step(max: f64, count: usize) -> f64 {
    if max <= 0.0 || count == 0 {
        return 1.0;
    }
    let raw = max / count as f64;
    let power = raw.log10().floor();
    let base = 10f64.powf(power);
    let error = raw / base;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * base
}

/// Extend `max` to a round tick boundary.
pub fn nice_max(max: f64, count: usize) -> f64 {
    if max <= 0.0 {
        return 0.0;
    }
    let mut stop = max;
    let mut previous = f64::NAN;
    for _ in 0..10 {
        let step = tick_step(stop, count);
        if step == previous {
            break;
        }
        stop = (stop / step).ceil() * step;
        previous = step;
    }
    stop
}

/// Tick values from zero to `max` inclusive.
pub fn ticks(max: f64, count: usize) -> Vec<f64> {
    if max <= 0.0 {
        return vec![0.0];
    }
    let step = tick_step(max, count);
    let n = (max / step).floor() as usize;
    (0..=n).map(|i| i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_scale_padding() {
        let band = BandScale::new(4, 420.0, 0.2, 0.2);
        // step = 420 / 4.2
        assert!((band.step - 100.0).abs() < 1e-3);
        assert!((band.bandwidth - 80.0).abs() < 1e-3);
        assert!((band.start - 20.0).abs() < 1e-3);
        assert!((band.position(3) - 320.0).abs() < 1e-3);
    }

    #[test]
    fn test_band_scale_empty() {
        let band = BandScale::new(0, 100.0, 0.2, 0.2);
        assert!(band.step.is_finite());
    }

    #[test]
    fn test_tick_step_and_nice() {
        assert!((tick_step(7.0, 10) - 0.5).abs() < 1e-12);
        assert_eq!(tick_step(13.0, 10), 1.0);
        assert_eq!(tick_step(47.0, 10), 5.0);
        assert_eq!(nice_max(47.0, 10), 50.0);
        assert_eq!(nice_max(13.0, 10), 13.0);
        assert_eq!(nice_max(0.0, 10), 0.0);
    }

    #[test]
    fn test_ticks() {
        let t = ticks(50.0, 10);
        assert_eq!(t.len(), 11);
        assert_eq!(t[10], 50.0);
        assert_eq!(ticks(0.0, 10), vec![0.0]);
    }
}
