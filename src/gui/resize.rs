//! Debounced viewport resize handling.

use std::time::{Duration, Instant};

/// What a settled resize should rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeAction {
    pub bar_and_treemap: bool,
    pub flow: bool,
}

/// Waits for the viewport size to stop changing, then reports which charts to
/// rebuild. The flow diagram only follows width changes larger than
/// `flow_min_width_delta`.
#[derive(Debug, Clone)]
pub struct ResizeController {
    debounce: Duration,
    flow_min_width_delta: f32,
    current: Option<(f32, f32)>,
    pending_since: Option<Instant>,
    flow_width: Option<f32>,
}

impl ResizeController {
    pub fn new(debounce: Duration, flow_min_width_delta: f32) -> Self {
        Self {
            debounce,
            flow_min_width_delta,
            current: None,
            pending_since: None,
            flow_width: None,
        }
    }

    /// Record the width the flow diagram was last rendered at.
    pub fn mark_flow_rendered(&mut self, width: f32) {
        self.flow_width = Some(width);
    }

    /// Feed the current viewport size. A change restarts the quiet period.
    pub fn observe(&mut self, size: (f32, f32), now: Instant) {
        match self.current {
            None => self.current = Some(size),
            Some(previous) if previous != size => {
                self.current = Some(size);
                self.pending_since = Some(now);
            }
            Some(_) => {}
        }
    }

    /// Time left before a pending resize settles.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending_since
            .map(|since| self.debounce.saturating_sub(now.saturating_duration_since(since)))
    }

    /// Fires once per burst of changes, after the quiet period.
    pub fn poll(&mut self, now: Instant) -> Option<ResizeAction> {
        let since = self.pending_since?;
        if now.saturating_duration_since(since) < self.debounce {
            return None;
        }
        self.pending_since = None;
        let (width, _) = self.current?;
        let flow = match self.flow_width {
            Some(last) => (width - last).abs() > self.flow_min_width_delta,
            None => true,
        };
        tracing::debug!("Resize settled at width {width}, flow rebuild: {flow}");
        Some(ResizeAction {
            bar_and_treemap: true,
            flow,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> (ResizeController, Instant) {
        let mut c = ResizeController::new(Duration::from_millis(200), 50.0);
        let t0 = Instant::now();
        c.observe((1000.0, 800.0), t0);
        c.mark_flow_rendered(1000.0);
        (c, t0)
    }

    #[test]
    fn test_first_observation_is_not_a_resize() {
        let (mut c, t0) = controller();
        assert_eq!(c.remaining(t0), None);
        assert_eq!(c.poll(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_debounce_fires_once_after_quiet_period() {
        let (mut c, t0) = controller();
        c.observe((980.0, 800.0), t0 + Duration::from_millis(10));
        c.observe((900.0, 800.0), t0 + Duration::from_millis(100));
        // 150 ms after the last change: still waiting
        assert_eq!(c.poll(t0 + Duration::from_millis(250)), None);
        let fired = c.poll(t0 + Duration::from_millis(300)).unwrap();
        assert!(fired.bar_and_treemap);
        assert!(fired.flow);
        assert_eq!(c.poll(t0 + Duration::from_millis(600)), None);
    }

    #[test]
    fn test_small_width_change_skips_flow() {
        let (mut c, t0) = controller();
        c.observe((1030.0, 700.0), t0 + Duration::from_millis(10));
        let fired = c.poll(t0 + Duration::from_millis(210)).unwrap();
        assert!(fired.bar_and_treemap);
        assert!(!fired.flow);
    }

    #[test]
    fn test_remaining_counts_down() {
        let (mut c, t0) = controller();
        assert_eq!(c.remaining(t0), None);
        c.observe((900.0, 800.0), t0);
        assert_eq!(c.remaining(t0 + Duration::from_millis(50)), Some(Duration::from_millis(150)));
    }
}
