use crate::config::{BUTTON_DEBOUNCE_MS, LONG_PRESS_MS, SHORT_PRESS_MS};

/// Classified press reported when the button is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressKind {
    /// Bounce, or a release without a recorded press.
    NoEvent,
    Short,
    Medium,
    Long,
}

/// Duration thresholds in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PressThresholds {
    pub debounce_ms: u64,
    pub short_ms: u64,
    pub long_ms: u64,
}

impl PressThresholds {
    pub const DEFAULT: Self = Self {
        debounce_ms: BUTTON_DEBOUNCE_MS,
        short_ms: SHORT_PRESS_MS,
        long_ms: LONG_PRESS_MS,
    };

    pub fn classify(&self, duration_ms: u64) -> PressKind {
        if duration_ms < self.debounce_ms {
            PressKind::NoEvent
        } else if duration_ms < self.short_ms {
            PressKind::Short
        } else if duration_ms < self.long_ms {
            PressKind::Medium
        } else {
            PressKind::Long
        }
    }
}

/// Two-state press tracker: IDLE until a press edge, PRESSED until release.
pub struct PressTracker {
    thresholds: PressThresholds,
    pressed_at: Option<u64>,
}

impl PressTracker {
    pub const fn new(thresholds: PressThresholds) -> Self {
        Self {
            thresholds,
            pressed_at: None,
        }
    }

    /// Falling edge.  A repeated press edge restarts the measurement.
    pub fn on_press(&mut self, now_ms: u64) {
        self.pressed_at = Some(now_ms);
    }

    /// Rising edge.
    pub fn on_release(&mut self, now_ms: u64) -> PressKind {
        match self.pressed_at.take() {
            Some(start) => self.thresholds.classify(now_ms.saturating_sub(start)),
            None => PressKind::NoEvent,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_boundaries() {
        let t = PressThresholds::DEFAULT;
        assert_eq!(t.classify(SHORT_PRESS_MS - 1), PressKind::Short);
        assert_eq!(t.classify(SHORT_PRESS_MS), PressKind::Medium);
        assert_eq!(t.classify(LONG_PRESS_MS - 1), PressKind::Medium);
        assert_eq!(t.classify(LONG_PRESS_MS), PressKind::Long);
        assert_eq!(t.classify(60_000), PressKind::Long);
    }

    #[test]
    fn bounce_is_ignored() {
        let t = PressThresholds::DEFAULT;
        assert_eq!(t.classify(0), PressKind::NoEvent);
        assert_eq!(t.classify(BUTTON_DEBOUNCE_MS - 1), PressKind::NoEvent);
        assert_eq!(t.classify(BUTTON_DEBOUNCE_MS), PressKind::Short);
    }

    #[test]
    fn tracker_measures_press_duration() {
        let mut tracker = PressTracker::new(PressThresholds::DEFAULT);
        tracker.on_press(1_000);
        assert!(tracker.is_pressed());
        assert_eq!(tracker.on_release(1_750), PressKind::Medium);
        assert!(!tracker.is_pressed());
    }

    #[test]
    fn release_without_press_is_no_event() {
        let mut tracker = PressTracker::new(PressThresholds::DEFAULT);
        assert_eq!(tracker.on_release(5_000), PressKind::NoEvent);

        tracker.on_press(0);
        tracker.on_release(100);
        assert_eq!(tracker.on_release(200), PressKind::NoEvent);
    }

    #[test]
    fn custom_thresholds() {
        let t = PressThresholds {
            debounce_ms: 10,
            short_ms: 100,
            long_ms: 300,
        };
        let mut tracker = PressTracker::new(t);
        tracker.on_press(0);
        tracker.on_press(50); // second edge restarts timing
        assert_eq!(tracker.on_release(349), PressKind::Medium);

        tracker.on_press(1_000);
        assert_eq!(tracker.on_release(1_300), PressKind::Long);
    }
}
