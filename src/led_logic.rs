use crate::button_logic::PressKind;
use crate::config::{LONG_BLINK, MEDIUM_BLINK, SHORT_BLINK};

/// A fixed blink sequence: `count` times on for `on_ms`, off for `off_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlinkPattern {
    pub on_ms: u64,
    pub off_ms: u64,
    pub count: u8,
}

impl BlinkPattern {
    const fn from_config((on_ms, off_ms, count): (u64, u64, u8)) -> Self {
        Self { on_ms, off_ms, count }
    }

    /// Total time the pattern occupies the LED.
    pub fn duration_ms(&self) -> u64 {
        (self.on_ms + self.off_ms) * self.count as u64
    }
}

/// LED feedback for a classified press; `None` for no-event.
pub fn pattern_for(kind: PressKind) -> Option<BlinkPattern> {
    match kind {
        PressKind::NoEvent => None,
        PressKind::Short => Some(BlinkPattern::from_config(SHORT_BLINK)),
        PressKind::Medium => Some(BlinkPattern::from_config(MEDIUM_BLINK)),
        PressKind::Long => Some(BlinkPattern::from_config(LONG_BLINK)),
    }
}

/// Pin level that lights the LED.
pub fn level_for(on: bool, active_low: bool) -> bool {
    on != active_low
}
