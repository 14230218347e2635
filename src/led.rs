//! Status LED.
//!
//! Plays a blink pattern for each classified button press and follows
//! SET_OUTPUT commands from the central.  A pattern runs to completion
//! before the next queued press or output request is looked at.

use ble_sensor_node::button_logic::PressKind;
use ble_sensor_node::led_logic::{level_for, pattern_for, BlinkPattern};
use defmt::{debug, info};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use embedded_hal::digital::{OutputPin, PinState};

use crate::button::ButtonQueue;

pub struct Led<P> {
    pin: P,
    active_low: bool,
    on: bool,
}

impl<P: OutputPin> Led<P> {
    pub fn new(pin: P, active_low: bool) -> Self {
        let mut led = Self {
            pin,
            active_low,
            on: false,
        };
        led.set(false);
        led
    }

    pub fn set(&mut self, on: bool) {
        // GPIO writes on the nRF are infallible.
        let _ = self
            .pin
            .set_state(PinState::from(level_for(on, self.active_low)));
        self.on = on;
    }

    /// Play `pattern`, then restore the state the LED had before.
    pub async fn blink(&mut self, pattern: BlinkPattern) {
        let restore = self.on;
        for _ in 0..pattern.count {
            self.set(true);
            Timer::after(Duration::from_millis(pattern.on_ms)).await;
            self.set(false);
            Timer::after(Duration::from_millis(pattern.off_ms)).await;
        }
        self.set(restore);
    }
}

pub async fn run<P: OutputPin>(
    mut led: Led<P>,
    presses: &'static ButtonQueue,
    output: &'static Signal<CriticalSectionRawMutex, bool>,
) -> ! {
    info!("LED task started");

    loop {
        match select(presses.next(), output.wait()).await {
            Either::First(kind) => feedback(&mut led, kind).await,
            Either::Second(on) => {
                debug!("Output set {}", on);
                led.set(on);
            }
        }
    }
}

async fn feedback<P: OutputPin>(led: &mut Led<P>, kind: PressKind) {
    if let Some(pattern) = pattern_for(kind) {
        debug!("Blink {} x{}", kind, pattern.count);
        led.blink(pattern).await;
    }
}
