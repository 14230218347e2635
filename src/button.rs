//! User button input.
//!
//! The button is active-low with the internal pull-up enabled.  Each
//! press is timed from its falling edge to its rising edge and the
//! classified [`PressKind`] is posted to the button queue for the LED task.

use ble_sensor_node::button_logic::{PressKind, PressThresholds, PressTracker};
use ble_sensor_node::config::BUTTON_QUEUE_SIZE;
use ble_sensor_node::EventQueue;
use defmt::{debug, info, warn};
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Instant;

pub type ButtonQueue = EventQueue<CriticalSectionRawMutex, PressKind, BUTTON_QUEUE_SIZE>;

pub async fn run(pin: AnyPin, presses: &'static ButtonQueue) -> ! {
    let mut btn = Input::new(pin, Pull::Up);
    let mut tracker = PressTracker::new(PressThresholds::DEFAULT);

    loop {
        btn.wait_for_falling_edge().await;
        tracker.on_press(Instant::now().as_millis());

        btn.wait_for_rising_edge().await;
        let kind = tracker.on_release(Instant::now().as_millis());

        if kind == PressKind::NoEvent {
            debug!("Button bounce ignored");
            continue;
        }

        info!("Button: {}", kind);
        if presses.post(kind).is_err() {
            warn!("Button queue full - {} dropped", kind);
        }
    }
}
