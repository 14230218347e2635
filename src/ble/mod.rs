//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **Server** - advertises the data service, runs the GATT server for
//!    each connection and turns connect/disconnect/write callbacks into
//!    [`BleEvent`]s.
//! 2. **Dispatcher** - the single consumer of the BLE event queue.  It
//!    drives a [`LinkController`](ble_sensor_node::link_logic::LinkController)
//!    holding the connection and the transfer session, runs the command
//!    processor and paces chunked transfers.
//!
//! Communication with other tasks is done via the bounded queues and
//! signals defined in the crate root; each task receives references to
//! the ones it uses.

pub mod dispatch;
pub mod server;

use core::sync::atomic::{AtomicBool, Ordering};

use ble_sensor_node::config::{BLE_QUEUE_SIZE, FRAME_SIZE};
pub use ble_sensor_node::link_logic::PayloadKind;
use ble_sensor_node::EventQueue;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::Vec;
use nrf_softdevice::ble::Connection;

/// Everything the BLE dispatcher reacts to.
pub enum BleEvent {
    /// A central connected; the dispatcher keeps this handle.
    Connected(Connection),
    /// The link is gone.
    Disconnected { handle: Option<u16> },
    /// Send a payload (framed if large).
    DataSend(PayloadKind),
    /// A single-shot sample requested by GET_SAMPLE is ready.
    AdcDone(u16),
    /// Inbound application write.
    Command(Vec<u8, FRAME_SIZE>),
}

pub type BleEventQueue = EventQueue<CriticalSectionRawMutex, BleEvent, BLE_QUEUE_SIZE>;

/// Connection flag read by the sampler to decide whether a batch is worth
/// queueing.
pub struct LinkState {
    connected: AtomicBool,
}

impl LinkState {
    pub const fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}
