//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

// BLE

/// Advertised device name.
pub const DEVICE_NAME: &str = "Feather52 Sensor";

/// 16-bit UUID of the data service (advertised in the service list).
pub const DATA_SERVICE_UUID16: u16 = 0x180F;

/// Advertising interval (in 0.625 ms units). 32 = 20 ms.
pub const BLE_ADV_INTERVAL: u32 = 32;

/// Preferred connection interval range (in 1.25 ms units).
/// 12 = 15 ms, 24 = 30 ms.
pub const BLE_CONN_INTERVAL_MIN: u16 = 12;
pub const BLE_CONN_INTERVAL_MAX: u16 = 24;

/// BLE slave latency (number of connection events the peripheral can skip).
pub const BLE_SLAVE_LATENCY: u16 = 0;

/// BLE supervision timeout (in 10 ms units). 400 = 4 s.
pub const BLE_SUP_TIMEOUT: u16 = 400;

/// Pause before re-advertising after an advertising error (ms).
pub const BLE_ADV_RETRY_MS: u64 = 1000;

// Chunked transfer protocol

/// Size of every link packet, equal to the fixed characteristic length.
pub const FRAME_SIZE: usize = 20;

/// Payload bytes carried by one CHUNK packet (type + sequence header).
pub const CHUNK_PAYLOAD_SIZE: usize = FRAME_SIZE - 2;

/// Largest payload a single transfer session can hold.
pub const MAX_TRANSFER_SIZE: usize = 2048;

/// Payloads up to this length go out as one unframed notification.
///
/// A notification carries at most `ATT_MTU - 3` bytes, so direct delivery
/// of the largest small payload needs a central that accepts the full
/// [`ATT_MTU`] in the MTU exchange.  With a smaller negotiated MTU the
/// SoftDevice refuses the notify and the payload is dropped.
pub const SMALL_PAYLOAD_THRESHOLD: usize = 512;

/// ATT MTU requested from the central: one notification header plus the
/// largest direct payload.
pub const ATT_MTU: u16 = SMALL_PAYLOAD_THRESHOLD as u16 + 3;

/// Delay inserted after every transmitted packet of a chunked transfer (ms).
pub const PACKET_PACING_MS: u64 = 10;

/// Length of the bulk test pattern sent on request.
pub const BULK_TEST_LEN: usize = 1000;

// Event queues

/// Capacity of the button classification queue.
pub const BUTTON_QUEUE_SIZE: usize = 10;

/// Capacity of the BLE event queue.
pub const BLE_QUEUE_SIZE: usize = 10;

// Sampling

/// Sampling period (ms).
pub const SAMPLE_PERIOD_MS: u64 = 10;

/// Samples collected before a batch is handed to the BLE task.
pub const SAMPLE_BATCH_LEN: usize = 512;

/// Bytes per batch (each sample is a big-endian u16).
pub const SAMPLE_BATCH_BYTES: usize = SAMPLE_BATCH_LEN * 2;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Button 1       → P0.11
//   LED 1          → P0.13 (active-low)
//   Analog input   → P0.03 (AIN1)

/// LEDs on the DK sink current, so a low level turns them on.
pub const LED_ACTIVE_LOW: bool = true;

/// Presses shorter than this are treated as contact bounce (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 30;

/// Upper bound (exclusive) of a short press (ms).
pub const SHORT_PRESS_MS: u64 = 500;

/// Lower bound (inclusive) of a long press (ms).
pub const LONG_PRESS_MS: u64 = 2000;

// LED feedback patterns: (on ms, off ms, repetitions)

pub const SHORT_BLINK: (u64, u64, u8) = (100, 100, 1);
pub const MEDIUM_BLINK: (u64, u64, u8) = (250, 250, 2);
pub const LONG_BLINK: (u64, u64, u8) = (500, 250, 3);
