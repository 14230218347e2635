//! Host-testable library interface for the BLE sensor node.
//!
//! Everything here is pure logic - framing, the transfer session, the
//! command processor, link decisions, sample batching, press
//! classification and the bounded event queues - so it can be exercised
//! on the host with no embedded hardware.  The firmware in `main.rs` drives these types from
//! its Embassy tasks.
//!
//! Usage: `cargo test --lib`
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and is only built with `--features embedded`.

#![cfg_attr(not(test), no_std)]

pub mod button_logic;
pub mod command;
pub mod config;
pub mod error;
pub mod led_logic;
pub mod link_logic;
pub mod protocol;
pub mod queue;
pub mod samples;

pub use error::{Error, ReassemblyError, TransferError};
pub use queue::{EventQueue, QueueFull};

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::button_logic::{PressKind, PressThresholds, PressTracker};
    use super::command::{self, CommandAction};
    use super::config::*;
    use super::led_logic::{level_for, pattern_for};
    use super::protocol::{Delivery, Packet, Progress, Reassembler, TransferSession};
    use super::samples::SampleBuffer;

    // ════════════════════════════════════════════════════════════════════════
    // LED Feedback Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn no_event_has_no_pattern() {
        assert_eq!(pattern_for(PressKind::NoEvent), None);
    }

    #[test]
    fn patterns_grow_with_press_length() {
        let short = pattern_for(PressKind::Short).unwrap();
        let medium = pattern_for(PressKind::Medium).unwrap();
        let long = pattern_for(PressKind::Long).unwrap();
        assert_eq!(short.count, SHORT_BLINK.2);
        assert_eq!(medium.count, MEDIUM_BLINK.2);
        assert_eq!(long.count, LONG_BLINK.2);
        assert!(short.duration_ms() < medium.duration_ms());
        assert!(medium.duration_ms() < long.duration_ms());
    }

    #[test]
    fn led_polarity() {
        // Active-low: lit means pin low.
        assert!(!level_for(true, true));
        assert!(level_for(false, true));
        // Active-high
        assert!(level_for(true, false));
        assert!(!level_for(false, false));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Press → Feedback Flow
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn long_hold_gives_long_blink() {
        let mut tracker = PressTracker::new(PressThresholds::DEFAULT);
        tracker.on_press(10_000);
        let kind = tracker.on_release(10_000 + LONG_PRESS_MS);
        assert_eq!(kind, PressKind::Long);
        assert_eq!(pattern_for(kind).unwrap().count, LONG_BLINK.2);
    }

    #[test]
    fn bounce_gives_no_feedback() {
        let mut tracker = PressTracker::new(PressThresholds::DEFAULT);
        tracker.on_press(0);
        let kind = tracker.on_release(BUTTON_DEBOUNCE_MS / 2);
        assert!(pattern_for(kind).is_none());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Command → Transfer Flow
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn bulk_request_produces_framed_test_pattern() {
        let mut session = TransferSession::new();
        let action = command::process(&[0x03], &session.diagnostics());
        assert_eq!(action, CommandAction::StartBulkTransfer);

        let payload = command::test_pattern();
        assert_eq!(session.begin(&payload), Ok(Delivery::Framed));

        let mut rx: Reassembler<MAX_TRANSFER_SIZE> = Reassembler::new();
        let mut packets = 0;
        while let Some(frame) = session.next_frame() {
            packets += 1;
            if let Progress::Complete(data) = rx.push(&frame).unwrap() {
                assert_eq!(data, &payload[..]);
            }
        }
        assert_eq!(packets, 58);
    }

    #[test]
    fn diagnostics_mid_transfer() {
        let mut session = TransferSession::new();
        session.begin(&command::test_pattern()).unwrap();
        for _ in 0..4 {
            session.next_frame(); // START + 3 chunks
        }

        match command::process(&[0x04], &session.diagnostics()) {
            CommandAction::Reply(frame) => {
                assert_eq!(&frame[..5], &[0x04, 1, 3, 0x03, 0xE8]);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn responses_are_application_packets() {
        let frame = command::error_response(command::ERR_UNKNOWN_COMMAND);
        assert!(matches!(
            Packet::parse(&frame),
            Some(Ok(Packet::Application(_)))
        ));
        let frame = command::sample_response(0x1234);
        assert!(!Packet::parse(&frame).unwrap().unwrap().is_framing());
    }

    // ════════════════════════════════════════════════════════════════════════
    // Sample Batch → Transfer Flow
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn largest_direct_payload_fits_one_notification() {
        let mut session = TransferSession::new();
        let payload = [0xA5; SMALL_PAYLOAD_THRESHOLD];
        assert_eq!(session.begin(&payload), Ok(Delivery::Direct));
        assert!(payload.len() <= ATT_MTU as usize - 3);
    }

    #[test]
    fn sample_batch_is_sent_framed() {
        let mut samples = SampleBuffer::new();
        let mut ready = None;
        for i in 0..SAMPLE_BATCH_LEN {
            ready = samples.push(i as u16);
        }
        assert_eq!(ready, Some(1));

        let batch = samples.latest_batch().unwrap();
        assert!(batch.len() > SMALL_PAYLOAD_THRESHOLD);

        let mut session = TransferSession::new();
        assert_eq!(session.begin(batch), Ok(Delivery::Framed));
        let first = session.next_frame().unwrap();
        assert_eq!(&first[..5], &[0x10, 0x00, 0x00, 0x04, 0x00]);
    }
}
