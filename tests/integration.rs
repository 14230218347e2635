//! Integration tests for ble-sensor-node host-testable logic.

use ble_sensor_node::button_logic::{PressKind, PressThresholds, PressTracker};
use ble_sensor_node::command::{self, CommandAction};
use ble_sensor_node::config::{BLE_QUEUE_SIZE, FRAME_SIZE, MAX_TRANSFER_SIZE};
use ble_sensor_node::protocol::{
    Delivery, Diagnostics, Packet, Progress, Reassembler, TransferSession,
};
use ble_sensor_node::{EventQueue, QueueFull, ReassemblyError};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;

#[test]
fn bulk_test_data_goes_out_as_58_packets() {
    let payload = command::test_pattern();
    let mut session = TransferSession::new();
    assert_eq!(session.begin(&payload), Ok(Delivery::Framed));

    let mut frames = Vec::new();
    while let Some(frame) = session.next_frame() {
        frames.push(frame);
    }

    assert_eq!(frames.len(), 58);
    assert_eq!(&frames[0][..5], &[0x10, 0x00, 0x00, 0x03, 0xE8]);
    assert!(frames[1..57].iter().all(|f| f[0] == 0x11));
    assert_eq!(frames[57][0], 0x12);

    // Last chunk carries bytes 990..1000 followed by zero padding.
    let last = &frames[56];
    assert_eq!(last[1], 55);
    assert_eq!(&last[2..12], &payload[990..1000]);
    assert!(last[12..].iter().all(|&b| b == 0));
}

#[test]
fn unknown_command_gets_padded_error_frame() {
    match command::process(&[0x09, 0xAA], &Diagnostics::default()) {
        CommandAction::Reply(frame) => {
            assert_eq!(frame.len(), FRAME_SIZE);
            assert_eq!(&frame[..2], &[0xFF, 0x01]);
            assert!(frame[2..].iter().all(|&b| b == 0));
        }
        other => panic!("unexpected action {:?}", other),
    }
}

#[test]
fn ble_queue_drops_newest_when_full() {
    let queue: EventQueue<NoopRawMutex, u8, BLE_QUEUE_SIZE> = EventQueue::new();
    for i in 0..BLE_QUEUE_SIZE as u8 {
        assert_eq!(queue.post(i), Ok(()));
    }
    assert_eq!(queue.post(0xEE), Err(QueueFull));
    assert_eq!(queue.dropped(), 1);

    let drained: Vec<u8> = core::iter::from_fn(|| queue.try_next()).collect();
    assert_eq!(drained, (0..BLE_QUEUE_SIZE as u8).collect::<Vec<_>>());
}

#[test]
fn receiver_rebuilds_every_transfer_size() {
    let mut rx: Reassembler<MAX_TRANSFER_SIZE> = Reassembler::new();

    for len in [513usize, 530, 1024, 1800, MAX_TRANSFER_SIZE] {
        let payload: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
        let mut session = TransferSession::new();
        assert_eq!(session.begin(&payload), Ok(Delivery::Framed));

        let mut rebuilt = None;
        while let Some(frame) = session.next_frame() {
            if let Progress::Complete(data) = rx.push(&frame).unwrap() {
                rebuilt = Some(data.to_vec());
            }
        }
        assert_eq!(rebuilt.as_deref(), Some(&payload[..]), "len {}", len);
    }
}

#[test]
fn receiver_flags_a_lost_chunk() {
    let payload = command::test_pattern();
    let mut session = TransferSession::new();
    session.begin(&payload).unwrap();

    let mut rx: Reassembler<MAX_TRANSFER_SIZE> = Reassembler::new();
    rx.push(&session.next_frame().unwrap()).unwrap(); // START
    rx.push(&session.next_frame().unwrap()).unwrap(); // chunk 0
    session.next_frame(); // chunk 1 lost

    let err = rx.push(&session.next_frame().unwrap()).unwrap_err();
    assert_eq!(err, ReassemblyError::OutOfSequence { expected: 1, got: 2 });
    assert!(!rx.in_transfer());
}

#[test]
fn commands_pass_through_receiver_untouched() {
    let mut rx: Reassembler<MAX_TRANSFER_SIZE> = Reassembler::new();
    let frame = command::sample_response(0x0ABC);
    assert_eq!(rx.push(&frame), Ok(Progress::Application(&frame[..])));
    assert!(matches!(
        Packet::parse(&[0x02]),
        Some(Ok(Packet::Application(&[0x02])))
    ));
}

#[test]
fn press_durations_at_the_boundaries() {
    let mut tracker = PressTracker::new(PressThresholds::DEFAULT);
    let cases = [
        (10, PressKind::NoEvent),
        (499, PressKind::Short),
        (500, PressKind::Medium),
        (1999, PressKind::Medium),
        (2000, PressKind::Long),
    ];
    for (held_ms, expected) in cases {
        tracker.on_press(100_000);
        assert_eq!(tracker.on_release(100_000 + held_ms), expected, "{} ms", held_ms);
    }
}
