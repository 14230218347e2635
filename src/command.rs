//! Application command processor.
//!
//! Inbound writes whose first byte is not a framing marker are commands.
//! Each command maps to a [`CommandAction`] that the BLE task carries
//! out; nothing here touches hardware.
//!
//! | Opcode | Command                | Response                               |
//! |--------|------------------------|----------------------------------------|
//! | 0x01   | SET_OUTPUT (arg byte)  | none                                   |
//! | 0x02   | GET_STATUS             | `02 00`                                |
//! | 0x03   | REQUEST_BULK_TEST_DATA | 1000-byte framed transfer              |
//! | 0x04   | GET_DIAGNOSTICS        | `04 active chunk len_hi len_lo`        |
//! | 0x05   | GET_SAMPLE             | `05 hi lo` once the sample is taken    |
//! | other  | -                      | `FF 01`                                |

use crate::config::BULK_TEST_LEN;
use crate::protocol::frame::{response, Frame};
use crate::protocol::Diagnostics;

/// Error response marker.
pub const ERROR_RESPONSE: u8 = 0xFF;
/// Error code: opcode not recognised.
pub const ERR_UNKNOWN_COMMAND: u8 = 0x01;
/// Error code: a bulk transfer is already running.
pub const ERR_TRANSFER_BUSY: u8 = 0x02;

/// Status byte reported by GET_STATUS when the node is healthy.
pub const STATUS_OK: u8 = 0x00;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Opcode {
    SetOutput = 0x01,
    GetStatus = 0x02,
    RequestBulkTestData = 0x03,
    GetDiagnostics = 0x04,
    GetSample = 0x05,
}

impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x01 => Ok(Opcode::SetOutput),
            0x02 => Ok(Opcode::GetStatus),
            0x03 => Ok(Opcode::RequestBulkTestData),
            0x04 => Ok(Opcode::GetDiagnostics),
            0x05 => Ok(Opcode::GetSample),
            other => Err(other),
        }
    }
}

/// What the BLE task has to do for one command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandAction {
    /// Drive the LED; no response.
    SetOutput(bool),
    /// Notify this frame right away.
    Reply(Frame),
    /// Start a framed transfer of [`test_pattern`].
    StartBulkTransfer,
    /// Take a fresh sample and answer with [`sample_response`].
    ReadSample,
    /// Empty write; nothing to do.
    Ignore,
}

/// Interpret one inbound application message.
pub fn process(data: &[u8], diagnostics: &Diagnostics) -> CommandAction {
    let Some(&code) = data.first() else {
        return CommandAction::Ignore;
    };

    match Opcode::try_from(code) {
        Ok(Opcode::SetOutput) => {
            let on = data.get(1).is_some_and(|&arg| arg != 0);
            CommandAction::SetOutput(on)
        }
        Ok(Opcode::GetStatus) => {
            CommandAction::Reply(response(&[Opcode::GetStatus as u8, STATUS_OK]))
        }
        Ok(Opcode::RequestBulkTestData) => CommandAction::StartBulkTransfer,
        Ok(Opcode::GetDiagnostics) => CommandAction::Reply(diagnostics_response(diagnostics)),
        Ok(Opcode::GetSample) => CommandAction::ReadSample,
        Err(_) => CommandAction::Reply(error_response(ERR_UNKNOWN_COMMAND)),
    }
}

/// `[0x04, in_progress, chunk_index, len_hi, len_lo]`, zero-padded.
pub fn diagnostics_response(diag: &Diagnostics) -> Frame {
    let len = diag.total_len as u16;
    response(&[
        Opcode::GetDiagnostics as u8,
        diag.in_progress as u8,
        diag.chunk_index as u8,
        (len >> 8) as u8,
        len as u8,
    ])
}

/// `[0x05, hi, lo]`, zero-padded.
pub fn sample_response(sample: u16) -> Frame {
    let [hi, lo] = sample.to_be_bytes();
    response(&[Opcode::GetSample as u8, hi, lo])
}

/// `[0xFF, code]`, zero-padded.
pub fn error_response(code: u8) -> Frame {
    response(&[ERROR_RESPONSE, code])
}

/// Bulk test payload: byte `i` is `i & 0xFF`.
pub fn test_pattern() -> [u8; BULK_TEST_LEN] {
    core::array::from_fn(|i| i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FRAME_SIZE;

    #[test]
    fn unknown_opcode_gets_error_frame() {
        let action = process(&[0x09], &Diagnostics::default());
        let mut expected = [0u8; FRAME_SIZE];
        expected[0] = 0xFF;
        expected[1] = 0x01;
        assert_eq!(action, CommandAction::Reply(expected));
    }

    #[test]
    fn status_reply() {
        match process(&[0x02], &Diagnostics::default()) {
            CommandAction::Reply(frame) => {
                assert_eq!(&frame[..2], &[0x02, 0x00]);
                assert!(frame[2..].iter().all(|&b| b == 0));
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn set_output_reads_argument() {
        let diag = Diagnostics::default();
        assert_eq!(process(&[0x01, 0x01], &diag), CommandAction::SetOutput(true));
        assert_eq!(process(&[0x01, 0x7F], &diag), CommandAction::SetOutput(true));
        assert_eq!(process(&[0x01, 0x00], &diag), CommandAction::SetOutput(false));
        assert_eq!(process(&[0x01], &diag), CommandAction::SetOutput(false));
    }

    #[test]
    fn diagnostics_reply_encodes_session_state() {
        let diag = Diagnostics {
            in_progress: true,
            chunk_index: 12,
            total_len: 1000,
        };
        match process(&[0x04], &diag) {
            CommandAction::Reply(frame) => {
                assert_eq!(&frame[..5], &[0x04, 0x01, 12, 0x03, 0xE8]);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn deferred_commands() {
        let diag = Diagnostics::default();
        assert_eq!(process(&[0x03], &diag), CommandAction::StartBulkTransfer);
        assert_eq!(process(&[0x05, 0xAA], &diag), CommandAction::ReadSample);
        assert_eq!(process(&[], &diag), CommandAction::Ignore);
    }

    #[test]
    fn sample_reply_is_big_endian() {
        let frame = sample_response(0x0ABC);
        assert_eq!(&frame[..3], &[0x05, 0x0A, 0xBC]);
    }

    #[test]
    fn test_pattern_wraps_every_256_bytes() {
        let data = test_pattern();
        assert_eq!(data.len(), 1000);
        assert_eq!(data[0], 0);
        assert_eq!(data[255], 255);
        assert_eq!(data[256], 0);
        assert_eq!(data[999], (999 & 0xFF) as u8);
    }

    #[test]
    fn opcode_round_trip() {
        for code in 0x01..=0x05u8 {
            let op = Opcode::try_from(code).unwrap();
            assert_eq!(op as u8, code);
        }
        assert_eq!(Opcode::try_from(0x10), Err(0x10));
    }
}
