//! Chunked transfer protocol over a fixed 20-byte characteristic.
//!
//! Every notification is one 20-byte link packet.  Byte 0 tells the
//! receiver what it is:
//!
//! ```text
//! START  0x10 | len[31:24] len[23:16] len[15:8] len[7:0] | 0 x 15
//! CHUNK  0x11 | seq | 18 payload bytes (last slice zero-padded)
//! END    0x12 | 0 x 19
//! other       | application command / response bytes
//! ```
//!
//! Payloads up to [`SMALL_PAYLOAD_THRESHOLD`] bytes skip the framing and
//! go out as a single notification.

pub mod frame;
pub mod reassembly;
pub mod session;


pub use frame::{Frame, Packet};
pub use reassembly::{Progress, Reassembler};
pub use session::{Delivery, Diagnostics, TransferSession};

pub use crate::config::{
    CHUNK_PAYLOAD_SIZE, FRAME_SIZE, MAX_TRANSFER_SIZE, SMALL_PAYLOAD_THRESHOLD,
};

/// Packet type byte of a START packet.
pub const START_PACKET: u8 = 0x10;
/// Packet type byte of a CHUNK packet.
pub const CHUNK_PACKET: u8 = 0x11;
/// Packet type byte of an END packet.
pub const END_PACKET: u8 = 0x12;

/// Number of CHUNK packets needed for a payload of `len` bytes.
pub const fn chunk_count(len: usize) -> usize {
    len.div_ceil(CHUNK_PAYLOAD_SIZE)
}

// The sequence number is a single byte; the largest session must fit.
const _: () = assert!(chunk_count(MAX_TRANSFER_SIZE) <= 256);
