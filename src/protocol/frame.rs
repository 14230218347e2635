//! Link packet encoding and decoding.

use super::{CHUNK_PACKET, CHUNK_PAYLOAD_SIZE, END_PACKET, FRAME_SIZE, START_PACKET};
use crate::error::ReassemblyError;

/// One link packet, exactly the characteristic length.
pub type Frame = [u8; FRAME_SIZE];

/// Decoded view of an inbound or outbound packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Packet<'a> {
    /// Announces a framed transfer of `total_len` bytes.
    Start { total_len: u32 },
    /// One payload slice (always 18 bytes; the last may be padding).
    Chunk { seq: u8, data: &'a [u8] },
    /// Terminates the framed transfer.
    End,
    /// Not part of the framing: command or response bytes.
    Application(&'a [u8]),
}

impl<'a> Packet<'a> {
    /// Classify raw packet bytes by their type byte.
    ///
    /// START, CHUNK and END must span exactly one frame; application
    /// bytes may be any length.  Returns `None` for an empty slice.
    pub fn parse(data: &'a [u8]) -> Option<Result<Self, ReassemblyError>> {
        let (&kind, rest) = data.split_first()?;
        let framing = matches!(kind, START_PACKET | CHUNK_PACKET | END_PACKET);
        if framing && data.len() != FRAME_SIZE {
            return Some(Err(ReassemblyError::FrameLength { len: data.len() }));
        }

        let packet = match kind {
            START_PACKET => Packet::Start {
                total_len: u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]),
            },
            CHUNK_PACKET => Packet::Chunk {
                seq: rest[0],
                data: &rest[1..1 + CHUNK_PAYLOAD_SIZE],
            },
            END_PACKET => Packet::End,
            _ => Packet::Application(data),
        };
        Some(Ok(packet))
    }

    /// Serialise into a zero-padded frame.
    ///
    /// Application bytes beyond the frame length are cut off.
    pub fn encode(&self) -> Frame {
        let mut frame = [0u8; FRAME_SIZE];
        match *self {
            Packet::Start { total_len } => {
                frame[0] = START_PACKET;
                frame[1..5].copy_from_slice(&total_len.to_be_bytes());
            }
            Packet::Chunk { seq, data } => {
                let n = data.len().min(CHUNK_PAYLOAD_SIZE);
                frame[0] = CHUNK_PACKET;
                frame[1] = seq;
                frame[2..2 + n].copy_from_slice(&data[..n]);
            }
            Packet::End => frame[0] = END_PACKET,
            Packet::Application(bytes) => {
                let n = bytes.len().min(FRAME_SIZE);
                frame[..n].copy_from_slice(&bytes[..n]);
            }
        }
        frame
    }

    pub fn is_framing(&self) -> bool {
        !matches!(self, Packet::Application(_))
    }
}

/// Build a zero-padded application response from its leading bytes.
pub fn response(bytes: &[u8]) -> Frame {
    Packet::Application(bytes).encode()
}
