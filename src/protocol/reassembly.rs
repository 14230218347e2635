//! Receive-side reassembly of framed transfers.
//!
//! The node itself only sends framed data; this is the peer's half of
//! the protocol, used by host tools and to verify the sender.

use heapless::Vec;

use super::frame::Packet;
use crate::error::ReassemblyError;

/// Outcome of feeding one packet to the reassembler.
#[derive(Debug, PartialEq, Eq)]
pub enum Progress<'a> {
    /// START accepted; `total_len` bytes will follow.
    Started { total_len: usize },
    /// CHUNK accepted; `received` bytes buffered so far.
    Accepted { received: usize },
    /// END accepted; the complete payload.
    Complete(&'a [u8]),
    /// Not framing data; handed back untouched.
    Application(&'a [u8]),
}

/// Rebuilds one payload of up to `N` bytes at a time.
pub struct Reassembler<const N: usize> {
    buffer: Vec<u8, N>,
    expected_len: Option<usize>,
    next_seq: u8,
}

impl<const N: usize> Reassembler<N> {
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            expected_len: None,
            next_seq: 0,
        }
    }

    /// Feed one received packet.
    ///
    /// Any error discards the transfer in progress.
    pub fn push<'a>(&'a mut self, frame: &'a [u8]) -> Result<Progress<'a>, ReassemblyError> {
        let packet = match Packet::parse(frame) {
            Some(parsed) => parsed.inspect_err(|_| self.reset())?,
            None => return Ok(Progress::Application(frame)),
        };

        match packet {
            Packet::Start { total_len } => {
                if self.in_transfer() {
                    let err = ReassemblyError::UnexpectedStart {
                        received: self.buffer.len(),
                    };
                    self.reset();
                    return Err(err);
                }
                let total_len = total_len as usize;
                self.reset();
                if total_len > N {
                    return Err(ReassemblyError::TooLarge {
                        declared: total_len,
                    });
                }
                self.expected_len = Some(total_len);
                Ok(Progress::Started { total_len })
            }
            Packet::Chunk { seq, data } => {
                let Some(expected) = self.expected_len else {
                    return Err(ReassemblyError::NoSession);
                };
                if seq != self.next_seq {
                    let err = ReassemblyError::OutOfSequence {
                        expected: self.next_seq,
                        got: seq,
                    };
                    self.reset();
                    return Err(err);
                }
                let remaining = expected - self.buffer.len();
                if remaining == 0 {
                    self.reset();
                    return Err(ReassemblyError::Overflow);
                }
                let take = remaining.min(data.len());
                // Capacity was checked against the declared length at START.
                let _ = self.buffer.extend_from_slice(&data[..take]);
                self.next_seq = self.next_seq.wrapping_add(1);
                Ok(Progress::Accepted {
                    received: self.buffer.len(),
                })
            }
            Packet::End => {
                let Some(expected) = self.expected_len else {
                    return Err(ReassemblyError::NoSession);
                };
                if self.buffer.len() < expected {
                    let err = ReassemblyError::Truncated {
                        expected,
                        received: self.buffer.len(),
                    };
                    self.reset();
                    return Err(err);
                }
                self.expected_len = None;
                self.next_seq = 0;
                Ok(Progress::Complete(&self.buffer))
            }
            Packet::Application(bytes) => Ok(Progress::Application(bytes)),
        }
    }

    /// `true` between START and END.
    pub fn in_transfer(&self) -> bool {
        self.expected_len.is_some()
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.expected_len = None;
        self.next_seq = 0;
    }
}

impl<const N: usize> Default for Reassembler<N> {
    fn default() -> Self {
        Self::new()
    }
}
