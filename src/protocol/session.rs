//! Sender-side transfer session.
//!
//! The session is a step machine: the BLE task calls [`TransferSession::next_frame`]
//! once per pacing tick and notifies whatever comes out, until it returns
//! `None`.  Only one session can be active; it is owned by the BLE
//! dispatcher and never shared.

use heapless::Vec;

use super::frame::{Frame, Packet};
use super::{chunk_count, CHUNK_PAYLOAD_SIZE, MAX_TRANSFER_SIZE, SMALL_PAYLOAD_THRESHOLD};
use crate::error::TransferError;

/// How an accepted payload must be delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Delivery {
    /// Small enough for one unframed notification; the session stays idle.
    Direct,
    /// Copied into the session; drain it with `next_frame`.
    Framed,
}

/// Snapshot of the session state reported by GET_DIAGNOSTICS.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    pub in_progress: bool,
    /// Number of CHUNK packets sent so far.
    pub chunk_index: usize,
    pub total_len: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Start,
    Chunks,
    End,
}

pub struct TransferSession {
    buffer: Vec<u8, MAX_TRANSFER_SIZE>,
    chunk_index: usize,
    phase: Phase,
}

impl TransferSession {
    pub const fn new() -> Self {
        Self {
            buffer: Vec::new(),
            chunk_index: 0,
            phase: Phase::Idle,
        }
    }

    /// Accept a payload for delivery.
    ///
    /// Rejections leave any running session untouched.
    pub fn begin(&mut self, payload: &[u8]) -> Result<Delivery, TransferError> {
        if self.is_active() {
            return Err(TransferError::Busy);
        }
        if payload.is_empty() {
            return Err(TransferError::Empty);
        }
        if payload.len() <= SMALL_PAYLOAD_THRESHOLD {
            return Ok(Delivery::Direct);
        }

        self.buffer.clear();
        self.buffer
            .extend_from_slice(payload)
            .map_err(|_| TransferError::TooLarge { len: payload.len() })?;
        self.chunk_index = 0;
        self.phase = Phase::Start;
        Ok(Delivery::Framed)
    }

    /// Produce the next packet of the running transfer.
    ///
    /// After END has been returned the session is idle again.
    pub fn next_frame(&mut self) -> Option<Frame> {
        match self.phase {
            Phase::Idle => None,
            Phase::Start => {
                self.phase = Phase::Chunks;
                Some(
                    Packet::Start {
                        total_len: self.buffer.len() as u32,
                    }
                    .encode(),
                )
            }
            Phase::Chunks => {
                let offset = self.chunk_index * CHUNK_PAYLOAD_SIZE;
                let end = (offset + CHUNK_PAYLOAD_SIZE).min(self.buffer.len());
                let frame = Packet::Chunk {
                    seq: self.chunk_index as u8,
                    data: &self.buffer[offset..end],
                }
                .encode();
                self.chunk_index += 1;
                if self.chunk_index == chunk_count(self.buffer.len()) {
                    self.phase = Phase::End;
                }
                Some(frame)
            }
            Phase::End => {
                self.reset();
                Some(Packet::End.encode())
            }
        }
    }

    /// Drop a running transfer without sending END.
    ///
    /// Returns `true` if something was cancelled.
    pub fn abort(&mut self) -> bool {
        let was_active = self.is_active();
        self.reset();
        was_active
    }

    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            in_progress: self.is_active(),
            chunk_index: self.chunk_index,
            total_len: if self.is_active() { self.buffer.len() } else { 0 },
        }
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.buffer.clear();
        self.chunk_index = 0;
    }
}

impl Default for TransferSession {
    fn default() -> Self {
        Self::new()
    }
}
