//! Sample batching.
//!
//! Each sample is stored as a big-endian `u16` in the fill buffer.  When
//! the batch is complete it is copied into the ready slot so the sampler
//! can keep filling while the BLE task sends the previous batch.

use crate::config::{SAMPLE_BATCH_BYTES, SAMPLE_BATCH_LEN};

pub struct SampleBuffer {
    fill: [u8; SAMPLE_BATCH_BYTES],
    index: usize,
    ready: [u8; SAMPLE_BATCH_BYTES],
    batches: u32,
}

impl SampleBuffer {
    pub const fn new() -> Self {
        Self {
            fill: [0; SAMPLE_BATCH_BYTES],
            index: 0,
            ready: [0; SAMPLE_BATCH_BYTES],
            batches: 0,
        }
    }

    /// Store one sample.
    ///
    /// Returns the batch number when this sample completed a batch.
    pub fn push(&mut self, sample: u16) -> Option<u32> {
        let offset = self.index * 2;
        self.fill[offset..offset + 2].copy_from_slice(&sample.to_be_bytes());
        self.index += 1;

        if self.index < SAMPLE_BATCH_LEN {
            return None;
        }

        self.ready.copy_from_slice(&self.fill);
        self.index = 0;
        self.batches = self.batches.wrapping_add(1);
        Some(self.batches)
    }

    /// Most recently completed batch, if any.
    pub fn latest_batch(&self) -> Option<&[u8]> {
        (self.batches > 0).then_some(&self.ready[..])
    }

    /// Samples collected towards the current batch.
    pub fn pending(&self) -> usize {
        self.index
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a raw single-ended SAADC reading to an unsigned sample.
///
/// Single-ended inputs can read slightly below ground; those clamp to 0.
pub fn sample_from_raw(raw: i16) -> u16 {
    raw.max(0) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_completes_after_fixed_count() {
        let mut buf = SampleBuffer::new();
        for i in 0..(SAMPLE_BATCH_LEN - 1) {
            assert_eq!(buf.push(i as u16), None);
        }
        assert!(buf.latest_batch().is_none());
        assert_eq!(buf.push(0xFFFF), Some(1));
        assert_eq!(buf.pending(), 0);

        let batch = buf.latest_batch().unwrap();
        assert_eq!(batch.len(), SAMPLE_BATCH_BYTES);
        assert_eq!(&batch[..4], &[0x00, 0x00, 0x00, 0x01]);
        assert_eq!(&batch[SAMPLE_BATCH_BYTES - 2..], &[0xFF, 0xFF]);
    }

    #[test]
    fn ready_batch_survives_refill() {
        let mut buf = SampleBuffer::new();
        for _ in 0..SAMPLE_BATCH_LEN {
            buf.push(0x1234);
        }
        for _ in 0..10 {
            buf.push(0xABCD);
        }
        assert_eq!(buf.pending(), 10);
        let batch = buf.latest_batch().unwrap();
        assert!(batch.chunks(2).all(|s| s == [0x12, 0x34]));
    }

    #[test]
    fn batch_counter_increments() {
        let mut buf = SampleBuffer::new();
        let mut completed = 0;
        for _ in 0..(SAMPLE_BATCH_LEN * 3) {
            if let Some(n) = buf.push(1) {
                completed = n;
            }
        }
        assert_eq!(completed, 3);
    }

    #[test]
    fn negative_readings_clamp_to_zero() {
        assert_eq!(sample_from_raw(-5), 0);
        assert_eq!(sample_from_raw(0), 0);
        assert_eq!(sample_from_raw(4095), 4095);
    }
}
