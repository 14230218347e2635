//! Bounded event queues between producers and the consumer tasks.
//!
//! Producers (edge waiters, the sampler, GATT callbacks) must never
//! stall, so `post` is non-blocking and drops the newest event when the
//! queue is full.  Consumers block in `next` until something arrives.
//! Every drop is counted so it can be reported later.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;

/// Returned by [`EventQueue::post`] when the event was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QueueFull;

/// Fixed-capacity FIFO with drop-newest overflow policy.
pub struct EventQueue<M: RawMutex, T, const N: usize> {
    channel: Channel<M, T, N>,
    dropped: AtomicU32,
}

impl<M: RawMutex, T, const N: usize> EventQueue<M, T, N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Enqueue without waiting.  On a full queue the event is discarded.
    pub fn post(&self, event: T) -> Result<(), QueueFull> {
        self.channel.try_send(event).map_err(|_| {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            QueueFull
        })
    }

    /// Wait until an event is available and take it.
    pub async fn next(&self) -> T {
        self.channel.receive().await
    }

    pub fn try_next(&self) -> Option<T> {
        self.channel.try_receive().ok()
    }

    /// Number of events dropped since boot.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }
}

impl<M: RawMutex, T, const N: usize> Default for EventQueue<M, T, N> {
    fn default() -> Self {
        Self::new()
    }
}
