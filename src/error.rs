//! Unified error types for the sensor node.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for efficient
//! on-target logging.

/// Reasons a chunked transfer cannot be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferError {
    /// A session is already in progress; large transfers are not queued.
    Busy,
    /// Payload exceeds the session buffer capacity.
    TooLarge { len: usize },
    /// Nothing to send.
    Empty,
}

/// Receive-side framing violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReassemblyError {
    /// CHUNK or END arrived without a preceding START.
    NoSession,
    /// START declared more bytes than the receive buffer can hold.
    TooLarge { declared: usize },
    /// Chunk sequence number skipped or repeated.
    OutOfSequence { expected: u8, got: u8 },
    /// A chunk arrived after the declared length was already filled.
    Overflow,
    /// END arrived before the declared length was filled.
    Truncated { expected: usize, received: usize },
    /// START, CHUNK or END that is not exactly one frame long.
    FrameLength { len: usize },
    /// START arrived while a transfer was still being received.
    UnexpectedStart { received: usize },
}

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Transfer precondition violated.
    Transfer(TransferError),

    /// A bounded queue was full and the event was dropped.
    QueueFull,

    /// No central is connected.
    NotConnected,

    /// The SoftDevice rejected a notification.
    Notify,
}

// Convenience conversions

impl From<TransferError> for Error {
    fn from(e: TransferError) -> Self {
        Error::Transfer(e)
    }
}

impl From<crate::queue::QueueFull> for Error {
    fn from(_: crate::queue::QueueFull) -> Self {
        Error::QueueFull
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::EventQueue;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    fn post_all(queue: &EventQueue<NoopRawMutex, u8, 2>, events: &[u8]) -> Result<(), Error> {
        for &event in events {
            queue.post(event)?;
        }
        Ok(())
    }

    #[test]
    fn full_queue_surfaces_as_error() {
        let queue = EventQueue::new();
        assert_eq!(post_all(&queue, &[1, 2]), Ok(()));
        assert_eq!(post_all(&queue, &[3]), Err(Error::QueueFull));
        assert_eq!(queue.dropped(), 1);
    }

    #[test]
    fn transfer_errors_convert() {
        let err: Error = TransferError::TooLarge { len: 4096 }.into();
        assert_eq!(err, Error::Transfer(TransferError::TooLarge { len: 4096 }));
    }
}
