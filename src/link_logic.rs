//! Outbound link decisions made by the BLE dispatcher.
//!
//! [`LinkController`] holds the connection handle and the one transfer
//! session.  The embedded dispatcher feeds it events and performs the
//! notifications it asks for; everything it decides is testable here.

use crate::command::{self, ERR_TRANSFER_BUSY};
use crate::error::{Error, TransferError};
use crate::protocol::{Delivery, Diagnostics, Frame, TransferSession};

/// Which buffer a DATA_SEND event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadKind {
    /// The latest completed sample batch.
    Samples,
    /// The bulk test pattern requested by a command.
    TestPattern,
}

/// What a DATA_SEND turns into.
#[derive(Debug, PartialEq, Eq)]
pub enum Outgoing<'a> {
    /// Nothing to send (no completed sample batch yet).
    Nothing,
    /// Notify these bytes as they are.
    Direct(&'a [u8]),
    /// A framed transfer was started; drain it with [`LinkController::next_frame`].
    Framed,
}

/// Connection plus transfer session, generic over the stack's handle type.
pub struct LinkController<C> {
    conn: Option<C>,
    session: TransferSession,
}

impl<C> LinkController<C> {
    pub const fn new() -> Self {
        Self {
            conn: None,
            session: TransferSession::new(),
        }
    }

    pub fn on_connected(&mut self, conn: C) {
        self.conn = Some(conn);
    }

    /// Forget the connection and cut any running transfer short.
    ///
    /// No END is produced for an aborted transfer.  Returns `true` if one
    /// was running.
    pub fn on_disconnected(&mut self) -> bool {
        self.conn = None;
        self.session.abort()
    }

    pub fn connection(&self) -> Option<&C> {
        self.conn.as_ref()
    }

    /// Decide how `payload` goes out.  `None` means there is nothing to send.
    pub fn send<'a>(&mut self, payload: Option<&'a [u8]>) -> Result<Outgoing<'a>, Error> {
        if self.conn.is_none() {
            return Err(Error::NotConnected);
        }
        let Some(payload) = payload else {
            return Ok(Outgoing::Nothing);
        };

        match self.session.begin(payload)? {
            Delivery::Direct => Ok(Outgoing::Direct(payload)),
            Delivery::Framed => Ok(Outgoing::Framed),
        }
    }

    /// Next packet of the running transfer, one per pacing tick.
    pub fn next_frame(&mut self) -> Option<Frame> {
        self.session.next_frame()
    }

    pub fn is_sending(&self) -> bool {
        self.session.is_active()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.session.diagnostics()
    }
}

impl<C> Default for LinkController<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reply owed to the central when a send request was refused.
///
/// Only a bulk test request the central asked for is answered; a skipped
/// sample batch is silent.
pub fn rejection_reply(kind: PayloadKind, err: &Error) -> Option<Frame> {
    match (kind, err) {
        (PayloadKind::TestPattern, Error::Transfer(TransferError::Busy)) => {
            Some(command::error_response(ERR_TRANSFER_BUSY))
        }
        _ => None,
    }
}
