//! Control-transfer adaptation: the field mapping between a USB setup
//! packet and a dictionary operation, and the reply framing sent back to
//! the host.
//!
//! The transfer itself (endpoints, retries, timeouts) belongs to the
//! transport layer; this module only fixes the bit-exact contract.

use std::sync::Mutex;

use crate::bus::CartridgeBus;
use crate::dispatcher::{DispatchError, Reply, Session};

/// The protocol-visible fields of one control transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRequest {
    /// bRequest: the opcode.
    pub request: u8,
    /// wValue: the operand.
    pub value: u16,
    /// wIndex: the miscdata.
    pub index: u16,
}

pub const STATUS_OK: u8 = 0;

/// Frame a dispatch result for the transfer's reply stage.
///
/// Data-less operations answer `[0]`. A ROM read answers `[0, 2, hi, lo]`
/// with the word big-endian, the byte order it sits in on the 68000 side of
/// the cartridge slot. Failures answer `[code]` with the error's stable
/// status code.
pub fn frame(result: &Result<Reply, DispatchError>) -> Vec<u8> {
    match result {
        Ok(Reply::Ack) => vec![STATUS_OK],
        Ok(Reply::Data(word)) => {
            let [hi, lo] = word.to_be_bytes();
            vec![STATUS_OK, 2, hi, lo]
        }
        Err(e) => vec![e.code()],
    }
}

/// A session and its bus behind one lock.
///
/// Control transfers normally arrive in order, but a transport retry can
/// re-deliver; serializing here keeps two in-flight operations from racing
/// on the address latch.
pub struct SharedSession<B> {
    inner: Mutex<(Session, B)>,
}

impl<B: CartridgeBus> SharedSession<B> {
    pub fn new(bus: B) -> Self {
        SharedSession {
            inner: Mutex::new((Session::new(), bus)),
        }
    }

    /// Dispatch one transfer and frame the reply. Calls are processed in
    /// lock-acquisition order.
    pub fn handle(&self, req: ControlRequest) -> Vec<u8> {
        // A poisoned lock still holds last-known-good state; failed calls
        // never half-update it.
        let mut guard = match self.inner.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let (session, bus) = &mut *guard;
        frame(&session.dispatch_raw(bus, req.request, req.value, req.index))
    }

    /// Tear the session down, handing the bus back. The latch dies with
    /// the session.
    pub fn into_bus(self) -> B {
        let (_, bus) = match self.inner.into_inner() {
            Ok(pair) => pair,
            Err(poisoned) => poisoned.into_inner(),
        };
        bus
    }
}
