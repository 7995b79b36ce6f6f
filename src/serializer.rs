//! GATT operation serializer.
//!
//! The camera's GATT server accepts one outstanding request at a time.
//! [`OperationQueue`] turns writes, reads and subscriptions issued from
//! anywhere in the session into a strictly sequential stream:
//!
//! ```text
//!  enqueue ──▶ ┌──────────────┐  dispatch_next  ┌───────────┐
//!              │ VecDeque FIFO │───────────────▶│ in_flight │──▶ transport
//!              └──────────────┘                 └───────────┘
//!                                   finish ◀── completion event
//! ```
//!
//! Read completions are resolved through a caller-chosen handler value `H`
//! carried inside the operation, so the queue itself never interprets
//! payloads.  The queue holds no lock of its own; the owner wraps it in the
//! session's critical section.

use std::collections::VecDeque;

use log::{debug, warn};

use crate::app::ports::GattTransport;
use crate::error::TransportError;
use crate::protocol::location::FRAME_LEN_WITH_ZONE;
use crate::protocol::{HexBytes, Target};

/// Largest write payload (a location frame with zone offsets).
pub const MAX_WRITE_LEN: usize = FRAME_LEN_WITH_ZONE;

/// Bytes of a queued write.
pub type Payload = heapless::Vec<u8, MAX_WRITE_LEN>;

/// One transport request.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation<H> {
    Write { target: Target, payload: Payload },
    /// `handler` is returned to the owner with the completed read.
    Read { target: Target, handler: H },
    Subscribe { target: Target },
}

/// Discriminant used to match completions against the in-flight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Write,
    Read,
    Subscribe,
}

impl<H> Operation<H> {
    /// Build a write, or `None` if `bytes` exceeds [`MAX_WRITE_LEN`].
    pub fn write(target: Target, bytes: &[u8]) -> Option<Self> {
        let payload = Payload::from_slice(bytes).ok()?;
        Some(Self::Write { target, payload })
    }

    pub fn kind(&self) -> OpKind {
        match self {
            Self::Write { .. } => OpKind::Write,
            Self::Read { .. } => OpKind::Read,
            Self::Subscribe { .. } => OpKind::Subscribe,
        }
    }

    pub fn target(&self) -> Target {
        match self {
            Self::Write { target, .. } | Self::Read { target, .. } | Self::Subscribe { target } => {
                *target
            }
        }
    }

    fn issue(&self, transport: &mut impl GattTransport) -> Result<(), TransportError> {
        match self {
            Self::Write { target, payload } => {
                debug!("GATT write {} {}", target, HexBytes(payload));
                transport.issue_write(*target, payload)
            }
            Self::Read { target, .. } => {
                debug!("GATT read {}", target);
                transport.issue_read(*target)
            }
            Self::Subscribe { target } => {
                debug!("GATT subscribe {}", target);
                transport.issue_subscribe(*target)
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Queue
// ───────────────────────────────────────────────────────────────

/// FIFO of pending operations plus the single in-flight slot.
#[derive(Debug)]
pub struct OperationQueue<H> {
    pending: VecDeque<Operation<H>>,
    in_flight: Option<Operation<H>>,
}

impl<H> Default for OperationQueue<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> OperationQueue<H> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            in_flight: None,
        }
    }

    /// Append `op` and dispatch it immediately if nothing is in flight.
    ///
    /// An `Err` means a dispatch attempt failed synchronously.  The failed
    /// operation is dropped and the slot is left empty.
    pub fn enqueue(
        &mut self,
        op: Operation<H>,
        transport: &mut impl GattTransport,
    ) -> Result<(), TransportError> {
        self.pending.push_back(op);
        self.dispatch_next(transport)
    }

    /// Issue the head of the queue if the slot is free.
    pub fn dispatch_next(&mut self, transport: &mut impl GattTransport) -> Result<(), TransportError> {
        if self.in_flight.is_some() {
            return Ok(());
        }
        let Some(op) = self.pending.pop_front() else {
            return Ok(());
        };
        // the slot stays empty until the transport accepts the request
        op.issue(transport)?;
        self.in_flight = Some(op);
        Ok(())
    }

    /// Take the in-flight operation if it matches the completion.
    ///
    /// A completion for anything else (typically a late callback for an
    /// operation discarded by [`reset`](Self::reset)) is ignored and the
    /// slot is left untouched.  The caller dispatches the next operation
    /// once it has handled the result.
    pub fn finish(&mut self, kind: OpKind, target: Target) -> Option<Operation<H>> {
        match &self.in_flight {
            Some(op) if op.kind() == kind && op.target() == target => self.in_flight.take(),
            Some(op) => {
                warn!(
                    "Completion {:?} {} does not match in-flight {:?} {}, ignored",
                    kind,
                    target,
                    op.kind(),
                    op.target()
                );
                None
            }
            None => {
                warn!("Completion {:?} {} with nothing in flight, ignored", kind, target);
                None
            }
        }
    }

    /// Drop every queued and in-flight operation.  No handler is resolved.
    pub fn reset(&mut self) {
        let dropped = self.pending.len() + usize::from(self.in_flight.is_some());
        if dropped > 0 {
            debug!("Operation queue reset, {} discarded", dropped);
        }
        self.pending.clear();
        self.in_flight = None;
    }

    pub fn in_flight(&self) -> Option<&Operation<H>> {
        self.in_flight.as_ref()
    }

    /// Operations waiting behind the in-flight slot.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Nothing queued and nothing in flight.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none() && self.pending.is_empty()
    }
}
