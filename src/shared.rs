//! Thread-safe front door to a [`CameraSession`].
//!
//! Every intent and transport event passes through one
//! `embassy_sync` blocking mutex, so queue mutation, dispatch and state
//! transitions form a single critical section.
//!
//! Platform stacks sometimes complete a request synchronously, calling back
//! into the session from inside `issue_*`.  Such re-entrant calls find the
//! session already borrowed; they are appended to a backlog which the outer
//! call drains, in arrival order, before it returns.
//!
//! ```text
//!  caller ──▶ lock ──▶ backlog.push ──▶ session free? ──yes──▶ drain backlog
//!                                           │ no (re-entrant)
//!                                           ▼
//!                                     return, outer frame drains
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::debug;

use crate::app::commands::ActionStep;
use crate::app::events::TransportEvent;
use crate::app::ports::{Clock, GattTransport, StateObserver};
use crate::app::service::CameraSession;
use crate::config::RemoteConfig;
use crate::fsm::CameraState;
use crate::protocol::LocationFix;

/// Work item waiting for the session.
#[derive(Debug)]
enum Input {
    Request,
    Disconnect,
    Event(TransportEvent),
    Action(ActionStep),
    Fix(LocationFix),
}

struct Inner<T, C, O> {
    session: RefCell<CameraSession<T, C, O>>,
    backlog: RefCell<VecDeque<Input>>,
    /// Last published state, readable even while the session is borrowed.
    snapshot: RefCell<CameraState>,
}

pub struct SharedSession<T, C, O> {
    inner: Mutex<CriticalSectionRawMutex, Inner<T, C, O>>,
}

impl<T, C, O> SharedSession<T, C, O>
where
    T: GattTransport,
    C: Clock,
    O: StateObserver,
{
    pub fn new(transport: T, clock: C, observer: O, config: RemoteConfig) -> Self {
        let session = CameraSession::new(transport, clock, observer, config);
        Self {
            inner: Mutex::new(Inner {
                snapshot: RefCell::new(session.state().clone()),
                session: RefCell::new(session),
                backlog: RefCell::new(VecDeque::new()),
            }),
        }
    }

    pub fn request_session(&self) {
        self.submit(Input::Request);
    }

    pub fn disconnect(&self) {
        self.submit(Input::Disconnect);
    }

    /// Feed one platform callback.  Safe to call from inside `issue_*`.
    pub fn handle_event(&self, event: TransportEvent) {
        self.submit(Input::Event(event));
    }

    pub fn execute_action(&self, step: ActionStep) {
        self.submit(Input::Action(step));
    }

    pub fn submit_location_fix(&self, fix: LocationFix) {
        self.submit(Input::Fix(fix));
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> CameraState {
        self.inner.lock(|inner| inner.snapshot.borrow().clone())
    }

    /// Run `f` against the session.  `None` when called re-entrantly.
    pub fn inspect<R>(&self, f: impl FnOnce(&CameraSession<T, C, O>) -> R) -> Option<R> {
        self.inner
            .lock(|inner| inner.session.try_borrow().ok().map(|s| f(&s)))
    }

    fn submit(&self, input: Input) {
        self.inner.lock(|inner| {
            inner.backlog.borrow_mut().push_back(input);
            let Ok(mut session) = inner.session.try_borrow_mut() else {
                debug!("Re-entrant session call deferred");
                return;
            };
            loop {
                let next = inner.backlog.borrow_mut().pop_front();
                let Some(input) = next else {
                    break;
                };
                apply(&mut session, input);
                if *inner.snapshot.borrow() != *session.state() {
                    *inner.snapshot.borrow_mut() = session.state().clone();
                }
            }
        });
    }
}

fn apply<T, C, O>(session: &mut CameraSession<T, C, O>, input: Input)
where
    T: GattTransport,
    C: Clock,
    O: StateObserver,
{
    match input {
        Input::Request => session.request_session(),
        Input::Disconnect => session.disconnect(),
        Input::Event(e) => session.handle_event(e),
        Input::Action(a) => session.execute_action(a),
        Input::Fix(f) => session.submit_location_fix(f),
    }
}
