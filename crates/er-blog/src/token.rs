//! In-flight request tracking.
//!
//! A controller owns one [`RequestSlot`]. Starting a request cancels the
//! previous one, and only the request whose id is still in the slot may
//! apply its result.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use er_api_types::PostsQuery;

#[derive(Default)]
struct SignalState {
    cancelled: bool,
    hooks: Vec<Box<dyn FnOnce()>>,
}

/// Cooperative cancellation shared between the controller and a fetch.
#[derive(Clone, Default)]
pub struct CancelSignal {
    state: Rc<RefCell<SignalState>>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.borrow().cancelled
    }

    /// Run `hook` on cancellation, or right away if already cancelled.
    pub fn on_cancel(&self, hook: impl FnOnce() + 'static) {
        let mut state = self.state.borrow_mut();
        if state.cancelled {
            drop(state);
            hook();
        } else {
            state.hooks.push(Box::new(hook));
        }
    }

    pub fn cancel(&self) {
        let hooks = {
            let mut state = self.state.borrow_mut();
            if state.cancelled {
                return;
            }
            state.cancelled = true;
            std::mem::take(&mut state.hooks)
        };
        for hook in hooks {
            hook();
        }
    }
}

impl fmt::Debug for CancelSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelSignal")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Initial,
    Append,
}

/// One issued request.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: u64,
    pub mode: LoadMode,
    pub query: PostsQuery,
    pub signal: CancelSignal,
}

#[derive(Debug, Default)]
pub struct RequestSlot {
    next_id: u64,
    current: Option<(u64, CancelSignal)>,
}

impl RequestSlot {
    /// Cancel whatever is in flight and hand out a new ticket.
    pub fn start(&mut self, mode: LoadMode, query: PostsQuery) -> Ticket {
        self.cancel();
        self.next_id += 1;
        let signal = CancelSignal::new();
        self.current = Some((self.next_id, signal.clone()));
        Ticket {
            id: self.next_id,
            mode,
            query,
            signal,
        }
    }

    pub fn is_current(&self, id: u64) -> bool {
        self.current.as_ref().is_some_and(|(current, _)| *current == id)
    }

    /// Release the slot if `id` still holds it.
    pub fn finish(&mut self, id: u64) -> bool {
        if self.is_current(id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn in_flight(&self) -> bool {
        self.current.is_some()
    }

    pub fn cancel(&mut self) {
        if let Some((_, signal)) = self.current.take() {
            signal.cancel();
        }
    }
}
