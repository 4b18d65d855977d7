//! Cancellation token
//!
//! Models the external terminating signal that aborts a blocking wait.
//! Once cancelled, the token stays cancelled.

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

use super::{register_waker, MAX_WAITERS};

struct CancelState {
    cancelled: bool,
    waiters: Deque<core::task::Waker, MAX_WAITERS>,
}

/// Sticky cancellation signal for blocking waits
pub struct Cancellation<M: RawMutex> {
    inner: Mutex<M, RefCell<CancelState>>,
}

impl<M: RawMutex> Cancellation<M> {
    /// Create a token in the not-cancelled state
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(CancelState {
                cancelled: false,
                waiters: Deque::new(),
            })),
        }
    }

    /// Fire the signal, waking every pending wait
    pub fn cancel(&self) {
        self.inner.lock(|state| {
            let mut state = state.borrow_mut();
            state.cancelled = true;
            while let Some(waker) = state.waiters.pop_front() {
                waker.wake();
            }
        });
    }

    /// Check whether the signal has fired
    pub fn is_cancelled(&self) -> bool {
        self.inner.lock(|state| state.borrow().cancelled)
    }

    /// Resolve once the signal fires; immediately if it already has
    pub async fn cancelled(&self) {
        poll_fn(|cx| {
            self.inner.lock(|state| {
                let mut state = state.borrow_mut();
                if state.cancelled {
                    Poll::Ready(())
                } else {
                    register_waker(&mut state.waiters, cx.waker());
                    Poll::Pending
                }
            })
        })
        .await
    }
}

impl<M: RawMutex> Default for Cancellation<M> {
    fn default() -> Self {
        Self::new()
    }
}
