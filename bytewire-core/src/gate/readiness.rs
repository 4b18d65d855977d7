//! Readiness gate
//!
//! A shared readiness flag with a wait list: readers suspend until a
//! writer signals, then atomically consume the flag on wake.

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::Poll;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

use super::{register_waker, Cancellation, Interrupted, MAX_WAITERS};

struct ReadyState {
    ready: bool,
    waiters: Deque<core::task::Waker, MAX_WAITERS>,
}

/// Blocking-wait gate toggled by writers
pub struct ReadinessGate<M: RawMutex> {
    inner: Mutex<M, RefCell<ReadyState>>,
}

impl<M: RawMutex> ReadinessGate<M> {
    /// Create a gate with the flag initially down
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(ReadyState {
                ready: false,
                waiters: Deque::new(),
            })),
        }
    }

    /// Suspend until the flag is up, then consume it
    ///
    /// The flag is reset before this returns, so a reader blocking right
    /// after must wait for a fresh signal. Fails with [`Interrupted`] if
    /// `cancel` fires first, leaving the flag untouched.
    pub async fn wait_until_ready(&self, cancel: &Cancellation<M>) -> Result<(), Interrupted> {
        match select(self.wait_and_consume(), cancel.cancelled()).await {
            Either::First(()) => Ok(()),
            Either::Second(()) => Err(Interrupted),
        }
    }

    async fn wait_and_consume(&self) {
        poll_fn(|cx| {
            self.inner.lock(|state| {
                let mut state = state.borrow_mut();
                if state.ready {
                    state.ready = false;
                    Poll::Ready(())
                } else {
                    register_waker(&mut state.waiters, cx.waker());
                    Poll::Pending
                }
            })
        })
        .await
    }

    /// Raise the flag and wake all current waiters
    ///
    /// Never blocks and always succeeds, even with no reader waiting and
    /// no data staged, so the signaller is not forced to retry.
    pub fn signal_ready(&self) {
        self.inner.lock(|state| {
            let mut state = state.borrow_mut();
            state.ready = true;
            while let Some(waker) = state.waiters.pop_front() {
                waker.wake();
            }
        });
    }

    /// Check the flag without consuming it
    pub fn is_ready(&self) -> bool {
        self.inner.lock(|state| state.borrow().ready)
    }
}

impl<M: RawMutex> Default for ReadinessGate<M> {
    fn default() -> Self {
        Self::new()
    }
}
