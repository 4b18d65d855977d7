//! Mutual-exclusion session gate
//!
//! At most one session may be inside the open/read/write/close critical
//! section at a time. A second open blocks until the holder releases,
//! unless the wait is cancelled first.

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::Poll;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

use super::{register_waker, Cancellation, Interrupted, MAX_WAITERS};

struct GateState {
    held: bool,
    waiters: Deque<core::task::Waker, MAX_WAITERS>,
}

/// Binary exclusion token for one-session-at-a-time devices
///
/// Re-acquisition is required for each new session; the gate is not
/// reentrant.
pub struct ExclusiveGate<M: RawMutex> {
    inner: Mutex<M, RefCell<GateState>>,
}

impl<M: RawMutex> ExclusiveGate<M> {
    /// Create a free gate
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(GateState {
                held: false,
                waiters: Deque::new(),
            })),
        }
    }

    /// Take the gate without blocking
    ///
    /// Returns `false` if it is currently held.
    pub fn try_acquire(&self) -> bool {
        self.inner.lock(|state| {
            let mut state = state.borrow_mut();
            if state.held {
                false
            } else {
                state.held = true;
                true
            }
        })
    }

    /// Block until the gate is free, then take it
    ///
    /// Fails with [`Interrupted`] if `cancel` fires first; a cancelled
    /// waiter never ends up holding the gate.
    pub async fn acquire(&self, cancel: &Cancellation<M>) -> Result<(), Interrupted> {
        match select(self.wait_free(), cancel.cancelled()).await {
            Either::First(()) => Ok(()),
            Either::Second(()) => Err(Interrupted),
        }
    }

    async fn wait_free(&self) {
        poll_fn(|cx| {
            self.inner.lock(|state| {
                let mut state = state.borrow_mut();
                if state.held {
                    register_waker(&mut state.waiters, cx.waker());
                    Poll::Pending
                } else {
                    state.held = true;
                    Poll::Ready(())
                }
            })
        })
        .await
    }

    /// Free the gate, unblocking a waiter if any are queued
    ///
    /// All queued waiters are woken and race for the gate; exactly one
    /// reacquires it. Waking everyone keeps a cancelled waiter from
    /// swallowing the wakeup.
    pub fn release(&self) {
        self.inner.lock(|state| {
            let mut state = state.borrow_mut();
            state.held = false;
            while let Some(waker) = state.waiters.pop_front() {
                waker.wake();
            }
        });
    }

    /// Check whether a session currently holds the gate
    pub fn is_held(&self) -> bool {
        self.inner.lock(|state| state.borrow().held)
    }
}

impl<M: RawMutex> Default for ExclusiveGate<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::testing::poll_now;
    use core::pin::pin;
    use core::task::Poll;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn second_acquire_blocks_until_release() {
        let gate: ExclusiveGate<NoopRawMutex> = ExclusiveGate::new();
        let cancel = Cancellation::new();

        let mut first = pin!(gate.acquire(&cancel));
        assert_eq!(poll_now(first.as_mut()), Poll::Ready(Ok(())));
        assert!(gate.is_held());

        let mut second = pin!(gate.acquire(&cancel));
        assert_eq!(poll_now(second.as_mut()), Poll::Pending);

        gate.release();
        assert_eq!(poll_now(second.as_mut()), Poll::Ready(Ok(())));
        assert!(gate.is_held());
    }

    #[test]
    fn release_admits_exactly_one_waiter() {
        let gate: ExclusiveGate<NoopRawMutex> = ExclusiveGate::new();
        let cancel = Cancellation::new();

        assert!(gate.try_acquire());

        let mut w1 = pin!(gate.acquire(&cancel));
        let mut w2 = pin!(gate.acquire(&cancel));
        assert_eq!(poll_now(w1.as_mut()), Poll::Pending);
        assert_eq!(poll_now(w2.as_mut()), Poll::Pending);

        gate.release();
        assert_eq!(poll_now(w1.as_mut()), Poll::Ready(Ok(())));
        // The gate is taken again, the second waiter keeps waiting
        assert_eq!(poll_now(w2.as_mut()), Poll::Pending);
    }

    #[test]
    fn cancelled_waiter_never_holds_the_gate() {
        let gate: ExclusiveGate<NoopRawMutex> = ExclusiveGate::new();
        let cancel = Cancellation::new();

        assert!(gate.try_acquire());

        let mut waiter = pin!(gate.acquire(&cancel));
        assert_eq!(poll_now(waiter.as_mut()), Poll::Pending);

        cancel.cancel();
        assert_eq!(poll_now(waiter.as_mut()), Poll::Ready(Err(Interrupted)));

        // The holder is unaffected and a release leaves the gate free
        assert!(gate.is_held());
        gate.release();
        assert!(!gate.is_held());
        assert!(gate.try_acquire());
    }

    #[test]
    fn try_acquire_does_not_block() {
        let gate: ExclusiveGate<NoopRawMutex> = ExclusiveGate::new();
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
        gate.release();
        assert!(gate.try_acquire());
    }
}
