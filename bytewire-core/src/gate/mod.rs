//! Session gates
//!
//! Concurrency primitives guarding access to a single shared device:
//!
//! - [`ExclusiveGate`] restricts a device to one concurrent session
//! - [`ReadinessGate`] suspends readers until a writer signals
//! - [`Cancellation`] is the external signal that makes any blocking
//!   wait interruptible
//!
//! All three keep their state in an `embassy_sync` blocking mutex and a
//! bounded waker list, so they are usable from any executor and from
//! plain polled tests. None of them may be used from interrupt context.

mod cancel;
mod exclusive;
mod readiness;

pub use cancel::Cancellation;
pub use exclusive::ExclusiveGate;
pub use readiness::ReadinessGate;

use core::task::Waker;
use heapless::Deque;

/// A blocking wait was cancelled externally before it could complete
///
/// The waiter holds nothing afterwards; no partial state change occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interrupted;

/// Upper bound on concurrently suspended sessions per gate
pub(crate) const MAX_WAITERS: usize = 4;

/// Remember a waiter, deduplicating re-polls of the same task
pub(crate) fn register_waker<const N: usize>(waiters: &mut Deque<Waker, N>, waker: &Waker) {
    if waiters.iter().any(|w| w.will_wake(waker)) {
        return;
    }
    if waiters.push_back(waker.clone()).is_err() {
        // List full: have the caller poll again instead of losing it
        waker.wake_by_ref();
    }
}
