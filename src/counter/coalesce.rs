//! Single-slot request coalescing (trailing-edge debounce).
//!
//! At most one precise computation is pending per counter. The slot holds
//! the latest request and the waiters accumulated during the window; every
//! call inside the window replaces the request and pushes the deadline out.
//! When the window finally elapses the leader computes once and fans the
//! result out to every waiter, so all callers of a burst observe the result
//! of the burst's final arguments.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;

use super::PreciseRequest;
use crate::types::TokenEstimate;

pub(crate) struct Coalescer {
    window: Duration,
    slot: Mutex<Option<Slot>>,
}

struct Slot {
    request: PreciseRequest,
    deadline: Instant,
    waiters: Vec<oneshot::Sender<TokenEstimate>>,
}

/// Outcome of joining the slot.
pub(crate) struct Joined {
    pub receiver: oneshot::Receiver<TokenEstimate>,
    /// Whether this call opened the slot and must drive the computation.
    pub leader: bool,
}

impl Coalescer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slot: Mutex::new(None),
        }
    }

    /// Join the pending slot, replacing its request and extending the
    /// deadline; opens a new slot if none is pending.
    pub fn join(&self, request: PreciseRequest) -> Joined {
        let (tx, rx) = oneshot::channel();
        let deadline = Instant::now() + self.window;

        let mut slot = self.slot.lock().unwrap();
        let leader = match slot.as_mut() {
            Some(pending) => {
                pending.request = request;
                pending.deadline = deadline;
                pending.waiters.push(tx);
                false
            }
            None => {
                *slot = Some(Slot {
                    request,
                    deadline,
                    waiters: vec![tx],
                });
                true
            }
        };

        Joined { receiver: rx, leader }
    }

    /// Deadline of the pending slot, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.slot.lock().unwrap().as_ref().map(|s| s.deadline)
    }

    /// Take the slot if its deadline has passed. `None` means the deadline
    /// was extended (or another driver got here first) and the caller
    /// should keep waiting.
    pub fn take_if_due(&self) -> Option<(PreciseRequest, Vec<oneshot::Sender<TokenEstimate>>)> {
        let mut slot = self.slot.lock().unwrap();
        match slot.as_ref() {
            Some(pending) if pending.deadline <= Instant::now() => {
                let taken = slot.take().unwrap();
                Some((taken.request, taken.waiters))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PromptFields;

    fn request(user_text: &str) -> PreciseRequest {
        PreciseRequest::new(PromptFields::user(user_text), &["gpt-4o"])
    }

    #[tokio::test]
    async fn first_join_is_leader_later_joins_are_not() {
        let coalescer = Coalescer::new(Duration::from_millis(50));
        assert!(coalescer.join(request("a")).leader);
        assert!(!coalescer.join(request("b")).leader);
        assert!(!coalescer.join(request("c")).leader);
    }

    #[tokio::test]
    async fn later_joins_replace_the_request_and_extend_the_deadline() {
        let coalescer = Coalescer::new(Duration::from_millis(50));
        coalescer.join(request("a"));
        let first_deadline = coalescer.deadline().unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        coalescer.join(request("b"));
        let second_deadline = coalescer.deadline().unwrap();

        assert!(second_deadline > first_deadline);
        // Not due yet, so nothing to take.
        assert!(coalescer.take_if_due().is_none());

        tokio::time::sleep(Duration::from_millis(60)).await;
        let (taken, waiters) = coalescer.take_if_due().expect("slot should be due");
        assert_eq!(taken.fields.user_text, "b");
        assert_eq!(waiters.len(), 2);
        assert!(coalescer.deadline().is_none());
    }
}
