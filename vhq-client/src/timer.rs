//! Cancellation of the recurring activities of a session.
//!
//! Timers are never shared: whoever starts a poll loop or a countdown keeps its [`CancelToken`]
//! in a [`TaskSlot`], and starting the next one through the same slot cancels the previous one.

use std::{cell::Cell, rc::Rc};

use async_trait::async_trait;

/// Source of the periodic wake-ups of a loop. The browser sleeps on a JS timer, the command line
/// on tokio, and tests return immediately.
#[async_trait(?Send)]
pub trait Ticker {
    async fn tick(&mut self);
}

/// Shared flag telling a running loop to stop at its next suspension point.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

impl PartialEq for CancelToken {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Holds the token of the single loop of a kind that may run at a time.
#[derive(Debug, Default)]
pub struct TaskSlot {
    current: Option<CancelToken>,
}

impl TaskSlot {
    /// Cancels the loop currently tracked by the slot, if any, and returns the token of the next
    /// one.
    pub fn start(&mut self) -> CancelToken {
        self.cancel();
        let token = CancelToken::new();
        self.current = Some(token.clone());
        token
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }

    /// Whether a started loop has not been cancelled yet
    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(|t| !t.is_cancelled())
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[googletest::test]
    fn starting_cancels_previous_token() {
        let mut slot = TaskSlot::default();
        let first = slot.start();
        let second = slot.start();

        expect_that!(first.is_cancelled(), eq(true));
        expect_that!(second.is_cancelled(), eq(false));
        expect_that!(slot.is_active(), eq(true));
    }

    #[googletest::test]
    fn dropping_the_slot_cancels() {
        let token = {
            let mut slot = TaskSlot::default();
            slot.start()
        };
        expect_that!(token.is_cancelled(), eq(true));
    }
}
