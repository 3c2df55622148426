// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::cell::{OnceCell, RefCell};

use futures::channel::oneshot;

/// Value that becomes available exactly once and stays available.
///
/// Unlike a broadcast, waiters that register after the signal fired still
/// observe it: [`ReadySignal::wait`] resolves immediately in that case.
pub struct ReadySignal<T> {
    value:   OnceCell<T>,
    waiters: RefCell<Vec<oneshot::Sender<T>>>,
}

impl<T: Clone + 'static> ReadySignal<T> {
    pub fn new() -> Self {
        Self {
            value:   OnceCell::new(),
            waiters: RefCell::new(Vec::new()),
        }
    }

    pub fn get(&self) -> Option<&T> { self.value.get() }

    pub fn is_fulfilled(&self) -> bool { self.value.get().is_some() }

    /// Resolves the signal and wakes all waiters. Returns `false`, leaving the
    /// first value in place, if it was already resolved.
    pub fn fulfill(&self, value: T) -> bool {
        if self.value.set(value.clone()).is_err() {
            return false;
        }
        for waiter in self.waiters.take() {
            let _ = waiter.send(value.clone());
        }
        true
    }

    /// Resolves with the value once fulfilled, or `None` if the signal is
    /// dropped first.
    pub fn wait(&self) -> impl Future<Output = Option<T>> + 'static {
        let immediate = self.value.get().cloned();
        let pending = if immediate.is_none() {
            let (tx, rx) = oneshot::channel();
            self.waiters.borrow_mut().push(tx);
            Some(rx)
        } else {
            None
        };
        async move {
            match immediate {
                Some(value) => Some(value),
                None => pending?.await.ok(),
            }
        }
    }
}

impl<T: Clone + 'static> Default for ReadySignal<T> {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use futures::{FutureExt, executor::block_on};

    use super::*;

    #[test]
    fn resolves_only_once() {
        let signal = ReadySignal::new();
        assert!(!signal.is_fulfilled());
        assert!(signal.fulfill(1));
        assert!(!signal.fulfill(2));
        assert_eq!(signal.get(), Some(&1));
    }

    #[test]
    fn early_and_late_waiters_both_observe_the_value() {
        let signal = ReadySignal::new();
        let early = signal.wait();
        let mut early = Box::pin(early);
        assert!(early.as_mut().now_or_never().is_none());

        signal.fulfill("loaded");

        assert_eq!(block_on(early), Some("loaded"));
        assert_eq!(signal.wait().now_or_never(), Some(Some("loaded")));
    }

    #[test]
    fn dropped_signal_releases_waiters() {
        let signal = ReadySignal::<u8>::new();
        let waiter = signal.wait();
        drop(signal);
        assert_eq!(block_on(waiter), None);
    }
}
