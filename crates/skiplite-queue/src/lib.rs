//! # SkipLite Queue
//!
//! A bounded, thread-safe FIFO with blocking push and pop.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of SkipLite.** It
//! buffers formatted log lines between the threads that emit them and the
//! background writer thread; see `skiplite::logging`.
//!
//! ---
//!
//! - Producers block while the queue is full.
//! - Consumers block while it is empty, optionally with a timeout.
//! - [`BlockingQueue::close`] drains the buffer, marks the queue closed and
//!   wakes every blocked thread. Afterwards pushes are rejected and pops
//!   return `None` immediately.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::collections::VecDeque;
use std::fmt;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

/// Why a push did not enqueue its item. The item is handed back.
#[derive(PartialEq, Eq)]
pub enum PushError<T> {
    /// The queue is at capacity (only from `try_push_*`)
    Full(T),
    /// The queue has been closed
    Closed(T),
}

impl<T> PushError<T> {
    /// Recovers the rejected item
    pub fn into_inner(self) -> T {
        match self {
            PushError::Full(item) | PushError::Closed(item) => item,
        }
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Full(_) => write!(f, "Full(..)"),
            PushError::Closed(_) => write!(f, "Closed(..)"),
        }
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Full(_) => write!(f, "Queue is full"),
            PushError::Closed(_) => write!(f, "Queue is closed"),
        }
    }
}

impl<T> std::error::Error for PushError<T> {}

struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Bounded blocking queue
pub struct BlockingQueue<T> {
    state: Mutex<State<T>>,
    /// Signalled when an item arrives
    not_empty: Condvar,
    /// Signalled when a slot frees up
    not_full: Condvar,
    capacity: usize,
}

impl<T> BlockingQueue<T> {
    /// Creates a queue holding at most `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be at least 1");
        Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    /// Appends `item`, blocking while the queue is full
    pub fn push_back(&self, item: T) -> Result<(), PushError<T>> {
        self.push_blocking(item, VecDeque::push_back)
    }

    /// Prepends `item`, blocking while the queue is full
    pub fn push_front(&self, item: T) -> Result<(), PushError<T>> {
        self.push_blocking(item, VecDeque::push_front)
    }

    /// Appends `item` without blocking
    pub fn try_push_back(&self, item: T) -> Result<(), PushError<T>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PushError::Closed(item));
        }
        if state.items.len() >= self.capacity {
            return Err(PushError::Full(item));
        }
        state.items.push_back(item);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    fn push_blocking(
        &self,
        item: T,
        place: fn(&mut VecDeque<T>, T),
    ) -> Result<(), PushError<T>> {
        let capacity = self.capacity;
        let mut state = self.state.lock();
        self.not_full
            .wait_while(&mut state, |s| s.items.len() >= capacity && !s.closed);
        if state.closed {
            return Err(PushError::Closed(item));
        }
        place(&mut state.items, item);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the front item, blocking while the queue is empty.
    ///
    /// Returns `None` once the queue is closed.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        self.not_empty
            .wait_while(&mut state, |s| s.items.is_empty() && !s.closed);
        self.take_front(state)
    }

    /// Like [`pop`](Self::pop), but gives up after `timeout`
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let mut state = self.state.lock();
        self.not_empty
            .wait_while_for(&mut state, |s| s.items.is_empty() && !s.closed, timeout);
        self.take_front(state)
    }

    /// Removes the front item if one is available
    pub fn try_pop(&self) -> Option<T> {
        let state = self.state.lock();
        self.take_front(state)
    }

    fn take_front(&self, mut state: MutexGuard<'_, State<T>>) -> Option<T> {
        if state.closed {
            return None;
        }
        let item = state.items.pop_front()?;
        drop(state);
        self.not_full.notify_one();
        Some(item)
    }

    /// Drains the buffer, marks the queue closed and wakes every waiter.
    ///
    /// Returns the items that were still queued, oldest first.
    pub fn close(&self) -> Vec<T> {
        let drained = {
            let mut state = self.state.lock();
            state.closed = true;
            state.items.drain(..).collect()
        };
        self.not_full.notify_all();
        self.not_empty.notify_all();
        drained
    }

    /// Discards every queued item
    pub fn clear(&self) {
        self.state.lock().items.clear();
        self.not_full.notify_all();
    }

    /// Wakes one blocked consumer
    pub fn flush(&self) {
        self.not_empty.notify_one();
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Returns true if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Returns true if the queue is at capacity
    pub fn is_full(&self) -> bool {
        self.state.lock().items.len() >= self.capacity
    }

    /// Maximum number of queued items
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true once [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl<T: Clone> BlockingQueue<T> {
    /// Copy of the front item
    pub fn front(&self) -> Option<T> {
        self.state.lock().items.front().cloned()
    }

    /// Copy of the back item
    pub fn back(&self) -> Option<T> {
        self.state.lock().items.back().cloned()
    }
}

impl<T> fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BlockingQueue")
            .field("len", &state.items.len())
            .field("capacity", &self.capacity)
            .field("closed", &state.closed)
            .finish()
    }
}
