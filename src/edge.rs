//! Bounded, blocking, single-producer/single-consumer FIFO carrying
//! `(stamp, datum)` pairs between one output port and one input port.
//!
//! Neither the teacher's channel types (tokio mpsc/broadcast) nor
//! `flume` expose a non-destructive `peek` at an arbitrary offset or a
//! downstream-initiated half-close, so this is hand-rolled over the
//! same `std::sync` building blocks the teacher already reaches for
//! elsewhere (`core::channel::MpscChannel` wraps `Mutex<Option<..>>`).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use crate::datum::Datum;
use crate::error::{Error, Result};
use crate::stamp::Stamp;

/// Edge capacity used when configuration doesn't specify one.
pub const DEFAULT_CAPACITY: usize = 16;

struct Inner {
    queue: Mutex<VecDeque<(Stamp, Datum)>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
    blocking: bool,
    /// Downstream called `mark_downstream_complete`: no more pushes accepted.
    downstream_complete: AtomicBool,
    /// Upstream is done sending (a `Datum::complete()` was pushed, or the
    /// writer handle was dropped without one).
    upstream_closed: AtomicBool,
}

impl Inner {
    fn is_full(&self, len: usize) -> bool {
        self.capacity != 0 && len >= self.capacity
    }
}

/// The write endpoint of an edge. A process holds one per downstream
/// connection on an output port (fan-out is one edge per downstream,
/// not one edge shared by many writers).
pub struct EdgeWriter {
    inner: Arc<Inner>,
}

/// The read endpoint of an edge. An input port accepts at most one.
pub struct EdgeReader {
    inner: Arc<Inner>,
}

/// Creates a connected writer/reader pair.
pub fn channel(capacity: usize, blocking: bool) -> (EdgeWriter, EdgeReader) {
    let inner = Arc::new(Inner {
        queue: Mutex::new(VecDeque::new()),
        not_full: Condvar::new(),
        not_empty: Condvar::new(),
        capacity,
        blocking,
        downstream_complete: AtomicBool::new(false),
        upstream_closed: AtomicBool::new(false),
    });
    (
        EdgeWriter { inner: inner.clone() },
        EdgeReader { inner },
    )
}

impl EdgeWriter {
    pub fn push(&self, stamp: Stamp, datum: Datum) -> Result<()> {
        if self.inner.downstream_complete.load(Ordering::SeqCst)
            || self.inner.upstream_closed.load(Ordering::SeqCst)
        {
            return Err(Error::EdgeComplete);
        }
        let mut queue = self.inner.queue.lock().expect("edge queue poisoned");
        while self.inner.is_full(queue.len()) {
            if !self.inner.blocking {
                return Err(Error::EdgeFull);
            }
            if self.inner.downstream_complete.load(Ordering::SeqCst) {
                return Err(Error::EdgeComplete);
            }
            queue = self
                .inner
                .not_full
                .wait(queue)
                .expect("edge queue poisoned");
        }
        if self.inner.downstream_complete.load(Ordering::SeqCst) {
            return Err(Error::EdgeComplete);
        }
        let is_complete = datum.kind() == crate::datum::DatumKind::Complete;
        queue.push_back((stamp, datum));
        if is_complete {
            self.inner.upstream_closed.store(true, Ordering::SeqCst);
        }
        drop(queue);
        self.inner.not_empty.notify_all();
        Ok(())
    }

    pub fn try_push(&self, stamp: Stamp, datum: Datum) -> Result<()> {
        if self.inner.downstream_complete.load(Ordering::SeqCst)
            || self.inner.upstream_closed.load(Ordering::SeqCst)
        {
            return Err(Error::EdgeComplete);
        }
        let mut queue = self.inner.queue.lock().expect("edge queue poisoned");
        if self.inner.is_full(queue.len()) {
            return Err(Error::EdgeFull);
        }
        let is_complete = datum.kind() == crate::datum::DatumKind::Complete;
        queue.push_back((stamp, datum));
        if is_complete {
            self.inner.upstream_closed.store(true, Ordering::SeqCst);
        }
        drop(queue);
        self.inner.not_empty.notify_all();
        Ok(())
    }
}

impl Drop for EdgeWriter {
    fn drop(&mut self) {
        self.inner.upstream_closed.store(true, Ordering::SeqCst);
        self.inner.not_empty.notify_all();
    }
}

impl EdgeReader {
    /// Blocks until an item is available or the upstream side is
    /// closed and drained, in which case a synthetic `complete` datum
    /// is returned.
    pub fn pop(&self) -> (Stamp, Datum) {
        let mut queue = self.inner.queue.lock().expect("edge queue poisoned");
        loop {
            if let Some(item) = queue.pop_front() {
                drop(queue);
                self.inner.not_full.notify_all();
                return item;
            }
            if self.inner.upstream_closed.load(Ordering::SeqCst) {
                return (Stamp::new_default(), Datum::complete());
            }
            queue = self
                .inner
                .not_empty
                .wait(queue)
                .expect("edge queue poisoned");
        }
    }

    pub fn try_pop(&self) -> Result<(Stamp, Datum)> {
        let mut queue = self.inner.queue.lock().expect("edge queue poisoned");
        if let Some(item) = queue.pop_front() {
            drop(queue);
            self.inner.not_full.notify_all();
            return Ok(item);
        }
        if self.inner.upstream_closed.load(Ordering::SeqCst) {
            return Ok((Stamp::new_default(), Datum::complete()));
        }
        Err(Error::EdgeEmpty)
    }

    /// Non-destructive look at the `offset`-th pending item.
    pub fn peek(&self, offset: usize) -> Result<(Stamp, Datum)> {
        let queue = self.inner.queue.lock().expect("edge queue poisoned");
        queue.get(offset).cloned().ok_or(Error::EdgeEmpty)
    }

    pub fn len(&self) -> usize {
        self.inner.queue.lock().expect("edge queue poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Signals that no more items will be consumed; further `push`
    /// calls on the writer fail with `edge_complete`.
    pub fn mark_downstream_complete(&self) {
        tracing::debug!("edge downstream marked complete");
        self.inner.downstream_complete.store(true, Ordering::SeqCst);
        self.inner.not_full.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_preserved() {
        let (w, r) = channel(DEFAULT_CAPACITY, true);
        for i in 0..5 {
            w.push(Stamp::new_default(), Datum::new(i)).unwrap();
        }
        for i in 0..5 {
            let (_, d) = r.pop();
            assert_eq!(*d.get::<i32>().unwrap(), i);
        }
    }

    #[test]
    fn pop_on_closed_empty_edge_returns_synthetic_complete() {
        let (w, r) = channel(4, true);
        drop(w);
        let (_, d) = r.pop();
        assert_eq!(d.kind(), crate::datum::DatumKind::Complete);
    }

    #[test]
    fn push_after_complete_datum_fails() {
        let (w, _r) = channel(4, true);
        w.push(Stamp::new_default(), Datum::complete()).unwrap();
        assert!(matches!(
            w.push(Stamp::new_default(), Datum::empty()),
            Err(Error::EdgeComplete)
        ));
    }

    #[test]
    fn try_push_fails_when_full() {
        let (w, _r) = channel(1, false);
        w.try_push(Stamp::new_default(), Datum::empty()).unwrap();
        assert!(matches!(
            w.try_push(Stamp::new_default(), Datum::empty()),
            Err(Error::EdgeFull)
        ));
    }

    #[test]
    fn mark_downstream_complete_rejects_further_pushes() {
        let (w, r) = channel(4, true);
        r.mark_downstream_complete();
        assert!(matches!(
            w.push(Stamp::new_default(), Datum::empty()),
            Err(Error::EdgeComplete)
        ));
    }

    #[test]
    fn peek_is_non_destructive() {
        let (w, r) = channel(4, true);
        w.push(Stamp::new_default(), Datum::new(7i32)).unwrap();
        let (_, peeked) = r.peek(0).unwrap();
        assert_eq!(*peeked.get::<i32>().unwrap(), 7);
        assert_eq!(r.len(), 1);
        let (_, popped) = r.pop();
        assert_eq!(*popped.get::<i32>().unwrap(), 7);
    }

    #[test]
    fn blocking_push_wakes_on_pop() {
        use std::thread;
        use std::time::Duration;
        let (w, r) = channel(1, true);
        w.push(Stamp::new_default(), Datum::empty()).unwrap();
        let w2 = w;
        let handle = thread::spawn(move || {
            w2.push(Stamp::new_default(), Datum::new(99i32)).unwrap();
        });
        thread::sleep(Duration::from_millis(20));
        let (_, first) = r.pop();
        assert_eq!(first.kind(), crate::datum::DatumKind::Empty);
        handle.join().unwrap();
        let (_, second) = r.pop();
        assert_eq!(*second.get::<i32>().unwrap(), 99);
    }
}
