//! Interrupt to process-context hand-off
//!
//! The interrupt side only samples the detect line and queues the sample;
//! it never touches the controllers. The worker side drains the queue and
//! evaluates each sample under the transition lock.
//!
//! Two locks live here, both short-held: one around the physical line read
//! and one around the bounded queue. Neither is ever taken while waiting on
//! the transition lock, so the interrupt path cannot block behind a cascade.

extern crate alloc;

use alloc::boxed::Box;
use heapless::spsc::Queue;

use tvout_api::DetectLine;
use tvout_api::sync::{AtomicU64, Mutex, Ordering};

use crate::config::HPD_QUEUE_DEPTH;

struct LineState {
    detect: Box<dyn DetectLine>,
    last_sample: Option<bool>,
}

/// Detect line plus the bounded sample queue
pub struct IrqHandoff {
    line: Mutex<LineState>,
    queue: Mutex<Queue<bool, HPD_QUEUE_DEPTH>>,
    dropped: AtomicU64,
}

impl IrqHandoff {
    pub fn new(detect: Box<dyn DetectLine>) -> Self {
        Self {
            line: Mutex::new(LineState {
                detect,
                last_sample: None,
            }),
            queue: Mutex::new(Queue::new()),
            dropped: AtomicU64::new(0),
        }
    }

    /// Read the detect line
    pub fn sample(&self) -> bool {
        let mut line = self.line.lock();
        let connected = line.detect.is_connected();
        line.last_sample = Some(connected);
        connected
    }

    /// Most recent raw sample, if any
    pub fn last_sample(&self) -> Option<bool> {
        self.line.lock().last_sample
    }

    /// Interrupt entry: sample the line and queue the reading for the
    /// worker. When the queue is full the oldest sample is discarded; the
    /// newest reading always survives.
    pub fn on_interrupt(&self) -> bool {
        let connected = self.sample();
        self.push(connected)
    }

    /// Queue a sample taken elsewhere. Returns `false` if an older sample
    /// had to be dropped to make room.
    pub fn push(&self, connected: bool) -> bool {
        let mut queue = self.queue.lock();
        let mut kept_all = true;
        if queue.is_full() {
            queue.dequeue();
            self.dropped.fetch_add(1, Ordering::Relaxed);
            kept_all = false;
        }
        let queued = queue.enqueue(connected);
        debug_assert!(queued.is_ok(), "hpd queue full after making room");
        kept_all
    }

    /// Take the oldest pending sample
    pub fn pop(&self) -> Option<bool> {
        self.queue.lock().dequeue()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Throw away every queued sample, returning how many were discarded
    pub fn discard_pending(&self) -> usize {
        let mut queue = self.queue.lock();
        let mut discarded = 0;
        while queue.dequeue().is_some() {
            discarded += 1;
        }
        discarded
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
