//! Host integration points.
//!
//! A GUI host usually wants two things from a network client: to know when
//! a request is in flight (to drive an activity indicator) and to receive
//! completions on the thread that owns its UI. `ActivityObserver` covers the
//! first, `CompletionDispatcher` the second. Headless callers use neither.

use std::time::Duration;

use crate::http::HttpRequest;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Notified around every request that reaches the transport. Stub hits and
/// requests rejected before sending are never reported.
pub trait ActivityObserver: Send + Sync {
    fn request_started(&self, request: &HttpRequest);
    fn request_finished(&self, request: &HttpRequest);
}

/// Moves a background completion onto the context the host wants it on.
pub trait CompletionDispatcher: Send + Sync {
    fn dispatch(&self, job: Job);
}

/// A dispatcher that queues completions until the owning thread drains
/// them, in the manner of a UI main loop.
#[derive(Clone)]
pub struct MainThreadQueue {
    sender: flume::Sender<Job>,
    receiver: flume::Receiver<Job>,
}

impl MainThreadQueue {
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    /// Run every completion queued so far. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for one completion and run it.
    pub fn run_next(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => {
                job();
                true
            }
            Err(_) => false,
        }
    }

    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl Default for MainThreadQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionDispatcher for MainThreadQueue {
    fn dispatch(&self, job: Job) {
        // Cannot fail: `self` holds a receiver.
        let _ = self.sender.send(job);
    }
}
