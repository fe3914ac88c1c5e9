//! Scripted seam implementations for tests.
//!
//! Compiled unconditionally so downstream crates can drive a
//! [`PageController`](crate::controller::PageController) without network
//! access.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::effect::UiPatch;
use crate::event::ContactSubmission;
use crate::gateway::{ContactGateway, ContactOutcome, GatewayError};
use crate::render::Renderer;
use crate::source::{BibliographySource, SourceError};

/// A configurable mock reply for [`MockSource`].
#[derive(Clone, Debug)]
pub enum MockKeys {
    /// Simulate a successful lookup returning these item keys.
    Keys(Vec<String>),
    /// Simulate a failed lookup.
    Error(SourceError),
}

/// A hand-rolled mock implementing [`BibliographySource`] for tests.
///
/// Supports:
/// - A fixed reply (used for every call), **or**
/// - A sequence of replies (one per call, repeating the last if exhausted).
/// - Optional per-call latency, interruptible by cancellation.
/// - Call counting via [`call_count()`](MockSource::call_count).
pub struct MockSource {
    /// If non-empty, each call pops the next reply.
    replies: Mutex<Vec<MockKeys>>,
    /// Fallback when the sequence is empty (or single-reply mode).
    fallback: MockKeys,
    delay: Option<Duration>,
    call_count: AtomicUsize,
}

impl MockSource {
    /// Create a mock that always returns `reply`.
    pub fn new(reply: MockKeys) -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            fallback: reply,
            delay: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a mock that returns replies in order, repeating the last one.
    pub fn with_sequence(mut replies: Vec<MockKeys>) -> Self {
        assert!(!replies.is_empty(), "sequence must have at least one reply");
        // Reverse so we can pop() from the front cheaply.
        replies.reverse();
        let fallback = replies.first().cloned().unwrap();
        Self {
            replies: Mutex::new(replies),
            fallback,
            delay: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Set simulated network latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `fetch_keys()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> MockKeys {
        let mut seq = self.replies.lock().unwrap();
        if let Some(reply) = seq.pop() {
            reply
        } else {
            self.fallback.clone()
        }
    }
}

impl BibliographySource for MockSource {
    fn fetch_keys<'a>(
        &'a self,
        _title: &'a str,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, SourceError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let reply = self.next_reply();
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                    _ = tokio::time::sleep(d) => {}
                }
            }

            match reply {
                MockKeys::Keys(keys) => Ok(keys),
                MockKeys::Error(e) => Err(e),
            }
        })
    }
}

/// A configurable mock outcome for [`MockGateway`].
#[derive(Clone, Debug)]
pub enum MockOutcome {
    /// Simulate the endpoint replying with this modal text.
    Modal(String),
    /// Simulate a failed submission.
    Error(GatewayError),
}

/// A hand-rolled mock implementing [`ContactGateway`] for tests.
///
/// Records every submission it receives; sequences, latency and call
/// counting work as in [`MockSource`].
pub struct MockGateway {
    replies: Mutex<Vec<MockOutcome>>,
    fallback: MockOutcome,
    delay: Option<Duration>,
    call_count: AtomicUsize,
    submissions: Mutex<Vec<ContactSubmission>>,
}

impl MockGateway {
    /// Create a mock that always produces `outcome`.
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            fallback: outcome,
            delay: None,
            call_count: AtomicUsize::new(0),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that produces outcomes in order, repeating the last one.
    pub fn with_sequence(mut replies: Vec<MockOutcome>) -> Self {
        assert!(!replies.is_empty(), "sequence must have at least one outcome");
        replies.reverse();
        let fallback = replies.first().cloned().unwrap();
        Self {
            replies: Mutex::new(replies),
            fallback,
            delay: None,
            call_count: AtomicUsize::new(0),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Set simulated network latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `submit()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every form body submitted so far, in order.
    pub fn submitted(&self) -> Vec<ContactSubmission> {
        self.submissions.lock().unwrap().clone()
    }

    fn next_reply(&self) -> MockOutcome {
        let mut seq = self.replies.lock().unwrap();
        if let Some(reply) = seq.pop() {
            reply
        } else {
            self.fallback.clone()
        }
    }
}

impl ContactGateway for MockGateway {
    fn submit<'a>(
        &'a self,
        form: &'a ContactSubmission,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<ContactOutcome, GatewayError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.submissions.lock().unwrap().push(form.clone());
        let reply = self.next_reply();
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(GatewayError::Cancelled),
                    _ = tokio::time::sleep(d) => {}
                }
            }

            match reply {
                MockOutcome::Modal(text) => Ok(ContactOutcome { modal_text: text }),
                MockOutcome::Error(e) => Err(e),
            }
        })
    }
}

/// Renderer that records patches and navigations instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub patches: Vec<UiPatch>,
    pub navigations: Vec<String>,
}

impl Renderer for RecordingRenderer {
    fn apply(&mut self, patch: &UiPatch) {
        self.patches.push(patch.clone());
    }

    fn navigate(&mut self, url: &str) {
        self.navigations.push(url.to_string());
    }
}
