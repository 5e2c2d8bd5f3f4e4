//! Scripted chat client for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use cwr_core::{CwrError, Transcript};

use crate::ChatClient;

/// A chat client that replays queued replies and counts calls.
///
/// When the queue runs dry the last reply is repeated, so a single queued
/// reply models a model that keeps answering the same thing.
#[derive(Debug)]
pub struct MockChatClient {
    replies: Mutex<Vec<String>>,
    last: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl MockChatClient {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Convenience constructor for a client that always answers `reply`.
    pub fn always(reply: impl Into<String>) -> Self {
        Self::new(vec![reply.into()])
    }

    /// Number of `complete` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ChatClient for MockChatClient {
    fn model(&self) -> &str {
        "mock"
    }

    async fn complete(&self, _transcript: &Transcript) -> Result<String, CwrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut replies = self.replies.lock().expect("mock replies lock");
        if replies.is_empty() {
            let last = self.last.lock().expect("mock last lock");
            return Ok(last.clone().unwrap_or_default());
        }
        let reply = replies.remove(0);
        *self.last.lock().expect("mock last lock") = Some(reply.clone());
        Ok(reply)
    }
}
