//! Queue of human-readable diagnostics collected during a run.

use std::collections::VecDeque;

use crate::error::Error;

/// FIFO of diagnostic messages. Components append while a run is in progress; the
/// caller drains them afterwards, oldest first.
#[derive(Debug, Default, Clone)]
pub struct ErrorQueue {
    messages: VecDeque<String>,
}

impl ErrorQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the back of the queue
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push_back(message.into());
    }

    /// Append the text of an error
    pub fn push_error(&mut self, error: &Error) {
        self.push(error.to_string());
    }

    /// Remove and return the oldest message
    pub fn pop(&mut self) -> Option<String> {
        self.messages.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    /// Take every queued message, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = String> + '_ {
        self.messages.drain(..)
    }
}
