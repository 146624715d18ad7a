//! Client-side session: at most one active source, its conversation, and a
//! single-flight guard for outstanding requests. Nothing here is persisted.

use crate::models::chat::{ ChatMessage, Conversation, Source };

use std::sync::Arc;
use std::sync::atomic::{ AtomicBool, Ordering };
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no document has been uploaded yet")]
    NoActiveSource,
    #[error("a document is already active; reset the session to switch")]
    SourceAlreadyActive,
    #[error("a request is already in flight")]
    RequestInFlight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoSource,
    ActiveSource,
}

#[derive(Debug, Default)]
pub struct Session {
    conversation: Option<Conversation>,
    in_flight: Arc<AtomicBool>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        match self.conversation {
            Some(_) => SessionState::ActiveSource,
            None => SessionState::NoSource,
        }
    }

    pub fn source(&self) -> Option<&Source> {
        self.conversation.as_ref().map(Conversation::source)
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    /// Starts an empty conversation on `source`. Ignored, returning false,
    /// while another source is active.
    pub fn set_source(&mut self, source: Source) -> bool {
        if self.conversation.is_some() {
            return false;
        }
        self.conversation = Some(Conversation::new(source));
        true
    }

    pub fn append_message(&mut self, message: ChatMessage) -> Result<(), SessionError> {
        let convo = self.conversation.as_mut().ok_or(SessionError::NoActiveSource)?;
        convo.push(message);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.conversation = None;
    }

    /// Claims the session for one request. The claim is released when the
    /// returned guard is dropped.
    pub fn begin_request(&self) -> Result<InFlightGuard, SessionError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::RequestInFlight)?;
        Ok(InFlightGuard { flag: self.in_flight.clone() })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
