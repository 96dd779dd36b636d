//! One visitor's state: the carousel and the chat, kept in step.
//!
//! Every navigation re-selects the current item and tells the chat about
//! it, which resets the context window and swaps the greeting. Events arrive
//! one at a time from a single loop (a WebSocket connection or the terminal),
//! so nothing here is shared or locked.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::assistant::Reply;
use crate::carousel::{Carousel, NavKey};
use crate::catalog::{Catalog, PortfolioItem};
use crate::conversation::{ChatSession, PendingReply, TranscriptEntry};
use crate::error::SessionError;
use crate::view::ViewModel;

/// Events sent by the page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    Next,
    Previous,
    Jump { index: usize },
    Key { key: String },
    Swipe { offset: f64, velocity: f64 },
    Chat { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub view: ViewModel,
    pub transcript: Vec<TranscriptEntry>,
    pub typing: bool,
}

/// Events sent back to the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    State(SessionSnapshot),
    Error { message: String },
}

pub struct Session {
    catalog: Arc<Catalog>,
    carousel: Carousel,
    chat: ChatSession,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let carousel = Carousel::new(catalog.len());
        let chat = ChatSession::new(catalog.owner_first_name(), &catalog.items()[0]);
        Self {
            catalog,
            carousel,
            chat,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    pub fn current_item(&self) -> &PortfolioItem {
        &self.catalog.items()[self.carousel.current_index()]
    }

    fn sync_item(&mut self) {
        let item = &self.catalog.items()[self.carousel.current_index()];
        debug!(index = self.carousel.current_index(), title = %item.title, "Selected item");
        self.chat.on_item_changed(item);
    }

    pub fn next(&mut self) {
        self.carousel.next();
        self.sync_item();
    }

    pub fn previous(&mut self) {
        self.carousel.previous();
        self.sync_item();
    }

    /// Validated jump. The carousel itself treats a bad index as a bug, so
    /// outside input is checked here first.
    pub fn jump_to(&mut self, index: usize) -> Result<(), SessionError> {
        let len = self.catalog.len();
        if index >= len {
            return Err(SessionError::IndexOutOfRange { index, len });
        }
        self.carousel.jump_to(index);
        self.sync_item();
        Ok(())
    }

    /// Unbound keys are ignored.
    pub fn handle_key(&mut self, key: &str) {
        if let Some(key) = NavKey::from_key(key) {
            self.carousel.handle_key(key);
            self.sync_item();
        }
    }

    pub fn handle_swipe(&mut self, offset: f64, velocity: f64) {
        if self.carousel.handle_swipe(offset, velocity).is_some() {
            self.sync_item();
        }
    }

    /// Applies one client event. A chat submission hands back the pending
    /// reply for the caller to resolve; everything else completes in place.
    pub fn apply(&mut self, event: ClientEvent) -> Result<Option<PendingReply>, SessionError> {
        match event {
            ClientEvent::Next => self.next(),
            ClientEvent::Previous => self.previous(),
            ClientEvent::Jump { index } => self.jump_to(index)?,
            ClientEvent::Key { key } => self.handle_key(&key),
            ClientEvent::Swipe { offset, velocity } => self.handle_swipe(offset, velocity),
            ClientEvent::Chat { text } => {
                if self.chat.is_typing() {
                    return Err(SessionError::ReplyPending);
                }
                return Ok(self.chat.submit(&text));
            }
        }
        Ok(None)
    }

    pub fn finish_reply(&mut self, pending: PendingReply, reply: Reply) -> &TranscriptEntry {
        self.chat.complete(pending, reply)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            view: ViewModel::build(
                self.current_item(),
                self.carousel.current_index(),
                self.catalog.len(),
                self.carousel.direction(),
            ),
            transcript: self.chat.transcript().to_vec(),
            typing: self.chat.is_typing(),
        }
    }
}
