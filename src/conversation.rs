use chrono::{DateTime, Local};
use serde::Serialize;

use crate::assistant::{Assistant, Reply, CONTEXT_WINDOW_LIMIT};
use crate::catalog::PortfolioItem;
use crate::completion::ContextEntry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub id: u64,
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Local>,
}

/// A submitted question waiting for its reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReply {
    pub user_text: String,
    pub context: Vec<ContextEntry>,
    pub item_id: u32,
}

/// One visitor's chat: the visible transcript, the context window sent to
/// the remote model, and the typing indicator.
///
/// Entry 0 of the transcript is always the assistant's greeting. Switching
/// items replaces that entry and clears the context window, but keeps the
/// rest of the transcript.
#[derive(Debug, Clone)]
pub struct ChatSession {
    owner_first_name: String,
    transcript: Vec<TranscriptEntry>,
    context: Vec<ContextEntry>,
    typing: bool,
    next_id: u64,
    item_id: u32,
}

pub fn welcome_text(owner_first_name: &str, item: &PortfolioItem) -> String {
    format!(
        "Hi! I'm {}'s AI assistant. I can tell you about \"{}\" or any of her creative work. What would you like to know?",
        owner_first_name, item.title
    )
}

pub fn now_viewing_text(owner_first_name: &str, item: &PortfolioItem) -> String {
    format!(
        "Now viewing \"{}\" - {}. Ask me anything about this {} project or {}'s creative process!",
        item.title,
        item.category,
        item.category.to_lowercase(),
        owner_first_name
    )
}

impl ChatSession {
    pub fn new(owner_first_name: impl Into<String>, item: &PortfolioItem) -> Self {
        let owner_first_name = owner_first_name.into();
        let mut session = Self {
            transcript: Vec::new(),
            context: Vec::new(),
            typing: false,
            next_id: 1,
            item_id: item.id,
            owner_first_name,
        };
        let greeting = welcome_text(&session.owner_first_name, item);
        session.append(greeting, false);
        session
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn context_window(&self) -> &[ContextEntry] {
        &self.context
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn item_id(&self) -> u32 {
        self.item_id
    }

    fn append(&mut self, text: String, is_user: bool) -> &TranscriptEntry {
        let id = self.next_id;
        self.next_id += 1;
        self.transcript.push(TranscriptEntry {
            id,
            text,
            is_user,
            timestamp: Local::now(),
        });
        &self.transcript[self.transcript.len() - 1]
    }

    /// Called whenever the carousel selects an item. A different item gets a
    /// fresh context and a new greeting in place of entry 0.
    pub fn on_item_changed(&mut self, item: &PortfolioItem) {
        if item.id == self.item_id {
            return;
        }
        self.item_id = item.id;
        self.context.clear();

        if self.transcript.is_empty() {
            return;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.transcript[0] = TranscriptEntry {
            id,
            text: now_viewing_text(&self.owner_first_name, item),
            is_user: false,
            timestamp: Local::now(),
        };
    }

    /// Records a visitor question and raises the typing indicator. Blank
    /// input and submissions while a reply is outstanding are ignored.
    pub fn submit(&mut self, text: &str) -> Option<PendingReply> {
        if text.trim().is_empty() || self.typing {
            return None;
        }
        self.append(text.to_string(), true);
        self.typing = true;
        Some(PendingReply {
            user_text: text.to_string(),
            context: self.context.clone(),
            item_id: self.item_id,
        })
    }

    /// Lands a reply in the transcript and lowers the typing indicator.
    ///
    /// A reply that arrives after the visitor moved to another item still
    /// shows up in the transcript, but it does not leak into the new item's
    /// context window.
    pub fn complete(&mut self, pending: PendingReply, reply: Reply) -> &TranscriptEntry {
        self.typing = false;
        if reply.extends_context() && pending.item_id == self.item_id {
            self.push_exchange(pending.user_text, reply.text.clone());
        }
        self.append(reply.text, false)
    }

    fn push_exchange(&mut self, user_text: String, reply_text: String) {
        self.context.push(ContextEntry::user(user_text));
        self.context.push(ContextEntry::assistant(reply_text));
        if self.context.len() > CONTEXT_WINDOW_LIMIT {
            let excess = self.context.len() - CONTEXT_WINDOW_LIMIT;
            self.context.drain(..excess);
        }
    }

    /// Submit, resolve and complete in one go. Returns `None` when the
    /// submission was ignored.
    pub async fn ask(
        &mut self,
        assistant: &Assistant,
        item: &PortfolioItem,
        text: &str,
    ) -> Option<&TranscriptEntry> {
        let pending = self.submit(text)?;
        let reply = assistant
            .respond(&pending.user_text, item, &pending.context)
            .await;
        Some(self.complete(pending, reply))
    }
}
