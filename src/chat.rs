//! Conversation state for the assistant overlay.
//!
//! An exchange moves `Idle -> AwaitingReply -> Revealing -> Idle`. A failed
//! request goes straight from `AwaitingReply` back to `Idle` with a fixed
//! apology appended.

use crate::completion::CompletionError;

pub const GREETING: &str = "你好！我是 Enzo 的 AI 助手，有什麼我可以幫你的嗎？";
pub const ERROR_REPLY: &str = "抱歉，發生錯誤了。請稍後再試。";
pub const EMPTY_REPLY: &str = "抱歉，我無法回應。";
pub const QUICK_QUESTIONS: [&str; 3] = ["技術棧是什麼？", "有哪些專案？", "如何聯繫？"];

/// A chat message in the assistant conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// Progressive display of a reply into the placeholder at `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    target: usize,
    text: String,
    shown_chars: usize,
    shown: String,
}

impl Reveal {
    pub fn target(&self) -> usize {
        self.target
    }

    pub fn shown(&self) -> &str {
        &self.shown
    }

    fn remaining(&self) -> usize {
        self.text.chars().count() - self.shown_chars
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChatPhase {
    #[default]
    Idle,
    AwaitingReply,
    Revealing(Reveal),
}

/// What a submission hands to the completion client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingExchange {
    /// History as it was before the user message was appended
    pub history: Vec<ChatMessage>,
    pub user: ChatMessage,
}

#[derive(Debug, Clone)]
pub struct ChatWidget {
    messages: Vec<ChatMessage>,
    pub input: String,
    /// Cursor position in characters, not bytes
    pub cursor: usize,
    phase: ChatPhase,
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl ChatWidget {
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::assistant(GREETING)],
            input: String::new(),
            cursor: 0,
            phase: ChatPhase::Idle,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn phase(&self) -> &ChatPhase {
        &self.phase
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.phase == ChatPhase::AwaitingReply
    }

    pub fn is_revealing(&self) -> bool {
        matches!(self.phase, ChatPhase::Revealing(_))
    }

    pub fn can_submit(&self) -> bool {
        !self.is_awaiting_reply() && !self.input.trim().is_empty()
    }

    /// Text to display for the message at `index`: the partial reveal for
    /// the active placeholder, the stored content otherwise.
    pub fn display_content(&self, index: usize) -> &str {
        match &self.phase {
            ChatPhase::Revealing(reveal) if reveal.target == index => reveal.shown(),
            _ => self.messages.get(index).map(|m| m.content.as_str()).unwrap_or(""),
        }
    }

    /// Start an exchange from the current input.
    ///
    /// Returns `None` when the input is blank or a reply is still pending.
    /// An active reveal is finished immediately so the history it points
    /// into cannot shift underneath it.
    pub fn submit(&mut self) -> Option<PendingExchange> {
        if self.is_awaiting_reply() {
            return None;
        }
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }

        if self.is_revealing() {
            tracing::debug!("superseding active reveal");
            self.finish_reveal();
        }

        let history = self.messages.clone();
        let user = ChatMessage::user(text);
        self.messages.push(user.clone());
        self.input.clear();
        self.cursor = 0;
        self.phase = ChatPhase::AwaitingReply;

        Some(PendingExchange { history, user })
    }

    /// Put a quick question in the input and submit it.
    pub fn ask_quick(&mut self, idx: usize) -> Option<PendingExchange> {
        let question = QUICK_QUESTIONS.get(idx)?;
        if self.is_awaiting_reply() {
            return None;
        }
        self.input = question.to_string();
        self.cursor = self.input.chars().count();
        self.submit()
    }

    /// Feed the outcome of the completion request.
    pub fn receive(&mut self, result: Result<String, CompletionError>) {
        if !self.is_awaiting_reply() {
            tracing::warn!("dropping reply that arrived outside an exchange");
            return;
        }

        match result {
            Ok(text) if !text.is_empty() => {
                self.messages.push(ChatMessage::assistant(String::new()));
                self.phase = ChatPhase::Revealing(Reveal {
                    target: self.messages.len() - 1,
                    text,
                    shown_chars: 0,
                    shown: String::new(),
                });
            }
            Ok(_) => self.fail(&CompletionError::EmptyReply),
            Err(e) => self.fail(&e),
        }
    }

    fn fail(&mut self, error: &CompletionError) {
        tracing::warn!(error = %error, "completion request failed");
        let apology = match error {
            CompletionError::EmptyReply => EMPTY_REPLY,
            _ => ERROR_REPLY,
        };
        self.messages.push(ChatMessage::assistant(apology));
        self.phase = ChatPhase::Idle;
    }

    /// Reveal one more character. Returns `true` while the reveal is still
    /// running after this step.
    pub fn step_reveal(&mut self) -> bool {
        let ChatPhase::Revealing(reveal) = &mut self.phase else {
            return false;
        };

        let target_is_placeholder = self
            .messages
            .get(reveal.target)
            .is_some_and(|m| m.role == ChatRole::Assistant);
        if !target_is_placeholder {
            tracing::warn!(index = reveal.target, "reveal target is gone, dropping reveal");
            self.phase = ChatPhase::Idle;
            return false;
        }

        if let Some(c) = reveal.text.chars().nth(reveal.shown_chars) {
            reveal.shown.push(c);
            reveal.shown_chars += 1;
        }

        if reveal.remaining() == 0 {
            self.finish_reveal();
            return false;
        }
        true
    }

    /// Write the full reply into the placeholder and end the reveal.
    fn finish_reveal(&mut self) {
        if let ChatPhase::Revealing(reveal) = std::mem::take(&mut self.phase) {
            if let Some(message) = self.messages.get_mut(reveal.target) {
                message.content = reveal.text;
            }
            tracing::debug!(index = reveal.target, "reveal finished");
        }
    }

    /// Halt any reveal without touching history.
    pub fn cancel_reveal(&mut self) {
        if self.is_revealing() {
            self.phase = ChatPhase::Idle;
        }
    }

    // Input editing
    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }
}
