use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use crate::chat::{ChatWidget, PendingExchange};
use crate::completion::{CompletionClient, CompletionError};
use crate::config::Config;
use crate::rain::Rain;
use crate::section::Section;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Screen regions recorded during render for mouse hit-testing
#[derive(Debug, Clone, Default)]
pub struct HitAreas {
    pub nav_tabs: Vec<(Section, Rect)>,
    pub quick_questions: Vec<Rect>,
    pub chat_messages: Rect,
}

pub struct App {
    pub should_quit: bool,
    pub section: Section,
    pub input_mode: InputMode,

    pub rain: Rain,
    rng: StdRng,

    // Chat overlay
    pub chat: ChatWidget,
    pub chat_open: bool,
    pub chat_scroll: u16,
    /// Follow new messages until the user scrolls up
    pub chat_follow: bool,
    pub chat_max_scroll: u16,
    pub client: Option<CompletionClient>,
    pub key_source: Option<&'static str>,
    pub reply_task: Option<JoinHandle<Result<String, CompletionError>>>,
    pub animation_frame: u8, // 0-2 for ellipsis animation
    frame_count: u32,

    pub hit_areas: HitAreas,
}

impl App {
    pub fn new(config: &Config, width: u16, height: u16) -> Self {
        let mut rng = StdRng::from_os_rng();
        let rain = Rain::new(width, height, config.glyph_width(), &mut rng);

        let client = config.chat().and_then(|chat| match CompletionClient::new(&chat) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::error!(error = %e, "failed to build completion client, chat disabled");
                None
            }
        });

        Self {
            should_quit: false,
            section: Section::Home,
            input_mode: InputMode::Normal,
            rain,
            rng,
            chat: ChatWidget::new(),
            chat_open: false,
            chat_scroll: 0,
            chat_follow: true,
            chat_max_scroll: 0,
            client,
            key_source: config.key_source(),
            reply_task: None,
            animation_frame: 0,
            frame_count: 0,
            hit_areas: HitAreas::default(),
        }
    }

    pub fn chat_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn set_section(&mut self, section: Section) {
        if self.section != section {
            tracing::debug!(from = self.section.label(), to = section.label(), "section changed");
        }
        self.section = section;
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        tracing::debug!(width, height, "viewport resized");
        self.rain.resize(width, height, &mut self.rng);
    }

    /// Per-frame update (called by Tick event)
    pub fn tick(&mut self) {
        self.rain.tick(&mut self.rng);

        // Ellipsis advances roughly every 300ms at the default frame rate
        self.frame_count = self.frame_count.wrapping_add(1);
        if self.chat.is_awaiting_reply() && self.frame_count % 9 == 0 {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn step_reveal(&mut self) {
        if self.chat.is_revealing() {
            self.chat.step_reveal();
            self.chat_follow = true;
        }
    }

    pub fn open_chat(&mut self) {
        self.chat_open = true;
        if self.chat_enabled() {
            self.input_mode = InputMode::Editing;
        }
    }

    pub fn close_chat(&mut self) {
        self.chat_open = false;
        self.input_mode = InputMode::Normal;
    }

    /// Submit the chat input and start the completion request.
    pub fn send_message(&mut self) {
        let Some(client) = self.client.clone() else {
            return;
        };
        if let Some(pending) = self.chat.submit() {
            self.spawn_request(client, pending);
        }
    }

    pub fn ask_quick(&mut self, idx: usize) {
        let Some(client) = self.client.clone() else {
            return;
        };
        if let Some(pending) = self.chat.ask_quick(idx) {
            self.spawn_request(client, pending);
        }
    }

    fn spawn_request(&mut self, client: CompletionClient, pending: PendingExchange) {
        tracing::info!(
            model = client.model(),
            history = pending.history.len(),
            "sending chat message"
        );
        self.chat_follow = true;
        self.animation_frame = 0;
        self.reply_task = Some(tokio::spawn(async move {
            client.complete(&pending.history, &pending.user).await
        }));
    }

    /// Hand a finished request over to the chat widget.
    pub async fn poll_reply(&mut self) {
        let finished = self.reply_task.as_ref().is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.reply_task.take() else {
            return;
        };

        let result = match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "completion task panicked");
                Err(CompletionError::Task(e.to_string()))
            }
        };
        if let Ok(text) = &result {
            tracing::info!(chars = text.chars().count(), "reply received");
        }
        self.chat.receive(result);
        self.chat_follow = true;
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_follow = false;
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.chat_max_scroll);
        if self.chat_scroll >= self.chat_max_scroll {
            self.chat_follow = true;
        }
    }

    /// Stop periodic chat work before exit.
    pub fn shutdown(&mut self) {
        self.chat.cancel_reveal();
        if self.reply_task.is_some() {
            tracing::debug!("exiting with a completion request in flight");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatMessage, ChatPhase, ERROR_REPLY};

    fn app_with_key() -> App {
        let mut config = Config::new();
        config.api_key = Some("gsk_test".to_string());
        App::new(&config, 80, 24)
    }

    #[test]
    fn test_new_app_defaults() {
        let app = App::new(&Config::default(), 80, 24);
        assert_eq!(app.section, Section::Home);
        assert!(!app.chat_enabled());
        assert_eq!(app.rain.column_count(), 40);
        assert_eq!(app.key_source, None);
    }

    #[test]
    fn test_resize_rebuilds_rain() {
        let mut app = App::new(&Config::default(), 80, 24);
        app.resize(100, 30);
        assert_eq!(app.rain.column_count(), 50);
        assert_eq!(app.rain.rows(), 30);
    }

    #[test]
    fn test_section_navigation_round_trip() {
        let mut app = App::new(&Config::default(), 80, 24);
        app.set_section(Section::Skills);
        app.set_section(Section::Home);
        assert_eq!(app.section, Section::Home);
    }

    #[test]
    fn test_send_without_key_does_nothing() {
        let mut app = App::new(&Config::default(), 80, 24);
        app.open_chat();
        assert_eq!(app.input_mode, InputMode::Normal);
        app.chat.input = "hello".to_string();
        app.send_message();
        assert_eq!(app.chat.messages().len(), 1);
        assert!(app.reply_task.is_none());
    }

    #[tokio::test]
    async fn test_poll_reply_starts_reveal() {
        let mut app = app_with_key();
        app.chat.input = "技術棧是什麼？".to_string();
        app.chat.submit().unwrap();
        app.reply_task = Some(tokio::spawn(async { Ok("Rust".to_string()) }));

        while app.reply_task.is_some() {
            tokio::task::yield_now().await;
            app.poll_reply().await;
        }

        assert!(app.chat.is_revealing());
        for _ in 0..4 {
            app.step_reveal();
        }
        assert_eq!(app.chat.phase(), &ChatPhase::Idle);
        assert_eq!(app.chat.messages()[2], ChatMessage::assistant("Rust"));
    }

    #[tokio::test]
    async fn test_poll_reply_failure_restores_idle() {
        let mut app = app_with_key();
        app.chat.input = "hi".to_string();
        app.chat.submit().unwrap();
        app.reply_task = Some(tokio::spawn(async {
            Err(CompletionError::Status { status: 401, body: "unauthorized".to_string() })
        }));

        while app.reply_task.is_some() {
            tokio::task::yield_now().await;
            app.poll_reply().await;
        }

        assert_eq!(app.chat.phase(), &ChatPhase::Idle);
        assert_eq!(app.chat.messages().last().unwrap().content, ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_unfinished_task_is_left_alone() {
        let mut app = app_with_key();
        app.chat.input = "hi".to_string();
        app.chat.submit().unwrap();
        app.reply_task = Some(tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok(String::new())
        }));

        app.poll_reply().await;
        assert!(app.reply_task.is_some());
        assert!(app.chat.is_awaiting_reply());
    }

    #[test]
    fn test_chat_scroll_follow() {
        let mut app = App::new(&Config::default(), 80, 24);
        app.chat_max_scroll = 10;
        app.chat_scroll = 10;
        app.scroll_chat_up(3);
        assert_eq!(app.chat_scroll, 7);
        assert!(!app.chat_follow);
        app.scroll_chat_down(5);
        assert_eq!(app.chat_scroll, 10);
        assert!(app.chat_follow);
    }
}
