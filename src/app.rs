use tokio::task::JoinHandle;

use crate::agent::AgentClient;
use crate::theme::{Palette, Theme, ThemeStore};

/// Shown in place of a reply when the outbound call fails for any reason.
pub const SEND_FAILED_TEXT: &str = "Error contacting the agent. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub from_user: bool,
}

impl Message {
    fn user(text: String) -> Self {
        Self {
            text,
            from_user: true,
        }
    }

    fn agent(text: String) -> Self {
        Self {
            text,
            from_user: false,
        }
    }
}

/// Send machine: at most one call in flight, enforced by `begin_send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendState {
    #[default]
    Idle,
    Sending,
}

pub struct App {
    pub should_quit: bool,

    // Conversation state
    pub messages: Vec<Message>,
    pub draft: String,
    pub draft_cursor: usize, // char index into draft
    send_state: SendState,
    pub in_flight: Option<JoinHandle<anyhow::Result<String>>>,

    // Log viewport (inner size, written back during render)
    pub log_scroll: u16,
    pub log_height: u16,
    pub log_width: u16,

    // Animation state (0-2 for the typing ellipsis)
    pub animation_frame: u8,

    pub theme: ThemeStore,
    pub agent: AgentClient,
}

impl App {
    pub fn new(agent: AgentClient, theme: ThemeStore) -> Self {
        Self {
            should_quit: false,

            messages: Vec::new(),
            draft: String::new(),
            draft_cursor: 0,
            send_state: SendState::default(),
            in_flight: None,

            log_scroll: 0,
            log_height: 0,
            log_width: 0,

            animation_frame: 0,

            theme,
            agent,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.send_state == SendState::Sending
    }

    /// Idle -> Sending. Appends the user message, clears the draft, and
    /// returns the text to dispatch. Refused while a call is in flight or
    /// when the draft is blank; a refused submit changes nothing.
    pub fn begin_send(&mut self) -> Option<String> {
        if self.is_loading() || self.draft.trim().is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.draft);
        self.draft_cursor = 0;
        self.messages.push(Message::user(text.clone()));
        self.send_state = SendState::Sending;
        self.scroll_to_bottom();
        Some(text)
    }

    /// Sending -> Idle on a successful reply.
    pub fn finish_send(&mut self, reply: String) {
        if !self.is_loading() {
            return;
        }

        self.messages.push(Message::agent(reply));
        self.send_state = SendState::Idle;
        self.scroll_to_bottom();
    }

    /// Sending -> Idle on any call failure. The failure is flattened into a
    /// regular agent message; nothing propagates further.
    pub fn fail_send(&mut self) {
        if !self.is_loading() {
            return;
        }

        self.messages.push(Message::agent(SEND_FAILED_TEXT.to_string()));
        self.send_state = SendState::Idle;
        self.scroll_to_bottom();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme.toggle()
    }

    pub fn palette(&self) -> Palette {
        self.theme.palette()
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Log scrolling
    pub fn scroll_up(&mut self) {
        self.log_scroll = self.log_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let max_scroll = self.total_log_lines().saturating_sub(self.log_height);
        if self.log_scroll < max_scroll {
            self.log_scroll += 1;
        }
    }

    pub fn scroll_page_up(&mut self) {
        let half_page = self.log_height / 2;
        self.log_scroll = self.log_scroll.saturating_sub(half_page.max(1));
    }

    pub fn scroll_page_down(&mut self) {
        let half_page = self.log_height / 2;
        let max_scroll = self.total_log_lines().saturating_sub(self.log_height);
        self.log_scroll = (self.log_scroll + half_page.max(1)).min(max_scroll);
    }

    /// Snap the log to its last line so the newest message (or the typing
    /// indicator) is visible.
    pub fn scroll_to_bottom(&mut self) {
        let total = self.total_log_lines();
        let visible = if self.log_height > 0 { self.log_height } else { 20 };
        self.log_scroll = total.saturating_sub(visible);
    }

    /// Estimate of rendered log lines after wrapping, mirroring the line
    /// structure produced in ui::render_log.
    fn total_log_lines(&self) -> u16 {
        // Use the last rendered width for wrap math, default to 50 if not set
        let wrap_width = if self.log_width > 0 {
            self.log_width as usize
        } else {
            50
        };

        let mut total: u16 = 0;

        for msg in &self.messages {
            total += 1; // Prefix line ("You:" or "Agent:")
            for line in msg.text.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total += 1; // Empty line still takes one line
                } else {
                    total += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total += 1; // Blank line after message
        }

        if self.is_loading() {
            total += 2; // "Agent:" + typing indicator
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentSettings;
    use crate::theme::NoStorage;

    fn test_app() -> App {
        let settings = AgentSettings {
            endpoint: "http://localhost:9/agent".to_string(),
            api_key: String::new(),
            user_id: String::new(),
            agent_id: String::new(),
            session_id: String::new(),
        };
        App::new(
            AgentClient::new(settings),
            ThemeStore::new(Box::new(NoStorage)),
        )
    }

    fn type_draft(app: &mut App, text: &str) {
        app.draft = text.to_string();
        app.draft_cursor = text.chars().count();
    }

    #[test]
    fn send_appends_user_message_and_clears_draft() {
        let mut app = test_app();
        type_draft(&mut app, "ping");

        let prompt = app.begin_send();

        assert_eq!(prompt.as_deref(), Some("ping"));
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.messages[0].text, "ping");
        assert!(app.messages[0].from_user);
        assert!(app.draft.is_empty());
        assert_eq!(app.draft_cursor, 0);
        assert!(app.is_loading());
    }

    #[test]
    fn blank_drafts_are_rejected() {
        let mut app = test_app();

        for blank in ["", "   ", " \t ", "\n  \n"] {
            type_draft(&mut app, blank);
            assert_eq!(app.begin_send(), None);
            assert!(app.messages.is_empty());
            assert!(!app.is_loading());
        }
    }

    #[test]
    fn submit_while_sending_is_a_noop() {
        let mut app = test_app();
        type_draft(&mut app, "first");
        app.begin_send().expect("first send accepted");

        type_draft(&mut app, "second");
        assert_eq!(app.begin_send(), None);

        // Neither the log nor the draft changed
        assert_eq!(app.messages.len(), 1);
        assert_eq!(app.draft, "second");
        assert!(app.is_loading());
    }

    #[test]
    fn successful_round_trip_appends_exactly_two_messages() {
        let mut app = test_app();
        type_draft(&mut app, "ping");
        app.begin_send().expect("send accepted");

        app.finish_send("pong".to_string());

        assert_eq!(
            app.messages,
            vec![
                Message {
                    text: "ping".to_string(),
                    from_user: true
                },
                Message {
                    text: "pong".to_string(),
                    from_user: false
                },
            ]
        );
        assert!(!app.is_loading());
    }

    #[test]
    fn failed_call_becomes_a_regular_agent_message() {
        let mut app = test_app();
        type_draft(&mut app, "Hi\nthere");
        app.begin_send().expect("send accepted");

        app.fail_send();

        assert_eq!(app.messages.len(), 2);
        assert_eq!(app.messages[0].text, "Hi\nthere");
        assert_eq!(app.messages[0].text.lines().count(), 2);
        assert!(app.messages[0].from_user);
        assert_eq!(app.messages[1].text, SEND_FAILED_TEXT);
        assert!(!app.messages[1].from_user);
        assert!(!app.is_loading());
    }

    #[test]
    fn resolutions_outside_sending_are_ignored() {
        let mut app = test_app();

        app.finish_send("stray reply".to_string());
        app.fail_send();

        assert!(app.messages.is_empty());
        assert!(!app.is_loading());
    }

    #[test]
    fn typing_animation_only_advances_while_sending() {
        let mut app = test_app();

        app.tick_animation();
        assert_eq!(app.animation_frame, 0);

        type_draft(&mut app, "hello");
        app.begin_send().expect("send accepted");
        app.tick_animation();
        assert_eq!(app.animation_frame, 1);
    }

    #[test]
    fn log_snaps_to_the_bottom_after_each_transition() {
        let mut app = test_app();
        app.log_height = 4;
        app.log_width = 40;

        for i in 0..5 {
            type_draft(&mut app, &format!("message number {i}"));
            app.begin_send().expect("send accepted");
            app.finish_send("a reply that is long enough to wrap across the log".to_string());
        }

        // 5 round trips, 3 lines per short message plus wrapped replies;
        // the offset must leave only the last viewport visible.
        assert!(app.log_scroll > 0);
        app.scroll_down();
        let bottom = app.log_scroll;
        app.scroll_to_bottom();
        assert_eq!(app.log_scroll, bottom);
    }
}
