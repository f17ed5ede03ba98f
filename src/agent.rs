use reqwest::Client;
use serde::{Deserialize, Serialize};

use anyhow::Result;

use crate::config::AgentSettings;

/// Shown when the agent's reply carries neither expected field.
pub const NO_REPLY_TEXT: &str = "The agent did not send a reply.";

#[derive(Serialize)]
struct AgentRequest<'a> {
    user_id: &'a str,
    agent_id: &'a str,
    session_id: &'a str,
    message: &'a str,
}

#[derive(Deserialize)]
struct AgentReply {
    message: Option<String>,
    response: Option<String>,
}

/// Reply text by field priority: a non-empty `message`, else a non-empty
/// `response`, else the fixed fallback. Empty strings fall through.
fn reply_text(reply: AgentReply) -> String {
    reply
        .message
        .filter(|text| !text.is_empty())
        .or(reply.response.filter(|text| !text.is_empty()))
        .unwrap_or_else(|| NO_REPLY_TEXT.to_string())
}

#[derive(Clone)]
pub struct AgentClient {
    client: Client,
    settings: AgentSettings,
}

impl AgentClient {
    pub fn new(settings: AgentSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    /// One round-trip to the agent endpoint. The HTTP status is not
    /// inspected: any JSON body counts as a reply and degrades to the
    /// fallback text when it lacks the expected fields. Transport errors
    /// and non-JSON bodies are the only failure mode.
    pub async fn send(&self, message: &str) -> Result<String> {
        let request = AgentRequest {
            user_id: &self.settings.user_id,
            agent_id: &self.settings.agent_id,
            session_id: &self.settings.session_id,
            message,
        };

        tracing::debug!(endpoint = %self.settings.endpoint, "dispatching message to agent");

        let response = self
            .client
            .post(&self.settings.endpoint)
            .header("x-api-key", &self.settings.api_key)
            .json(&request)
            .send()
            .await?;

        let reply: AgentReply = response.json().await?;
        Ok(reply_text(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> AgentReply {
        serde_json::from_str(body).expect("parse reply body")
    }

    #[test]
    fn message_field_wins_over_response() {
        let reply = parse(r#"{"message":"A","response":"B"}"#);
        assert_eq!(reply_text(reply), "A");
    }

    #[test]
    fn response_field_is_used_when_message_is_absent() {
        let reply = parse(r#"{"response":"B"}"#);
        assert_eq!(reply_text(reply), "B");
    }

    #[test]
    fn empty_object_degrades_to_the_fallback() {
        let reply = parse("{}");
        assert_eq!(reply_text(reply), NO_REPLY_TEXT);
    }

    #[test]
    fn empty_strings_fall_through_like_missing_fields() {
        let reply = parse(r#"{"message":"","response":"B"}"#);
        assert_eq!(reply_text(reply), "B");

        let reply = parse(r#"{"message":"","response":""}"#);
        assert_eq!(reply_text(reply), NO_REPLY_TEXT);
    }

    #[test]
    fn unexpected_shapes_are_tolerated() {
        let reply = parse(r#"{"error":"rate limited","status":429}"#);
        assert_eq!(reply_text(reply), NO_REPLY_TEXT);
    }

    #[test]
    fn request_body_carries_the_identity_fields() {
        let request = AgentRequest {
            user_id: "u-1",
            agent_id: "a-2",
            session_id: "s-3",
            message: "hello",
        };
        let body = serde_json::to_value(&request).expect("serialize request");
        assert_eq!(body["user_id"], "u-1");
        assert_eq!(body["agent_id"], "a-2");
        assert_eq!(body["session_id"], "s-3");
        assert_eq!(body["message"], "hello");
    }
}
