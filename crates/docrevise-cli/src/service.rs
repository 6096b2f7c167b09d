//! OpenAI-compatible chat completions client
//!
//! Implements [`TextTransformer`] over `POST {endpoint}/chat/completions`.
//! Each call sends the system prompt, the recent conversation history, an
//! optional context message and the paragraph to revise. No retries: a
//! failed call fails the paragraph.

use std::collections::VecDeque;
use std::env;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docrevise_core::{ServiceError, TextTransformer, TransformRequest};

use crate::config::ServiceSettings;

/// Environment variable overriding the configured model
pub const MODEL_ENV: &str = "OPENAI_MODEL";

/// Assistant replies kept in history are cut to this many characters
const HISTORY_REPLY_CHARS: usize = 100;

const SYSTEM_PROMPT: &str = "You are an expert document reviser. \
Return ONLY the revised text, without explanations, comments or markdown formatting. \
Preserve the exact structure of the text (line breaks, spacing).";

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`
    pub role: String,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat completions endpoint
#[derive(Debug)]
pub struct ChatCompletionsClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    history_limit: usize,
    history: VecDeque<ChatMessage>,
}

impl ChatCompletionsClient {
    /// Create a client; the key is read from `settings.api_key_env`
    pub fn from_settings(settings: &ServiceSettings) -> Result<Self, ServiceError> {
        let api_key = env::var(&settings.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ServiceError::MissingCredentials(settings.api_key_env.clone()))?;
        let model = env::var(MODEL_ENV)
            .ok()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| settings.model.clone());
        Self::new(settings, api_key, model)
    }

    /// Create a client with an explicit key and model
    pub fn new(
        settings: &ServiceSettings,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| {
                ServiceError::unavailable(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            temperature: settings.temperature,
            history_limit: settings.history,
            history: VecDeque::new(),
        })
    }

    /// Model used for requests
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Conversation history, oldest first
    pub fn history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.history.iter()
    }

    /// Messages sent for `request`
    pub fn build_messages(&self, request: &TransformRequest<'_>) -> Vec<ChatMessage> {
        let mut system = SYSTEM_PROMPT.to_string();
        if let Some(language) = request.detected_language {
            system.push_str(&format!(
                "\nThe document is written in {}. Revise it in that language.",
                language
            ));
        }

        let mut messages = vec![ChatMessage::system(system)];
        let skip = self.history.len().saturating_sub(self.history_limit);
        messages.extend(self.history.iter().skip(skip).cloned());
        if !request.context.is_empty() {
            messages.push(ChatMessage::system(format!("Context: {}", request.context.join("\n"))));
        }
        messages.push(ChatMessage::user(format!(
            "{}\n\nText:\n{}",
            request.instruction, request.text
        )));
        messages
    }

    /// Records an exchange, keeping a bounded history
    fn remember(&mut self, instruction: &str, reply: &str) {
        let short = if reply.chars().count() > HISTORY_REPLY_CHARS {
            let cut: String = reply.chars().take(HISTORY_REPLY_CHARS).collect();
            format!("{}...", cut)
        } else {
            reply.to_string()
        };
        self.history.push_back(ChatMessage::user(format!("{} (paragraph)", instruction)));
        self.history.push_back(ChatMessage::assistant(short));
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }
    }
}

/// Text content of the first choice
fn extract_content(body: &str) -> Result<String, ServiceError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ServiceError::invalid_response(format!("malformed response: {}", e)))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| ServiceError::invalid_response("response has no message content"))
}

impl TextTransformer for ChatCompletionsClient {
    fn transform(&mut self, request: &TransformRequest<'_>) -> Result<String, ServiceError> {
        let messages = self.build_messages(request);
        let url = format!("{}/chat/completions", self.endpoint);
        debug!(model = %self.model, messages = messages.len(), "calling chat completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: &messages,
                temperature: self.temperature,
            })
            .send()
            .map_err(|e| ServiceError::unavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ServiceError::unavailable(e.to_string()))?;
        if !status.is_success() {
            return Err(ServiceError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }

        let content = extract_content(&body)?;
        self.remember(request.instruction, &content);
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(history: usize) -> ChatCompletionsClient {
        let settings = ServiceSettings {
            history,
            ..ServiceSettings::default()
        };
        ChatCompletionsClient::new(&settings, "sk-test", "gpt-4o").unwrap()
    }

    #[test]
    fn test_messages_without_context() {
        let client = client(5);
        let request = TransformRequest::new("Bonjour", "Traduis en anglais");
        let messages = client.build_messages(&request);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert!(!messages[0].content.contains("written in"));
        assert_eq!(
            messages[1],
            ChatMessage::user("Traduis en anglais\n\nText:\nBonjour")
        );
    }

    #[test]
    fn test_messages_with_context_and_language() {
        let client = client(5);
        let context = vec!["Premier.".to_string(), "Deuxième.".to_string()];
        let request = TransformRequest::new("Troisième", "Corrige")
            .with_context(&context)
            .with_language(Some("French"));
        let messages = client.build_messages(&request);

        assert_eq!(messages.len(), 3);
        assert!(messages[0].content.contains("written in French"));
        assert_eq!(
            messages[1],
            ChatMessage::system("Context: Premier.\nDeuxième.")
        );
    }

    #[test]
    fn test_history_is_bounded() {
        let mut client = client(3);
        client.remember("Corrige", "un");
        client.remember("Corrige", "deux");

        let history: Vec<&ChatMessage> = client.history().collect();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0], &ChatMessage::assistant("un"));
        assert_eq!(history[2], &ChatMessage::assistant("deux"));

        let messages = client.build_messages(&TransformRequest::new("trois", "Corrige"));
        assert_eq!(messages.len(), 5);
    }

    #[test]
    fn test_long_replies_are_shortened() {
        let mut client = client(5);
        let reply = "é".repeat(150);
        client.remember("Reformule", &reply);

        let stored = client.history().last().unwrap();
        assert_eq!(stored.content.chars().count(), HISTORY_REPLY_CHARS + 3);
        assert!(stored.content.ends_with("..."));
    }

    #[test]
    fn test_disabled_history() {
        let mut client = client(0);
        client.remember("Corrige", "texte");
        assert_eq!(client.history().count(), 0);
    }

    #[test]
    fn test_extract_content() {
        let body = concat!(
            r#"{"choices":[{"index":0,"#,
            r#""message":{"role":"assistant","content":"  Texte corrigé.\n"}}]}"#
        );
        assert_eq!(extract_content(body).unwrap(), "Texte corrigé.");

        let err = extract_content(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(_)));

        let err = extract_content("<html>").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidResponse(_)));
    }

    #[test]
    fn test_missing_credentials() {
        let settings = ServiceSettings {
            api_key_env: "DOCREVISE_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..ServiceSettings::default()
        };
        let err = ChatCompletionsClient::from_settings(&settings).unwrap_err();
        let ServiceError::MissingCredentials(var) = &err else {
            panic!("unexpected error: {}", err);
        };
        assert_eq!(var, "DOCREVISE_TEST_KEY_THAT_IS_NEVER_SET");
    }

    #[test]
    fn test_unreachable_endpoint() {
        let settings = ServiceSettings {
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..ServiceSettings::default()
        };
        let mut client = ChatCompletionsClient::new(&settings, "sk-test", "gpt-4o").unwrap();
        let err = client.transform(&TransformRequest::new("Bonjour", "Corrige")).unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        assert_eq!(client.history().count(), 0);
    }
}
