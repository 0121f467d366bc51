//! Chat completion client for the response stage

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::conversation::ModelMessage;
use crate::error::{Error, FailureKind, Result, ServiceFailure};

/// Chat model tier used for responses
///
/// Selection is forwarded to the provider untouched; nothing downstream
/// branches on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatModel {
    /// Higher-quality tier
    #[serde(rename = "gpt-4")]
    Gpt4,
    /// Cheaper, faster tier
    #[default]
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
}

impl ChatModel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gpt4 => "gpt-4",
            Self::Gpt35Turbo => "gpt-3.5-turbo",
        }
    }
}

impl std::str::FromStr for ChatModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gpt-4" => Ok(Self::Gpt4),
            "gpt-3.5-turbo" => Ok(Self::Gpt35Turbo),
            other => Err(Error::Config(format!("unknown chat model: {other}"))),
        }
    }
}

impl std::fmt::Display for ChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces the assistant reply for a conversation
#[async_trait]
pub trait Responder: Send + Sync {
    /// Complete the history with one assistant reply
    async fn respond(&self, history: &[ModelMessage], model: ChatModel) -> Result<String>;
}

/// Request body for the chat completions API
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ModelMessage],
}

/// Response from the chat completions API
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Responds via the OpenAI chat completions API, non-streaming
#[derive(Clone)]
pub struct OpenAIResponder {
    client: reqwest::Client,
    api_key: String,
}

impl OpenAIResponder {
    /// Create a chat responder
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(client: reqwest::Client, api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for chat".to_string(),
            ));
        }

        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl Responder for OpenAIResponder {
    async fn respond(&self, history: &[ModelMessage], model: ChatModel) -> Result<String> {
        tracing::debug!(
            model = %model,
            messages = history.len(),
            "requesting chat completion"
        );

        let request = ChatCompletionRequest {
            model: model.as_str(),
            messages: history,
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "chat request failed");
                Error::Response(ServiceFailure::transport(&e))
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "chat API error");
            return Err(Error::Response(ServiceFailure::status(
                status,
                format!("chat API error {status}: {body}"),
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse chat response");
            Error::Response(ServiceFailure::transport(&e))
        })?;

        let reply = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                Error::Response(ServiceFailure::new(
                    FailureKind::Upstream,
                    "chat completion contained no choices",
                ))
            })?;

        tracing::info!(chars = reply.chars().count(), "chat completion received");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_wire_shape() {
        let messages = vec![
            ModelMessage::system("You are a thoughtful assistant."),
            ModelMessage::user("안녕"),
            ModelMessage::assistant("안녕하세요!"),
        ];
        let request = ChatCompletionRequest {
            model: ChatModel::Gpt35Turbo.as_str(),
            messages: &messages,
        };

        let expected = json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                {"role": "system", "content": "You are a thoughtful assistant."},
                {"role": "user", "content": "안녕"},
                {"role": "assistant", "content": "안녕하세요!"},
            ],
        });
        assert_eq!(serde_json::to_value(&request).unwrap(), expected);
    }

    #[test]
    fn response_wire_shape() {
        let body = json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "안녕하세요!"}, "finish_reason": "stop"}
            ],
        });
        let parsed: ChatCompletionResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "안녕하세요!");
    }

    #[test]
    fn model_round_trips_through_str() {
        for model in [ChatModel::Gpt4, ChatModel::Gpt35Turbo] {
            assert_eq!(model.as_str().parse::<ChatModel>().unwrap(), model);
        }
        assert!("gpt-5".parse::<ChatModel>().is_err());
        assert_eq!(ChatModel::default(), ChatModel::Gpt35Turbo);
    }
}
