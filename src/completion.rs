use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::chat::{ChatMessage, ChatRole};
use crate::config::ChatConfig;

pub const SYSTEM_PROMPT: &str = "你是 Enzo 的個人網站助手。Enzo 是一位專注於遊戲平台開發的前端工程師。

關於 Enzo：
- 技術棧：React、TypeScript、Tailwind CSS、Zustand、SWR
- 經驗：3+ 年前端開發經驗
- 專長：遊戲平台 UI、即時聊天系統、WebSocket 應用
- 興趣：Unreal Engine 5 遊戲開發

請用友善、專業的語氣回答訪客的問題。回答請簡潔，使用繁體中文。";

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("http client build failed: {0}")]
    ClientBuild(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("response had no reply content")]
    EmptyReply,
    #[error("completion task failed: {0}")]
    Task(String),
}

#[derive(Serialize, Debug, PartialEq)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<CompletionResponseMessage>,
}

#[derive(Deserialize)]
struct CompletionResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl CompletionClient {
    pub fn new(config: &ChatConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| CompletionError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the persona prompt, the prior history and the new user message,
    /// and return the text of the first choice.
    pub async fn complete(
        &self,
        history: &[ChatMessage],
        user: &ChatMessage,
    ) -> Result<String, CompletionError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: build_messages(SYSTEM_PROMPT, history, user),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status { status, body });
        }

        let body = response.text().await?;
        parse_reply(&body)
    }
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
    }
}

fn build_messages<'a>(
    system: &'a str,
    history: &'a [ChatMessage],
    user: &'a ChatMessage,
) -> Vec<RequestMessage<'a>> {
    std::iter::once(RequestMessage { role: "system", content: system })
        .chain(history.iter().chain(std::iter::once(user)).map(|m| RequestMessage {
            role: role_name(m.role),
            content: &m.content,
        }))
        .collect()
}

fn parse_reply(body: &str) -> Result<String, CompletionError> {
    let response: CompletionResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty())
        .ok_or(CompletionError::EmptyReply)
}
