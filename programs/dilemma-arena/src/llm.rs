//! HTTP decision backends for `RemoteLLMAgent` and `LocalLLMAgent`
//!
//! Both speak the OpenAI wire format: chat completions for the hosted model,
//! plain completions for a local vLLM server. Every failure is returned as an
//! [`AgentError`]; nothing is retried.

use dilemma_core::{AgentError, DecisionBackend, DecisionRequest, LocalLlmParams, RemoteLlmParams};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
const MAX_TOKENS: u32 = 10;
const REMOTE_TIMEOUT: Duration = Duration::from_secs(60);
const LOCAL_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    text: String,
}

fn build_client(timeout: Duration) -> Result<Client, AgentError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AgentError::Backend(format!("failed to create HTTP client: {}", e)))
}

/// Turn a non-success status into the matching error, otherwise hand back the body
fn read_body(response: Response) -> Result<String, AgentError> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| AgentError::Unreachable(e.to_string()))?;
    check_status(status, body)
}

fn check_status(status: StatusCode, body: String) -> Result<String, AgentError> {
    if status.is_success() {
        return Ok(body);
    }
    let excerpt: String = body.chars().take(200).collect();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AgentError::MissingCredential(
            format!("API rejected the key ({}): {}", status, excerpt),
        )),
        _ => Err(AgentError::Backend(format!("API error {}: {}", status, excerpt))),
    }
}

fn parse_chat_reply(body: &str) -> Result<String, AgentError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| AgentError::MalformedResponse(format!("JSON parse error: {}", e)))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AgentError::MalformedResponse("reply has no message content".into()))
}

fn parse_completion_reply(body: &str) -> Result<String, AgentError> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| AgentError::MalformedResponse(format!("JSON parse error: {}", e)))?;
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.text)
        .ok_or_else(|| AgentError::MalformedResponse("reply has no choices".into()))
}

/// Hosted chat-completions model
pub struct RemoteBackend {
    client: Client,
    url: String,
    model: String,
    api_key: String,
}

impl RemoteBackend {
    pub fn new(params: &RemoteLlmParams, api_key: Option<String>) -> Result<Self, AgentError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AgentError::MissingCredential(format!("{} not set", API_KEY_VAR)))?;
        Ok(Self {
            client: build_client(REMOTE_TIMEOUT)?,
            url: format!("{}/chat/completions", params.api_base.trim_end_matches('/')),
            model: params.model.clone(),
            api_key,
        })
    }

    /// Key taken from the environment
    pub fn from_env(params: &RemoteLlmParams) -> Result<Self, AgentError> {
        Self::new(params, std::env::var(API_KEY_VAR).ok())
    }
}

impl fmt::Debug for RemoteBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteBackend")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl DecisionBackend for RemoteBackend {
    fn complete(&self, request: &DecisionRequest<'_>) -> Result<String, AgentError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: request.system },
                ChatMessage { role: "user", content: request.prompt },
            ],
            temperature: request.temperature,
            max_tokens: MAX_TOKENS,
        };
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| AgentError::Unreachable(e.to_string()))?;
        parse_chat_reply(&read_body(response)?)
    }
}

/// Local vLLM server
#[derive(Debug)]
pub struct LocalBackend {
    client: Client,
    endpoint: String,
    model: String,
}

impl LocalBackend {
    pub fn new(params: &LocalLlmParams) -> Result<Self, AgentError> {
        Ok(Self {
            client: build_client(LOCAL_TIMEOUT)?,
            endpoint: params.endpoint.trim_end_matches('/').to_string(),
            model: params.model.clone(),
        })
    }

    /// Fail early when the server is not answering
    pub fn connect(params: &LocalLlmParams) -> Result<Self, AgentError> {
        let backend = Self::new(params)?;
        let url = format!("{}/v1/models", backend.endpoint);
        let response = backend
            .client
            .get(&url)
            .timeout(CONNECT_CHECK_TIMEOUT)
            .send()
            .map_err(|e| AgentError::Unreachable(format!("{}: {}", url, e)))?;
        read_body(response)?;
        Ok(backend)
    }
}

impl DecisionBackend for LocalBackend {
    fn complete(&self, request: &DecisionRequest<'_>) -> Result<String, AgentError> {
        let body = CompletionRequest {
            model: &self.model,
            prompt: request.prompt,
            temperature: request.temperature,
            max_tokens: MAX_TOKENS,
        };
        let response = self
            .client
            .post(format!("{}/v1/completions", self.endpoint))
            .json(&body)
            .send()
            .map_err(|e| AgentError::Unreachable(e.to_string()))?;
        parse_completion_reply(&read_body(response)?)
    }
}
