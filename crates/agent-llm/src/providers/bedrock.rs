//! AWS Bedrock runtime client (Converse API)
//!
//! Talks to `POST https://bedrock-runtime.{region}.amazonaws.com/model/{model}/converse`
//! with SigV4-signed requests. Credentials come either from the standard AWS
//! environment variables or from a profile in the shared credentials file.
//! See: https://docs.aws.amazon.com/bedrock/latest/APIReference/API_runtime_Converse.html

use super::sigv4;
use crate::{
    CompletionRequest, CompletionResponse, ContentBlock, LLMError, LLMProvider, Message,
    MessageContent, Result, Role, StopReason, TokenUsage, ToolDefinition,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_BEDROCK_REGION: &str = "us-east-1";
const SERVICE: &str = "bedrock";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Static AWS credentials
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Load credentials through a variable lookup
    ///
    /// `AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY` win when both are set.
    /// Otherwise the profile named by `AWS_PROFILE` (default `default`) is read
    /// from `AWS_SHARED_CREDENTIALS_FILE` or `~/.aws/credentials`. Empty
    /// values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let (Some(key), Some(secret)) = (var("AWS_ACCESS_KEY_ID"), var("AWS_SECRET_ACCESS_KEY"))
        {
            return Ok(Self {
                access_key_id: key,
                secret_access_key: secret,
                session_token: var("AWS_SESSION_TOKEN"),
            });
        }

        let path = match var("AWS_SHARED_CREDENTIALS_FILE") {
            Some(path) => PathBuf::from(path),
            None => {
                let home = var("HOME").or_else(|| var("USERPROFILE")).ok_or_else(|| {
                    LLMError::CredentialsError(
                        "No AWS credentials in the environment and no home directory to look in"
                            .to_string(),
                    )
                })?;
                PathBuf::from(home).join(".aws").join("credentials")
            }
        };
        let profile = var("AWS_PROFILE").unwrap_or_else(|| "default".to_string());

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            LLMError::CredentialsError(format!("Cannot read {}: {e}", path.display()))
        })?;
        Self::from_credentials_file(&contents, &profile)
    }

    /// Parse a profile out of a shared credentials file (INI format)
    pub fn from_credentials_file(contents: &str, profile: &str) -> Result<Self> {
        let mut in_profile = false;
        let mut key = None;
        let mut secret = None;
        let mut token = None;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                in_profile = section.trim() == profile;
                continue;
            }
            if !in_profile {
                continue;
            }
            if let Some((name, value)) = line.split_once('=') {
                let value = value.trim().to_string();
                match name.trim() {
                    "aws_access_key_id" => key = Some(value),
                    "aws_secret_access_key" => secret = Some(value),
                    "aws_session_token" => token = Some(value),
                    _ => {}
                }
            }
        }

        match (key, secret) {
            (Some(access_key_id), Some(secret_access_key))
                if !access_key_id.is_empty() && !secret_access_key.is_empty() =>
            {
                Ok(Self {
                    access_key_id,
                    secret_access_key,
                    session_token: token.filter(|t| !t.is_empty()),
                })
            }
            _ => Err(LLMError::CredentialsError(format!(
                "Profile '{profile}' has no complete access key pair"
            ))),
        }
    }
}

/// Region from `AWS_REGION`, then `AWS_DEFAULT_REGION`
pub fn region_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    ["AWS_REGION", "AWS_DEFAULT_REGION"]
        .into_iter()
        .find_map(|name| lookup(name).filter(|v| !v.trim().is_empty()))
}

/// Configuration for the Bedrock runtime client
#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub region: String,

    /// Override for the runtime endpoint (e.g. a VPC endpoint)
    pub endpoint: Option<String>,

    pub timeout_secs: u64,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_BEDROCK_REGION.to_string(),
            endpoint: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl BedrockConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into().trim_end_matches('/').to_string());
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://bedrock-runtime.{}.amazonaws.com", self.region))
    }

    /// Converse URL for a model; the model id is percent-encoded once
    pub fn converse_url(&self, model: &str) -> Result<Url> {
        let raw = format!("{}/model/{}/converse", self.endpoint(), sigv4::uri_encode(model));
        Url::parse(&raw)
            .map_err(|e| LLMError::ConfigurationError(format!("Invalid Bedrock URL '{raw}': {e}")))
    }
}

/// Bedrock runtime client
pub struct BedrockProvider {
    client: Client,
    config: BedrockConfig,
    credentials: AwsCredentials,
}

impl BedrockProvider {
    pub fn new(config: BedrockConfig, credentials: AwsCredentials) -> Result<Self> {
        if config.region.trim().is_empty() {
            return Err(LLMError::ConfigurationError(
                "Bedrock region is empty".to_string(),
            ));
        }
        // Fail now rather than on the first request
        config.converse_url("probe")?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    pub fn config(&self) -> &BedrockConfig {
        &self.config
    }
}

#[async_trait]
impl LLMProvider for BedrockProvider {
    #[instrument(skip(self, request), fields(region = %self.config.region, model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let url = self.config.converse_url(&request.model)?;
        let model = request.model.clone();
        let body = serde_json::to_vec(&build_converse_request(request))?;

        let signed = sigv4::sign_post(
            &self.credentials,
            &self.config.region,
            SERVICE,
            &url,
            &body,
            chrono::Utc::now(),
        )?;

        debug!("Sending Converse request");
        let mut builder = self.client.post(url).body(body);
        for (name, value) in signed.iter() {
            builder = builder.header(name, value);
        }
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await?;
            return Err(LLMError::from_status(status, error_text, &model));
        }

        let converse: ConverseResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse Converse response: {e}"))
        })?;
        parse_converse_response(converse)
    }

    fn name(&self) -> &str {
        "bedrock"
    }
}

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConverseRequest {
    messages: Vec<ConverseMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    system: Vec<SystemBlock>,
    inference_config: InferenceConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ToolConfig>,
}

#[derive(Debug, Serialize)]
struct ConverseMessage {
    role: &'static str,
    content: Vec<ConverseBlock>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum ConverseBlock {
    Text(String),
    ToolUse(ToolUseBlock),
    ToolResult(ToolResultBlock),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolUseBlock {
    tool_use_id: String,
    name: String,
    input: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolResultBlock {
    tool_use_id: String,
    content: Vec<TextBlock>,
    status: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextBlock {
    text: String,
}

type SystemBlock = TextBlock;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InferenceConfig {
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ToolConfig {
    tools: Vec<ToolEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolEntry {
    tool_spec: ToolSpec,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSpec {
    name: String,
    description: String,
    input_schema: InputSchema,
}

#[derive(Debug, Serialize)]
struct InputSchema {
    json: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConverseResponse {
    output: ConverseOutput,
    stop_reason: String,
    #[serde(default)]
    usage: Option<ConverseUsage>,
}

#[derive(Debug, Deserialize)]
struct ConverseOutput {
    message: Option<ConverseResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ConverseResponseMessage {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

/// Unknown block kinds (e.g. reasoning content) deserialize to all-`None`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBlock {
    text: Option<String>,
    tool_use: Option<ToolUseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConverseUsage {
    input_tokens: usize,
    output_tokens: usize,
}

// Conversion

fn build_converse_request(request: CompletionRequest) -> ConverseRequest {
    let mut system: Vec<SystemBlock> = request
        .system
        .into_iter()
        .filter(|s| !s.is_empty())
        .map(|text| TextBlock { text })
        .collect();
    let mut messages: Vec<ConverseMessage> = Vec::new();

    for msg in request.messages {
        if msg.role == Role::System {
            if let Some(text) = msg.text() {
                system.push(TextBlock { text });
            }
            continue;
        }
        let role = if msg.role == Role::User { "user" } else { "assistant" };
        let content = convert_content(msg.content);
        if content.is_empty() {
            continue;
        }
        // Converse rejects two consecutive messages with the same role
        match messages.last_mut() {
            Some(last) if last.role == role => last.content.extend(content),
            _ => messages.push(ConverseMessage { role, content }),
        }
    }

    ConverseRequest {
        messages,
        system,
        inference_config: InferenceConfig {
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stop_sequences: request.stop_sequences,
        },
        tool_config: request.tools.as_deref().map(convert_tools),
    }
}

fn convert_content(content: Option<MessageContent>) -> Vec<ConverseBlock> {
    match content {
        None => Vec::new(),
        Some(MessageContent::Text(text)) if text.is_empty() => Vec::new(),
        Some(MessageContent::Text(text)) => vec![ConverseBlock::Text(text)],
        Some(MessageContent::Blocks(blocks)) => blocks
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } if text.is_empty() => None,
                ContentBlock::Text { text } => Some(ConverseBlock::Text(text)),
                ContentBlock::ToolUse { id, name, input } => {
                    Some(ConverseBlock::ToolUse(ToolUseBlock {
                        tool_use_id: id,
                        name,
                        input,
                    }))
                }
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => Some(ConverseBlock::ToolResult(ToolResultBlock {
                    tool_use_id,
                    content: vec![TextBlock { text: content }],
                    status: if is_error == Some(true) {
                        "error"
                    } else {
                        "success"
                    },
                })),
            })
            .collect(),
    }
}

fn convert_tools(tools: &[ToolDefinition]) -> ToolConfig {
    ToolConfig {
        tools: tools
            .iter()
            .map(|tool| ToolEntry {
                tool_spec: ToolSpec {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    input_schema: InputSchema {
                        json: tool.input_schema.clone(),
                    },
                },
            })
            .collect(),
    }
}

fn parse_converse_response(response: ConverseResponse) -> Result<CompletionResponse> {
    let message = response.output.message.ok_or_else(|| {
        LLMError::UnexpectedResponse("Converse response has no output message".to_string())
    })?;

    let blocks: Vec<ContentBlock> = message
        .content
        .into_iter()
        .filter_map(|block| match (block.text, block.tool_use) {
            (_, Some(tool)) => Some(ContentBlock::ToolUse {
                id: tool.tool_use_id,
                name: tool.name,
                input: tool.input,
            }),
            (Some(text), None) => Some(ContentBlock::Text { text }),
            (None, None) => None,
        })
        .collect();

    let stop_reason = match response.stop_reason.as_str() {
        "tool_use" => StopReason::ToolUse,
        "max_tokens" => StopReason::MaxTokens,
        "stop_sequence" => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    };
    let usage = response
        .usage
        .map(|u| TokenUsage {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        message: Message::assistant_blocks(blocks),
        stop_reason,
        usage,
    })
}
