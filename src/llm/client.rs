use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::oracle::SegmentOracle;
use super::prompts::{SYSTEM_PROMPT, build_planning_prompt};
use crate::models::{ContentContext, OracleProposal, Phase};

const TOOL_NAME: &str = "submit_lineup_plan";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Configuration for the Anthropic API client
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key (from ANTHROPIC_API_KEY env var)
    pub api_key: String,
    /// Model to use (LINEUP_MODEL env var overrides the default)
    pub model: String,
    /// Temperature (0-1, lower = more deterministic)
    pub temperature: f64,
    /// Maximum tokens in response
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .context("ANTHROPIC_API_KEY environment variable not set")?;
        let model = std::env::var("LINEUP_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, model))
    }

    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            temperature: 0.2,
            max_tokens: 2000,
        }
    }
}

/// Anthropic API client acting as the content-analysis oracle
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Ask for a lineup plan through a forced tool call
    pub async fn send_with_tool(&self, system: &str, user: &str) -> Result<OracleProposal> {
        let request = AnthropicToolRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: Some(self.config.temperature),
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
            tools: vec![lineup_tool()],
            tool_choice: Some(ToolChoice {
                choice_type: "tool".to_string(),
                name: TOOL_NAME.to_string(),
            }),
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error: {} - {}", status, body);
        }

        let response: AnthropicResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        for content in &response.content {
            if content.content_type == "tool_use" && content.name.as_deref() == Some(TOOL_NAME) {
                if let Some(input) = &content.input {
                    return serde_json::from_value(input.clone())
                        .context("Failed to parse tool input as OracleProposal");
                }
            }
        }

        anyhow::bail!("No tool_use response found")
    }
}

#[async_trait]
impl SegmentOracle for AnthropicClient {
    async fn propose(
        &self,
        context: &ContentContext,
        phase: Phase,
        total_minutes: u32,
    ) -> Result<OracleProposal> {
        let prompt = build_planning_prompt(context, phase, total_minutes)?;
        debug!("Planning prompt: {} chars", prompt.len());
        self.send_with_tool(SYSTEM_PROMPT, &prompt).await
    }
}

fn lineup_tool() -> Tool {
    Tool {
        name: TOOL_NAME.to_string(),
        description: "Submit the prioritized content plan for the episode".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "priority_stories": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "story": {"type": "string"},
                            "score": {"type": "integer", "minimum": 0, "maximum": 100},
                            "data_points": {"type": "array", "items": {"type": "string"}},
                            "source_refs": {"type": "array", "items": {"type": "string"}}
                        },
                        "required": ["story", "score"]
                    }
                },
                "segment_suggestions": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "topic": {"type": "string"},
                            "priority": {"type": "integer", "minimum": 0, "maximum": 100},
                            "suggested_duration_seconds": {"type": "integer", "minimum": 0},
                            "key_facts": {"type": "array", "items": {"type": "string"}},
                            "source_refs": {
                                "type": "array",
                                "items": {"type": "string"},
                                "description": "JSON key paths in the context the facts come from"
                            },
                            "tone_level": {"type": "integer", "minimum": 1, "maximum": 5},
                            "transition_cue": {"type": "string"}
                        },
                        "required": ["topic", "priority", "key_facts", "source_refs", "tone_level"]
                    }
                },
                "explosive_quotes": {"type": "array", "items": {"type": "string"}},
                "betting_highlights": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["priority_stories", "segment_suggestions"]
        }),
    }
}

#[derive(Debug, Serialize)]
struct AnthropicToolRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct Tool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_schema_requires_segments() {
        let tool = lineup_tool();
        assert_eq!(tool.name, TOOL_NAME);
        let required = tool.input_schema["required"].as_array().unwrap();
        assert!(required.iter().any(|r| r == "segment_suggestions"));
    }

    #[test]
    fn test_tool_input_parses_as_proposal() {
        let block: ContentBlock = serde_json::from_str(
            r#"{
                "type": "tool_use",
                "name": "submit_lineup_plan",
                "input": {
                    "priority_stories": [],
                    "segment_suggestions": [
                        {"topic": "Stakes", "priority": 80, "key_facts": ["A vs B"], "source_refs": ["game"], "tone_level": 4}
                    ]
                }
            }"#,
        )
        .unwrap();

        let proposal: OracleProposal = serde_json::from_value(block.input.unwrap()).unwrap();
        assert_eq!(proposal.segment_suggestions[0].topic, "Stakes");
    }
}
