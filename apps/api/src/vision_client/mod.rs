/// Vision Client — the single point of entry for all Claude API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All room analysis MUST go through this module.
///
/// Model: claude-sonnet-4-20250514 (hardcoded — do not make configurable to
/// prevent drift between environments)
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

use crate::models::preference::PlacementSuggestion;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all vision calls.
pub const MODEL: &str = "claude-sonnet-4-20250514";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Vision model returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ContentPart<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ImageSource<'a> {
    Url { url: &'a str },
}

#[derive(Debug, Deserialize)]
struct VisionResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

impl VisionResponse {
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The single vision client shared by all handlers. No retries: an upstream
/// failure is terminal for the request and the caller degrades to the
/// default placement instead.
#[derive(Clone)]
pub struct VisionClient {
    client: Client,
    api_key: String,
}

impl VisionClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Analyzes a room photo and returns a placement suggestion.
    ///
    /// Transport/API failures surface as `Err` so the handler can apply its
    /// degrade-to-default contract. An unparseable model response is NOT an
    /// error: the model answered, we just could not decode it, so the fixed
    /// centred placement is returned in its place.
    pub async fn analyze_room(&self, photo_url: &str) -> Result<PlacementSuggestion, VisionError> {
        let text = self.call_vision(photo_url).await?;
        let json = strip_json_fences(&text);

        match serde_json::from_str::<PlacementSuggestion>(json) {
            Ok(placement) => Ok(placement),
            Err(e) => {
                warn!("Failed to parse vision response ({e}); using default placement");
                debug!("Unparseable vision response: {text}");
                Ok(PlacementSuggestion::default_centered(
                    "Default center placement (failed to parse AI response)",
                ))
            }
        }
    }

    async fn call_vision(&self, photo_url: &str) -> Result<String, VisionError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            messages: vec![AnthropicMessage {
                role: "user",
                content: vec![
                    ContentPart::Image {
                        source: ImageSource::Url { url: photo_url },
                    },
                    ContentPart::Text {
                        text: prompts::ROOM_ANALYSIS_PROMPT,
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(VisionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let vision_response: VisionResponse = response.json().await?;
        vision_response
            .text()
            .map(String::from)
            .ok_or(VisionError::EmptyContent)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"x\": 35}\n```";
        assert_eq!(strip_json_fences(input), "{\"x\": 35}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"x\": 35}\n```";
        assert_eq!(strip_json_fences(input), "{\"x\": 35}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"x\": 35}";
        assert_eq!(strip_json_fences(input), "{\"x\": 35}");
    }

    #[test]
    fn test_placement_decodes_with_missing_optional_fields() {
        let json = r#"{"x": 20.0, "y": 30.0, "width": 25.0, "height": 25.0}"#;
        let placement: PlacementSuggestion = serde_json::from_str(json).unwrap();
        assert!(!placement.no_suitable_wall);
        assert!(placement.glass_areas.is_empty());
        assert_eq!(placement.x, 20.0);
    }

    #[test]
    fn test_placement_decodes_full_response() {
        let json = r#"{
            "glassAreas": [{"left": 0.0, "right": 40.0, "type": "french door"}],
            "solidWallSections": [{"left": 45.0, "right": 90.0, "width": 45.0}],
            "noSuitableWall": false,
            "x": 55.0, "y": 30.0, "width": 25.0, "height": 30.0,
            "recommendedAspect": "portrait",
            "recommendedFrame": "thin black",
            "needsMat": true,
            "reasoning": "Centered on the largest solid wall section"
        }"#;
        let placement: PlacementSuggestion = serde_json::from_str(json).unwrap();
        assert_eq!(placement.glass_areas.len(), 1);
        assert_eq!(placement.recommended_frame.as_deref(), Some("thin black"));
        assert!(placement.needs_mat);
    }
}
