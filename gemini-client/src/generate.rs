//! Single-turn content generation scoped to an uploaded file.

use common::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classify::{classify_provider_error, CallKind};
use crate::GeminiClient;

/// Result of a generation call that reached the provider and got a
/// well-formed reply. A blocked or empty generation is a normal outcome,
/// not an error: the caller owes the user a specific message for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    Answer(String),
    Blocked { reason: String },
}

/// File attachment for a generation request, referenced by provider URI.
#[derive(Debug, Clone)]
pub struct FileReference<'a> {
    pub uri: &'a str,
    pub mime_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Instruction<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Instruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileData<'a> {
    mime_type: &'a str,
    file_uri: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    /// Submit one user turn, optionally grounded in an uploaded file, and
    /// return the generated text or the reason generation was withheld.
    pub async fn generate(
        &self,
        system_instruction: &str,
        user_text: &str,
        file: Option<FileReference<'_>>,
    ) -> Result<GenerateOutcome, AppError> {
        let mut parts = Vec::with_capacity(2);
        if let Some(file) = &file {
            parts.push(Part {
                text: None,
                file_data: Some(FileData {
                    mime_type: file.mime_type,
                    file_uri: file.uri,
                }),
            });
        }
        parts.push(Part {
            text: Some(user_text),
            file_data: None,
        });

        let request = GenerateRequest {
            system_instruction: Instruction {
                parts: vec![Part {
                    text: Some(system_instruction),
                    file_data: None,
                }],
            },
            contents: vec![Content {
                role: "user",
                parts,
            }],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .authed(self.http.post(url))
            .timeout(self.chat_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::UpstreamTimeout(format!("generation timed out: {e}"))
                } else {
                    AppError::Reqwest(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_provider_error(status, &body, CallKind::Generate));
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            AppError::UpstreamUnavailable(format!("malformed generation response: {e}"))
        })?;

        Ok(extract_outcome(generated))
    }
}

fn extract_outcome(response: GenerateResponse) -> GenerateOutcome {
    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            warn!(%reason, "Provider blocked the prompt");
            return GenerateOutcome::Blocked {
                reason: reason.clone(),
            };
        }
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return GenerateOutcome::Blocked {
            reason: "provider returned no candidates".to_string(),
        };
    };

    let text = candidate
        .content
        .unwrap_or_default()
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "empty generation".to_string());
        return GenerateOutcome::Blocked { reason };
    }

    debug!(chars = text.len(), "Extracted generation text");
    GenerateOutcome::Answer(text)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}
