//! Query responder: answers one natural-language question about a
//! previously ingested manual.
//!
//! Stateless by design. Every call re-attaches the caller-supplied file
//! handle; the illusion of a conversation is created entirely by the
//! caller resubmitting the same handle, never by server-held history. A
//! handle the provider no longer recognizes is reported as stale so the
//! caller knows to re-ingest rather than retry the question.

#![allow(clippy::missing_docs_in_private_items)]

use common::{error::AppError, types::file_handle::FileHandle};
use gemini_client::generate::{FileReference, GenerateOutcome};
use gemini_client::GeminiClient;
use tracing::info;

/// Instruction framing the model as a support assistant restricted to the
/// supplied manual's content.
const SYSTEM_PROMPT: &str = "You are a specialized technical product support assistant.\n\
You have access to the specific product manual uploaded by the user.\n\
Answer questions strictly based on the provided file content.\n\
If the answer is not in the file, politely state that the information is missing from the manual.\n\
Be concise, accurate, and helpful. Format technical information clearly.";

const MANUAL_MIME_TYPE: &str = "application/pdf";

/// A completed query. `NoAnswer` is a normal outcome, not an error: the
/// provider finished but declined to produce text, and the caller owes
/// the user a specific message instead of an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Answer(String),
    NoAnswer { reason: String },
}

#[derive(Clone)]
pub struct QueryResponder {
    gemini: GeminiClient,
}

impl QueryResponder {
    pub fn new(gemini: GeminiClient) -> Self {
        Self { gemini }
    }

    /// Answer `question` using only the manual behind `handle`.
    /// Validation failures are raised before any outbound call.
    pub async fn ask(
        &self,
        question: &str,
        handle: &FileHandle,
    ) -> Result<QueryOutcome, AppError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation(
                "Missing user_message parameter".to_string(),
            ));
        }
        if !handle.is_well_formed() {
            return Err(AppError::Validation(
                "file_uri and file_name are required".to_string(),
            ));
        }

        info!(
            file = %handle.file_id,
            question_chars = question.len(),
            "Submitting grounded question"
        );

        let outcome = self
            .gemini
            .generate(
                SYSTEM_PROMPT,
                question,
                Some(FileReference {
                    uri: &handle.file_uri,
                    mime_type: MANUAL_MIME_TYPE,
                }),
            )
            .await?;

        Ok(match outcome {
            GenerateOutcome::Answer(text) => QueryOutcome::Answer(normalize_answer(&text)),
            GenerateOutcome::Blocked { reason } => QueryOutcome::NoAnswer { reason },
        })
    }
}

/// Whitespace normalization only; the provider's text is otherwise
/// returned verbatim.
fn normalize_answer(text: &str) -> String {
    text.replace('\r', "").trim().to_string()
}
