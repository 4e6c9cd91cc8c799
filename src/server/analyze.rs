//! Prompt Analysis Endpoint
//!
//! Scores a learner-authored prompt and returns a structured rewrite.
//! Unlike tag generation there is no meaningful static substitute for a
//! personalized critique, so failures surface as distinct HTTP
//! statuses driven by the error classifier: 400 empty input, 500
//! missing credential, 401 auth-rejected, 429 rate limit, 403
//! permission, 503 connectivity, 500 otherwise.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::warn;

use super::{AppState, ErrorBody};
use crate::ai::prompt;
use crate::ai::validation::{PromptAnalysis, shape_analysis};
use crate::types::{ErrorClassifier, LoomError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
    pub student_prompt: Option<String>,
}

/// `POST /api/gemini/analyze`
pub async fn analyze_prompt(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeBody>,
) -> Response {
    let student_prompt = body.student_prompt.unwrap_or_default();
    if student_prompt.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("studentPrompt must not be empty")),
        )
            .into_response();
    }

    match handle(&state, &student_prompt).await {
        Ok(analysis) => Json(analysis).into_response(),
        Err(e) => error_response(&e),
    }
}

pub(crate) async fn handle(state: &AppState, student_prompt: &str) -> Result<PromptAnalysis> {
    let Some(provider) = &state.provider else {
        return Err(LoomError::Config(
            "Prompt analysis requires a configured API credential".to_string(),
        ));
    };

    let (prompt_text, schema) = prompt::prompt_analysis(student_prompt);
    let response = provider.generate(&prompt_text, &schema).await?;
    shape_analysis(&response.content, student_prompt)
}

/// Map a pipeline error to the closest HTTP status.
///
/// Classification is advisory: provider error text is pattern-matched,
/// so this is best-effort diagnostics rather than a provider contract.
fn error_response(error: &LoomError) -> Response {
    let (status, body) = match error {
        // Missing credential is a server configuration problem
        LoomError::Config(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new(msg.clone()),
        ),
        _ => {
            let classified = ErrorClassifier::classify_loom_error(error, "gemini");
            let status = StatusCode::from_u16(classified.category.client_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (
                status,
                ErrorBody::with_details("Prompt analysis failed", classified.message),
            )
        }
    };

    warn!(status = %status, error = %body.error, "Analysis request failed");
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{LlmProvider, LlmResponse, ResponseMetadata, SharedProvider};
    use crate::cache::ResponseCache;
    use crate::config::Config;
    use crate::types::{ErrorCategory, LlmError};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Arc;

    struct MockProvider {
        result: std::result::Result<Value, LlmError>,
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn generate(&self, _prompt: &str, _schema: &Value) -> Result<LlmResponse> {
            match &self.result {
                Ok(value) => Ok(LlmResponse {
                    content: value.clone(),
                    elapsed_ms: 1,
                    metadata: ResponseMetadata::default(),
                }),
                Err(e) => Err(LoomError::Llm(e.clone())),
            }
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn state_with(result: Option<std::result::Result<Value, LlmError>>) -> AppState {
        AppState {
            provider: result.map(|r| Arc::new(MockProvider { result: r }) as SharedProvider),
            cache: Arc::new(ResponseCache::default()),
            config: Arc::new(Config::default()),
        }
    }

    #[tokio::test]
    async fn test_successful_analysis() {
        let state = state_with(Some(Ok(json!({
            "score": 65,
            "feedback": "Add audience context.",
            "improvedPrompt": {"task": "Explain photosynthesis simply"}
        }))));

        let analysis = handle(&state, "explain photosynthesis").await.unwrap();
        assert_eq!(analysis.score, 65);
        assert_eq!(
            analysis.improved_prompt.task,
            "Explain photosynthesis simply"
        );
    }

    #[tokio::test]
    async fn test_missing_credential_is_config_error() {
        let state = state_with(None);
        let result = handle(&state, "prompt").await;
        assert!(matches!(result, Err(LoomError::Config(_))));
    }

    #[tokio::test]
    async fn test_rate_limit_surfaces_as_llm_error() {
        let state = state_with(Some(Err(LlmError::with_provider(
            ErrorCategory::RateLimit,
            "quota exceeded",
            "gemini",
        ))));

        match handle(&state, "prompt").await {
            Err(LoomError::Llm(e)) => assert_eq!(e.category.client_status(), 429),
            other => panic!("unexpected result: {:?}", other.map(|a| a.score)),
        }
    }

    #[tokio::test]
    async fn test_malformed_payload_is_validation_error() {
        let state = state_with(Some(Ok(json!({"unexpected": true}))));
        assert!(handle(&state, "prompt").await.is_err());
    }
}
