//! Tag Generation Endpoint
//!
//! Pipeline per request:
//! Validate → CacheLookup → ConfigCheck → Generate → Validate+Normalize
//! → Success | Fallback.
//!
//! Every failure from the provider call onward terminates in the static
//! fallback branch inside a 200 response with `fallback: true`. No
//! retries anywhere in this pipeline. Only missing or invalid request
//! fields produce a 400.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use super::{AppState, ErrorBody};
use crate::ai::prompt;
use crate::ai::provider::SharedProvider;
use crate::ai::validation::TagValidator;
use crate::cache::request_key;
use crate::tags::fallback::fallback_tags;
use crate::tags::{Stage, TagGroups, TagRequest, TagResponse};
use crate::types::Result;

/// Message attached to fallback responses; informational, the client
/// shows it as a banner rather than an error
const FALLBACK_MESSAGE: &str = "Showing built-in suggestions while AI suggestions are unavailable";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTagsBody {
    pub topic: Option<String>,
    pub intent: Option<String>,
    pub persona: Option<String>,
    /// Generation stage; defaults to the initial stage
    pub stage: Option<u8>,
    /// Tags the user already selected
    #[serde(default)]
    pub selected_tags: Vec<String>,
    /// Tags currently shown but not selected
    #[serde(default)]
    pub visible_tags: Vec<String>,
}

/// `POST /api/tags/generate`
pub async fn generate_tags(
    State(state): State<AppState>,
    Json(body): Json<GenerateTagsBody>,
) -> Response {
    match parse_request(body) {
        Ok(request) => Json(handle(&state, request).await).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(e.to_string())),
        )
            .into_response(),
    }
}

/// Validate the wire body into a domain request. Failure means 400.
fn parse_request(body: GenerateTagsBody) -> Result<TagRequest> {
    let topic = body
        .topic
        .ok_or_else(|| crate::types::LoomError::Validation("Missing field: topic".to_string()))?;
    let intent = body
        .intent
        .ok_or_else(|| crate::types::LoomError::Validation("Missing field: intent".to_string()))?
        .parse()?;
    let persona = body
        .persona
        .ok_or_else(|| crate::types::LoomError::Validation("Missing field: persona".to_string()))?
        .parse()?;
    let stage = Stage::try_from(body.stage.unwrap_or(1))?;

    // Both selected and merely visible tags count as already suggested
    let mut existing_tags = body.selected_tags;
    existing_tags.extend(body.visible_tags);

    let request = TagRequest {
        topic,
        intent,
        persona,
        stage,
        existing_tags,
    };
    request.validate()?;
    Ok(request)
}

/// Run the generation pipeline. Never fails: every error path resolves
/// to the deterministic fallback payload.
pub(crate) async fn handle(state: &AppState, request: TagRequest) -> TagResponse {
    let key = request_key(&request);

    if let Some(hit) = state.cache.get(&key) {
        return exclude_existing(hit, &request.existing_tags);
    }

    let Some(provider) = &state.provider else {
        info!("No provider configured, serving fallback tags");
        return fallback_response(&request);
    };

    match generate_once(provider, &request).await {
        Ok(groups) => {
            let response = TagResponse::generated(groups);
            state.cache.put(key, response.clone());
            response
        }
        Err(e) => {
            warn!(error = %e, "Tag generation failed, serving fallback tags");
            fallback_response(&request)
        }
    }
}

/// One provider call plus validation; no retry on failure
async fn generate_once(provider: &SharedProvider, request: &TagRequest) -> Result<TagGroups> {
    let (prompt_text, schema) = prompt::tag_generation(request);
    let response = provider.generate(&prompt_text, &schema).await?;
    TagValidator::new().validate(&response.content, &request.existing_tags)
}

/// Drop tags the caller already holds from a cached response.
///
/// The cache key deliberately ignores `existing_tags`, so a hit may
/// contain entries the same caller received in an earlier stage.
fn exclude_existing(mut response: TagResponse, existing_tags: &[String]) -> TagResponse {
    if existing_tags.is_empty() {
        return response;
    }

    let held = |tag: &str| {
        existing_tags
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(tag))
    };
    response.tags.retain(|tag| !held(tag));
    for tags in response.groups.values_mut() {
        tags.retain(|tag| !held(tag));
    }
    response.groups.retain(|_, tags| !tags.is_empty());
    response
}

fn fallback_response(request: &TagRequest) -> TagResponse {
    TagResponse::fallback(
        fallback_tags(request.stage.target_count(), &request.existing_tags),
        FALLBACK_MESSAGE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{LlmProvider, LlmResponse, ResponseMetadata};
    use crate::cache::ResponseCache;
    use crate::config::Config;
    use crate::tags::{Intent, Persona};
    use crate::types::{LoomError, Result};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        payload: Result<Value>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn ok(payload: Value) -> Arc<Self> {
            Arc::new(Self {
                payload: Ok(payload),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                payload: Err(LoomError::LlmApi("boom".to_string())),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn generate(&self, _prompt: &str, _schema: &Value) -> Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.payload {
                Ok(value) => Ok(LlmResponse {
                    content: value.clone(),
                    elapsed_ms: 1,
                    metadata: ResponseMetadata::default(),
                }),
                Err(e) => Err(LoomError::LlmApi(e.to_string())),
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

    fn state_with(provider: Option<Arc<MockProvider>>) -> AppState {
        AppState {
            provider: provider.map(|p| p as SharedProvider),
            cache: Arc::new(ResponseCache::default()),
            config: Arc::new(Config::default()),
        }
    }

    fn request() -> TagRequest {
        TagRequest {
            topic: "Photosynthesis for class 10".to_string(),
            intent: Intent::Learn,
            persona: Persona::Student,
            stage: Stage::Initial,
            existing_tags: vec![],
        }
    }

    fn tag_payload() -> Value {
        json!({
            "role": ["act as science teacher"],
            "task": ["explain key concepts simply"],
            "reasoning": ["think step by step"]
        })
    }

    #[tokio::test]
    async fn test_successful_generation() {
        let provider = MockProvider::ok(tag_payload());
        let state = state_with(Some(provider));

        let response = handle(&state, request()).await;
        assert!(response.success);
        assert!(!response.fallback);
        assert_eq!(response.tags.len(), 3);
        for tag in &response.tags {
            let words = tag.split_whitespace().count();
            assert!((3..=4).contains(&words));
        }
    }

    #[tokio::test]
    async fn test_repeat_request_served_from_cache() {
        let provider = MockProvider::ok(tag_payload());
        let state = state_with(Some(provider.clone()));

        handle(&state, request()).await;
        handle(&state, request()).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_fallback() {
        let provider = MockProvider::failing();
        let state = state_with(Some(provider));

        let response = handle(&state, request()).await;
        assert!(response.success);
        assert!(response.fallback);
        assert_eq!(response.tags.len(), Stage::Initial.target_count());
        assert!(response.message.is_some());
    }

    #[tokio::test]
    async fn test_missing_credential_serves_fallback_not_error() {
        let state = state_with(None);

        let response = handle(&state, request()).await;
        assert!(response.success);
        assert!(response.fallback);
        assert_eq!(response.tags.len(), 3);
    }

    #[tokio::test]
    async fn test_zero_valid_tags_degrades_to_fallback() {
        let provider = MockProvider::ok(json!({"task": ["hi"]}));
        let state = state_with(Some(provider));

        let response = handle(&state, request()).await;
        assert!(response.fallback);
    }

    #[tokio::test]
    async fn test_fallback_responses_are_not_cached() {
        let provider = MockProvider::failing();
        let state = state_with(Some(provider.clone()));

        handle(&state, request()).await;
        handle(&state, request()).await;
        // Both attempts reach the provider since failures never populate
        // the cache
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_hit_filters_tags_caller_already_holds() {
        let provider = MockProvider::ok(tag_payload());
        let state = state_with(Some(provider.clone()));

        let mut first = request();
        first.stage = Stage::FollowUp;
        let initial = handle(&state, first.clone()).await;
        assert!(initial.tags.iter().any(|t| t == "Think Step By Step"));

        // Same cache key: existing tags are deliberately not part of it
        let mut second = first;
        second.existing_tags = vec!["think step by step".to_string()];
        let response = handle(&state, second).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(
            !response
                .tags
                .iter()
                .any(|t| t.eq_ignore_ascii_case("think step by step"))
        );
        assert!(
            !response
                .groups
                .values()
                .flatten()
                .any(|t| t.eq_ignore_ascii_case("think step by step"))
        );
    }

    #[test]
    fn test_parse_request_requires_fields() {
        let body = GenerateTagsBody {
            topic: None,
            intent: Some("learn".to_string()),
            persona: Some("student".to_string()),
            stage: Some(1),
            selected_tags: vec![],
            visible_tags: vec![],
        };
        assert!(parse_request(body).is_err());
    }

    #[test]
    fn test_parse_request_rejects_short_topic() {
        let body = GenerateTagsBody {
            topic: Some("abc".to_string()),
            intent: Some("learn".to_string()),
            persona: Some("student".to_string()),
            stage: None,
            selected_tags: vec![],
            visible_tags: vec![],
        };
        assert!(parse_request(body).is_err());
    }

    #[test]
    fn test_parse_request_merges_existing_tags() {
        let body = GenerateTagsBody {
            topic: Some("Photosynthesis".to_string()),
            intent: Some("learn".to_string()),
            persona: Some("teacher".to_string()),
            stage: Some(2),
            selected_tags: vec!["A B C".to_string()],
            visible_tags: vec!["D E F".to_string()],
        };
        let request = parse_request(body).unwrap();
        assert_eq!(request.stage, Stage::FollowUp);
        assert_eq!(request.existing_tags, vec!["A B C", "D E F"]);
    }
}
