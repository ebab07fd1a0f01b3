//! reqwest-backed evaluation client
//!
//! Sends preview requests to the evaluation service and maps raw HTTP
//! responses into the pipeline's error taxonomy:
//! - 2xx: arbitrary JSON payload; an optional top-level `validation` array
//!   is lifted into non-fatal warnings
//! - 401: `Unauthorized`, plus a poke at the optional [`Navigator`]
//! - 4xx/5xx with the validation-list content type: `Rejected`
//! - 4xx/5xx with a structured `{type, message, payload}` body: `Api`
//! - everything else: `Transport`
//!
//! Interpretation is a pure function over (status, content type, body) so
//! the mapping is testable without a socket.

use crate::navigator::Navigator;
use preview_core::driver::EvaluationClient;
use preview_core::error::{DefinitionIssue, PreviewError};
use preview_core::request::PreviewRequest;
use preview_core::session::PreviewResult;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// Content type the service uses for structured validation-error lists.
pub const VALIDATION_LIST_CONTENT_TYPE: &str = "application/vnd.entity.validation-list+json";

/// Configuration shared by the HTTP clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base URL, no trailing slash
    pub base_url: String,
    /// Transport timeout per request
    pub timeout: Duration,
}

impl ClientConfig {
    /// Config with a 30 second transport timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// With a transport timeout.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Evaluation client talking to the remote service over HTTP.
pub struct HttpEvaluationClient {
    http: reqwest::Client,
    config: ClientConfig,
    navigator: Option<Arc<dyn Navigator>>,
}

impl HttpEvaluationClient {
    /// Build a client from config.
    ///
    /// # Errors
    /// `PreviewError::Transport` when the underlying client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, PreviewError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(transport)?;
        Ok(Self {
            http,
            config,
            navigator: None,
        })
    }

    /// Install the shell's redirect-to-login capability.
    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    fn preview_url(&self) -> String {
        format!("{}/api/preview", self.config.base_url)
    }
}

#[async_trait::async_trait]
impl EvaluationClient for HttpEvaluationClient {
    async fn evaluate(&self, request: PreviewRequest) -> Result<PreviewResult, PreviewError> {
        tracing::debug!(kind = %request.kind(), url = %self.preview_url(), "dispatching preview request");

        let response = self
            .http
            .post(self.preview_url())
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let content_type = header_content_type(&response);
        let body = response.bytes().await.map_err(transport)?;

        let result = interpret_response(status, content_type.as_deref(), &body);
        if matches!(result, Err(PreviewError::Unauthorized)) {
            if let Some(navigator) = &self.navigator {
                tracing::warn!("evaluation rejected as unauthorized, redirecting to login");
                navigator.redirect_to_login();
            }
        }
        result
    }
}

/// Map a raw evaluation response into a preview outcome.
pub fn interpret_response(
    status: StatusCode,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<PreviewResult, PreviewError> {
    if status.is_success() {
        let payload: JsonValue = serde_json::from_slice(body)
            .map_err(|e| PreviewError::Transport(format!("malformed response body: {e}")))?;
        let validation = extract_validation(&payload);
        return Ok(PreviewResult {
            payload,
            validation,
        });
    }
    Err(interpret_failure(status, content_type, body))
}

/// Map a non-2xx response into the error taxonomy.
pub(crate) fn interpret_failure(
    status: StatusCode,
    content_type: Option<&str>,
    body: &[u8],
) -> PreviewError {
    if status == StatusCode::UNAUTHORIZED {
        return PreviewError::Unauthorized;
    }

    if content_type.is_some_and(|ct| ct.starts_with(VALIDATION_LIST_CONTENT_TYPE)) {
        if let Ok(issues) = serde_json::from_slice::<Vec<DefinitionIssue>>(body) {
            return PreviewError::Rejected(issues);
        }
    }

    if let Ok(body) = serde_json::from_slice::<ApiErrorBody>(body) {
        return PreviewError::Api {
            kind: body.kind,
            message: body.message,
            payload: body.payload,
        };
    }

    PreviewError::Transport(format!("unexpected status {status}"))
}

pub(crate) fn transport(error: reqwest::Error) -> PreviewError {
    PreviewError::Transport(error.to_string())
}

pub(crate) fn header_content_type(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
    #[serde(default)]
    payload: Option<JsonValue>,
}

/// Lift the optional `validation` array out of a successful payload.
///
/// Shape: `validation: [{messages: [{message: "..."}]}]`; anything that
/// does not match is ignored rather than failing the whole evaluation.
fn extract_validation(payload: &JsonValue) -> Vec<Vec<String>> {
    payload
        .get("validation")
        .and_then(JsonValue::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|entry| {
                    entry
                        .get("messages")
                        .and_then(JsonValue::as_array)
                        .map(|messages| {
                            messages
                                .iter()
                                .filter_map(|m| m.get("message").and_then(JsonValue::as_str))
                                .map(str::to_string)
                                .collect()
                        })
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: &JsonValue) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    #[test]
    fn success_passes_payload_through() {
        let payload = json!({"columns": ["a"], "data": [[1]]});
        let result =
            interpret_response(StatusCode::OK, Some("application/json"), &body(&payload)).unwrap();
        assert_eq!(result.payload, payload);
        assert!(result.validation.is_empty());
    }

    #[test]
    fn success_lifts_validation_messages() {
        let payload = json!({
            "data": [],
            "validation": [
                {"messages": [{"message": "selector is broad"}, {"message": "no index"}]},
                {"messages": []}
            ]
        });
        let result = interpret_response(StatusCode::OK, None, &body(&payload)).unwrap();
        assert_eq!(
            result.validation,
            vec![
                vec!["selector is broad".to_string(), "no index".to_string()],
                vec![]
            ]
        );
        assert!(result.has_warnings());
    }

    #[test]
    fn malformed_success_body_is_transport_error() {
        let result = interpret_response(StatusCode::OK, Some("application/json"), b"not json");
        assert!(matches!(result, Err(PreviewError::Transport(_))));
    }

    #[test]
    fn unauthorized_wins_over_body_shape() {
        let err = interpret_response(
            StatusCode::UNAUTHORIZED,
            Some("application/json"),
            &body(&json!({"type": "auth", "message": "expired"})),
        )
        .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn validation_list_content_type_maps_to_rejected() {
        let issues = json!([
            {"id": "V001", "message": "selector references unknown kind"},
            {"id": "V002", "message": "data section is empty"}
        ]);
        let err = interpret_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            Some(VALIDATION_LIST_CONTENT_TYPE),
            &body(&issues),
        )
        .unwrap_err();
        assert_eq!(err.issues().len(), 2);
        assert_eq!(err.issues()[0].id, "V001");
    }

    #[test]
    fn structured_error_body_maps_to_api_error() {
        let err = interpret_response(
            StatusCode::BAD_REQUEST,
            Some("application/json"),
            &body(&json!({"type": "bad_selector", "message": "nope", "payload": {"at": 3}})),
        )
        .unwrap_err();
        match err {
            PreviewError::Api {
                kind,
                message,
                payload,
            } => {
                assert_eq!(kind, "bad_selector");
                assert_eq!(message, "nope");
                assert_eq!(payload, Some(json!({"at": 3})));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn opaque_failure_maps_to_transport() {
        let err = interpret_response(StatusCode::BAD_GATEWAY, Some("text/html"), b"<html>")
            .unwrap_err();
        assert!(matches!(err, PreviewError::Transport(_)));
    }

    #[test]
    fn config_normalizes_trailing_slash() {
        let config = ClientConfig::new("http://svc:8080/");
        assert_eq!(config.base_url, "http://svc:8080");
    }
}
