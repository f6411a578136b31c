use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Settings;
use crate::models::TestKind;

use super::{
    ApiResponse, AttemptTestDto, DetailedResultDto, Gateway, GatewayError, MockTestSummary,
    SaveAttemptRequest, SaveScoreRequest, ScoreQuery, ScoreRecord,
};

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Gateway backed by the backend's REST API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGateway {
    pub fn from_settings(settings: &Settings) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(seconds) = settings.api().timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: settings.api().base_url.trim_end_matches('/').to_string(),
            token: settings.api().token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }

    async fn read_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GatewayError> {
        let response = self.send(request).await?;
        let body = response
            .text()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        serde_json::from_str(&body)
            .map_err(|err| GatewayError::Decode(format!("{}: {}", err, truncate(&body))))
    }
}

/// Path prefix of the admin-side mock test routes for each catalog.
fn test_prefix(kind: TestKind) -> &'static str {
    match kind {
        TestKind::Paid => "/api/admin/mocktests",
        TestKind::Free => "/api/admin/Free/mocktests",
    }
}

fn catalog_path(kind: TestKind) -> &'static str {
    match kind {
        TestKind::Paid => "/api/user/mocktests",
        TestKind::Free => "/api/user/free/mocktests",
    }
}

fn status_error(status: StatusCode, body: &str) -> GatewayError {
    let message = extract_error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Unauthorized,
        StatusCode::NOT_FOUND => GatewayError::NotFound(message),
        _ => GatewayError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

fn extract_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(message) = parsed.get(key).and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }
    truncate(body)
}

fn truncate(body: &str) -> String {
    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        let truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}...", truncated)
    } else {
        body.to_string()
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn start_attempt(
        &self,
        kind: TestKind,
        mock_test_id: u64,
        user_id: u64,
    ) -> Result<AttemptTestDto, GatewayError> {
        let url = self.url(&format!("{}/{}/attempt", test_prefix(kind), mock_test_id));
        tracing::debug!(%url, "starting attempt");

        let request = self
            .client
            .post(url)
            .query(&[("userId", user_id.to_string())]);
        let response: ApiResponse<AttemptTestDto> = self.read_json(request).await?;
        Ok(response.data)
    }

    async fn calculate_score(&self, query: &ScoreQuery) -> Result<f64, GatewayError> {
        let url = self.url(&format!(
            "{}/{}/calculate-score",
            test_prefix(query.kind),
            query.mock_test_id
        ));
        tracing::debug!(%url, answered = query.answers.len(), "calculating score");

        let request = self
            .client
            .post(url)
            .query(&[("userId", query.user_id.to_string())])
            .json(&query.answers);
        let response: ApiResponse<f64> = self.read_json(request).await?;
        Ok(response.data)
    }

    async fn detailed_results(
        &self,
        query: &ScoreQuery,
    ) -> Result<Vec<DetailedResultDto>, GatewayError> {
        let url = self.url(&format!(
            "{}/{}/results",
            test_prefix(query.kind),
            query.mock_test_id
        ));
        tracing::debug!(%url, "fetching detailed results");

        let request = self
            .client
            .post(url)
            .query(&[("userId", query.user_id.to_string())])
            .json(&query.answers);
        let response: ApiResponse<Vec<DetailedResultDto>> = self.read_json(request).await?;
        Ok(response.data)
    }

    async fn save_attempt(&self, request: &SaveAttemptRequest) -> Result<(), GatewayError> {
        let url = self.url("/api/attempts");
        tracing::debug!(%url, time_taken = request.time_taken, "saving attempt");

        self.send(self.client.post(url).json(request)).await?;
        Ok(())
    }

    async fn save_score(&self, request: &SaveScoreRequest) -> Result<ScoreRecord, GatewayError> {
        let url = self.url("/api/scores");
        tracing::debug!(%url, score = request.score, "saving score");

        let builder = self.client.post(url).query(&[
            ("userId", request.user_id.to_string()),
            ("mockTestId", request.mock_test_id.to_string()),
            ("mockTestTitle", request.mock_test_title.clone()),
            ("score", request.score.to_string()),
        ]);
        self.read_json(builder).await
    }

    async fn list_tests(&self, kind: TestKind) -> Result<Vec<MockTestSummary>, GatewayError> {
        let request = self.client.get(self.url(catalog_path(kind)));
        let response: ApiResponse<Vec<MockTestSummary>> = self.read_json(request).await?;
        Ok(response.data)
    }

    async fn user_scores(&self, user_id: u64) -> Result<Vec<ScoreRecord>, GatewayError> {
        let request = self
            .client
            .get(self.url(&format!("/api/scores/user/{}", user_id)));
        self.read_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            GatewayError::Unauthorized
        );
        assert_eq!(
            status_error(StatusCode::NOT_FOUND, r#"{"message":"Mock test not found"}"#),
            GatewayError::NotFound("Mock test not found".to_string())
        );
        assert_eq!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            GatewayError::Status {
                status: 500,
                message: "boom".to_string()
            }
        );
    }

    #[test]
    fn test_error_body_is_truncated() {
        let body = "x".repeat(500);
        let message = extract_error_message(&body);
        assert_eq!(message.chars().count(), MAX_ERROR_BODY_CHARS + 3);
        assert!(message.ends_with("..."));
    }

    #[test]
    fn test_route_prefixes() {
        assert_eq!(test_prefix(TestKind::Paid), "/api/admin/mocktests");
        assert_eq!(test_prefix(TestKind::Free), "/api/admin/Free/mocktests");
        assert_eq!(catalog_path(TestKind::Free), "/api/user/free/mocktests");
    }
}
