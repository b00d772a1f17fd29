//! REST implementation of [`RemoteClient`].

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::models::{RecordId, RecordKind, SyncRecord};
use crate::util::compact_text;

use super::RemoteClient;

/// Remote client speaking JSON over `GET/POST/PUT/DELETE /api/<kind>[/<id>]`.
#[derive(Clone)]
pub struct HttpRemoteClient {
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpRemoteClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpRemoteClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpRemoteClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| Error::Config(format!("failed to build HTTP client: {error}")))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, kind: RecordKind) -> String {
        format!("{}/api/{}", self.base_url, kind.as_str())
    }

    fn record_url(&self, kind: RecordKind, id: &RecordId) -> String {
        format!(
            "{}/{}",
            self.collection_url(kind),
            urlencoding::encode(id.as_str())
        )
    }
}

impl RemoteClient for HttpRemoteClient {
    async fn list_all<T: SyncRecord>(&self) -> Result<Vec<T>> {
        let response = self
            .client
            .get(self.collection_url(T::KIND))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        // A collection the backend has never written to may not exist yet
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        read_json(response, T::KIND, None).await
    }

    async fn get_one<T: SyncRecord>(&self, id: &RecordId) -> Result<Option<T>> {
        let response = self
            .client
            .get(self.record_url(T::KIND, id))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(response, T::KIND, Some(id)).await.map(Some)
    }

    async fn create<T: SyncRecord>(&self, record: &T) -> Result<T> {
        let response = self
            .client
            .post(self.collection_url(T::KIND))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(record)
            .send()
            .await?;
        read_json(response, T::KIND, Some(record.id())).await
    }

    async fn update<T: SyncRecord>(&self, id: &RecordId, patch: &Value) -> Result<T> {
        let response = self
            .client
            .put(self.record_url(T::KIND, id))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(patch)
            .send()
            .await?;
        read_json(response, T::KIND, Some(id)).await
    }

    async fn delete(&self, kind: RecordKind, id: &RecordId) -> Result<()> {
        let response = self.client.delete(self.record_url(kind, id)).send().await?;
        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(status_error(status, kind, Some(id), &response.text().await.unwrap_or_default()))
    }
}

async fn read_json<T: DeserializeOwned>(
    response: Response,
    kind: RecordKind,
    id: Option<&RecordId>,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(status, kind, id, &body));
    }
    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|error| Error::Validation(format!("malformed {kind} payload: {error}")))
}

/// Map a non-success status onto the crate's error kinds.
fn status_error(status: StatusCode, kind: RecordKind, id: Option<&RecordId>, body: &str) -> Error {
    let message = parse_api_error(status, body);
    match status {
        StatusCode::NOT_FOUND => Error::NotFound(match id {
            Some(id) => format!("{kind}/{id}"),
            None => kind.to_string(),
        }),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::Validation(message),
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            Error::Network(message)
        }
        _ => Error::Remote {
            status: status.as_u16(),
            message,
        },
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpRemoteClient {
        HttpRemoteClient::new(&RemoteConfig::new("https://api.example.com/").unwrap()).unwrap()
    }

    #[test]
    fn urls_follow_rest_layout() {
        let client = client();
        assert_eq!(client.collection_url(RecordKind::Decks), "https://api.example.com/api/decks");
        assert_eq!(
            client.record_url(RecordKind::AppSettings, &RecordId::from("ui theme")),
            "https://api.example.com/api/app-settings/ui%20theme"
        );
    }

    #[test]
    fn parse_api_error_prefers_message_field() {
        let message = parse_api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"bad","message":"name is required"}"#,
        );
        assert_eq!(message, "name is required (400)");
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, "  "), "HTTP 502");
        assert_eq!(parse_api_error(StatusCode::IM_A_TEAPOT, "short"), "short (418)");
    }

    #[test]
    fn status_errors_are_classified() {
        let id = RecordId::from("g1");
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, RecordKind::Goals, Some(&id), ""),
            Error::NotFound(message) if message == "goals/g1"
        ));
        assert!(matches!(
            status_error(StatusCode::UNPROCESSABLE_ENTITY, RecordKind::Goals, None, ""),
            Error::Validation(_)
        ));
        assert!(status_error(StatusCode::SERVICE_UNAVAILABLE, RecordKind::Goals, None, "").is_network());
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, RecordKind::Goals, None, "boom"),
            Error::Remote { status: 500, .. }
        ));
    }
}
