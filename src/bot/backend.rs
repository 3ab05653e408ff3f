//! Client side of the resource service's HTTP routes.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::{Course, ErrorResponse};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("resource service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("resource service answered {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("invalid resource service url {0}")]
    InvalidBaseUrl(String),
}

impl BackendError {
    /// Short reason suitable for showing to a user.
    pub fn user_reason(&self) -> &str {
        match self {
            BackendError::Status { reason, .. } => reason,
            BackendError::Transport(_) | BackendError::InvalidBaseUrl(_) => {
                "the resource service could not be reached"
            }
        }
    }
}

/// A resource row as the service returns it. `resource_data` is kept as raw
/// JSON; it is decoded with [`crate::references::decode_references`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ResourceRow {
    pub id: i32,
    pub course_code: String,
    pub resource_type: String,
    #[serde(default)]
    pub resource_data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResourceLookup {
    Found(Vec<ResourceRow>),
    /// The service reported no rows for the pair.
    NotFound,
}

#[async_trait]
pub trait ResourceApi: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<Course>, BackendError>;

    async fn get_resources(
        &self,
        course_code: &str,
        resource_type: &str,
    ) -> Result<ResourceLookup, BackendError>;

    async fn add_resource(
        &self,
        course_code: &str,
        resource_type: &str,
        resource_data: &str,
    ) -> Result<(), BackendError>;
}

#[derive(Debug, Clone)]
pub struct HttpResourceApi {
    client: Client,
    base_url: Url,
}

impl HttpResourceApi {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let base_url =
            Url::parse(base_url).map_err(|_| BackendError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(HttpResourceApi {
            client: Client::new(),
            base_url,
        })
    }

    fn url(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn failure(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    BackendError::Status {
        status,
        reason: failure_reason(&body),
    }
}

/// Pulls the `error` field out of an error body, falling back to the raw text.
fn failure_reason(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse { error }) => error,
        Err(_) if body.trim().is_empty() => "no reason given".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl ResourceApi for HttpResourceApi {
    async fn list_courses(&self) -> Result<Vec<Course>, BackendError> {
        let response = self.client.get(self.url(&["get-courses"])?).send().await?;
        if !response.status().is_success() {
            return Err(failure(response).await);
        }
        Ok(response.json().await?)
    }

    async fn get_resources(
        &self,
        course_code: &str,
        resource_type: &str,
    ) -> Result<ResourceLookup, BackendError> {
        let url = self.url(&["get-resources", course_code, resource_type])?;
        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(ResourceLookup::NotFound),
            status if status.is_success() => Ok(ResourceLookup::Found(response.json().await?)),
            _ => Err(failure(response).await),
        }
    }

    async fn add_resource(
        &self,
        course_code: &str,
        resource_type: &str,
        resource_data: &str,
    ) -> Result<(), BackendError> {
        let url = self.url(&["add-resources", course_code, resource_type, "upload"])?;
        let response = self
            .client
            .post(url)
            .json(&json!({
                "course_code": course_code,
                "resource_type": resource_type,
                "resource_data": resource_data,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(failure(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_ok};

    #[test]
    fn builds_route_urls() {
        let api = assert_ok!(HttpResourceApi::new("http://backend:8000"));
        assert_eq!(
            assert_ok!(api.url(&["get-resources", "CS301", "notes"])).as_str(),
            "http://backend:8000/get-resources/CS301/notes"
        );

        let api = assert_ok!(HttpResourceApi::new("http://backend:8000/api/"));
        assert_eq!(
            assert_ok!(api.url(&["add-resources", "CS 301", "code", "upload"])).as_str(),
            "http://backend:8000/api/add-resources/CS%20301/code/upload"
        );
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert_err!(HttpResourceApi::new("not a url"));
        assert_err!(HttpResourceApi::new("mailto:someone@example.com"));
    }

    #[test]
    fn failure_reason_prefers_error_field() {
        assert_eq!(
            failure_reason(r#"{"error": "This file already exists in the database."}"#),
            "This file already exists in the database."
        );
        assert_eq!(failure_reason("Bad Gateway\n"), "Bad Gateway");
        assert_eq!(failure_reason(""), "no reason given");
    }

    #[test]
    fn resource_rows_tolerate_missing_or_null_data() {
        let rows: Vec<ResourceRow> = serde_json::from_str(
            r#"[
                {"id": 1, "course_code": "CS301", "resource_type": "notes", "resource_data": ["BQAC_1"]},
                {"id": 2, "course_code": "CS301", "resource_type": "notes", "resource_data": null},
                {"id": 3, "course_code": "CS301", "resource_type": "notes"}
            ]"#,
        )
        .unwrap();
        assert_eq!(rows[0].resource_data, json!(["BQAC_1"]));
        assert_eq!(rows[1].resource_data, Value::Null);
        assert_eq!(rows[2].resource_data, Value::Null);
    }
}
