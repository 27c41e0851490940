//! services/api/src/adapters/http_publisher.rs
//!
//! This module contains the HTTP adapter, which is the concrete implementation
//! of the `CoursePublisher` port used in deployment. It POSTs the finished course
//! as JSON to the configured course endpoint using `reqwest`.

use async_trait::async_trait;
use course_wizard_core::domain::Course;
use course_wizard_core::ports::{CoursePublisher, PortError, PortResult, PublishReceipt};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{error, info};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A publisher that hands courses to a remote HTTP endpoint.
#[derive(Clone)]
pub struct HttpPublisher {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpPublisher {
    /// Creates a new `HttpPublisher`.
    pub fn new(client: Client, endpoint: String, token: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            token,
        }
    }
}

/// The fields we read back from the endpoint's reply. Everything else is ignored.
#[derive(Deserialize, Default)]
struct PublishResponseBody {
    #[serde(default, alias = "_id", alias = "courseId")]
    id: Option<serde_json::Value>,
}

/// Maps a non-success status from the course endpoint onto a port error.
fn status_to_port_error(status: StatusCode, body: &str) -> PortError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PortError::Unauthorized,
        StatusCode::NOT_FOUND => PortError::NotFound("course endpoint".to_string()),
        _ if body.is_empty() => {
            PortError::Unexpected(format!("course endpoint returned {}", status))
        }
        _ => PortError::Unexpected(format!("course endpoint returned {}: {}", status, body)),
    }
}

/// Pulls the remote course id out of a reply body, accepting string or numeric ids.
fn course_id_from_body(body: &str) -> Option<String> {
    let parsed: PublishResponseBody = serde_json::from_str(body).unwrap_or_default();
    match parsed.id? {
        serde_json::Value::String(id) => Some(id),
        serde_json::Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

//=========================================================================================
// `CoursePublisher` Trait Implementation
//=========================================================================================

#[async_trait]
impl CoursePublisher for HttpPublisher {
    async fn publish_course(&self, course: &Course) -> PortResult<PublishReceipt> {
        let mut request = self.client.post(&self.endpoint).json(course);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!("Failed to reach course endpoint: {:?}", e);
            PortError::Unexpected(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !status.is_success() {
            error!("Course endpoint rejected publish with {}", status);
            return Err(status_to_port_error(status, body.trim()));
        }

        let course_id = course_id_from_body(&body);
        info!(course_id = ?course_id, stages = course.stages.len(), "Course accepted by endpoint");
        Ok(PublishReceipt::now(course_id))
    }
}
