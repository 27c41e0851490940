//! crates/course_wizard_core/src/ports.rs
//!
//! Defines the service contract the wizard hands its finished course to.
//! The trait forms the boundary of the hexagonal architecture, keeping the core
//! independent of whatever transport stores published courses.

use crate::domain::Course;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., HTTP, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Acknowledgement returned by a publisher once a course is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    /// Identifier assigned by the remote side, when it reports one.
    pub course_id: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl PublishReceipt {
    pub fn now(course_id: Option<String>) -> Self {
        Self {
            course_id,
            published_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait CoursePublisher: Send + Sync {
    /// Persists a finished course and reports success or failure.
    async fn publish_course(&self, course: &Course) -> PortResult<PublishReceipt>;
}
