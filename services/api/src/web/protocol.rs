//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the dashboard client and the API.
//! Requests to the actions endpoint carry a `course_wizard_core::WizardAction`
//! directly; the structs below are the response bodies.

use chrono::{DateTime, Utc};
use course_wizard_core::preview::CoursePreview;
use course_wizard_core::wizard::CourseWizard;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// The current state of one wizard session.
#[derive(Serialize, ToSchema, Debug)]
pub struct WizardResponse {
    pub wizard_id: Uuid,
    /// Step cursor, committed stage summaries, active stage and duration totals.
    #[schema(value_type = Object)]
    pub view: CoursePreview,
}

impl WizardResponse {
    pub fn new(wizard_id: Uuid, wizard: &CourseWizard) -> Self {
        Self {
            wizard_id,
            view: CoursePreview::from(wizard),
        }
    }
}

/// The response payload sent after a course was accepted by the publisher.
#[derive(Serialize, ToSchema, Debug)]
pub struct PublishResponse {
    pub wizard_id: Uuid,
    /// Identifier assigned by the course store, when it reports one.
    pub course_id: Option<String>,
    pub published_at: DateTime<Utc>,
    /// The wizard after publishing: an empty session ready for the next course.
    #[schema(value_type = Object)]
    pub view: CoursePreview,
}
