//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the wizard REST endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::protocol::{PublishResponse, WizardResponse};
use crate::web::state::{AppState, SharedSession};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use course_wizard_core::action::WizardAction;
use course_wizard_core::error::WizardError;
use course_wizard_core::preview::CoursePreview;
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_wizard_handler,
        get_wizard_handler,
        apply_action_handler,
        publish_wizard_handler,
        delete_wizard_handler,
    ),
    components(
        schemas(WizardResponse, PublishResponse)
    ),
    tags(
        (name = "Course Wizard API", description = "Author and publish courses.")
    )
)]
pub struct ApiDoc;

type HandlerError = (StatusCode, String);

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Chooses the HTTP status a wizard failure is reported with.
fn wizard_error_status(err: &WizardError) -> StatusCode {
    match err {
        e if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        WizardError::StageNotFound(_)
        | WizardError::VideoNotFound(_)
        | WizardError::QuestionNotFound(_)
        | WizardError::AssessmentMissing(_) => StatusCode::NOT_FOUND,
        WizardError::Publish(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::CONFLICT,
    }
}

fn wizard_error(err: WizardError) -> HandlerError {
    (wizard_error_status(&err), err.to_string())
}

async fn find_session(
    app_state: &AppState,
    wizard_id: Uuid,
) -> Result<SharedSession, HandlerError> {
    app_state.sessions.get(wizard_id).await.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            format!("Wizard {} not found", wizard_id),
        )
    })
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Start a new course authoring session.
#[utoipa::path(
    post,
    path = "/wizards",
    responses(
        (status = 201, description = "Wizard created", body = WizardResponse)
    )
)]
pub async fn create_wizard_handler(
    State(app_state): State<Arc<AppState>>,
) -> (StatusCode, Json<WizardResponse>) {
    app_state.sessions.prune_idle(app_state.config.session_ttl).await;
    let (wizard_id, session) = app_state.sessions.create().await;
    let session = session.lock().await;
    info!("Created wizard session {}", wizard_id);
    (
        StatusCode::CREATED,
        Json(WizardResponse::new(wizard_id, &session.wizard)),
    )
}

/// Fetch the current state of a wizard session.
#[utoipa::path(
    get,
    path = "/wizards/{wizard_id}",
    responses(
        (status = 200, description = "Current wizard state", body = WizardResponse),
        (status = 404, description = "Unknown wizard")
    ),
    params(
        ("wizard_id" = Uuid, Path, description = "The wizard session id.")
    )
)]
pub async fn get_wizard_handler(
    State(app_state): State<Arc<AppState>>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Json<WizardResponse>, HandlerError> {
    let session = find_session(&app_state, wizard_id).await?;
    let mut session = session.lock().await;
    session.touch();
    Ok(Json(WizardResponse::new(wizard_id, &session.wizard)))
}

/// Apply one typed edit action to a wizard session.
///
/// The body is a JSON object tagged by `type`, e.g.
/// `{"type": "add_video", "title": "Intro", "url": "https://youtu.be/..."}`.
#[utoipa::path(
    post,
    path = "/wizards/{wizard_id}/actions",
    request_body(
        content_type = "application/json",
        description = "A wizard action tagged by `type`."
    ),
    responses(
        (status = 200, description = "Action applied", body = WizardResponse),
        (status = 404, description = "Unknown wizard or target"),
        (status = 409, description = "Action not allowed in the current step"),
        (status = 422, description = "Validation failed")
    ),
    params(
        ("wizard_id" = Uuid, Path, description = "The wizard session id.")
    )
)]
pub async fn apply_action_handler(
    State(app_state): State<Arc<AppState>>,
    Path(wizard_id): Path<Uuid>,
    Json(action): Json<WizardAction>,
) -> Result<Json<WizardResponse>, HandlerError> {
    let session = find_session(&app_state, wizard_id).await?;
    let mut session = session.lock().await;
    session.touch();
    session.wizard.apply(action).map_err(|e| {
        warn!("Wizard {} rejected action: {}", wizard_id, e);
        wizard_error(e)
    })?;
    Ok(Json(WizardResponse::new(wizard_id, &session.wizard)))
}

/// Publish the finished course through the configured publisher.
#[utoipa::path(
    post,
    path = "/wizards/{wizard_id}/publish",
    responses(
        (status = 200, description = "Course published", body = PublishResponse),
        (status = 404, description = "Unknown wizard"),
        (status = 409, description = "Not in the preview step, or already publishing"),
        (status = 422, description = "Course is incomplete"),
        (status = 500, description = "The publish task was interrupted"),
        (status = 502, description = "The course store rejected the course")
    ),
    params(
        ("wizard_id" = Uuid, Path, description = "The wizard session id.")
    )
)]
pub async fn publish_wizard_handler(
    State(app_state): State<Arc<AppState>>,
    Path(wizard_id): Path<Uuid>,
) -> Result<Json<PublishResponse>, HandlerError> {
    let session = find_session(&app_state, wizard_id).await?;

    // The session lock is released while the publisher runs; the in-flight flag
    // keeps other requests from editing or re-submitting meanwhile.
    let course = {
        let mut guard = session.lock().await;
        guard.touch();
        guard.wizard.begin_publish().map_err(wizard_error)?
    };

    info!("Publishing course '{}' from wizard {}", course.title, wizard_id);

    // The publish runs in its own task so it still settles the session when the
    // client disconnects and this handler is dropped.
    let publisher = app_state.publisher.clone();
    let task_session = session.clone();
    let task = tokio::spawn(async move {
        let outcome = publisher.publish_course(&course).await;
        let mut guard = task_session.lock().await;
        let receipt = guard.wizard.finish_publish(outcome)?;
        Ok::<_, WizardError>((receipt, CoursePreview::from(&guard.wizard)))
    });

    let (receipt, view) = match task.await {
        Ok(settled) => settled.map_err(|e| {
            error!("Failed to publish course from wizard {}: {}", wizard_id, e);
            wizard_error(e)
        })?,
        Err(join_error) => {
            error!("Publish task for wizard {} died: {}", wizard_id, join_error);
            session.lock().await.wizard.abort_publish();
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Publishing was interrupted".to_string(),
            ));
        }
    };

    Ok(Json(PublishResponse {
        wizard_id,
        course_id: receipt.course_id,
        published_at: receipt.published_at,
        view,
    }))
}

/// Discard a wizard session.
#[utoipa::path(
    delete,
    path = "/wizards/{wizard_id}",
    responses(
        (status = 204, description = "Wizard discarded"),
        (status = 404, description = "Unknown wizard")
    ),
    params(
        ("wizard_id" = Uuid, Path, description = "The wizard session id.")
    )
)]
pub async fn delete_wizard_handler(
    State(app_state): State<Arc<AppState>>,
    Path(wizard_id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    if app_state.sessions.remove(wizard_id).await {
        info!("Discarded wizard session {}", wizard_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((
            StatusCode::NOT_FOUND,
            format!("Wizard {} not found", wizard_id),
        ))
    }
}
