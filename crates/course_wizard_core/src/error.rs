//! crates/course_wizard_core/src/error.rs
//!
//! Defines the error type returned by every wizard operation.

use crate::domain::{AssessmentKind, StageId};
use crate::ports::PortError;
use crate::wizard::Step;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    // --- Field validation ---
    #[error("Course title is required")]
    EmptyTitle,
    #[error("Stage name is required")]
    EmptyStageName,
    #[error("Stage duration must be at least one hour")]
    InvalidDuration,
    #[error("Add at least one video to the stage")]
    NoVideos,
    #[error("Video title is required")]
    EmptyVideoTitle,
    #[error("Video URL is required")]
    EmptyVideoUrl,
    #[error("Not a recognized video URL: {0}")]
    InvalidVideoUrl(String),
    #[error("Question {0} needs at least one correct answer")]
    NoCorrectAnswer(Uuid),
    #[error("Option index {0} is out of range")]
    OptionOutOfRange(usize),
    #[error("Add at least one stage before publishing")]
    NoStages,

    // --- Lookups ---
    #[error("Stage {0} not found")]
    StageNotFound(StageId),
    #[error("Video {0} not found")]
    VideoNotFound(Uuid),
    #[error("Question {0} not found")]
    QuestionNotFound(Uuid),
    #[error("The stage has no {0}")]
    AssessmentMissing(AssessmentKind),

    // --- Step machine ---
    #[error("Not available in the {0} step")]
    WrongStep(Step),
    #[error("Finish editing the current stage first")]
    EditInProgress,
    #[error("No stage is being edited")]
    NotEditing,
    #[error("Stage {0} is being edited and cannot be deleted")]
    StageBeingEdited(StageId),

    // --- Publish ---
    #[error("A publish request is already in flight")]
    PublishInFlight,
    #[error("Publishing failed: {0}")]
    Publish(#[from] PortError),
}

impl WizardError {
    /// True for errors caused by missing or malformed user input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WizardError::EmptyTitle
                | WizardError::EmptyStageName
                | WizardError::InvalidDuration
                | WizardError::NoVideos
                | WizardError::EmptyVideoTitle
                | WizardError::EmptyVideoUrl
                | WizardError::InvalidVideoUrl(_)
                | WizardError::NoCorrectAnswer(_)
                | WizardError::OptionOutOfRange(_)
                | WizardError::NoStages
        )
    }
}

/// A convenience type alias for `Result<T, WizardError>`.
pub type WizardResult<T> = Result<T, WizardError>;
