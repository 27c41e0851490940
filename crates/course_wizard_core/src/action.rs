//! crates/course_wizard_core/src/action.rs
//!
//! Defines the typed edit actions a client can send to a wizard session.
//! Each variant maps to exactly one `CourseWizard` operation.

use crate::domain::{AssessmentKind, AssignmentKind, DocumentRef, Stage, StageId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single field update on an assignment or capstone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum AssignmentField {
    Title(String),
    Description(String),
    /// Attaches a document reference, or detaches it with `None`.
    Document(Option<DocumentRef>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardAction {
    // --- Step navigation ---
    /// Advances Title -> StageEditor, or commits the scratch stage and moves to Preview.
    Next,
    /// Returns from StageEditor to Title.
    Back,
    /// Leaves Preview to draft one more stage.
    AddAnotherStage,
    /// Enters the edit override for a committed stage.
    EditStage { stage_id: StageId },
    SaveEdit,
    CancelEdit,

    // --- Course and stage fields ---
    SetTitle { title: String },
    /// Replaces the scratch stage with a prepared draft.
    AddStage { stage: Stage },
    SetStageName { name: String },
    SetStageDuration { hours: u32 },
    DeleteStage { stage_id: StageId },

    // --- Videos ---
    AddVideo { title: String, url: String },
    RemoveVideo { video_id: Uuid },

    // --- Assessments ---
    AddAssessment { kind: AssessmentKind },
    RemoveAssessment { kind: AssessmentKind },

    // --- Quiz ---
    SetQuizTitle { title: String },
    AddQuestion,
    RemoveQuestion { question_id: Uuid },
    SetQuestionText { question_id: Uuid, text: String },
    SetOptionText { question_id: Uuid, option_index: usize, text: String },
    ToggleCorrectAnswer { question_id: Uuid, option_index: usize },

    // --- Assignment / capstone ---
    SetAssignmentField {
        kind: AssignmentKind,
        update: AssignmentField,
    },
}
