pub mod action;
pub mod domain;
pub mod duration;
pub mod error;
pub mod ports;
pub mod preview;
pub mod video;
pub mod wizard;

pub use action::{AssignmentField, WizardAction};
pub use domain::{
    AssessmentKind, Assessments, Assignment, AssignmentKind, Course, DocumentRef, Quiz,
    QuizQuestion, Stage, StageId, Video,
};
pub use duration::{compute_duration, DurationSummary};
pub use error::{WizardError, WizardResult};
pub use ports::{CoursePublisher, PortError, PortResult, PublishReceipt};
pub use preview::{CoursePreview, StageSummary};
pub use wizard::{CourseWizard, Step};
