//! crates/course_wizard_core/src/preview.rs
//!
//! Read-only projection of a wizard session, shaped for display on the preview
//! step and for API responses.

use crate::domain::{AssessmentKind, Stage, StageId};
use crate::duration::DurationSummary;
use crate::wizard::{CourseWizard, Step};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSummary {
    pub id: StageId,
    pub name: String,
    pub duration: u32,
    pub video_count: usize,
    pub assessments: Vec<AssessmentKind>,
}

impl From<&Stage> for StageSummary {
    fn from(stage: &Stage) -> Self {
        Self {
            id: stage.id,
            name: stage.name.clone(),
            duration: stage.duration,
            video_count: stage.videos.len(),
            assessments: stage.assessments.kinds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoursePreview {
    pub step: Step,
    pub title: String,
    pub stage_count: usize,
    pub stages: Vec<StageSummary>,
    /// The stage the editor is showing: the scratch draft or the stage under edit.
    pub active_stage: Option<Stage>,
    pub editing_stage_id: Option<StageId>,
    pub duration: DurationSummary,
    pub duration_label: String,
    pub publishing: bool,
}

impl From<&CourseWizard> for CoursePreview {
    fn from(wizard: &CourseWizard) -> Self {
        let duration = wizard.compute_duration();
        Self {
            step: wizard.step(),
            title: wizard.title().to_string(),
            stage_count: wizard.stages().len(),
            stages: wizard.stages().iter().map(StageSummary::from).collect(),
            active_stage: wizard.active_stage().cloned(),
            editing_stage_id: wizard.editing_stage_id(),
            duration,
            duration_label: duration.to_string(),
            publishing: wizard.is_publishing(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_summarizes_committed_stages() {
        let mut wizard = CourseWizard::new();
        wizard.set_title("Full Stack").unwrap();
        wizard.next().unwrap();
        wizard.set_stage_name("Beginner").unwrap();
        wizard
            .add_video("Intro", "https://youtu.be/dQw4w9WgXcQ")
            .unwrap();
        wizard.add_capstone().unwrap();
        wizard.next().unwrap();

        let preview = CoursePreview::from(&wizard);
        assert_eq!(preview.step, Step::Preview);
        assert_eq!(preview.stage_count, 1);
        assert_eq!(preview.stages[0].name, "Beginner");
        assert_eq!(preview.stages[0].video_count, 1);
        assert_eq!(preview.stages[0].assessments, vec![AssessmentKind::Capstone]);
        assert_eq!(preview.duration_label, "40 working hours (5 working days)");
        assert!(preview.active_stage.is_none());
    }

    #[test]
    fn preview_exposes_stage_under_edit() {
        let mut wizard = CourseWizard::new();
        wizard.set_title("Data").unwrap();
        wizard.next().unwrap();
        wizard.set_stage_name("One").unwrap();
        wizard
            .add_video("Intro", "https://youtu.be/dQw4w9WgXcQ")
            .unwrap();
        wizard.next().unwrap();
        let id = wizard.stages()[0].id;
        wizard.edit_stage(id).unwrap();

        let preview = CoursePreview::from(&wizard);
        assert_eq!(preview.editing_stage_id, Some(id));
        assert_eq!(preview.active_stage.map(|s| s.id), Some(id));
    }
}
