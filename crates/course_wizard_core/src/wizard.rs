//! crates/course_wizard_core/src/wizard.rs
//!
//! The course authoring wizard: an owned editing session holding the course tree,
//! a scratch stage, and a step cursor.
//!
//! New stages are drafted in a scratch slot and only join the committed list when
//! the user advances. Committed stages are edited in place, addressed by id, while
//! the edit override is active.

use crate::action::{AssignmentField, WizardAction};
use crate::domain::{
    AssessmentKind, Assignment, AssignmentKind, Course, Quiz, QuizQuestion, Stage, StageId,
    Video, QUIZ_OPTION_COUNT,
};
use crate::duration::{compute_duration, DurationSummary};
use crate::error::{WizardError, WizardResult};
use crate::ports::{CoursePublisher, PortResult, PublishReceipt};
use crate::video::extract_video_id;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

//=========================================================================================
// Step Cursor
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Title,
    StageEditor,
    Preview,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::Title => "title",
            Step::StageEditor => "stage editor",
            Step::Preview => "preview",
        };
        f.write_str(label)
    }
}

/// Edit override on a committed stage. `snapshot` is restored on cancel.
#[derive(Debug, Clone)]
struct EditSession {
    stage_id: StageId,
    snapshot: Stage,
}

/// Aborts the publish on drop unless `finish_publish` already lowered the flag.
struct InFlight<'a> {
    wizard: &'a mut CourseWizard,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.wizard.abort_publish();
    }
}

//=========================================================================================
// CourseWizard
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct CourseWizard {
    title: String,
    stages: Vec<Stage>,
    current: Stage,
    step: Step,
    editing: Option<EditSession>,
    publishing: bool,
}

impl CourseWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The committed stages, in course order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// The scratch stage not yet part of `stages`.
    pub fn current_stage(&self) -> &Stage {
        &self.current
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn editing_stage_id(&self) -> Option<StageId> {
        self.editing.as_ref().map(|edit| edit.stage_id)
    }

    pub fn is_publishing(&self) -> bool {
        self.publishing
    }

    /// The stage that stage-level edits currently target, if any.
    pub fn active_stage(&self) -> Option<&Stage> {
        match &self.editing {
            Some(edit) => self.stages.iter().find(|s| s.id == edit.stage_id),
            None if self.step == Step::StageEditor => Some(&self.current),
            None => None,
        }
    }

    /// Sums committed stage durations into hours and working days.
    pub fn compute_duration(&self) -> DurationSummary {
        compute_duration(&self.stages)
    }

    /// Assembles the publish payload from the committed tree.
    pub fn course(&self) -> Course {
        Course {
            title: self.title.clone(),
            stages: self.stages.clone(),
        }
    }

    //-------------------------------------------------------------------------------------
    // Internal helpers
    //-------------------------------------------------------------------------------------

    fn ensure_idle(&self) -> WizardResult<()> {
        if self.publishing {
            return Err(WizardError::PublishInFlight);
        }
        Ok(())
    }

    fn ensure_step(&self, step: Step) -> WizardResult<()> {
        self.ensure_idle()?;
        if self.editing.is_some() {
            return Err(WizardError::EditInProgress);
        }
        if self.step != step {
            return Err(WizardError::WrongStep(self.step));
        }
        Ok(())
    }

    fn active_stage_mut(&mut self) -> WizardResult<&mut Stage> {
        self.ensure_idle()?;
        match &self.editing {
            Some(edit) => {
                let id = edit.stage_id;
                self.stages
                    .iter_mut()
                    .find(|s| s.id == id)
                    .ok_or(WizardError::StageNotFound(id))
            }
            None if self.step == Step::StageEditor => Ok(&mut self.current),
            None => Err(WizardError::WrongStep(self.step)),
        }
    }

    fn quiz_mut(&mut self) -> WizardResult<&mut Quiz> {
        self.active_stage_mut()?
            .assessments
            .quiz
            .as_mut()
            .ok_or(WizardError::AssessmentMissing(AssessmentKind::Quiz))
    }

    fn assignment_mut(&mut self, kind: AssignmentKind) -> WizardResult<&mut Assignment> {
        let assessments = &mut self.active_stage_mut()?.assessments;
        let slot = match kind {
            AssignmentKind::Assignment => assessments.assignment.as_mut(),
            AssignmentKind::Capstone => assessments.capstone.as_mut(),
        };
        slot.ok_or(WizardError::AssessmentMissing(kind.into()))
    }

    fn validate_answers(question: &QuizQuestion) -> WizardResult<()> {
        if question.correct_answers.is_empty() {
            return Err(WizardError::NoCorrectAnswer(question.id));
        }
        match question
            .correct_answers
            .iter()
            .find(|index| **index >= QUIZ_OPTION_COUNT)
        {
            Some(index) => Err(WizardError::OptionOutOfRange(*index)),
            None => Ok(()),
        }
    }

    fn validate_stage(stage: &Stage) -> WizardResult<()> {
        if stage.name.trim().is_empty() {
            return Err(WizardError::EmptyStageName);
        }
        if stage.videos.is_empty() {
            return Err(WizardError::NoVideos);
        }
        Ok(())
    }

    //-------------------------------------------------------------------------------------
    // Step transitions
    //-------------------------------------------------------------------------------------

    /// Advances the step cursor. Leaving the stage editor commits the scratch stage.
    pub fn next(&mut self) -> WizardResult<Step> {
        self.ensure_idle()?;
        if self.editing.is_some() {
            return Err(WizardError::EditInProgress);
        }
        match self.step {
            Step::Title => {
                if self.title.trim().is_empty() {
                    return Err(WizardError::EmptyTitle);
                }
                self.step = Step::StageEditor;
            }
            Step::StageEditor => {
                self.commit_stage()?;
                self.step = Step::Preview;
            }
            Step::Preview => return Err(WizardError::WrongStep(Step::Preview)),
        }
        debug!(step = %self.step, "wizard advanced");
        Ok(self.step)
    }

    /// Returns from the stage editor to the title step, keeping the scratch draft.
    pub fn back(&mut self) -> WizardResult<Step> {
        self.ensure_step(Step::StageEditor)?;
        self.step = Step::Title;
        Ok(self.step)
    }

    pub fn add_another_stage(&mut self) -> WizardResult<()> {
        self.ensure_step(Step::Preview)?;
        self.step = Step::StageEditor;
        Ok(())
    }

    /// Enters the edit override for a committed stage.
    pub fn edit_stage(&mut self, stage_id: StageId) -> WizardResult<()> {
        self.ensure_step(Step::Preview)?;
        let snapshot = self
            .stages
            .iter()
            .find(|s| s.id == stage_id)
            .cloned()
            .ok_or(WizardError::StageNotFound(stage_id))?;
        self.editing = Some(EditSession { stage_id, snapshot });
        debug!(%stage_id, "editing committed stage");
        Ok(())
    }

    /// Leaves the edit override keeping the changes.
    pub fn save_edit(&mut self) -> WizardResult<()> {
        self.ensure_idle()?;
        let edit = self.editing.as_ref().ok_or(WizardError::NotEditing)?;
        let stage = self
            .stages
            .iter()
            .find(|s| s.id == edit.stage_id)
            .ok_or(WizardError::StageNotFound(edit.stage_id))?;
        Self::validate_stage(stage)?;
        self.editing = None;
        Ok(())
    }

    /// Leaves the edit override and restores the stage as it was on entry.
    pub fn cancel_edit(&mut self) -> WizardResult<()> {
        self.ensure_idle()?;
        let edit = self.editing.take().ok_or(WizardError::NotEditing)?;
        if let Some(stage) = self.stages.iter_mut().find(|s| s.id == edit.stage_id) {
            *stage = edit.snapshot;
        }
        Ok(())
    }

    //-------------------------------------------------------------------------------------
    // Course and stage fields
    //-------------------------------------------------------------------------------------

    pub fn set_title(&mut self, title: impl Into<String>) -> WizardResult<()> {
        self.ensure_idle()?;
        self.title = title.into();
        Ok(())
    }

    /// Places `draft` into the scratch slot. It is not committed yet.
    ///
    /// The draft is held to the same rules as edits made field by field: video ids
    /// are re-derived from their URLs and every quiz question needs a correct answer
    /// within range. All ids in the draft are reissued, so it can never alias a
    /// committed stage.
    pub fn add_stage(&mut self, mut draft: Stage) -> WizardResult<()> {
        self.ensure_step(Step::StageEditor)?;
        if draft.duration == 0 {
            return Err(WizardError::InvalidDuration);
        }
        for video in &mut draft.videos {
            video.video_id = extract_video_id(&video.url)
                .ok_or_else(|| WizardError::InvalidVideoUrl(video.url.clone()))?;
            video.id = Uuid::new_v4();
        }
        if let Some(quiz) = &mut draft.assessments.quiz {
            for question in &mut quiz.questions {
                Self::validate_answers(question)?;
                question.id = Uuid::new_v4();
            }
            quiz.id = Uuid::new_v4();
        }
        let assessments = &mut draft.assessments;
        for assignment in [assessments.assignment.as_mut(), assessments.capstone.as_mut()]
            .into_iter()
            .flatten()
        {
            assignment.id = Uuid::new_v4();
        }
        draft.id = Uuid::new_v4();
        self.current = draft;
        Ok(())
    }

    /// Moves the scratch stage into the committed list and starts a fresh draft.
    pub fn commit_stage(&mut self) -> WizardResult<StageId> {
        self.ensure_step(Step::StageEditor)?;
        Self::validate_stage(&self.current)?;
        let stage = std::mem::take(&mut self.current);
        let stage_id = stage.id;
        self.stages.push(stage);
        info!(%stage_id, stages = self.stages.len(), "stage committed");
        Ok(stage_id)
    }

    pub fn set_stage_name(&mut self, name: impl Into<String>) -> WizardResult<()> {
        self.active_stage_mut()?.name = name.into();
        Ok(())
    }

    pub fn set_stage_duration(&mut self, hours: u32) -> WizardResult<()> {
        if hours == 0 {
            return Err(WizardError::InvalidDuration);
        }
        self.active_stage_mut()?.duration = hours;
        Ok(())
    }

    /// Removes a committed stage. The remaining stages keep their order.
    pub fn delete_stage(&mut self, stage_id: StageId) -> WizardResult<Stage> {
        self.ensure_idle()?;
        if self.editing_stage_id() == Some(stage_id) {
            return Err(WizardError::StageBeingEdited(stage_id));
        }
        let index = self
            .stages
            .iter()
            .position(|s| s.id == stage_id)
            .ok_or(WizardError::StageNotFound(stage_id))?;
        Ok(self.stages.remove(index))
    }

    //-------------------------------------------------------------------------------------
    // Videos
    //-------------------------------------------------------------------------------------

    /// Validates and appends a video to the active stage, returning its new id.
    pub fn add_video(&mut self, title: &str, url: &str) -> WizardResult<Uuid> {
        let stage = self.active_stage_mut()?;
        let title = title.trim();
        let url = url.trim();
        if title.is_empty() {
            return Err(WizardError::EmptyVideoTitle);
        }
        if url.is_empty() {
            return Err(WizardError::EmptyVideoUrl);
        }
        let video_id =
            extract_video_id(url).ok_or_else(|| WizardError::InvalidVideoUrl(url.to_string()))?;
        let id = Uuid::new_v4();
        stage.videos.push(Video {
            id,
            title: title.to_string(),
            url: url.to_string(),
            video_id,
        });
        Ok(id)
    }

    pub fn remove_video(&mut self, video_id: Uuid) -> WizardResult<()> {
        let videos = &mut self.active_stage_mut()?.videos;
        let before = videos.len();
        videos.retain(|v| v.id != video_id);
        if videos.len() == before {
            return Err(WizardError::VideoNotFound(video_id));
        }
        Ok(())
    }

    //-------------------------------------------------------------------------------------
    // Assessments
    //-------------------------------------------------------------------------------------

    /// Attaches a blank quiz, replacing any existing one.
    pub fn add_quiz(&mut self) -> WizardResult<()> {
        self.active_stage_mut()?.assessments.quiz = Some(Quiz::new());
        Ok(())
    }

    /// Attaches a blank assignment, replacing any existing one.
    pub fn add_assignment(&mut self) -> WizardResult<()> {
        self.active_stage_mut()?.assessments.assignment = Some(Assignment::new());
        Ok(())
    }

    /// Attaches a blank capstone, replacing any existing one.
    pub fn add_capstone(&mut self) -> WizardResult<()> {
        self.active_stage_mut()?.assessments.capstone = Some(Assignment::new());
        Ok(())
    }

    pub fn add_assessment(&mut self, kind: AssessmentKind) -> WizardResult<()> {
        match kind {
            AssessmentKind::Quiz => self.add_quiz(),
            AssessmentKind::Assignment => self.add_assignment(),
            AssessmentKind::Capstone => self.add_capstone(),
        }
    }

    pub fn remove_assessment(&mut self, kind: AssessmentKind) -> WizardResult<()> {
        self.active_stage_mut()?.assessments.clear(kind);
        Ok(())
    }

    pub fn set_quiz_title(&mut self, title: impl Into<String>) -> WizardResult<()> {
        self.quiz_mut()?.title = title.into();
        Ok(())
    }

    pub fn add_question(&mut self) -> WizardResult<Uuid> {
        let quiz = self.quiz_mut()?;
        let question = QuizQuestion::new();
        let id = question.id;
        quiz.questions.push(question);
        Ok(id)
    }

    pub fn remove_question(&mut self, question_id: Uuid) -> WizardResult<()> {
        let questions = &mut self.quiz_mut()?.questions;
        let before = questions.len();
        questions.retain(|q| q.id != question_id);
        if questions.len() == before {
            return Err(WizardError::QuestionNotFound(question_id));
        }
        Ok(())
    }

    pub fn set_question_text(
        &mut self,
        question_id: Uuid,
        text: impl Into<String>,
    ) -> WizardResult<()> {
        let question = self
            .quiz_mut()?
            .question_mut(question_id)
            .ok_or(WizardError::QuestionNotFound(question_id))?;
        question.question = text.into();
        Ok(())
    }

    pub fn set_option_text(
        &mut self,
        question_id: Uuid,
        option_index: usize,
        text: impl Into<String>,
    ) -> WizardResult<()> {
        let question = self
            .quiz_mut()?
            .question_mut(question_id)
            .ok_or(WizardError::QuestionNotFound(question_id))?;
        let option = question
            .options
            .get_mut(option_index)
            .ok_or(WizardError::OptionOutOfRange(option_index))?;
        *option = text.into();
        Ok(())
    }

    /// Flips one option in a question's correct-answer set.
    ///
    /// Returns `Ok(false)` without changing anything when the flip would leave the
    /// question with no correct answer.
    pub fn toggle_correct_answer(
        &mut self,
        question_id: Uuid,
        option_index: usize,
    ) -> WizardResult<bool> {
        if option_index >= QUIZ_OPTION_COUNT {
            return Err(WizardError::OptionOutOfRange(option_index));
        }
        let question = self
            .quiz_mut()?
            .question_mut(question_id)
            .ok_or(WizardError::QuestionNotFound(question_id))?;
        Ok(question.toggle_correct(option_index))
    }

    pub fn set_assignment_field(
        &mut self,
        kind: AssignmentKind,
        field: AssignmentField,
    ) -> WizardResult<()> {
        let assignment = self.assignment_mut(kind)?;
        match field {
            AssignmentField::Title(title) => assignment.title = title,
            AssignmentField::Description(description) => assignment.description = description,
            AssignmentField::Document(document) => assignment.document = document,
        }
        Ok(())
    }

    //-------------------------------------------------------------------------------------
    // Publish
    //-------------------------------------------------------------------------------------

    /// Checks the course is publishable, raises the in-flight flag and returns the payload.
    pub fn begin_publish(&mut self) -> WizardResult<Course> {
        self.ensure_step(Step::Preview)?;
        if self.title.trim().is_empty() {
            return Err(WizardError::EmptyTitle);
        }
        if self.stages.is_empty() {
            return Err(WizardError::NoStages);
        }
        self.publishing = true;
        Ok(self.course())
    }

    /// Records the publisher's answer. Success starts a fresh session; failure keeps
    /// the current one so the user can retry.
    pub fn finish_publish(
        &mut self,
        outcome: PortResult<PublishReceipt>,
    ) -> WizardResult<PublishReceipt> {
        self.publishing = false;
        match outcome {
            Ok(receipt) => {
                info!(course_id = ?receipt.course_id, "course published");
                *self = Self::new();
                Ok(receipt)
            }
            Err(e) => {
                warn!("course publish failed: {}", e);
                Err(WizardError::Publish(e))
            }
        }
    }

    /// Lowers the in-flight flag when the publisher's answer will never arrive,
    /// e.g. because the publishing task was dropped. Editing state is kept.
    pub fn abort_publish(&mut self) {
        if std::mem::take(&mut self.publishing) {
            warn!("course publish abandoned before the publisher answered");
        }
    }

    /// Hands the finished course to `publisher` and records the outcome.
    ///
    /// Dropping the returned future mid-flight leaves the session editable again.
    pub async fn publish(
        &mut self,
        publisher: &dyn CoursePublisher,
    ) -> WizardResult<PublishReceipt> {
        let course = self.begin_publish()?;
        let in_flight = InFlight { wizard: self };
        let outcome = publisher.publish_course(&course).await;
        in_flight.wizard.finish_publish(outcome)
    }

    //-------------------------------------------------------------------------------------
    // Action dispatch
    //-------------------------------------------------------------------------------------

    /// Applies one typed action to the session.
    pub fn apply(&mut self, action: WizardAction) -> WizardResult<()> {
        match action {
            WizardAction::Next => self.next().map(drop),
            WizardAction::Back => self.back().map(drop),
            WizardAction::AddAnotherStage => self.add_another_stage(),
            WizardAction::EditStage { stage_id } => self.edit_stage(stage_id),
            WizardAction::SaveEdit => self.save_edit(),
            WizardAction::CancelEdit => self.cancel_edit(),
            WizardAction::SetTitle { title } => self.set_title(title),
            WizardAction::AddStage { stage } => self.add_stage(stage),
            WizardAction::SetStageName { name } => self.set_stage_name(name),
            WizardAction::SetStageDuration { hours } => self.set_stage_duration(hours),
            WizardAction::DeleteStage { stage_id } => self.delete_stage(stage_id).map(drop),
            WizardAction::AddVideo { title, url } => self.add_video(&title, &url).map(drop),
            WizardAction::RemoveVideo { video_id } => self.remove_video(video_id),
            WizardAction::AddAssessment { kind } => self.add_assessment(kind),
            WizardAction::RemoveAssessment { kind } => self.remove_assessment(kind),
            WizardAction::SetQuizTitle { title } => self.set_quiz_title(title),
            WizardAction::AddQuestion => self.add_question().map(drop),
            WizardAction::RemoveQuestion { question_id } => self.remove_question(question_id),
            WizardAction::SetQuestionText { question_id, text } => {
                self.set_question_text(question_id, text)
            }
            WizardAction::SetOptionText {
                question_id,
                option_index,
                text,
            } => self.set_option_text(question_id, option_index, text),
            WizardAction::ToggleCorrectAnswer {
                question_id,
                option_index,
            } => self.toggle_correct_answer(question_id, option_index).map(drop),
            WizardAction::SetAssignmentField { kind, update } => {
                self.set_assignment_field(kind, update)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DocumentRef, DEFAULT_STAGE_DURATION_HOURS};
    use crate::ports::PortError;
    use async_trait::async_trait;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    fn wizard_in_stage_editor() -> CourseWizard {
        let mut wizard = CourseWizard::new();
        wizard.set_title("Full Stack").unwrap();
        wizard.next().unwrap();
        wizard
    }

    fn commit_named(wizard: &mut CourseWizard, name: &str, hours: u32) -> StageId {
        wizard.set_stage_name(name).unwrap();
        wizard.set_stage_duration(hours).unwrap();
        wizard.add_video("Intro", URL).unwrap();
        wizard.commit_stage().unwrap()
    }

    fn wizard_in_preview(names: &[&str]) -> CourseWizard {
        let mut wizard = wizard_in_stage_editor();
        for name in names {
            commit_named(&mut wizard, name, 40);
        }
        // The last commit happens through `next`, mirroring the UI flow.
        wizard.set_stage_name("Final").unwrap();
        wizard.add_video("Wrap up", URL).unwrap();
        wizard.next().unwrap();
        wizard
    }

    struct StalledPublisher;

    #[async_trait]
    impl CoursePublisher for StalledPublisher {
        async fn publish_course(&self, _course: &Course) -> PortResult<PublishReceipt> {
            std::future::pending().await
        }
    }

    struct RecordingPublisher {
        fail: bool,
        published: Mutex<Vec<Course>>,
    }

    impl RecordingPublisher {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                published: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CoursePublisher for RecordingPublisher {
        async fn publish_course(&self, course: &Course) -> PortResult<PublishReceipt> {
            if self.fail {
                return Err(PortError::Unexpected("backend unavailable".into()));
            }
            self.published.lock().unwrap().push(course.clone());
            Ok(PublishReceipt::now(Some("course-1".into())))
        }
    }

    #[test]
    fn title_is_required_to_leave_first_step() {
        let mut wizard = CourseWizard::new();
        assert!(matches!(wizard.next(), Err(WizardError::EmptyTitle)));
        wizard.set_title("   ").unwrap();
        assert!(matches!(wizard.next(), Err(WizardError::EmptyTitle)));
        assert_eq!(wizard.step(), Step::Title);

        wizard.set_title("Full Stack").unwrap();
        assert_eq!(wizard.next().unwrap(), Step::StageEditor);
    }

    #[test]
    fn full_stack_scenario_previews_one_stage() {
        let mut wizard = wizard_in_stage_editor();
        wizard.set_stage_name("Beginner").unwrap();
        wizard.set_stage_duration(40).unwrap();
        wizard.add_video("Intro", URL).unwrap();

        assert_eq!(wizard.next().unwrap(), Step::Preview);
        assert_eq!(wizard.stages().len(), 1);
        assert_eq!(
            wizard.compute_duration().to_string(),
            "40 working hours (5 working days)"
        );
    }

    #[test]
    fn leaving_stage_editor_requires_name_and_video() {
        let mut wizard = wizard_in_stage_editor();
        assert!(matches!(wizard.next(), Err(WizardError::EmptyStageName)));
        wizard.set_stage_name("Beginner").unwrap();
        assert!(matches!(wizard.next(), Err(WizardError::NoVideos)));
        assert_eq!(wizard.step(), Step::StageEditor);
        assert!(wizard.stages().is_empty());
    }

    #[test]
    fn commit_resets_scratch_slot() {
        let mut wizard = wizard_in_stage_editor();
        wizard.set_stage_name("Beginner").unwrap();
        wizard.set_stage_duration(12).unwrap();
        wizard.add_video("Intro", URL).unwrap();
        wizard.add_quiz().unwrap();
        let old_id = wizard.current_stage().id;

        let committed = wizard.commit_stage().unwrap();
        assert_eq!(committed, old_id);

        let scratch = wizard.current_stage();
        assert_ne!(scratch.id, old_id);
        assert!(scratch.name.is_empty());
        assert!(scratch.videos.is_empty());
        assert!(scratch.assessments.kinds().is_empty());
        assert_eq!(scratch.duration, DEFAULT_STAGE_DURATION_HOURS);
        assert_eq!(wizard.stages()[0].duration, 12);
    }

    #[test]
    fn add_stage_only_fills_scratch_slot() {
        let mut wizard = wizard_in_stage_editor();
        let draft = Stage::named("Advanced", 20);
        let draft_id = draft.id;
        wizard.add_stage(draft).unwrap();
        assert_eq!(wizard.current_stage().id, draft_id);
        assert!(wizard.stages().is_empty());
    }

    #[test]
    fn add_stage_rejects_drafts_with_bad_videos() {
        let mut wizard = wizard_in_stage_editor();
        let mut draft = Stage::named("Advanced", 20);
        draft.videos.push(Video {
            id: Uuid::new_v4(),
            title: "Smuggled".into(),
            url: "not-a-link".into(),
            video_id: "dQw4w9WgXcQ".into(),
        });
        let scratch_id = wizard.current_stage().id;
        assert!(matches!(
            wizard.add_stage(draft),
            Err(WizardError::InvalidVideoUrl(_))
        ));
        assert_eq!(wizard.current_stage().id, scratch_id);
    }

    #[test]
    fn add_stage_reissues_ids_so_drafts_cannot_alias() {
        let mut wizard = wizard_in_stage_editor();
        let committed = commit_named(&mut wizard, "Beginner", 40);

        let mut draft = Stage::named("Copycat", 20);
        draft.id = committed;
        let video = Video {
            id: Uuid::new_v4(),
            title: "Intro".into(),
            url: URL.into(),
            video_id: String::new(),
        };
        draft.videos = vec![video.clone(), video.clone()];
        draft.assessments.quiz = Some(Quiz::new());
        draft.assessments.capstone = Some(Assignment::new());
        let old_quiz = draft.assessments.quiz.clone().unwrap();
        let old_capstone = draft.assessments.capstone.clone().unwrap();

        wizard.add_stage(draft).unwrap();
        let scratch = wizard.current_stage();
        assert_ne!(scratch.id, committed);
        assert_ne!(scratch.videos[0].id, scratch.videos[1].id);
        assert!(scratch.videos.iter().all(|v| v.id != video.id));
        assert_eq!(scratch.videos[0].video_id, "dQw4w9WgXcQ");
        let quiz = scratch.assessments.quiz.as_ref().unwrap();
        assert_ne!(quiz.id, old_quiz.id);
        assert_ne!(quiz.questions[0].id, old_quiz.questions[0].id);
        assert_ne!(scratch.assessments.capstone.as_ref().unwrap().id, old_capstone.id);

        wizard.next().unwrap();
        let ids: Vec<_> = wizard.stages().iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(wizard.delete_stage(committed).unwrap().name, "Beginner");
        assert_eq!(wizard.stages()[0].name, "Copycat");
    }

    #[test]
    fn add_stage_rejects_quiz_without_valid_correct_answer() {
        let mut wizard = wizard_in_stage_editor();
        let scratch_id = wizard.current_stage().id;

        let mut empty = Stage::named("Quiz stage", 20);
        let mut quiz = Quiz::new();
        quiz.questions[0].correct_answers.clear();
        empty.assessments.quiz = Some(quiz);
        let err = wizard.add_stage(empty).unwrap_err();
        assert!(matches!(err, WizardError::NoCorrectAnswer(_)));
        assert!(err.is_validation());

        let mut out_of_range = Stage::named("Quiz stage", 20);
        let mut quiz = Quiz::new();
        quiz.questions[0].correct_answers.insert(QUIZ_OPTION_COUNT);
        out_of_range.assessments.quiz = Some(quiz);
        assert!(matches!(
            wizard.add_stage(out_of_range),
            Err(WizardError::OptionOutOfRange(QUIZ_OPTION_COUNT))
        ));

        assert_eq!(wizard.current_stage().id, scratch_id);
        assert!(wizard.current_stage().assessments.quiz.is_none());
    }

    #[test]
    fn add_stage_rejects_quiz_decoded_with_empty_answers() {
        let mut wizard = wizard_in_stage_editor();
        let mut stage = serde_json::to_value(Stage::named("Decoded", 10)).unwrap();
        stage["assessments"]["quiz"] = serde_json::json!({
            "id": Uuid::new_v4(),
            "title": "Checkpoint",
            "questions": [{
                "id": Uuid::new_v4(),
                "question": "Pick one",
                "options": ["a", "b", "c", "d"],
                "correctAnswers": []
            }]
        });
        let action: WizardAction =
            serde_json::from_value(serde_json::json!({ "type": "add_stage", "stage": stage }))
                .unwrap();
        assert!(matches!(
            wizard.apply(action),
            Err(WizardError::NoCorrectAnswer(_))
        ));
        assert!(wizard.current_stage().assessments.quiz.is_none());
    }

    #[test]
    fn invalid_video_url_fails_without_mutation() {
        let mut wizard = wizard_in_stage_editor();
        let err = wizard.add_video("Intro", "not-a-link").unwrap_err();
        assert!(matches!(err, WizardError::InvalidVideoUrl(_)));
        assert!(err.is_validation());
        assert!(!err.to_string().is_empty());
        assert!(wizard.current_stage().videos.is_empty());

        assert!(matches!(
            wizard.add_video("", URL),
            Err(WizardError::EmptyVideoTitle)
        ));
        assert!(matches!(
            wizard.add_video("Intro", "  "),
            Err(WizardError::EmptyVideoUrl)
        ));
        assert!(wizard.current_stage().videos.is_empty());
    }

    #[test]
    fn valid_video_is_appended_with_extracted_id() {
        let mut wizard = wizard_in_stage_editor();
        let id = wizard.add_video(" Intro ", URL).unwrap();
        let video = &wizard.current_stage().videos[0];
        assert_eq!(video.id, id);
        assert_eq!(video.title, "Intro");
        assert_eq!(video.video_id, "dQw4w9WgXcQ");

        wizard.remove_video(id).unwrap();
        assert!(wizard.current_stage().videos.is_empty());
        assert!(matches!(
            wizard.remove_video(id),
            Err(WizardError::VideoNotFound(_))
        ));
    }

    #[test]
    fn stage_edits_are_rejected_outside_editor() {
        let mut wizard = CourseWizard::new();
        assert!(matches!(
            wizard.set_stage_name("x"),
            Err(WizardError::WrongStep(Step::Title))
        ));
        assert!(wizard.active_stage().is_none());
    }

    #[test]
    fn toggle_never_empties_correct_answers() {
        let mut wizard = wizard_in_stage_editor();
        wizard.add_quiz().unwrap();
        let question_id = wizard.current_stage().assessments.quiz.as_ref().unwrap().questions[0].id;

        assert!(!wizard.toggle_correct_answer(question_id, 0).unwrap());
        assert!(wizard.toggle_correct_answer(question_id, 3).unwrap());
        assert!(wizard.toggle_correct_answer(question_id, 0).unwrap());

        let quiz = wizard.current_stage().assessments.quiz.as_ref().unwrap();
        assert_eq!(quiz.questions[0].correct_answers, BTreeSet::from([3]));

        assert!(matches!(
            wizard.toggle_correct_answer(question_id, 4),
            Err(WizardError::OptionOutOfRange(4))
        ));
    }

    #[test]
    fn quiz_questions_can_be_authored() {
        let mut wizard = wizard_in_stage_editor();
        assert!(matches!(
            wizard.add_question(),
            Err(WizardError::AssessmentMissing(AssessmentKind::Quiz))
        ));
        wizard.add_quiz().unwrap();
        wizard.set_quiz_title("Checkpoint").unwrap();
        let q = wizard.add_question().unwrap();
        wizard.set_question_text(q, "What is HTTP?").unwrap();
        wizard.set_option_text(q, 1, "A protocol").unwrap();
        assert!(matches!(
            wizard.set_option_text(q, 7, "nope"),
            Err(WizardError::OptionOutOfRange(7))
        ));

        let quiz = wizard.current_stage().assessments.quiz.clone().unwrap();
        assert_eq!(quiz.title, "Checkpoint");
        assert_eq!(quiz.questions.len(), 2);
        assert_eq!(quiz.questions[1].question, "What is HTTP?");
        assert_eq!(quiz.questions[1].options[1], "A protocol");

        wizard.remove_question(q).unwrap();
        assert_eq!(
            wizard.current_stage().assessments.quiz.as_ref().unwrap().questions.len(),
            1
        );
    }

    #[test]
    fn adding_an_assessment_twice_overwrites_it() {
        let mut wizard = wizard_in_stage_editor();
        wizard.add_assignment().unwrap();
        wizard
            .set_assignment_field(AssignmentKind::Assignment, AssignmentField::Title("Blog".into()))
            .unwrap();
        wizard.add_assignment().unwrap();
        let assignment = wizard.current_stage().assessments.assignment.as_ref().unwrap();
        assert!(assignment.title.is_empty());
    }

    #[test]
    fn assignment_and_capstone_fields_update_independently() {
        let mut wizard = wizard_in_stage_editor();
        wizard.add_assessment(AssessmentKind::Capstone).unwrap();
        assert!(matches!(
            wizard.set_assignment_field(
                AssignmentKind::Assignment,
                AssignmentField::Title("x".into())
            ),
            Err(WizardError::AssessmentMissing(AssessmentKind::Assignment))
        ));

        let doc = DocumentRef {
            name: "brief.pdf".into(),
            url: "https://files.example.com/brief.pdf".into(),
        };
        wizard
            .set_assignment_field(
                AssignmentKind::Capstone,
                AssignmentField::Description("Ship it".into()),
            )
            .unwrap();
        wizard
            .set_assignment_field(
                AssignmentKind::Capstone,
                AssignmentField::Document(Some(doc.clone())),
            )
            .unwrap();
        let capstone = wizard.current_stage().assessments.capstone.clone().unwrap();
        assert_eq!(capstone.description, "Ship it");
        assert_eq!(capstone.document, Some(doc));

        wizard.remove_assessment(AssessmentKind::Capstone).unwrap();
        assert!(wizard.current_stage().assessments.capstone.is_none());
    }

    #[test]
    fn delete_stage_preserves_order_of_the_rest() {
        let mut wizard = wizard_in_stage_editor();
        let a = commit_named(&mut wizard, "A", 10);
        let b = commit_named(&mut wizard, "B", 10);
        let c = commit_named(&mut wizard, "C", 10);

        let removed = wizard.delete_stage(b).unwrap();
        assert_eq!(removed.name, "B");
        let ids: Vec<_> = wizard.stages().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![a, c]);
        assert!(matches!(
            wizard.delete_stage(b),
            Err(WizardError::StageNotFound(_))
        ));
    }

    #[test]
    fn edits_target_committed_stage_and_save_keeps_them() {
        let mut wizard = wizard_in_preview(&["Beginner"]);
        let target = wizard.stages()[0].id;
        let scratch_id = wizard.current_stage().id;

        wizard.edit_stage(target).unwrap();
        assert_eq!(wizard.editing_stage_id(), Some(target));
        wizard.set_stage_name("Basics").unwrap();
        wizard.add_video("Extra", URL).unwrap();
        wizard.save_edit().unwrap();

        assert_eq!(wizard.step(), Step::Preview);
        assert_eq!(wizard.editing_stage_id(), None);
        assert_eq!(wizard.stages()[0].name, "Basics");
        assert_eq!(wizard.stages()[0].videos.len(), 2);
        assert_eq!(wizard.current_stage().id, scratch_id);
        assert!(wizard.current_stage().videos.is_empty());
    }

    #[test]
    fn cancel_edit_restores_the_snapshot() {
        let mut wizard = wizard_in_preview(&["Beginner"]);
        let before = wizard.stages()[0].clone();

        wizard.edit_stage(before.id).unwrap();
        wizard.set_stage_name("Changed").unwrap();
        wizard.remove_video(before.videos[0].id).unwrap();
        wizard.cancel_edit().unwrap();

        assert_eq!(wizard.stages()[0], before);
        assert_eq!(wizard.step(), Step::Preview);
        assert!(matches!(wizard.cancel_edit(), Err(WizardError::NotEditing)));
    }

    #[test]
    fn save_edit_validates_the_stage() {
        let mut wizard = wizard_in_preview(&[]);
        let target = wizard.stages()[0].id;
        wizard.edit_stage(target).unwrap();
        wizard.set_stage_name("").unwrap();
        assert!(matches!(wizard.save_edit(), Err(WizardError::EmptyStageName)));
        assert_eq!(wizard.editing_stage_id(), Some(target));
        assert!(matches!(
            wizard.delete_stage(target),
            Err(WizardError::StageBeingEdited(_))
        ));
        assert!(matches!(wizard.next(), Err(WizardError::EditInProgress)));
    }

    #[test]
    fn preview_can_return_to_stage_editor() {
        let mut wizard = wizard_in_preview(&[]);
        assert!(matches!(wizard.next(), Err(WizardError::WrongStep(Step::Preview))));
        wizard.add_another_stage().unwrap();
        assert_eq!(wizard.step(), Step::StageEditor);
        assert_eq!(wizard.back().unwrap(), Step::Title);
    }

    #[test]
    fn apply_dispatches_typed_actions() {
        let mut wizard = CourseWizard::new();
        let actions = vec![
            WizardAction::SetTitle {
                title: "Full Stack".into(),
            },
            WizardAction::Next,
            WizardAction::SetStageName {
                name: "Beginner".into(),
            },
            WizardAction::AddVideo {
                title: "Intro".into(),
                url: URL.into(),
            },
            WizardAction::AddAssessment {
                kind: AssessmentKind::Quiz,
            },
            WizardAction::Next,
        ];
        for action in actions {
            wizard.apply(action).unwrap();
        }
        assert_eq!(wizard.step(), Step::Preview);
        assert!(wizard.stages()[0].assessments.quiz.is_some());

        let err = wizard
            .apply(WizardAction::AddVideo {
                title: "x".into(),
                url: URL.into(),
            })
            .unwrap_err();
        assert!(matches!(err, WizardError::WrongStep(Step::Preview)));
    }

    #[test]
    fn begin_publish_blocks_resubmission_and_edits() {
        let mut wizard = wizard_in_preview(&[]);
        let course = wizard.begin_publish().unwrap();
        assert_eq!(course.title, "Full Stack");
        assert!(wizard.is_publishing());
        assert!(matches!(wizard.begin_publish(), Err(WizardError::PublishInFlight)));
        assert!(matches!(wizard.set_title("x"), Err(WizardError::PublishInFlight)));

        let err = wizard
            .finish_publish(Err(PortError::Unexpected("boom".into())))
            .unwrap_err();
        assert!(matches!(err, WizardError::Publish(_)));
        assert!(!wizard.is_publishing());
        assert_eq!(wizard.stages().len(), 1);
    }

    #[test]
    fn publish_requires_at_least_one_stage() {
        let mut wizard = wizard_in_preview(&[]);
        let only = wizard.stages()[0].id;
        wizard.delete_stage(only).unwrap();
        assert!(matches!(wizard.begin_publish(), Err(WizardError::NoStages)));
        assert!(!wizard.is_publishing());
    }

    #[tokio::test]
    async fn publish_hands_course_to_publisher_and_resets() {
        let publisher = RecordingPublisher::new(false);
        let mut wizard = wizard_in_preview(&["Beginner"]);

        let receipt = wizard.publish(&publisher).await.unwrap();
        assert_eq!(receipt.course_id.as_deref(), Some("course-1"));

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].title, "Full Stack");
        assert_eq!(published[0].stages.len(), 2);

        assert_eq!(wizard.step(), Step::Title);
        assert!(wizard.title().is_empty());
        assert!(wizard.stages().is_empty());
    }

    #[tokio::test]
    async fn abandoned_publish_leaves_session_editable() {
        let mut wizard = wizard_in_preview(&["Beginner"]);
        let abandoned = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            wizard.publish(&StalledPublisher),
        )
        .await;
        assert!(abandoned.is_err());

        assert!(!wizard.is_publishing());
        assert_eq!(wizard.stages().len(), 2);
        wizard.add_another_stage().unwrap();
        assert_eq!(wizard.step(), Step::StageEditor);
    }

    #[test]
    fn abort_publish_lowers_the_flag_and_keeps_state() {
        let mut wizard = wizard_in_preview(&[]);
        wizard.begin_publish().unwrap();
        wizard.abort_publish();
        assert!(!wizard.is_publishing());
        assert_eq!(wizard.stages().len(), 1);
        wizard.begin_publish().unwrap();
    }

    #[tokio::test]
    async fn failed_publish_preserves_editing_state() {
        let publisher = RecordingPublisher::new(true);
        let mut wizard = wizard_in_preview(&["Beginner"]);

        let err = wizard.publish(&publisher).await.unwrap_err();
        assert!(err.to_string().contains("backend unavailable"));
        assert_eq!(wizard.step(), Step::Preview);
        assert_eq!(wizard.stages().len(), 2);
        assert!(!wizard.is_publishing());
    }
}
