//! crates/course_wizard_core/src/domain.rs
//!
//! Defines the pure data structures of a course under construction.
//! The whole tree is owned by a single editing session; nothing here holds
//! back-references or shared handles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Work-hours assigned to a freshly created stage.
pub const DEFAULT_STAGE_DURATION_HOURS: u32 = 40;

/// Every quiz question offers exactly this many options.
pub const QUIZ_OPTION_COUNT: usize = 4;

/// Identifier of a committed or scratch stage.
pub type StageId = Uuid;

//=========================================================================================
// Course and Stage
//=========================================================================================

/// The finished payload handed to the publisher.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub title: String,
    pub stages: Vec<Stage>,
}

/// A named phase of a course with its own videos and assessments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    /// Duration in work-hours.
    pub duration: u32,
    pub videos: Vec<Video>,
    pub assessments: Assessments,
}

impl Stage {
    /// Creates an empty stage with a fresh id and the default duration.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            duration: DEFAULT_STAGE_DURATION_HOURS,
            videos: Vec::new(),
            assessments: Assessments::default(),
        }
    }

    /// Creates an empty stage with the given name and duration.
    pub fn named(name: impl Into<String>, duration: u32) -> Self {
        Self {
            name: name.into(),
            duration,
            ..Self::new()
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

/// An embedded lecture video. Only stored once its URL yielded a valid id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    /// The identifier extracted from `url`.
    pub video_id: String,
}

//=========================================================================================
// Assessments
//=========================================================================================

/// The three optional assessment slots of a stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessments {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub quiz: Option<Quiz>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub assignment: Option<Assignment>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub capstone: Option<Assignment>,
}

impl Assessments {
    pub fn has(&self, kind: AssessmentKind) -> bool {
        match kind {
            AssessmentKind::Quiz => self.quiz.is_some(),
            AssessmentKind::Assignment => self.assignment.is_some(),
            AssessmentKind::Capstone => self.capstone.is_some(),
        }
    }

    /// Empties the named slot.
    pub fn clear(&mut self, kind: AssessmentKind) {
        match kind {
            AssessmentKind::Quiz => self.quiz = None,
            AssessmentKind::Assignment => self.assignment = None,
            AssessmentKind::Capstone => self.capstone = None,
        }
    }

    /// Kinds currently attached, in display order.
    pub fn kinds(&self) -> Vec<AssessmentKind> {
        AssessmentKind::ALL
            .into_iter()
            .filter(|kind| self.has(*kind))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
    Quiz,
    Assignment,
    Capstone,
}

impl AssessmentKind {
    pub const ALL: [AssessmentKind; 3] = [
        AssessmentKind::Quiz,
        AssessmentKind::Assignment,
        AssessmentKind::Capstone,
    ];
}

impl std::fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            AssessmentKind::Quiz => "quiz",
            AssessmentKind::Assignment => "assignment",
            AssessmentKind::Capstone => "capstone",
        };
        f.write_str(label)
    }
}

/// The two assessment kinds that share the `Assignment` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    Assignment,
    Capstone,
}

impl From<AssignmentKind> for AssessmentKind {
    fn from(kind: AssignmentKind) -> Self {
        match kind {
            AssignmentKind::Assignment => AssessmentKind::Assignment,
            AssignmentKind::Capstone => AssessmentKind::Capstone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// A blank quiz holding a single blank question.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: String::new(),
            questions: vec![QuizQuestion::new()],
        }
    }

    pub fn question_mut(&mut self, question_id: Uuid) -> Option<&mut QuizQuestion> {
        self.questions.iter_mut().find(|q| q.id == question_id)
    }
}

impl Default for Quiz {
    fn default() -> Self {
        Self::new()
    }
}

/// A multiple-choice question. `correct_answers` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: Uuid,
    pub question: String,
    pub options: [String; QUIZ_OPTION_COUNT],
    pub correct_answers: BTreeSet<usize>,
}

impl QuizQuestion {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            question: String::new(),
            options: Default::default(),
            correct_answers: BTreeSet::from([0]),
        }
    }

    /// Flips `option_index` in the correct-answer set.
    ///
    /// Returns `false` and leaves the set untouched when the flip would empty it.
    /// The caller must have checked that `option_index` is in range.
    pub fn toggle_correct(&mut self, option_index: usize) -> bool {
        if self.correct_answers.contains(&option_index) {
            if self.correct_answers.len() == 1 {
                return false;
            }
            self.correct_answers.remove(&option_index);
        } else {
            self.correct_answers.insert(option_index);
        }
        true
    }
}

impl Default for QuizQuestion {
    fn default() -> Self {
        Self::new()
    }
}

/// Assignment and capstone share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub document: Option<DocumentRef>,
}

impl Assignment {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: String::new(),
            description: String::new(),
            document: None,
        }
    }
}

impl Default for Assignment {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference to a document uploaded elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub name: String,
    pub url: String,
}
