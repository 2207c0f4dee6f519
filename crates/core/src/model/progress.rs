use chrono::{DateTime, Utc};

use crate::model::ids::{LessonId, ProgressId, UserId};
use crate::model::lesson::LessonSummary;

/// Per-user, per-lesson completion marker.
///
/// At most one record exists for a given `(user_id, lesson_id)` pair;
/// storage enforces this with a unique index. Marking a lesson incomplete
/// deletes the record, so `completed` is expected to be true for every
/// persisted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub id: ProgressId,
    pub user_id: UserId,
    pub lesson_id: LessonId,
    pub completed: bool,
    /// Set only when `completed` transitions to true.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A progress record joined with the lesson it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEntry {
    pub record: ProgressRecord,
    pub lesson: LessonSummary,
}

impl ProgressEntry {
    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.record.lesson_id
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.record.completed
    }
}
