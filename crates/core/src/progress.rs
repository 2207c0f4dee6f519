//! Read-side derivations over a user's progress entries.
//!
//! Everything here is pure: completion figures are recomputed from the raw
//! entries on every read and never stored.

use crate::model::{Lesson, LessonId, ModuleId, ProgressEntry};

/// Entries whose joined lesson belongs to `module_id`.
#[must_use]
pub fn module_progress(entries: &[ProgressEntry], module_id: ModuleId) -> Vec<&ProgressEntry> {
    entries
        .iter()
        .filter(|entry| entry.lesson.module_id == module_id)
        .collect()
}

/// True iff some entry refers to `lesson_id` and is marked completed.
#[must_use]
pub fn is_lesson_completed<'a>(
    entries: impl IntoIterator<Item = &'a ProgressEntry>,
    lesson_id: LessonId,
) -> bool {
    entries
        .into_iter()
        .any(|entry| entry.lesson_id() == lesson_id && entry.is_completed())
}

/// "N of M lessons completed" for one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleProgress {
    pub module_id: ModuleId,
    pub completed_lessons: usize,
    pub total_lessons: usize,
    /// Whole percent in `0..=100`.
    pub percentage: u8,
}

impl ModuleProgress {
    /// Count how many of `lessons` (the module's lessons) are completed.
    /// Entries joined to other modules are ignored.
    ///
    /// A module without lessons is 0%. The percentage is rounded to the
    /// nearest integer, except that 100 is reserved for a module whose every
    /// lesson is completed.
    #[must_use]
    pub fn compute(module_id: ModuleId, entries: &[ProgressEntry], lessons: &[Lesson]) -> Self {
        let scoped = module_progress(entries, module_id);
        let total_lessons = lessons.len();
        let completed_lessons = lessons
            .iter()
            .filter(|lesson| is_lesson_completed(scoped.iter().copied(), lesson.id()))
            .count();

        Self {
            module_id,
            completed_lessons,
            total_lessons,
            percentage: percentage(completed_lessons, total_lessons),
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_lessons > 0 && self.completed_lessons == self.total_lessons
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    if completed >= total {
        return 100;
    }
    let rounded = ((completed as f64 / total as f64) * 100.0).round() as u8;
    rounded.min(99)
}

/// Neighbours of a lesson within its module's display sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LessonNavigation {
    pub previous: Option<LessonId>,
    pub next: Option<LessonId>,
}

impl LessonNavigation {
    /// Locate `lesson_id` in `lessons`, which must already be sorted by
    /// `(order, id)`. Returns `None` if the lesson is not in the slice.
    #[must_use]
    pub fn locate(lessons: &[Lesson], lesson_id: LessonId) -> Option<Self> {
        let index = lessons.iter().position(|lesson| lesson.id() == lesson_id)?;
        Some(Self {
            previous: index
                .checked_sub(1)
                .and_then(|i| lessons.get(i))
                .map(Lesson::id),
            next: lessons.get(index + 1).map(Lesson::id),
        })
    }
}

/// Sort lessons into display sequence: by `order`, ties by id.
pub fn sort_lessons(lessons: &mut [Lesson]) {
    lessons.sort_by_key(|lesson| (lesson.order(), lesson.id()));
}
