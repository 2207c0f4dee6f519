mod ids;
mod lesson;
mod module;
mod progress;
mod user;

pub mod slug;

pub use ids::{LessonId, MAX_ID, ModuleId, ParseIdError, ProgressId, UserId};

pub use lesson::{Lesson, LessonDraft, LessonError, LessonKind, LessonSummary};
pub use module::{Module, ModuleDraft, ModuleError};
pub use progress::{ProgressEntry, ProgressRecord};
pub use user::{Audience, Email, Identity, RegistrationDraft, User, UserError};
