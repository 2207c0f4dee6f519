use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use url::Url;

use crate::model::ids::{LessonId, ModuleId};
use crate::model::slug::{MAX_FIELD_LEN, is_valid_slug, optional, required};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("lesson title must be at most 255 characters")]
    TitleTooLong,

    #[error("lesson slug must be lowercase letters, digits and hyphens (max 255)")]
    InvalidSlug,

    #[error("lesson order must be a non-negative integer")]
    InvalidOrder,

    #[error("lesson video URL must be an absolute URL")]
    InvalidVideoUrl,
}

impl LessonError {
    /// Input field the error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            LessonError::EmptyTitle | LessonError::TitleTooLong => "title",
            LessonError::InvalidSlug => "slug",
            LessonError::InvalidOrder => "order",
            LessonError::InvalidVideoUrl => "video_url",
        }
    }
}

//
// ─── KIND ──────────────────────────────────────────────────────────────────────
//

/// Content-type tag of a lesson.
///
/// The tag set is open: catalog data in the wild uses more tags than the
/// admin form offers, so unknown tags are kept verbatim in `Other` and
/// rendered as a generic lesson rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum LessonKind {
    #[default]
    Video,
    Reading,
    Quiz,
    Pdf,
    Interactive,
    Other(String),
}

impl LessonKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            LessonKind::Video => "video",
            LessonKind::Reading => "reading",
            LessonKind::Quiz => "quiz",
            LessonKind::Pdf => "pdf",
            LessonKind::Interactive => "interactive",
            LessonKind::Other(tag) => tag,
        }
    }

    /// Parse a stored or submitted tag. Never fails: blank tags fall back to
    /// `Video`, unknown tags become `Other`.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim();
        match tag.to_ascii_lowercase().as_str() {
            "" | "video" => LessonKind::Video,
            "reading" => LessonKind::Reading,
            "quiz" => LessonKind::Quiz,
            "pdf" => LessonKind::Pdf,
            "interactive" => LessonKind::Interactive,
            _ => LessonKind::Other(tag.to_owned()),
        }
    }
}

impl fmt::Display for LessonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for LessonKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LessonKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Editable lesson fields as submitted by the administrative surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDraft {
    pub module_id: ModuleId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub kind: LessonKind,
    pub order: i64,
    pub duration: Option<String>,
    pub video_url: Option<String>,
    pub document_url: Option<String>,
    pub content: Option<String>,
    pub is_published: bool,
    pub is_free: bool,
}

impl LessonDraft {
    /// Trim and check every field.
    ///
    /// # Errors
    ///
    /// Returns the first `LessonError` encountered.
    pub fn validate(self) -> Result<Self, LessonError> {
        let title = required(&self.title).ok_or(LessonError::EmptyTitle)?;
        if title.chars().count() > MAX_FIELD_LEN {
            return Err(LessonError::TitleTooLong);
        }

        let slug = self.slug.trim().to_owned();
        if slug.len() > MAX_FIELD_LEN || !is_valid_slug(&slug) {
            return Err(LessonError::InvalidSlug);
        }

        if u32::try_from(self.order).is_err() {
            return Err(LessonError::InvalidOrder);
        }

        let video_url = optional(self.video_url);
        if let Some(raw) = &video_url {
            Url::parse(raw).map_err(|_| LessonError::InvalidVideoUrl)?;
        }

        Ok(Self {
            module_id: self.module_id,
            title,
            slug,
            description: optional(self.description),
            kind: self.kind,
            order: self.order,
            duration: optional(self.duration),
            video_url,
            document_url: optional(self.document_url),
            content: optional(self.content),
            is_published: self.is_published,
            is_free: self.is_free,
        })
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// An individual content unit belonging to exactly one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    module_id: ModuleId,
    title: String,
    slug: String,
    description: Option<String>,
    kind: LessonKind,
    order: u32,
    duration: Option<String>,
    video_url: Option<String>,
    document_url: Option<String>,
    content: Option<String>,
    is_published: bool,
    is_free: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Lesson {
    /// Rehydrate a lesson from storage, re-checking the draft rules.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` if the persisted fields are no longer valid.
    pub fn from_persisted(
        id: LessonId,
        draft: LessonDraft,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, LessonError> {
        let draft = draft.validate()?;
        let order = u32::try_from(draft.order).map_err(|_| LessonError::InvalidOrder)?;
        Ok(Self {
            id,
            module_id: draft.module_id,
            title: draft.title,
            slug: draft.slug,
            description: draft.description,
            kind: draft.kind,
            order,
            duration: draft.duration,
            video_url: draft.video_url,
            document_url: draft.document_url,
            content: draft.content,
            is_published: draft.is_published,
            is_free: draft.is_free,
            created_at,
            updated_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> &LessonKind {
        &self.kind
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    #[must_use]
    pub fn duration(&self) -> Option<&str> {
        self.duration.as_deref()
    }

    #[must_use]
    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    #[must_use]
    pub fn document_url(&self) -> Option<&str> {
        self.document_url.as_deref()
    }

    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.is_published
    }

    #[must_use]
    pub fn is_free(&self) -> bool {
        self.is_free
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn summary(&self) -> LessonSummary {
        LessonSummary {
            id: self.id,
            module_id: self.module_id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            kind: self.kind.clone(),
            order: self.order,
        }
    }

    /// Editable fields of this lesson, e.g. to apply a partial change.
    #[must_use]
    pub fn to_draft(&self) -> LessonDraft {
        LessonDraft {
            module_id: self.module_id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            kind: self.kind.clone(),
            order: i64::from(self.order),
            duration: self.duration.clone(),
            video_url: self.video_url.clone(),
            document_url: self.document_url.clone(),
            content: self.content.clone(),
            is_published: self.is_published,
            is_free: self.is_free,
        }
    }
}

/// Display context attached to a progress record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonSummary {
    pub id: LessonId,
    pub module_id: ModuleId,
    pub title: String,
    pub slug: String,
    pub kind: LessonKind,
    pub order: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft() -> LessonDraft {
        LessonDraft {
            module_id: ModuleId::new(1),
            title: "What is Blockchain?".into(),
            slug: "what-is-blockchain".into(),
            description: None,
            kind: LessonKind::Video,
            order: 1,
            duration: Some("12:30".into()),
            video_url: Some("https://www.youtube.com/embed/SSo_EIwHSd4".into()),
            document_url: None,
            content: None,
            is_published: true,
            is_free: true,
        }
    }

    #[test]
    fn kind_parses_known_and_seeded_tags() {
        assert_eq!(LessonKind::parse("reading"), LessonKind::Reading);
        assert_eq!(LessonKind::parse("PDF"), LessonKind::Pdf);
        assert_eq!(LessonKind::parse("interactive"), LessonKind::Interactive);
        assert_eq!(LessonKind::parse(""), LessonKind::Video);
    }

    #[test]
    fn kind_keeps_unknown_tags() {
        let kind = LessonKind::parse("podcast");
        assert_eq!(kind, LessonKind::Other("podcast".into()));
        assert_eq!(kind.to_string(), "podcast");
    }

    #[test]
    fn kind_serializes_as_plain_string() {
        let json = serde_json::to_string(&LessonKind::Interactive).unwrap();
        assert_eq!(json, "\"interactive\"");
        let back: LessonKind = serde_json::from_str("\"slides\"").unwrap();
        assert_eq!(back, LessonKind::Other("slides".into()));
    }

    #[test]
    fn validate_rejects_negative_order() {
        let mut d = draft();
        d.order = -1;
        assert_eq!(d.validate().unwrap_err(), LessonError::InvalidOrder);
    }

    #[test]
    fn validate_rejects_relative_video_url() {
        let mut d = draft();
        d.video_url = Some("/videos/intro.mp4".into());
        let err = d.validate().unwrap_err();
        assert_eq!(err.field(), "video_url");
    }

    #[test]
    fn summary_carries_module_membership() {
        let lesson =
            Lesson::from_persisted(LessonId::new(4), draft(), fixed_now(), fixed_now()).unwrap();
        let summary = lesson.summary();
        assert_eq!(summary.module_id, ModuleId::new(1));
        assert_eq!(summary.order, 1);
        assert_eq!(lesson.to_draft().order, 1);
    }
}
