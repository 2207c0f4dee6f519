use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::ModuleId;
use crate::model::slug::{MAX_FIELD_LEN, is_valid_slug, optional, required};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module title cannot be empty")]
    EmptyTitle,

    #[error("module title must be at most 255 characters")]
    TitleTooLong,

    #[error("module slug must be lowercase letters, digits and hyphens (max 255)")]
    InvalidSlug,

    #[error("module description cannot be empty")]
    EmptyDescription,

    #[error("module category cannot be empty")]
    EmptyCategory,

    #[error("module category must be at most 255 characters")]
    CategoryTooLong,
}

impl ModuleError {
    /// Input field the error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            ModuleError::EmptyTitle | ModuleError::TitleTooLong => "title",
            ModuleError::InvalidSlug => "slug",
            ModuleError::EmptyDescription => "description",
            ModuleError::EmptyCategory | ModuleError::CategoryTooLong => "category",
        }
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Editable module fields as submitted by the administrative surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleDraft {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub duration: Option<String>,
    pub thumbnail: Option<String>,
    pub is_published: bool,
}

impl ModuleDraft {
    /// Trim and check every field.
    ///
    /// # Errors
    ///
    /// Returns the first `ModuleError` encountered.
    pub fn validate(self) -> Result<Self, ModuleError> {
        let title = required(&self.title).ok_or(ModuleError::EmptyTitle)?;
        if title.chars().count() > MAX_FIELD_LEN {
            return Err(ModuleError::TitleTooLong);
        }

        let slug = self.slug.trim().to_owned();
        if slug.len() > MAX_FIELD_LEN || !is_valid_slug(&slug) {
            return Err(ModuleError::InvalidSlug);
        }

        let description = required(&self.description).ok_or(ModuleError::EmptyDescription)?;

        let category = required(&self.category).ok_or(ModuleError::EmptyCategory)?;
        if category.chars().count() > MAX_FIELD_LEN {
            return Err(ModuleError::CategoryTooLong);
        }

        Ok(Self {
            title,
            slug,
            description,
            category,
            duration: optional(self.duration),
            thumbnail: optional(self.thumbnail),
            is_published: self.is_published,
        })
    }
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// A top-level course unit containing ordered lessons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    id: ModuleId,
    title: String,
    slug: String,
    description: String,
    category: String,
    duration: Option<String>,
    thumbnail: Option<String>,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Module {
    /// Rehydrate a module from storage, re-checking the draft rules.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError` if the persisted fields are no longer valid.
    pub fn from_persisted(
        id: ModuleId,
        draft: ModuleDraft,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ModuleError> {
        let draft = draft.validate()?;
        Ok(Self {
            id,
            title: draft.title,
            slug: draft.slug,
            description: draft.description,
            category: draft.category,
            duration: draft.duration,
            thumbnail: draft.thumbnail,
            is_published: draft.is_published,
            created_at,
            updated_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> ModuleId {
        self.id
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
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn duration(&self) -> Option<&str> {
        self.duration.as_deref()
    }

    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.is_published
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Editable fields of this module, e.g. to apply a partial change.
    #[must_use]
    pub fn to_draft(&self) -> ModuleDraft {
        ModuleDraft {
            title: self.title.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            duration: self.duration.clone(),
            thumbnail: self.thumbnail.clone(),
            is_published: self.is_published,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft() -> ModuleDraft {
        ModuleDraft {
            title: "  Introduction to Blockchain ".into(),
            slug: "introduction-to-blockchain".into(),
            description: "Fundamentals".into(),
            category: "Beginner".into(),
            duration: Some(" ".into()),
            thumbnail: None,
            is_published: true,
        }
    }

    #[test]
    fn validate_trims_and_collapses_blank_optionals() {
        let valid = draft().validate().unwrap();
        assert_eq!(valid.title, "Introduction to Blockchain");
        assert_eq!(valid.duration, None);
    }

    #[test]
    fn validate_rejects_bad_slug() {
        let mut d = draft();
        d.slug = "Intro To Blockchain".into();
        let err = d.validate().unwrap_err();
        assert_eq!(err, ModuleError::InvalidSlug);
        assert_eq!(err.field(), "slug");
    }

    #[test]
    fn validate_rejects_long_title() {
        let mut d = draft();
        d.title = "x".repeat(256);
        assert_eq!(d.validate().unwrap_err(), ModuleError::TitleTooLong);
    }

    #[test]
    fn from_persisted_round_trips_draft() {
        let module =
            Module::from_persisted(ModuleId::new(3), draft(), fixed_now(), fixed_now()).unwrap();
        assert_eq!(module.id(), ModuleId::new(3));
        assert!(module.is_published());
        assert_eq!(module.to_draft(), draft().validate().unwrap());
    }
}
