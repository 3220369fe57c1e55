//! Field aggregate: a polygon boundary with cached thumbnail metadata.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::boundary::Boundary;

/// Validation errors returned by [`Field::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValidationError {
    /// `deletion_date` precedes `creation_date`.
    DeletionBeforeCreation,
}

impl fmt::Display for FieldValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeletionBeforeCreation => {
                write!(f, "deletion date must not precede the creation date")
            }
        }
    }
}

impl std::error::Error for FieldValidationError {}

/// Unvalidated field data used to construct a [`Field`].
#[derive(Debug, Clone)]
pub struct FieldDraft {
    /// Record identifier.
    pub id: Uuid,
    /// Validated boundary geometry.
    pub boundary: Boundary,
    /// Cached thumbnail reference, when one has been fetched.
    pub image_url: Option<String>,
    /// Instant after which the cached thumbnail is stale.
    pub expiration_time: DateTime<Utc>,
    /// Server-assigned creation instant.
    pub creation_date: DateTime<Utc>,
    /// Soft-deletion marker.
    pub deletion_date: Option<DateTime<Utc>>,
}

/// The sole persisted entity: one polygon boundary plus imagery metadata.
///
/// ## Invariants
/// - the boundary is always a valid simple polygon (guaranteed by
///   [`Boundary`]);
/// - `deletion_date`, when set, is not before `creation_date`;
/// - `image_url` is only meaningful together with `expiration_time`.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    id: Uuid,
    boundary: Boundary,
    image_url: Option<String>,
    expiration_time: DateTime<Utc>,
    creation_date: DateTime<Utc>,
    deletion_date: Option<DateTime<Utc>>,
}

impl Field {
    /// Construct a field, enforcing the timestamp invariant.
    ///
    /// # Errors
    ///
    /// [`FieldValidationError::DeletionBeforeCreation`] when the draft marks
    /// the record deleted before it was created.
    pub fn new(draft: FieldDraft) -> Result<Self, FieldValidationError> {
        let FieldDraft {
            id,
            boundary,
            image_url,
            expiration_time,
            creation_date,
            deletion_date,
        } = draft;

        if let Some(deleted_at) = deletion_date {
            if deleted_at < creation_date {
                return Err(FieldValidationError::DeletionBeforeCreation);
            }
        }

        Ok(Self {
            id,
            boundary,
            image_url,
            expiration_time,
            creation_date,
            deletion_date,
        })
    }

    /// Record identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Boundary geometry.
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Cached thumbnail reference, if any.
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    /// Instant after which the cached thumbnail is stale.
    pub fn expiration_time(&self) -> DateTime<Utc> {
        self.expiration_time
    }

    /// Server-assigned creation instant.
    pub fn creation_date(&self) -> DateTime<Utc> {
        self.creation_date
    }

    /// Soft-deletion instant, when the record has been deleted.
    pub fn deletion_date(&self) -> Option<DateTime<Utc>> {
        self.deletion_date
    }

    /// Whether the record is soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deletion_date.is_some()
    }
}

/// Visibility of soft-deleted records in read operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletionScope {
    /// Only live records (the default for every query).
    #[default]
    ActiveOnly,
    /// Only soft-deleted records.
    DeletedOnly,
    /// Both live and soft-deleted records.
    All,
}

impl DeletionScope {
    /// Parse the `filter_by` query parameter. `None` selects the default
    /// scope; unknown values yield `None` so the caller can reject them.
    pub fn from_filter_param(raw: Option<&str>) -> Option<Self> {
        match raw {
            None => Some(Self::ActiveOnly),
            Some("deleted") => Some(Self::DeletedOnly),
            Some("all") => Some(Self::All),
            Some(_) => None,
        }
    }

    /// Scope used by point lookups honouring an `include_deleted` flag.
    pub fn for_lookup(include_deleted: bool) -> Self {
        if include_deleted {
            Self::All
        } else {
            Self::ActiveOnly
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn boundary() -> Boundary {
        let square = json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
        });
        Boundary::from_geojson(&square).expect("valid square")
    }

    fn draft() -> FieldDraft {
        let created = Utc::now();
        FieldDraft {
            id: Uuid::new_v4(),
            boundary: boundary(),
            image_url: None,
            expiration_time: created,
            creation_date: created,
            deletion_date: None,
        }
    }

    #[rstest]
    fn live_field_reports_not_deleted() {
        let field = Field::new(draft()).expect("valid draft");
        assert!(!field.is_deleted());
        assert_eq!(field.image_url(), None);
    }

    #[rstest]
    fn deletion_before_creation_is_rejected() {
        let mut draft = draft();
        draft.deletion_date = Some(draft.creation_date - TimeDelta::seconds(1));
        assert_eq!(
            Field::new(draft),
            Err(FieldValidationError::DeletionBeforeCreation)
        );
    }

    #[rstest]
    fn deletion_at_creation_is_allowed() {
        let mut draft = draft();
        draft.deletion_date = Some(draft.creation_date);
        let field = Field::new(draft).expect("equal timestamps are fine");
        assert!(field.is_deleted());
    }

    #[rstest]
    #[case(None, Some(DeletionScope::ActiveOnly))]
    #[case(Some("deleted"), Some(DeletionScope::DeletedOnly))]
    #[case(Some("all"), Some(DeletionScope::All))]
    #[case(Some("active"), None)]
    #[case(Some(""), None)]
    fn filter_param_parsing(#[case] raw: Option<&str>, #[case] expected: Option<DeletionScope>) {
        assert_eq!(DeletionScope::from_filter_param(raw), expected);
    }
}
