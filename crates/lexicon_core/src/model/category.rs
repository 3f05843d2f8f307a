//! Category tree node model.
//!
//! # Invariants
//! - `id` is the lowercased, hyphen-joined ancestor chain plus own name.
//! - `parent_id` is `None` only for root-level nodes.
//! - A category never lists itself as its parent.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable category identifier derived from the category path.
pub type CategoryId = String;

/// One node in the category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    /// Display name, case preserved.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Serialized as `null` for root-level nodes.
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Validation failures for category records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    BlankId,
    BlankName { id: CategoryId },
    SelfParent { id: CategoryId },
}

impl Display for CategoryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "category id must not be blank"),
            Self::BlankName { id } => write!(f, "category `{id}` must have a name"),
            Self::SelfParent { id } => write!(f, "category `{id}` cannot be its own parent"),
        }
    }
}

impl Error for CategoryValidationError {}

impl Category {
    /// Creates a category with empty description and no icon.
    pub fn new(
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        parent_id: Option<CategoryId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            parent_id,
            icon: None,
        }
    }

    /// Returns whether this node sits at the top of the tree.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.id.trim().is_empty() {
            return Err(CategoryValidationError::BlankId);
        }
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::BlankName {
                id: self.id.clone(),
            });
        }
        if self.parent_id.as_deref() == Some(self.id.as_str()) {
            return Err(CategoryValidationError::SelfParent {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Derives the category id for a chain of segment names, root first.
///
/// Each segment is lowercased as-is; inner whitespace is kept.
/// `["Food", "Fruits", "Citrus"]` yields `food-fruits-citrus`.
pub fn category_id_for<S: AsRef<str>>(segments: &[S]) -> CategoryId {
    segments
        .iter()
        .map(|segment| segment.as_ref().to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}
