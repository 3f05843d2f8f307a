//! Category path parsing.
//!
//! A category path encodes an ancestor chain as delimited segment names,
//! e.g. `Food > Fruits > Citrus`.
//!
//! # Invariants
//! - A parsed path has at least one segment.
//! - Segments are trimmed and never empty; case is preserved.

use crate::model::category::{category_id_for, CategoryId};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Hierarchy delimiter between segment names.
pub const PATH_DELIMITER: char = '>';

/// Parsed, non-empty sequence of segment names, root first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPath {
    segments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Path is empty or whitespace-only.
    Empty,
    /// Segment at 0-based `position` is blank, e.g. `Food >> Fruits`.
    EmptySegment { position: usize },
}

impl Display for PathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "category path must not be empty"),
            Self::EmptySegment { position } => {
                write!(f, "category path segment {} is empty", position + 1)
            }
        }
    }
}

impl Error for PathError {}

/// Splits `raw` on `>` into trimmed segment names.
pub fn parse_category_path(raw: &str) -> Result<CategoryPath, PathError> {
    if raw.trim().is_empty() {
        return Err(PathError::Empty);
    }

    let segments = raw
        .split(PATH_DELIMITER)
        .map(str::trim)
        .enumerate()
        .map(|(position, segment)| {
            if segment.is_empty() {
                Err(PathError::EmptySegment { position })
            } else {
                Ok(segment.to_string())
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CategoryPath { segments })
}

impl CategoryPath {
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Id of the ancestor chain ending at `self.segments[index]`.
    pub fn id_at(&self, index: usize) -> CategoryId {
        category_id_for(&self.segments[..=index])
    }

    /// Id of the deepest node.
    pub fn leaf_id(&self) -> CategoryId {
        category_id_for(&self.segments)
    }
}

impl FromStr for CategoryPath {
    type Err = PathError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        parse_category_path(value)
    }
}

impl Display for CategoryPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join(" > "))
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_category_path, CategoryPath, PathError};

    #[test]
    fn parse_trims_segments_and_preserves_case() {
        let path = parse_category_path("  Food>Fruits >   Citrus  ").unwrap();
        assert_eq!(path.segments(), ["Food", "Fruits", "Citrus"]);
        assert_eq!(path.depth(), 3);
        assert_eq!(path.to_string(), "Food > Fruits > Citrus");
    }

    #[test]
    fn parse_rejects_blank_path() {
        assert_eq!(parse_category_path(""), Err(PathError::Empty));
        assert_eq!(parse_category_path(" \t "), Err(PathError::Empty));
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert_eq!(
            parse_category_path("Food >> Citrus"),
            Err(PathError::EmptySegment { position: 1 })
        );
        assert_eq!(
            parse_category_path("Food >"),
            Err(PathError::EmptySegment { position: 1 })
        );
        assert_eq!(
            parse_category_path("> Food"),
            Err(PathError::EmptySegment { position: 0 })
        );
    }

    #[test]
    fn ids_are_case_folded_prefix_chains() {
        let path: CategoryPath = "Food > Fruits > Citrus".parse().unwrap();
        assert_eq!(path.id_at(0), "food");
        assert_eq!(path.id_at(1), "food-fruits");
        assert_eq!(path.leaf_id(), "food-fruits-citrus");
    }
}
