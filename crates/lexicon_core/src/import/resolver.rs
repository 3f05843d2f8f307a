//! Category tree resolution for a batch of category paths.
//!
//! # Responsibility
//! - Materialize the deduplicated set of category nodes implied by paths.
//! - Order nodes so parents are persisted before their children.
//! - Report the leaf category id for every resolved path.
//!
//! # Invariants
//! - One node per derived id; the first registration wins its name.
//! - Paths sharing a prefix share the prefix nodes.
//! - `into_ordered` places each node strictly after its parent whenever the
//!   parent is part of the batch.

use crate::import::path::CategoryPath;
use crate::import::ImportRecord;
use crate::model::category::{Category, CategoryId};
use std::collections::{HashMap, HashSet, VecDeque};

/// Incremental id -> node registry built from category paths.
#[derive(Debug, Default)]
pub struct CategoryTreeResolver {
    index_by_id: HashMap<CategoryId, usize>,
    nodes: Vec<Category>,
}

impl CategoryTreeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every missing node on `path` and returns the leaf id.
    pub fn resolve(&mut self, path: &CategoryPath) -> CategoryId {
        let mut parent_id: Option<CategoryId> = None;
        for (index, segment) in path.segments().iter().enumerate() {
            let id = path.id_at(index);
            if !self.index_by_id.contains_key(&id) {
                self.index_by_id.insert(id.clone(), self.nodes.len());
                self.nodes
                    .push(Category::new(id.clone(), segment.clone(), parent_id.take()));
            }
            parent_id = Some(id);
        }
        // Parsed paths are never empty, so the loop ran at least once.
        parent_id.unwrap_or_else(|| path.leaf_id())
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.index_by_id.get(id).map(|index| &self.nodes[*index])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consumes the resolver and returns nodes in parent-before-child order.
    pub fn into_ordered(self) -> Vec<Category> {
        parent_ordered(self.nodes)
    }
}

/// Resolved categories plus the leaf id for each input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    /// Parent-ordered, deduplicated category nodes.
    pub categories: Vec<Category>,
    /// `leaf_ids[i]` is the category for `records[i]`.
    pub leaf_ids: Vec<CategoryId>,
}

/// Resolves the category tree for a validated batch of records.
pub fn plan_import(records: &[ImportRecord]) -> ImportPlan {
    let mut resolver = CategoryTreeResolver::new();
    let leaf_ids = records
        .iter()
        .map(|record| resolver.resolve(&record.path))
        .collect();
    ImportPlan {
        categories: resolver.into_ordered(),
        leaf_ids,
    }
}

/// Stable topological sort over the `parent_id` relation.
///
/// Nodes whose parent is absent from `nodes` count as roots. Among nodes that
/// become ready together, input order is kept. Nodes on a parent cycle can
/// never become ready; they are appended in input order. Ids derived from
/// paths cannot form cycles because a parent id is always a strict prefix of
/// its child id.
pub fn parent_ordered(nodes: Vec<Category>) -> Vec<Category> {
    let order = {
        let ids: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
        let mut children_by_parent: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut ready = VecDeque::new();
        for (index, node) in nodes.iter().enumerate() {
            match node.parent_id.as_deref() {
                Some(parent_id) if ids.contains(parent_id) && parent_id != node.id => {
                    children_by_parent.entry(parent_id).or_default().push(index);
                }
                _ => ready.push_back(index),
            }
        }

        let mut order = Vec::with_capacity(nodes.len());
        let mut emitted = vec![false; nodes.len()];
        while let Some(index) = ready.pop_front() {
            if emitted[index] {
                continue;
            }
            emitted[index] = true;
            order.push(index);
            if let Some(children) = children_by_parent.get(nodes[index].id.as_str()) {
                ready.extend(children.iter().copied());
            }
        }
        order.extend((0..nodes.len()).filter(|index| !emitted[*index]));
        order
    };

    let mut slots: Vec<Option<Category>> = nodes.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect()
}
