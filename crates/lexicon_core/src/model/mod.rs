//! Dictionary domain model.
//!
//! # Responsibility
//! - Define the category tree node and word records shared by import,
//!   repositories and the HTTP surface.
//! - Own identifier derivation rules so every caller agrees on them.
//!
//! # Invariants
//! - Category ids are derived from the full ancestor chain, never random.
//! - Word ids are unique per insert and never derived from content alone.

pub mod category;
pub mod word;
